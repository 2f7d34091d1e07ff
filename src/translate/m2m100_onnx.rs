use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use ndarray::Axis;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use tracing::{debug, info};

use super::generation::{self, GenerationConfig};
use super::interface::{TranslateError, TranslateRequest, Translator};
use super::m2m100_tokenizer::M2M100Tokenizer;

fn find_model_file(model_dir: &Path, file_name: &str) -> Result<PathBuf, TranslateError> {
    [model_dir.join(file_name), model_dir.join("onnx").join(file_name)]
        .into_iter()
        .find(|p| p.exists())
        .ok_or_else(|| {
            TranslateError::ModelFiles(format!(
                "{} not found in {} or its onnx/ subdirectory",
                file_name,
                model_dir.display()
            ))
        })
}

struct M2M100Model {
    encoder: Session,
    decoder: Session,
    tokenizer: M2M100Tokenizer,
    generation: GenerationConfig,
}

impl M2M100Model {
    fn load_session(path: &Path, intra_threads: usize) -> Result<Session, TranslateError> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?
            .commit_from_file(path)?;
        info!("Loaded ONNX model: {}", path.display());
        Ok(session)
    }

    /// Run the encoder and return `last_hidden_state` as (shape, data)
    fn encode(&self, input_ids: &[i64]) -> Result<([usize; 3], Vec<f32>), TranslateError> {
        let seq_len = input_ids.len();
        let outputs = self.encoder.run(ort::inputs![
            "input_ids" => Tensor::from_array(([1usize, seq_len], input_ids.to_vec()))?.into_dyn(),
            "attention_mask" => Tensor::from_array(([1usize, seq_len], vec![1i64; seq_len]))?.into_dyn(),
        ]?)?;

        let hidden = outputs["last_hidden_state"].try_extract_tensor::<f32>()?;
        let shape = hidden.shape();
        if shape.len() != 3 {
            return Err(TranslateError::Inference(format!(
                "unexpected encoder output shape {:?}",
                shape
            )));
        }
        let dims = [shape[0], shape[1], shape[2]];
        Ok((dims, hidden.iter().copied().collect()))
    }

    /// Logits for the position after the last token of `decoder_ids`
    fn decode_step(
        &self,
        decoder_ids: &[i64],
        encoder_len: usize,
        hidden: &([usize; 3], Vec<f32>),
    ) -> Result<Vec<f32>, TranslateError> {
        let outputs = self.decoder.run(ort::inputs![
            "input_ids" => Tensor::from_array(([1usize, decoder_ids.len()], decoder_ids.to_vec()))?.into_dyn(),
            "encoder_attention_mask" => Tensor::from_array(([1usize, encoder_len], vec![1i64; encoder_len]))?.into_dyn(),
            "encoder_hidden_states" => Tensor::from_array((hidden.0, hidden.1.clone()))?.into_dyn(),
        ]?)?;

        let logits = outputs["logits"].try_extract_tensor::<f32>()?;
        if logits.ndim() != 3 || logits.shape()[1] == 0 {
            return Err(TranslateError::Inference(format!(
                "unexpected decoder output shape {:?}",
                logits.shape()
            )));
        }
        let last = logits.shape()[1] - 1;
        let row = logits.index_axis(Axis(0), 0);
        let row = row.index_axis(Axis(0), last);
        Ok(row.iter().copied().collect())
    }

    fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String, TranslateError> {
        let forced_bos = self.tokenizer.lang_id(target_lang)?;
        let input_ids = self.tokenizer.encode_source(text, source_lang)?;
        let encoder_len = input_ids.len();

        let hidden = self.encode(&input_ids)?;
        debug!("Encoder output shape: {:?}", hidden.0);

        let generated = generation::generate(&self.generation, forced_bos, |sequence| {
            self.decode_step(sequence, encoder_len, &hidden)
        })?;
        debug!("Generated {} tokens", generated.len());

        self.tokenizer.decode_generated(&generated)
    }
}

/// M2M100 running in-process on ONNX Runtime.
///
/// Expects a Hugging Face ONNX export: `tokenizer.json`,
/// `encoder_model.onnx` and `decoder_model.onnx` (optionally under `onnx/`).
pub struct OnnxM2M100Translator {
    model: Arc<M2M100Model>,
    name: String,
}

impl OnnxM2M100Translator {
    pub fn load(
        model_dir: &Path,
        model_name: &str,
        max_new_tokens: usize,
        num_beams: Option<usize>,
        intra_threads: usize,
    ) -> Result<Self, TranslateError> {
        info!("Loading {} from {}", model_name, model_dir.display());

        let tokenizer = M2M100Tokenizer::from_file(&find_model_file(model_dir, "tokenizer.json")?)?;
        let encoder = M2M100Model::load_session(&find_model_file(model_dir, "encoder_model.onnx")?, intra_threads)?;
        let decoder = M2M100Model::load_session(&find_model_file(model_dir, "decoder_model.onnx")?, intra_threads)?;
        let generation = GenerationConfig::from_model_dir(model_dir, max_new_tokens, num_beams)?;

        info!(
            "M2M100 ready: decoder_start={}, eos={}, pad={}, max_length={}, num_beams={}",
            generation.decoder_start_token_id,
            generation.eos_token_id,
            generation.pad_token_id,
            generation.max_length,
            generation.num_beams
        );

        Ok(Self {
            model: Arc::new(M2M100Model {
                encoder,
                decoder,
                tokenizer,
                generation,
            }),
            name: format!("onnx_m2m100 ({})", model_name),
        })
    }
}

#[async_trait]
impl Translator for OnnxM2M100Translator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn translate(&self, request: TranslateRequest) -> Result<String, TranslateError> {
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || {
            model.translate(&request.text, &request.source_lang, &request.target_lang)
        })
        .await?
    }
}
