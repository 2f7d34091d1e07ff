//! Decoder-side search for M2M100: greedy and beam search over a logits
//! callback, with the first generated token forced to the target marker.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use super::interface::TranslateError;

/// Generation settings of the checkpoint.
///
/// Defaults mirror `facebook/m2m100_418M`; `config.json` and then
/// `generation_config.json` in the model directory override them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub decoder_start_token_id: i64,
    pub eos_token_id: i64,
    pub pad_token_id: i64,
    /// Longest decoder sequence, counting the decoder start token
    pub max_length: usize,
    pub num_beams: usize,
    pub early_stopping: bool,
    pub length_penalty: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        // M2M100 decoder starts from </s>
        Self {
            decoder_start_token_id: 2,
            eos_token_id: 2,
            pad_token_id: 1,
            max_length: 200,
            num_beams: 5,
            early_stopping: true,
            length_penalty: 1.0,
        }
    }
}

impl GenerationConfig {
    /// Load settings from the model directory.
    ///
    /// `max_new_tokens` caps the tokens generated after the decoder start
    /// token; `num_beams` overrides the checkpoint's beam count.
    pub fn from_model_dir(
        model_dir: &Path,
        max_new_tokens: usize,
        num_beams: Option<usize>,
    ) -> Result<Self, TranslateError> {
        let mut config = Self::default();

        for file_name in ["config.json", "generation_config.json"] {
            let path = model_dir.join(file_name);
            if !path.exists() {
                continue;
            }

            let raw = std::fs::read_to_string(&path)
                .map_err(|e| TranslateError::ModelFiles(format!("failed to read {}: {e}", path.display())))?;
            let json: Value = serde_json::from_str(&raw)
                .map_err(|e| TranslateError::ModelFiles(format!("failed to parse {}: {e}", path.display())))?;
            config.apply(&json);
            debug!("Read generation settings from {}", path.display());
        }

        config.max_length = config.max_length.min(max_new_tokens.saturating_add(1));
        if let Some(beams) = num_beams {
            config.num_beams = beams;
        }
        config.num_beams = config.num_beams.max(1);
        Ok(config)
    }

    fn apply(&mut self, json: &Value) {
        if let Some(id) = json["decoder_start_token_id"].as_i64() {
            self.decoder_start_token_id = id;
        }
        if let Some(id) = json["eos_token_id"].as_i64() {
            self.eos_token_id = id;
        }
        if let Some(id) = json["pad_token_id"].as_i64() {
            self.pad_token_id = id;
        }
        if let Some(len) = json["max_length"].as_u64() {
            self.max_length = len as usize;
        }
        if let Some(beams) = json["num_beams"].as_u64() {
            self.num_beams = beams as usize;
        }
        if let Some(early) = json["early_stopping"].as_bool() {
            self.early_stopping = early;
        }
        if let Some(penalty) = json["length_penalty"].as_f64() {
            self.length_penalty = penalty as f32;
        }
    }
}

/// Run the configured search: beam search when `num_beams > 1`, greedy otherwise.
///
/// `next_logits` receives a decoder sequence and returns the logits for the
/// next position. The returned ids exclude the decoder start token and begin
/// with `forced_bos`.
pub fn generate<F>(
    generation: &GenerationConfig,
    forced_bos: i64,
    next_logits: F,
) -> Result<Vec<i64>, TranslateError>
where
    F: FnMut(&[i64]) -> Result<Vec<f32>, TranslateError>,
{
    if generation.num_beams > 1 {
        beam_search(generation, forced_bos, next_logits)
    } else {
        greedy_generate(generation, forced_bos, next_logits)
    }
}

/// Greedy decoding with the first generated token forced to `forced_bos`
pub fn greedy_generate<F>(
    generation: &GenerationConfig,
    forced_bos: i64,
    mut next_logits: F,
) -> Result<Vec<i64>, TranslateError>
where
    F: FnMut(&[i64]) -> Result<Vec<f32>, TranslateError>,
{
    let mut sequence = vec![generation.decoder_start_token_id, forced_bos];

    while sequence.len() < generation.max_length {
        let logits = next_logits(&sequence)?;
        let next = logits
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(idx, _)| idx as i64)
            .ok_or_else(|| TranslateError::Inference("decoder returned empty logits".to_string()))?;

        sequence.push(next);
        if next == generation.eos_token_id {
            break;
        }
    }

    Ok(sequence.split_off(1))
}

fn log_softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let sum: f32 = logits.iter().map(|&l| (l - max).exp()).sum();
    let log_norm = max + sum.ln();
    logits.iter().map(|&l| l - log_norm).collect()
}

/// A partial decoder sequence and its summed log probability
#[derive(Debug, Clone)]
struct Hypothesis {
    tokens: Vec<i64>,
    log_prob: f32,
}

/// Finished hypotheses, keeping the best `num_beams` by length-normalized score
struct FinishedHypotheses {
    num_beams: usize,
    length_penalty: f32,
    early_stopping: bool,
    hyps: Vec<(f32, Vec<i64>)>,
}

impl FinishedHypotheses {
    fn new(generation: &GenerationConfig) -> Self {
        Self {
            num_beams: generation.num_beams,
            length_penalty: generation.length_penalty,
            early_stopping: generation.early_stopping,
            hyps: Vec::with_capacity(generation.num_beams + 1),
        }
    }

    fn normalize(&self, log_prob: f32, generated_len: usize) -> f32 {
        log_prob / (generated_len.max(1) as f32).powf(self.length_penalty)
    }

    fn worst_score(&self) -> f32 {
        self.hyps
            .iter()
            .map(|(score, _)| *score)
            .fold(f32::INFINITY, f32::min)
    }

    fn add(&mut self, tokens: Vec<i64>, log_prob: f32) {
        // the decoder start token does not count towards the length
        let score = self.normalize(log_prob, tokens.len() - 1);
        if self.hyps.len() < self.num_beams || score > self.worst_score() {
            self.hyps.push((score, tokens));
            if self.hyps.len() > self.num_beams {
                self.hyps.sort_by(|a, b| b.0.total_cmp(&a.0));
                self.hyps.truncate(self.num_beams);
            }
        }
    }

    fn is_done(&self, best_running_log_prob: f32, generated_len: usize) -> bool {
        if self.hyps.len() < self.num_beams {
            return false;
        }
        if self.early_stopping {
            return true;
        }
        self.worst_score() >= self.normalize(best_running_log_prob, generated_len)
    }

    fn best(self) -> Option<Vec<i64>> {
        self.hyps
            .into_iter()
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, tokens)| tokens)
    }
}

/// Beam search with the first generated token forced to `forced_bos`.
///
/// Each step expands every live beam, keeps the top `2 * num_beams`
/// candidates, retires EOS candidates ranked within the beam width and
/// continues with the best `num_beams` others. Finished sequences are ranked
/// by summed log probability divided by `length ^ length_penalty`.
pub fn beam_search<F>(
    generation: &GenerationConfig,
    forced_bos: i64,
    mut next_logits: F,
) -> Result<Vec<i64>, TranslateError>
where
    F: FnMut(&[i64]) -> Result<Vec<f32>, TranslateError>,
{
    let num_beams = generation.num_beams.max(1);
    let mut finished = FinishedHypotheses::new(generation);
    let mut beams = vec![Hypothesis {
        tokens: vec![generation.decoder_start_token_id, forced_bos],
        log_prob: 0.0,
    }];
    let mut done = false;

    while beams
        .first()
        .is_some_and(|beam| beam.tokens.len() < generation.max_length)
    {
        let mut candidates: Vec<(f32, usize, i64)> = Vec::with_capacity(beams.len() * 2 * num_beams);
        for (beam_idx, beam) in beams.iter().enumerate() {
            let logits = next_logits(&beam.tokens)?;
            if logits.is_empty() {
                return Err(TranslateError::Inference("decoder returned empty logits".to_string()));
            }

            let mut ranked: Vec<(usize, f32)> = log_softmax(&logits).into_iter().enumerate().collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
            ranked.truncate(2 * num_beams);
            candidates.extend(
                ranked
                    .into_iter()
                    .map(|(token, lp)| (beam.log_prob + lp, beam_idx, token as i64)),
            );
        }

        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
        candidates.truncate(2 * num_beams);

        let mut next_beams = Vec::with_capacity(num_beams);
        for (rank, (log_prob, beam_idx, token)) in candidates.into_iter().enumerate() {
            let mut tokens = beams[beam_idx].tokens.clone();
            tokens.push(token);

            if token == generation.eos_token_id {
                if rank < num_beams {
                    finished.add(tokens, log_prob);
                }
            } else {
                next_beams.push(Hypothesis { tokens, log_prob });
            }

            if next_beams.len() == num_beams {
                break;
            }
        }

        beams = next_beams;
        let Some(best) = beams.first() else {
            break;
        };
        if finished.is_done(best.log_prob, best.tokens.len() - 1) {
            done = true;
            break;
        }
    }

    if !done {
        for beam in beams {
            finished.add(beam.tokens, beam.log_prob);
        }
    }

    let mut best = finished
        .best()
        .ok_or_else(|| TranslateError::Inference("beam search produced no hypothesis".to_string()))?;
    debug!("Beam search picked {} tokens", best.len() - 1);
    Ok(best.split_off(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EOS: i64 = 2;
    const MARKER: i64 = 4;

    fn one_hot(vocab: usize, hot: usize) -> Vec<f32> {
        let mut logits = vec![0.0; vocab];
        logits[hot] = 1.0;
        logits
    }

    fn greedy() -> GenerationConfig {
        GenerationConfig {
            num_beams: 1,
            ..Default::default()
        }
    }

    /// After the marker, token 0 is likelier than token 1, but every
    /// continuation of 0 is uncertain while 1 is almost surely followed by EOS.
    fn garden_path_logits(sequence: &[i64]) -> Result<Vec<f32>, TranslateError> {
        let probs: [f32; 6] = match sequence.last() {
            Some(&MARKER) => [0.5, 0.4, 0.02, 0.04, 0.02, 0.02],
            Some(&0) => [0.14, 0.14, 0.30, 0.14, 0.14, 0.14],
            _ => [0.02, 0.02, 0.9, 0.02, 0.02, 0.02],
        };
        Ok(probs.iter().map(|p| p.ln()).collect())
    }

    #[test]
    fn forces_target_marker_and_stops_at_eos() {
        let mut script = vec![5usize, 6, 2].into_iter();
        let mut seen = Vec::new();

        let ids = greedy_generate(&greedy(), 42, |sequence| {
            seen.push(sequence.to_vec());
            Ok(one_hot(50, script.next().unwrap()))
        })
        .unwrap();

        assert_eq!(ids, vec![42, 5, 6, 2]);
        // decoder always starts from </s> followed by the forced marker
        assert_eq!(seen[0], vec![2, 42]);
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn max_length_counts_the_decoder_start_token() {
        let generation = GenerationConfig {
            max_length: 5,
            ..greedy()
        };
        let ids = greedy_generate(&generation, 42, |_| Ok(one_hot(10, 7))).unwrap();
        assert_eq!(ids, vec![42, 7, 7, 7]);
    }

    #[test]
    fn empty_logits_are_an_error() {
        let err = greedy_generate(&greedy(), 42, |_| Ok(Vec::new())).unwrap_err();
        assert!(matches!(err, TranslateError::Inference(_)));

        let err = beam_search(&GenerationConfig::default(), 42, |_| Ok(Vec::new())).unwrap_err();
        assert!(matches!(err, TranslateError::Inference(_)));
    }

    #[test]
    fn beam_search_finds_sequence_greedy_misses() {
        let greedy_ids = generate(&greedy(), MARKER, garden_path_logits).unwrap();
        assert_eq!(greedy_ids, vec![MARKER, 0, EOS]);

        let beam = GenerationConfig {
            num_beams: 2,
            ..Default::default()
        };
        let beam_ids = generate(&beam, MARKER, garden_path_logits).unwrap();
        assert_eq!(beam_ids, vec![MARKER, 1, EOS]);
    }

    #[test]
    fn beam_search_keeps_marker_first_with_checkpoint_defaults() {
        let ids = generate(&GenerationConfig::default(), MARKER, garden_path_logits).unwrap();
        assert_eq!(ids.first(), Some(&MARKER));
        assert_eq!(ids.last(), Some(&EOS));
    }

    #[test]
    fn beam_search_stops_at_max_length() {
        let generation = GenerationConfig {
            max_length: 5,
            num_beams: 3,
            ..Default::default()
        };
        let ids = beam_search(&generation, 42, |_| Ok(one_hot(10, 7))).unwrap();
        assert_eq!(ids, vec![42, 7, 7, 7]);
    }

    #[test]
    fn reads_settings_from_model_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"decoder_start_token_id": 2, "eos_token_id": 2, "pad_token_id": 1,
                "max_length": 200, "num_beams": 5, "early_stopping": true}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("generation_config.json"), r#"{"num_beams": 4}"#).unwrap();

        let config = GenerationConfig::from_model_dir(dir.path(), 200, None).unwrap();
        assert_eq!(config.max_length, 200);
        assert_eq!(config.num_beams, 4);
        assert_eq!(config.pad_token_id, 1);
        assert!(config.early_stopping);

        let capped = GenerationConfig::from_model_dir(dir.path(), 64, Some(1)).unwrap();
        assert_eq!(capped.max_length, 65);
        assert_eq!(capped.num_beams, 1);
    }

    #[test]
    fn missing_config_files_use_checkpoint_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GenerationConfig::from_model_dir(dir.path(), 200, None).unwrap();
        assert_eq!(config, GenerationConfig::default());
    }
}
