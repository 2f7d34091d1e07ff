use std::path::Path;
use tokenizers::Tokenizer;
use tracing::debug;

use super::interface::TranslateError;

/// M2M100 tokenizer backed by a Hugging Face `tokenizer.json`.
///
/// Source text is framed as `__src__ <tokens> </s>`; language markers are
/// looked up as added tokens of the form `__xx__`.
pub struct M2M100Tokenizer {
    tokenizer: Tokenizer,
    eos_token_id: i64,
    pad_token_id: i64,
}

impl M2M100Tokenizer {
    pub fn from_file(path: &Path) -> Result<Self, TranslateError> {
        if !path.exists() {
            return Err(TranslateError::ModelFiles(format!(
                "tokenizer.json not found at {}",
                path.display()
            )));
        }

        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| TranslateError::Tokenizer(format!("failed to load {}: {e}", path.display())))?;

        Ok(Self::from_tokenizer(tokenizer))
    }

    pub fn from_tokenizer(tokenizer: Tokenizer) -> Self {
        let eos_token_id = tokenizer.token_to_id("</s>").map(i64::from).unwrap_or(2);
        let pad_token_id = tokenizer.token_to_id("<pad>").map(i64::from).unwrap_or(1);
        Self {
            tokenizer,
            eos_token_id,
            pad_token_id,
        }
    }

    pub fn lang_token(code: &str) -> String {
        format!("__{code}__")
    }

    /// Token id of the `__code__` language marker
    pub fn lang_id(&self, code: &str) -> Result<i64, TranslateError> {
        self.tokenizer
            .token_to_id(&Self::lang_token(code))
            .map(i64::from)
            .ok_or_else(|| TranslateError::UnsupportedLanguage(code.to_string()))
    }

    /// Encode `text` with the source-language marker prefix and EOS suffix
    pub fn encode_source(&self, text: &str, src_lang: &str) -> Result<Vec<i64>, TranslateError> {
        let lang_id = self.lang_id(src_lang)?;

        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| TranslateError::Tokenizer(format!("failed to encode text: {e}")))?;

        let mut ids = Vec::with_capacity(encoding.get_ids().len() + 2);
        ids.push(lang_id);
        ids.extend(encoding.get_ids().iter().map(|&id| i64::from(id)));
        ids.push(self.eos_token_id);

        debug!("Encoded {} source tokens ({})", ids.len(), src_lang);
        Ok(ids)
    }

    /// Decode generated ids, dropping special and language tokens
    pub fn decode(&self, ids: &[i64]) -> Result<String, TranslateError> {
        let ids: Vec<u32> = ids
            .iter()
            .filter(|&&id| id != self.eos_token_id && id != self.pad_token_id)
            .filter_map(|&id| u32::try_from(id).ok())
            .collect();

        let text = self
            .tokenizer
            .decode(&ids, true)
            .map_err(|e| TranslateError::Tokenizer(format!("failed to decode ids: {e}")))?;

        Ok(text.trim().to_string())
    }

    /// Decode generator output, which starts with the forced target marker
    pub fn decode_generated(&self, generated: &[i64]) -> Result<String, TranslateError> {
        self.decode(generated.get(1..).unwrap_or_default())
    }
}

/// Word-level stand-in with the M2M100 special token layout
#[cfg(test)]
pub(crate) fn toy_tokenizer() -> M2M100Tokenizer {
    use std::str::FromStr;

    let json = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            {"id": 1, "content": "<pad>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": 2, "content": "</s>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": 7, "content": "__en__", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": 8, "content": "__fr__", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
        ],
        "normalizer": null,
        "pre_tokenizer": {"type": "WhitespaceSplit"},
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {
                "<s>": 0, "<pad>": 1, "</s>": 2, "<unk>": 3,
                "hello": 4, "world": 5, "bonjour": 6, "__en__": 7, "__fr__": 8
            },
            "unk_token": "<unk>"
        }
    }"#;
    M2M100Tokenizer::from_tokenizer(Tokenizer::from_str(json).unwrap())
}
