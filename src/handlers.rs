use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::languages::{self, Language};
use crate::scoring::{sentence_pair_bleu, BleuScore};
use crate::state::AppState;
use crate::translate::TranslateRequest;

/// Input state of the page at the moment the Translate button is pressed.
///
/// Language fields accept a display name or a code; an empty value selects
/// the first table entry, like an untouched select box.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationForm {
    #[serde(default)]
    pub source_lang: String,
    #[serde(default)]
    pub target_lang: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranslationOutcome {
    /// No text was entered; the translator was not called
    EmptyInput,
    Translated {
        text: String,
        bleu: Option<BleuScore>,
    },
}

fn resolve_language(value: &str) -> Result<&'static Language, AppError> {
    if value.is_empty() {
        return Ok(languages::default_language());
    }
    languages::resolve(value).ok_or_else(|| AppError::UnknownLanguage(value.to_string()))
}

/// Resolve the selected source and target languages
pub fn resolve_pair(form: &TranslationForm) -> Result<(&'static Language, &'static Language), AppError> {
    Ok((
        resolve_language(&form.source_lang)?,
        resolve_language(&form.target_lang)?,
    ))
}

/// Run one translate-and-score action
pub async fn translate_and_score(
    state: &AppState,
    form: &TranslationForm,
) -> Result<TranslationOutcome, AppError> {
    if form.text.is_empty() {
        info!("Translate pressed with empty input");
        return Ok(TranslationOutcome::EmptyInput);
    }

    let (source, target) = resolve_pair(form)?;
    let request_id = state.generate_request_id();
    info!(
        "[{}] Translating {} chars {} -> {} with {}",
        request_id,
        form.text.chars().count(),
        source.code,
        target.code,
        state.translator.name()
    );

    let text = state
        .translator
        .translate(TranslateRequest {
            text: form.text.clone(),
            source_lang: source.code.to_string(),
            target_lang: target.code.to_string(),
        })
        .await
        .map_err(|e| {
            warn!("[{}] Translation failed: {}", request_id, e);
            e
        })?;

    let bleu = if form.reference.is_empty() {
        None
    } else {
        let score = sentence_pair_bleu(&form.reference, &text, &state.bleu_options)?;
        info!("[{}] {}", request_id, score);
        Some(score)
    };

    Ok(TranslationOutcome::Translated { text, bleu })
}
