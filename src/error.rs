use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::scoring::ScoreError;
use crate::translate::TranslateError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error("BLEU scoring failed: {0}")]
    Score(#[from] ScoreError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnknownLanguage(_) => StatusCode::BAD_REQUEST,
            AppError::Translate(TranslateError::UnsupportedLanguage(_)) => StatusCode::BAD_REQUEST,
            AppError::Translate(TranslateError::Http(_) | TranslateError::Backend(_)) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Translate(_) | AppError::Score(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(
            AppError::UnknownLanguage("Klingon".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(TranslateError::UnsupportedLanguage("xx".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(TranslateError::Backend("down".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(TranslateError::Inference("nan".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(ScoreError::NoReferences).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
