use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::error::AppError;
use crate::handlers::{self, TranslationForm, TranslationOutcome};
use crate::languages::{self, LANGUAGES};
use crate::page::{self, PageMessage};
use crate::scoring::{sentence_pair_bleu, BleuScore};
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Page
        .route("/", get(index).post(submit))

        // Health check
        .route("/api/health", get(health_check))

        // REST API routes
        .route("/api/languages", get(list_languages))
        .route("/api/translate", post(translate))
        .route("/api/score", post(score))
}

/// Full application with middleware and state attached
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Html<String> {
    let default = languages::default_language();
    Html(page::render_page(
        &TranslationForm::default(),
        default,
        default,
        &PageMessage::None,
    ))
}

async fn submit(State(state): State<AppState>, Form(form): Form<TranslationForm>) -> Response {
    // Keep whatever the user picked selected, falling back to the first entry
    let (source, target) = handlers::resolve_pair(&form).unwrap_or_else(|_| {
        let default = languages::default_language();
        (default, default)
    });

    match handlers::translate_and_score(&state, &form).await {
        Ok(outcome) => Html(page::render_page(
            &form,
            source,
            target,
            &PageMessage::Outcome(&outcome),
        ))
        .into_response(),
        Err(e) => (
            e.status_code(),
            Html(page::render_page(
                &form,
                source,
                target,
                &PageMessage::Error(e.to_string()),
            )),
        )
            .into_response(),
    }
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let backend_healthy = state.translator.health_check().await;
    Json(json!({
        "status": "ok",
        "backend": state.translator.name(),
        "model": state.config.translator_config.model_name,
        "backend_healthy": backend_healthy,
        "started_at": state.started_at,
    }))
}

async fn list_languages() -> Json<Value> {
    Json(json!(LANGUAGES))
}

async fn translate(
    State(state): State<AppState>,
    Json(form): Json<TranslationForm>,
) -> Result<Json<Value>, AppError> {
    match handlers::translate_and_score(&state, &form).await? {
        TranslationOutcome::EmptyInput => Ok(Json(json!({
            "status": "empty_input",
            "message": page::EMPTY_INPUT_MESSAGE,
        }))),
        TranslationOutcome::Translated { text, bleu } => {
            let mut body = json!({
                "status": "ok",
                "translated_text": text,
            });
            if let Some(bleu) = bleu {
                body["bleu_score"] = json!(bleu.score);
            }
            Ok(Json(body))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScoreRequest {
    reference: String,
    candidate: String,
}

async fn score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<BleuScore>, AppError> {
    let score = sentence_pair_bleu(&request.reference, &request.candidate, &state.bleu_options)?;
    info!("{}", score);
    Ok(Json(score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_manager::Config;
    use crate::translate::mock::{EchoTranslator, FailingTranslator};
    use crate::translate::Translator;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(translator: Arc<dyn Translator>) -> Router {
        build_app(AppState::with_translator(Config::default(), translator))
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn index_renders_the_form() {
        let app = app_with(Arc::new(EchoTranslator::default()));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains(page::TITLE));
        assert!(html.contains("Translation Settings"));
        assert!(html.contains("Select source language"));
        assert!(html.contains(r#"value="Arabic" data-code="ar" selected"#));
        assert!(html.contains("Translate</button>"));
    }

    #[tokio::test]
    async fn form_submit_shows_translation_and_score() {
        let app = app_with(Arc::new(EchoTranslator::default()));
        let response = app
            .oneshot(form_request(
                "source_lang=English&target_lang=German&text=one+two+three+four&reference=de%3Aone+two+three+four",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("Translated text:"));
        assert!(html.contains("de:one two three four"));
        assert!(html.contains("BLEU score: 100.00"));
        assert!(html.contains(r#"value="German" data-code="de" selected"#));
    }

    #[tokio::test]
    async fn form_submit_with_empty_text_asks_for_input() {
        let translator = Arc::new(EchoTranslator::default());
        let app = app_with(translator.clone());
        let response = app
            .oneshot(form_request("source_lang=English&target_lang=French&text=&reference="))
            .await
            .unwrap();

        let html = body_string(response).await;
        assert!(html.contains(page::EMPTY_INPUT_MESSAGE));
        assert!(!html.contains("Translated text:"));
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn form_submit_renders_backend_failure() {
        let app = app_with(Arc::new(FailingTranslator));
        let response = app
            .oneshot(form_request("source_lang=English&target_lang=French&text=Hello"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_string(response).await.contains("model crashed"));
    }

    #[tokio::test]
    async fn languages_endpoint_lists_table_in_order() {
        let app = app_with(Arc::new(EchoTranslator::default()));
        let response = app
            .oneshot(Request::builder().uri("/api/languages").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 13);
        assert_eq!(list[0], json!({"name": "Arabic", "code": "ar"}));
        assert_eq!(list[12], json!({"name": "English", "code": "en"}));
    }

    #[tokio::test]
    async fn api_translate_returns_text_and_score() {
        let app = app_with(Arc::new(EchoTranslator::default()));
        let response = app
            .oneshot(json_request(
                "/api/translate",
                json!({
                    "source_lang": "en",
                    "target_lang": "French",
                    "text": "the cat sat on the mat",
                    "reference": "fr:the cat sat on the mat"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["translated_text"], "fr:the cat sat on the mat");
        assert!((body["bleu_score"].as_f64().unwrap() - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn api_translate_without_reference_omits_score() {
        let app = app_with(Arc::new(EchoTranslator::default()));
        let response = app
            .oneshot(json_request(
                "/api/translate",
                json!({"source_lang": "English", "target_lang": "Japanese", "text": "Hi"}),
            ))
            .await
            .unwrap();

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["translated_text"], "ja:Hi");
        assert!(body.get("bleu_score").is_none());
    }

    #[tokio::test]
    async fn api_translate_reports_empty_input() {
        let translator = Arc::new(EchoTranslator::default());
        let app = app_with(translator.clone());
        let response = app
            .oneshot(json_request("/api/translate", json!({"text": ""})))
            .await
            .unwrap();

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "empty_input");
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn api_translate_rejects_unknown_language() {
        let app = app_with(Arc::new(EchoTranslator::default()));
        let response = app
            .oneshot(json_request(
                "/api/translate",
                json!({"source_lang": "English", "target_lang": "Klingon", "text": "Hi"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"], "unknown language: Klingon");
    }

    #[tokio::test]
    async fn api_score_returns_breakdown() {
        let app = app_with(Arc::new(EchoTranslator::default()));
        let response = app
            .oneshot(json_request(
                "/api/score",
                json!({"reference": "one two three four", "candidate": "one two three four"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert!((body["score"].as_f64().unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(body["sys_len"], 4);
        assert_eq!(body["ref_len"], 4);
    }

    #[tokio::test]
    async fn health_reports_backend() {
        let app = app_with(Arc::new(EchoTranslator::default()));
        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["backend"], "echo");
        assert_eq!(body["model"], "facebook/m2m100_418M");
        assert_eq!(body["backend_healthy"], true);
        assert!(body["started_at"].is_string());
    }
}
