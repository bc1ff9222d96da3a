//! Axum routes for the translation front-end.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{FromRequest, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::translator::Translator;
use crate::types::config::Config;
use crate::types::requests::TranslateInput;
use crate::types::responses::TranslateOutput;
use crate::{TranslatorError, TranslatorResult};

/// Shared state for all handlers.
pub struct AppState {
    /// Translator used by `POST /translate`.
    pub translator: Arc<Translator>,
    /// Source language applied to every request.
    pub source_lang: String,
    /// Offered target languages (code -> display name).
    pub languages: RwLock<BTreeMap<String, String>>,
}

impl AppState {
    pub fn new(translator: Arc<Translator>) -> Self {
        let server = &translator.config().server;
        Self {
            source_lang: server.source_lang.clone(),
            languages: RwLock::new(server.languages.clone()),
            translator,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranslateBody {
    text: Value,
    #[serde(alias = "targetLang")]
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct TranslateForm {
    text: String,
    #[serde(alias = "targetLang")]
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct LanguageBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    name: String,
}

/// Builds the router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/translate", post(translate))
        .route("/languages", get(list_languages).post(add_language))
        .route("/health", get(health))
        .with_state(Arc::new(state))
}

/// Runs the front-end until Ctrl-C.
pub async fn serve(config: Config) -> TranslatorResult<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let translator = Arc::new(Translator::from_config(config)?);
    let router = build_router(AppState::new(Arc::clone(&translator)));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Translation server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
        .map_err(|e| TranslatorError::Server(e.to_string()))?;

    translator.close().await
}

fn status_for(err: &TranslatorError) -> StatusCode {
    match err {
        TranslatorError::Validation(_) => StatusCode::BAD_REQUEST,
        TranslatorError::Provider(_) | TranslatorError::RetriesExhausted { .. } => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &TranslatorError) -> Response {
    (status_for(err), Json(json!({ "error": err.to_string() }))).into_response()
}

/// POST /translate
///
/// Accepts a JSON body, or a form-encoded body with a single `text` field.
async fn translate(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let body = match read_translate_body(request).await {
        Ok(body) => body,
        Err(e) => return error_response(&e),
    };

    let input = match TranslateInput::from_json(body.text) {
        Ok(input) => input,
        Err(e) => return error_response(&e),
    };

    match state
        .translator
        .translate(input, &state.source_lang, &body.target_lang)
        .await
    {
        Ok(TranslateOutput::Single(translation)) => {
            (StatusCode::OK, Json(json!({ "translation": translation }))).into_response()
        }
        Ok(TranslateOutput::Batch(result)) => {
            let items = result.into_input_order();
            (StatusCode::OK, Json(json!({ "translation": items }))).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Translation request failed");
            error_response(&e)
        }
    }
}

async fn read_translate_body(request: Request) -> TranslatorResult<TranslateBody> {
    if is_form(request.headers()) {
        let Form(form) = Form::<TranslateForm>::from_request(request, &())
            .await
            .map_err(|rejection| TranslatorError::validation(rejection.body_text()))?;
        return Ok(TranslateBody {
            text: Value::String(form.text),
            target_lang: form.target_lang,
        });
    }

    let Json(value) = Json::<Value>::from_request(request, &())
        .await
        .map_err(|rejection| TranslatorError::validation(rejection.body_text()))?;
    serde_json::from_value(value).map_err(|e| TranslatorError::validation(e.to_string()))
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// GET /languages
async fn list_languages(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, String>> {
    Json(state.languages.read().await.clone())
}

/// POST /languages
async fn add_language(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LanguageBody>,
) -> (StatusCode, Json<Value>) {
    let code = body.code.trim();
    let name = body.name.trim();
    if code.is_empty() || name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "both code and name are required" })),
        );
    }

    state
        .languages
        .write()
        .await
        .insert(code.to_string(), name.to_string());
    tracing::info!(code, name, "Language added");

    (StatusCode::CREATED, Json(json!({ "code": code, "name": name })))
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
