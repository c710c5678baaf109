use crate::server::static_files::DemoPage;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::FormRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use newsprobe_core::Error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, error, warn};

pub const MESSAGE_REQUIRED: &str = "Field 'message' is required and must be non-empty.";
pub const ARTIFACTS_UNAVAILABLE: &str = "Model artifacts not found on server.";
pub const INFERENCE_FAILED: &str = "Inference failed.";

// ============================================================================
// Health and demo page
// ============================================================================

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model_loaded": state.model_loaded(),
        "model_path": state.paths.model.display().to_string(),
        "vectorizer_path": state.paths.vectorizer.display().to_string(),
    }))
}

pub async fn demo(State(state): State<AppState>) -> Html<String> {
    Html(DemoPage::new(state.model_loaded(), &state.paths.model).render())
}

// ============================================================================
// Prediction endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PredictForm {
    #[serde(default)]
    pub message: String,
}

pub async fn predict_form(
    State(state): State<AppState>,
    form: Result<Form<PredictForm>, FormRejection>,
) -> Response {
    let message = match form {
        Ok(Form(form)) => form.message,
        Err(rejection) => {
            debug!(%rejection, "Unreadable form body treated as empty");
            String::new()
        }
    };

    let outcome = run_prediction(&state, &message).await;

    // Rendered after the prediction so a lazy load shows up as loaded
    let page = DemoPage::new(state.model_loaded(), &state.paths.model);
    match outcome {
        Ok(label) => Html(page.with_prediction(&label).render()).into_response(),
        Err(err) => (err.status(), Html(page.with_error(err.message()).render())).into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub label: String,
}

pub async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PredictResponse>, ApiError> {
    let message = if has_json_content_type(&headers) {
        extract_message(&body)
    } else {
        debug!("Non-JSON request body treated as empty");
        String::new()
    };
    let label = run_prediction(&state, &message).await?;
    Ok(Json(PredictResponse { label }))
}

/// `application/json` or any `application/*+json` type
pub fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(header::CONTENT_TYPE) else {
        return false;
    };
    let Ok(content_type) = content_type.to_str() else {
        return false;
    };
    let Ok(mime) = content_type.parse::<mime_guess::Mime>() else {
        return false;
    };

    mime.type_() == "application"
        && (mime.subtype() == "json" || mime.suffix().is_some_and(|suffix| suffix == "json"))
}

/// Pull `message` out of a JSON body. Anything that is not a JSON object
/// counts as `{}`; scalar values are stringified and `null` is empty.
pub fn extract_message(body: &[u8]) -> String {
    let payload: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

    match payload.get("message") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Shared path of both prediction endpoints: validate, infer, record.
async fn run_prediction(state: &AppState, raw: &str) -> Result<String, ApiError> {
    let message = raw.trim();
    if message.is_empty() {
        metrics::counter!("newsprobe_prediction_errors_total", "kind" => "invalid_input")
            .increment(1);
        return Err(ApiError::InvalidRequest);
    }

    let start = Instant::now();
    match state.predictor.predict_blocking(message.to_string()).await {
        Ok(label) => {
            metrics::histogram!("newsprobe_prediction_latency_us")
                .record(start.elapsed().as_micros() as f64);
            metrics::counter!("newsprobe_predictions_total", "label" => label.clone())
                .increment(1);
            Ok(label)
        }
        Err(err) => {
            metrics::counter!("newsprobe_prediction_errors_total", "kind" => err.kind())
                .increment(1);
            if err.is_artifact_unavailable() {
                warn!(error = %err, "Prediction rejected, artifacts unavailable");
            } else {
                error!(error = %err, "Inference failed");
            }
            Err(ApiError::from(err))
        }
    }
}

// ============================================================================
// Metrics and fallback
// ============================================================================

pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

// ============================================================================
// Error handling
// ============================================================================

/// Client-facing prediction failure. Details stay in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    InvalidRequest,
    ArtifactsUnavailable,
    InferenceFailed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest => StatusCode::BAD_REQUEST,
            ApiError::ArtifactsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InferenceFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest => MESSAGE_REQUIRED,
            ApiError::ArtifactsUnavailable => ARTIFACTS_UNAVAILABLE,
            ApiError::InferenceFailed => INFERENCE_FAILED,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if err.is_artifact_unavailable() {
            ApiError::ArtifactsUnavailable
        } else if matches!(err, Error::InvalidInput(_)) {
            ApiError::InvalidRequest
        } else {
            ApiError::InferenceFailed
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_variants() {
        assert_eq!(extract_message(br#"{"message": "  hi there "}"#), "  hi there ");
        assert_eq!(extract_message(br#"{"message": 42}"#), "42");
        assert_eq!(extract_message(br#"{"message": 1.5}"#), "1.5");
        assert_eq!(extract_message(br#"{"message": true}"#), "True");
        assert_eq!(extract_message(br#"{"message": false}"#), "False");
        assert_eq!(extract_message(br#"{"message": null}"#), "");
        assert_eq!(extract_message(br#"{"text": "wrong key"}"#), "");
    }

    fn headers_with(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, content_type.parse().unwrap());
        headers
    }

    #[test]
    fn test_json_content_types() {
        assert!(has_json_content_type(&headers_with("application/json")));
        assert!(has_json_content_type(&headers_with("application/json; charset=utf-8")));
        assert!(has_json_content_type(&headers_with("application/vnd.api+json")));
        assert!(!has_json_content_type(&headers_with("text/plain")));
        assert!(!has_json_content_type(&headers_with("application/x-www-form-urlencoded")));
        assert!(!has_json_content_type(&headers_with("not a mime type")));
        assert!(!has_json_content_type(&HeaderMap::new()));
    }

    #[test]
    fn test_extract_message_non_object_bodies() {
        assert_eq!(extract_message(b""), "");
        assert_eq!(extract_message(b"not json"), "");
        assert_eq!(extract_message(br#"["message"]"#), "");
        assert_eq!(extract_message(br#""message""#), "");
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            ApiError::from(Error::artifact_not_found("/x/model.json")),
            ApiError::ArtifactsUnavailable
        );
        assert_eq!(
            ApiError::from(Error::artifact_corrupt("/x/model.json", "truncated")),
            ApiError::ArtifactsUnavailable
        );
        assert_eq!(
            ApiError::from(Error::invalid_input("empty")),
            ApiError::InvalidRequest
        );
        assert_eq!(
            ApiError::from(Error::inference("width mismatch")),
            ApiError::InferenceFailed
        );
        assert_eq!(
            ApiError::from(Error::internal("boom")),
            ApiError::InferenceFailed
        );
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ApiError::InvalidRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::ArtifactsUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::InferenceFailed.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
