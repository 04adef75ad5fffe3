// # signup-http
//
// HTTP surface for the student signup registry.
//
// ## Routes
//
// The route table is an immutable axum Router built once at startup;
// there is no runtime route mutation.
//
// - `POST /matr_sent`    — registration: body `{StudentId}`, returns
//   the registration receipt (display name, masked id, profile record
//   with the fresh token, never the literal student id)
// - `POST /confirm_sent` — confirmation: body `{StudentId, <allowed
//   profile fields>}`, triggers token delivery, returns `{}`
//
// ## Status Codes
//
// Every failure — client-caused or server-caused — maps to 500 with a
// human-readable `{"Error": "..."}` body. This mirrors the system this
// one replaces, which never distinguished the two in its status code;
// the inconsistency is documented rather than silently fixed. Request
// bodies are taken as raw bytes and parsed here rather than through
// an extractor, so body parse failures land in the same envelope
// instead of an extractor-shaped rejection.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde_json::{Map, Value, json};
use tracing::warn;

use signup_core::{Error, SignupEngine};

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// The signup engine all requests are dispatched to
    pub engine: Arc<SignupEngine>,
}

impl AppState {
    /// Create application state around an engine
    pub fn new(engine: Arc<SignupEngine>) -> Self {
        Self { engine }
    }
}

/// Build the registry router.
///
/// Built once at startup; the returned router is immutable.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/matr_sent", post(matr_sent))
        .route("/confirm_sent", post(confirm_sent))
        .with_state(state)
}

/// Parse a request body into a JSON object
fn parse_payload(body: &[u8]) -> Result<Map<String, Value>, Error> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Error::validation(format!("request body is not valid JSON: {}", e)))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::validation("request body must be a JSON object")),
    }
}

/// `POST /matr_sent` — registration and token issuance
async fn matr_sent(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(e) => return internal_error(&e),
    };

    match state.engine.register(&payload).await {
        Ok(receipt) => match serde_json::to_value(&receipt) {
            Ok(body) => (StatusCode::OK, Json(body)),
            Err(e) => internal_error(&Error::from(e)),
        },
        Err(e) => internal_error(&e),
    }
}

/// `POST /confirm_sent` — confirmation and token delivery
///
/// The success body is deliberately content-free: it leaks neither
/// address existence nor delivery details.
async fn confirm_sent(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(e) => return internal_error(&e),
    };

    match state.engine.confirm(&payload).await {
        Ok(()) => (StatusCode::OK, Json(json!({}))),
        Err(e) => internal_error(&e),
    }
}

/// Uniform 500 error envelope
fn internal_error(error: &Error) -> (StatusCode, Json<Value>) {
    warn!("request failed: {}", error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "Error": error.to_string() })),
    )
}
