//! HTTP request handlers for the people API
//!
//! `handle_people` is a translation layer: it picks the database operation
//! named by the envelope, runs it, and maps the outcome to a status code and
//! a response envelope. All semantic validation belongs to the database.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Json as JsonExtractor,
};
use serde::Serialize;
use serde_json::json;

use people_service_core::{
    constants::PEOPLE_API_PATH,
    core::AppState,
    log_debug, log_error, log_info, log_warn,
    Action, Data, DocumentDatabase, Error, ErrorBody, Record, Request,
    Response as ResponseEnvelope, Result,
};

const FNAME: &str = "handle_people";

/// System health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` when the database is connected, `degraded` otherwise
    pub status: String,
    /// Whether the database is connected
    pub connected: bool,
    /// Service version
    pub version: String,
}

/// Custom JSON extractor that rejects with a bare status
///
/// Malformed JSON, a wrong content type and an envelope without `action`
/// are answered 400 with no body. Body read failures keep axum's status,
/// so an over-size body is 413.
pub struct JsonRequest<T>(pub T);

impl<T, S> axum::extract::FromRequest<S> for JsonRequest<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request(req: axum::extract::Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        match JsonExtractor::<T>::from_request(req, state).await {
            Ok(JsonExtractor(value)) => Ok(JsonRequest(value)),
            Err(rejection) => {
                let reason = match rejection {
                    JsonRejection::JsonDataError(_) => "invalid request envelope",
                    JsonRejection::JsonSyntaxError(_) => "malformed JSON",
                    JsonRejection::MissingJsonContentType(_) => "missing JSON content type",
                    JsonRejection::BytesRejection(_) => "failed to read request body",
                    _ => "invalid JSON request",
                };
                let status = match rejection {
                    JsonRejection::BytesRejection(_) => rejection.status(),
                    _ => StatusCode::BAD_REQUEST,
                };
                log_warn!(fname = FNAME, status = status.as_u16(), "rejected body: {}: {}", reason, rejection.body_text());
                Err(status)
            }
        }
    }
}

/// Dispatch one request envelope to the database
pub async fn handle_people(
    State(app_state): State<AppState>,
    JsonRequest(request): JsonRequest<Request>,
) -> Response {
    let action = match request.parsed_action() {
        Ok(action) => action,
        Err(e) => {
            log_warn!(fname = FNAME, action = %request.action, status = 400, "{}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    log_debug!(fname = FNAME, action = %action, "dispatching");

    match dispatch(app_state.db.as_ref(), action, request).await {
        Ok(envelope) => {
            log_info!(fname = FNAME, action = %action, status = 200);
            (StatusCode::OK, Json(envelope)).into_response()
        }
        Err(error) => error_response(&app_state, action, &error),
    }
}

/// Run the database operation an action maps to
async fn dispatch(db: &dyn DocumentDatabase, action: Action, request: Request) -> Result<ResponseEnvelope> {
    match action {
        Action::Create => {
            let obj = required_obj(request.obj)?;
            Ok(ResponseEnvelope::data(Data::Record(db.create(&obj).await?)))
        }
        Action::Read => {
            let record = db.read(request.read_id()).await?;
            Ok(ResponseEnvelope::data(Data::Record(record)))
        }
        Action::Replace => {
            let obj = required_obj(request.obj)?;
            Ok(ResponseEnvelope::data(Data::Record(db.replace(&obj).await?)))
        }
        Action::Update => {
            let conditions = request.query.and_then(|query| query.conditions).unwrap_or_default();
            let updates = request.updates.unwrap_or_default();
            let record = db.update(&conditions, &updates).await?;
            Ok(ResponseEnvelope::data(Data::Record(record)))
        }
        Action::Delete => {
            db.del(request.delete_id()).await?;
            Ok(ResponseEnvelope::empty())
        }
        Action::Find => {
            let query = request.query.unwrap_or_default();
            let records = db
                .find(
                    query.conditions.as_ref(),
                    query.fields.as_ref(),
                    query.sort.as_ref(),
                    query.cursor.as_ref(),
                )
                .await?;
            Ok(ResponseEnvelope::data(Data::Records(records)))
        }
    }
}

fn required_obj(obj: Option<Record>) -> Result<Record> {
    obj.ok_or_else(|| Error::bad_request("obj is required"))
}

/// Map a failed action to its HTTP response
///
/// The error's own status hint wins; anything without one is a 500. Bodies
/// are only sent when the environment allows it.
fn error_response(app_state: &AppState, action: Action, error: &Error) -> Response {
    let status = error
        .http_status()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        log_error!(fname = FNAME, action = %action, status = status.as_u16(), "{}", error);
    } else {
        log_warn!(fname = FNAME, action = %action, status = status.as_u16(), "{}", error);
    }

    if app_state.exposes_errors() {
        (status, Json(ResponseEnvelope::error(ErrorBody::from(error)))).into_response()
    } else {
        status.into_response()
    }
}

// System handlers

/// Health check endpoint
pub async fn health_check(State(app_state): State<AppState>) -> Json<HealthResponse> {
    let connected = app_state.db.is_connected();
    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        connected,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Root API endpoint
pub async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({
        "service": "People Service",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "actions": Action::ALL.iter().map(Action::as_str).collect::<Vec<_>>(),
        "endpoints": {
            "people": PEOPLE_API_PATH,
            "health": "/health"
        }
    }))
}
