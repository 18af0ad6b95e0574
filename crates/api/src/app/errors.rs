use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use people_core::{DomainError, FieldErrors};
use people_infra::PersistenceError;

/// Field key used for errors that concern the request body as a whole.
pub const BODY_FIELD: &str = "$";

pub const CREATE_PERSON_FAILED: &str = "An error occurred while creating the person";

/// `400 Bad Request` with the field -> messages mapping as the body.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(errors) => field_errors_response(StatusCode::BAD_REQUEST, errors),
    }
}

/// Body could not be read as JSON of the expected shape.
///
/// Syntax and type errors become `400` under the `$` key; other rejections
/// (e.g. a missing `Content-Type`) keep their own status.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    let status = match &rejection {
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => StatusCode::BAD_REQUEST,
        other => other.status(),
    };
    let mut errors = FieldErrors::new();
    errors.add(BODY_FIELD, rejection.body_text());
    field_errors_response(status, errors)
}

/// `500` with a generic error and the raw storage message.
pub fn persistence_error_to_response(
    error: &'static str,
    err: PersistenceError,
) -> axum::response::Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, error, err.to_string())
}

pub fn json_error(
    status: StatusCode,
    error: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": error,
            "message": message.into(),
        })),
    )
        .into_response()
}

fn field_errors_response(status: StatusCode, errors: FieldErrors) -> axum::response::Response {
    (status, axum::Json(errors)).into_response()
}
