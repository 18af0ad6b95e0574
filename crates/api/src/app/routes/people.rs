use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use tracing::instrument;

use people_core::{Entity, NewPerson};
use people_infra::PersistenceError;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", post(create_person))
}

/// `POST /api/people`
///
/// Validates the body, then stores it through a storage context opened for
/// this request only. The context is dropped on every return path.
#[instrument(skip_all)]
pub async fn create_person(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewPerson>, JsonRejection>,
) -> axum::response::Response {
    let Json(input) = match body {
        Ok(b) => b,
        Err(rejection) => {
            tracing::warn!(reason = %rejection.body_text(), "rejected unreadable person body");
            return errors::json_rejection_to_response(rejection);
        }
    };

    let person = match input.validate() {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(errors = %e, "person failed validation");
            return errors::domain_error_to_response(e);
        }
    };

    let mut ctx = services.people().context();
    ctx.add(person);

    let saved = ctx.save_changes().await.and_then(|saved| {
        saved
            .into_iter()
            .next()
            .ok_or_else(|| PersistenceError::Database("save_changes returned no row".to_string()))
    });

    match saved {
        Ok(person) => {
            tracing::info!(person_id = %person.id(), "person created");
            (StatusCode::OK, Json(person)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to persist person");
            errors::persistence_error_to_response(errors::CREATE_PERSON_FAILED, e)
        }
    }
}
