use axum::Router;

pub mod people;
pub mod system;

/// Router for everything mounted under `/api`.
pub fn router() -> Router {
    Router::new().nest("/people", people::router())
}
