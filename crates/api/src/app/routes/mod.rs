use axum::Router;

pub mod dispatches;
pub mod projects;
pub mod structures;
pub mod system;

/// Router for all domain endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/structures", structures::router())
        .nest("/projects", projects::router())
        .nest("/dispatches", dispatches::router())
}
