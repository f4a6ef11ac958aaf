use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use andamio_core::AllocationError;
use andamio_projects::ProjectStatus;

pub fn allocation_error_to_response(err: AllocationError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        AllocationError::Capacity { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "capacity_error", message)
        }
        AllocationError::OverAllocation { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "over_allocation", message)
        }
        AllocationError::DuplicateAllocation => {
            json_error(StatusCode::CONFLICT, "duplicate_allocation", message)
        }
        AllocationError::BelowDispatched { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "below_dispatched", message)
        }
        AllocationError::HasDispatches => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "has_dispatches", message)
        }
        AllocationError::InsufficientRemaining { .. } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "insufficient_remaining",
            message,
        ),
        AllocationError::InvalidTransition { .. } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_transition",
            message,
        ),
        AllocationError::Validation(_) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", message)
        }
        AllocationError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        AllocationError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", message),
        AllocationError::Internal(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_status(s: &str) -> Result<ProjectStatus, axum::response::Response> {
    match s.to_lowercase().as_str() {
        "draft" => Ok(ProjectStatus::Draft),
        "active" => Ok(ProjectStatus::Active),
        "in_progress" => Ok(ProjectStatus::InProgress),
        "finished" => Ok(ProjectStatus::Finished),
        "deleted" => Ok(ProjectStatus::Deleted),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "invalid_status",
            "status must be one of: draft, active, in_progress, finished, deleted",
        )),
    }
}
