use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use andamio_core::{LineId, ProjectId, StructureId};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_project))
        .route("/:id", get(get_project).delete(delete_project))
        .route("/:id/activate", post(activate_project))
        .route("/:id/status", post(update_status))
        .route("/:id/lines", post(add_line))
        .route("/lines/:line_id", patch(set_quantity).delete(remove_line))
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.coordinator().create_project() {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": id.to_string(), "status": "draft" })),
        )
            .into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProjectId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id")
        }
    };

    match services.coordinator().project(id) {
        Ok(project) => (StatusCode::OK, Json(dto::project_to_json(&project))).into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn activate_project(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProjectId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id")
        }
    };

    match services.coordinator().activate_project(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateStatusRequest>,
) -> axum::response::Response {
    let id: ProjectId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id")
        }
    };
    let status = match errors::parse_status(&body.status) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match services.coordinator().update_status(id, status) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn delete_project(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProjectId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id")
        }
    };

    match services.coordinator().delete_project(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn add_line(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AddLineRequest>,
) -> axum::response::Response {
    let project_id: ProjectId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id")
        }
    };
    let structure_id: StructureId = match body.structure_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid structure id")
        }
    };

    match services
        .coordinator()
        .add_line(project_id, structure_id, body.quantity)
    {
        Ok(line_id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": line_id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn set_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Path(line_id): Path<String>,
    Json(body): Json<dto::SetQuantityRequest>,
) -> axum::response::Response {
    let line_id: LineId = match line_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid line id")
        }
    };

    match services.coordinator().set_quantity(line_id, body.quantity) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn remove_line(
    Extension(services): Extension<Arc<AppServices>>,
    Path(line_id): Path<String>,
) -> axum::response::Response {
    let line_id: LineId = match line_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid line id")
        }
    };

    match services.coordinator().remove_line(line_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}
