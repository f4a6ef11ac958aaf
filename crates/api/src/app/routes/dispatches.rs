use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use andamio_core::{DispatchId, LineId, ProjectId};
use andamio_dispatch::CarrierInfo;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_dispatch).get(list_dispatches))
        .route(
            "/:id",
            get(get_dispatch).patch(update_dispatch).delete(delete_dispatch),
        )
}

pub async fn create_dispatch(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateDispatchRequest>,
) -> axum::response::Response {
    let project_id: ProjectId = match body.project_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id")
        }
    };

    let mut items: Vec<(LineId, u32)> = Vec::with_capacity(body.items.len());
    for item in &body.items {
        match item.line_id.parse::<LineId>() {
            Ok(line_id) => items.push((line_id, item.quantity)),
            Err(_) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid line id")
            }
        }
    }

    let carrier = CarrierInfo {
        first_name: body.first_name,
        last_name: body.last_name,
        tax_id: body.tax_id,
        license_plate: body.license_plate,
        notes: body.notes,
    };

    match services.coordinator().create_dispatch(project_id, carrier, items) {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn list_dispatches(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::DispatchListQuery>,
) -> axum::response::Response {
    let Some(raw) = query.project_id else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "project_id query parameter is required",
        );
    };
    let project_id: ProjectId = match raw.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id")
        }
    };

    match services.coordinator().dispatches_for_project(project_id) {
        Ok(dispatches) => {
            let data: Vec<_> = dispatches.iter().map(dto::dispatch_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "data": data }))).into_response()
        }
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn get_dispatch(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DispatchId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid dispatch id")
        }
    };

    match services.coordinator().dispatch(id) {
        Ok(dispatch) => (StatusCode::OK, Json(dto::dispatch_to_json(&dispatch))).into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn update_dispatch(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateDispatchRequest>,
) -> axum::response::Response {
    let id: DispatchId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid dispatch id")
        }
    };

    let current = match services.coordinator().dispatch(id) {
        Ok(d) => d,
        Err(e) => return errors::allocation_error_to_response(e),
    };
    let carrier = body.merged_onto(current.carrier());

    match services.coordinator().update_dispatch(id, carrier) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn delete_dispatch(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DispatchId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid dispatch id")
        }
    };

    match services.coordinator().delete_dispatch(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}
