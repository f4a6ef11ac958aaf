use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use andamio_core::{CategoryId, StructureId};
use andamio_structures::NewStructure;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_structure).get(list_structures))
        .route("/:id", get(get_structure).patch(update_structure))
        .route("/:id/stock", patch(set_stock))
}

pub async fn create_structure(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateStructureRequest>,
) -> axum::response::Response {
    let category_id = match body.category_id {
        Some(raw) => match raw.parse::<CategoryId>() {
            Ok(v) => v,
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "invalid category id",
                )
            }
        },
        None => CategoryId::new(),
    };

    let attrs = NewStructure {
        name: body.name,
        category_id,
        stock: body.stock,
        measure: body.measure,
        description: body.description,
    };

    let id = match services.coordinator().create_structure(attrs) {
        Ok(id) => id,
        Err(e) => return errors::allocation_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id.to_string() })),
    )
        .into_response()
}

pub async fn list_structures(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let structures = match services.coordinator().list_structures() {
        Ok(v) => v,
        Err(e) => return errors::allocation_error_to_response(e),
    };

    let mut out = Vec::with_capacity(structures.len());
    for structure in &structures {
        match services.coordinator().stock_level(structure.id()) {
            Ok(level) => out.push(dto::structure_to_json(structure, level)),
            Err(e) => return errors::allocation_error_to_response(e),
        }
    }

    (StatusCode::OK, Json(serde_json::json!({ "data": out }))).into_response()
}

pub async fn get_structure(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: StructureId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid structure id")
        }
    };

    let structure = match services.coordinator().structure(id) {
        Ok(s) => s,
        Err(e) => return errors::allocation_error_to_response(e),
    };
    let level = match services.coordinator().stock_level(id) {
        Ok(l) => l,
        Err(e) => return errors::allocation_error_to_response(e),
    };

    (StatusCode::OK, Json(dto::structure_to_json(&structure, level))).into_response()
}

pub async fn update_structure(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateStructureRequest>,
) -> axum::response::Response {
    let id: StructureId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid structure id")
        }
    };

    match services
        .coordinator()
        .update_structure(id, body.name, body.measure, body.description)
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn set_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetStockRequest>,
) -> axum::response::Response {
    let id: StructureId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid structure id")
        }
    };

    match services.coordinator().set_stock(id, body.stock) {
        Ok(()) => match services.coordinator().stock_level(id) {
            Ok(level) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "stock": level.stock,
                    "available": level.available,
                    "in_use": level.in_use,
                })),
            )
                .into_response(),
            Err(e) => errors::allocation_error_to_response(e),
        },
        Err(e) => errors::allocation_error_to_response(e),
    }
}
