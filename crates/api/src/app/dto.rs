use serde::Deserialize;
use serde_json::json;

use andamio_dispatch::{CarrierInfo, Dispatch};
use andamio_projects::Project;
use andamio_structures::{StockLevel, Structure};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateStructureRequest {
    pub name: String,
    /// Opaque taxonomy reference; generated when the caller has none.
    pub category_id: Option<String>,
    pub stock: u32,
    pub measure: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStructureRequest {
    pub name: Option<String>,
    pub measure: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    pub stock: u32,
}

#[derive(Debug, Deserialize)]
pub struct AddLineRequest {
    pub structure_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct DispatchItemRequest {
    pub line_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct CreateDispatchRequest {
    pub project_id: String,
    pub first_name: String,
    pub last_name: String,
    pub tax_id: String,
    pub license_plate: String,
    pub notes: Option<String>,
    pub items: Vec<DispatchItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDispatchRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub tax_id: Option<String>,
    pub license_plate: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DispatchListQuery {
    pub project_id: Option<String>,
}

impl UpdateDispatchRequest {
    /// Merge the patch onto the dispatch's current carrier.
    pub fn merged_onto(self, current: &CarrierInfo) -> CarrierInfo {
        CarrierInfo {
            first_name: self.first_name.unwrap_or_else(|| current.first_name.clone()),
            last_name: self.last_name.unwrap_or_else(|| current.last_name.clone()),
            tax_id: self.tax_id.unwrap_or_else(|| current.tax_id.clone()),
            license_plate: self
                .license_plate
                .unwrap_or_else(|| current.license_plate.clone()),
            notes: self.notes.or_else(|| current.notes.clone()),
        }
    }
}

// -------------------------
// Response mapping
// -------------------------

pub fn structure_to_json(structure: &Structure, level: StockLevel) -> serde_json::Value {
    json!({
        "id": structure.id().to_string(),
        "name": structure.name(),
        "category_id": structure.category_id().to_string(),
        "measure": structure.measure(),
        "description": structure.description(),
        "stock": level.stock,
        "available": level.available,
        "in_use": level.in_use,
        "created_at": structure.created_at(),
        "updated_at": structure.updated_at(),
    })
}

pub fn project_to_json(project: &Project) -> serde_json::Value {
    json!({
        "id": project.id().to_string(),
        "status": project.status(),
        "lines": project.lines().iter().map(|line| json!({
            "id": line.id().to_string(),
            "structure_id": line.structure_id().to_string(),
            "quantity": line.quantity(),
            "dispatched_quantity": line.dispatched_quantity(),
            "remaining": line.remaining(),
        })).collect::<Vec<_>>(),
        "created_at": project.created_at(),
        "updated_at": project.updated_at(),
    })
}

pub fn dispatch_to_json(dispatch: &Dispatch) -> serde_json::Value {
    let carrier = dispatch.carrier();
    json!({
        "id": dispatch.id().to_string(),
        "project_id": dispatch.project_id().to_string(),
        "first_name": carrier.first_name,
        "last_name": carrier.last_name,
        "tax_id": carrier.tax_id,
        "license_plate": carrier.license_plate,
        "notes": carrier.notes,
        "items": dispatch.items().iter().map(|item| json!({
            "id": item.id().to_string(),
            "line_id": item.line_id().to_string(),
            "quantity": item.quantity(),
        })).collect::<Vec<_>>(),
        "total_quantity": dispatch.total_quantity(),
        "created_at": dispatch.created_at(),
        "updated_at": dispatch.updated_at(),
    })
}
