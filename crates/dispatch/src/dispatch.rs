use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use andamio_core::{AllocationError, AllocationResult, DispatchId, DispatchItemId, LineId, ProjectId};

/// Driver/vehicle identity on a dispatch note. Opaque to the allocation
/// rules; carried for the paperwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierInfo {
    pub first_name: String,
    pub last_name: String,
    pub tax_id: String,
    pub license_plate: String,
    pub notes: Option<String>,
}

impl CarrierInfo {
    fn validate(&self) -> AllocationResult<()> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(AllocationError::validation("carrier name cannot be empty"));
        }
        if self.tax_id.trim().is_empty() {
            return Err(AllocationError::validation("carrier tax id cannot be empty"));
        }
        if self.license_plate.trim().is_empty() {
            return Err(AllocationError::validation("license plate cannot be empty"));
        }
        Ok(())
    }
}

/// One quantity handed over against one allocation line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchItem {
    id: DispatchItemId,
    line_id: LineId,
    quantity: u32,
}

impl DispatchItem {
    pub fn id(&self) -> DispatchItemId {
        self.id
    }

    pub fn line_id(&self) -> LineId {
        self.line_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Entity: one physical hand-off of material to a carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    id: DispatchId,
    project_id: ProjectId,
    carrier: CarrierInfo,
    items: Vec<DispatchItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Dispatch {
    /// Build a dispatch from validated carrier data and (line, quantity)
    /// pairs. Quantity-versus-remaining checks happen in the coordinator,
    /// which holds the authoritative line state.
    pub fn new(
        id: DispatchId,
        project_id: ProjectId,
        carrier: CarrierInfo,
        items: Vec<(LineId, u32)>,
        now: DateTime<Utc>,
    ) -> AllocationResult<Self> {
        carrier.validate()?;
        if items.is_empty() {
            return Err(AllocationError::validation(
                "dispatch must contain at least one item",
            ));
        }
        if items.iter().any(|&(_, qty)| qty == 0) {
            return Err(AllocationError::validation(
                "dispatch item quantity must be positive",
            ));
        }

        let items = items
            .into_iter()
            .map(|(line_id, quantity)| DispatchItem {
                id: DispatchItemId::new(),
                line_id,
                quantity,
            })
            .collect();

        Ok(Self {
            id,
            project_id,
            carrier,
            items,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> DispatchId {
        self.id
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn carrier(&self) -> &CarrierInfo {
        &self.carrier
    }

    pub fn items(&self) -> &[DispatchItem] {
        &self.items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Replace carrier metadata. Items are immutable after creation.
    pub fn update_carrier(&mut self, carrier: CarrierInfo, now: DateTime<Utc>) -> AllocationResult<()> {
        carrier.validate()?;
        self.carrier = carrier;
        self.updated_at = now;
        Ok(())
    }
}
