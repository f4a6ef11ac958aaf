use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use andamio_core::{AllocationError, AllocationResult, CategoryId, StructureId};

/// Attributes for creating a structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStructure {
    pub name: String,
    pub category_id: CategoryId,
    pub stock: u32,
    pub measure: Option<String>,
    pub description: Option<String>,
}

/// Entity: one pool of identical rentable units.
///
/// `stock` is the total number of units owned. It changes only through
/// explicit stock-count edits (`set_stock`); reservations and dispatches
/// never touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    id: StructureId,
    name: String,
    category_id: CategoryId,
    stock: u32,
    measure: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Structure {
    pub fn new(id: StructureId, attrs: NewStructure, now: DateTime<Utc>) -> AllocationResult<Self> {
        if attrs.name.trim().is_empty() {
            return Err(AllocationError::validation("name cannot be empty"));
        }

        Ok(Self {
            id,
            name: attrs.name,
            category_id: attrs.category_id,
            stock: attrs.stock,
            measure: attrs.measure,
            description: attrs.description,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> StructureId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn measure(&self) -> Option<&str> {
        self.measure.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Edit descriptive metadata. Quantities are untouched.
    pub fn update_details(
        &mut self,
        name: Option<String>,
        measure: Option<String>,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> AllocationResult<()> {
        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(AllocationError::validation("name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(measure) = measure {
            self.measure = Some(measure);
        }
        if let Some(description) = description {
            self.description = Some(description);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Explicit stock-count edit.
    ///
    /// `reserved` is the quantity currently committed to locked projects;
    /// stock can never shrink below outstanding commitments.
    pub fn set_stock(
        &mut self,
        new_stock: u32,
        reserved: u32,
        now: DateTime<Utc>,
    ) -> AllocationResult<()> {
        if new_stock < reserved {
            return Err(AllocationError::Capacity {
                requested: new_stock,
                reserved,
            });
        }
        self.stock = new_stock;
        self.updated_at = now;
        Ok(())
    }
}

/// Derived quantity snapshot for one structure.
///
/// `available = stock - reserved` and `in_use` are computed from the
/// allocation state at read time so they cannot drift from first principles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub stock: u32,
    pub available: u32,
    pub in_use: u32,
}

impl StockLevel {
    /// Compute the snapshot from the authoritative figures.
    ///
    /// `reserved` must already be capped at `stock` by the write-path ceiling
    /// checks; the saturating subtraction is a backstop, not a policy.
    pub fn compute(stock: u32, reserved: u32, in_use: u32) -> Self {
        Self {
            stock,
            available: stock.saturating_sub(reserved),
            in_use,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_structure(stock: u32) -> Structure {
        Structure::new(
            StructureId::new(),
            NewStructure {
                name: "Marco 1.50m".to_string(),
                category_id: CategoryId::new(),
                stock,
                measure: Some("1.50m".to_string()),
                description: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn create_rejects_empty_name() {
        let err = Structure::new(
            StructureId::new(),
            NewStructure {
                name: "  ".to_string(),
                category_id: CategoryId::new(),
                stock: 10,
                measure: None,
                description: None,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, AllocationError::Validation(_)));
    }

    #[test]
    fn set_stock_rejects_shrinking_below_reserved() {
        let mut s = test_structure(10);
        let err = s.set_stock(3, 4, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            AllocationError::Capacity {
                requested: 3,
                reserved: 4
            }
        );
        assert_eq!(s.stock(), 10);
    }

    #[test]
    fn set_stock_allows_exactly_the_reserved_amount() {
        let mut s = test_structure(10);
        s.set_stock(4, 4, Utc::now()).unwrap();
        assert_eq!(s.stock(), 4);
    }

    #[test]
    fn update_details_does_not_touch_stock() {
        let mut s = test_structure(7);
        s.update_details(Some("Marco 2.00m".to_string()), None, None, Utc::now())
            .unwrap();
        assert_eq!(s.name(), "Marco 2.00m");
        assert_eq!(s.stock(), 7);
    }

    #[test]
    fn stock_level_derives_available() {
        let level = StockLevel::compute(10, 4, 3);
        assert_eq!(level.stock, 10);
        assert_eq!(level.available, 6);
        assert_eq!(level.in_use, 3);
    }

    proptest! {
        /// Property: for any stock/reserved pair, 0 <= available <= stock.
        #[test]
        fn available_is_bounded(stock in 0u32..10_000, reserved in 0u32..20_000) {
            let level = StockLevel::compute(stock, reserved, 0);
            prop_assert!(level.available <= level.stock);
        }
    }
}
