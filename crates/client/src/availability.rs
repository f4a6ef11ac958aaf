use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use andamio_core::StructureId;
use andamio_structures::StockLevel;

/// Identifier of one in-flight mutation (request/response pair).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

/// The expected effect of an in-flight mutation on one structure's derived
/// figures. Signed: a reservation is `available: -n`, a dispatch deletion is
/// `in_use: -n`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDelta {
    pub structure_id: StructureId,
    pub available: i64,
    pub in_use: i64,
}

#[derive(Debug, Clone)]
struct PendingOperation {
    id: OperationId,
    deltas: Vec<StockDelta>,
}

/// Local view of structure stock levels under optimistic updates.
///
/// Displayed figures are `confirmed + Σ pending deltas`, clamped to
/// `[0, stock]`. `confirm` folds an operation's deltas into the confirmed
/// baseline; `reject` rolls the display back by simply dropping them.
#[derive(Debug, Default)]
pub struct AvailabilityView {
    confirmed: HashMap<StructureId, StockLevel>,
    pending: Vec<PendingOperation>,
}

impl AvailabilityView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the confirmed baseline with a server-provided snapshot.
    /// Pending operations stay pending; their responses are still in flight.
    pub fn load(&mut self, structure_id: StructureId, level: StockLevel) {
        self.confirmed.insert(structure_id, level);
    }

    /// Start an optimistic operation: its deltas show up in `displayed`
    /// immediately.
    pub fn begin(&mut self, deltas: Vec<StockDelta>) -> OperationId {
        let id = OperationId::new();
        self.pending.push(PendingOperation { id, deltas });
        id
    }

    /// The server accepted the operation: its effect becomes part of the
    /// confirmed baseline.
    pub fn confirm(&mut self, id: OperationId) {
        let Some(idx) = self.pending.iter().position(|op| op.id == id) else {
            return;
        };
        let op = self.pending.remove(idx);
        for delta in op.deltas {
            if let Some(level) = self.confirmed.get_mut(&delta.structure_id) {
                *level = apply_delta(*level, delta);
            }
        }
    }

    /// The server rejected the operation: drop its deltas, restoring the
    /// displayed figures.
    pub fn reject(&mut self, id: OperationId) {
        self.pending.retain(|op| op.id != id);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Figures to render: confirmed baseline plus all pending deltas.
    /// `None` until a baseline has been loaded for the structure.
    pub fn displayed(&self, structure_id: StructureId) -> Option<StockLevel> {
        let mut level = *self.confirmed.get(&structure_id)?;
        for op in &self.pending {
            for delta in &op.deltas {
                if delta.structure_id == structure_id {
                    level = apply_delta(level, *delta);
                }
            }
        }
        Some(level)
    }
}

fn apply_delta(level: StockLevel, delta: StockDelta) -> StockLevel {
    let clamp = |base: u32, d: i64| -> u32 {
        (base as i64 + d).clamp(0, level.stock as i64) as u32
    };
    StockLevel {
        stock: level.stock,
        available: clamp(level.available, delta.available),
        in_use: clamp(level.in_use, delta.in_use),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline(stock: u32, available: u32, in_use: u32) -> StockLevel {
        StockLevel {
            stock,
            available,
            in_use,
        }
    }

    #[test]
    fn pending_reservation_shows_immediately() {
        let structure_id = StructureId::new();
        let mut view = AvailabilityView::new();
        view.load(structure_id, baseline(10, 10, 0));

        view.begin(vec![StockDelta {
            structure_id,
            available: -4,
            in_use: 0,
        }]);

        assert_eq!(view.displayed(structure_id).unwrap().available, 6);
    }

    #[test]
    fn reject_rolls_the_display_back() {
        let structure_id = StructureId::new();
        let mut view = AvailabilityView::new();
        view.load(structure_id, baseline(10, 10, 0));

        let op = view.begin(vec![StockDelta {
            structure_id,
            available: -4,
            in_use: 0,
        }]);
        view.reject(op);

        assert_eq!(view.displayed(structure_id).unwrap().available, 10);
        assert_eq!(view.pending_count(), 0);
    }

    #[test]
    fn confirm_folds_into_the_baseline() {
        let structure_id = StructureId::new();
        let mut view = AvailabilityView::new();
        view.load(structure_id, baseline(10, 10, 0));

        let op = view.begin(vec![StockDelta {
            structure_id,
            available: -4,
            in_use: 3,
        }]);
        view.confirm(op);

        let level = view.displayed(structure_id).unwrap();
        assert_eq!(level.available, 6);
        assert_eq!(level.in_use, 3);
        assert_eq!(view.pending_count(), 0);
    }

    #[test]
    fn displayed_clamps_to_stock_bounds() {
        let structure_id = StructureId::new();
        let mut view = AvailabilityView::new();
        view.load(structure_id, baseline(10, 2, 0));

        view.begin(vec![StockDelta {
            structure_id,
            available: -5,
            in_use: 0,
        }]);

        assert_eq!(view.displayed(structure_id).unwrap().available, 0);
    }

    #[test]
    fn server_snapshot_replaces_baseline_but_keeps_pending() {
        let structure_id = StructureId::new();
        let mut view = AvailabilityView::new();
        view.load(structure_id, baseline(10, 10, 0));

        view.begin(vec![StockDelta {
            structure_id,
            available: -2,
            in_use: 0,
        }]);
        view.load(structure_id, baseline(10, 8, 0));

        // The pending delta still applies on top of the fresh baseline.
        assert_eq!(view.displayed(structure_id).unwrap().available, 6);
        assert_eq!(view.pending_count(), 1);
    }
}
