//! The rules layer gluing the structure ledger, project allocation sets, and
//! dispatch ledger together.

use std::collections::HashMap;

use chrono::Utc;

use andamio_core::{
    AllocationError, AllocationResult, DispatchId, LineId, ProjectId, StructureId,
};
use andamio_dispatch::{CarrierInfo, Dispatch};
use andamio_projects::{Project, ProjectStatus};
use andamio_structures::{NewStructure, StockLevel, Structure};

use crate::store::InMemoryStore;

/// Single authoritative boundary for all quantity-coupled mutations.
///
/// Every operation is synchronous and atomic: it validates against
/// authoritative state under the store's write lock and applies only after
/// all checks pass. Business-rule rejections are returned as-is and are not
/// retried (identical inputs fail identically).
#[derive(Debug, Default)]
pub struct AllocationCoordinator {
    store: InMemoryStore,
}

impl AllocationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------
    // Structure ledger
    // -------------------------

    pub fn create_structure(&self, attrs: NewStructure) -> AllocationResult<StructureId> {
        let id = StructureId::new();
        self.store.write(|state| {
            let structure = Structure::new(id, attrs, Utc::now())?;
            state.insert_structure(structure);
            Ok(())
        })?;
        tracing::info!(structure_id = %id, "structure created");
        Ok(id)
    }

    pub fn structure(&self, id: StructureId) -> AllocationResult<Structure> {
        self.store.read(|state| state.structure(id).cloned())
    }

    pub fn list_structures(&self) -> AllocationResult<Vec<Structure>> {
        self.store.read(|state| {
            let mut all: Vec<Structure> = state.structures().cloned().collect();
            all.sort_by(|a, b| a.name().cmp(b.name()));
            Ok(all)
        })
    }

    /// Current `{stock, available, in_use}` snapshot. Advisory for UI
    /// rendering; the authoritative check always happens at write time.
    pub fn stock_level(&self, id: StructureId) -> AllocationResult<StockLevel> {
        self.store.read(|state| state.stock_level(id))
    }

    /// Explicit stock-count edit; the only operation that writes `stock`.
    pub fn set_stock(&self, id: StructureId, new_stock: u32) -> AllocationResult<()> {
        self.store.write(|state| {
            let reserved = state.reserved(id);
            state.structure_mut(id)?.set_stock(new_stock, reserved, Utc::now())
        })?;
        tracing::info!(structure_id = %id, stock = new_stock, "stock count updated");
        Ok(())
    }

    pub fn update_structure(
        &self,
        id: StructureId,
        name: Option<String>,
        measure: Option<String>,
        description: Option<String>,
    ) -> AllocationResult<()> {
        self.store.write(|state| {
            state
                .structure_mut(id)?
                .update_details(name, measure, description, Utc::now())
        })
    }

    // -------------------------
    // Project allocation set
    // -------------------------

    pub fn create_project(&self) -> AllocationResult<ProjectId> {
        let id = ProjectId::new();
        self.store.write(|state| {
            state.insert_project(Project::new(id, Utc::now()));
            Ok(())
        })?;
        tracing::info!(project_id = %id, "project created (draft)");
        Ok(id)
    }

    pub fn project(&self, id: ProjectId) -> AllocationResult<Project> {
        self.store.read(|state| state.project(id).cloned())
    }

    /// Attach a structure to a project.
    ///
    /// The ceiling is the structure's current `available` in both the draft
    /// and locked cases: a draft project's lines are not subtracted from
    /// availability, and a locked project cannot already hold a line for
    /// this structure (duplicates are rejected).
    pub fn add_line(
        &self,
        project_id: ProjectId,
        structure_id: StructureId,
        quantity: u32,
    ) -> AllocationResult<LineId> {
        let line_id = LineId::new();
        self.store.write(|state| {
            state.structure(structure_id)?;
            let available = state.available(structure_id)?;
            if quantity > available {
                return Err(AllocationError::OverAllocation {
                    requested: quantity,
                    available,
                });
            }

            state
                .project_mut(project_id)?
                .add_line(line_id, structure_id, quantity, Utc::now())?;
            state.register_line(line_id, project_id);
            Ok(())
        })?;
        tracing::info!(
            project_id = %project_id,
            structure_id = %structure_id,
            line_id = %line_id,
            quantity,
            "allocation line added"
        );
        Ok(line_id)
    }

    /// Change a line's reserved quantity.
    ///
    /// For a locked project the line's own quantity is already subtracted
    /// from `available`, so the true ceiling is `available + own quantity`,
    /// computed here from authoritative state inside the same transaction
    /// that applies the delta (never replicated client arithmetic). Running
    /// the check and the apply under one exclusive lock also covers the
    /// increase/decrease ordering concern: no transient overshoot is
    /// observable.
    pub fn set_quantity(&self, line_id: LineId, quantity: u32) -> AllocationResult<()> {
        self.store.write(|state| {
            let project_id = state.project_of_line(line_id)?;
            let (structure_id, own_quantity, reserving) = {
                let project = state.project(project_id)?;
                let line = project.line(line_id)?;
                (
                    line.structure_id(),
                    line.quantity(),
                    project.status().is_reserving(),
                )
            };

            let available = state.available(structure_id)?;
            let ceiling = if reserving {
                available + own_quantity
            } else {
                available
            };
            if quantity > ceiling {
                return Err(AllocationError::OverAllocation {
                    requested: quantity,
                    available: ceiling,
                });
            }

            state
                .project_mut(project_id)?
                .set_line_quantity(line_id, quantity, Utc::now())
        })?;
        tracing::info!(line_id = %line_id, quantity, "allocation quantity updated");
        Ok(())
    }

    pub fn remove_line(&self, line_id: LineId) -> AllocationResult<()> {
        self.store.write(|state| {
            let project_id = state.project_of_line(line_id)?;
            state.project_mut(project_id)?.remove_line(line_id, Utc::now())?;
            state.unregister_line(line_id);
            Ok(())
        })?;
        tracing::info!(line_id = %line_id, "allocation line removed");
        Ok(())
    }

    // -------------------------
    // Project status state machine
    // -------------------------

    /// Lock the project's reservations: the `Draft -> Active` transition.
    pub fn activate_project(&self, project_id: ProjectId) -> AllocationResult<()> {
        self.update_status(project_id, ProjectStatus::Active)
    }

    /// Release reservations and void the project's dispatches.
    pub fn delete_project(&self, project_id: ProjectId) -> AllocationResult<()> {
        self.update_status(project_id, ProjectStatus::Deleted)
    }

    pub fn update_status(&self, project_id: ProjectId, to: ProjectStatus) -> AllocationResult<()> {
        self.store.write(|state| {
            let from = state.project(project_id)?.status();
            if !from.can_transition(to) {
                return Err(AllocationError::InvalidTransition {
                    from: from.as_str(),
                    to: to.as_str(),
                });
            }

            match to {
                // The one reservation event: every line is re-checked
                // against authoritative availability inside this
                // transaction, and the whole activation fails if any line
                // would overbook. A draft's own lines are not yet counted
                // in `reserved`, so no add-back is needed here.
                ProjectStatus::Active => {
                    let project = state.project(project_id)?;
                    for line in project.lines() {
                        let available = state.available(line.structure_id())?;
                        if line.quantity() > available {
                            return Err(AllocationError::OverAllocation {
                                requested: line.quantity(),
                                available,
                            });
                        }
                    }
                    state.project_mut(project_id)?.transition(to, Utc::now())
                }
                // Deletion releases every reservation (the status stops
                // counting toward `reserved`) and voids the project's
                // dispatches.
                ProjectStatus::Deleted => {
                    let now = Utc::now();
                    let dispatch_ids: Vec<DispatchId> = state
                        .dispatches_for_project(project_id)
                        .iter()
                        .map(|d| d.id())
                        .collect();

                    let project = state.project_mut(project_id)?;
                    project.transition(to, now)?;
                    project.void_dispatched(now);
                    for dispatch_id in dispatch_ids {
                        state.remove_dispatch(dispatch_id);
                    }
                    Ok(())
                }
                _ => state.project_mut(project_id)?.transition(to, Utc::now()),
            }
        })?;
        tracing::info!(project_id = %project_id, status = %to, "project status updated");
        Ok(())
    }

    // -------------------------
    // Dispatch ledger
    // -------------------------

    /// Record a physical hand-off. All items are checked against each line's
    /// authoritative `remaining` (cumulatively, when one request touches the
    /// same line twice) before any is applied: all-or-nothing.
    pub fn create_dispatch(
        &self,
        project_id: ProjectId,
        carrier: CarrierInfo,
        items: Vec<(LineId, u32)>,
    ) -> AllocationResult<DispatchId> {
        let dispatch_id = DispatchId::new();
        self.store.write(|state| {
            let project = state.project(project_id)?;
            match project.status() {
                ProjectStatus::Draft => {
                    return Err(AllocationError::validation(
                        "cannot dispatch from a draft project; activate it first",
                    ));
                }
                ProjectStatus::Deleted => {
                    return Err(AllocationError::validation(
                        "cannot dispatch from a deleted project",
                    ));
                }
                _ => {}
            }

            let mut claimed: HashMap<LineId, u32> = HashMap::new();
            for &(line_id, quantity) in &items {
                let line = project.line(line_id)?;
                let already = claimed.get(&line_id).copied().unwrap_or(0);
                let remaining = line.remaining().saturating_sub(already);
                if quantity > remaining {
                    return Err(AllocationError::InsufficientRemaining {
                        requested: quantity,
                        remaining,
                    });
                }
                *claimed.entry(line_id).or_insert(0) += quantity;
            }

            let dispatch = Dispatch::new(dispatch_id, project_id, carrier, items, Utc::now())?;

            let now = Utc::now();
            let project = state.project_mut(project_id)?;
            for item in dispatch.items() {
                project.record_dispatch(item.line_id(), item.quantity(), now)?;
            }
            state.insert_dispatch(dispatch);
            Ok(())
        })?;
        tracing::info!(project_id = %project_id, dispatch_id = %dispatch_id, "dispatch created");
        Ok(dispatch_id)
    }

    pub fn dispatch(&self, id: DispatchId) -> AllocationResult<Dispatch> {
        self.store.read(|state| state.dispatch(id).cloned())
    }

    pub fn dispatches_for_project(&self, project_id: ProjectId) -> AllocationResult<Vec<Dispatch>> {
        self.store.read(|state| {
            state.project(project_id)?;
            Ok(state
                .dispatches_for_project(project_id)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    /// Carrier metadata only; item quantities are immutable after creation.
    pub fn update_dispatch(&self, id: DispatchId, carrier: CarrierInfo) -> AllocationResult<()> {
        self.store.write(|state| {
            state.dispatch_mut(id)?.update_carrier(carrier, Utc::now())
        })?;
        tracing::info!(dispatch_id = %id, "dispatch carrier updated");
        Ok(())
    }

    /// Rollback path: restore each referenced line's undispatched remainder.
    pub fn delete_dispatch(&self, id: DispatchId) -> AllocationResult<()> {
        self.store.write(|state| {
            let (project_id, items): (ProjectId, Vec<(LineId, u32)>) = {
                let dispatch = state.dispatch(id)?;
                (
                    dispatch.project_id(),
                    dispatch
                        .items()
                        .iter()
                        .map(|i| (i.line_id(), i.quantity()))
                        .collect(),
                )
            };
            state.project(project_id)?;

            let now = Utc::now();
            state.remove_dispatch(id);
            let project = state.project_mut(project_id)?;
            for (line_id, quantity) in items {
                project.release_dispatch(line_id, quantity, now)?;
            }
            Ok(())
        })?;
        tracing::info!(dispatch_id = %id, "dispatch deleted");
        Ok(())
    }
}
