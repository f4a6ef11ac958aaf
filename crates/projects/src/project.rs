use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use andamio_core::{AllocationError, AllocationResult, LineId, ProjectId, StructureId};

/// Project status lifecycle.
///
/// `Draft` is the budget stage: structures are tentatively picked but not
/// locked. Reservations are committed on `Draft -> Active` and released only
/// on `Deleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    Active,
    InProgress,
    Finished,
    Deleted,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Active => "active",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Finished => "finished",
            ProjectStatus::Deleted => "deleted",
        }
    }

    /// True when the project's allocation lines are subtracted from the
    /// structure ledger's availability.
    pub fn is_reserving(self) -> bool {
        matches!(
            self,
            ProjectStatus::Active | ProjectStatus::InProgress | ProjectStatus::Finished
        )
    }

    /// True while the allocation set may still be edited.
    pub fn is_mutable(self) -> bool {
        matches!(
            self,
            ProjectStatus::Draft | ProjectStatus::Active | ProjectStatus::InProgress
        )
    }

    /// Legal forward transitions. There is no way back to `Draft`; the only
    /// path that releases reservations is `Deleted`.
    pub fn can_transition(self, to: ProjectStatus) -> bool {
        matches!(
            (self, to),
            (ProjectStatus::Draft, ProjectStatus::Active)
                | (ProjectStatus::Active, ProjectStatus::InProgress)
                | (ProjectStatus::InProgress, ProjectStatus::Finished)
                | (ProjectStatus::Draft, ProjectStatus::Deleted)
                | (ProjectStatus::Active, ProjectStatus::Deleted)
                | (ProjectStatus::InProgress, ProjectStatus::Deleted)
        )
    }
}

impl core::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (structure, quantity) reservation within a project.
///
/// `dispatched_quantity` is the sum of all dispatch item quantities recorded
/// against this line; `remaining` is what can still leave the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLine {
    id: LineId,
    structure_id: StructureId,
    quantity: u32,
    dispatched_quantity: u32,
}

impl AllocationLine {
    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn structure_id(&self) -> StructureId {
        self.structure_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn dispatched_quantity(&self) -> u32 {
        self.dispatched_quantity
    }

    pub fn remaining(&self) -> u32 {
        self.quantity - self.dispatched_quantity
    }
}

/// Entity: a project and its allocation set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    status: ProjectStatus,
    lines: Vec<AllocationLine>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: ProjectId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            status: ProjectStatus::Draft,
            lines: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    pub fn lines(&self) -> &[AllocationLine] {
        &self.lines
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn line(&self, line_id: LineId) -> AllocationResult<&AllocationLine> {
        self.lines
            .iter()
            .find(|l| l.id == line_id)
            .ok_or(AllocationError::NotFound)
    }

    pub fn line_for_structure(&self, structure_id: StructureId) -> Option<&AllocationLine> {
        self.lines.iter().find(|l| l.structure_id == structure_id)
    }

    fn line_mut(&mut self, line_id: LineId) -> AllocationResult<&mut AllocationLine> {
        self.lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or(AllocationError::NotFound)
    }

    fn ensure_mutable(&self) -> AllocationResult<()> {
        if !self.status.is_mutable() {
            return Err(AllocationError::validation(format!(
                "project is {} and can no longer be edited",
                self.status
            )));
        }
        Ok(())
    }

    /// Attach a new allocation line. Entity-local rules only; the caller is
    /// responsible for the availability ceiling.
    pub fn add_line(
        &mut self,
        line_id: LineId,
        structure_id: StructureId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> AllocationResult<()> {
        self.ensure_mutable()?;
        if quantity == 0 {
            return Err(AllocationError::validation("quantity must be positive"));
        }
        if self.line_for_structure(structure_id).is_some() {
            return Err(AllocationError::DuplicateAllocation);
        }

        self.lines.push(AllocationLine {
            id: line_id,
            structure_id,
            quantity,
            dispatched_quantity: 0,
        });
        self.updated_at = now;
        Ok(())
    }

    /// Change a line's reserved quantity. Shrinking below what has already
    /// physically left is rejected here; the availability ceiling for growth
    /// is the caller's responsibility.
    pub fn set_line_quantity(
        &mut self,
        line_id: LineId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> AllocationResult<()> {
        self.ensure_mutable()?;
        if quantity == 0 {
            return Err(AllocationError::validation("quantity must be positive"));
        }

        let line = self.line_mut(line_id)?;
        if quantity < line.dispatched_quantity {
            return Err(AllocationError::BelowDispatched {
                requested: quantity,
                dispatched: line.dispatched_quantity,
            });
        }

        line.quantity = quantity;
        self.updated_at = now;
        Ok(())
    }

    /// Detach a line. Lines with dispatched units cannot be removed; their
    /// dispatches must be reversed first (no silent cascade).
    pub fn remove_line(&mut self, line_id: LineId, now: DateTime<Utc>) -> AllocationResult<AllocationLine> {
        self.ensure_mutable()?;
        let idx = self
            .lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or(AllocationError::NotFound)?;
        if self.lines[idx].dispatched_quantity > 0 {
            return Err(AllocationError::HasDispatches);
        }

        let line = self.lines.remove(idx);
        self.updated_at = now;
        Ok(line)
    }

    /// Move through the status state machine. The caller performs the ledger
    /// side effects tied to the transition (locking on activate, releasing
    /// on delete).
    pub fn transition(&mut self, to: ProjectStatus, now: DateTime<Utc>) -> AllocationResult<()> {
        if !self.status.can_transition(to) {
            return Err(AllocationError::InvalidTransition {
                from: self.status.as_str(),
                to: to.as_str(),
            });
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    /// Record dispatched units against a line. The caller has already
    /// validated `quantity <= remaining` under the state lock.
    pub fn record_dispatch(
        &mut self,
        line_id: LineId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> AllocationResult<()> {
        let line = self.line_mut(line_id)?;
        if quantity > line.remaining() {
            return Err(AllocationError::InsufficientRemaining {
                requested: quantity,
                remaining: line.remaining(),
            });
        }
        line.dispatched_quantity += quantity;
        self.updated_at = now;
        Ok(())
    }

    /// Reverse dispatched units on a line (dispatch deletion). Never goes
    /// below zero, which makes the rollback path idempotent against partial
    /// failure.
    pub fn release_dispatch(
        &mut self,
        line_id: LineId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> AllocationResult<()> {
        let line = self.line_mut(line_id)?;
        line.dispatched_quantity = line.dispatched_quantity.saturating_sub(quantity);
        self.updated_at = now;
        Ok(())
    }

    /// Drop all dispatched-quantity tracking (project deletion voids its
    /// dispatches).
    pub fn void_dispatched(&mut self, now: DateTime<Utc>) {
        for line in &mut self.lines {
            line.dispatched_quantity = 0;
        }
        self.updated_at = now;
    }
}
