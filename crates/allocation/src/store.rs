//! Serializing state store for the three allocation tables.

use std::collections::HashMap;
use std::sync::RwLock;

use andamio_core::{AllocationError, AllocationResult, DispatchId, LineId, ProjectId, StructureId};
use andamio_dispatch::Dispatch;
use andamio_projects::Project;
use andamio_structures::{StockLevel, Structure};

/// The three entity tables plus a line-ownership index.
///
/// `available`, `in_use`, and `remaining` are never stored here; they are
/// recomputed from these tables on every read so they cannot drift.
#[derive(Debug, Default)]
pub struct AllocationState {
    structures: HashMap<StructureId, Structure>,
    projects: HashMap<ProjectId, Project>,
    dispatches: HashMap<DispatchId, Dispatch>,
    line_owner: HashMap<LineId, ProjectId>,
}

impl AllocationState {
    // --- structures ---

    pub fn structure(&self, id: StructureId) -> AllocationResult<&Structure> {
        self.structures.get(&id).ok_or(AllocationError::NotFound)
    }

    pub fn structure_mut(&mut self, id: StructureId) -> AllocationResult<&mut Structure> {
        self.structures.get_mut(&id).ok_or(AllocationError::NotFound)
    }

    pub fn insert_structure(&mut self, structure: Structure) {
        self.structures.insert(structure.id(), structure);
    }

    pub fn structures(&self) -> impl Iterator<Item = &Structure> {
        self.structures.values()
    }

    // --- projects ---

    pub fn project(&self, id: ProjectId) -> AllocationResult<&Project> {
        self.projects.get(&id).ok_or(AllocationError::NotFound)
    }

    pub fn project_mut(&mut self, id: ProjectId) -> AllocationResult<&mut Project> {
        self.projects.get_mut(&id).ok_or(AllocationError::NotFound)
    }

    pub fn insert_project(&mut self, project: Project) {
        self.projects.insert(project.id(), project);
    }

    pub fn project_of_line(&self, line_id: LineId) -> AllocationResult<ProjectId> {
        self.line_owner.get(&line_id).copied().ok_or(AllocationError::NotFound)
    }

    pub fn register_line(&mut self, line_id: LineId, project_id: ProjectId) {
        self.line_owner.insert(line_id, project_id);
    }

    pub fn unregister_line(&mut self, line_id: LineId) {
        self.line_owner.remove(&line_id);
    }

    // --- dispatches ---

    pub fn dispatch(&self, id: DispatchId) -> AllocationResult<&Dispatch> {
        self.dispatches.get(&id).ok_or(AllocationError::NotFound)
    }

    pub fn dispatch_mut(&mut self, id: DispatchId) -> AllocationResult<&mut Dispatch> {
        self.dispatches.get_mut(&id).ok_or(AllocationError::NotFound)
    }

    pub fn insert_dispatch(&mut self, dispatch: Dispatch) {
        self.dispatches.insert(dispatch.id(), dispatch);
    }

    pub fn remove_dispatch(&mut self, id: DispatchId) -> Option<Dispatch> {
        self.dispatches.remove(&id)
    }

    pub fn dispatches_for_project(&self, project_id: ProjectId) -> Vec<&Dispatch> {
        let mut found: Vec<&Dispatch> = self
            .dispatches
            .values()
            .filter(|d| d.project_id() == project_id)
            .collect();
        found.sort_by_key(|d| d.created_at());
        found
    }

    // --- derived quantities ---

    /// Quantity committed against a structure by locked (non-Draft,
    /// non-Deleted) projects.
    pub fn reserved(&self, structure_id: StructureId) -> u32 {
        self.projects
            .values()
            .filter(|p| p.status().is_reserving())
            .flat_map(|p| p.lines())
            .filter(|l| l.structure_id() == structure_id)
            .map(|l| l.quantity())
            .sum()
    }

    /// Quantity physically out on job sites for a structure.
    pub fn in_use(&self, structure_id: StructureId) -> u32 {
        self.projects
            .values()
            .filter(|p| p.status().is_reserving())
            .flat_map(|p| p.lines())
            .filter(|l| l.structure_id() == structure_id)
            .map(|l| l.dispatched_quantity())
            .sum()
    }

    pub fn available(&self, structure_id: StructureId) -> AllocationResult<u32> {
        let stock = self.structure(structure_id)?.stock();
        Ok(stock.saturating_sub(self.reserved(structure_id)))
    }

    pub fn stock_level(&self, structure_id: StructureId) -> AllocationResult<StockLevel> {
        let stock = self.structure(structure_id)?.stock();
        Ok(StockLevel::compute(
            stock,
            self.reserved(structure_id),
            self.in_use(structure_id),
        ))
    }
}

/// In-memory store serializing all access to the allocation state.
///
/// One write lock over the whole state is a strict superset of the
/// per-structure serialization the quantity invariants require: a ceiling
/// check and the delta it guards always run under the same exclusive lock,
/// so no two callers can validate against the same stale `available`.
///
/// Transaction discipline for `write` closures: validate every precondition
/// first, mutate only after all checks pass. A closure that errors must not
/// have mutated.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<AllocationState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read<R>(
        &self,
        f: impl FnOnce(&AllocationState) -> AllocationResult<R>,
    ) -> AllocationResult<R> {
        let state = self
            .state
            .read()
            .map_err(|_| AllocationError::internal("state lock poisoned"))?;
        f(&state)
    }

    pub fn write<R>(
        &self,
        f: impl FnOnce(&mut AllocationState) -> AllocationResult<R>,
    ) -> AllocationResult<R> {
        let mut state = self
            .state
            .write()
            .map_err(|_| AllocationError::internal("state lock poisoned"))?;
        f(&mut state)
    }
}
