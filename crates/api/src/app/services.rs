use andamio_allocation::AllocationCoordinator;

/// Shared application state handed to every handler.
///
/// The coordinator serializes its own state internally, so handlers only
/// need a shared reference.
#[derive(Debug, Default)]
pub struct AppServices {
    coordinator: AllocationCoordinator,
}

impl AppServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coordinator(&self) -> &AllocationCoordinator {
        &self.coordinator
    }
}
