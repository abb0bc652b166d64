use crate::auth::AccessGate;
use crate::classifier::ModelRegistry;
use crate::session::SessionStore;

/// Shared by every worker. The registry is read-only after startup.
pub struct AppState {
    pub registry: ModelRegistry,
    pub gate: AccessGate,
    pub sessions: SessionStore,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(registry: ModelRegistry, gate: AccessGate, max_upload_bytes: usize) -> Self {
        Self {
            registry,
            gate,
            sessions: SessionStore::new(),
            max_upload_bytes,
        }
    }
}
