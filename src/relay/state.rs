use crate::store::MemoryStore;

/// Shared state for relay handlers
#[derive(Clone, Default)]
pub struct RelayState {
    store: MemoryStore,
}

impl RelayState {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}
