//! In-process match store.

use std::sync::{Arc, Mutex};

use tracing::{debug, instrument};

use crate::state::MatchState;
use crate::store::{MatchStore, StoreError};

/// Keeps the match in memory. Clones share the same record.
///
/// Used by tests and by `--ephemeral` runs; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryMatchStore {
    record: Arc<Mutex<Option<MatchState>>>,
}

impl MemoryMatchStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `state`.
    pub fn with_state(state: MatchState) -> Self {
        Self {
            record: Arc::new(Mutex::new(Some(state))),
        }
    }
}

impl MatchStore for MemoryMatchStore {
    #[instrument(skip(self))]
    fn load(&self) -> Result<Option<MatchState>, StoreError> {
        let record = self
            .record
            .lock()
            .map_err(|_| StoreError::unreachable("Memory store lock poisoned"))?;
        Ok(record.clone())
    }

    #[instrument(skip(self, state))]
    fn save(&self, state: &MatchState) -> Result<(), StoreError> {
        let mut record = self
            .record
            .lock()
            .map_err(|_| StoreError::unreachable("Memory store lock poisoned"))?;
        *record = Some(state.clone());
        debug!("Match saved in memory");
        Ok(())
    }
}
