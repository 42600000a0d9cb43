//! Persistence of the authoritative match state.

mod error;
mod memory;
mod models;
mod schema; // Diesel generated schema - internal use only
mod sqlite;

pub use error::{StoreError, StoreErrorKind};
pub use memory::MemoryMatchStore;
pub use models::{MATCH_ROW_ID, StoredMatch};
pub use sqlite::SqliteMatchStore;

use crate::state::MatchState;

/// Durable home of the single match record.
///
/// Every coordinator operation is one `load` followed by at most one `save`.
/// Errors are not retried.
pub trait MatchStore: Send {
    /// Reads the match, `None` if nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store is unreachable or the record is corrupt.
    fn load(&self) -> Result<Option<MatchState>, StoreError>;

    /// Replaces the stored match with `state`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write did not become durable.
    fn save(&self, state: &MatchState) -> Result<(), StoreError>;
}

impl<S: MatchStore + ?Sized> MatchStore for Box<S> {
    fn load(&self) -> Result<Option<MatchState>, StoreError> {
        (**self).load()
    }

    fn save(&self, state: &MatchState) -> Result<(), StoreError> {
        (**self).save(state)
    }
}
