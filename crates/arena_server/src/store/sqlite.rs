//! SQLite-backed match store.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::state::MatchState;
use crate::store::{MATCH_ROW_ID, MatchStore, StoreError, StoredMatch, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Durable store keeping the match in a single SQLite row.
#[derive(Debug, Clone)]
pub struct SqliteMatchStore {
    db_path: String,
}

impl SqliteMatchStore {
    /// Opens the database at `db_path`, creating it if needed, and applies
    /// pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be reached or migrated.
    /// Callers must not start serving without a store.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, StoreError> {
        info!(path = %db_path, "Opening match store");
        let store = Self { db_path };
        let mut conn = store.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::unreachable(format!("Migrations failed: {}", e)))?;
        info!(applied = applied.len(), "Match store ready");
        Ok(store)
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| StoreError::unreachable(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }
}

impl MatchStore for SqliteMatchStore {
    #[instrument(skip(self))]
    fn load(&self) -> Result<Option<MatchState>, StoreError> {
        let mut conn = self.connection()?;

        let row = schema::match_state::table
            .find(MATCH_ROW_ID)
            .select(StoredMatch::as_select())
            .first(&mut conn)
            .optional()?;

        match row {
            Some(row) => {
                debug!(updated_at = %row.updated_at(), "Match row loaded");
                row.into_state().map(Some)
            }
            None => {
                debug!("No match row yet");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, state))]
    fn save(&self, state: &MatchState) -> Result<(), StoreError> {
        let row = StoredMatch::from_state(state)?;
        let mut conn = self.connection()?;

        let written = diesel::replace_into(schema::match_state::table)
            .values(&row)
            .execute(&mut conn)?;

        debug!(written, "Match row saved");
        Ok(())
    }
}
