//! State store error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// What went wrong with the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StoreErrorKind {
    /// The store could not be reached or did not accept the operation.
    Unreachable,
    /// The stored record exists but cannot be turned into a match.
    Corrupt,
}

/// State store error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error ({}): {} at {}:{}", kind, message, file, line)]
pub struct StoreError {
    /// Failure class.
    pub kind: StoreErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// The store could not be reached or refused the operation.
    #[track_caller]
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unreachable, message)
    }

    /// The stored record cannot be decoded.
    #[track_caller]
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Corrupt, message)
    }

    /// Whether the record was readable but invalid.
    pub fn is_corrupt(&self) -> bool {
        self.kind == StoreErrorKind::Corrupt
    }
}

impl From<diesel::result::Error> for StoreError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::Error as DieselError;

        let kind = match &err {
            DieselError::DeserializationError(_) | DieselError::SerializationError(_) => {
                StoreErrorKind::Corrupt
            }
            _ => StoreErrorKind::Unreachable,
        };
        Self::new(kind, format!("Diesel error: {}", err))
    }
}

impl From<diesel::ConnectionError> for StoreError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::unreachable(format!("Connection error: {}", err))
    }
}

impl From<serde_json::Error> for StoreError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::corrupt(format!("Corrupt stored JSON: {}", err))
    }
}
