//! Error types for the synchronisation core

use thiserror::Error;

/// Failures that cannot be absorbed as degraded synchronisation.
///
/// Stale inputs, lost packets and prediction divergence are all handled
/// in-band and never surface here.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The unacknowledged tick range no longer fits in the client history.
    #[error("Tick {requested} is no longer in history (current tick {current}, capacity {capacity})")]
    HistoryOverrun {
        requested: u32,
        current: u32,
        capacity: usize,
    },

    #[error("Received state for tick {tick} ahead of client tick {current}")]
    FutureState { tick: u32, current: u32 },

    /// The 32-bit tick counter has no successor.
    #[error("Tick counter exhausted at tick {tick}")]
    TickOverflow { tick: u32 },

    #[error("Codec error: {0}")]
    Codec(#[from] bincode::Error),
}

impl SyncError {
    /// True for errors that mean client and server can no longer be
    /// reconciled without a full state reset.
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            SyncError::HistoryOverrun { .. } | SyncError::FutureState { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
