//! Error taxonomy.
//!
//! `ConfigurationError` surfaces to the caller: the requested operation is
//! aborted, the tick goes on. `InvalidStateTransition` never leaves the
//! engine; it is logged and reported as a rejected command.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Missing or malformed setup data.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no actor pool registered for tag `{0}`")]
    UnknownPoolTag(String),
    #[error("wave list is empty")]
    EmptyWaveList,
    #[error("path has no waypoints")]
    MissingPath,
    #[error("no tower levels configured")]
    MissingTowerLevels,
    #[error("no profile configured for species {0}")]
    UnknownSpecies(String),
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("failed to parse session config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read session config: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigurationError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A state-machine request that does not apply to the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum InvalidStateTransition {
    #[error("tower is still rebuilding from the previous upgrade")]
    UpgradeInProgress,
    #[error("tower is already at its maximum level")]
    MaxLevelReached,
    #[error("tower has not been built")]
    TowerNotBuilt,
    #[error("no tower with that id")]
    UnknownTower,
    #[error("not enough coins")]
    InsufficientCoins,
    #[error("a wave is already spawning")]
    WaveAlreadyRunning,
    #[error("every wave has already been issued")]
    AllWavesIssued,
    #[error("the session is over")]
    GameOver,
}
