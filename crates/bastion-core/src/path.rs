//! Immutable waypoint sequences shared by every mover on a lane.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::types::Vec2;

/// Ordered, read-only list of waypoints. Shared via `Arc` by all movers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    waypoints: Vec<Vec2>,
}

impl Path {
    /// Build a path; an empty waypoint list is a configuration error.
    pub fn new(waypoints: Vec<Vec2>) -> Result<Self, ConfigurationError> {
        if waypoints.is_empty() {
            return Err(ConfigurationError::MissingPath);
        }
        Ok(Self { waypoints })
    }

    pub fn waypoint(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(
            Path::new(Vec::new()),
            Err(ConfigurationError::MissingPath)
        ));
    }
}
