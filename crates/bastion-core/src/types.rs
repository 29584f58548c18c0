//! Fundamental geometric and simulation types.

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Identifier of one use of a pooled actor, as seen by the presentation layer.
///
/// `entity` holds the ECS entity bits, which never change because pooled
/// entities live for the whole session. `generation` counts how many times the
/// pool has handed the entity out, so an id from an earlier use never matches
/// the actor that reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId {
    pub entity: u64,
    pub generation: u32,
}

/// Index of a tower site in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(pub u32);

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the fixed tick rate.
    pub fn dt(&self) -> f32 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += f64::from(self.dt());
    }
}

/// Step `current` toward `target` by at most `max_delta`, never overshooting.
pub fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance == 0.0 {
        target
    } else {
        current + delta / distance * max_delta
    }
}

/// Perpendicular of a direction (rotated 90° counter-clockwise).
pub fn perpendicular(dir: Vec2) -> Vec2 {
    Vec2::new(-dir.y, dir.x)
}
