//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Enemy species. Per-species numbers live in `SpeciesProfile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Bee,
    Wolf,
    Orc,
    Slime,
}

/// Slime sub-type. Only meaningful for `Species::Slime`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlimeKind {
    /// Regular slime; may split on death.
    #[default]
    Normal,
    /// Paused stand-in playing the split sequence.
    Special,
    /// Half-strength offspring of a split.
    Clone,
}

/// Enemy lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    #[default]
    Alive,
    /// Death animation window; recycled when the timer runs out.
    Dying,
    /// Returned to the pool.
    Recycled,
}

/// Archer fire-control state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcherAction {
    #[default]
    Idle,
    /// Wind-up before the first volley on a new engagement.
    PreAttack,
    /// Releasing volleys at the fire interval.
    Attack,
}

/// Discrete visual action signalled to the animation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionSignal {
    Idle,
    PreAttack,
    Attack,
    Die,
    Split,
}

/// Four-way archer facing, derived from the dominant axis toward the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacingDirection {
    Up,
    #[default]
    Down,
    Side,
}

/// Which enemy hit collider is currently enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColliderSide {
    Front,
    Back,
    Side,
}

/// Projectile flight lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectilePhase {
    #[default]
    Flying,
    Resolved,
    Recycled,
}

/// Wave scheduler state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Nothing spawned yet; the player has to start the first wave.
    #[default]
    WaitingForPlayerStart,
    Spawning,
    /// Between waves; auto-advances when the countdown expires.
    WaitingForNextWave,
    /// Every wave has been issued.
    AllComplete,
}

/// Top-level session state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Active,
    Paused,
    Victory,
    Defeat,
}

impl GamePhase {
    /// Whether an outcome has been latched.
    pub fn is_over(self) -> bool {
        matches!(self, GamePhase::Victory | GamePhase::Defeat)
    }
}
