//! Events emitted by the simulation for animation, audio and UI feedback.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::error::InvalidStateTransition;
use crate::types::{ActorId, TowerId, Vec2};

/// Result of one projectile's hit resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result")]
pub enum HitOutcome {
    Hit { damage: i32, crit: bool },
    Miss,
    /// Target was gone before the projectile landed.
    Lost,
}

/// Everything the presentation layer may want to react to in a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// Trigger an animation sequence on an actor.
    Signal {
        actor: ActorId,
        action: ActionSignal,
        facing: Option<FacingDirection>,
    },
    EnemySpawned {
        enemy: ActorId,
        species: Species,
        position: Vec2,
    },
    EnemyKilled {
        enemy: ActorId,
        species: Species,
        coins: i32,
    },
    EnemyLeaked {
        enemy: ActorId,
        hearts_lost: i32,
    },
    SplitStarted {
        original: ActorId,
        special: ActorId,
    },
    SplitCompleted {
        special: ActorId,
        clones: Vec<ActorId>,
    },
    SplitInterrupted {
        special: ActorId,
    },
    VolleyFired {
        archer: ActorId,
        projectiles: u32,
    },
    ProjectileResolved {
        projectile: ActorId,
        target: Option<ActorId>,
        outcome: HitOutcome,
    },
    WaveStarted {
        wave: usize,
    },
    WaveFinished {
        wave: usize,
    },
    AllWavesIssued,
    Victory,
    Defeat,
    TowerUpgraded {
        tower: TowerId,
        level: i32,
        cost: i32,
    },
    TowerRebuilt {
        tower: TowerId,
        archers: u32,
    },
    TowerSold {
        tower: TowerId,
        refund: i32,
    },
    CommandRejected {
        reason: InvalidStateTransition,
    },
    PoolExpanded {
        tag: String,
        size: usize,
    },
}
