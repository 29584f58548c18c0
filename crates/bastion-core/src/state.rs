//! Game state snapshot: the complete visible state produced each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::GameEvent;
use crate::types::{ActorId, SimTime, TowerId, Vec2};

/// Complete game state handed to the presentation layer after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub wave: WaveView,
    pub hearts: i32,
    pub coins: i32,
    pub alive_enemies: u32,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub towers: Vec<TowerView>,
    pub archers: Vec<ArcherView>,
    /// Events raised during this tick, in emission order.
    pub events: Vec<GameEvent>,
}

/// Wave progress for the HUD.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveView {
    /// 1-based number of the wave in progress or last issued; 0 before the first.
    pub current: usize,
    pub total: usize,
    /// Enemies the current wave issues in all.
    pub enemies_in_wave: u32,
    pub phase: WavePhase,
    /// Seconds until the next wave auto-starts, while counting down.
    pub countdown_secs: Option<f32>,
}

/// An active enemy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: ActorId,
    pub species: Species,
    pub slime: Option<SlimeKind>,
    pub state: EnemyState,
    pub position: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub direction: Vec2,
    pub collider: Option<ColliderSide>,
}

/// An in-flight projectile, including its visual arc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: ActorId,
    pub position: Vec2,
    /// Normalized flight progress in [0, 1].
    pub progress: f32,
    pub target: Option<ActorId>,
}

/// A tower site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerView {
    pub id: TowerId,
    pub position: Vec2,
    /// -1 while unbuilt.
    pub level: i32,
    pub display_name: Option<String>,
    pub rebuilding: bool,
    pub archers: usize,
    pub next_upgrade_cost: Option<i32>,
    pub sell_refund: i32,
}

/// An active archer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcherView {
    pub id: ActorId,
    pub tower: Option<TowerId>,
    pub position: Vec2,
    pub action: ArcherAction,
    pub direction: FacingDirection,
    pub target: Option<ActorId>,
}
