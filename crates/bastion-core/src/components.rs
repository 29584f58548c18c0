//! ECS components for the hecs world.
//!
//! Components are plain data structs with no methods.
//! Systems operate on them; all logic lives in bastion-sim.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{ArcherTier, ArrowTier};
use crate::enums::*;
use crate::path::Path;
use crate::types::{ActorId, TowerId, Vec2};

// ---------------------------------------------------------------------------
// Shared components
// ---------------------------------------------------------------------------

/// Pool bookkeeping. Every pooled entity carries one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolMember {
    pub tag: String,
    /// In use (true) or free and owned by the pool (false).
    pub active: bool,
    /// Bumped each time the pool hands the member out.
    pub generation: u32,
}

/// World placement. `position` is absolute; attached actors also keep the
/// offset from their parent so it can be cleared on reuse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    /// Radians, counter-clockwise from +x.
    pub rotation: f32,
    pub parent: Option<ActorId>,
    pub local_offset: Vec2,
}

/// Hit points, `current` kept within `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

// ---------------------------------------------------------------------------
// Enemy components
// ---------------------------------------------------------------------------

/// Static per-species numbers, stamped onto the entity at prefab time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub species: Species,
    pub armor: i32,
    pub min_contact_damage: i32,
    pub max_contact_damage: i32,
    pub damage_at_end_of_path: i32,
    pub coin_value: i32,
    pub collider_radius: f32,
    pub collider_height: f32,
}

/// Lifecycle state plus the pending recycle after death.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyLife {
    pub state: EnemyState,
    /// Seconds until the dying enemy returns to its pool.
    pub recycle_timer: Option<f32>,
}

/// Periodic self-damage. Only species configured with one carry it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decay {
    pub amount: f32,
    pub interval: f32,
    /// Seconds until the next application.
    pub remaining: f32,
}

/// Movement direction bookkeeping used for facing and hit colliders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Facing {
    pub last_position: Vec2,
    pub move_direction: Vec2,
    /// Last non-zero movement direction; frozen while dying.
    pub last_valid_direction: Vec2,
    pub frozen: bool,
}

/// Three directional hit colliders; at most one is enabled at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HitColliders {
    pub front: bool,
    pub back: bool,
    pub side: bool,
}

/// Path follower. The path is shared by every mover on the lane.
#[derive(Debug, Clone)]
pub struct Mover {
    pub path: Arc<Path>,
    pub speed: f32,
    /// Next waypoint to reach.
    pub waypoint_index: usize,
    /// Lateral offset added to every waypoint for this traversal.
    pub offset: Vec2,
    pub snap_to_first: bool,
    pub override_start: bool,
    pub enabled: bool,
    /// Set once the final waypoint is reached; the leak is reported once.
    pub path_complete: bool,
}

/// Split-on-death state of a slime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SlimeState {
    pub kind: SlimeKind,
    pub has_split: bool,
    pub is_splitting: bool,
    /// Latched when a special slime dies mid-split; no clones afterward.
    pub stop_split: bool,
    /// Fallback for a split animation that never reports completion.
    pub split_timer: Option<f32>,
}

// ---------------------------------------------------------------------------
// Tower-side components
// ---------------------------------------------------------------------------

/// Tuning an archer receives when its tower finishes a rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcherLoadout {
    pub archer: ArcherTier,
    pub arrow: ArrowTier,
    pub range: f32,
}

/// Fire-control state of one archer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Archer {
    pub tower: Option<TowerId>,
    pub loadout: Option<ArcherLoadout>,
    /// Weak reference; the archer never owns enemy lifetime.
    pub target: Option<ActorId>,
    pub cooldown: f32,
    pub action: ArcherAction,
    pub direction: FacingDirection,
    pub pre_attack_timer: Option<f32>,
    /// Waiting for the volley-release cue, with fallback.
    pub release_timer: Option<f32>,
    pub idle_reset_timer: Option<f32>,
}

/// In-flight projectile with the tuning copied at launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub phase: ProjectilePhase,
    pub start: Vec2,
    pub target: Option<ActorId>,
    pub target_point: Vec2,
    pub elapsed: f32,
    pub flight_duration: f32,
    pub arc_height: f32,
    pub can_hit: bool,
    pub tuning: Option<ArrowTier>,
}

/// Visual marker for a built tower.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TowerVisual {
    pub tower: Option<TowerId>,
}

/// Pooled feedback effect with a fixed lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub lifetime_secs: f32,
    pub remaining_secs: Option<f32>,
}
