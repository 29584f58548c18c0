//! Target acquisition: range query, validity, and scoring.
//!
//! Score is `health + distance * 5`, lower is better. Ties keep query order.

use hecs::{Entity, World};

use bastion_core::components::{EnemyLife, EnemyStats, Health, HitColliders, PoolMember, Transform};
use bastion_core::constants::{RANGE_SHRINK, SCORE_DISTANCE_WEIGHT};
use bastion_core::enums::EnemyState;
use bastion_core::types::Vec2;

use crate::systems::enemy::enabled_collider;

/// An enemy seen by a range query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub entity: Entity,
    pub position: Vec2,
    pub health: f32,
    pub radius: f32,
}

pub fn score(origin: Vec2, position: Vec2, health: f32) -> f32 {
    health + origin.distance(position) * SCORE_DISTANCE_WEIGHT
}

/// Range test against the collision bounds (a circle of `radius`) at 95% of
/// nominal range, or against the center when there are no bounds.
pub fn in_range(origin: Vec2, position: Vec2, radius: f32, range: f32) -> bool {
    let distance = origin.distance(position);
    if radius > 0.0 {
        distance - radius <= range * RANGE_SHRINK
    } else {
        distance <= range
    }
}

/// Alive, active enemies with an enabled hit collider within range, in query order.
pub fn candidates(world: &World, origin: Vec2, range: f32) -> Vec<Candidate> {
    let mut query = world.query::<(
        &PoolMember,
        &EnemyLife,
        &Transform,
        &Health,
        &EnemyStats,
        &HitColliders,
    )>();
    let found = query
        .iter()
        .filter(|(_, (member, life, _, health, _, colliders))| {
            member.active
                && life.state == EnemyState::Alive
                && health.current > 0.0
                && enabled_collider(colliders).is_some()
        })
        .map(|(entity, (_, _, transform, health, stats, _))| Candidate {
            entity,
            position: transform.position,
            health: health.current,
            radius: stats.collider_radius,
        })
        .filter(|c| in_range(origin, c.position, c.radius, range))
        .collect();
    found
}

/// Candidates sorted best first. The sort is stable, so ties keep query order.
pub fn ranked(origin: Vec2, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        score(origin, a.position, a.health).total_cmp(&score(origin, b.position, b.health))
    });
    candidates
}

/// Lowest-scoring candidate; the first one wins a tie.
pub fn best(origin: Vec2, candidates: &[Candidate]) -> Option<Candidate> {
    let mut best: Option<(f32, Candidate)> = None;
    for c in candidates {
        let s = score(origin, c.position, c.health);
        if best.map_or(true, |(b, _)| s < b) {
            best = Some((s, *c));
        }
    }
    best.map(|(_, c)| c)
}

pub fn find_best_target(world: &World, origin: Vec2, range: f32) -> Option<Entity> {
    best(origin, &candidates(world, origin, range)).map(|c| c.entity)
}

/// A held target stays valid while it is active, alive, has health, and is in range.
pub fn is_valid_target(world: &World, entity: Entity, origin: Vec2, range: f32) -> bool {
    let Ok(mut query) =
        world.query_one::<(&PoolMember, &EnemyLife, &Transform, &Health, &EnemyStats)>(entity)
    else {
        return false;
    };
    let Some((member, life, transform, health, stats)) = query.get() else {
        return false;
    };
    member.active
        && life.state == EnemyState::Alive
        && health.current > 0.0
        && in_range(origin, transform.position, stats.collider_radius, range)
}
