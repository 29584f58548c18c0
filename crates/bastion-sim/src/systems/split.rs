//! Split-on-death for slimes.
//!
//! A dying normal slime is swapped for a paused special instance that plays
//! the split sequence. On completion (cue or fallback timer) the special
//! emits two clones and retires. Once the special's death has latched,
//! completion is a no-op: no clones are ever produced after a kill.

use hecs::Entity;
use tracing::{debug, warn};

use bastion_core::components::*;
use bastion_core::config::SplitProfile;
use bastion_core::constants::{SPLIT_ANIMATION_TIMEOUT, SPLIT_CLONE_LATERAL, SPLIT_CLONE_PATH_OFFSET};
use bastion_core::enums::*;
use bastion_core::error::ConfigurationError;
use bastion_core::events::GameEvent;
use bastion_core::types::Vec2;

use crate::context::TickContext;
use crate::pool::actor_id;
use crate::systems::enemy::{self, set_collider};
use crate::systems::movement;

/// Captured motion state handed from one slime instance to the next.
#[derive(Debug, Clone, Copy)]
struct Handoff {
    position: Vec2,
    direction: Vec2,
    waypoint_index: usize,
    offset: Vec2,
}

fn capture(ctx: &TickContext, entity: Entity) -> Option<Handoff> {
    let position = ctx.world.get::<&Transform>(entity).ok()?.position;
    let direction = ctx.world.get::<&Facing>(entity).ok()?.last_valid_direction;
    let mover = ctx.world.get::<&Mover>(entity).ok()?;
    Some(Handoff {
        position,
        direction,
        waypoint_index: mover.waypoint_index,
        offset: mover.offset,
    })
}

/// Replace a dying normal slime with a paused special one at the same spot.
/// The census is unchanged: the special stands in for the original.
pub fn begin_split(
    ctx: &mut TickContext,
    original: Entity,
    profile: &SplitProfile,
) -> Result<Entity, ConfigurationError> {
    let handoff = capture(ctx, original)
        .ok_or_else(|| ConfigurationError::invalid("split", "entity is not a pooled enemy"))?;
    let special = ctx.pool.spawn(
        ctx.world,
        ctx.catalog,
        &profile.special_tag,
        handoff.position,
        0.0,
    )?;

    // Retire the original without a death window; it never counted as killed.
    if let Ok(mut slime) = ctx.world.get::<&mut SlimeState>(original) {
        slime.has_split = true;
    }
    enemy::recycle(ctx, original);

    enemy::reset_enemy(ctx.world, special);
    if let Ok((mover, facing, colliders)) = ctx
        .world
        .query_one_mut::<(&mut Mover, &mut Facing, &mut HitColliders)>(special)
    {
        mover.waypoint_index = handoff.waypoint_index;
        mover.offset = handoff.offset;
        mover.snap_to_first = false;
        mover.override_start = false;
        mover.enabled = false;
        facing.last_position = handoff.position;
        facing.move_direction = handoff.direction;
        facing.last_valid_direction = handoff.direction;
        set_collider(colliders, None);
    }
    if let Ok(mut slime) = ctx.world.get::<&mut SlimeState>(special) {
        slime.kind = SlimeKind::Special;
        slime.is_splitting = true;
        slime.split_timer = Some(SPLIT_ANIMATION_TIMEOUT);
    }

    debug!(original = ?original, special = ?special, "slime split started");
    ctx.events.push(GameEvent::SplitStarted {
        original: actor_id(ctx.world, original),
        special: actor_id(ctx.world, special),
    });
    ctx.events.push(GameEvent::Signal {
        actor: actor_id(ctx.world, special),
        action: ActionSignal::Split,
        facing: None,
    });
    Ok(special)
}

/// Finish a split: two clones at the special's health fraction, then the
/// special retires. Returns false when nothing was waiting to complete.
pub fn complete_split(ctx: &mut TickContext, special: Entity) -> bool {
    if !enemy::is_alive(ctx.world, special) {
        return false;
    }
    let ready = ctx
        .world
        .get::<&SlimeState>(special)
        .map(|s| s.kind == SlimeKind::Special && s.is_splitting && !s.stop_split)
        .unwrap_or(false);
    if !ready {
        return false;
    }

    let Some(handoff) = capture(ctx, special) else {
        return false;
    };
    let fraction = ctx
        .world
        .get::<&Health>(special)
        .map(|h| if h.max > 0.0 { h.current / h.max } else { 0.0 })
        .unwrap_or(0.0);
    let species = ctx
        .world
        .get::<&EnemyStats>(special)
        .map(|s| s.species)
        .unwrap_or(Species::Slime);

    if let Ok(mut slime) = ctx.world.get::<&mut SlimeState>(special) {
        slime.is_splitting = false;
        slime.split_timer = None;
    }

    let catalog = ctx.catalog;
    let mut clones = Vec::with_capacity(2);
    match catalog.split_profile(species) {
        Some(profile) => {
            let health = profile.clone_max_health * fraction;
            for side in [-1.0_f32, 1.0] {
                let position = handoff.position + Vec2::new(side * SPLIT_CLONE_LATERAL, 0.0);
                let offset = handoff.offset + Vec2::new(0.0, side * SPLIT_CLONE_PATH_OFFSET);
                match spawn_clone(ctx, &profile.clone_tag, position, offset, handoff, health) {
                    Ok(clone) => clones.push(actor_id(ctx.world, clone)),
                    Err(err) => warn!(%err, "split clone skipped"),
                }
            }
        }
        None => warn!(?species, "split completed without a split profile"),
    }

    // Clones are registered before the special leaves, so the count never
    // passes through zero mid-split.
    enemy::recycle(ctx, special);
    ctx.census.unregister();

    debug!(special = ?special, clones = clones.len(), "slime split completed");
    ctx.events.push(GameEvent::SplitCompleted {
        special: actor_id(ctx.world, special),
        clones,
    });
    true
}

fn spawn_clone(
    ctx: &mut TickContext,
    tag: &str,
    position: Vec2,
    offset: Vec2,
    handoff: Handoff,
    health: f32,
) -> Result<Entity, ConfigurationError> {
    let clone = ctx.pool.spawn(ctx.world, ctx.catalog, tag, position, 0.0)?;
    enemy::reset_enemy(ctx.world, clone);

    if let Ok((transform, hp, mover, facing)) = ctx
        .world
        .query_one_mut::<(&mut Transform, &mut Health, &mut Mover, &mut Facing)>(clone)
    {
        hp.current = health.clamp(0.0, hp.max);
        mover.offset = offset;
        mover.snap_to_first = false;
        mover.override_start = false;
        movement::initialize_position(mover, &mut transform.position);
        mover.waypoint_index = handoff.waypoint_index;
        facing.last_position = transform.position;
        facing.move_direction = handoff.direction;
        facing.last_valid_direction = handoff.direction;
    }

    ctx.census.register();
    ctx.events.push(GameEvent::EnemySpawned {
        enemy: actor_id(ctx.world, clone),
        species: Species::Slime,
        position,
    });
    Ok(clone)
}
