//! Enemy lifecycle: spawn, damage, death, leaks, facing, and timers.
//!
//! State machine: `Alive -> Dying -> Recycled`. `reset_enemy` is the only way
//! back to `Alive` and cancels every pending timer on the instance first.

use hecs::{Entity, World};
use rand::Rng;
use tracing::debug;

use bastion_core::components::*;
use bastion_core::constants::{DEATH_RECYCLE_DELAY, FACING_MIN_DELTA};
use bastion_core::enums::*;
use bastion_core::error::ConfigurationError;
use bastion_core::events::GameEvent;
use bastion_core::types::Vec2;

use crate::context::TickContext;
use crate::pool::{actor_id, is_active};
use crate::systems::effects::{self, EffectKind};
use crate::systems::{movement, split};

/// What a damage application did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Enemy was not alive (dying, recycled, or not an enemy).
    Ignored,
    Wounded,
    Killed,
    /// A normal slime was replaced by a splitting one.
    Split,
}

/// Collider enabled for a movement direction: side when horizontal motion
/// dominates, back when moving up, front otherwise.
pub fn select_collider(direction: Vec2) -> ColliderSide {
    if direction.x.abs() > direction.y.abs() {
        ColliderSide::Side
    } else if direction.y > 0.0 {
        ColliderSide::Back
    } else {
        ColliderSide::Front
    }
}

pub fn set_collider(colliders: &mut HitColliders, side: Option<ColliderSide>) {
    *colliders = HitColliders {
        front: side == Some(ColliderSide::Front),
        back: side == Some(ColliderSide::Back),
        side: side == Some(ColliderSide::Side),
    };
}

pub fn enabled_collider(colliders: &HitColliders) -> Option<ColliderSide> {
    if colliders.front {
        Some(ColliderSide::Front)
    } else if colliders.back {
        Some(ColliderSide::Back)
    } else if colliders.side {
        Some(ColliderSide::Side)
    } else {
        None
    }
}

/// Pool re-acquisition hook: back to `Alive` at full health with motion and
/// colliders enabled and no pending timers.
pub fn reset_enemy(world: &mut World, entity: Entity) {
    let Ok((transform, health, life, facing, colliders, mover)) = world.query_one_mut::<(
        &Transform,
        &mut Health,
        &mut EnemyLife,
        &mut Facing,
        &mut HitColliders,
        &mut Mover,
    )>(entity) else {
        return;
    };

    *life = EnemyLife {
        state: EnemyState::Alive,
        recycle_timer: None,
    };
    health.current = health.max;
    *facing = Facing {
        last_position: transform.position,
        move_direction: Vec2::ZERO,
        last_valid_direction: Vec2::NEG_Y,
        frozen: false,
    };
    set_collider(colliders, Some(ColliderSide::Front));
    mover.waypoint_index = 0;
    mover.offset = Vec2::ZERO;
    mover.snap_to_first = true;
    mover.override_start = true;
    mover.enabled = true;
    mover.path_complete = false;

    if let Ok(mut slime) = world.get::<&mut SlimeState>(entity) {
        *slime = SlimeState {
            kind: slime.kind,
            ..Default::default()
        };
    }
    if let Ok(mut decay) = world.get::<&mut Decay>(entity) {
        decay.remaining = decay.interval;
    }
}

/// Spawn one wave enemy at the head of the path with a lateral offset and
/// register it with the census.
pub fn spawn_wave_enemy(
    ctx: &mut TickContext,
    tag: &str,
    offset: Vec2,
) -> Result<Entity, ConfigurationError> {
    let start = ctx.catalog.path.waypoint(0).unwrap_or(Vec2::ZERO);
    let entity = ctx.pool.spawn(ctx.world, ctx.catalog, tag, start, 0.0)?;
    if ctx.world.get::<&EnemyLife>(entity).is_err() {
        ctx.pool.despawn(ctx.world, entity);
        return Err(ConfigurationError::invalid(
            "enemy_tag",
            format!("pool `{tag}` does not hold enemies"),
        ));
    }
    reset_enemy(ctx.world, entity);

    let position = match ctx
        .world
        .query_one_mut::<(&mut Mover, &mut Transform, &mut Facing)>(entity)
    {
        Ok((mover, transform, facing)) => {
            mover.offset = offset;
            mover.snap_to_first = true;
            mover.override_start = true;
            movement::initialize_position(mover, &mut transform.position);
            facing.last_position = transform.position;
            transform.position
        }
        Err(_) => start,
    };

    ctx.census.register();
    let species = species_of(ctx.world, entity);
    ctx.events.push(GameEvent::EnemySpawned {
        enemy: actor_id(ctx.world, entity),
        species,
        position,
    });
    Ok(entity)
}

/// Apply damage. Clamps health to `[0, max]`; a kill runs the death branch
/// exactly once. Calls on dying or recycled enemies are ignored.
pub fn apply_damage(ctx: &mut TickContext, entity: Entity, amount: f32) -> DamageOutcome {
    if !is_alive(ctx.world, entity) {
        return DamageOutcome::Ignored;
    }

    let killed = match ctx.world.get::<&mut Health>(entity) {
        Ok(mut health) => {
            health.current = (health.current - amount).clamp(0.0, health.max);
            health.current <= 0.0
        }
        Err(_) => return DamageOutcome::Ignored,
    };
    if !killed {
        return DamageOutcome::Wounded;
    }

    if try_split(ctx, entity) {
        return DamageOutcome::Split;
    }
    begin_dying(ctx, entity);
    DamageOutcome::Killed
}

/// A normal slime that has not split yet rolls its split chance.
fn try_split(ctx: &mut TickContext, entity: Entity) -> bool {
    let Ok(slime) = ctx.world.get::<&SlimeState>(entity).map(|s| *s) else {
        return false;
    };
    if slime.kind != SlimeKind::Normal || slime.has_split {
        return false;
    }
    let catalog = ctx.catalog;
    let Some(profile) = catalog.split_profile(species_of(ctx.world, entity)) else {
        return false;
    };
    if !ctx.rng.gen_bool(f64::from(profile.chance.clamp(0.0, 1.0))) {
        return false;
    }
    split::begin_split(ctx, entity, profile).is_ok()
}

/// Enter `Dying`: freeze facing, drop colliders and motion, leave the census,
/// pay the bounty, and schedule the recycle.
pub fn begin_dying(ctx: &mut TickContext, entity: Entity) {
    let Ok((transform, stats, life, facing, colliders, mover)) = ctx.world.query_one_mut::<(
        &Transform,
        &EnemyStats,
        &mut EnemyLife,
        &mut Facing,
        &mut HitColliders,
        &mut Mover,
    )>(entity) else {
        return;
    };
    if life.state != EnemyState::Alive {
        return;
    }

    life.state = EnemyState::Dying;
    life.recycle_timer = Some(DEATH_RECYCLE_DELAY);
    facing.frozen = true;
    facing.move_direction = facing.last_valid_direction;
    set_collider(colliders, None);
    mover.enabled = false;
    let position = transform.position;
    let species = stats.species;
    let coins = stats.coin_value;

    let interrupted = match ctx.world.get::<&mut SlimeState>(entity) {
        Ok(mut slime) if slime.kind == SlimeKind::Special && slime.is_splitting => {
            slime.stop_split = true;
            slime.is_splitting = false;
            slime.split_timer = None;
            true
        }
        _ => false,
    };
    if interrupted {
        debug!(slime = ?entity, "split interrupted by death");
        ctx.events.push(GameEvent::SplitInterrupted {
            special: actor_id(ctx.world, entity),
        });
    }

    ctx.census.unregister();
    ctx.economy.add_coins(coins);
    ctx.events.push(GameEvent::Signal {
        actor: actor_id(ctx.world, entity),
        action: ActionSignal::Die,
        facing: None,
    });
    ctx.events.push(GameEvent::EnemyKilled {
        enemy: actor_id(ctx.world, entity),
        species,
        coins,
    });
    effects::spawn(ctx, EffectKind::Coin, position);
}

/// Retire an enemy immediately without a death window.
pub fn recycle(ctx: &mut TickContext, entity: Entity) {
    if let Ok(mut life) = ctx.world.get::<&mut EnemyLife>(entity) {
        life.state = EnemyState::Recycled;
        life.recycle_timer = None;
    }
    if let Ok(mut mover) = ctx.world.get::<&mut Mover>(entity) {
        mover.enabled = false;
    }
    ctx.pool.despawn(ctx.world, entity);
}

/// Enemies that walked off the end of the path cost hearts and leave the census.
pub fn handle_arrivals(ctx: &mut TickContext, arrived: &[Entity]) {
    for &entity in arrived {
        if !is_alive(ctx.world, entity) {
            continue;
        }
        let hearts_lost = ctx
            .world
            .get::<&EnemyStats>(entity)
            .map(|s| s.damage_at_end_of_path)
            .unwrap_or(0);
        ctx.economy.take_damage(hearts_lost);
        recycle(ctx, entity);
        ctx.census.unregister();
        ctx.events.push(GameEvent::EnemyLeaked {
            enemy: actor_id(ctx.world, entity),
            hearts_lost,
        });
    }
}

/// Track movement direction and keep the matching hit collider enabled.
pub fn update_facing(world: &mut World) {
    for (_entity, (member, life, transform, facing, colliders, slime)) in world.query_mut::<(
        &PoolMember,
        &EnemyLife,
        &Transform,
        &mut Facing,
        &mut HitColliders,
        Option<&SlimeState>,
    )>() {
        if !member.active || life.state != EnemyState::Alive || facing.frozen {
            continue;
        }
        let delta = transform.position - facing.last_position;
        facing.last_position = transform.position;
        if delta.length() > FACING_MIN_DELTA {
            let direction = delta.normalize();
            facing.move_direction = direction;
            facing.last_valid_direction = direction;
        } else {
            facing.move_direction = Vec2::ZERO;
        }

        let splitting = slime.is_some_and(|s| s.is_splitting);
        let side = (!splitting).then(|| select_collider(facing.last_valid_direction));
        set_collider(colliders, side);
    }
}

/// Death-window recycles, split fallbacks, and periodic self-damage.
pub fn run_timers(ctx: &mut TickContext, expired: &mut Vec<Entity>) {
    expired.clear();
    for (entity, (member, life)) in ctx.world.query_mut::<(&PoolMember, &mut EnemyLife)>() {
        if !member.active || life.state != EnemyState::Dying {
            continue;
        }
        let Some(remaining) = life.recycle_timer.as_mut() else {
            continue;
        };
        *remaining -= ctx.dt;
        if *remaining <= 0.0 {
            expired.push(entity);
        }
    }
    for entity in expired.drain(..) {
        recycle(ctx, entity);
    }

    for (entity, (member, slime)) in ctx.world.query_mut::<(&PoolMember, &mut SlimeState)>() {
        if !member.active {
            continue;
        }
        let Some(remaining) = slime.split_timer.as_mut() else {
            continue;
        };
        *remaining -= ctx.dt;
        if *remaining <= 0.0 {
            slime.split_timer = None;
            expired.push(entity);
        }
    }
    for entity in expired.drain(..) {
        split::complete_split(ctx, entity);
    }

    let mut doses = Vec::new();
    for (entity, (member, life, decay)) in ctx
        .world
        .query_mut::<(&PoolMember, &EnemyLife, &mut Decay)>()
    {
        if !member.active || life.state != EnemyState::Alive {
            continue;
        }
        decay.remaining -= ctx.dt;
        if decay.remaining <= 0.0 {
            decay.remaining += decay.interval;
            doses.push((entity, decay.amount));
        }
    }
    for (entity, amount) in doses {
        if apply_damage(ctx, entity, amount) == DamageOutcome::Killed {
            debug!(enemy = ?entity, "enemy wore itself down");
        }
    }
}

pub fn is_alive(world: &World, entity: Entity) -> bool {
    is_active(world, entity)
        && world
            .get::<&EnemyLife>(entity)
            .map(|l| l.state == EnemyState::Alive)
            .unwrap_or(false)
}

fn species_of(world: &World, entity: Entity) -> Species {
    world
        .get::<&EnemyStats>(entity)
        .map(|s| s.species)
        .unwrap_or(Species::Bee)
}
