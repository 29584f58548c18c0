//! Archer fire control: target upkeep and the `Idle -> PreAttack -> Attack`
//! state machine.
//!
//! A volley is released by the `VolleyRelease` cue from the animation layer,
//! or by the release fallback timer if the cue never arrives.

use hecs::Entity;
use tracing::{trace, warn};

use bastion_core::components::{Archer, PoolMember, Transform};
use bastion_core::constants::*;
use bastion_core::enums::{ActionSignal, ArcherAction, FacingDirection};
use bastion_core::events::GameEvent;
use bastion_core::types::Vec2;

use crate::context::TickContext;
use crate::pool::{actor_id, entity_of};
use crate::systems::{ballistics, targeting};

/// Four-way facing from the dominant axis of `delta`.
pub fn facing_toward(delta: Vec2) -> FacingDirection {
    if delta.x.abs() > delta.y.abs() {
        FacingDirection::Side
    } else if delta.y > 0.0 {
        FacingDirection::Up
    } else {
        FacingDirection::Down
    }
}

/// Spread angles (degrees) for a volley of `count`, evenly over the fixed arc.
pub fn volley_angles(count: u32) -> Vec<f32> {
    let half = VOLLEY_SPREAD_DEG / 2.0;
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        n => (0..n)
            .map(|i| {
                let f = i as f32 / (n - 1) as f32;
                -half + (2.0 * half) * f
            })
            .collect(),
    }
}

/// Clear all fire-control state, cancelling pending timers.
pub fn reset_archer(archer: &mut Archer) {
    *archer = Archer::default();
}

/// Run fire control for every active, armed archer.
pub fn run(ctx: &mut TickContext, archers: &mut Vec<Entity>) {
    archers.clear();
    for (entity, (member, archer)) in ctx.world.query_mut::<(&PoolMember, &Archer)>() {
        if member.active && archer.loadout.is_some() {
            archers.push(entity);
        }
    }
    for entity in archers.drain(..) {
        update_archer(ctx, entity);
    }
}

fn signal(ctx: &mut TickContext, archer: Entity, action: ActionSignal, facing: FacingDirection) {
    ctx.events.push(GameEvent::Signal {
        actor: actor_id(ctx.world, archer),
        action,
        facing: Some(facing),
    });
}

fn update_archer(ctx: &mut TickContext, entity: Entity) {
    let Ok(mut archer) = ctx.world.get::<&Archer>(entity).map(|a| (*a).clone()) else {
        return;
    };
    let Some(range) = archer.loadout.as_ref().map(|l| l.range) else {
        return;
    };
    let origin = ctx
        .world
        .get::<&Transform>(entity)
        .map(|t| t.position)
        .unwrap_or(Vec2::ZERO);
    let dt = ctx.dt;

    let held = archer
        .target
        .and_then(|id| entity_of(ctx.world, id))
        .filter(|&t| targeting::is_valid_target(ctx.world, t, origin, range));
    let target = held.or_else(|| targeting::find_best_target(ctx.world, origin, range));
    archer.target = target.map(|t| actor_id(ctx.world, t));

    let mut fire = false;
    match target {
        None => {
            if archer.action != ArcherAction::Idle {
                archer.action = ArcherAction::Idle;
                archer.pre_attack_timer = None;
                archer.release_timer = None;
                archer.idle_reset_timer = Some(IDLE_RESET_DELAY);
                signal(ctx, entity, ActionSignal::Idle, archer.direction);
            } else if let Some(remaining) = archer.idle_reset_timer.as_mut() {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    archer.idle_reset_timer = None;
                    archer.direction = FacingDirection::Down;
                    signal(ctx, entity, ActionSignal::Idle, archer.direction);
                }
            }
        }
        Some(target) => {
            archer.idle_reset_timer = None;
            if let Ok(t) = ctx.world.get::<&Transform>(target) {
                archer.direction = facing_toward(t.position - origin);
            }
            archer.cooldown = (archer.cooldown - dt).max(0.0);

            match archer.action {
                ArcherAction::Idle => {
                    if archer.cooldown <= 0.0 {
                        archer.action = ArcherAction::PreAttack;
                        archer.pre_attack_timer = Some(PRE_ATTACK_LEAD);
                        signal(ctx, entity, ActionSignal::PreAttack, archer.direction);
                    }
                }
                ArcherAction::PreAttack => {
                    let remaining = archer.pre_attack_timer.unwrap_or(0.0) - dt;
                    if remaining <= 0.0 {
                        archer.action = ArcherAction::Attack;
                        archer.pre_attack_timer = None;
                        archer.release_timer = Some(ATTACK_RELEASE_TIMEOUT);
                        signal(ctx, entity, ActionSignal::Attack, archer.direction);
                    } else {
                        archer.pre_attack_timer = Some(remaining);
                    }
                }
                ArcherAction::Attack => match archer.release_timer {
                    Some(remaining) if remaining - dt <= 0.0 => {
                        archer.release_timer = None;
                        fire = true;
                    }
                    Some(remaining) => archer.release_timer = Some(remaining - dt),
                    None => {
                        if archer.cooldown <= 0.0 {
                            archer.release_timer = Some(ATTACK_RELEASE_TIMEOUT);
                            signal(ctx, entity, ActionSignal::Attack, archer.direction);
                        }
                    }
                },
            }
        }
    }

    if let Ok(mut slot) = ctx.world.get::<&mut Archer>(entity) {
        *slot = archer;
    }
    if fire {
        fire_volley(ctx, entity);
    }
}

/// Handle the `VolleyRelease` cue. Ignored unless the archer is waiting on it.
pub fn release_volley(ctx: &mut TickContext, entity: Entity) -> bool {
    let waiting = match ctx.world.get::<&mut Archer>(entity) {
        Ok(mut archer) if archer.action == ArcherAction::Attack && archer.release_timer.is_some() => {
            archer.release_timer = None;
            true
        }
        _ => false,
    };
    waiting && fire_volley(ctx, entity)
}

/// Spawn one volley. Member `i` goes to the i-th best target in range, or to
/// the primary target when there are fewer. Nothing fires without a valid
/// primary target.
fn fire_volley(ctx: &mut TickContext, entity: Entity) -> bool {
    let Ok((origin, archer)) = ctx
        .world
        .query_one_mut::<(&Transform, &Archer)>(entity)
        .map(|(t, a)| (t.position, a.clone()))
    else {
        return false;
    };
    let Some(loadout) = archer.loadout else {
        return false;
    };
    let Some(primary) = archer
        .target
        .and_then(|id| entity_of(ctx.world, id))
        .filter(|&t| targeting::is_valid_target(ctx.world, t, origin, loadout.range))
    else {
        return false;
    };

    if let Ok(mut a) = ctx.world.get::<&mut Archer>(entity) {
        a.cooldown = loadout.archer.fire_interval;
    }

    let ranked = targeting::ranked(origin, targeting::candidates(ctx.world, origin, loadout.range));
    let mut launched = 0;
    for (i, angle) in volley_angles(loadout.archer.arrows_per_shot).into_iter().enumerate() {
        let target = ranked.get(i).map(|c| c.entity).unwrap_or(primary);
        match ballistics::launch(ctx, origin, Some(target), &loadout.arrow, angle) {
            Ok(_) => launched += 1,
            Err(err) => warn!(%err, "projectile launch skipped"),
        }
    }

    trace!(archer = ?entity, launched, "volley fired");
    ctx.events.push(GameEvent::VolleyFired {
        archer: actor_id(ctx.world, entity),
        projectiles: launched,
    });
    true
}
