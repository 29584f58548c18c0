//! Projectile ballistics and hit resolution.
//!
//! Projectiles fly a parametric arc toward the live position of their target.
//! Hit detection opens past the midpoint of the flight; landing (`t >= 1`)
//! resolves the shot if contact never happened.

use hecs::Entity;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use bastion_core::components::*;
use bastion_core::config::ArrowTier;
use bastion_core::constants::*;
use bastion_core::enums::ProjectilePhase;
use bastion_core::error::ConfigurationError;
use bastion_core::events::{GameEvent, HitOutcome};
use bastion_core::types::{perpendicular, Vec2};

use crate::context::TickContext;
use crate::pool::{actor_id, entity_of, is_active};
use crate::systems::effects::{self, EffectKind};
use crate::systems::enemy::{self, enabled_collider};

/// Launch parameters derived from origin, target, and spread angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchPlan {
    pub target_point: Vec2,
    pub flight_duration: f32,
    pub arc_height: f32,
}

pub fn flight_duration(distance: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return FLIGHT_DURATION_MAX;
    }
    (distance / speed).clamp(FLIGHT_DURATION_MIN, FLIGHT_DURATION_MAX)
}

/// Distance term, target height term, and vertical delta term, clamped to [2, 4].
pub fn arc_height(distance: f32, target_height: Option<f32>, vertical_delta: f32) -> f32 {
    let base = (distance * ARC_DISTANCE_FACTOR).clamp(ARC_BASE_MIN, ARC_BASE_MAX);
    let height = target_height
        .map(|h| (h * ARC_TARGET_HEIGHT_FACTOR).clamp(ARC_TARGET_HEIGHT_MIN, ARC_TARGET_HEIGHT_MAX))
        .unwrap_or(ARC_TARGET_HEIGHT_MAX);
    let boost = (vertical_delta * ARC_VERTICAL_FACTOR).clamp(ARC_VERTICAL_MIN, ARC_VERTICAL_MAX);
    (base + height + boost).clamp(ARC_HEIGHT_MIN, ARC_HEIGHT_MAX)
}

/// Rotate the aim line by `angle_deg` along its perpendicular and project it
/// out to at least the minimum simulated distance.
pub fn plan_launch(
    origin: Vec2,
    target: Option<Vec2>,
    target_height: Option<f32>,
    speed: f32,
    angle_deg: f32,
) -> LaunchPlan {
    let aim = target.unwrap_or(origin + Vec2::X * 3.0);
    let base = (aim - origin).normalize_or_zero();
    let spread = perpendicular(base) * angle_deg.to_radians().tan();
    let direction = (base + spread).normalize_or_zero();
    let simulated = origin.distance(aim).max(PROJECTILE_MIN_SIM_DISTANCE);
    let target_point = origin + direction * simulated;

    let distance = origin.distance(target_point);
    LaunchPlan {
        target_point,
        flight_duration: flight_duration(distance, speed),
        arc_height: arc_height(distance, target_height, target_point.y - origin.y),
    }
}

/// Ground-track interpolation plus the visual parabolic bump.
pub fn arc_position(start: Vec2, target: Vec2, t: f32, arc_height: f32) -> Vec2 {
    let linear = start.lerp(target, t);
    let bump = (4.0 * arc_height * t * (1.0 - t)).max(ARC_FLOOR) * ARC_VISUAL_SCALE;
    linear + Vec2::Y * bump
}

/// Accuracy roll, then integer damage in `[min, max]`, crit multiplier, and
/// armor with a floor of one net damage.
pub fn roll_hit(rng: &mut ChaCha8Rng, tuning: &ArrowTier, armor: i32) -> HitOutcome {
    if !rng.gen_bool(f64::from(tuning.accuracy.clamp(0.0, 1.0))) {
        return HitOutcome::Miss;
    }
    let lo = tuning.min_damage.min(tuning.max_damage);
    let hi = tuning.min_damage.max(tuning.max_damage);
    let mut raw = rng.gen_range(lo..=hi);
    let crit = rng.gen_bool(f64::from(tuning.crit_chance.clamp(0.0, 1.0)));
    if crit {
        raw = (raw as f32 * tuning.crit_multiplier).round() as i32;
    }
    HitOutcome::Hit {
        damage: (raw - armor).max(MIN_NET_DAMAGE),
        crit,
    }
}

/// Take a projectile from `tuning.pool_tag` and send it at `target`.
pub fn launch(
    ctx: &mut TickContext,
    origin: Vec2,
    target: Option<Entity>,
    tuning: &ArrowTier,
    angle_deg: f32,
) -> Result<Entity, ConfigurationError> {
    let live_target = target.filter(|&t| is_active(ctx.world, t));
    let (target_pos, target_height) = match live_target {
        Some(t) => (
            ctx.world.get::<&Transform>(t).ok().map(|tr| tr.position),
            ctx.world.get::<&EnemyStats>(t).ok().map(|s| s.collider_height),
        ),
        None => (None, None),
    };
    let plan = plan_launch(origin, target_pos, target_height, tuning.speed, angle_deg);
    let target_id = live_target.map(|t| actor_id(ctx.world, t));

    let entity = ctx.pool.spawn(ctx.world, ctx.catalog, &tuning.pool_tag, origin, 0.0)?;
    if let Ok(mut projectile) = ctx.world.get::<&mut Projectile>(entity) {
        *projectile = Projectile {
            phase: ProjectilePhase::Flying,
            start: origin,
            target: target_id,
            target_point: plan.target_point,
            elapsed: 0.0,
            flight_duration: plan.flight_duration,
            arc_height: plan.arc_height,
            can_hit: false,
            tuning: Some(tuning.clone()),
        };
    }
    Ok(entity)
}

/// Contact between a projectile and its target's collision bounds.
fn touches(position: Vec2, target: Vec2, radius: f32, height: f32) -> bool {
    let dx = (position.x - target.x).abs();
    let dy = position.y - target.y;
    dx <= radius + PROJECTILE_HIT_RADIUS
        && dy >= -PROJECTILE_HIT_RADIUS
        && dy <= height + PROJECTILE_HIT_RADIUS
}

/// Advance every in-flight projectile one tick.
pub fn run(ctx: &mut TickContext, flying: &mut Vec<Entity>) {
    flying.clear();
    for (entity, (member, projectile)) in ctx.world.query_mut::<(&PoolMember, &Projectile)>() {
        if member.active && projectile.phase == ProjectilePhase::Flying {
            flying.push(entity);
        }
    }

    for entity in flying.drain(..) {
        advance(ctx, entity);
    }
}

fn advance(ctx: &mut TickContext, entity: Entity) {
    let target = ctx
        .world
        .get::<&Projectile>(entity)
        .ok()
        .and_then(|p| p.target)
        .and_then(|id| entity_of(ctx.world, id))
        .filter(|&t| is_active(ctx.world, t));
    let Some(target) = target else {
        finish(ctx, entity, None, HitOutcome::Lost);
        return;
    };

    let (target_pos, radius, height, collider_on) = {
        let Ok((transform, stats, colliders)) = ctx
            .world
            .query_one_mut::<(&Transform, &EnemyStats, &HitColliders)>(target)
        else {
            finish(ctx, entity, None, HitOutcome::Lost);
            return;
        };
        (
            transform.position,
            stats.collider_radius,
            stats.collider_height,
            enabled_collider(colliders).is_some(),
        )
    };

    let dt = ctx.dt;
    let Ok((transform, projectile)) = ctx
        .world
        .query_one_mut::<(&mut Transform, &mut Projectile)>(entity)
    else {
        return;
    };
    projectile.target_point = target_pos;
    projectile.elapsed += dt;
    let t = if projectile.flight_duration > 0.0 {
        (projectile.elapsed / projectile.flight_duration).clamp(0.0, 1.0)
    } else {
        1.0
    };
    if !projectile.can_hit && t > HIT_ENABLE_PROGRESS {
        projectile.can_hit = true;
    }
    transform.position = arc_position(projectile.start, target_pos, t, projectile.arc_height);

    let contact =
        projectile.can_hit && collider_on && touches(transform.position, target_pos, radius, height);
    if contact || t >= 1.0 {
        let tuning = projectile.tuning.clone();
        resolve(ctx, entity, target, target_pos, tuning);
    }
}

fn resolve(
    ctx: &mut TickContext,
    projectile: Entity,
    target: Entity,
    target_pos: Vec2,
    tuning: Option<ArrowTier>,
) {
    let Some(tuning) = tuning else {
        finish(ctx, projectile, Some(target), HitOutcome::Lost);
        return;
    };
    let armor = ctx
        .world
        .get::<&EnemyStats>(target)
        .map(|s| s.armor)
        .unwrap_or(0);

    let outcome = roll_hit(ctx.rng, &tuning, armor);
    match outcome {
        HitOutcome::Hit { damage, crit } => {
            if crit {
                effects::spawn(ctx, EffectKind::Crit, target_pos);
            }
            effects::spawn(ctx, EffectKind::Blood, target_pos);
            enemy::apply_damage(ctx, target, damage as f32);
        }
        HitOutcome::Miss => {
            effects::spawn(ctx, EffectKind::Miss, target_pos);
        }
        HitOutcome::Lost => {}
    }
    finish(ctx, projectile, Some(target), outcome);
}

fn finish(ctx: &mut TickContext, projectile: Entity, target: Option<Entity>, outcome: HitOutcome) {
    if let Ok(mut p) = ctx.world.get::<&mut Projectile>(projectile) {
        p.phase = ProjectilePhase::Resolved;
    }
    ctx.pool.despawn(ctx.world, projectile);
    if let Ok(mut p) = ctx.world.get::<&mut Projectile>(projectile) {
        p.phase = ProjectilePhase::Recycled;
        p.target = None;
    }
    trace!(?projectile, ?outcome, "projectile resolved");
    ctx.events.push(GameEvent::ProjectileResolved {
        projectile: actor_id(ctx.world, projectile),
        target: target.map(|t| actor_id(ctx.world, t)),
        outcome,
    });
}
