//! Pooled hit-feedback effects with fixed lifetimes.

use hecs::Entity;
use tracing::warn;

use bastion_core::components::{Effect, PoolMember};
use bastion_core::types::Vec2;

use crate::context::TickContext;

/// Which configured effect pool to draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Miss,
    Crit,
    Blood,
    Coin,
}

/// Spawn an effect if its pool tag is configured. A missing pool is logged
/// and otherwise ignored.
pub fn spawn(ctx: &mut TickContext, kind: EffectKind, position: Vec2) -> Option<Entity> {
    let catalog = ctx.catalog;
    let effects = &catalog.effects;
    let tag = match kind {
        EffectKind::Miss => effects.miss.as_deref(),
        EffectKind::Crit => effects.crit.as_deref(),
        EffectKind::Blood => effects.blood.as_deref(),
        EffectKind::Coin => effects.coin.as_deref(),
    }?;

    match ctx.pool.spawn(ctx.world, catalog, tag, position, 0.0) {
        Ok(entity) => {
            if let Ok(mut effect) = ctx.world.get::<&mut Effect>(entity) {
                effect.remaining_secs = Some(effect.lifetime_secs);
            }
            Some(entity)
        }
        Err(err) => {
            warn!(%err, ?kind, "effect spawn skipped");
            None
        }
    }
}

/// Count down effect lifetimes and return expired effects to the pool.
pub fn run(ctx: &mut TickContext, expired: &mut Vec<Entity>) {
    expired.clear();
    for (entity, (member, effect)) in ctx.world.query_mut::<(&PoolMember, &mut Effect)>() {
        if !member.active {
            continue;
        }
        let Some(remaining) = effect.remaining_secs.as_mut() else {
            continue;
        };
        *remaining -= ctx.dt;
        if *remaining <= 0.0 {
            effect.remaining_secs = None;
            expired.push(entity);
        }
    }
    for entity in expired.drain(..) {
        ctx.pool.despawn(ctx.world, entity);
    }
}
