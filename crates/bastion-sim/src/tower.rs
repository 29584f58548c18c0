//! Tower sites and their upgrade track.
//!
//! Stored in `SimulationEngine`'s tower list, NOT as ECS entities. A tower
//! owns its visual and archer squad; the squad is rebuilt wholesale after
//! each upgrade once the rebuild sequence reaches idle.

use hecs::Entity;
use tracing::{info, warn};

use bastion_core::components::{Archer, ArcherLoadout, TowerVisual};
use bastion_core::config::TowerLevel;
use bastion_core::constants::{ARCHER_SLOT_HEIGHT, ARCHER_SLOT_SPACING, TOWER_REBUILD_TIMEOUT};
use bastion_core::error::InvalidStateTransition;
use bastion_core::events::GameEvent;
use bastion_core::types::{TowerId, Vec2};

use crate::context::TickContext;
use crate::systems::fire_control;

/// A tower site.
#[derive(Debug, Clone)]
pub struct Tower {
    pub id: TowerId,
    pub position: Vec2,
    /// Index into the level track; -1 while unbuilt.
    pub level: i32,
    /// Sum of the costs paid for the current build.
    pub invested: i32,
    pub visual: Option<Entity>,
    pub archers: Vec<Entity>,
    /// Waiting for the rebuild sequence to reach idle, with fallback.
    pub rebuild_timer: Option<f32>,
}

impl Tower {
    pub fn new(id: TowerId, position: Vec2) -> Self {
        Self {
            id,
            position,
            level: -1,
            invested: 0,
            visual: None,
            archers: Vec::new(),
            rebuild_timer: None,
        }
    }

    pub fn is_built(&self) -> bool {
        self.level >= 0
    }

    pub fn is_rebuilding(&self) -> bool {
        self.rebuild_timer.is_some()
    }

    pub fn current_level<'a>(&self, levels: &'a [TowerLevel]) -> Option<&'a TowerLevel> {
        usize::try_from(self.level).ok().and_then(|i| levels.get(i))
    }

    pub fn next_level<'a>(&self, levels: &'a [TowerLevel]) -> Option<&'a TowerLevel> {
        usize::try_from(self.level + 1).ok().and_then(|i| levels.get(i))
    }

    /// The next level, if an upgrade may start now.
    pub fn can_upgrade<'a>(
        &self,
        levels: &'a [TowerLevel],
    ) -> Result<&'a TowerLevel, InvalidStateTransition> {
        if self.is_rebuilding() {
            return Err(InvalidStateTransition::UpgradeInProgress);
        }
        self.next_level(levels)
            .ok_or(InvalidStateTransition::MaxLevelReached)
    }

    /// `floor(invested * fraction)`.
    pub fn sell_refund(&self, fraction: f32) -> i32 {
        (self.invested as f32 * fraction).floor() as i32
    }
}

/// Local offset of archer slot `index` out of `count`, centered on the tower.
pub fn archer_slot(index: u32, count: u32) -> Vec2 {
    let center = (count.max(1) - 1) as f32 / 2.0;
    Vec2::new((index as f32 - center) * ARCHER_SLOT_SPACING, ARCHER_SLOT_HEIGHT)
}

/// Pay for and start the next level: swap the visual, drop the old squad,
/// and wait for the rebuild before arming new archers.
pub fn upgrade(
    ctx: &mut TickContext,
    tower: &mut Tower,
    levels: &[TowerLevel],
) -> Result<(), InvalidStateTransition> {
    let next = tower.can_upgrade(levels)?;
    if !ctx.economy.spend_coins(next.cost) {
        return Err(InvalidStateTransition::InsufficientCoins);
    }

    despawn_squad(ctx, tower);
    tower.level += 1;
    tower.invested += next.cost;

    let visual_tag = format!("Tower{}", tower.level + 1);
    match ctx
        .pool
        .spawn(ctx.world, ctx.catalog, &visual_tag, tower.position, 0.0)
    {
        Ok(visual) => {
            if let Ok(mut v) = ctx.world.get::<&mut TowerVisual>(visual) {
                v.tower = Some(tower.id);
            }
            tower.visual = Some(visual);
        }
        Err(err) => warn!(%err, tower = tower.id.0, "tower visual missing"),
    }
    tower.rebuild_timer = Some(TOWER_REBUILD_TIMEOUT);

    info!(tower = tower.id.0, level = tower.level, cost = next.cost, "tower upgraded");
    ctx.events.push(GameEvent::TowerUpgraded {
        tower: tower.id,
        level: tower.level,
        cost: next.cost,
    });
    Ok(())
}

/// Arm the squad for the current level. No-op unless a rebuild is pending.
pub fn finish_rebuild(ctx: &mut TickContext, tower: &mut Tower, levels: &[TowerLevel]) -> bool {
    if tower.rebuild_timer.take().is_none() {
        return false;
    }
    let Some(level) = tower.current_level(levels) else {
        return false;
    };

    let tag = level.archer.pool_tag();
    let loadout = ArcherLoadout {
        archer: level.archer.clone(),
        arrow: level.arrow.clone(),
        range: level.range,
    };
    for i in 0..level.archer_count {
        let offset = archer_slot(i, level.archer_count);
        let spawned = match tower.visual {
            Some(visual) => ctx
                .pool
                .spawn_attached(ctx.world, ctx.catalog, &tag, visual, offset),
            None => ctx
                .pool
                .spawn(ctx.world, ctx.catalog, &tag, tower.position + offset, 0.0),
        };
        match spawned {
            Ok(entity) => {
                if let Ok(mut archer) = ctx.world.get::<&mut Archer>(entity) {
                    fire_control::reset_archer(&mut archer);
                    archer.tower = Some(tower.id);
                    archer.loadout = Some(loadout.clone());
                }
                tower.archers.push(entity);
            }
            Err(err) => warn!(%err, tower = tower.id.0, "archer spawn skipped"),
        }
    }

    ctx.events.push(GameEvent::TowerRebuilt {
        tower: tower.id,
        archers: tower.archers.len() as u32,
    });
    true
}

/// Count down the rebuild fallback.
pub fn tick_rebuild(ctx: &mut TickContext, tower: &mut Tower, levels: &[TowerLevel]) {
    let Some(remaining) = tower.rebuild_timer.as_mut() else {
        return;
    };
    *remaining -= ctx.dt;
    if *remaining <= 0.0 {
        finish_rebuild(ctx, tower, levels);
    }
}

/// Refund part of the investment and return the site to unbuilt.
pub fn sell(
    ctx: &mut TickContext,
    tower: &mut Tower,
    refund_fraction: f32,
) -> Result<i32, InvalidStateTransition> {
    if !tower.is_built() {
        return Err(InvalidStateTransition::TowerNotBuilt);
    }
    let refund = tower.sell_refund(refund_fraction);
    ctx.economy.add_coins(refund);
    despawn_squad(ctx, tower);
    tower.level = -1;
    tower.invested = 0;
    tower.rebuild_timer = None;

    info!(tower = tower.id.0, refund, "tower sold");
    ctx.events.push(GameEvent::TowerSold {
        tower: tower.id,
        refund,
    });
    Ok(refund)
}

/// Despawn archers (with their pending timers) and the visual.
fn despawn_squad(ctx: &mut TickContext, tower: &mut Tower) {
    for archer in tower.archers.drain(..) {
        if let Ok(mut a) = ctx.world.get::<&mut Archer>(archer) {
            fire_control::reset_archer(&mut a);
        }
        ctx.pool.despawn(ctx.world, archer);
    }
    if let Some(visual) = tower.visual.take() {
        if let Ok(mut v) = ctx.world.get::<&mut TowerVisual>(visual) {
            v.tower = None;
        }
        ctx.pool.despawn(ctx.world, visual);
    }
}
