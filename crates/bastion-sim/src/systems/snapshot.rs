//! Snapshot system: queries the ECS world and builds a complete GameStateSnapshot.
//!
//! This system is read-only. It never modifies the world.

use hecs::World;

use bastion_core::components::*;
use bastion_core::config::TowerLevel;
use bastion_core::enums::*;
use bastion_core::events::GameEvent;
use bastion_core::state::*;
use bastion_core::types::SimTime;

use crate::census::Census;
use crate::economy::Economy;
use crate::pool::member_id;
use crate::systems::enemy::enabled_collider;
use crate::systems::wave_spawner::WaveScheduler;
use crate::tower::Tower;

/// Session services the snapshot reads besides the world.
pub struct SnapshotSources<'a> {
    pub scheduler: &'a WaveScheduler,
    pub economy: &'a Economy,
    pub census: &'a Census,
    pub towers: &'a [Tower],
    pub tower_levels: &'a [TowerLevel],
    pub sell_refund_fraction: f32,
}

/// Build a complete GameStateSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    sources: SnapshotSources,
    events: Vec<GameEvent>,
) -> GameStateSnapshot {
    GameStateSnapshot {
        time: *time,
        phase,
        wave: WaveView {
            current: sources.scheduler.current_wave(),
            total: sources.scheduler.total_waves(),
            enemies_in_wave: sources.scheduler.enemies_in_current_wave(),
            phase: sources.scheduler.phase(),
            countdown_secs: sources.scheduler.countdown(),
        },
        hearts: sources.economy.hearts(),
        coins: sources.economy.coins(),
        alive_enemies: sources.census.alive(),
        enemies: build_enemies(world),
        projectiles: build_projectiles(world),
        towers: build_towers(&sources),
        archers: build_archers(world),
        events,
    }
}

fn build_enemies(world: &World) -> Vec<EnemyView> {
    world
        .query::<(
            &PoolMember,
            &EnemyStats,
            &EnemyLife,
            &Transform,
            &Health,
            &Facing,
            &HitColliders,
            Option<&SlimeState>,
        )>()
        .iter()
        .filter(|(_, (member, ..))| member.active)
        .map(
            |(entity, (member, stats, life, transform, health, facing, colliders, slime))| EnemyView {
                id: member_id(entity, member.generation),
                species: stats.species,
                slime: slime.map(|s| s.kind),
                state: life.state,
                position: transform.position,
                health: health.current,
                max_health: health.max,
                direction: facing.last_valid_direction,
                collider: enabled_collider(colliders),
            },
        )
        .collect()
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    world
        .query::<(&PoolMember, &Projectile, &Transform)>()
        .iter()
        .filter(|(_, (member, projectile, _))| {
            member.active && projectile.phase == ProjectilePhase::Flying
        })
        .map(|(entity, (member, projectile, transform))| {
            let progress = if projectile.flight_duration > 0.0 {
                (projectile.elapsed / projectile.flight_duration).clamp(0.0, 1.0)
            } else {
                1.0
            };
            ProjectileView {
                id: member_id(entity, member.generation),
                position: transform.position,
                progress,
                target: projectile.target,
            }
        })
        .collect()
}

fn build_towers(sources: &SnapshotSources) -> Vec<TowerView> {
    sources
        .towers
        .iter()
        .map(|tower| TowerView {
            id: tower.id,
            position: tower.position,
            level: tower.level,
            display_name: tower
                .current_level(sources.tower_levels)
                .map(|l| l.display_name.clone()),
            rebuilding: tower.is_rebuilding(),
            archers: tower.archers.len(),
            next_upgrade_cost: tower.next_level(sources.tower_levels).map(|l| l.cost),
            sell_refund: tower.sell_refund(sources.sell_refund_fraction),
        })
        .collect()
}

fn build_archers(world: &World) -> Vec<ArcherView> {
    world
        .query::<(&PoolMember, &Archer, &Transform)>()
        .iter()
        .filter(|(_, (member, ..))| member.active)
        .map(|(entity, (member, archer, transform))| ArcherView {
            id: member_id(entity, member.generation),
            tower: archer.tower,
            position: transform.position,
            action: archer.action,
            direction: archer.direction,
            target: archer.target,
        })
        .collect()
}
