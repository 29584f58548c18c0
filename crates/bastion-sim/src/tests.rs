//! Scenario tests for the engine: wave flow, targeting, splits, economy, and outcomes.

use hecs::Entity;

use bastion_core::commands::{AnimationCue, PlayerCommand};
use bastion_core::components::{
    Archer, EnemyLife, Health, Mover, PoolMember, Projectile, SlimeState, Transform,
};
use bastion_core::config::{ArrowTier, SelfDamage, SessionConfig, WaveEnemy, WaveSpec};
use bastion_core::enums::*;
use bastion_core::error::{ConfigurationError, InvalidStateTransition};
use bastion_core::events::{GameEvent, HitOutcome};
use bastion_core::types::{TowerId, Vec2};

use crate::engine::SimulationEngine;
use crate::pool::{actor_id, entity_of};
use crate::systems::ballistics;
use crate::systems::enemy::{self, DamageOutcome};

fn single_wave(tag: &str, count: u32, spawn_interval: f32) -> SessionConfig {
    SessionConfig {
        waves: vec![WaveSpec {
            enemies: vec![WaveEnemy {
                enemy_tag: tag.to_string(),
                count,
            }],
            spawn_interval,
        }],
        ..Default::default()
    }
}

fn with_split_chance(chance: f32) -> SessionConfig {
    let mut config = SessionConfig::default();
    for profile in &mut config.species {
        if let Some(split) = profile.split.as_mut() {
            split.chance = chance;
        }
    }
    config
}

fn alive_enemies(engine: &SimulationEngine) -> Vec<Entity> {
    let mut q = engine.world().query::<(&PoolMember, &EnemyLife)>();
    q.iter()
        .filter(|(_, (m, l))| m.active && l.state == EnemyState::Alive)
        .map(|(e, _)| e)
        .collect()
}

fn slimes_of_kind(engine: &SimulationEngine, kind: SlimeKind) -> Vec<Entity> {
    let mut q = engine
        .world()
        .query::<(&PoolMember, &EnemyLife, &SlimeState)>();
    q.iter()
        .filter(|(_, (m, l, s))| m.active && l.state == EnemyState::Alive && s.kind == kind)
        .map(|(e, _)| e)
        .collect()
}

fn spawn(engine: &mut SimulationEngine, tag: &str) -> Entity {
    engine
        .with_context(|ctx| enemy::spawn_wave_enemy(ctx, tag, Vec2::ZERO))
        .unwrap()
}

fn damage(engine: &mut SimulationEngine, entity: Entity, amount: f32) -> DamageOutcome {
    engine.with_context(|ctx| enemy::apply_damage(ctx, entity, amount))
}

/// Park an enemy at `position` with its path mover switched off.
fn park(engine: &mut SimulationEngine, entity: Entity, position: Vec2) {
    engine.with_context(|ctx| {
        let (transform, mover) = ctx
            .world
            .query_one_mut::<(&mut Transform, &mut Mover)>(entity)
            .unwrap();
        transform.position = position;
        mover.enabled = false;
    });
}

fn health_of(engine: &SimulationEngine, entity: Entity) -> f32 {
    engine.world().get::<&Health>(entity).unwrap().current
}

fn rejected(events: &[GameEvent]) -> Vec<InvalidStateTransition> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::CommandRejected { reason } => Some(*reason),
            _ => None,
        })
        .collect()
}

/// Arrow tuning with a fixed damage roll and no crits.
fn fixed_arrow(accuracy: f32, damage: i32) -> ArrowTier {
    ArrowTier {
        pool_tag: "Arrow1".to_string(),
        speed: 10.0,
        accuracy,
        min_damage: damage,
        max_damage: damage,
        crit_chance: 0.0,
        crit_multiplier: 2.0,
    }
}

fn launch_at(
    engine: &mut SimulationEngine,
    origin: Vec2,
    target: Entity,
    tuning: &ArrowTier,
) -> Entity {
    engine
        .with_context(|ctx| ballistics::launch(ctx, origin, Some(target), tuning, 0.0))
        .unwrap()
}

/// Tick until a projectile resolves and return its outcome.
fn next_resolution(engine: &mut SimulationEngine, max_ticks: usize) -> Option<HitOutcome> {
    for _ in 0..max_ticks {
        let snap = engine.tick();
        let outcome = snap.events.iter().find_map(|e| match e {
            GameEvent::ProjectileResolved { outcome, .. } => Some(*outcome),
            _ => None,
        });
        if outcome.is_some() {
            return outcome;
        }
    }
    None
}

/// Upgrade a tower and deliver the idle cue so its archers arm immediately.
fn build_tower(engine: &mut SimulationEngine, tower: TowerId) {
    engine.queue_command(PlayerCommand::UpgradeTower { tower });
    engine.tick();
    engine.queue_command(PlayerCommand::AnimationComplete {
        cue: AnimationCue::TowerIdleReached { tower },
    });
    engine.tick();
}

// ---- Wave flow ----

#[test]
fn test_wave_spawns_on_interval() {
    let mut engine = SimulationEngine::new(single_wave("Bee", 3, 1.0)).unwrap();
    engine.queue_command(PlayerCommand::StartWave);

    let mut spawn_ticks = Vec::new();
    for _ in 0..240 {
        let tick = engine.time().tick;
        let snap = engine.tick();
        if snap
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::EnemySpawned { .. }))
        {
            spawn_ticks.push(tick);
        }
    }

    assert_eq!(spawn_ticks.len(), 3);
    assert_eq!(spawn_ticks[0], 0);
    assert!((59..=61).contains(&spawn_ticks[1]), "second spawn at {}", spawn_ticks[1]);
    assert!((119..=122).contains(&spawn_ticks[2]), "third spawn at {}", spawn_ticks[2]);
    assert_eq!(engine.alive_enemies(), 3);
    assert!(engine.is_all_waves_complete());
    assert_eq!(engine.phase(), GamePhase::Active);
    assert_eq!(engine.tick().wave.enemies_in_wave, 3);
}

#[test]
fn test_unknown_wave_tag_rejected_at_construction() {
    let result = SimulationEngine::new(single_wave("Dragon", 1, 1.0));
    assert!(matches!(result, Err(ConfigurationError::UnknownPoolTag(tag)) if tag == "Dragon"));
}

#[test]
fn test_victory_fires_once_after_last_kill() {
    let mut engine = SimulationEngine::new(single_wave("Bee", 3, 1.0)).unwrap();
    engine.queue_command(PlayerCommand::StartWave);
    for _ in 0..240 {
        engine.tick();
    }
    assert_eq!(engine.phase(), GamePhase::Active);

    for e in alive_enemies(&engine) {
        assert_eq!(damage(&mut engine, e, 1000.0), DamageOutcome::Killed);
    }
    assert_eq!(engine.coins(), 100 + 3 * 5);

    let mut victories = 0;
    for _ in 0..10 {
        let snap = engine.tick();
        victories += snap
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Victory))
            .count();
    }
    assert_eq!(victories, 1);
    assert_eq!(engine.phase(), GamePhase::Victory);
    assert!(engine.census().is_victory_latched());
}

#[test]
fn test_no_victory_before_all_waves_issued() {
    let mut engine = SimulationEngine::new(single_wave("Bee", 2, 1.0)).unwrap();
    engine.queue_command(PlayerCommand::StartWave);
    engine.tick();

    let first = alive_enemies(&engine);
    assert_eq!(first.len(), 1);
    damage(&mut engine, first[0], 1000.0);
    assert_eq!(engine.alive_enemies(), 0);

    for _ in 0..30 {
        engine.tick();
    }
    assert_eq!(engine.phase(), GamePhase::Active);
}

#[test]
fn test_start_wave_while_spawning_rejected() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    engine.queue_command(PlayerCommand::StartWave);
    engine.queue_command(PlayerCommand::StartWave);
    let snap = engine.tick();

    assert_eq!(rejected(&snap.events), vec![InvalidStateTransition::WaveAlreadyRunning]);
    assert_eq!(engine.current_wave(), 1);
    assert_eq!(engine.wave_phase(), WavePhase::Spawning);
}

#[test]
fn test_next_wave_auto_starts_after_delay() {
    let mut config = SessionConfig::default();
    config.waves.truncate(2);
    config.waves[0].enemies = vec![WaveEnemy {
        enemy_tag: "Bee".to_string(),
        count: 1,
    }];
    config.delay_between_waves = 2.0;
    let mut engine = SimulationEngine::new(config).unwrap();
    engine.queue_command(PlayerCommand::StartWave);

    let mut started = Vec::new();
    for _ in 0..(60 * 5) {
        let snap = engine.tick();
        for event in &snap.events {
            if let GameEvent::WaveStarted { wave } = event {
                started.push(*wave);
            }
        }
    }
    assert_eq!(started, vec![1, 2]);
    assert_eq!(engine.current_wave(), 2);
}

// ---- Targeting and fire control ----

#[test]
fn test_archer_targets_nearest_equal_health_enemy() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    build_tower(&mut engine, TowerId(0));

    let archer = engine.towers()[0].archers[0];
    let origin = engine.world().get::<&Transform>(archer).unwrap().position;

    let far = spawn(&mut engine, "Bee");
    let near = spawn(&mut engine, "Bee");
    park(&mut engine, far, origin + Vec2::new(3.0, 0.0));
    park(&mut engine, near, origin + Vec2::new(0.0, 2.0));
    engine.tick();

    let target = engine.world().get::<&Archer>(archer).unwrap().target;
    assert_eq!(target, Some(actor_id(engine.world(), near)));
}

#[test]
fn test_archer_fires_volley_on_release_fallback() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    build_tower(&mut engine, TowerId(0));
    let archer = engine.towers()[0].archers[0];
    let origin = engine.world().get::<&Transform>(archer).unwrap().position;

    let bee = spawn(&mut engine, "Bee");
    park(&mut engine, bee, origin + Vec2::new(1.5, 0.0));

    let mut fired_at = None;
    for i in 0..60 {
        let snap = engine.tick();
        if snap
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::VolleyFired { projectiles: 1, .. }))
        {
            fired_at = Some(i);
            break;
        }
    }
    // Pre-attack lead plus the release fallback.
    let fired_at = fired_at.expect("archer never fired");
    assert!((20..=30).contains(&fired_at), "fired on tick {fired_at}");

    let mut resolved = false;
    for _ in 0..120 {
        let snap = engine.tick();
        if snap
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::ProjectileResolved { .. }))
        {
            resolved = true;
            break;
        }
    }
    assert!(resolved);
}

#[test]
fn test_volley_release_cue_fires_early() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    build_tower(&mut engine, TowerId(0));
    let archer = engine.towers()[0].archers[0];
    let origin = engine.world().get::<&Transform>(archer).unwrap().position;
    let bee = spawn(&mut engine, "Bee");
    park(&mut engine, bee, origin + Vec2::new(1.5, 0.0));

    // Run until the archer enters its attack pose.
    for _ in 0..20 {
        engine.tick();
        let action = engine.world().get::<&Archer>(archer).unwrap().action;
        if action == ArcherAction::Attack {
            break;
        }
    }
    assert_eq!(
        engine.world().get::<&Archer>(archer).unwrap().action,
        ArcherAction::Attack
    );

    engine.queue_command(PlayerCommand::AnimationComplete {
        cue: AnimationCue::VolleyRelease {
            archer: actor_id(engine.world(), archer),
        },
    });
    let snap = engine.tick();
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::VolleyFired { .. })));
}

#[test]
fn test_archer_idles_without_targets() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    build_tower(&mut engine, TowerId(0));
    for _ in 0..30 {
        engine.tick();
    }
    let archer = engine.towers()[0].archers[0];
    let state = (*engine.world().get::<&Archer>(archer).unwrap()).clone();
    assert_eq!(state.action, ArcherAction::Idle);
    assert_eq!(state.target, None);
    assert_eq!(engine.pool().active_count(engine.world(), "Arrow1"), 0);
}

#[test]
fn test_projectile_lost_when_target_leaves_mid_flight() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    let bee = spawn(&mut engine, "Bee");
    park(&mut engine, bee, Vec2::ZERO);
    launch_at(&mut engine, Vec2::new(-3.0, 0.0), bee, &fixed_arrow(1.0, 10));
    engine.tick();

    engine.with_context(|ctx| enemy::handle_arrivals(ctx, &[bee]));
    assert_eq!(next_resolution(&mut engine, 120), Some(HitOutcome::Lost));
    assert_eq!(health_of(&engine, bee), 50.0);
}

#[test]
fn test_projectile_ignores_replacement_in_recycled_slot() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    let old = spawn(&mut engine, "Bee");
    park(&mut engine, old, Vec2::ZERO);
    launch_at(&mut engine, Vec2::new(-2.0, 0.0), old, &fixed_arrow(1.0, 7));

    damage(&mut engine, old, 1000.0);
    engine.with_context(|ctx| enemy::recycle(ctx, old));
    let replacement = spawn(&mut engine, "Bee");
    assert_eq!(replacement, old, "pool hands the freed slot out again");
    park(&mut engine, replacement, Vec2::ZERO);

    assert_eq!(next_resolution(&mut engine, 120), Some(HitOutcome::Lost));
    assert_eq!(health_of(&engine, replacement), 50.0);
}

#[test]
fn test_hit_applies_net_damage_after_armor() {
    // Wolf armor 1, Orc armor 3.
    for (tag, arrow_damage, net, max_health) in [("Wolf", 12, 11, 50.0), ("Orc", 2, 1, 10_000.0)] {
        let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
        let target = spawn(&mut engine, tag);
        park(&mut engine, target, Vec2::ZERO);
        launch_at(&mut engine, Vec2::new(-2.0, 0.0), target, &fixed_arrow(1.0, arrow_damage));

        assert_eq!(
            next_resolution(&mut engine, 120),
            Some(HitOutcome::Hit {
                damage: net,
                crit: false
            }),
            "{tag}"
        );
        assert_eq!(health_of(&engine, target), max_health - net as f32, "{tag}");
    }
}

#[test]
fn test_miss_leaves_health_untouched() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    let bee = spawn(&mut engine, "Bee");
    park(&mut engine, bee, Vec2::ZERO);
    launch_at(&mut engine, Vec2::new(-2.0, 0.0), bee, &fixed_arrow(0.0, 30));

    assert_eq!(next_resolution(&mut engine, 120), Some(HitOutcome::Miss));
    assert_eq!(health_of(&engine, bee), 50.0);
}

#[test]
fn test_volley_spreads_over_ranked_targets_then_primary() {
    let mut config = SessionConfig::default();
    config.tower_levels[0].archer.arrows_per_shot = 3;
    let mut engine = SimulationEngine::new(config).unwrap();
    build_tower(&mut engine, TowerId(0));
    let archer = engine.towers()[0].archers[0];
    let origin = engine.world().get::<&Transform>(archer).unwrap().position;

    let near = spawn(&mut engine, "Bee");
    let far = spawn(&mut engine, "Bee");
    park(&mut engine, near, origin + Vec2::new(1.0, 0.0));
    park(&mut engine, far, origin + Vec2::new(-3.0, 0.0));
    let near_id = actor_id(engine.world(), near);
    let far_id = actor_id(engine.world(), far);

    let mut fired = false;
    for _ in 0..60 {
        let snap = engine.tick();
        if snap
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::VolleyFired { projectiles: 3, .. }))
        {
            fired = true;
            break;
        }
    }
    assert!(fired, "archer never fired a full volley");

    let targets: Vec<_> = {
        let mut q = engine.world().query::<(&PoolMember, &Projectile)>();
        q.iter()
            .filter(|(_, (m, p))| m.active && p.phase == ProjectilePhase::Flying)
            .filter_map(|(_, (_, p))| p.target)
            .collect()
    };
    assert_eq!(targets.len(), 3);
    assert_eq!(targets.iter().filter(|&&t| t == near_id).count(), 2);
    assert_eq!(targets.iter().filter(|&&t| t == far_id).count(), 1);
}

// ---- Enemy damage ----

#[test]
fn test_damage_clamps_and_dead_enemies_ignore_hits() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    let bee = spawn(&mut engine, "Bee");

    assert_eq!(damage(&mut engine, bee, -100.0), DamageOutcome::Wounded);
    assert_eq!(health_of(&engine, bee), 50.0);
    assert_eq!(damage(&mut engine, bee, 20.0), DamageOutcome::Wounded);
    assert_eq!(health_of(&engine, bee), 30.0);

    assert_eq!(damage(&mut engine, bee, 1000.0), DamageOutcome::Killed);
    assert_eq!(health_of(&engine, bee), 0.0);
    assert_eq!(damage(&mut engine, bee, 10.0), DamageOutcome::Ignored);
    assert_eq!(engine.coins(), 105);
    assert_eq!(engine.alive_enemies(), 0);
}

#[test]
fn test_dead_enemy_recycles_after_death_window() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    let bee = spawn(&mut engine, "Bee");
    damage(&mut engine, bee, 1000.0);

    engine.tick();
    assert_eq!(
        engine.world().get::<&EnemyLife>(bee).unwrap().state,
        EnemyState::Dying
    );
    for _ in 0..61 {
        engine.tick();
    }
    assert_eq!(
        engine.world().get::<&EnemyLife>(bee).unwrap().state,
        EnemyState::Recycled
    );
    assert_eq!(engine.pool().active_count(engine.world(), "Bee"), 0);
}

#[test]
fn test_self_damage_kills_on_schedule_once() {
    let mut config = SessionConfig::default();
    if let Some(bee) = config.species.iter_mut().find(|p| p.species == Species::Bee) {
        bee.self_damage = Some(SelfDamage {
            amount: 20.0,
            interval: 1.0,
        });
    }
    let mut engine = SimulationEngine::new(config).unwrap();
    let bee = spawn(&mut engine, "Bee");
    park(&mut engine, bee, Vec2::ZERO);

    let mut kills = Vec::new();
    for i in 0..240 {
        let snap = engine.tick();
        if i == 90 {
            assert!((health_of(&engine, bee) - 30.0).abs() < 1e-4);
        }
        for event in &snap.events {
            if matches!(event, GameEvent::EnemyKilled { .. }) {
                kills.push(i);
            }
        }
    }

    // 50 hp at 20 per second: third application.
    assert_eq!(kills.len(), 1, "killed on ticks {kills:?}");
    assert!((177..=182).contains(&kills[0]), "died on tick {}", kills[0]);
    assert_eq!(engine.alive_enemies(), 0);
    assert_eq!(engine.coins(), 105);
}

// ---- Split ----

#[test]
fn test_split_replaces_slime_and_keeps_census() {
    let mut engine = SimulationEngine::new(with_split_chance(1.0)).unwrap();
    let slime = spawn(&mut engine, "Slime");

    assert_eq!(damage(&mut engine, slime, 1000.0), DamageOutcome::Split);
    assert_eq!(engine.alive_enemies(), 1);
    assert_eq!(engine.coins(), 100);

    let specials = slimes_of_kind(&engine, SlimeKind::Special);
    assert_eq!(specials.len(), 1);

    engine.queue_command(PlayerCommand::AnimationComplete {
        cue: AnimationCue::SplitComplete {
            slime: actor_id(engine.world(), specials[0]),
        },
    });
    let snap = engine.tick();

    let clones = slimes_of_kind(&engine, SlimeKind::Clone);
    assert_eq!(clones.len(), 2);
    assert_eq!(engine.alive_enemies(), 2);
    for clone in clones {
        assert_eq!(health_of(&engine, clone), 30.0);
    }
    assert!(slimes_of_kind(&engine, SlimeKind::Special).is_empty());
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::SplitCompleted { clones, .. } if clones.len() == 2)));
}

#[test]
fn test_split_chance_zero_dies_normally() {
    let mut engine = SimulationEngine::new(with_split_chance(0.0)).unwrap();
    let slime = spawn(&mut engine, "Slime");

    assert_eq!(damage(&mut engine, slime, 1000.0), DamageOutcome::Killed);
    assert_eq!(engine.alive_enemies(), 0);
    assert_eq!(engine.coins(), 105);
    assert!(slimes_of_kind(&engine, SlimeKind::Special).is_empty());
}

#[test]
fn test_split_fallback_scales_clone_health() {
    let mut engine = SimulationEngine::new(with_split_chance(1.0)).unwrap();
    let slime = spawn(&mut engine, "Slime");
    damage(&mut engine, slime, 1000.0);
    let special = slimes_of_kind(&engine, SlimeKind::Special)[0];

    assert_eq!(damage(&mut engine, special, 25.0), DamageOutcome::Wounded);
    for _ in 0..62 {
        engine.tick();
    }

    let clones = slimes_of_kind(&engine, SlimeKind::Clone);
    assert_eq!(clones.len(), 2);
    for clone in clones {
        assert!((health_of(&engine, clone) - 15.0).abs() < 1e-4);
    }
}

#[test]
fn test_killing_special_mid_split_produces_no_clones() {
    let mut engine = SimulationEngine::new(with_split_chance(1.0)).unwrap();
    let slime = spawn(&mut engine, "Slime");
    damage(&mut engine, slime, 1000.0);
    let special = slimes_of_kind(&engine, SlimeKind::Special)[0];

    assert_eq!(damage(&mut engine, special, 1000.0), DamageOutcome::Killed);
    assert_eq!(engine.alive_enemies(), 0);

    engine.queue_command(PlayerCommand::AnimationComplete {
        cue: AnimationCue::SplitComplete {
            slime: actor_id(engine.world(), special),
        },
    });
    for _ in 0..90 {
        engine.tick();
    }

    assert_eq!(engine.pool().active_count(engine.world(), "CloneSlime"), 0);
    assert_eq!(engine.alive_enemies(), 0);
}

#[test]
fn test_clone_never_splits_again() {
    let mut engine = SimulationEngine::new(with_split_chance(1.0)).unwrap();
    let slime = spawn(&mut engine, "Slime");
    damage(&mut engine, slime, 1000.0);
    for _ in 0..62 {
        engine.tick();
    }
    let clones = slimes_of_kind(&engine, SlimeKind::Clone);
    assert_eq!(clones.len(), 2);

    for clone in clones {
        assert_eq!(damage(&mut engine, clone, 1000.0), DamageOutcome::Killed);
    }
    assert!(slimes_of_kind(&engine, SlimeKind::Special).is_empty());
    assert_eq!(engine.alive_enemies(), 0);
}

#[test]
fn test_stale_split_cue_skips_reused_special() {
    let mut engine = SimulationEngine::new(with_split_chance(1.0)).unwrap();
    let first = spawn(&mut engine, "Slime");
    damage(&mut engine, first, 1000.0);
    let special = slimes_of_kind(&engine, SlimeKind::Special)[0];
    let stale = actor_id(engine.world(), special);
    assert_eq!(damage(&mut engine, special, 1000.0), DamageOutcome::Killed);
    engine.with_context(|ctx| enemy::recycle(ctx, special));

    let second = spawn(&mut engine, "Slime");
    assert_eq!(damage(&mut engine, second, 1000.0), DamageOutcome::Split);
    let reused = slimes_of_kind(&engine, SlimeKind::Special)[0];
    assert_eq!(reused, special, "pool hands the freed slot out again");

    engine.queue_command(PlayerCommand::AnimationComplete {
        cue: AnimationCue::SplitComplete { slime: stale },
    });
    let snap = engine.tick();

    assert!(!snap
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::SplitCompleted { .. })));
    assert_eq!(engine.pool().active_count(engine.world(), "CloneSlime"), 0);
    assert!(engine.world().get::<&SlimeState>(reused).unwrap().is_splitting);
}

// ---- Towers and economy ----

#[test]
fn test_upgrade_in_progress_rejected() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    engine.economy_mut().add_coins(1000);
    engine.queue_command(PlayerCommand::UpgradeTower { tower: TowerId(0) });
    engine.queue_command(PlayerCommand::UpgradeTower { tower: TowerId(0) });
    let snap = engine.tick();

    assert_eq!(rejected(&snap.events), vec![InvalidStateTransition::UpgradeInProgress]);
    assert_eq!(engine.coins(), 1100 - 70);
    assert!(snap.towers[0].rebuilding);
}

#[test]
fn test_upgrade_without_coins_rejected() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    build_tower(&mut engine, TowerId(0));
    assert_eq!(engine.coins(), 30);

    engine.queue_command(PlayerCommand::UpgradeTower { tower: TowerId(0) });
    let snap = engine.tick();
    assert_eq!(rejected(&snap.events), vec![InvalidStateTransition::InsufficientCoins]);
    assert_eq!(engine.coins(), 30);
    assert_eq!(snap.towers[0].level, 0);
}

#[test]
fn test_rebuild_fallback_arms_archers() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    engine.queue_command(PlayerCommand::UpgradeTower { tower: TowerId(1) });
    engine.tick();
    assert!(engine.towers()[1].archers.is_empty());

    for _ in 0..92 {
        engine.tick();
    }
    let snap = engine.tick();
    assert!(!snap.towers[1].rebuilding);
    assert_eq!(snap.towers[1].archers, 1);
    assert_eq!(snap.towers[1].display_name.as_deref(), Some("Watchtower"));
}

#[test]
fn test_sell_refunds_half_of_investment() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    build_tower(&mut engine, TowerId(0));
    assert_eq!(engine.sell_refund_amount(TowerId(0)), Some(35));

    engine.queue_command(PlayerCommand::SellTower { tower: TowerId(0) });
    let snap = engine.tick();
    assert_eq!(engine.coins(), 30 + 35);
    assert_eq!(snap.towers[0].level, -1);
    assert_eq!(engine.pool().active_count(engine.world(), "Archer1"), 0);

    engine.queue_command(PlayerCommand::SellTower { tower: TowerId(0) });
    engine.queue_command(PlayerCommand::SellTower { tower: TowerId(9) });
    let snap = engine.tick();
    assert_eq!(
        rejected(&snap.events),
        vec![
            InvalidStateTransition::TowerNotBuilt,
            InvalidStateTransition::UnknownTower
        ]
    );
    assert_eq!(engine.sell_refund_amount(TowerId(9)), None);
}

// ---- Leaks and defeat ----

#[test]
fn test_leak_costs_hearts_and_defeats() {
    let mut config = single_wave("Bee", 1, 1.0);
    config.starting_hearts = 1;
    let mut engine = SimulationEngine::new(config).unwrap();
    engine.queue_command(PlayerCommand::StartWave);

    let mut leaked = false;
    let mut victory = false;
    for _ in 0..(60 * 30) {
        let snap = engine.tick();
        for event in &snap.events {
            match event {
                GameEvent::EnemyLeaked { hearts_lost, .. } => {
                    assert_eq!(*hearts_lost, 1);
                    leaked = true;
                }
                GameEvent::Victory => victory = true,
                _ => {}
            }
        }
        if engine.phase().is_over() {
            break;
        }
    }

    assert!(leaked);
    assert!(!victory);
    assert_eq!(engine.phase(), GamePhase::Defeat);
    assert_eq!(engine.hearts(), 0);

    engine.queue_command(PlayerCommand::UpgradeTower { tower: TowerId(0) });
    let snap = engine.tick();
    assert_eq!(rejected(&snap.events), vec![InvalidStateTransition::GameOver]);
}

// ---- Session control ----

#[test]
fn test_pause_freezes_time() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    engine.queue_command(PlayerCommand::StartWave);
    engine.tick();
    let before = engine.time().tick;

    engine.queue_command(PlayerCommand::Pause);
    for _ in 0..10 {
        engine.tick();
    }
    assert_eq!(engine.phase(), GamePhase::Paused);
    assert_eq!(engine.time().tick, before);

    engine.queue_command(PlayerCommand::Resume);
    engine.tick();
    assert_eq!(engine.time().tick, before + 1);
}

#[test]
fn test_pool_expansion_reported() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    let initial = engine.pool().size("Bee").unwrap();
    for _ in 0..=initial {
        spawn(&mut engine, "Bee");
    }
    let snap = engine.tick();

    assert_eq!(engine.pool().size("Bee"), Some(initial + 1));
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::PoolExpanded { tag, .. } if tag == "Bee")));
}

#[test]
fn test_stale_cue_is_ignored() {
    let mut engine = SimulationEngine::new(SessionConfig::default()).unwrap();
    let bee = spawn(&mut engine, "Bee");
    engine.queue_command(PlayerCommand::AnimationComplete {
        cue: AnimationCue::SplitComplete {
            slime: actor_id(engine.world(), bee),
        },
    });
    let snap = engine.tick();
    assert!(rejected(&snap.events).is_empty());
    assert_eq!(engine.alive_enemies(), 1);
    assert_eq!(entity_of(engine.world(), actor_id(engine.world(), bee)), Some(bee));
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let commands = [
        PlayerCommand::UpgradeTower { tower: TowerId(0) },
        PlayerCommand::StartWave,
    ];
    let mut engine_a = SimulationEngine::new(SessionConfig::default()).unwrap();
    let mut engine_b = SimulationEngine::new(SessionConfig::default()).unwrap();
    engine_a.queue_commands(commands.clone());
    engine_b.queue_commands(commands);

    for _ in 0..900 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = SimulationEngine::new(SessionConfig {
        seed: 111,
        ..Default::default()
    })
    .unwrap();
    let mut engine_b = SimulationEngine::new(SessionConfig {
        seed: 222,
        ..Default::default()
    })
    .unwrap();
    engine_a.queue_command(PlayerCommand::StartWave);
    engine_b.queue_command(PlayerCommand::StartWave);

    // Spawn offsets are rolled per enemy, so positions diverge quickly.
    let mut diverged = false;
    for _ in 0..300 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        if json_a != json_b {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "Different seeds should produce divergent output");
}
