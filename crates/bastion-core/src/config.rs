//! Session configuration: the read-only parameter records the simulation
//! is constructed from.
//!
//! Everything here is plain serde data. The simulation reads these records
//! and never mutates them after construction.

use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::{SlimeKind, Species};
use crate::error::ConfigurationError;
use crate::types::Vec2;

/// Archer tuning for one tower level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcherTier {
    /// Tier number; archers are drawn from pool tag `Archer{tier}`.
    pub tier: u32,
    /// Seconds between volleys.
    pub fire_interval: f32,
    /// Projectiles per volley.
    pub arrows_per_shot: u32,
}

impl ArcherTier {
    pub fn pool_tag(&self) -> String {
        format!("Archer{}", self.tier)
    }
}

/// Projectile tuning for one tower level. Copied into every projectile at launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowTier {
    pub pool_tag: String,
    /// World units per second.
    pub speed: f32,
    /// Hit probability in [0, 1].
    pub accuracy: f32,
    pub min_damage: i32,
    pub max_damage: i32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
}

/// One level of a tower's upgrade track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerLevel {
    pub display_name: String,
    pub cost: i32,
    pub archer_count: u32,
    pub range: f32,
    pub archer: ArcherTier,
    pub arrow: ArrowTier,
}

/// Split-on-death parameters of a species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitProfile {
    /// Probability that a dying normal instance splits.
    pub chance: f32,
    /// Max health of each clone; clones start at the parent's health fraction of it.
    pub clone_max_health: f32,
    pub special_tag: String,
    pub clone_tag: String,
}

/// Damage an enemy deals to itself on a fixed period while alive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelfDamage {
    pub amount: f32,
    /// Seconds between applications.
    pub interval: f32,
}

/// Numbers that distinguish one enemy species from another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    pub species: Species,
    pub max_health: f32,
    pub armor: i32,
    pub min_contact_damage: i32,
    pub max_contact_damage: i32,
    /// Hearts lost when this enemy reaches the end of the path.
    pub damage_at_end_of_path: i32,
    /// Coins awarded on death.
    pub coin_value: i32,
    pub move_speed: f32,
    pub collider_radius: f32,
    pub collider_height: f32,
    #[serde(default)]
    pub split: Option<SplitProfile>,
    #[serde(default)]
    pub self_damage: Option<SelfDamage>,
}

impl SpeciesProfile {
    fn basic(species: Species, max_health: f32, armor: i32, move_speed: f32) -> Self {
        Self {
            species,
            max_health,
            armor,
            min_contact_damage: 1,
            max_contact_damage: 2,
            damage_at_end_of_path: 1,
            coin_value: 5,
            move_speed,
            collider_radius: 0.3,
            collider_height: 1.0,
            split: None,
            self_damage: None,
        }
    }
}

/// What a pool instantiates when it grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Prefab {
    Enemy {
        species: Species,
        #[serde(default)]
        slime: SlimeKind,
    },
    Arrow,
    Archer,
    TowerVisual,
    Effect { lifetime_secs: f32 },
}

/// A tag-keyed pool and its pre-warmed size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSpec {
    pub tag: String,
    pub prefab: Prefab,
    pub size: usize,
}

/// `(enemy tag, count)` quota within a wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveEnemy {
    pub enemy_tag: String,
    pub count: u32,
}

/// One wave: ordered quotas spawned one at a time under a single interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveSpec {
    pub enemies: Vec<WaveEnemy>,
    pub spawn_interval: f32,
}

impl WaveSpec {
    pub fn total_enemies(&self) -> u32 {
        self.enemies.iter().map(|e| e.count).sum()
    }
}

/// Pool tags of the optional hit-feedback effects. `None` disables one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectTags {
    #[serde(default)]
    pub miss: Option<String>,
    #[serde(default)]
    pub crit: Option<String>,
    #[serde(default)]
    pub blood: Option<String>,
    #[serde(default)]
    pub coin: Option<String>,
}

/// Everything needed to construct one play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// RNG seed. Same seed and commands give the same session.
    pub seed: u64,
    pub starting_hearts: i32,
    pub starting_coins: i32,
    /// Countdown between one wave finishing and the next auto-starting (seconds).
    pub delay_between_waves: f32,
    pub sell_refund_fraction: f32,
    pub path: Vec<Vec2>,
    pub species: Vec<SpeciesProfile>,
    pub pools: Vec<PoolSpec>,
    pub tower_levels: Vec<TowerLevel>,
    pub tower_sites: Vec<Vec2>,
    pub waves: Vec<WaveSpec>,
    #[serde(default)]
    pub effects: EffectTags,
}

impl SessionConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<FsPath>) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigurationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn species_profile(&self, species: Species) -> Option<&SpeciesProfile> {
        self.species.iter().find(|p| p.species == species)
    }

    /// Check the setup invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.path.is_empty() {
            return Err(ConfigurationError::MissingPath);
        }
        if self.waves.is_empty() {
            return Err(ConfigurationError::EmptyWaveList);
        }
        if self.tower_levels.is_empty() {
            return Err(ConfigurationError::MissingTowerLevels);
        }
        if self.starting_hearts <= 0 {
            return Err(ConfigurationError::invalid("starting_hearts", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.sell_refund_fraction) {
            return Err(ConfigurationError::invalid(
                "sell_refund_fraction",
                "must be within [0, 1]",
            ));
        }
        if !self.delay_between_waves.is_finite() || self.delay_between_waves < 0.0 {
            return Err(ConfigurationError::invalid(
                "delay_between_waves",
                "must be finite and not negative",
            ));
        }
        if self.path.iter().any(|p| !p.is_finite()) {
            return Err(ConfigurationError::invalid("path", "waypoints must be finite"));
        }

        for (i, wave) in self.waves.iter().enumerate() {
            if !wave.spawn_interval.is_finite() || wave.spawn_interval < 0.0 {
                return Err(ConfigurationError::invalid(
                    format!("waves[{i}].spawn_interval"),
                    "must be finite and not negative",
                ));
            }
        }

        for profile in &self.species {
            if !profile.max_health.is_finite() || profile.max_health <= 0.0 {
                return Err(ConfigurationError::invalid(
                    format!("{:?}.max_health", profile.species),
                    "must be finite and positive",
                ));
            }
            if !profile.move_speed.is_finite() || profile.move_speed < 0.0 {
                return Err(ConfigurationError::invalid(
                    format!("{:?}.move_speed", profile.species),
                    "must be finite and not negative",
                ));
            }
            if let Some(decay) = &profile.self_damage {
                if !decay.amount.is_finite() || decay.amount < 0.0 {
                    return Err(ConfigurationError::invalid(
                        format!("{:?}.self_damage.amount", profile.species),
                        "must be finite and not negative",
                    ));
                }
                if !decay.interval.is_finite() || decay.interval <= 0.0 {
                    return Err(ConfigurationError::invalid(
                        format!("{:?}.self_damage.interval", profile.species),
                        "must be finite and positive",
                    ));
                }
            }
            if let Some(split) = &profile.split {
                if !split.clone_max_health.is_finite() || split.clone_max_health <= 0.0 {
                    return Err(ConfigurationError::invalid(
                        format!("{:?}.split.clone_max_health", profile.species),
                        "must be positive",
                    ));
                }
            }
        }

        for pool in &self.pools {
            if let Prefab::Enemy { species, .. } = pool.prefab {
                if self.species_profile(species).is_none() {
                    return Err(ConfigurationError::UnknownSpecies(format!("{species:?}")));
                }
            }
        }

        for (i, level) in self.tower_levels.iter().enumerate() {
            let arrow = &level.arrow;
            if !arrow.speed.is_finite() || arrow.speed <= 0.0 {
                return Err(ConfigurationError::invalid(
                    format!("tower_levels[{i}].arrow.speed"),
                    "must be finite and positive",
                ));
            }
            if arrow.min_damage > arrow.max_damage {
                return Err(ConfigurationError::invalid(
                    format!("tower_levels[{i}].arrow"),
                    "min_damage exceeds max_damage",
                ));
            }
            if !level.range.is_finite() || level.range <= 0.0 {
                return Err(ConfigurationError::invalid(
                    format!("tower_levels[{i}].range"),
                    "must be finite and positive",
                ));
            }
            if !level.archer.fire_interval.is_finite() || level.archer.fire_interval <= 0.0 {
                return Err(ConfigurationError::invalid(
                    format!("tower_levels[{i}].archer.fire_interval"),
                    "must be finite and positive",
                ));
            }
        }

        Ok(())
    }
}

fn pool(tag: &str, prefab: Prefab, size: usize) -> PoolSpec {
    PoolSpec {
        tag: tag.to_string(),
        prefab,
        size,
    }
}

fn enemy(species: Species, slime: SlimeKind) -> Prefab {
    Prefab::Enemy { species, slime }
}

fn quota(tag: &str, count: u32) -> WaveEnemy {
    WaveEnemy {
        enemy_tag: tag.to_string(),
        count,
    }
}

fn tower_level(
    display_name: &str,
    cost: i32,
    archer_count: u32,
    range: f32,
    tier: u32,
    arrows_per_shot: u32,
    damage: (i32, i32),
) -> TowerLevel {
    TowerLevel {
        display_name: display_name.to_string(),
        cost,
        archer_count,
        range,
        archer: ArcherTier {
            tier,
            fire_interval: 1.2 - 0.2 * tier as f32,
            arrows_per_shot,
        },
        arrow: ArrowTier {
            pool_tag: format!("Arrow{tier}"),
            speed: 8.0 + 2.0 * tier as f32,
            accuracy: 0.85,
            min_damage: damage.0,
            max_damage: damage.1,
            crit_chance: 0.1,
            crit_multiplier: 2.0,
        },
    }
}

impl Default for SessionConfig {
    /// A playable three-wave session on an S-shaped lane with two tower sites.
    fn default() -> Self {
        let slime_split = SplitProfile {
            chance: 0.3,
            clone_max_health: 30.0,
            special_tag: "SpecialSlime".to_string(),
            clone_tag: "CloneSlime".to_string(),
        };
        let mut slime = SpeciesProfile::basic(Species::Slime, 50.0, 0, 1.2);
        slime.split = Some(slime_split);
        let mut orc = SpeciesProfile::basic(Species::Orc, 10_000.0, 3, 0.6);
        orc.damage_at_end_of_path = 5;
        orc.coin_value = 50;
        orc.collider_radius = 0.5;
        orc.collider_height = 2.0;

        Self {
            seed: 42,
            starting_hearts: DEFAULT_STARTING_HEARTS,
            starting_coins: DEFAULT_STARTING_COINS,
            delay_between_waves: DEFAULT_WAVE_DELAY,
            sell_refund_fraction: DEFAULT_SELL_REFUND_FRACTION,
            path: vec![
                Vec2::new(-10.0, 4.0),
                Vec2::new(-2.0, 4.0),
                Vec2::new(-2.0, -2.0),
                Vec2::new(6.0, -2.0),
                Vec2::new(6.0, 3.0),
                Vec2::new(12.0, 3.0),
            ],
            species: vec![
                SpeciesProfile::basic(Species::Bee, 50.0, 0, 2.0),
                SpeciesProfile::basic(Species::Wolf, 50.0, 1, 1.6),
                orc,
                slime,
            ],
            pools: vec![
                pool("Bee", enemy(Species::Bee, SlimeKind::Normal), 8),
                pool("Wolf", enemy(Species::Wolf, SlimeKind::Normal), 8),
                pool("Orc", enemy(Species::Orc, SlimeKind::Normal), 2),
                pool("Slime", enemy(Species::Slime, SlimeKind::Normal), 8),
                pool("SpecialSlime", enemy(Species::Slime, SlimeKind::Special), 4),
                pool("CloneSlime", enemy(Species::Slime, SlimeKind::Clone), 8),
                pool("Arrow1", Prefab::Arrow, 16),
                pool("Arrow2", Prefab::Arrow, 16),
                pool("Arrow3", Prefab::Arrow, 16),
                pool("Archer1", Prefab::Archer, 4),
                pool("Archer2", Prefab::Archer, 4),
                pool("Archer3", Prefab::Archer, 6),
                pool("Tower1", Prefab::TowerVisual, 2),
                pool("Tower2", Prefab::TowerVisual, 2),
                pool("Tower3", Prefab::TowerVisual, 2),
                pool(
                    "MissEffect",
                    Prefab::Effect {
                        lifetime_secs: MISS_EFFECT_LIFETIME,
                    },
                    8,
                ),
                pool(
                    "CritEffect",
                    Prefab::Effect {
                        lifetime_secs: EFFECT_LIFETIME,
                    },
                    8,
                ),
                pool(
                    "BloodEffect",
                    Prefab::Effect {
                        lifetime_secs: EFFECT_LIFETIME,
                    },
                    8,
                ),
                pool(
                    "CoinEffect",
                    Prefab::Effect {
                        lifetime_secs: EFFECT_LIFETIME,
                    },
                    8,
                ),
            ],
            tower_levels: vec![
                tower_level("Watchtower", 70, 1, 4.0, 1, 1, (8, 12)),
                tower_level("Garrison", 110, 2, 4.5, 2, 2, (10, 16)),
                tower_level("Fortress", 160, 3, 5.0, 3, 3, (14, 22)),
            ],
            tower_sites: vec![Vec2::new(-5.0, 1.0), Vec2::new(3.0, 1.0)],
            waves: vec![
                WaveSpec {
                    enemies: vec![quota("Bee", 5)],
                    spawn_interval: 1.0,
                },
                WaveSpec {
                    enemies: vec![quota("Wolf", 4), quota("Slime", 4)],
                    spawn_interval: 0.9,
                },
                WaveSpec {
                    enemies: vec![quota("Slime", 6), quota("Wolf", 4), quota("Orc", 1)],
                    spawn_interval: 0.8,
                },
            ],
            effects: EffectTags {
                miss: Some("MissEffect".to_string()),
                crit: Some("CritEffect".to_string()),
                blood: Some("BloodEffect".to_string()),
                coin: Some("CoinEffect".to_string()),
            },
        }
    }
}
