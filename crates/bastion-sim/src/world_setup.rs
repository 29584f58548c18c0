//! Prefab factories for pooled actors.
//!
//! `Catalog` holds the read-only session data prefabs are built from.
//! `spawn_prefab` creates one free pool member with the component bundle
//! of its prefab kind.

use std::collections::HashMap;
use std::sync::Arc;

use hecs::{Entity, EntityBuilder, World};

use bastion_core::components::*;
use bastion_core::config::{EffectTags, Prefab, SessionConfig, SpeciesProfile, SplitProfile};
use bastion_core::enums::*;
use bastion_core::error::ConfigurationError;
use bastion_core::path::Path;
use bastion_core::types::Vec2;

/// Read-only data shared by the factories and systems.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub path: Arc<Path>,
    species: HashMap<Species, SpeciesProfile>,
    pub effects: EffectTags,
}

impl Catalog {
    pub fn from_config(config: &SessionConfig) -> Result<Self, ConfigurationError> {
        let path = Arc::new(Path::new(config.path.clone())?);
        let species = config
            .species
            .iter()
            .map(|p| (p.species, p.clone()))
            .collect();
        Ok(Self {
            path,
            species,
            effects: config.effects.clone(),
        })
    }

    pub fn species(&self, species: Species) -> Result<&SpeciesProfile, ConfigurationError> {
        self.species
            .get(&species)
            .ok_or_else(|| ConfigurationError::UnknownSpecies(format!("{species:?}")))
    }

    pub fn split_profile(&self, species: Species) -> Option<&SplitProfile> {
        self.species.get(&species).and_then(|p| p.split.as_ref())
    }
}

/// Create one free (inactive) instance of `prefab` for the pool `tag`.
pub fn spawn_prefab(
    world: &mut World,
    catalog: &Catalog,
    tag: &str,
    prefab: &Prefab,
) -> Result<Entity, ConfigurationError> {
    let member = PoolMember {
        tag: tag.to_string(),
        active: false,
        generation: 0,
    };
    let transform = Transform::default();

    let entity = match prefab {
        Prefab::Enemy { species, slime } => {
            spawn_enemy_prefab(world, catalog, member, *species, *slime)?
        }
        Prefab::Arrow => world.spawn((
            member,
            transform,
            Projectile {
                phase: ProjectilePhase::Recycled,
                start: Vec2::ZERO,
                target: None,
                target_point: Vec2::ZERO,
                elapsed: 0.0,
                flight_duration: 0.0,
                arc_height: 0.0,
                can_hit: false,
                tuning: None,
            },
        )),
        Prefab::Archer => world.spawn((member, transform, Archer::default())),
        Prefab::TowerVisual => world.spawn((member, transform, TowerVisual::default())),
        Prefab::Effect { lifetime_secs } => world.spawn((
            member,
            transform,
            Effect {
                lifetime_secs: *lifetime_secs,
                remaining_secs: None,
            },
        )),
    };
    Ok(entity)
}

fn spawn_enemy_prefab(
    world: &mut World,
    catalog: &Catalog,
    member: PoolMember,
    species: Species,
    slime: SlimeKind,
) -> Result<Entity, ConfigurationError> {
    let profile = catalog.species(species)?;

    // Clones are built at the split profile's clone strength.
    let max_health = match (slime, profile.split.as_ref()) {
        (SlimeKind::Clone, Some(split)) => split.clone_max_health,
        _ => profile.max_health,
    };

    let stats = EnemyStats {
        species,
        armor: profile.armor,
        min_contact_damage: profile.min_contact_damage,
        max_contact_damage: profile.max_contact_damage,
        damage_at_end_of_path: profile.damage_at_end_of_path,
        coin_value: profile.coin_value,
        collider_radius: profile.collider_radius,
        collider_height: profile.collider_height,
    };

    let mover = Mover {
        path: Arc::clone(&catalog.path),
        speed: profile.move_speed,
        waypoint_index: 0,
        offset: Vec2::ZERO,
        snap_to_first: true,
        override_start: true,
        enabled: false,
        path_complete: false,
    };

    let mut builder = EntityBuilder::new();
    builder
        .add(member)
        .add(Transform::default())
        .add(Health {
            current: max_health,
            max: max_health,
        })
        .add(stats)
        .add(EnemyLife {
            state: EnemyState::Recycled,
            recycle_timer: None,
        })
        .add(Facing::default())
        .add(HitColliders::default())
        .add(mover);
    if species == Species::Slime {
        builder.add(SlimeState {
            kind: slime,
            ..Default::default()
        });
    }
    if let Some(self_damage) = profile.self_damage {
        builder.add(Decay {
            amount: self_damage.amount,
            interval: self_damage.interval,
            remaining: self_damage.interval,
        });
    }

    Ok(world.spawn(builder.build()))
}
