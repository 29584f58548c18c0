//! Tag-keyed actor pool.
//!
//! Every pooled entity lives in the world for the whole session. A member is
//! either in use (`PoolMember::active`) or free and parked by the pool.
//! `spawn` hands out the first free member and grows the pool by exactly one
//! when none is free; it never shrinks.

use std::collections::HashMap;

use hecs::{Entity, World};
use tracing::{debug, warn};

use bastion_core::components::{PoolMember, Transform};
use bastion_core::config::{PoolSpec, Prefab};
use bastion_core::error::ConfigurationError;
use bastion_core::types::{ActorId, Vec2};

use crate::world_setup::{self, Catalog};

/// Id of the current use of `entity`.
pub fn actor_id(world: &World, entity: Entity) -> ActorId {
    let generation = world
        .get::<&PoolMember>(entity)
        .map(|m| m.generation)
        .unwrap_or(0);
    member_id(entity, generation)
}

/// Id from an entity and a `PoolMember` already in hand.
pub fn member_id(entity: Entity, generation: u32) -> ActorId {
    ActorId {
        entity: entity.to_bits().get(),
        generation,
    }
}

/// Resolve an id back to its entity. `None` for malformed bits or once the
/// pool has handed the entity out again.
pub fn entity_of(world: &World, id: ActorId) -> Option<Entity> {
    let entity = Entity::from_bits(id.entity)?;
    let generation = world.get::<&PoolMember>(entity).ok()?.generation;
    (generation == id.generation).then_some(entity)
}

/// Whether `entity` is a pool member currently in use.
pub fn is_active(world: &World, entity: Entity) -> bool {
    world
        .get::<&PoolMember>(entity)
        .map(|m| m.active)
        .unwrap_or(false)
}

#[derive(Debug)]
struct PoolBucket {
    prefab: Prefab,
    members: Vec<Entity>,
}

/// Pools of reusable actors, keyed by tag.
#[derive(Debug, Default)]
pub struct ActorPool {
    buckets: HashMap<String, PoolBucket>,
    /// `(tag, new size)` for every growth since the last drain.
    expansions: Vec<(String, usize)>,
}

impl ActorPool {
    /// Pre-warm every configured pool with free members.
    pub fn new(
        world: &mut World,
        specs: &[PoolSpec],
        catalog: &Catalog,
    ) -> Result<Self, ConfigurationError> {
        let mut pool = Self::default();
        for spec in specs {
            let mut members = Vec::with_capacity(spec.size);
            for _ in 0..spec.size {
                members.push(world_setup::spawn_prefab(world, catalog, &spec.tag, &spec.prefab)?);
            }
            pool.buckets.insert(
                spec.tag.clone(),
                PoolBucket {
                    prefab: spec.prefab.clone(),
                    members,
                },
            );
        }
        Ok(pool)
    }

    /// Activate a free member of `tag` at a world position, clearing any
    /// parent-relative placement left from its previous use.
    pub fn spawn(
        &mut self,
        world: &mut World,
        catalog: &Catalog,
        tag: &str,
        position: Vec2,
        rotation: f32,
    ) -> Result<Entity, ConfigurationError> {
        let entity = self.acquire(world, catalog, tag)?;
        if let Ok(mut transform) = world.get::<&mut Transform>(entity) {
            *transform = Transform {
                position,
                rotation,
                parent: None,
                local_offset: Vec2::ZERO,
            };
        }
        Ok(entity)
    }

    /// Activate a free member of `tag` attached to `parent` at a local offset.
    pub fn spawn_attached(
        &mut self,
        world: &mut World,
        catalog: &Catalog,
        tag: &str,
        parent: Entity,
        local_offset: Vec2,
    ) -> Result<Entity, ConfigurationError> {
        let origin = world
            .get::<&Transform>(parent)
            .map(|t| t.position)
            .unwrap_or(Vec2::ZERO);
        let parent_id = actor_id(world, parent);
        let entity = self.acquire(world, catalog, tag)?;
        if let Ok(mut transform) = world.get::<&mut Transform>(entity) {
            *transform = Transform {
                position: origin + local_offset,
                rotation: 0.0,
                parent: Some(parent_id),
                local_offset,
            };
        }
        Ok(entity)
    }

    /// Return `entity` to its pool. Returns false if it was already free.
    pub fn despawn(&self, world: &mut World, entity: Entity) -> bool {
        let Ok(mut member) = world.get::<&mut PoolMember>(entity) else {
            return false;
        };
        if !member.active {
            return false;
        }
        member.active = false;
        drop(member);

        if let Ok(mut transform) = world.get::<&mut Transform>(entity) {
            transform.parent = None;
            transform.local_offset = Vec2::ZERO;
        }
        true
    }

    /// Current number of members (free and in use) for `tag`.
    pub fn size(&self, tag: &str) -> Option<usize> {
        self.buckets.get(tag).map(|b| b.members.len())
    }

    /// Number of members of `tag` currently in use.
    pub fn active_count(&self, world: &World, tag: &str) -> usize {
        self.buckets
            .get(tag)
            .map(|b| b.members.iter().filter(|&&e| is_active(world, e)).count())
            .unwrap_or(0)
    }

    /// Whether a pool is configured for `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.buckets.contains_key(tag)
    }

    /// Drain the growth log accumulated since the last call.
    pub fn take_expansions(&mut self) -> Vec<(String, usize)> {
        std::mem::take(&mut self.expansions)
    }

    fn acquire(
        &mut self,
        world: &mut World,
        catalog: &Catalog,
        tag: &str,
    ) -> Result<Entity, ConfigurationError> {
        let Some(bucket) = self.buckets.get_mut(tag) else {
            warn!(tag, "spawn requested for unknown pool tag");
            return Err(ConfigurationError::UnknownPoolTag(tag.to_string()));
        };

        let free = bucket
            .members
            .iter()
            .copied()
            .find(|&e| !is_active(world, e));

        let entity = match free {
            Some(entity) => entity,
            None => {
                let entity = world_setup::spawn_prefab(world, catalog, tag, &bucket.prefab)?;
                bucket.members.push(entity);
                let size = bucket.members.len();
                debug!(tag, size, "pool expanded");
                self.expansions.push((tag.to_string(), size));
                entity
            }
        };

        if let Ok(mut member) = world.get::<&mut PoolMember>(entity) {
            member.active = true;
            member.generation = member.generation.wrapping_add(1);
        }
        Ok(entity)
    }
}
