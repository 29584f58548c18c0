//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are plain functions over `&mut World` or a `TickContext`.
//! Per-actor state lives in components; session-wide state lives in the
//! services the context borrows.

pub mod ballistics;
pub mod effects;
pub mod enemy;
pub mod fire_control;
pub mod movement;
pub mod snapshot;
pub mod split;
pub mod targeting;
pub mod wave_spawner;
