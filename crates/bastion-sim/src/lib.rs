//! Combat and wave engine for BASTION.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate,
//! and produces GameStateSnapshots for the presentation layer.

pub mod census;
pub mod context;
pub mod economy;
pub mod engine;
pub mod pool;
pub mod systems;
pub mod tower;
pub mod world_setup;

pub use bastion_core as core;
pub use engine::SimulationEngine;

#[cfg(test)]
mod tests;
