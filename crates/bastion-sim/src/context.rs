//! Per-tick service bundle handed to systems.

use hecs::World;
use rand_chacha::ChaCha8Rng;

use bastion_core::events::GameEvent;

use crate::census::Census;
use crate::economy::Economy;
use crate::pool::ActorPool;
use crate::world_setup::Catalog;

/// Mutable session services for one tick. Built by the engine from its own
/// fields so systems never reach for shared global state.
pub struct TickContext<'a> {
    pub world: &'a mut World,
    pub pool: &'a mut ActorPool,
    pub catalog: &'a Catalog,
    pub census: &'a mut Census,
    pub economy: &'a mut Economy,
    pub rng: &'a mut ChaCha8Rng,
    pub events: &'a mut Vec<GameEvent>,
    /// Seconds covered by this tick.
    pub dt: f32,
}
