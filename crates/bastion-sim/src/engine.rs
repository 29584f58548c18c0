//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world and every session service,
//! processes player commands, runs all systems, and produces
//! `GameStateSnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use bastion_core::commands::{AnimationCue, PlayerCommand};
use bastion_core::config::{SessionConfig, TowerLevel};
use bastion_core::constants::DT;
use bastion_core::enums::{GamePhase, WavePhase};
use bastion_core::error::{ConfigurationError, InvalidStateTransition};
use bastion_core::events::GameEvent;
use bastion_core::state::GameStateSnapshot;
use bastion_core::types::{SimTime, TowerId};

use crate::census::Census;
use crate::context::TickContext;
use crate::economy::Economy;
use crate::pool::{entity_of, ActorPool};
use crate::systems;
use crate::systems::snapshot::SnapshotSources;
use crate::systems::wave_spawner::WaveScheduler;
use crate::tower::{self, Tower};
use crate::world_setup::Catalog;

/// Every tag a wave, split, or tower level spawns from must name a configured pool.
fn check_pool_tags(pool: &ActorPool, config: &SessionConfig) -> Result<(), ConfigurationError> {
    let wave_tags = config
        .waves
        .iter()
        .flat_map(|w| w.enemies.iter().map(|e| e.enemy_tag.clone()));
    let split_tags = config
        .species
        .iter()
        .filter_map(|p| p.split.as_ref())
        .flat_map(|s| [s.special_tag.clone(), s.clone_tag.clone()]);
    let level_tags = config
        .tower_levels
        .iter()
        .flat_map(|l| [l.arrow.pool_tag.clone(), l.archer.pool_tag()]);

    match wave_tags
        .chain(split_tags)
        .chain(level_tags)
        .find(|tag| !pool.has_tag(tag))
    {
        Some(tag) => Err(ConfigurationError::UnknownPoolTag(tag)),
        None => Ok(()),
    }
}

/// Services systems borrow through a `TickContext`.
struct Services {
    world: World,
    pool: ActorPool,
    catalog: Catalog,
    census: Census,
    economy: Economy,
    rng: ChaCha8Rng,
    events: Vec<GameEvent>,
}

impl Services {
    fn context(&mut self, dt: f32) -> TickContext<'_> {
        TickContext {
            world: &mut self.world,
            pool: &mut self.pool,
            catalog: &self.catalog,
            census: &mut self.census,
            economy: &mut self.economy,
            rng: &mut self.rng,
            events: &mut self.events,
            dt,
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    services: Services,
    time: SimTime,
    phase: GamePhase,
    command_queue: VecDeque<PlayerCommand>,
    scratch: Vec<Entity>,
    scheduler: WaveScheduler,
    towers: Vec<Tower>,
    tower_levels: Vec<TowerLevel>,
    sell_refund_fraction: f32,
}

impl SimulationEngine {
    /// Validate the config, pre-warm every pool, and lay out the tower sites.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let catalog = Catalog::from_config(&config)?;
        let mut world = World::new();
        let pool = ActorPool::new(&mut world, &config.pools, &catalog)?;
        check_pool_tags(&pool, &config)?;

        let towers = config
            .tower_sites
            .iter()
            .enumerate()
            .map(|(i, &site)| Tower::new(TowerId(i as u32), site))
            .collect();

        Ok(Self {
            services: Services {
                world,
                pool,
                catalog,
                census: Census::new(),
                economy: Economy::new(config.starting_hearts, config.starting_coins),
                rng: ChaCha8Rng::seed_from_u64(config.seed),
                events: Vec::new(),
            },
            time: SimTime::default(),
            phase: GamePhase::default(),
            command_queue: VecDeque::new(),
            scratch: Vec::new(),
            scheduler: WaveScheduler::new(config.waves, config.delay_between_waves),
            towers,
            tower_levels: config.tower_levels,
            sell_refund_fraction: config.sell_refund_fraction,
        })
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems();
            self.time.advance();
        }

        for (tag, size) in self.services.pool.take_expansions() {
            self.services.events.push(GameEvent::PoolExpanded { tag, size });
        }
        let events = std::mem::take(&mut self.services.events);
        systems::snapshot::build_snapshot(
            &self.services.world,
            &self.time,
            self.phase,
            SnapshotSources {
                scheduler: &self.scheduler,
                economy: &self.services.economy,
                census: &self.services.census,
                towers: &self.towers,
                tower_levels: &self.tower_levels,
                sell_refund_fraction: self.sell_refund_fraction,
            },
            events,
        )
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.services.world
    }

    pub fn pool(&self) -> &ActorPool {
        &self.services.pool
    }

    pub fn census(&self) -> &Census {
        &self.services.census
    }

    pub fn economy(&self) -> &Economy {
        &self.services.economy
    }

    /// Direct access for the presentation layer's coin and heart adjustments.
    pub fn economy_mut(&mut self) -> &mut Economy {
        &mut self.services.economy
    }

    pub fn coins(&self) -> i32 {
        self.services.economy.coins()
    }

    pub fn hearts(&self) -> i32 {
        self.services.economy.hearts()
    }

    pub fn alive_enemies(&self) -> u32 {
        self.services.census.alive()
    }

    /// 1-based wave number for display; 0 before the first wave.
    pub fn current_wave(&self) -> usize {
        self.scheduler.current_wave()
    }

    pub fn total_waves(&self) -> usize {
        self.scheduler.total_waves()
    }

    pub fn wave_phase(&self) -> WavePhase {
        self.scheduler.phase()
    }

    pub fn is_all_waves_complete(&self) -> bool {
        self.scheduler.is_all_waves_complete()
    }

    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    pub fn tower_levels(&self) -> &[TowerLevel] {
        &self.tower_levels
    }

    pub fn tower(&self, id: TowerId) -> Option<&Tower> {
        self.towers.get(id.0 as usize)
    }

    /// Coins a sale would return right now; `None` for an unknown tower.
    pub fn sell_refund_amount(&self, id: TowerId) -> Option<i32> {
        self.tower(id)
            .map(|t| t.sell_refund(self.sell_refund_fraction))
    }

    /// Run `f` against the session services, as a system would.
    #[cfg(test)]
    pub(crate) fn with_context<R>(&mut self, f: impl FnOnce(&mut TickContext) -> R) -> R {
        let mut ctx = self.services.context(DT);
        f(&mut ctx)
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(reason) = self.handle_command(&command) {
                debug!(?command, %reason, "command rejected");
                self.services
                    .events
                    .push(GameEvent::CommandRejected { reason });
            }
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: &PlayerCommand) -> Result<(), InvalidStateTransition> {
        match *command {
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
                Ok(())
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
                Ok(())
            }
            _ if self.phase.is_over() => Err(InvalidStateTransition::GameOver),
            PlayerCommand::StartWave => {
                let wave = self.scheduler.start_next_wave()? + 1;
                info!(wave, "wave started");
                self.services.events.push(GameEvent::WaveStarted { wave });
                Ok(())
            }
            PlayerCommand::UpgradeTower { tower } => {
                let site = self
                    .towers
                    .get_mut(tower.0 as usize)
                    .ok_or(InvalidStateTransition::UnknownTower)?;
                let mut ctx = self.services.context(DT);
                tower::upgrade(&mut ctx, site, &self.tower_levels)
            }
            PlayerCommand::SellTower { tower } => {
                let site = self
                    .towers
                    .get_mut(tower.0 as usize)
                    .ok_or(InvalidStateTransition::UnknownTower)?;
                let mut ctx = self.services.context(DT);
                tower::sell(&mut ctx, site, self.sell_refund_fraction).map(|_| ())
            }
            PlayerCommand::AnimationComplete { cue } => {
                self.handle_cue(cue);
                Ok(())
            }
        }
    }

    /// Deliver a completion cue. A cue nothing is waiting on is ignored.
    fn handle_cue(&mut self, cue: AnimationCue) {
        let mut ctx = self.services.context(DT);
        let handled = match cue {
            AnimationCue::VolleyRelease { archer } => entity_of(ctx.world, archer)
                .is_some_and(|e| systems::fire_control::release_volley(&mut ctx, e)),
            AnimationCue::SplitComplete { slime } => entity_of(ctx.world, slime)
                .is_some_and(|e| systems::split::complete_split(&mut ctx, e)),
            AnimationCue::TowerIdleReached { tower } => match self.towers.get_mut(tower.0 as usize) {
                Some(site) => tower::finish_rebuild(&mut ctx, site, &self.tower_levels),
                None => false,
            },
        };
        if !handled {
            debug!(?cue, "cue ignored");
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let dt = DT;
        let defeat_pending = self.services.economy.is_defeat_pending();
        let mut scratch = std::mem::take(&mut self.scratch);
        {
            let mut ctx = self.services.context(dt);

            // 1. Wave spawning (halted once defeat is pending)
            if !defeat_pending {
                systems::wave_spawner::run(&mut ctx, &mut self.scheduler);
            }
            // 2. Tower rebuild fallbacks
            for site in &mut self.towers {
                tower::tick_rebuild(&mut ctx, site, &self.tower_levels);
            }
            // 3. Path movement and leaks (frozen once defeat is pending)
            if !defeat_pending {
                systems::movement::run(ctx.world, dt, &mut scratch);
                systems::enemy::handle_arrivals(&mut ctx, &scratch);
            }
            // 4. Facing and hit colliders
            systems::enemy::update_facing(ctx.world);
            // 5. Fire control
            systems::fire_control::run(&mut ctx, &mut scratch);
            // 6. Projectile flight and hit resolution
            systems::ballistics::run(&mut ctx, &mut scratch);
            // 7. Death recycles and split fallbacks
            systems::enemy::run_timers(&mut ctx, &mut scratch);
            // 8. Effect lifetimes
            systems::effects::run(&mut ctx, &mut scratch);
        }
        self.scratch = scratch;

        // 9. Outcome
        self.resolve_outcome(dt);
    }

    fn resolve_outcome(&mut self, dt: f32) {
        let economy = &mut self.services.economy;
        if economy.tick_defeat(dt) {
            info!(tick = self.time.tick, "defeat");
            self.phase = GamePhase::Defeat;
            self.services.events.push(GameEvent::Defeat);
            return;
        }
        if !economy.is_defeat_pending() && self.services.census.take_victory() {
            info!(tick = self.time.tick, "victory");
            self.phase = GamePhase::Victory;
            self.services.events.push(GameEvent::Victory);
        }
    }
}
