//! Wave scheduler: walks the configured waves one enemy at a time.
//!
//! `WaveScheduler` is pure bookkeeping (cursor, timers, phase). `run` turns
//! its spawn requests into pooled enemies.

use rand::Rng;
use tracing::{info, warn};

use bastion_core::config::WaveSpec;
use bastion_core::constants::{SPAWN_OFFSET_MAX, SPAWN_OFFSET_MIN};
use bastion_core::enums::WavePhase;
use bastion_core::error::InvalidStateTransition;
use bastion_core::events::GameEvent;
use bastion_core::types::Vec2;

use crate::context::TickContext;
use crate::systems::enemy;

/// What the scheduler asks of the world during one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleStep {
    WaveStarted { wave: usize },
    Spawn { enemy_tag: String },
    WaveFinished { wave: usize },
    AllWavesIssued,
}

/// Ordered waves plus the forward-only cursor
/// `(wave_index, entry_index, spawned_of_type)`.
#[derive(Debug, Clone)]
pub struct WaveScheduler {
    waves: Vec<WaveSpec>,
    delay_between_waves: f32,
    phase: WavePhase,
    wave_index: usize,
    entry_index: usize,
    spawned_of_type: u32,
    spawn_timer: f32,
    countdown: Option<f32>,
}

impl WaveScheduler {
    pub fn new(waves: Vec<WaveSpec>, delay_between_waves: f32) -> Self {
        Self {
            waves,
            delay_between_waves,
            phase: WavePhase::WaitingForPlayerStart,
            wave_index: 0,
            entry_index: 0,
            spawned_of_type: 0,
            spawn_timer: 0.0,
            countdown: None,
        }
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn total_waves(&self) -> usize {
        self.waves.len()
    }

    /// 1-based number of the wave spawning or last finished; 0 before the first.
    pub fn current_wave(&self) -> usize {
        match self.phase {
            WavePhase::WaitingForPlayerStart => 0,
            WavePhase::Spawning => self.wave_index + 1,
            WavePhase::WaitingForNextWave | WavePhase::AllComplete => self.wave_index,
        }
    }

    /// Enemies the wave reported by `current_wave` issues in all; 0 before the first.
    pub fn enemies_in_current_wave(&self) -> u32 {
        self.current_wave()
            .checked_sub(1)
            .and_then(|i| self.waves.get(i))
            .map(WaveSpec::total_enemies)
            .unwrap_or(0)
    }

    pub fn is_all_waves_complete(&self) -> bool {
        self.phase == WavePhase::AllComplete
    }

    pub fn countdown(&self) -> Option<f32> {
        self.countdown
    }

    /// Start the next wave now. Cancels a pending auto-advance countdown.
    /// Returns the 0-based index of the wave started.
    pub fn start_next_wave(&mut self) -> Result<usize, InvalidStateTransition> {
        match self.phase {
            WavePhase::Spawning => Err(InvalidStateTransition::WaveAlreadyRunning),
            WavePhase::AllComplete => Err(InvalidStateTransition::AllWavesIssued),
            WavePhase::WaitingForPlayerStart | WavePhase::WaitingForNextWave => {
                if self.wave_index >= self.waves.len() {
                    return Err(InvalidStateTransition::AllWavesIssued);
                }
                self.phase = WavePhase::Spawning;
                self.countdown = None;
                self.spawn_timer = 0.0;
                self.entry_index = 0;
                self.spawned_of_type = 0;
                Ok(self.wave_index)
            }
        }
    }

    /// Advance timers by `dt` and report what should happen this tick.
    pub fn advance(&mut self, dt: f32) -> Vec<ScheduleStep> {
        let mut steps = Vec::new();
        match self.phase {
            WavePhase::WaitingForPlayerStart | WavePhase::AllComplete => {}
            WavePhase::WaitingForNextWave => {
                let remaining = self.countdown.map_or(0.0, |c| c - dt);
                if remaining > 0.0 {
                    self.countdown = Some(remaining);
                } else if let Ok(wave) = self.start_next_wave() {
                    steps.push(ScheduleStep::WaveStarted { wave });
                }
            }
            WavePhase::Spawning => {
                self.spawn_timer -= dt;
                if self.spawn_timer <= 0.0 {
                    match self.next_enemy_tag() {
                        Some(enemy_tag) => {
                            self.spawn_timer = self.waves[self.wave_index].spawn_interval;
                            steps.push(ScheduleStep::Spawn { enemy_tag });
                        }
                        None => self.finish_wave(&mut steps),
                    }
                }
            }
        }
        steps
    }

    fn next_enemy_tag(&mut self) -> Option<String> {
        let wave = self.waves.get(self.wave_index)?;
        while let Some(entry) = wave.enemies.get(self.entry_index) {
            if self.spawned_of_type < entry.count {
                self.spawned_of_type += 1;
                return Some(entry.enemy_tag.clone());
            }
            self.entry_index += 1;
            self.spawned_of_type = 0;
        }
        None
    }

    fn finish_wave(&mut self, steps: &mut Vec<ScheduleStep>) {
        steps.push(ScheduleStep::WaveFinished {
            wave: self.wave_index,
        });
        self.wave_index += 1;
        self.entry_index = 0;
        self.spawned_of_type = 0;
        if self.wave_index < self.waves.len() {
            self.phase = WavePhase::WaitingForNextWave;
            self.countdown = Some(self.delay_between_waves);
        } else {
            self.phase = WavePhase::AllComplete;
            self.countdown = None;
            steps.push(ScheduleStep::AllWavesIssued);
        }
    }
}

/// Advance the scheduler and spawn whatever it asks for.
pub fn run(ctx: &mut TickContext, scheduler: &mut WaveScheduler) {
    for step in scheduler.advance(ctx.dt) {
        match step {
            ScheduleStep::WaveStarted { wave } => {
                info!(wave = wave + 1, "wave started");
                ctx.events.push(GameEvent::WaveStarted { wave: wave + 1 });
            }
            ScheduleStep::Spawn { enemy_tag } => {
                let offset = Vec2::new(0.0, ctx.rng.gen_range(SPAWN_OFFSET_MIN..SPAWN_OFFSET_MAX));
                if let Err(err) = enemy::spawn_wave_enemy(ctx, &enemy_tag, offset) {
                    warn!(%err, tag = %enemy_tag, "wave spawn skipped");
                }
            }
            ScheduleStep::WaveFinished { wave } => {
                info!(wave = wave + 1, "wave finished");
                ctx.events.push(GameEvent::WaveFinished { wave: wave + 1 });
            }
            ScheduleStep::AllWavesIssued => {
                info!("all waves issued");
                ctx.census.mark_all_waves_issued();
                ctx.events.push(GameEvent::AllWavesIssued);
            }
        }
    }
}
