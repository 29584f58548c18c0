//! Alive-enemy census and the victory latch.

use tracing::{info, warn};

/// Live enemy count plus the "all waves issued" flag that together gate victory.
#[derive(Debug, Clone, Default)]
pub struct Census {
    alive: u32,
    all_waves_issued: bool,
    /// Victory condition has held at least once.
    victory_latched: bool,
    /// Victory latched but not yet consumed by the engine.
    victory_pending: bool,
}

impl Census {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self) {
        self.alive += 1;
    }

    /// Remove one enemy. Never goes below zero.
    pub fn unregister(&mut self) {
        if self.alive == 0 {
            warn!("census unregister with no enemies alive");
            return;
        }
        self.alive -= 1;
        self.check_victory();
    }

    pub fn mark_all_waves_issued(&mut self) {
        self.all_waves_issued = true;
        self.check_victory();
    }

    pub fn alive(&self) -> u32 {
        self.alive
    }

    pub fn all_waves_issued(&self) -> bool {
        self.all_waves_issued
    }

    pub fn is_victory_latched(&self) -> bool {
        self.victory_latched
    }

    /// Returns true exactly once after the victory condition first holds.
    pub fn take_victory(&mut self) -> bool {
        std::mem::take(&mut self.victory_pending)
    }

    fn check_victory(&mut self) {
        if self.victory_latched || !self.all_waves_issued || self.alive > 0 {
            return;
        }
        info!("all waves cleared");
        self.victory_latched = true;
        self.victory_pending = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_victory_requires_all_waves_issued() {
        let mut census = Census::new();
        census.register();
        census.unregister();
        assert!(!census.take_victory(), "Waves still pending");

        census.mark_all_waves_issued();
        assert!(census.take_victory());
        assert!(!census.take_victory(), "Victory fires once");
    }

    #[test]
    fn test_victory_waits_for_last_enemy() {
        let mut census = Census::new();
        census.register();
        census.register();
        census.mark_all_waves_issued();
        census.unregister();
        assert!(!census.take_victory());
        census.unregister();
        assert!(census.take_victory());
    }

    #[test]
    fn test_no_retrigger_after_latch() {
        let mut census = Census::new();
        census.mark_all_waves_issued();
        assert!(census.take_victory());
        census.register();
        census.unregister();
        assert!(!census.take_victory());
        assert!(census.is_victory_latched());
    }

    #[test]
    fn test_unregister_never_underflows() {
        let mut census = Census::new();
        census.unregister();
        assert_eq!(census.alive(), 0);
        census.register();
        assert_eq!(census.alive(), 1);
    }
}
