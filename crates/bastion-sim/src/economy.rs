//! Hearts and coins, plus the delayed defeat latch.

use tracing::info;

use bastion_core::constants::DEFEAT_DELAY;

#[derive(Debug, Clone)]
pub struct Economy {
    hearts: i32,
    coins: i32,
    /// Counting down to the defeat latch once hearts reach zero.
    defeat_timer: Option<f32>,
    defeated: bool,
}

impl Economy {
    pub fn new(hearts: i32, coins: i32) -> Self {
        Self {
            hearts,
            coins,
            defeat_timer: None,
            defeated: false,
        }
    }

    pub fn hearts(&self) -> i32 {
        self.hearts
    }

    pub fn coins(&self) -> i32 {
        self.coins
    }

    pub fn add_coins(&mut self, amount: i32) {
        self.coins += amount.max(0);
    }

    /// Deduct `amount` if affordable.
    pub fn spend_coins(&mut self, amount: i32) -> bool {
        if amount < 0 || self.coins < amount {
            return false;
        }
        self.coins -= amount;
        true
    }

    /// Lose hearts. Returns true if this call started the defeat countdown.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.hearts = (self.hearts - amount.max(0)).max(0);
        if self.hearts == 0 && self.defeat_timer.is_none() && !self.defeated {
            info!("hearts depleted, defeat pending");
            self.defeat_timer = Some(DEFEAT_DELAY);
            return true;
        }
        false
    }

    /// Hearts are gone; enemies freeze and victory is suppressed.
    pub fn is_defeat_pending(&self) -> bool {
        self.defeat_timer.is_some() || self.defeated
    }

    /// Advance the defeat countdown. Returns true on the tick defeat latches.
    pub fn tick_defeat(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.defeat_timer.as_mut() else {
            return false;
        };
        *remaining -= dt;
        if *remaining > 0.0 {
            return false;
        }
        self.defeat_timer = None;
        self.defeated = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_requires_funds() {
        let mut economy = Economy::new(20, 100);
        assert!(economy.spend_coins(70));
        assert!(!economy.spend_coins(40), "Only 30 left");
        assert_eq!(economy.coins(), 30);
        economy.add_coins(15);
        assert_eq!(economy.coins(), 45);
    }

    #[test]
    fn test_defeat_latches_after_delay() {
        let mut economy = Economy::new(2, 0);
        assert!(!economy.take_damage(1));
        assert!(economy.take_damage(5), "Hearts hit zero");
        assert_eq!(economy.hearts(), 0);
        assert!(economy.is_defeat_pending());
        assert!(!economy.take_damage(1), "Countdown starts once");

        assert!(!economy.tick_defeat(0.5));
        assert!(economy.tick_defeat(0.5));
        assert!(!economy.tick_defeat(0.5), "Defeat latches once");
        assert!(economy.is_defeat_pending());
    }
}
