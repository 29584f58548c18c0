//! Player commands sent from the presentation layer to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::types::{ActorId, TowerId};

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Waves ---
    /// Start the first wave, or the next one early during the countdown.
    StartWave,

    // --- Towers ---
    /// Spend coins to move a tower to its next level.
    UpgradeTower { tower: TowerId },
    /// Refund part of the investment and return the site to unbuilt.
    SellTower { tower: TowerId },

    // --- Animation layer ---
    /// An external animation sequence reached its completion point.
    AnimationComplete { cue: AnimationCue },

    // --- Simulation control ---
    Pause,
    Resume,
}

/// Completion callbacks the simulation waits on. Each one has a fallback
/// timer, so a cue that never arrives only delays progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cue")]
pub enum AnimationCue {
    /// The attack clip reached its release frame.
    VolleyRelease { archer: ActorId },
    /// The split clip finished on a special slime.
    SplitComplete { slime: ActorId },
    /// The tower finished its rebuild clip and reached idle.
    TowerIdleReached { tower: TowerId },
}
