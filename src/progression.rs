//! Reputation levels and the scripted tutorial.

use serde::{Deserialize, Serialize};

pub const MAX_REPUTATION: u32 = 1000;
pub const SERVE_REPUTATION_GAIN: u32 = 10;
pub const SERVE_REPUTATION_LOSS: u32 = 5;

/// Step function of reputation: `<100 → 1`, `<300 → 2`, else `3`.
pub fn level_for(reputation: u32) -> u8 {
    if reputation < 100 {
        1
    } else if reputation < 300 {
        2
    } else {
        3
    }
}

/// Difficulty knobs derived from the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelParams {
    pub level: u8,
    pub max_customers: usize,
    /// Ticks a new customer will wait.
    pub order_time: u32,
    pub reward: u32,
    /// Passed to the content provider as order difficulty.
    pub complexity: u8,
}

pub fn level_params(level: u8) -> LevelParams {
    let level = level.clamp(1, 3);
    LevelParams {
        level,
        max_customers: level as usize,
        order_time: match level {
            1 => 150,
            2 => 120,
            _ => 90,
        },
        reward: 20 + level as u32 * 10,
        complexity: level,
    }
}

// === Tutorial ===

/// Linear tutorial script. Step 0 means finished or skipped.
///
/// 1 intro, 2 select a seed, 3 place both parents, 4 cross, 5 wait for growth,
/// 6 harvest, 7 serve a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TutorialStep(u8);

/// Player actions the tutorial listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorialTrigger {
    IntroAcknowledged,
    SeedSelected,
    BothParentsPlaced,
    CrossStarted,
    GrowthCompleted,
    Harvested,
    OrderFulfilled,
}

impl TutorialStep {
    pub const DONE: TutorialStep = TutorialStep(0);
    pub const INTRO: TutorialStep = TutorialStep(1);
    pub const SERVE: TutorialStep = TutorialStep(7);

    pub fn new(step: u8) -> Option<TutorialStep> {
        (step <= 7).then_some(TutorialStep(step))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_active(self) -> bool {
        self.0 > 0
    }

    /// Steps 1..=6 speed up growth and keep customers away.
    pub fn is_scripted(self) -> bool {
        self.0 > 0 && self.0 < 7
    }

    /// The step reached if `trigger` happens now, or `None` if the tutorial
    /// is not waiting for it.
    pub fn advance(self, trigger: TutorialTrigger) -> Option<TutorialStep> {
        use TutorialTrigger::*;
        let next = match (self.0, trigger) {
            (1, IntroAcknowledged) => 2,
            (2, SeedSelected) => 3,
            (3, BothParentsPlaced) => 4,
            (4, CrossStarted) => 5,
            (5, GrowthCompleted) => 6,
            (6, Harvested) => 7,
            (7, OrderFulfilled) => 0,
            _ => return None,
        };
        Some(TutorialStep(next))
    }

    /// Instruction shown for the current step.
    pub fn instruction(self) -> Option<&'static str> {
        Some(match self.0 {
            1 => "Welcome to the pea garden! Let's explore heredity by growing peas. (type `next`)",
            2 => "See the seed packets in your inventory? Select one with `select <id>`.",
            3 => "Good! Now plant it with `place 0 <id>`. A cross needs two parents.",
            4 => "Both parents are in place. Start the cross with `cross 0`.",
            5 => "Genes are recombining... this will only take a moment.",
            6 => "Ripe! Harvest the pods with `harvest 0`.",
            7 => "A customer has arrived. Serve them one of your new seeds with `serve <customer> <seed>`.",
            _ => return None,
        })
    }
}
