pub mod commands;
pub mod controller;
pub mod events;

use tracing::debug;

use crate::config::simulation::SimulationConfig;
use crate::garden::GameState;
use crate::progression::TutorialTrigger;
use crate::simulation::commands::advance_tutorial;
use crate::simulation::events::GameEvent;

pub use commands::{apply_command, Command};
pub use controller::Simulation;

/// Per-tick rates, lifted out of the config so the tick stays pure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRules {
    pub growth_rate: u8,
    /// Growth rate while the tutorial is walking the player through a cross.
    pub tutorial_growth_rate: u8,
    pub ticks_per_day: u32,
}

impl Default for TickRules {
    fn default() -> Self {
        TickRules {
            growth_rate: 5,
            tutorial_growth_rate: 20,
            ticks_per_day: 120,
        }
    }
}

impl From<&SimulationConfig> for TickRules {
    fn from(config: &SimulationConfig) -> Self {
        TickRules {
            growth_rate: config.growth_rate,
            tutorial_growth_rate: config.tutorial_growth_rate,
            ticks_per_day: config.ticks_per_day,
        }
    }
}

/// Result of executing a single tick.
#[derive(Debug, Default, PartialEq)]
pub struct TickResult {
    /// False only for a paused tick; any other tick moves the counter.
    pub changed: bool,
    pub events: Vec<GameEvent>,
}

/// Execute a single simulation tick on the game state.
///
/// Grows plots, lets the tutorial react to finished growth, counts customers
/// down and drops the ones that gave up, then advances the tick counter and
/// the day. A paused state is left alone.
pub fn execute_tick(state: &mut GameState, rules: &TickRules) -> TickResult {
    let mut result = TickResult::default();
    if state.is_paused {
        return result;
    }

    // Growth
    let rate = if state.tutorial_step.is_scripted() {
        rules.tutorial_growth_rate
    } else {
        rules.growth_rate
    };
    let mut any_ready = false;
    for plot in &mut state.plots {
        if plot.grow(rate) {
            any_ready = true;
            result.events.push(GameEvent::PlotReady { plot: plot.id });
        }
    }
    if any_ready {
        advance_tutorial(state, TutorialTrigger::GrowthCompleted, &mut result.events);
    }

    // Customers
    let mut left = Vec::new();
    state.customers.retain_mut(|c| {
        if c.count_down() {
            left.push(c.id);
            false
        } else {
            true
        }
    });
    result
        .events
        .extend(left.into_iter().map(|customer| GameEvent::CustomerLeft { customer }));

    // Calendar
    state.tick_count += 1;
    result.changed = true;
    if rules.ticks_per_day > 0 && state.tick_count % rules.ticks_per_day as u64 == 0 {
        state.day += 1;
        result.events.push(GameEvent::DayStarted { day: state.day });
    }

    if !result.events.is_empty() {
        debug!(tick = state.tick_count, events = result.events.len(), "Tick produced events");
    }
    result
}
