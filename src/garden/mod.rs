pub mod plot;
pub mod seed;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::customers::Customer;
use crate::progression::{level_for, TutorialStep, MAX_REPUTATION};
pub use plot::{GardenPlot, PlotId, PlotStatus};
pub use seed::{create_seed, Seed, SeedId, SeedKind};

pub const STARTING_MONEY: u32 = 200;
pub const PLOT_COUNT: usize = 3;
/// Unlock price per plot; plot 0 is free and open.
pub const PLOT_PRICES: [u32; PLOT_COUNT] = [0, 100, 200];

/// The whole shop: wallet, seeds, plots, and waiting customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub money: u32,
    pub reputation: u32,
    pub day: u32,
    #[serde(default)]
    pub tick_count: u64,
    pub inventory: Vec<Seed>,
    pub plots: Vec<GardenPlot>,
    pub customers: Vec<Customer>,
    pub is_paused: bool,
    pub selected_seed_id: Option<SeedId>,
    /// Saves written before the tutorial existed load as "tutorial complete".
    #[serde(default)]
    pub tutorial_step: TutorialStep,
}

pub fn starter_plots() -> Vec<GardenPlot> {
    PLOT_PRICES
        .iter()
        .enumerate()
        .map(|(id, &price)| GardenPlot::new(id, price))
        .collect()
}

impl GameState {
    /// A new game: one pure-dominant seed, one recessive tester, one open plot.
    pub fn new(rng: &mut impl Rng) -> Self {
        GameState {
            money: STARTING_MONEY,
            reputation: 0,
            day: 1,
            tick_count: 0,
            inventory: vec![
                SeedKind::PureDominant.produce(rng),
                SeedKind::PureRecessive.produce(rng),
            ],
            plots: starter_plots(),
            customers: Vec::new(),
            is_paused: false,
            selected_seed_id: None,
            tutorial_step: TutorialStep::INTRO,
        }
    }

    pub fn level(&self) -> u8 {
        level_for(self.reputation)
    }

    pub fn seed(&self, id: SeedId) -> Option<&Seed> {
        self.inventory.iter().find(|s| s.id == id)
    }

    pub fn plot(&self, id: PlotId) -> Option<&GardenPlot> {
        self.plots.iter().find(|p| p.id == id)
    }

    /// Remove a seed from the inventory, keeping the order of the rest.
    pub(crate) fn take_seed(&mut self, id: SeedId) -> Option<Seed> {
        let index = self.inventory.iter().position(|s| s.id == id)?;
        if self.selected_seed_id == Some(id) {
            self.selected_seed_id = None;
        }
        Some(self.inventory.remove(index))
    }

    pub(crate) fn adjust_reputation(&mut self, gain: u32, loss: u32) {
        self.reputation = self
            .reputation
            .saturating_add(gain)
            .saturating_sub(loss)
            .min(MAX_REPUTATION);
    }

    /// Bring a loaded save up to the current schema. Best effort, never fails.
    pub fn migrate(&mut self) {
        if self.plots.len() > PLOT_COUNT {
            self.plots.truncate(PLOT_COUNT);
        }
        while self.plots.len() < PLOT_COUNT {
            let id = self.plots.len();
            self.plots.push(GardenPlot::new(id, PLOT_PRICES[id]));
        }
        for (index, plot) in self.plots.iter_mut().enumerate() {
            plot.id = index;
            plot.repair();
        }
        for seed in &mut self.inventory {
            seed.refresh_phenotype();
        }

        self.reputation = self.reputation.min(MAX_REPUTATION);
        self.day = self.day.max(1);
        self.tutorial_step = TutorialStep::new(self.tutorial_step.get()).unwrap_or_default();

        if let Some(id) = self.selected_seed_id {
            if self.seed(id).is_none() {
                self.selected_seed_id = None;
            }
        }
    }
}
