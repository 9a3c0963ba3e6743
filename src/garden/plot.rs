use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Rejection;
use crate::garden::seed::{create_seed, Seed};
use crate::genetics;

pub type PlotId = usize;

/// Progress value at which a growing plot becomes ready.
pub const FULL_GROWTH: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotStatus {
    Empty,
    Planted,
    Growing,
    Ready,
}

/// One field in the garden.
///
/// Lifecycle: `Empty → Planted → Growing → Ready → Empty`. `is_locked` overlays
/// `Empty` for plots that have not been bought yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GardenPlot {
    pub id: PlotId,
    pub parent1: Option<Seed>,
    pub parent2: Option<Seed>,
    pub offspring: Option<Vec<Seed>>,
    pub status: PlotStatus,
    pub progress: u8,
    pub is_locked: bool,
    pub unlock_price: u32,
}

impl GardenPlot {
    /// A fresh empty plot; plots with a price start locked.
    pub fn new(id: PlotId, unlock_price: u32) -> Self {
        GardenPlot {
            id,
            parent1: None,
            parent2: None,
            offspring: None,
            status: PlotStatus::Empty,
            progress: 0,
            is_locked: unlock_price > 0,
            unlock_price,
        }
    }

    pub fn has_both_parents(&self) -> bool {
        self.parent1.is_some() && self.parent2.is_some()
    }

    /// Check whether another parent seed can go in.
    pub fn accepts_seed(&self) -> Result<(), Rejection> {
        if self.is_locked {
            return Err(Rejection::PlotLocked(self.id));
        }
        if self.has_both_parents() {
            return Err(Rejection::PlotFull(self.id));
        }
        match self.status {
            PlotStatus::Empty | PlotStatus::Planted => Ok(()),
            status => Err(Rejection::WrongStatus {
                plot: self.id,
                status,
            }),
        }
    }

    /// Fill `parent1`, then `parent2`. Callers check [`accepts_seed`] first.
    /// Returns true once both parents are present.
    ///
    /// [`accepts_seed`]: GardenPlot::accepts_seed
    pub fn place(&mut self, seed: Seed) -> bool {
        if self.parent1.is_none() {
            self.parent1 = Some(seed);
        } else if self.parent2.is_none() {
            self.parent2 = Some(seed);
        }
        self.status = PlotStatus::Planted;
        self.has_both_parents()
    }

    /// Cross both parents into four growing offspring.
    pub fn start_cross(&mut self, rng: &mut impl Rng) -> Result<(), Rejection> {
        if self.status != PlotStatus::Planted {
            return Err(Rejection::WrongStatus {
                plot: self.id,
                status: self.status,
            });
        }
        let (Some(p1), Some(p2)) = (&self.parent1, &self.parent2) else {
            return Err(Rejection::MissingParent(self.id));
        };

        let genotypes = genetics::cross(&p1.genotype, &p2.genotype, rng);
        let offspring = genotypes
            .into_iter()
            .map(|g| create_seed(g, false, false, rng))
            .collect();

        self.offspring = Some(offspring);
        self.status = PlotStatus::Growing;
        self.progress = 0;
        Ok(())
    }

    /// Advance growth by `rate`. Returns true only on the tick the plot
    /// crosses into `Ready`.
    pub fn grow(&mut self, rate: u8) -> bool {
        if self.status != PlotStatus::Growing {
            return false;
        }
        let next = self.progress.saturating_add(rate);
        if next >= FULL_GROWTH {
            self.progress = FULL_GROWTH;
            self.status = PlotStatus::Ready;
            true
        } else {
            self.progress = next;
            false
        }
    }

    /// Take the offspring out and reset to `Empty`. Parents are consumed.
    pub fn harvest(&mut self) -> Result<Vec<Seed>, Rejection> {
        if self.status != PlotStatus::Ready {
            return Err(Rejection::WrongStatus {
                plot: self.id,
                status: self.status,
            });
        }
        let seeds = self.offspring.take().unwrap_or_default();
        self.parent1 = None;
        self.parent2 = None;
        self.progress = 0;
        self.status = PlotStatus::Empty;
        Ok(seeds)
    }

    /// Unlock against `available` money; returns the price to charge.
    pub fn unlock(&mut self, available: u32) -> Result<u32, Rejection> {
        if !self.is_locked {
            return Err(Rejection::AlreadyUnlocked(self.id));
        }
        if available < self.unlock_price {
            return Err(Rejection::InsufficientFunds {
                needed: self.unlock_price,
                available,
            });
        }
        self.is_locked = false;
        Ok(self.unlock_price)
    }

    /// Whether the status/offspring/parent invariants hold.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            PlotStatus::Empty => {
                self.parent1.is_none()
                    && self.parent2.is_none()
                    && self.offspring.is_none()
                    && self.progress == 0
            }
            PlotStatus::Planted => {
                (self.parent1.is_some() || self.parent2.is_some()) && self.offspring.is_none()
            }
            PlotStatus::Growing => self.offspring.is_some() && self.progress < FULL_GROWTH,
            PlotStatus::Ready => self.offspring.is_some() && self.progress == FULL_GROWTH,
        }
    }

    /// Best-effort repair of a plot loaded from an older or damaged save.
    pub(crate) fn repair(&mut self) {
        for seed in [&mut self.parent1, &mut self.parent2].into_iter().flatten() {
            seed.refresh_phenotype();
        }
        for seed in self.offspring.iter_mut().flatten() {
            seed.refresh_phenotype();
        }
        if self.is_consistent() {
            return;
        }
        match self.status {
            PlotStatus::Growing | PlotStatus::Ready if self.offspring.is_some() => {
                self.progress = self.progress.min(FULL_GROWTH);
                self.status = if self.progress == FULL_GROWTH {
                    PlotStatus::Ready
                } else {
                    PlotStatus::Growing
                };
            }
            _ => {
                self.offspring = None;
                self.progress = 0;
                self.status = if self.parent1.is_some() || self.parent2.is_some() {
                    PlotStatus::Planted
                } else {
                    PlotStatus::Empty
                };
            }
        }
        if self.parent1.is_none() && self.parent2.is_some() {
            self.parent1 = self.parent2.take();
        }
    }
}
