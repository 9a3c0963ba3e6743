use crate::customers::CustomerId;
use crate::garden::plot::{PlotId, PlotStatus};
use crate::garden::seed::SeedId;

/// Why a player command was refused. A rejected command leaves state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("no seed {0} in the inventory")]
    UnknownSeed(SeedId),
    #[error("no plot {0}")]
    UnknownPlot(PlotId),
    #[error("no customer {0}")]
    UnknownCustomer(CustomerId),
    #[error("plot {0} is locked")]
    PlotLocked(PlotId),
    #[error("plot {0} already has both parents")]
    PlotFull(PlotId),
    #[error("plot {plot} is {status:?}")]
    WrongStatus { plot: PlotId, status: PlotStatus },
    #[error("plot {0} needs two parents before crossing")]
    MissingParent(PlotId),
    #[error("plot {0} is already unlocked")]
    AlreadyUnlocked(PlotId),
    #[error("not enough money: need {needed}, have {available}")]
    InsufficientFunds { needed: u32, available: u32 },
    #[error("seed {0} is already identified")]
    AlreadyRevealed(SeedId),
    #[error("the tutorial is not waiting for that")]
    TutorialNotWaiting,
}
