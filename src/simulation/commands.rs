use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::customers::CustomerId;
use crate::error::Rejection;
use crate::garden::{GameState, PlotId, SeedId, SeedKind};
use crate::progression::{TutorialStep, TutorialTrigger, SERVE_REPUTATION_GAIN, SERVE_REPUTATION_LOSS};
use crate::simulation::events::GameEvent;

pub const SEED_PRICE: u32 = 50;
pub const IDENTIFY_PRICE: u32 = 20;

/// Everything a player can do to the shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    SelectSeed { seed: SeedId },
    PlaceSeed { plot: PlotId, seed: SeedId },
    Cross { plot: PlotId },
    Harvest { plot: PlotId },
    UnlockPlot { plot: PlotId },
    BuySeed { kind: SeedKind },
    IdentifySeed { seed: SeedId },
    ServeCustomer { customer: CustomerId, seed: SeedId },
    AdvanceTutorial,
    SkipTutorial,
    Reset,
    SetPaused { paused: bool },
}

/// Apply a command. Every precondition is checked before anything is
/// mutated, so a rejection leaves `state` exactly as it was.
pub fn apply_command(
    state: &mut GameState,
    command: Command,
    rng: &mut impl Rng,
) -> Result<Vec<GameEvent>, Rejection> {
    debug!(?command, "Applying command");
    let mut events = Vec::new();
    match command {
        Command::SelectSeed { seed } => select_seed(state, seed, &mut events)?,
        Command::PlaceSeed { plot, seed } => place_seed(state, plot, seed, &mut events)?,
        Command::Cross { plot } => cross(state, plot, rng, &mut events)?,
        Command::Harvest { plot } => harvest(state, plot, &mut events)?,
        Command::UnlockPlot { plot } => unlock_plot(state, plot, &mut events)?,
        Command::BuySeed { kind } => buy_seed(state, kind, rng, &mut events)?,
        Command::IdentifySeed { seed } => identify_seed(state, seed, &mut events)?,
        Command::ServeCustomer { customer, seed } => {
            serve_customer(state, customer, seed, &mut events)?
        }
        Command::AdvanceTutorial => {
            if !advance_tutorial(state, TutorialTrigger::IntroAcknowledged, &mut events) {
                return Err(Rejection::TutorialNotWaiting);
            }
        }
        Command::SkipTutorial => {
            if !state.tutorial_step.is_active() {
                return Err(Rejection::TutorialNotWaiting);
            }
            state.tutorial_step = TutorialStep::DONE;
            events.push(GameEvent::TutorialAdvanced {
                step: TutorialStep::DONE,
            });
        }
        Command::Reset => {
            *state = GameState::new(rng);
            events.push(GameEvent::GameReset);
        }
        Command::SetPaused { paused } => {
            if state.is_paused != paused {
                state.is_paused = paused;
                events.push(GameEvent::PauseChanged { paused });
            }
        }
    }
    Ok(events)
}

/// Move the tutorial forward if it is waiting for `trigger`.
pub(crate) fn advance_tutorial(
    state: &mut GameState,
    trigger: TutorialTrigger,
    events: &mut Vec<GameEvent>,
) -> bool {
    match state.tutorial_step.advance(trigger) {
        Some(step) => {
            state.tutorial_step = step;
            events.push(GameEvent::TutorialAdvanced { step });
            true
        }
        None => false,
    }
}

fn plot_index(state: &GameState, plot: PlotId) -> Result<usize, Rejection> {
    state
        .plots
        .iter()
        .position(|p| p.id == plot)
        .ok_or(Rejection::UnknownPlot(plot))
}

fn require_seed(state: &GameState, seed: SeedId) -> Result<(), Rejection> {
    state
        .seed(seed)
        .map(|_| ())
        .ok_or(Rejection::UnknownSeed(seed))
}

fn charge(state: &mut GameState, price: u32) -> Result<(), Rejection> {
    if state.money < price {
        return Err(Rejection::InsufficientFunds {
            needed: price,
            available: state.money,
        });
    }
    state.money -= price;
    Ok(())
}

fn select_seed(state: &mut GameState, seed: SeedId, events: &mut Vec<GameEvent>) -> Result<(), Rejection> {
    require_seed(state, seed)?;
    state.selected_seed_id = if state.selected_seed_id == Some(seed) {
        None
    } else {
        Some(seed)
    };
    events.push(GameEvent::SeedSelected {
        seed: state.selected_seed_id,
    });
    if state.selected_seed_id.is_some() {
        advance_tutorial(state, TutorialTrigger::SeedSelected, events);
    }
    Ok(())
}

fn place_seed(
    state: &mut GameState,
    plot: PlotId,
    seed: SeedId,
    events: &mut Vec<GameEvent>,
) -> Result<(), Rejection> {
    let index = plot_index(state, plot)?;
    state.plots[index].accepts_seed()?;
    let taken = state.take_seed(seed).ok_or(Rejection::UnknownSeed(seed))?;

    let both = state.plots[index].place(taken);
    state.selected_seed_id = None;
    events.push(GameEvent::SeedPlaced { plot, seed });
    if both {
        advance_tutorial(state, TutorialTrigger::BothParentsPlaced, events);
    }
    Ok(())
}

fn cross(
    state: &mut GameState,
    plot: PlotId,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) -> Result<(), Rejection> {
    let index = plot_index(state, plot)?;
    state.plots[index].start_cross(rng)?;
    events.push(GameEvent::CrossStarted { plot });
    advance_tutorial(state, TutorialTrigger::CrossStarted, events);
    Ok(())
}

fn harvest(state: &mut GameState, plot: PlotId, events: &mut Vec<GameEvent>) -> Result<(), Rejection> {
    let index = plot_index(state, plot)?;
    let seeds = state.plots[index].harvest()?;
    let ids = seeds.iter().map(|s| s.id).collect();
    state.inventory.extend(seeds);
    events.push(GameEvent::Harvested { plot, seeds: ids });
    advance_tutorial(state, TutorialTrigger::Harvested, events);
    Ok(())
}

fn unlock_plot(state: &mut GameState, plot: PlotId, events: &mut Vec<GameEvent>) -> Result<(), Rejection> {
    let index = plot_index(state, plot)?;
    let price = state.plots[index].unlock(state.money)?;
    state.money -= price;
    events.push(GameEvent::PlotUnlocked { plot, price });
    Ok(())
}

fn buy_seed(
    state: &mut GameState,
    kind: SeedKind,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) -> Result<(), Rejection> {
    charge(state, SEED_PRICE)?;
    let seed = kind.produce(rng);
    events.push(GameEvent::SeedBought {
        kind,
        seed: seed.id,
        price: SEED_PRICE,
    });
    state.inventory.push(seed);
    Ok(())
}

fn identify_seed(state: &mut GameState, seed: SeedId, events: &mut Vec<GameEvent>) -> Result<(), Rejection> {
    let index = state
        .inventory
        .iter()
        .position(|s| s.id == seed)
        .ok_or(Rejection::UnknownSeed(seed))?;
    if state.inventory[index].is_revealed {
        return Err(Rejection::AlreadyRevealed(seed));
    }
    charge(state, IDENTIFY_PRICE)?;
    let target = &mut state.inventory[index];
    target.is_revealed = true;
    events.push(GameEvent::SeedIdentified {
        seed,
        genotype: target.genotype,
    });
    Ok(())
}

/// Hand one seed to a customer. The seed is spent either way; only a match
/// pays out and sends the customer home.
fn serve_customer(
    state: &mut GameState,
    customer: CustomerId,
    seed: SeedId,
    events: &mut Vec<GameEvent>,
) -> Result<(), Rejection> {
    let index = state
        .customers
        .iter()
        .position(|c| c.id == customer)
        .ok_or(Rejection::UnknownCustomer(customer))?;
    let served = state.take_seed(seed).ok_or(Rejection::UnknownSeed(seed))?;
    state.selected_seed_id = None;

    match state.customers[index].requirements.judge(&served) {
        Ok(()) => {
            let reward = state.customers[index].reward;
            state.money = state.money.saturating_add(reward);
            state.adjust_reputation(SERVE_REPUTATION_GAIN, 0);
            state.customers.remove(index);
            events.push(GameEvent::OrderServed {
                customer,
                success: true,
                reward,
                mismatch: None,
            });
            advance_tutorial(state, TutorialTrigger::OrderFulfilled, events);
        }
        Err(mismatch) => {
            state.adjust_reputation(0, SERVE_REPUTATION_LOSS);
            events.push(GameEvent::OrderServed {
                customer,
                success: false,
                reward: 0,
                mismatch: Some(mismatch),
            });
        }
    }
    Ok(())
}
