use serde::Serialize;
use std::fmt;

use crate::customers::{CustomerId, Mismatch};
use crate::garden::{PlotId, SeedId, SeedKind};
use crate::genetics::Genotype;
use crate::progression::TutorialStep;

/// Something that happened in the shop. Emitted by commands and ticks so a
/// presentation layer can play sounds, show dialogue, or redraw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum GameEvent {
    SeedSelected { seed: Option<SeedId> },
    SeedPlaced { plot: PlotId, seed: SeedId },
    CrossStarted { plot: PlotId },
    PlotReady { plot: PlotId },
    Harvested { plot: PlotId, seeds: Vec<SeedId> },
    PlotUnlocked { plot: PlotId, price: u32 },
    SeedBought { kind: SeedKind, seed: SeedId, price: u32 },
    SeedIdentified { seed: SeedId, genotype: Genotype },
    OrderServed {
        customer: CustomerId,
        success: bool,
        reward: u32,
        mismatch: Option<Mismatch>,
    },
    CustomerArrived { customer: CustomerId },
    /// The customer ran out of patience. Distinct from a failed serve.
    CustomerLeft { customer: CustomerId },
    LevelUp { level: u8 },
    TutorialAdvanced { step: TutorialStep },
    PauseChanged { paused: bool },
    DayStarted { day: u32 },
    GameReset,
}

impl GameEvent {
    /// Scene description handed to the tutor-hint provider, if this event
    /// deserves a hint.
    pub fn hint_context(&self) -> Option<String> {
        let context = match self {
            GameEvent::CrossStarted { .. } => "A cross has started and the genes are recombining.".to_string(),
            GameEvent::Harvested { seeds, .. } => format!(
                "The player just harvested {} new seeds and should inspect their traits.",
                seeds.len()
            ),
            GameEvent::PlotUnlocked { .. } => "A new plot was unlocked, so production can expand.".to_string(),
            GameEvent::SeedIdentified { .. } => "A seed's genotype was revealed, so its purity is now known.".to_string(),
            GameEvent::OrderServed { success: true, .. } => "An order was completed and the customer is happy.".to_string(),
            GameEvent::OrderServed {
                mismatch: Some(reason),
                ..
            } => format!("An order failed: {}.", reason),
            GameEvent::OrderServed { .. } => "An order failed because the pea did not meet the requirement.".to_string(),
            GameEvent::CustomerArrived { .. } => "A new customer arrived. Check which traits they want.".to_string(),
            GameEvent::LevelUp { .. } => "The shop levelled up and customers will ask for harder orders.".to_string(),
            _ => return None,
        };
        Some(context)
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::SeedSelected { seed: Some(id) } => write!(f, "Selected seed {}", short_id(id)),
            GameEvent::SeedSelected { seed: None } => write!(f, "Selection cleared"),
            GameEvent::SeedPlaced { plot, seed } => {
                write!(f, "Planted seed {} in plot {}", short_id(seed), plot)
            }
            GameEvent::CrossStarted { plot } => write!(f, "Plot {}: cross started", plot),
            GameEvent::PlotReady { plot } => write!(f, "Plot {}: pods are ripe", plot),
            GameEvent::Harvested { plot, seeds } => {
                write!(f, "Plot {}: harvested {} seeds", plot, seeds.len())
            }
            GameEvent::PlotUnlocked { plot, price } => {
                write!(f, "Plot {} unlocked for {} coins", plot, price)
            }
            GameEvent::SeedBought { kind, seed, price } => write!(
                f,
                "Bought a {} seed ({}) for {} coins",
                kind.name(),
                short_id(seed),
                price
            ),
            GameEvent::SeedIdentified { seed, genotype } => {
                write!(f, "Seed {} is {}", short_id(seed), genotype)
            }
            GameEvent::OrderServed {
                success: true,
                reward,
                ..
            } => write!(f, "Order complete! +{} coins", reward),
            GameEvent::OrderServed {
                mismatch: Some(reason),
                ..
            } => write!(f, "Order failed: {}", reason),
            GameEvent::OrderServed { .. } => write!(f, "Order failed"),
            GameEvent::CustomerArrived { customer } => {
                write!(f, "A customer walked in ({})", short_id(customer))
            }
            GameEvent::CustomerLeft { customer } => {
                write!(f, "Customer {} got tired of waiting and left", short_id(customer))
            }
            GameEvent::LevelUp { level } => write!(f, "Shop upgraded to level {}!", level),
            GameEvent::TutorialAdvanced { step } if step.is_active() => {
                write!(f, "Tutorial step {}", step.get())
            }
            GameEvent::TutorialAdvanced { .. } => write!(f, "Tutorial complete"),
            GameEvent::PauseChanged { paused: true } => write!(f, "Paused"),
            GameEvent::PauseChanged { paused: false } => write!(f, "Resumed"),
            GameEvent::DayStarted { day } => write!(f, "Day {} begins", day),
            GameEvent::GameReset => write!(f, "Started a new garden"),
        }
    }
}

/// First six hex digits of an id; enough to type on the command line.
pub fn short_id(id: &uuid::Uuid) -> String {
    id.simple().to_string()[..6].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_and_successful_serves_have_different_hints() {
        let id = uuid::Uuid::nil();
        let ok = GameEvent::OrderServed {
            customer: id,
            success: true,
            reward: 30,
            mismatch: None,
        };
        let bad = GameEvent::OrderServed {
            customer: id,
            success: false,
            reward: 0,
            mismatch: Some(Mismatch::WrongGenotype),
        };
        assert_ne!(ok.hint_context(), bad.hint_context());
        assert!(bad.hint_context().unwrap().contains("purebred"));
        assert!(GameEvent::PlotReady { plot: 0 }.hint_context().is_none());
    }

    #[test]
    fn harvest_hint_counts_seeds() {
        let event = GameEvent::Harvested {
            plot: 0,
            seeds: vec![uuid::Uuid::nil(); 4],
        };
        assert!(event.hint_context().unwrap().contains("harvested 4 new seeds"));
    }

    #[test]
    fn arriving_customer_has_hint() {
        let event = GameEvent::CustomerArrived {
            customer: uuid::Uuid::nil(),
        };
        assert!(event.hint_context().is_some());
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(GameEvent::LevelUp { level: 2 }).unwrap();
        assert_eq!(json["event"], "LevelUp");
        assert_eq!(json["level"], 2);
    }

    #[test]
    fn short_id_is_six_hex_digits() {
        assert_eq!(short_id(&uuid::Uuid::nil()), "000000");
    }
}
