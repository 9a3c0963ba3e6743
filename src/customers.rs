use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::garden::seed::Seed;
use crate::genetics::{Genotype, Phenotype};
use crate::progression::LevelParams;

pub type CustomerId = Uuid;

/// What a customer is asking for. When `genotype` is set it is the only
/// criterion; otherwise the seed must show `phenotype`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    /// Tracked for display; a single seed always resolves the order.
    pub quantity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phenotype: Option<Phenotype>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genotype: Option<Genotype>,
}

impl Requirements {
    pub fn phenotype(quantity: u8, phenotype: Phenotype) -> Self {
        Requirements {
            quantity,
            phenotype: Some(phenotype),
            genotype: None,
        }
    }

    /// An exact purebred request. The phenotype is kept for display.
    pub fn genotype(quantity: u8, genotype: Genotype) -> Self {
        Requirements {
            quantity,
            phenotype: Some(genotype.phenotype()),
            genotype: Some(genotype),
        }
    }

    /// Check a seed against the active criterion.
    pub fn judge(&self, seed: &Seed) -> Result<(), Mismatch> {
        if let Some(genotype) = self.genotype {
            return if seed.genotype == genotype {
                Ok(())
            } else {
                Err(Mismatch::WrongGenotype)
            };
        }
        match self.phenotype {
            Some(phenotype) if seed.phenotype != phenotype => Err(Mismatch::WrongAppearance),
            _ => Ok(()),
        }
    }

    pub fn summary(&self) -> String {
        match (self.genotype, self.phenotype) {
            (Some(g), _) => format!("{} x purebred {}", self.quantity, g),
            (None, Some(p)) => format!("{} x {}", self.quantity, p.label()),
            (None, None) => format!("{} x any pea", self.quantity),
        }
    }
}

/// Why a served seed did not satisfy an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mismatch {
    WrongAppearance,
    WrongGenotype,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mismatch::WrongAppearance => write!(f, "the pea does not look right"),
            Mismatch::WrongGenotype => write!(f, "the pea is not the purebred they asked for"),
        }
    }
}

/// Order parameters as supplied by a content provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub name: String,
    pub description: String,
    pub requirements: Requirements,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub requirements: Requirements,
    pub name: String,
    pub description: String,
    pub time_left: u32,
    pub max_time: u32,
    pub reward: u32,
}

impl Customer {
    /// Turn a draft into a waiting customer with level-scaled patience and pay.
    pub fn from_draft(draft: OrderDraft, params: &LevelParams, rng: &mut impl Rng) -> Self {
        Customer {
            id: Uuid::from_bytes(rng.r#gen()),
            requirements: draft.requirements,
            name: draft.name,
            description: draft.description,
            time_left: params.order_time,
            max_time: params.order_time,
            reward: params.reward,
        }
    }

    /// Count down one tick. Returns true once the customer has run out of time.
    pub fn count_down(&mut self) -> bool {
        self.time_left = self.time_left.saturating_sub(1);
        self.time_left == 0
    }
}
