use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::genetics::{derive_phenotype, Genotype, Phenotype};

pub type SeedId = Uuid;

/// A single pea. Only `is_revealed` may change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    pub id: SeedId,
    pub genotype: Genotype,
    /// Cached projection of `genotype`; never set independently.
    pub phenotype: Phenotype,
    pub is_revealed: bool,
    pub is_tester: bool,
}

impl Seed {
    /// Recompute the cached phenotype from the genotype.
    pub(crate) fn refresh_phenotype(&mut self) {
        self.phenotype = derive_phenotype(&self.genotype);
    }
}

/// Create a seed with a fresh id drawn from `rng`.
pub fn create_seed(genotype: Genotype, revealed: bool, tester: bool, rng: &mut impl Rng) -> Seed {
    Seed {
        id: Uuid::from_bytes(rng.r#gen()),
        genotype,
        phenotype: derive_phenotype(&genotype),
        is_revealed: revealed,
        is_tester: tester,
    }
}

/// What the shop sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedKind {
    /// Uniformly one of the nine genotypes, genotype hidden.
    Mystery,
    PureDominant,
    PureRecessive,
}

impl SeedKind {
    pub fn all() -> &'static [SeedKind] {
        &[SeedKind::Mystery, SeedKind::PureDominant, SeedKind::PureRecessive]
    }

    pub fn name(&self) -> &str {
        match self {
            SeedKind::Mystery => "mystery",
            SeedKind::PureDominant => "pure_dominant",
            SeedKind::PureRecessive => "pure_recessive",
        }
    }

    pub fn from_name(name: &str) -> Option<SeedKind> {
        SeedKind::all().iter().copied().find(|k| k.name() == name)
    }

    /// Produce a fresh seed of this kind.
    pub fn produce(self, rng: &mut impl Rng) -> Seed {
        match self {
            SeedKind::PureDominant => create_seed(pure_dominant(), true, false, rng),
            SeedKind::PureRecessive => create_seed(pure_recessive(), true, true, rng),
            SeedKind::Mystery => {
                let all = Genotype::all();
                let genotype = all[rng.gen_range(0..all.len())];
                create_seed(genotype, false, false, rng)
            }
        }
    }
}

pub fn pure_dominant() -> Genotype {
    use crate::genetics::Allele::Dominant;
    Genotype::new([Dominant; 2], [Dominant; 2])
}

pub fn pure_recessive() -> Genotype {
    use crate::genetics::Allele::Recessive;
    Genotype::new([Recessive; 2], [Recessive; 2])
}
