//! Local order and hint generator used when no remote provider answers.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::customers::{OrderDraft, Requirements};
use crate::genetics::{Genotype, Height, Phenotype, Shape};

const NAMES: &[&str] = &[
    "Old Farmer Zhang",
    "Professor Li",
    "Botany Student Mei",
    "The Pea Shooter",
    "Dr. Sprout",
    "Biology Class Rep",
    "Neighbour Wang",
    "Farmer John",
    "A Mendel Fan",
    "Genetics TA",
];

const DESCRIPTIONS: &[&str] = &[
    "I have an experiment to run. Help me out.",
    "Today's soup needs a very particular ingredient.",
    "Show me how this trait gets passed down.",
    "I'm studying the law of segregation and need material.",
    "Fresh seeds, please!",
    "I want to fill the whole backyard and watch for variation.",
    "It's for science!",
    "I hear you sell the best peas in town?",
];

const TIPS: &[&str] = &[
    "Dominant traits mask recessive ones.",
    "Selfing a heterozygote (Aa) gives a 3:1 trait ratio.",
    "To get a recessive trait (aa), both parents must carry the recessive allele.",
    "A test cross with aabb reveals an unknown parent's genotype from its offspring.",
    "In the F2 generation the recessive trait usually shows up a quarter of the time.",
    "Independent assortment: different traits are inherited without interfering.",
    "If offspring split into different traits, one of the parents was heterozygous.",
    "Save up coins to unlock more plots and double your output.",
    "Each cross yields four offspring, one per gamete pairing drawn.",
    "Purebred (homozygous) lines breed true and never split.",
];

/// Largest quantity and chance of a purebred request, by level.
fn difficulty(level: u8) -> (u8, f64) {
    match level {
        0 | 1 => (1, 0.0),
        2 => (2, 0.2),
        _ => (3, 0.4),
    }
}

fn pick<'a>(list: &[&'a str], rng: &mut impl Rng) -> &'a str {
    list.choose(rng).copied().unwrap_or_default()
}

/// Random order scaled to `level`. Level 1 only asks for looks; higher levels
/// sometimes want the purebred genotype behind them.
pub fn customer_order(level: u8, rng: &mut impl Rng) -> OrderDraft {
    let height = if rng.gen_bool(0.5) { Height::High } else { Height::Short };
    let shape = if rng.gen_bool(0.5) { Shape::Round } else { Shape::Wrinkled };
    let phenotype = Phenotype::new(height, shape);

    let (max_quantity, genotype_chance) = difficulty(level);
    let quantity = rng.gen_range(1..=max_quantity);
    let wants_genotype = rng.gen_bool(genotype_chance);

    let mut description = pick(DESCRIPTIONS, rng).to_string();
    let requirements = if wants_genotype {
        let genotype = Genotype::purebred_for(phenotype);
        description = format!("I need purebred peas for a rigorous experiment! (genotype: {})", genotype);
        Requirements::genotype(quantity, genotype)
    } else {
        if level <= 1 {
            description = format!("Anything {} will do.", phenotype.label());
        }
        Requirements::phenotype(quantity, phenotype)
    };

    OrderDraft {
        name: pick(NAMES, rng).to_string(),
        description,
        requirements,
    }
}

pub fn tutor_hint(rng: &mut impl Rng) -> String {
    pick(TIPS, rng).to_string()
}
