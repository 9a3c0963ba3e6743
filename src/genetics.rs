use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// === Alleles & Traits ===

/// One symbol at a locus. `Dominant` sorts first so a sorted pair is canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Allele {
    Dominant,
    Recessive,
}

impl Allele {
    pub fn is_dominant(self) -> bool {
        self == Allele::Dominant
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Height {
    High,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Round,
    Wrinkled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phenotype {
    pub height: Height,
    pub shape: Shape,
}

impl Phenotype {
    pub fn new(height: Height, shape: Shape) -> Self {
        Phenotype { height, shape }
    }

    /// Human-readable trait pair, e.g. "tall, round".
    pub fn label(&self) -> String {
        let height = match self.height {
            Height::High => "tall",
            Height::Short => "short",
        };
        let shape = match self.shape {
            Shape::Round => "round",
            Shape::Wrinkled => "wrinkled",
        };
        format!("{}, {}", height, shape)
    }
}

/// Homozygosity across both loci.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Purity {
    PureBoth,
    PureOne,
    PureNeither,
}

impl fmt::Display for Purity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Purity::PureBoth => write!(f, "homozygous (purebred)"),
            Purity::PureOne => write!(f, "monohybrid"),
            Purity::PureNeither => write!(f, "dihybrid"),
        }
    }
}

// === Genotype ===

/// Diploid genotype over the height (`A`/`a`) and shape (`B`/`b`) loci.
///
/// Each locus pair is kept sorted dominant-first, so two genetically identical
/// states always compare and serialize equal (`Aa`, never `aA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Genotype {
    height: [Allele; 2],
    shape: [Allele; 2],
}

/// Reasons a genotype string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenotypeError {
    #[error("genotype must be exactly 4 symbols, got {0:?}")]
    Length(String),
    #[error("symbol {symbol:?} at position {position} is not a valid allele (expected {expected})")]
    Symbol {
        symbol: char,
        position: usize,
        expected: &'static str,
    },
}

fn canonical(mut pair: [Allele; 2]) -> [Allele; 2] {
    pair.sort();
    pair
}

impl Genotype {
    pub fn new(height: [Allele; 2], shape: [Allele; 2]) -> Self {
        Genotype {
            height: canonical(height),
            shape: canonical(shape),
        }
    }

    pub fn height_alleles(&self) -> [Allele; 2] {
        self.height
    }

    pub fn shape_alleles(&self) -> [Allele; 2] {
        self.shape
    }

    /// All nine canonical genotypes, dominant-heavy first.
    pub fn all() -> [Genotype; 9] {
        use Allele::{Dominant as D, Recessive as R};
        let pairs = [[D, D], [D, R], [R, R]];
        let mut out = [Genotype::new([D, D], [D, D]); 9];
        let mut i = 0;
        for shape in pairs {
            for height in pairs {
                out[i] = Genotype::new(height, shape);
                i += 1;
            }
        }
        out
    }

    /// The purebred genotype that expresses `phenotype` (`AA`/`aa` × `BB`/`bb`).
    pub fn purebred_for(phenotype: Phenotype) -> Self {
        let height = match phenotype.height {
            Height::High => [Allele::Dominant; 2],
            Height::Short => [Allele::Recessive; 2],
        };
        let shape = match phenotype.shape {
            Shape::Round => [Allele::Dominant; 2],
            Shape::Wrinkled => [Allele::Recessive; 2],
        };
        Genotype { height, shape }
    }

    pub fn is_purebred(&self) -> bool {
        self.describe_purity() == Purity::PureBoth
    }

    pub fn phenotype(&self) -> Phenotype {
        derive_phenotype(self)
    }

    pub fn describe_purity(&self) -> Purity {
        describe_purity(self)
    }

    /// The four gametes this parent can produce: height allele × shape allele.
    fn gametes(&self) -> [(Allele, Allele); 4] {
        let [h0, h1] = self.height;
        let [s0, s1] = self.shape;
        [(h0, s0), (h0, s1), (h1, s0), (h1, s1)]
    }
}

fn allele_symbol(allele: Allele, letter: char) -> char {
    match allele {
        Allele::Dominant => letter.to_ascii_uppercase(),
        Allele::Recessive => letter.to_ascii_lowercase(),
    }
}

fn parse_allele(symbol: char, position: usize, letter: char) -> Result<Allele, GenotypeError> {
    if symbol == letter.to_ascii_uppercase() {
        Ok(Allele::Dominant)
    } else if symbol == letter.to_ascii_lowercase() {
        Ok(Allele::Recessive)
    } else {
        Err(GenotypeError::Symbol {
            symbol,
            position,
            expected: if letter == 'a' { "A or a" } else { "B or b" },
        })
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for allele in self.height {
            write!(f, "{}", allele_symbol(allele, 'a'))?;
        }
        for allele in self.shape {
            write!(f, "{}", allele_symbol(allele, 'b'))?;
        }
        Ok(())
    }
}

impl FromStr for Genotype {
    type Err = GenotypeError;

    /// Accepts either allele order within a locus and canonicalizes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols: Vec<char> = s.chars().collect();
        if symbols.len() != 4 {
            return Err(GenotypeError::Length(s.to_string()));
        }
        let height = [
            parse_allele(symbols[0], 0, 'a')?,
            parse_allele(symbols[1], 1, 'a')?,
        ];
        let shape = [
            parse_allele(symbols[2], 2, 'b')?,
            parse_allele(symbols[3], 3, 'b')?,
        ];
        Ok(Genotype::new(height, shape))
    }
}

impl TryFrom<String> for Genotype {
    type Error = GenotypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Genotype> for String {
    fn from(genotype: Genotype) -> Self {
        genotype.to_string()
    }
}

// === Engine ===

/// Dominance per locus: the dominant trait shows if either allele is dominant.
pub fn derive_phenotype(genotype: &Genotype) -> Phenotype {
    let tall = genotype.height.iter().any(|a| a.is_dominant());
    let round = genotype.shape.iter().any(|a| a.is_dominant());
    Phenotype {
        height: if tall { Height::High } else { Height::Short },
        shape: if round { Shape::Round } else { Shape::Wrinkled },
    }
}

pub fn describe_purity(genotype: &Genotype) -> Purity {
    let pure_height = genotype.height[0] == genotype.height[1];
    let pure_shape = genotype.shape[0] == genotype.shape[1];
    match (pure_height, pure_shape) {
        (true, true) => Purity::PureBoth,
        (false, false) => Purity::PureNeither,
        _ => Purity::PureOne,
    }
}

/// Number of offspring produced by a single cross.
pub const OFFSPRING_PER_CROSS: usize = 4;

/// Simulate a cross: each offspring is an independent trial that draws one
/// gamete uniformly from each parent. Ratios converge to 9:3:3:1 / 3:1 / 1:2:1
/// only across many crosses.
pub fn cross(a: &Genotype, b: &Genotype, rng: &mut impl Rng) -> [Genotype; OFFSPRING_PER_CROSS] {
    let gametes_a = a.gametes();
    let gametes_b = b.gametes();
    std::array::from_fn(|_| {
        let (ha, sa) = gametes_a[rng.gen_range(0..gametes_a.len())];
        let (hb, sb) = gametes_b[rng.gen_range(0..gametes_b.len())];
        Genotype::new([ha, hb], [sa, sb])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn g(s: &str) -> Genotype {
        s.parse().unwrap()
    }

    #[test]
    fn parse_canonicalizes_allele_order() {
        assert_eq!(g("aAbB").to_string(), "AaBb");
        assert_eq!(g("aAbB"), g("AaBb"));
        assert_eq!(g("aabb").to_string(), "aabb");
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!("AaB".parse::<Genotype>(), Err(GenotypeError::Length(_))));
        assert!(matches!("AaBbB".parse::<Genotype>(), Err(GenotypeError::Length(_))));
        assert!(matches!(
            "BbAa".parse::<Genotype>(),
            Err(GenotypeError::Symbol { position: 0, .. })
        ));
        assert!(matches!(
            "AaCc".parse::<Genotype>(),
            Err(GenotypeError::Symbol { position: 2, .. })
        ));
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&g("AaBb")).unwrap();
        assert_eq!(json, "\"AaBb\"");
        let back: Genotype = serde_json::from_str("\"aAbB\"").unwrap();
        assert_eq!(back, g("AaBb"));
        assert!(serde_json::from_str::<Genotype>("\"bBaA\"").is_err());
        assert!(serde_json::from_str::<Genotype>("\"xyz1\"").is_err());
    }

    #[test]
    fn any_dominant_height_allele_is_high() {
        for s in ["AABB", "AaBB", "AAbb", "Aabb", "AaBb"] {
            assert_eq!(derive_phenotype(&g(s)).height, Height::High, "{}", s);
        }
        for s in ["aaBB", "aabb", "aaBb"] {
            assert_eq!(derive_phenotype(&g(s)).height, Height::Short, "{}", s);
        }
    }

    #[test]
    fn phenotype_is_deterministic() {
        for genotype in Genotype::all() {
            let reparsed = g(&genotype.to_string());
            assert_eq!(derive_phenotype(&genotype), derive_phenotype(&reparsed));
        }
        assert_eq!(
            derive_phenotype(&g("aaBb")),
            Phenotype::new(Height::Short, Shape::Round)
        );
        assert_eq!(
            derive_phenotype(&g("Aabb")),
            Phenotype::new(Height::High, Shape::Wrinkled)
        );
    }

    #[test]
    fn purity_classification() {
        assert_eq!(describe_purity(&g("AABB")), Purity::PureBoth);
        assert_eq!(describe_purity(&g("aabb")), Purity::PureBoth);
        assert_eq!(describe_purity(&g("AaBb")), Purity::PureNeither);
        assert_eq!(describe_purity(&g("AABb")), Purity::PureOne);
        assert_eq!(describe_purity(&g("Aabb")), Purity::PureOne);
    }

    #[test]
    fn all_genotypes_are_distinct() {
        let all = Genotype::all();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn purebred_for_expresses_the_phenotype() {
        for height in [Height::High, Height::Short] {
            for shape in [Shape::Round, Shape::Wrinkled] {
                let p = Phenotype::new(height, shape);
                let genotype = Genotype::purebred_for(p);
                assert!(genotype.is_purebred());
                assert_eq!(genotype.phenotype(), p);
            }
        }
    }

    #[test]
    fn pure_parents_always_produce_dihybrids() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let offspring = cross(&g("AABB"), &g("aabb"), &mut rng);
            assert!(offspring.iter().all(|o| o.to_string() == "AaBb"));
        }
    }

    #[test]
    fn offspring_alleles_come_from_parents() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let all = Genotype::all();
        for a in &all {
            for b in &all {
                for child in cross(a, b, &mut rng) {
                    assert_eq!(child.to_string().len(), 4);
                    for allele in child.height_alleles() {
                        assert!(
                            a.height_alleles().contains(&allele)
                                || b.height_alleles().contains(&allele)
                        );
                    }
                    for allele in child.shape_alleles() {
                        assert!(
                            a.shape_alleles().contains(&allele)
                                || b.shape_alleles().contains(&allele)
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn cross_is_reproducible_with_fixed_seed() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(99);
        let mut rng_b = ChaCha8Rng::seed_from_u64(99);
        let a = cross(&g("AaBb"), &g("AaBb"), &mut rng_a);
        let b = cross(&g("AaBb"), &g("AaBb"), &mut rng_b);
        assert_eq!(a, b);
    }

    #[test]
    fn dihybrid_self_cross_converges_to_nine_three_three_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let mut counts = std::collections::HashMap::new();
        let crosses = 4000;
        for _ in 0..crosses {
            for child in cross(&g("AaBb"), &g("AaBb"), &mut rng) {
                *counts.entry(child.phenotype()).or_insert(0u32) += 1;
            }
        }
        let total = (crosses * OFFSPRING_PER_CROSS) as f64;
        let share = |h, s| counts[&Phenotype::new(h, s)] as f64 / total;
        assert!((share(Height::High, Shape::Round) - 9.0 / 16.0).abs() < 0.02);
        assert!((share(Height::High, Shape::Wrinkled) - 3.0 / 16.0).abs() < 0.02);
        assert!((share(Height::Short, Shape::Round) - 3.0 / 16.0).abs() < 0.02);
        assert!((share(Height::Short, Shape::Wrinkled) - 1.0 / 16.0).abs() < 0.02);
    }
}
