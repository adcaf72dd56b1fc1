//! Property-based tests for genomes.
//!
//! These tests verify properties of parsing, alignment, decoding and the
//! genetic operators.
//! Run with: cargo test --release prop_genome

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::cast_precision_loss)]

use std::sync::Arc;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use age::genome::MATCH_SCORE;
use age::{Descriptor, Genome, Mutation, RawDescriptor};

fn descriptor(p: f64) -> Arc<Descriptor> {
    let raw = Mutation::ALL
        .into_iter()
        .fold(RawDescriptor::new("ACGT", ["ACGA", "ACAC"], "TGC", "TGA"), |raw, m| {
            raw.with_possibility(m.name(), p)
        });
    Arc::new(raw.validate().unwrap())
}

fn chromosome() -> impl Strategy<Value = String> {
    "[ACGT]{1,120}"
}

#[test]
fn concrete_chromosome_with_foreign_fillers() {
    let desc = Arc::new(
        RawDescriptor::new("ACGTWXYZ", ["ACGA"], "TGC", "TGA")
            .validate()
            .unwrap(),
    );
    let mut genome = Genome::with_chromosomes(desc, ["XXACGAYYTGCZZTGAWW".to_owned()]).unwrap();
    genome.parse();

    let devices = genome.devices();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].marker(), "ACGA");
    assert_eq!(devices[0].terminals(), &["YY".to_owned()]);
    assert_eq!(devices[0].parameters().len(), 1);
    assert_eq!(devices[0].parameters()[0].raw, "ZZ");
    assert!((devices[0].parameters()[0].value - 1.0).abs() < 1e-12);
}

#[test]
fn single_symbol_parameters_decode_to_their_rank() {
    let desc = descriptor(0.0);
    for (i, symbol) in ["A", "C", "G", "T"].into_iter().enumerate() {
        let value = desc.decode(symbol).unwrap();
        assert!((value - i as f64 / 3.0).abs() < 1e-12);
    }
    assert_eq!(desc.decode(""), None);
    assert_eq!(desc.decode("AXA"), None);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Mutation never leaves an empty chromosome or a foreign symbol.
    #[test]
    fn prop_mutation_preserves_alphabet(
        chromosomes in prop::collection::vec(chromosome(), 1..4),
        p in 0.0f64..0.6,
        seed in any::<u64>()
    ) {
        let desc = descriptor(p);
        let mut genome = Genome::with_chromosomes(Arc::clone(&desc), chromosomes).unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);
        for _ in 0..5 {
            genome.mutate(&mut rng);
        }
        for c in genome.chromosomes() {
            prop_assert!(desc.is_token(c), "bad chromosome {c:?}");
        }
    }

    /// Zero probabilities leave the genome untouched.
    #[test]
    fn prop_zero_possibilities_are_identity(
        chromosomes in prop::collection::vec(chromosome(), 1..4),
        seed in any::<u64>()
    ) {
        let mut genome = Genome::with_chromosomes(descriptor(0.0), chromosomes).unwrap();
        let before = genome.clone();
        genome.mutate(&mut SmallRng::seed_from_u64(seed));
        prop_assert_eq!(genome, before);
    }

    /// Crossover children only contain parent symbols and never more of them.
    #[test]
    fn prop_crossover_conserves_material(
        a in prop::collection::vec(chromosome(), 1..4),
        b in prop::collection::vec(chromosome(), 1..4),
        seed in any::<u64>()
    ) {
        let desc = descriptor(0.0);
        let a = Genome::with_chromosomes(Arc::clone(&desc), a).unwrap();
        let b = Genome::with_chromosomes(Arc::clone(&desc), b).unwrap();
        let child = Genome::crossover(&a, &b, &mut SmallRng::seed_from_u64(seed)).unwrap();

        prop_assert!(child.symbol_count() <= a.symbol_count() + b.symbol_count());
        for c in child.chromosomes() {
            prop_assert!(desc.is_token(c));
        }
    }

    /// Parsing is deterministic and every extracted part is non-empty.
    #[test]
    fn prop_parse_deterministic(chromosomes in prop::collection::vec(chromosome(), 1..4)) {
        let mut genome = Genome::with_chromosomes(descriptor(0.0), chromosomes).unwrap();
        genome.parse();
        let first = genome.devices().to_vec();
        genome.parse();
        prop_assert_eq!(genome.devices(), first.as_slice());

        for device in &first {
            prop_assert!(device.terminals().iter().all(|t| !t.is_empty()));
            for parameter in device.parameters() {
                prop_assert!(!parameter.raw.is_empty());
                prop_assert!((0.0..=1.0).contains(&parameter.value));
            }
        }
    }

    /// Without a substitution matrix the alignment score is symmetric and bounded.
    #[test]
    fn prop_alignment_symmetric_and_bounded(a in "[ACGT]{0,40}", b in "[ACGT]{0,40}") {
        let genome = Genome::new(descriptor(0.0));
        let ab = genome.local_alignment_score(&a, &b);
        let ba = genome.local_alignment_score(&b, &a);

        prop_assert!((ab - ba).abs() < 1e-9);
        prop_assert!(ab >= 0.0);
        prop_assert!(ab <= MATCH_SCORE * a.len().min(b.len()) as f64);
    }

    /// Terminal scores lie in `[0, MATCH_SCORE]` and peak on identical tags.
    #[test]
    fn prop_terminal_score_range(a in "[ACGT]{1,40}", b in "[ACGT]{1,40}") {
        let genome = Genome::new(descriptor(0.0));
        let score = genome.terminal_score(&a, &b);
        prop_assert!((0.0..=MATCH_SCORE).contains(&score));
        prop_assert!((genome.terminal_score(&a, &a) - MATCH_SCORE).abs() < 1e-9);
    }

    /// Decoded parameters stay in `[0, 1]` for any decay.
    #[test]
    fn prop_decode_in_unit_interval(raw in "[ACGT]{1,30}", alpha in 0.0f64..=1.0) {
        let desc = RawDescriptor::new("ACGT", ["ACGA"], "TGC", "TGA")
            .with_come_alpha(alpha)
            .validate()
            .unwrap();
        let value = desc.decode(&raw).unwrap();
        prop_assert!((0.0..=1.0 + 1e-12).contains(&value));
    }
}
