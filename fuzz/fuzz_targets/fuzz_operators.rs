#![no_main]

use age::{Genome, Mutation, RawDescriptor};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::Arc;

const ALPHABET: [char; 4] = ['A', 'C', 'G', 'T'];

/// Structured input for mutation and crossover fuzzing.
#[derive(Arbitrary, Debug)]
struct OperatorInput {
    /// Per-operator probabilities, scaled to [0, 0.5].
    possibilities: [u8; 10],
    /// Chromosomes of the first parent.
    a: Vec<Vec<u8>>,
    /// Chromosomes of the second parent.
    b: Vec<Vec<u8>>,
    /// RNG seed.
    seed: u64,
}

fn chromosomes(raw: &[Vec<u8>]) -> impl Iterator<Item = String> + '_ {
    raw.iter()
        .take(4)
        .map(|c| {
            c.iter()
                .take(256)
                .map(|&b| ALPHABET[usize::from(b) % ALPHABET.len()])
                .collect::<String>()
        })
        .filter(|c| !c.is_empty())
}

fuzz_target!(|input: OperatorInput| {
    let raw = Mutation::ALL
        .into_iter()
        .zip(input.possibilities)
        .fold(RawDescriptor::new("ACGT", ["ACGA"], "TGC", "TGA"), |raw, (m, p)| {
            raw.with_possibility(m.name(), f64::from(p) / 255.0 * 0.5)
        });
    let Ok(desc) = raw.validate() else {
        return;
    };
    let desc = Arc::new(desc);
    let mut rng = SmallRng::seed_from_u64(input.seed);

    let (Ok(mut a), Ok(b)) = (
        Genome::with_chromosomes(Arc::clone(&desc), chromosomes(&input.a)),
        Genome::with_chromosomes(Arc::clone(&desc), chromosomes(&input.b)),
    ) else {
        return;
    };

    if let Ok(child) = Genome::crossover(&a, &b, &mut rng) {
        assert!(child.symbol_count() <= a.symbol_count() + b.symbol_count());
    }

    a.mutate(&mut rng);
    for c in a.chromosomes() {
        assert!(desc.is_token(c));
    }
});
