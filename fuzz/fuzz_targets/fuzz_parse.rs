#![no_main]

use age::{Genome, RawDescriptor};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

const ALPHABET: [char; 4] = ['A', 'C', 'G', 'T'];

/// Structured input for tokenizer fuzzing.
#[derive(Arbitrary, Debug)]
struct ParseInput {
    /// Device markers (mapped onto the alphabet).
    devices: Vec<Vec<u8>>,
    /// Terminal marker.
    terminal: Vec<u8>,
    /// Parameter marker.
    parameter: Vec<u8>,
    /// Chromosomes to parse.
    chromosomes: Vec<Vec<u8>>,
    /// Decay for parameter decoding, scaled to [0, 1].
    come_alpha: u8,
}

fn symbols(bytes: &[u8], max: usize) -> String {
    bytes
        .iter()
        .take(max)
        .map(|&b| ALPHABET[usize::from(b) % ALPHABET.len()])
        .collect()
}

fuzz_target!(|input: ParseInput| {
    let devices: Vec<String> = input.devices.iter().take(8).map(|d| symbols(d, 6)).collect();
    let raw = RawDescriptor::new(
        "ACGT",
        devices,
        &symbols(&input.terminal, 4),
        &symbols(&input.parameter, 4),
    )
    .with_come_alpha(f64::from(input.come_alpha) / 255.0);

    // Invalid descriptors must be reported, never accepted.
    let check = raw.check();
    let desc = match raw.validate() {
        Ok(desc) => Arc::new(desc),
        Err(e) => {
            assert!(!check);
            assert!(!e.violations.is_empty());
            return;
        }
    };
    assert!(check);

    let chromosomes = input
        .chromosomes
        .iter()
        .take(4)
        .map(|c| symbols(c, 512))
        .filter(|c| !c.is_empty());
    let Ok(mut genome) = Genome::with_chromosomes(desc, chromosomes) else {
        return;
    };
    genome.parse();

    for device in genome.devices() {
        assert!(device.terminals().iter().all(|t| !t.is_empty()));
        for parameter in device.parameters() {
            assert!(!parameter.raw.is_empty());
            assert!((0.0..=1.0 + 1e-9).contains(&parameter.value));
        }
    }
});
