//! Genomes: ordered chromosome strings and the devices parsed from them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Genome (chromosomes, devices)     │
//! ├──────────┬──────────┬───────────────┤
//! │ Mutation │ Crossover│ Alignment     │
//! ├──────────┴──────────┴───────────────┤
//! │   Tokenizer → Device → CoME decode  │
//! └─────────────────────────────────────┘
//! ```
//!
//! The device list is derived data: it is rebuilt by [`Genome::parse`] and is
//! stale after any mutation or crossover until the next parse.

mod alignment;
mod crossover;
mod decode;
mod device;
mod mutation;
mod parser;

pub use device::{Device, Parameter};

pub(crate) use decode::decode_parameter;
pub(crate) use parser::Tokenizer;

use crate::descriptor::Descriptor;
use crate::error::GenomeError;
use rand::Rng;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Score of an exact symbol match under the default alignment scheme.
pub const MATCH_SCORE: f64 = alignment::MATCH_SCORE;

/// Score of a mismatch or gap under the default alignment scheme.
pub const MISMATCH_SCORE: f64 = alignment::MISMATCH_SCORE;

/// An artificial genome.
#[derive(Debug, Clone)]
pub struct Genome {
    desc: Arc<Descriptor>,
    chromosomes: Vec<String>,
    devices: Vec<Device>,
}

impl Genome {
    /// Create an empty genome.
    #[must_use]
    pub fn new(desc: Arc<Descriptor>) -> Self {
        Self {
            desc,
            chromosomes: Vec::new(),
            devices: Vec::new(),
        }
    }

    /// Create a genome from explicit chromosomes.
    ///
    /// # Errors
    ///
    /// Returns [`GenomeError::InvalidToken`] for the first chromosome that is
    /// empty or uses symbols outside the alphabet.
    pub fn with_chromosomes(
        desc: Arc<Descriptor>,
        chromosomes: impl IntoIterator<Item = String>,
    ) -> Result<Self, GenomeError> {
        let mut genome = Self::new(desc);
        for chromosome in chromosomes {
            genome.add_chromosome(chromosome)?;
        }
        Ok(genome)
    }

    /// Create a genome of random chromosomes; see [`Genome::add_random`].
    #[must_use]
    pub fn random<R: Rng>(
        desc: Arc<Descriptor>,
        count: Range<usize>,
        length: Range<usize>,
        rng: &mut R,
    ) -> Self {
        let mut genome = Self::new(desc);
        genome.add_random(count, length, rng);
        genome
    }

    /// Append random chromosomes.
    ///
    /// The number of chromosomes is drawn from `count` and each length from
    /// `length`; an empty range such as `3..3` means exactly its start.
    /// Chromosomes that would be empty are not added.
    pub fn add_random<R: Rng>(&mut self, count: Range<usize>, length: Range<usize>, rng: &mut R) {
        let count = sample(count, rng);
        for _ in 0..count {
            let n = sample(length.clone(), rng);
            let symbols = self.desc.symbols();
            let chromosome: String = (0..n)
                .map(|_| symbols[rng.gen_range(0..symbols.len())])
                .collect();
            if !chromosome.is_empty() {
                self.chromosomes.push(chromosome);
            }
        }
    }

    /// Append one chromosome.
    ///
    /// # Errors
    ///
    /// Returns [`GenomeError::InvalidToken`] if it is empty or uses symbols
    /// outside the alphabet.
    pub fn add_chromosome(&mut self, chromosome: String) -> Result<(), GenomeError> {
        if !self.desc.is_token(&chromosome) {
            return Err(GenomeError::InvalidToken(chromosome));
        }
        self.chromosomes.push(chromosome);
        Ok(())
    }

    /// Remove and return the chromosome at `index`.
    pub fn remove_chromosome(&mut self, index: usize) -> Option<String> {
        (index < self.chromosomes.len()).then(|| self.chromosomes.remove(index))
    }

    /// The chromosome at `index`.
    #[must_use]
    pub fn chromosome(&self, index: usize) -> Option<&str> {
        self.chromosomes.get(index).map(String::as_str)
    }

    /// All chromosomes in order.
    #[must_use]
    pub fn chromosomes(&self) -> &[String] {
        &self.chromosomes
    }

    /// Number of chromosomes.
    #[must_use]
    pub fn num_chromosomes(&self) -> usize {
        self.chromosomes.len()
    }

    /// Total number of symbols across all chromosomes.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.chromosomes.iter().map(|c| c.chars().count()).sum()
    }

    /// The descriptor this genome is built on.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<Descriptor> {
        &self.desc
    }

    /// Devices found by the last [`Genome::parse`].
    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Rebuild the device list from the chromosomes.
    pub fn parse(&mut self) {
        self.devices.clear();
        let tokenizer = self.desc.tokenizer();
        for chromosome in &self.chromosomes {
            tokenizer.parse_chromosome(&self.desc, chromosome, &mut self.devices);
        }
    }

    /// Best Smith-Waterman local alignment score of `a` against `b`.
    #[must_use]
    pub fn local_alignment_score(&self, a: &str, b: &str) -> f64 {
        alignment::local_alignment_score(&self.desc, a, b)
    }

    /// Length-normalized similarity of two terminal tags:
    /// `2 · local_alignment_score(a, b) / (|a| + |b|)`.
    ///
    /// Two empty tags score `0.0`.
    #[must_use]
    pub fn terminal_score(&self, a: &str, b: &str) -> f64 {
        alignment::terminal_score(&self.desc, a, b)
    }

    /// Apply the descriptor's mutation operators in place.
    ///
    /// The device list is not refreshed.
    pub fn mutate<R: Rng>(&mut self, rng: &mut R) {
        mutation::mutate(&self.desc, &mut self.chromosomes, rng);
    }

    /// Cross two genomes over into a new genome sharing their descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`GenomeError::DescriptorMismatch`] if the parents do not share
    /// a descriptor.
    pub fn crossover<R: Rng>(a: &Self, b: &Self, rng: &mut R) -> Result<Self, GenomeError> {
        let chromosomes = Self::crossover_chromosomes(a, b, rng)?;
        Ok(Self {
            desc: Arc::clone(&a.desc),
            chromosomes,
            devices: Vec::new(),
        })
    }

    /// Cross two genomes over, returning only the child's chromosomes.
    ///
    /// # Errors
    ///
    /// Returns [`GenomeError::DescriptorMismatch`] if the parents do not share
    /// a descriptor.
    pub fn crossover_chromosomes<R: Rng>(
        a: &Self,
        b: &Self,
        rng: &mut R,
    ) -> Result<Vec<String>, GenomeError> {
        if !Arc::ptr_eq(&a.desc, &b.desc) && a.desc != b.desc {
            return Err(GenomeError::DescriptorMismatch);
        }
        Ok(crossover::crossover_chromosomes(&a.chromosomes, &b.chromosomes, rng))
    }

    /// Crossover for parents already known to share a descriptor.
    pub(crate) fn recombine<R: Rng>(a: &Self, b: &Self, rng: &mut R) -> Self {
        Self {
            desc: Arc::clone(&a.desc),
            chromosomes: crossover::crossover_chromosomes(&a.chromosomes, &b.chromosomes, rng),
            devices: Vec::new(),
        }
    }
}

impl PartialEq for Genome {
    fn eq(&self, other: &Self) -> bool {
        self.chromosomes == other.chromosomes
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.chromosomes)
    }
}

fn sample<R: Rng>(range: Range<usize>, rng: &mut R) -> usize {
    if range.is_empty() {
        range.start
    } else {
        rng.gen_range(range)
    }
}
