// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! AGE: Analog Genetic Encoding.
//!
//! Genomes are strings over a finite alphabet. Devices are located in them by
//! marker substrings, terminals are compared by local alignment and
//! parameters are decoded from their token strings. On top of that sits a
//! steady-state evolutionary loop.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Population (mate/mutate/evaluate) │
//! ├─────────────────────────────────────┤
//! │   Genome (parse, mutate, crossover) │
//! ├─────────────────────────────────────┤
//! │   Descriptor (alphabet, markers)    │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use age::{Genome, RawDescriptor};
//! use std::sync::Arc;
//!
//! let desc = Arc::new(RawDescriptor::new("ACGT", ["ACGA"], "TGC", "TGA").validate().unwrap());
//! let mut genome = Genome::with_chromosomes(desc, ["AAACGAGGTGCCCTGACC".to_owned()]).unwrap();
//! genome.parse();
//! assert_eq!(genome.devices()[0].terminal(0), Some("GG"));
//! ```

pub mod descriptor;
pub mod error;
pub mod genome;
pub mod persistence;
pub mod population;

pub use descriptor::{Descriptor, Mutation, RawDescriptor};
pub use error::{
    DescriptorError, EvaluationError, EvolutionError, GenomeError, PersistenceError,
    SelectionError, Violation,
};
pub use genome::{Device, Genome, Parameter};
pub use population::{Agent, AgentId, Fitness, Population, Selection};
