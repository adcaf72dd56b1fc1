//! CLI command for inspecting random genomes and their crossover.

#![allow(clippy::needless_pass_by_value)]

use crate::cli::output::{JsonGenome, format_genome};
use crate::cli::{CliError, OutputFormat, load_descriptor};
use age::Genome;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::path::PathBuf;
use std::sync::Arc;

/// Execute the inspect command.
pub(crate) fn execute(
    descriptor: Option<PathBuf>,
    seed: Option<u64>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let desc = load_descriptor(descriptor.as_deref())?;
    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let mut parents = Vec::with_capacity(2);
    for _ in 0..2 {
        let mut genome = Genome::random(Arc::clone(&desc), 10..20, 20..200, &mut rng);
        genome.parse();
        parents.push(genome);
    }
    let mut child = Genome::crossover(&parents[0], &parents[1], &mut rng)?;
    child.parse();

    let named = [
        ("Parent #1", &parents[0]),
        ("Parent #2", &parents[1]),
        ("Child", &child),
    ];
    match format {
        OutputFormat::Text => {
            for (name, genome) in named {
                println!("{}", format_genome(name, genome));
            }
        }
        OutputFormat::Json => {
            let json: Vec<_> = named
                .into_iter()
                .map(|(name, genome)| JsonGenome::new(name, genome))
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}
