//! CLI command for evolution with the built-in wiring fitness.

#![allow(clippy::needless_pass_by_value, clippy::cast_precision_loss)]

use crate::cli::{CliError, OutputFormat, load_descriptor};
use age::genome::MATCH_SCORE;
use age::persistence::load_population;
use age::population::{EvolutionConfig, EvolutionStats, evolve, seed_population};
use age::{Agent, Population};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Number of devices a genome needs for full wiring credit.
const WIRING_DEVICES: usize = 4;

/// Command-line values overriding the evolution config.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    /// Config JSON file.
    pub(crate) config: Option<PathBuf>,
    /// Population size.
    pub(crate) population: Option<usize>,
    /// Generation limit.
    pub(crate) generations: Option<u64>,
    /// Evaluations per generation.
    pub(crate) evaluations: Option<usize>,
    /// RNG seed.
    pub(crate) seed: Option<u64>,
    /// Target fitness.
    pub(crate) target: Option<f64>,
    /// Checkpoint directory.
    pub(crate) output: Option<PathBuf>,
}

impl Overrides {
    fn into_config(self) -> Result<EvolutionConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => EvolutionConfig::default(),
        };
        if let Some(population) = self.population {
            config.population_size = population;
        }
        if let Some(generations) = self.generations {
            config.generations = generations;
        }
        if let Some(evaluations) = self.evaluations {
            config.evaluations = evaluations;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.target.is_some() {
            config.target_fitness = self.target;
        }
        if self.output.is_some() {
            config.output_dir = self.output;
        }
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct JsonSummary<'a> {
    generation: u64,
    best_fitness: f64,
    best_generation: u64,
    elapsed_seconds: f64,
    best_chromosomes: &'a [String],
}

/// Execute the evolve command.
pub(crate) fn execute(
    descriptor: Option<PathBuf>,
    overrides: Overrides,
    resume: Option<PathBuf>,
    progress: bool,
    format: OutputFormat,
) -> Result<(), CliError> {
    let config = overrides.into_config()?;
    let mut rng = SmallRng::seed_from_u64(config.seed);

    let mut population = match &resume {
        Some(dir) => {
            log::info!("resuming evolution from {}", dir.display());
            load_population(dir)?
        }
        None => seed_population(load_descriptor(descriptor.as_deref())?, &config, &mut rng),
    };
    if population.is_empty() {
        return Err(CliError::new("population is empty"));
    }

    if format == OutputFormat::Text {
        println!("Starting evolution:");
        println!("  Population: {}", population.len());
        if config.generations == 0 {
            println!("  Generations: until target fitness");
        } else {
            println!("  Generations: {}", config.generations);
        }
        println!("  Evaluations: {}", config.evaluations);
        println!("  Seed: {}", config.seed);
        println!();
    }

    let pb = if progress {
        let pb = ProgressBar::new(config.generations);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} generations {msg}")?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let stats = evolve(&mut population, &config, &mut wiring, &mut rng, |generation| {
        if let Some(pb) = &pb {
            pb.set_message(format!("best={:.4}", generation.best_fitness));
            pb.inc(1);
        }
    })?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    print_results(&population, &config, &stats, format)
}

fn print_results(
    population: &Population,
    config: &EvolutionConfig,
    stats: &EvolutionStats,
    format: OutputFormat,
) -> Result<(), CliError> {
    let best = population
        .get_best()
        .ok_or_else(|| CliError::new("population is empty"))?;

    match format {
        OutputFormat::Text => {
            println!("Evolution complete!");
            println!("  Generation: {}", population.generation());
            println!("  Best fitness: {:.4}", stats.best_fitness);
            println!("  Best generation: {}", stats.best_generation);
            println!("  Elapsed time: {:.1}s", stats.elapsed_seconds);
            println!();
            println!("Best agent ({}, fitness {:.4}):", best.id(), best.fitness());
            for (i, chromosome) in best.genome().chromosomes().iter().enumerate() {
                println!("  #{i}: {chromosome}");
            }
            if let Some(dir) = &config.output_dir {
                println!();
                println!("Checkpoints: {}/gen_*", dir.display());
            }
        }
        OutputFormat::Json => {
            let summary = JsonSummary {
                generation: population.generation(),
                best_fitness: stats.best_fitness,
                best_generation: stats.best_generation,
                elapsed_seconds: stats.elapsed_seconds,
                best_chromosomes: best.genome().chromosomes(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

/// Rewards genomes whose devices can be wired into a network.
///
/// Each device's first terminal is scored against every other device's second
/// terminal; the mean normalized score is scaled by how close the genome is
/// to [`WIRING_DEVICES`] devices. Result lies in `[0, 1]`.
fn wiring(_: &Population, agents: &[&Agent]) -> Vec<f64> {
    agents.iter().map(|agent| wiring_score(agent)).collect()
}

fn wiring_score(agent: &Agent) -> f64 {
    let genome = agent.genome();
    let devices = genome.devices();
    if devices.len() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, from) in devices.iter().enumerate() {
        for (j, to) in devices.iter().enumerate() {
            if i == j {
                continue;
            }
            if let (Some(output), Some(input)) = (from.terminal(0), to.terminal(1)) {
                total += (genome.terminal_score(output, input) / MATCH_SCORE).clamp(0.0, 1.0);
            }
            pairs += 1;
        }
    }

    let coverage = devices.len().min(WIRING_DEVICES) as f64 / WIRING_DEVICES as f64;
    coverage * total / pairs as f64
}
