//! Generation loop: mate, mutate, evaluate, repeat.
//!
//! The loop stops after a fixed number of generations or once the best agent
//! reaches a target fitness. Populations are only modified inside
//! [`Population::mate`], [`Population::mutate`] and [`Population::evaluate`],
//! so the loop can be abandoned between generations at any time.

// Evolution uses intentional casts for statistics
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use crate::descriptor::Descriptor;
use crate::error::EvolutionError;
use crate::persistence::{checkpoint_path, save_population};
use crate::population::agent::{INITIAL_CHROMOSOMES, INITIAL_LENGTH};
use crate::population::selection::FitnessStats;
use crate::population::{Fitness, Population};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Configuration for an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Number of agents.
    pub population_size: usize,
    /// Generations to run; `0` runs until `target_fitness` is reached.
    pub generations: u64,
    /// Agents evaluated per generation (capped at the population size).
    pub evaluations: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
    /// Chromosome count of the initial random genomes.
    pub initial_chromosomes: Range<usize>,
    /// Chromosome length of the initial random genomes.
    pub initial_length: Range<usize>,
    /// Stop once the best agent reaches this fitness.
    pub target_fitness: Option<f64>,
    /// Directory for population checkpoints; none are written when unset.
    pub output_dir: Option<PathBuf>,
    /// Write a checkpoint every N generations (`0` disables periodic ones).
    pub checkpoint_interval: u64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 1000,
            evaluations: 100,
            seed: 42,
            initial_chromosomes: INITIAL_CHROMOSOMES,
            initial_length: INITIAL_LENGTH,
            target_fitness: None,
            output_dir: None,
            checkpoint_interval: 100,
        }
    }
}

/// Statistics for a single generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationStats {
    /// Generation number after mating.
    pub generation: u64,
    /// Best fitness in the population.
    pub best_fitness: f64,
    /// Mean fitness.
    pub mean_fitness: f64,
    /// Fitness standard deviation.
    pub fitness_std: f64,
}

/// Overall statistics from an evolution run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionStats {
    /// Statistics per generation.
    pub generations: Vec<GenerationStats>,
    /// Best fitness achieved.
    pub best_fitness: f64,
    /// Generation where best fitness was achieved.
    pub best_generation: u64,
    /// Total time in seconds.
    pub elapsed_seconds: f64,
}

/// Create a population of random agents as described by `config`.
#[must_use]
pub fn seed_population<R: Rng>(desc: Arc<Descriptor>, config: &EvolutionConfig, rng: &mut R) -> Population {
    let mut population = Population::new(desc);
    for _ in 0..config.population_size {
        population.add_random(
            config.initial_chromosomes.clone(),
            config.initial_length.clone(),
            rng,
        );
    }
    population
}

/// Evolve `population` until the generation limit or the target fitness.
///
/// `on_generation` is called after every generation, e.g. to drive a
/// progress display.
///
/// # Errors
///
/// Returns an error if selection or evaluation fails, or if a checkpoint
/// cannot be written.
pub fn evolve<F, R, O>(
    population: &mut Population,
    config: &EvolutionConfig,
    fitness: &mut F,
    rng: &mut R,
    mut on_generation: O,
) -> Result<EvolutionStats, EvolutionError>
where
    F: Fitness,
    R: Rng,
    O: FnMut(&GenerationStats),
{
    let start_time = Instant::now();
    let mut stats = Vec::new();
    let mut best_fitness = f64::NEG_INFINITY;
    let mut best_generation = population.generation();
    let mut ran = 0u64;

    log::info!(
        "evolving {} agents from generation {}",
        population.len(),
        population.generation()
    );

    loop {
        if config.generations > 0 && ran >= config.generations {
            break;
        }
        if config.generations == 0 && config.target_fitness.is_none() {
            log::warn!("no generation limit and no target fitness; stopping");
            break;
        }

        population.mate(rng)?;
        population.mutate(rng);
        let n = config.evaluations.min(population.len());
        population.evaluate(n, fitness, rng)?;
        ran += 1;

        let fitness_values: Vec<f64> = population.agents().iter().map(|a| a.fitness()).collect();
        let summary = FitnessStats::from_fitness(&fitness_values);
        let generation = GenerationStats {
            generation: population.generation(),
            best_fitness: summary.best_fitness,
            mean_fitness: summary.mean_fitness,
            fitness_std: summary.fitness_std,
        };
        if generation.best_fitness > best_fitness {
            best_fitness = generation.best_fitness;
            best_generation = generation.generation;
        }
        log::debug!(
            "gen {:>5}: best={:.4} mean={:.4} std={:.4}",
            generation.generation,
            generation.best_fitness,
            generation.mean_fitness,
            generation.fitness_std
        );
        on_generation(&generation);
        stats.push(generation);

        let checkpoint_due =
            config.checkpoint_interval > 0 && ran.is_multiple_of(config.checkpoint_interval);
        if let Some(dir) = config.output_dir.as_ref().filter(|_| checkpoint_due) {
            save_population(population, &checkpoint_path(dir, population.generation()))?;
        }

        if config
            .target_fitness
            .is_some_and(|target| generation.best_fitness >= target)
        {
            log::info!("target fitness reached at generation {}", generation.generation);
            break;
        }
    }

    if let Some(dir) = &config.output_dir {
        save_population(population, &checkpoint_path(dir, population.generation()))?;
    }

    Ok(EvolutionStats {
        generations: stats,
        best_fitness: if best_fitness.is_finite() { best_fitness } else { 0.0 },
        best_generation,
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
    })
}
