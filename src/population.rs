//! Populations of agents and the evolutionary loop.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Evolution Loop              │
//! ├─────────────────────────────────────┤
//! │   mate   │   mutate   │  evaluate   │
//! ├─────────────────────────────────────┤
//! │  Selection (uniform, roulette)      │
//! ├─────────────────────────────────────┤
//! │  Agents: Genome + fitness + id      │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use age::{Agent, Population, RawDescriptor};
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//! use std::sync::Arc;
//!
//! let desc = RawDescriptor::new("ACGT", ["ACAA"], "TT", "GG").validate().unwrap();
//! let mut rng = SmallRng::seed_from_u64(7);
//! let mut population = Population::new(Arc::new(desc));
//! for _ in 0..10 {
//!     population.add_random(1..3, 10..50, &mut rng);
//! }
//!
//! let mut fitness = |_: &Population, agents: &[&Agent]| -> Vec<f64> {
//!     agents.iter().map(|a| a.genome().devices().len() as f64).collect()
//! };
//! population.mate(&mut rng).unwrap();
//! population.mutate(&mut rng);
//! population.evaluate(5, &mut fitness, &mut rng).unwrap();
//! assert_eq!(population.generation(), 1);
//! ```

// Population uses intentional casts for the elite size
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

mod agent;
mod evolution;
mod selection;

pub use agent::{Agent, AgentId, INITIAL_CHROMOSOMES, INITIAL_LENGTH};
pub use evolution::{
    EvolutionConfig, EvolutionStats, GenerationStats, evolve, seed_population,
};
pub use selection::{FitnessStats, Selection, roulette_wheel, uniform};

use crate::descriptor::Descriptor;
use crate::error::{EvaluationError, GenomeError, SelectionError};
use crate::genome::Genome;
use rand::Rng;
use std::ops::Range;
use std::sync::Arc;

/// Maximum number of elite agents carried into the next generation.
pub const MAX_ELITE: usize = 2;

/// Fitness evaluation supplied by the caller.
///
/// Receives the population and the agents being evaluated (already parsed);
/// returns one fitness per agent, assigned positionally. Returning fewer
/// values leaves the remaining agents' fitness unchanged.
pub trait Fitness {
    /// Evaluate `agents`.
    fn evaluate(&mut self, population: &Population, agents: &[&Agent]) -> Vec<f64>;
}

impl<F> Fitness for F
where
    F: FnMut(&Population, &[&Agent]) -> Vec<f64>,
{
    fn evaluate(&mut self, population: &Population, agents: &[&Agent]) -> Vec<f64> {
        self(population, agents)
    }
}

/// A set of agents sharing one descriptor.
#[derive(Debug, Clone)]
pub struct Population {
    desc: Arc<Descriptor>,
    generation: u64,
    agents: Vec<Agent>,
    next_id: u64,
}

impl Population {
    /// Create an empty population at generation 0.
    #[must_use]
    pub fn new(desc: Arc<Descriptor>) -> Self {
        Self {
            desc,
            generation: 0,
            agents: Vec::new(),
            next_id: 0,
        }
    }

    /// Rebuild a stored population.
    ///
    /// # Errors
    ///
    /// Returns [`GenomeError::DescriptorMismatch`] if an agent's genome uses
    /// another descriptor.
    pub fn restore(
        desc: Arc<Descriptor>,
        generation: u64,
        agents: Vec<Agent>,
    ) -> Result<Self, GenomeError> {
        let mut population = Self::new(desc);
        population.generation = generation;
        for agent in agents {
            population.add(agent)?;
        }
        Ok(population)
    }

    /// The shared descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<Descriptor> {
        &self.desc
    }

    /// Number of completed matings.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All agents.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Look up an agent by identity.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    /// Number of agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the population has no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Reserve a fresh agent identity.
    ///
    /// The counter saturates at `u64::MAX`.
    pub fn next_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Add an agent.
    ///
    /// # Errors
    ///
    /// Returns [`GenomeError::DescriptorMismatch`] if its genome uses another
    /// descriptor.
    pub fn add(&mut self, agent: Agent) -> Result<(), GenomeError> {
        let desc = agent.genome().descriptor();
        if !Arc::ptr_eq(desc, &self.desc) && **desc != *self.desc {
            return Err(GenomeError::DescriptorMismatch);
        }
        self.next_id = self.next_id.max(agent.id().0.saturating_add(1));
        self.agents.push(agent);
        Ok(())
    }

    /// Add an agent with a random genome and return its identity.
    pub fn add_random<R: Rng>(
        &mut self,
        count: Range<usize>,
        length: Range<usize>,
        rng: &mut R,
    ) -> AgentId {
        let id = self.next_id();
        let genome = Genome::random(Arc::clone(&self.desc), count, length, rng);
        self.agents.push(Agent::new(id, genome));
        id
    }

    /// Remove an agent by identity.
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let index = self.agents.iter().position(|a| a.id() == id)?;
        Some(self.agents.remove(index))
    }

    /// Pick `n` distinct agents, returning their indices into [`Self::agents`].
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NotEnoughCandidates`] if `n` exceeds the
    /// population size.
    pub fn pick<R: Rng>(
        &self,
        n: usize,
        selection: Selection,
        rng: &mut R,
    ) -> Result<Vec<usize>, SelectionError> {
        match selection {
            Selection::Uniform => uniform(self.agents.len(), n, rng),
            Selection::RouletteWheel => roulette_wheel(&self.fitness_values(), n, rng),
        }
    }

    /// Replace the agents with a new generation of the same size.
    ///
    /// Up to [`MAX_ELITE`] agents (`ceil(elitism × size)`, at most two) are
    /// kept by roulette wheel; the rest are offspring of roulette-wheel parent
    /// pairs, one child per pair. Increments the generation counter.
    ///
    /// # Errors
    ///
    /// Returns an error if parents cannot be picked, i.e. the population has
    /// one agent and elitism keeps none. Agents are unchanged in that case.
    pub fn mate<R: Rng>(&mut self, rng: &mut R) -> Result<(), SelectionError> {
        let size = self.agents.len();
        let elite_count = ((self.desc.elitism() * size as f64).ceil() as usize).min(MAX_ELITE);
        let fitness = self.fitness_values();

        let elite = roulette_wheel(&fitness, elite_count, rng)?;
        let mut next: Vec<Agent> = elite.iter().map(|&i| self.agents[i].clone()).collect();

        while next.len() < size {
            let parents = roulette_wheel(&fitness, 2, rng)?;
            let child = Genome::recombine(
                self.agents[parents[0]].genome(),
                self.agents[parents[1]].genome(),
                rng,
            );
            let id = self.next_id();
            next.push(Agent::new(id, child));
        }

        log::debug!(
            "generation {}: kept {} elite, bred {} offspring",
            self.generation + 1,
            elite.len(),
            next.len() - elite.len()
        );
        self.agents = next;
        self.generation += 1;
        Ok(())
    }

    /// Mutate every agent's genome.
    pub fn mutate<R: Rng>(&mut self, rng: &mut R) {
        for agent in &mut self.agents {
            agent.genome_mut().mutate(rng);
        }
    }

    /// Evaluate `n` uniformly picked agents.
    ///
    /// Their genomes are parsed, `fitness` is called once with all of them and
    /// the returned values are assigned positionally. Returns the identities
    /// of the evaluated agents.
    ///
    /// # Errors
    ///
    /// Returns an error if `n` exceeds the population size or the callback
    /// returns more values than agents.
    pub fn evaluate<F: Fitness, R: Rng>(
        &mut self,
        n: usize,
        fitness: &mut F,
        rng: &mut R,
    ) -> Result<Vec<AgentId>, EvaluationError> {
        let picked = uniform(self.agents.len(), n, rng)?;
        for &i in &picked {
            self.agents[i].genome_mut().parse();
        }

        let values = {
            let agents: Vec<&Agent> = picked.iter().map(|&i| &self.agents[i]).collect();
            fitness.evaluate(self, &agents)
        };
        if values.len() > picked.len() {
            return Err(EvaluationError::FitnessCount {
                returned: values.len(),
                agents: picked.len(),
            });
        }

        for (&i, value) in picked.iter().zip(values) {
            self.agents[i].set_fitness(value);
        }
        Ok(picked.iter().map(|&i| self.agents[i].id()).collect())
    }

    /// The agent with the highest fitness.
    #[must_use]
    pub fn get_best(&self) -> Option<&Agent> {
        self.agents
            .iter()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
    }

    fn fitness_values(&self) -> Vec<f64> {
        self.agents.iter().map(Agent::fitness).collect()
    }
}
