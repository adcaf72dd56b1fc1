//! Agents: a genome with an identity and a fitness.

use crate::descriptor::Descriptor;
use crate::genome::Genome;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::ops::Range;
use std::str::FromStr;
use std::sync::Arc;

/// Chromosome count drawn for a fresh random agent.
pub const INITIAL_CHROMOSOMES: Range<usize> = 1..3;

/// Chromosome length drawn for a fresh random agent.
pub const INITIAL_LENGTH: Range<usize> = 10..200;

/// Identity of an agent within a population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AgentId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// The unit of selection.
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    genome: Genome,
    fitness: f64,
}

impl Agent {
    /// Create an agent with zero fitness.
    #[must_use]
    pub fn new(id: AgentId, genome: Genome) -> Self {
        Self::restore(id, genome, 0.0)
    }

    /// Create an agent with a random genome of [`INITIAL_CHROMOSOMES`]
    /// chromosomes of [`INITIAL_LENGTH`] symbols.
    #[must_use]
    pub fn random<R: Rng>(id: AgentId, desc: Arc<Descriptor>, rng: &mut R) -> Self {
        Self::new(id, Genome::random(desc, INITIAL_CHROMOSOMES, INITIAL_LENGTH, rng))
    }

    /// Rebuild a stored agent, fitness included.
    #[must_use]
    pub fn restore(id: AgentId, genome: Genome, fitness: f64) -> Self {
        Self {
            id,
            genome,
            fitness,
        }
    }

    /// The agent's identity.
    #[must_use]
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// The agent's genome.
    #[must_use]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Mutable access to the genome, e.g. to parse it.
    pub fn genome_mut(&mut self) -> &mut Genome {
        &mut self.genome
    }

    /// Fitness from the last evaluation.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}
