//! Error types for descriptors, genomes, selection and persistence.

use std::fmt;
use thiserror::Error;

/// A single constraint a raw descriptor failed to satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The alphabet is empty.
    EmptyAlphabet,
    /// The alphabet lists a symbol more than once.
    DuplicateSymbol(char),
    /// No device markers were given.
    NoDevices,
    /// A device marker appears twice in the device list.
    DuplicateDevice(String),
    /// A marker is empty or contains symbols outside the alphabet.
    InvalidMarker {
        /// Which marker (`device`, `terminal` or `parameter`).
        role: &'static str,
        /// The offending marker text.
        marker: String,
    },
    /// Terminal and parameter markers are identical.
    AmbiguousMarkers,
    /// A mutation probability could not be read as a real number.
    NonNumericPossibility(String),
    /// A mutation probability lies outside `[0, 1)`, or outside `[0, 1]` for
    /// chromosome deletion.
    PossibilityOutOfRange(String),
    /// The scoring matrix does not have one row and column per symbol.
    ScoringShape {
        /// Expected side length (alphabet size).
        expected: usize,
    },
    /// The scoring matrix contains a non-finite entry.
    ScoringNotFinite,
    /// The gap penalty is not finite.
    GapNotFinite,
    /// `come_alpha` is not a real number.
    NonNumericComeAlpha,
    /// `come_alpha` lies outside `[0, 1]`.
    ComeAlphaOutOfRange,
    /// `elitism` is not a real number.
    NonNumericElitism,
    /// `elitism` lies outside `(0, 1]`.
    ElitismOutOfRange,
    /// The marker alternation could not be compiled.
    MarkerPattern(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAlphabet => write!(f, "alphabet is empty"),
            Self::DuplicateSymbol(c) => write!(f, "alphabet symbol {c:?} is repeated"),
            Self::NoDevices => write!(f, "no device markers given"),
            Self::DuplicateDevice(d) => write!(f, "device marker {d:?} is repeated"),
            Self::InvalidMarker { role, marker } => {
                write!(f, "{role} marker {marker:?} is empty or not over the alphabet")
            }
            Self::AmbiguousMarkers => write!(f, "terminal and parameter markers are identical"),
            Self::NonNumericPossibility(name) => {
                write!(f, "possibility {name:?} is not a real number")
            }
            Self::PossibilityOutOfRange(name) => {
                write!(f, "possibility {name:?} is out of range")
            }
            Self::ScoringShape { expected } => {
                write!(f, "scoring matrix must be {expected}x{expected}")
            }
            Self::ScoringNotFinite => write!(f, "scoring matrix entries must be finite"),
            Self::GapNotFinite => write!(f, "gap penalty must be finite"),
            Self::NonNumericComeAlpha => write!(f, "come_alpha is not a real number"),
            Self::ComeAlphaOutOfRange => write!(f, "come_alpha must lie in [0, 1]"),
            Self::NonNumericElitism => write!(f, "elitism is not a real number"),
            Self::ElitismOutOfRange => write!(f, "elitism must lie in (0, 1]"),
            Self::MarkerPattern(e) => write!(f, "marker pattern: {e}"),
        }
    }
}

/// Descriptor validation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid descriptor: {}", join(.violations))]
pub struct DescriptorError {
    /// Every constraint the descriptor violated, in check order.
    pub violations: Vec<Violation>,
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by genome construction and recombination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenomeError {
    /// A chromosome is empty or contains symbols outside the alphabet.
    #[error("chromosome {0:?} is empty or not over the alphabet")]
    InvalidToken(String),
    /// Two genomes built on different descriptors were recombined.
    #[error("genomes do not share a descriptor")]
    DescriptorMismatch,
}

/// A selection asked for more distinct candidates than exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Fewer candidates than requested.
    #[error("cannot pick {requested} distinct agents from {available}")]
    NotEnoughCandidates {
        /// Number of agents requested.
        requested: usize,
        /// Number of agents available.
        available: usize,
    },
}

/// Errors raised while evaluating agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// Picking the agents to evaluate failed.
    #[error(transparent)]
    Selection(#[from] SelectionError),
    /// The fitness callback returned more values than agents it was given.
    #[error("fitness callback returned {returned} values for {agents} agents")]
    FitnessCount {
        /// Number of values returned.
        returned: usize,
        /// Number of agents evaluated.
        agents: usize,
    },
}

/// Errors raised by the evolution driver.
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Mating could not pick elite or parents.
    #[error(transparent)]
    Selection(#[from] SelectionError),
    /// Evaluating agents failed.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    /// Writing a checkpoint failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Errors raised while reading or writing agents and archives.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The archive info record could not be (de)serialized.
    #[error("info record error: {0}")]
    Json(#[from] serde_json::Error),
    /// An agent record is malformed.
    #[error("malformed agent record: {0}")]
    Malformed(String),
    /// An agent record holds an invalid chromosome.
    #[error(transparent)]
    Genome(#[from] GenomeError),
}
