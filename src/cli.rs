//! CLI command implementations for AGE.

pub(crate) mod evolve;
pub(crate) mod inspect;
pub(crate) mod parse;

mod output;

use age::{
    Descriptor, DescriptorError, EvolutionError, GenomeError, PersistenceError, RawDescriptor,
};
use clap::ValueEnum;
use std::error::Error;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Output format for all commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<DescriptorError> for CliError {
    fn from(e: DescriptorError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<GenomeError> for CliError {
    fn from(e: GenomeError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<EvolutionError> for CliError {
    fn from(e: EvolutionError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<PersistenceError> for CliError {
    fn from(e: PersistenceError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<indicatif::style::TemplateError> for CliError {
    fn from(e: indicatif::style::TemplateError) -> Self {
        Self::new(e.to_string())
    }
}

/// Built-in descriptor: ACGT with three neuron-like device markers.
fn default_descriptor() -> Result<Descriptor, DescriptorError> {
    RawDescriptor::new("ACGT", ["ACAA", "ACAC", "ACAG"], "TT", "GG")
        .with_elitism(0.1)
        .with_possibility("char_delete", 0.009)
        .with_possibility("char_insert", 0.01)
        .with_possibility("char_replace", 0.01)
        .with_possibility("frag_delete", 0.01)
        .with_possibility("frag_move", 0.01)
        .with_possibility("frag_copy", 0.02)
        .with_possibility("device_insert", 0.05)
        .with_possibility("chromosome_delete", 0.000_29)
        .with_possibility("chromosome_copy", 0.000_3)
        .with_possibility("chromosome_crossover", 0.000_3)
        .validate()
}

/// Load the descriptor from `path`, or the built-in one.
pub(crate) fn load_descriptor(path: Option<&Path>) -> Result<Arc<Descriptor>, CliError> {
    let desc = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::new(format!("{}: {e}", path.display())))?;
            serde_json::from_str(&text)?
        }
        None => default_descriptor()?,
    };
    Ok(Arc::new(desc))
}
