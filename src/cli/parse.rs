//! CLI command for parsing chromosomes from a file.

#![allow(clippy::needless_pass_by_value)]

use crate::cli::output::{JsonGenome, format_genome};
use crate::cli::{CliError, OutputFormat, load_descriptor};
use age::Genome;
use std::fs;
use std::path::PathBuf;

/// Execute the parse command.
pub(crate) fn execute(
    descriptor: Option<PathBuf>,
    file: PathBuf,
    format: OutputFormat,
) -> Result<(), CliError> {
    let desc = load_descriptor(descriptor.as_deref())?;
    let text = fs::read_to_string(&file)
        .map_err(|e| CliError::new(format!("{}: {e}", file.display())))?;

    let chromosomes = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned);
    let mut genome = Genome::with_chromosomes(desc, chromosomes)?;
    genome.parse();

    let name = file.display().to_string();
    match format {
        OutputFormat::Text => print!("{}", format_genome(&name, &genome)),
        OutputFormat::Json => {
            let json = JsonGenome::new(&name, &genome);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}
