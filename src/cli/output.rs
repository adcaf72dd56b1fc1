//! Output formatting utilities for CLI.

use age::{Device, Genome};
use serde::Serialize;
use std::fmt::Write;

/// JSON-serializable genome.
#[derive(Debug, Serialize)]
pub(super) struct JsonGenome<'a> {
    /// Label shown in text output.
    pub(super) name: &'a str,
    /// Chromosomes in order.
    pub(super) chromosomes: &'a [String],
    /// Devices from the last parse.
    pub(super) devices: &'a [Device],
}

impl<'a> JsonGenome<'a> {
    /// Borrow a parsed genome.
    pub(super) fn new(name: &'a str, genome: &'a Genome) -> Self {
        Self {
            name,
            chromosomes: genome.chromosomes(),
            devices: genome.devices(),
        }
    }
}

/// Format a parsed genome as human-readable text.
pub(super) fn format_genome(name: &str, genome: &Genome) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "Genome '{name}' ({} chromosomes, {} symbols):",
        genome.num_chromosomes(),
        genome.symbol_count()
    );
    for (i, chromosome) in genome.chromosomes().iter().enumerate() {
        let _ = writeln!(output, "  Chromosome {}: {chromosome}", i + 1);
    }
    for (i, device) in genome.devices().iter().enumerate() {
        let _ = writeln!(output, "  Device {}: {}", i + 1, device.marker());
        for (j, parameter) in device.parameters().iter().enumerate() {
            let _ = writeln!(
                output,
                "    Parameter {}: {:.6} ({})",
                j + 1,
                parameter.value,
                parameter.raw
            );
        }
        for (j, terminal) in device.terminals().iter().enumerate() {
            let _ = writeln!(output, "    Terminal {}: {terminal}", j + 1);
        }
    }

    output
}
