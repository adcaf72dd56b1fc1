//! Devices extracted from chromosomes.

use serde::Serialize;

/// A decoded parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Symbols as found in the chromosome.
    pub raw: String,
    /// Decoded value in `[0, 1]`.
    pub value: f64,
}

/// One device occurrence found by [`crate::Genome::parse`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    marker: String,
    terminals: Vec<String>,
    parameters: Vec<Parameter>,
}

impl Device {
    pub(crate) fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_owned(),
            terminals: Vec::new(),
            parameters: Vec::new(),
        }
    }

    pub(crate) fn push_terminal(&mut self, terminal: &str) {
        self.terminals.push(terminal.to_owned());
    }

    pub(crate) fn push_parameter(&mut self, raw: &str, value: f64) {
        self.parameters.push(Parameter {
            raw: raw.to_owned(),
            value,
        });
    }

    /// The device marker that opened this device.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Terminal tags in chromosome order.
    #[must_use]
    pub fn terminals(&self) -> &[String] {
        &self.terminals
    }

    /// Parameters in chromosome order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// The `index`-th terminal tag.
    #[must_use]
    pub fn terminal(&self, index: usize) -> Option<&str> {
        self.terminals.get(index).map(String::as_str)
    }

    /// The decoded value of the `index`-th parameter.
    #[must_use]
    pub fn parameter_value(&self, index: usize) -> Option<f64> {
        self.parameters.get(index).map(|p| p.value)
    }
}
