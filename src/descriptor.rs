//! Genome descriptors: alphabet, markers, mutation probabilities and scoring.
//!
//! A [`RawDescriptor`] is the loosely typed form read from configuration files
//! or assembled in code. Validating it yields a [`Descriptor`], the only form
//! genomes and populations accept. Validation normalizes numeric-like inputs
//! (e.g. `"0.01"`) once; the resulting descriptor is read-only.
//!
//! # Example
//!
//! ```
//! use age::descriptor::{Mutation, RawDescriptor};
//!
//! let desc = RawDescriptor::new("ACGT", ["ACGA"], "TGC", "TGA")
//!     .with_possibility("char_replace", 0.01)
//!     .validate()
//!     .unwrap();
//! assert!((desc.possibility(Mutation::CharReplace) - 0.01).abs() < 1e-12);
//! assert!(desc.possibility(Mutation::FragMove).abs() < 1e-12);
//! ```

use crate::error::{DescriptorError, Violation};
use crate::genome::{Tokenizer, decode_parameter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default decay for parameter decoding.
pub const DEFAULT_COME_ALPHA: f64 = 1.0;

/// Default elitism fraction.
pub const DEFAULT_ELITISM: f64 = 0.2;

/// Default linear gap cost used with a substitution matrix.
pub const DEFAULT_GAP: f64 = -1.0;

/// Mutation operators, in the order [`crate::Genome::mutate`] applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    /// Remove one symbol.
    CharDelete,
    /// Insert one random symbol.
    CharInsert,
    /// Replace one symbol with a random one.
    CharReplace,
    /// Remove a contiguous run of symbols.
    FragDelete,
    /// Move a contiguous run of symbols elsewhere in the chromosome.
    FragMove,
    /// Duplicate a contiguous run of symbols.
    FragCopy,
    /// Insert a device marker followed by a random payload.
    DeviceInsert,
    /// Remove a whole chromosome.
    ChromosomeDelete,
    /// Append a copy of a chromosome.
    ChromosomeCopy,
    /// One-point crossover between two distinct chromosomes of the genome.
    ChromosomeCrossover,
}

impl Mutation {
    /// Number of mutation operators.
    pub const COUNT: usize = 10;

    /// All operators in application order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::CharDelete,
        Self::CharInsert,
        Self::CharReplace,
        Self::FragDelete,
        Self::FragMove,
        Self::FragCopy,
        Self::DeviceInsert,
        Self::ChromosomeDelete,
        Self::ChromosomeCopy,
        Self::ChromosomeCrossover,
    ];

    /// The configuration key for this operator.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CharDelete => "char_delete",
            Self::CharInsert => "char_insert",
            Self::CharReplace => "char_replace",
            Self::FragDelete => "frag_delete",
            Self::FragMove => "frag_move",
            Self::FragCopy => "frag_copy",
            Self::DeviceInsert => "device_insert",
            Self::ChromosomeDelete => "chromosome_delete",
            Self::ChromosomeCopy => "chromosome_copy",
            Self::ChromosomeCrossover => "chromosome_crossover",
        }
    }

    /// Whether a probability of exactly 1 is allowed.
    ///
    /// Only chromosome deletion shrinks the genome on every trial, so it is
    /// the only operator whose trial loop ends when every draw succeeds.
    #[must_use]
    pub const fn allows_certainty(self) -> bool {
        matches!(self, Self::ChromosomeDelete)
    }

    /// Look up an operator by its configuration key.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A numeric setting that may arrive as a number or as numeric text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// A real number.
    Real(f64),
    /// Text expected to parse as a real number.
    Text(String),
}

impl Number {
    /// Coerce to a real number, if possible.
    #[must_use]
    pub fn coerce(&self) -> Option<f64> {
        match self {
            Self::Real(x) => Some(*x),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<f64> for Number {
    fn from(x: f64) -> Self {
        Self::Real(x)
    }
}

impl From<&str> for Number {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

/// Unvalidated descriptor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDescriptor {
    /// Symbols chromosomes are written in; each symbol at most once.
    pub alphabet: String,
    /// Device markers, in tie-break order.
    pub devices: Vec<String>,
    /// Marker closing a terminal tag inside a device.
    pub terminal: String,
    /// Marker closing a parameter inside a device.
    pub parameter: String,
    /// Mutation probabilities keyed by operator name.
    pub possibilities: BTreeMap<String, Number>,
    /// Optional substitution matrix indexed by alphabet position.
    pub scoring: Option<Vec<Vec<f64>>>,
    /// Linear gap cost used together with `scoring`.
    pub gap: f64,
    /// Decay parameter for parameter decoding.
    pub come_alpha: Number,
    /// Fraction of the population considered for elitism.
    pub elitism: Number,
}

impl Default for RawDescriptor {
    fn default() -> Self {
        Self {
            alphabet: String::new(),
            devices: Vec::new(),
            terminal: String::new(),
            parameter: String::new(),
            possibilities: BTreeMap::new(),
            scoring: None,
            gap: DEFAULT_GAP,
            come_alpha: Number::Real(DEFAULT_COME_ALPHA),
            elitism: Number::Real(DEFAULT_ELITISM),
        }
    }
}

impl RawDescriptor {
    /// Start a descriptor from its alphabet and markers.
    #[must_use]
    pub fn new<I, S>(alphabet: &str, devices: I, terminal: &str, parameter: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            alphabet: alphabet.to_owned(),
            devices: devices.into_iter().map(Into::into).collect(),
            terminal: terminal.to_owned(),
            parameter: parameter.to_owned(),
            ..Self::default()
        }
    }

    /// Set the probability of one mutation operator.
    #[must_use]
    pub fn with_possibility(mut self, name: &str, p: impl Into<Number>) -> Self {
        self.possibilities.insert(name.to_owned(), p.into());
        self
    }

    /// Use a substitution matrix for alignment.
    #[must_use]
    pub fn with_scoring(mut self, scoring: Vec<Vec<f64>>, gap: f64) -> Self {
        self.scoring = Some(scoring);
        self.gap = gap;
        self
    }

    /// Set the decoding decay.
    #[must_use]
    pub fn with_come_alpha(mut self, alpha: impl Into<Number>) -> Self {
        self.come_alpha = alpha.into();
        self
    }

    /// Set the elitism fraction.
    #[must_use]
    pub fn with_elitism(mut self, elitism: impl Into<Number>) -> Self {
        self.elitism = elitism.into();
        self
    }

    /// Whether the settings form a usable descriptor.
    #[must_use]
    pub fn check(&self) -> bool {
        self.violations().is_empty()
    }

    /// Every constraint these settings violate, in check order.
    #[must_use]
    pub fn violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        let symbols: Vec<char> = self.alphabet.chars().collect();
        if symbols.is_empty() {
            violations.push(Violation::EmptyAlphabet);
        }
        for (i, &c) in symbols.iter().enumerate() {
            // report each repeated symbol once, at its second occurrence
            if symbols[..i].iter().filter(|&&s| s == c).count() == 1 {
                violations.push(Violation::DuplicateSymbol(c));
            }
        }

        if self.devices.is_empty() {
            violations.push(Violation::NoDevices);
        }
        for (i, device) in self.devices.iter().enumerate() {
            if !self.is_token(device) {
                violations.push(Violation::InvalidMarker {
                    role: "device",
                    marker: device.clone(),
                });
            } else if self.devices[..i].contains(device) {
                violations.push(Violation::DuplicateDevice(device.clone()));
            }
        }

        for (role, marker) in [("terminal", &self.terminal), ("parameter", &self.parameter)] {
            if !self.is_token(marker) {
                violations.push(Violation::InvalidMarker {
                    role,
                    marker: marker.clone(),
                });
            }
        }
        if !self.terminal.is_empty() && self.terminal == self.parameter {
            violations.push(Violation::AmbiguousMarkers);
        }

        for (name, value) in &self.possibilities {
            let Some(mutation) = Mutation::from_name(name) else {
                continue;
            };
            match value.coerce() {
                None => violations.push(Violation::NonNumericPossibility(name.clone())),
                Some(p) if !possibility_in_range(mutation, p) => {
                    violations.push(Violation::PossibilityOutOfRange(name.clone()));
                }
                Some(_) => {}
            }
        }

        if let Some(matrix) = &self.scoring {
            let n = symbols.len();
            if matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
                violations.push(Violation::ScoringShape { expected: n });
            } else if matrix.iter().flatten().any(|s| !s.is_finite()) {
                violations.push(Violation::ScoringNotFinite);
            }
        }
        if !self.gap.is_finite() {
            violations.push(Violation::GapNotFinite);
        }

        match self.come_alpha.coerce() {
            None => violations.push(Violation::NonNumericComeAlpha),
            Some(a) if !(0.0..=1.0).contains(&a) => violations.push(Violation::ComeAlphaOutOfRange),
            Some(_) => {}
        }
        match self.elitism.coerce() {
            None => violations.push(Violation::NonNumericElitism),
            Some(e) if !(e > 0.0 && e <= 1.0) => violations.push(Violation::ElitismOutOfRange),
            Some(_) => {}
        }

        violations
    }

    /// Validate and normalize into a [`Descriptor`].
    ///
    /// # Errors
    ///
    /// Returns every violated constraint if the settings are unusable.
    pub fn validate(self) -> Result<Descriptor, DescriptorError> {
        let violations = self.violations();
        if !violations.is_empty() {
            return Err(DescriptorError { violations });
        }

        let mut possibilities = [0.0; Mutation::COUNT];
        for (name, value) in &self.possibilities {
            match (Mutation::from_name(name), value.coerce()) {
                (Some(kind), Some(p)) => possibilities[kind.index()] = p,
                _ => log::warn!("ignoring unknown mutation possibility {name:?}"),
            }
        }

        let tokenizer = Tokenizer::new(&self.devices, &self.terminal, &self.parameter)
            .map_err(|e| DescriptorError {
                violations: vec![Violation::MarkerPattern(e.to_string())],
            })?;

        Ok(Descriptor {
            symbols: self.alphabet.chars().collect(),
            alphabet: self.alphabet,
            devices: self.devices,
            terminal: self.terminal,
            parameter: self.parameter,
            possibilities,
            scoring: self.scoring,
            gap: self.gap,
            // both coerce: checked by violations()
            come_alpha: self.come_alpha.coerce().unwrap_or(DEFAULT_COME_ALPHA),
            elitism: self.elitism.coerce().unwrap_or(DEFAULT_ELITISM),
            tokenizer,
        })
    }

    fn is_token(&self, token: &str) -> bool {
        !token.is_empty() && token.chars().all(|c| self.alphabet.contains(c))
    }
}

/// Validated, read-only genome configuration.
///
/// Shared by every genome of a run behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor", into = "RawDescriptor")]
pub struct Descriptor {
    alphabet: String,
    symbols: Vec<char>,
    devices: Vec<String>,
    terminal: String,
    parameter: String,
    possibilities: [f64; Mutation::COUNT],
    scoring: Option<Vec<Vec<f64>>>,
    gap: f64,
    come_alpha: f64,
    elitism: f64,
    tokenizer: Tokenizer,
}

impl Descriptor {
    /// The alphabet as written.
    #[must_use]
    pub fn alphabet(&self) -> &str {
        &self.alphabet
    }

    /// The alphabet symbols, in order.
    #[must_use]
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Device markers, in tie-break order.
    #[must_use]
    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    /// The terminal marker.
    #[must_use]
    pub fn terminal(&self) -> &str {
        &self.terminal
    }

    /// The parameter marker.
    #[must_use]
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// Probability of one mutation operator.
    #[must_use]
    pub fn possibility(&self, mutation: Mutation) -> f64 {
        self.possibilities[mutation.index()]
    }

    /// All mutation probabilities in application order.
    pub fn possibilities(&self) -> impl Iterator<Item = (Mutation, f64)> + '_ {
        Mutation::ALL.into_iter().map(|m| (m, self.possibility(m)))
    }

    /// The substitution matrix, if alignment uses one.
    #[must_use]
    pub fn scoring(&self) -> Option<&[Vec<f64>]> {
        self.scoring.as_deref()
    }

    /// Linear gap cost used with the substitution matrix.
    #[must_use]
    pub fn gap(&self) -> f64 {
        self.gap
    }

    /// Decay parameter for parameter decoding.
    #[must_use]
    pub fn come_alpha(&self) -> f64 {
        self.come_alpha
    }

    /// Elitism fraction.
    #[must_use]
    pub fn elitism(&self) -> f64 {
        self.elitism
    }

    /// Position of a symbol in the alphabet.
    #[must_use]
    pub fn index_of(&self, symbol: char) -> Option<usize> {
        self.symbols.iter().position(|&s| s == symbol)
    }

    /// Whether `token` is a non-empty string over the alphabet.
    #[must_use]
    pub fn is_token(&self, token: &str) -> bool {
        !token.is_empty() && token.chars().all(|c| self.index_of(c).is_some())
    }

    /// Decode a raw parameter string with this descriptor's alphabet and decay.
    ///
    /// Returns `None` for an empty string or one with foreign symbols.
    #[must_use]
    pub fn decode(&self, raw: &str) -> Option<f64> {
        decode_parameter(&self.symbols, self.come_alpha, raw)
    }

    pub(crate) fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }
}

impl PartialEq for Descriptor {
    fn eq(&self, other: &Self) -> bool {
        self.alphabet == other.alphabet
            && self.devices == other.devices
            && self.terminal == other.terminal
            && self.parameter == other.parameter
            && self.possibilities == other.possibilities
            && self.scoring == other.scoring
            && self.gap.to_bits() == other.gap.to_bits()
            && self.come_alpha.to_bits() == other.come_alpha.to_bits()
            && self.elitism.to_bits() == other.elitism.to_bits()
    }
}

impl TryFrom<RawDescriptor> for Descriptor {
    type Error = DescriptorError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        raw.validate()
    }
}

impl From<Descriptor> for RawDescriptor {
    fn from(desc: Descriptor) -> Self {
        Self {
            possibilities: desc
                .possibilities()
                .map(|(m, p)| (m.name().to_owned(), Number::Real(p)))
                .collect(),
            alphabet: desc.alphabet,
            devices: desc.devices,
            terminal: desc.terminal,
            parameter: desc.parameter,
            scoring: desc.scoring,
            gap: desc.gap,
            come_alpha: Number::Real(desc.come_alpha),
            elitism: Number::Real(desc.elitism),
        }
    }
}

/// `[0, 1]` for operators that allow certainty, `[0, 1)` for the rest.
fn possibility_in_range(mutation: Mutation, p: f64) -> bool {
    if mutation.allows_certainty() {
        (0.0..=1.0).contains(&p)
    } else {
        (0.0..1.0).contains(&p)
    }
}
