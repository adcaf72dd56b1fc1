//! Chromosome tokenizer.
//!
//! Device markers are located with one combined alternation, so when two
//! markers start at the same position the one declared first wins. The text
//! between a device marker and the next one is the device's token region,
//! which is cut at terminal and parameter markers:
//!
//! ```text
//!   XX ACGA YY TGC ZZ TGA WW
//!      ^^^^ device marker
//!           ^^ terminal  ^^ parameter    (WW has no closing marker: dropped)
//! ```

use crate::descriptor::Descriptor;
use crate::genome::device::Device;
use regex::Regex;

/// Compiled marker alternations for one descriptor.
#[derive(Debug, Clone)]
pub(crate) struct Tokenizer {
    devices: Regex,
    tags: Regex,
    terminal: String,
}

impl Tokenizer {
    pub(crate) fn new(
        devices: &[String],
        terminal: &str,
        parameter: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            devices: Regex::new(&alternation(devices.iter().map(String::as_str)))?,
            tags: Regex::new(&alternation([terminal, parameter]))?,
            terminal: terminal.to_owned(),
        })
    }

    /// Append every device found in `chromosome` to `out`.
    pub(crate) fn parse_chromosome(&self, desc: &Descriptor, chromosome: &str, out: &mut Vec<Device>) {
        let mut occurrences = self.devices.find_iter(chromosome).peekable();
        while let Some(marker) = occurrences.next() {
            let end = occurrences.peek().map_or(chromosome.len(), regex::Match::start);
            out.push(self.parse_device(desc, marker.as_str(), &chromosome[marker.end()..end]));
        }
    }

    fn parse_device(&self, desc: &Descriptor, marker: &str, region: &str) -> Device {
        let mut device = Device::new(marker);
        let mut start = 0;

        for tag in self.tags.find_iter(region) {
            let data = &region[start..tag.start()];
            start = tag.end();
            if data.is_empty() {
                continue;
            }
            if tag.as_str() == self.terminal {
                device.push_terminal(data);
            } else if let Some(value) = desc.decode(data) {
                device.push_parameter(data, value);
            }
        }

        device
    }
}

fn alternation<'a>(markers: impl IntoIterator<Item = &'a str>) -> String {
    markers
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|")
}
