//! Persistence for agents and populations.
//!
//! An agent record is plain text: an identity line, a fitness line and one
//! line per chromosome. Lines starting with `#` and blank lines are ignored
//! on read.
//!
//! ```text
//! # age agent
//! 17
//! 0.75
//! ACAAGTTGACCTT
//! GGACAC
//! ```
//!
//! The identity line is an unsigned 64-bit decimal integer. Records with any
//! other identity text are rejected as malformed, and a loaded population
//! hands out fresh identities above the largest one it holds.
//!
//! A population archive is a directory holding `info.json` (descriptor and
//! generation) and one `<index>.agt` record per agent. Saving replaces the
//! whole directory, so it should hold nothing but the archive.

use crate::descriptor::Descriptor;
use crate::error::PersistenceError;
use crate::genome::Genome;
use crate::population::{Agent, AgentId, Population};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the archive info record.
pub const INFO_FILE: &str = "info.json";

/// Extension of agent records inside an archive.
pub const AGENT_EXTENSION: &str = "agt";

/// Name prefix of the sibling directories used while saving.
const STAGING_PREFIX: &str = ".age-archive-";

#[derive(Debug, Serialize, Deserialize)]
struct ArchiveInfo {
    descriptor: Descriptor,
    generation: u64,
}

/// Write one agent record.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_agent<W: Write>(agent: &Agent, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "# age agent")?;
    writeln!(writer, "{}", agent.id())?;
    writeln!(writer, "{}", agent.fitness())?;
    for chromosome in agent.genome().chromosomes() {
        writeln!(writer, "{chromosome}")?;
    }
    Ok(())
}

/// Read one agent record whose chromosomes are over `desc`.
///
/// # Errors
///
/// Returns [`PersistenceError::Malformed`] if the identity or fitness line is
/// missing or unreadable, and [`PersistenceError::Genome`] if a chromosome
/// is not over the alphabet.
pub fn read_agent<R: BufRead>(desc: Arc<Descriptor>, reader: R) -> Result<Agent, PersistenceError> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('#') {
            lines.push(line.to_owned());
        }
    }

    let mut lines = lines.into_iter();
    let id: AgentId = lines
        .next()
        .ok_or_else(|| PersistenceError::Malformed("missing identity line".to_owned()))?
        .parse()
        .map_err(|e| PersistenceError::Malformed(format!("identity: {e}")))?;
    let fitness: f64 = lines
        .next()
        .ok_or_else(|| PersistenceError::Malformed("missing fitness line".to_owned()))?
        .parse()
        .map_err(|e| PersistenceError::Malformed(format!("fitness: {e}")))?;
    let genome = Genome::with_chromosomes(desc, lines)?;

    Ok(Agent::restore(id, genome, fitness))
}

/// Save a population archive into `dir`, replacing whatever archive is there.
///
/// The archive is written into a staging directory next to `dir` and swapped
/// into place once complete, so a failed save leaves the previous archive
/// untouched.
///
/// # Errors
///
/// Returns an error if serialization or file I/O fails.
pub fn save_population(population: &Population, dir: &Path) -> Result<(), PersistenceError> {
    let parent = match dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)?;

    let info = ArchiveInfo {
        descriptor: Descriptor::clone(population.descriptor()),
        generation: population.generation(),
    };
    let mut writer = BufWriter::new(fs::File::create(staging.path().join(INFO_FILE))?);
    serde_json::to_writer_pretty(&mut writer, &info)?;
    writer.flush()?;

    for (i, agent) in population.agents().iter().enumerate() {
        let path = staging.path().join(format!("{i}.{AGENT_EXTENSION}"));
        let mut writer = BufWriter::new(fs::File::create(path)?);
        write_agent(agent, &mut writer)?;
        writer.flush()?;
    }

    swap_into_place(staging.path(), dir, parent)?;

    log::debug!(
        "saved {} agents at generation {} to {}",
        population.len(),
        population.generation(),
        dir.display()
    );
    Ok(())
}

/// Rename `staged` to `dir`, retiring any previous archive at `dir`.
fn swap_into_place(staged: &Path, dir: &Path, parent: &Path) -> io::Result<()> {
    if !dir.exists() {
        return fs::rename(staged, dir);
    }

    // dropped at the end of the swap, taking the old archive with it
    let retired = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)?;
    let old = retired.path().join("archive");
    fs::rename(dir, &old)?;
    if let Err(e) = fs::rename(staged, dir) {
        log::warn!("restoring previous archive at {}: {e}", dir.display());
        fs::rename(&old, dir)?;
        return Err(e);
    }
    Ok(())
}

/// Load a population archive from `dir`.
///
/// Agents are restored in the numeric order of their record names.
///
/// # Errors
///
/// Returns an error if the info record is missing or invalid, or if any
/// agent record cannot be read.
pub fn load_population(dir: &Path) -> Result<Population, PersistenceError> {
    let file = fs::File::open(dir.join(INFO_FILE))?;
    let info: ArchiveInfo = serde_json::from_reader(BufReader::new(file))?;
    let desc = Arc::new(info.descriptor);

    let mut agents = Vec::new();
    for path in agent_files(dir)? {
        let reader = BufReader::new(fs::File::open(&path)?);
        agents.push(read_agent(Arc::clone(&desc), reader)?);
    }

    log::debug!("loaded {} agents from {}", agents.len(), dir.display());
    Ok(Population::restore(desc, info.generation, agents)?)
}

/// Get the directory for a generation checkpoint.
#[must_use]
pub fn checkpoint_path(output_dir: &Path, generation: u64) -> PathBuf {
    output_dir.join(format!("gen_{generation:05}"))
}

fn agent_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<(u64, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != AGENT_EXTENSION) {
            continue;
        }
        let index = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse().ok())
            .unwrap_or(u64::MAX);
        files.push((index, path));
    }
    files.sort();
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::RawDescriptor;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn desc() -> Arc<Descriptor> {
        Arc::new(
            RawDescriptor::new("ACGT", ["ACAA", "ACAC"], "TT", "GG")
                .with_possibility("char_replace", 0.25)
                .with_elitism(0.1)
                .validate()
                .unwrap(),
        )
    }

    #[test]
    fn test_agent_record_round_trip() {
        let genome =
            Genome::with_chromosomes(desc(), ["ACAATTG".to_owned(), "CCGT".to_owned()]).unwrap();
        let agent = Agent::restore(AgentId(12), genome, 0.1 + 0.2);

        let mut buffer = Vec::new();
        write_agent(&agent, &mut buffer).unwrap();
        let restored = read_agent(desc(), buffer.as_slice()).unwrap();

        assert_eq!(restored.id(), AgentId(12));
        assert_eq!(restored.fitness().to_bits(), (0.1f64 + 0.2).to_bits());
        assert_eq!(restored.genome(), agent.genome());
    }

    #[test]
    fn test_read_agent_skips_comments() {
        let text = "# header\n\n3\n# note\n-1.5\nACGT\n\nTTTT\n";
        let agent = read_agent(desc(), text.as_bytes()).unwrap();
        assert_eq!(agent.id(), AgentId(3));
        assert!((agent.fitness() + 1.5).abs() < f64::EPSILON);
        assert_eq!(agent.genome().chromosomes(), &["ACGT".to_owned(), "TTTT".to_owned()]);
    }

    #[test]
    fn test_read_agent_rejects_bad_records() {
        assert!(matches!(
            read_agent(desc(), "# nothing\n".as_bytes()),
            Err(PersistenceError::Malformed(_))
        ));
        assert!(matches!(
            read_agent(desc(), "x\n1.0\n".as_bytes()),
            Err(PersistenceError::Malformed(_))
        ));
        assert!(matches!(
            read_agent(desc(), "1\n1.0\nACXT\n".as_bytes()),
            Err(PersistenceError::Genome(_))
        ));
    }

    #[test]
    fn test_identities_must_be_unsigned_integers() {
        for id in ["-1", "1.5", "0x10", "18446744073709551616"] {
            let record = format!("{id}\n0.5\nACGT\n");
            assert!(
                matches!(
                    read_agent(desc(), record.as_bytes()),
                    Err(PersistenceError::Malformed(_))
                ),
                "{id}"
            );
        }
    }

    #[test]
    fn test_largest_identity_loads() {
        let record = "18446744073709551615\n0.5\nACGT\n";
        let agent = read_agent(desc(), record.as_bytes()).unwrap();
        assert_eq!(agent.id(), AgentId(u64::MAX));

        let mut population = Population::restore(desc(), 0, vec![agent]).unwrap();
        assert_eq!(population.next_id(), AgentId(u64::MAX));

        let dir = tempfile::tempdir().unwrap();
        save_population(&population, dir.path()).unwrap();
        fs::write(dir.path().join("0.agt"), record).unwrap();
        let mut loaded = load_population(dir.path()).unwrap();
        assert_eq!(loaded.agents()[0].id(), AgentId(u64::MAX));
        assert_eq!(loaded.next_id(), AgentId(u64::MAX));
    }

    #[test]
    fn test_population_archive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut population = Population::new(desc());
        for _ in 0..12 {
            population.add_random(1..3, 10..40, &mut rng);
        }
        population.mate(&mut rng).unwrap();

        save_population(&population, dir.path()).unwrap();
        let restored = load_population(dir.path()).unwrap();

        assert_eq!(restored.generation(), 1);
        assert_eq!(**restored.descriptor(), **population.descriptor());
        let ids: Vec<_> = restored.agents().iter().map(Agent::id).collect();
        let expected: Vec<_> = population.agents().iter().map(Agent::id).collect();
        assert_eq!(ids, expected);
        for (a, b) in restored.agents().iter().zip(population.agents()) {
            assert_eq!(a.genome(), b.genome());
        }
    }

    #[test]
    fn test_save_replaces_stale_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut population = Population::new(desc());
        for _ in 0..5 {
            population.add_random(1..2, 10..20, &mut rng);
        }
        save_population(&population, dir.path()).unwrap();

        population.remove(AgentId(0));
        population.remove(AgentId(1));
        save_population(&population, dir.path()).unwrap();

        assert_eq!(load_population(dir.path()).unwrap().len(), 3);
    }

    #[test]
    fn test_save_swaps_whole_archive() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("archive");
        let mut rng = SmallRng::seed_from_u64(5);
        let mut population = Population::new(desc());
        for _ in 0..3 {
            population.add_random(1..2, 10..20, &mut rng);
        }
        save_population(&population, &dir).unwrap();
        fs::write(dir.join("7.agt"), "not a record").unwrap();

        population.remove(AgentId(2));
        save_population(&population, &dir).unwrap();

        let entries: Vec<_> = fs::read_dir(root.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec!["archive"]);
        assert!(!dir.join("7.agt").exists());
        assert_eq!(load_population(&dir).unwrap().len(), 2);
    }

    #[test]
    fn test_checkpoint_path() {
        let path = checkpoint_path(Path::new("/tmp/out"), 42);
        assert_eq!(path, PathBuf::from("/tmp/out/gen_00042"));
    }
}
