//! AGE CLI - inspect descriptors and genomes and run evolution.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// AGE - Analog Genetic Encoding
#[derive(Parser, Debug)]
#[command(name = "age")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Descriptor JSON file (default: built-in ACGT descriptor)
    #[arg(short, long, global = true)]
    descriptor: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate two random parents, cross them over and show all three
    Inspect {
        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Parse chromosomes from a file and list the devices found
    Parse {
        /// File with one chromosome per line (`#` starts a comment)
        #[arg(required = true)]
        file: PathBuf,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Evolve a population with the built-in wiring fitness
    Evolve {
        /// Evolution config JSON file (flags below override it)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Population size (default: 100)
        #[arg(short, long)]
        population: Option<usize>,

        /// Generations to run, 0 = until target (default: 1000)
        #[arg(short, long)]
        generations: Option<u64>,

        /// Agents evaluated per generation (default: 100)
        #[arg(short, long)]
        evaluations: Option<usize>,

        /// Random seed (default: 42)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Stop once the best agent reaches this fitness
        #[arg(short, long)]
        target: Option<f64>,

        /// Directory for checkpoints and the final population archive
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Resume from a population archive
        #[arg(short, long)]
        resume: Option<PathBuf>,

        /// Show progress bar
        #[arg(long)]
        progress: bool,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let result = match args.command {
        Commands::Inspect { seed, format } => cli::inspect::execute(args.descriptor, seed, format),

        Commands::Parse { file, format } => cli::parse::execute(args.descriptor, file, format),

        Commands::Evolve {
            config,
            population,
            generations,
            evaluations,
            seed,
            target,
            output,
            resume,
            progress,
            format,
        } => cli::evolve::execute(
            args.descriptor,
            cli::evolve::Overrides {
                config,
                population,
                generations,
                evaluations,
                seed,
                target,
                output,
            },
            resume,
            progress,
            format,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
