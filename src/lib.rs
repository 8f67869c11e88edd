//! Reconbridge: legacy 3D-reconstruction formats into one canonical model.
//!
//! Reconbridge reads sparse bundle-adjustment output (NVM_V3) and dense
//! multi-view-stereo output (PMVS patches with PLY colors) and converts both
//! into the same camera / point record model, so viewers and exporters only
//! need to understand one representation.
//!
//! # Modules
//!
//! - [`ir`]: Canonical records, metadata packing, and the format readers
//! - [`inspect`]: Summaries of parsed reconstructions
//! - [`progress`]: Progress observers for long reads
//! - [`error`]: Error types for reconbridge operations

pub mod error;
pub mod inspect;
pub mod ir;
pub mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::BridgeError;

/// The reconbridge CLI application.
#[derive(Parser)]
#[command(name = "reconbridge")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Read an NVM_V3 sparse bundle and summarize it.
    Sparse(SparseArgs),
    /// Read a PMVS patch file with its PLY colors and summarize them.
    Dense(DenseArgs),
}

/// Arguments for the sparse subcommand.
#[derive(clap::Args)]
struct SparseArgs {
    /// NVM_V3 file to read.
    input: PathBuf,

    /// Output format ('text', 'json', or 'records').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the dense subcommand.
#[derive(clap::Args)]
struct DenseArgs {
    /// PMVS patch file to read.
    patch: PathBuf,

    /// Companion ASCII PLY file holding the point colors.
    ply: PathBuf,

    /// Output format ('text', 'json', or 'records').
    #[arg(long, default_value = "text")]
    output: String,

    /// Do not report reading progress.
    #[arg(long)]
    quiet: bool,
}

/// How the result of a subcommand is printed.
enum OutputFormat {
    Text,
    Json,
    Records,
}

impl OutputFormat {
    fn parse(raw: &str) -> Result<Self, BridgeError> {
        match raw {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "records" => Ok(Self::Records),
            other => Err(BridgeError::UnsupportedFormat(format!(
                "'{}' (supported: text, json, records)",
                other
            ))),
        }
    }
}

/// Run the reconbridge CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), BridgeError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Sparse(args)) => run_sparse(args),
        Some(Commands::Dense(args)) => run_dense(args),
        None => {
            println!("reconbridge {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Reads NVM_V3 sparse bundles and PMVS dense patches.");
            println!();
            println!("Run 'reconbridge --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the sparse subcommand.
fn run_sparse(args: SparseArgs) -> Result<(), BridgeError> {
    // Reject a bad --output before doing any parsing work
    let output = OutputFormat::parse(&args.output)?;
    let recon = ir::io_nvm::read_nvm(&args.input)?;

    match output {
        OutputFormat::Text => print!("{}", inspect::inspect_sparse(&recon)),
        OutputFormat::Json => {
            let report = inspect::inspect_sparse(&recon);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Records => println!("{}", serde_json::to_string_pretty(&recon)?),
    }

    Ok(())
}

/// Execute the dense subcommand.
fn run_dense(args: DenseArgs) -> Result<(), BridgeError> {
    let output = OutputFormat::parse(&args.output)?;

    let recon = if args.quiet {
        ir::io_pmvs::read_pmvs_with_progress(
            &args.patch,
            &args.ply,
            &mut progress::NoProgress,
        )?
    } else {
        ir::io_pmvs::read_pmvs(&args.patch, &args.ply)?
    };

    match output {
        OutputFormat::Text => print!("{}", inspect::inspect_dense(&recon)?),
        OutputFormat::Json => {
            let report = inspect::inspect_dense(&recon)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Records => println!("{}", serde_json::to_string_pretty(&recon)?),
    }

    Ok(())
}
