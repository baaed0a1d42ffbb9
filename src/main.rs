//! Hprof Studio CLI
//!
//! A heap dump inspection tool for hprof captures.
//! Parses a dump, links it and writes a JSON summary of the snapshot.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use hprof_studio::commands::{execute_inspect, validate_args, InspectArgs};
use hprof_studio::utils::config::SCHEMA_VERSION;

/// Hprof Studio - heap dump inspection for hprof captures
#[derive(Parser, Debug)]
#[command(name = "hprof")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a heap dump and write a JSON summary
    Inspect {
        /// Path to the hprof dump file
        #[arg(short, long)]
        file: PathBuf,

        /// Output path for the JSON summary
        #[arg(short, long, default_value = "summary.json")]
        output: PathBuf,

        /// Number of per-class instance counts to include
        #[arg(long, default_value = "20")]
        top_classes: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a summary JSON file
    Validate {
        /// Path to summary JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Inspect {
            file,
            output,
            top_classes,
            summary,
        } => {
            let args = InspectArgs {
                file,
                output_json: output,
                top_classes,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            // Execute inspection
            execute_inspect(args)?;
        }

        Commands::Validate { file } => {
            validate_summary_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Validate a summary JSON file
///
/// **Private** - internal command implementation
fn validate_summary_file(file_path: PathBuf) -> Result<()> {
    use hprof_studio::output::read_summary;

    println!("Validating summary: {}", file_path.display());

    let summary = read_summary(&file_path)?;

    println!("✓ Valid summary JSON");
    println!("  Version: {}", summary.version);
    println!("  Source: {}", summary.source);
    println!("  Format: {}", summary.format_version);
    println!("  Objects: {}", summary.heap.object_instances);
    println!("  GC Roots: {}", summary.heap.gc_roots);
    println!("  Graph Nodes: {}", summary.graph.node_count);

    Ok(())
}

/// Display schema information
///
/// **Private** - internal command implementation
fn display_schema(show_details: bool) {
    println!("Hprof Studio Summary Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string              - Schema version (e.g., '1.0.0')");
        println!("  source: string               - Dump file path");
        println!("  format_version: string       - Hprof header version string");
        println!("  identifier_byte_size: number - Identifier width in bytes");
        println!("  timestamp: number            - Capture timestamp (ms since epoch)");
        println!("  record_counts: object        - Top-level record counts by kind");
        println!("  heap: object                 - Linked heap statistics");
        println!("    classes: number            - Class instances");
        println!("    object_instances: number   - Plain object instances");
        println!("    gc_roots: number           - Distinct rooted identifiers");
        println!("    threads: number            - Discovered threads");
        println!("  top_classes: array           - Classes by live instance count");
        println!("  graph: object                - Reference graph statistics");
        println!("  generated_at: string         - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Hprof Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Summary Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("A heap dump inspection tool for hprof captures.");
}
