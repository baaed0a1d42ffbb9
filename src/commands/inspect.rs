//! Inspect command implementation.
//!
//! The inspect command:
//! 1. Parses the dump file
//! 2. Builds the snapshot summary
//! 3. Writes the JSON summary
//! 4. Optionally prints a text summary

use crate::output::{build_summary, write_summary, DumpSummary};
use crate::snapshot::parse_hprof;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the inspect command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct InspectArgs {
    /// Path of the dump file to parse
    pub file: PathBuf,

    /// Output path for the JSON summary
    pub output_json: PathBuf,

    /// Number of per-class instance counts to include
    pub top_classes: usize,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for InspectArgs {
    fn default() -> Self {
        Self {
            file: PathBuf::new(),
            output_json: PathBuf::from("summary.json"),
            top_classes: 20,
            print_summary: false,
        }
    }
}

/// Validate inspect arguments before doing any work
///
/// **Public** - called from main.rs
pub fn validate_args(args: &InspectArgs) -> Result<()> {
    if args.file.as_os_str().is_empty() {
        bail!("No dump file given");
    }
    if !args.file.exists() {
        bail!("Dump file does not exist: {}", args.file.display());
    }
    if args.top_classes == 0 {
        bail!("--top-classes must be at least 1");
    }
    Ok(())
}

/// Execute the inspect command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Dump parsing errors (truncation, unknown version, bad sub-records)
/// * File write errors
pub fn execute_inspect(args: InspectArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Inspecting heap dump: {}", args.file.display());

    // Step 1/3: parse the dump
    info!("Step 1/3: Parsing dump file...");
    let hprof = parse_hprof(&args.file).context("Failed to parse heap dump")?;

    debug!(
        "Parsed snapshot: {} records, {} instances, {} graph nodes",
        hprof.records.total(),
        hprof.linked.instances.len(),
        hprof.ref_graph.len()
    );

    // Step 2/3: build the summary
    info!("Step 2/3: Building summary...");
    let summary = build_summary(
        &hprof,
        &args.file.display().to_string(),
        args.top_classes,
    );

    // Step 3/3: write output
    info!("Step 3/3: Writing JSON summary...");
    write_summary(&summary, &args.output_json).context("Failed to write summary")?;

    if args.print_summary {
        print_text_summary(&summary);
    }

    info!("Done in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

/// Print a human-readable summary to stdout
///
/// **Private** - internal helper for execute_inspect
fn print_text_summary(summary: &DumpSummary) {
    println!("Heap Dump Summary");
    println!("  Source:        {}", summary.source);
    println!("  Format:        {}", summary.format_version);
    println!("  Id size:       {} bytes", summary.identifier_byte_size);
    println!("  Captured at:   {}", summary.timestamp);
    println!();
    println!("  Classes:       {}", summary.heap.classes);
    println!("  Objects:       {}", summary.heap.object_instances);
    println!("  Object arrays: {}", summary.heap.object_arrays);
    println!("  Prim arrays:   {}", summary.heap.primitive_arrays);
    println!("  GC roots:      {}", summary.heap.gc_roots);
    println!("  Threads:       {}", summary.heap.threads);
    println!();
    println!("  Graph nodes:   {}", summary.graph.node_count);
    println!("  Root children: {}", summary.graph.root_children);

    if !summary.top_classes.is_empty() {
        println!();
        println!("  Top classes by instance count:");
        for (i, class) in summary.top_classes.iter().enumerate() {
            println!(
                "    {}. {} ({} instances)",
                i + 1,
                class.class_name,
                class.instance_count
            );
        }
    }
}
