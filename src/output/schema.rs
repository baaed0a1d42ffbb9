//! Output JSON schema definitions for snapshot summaries.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution. A summary describes a
//! parsed snapshot; it carries no leak or retention analysis.

use crate::snapshot::Hprof;
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level summary structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpSummary {
    /// Schema version for compatibility checking
    pub version: String,

    /// Path of the dump file this summary was generated from
    pub source: String,

    /// Header version string of the dump
    pub format_version: String,

    /// Identifier width used throughout the dump
    pub identifier_byte_size: u32,

    /// Capture timestamp from the header, milliseconds since epoch
    pub timestamp: i64,

    /// Top-level record counts by kind
    pub record_counts: RecordCounts,

    /// Linked heap statistics
    pub heap: HeapStats,

    /// Classes ranked by live object-instance count
    pub top_classes: Vec<ClassCount>,

    /// Reference graph statistics
    pub graph: GraphStats,

    /// Timestamp when the summary was generated
    pub generated_at: String,
}

/// Counts of decoded top-level records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordCounts {
    pub strings: usize,
    pub load_classes: usize,
    pub unload_classes: usize,
    pub stack_frames: usize,
    pub stack_traces: usize,
    pub heap_dump_segments: usize,
    pub unknown: usize,
}

/// Statistics over the linked instance index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeapStats {
    pub classes: usize,
    pub object_instances: usize,
    pub object_arrays: usize,
    pub primitive_arrays: usize,
    pub gc_roots: usize,
    pub threads: usize,
}

/// One class with its live instance count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassCount {
    pub class_name: String,
    pub instance_count: usize,
}

/// Statistics over the reference graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    /// Subtree nodes in the arena, synthetic root included
    pub node_count: usize,

    /// Children of the synthetic root (the flat GC roots)
    pub root_children: usize,
}

/// Build a summary from a parsed snapshot.
///
/// **Public** - used by commands to create final output
///
/// # Arguments
/// * `hprof` - the parsed snapshot
/// * `source` - dump path echoed into the summary
/// * `top_classes` - how many per-class instance counts to include
pub fn build_summary(hprof: &Hprof, source: &str, top_classes: usize) -> DumpSummary {
    use chrono::Utc;
    use crate::linker::Instance;

    let mut classes = 0usize;
    let mut object_instances = 0usize;
    let mut object_arrays = 0usize;
    let mut primitive_arrays = 0usize;
    for instance in hprof.linked.instances.values() {
        match instance {
            Instance::Class(_) => classes += 1,
            Instance::Object(_) => object_instances += 1,
            Instance::ObjectArray(_) => object_arrays += 1,
            Instance::PrimitiveArray(_) => primitive_arrays += 1,
        }
    }

    let mut counts: Vec<ClassCount> = hprof
        .linked
        .instances_by_class_name
        .iter()
        .map(|(name, ids)| ClassCount {
            class_name: name.clone(),
            instance_count: ids.len(),
        })
        .collect();
    counts.sort_by(|a, b| {
        b.instance_count
            .cmp(&a.instance_count)
            .then_with(|| a.class_name.cmp(&b.class_name))
    });
    counts.truncate(top_classes);

    DumpSummary {
        version: SCHEMA_VERSION.to_string(),
        source: source.to_string(),
        format_version: hprof.header.version.version_string().to_string(),
        identifier_byte_size: hprof.header.identifier_byte_size,
        timestamp: hprof.header.timestamp,
        record_counts: RecordCounts {
            strings: hprof.records.strings.len(),
            load_classes: hprof.records.load_classes.len(),
            unload_classes: hprof.records.unload_classes.len(),
            stack_frames: hprof.records.stack_frames.len(),
            stack_traces: hprof.records.stack_traces.len(),
            heap_dump_segments: hprof.records.heap_dumps.len(),
            unknown: hprof.records.unknown.len(),
        },
        heap: HeapStats {
            classes,
            object_instances,
            object_arrays,
            primitive_arrays,
            gc_roots: hprof.linked.gc_roots.len(),
            threads: hprof.linked.threads_by_serial.len(),
        },
        top_classes: counts,
        graph: GraphStats {
            node_count: hprof.ref_graph.len(),
            root_children: hprof.ref_graph.root().children.len(),
        },
        generated_at: Utc::now().to_rfc3339(),
    }
}
