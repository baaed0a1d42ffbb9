//! Summary output: a versioned JSON description of a parsed snapshot.

pub mod json;
pub mod schema;

// Re-export main functions and types
pub use json::{read_summary, write_summary};
pub use schema::{build_summary, ClassCount, DumpSummary, GraphStats, HeapStats, RecordCounts};
