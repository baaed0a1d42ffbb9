//! Hprof Studio
//!
//! Heap dump parsing and GC-root reference graph construction for
//! hprof captures.
//!
//! This crate provides the core implementation for the `hprof` CLI tool:
//! decoding the binary record stream, linking records into indexed
//! entities, and building the deduplicated object-reference graph that
//! downstream retention analysis starts from.
//!
//! ## Getting Started
//!
//! Most users should install and use the CLI:
//!
//! ```bash
//! cargo install hprof-studio
//! hprof --help
//! ```
//!
//! Library users call [`parse_hprof`] (or [`parse_hprof_bytes`]) and walk
//! the returned [`Hprof`] snapshot.

pub mod commands;
pub mod graph;
pub mod linker;
pub mod output;
pub mod parser;
pub mod snapshot;
pub mod utils;

pub use snapshot::{parse_hprof, parse_hprof_bytes, Hprof};
