//! Snapshot entry point: one call from file path (or byte slice) to the
//! fully parsed, linked and graphed model.

use crate::graph::{build_ref_graph, RefGraph};
use crate::linker::{link_records, LinkedRecords};
use crate::parser::{parse_header, parse_records, ByteReader, HprofHeader, RecordsByKind};
use crate::utils::error::HprofError;
use log::{debug, info};
use std::path::Path;

/// A fully parsed heap dump: header, raw records bucketed by kind, the
/// linked indices and the GC-root reference graph.
///
/// Built once per parse call and immutable afterwards; the caller owns and
/// eventually discards it. There is no incremental update.
#[derive(Debug, Clone)]
pub struct Hprof {
    pub header: HprofHeader,
    pub records: RecordsByKind,
    pub linked: LinkedRecords,
    pub ref_graph: RefGraph,
}

/// Parse a dump file into a snapshot.
///
/// The file is read whole and released before linking starts; on any error
/// the partial state is dropped and only the error is returned.
///
/// # Errors
/// * `HprofError::Io` - the file cannot be opened or read
/// * any decode/link error from [`parse_hprof_bytes`]
pub fn parse_hprof(path: impl AsRef<Path>) -> Result<Hprof, HprofError> {
    let path = path.as_ref();
    info!("Parsing heap dump: {}", path.display());
    let bytes = std::fs::read(path)?;
    parse_hprof_bytes(&bytes)
}

/// Parse an in-memory dump image into a snapshot.
///
/// # Errors
/// The fatal decode/link errors of [`HprofError`]; no partial snapshot is
/// ever returned.
pub fn parse_hprof_bytes(bytes: &[u8]) -> Result<Hprof, HprofError> {
    let mut reader = ByteReader::new(bytes);

    // Step 1/4: fixed-layout header
    let header = parse_header(&mut reader)?;

    // Step 2/4: flat top-level record stream
    let records = parse_records(&mut reader, &header)?;
    debug!(
        "Decoded {} records ({} heap dump segments)",
        records.total(),
        records.heap_dumps.len()
    );

    // Step 3/4: cross-reference linking
    let linked = link_records(&records, &header)?;

    // Step 4/4: GC-root reference graph
    let ref_graph = build_ref_graph(&linked);

    info!(
        "Snapshot ready: {} instances, {} graph nodes",
        linked.instances.len(),
        ref_graph.len()
    );

    Ok(Hprof {
        header,
        records,
        linked,
        ref_graph,
    })
}
