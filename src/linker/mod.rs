//! Cross-reference linking: raw records into indexed entities.
//!
//! This module handles:
//! - Building every lookup table in dependency order
//! - Resolving forward references (string ids, class ids/serials, fields)
//! - Decoding instance field blobs against inherited schemas
//! - Discovering active threads and their stack-frame roots

pub mod link;
pub mod model;

// Re-export main types
pub use link::{link_records, reference_as_string, LinkedRecords};
pub use model::{
    ActiveThread, ActiveThreadFrame, ClassInstance, HeapDumpInfo, Instance, LoadedClass,
    MemberFieldAndValue, ObjectArrayInstance, ObjectInstance, PrimitiveArrayInstance, StackFrame,
    StackTrace,
};
