//! Binary decoding of the hprof wire format.
//!
//! This module handles:
//! - The fixed-layout file header
//! - The lenient top-level record stream
//! - The strict nested heap-segment sub-record stream
//! - The typed value codec every decoder shares

pub mod header;
pub mod heap_dump;
pub mod reader;
pub mod records;
pub mod values;

// Re-export main types
pub use header::{parse_header, HprofHeader, HprofVersion};
pub use heap_dump::{
    parse_heap_dump_body, ClassDumpRecord, ConstField, GcRootRecord, HeapDumpInfoRecord,
    InstanceDumpRecord, MemberField, ObjectArrayRecord, PrimitiveArrayData,
    PrimitiveArrayNoDataRecord, PrimitiveArrayRecord, StaticField, SubRecord,
};
pub use reader::{ByteReader, Id};
pub use records::{
    parse_records, HeapDumpRecord, LoadClassRecord, RecordsByKind, StackFrameRecord,
    StackTraceRecord, StringRecord, UnknownRecord, UnloadClassRecord,
};
pub use values::{read_value, PrimitiveType, ValueHolder};
