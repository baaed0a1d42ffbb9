//! Format constants for the hprof wire format and the summary schema.

/// Current summary output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Version strings a dump header may carry. Matching is exact; anything
/// else fails the parse.
pub const KNOWN_VERSION_STRINGS: &[&str] = &[
    "JAVA PROFILE 1.0.1",
    "JAVA PROFILE 1.0.2",
    "JAVA PROFILE 1.0.3",
];

/// Identifier value reserved as the null reference.
pub const NULL_REFERENCE: u64 = 0;

// Top-level record tags. Anything not listed here is bucketed as an
// unknown record rather than rejected.
pub const TAG_STRING_IN_UTF8: u8 = 0x01;
pub const TAG_LOAD_CLASS: u8 = 0x02;
pub const TAG_UNLOAD_CLASS: u8 = 0x03;
pub const TAG_STACK_FRAME: u8 = 0x04;
pub const TAG_STACK_TRACE: u8 = 0x05;
pub const TAG_HEAP_DUMP: u8 = 0x0c;
pub const TAG_HEAP_DUMP_SEGMENT: u8 = 0x1c;
pub const TAG_HEAP_DUMP_END: u8 = 0x2c;

// Sub-record tags inside a heap dump segment. These share a namespace
// separate from the top-level tags; an unknown sub-tag is fatal because
// sub-records carry no length prefix to skip by.
pub const SUB_TAG_ROOT_UNKNOWN: u8 = 0xff;
pub const SUB_TAG_ROOT_JNI_GLOBAL: u8 = 0x01;
pub const SUB_TAG_ROOT_JNI_LOCAL: u8 = 0x02;
pub const SUB_TAG_ROOT_JAVA_FRAME: u8 = 0x03;
pub const SUB_TAG_ROOT_NATIVE_STACK: u8 = 0x04;
pub const SUB_TAG_ROOT_STICKY_CLASS: u8 = 0x05;
pub const SUB_TAG_ROOT_THREAD_BLOCK: u8 = 0x06;
pub const SUB_TAG_ROOT_MONITOR_USED: u8 = 0x07;
pub const SUB_TAG_ROOT_THREAD_OBJECT: u8 = 0x08;
pub const SUB_TAG_ROOT_INTERNED_STRING: u8 = 0x89;
pub const SUB_TAG_ROOT_FINALIZING: u8 = 0x8a;
pub const SUB_TAG_ROOT_DEBUGGER: u8 = 0x8b;
pub const SUB_TAG_ROOT_REFERENCE_CLEANUP: u8 = 0x8c;
pub const SUB_TAG_ROOT_VM_INTERNAL: u8 = 0x8d;
pub const SUB_TAG_ROOT_JNI_MONITOR: u8 = 0x8e;
pub const SUB_TAG_ROOT_UNREACHABLE: u8 = 0x90;
pub const SUB_TAG_CLASS_DUMP: u8 = 0x20;
pub const SUB_TAG_INSTANCE_DUMP: u8 = 0x21;
pub const SUB_TAG_OBJECT_ARRAY_DUMP: u8 = 0x22;
pub const SUB_TAG_PRIMITIVE_ARRAY_DUMP: u8 = 0x23;
pub const SUB_TAG_PRIMITIVE_ARRAY_NODATA: u8 = 0xc3;
pub const SUB_TAG_HEAP_DUMP_INFO: u8 = 0xfe;

/// Value type code for object references. Primitive type codes live on
/// [`crate::parser::values::PrimitiveType`].
pub const REFERENCE_TYPE_CODE: u8 = 2;
