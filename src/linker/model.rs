//! Linked entities: records with their cross-references resolved.
//!
//! Everything here is derived from raw records by resolving identifiers and
//! serial numbers against already-built indices. Resolution is best-effort:
//! a dangling reference becomes `None`, never an error - only structural
//! decode failures abort a parse.

use crate::parser::heap_dump::{ConstField, MemberField, PrimitiveArrayData, StaticField};
use crate::parser::reader::Id;
use crate::parser::values::ValueHolder;

/// A class known to the runtime, with its name resolved through the string
/// table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedClass {
    pub class_serial_number: u32,
    pub id: Id,
    pub stack_trace_serial_number: u32,
    pub class_name: Option<String>,
}

/// A stack frame with method/signature/source names resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub id: Id,
    pub method_name: Option<String>,
    pub method_signature: Option<String>,
    pub source_file_name: Option<String>,
    pub class: Option<LoadedClass>,
    pub line_number: i32,
}

/// A stack trace with its frame ids resolved. Frame ids that resolve to
/// nothing are dropped from the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTrace {
    pub stack_trace_serial_number: u32,
    pub thread_serial_number: u32,
    pub frames: Vec<StackFrame>,
}

/// Heap metadata entry, description resolved through the string table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapDumpInfo {
    pub heap_id: Id,
    pub description: Option<String>,
}

/// A member field schema paired with the value decoded for one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberFieldAndValue {
    pub field: MemberField,
    pub value: ValueHolder,
}

/// An object instance. Field values arrive as an opaque blob; the linker's
/// field-decoding pass fills `fields` by walking the class schema chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInstance {
    pub id: Id,
    pub stack_trace_serial_number: u32,
    pub class: Option<LoadedClass>,
    /// Raw encoded field values, kept verbatim.
    pub raw_field_values: Vec<u8>,
    /// Decoded (schema, value) pairs: declaring class fields first, then
    /// each superclass in turn.
    pub fields: Vec<MemberFieldAndValue>,
}

impl ObjectInstance {
    /// Look up a decoded member field by resolved name.
    pub fn member_field(&self, name: &str) -> Option<&MemberFieldAndValue> {
        self.fields
            .iter()
            .find(|f| f.field.name.as_deref() == Some(name))
    }
}

/// A class viewed as a heap entity. Classes and plain objects share one
/// identifier namespace and one instance index.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInstance {
    pub id: Id,
    pub stack_trace_serial_number: u32,
    pub class: Option<LoadedClass>,
    pub super_class: Option<LoadedClass>,
    /// Classloader instance, resolved against the instance index as
    /// populated at the moment this class was linked (single-pass,
    /// insertion-order-dependent).
    pub class_loader: Option<Id>,
    pub signers_id: Id,
    pub protection_domain_id: Id,
    pub instance_size: u32,
    pub const_fields: Vec<ConstField>,
    pub static_fields: Vec<StaticField>,
    pub member_fields: Vec<MemberField>,
}

/// An object array. Elements are identifier handles into the shared
/// instance index; a dangling or null element id is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectArrayInstance {
    pub id: Id,
    pub stack_trace_serial_number: u32,
    pub array_length: u32,
    pub array_class: Option<LoadedClass>,
    pub elements: Vec<Option<Id>>,
}

/// A primitive array with its decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveArrayInstance {
    pub id: Id,
    pub stack_trace_serial_number: u32,
    pub elements: PrimitiveArrayData,
}

/// Any heap entity, keyed by identifier in the shared instance index.
#[derive(Debug, Clone, PartialEq)]
pub enum Instance {
    Object(ObjectInstance),
    Class(ClassInstance),
    ObjectArray(ObjectArrayInstance),
    PrimitiveArray(PrimitiveArrayInstance),
}

impl Instance {
    pub fn id(&self) -> Id {
        match self {
            Instance::Object(i) => i.id,
            Instance::Class(i) => i.id,
            Instance::ObjectArray(i) => i.id,
            Instance::PrimitiveArray(i) => i.id,
        }
    }

    pub fn stack_trace_serial_number(&self) -> u32 {
        match self {
            Instance::Object(i) => i.stack_trace_serial_number,
            Instance::Class(i) => i.stack_trace_serial_number,
            Instance::ObjectArray(i) => i.stack_trace_serial_number,
            Instance::PrimitiveArray(i) => i.stack_trace_serial_number,
        }
    }
}

/// One Java-frame GC root owned by a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveThreadFrame {
    pub id: Id,
    pub thread_serial_number: u32,
    pub frame_number: u32,
}

/// A discovered thread: its thread-object root plus the Java-frame roots
/// sharing its serial number, with the display name resolved through the
/// name-object chain when possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveThread {
    pub id: Id,
    pub thread_serial_number: u32,
    pub frame_number: u32,
    pub name: Option<String>,
    pub frames: Vec<ActiveThreadFrame>,
}
