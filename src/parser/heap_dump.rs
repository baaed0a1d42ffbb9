//! Nested sub-record decoder for heap dump segments.
//!
//! A segment body is a stream of tag-prefixed sub-records with no
//! per-record length framing: the layout of each sub-record is derived
//! entirely from its field widths and the file's identifier size. Because
//! there is no framing to skip by, an unrecognized sub-tag is fatal -
//! unlike the lenient top-level record loop.

use crate::parser::reader::{ByteReader, Id};
use crate::parser::values::{read_value, PrimitiveType, ValueHolder};
use crate::utils::config::*;
use crate::utils::error::HprofError;

/// Constant-pool field of a class dump, indexed by pool slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstField {
    pub const_pool_index: u32,
    pub value: ValueHolder,
    /// Encoded size of this table entry.
    pub size: u32,
}

/// Static field of a class dump: a name reference plus a typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticField {
    pub name_string_id: Id,
    /// Resolved by the linker against the string table; `None` until then,
    /// or when the string id dangles.
    pub name: Option<String>,
    pub value: ValueHolder,
    pub size: u32,
}

/// Member (instance) field schema of a class dump. Carries a type code but
/// no value - member values live in instance dump blobs and are decoded
/// against this schema by the linker.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberField {
    pub name_string_id: Id,
    pub name: Option<String>,
    pub type_code: u8,
    pub size: u32,
}

/// The sixteen GC root kinds. Every kind carries the rooted identifier;
/// the extra fields are kind-specific.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GcRootRecord {
    Unknown { id: Id, body_length: u64 },
    JniGlobal { id: Id, ref_id: Id, body_length: u64 },
    JniLocal { id: Id, thread_serial_number: u32, frame_number: u32, body_length: u64 },
    JavaFrame { id: Id, thread_serial_number: u32, frame_number: u32, body_length: u64 },
    NativeStack { id: Id, thread_serial_number: u32, body_length: u64 },
    StickyClass { id: Id, body_length: u64 },
    ThreadBlock { id: Id, thread_serial_number: u32, body_length: u64 },
    MonitorUsed { id: Id, body_length: u64 },
    ThreadObject { id: Id, thread_serial_number: u32, frame_number: u32, body_length: u64 },
    InternedString { id: Id, body_length: u64 },
    Finalizing { id: Id, body_length: u64 },
    Debugger { id: Id, body_length: u64 },
    ReferenceCleanup { id: Id, body_length: u64 },
    VmInternal { id: Id, body_length: u64 },
    JniMonitor { id: Id, thread_serial_number: u32, stack_depth: u32, body_length: u64 },
    Unreachable { id: Id, body_length: u64 },
}

impl GcRootRecord {
    /// The rooted identifier, present on every kind.
    pub fn id(&self) -> Id {
        match *self {
            GcRootRecord::Unknown { id, .. }
            | GcRootRecord::JniGlobal { id, .. }
            | GcRootRecord::JniLocal { id, .. }
            | GcRootRecord::JavaFrame { id, .. }
            | GcRootRecord::NativeStack { id, .. }
            | GcRootRecord::StickyClass { id, .. }
            | GcRootRecord::ThreadBlock { id, .. }
            | GcRootRecord::MonitorUsed { id, .. }
            | GcRootRecord::ThreadObject { id, .. }
            | GcRootRecord::InternedString { id, .. }
            | GcRootRecord::Finalizing { id, .. }
            | GcRootRecord::Debugger { id, .. }
            | GcRootRecord::ReferenceCleanup { id, .. }
            | GcRootRecord::VmInternal { id, .. }
            | GcRootRecord::JniMonitor { id, .. }
            | GcRootRecord::Unreachable { id, .. } => id,
        }
    }

    /// True for the Java stack frame root kind, which the graph builder
    /// attaches under its owning thread instead of the flat root list.
    pub fn is_java_frame(&self) -> bool {
        matches!(self, GcRootRecord::JavaFrame { .. })
    }
}

/// Class structure dump: field schemas plus superclass/classloader links.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDumpRecord {
    pub id: Id,
    pub stack_trace_serial_number: u32,
    pub super_class_id: Id,
    pub class_loader_id: Id,
    pub signers_id: Id,
    pub protection_domain_id: Id,
    /// Instance size in bytes.
    pub instance_size: u32,
    pub const_fields: Vec<ConstField>,
    pub static_fields: Vec<StaticField>,
    pub member_fields: Vec<MemberField>,
    pub body_length: u64,
}

/// Object instance dump. Field values stay an opaque blob until the linker
/// has the full class schema chain to decode them against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDumpRecord {
    pub id: Id,
    pub stack_trace_serial_number: u32,
    pub class_id: Id,
    pub field_values: Vec<u8>,
    pub body_length: u64,
}

/// Object array dump: the element identifiers, unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectArrayRecord {
    pub id: Id,
    pub stack_trace_serial_number: u32,
    pub array_length: u32,
    pub array_class_id: Id,
    pub element_ids: Vec<Id>,
    pub body_length: u64,
}

/// Payload of a primitive array dump, one case per element type.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveArrayData {
    Bool(Vec<bool>),
    Char(Vec<u16>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Byte(Vec<i8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
}

impl PrimitiveArrayData {
    pub fn len(&self) -> usize {
        match self {
            PrimitiveArrayData::Bool(v) => v.len(),
            PrimitiveArrayData::Char(v) => v.len(),
            PrimitiveArrayData::Float(v) => v.len(),
            PrimitiveArrayData::Double(v) => v.len(),
            PrimitiveArrayData::Byte(v) => v.len(),
            PrimitiveArrayData::Short(v) => v.len(),
            PrimitiveArrayData::Int(v) => v.len(),
            PrimitiveArrayData::Long(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> PrimitiveType {
        match self {
            PrimitiveArrayData::Bool(_) => PrimitiveType::Boolean,
            PrimitiveArrayData::Char(_) => PrimitiveType::Char,
            PrimitiveArrayData::Float(_) => PrimitiveType::Float,
            PrimitiveArrayData::Double(_) => PrimitiveType::Double,
            PrimitiveArrayData::Byte(_) => PrimitiveType::Byte,
            PrimitiveArrayData::Short(_) => PrimitiveType::Short,
            PrimitiveArrayData::Int(_) => PrimitiveType::Int,
            PrimitiveArrayData::Long(_) => PrimitiveType::Long,
        }
    }
}

/// Primitive array dump with decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveArrayRecord {
    pub id: Id,
    pub stack_trace_serial_number: u32,
    pub elements: PrimitiveArrayData,
    pub body_length: u64,
}

/// Primitive array header without payload (Android "no data" variant).
/// Never becomes an instance; kept for record-level inspection only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveArrayNoDataRecord {
    pub id: Id,
    pub stack_trace_serial_number: u32,
    pub array_length: u32,
    pub element_type_code: u8,
    pub body_length: u64,
}

/// Heap metadata marker: which logical heap the following sub-records
/// belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapDumpInfoRecord {
    pub heap_id: Id,
    pub string_id: Id,
    pub body_length: u64,
}

/// One sub-record of a heap dump segment.
#[derive(Debug, Clone, PartialEq)]
pub enum SubRecord {
    GcRoot(GcRootRecord),
    ClassDump(ClassDumpRecord),
    InstanceDump(InstanceDumpRecord),
    ObjectArray(ObjectArrayRecord),
    PrimitiveArray(PrimitiveArrayRecord),
    PrimitiveArrayNoData(PrimitiveArrayNoDataRecord),
    HeapDumpInfo(HeapDumpInfoRecord),
}

/// Decode one segment body into its sub-records.
///
/// Strict: the first unrecognized sub-tag fails the whole parse with
/// `UnsupportedSubRecordTag`, because without length framing there is no
/// safe way to resynchronize.
pub fn parse_heap_dump_body(
    body: &[u8],
    identifier_byte_size: u32,
) -> Result<Vec<SubRecord>, HprofError> {
    let mut reader = ByteReader::new(body);
    let mut sub_records = Vec::new();
    let id_size = identifier_byte_size;

    while !reader.is_exhausted() {
        let sub_tag = reader.read_u8()?;
        let record = match sub_tag {
            SUB_TAG_ROOT_UNKNOWN => SubRecord::GcRoot(GcRootRecord::Unknown {
                id: reader.read_id(id_size)?,
                body_length: id_size as u64,
            }),
            SUB_TAG_ROOT_JNI_GLOBAL => SubRecord::GcRoot(GcRootRecord::JniGlobal {
                id: reader.read_id(id_size)?,
                ref_id: reader.read_id(id_size)?,
                body_length: id_size as u64 * 2,
            }),
            SUB_TAG_ROOT_JNI_LOCAL => SubRecord::GcRoot(GcRootRecord::JniLocal {
                id: reader.read_id(id_size)?,
                thread_serial_number: reader.read_u32()?,
                frame_number: reader.read_u32()?,
                body_length: id_size as u64 + 8,
            }),
            SUB_TAG_ROOT_JAVA_FRAME => SubRecord::GcRoot(GcRootRecord::JavaFrame {
                id: reader.read_id(id_size)?,
                thread_serial_number: reader.read_u32()?,
                frame_number: reader.read_u32()?,
                body_length: id_size as u64 + 8,
            }),
            SUB_TAG_ROOT_NATIVE_STACK => SubRecord::GcRoot(GcRootRecord::NativeStack {
                id: reader.read_id(id_size)?,
                thread_serial_number: reader.read_u32()?,
                body_length: id_size as u64 + 4,
            }),
            SUB_TAG_ROOT_STICKY_CLASS => SubRecord::GcRoot(GcRootRecord::StickyClass {
                id: reader.read_id(id_size)?,
                body_length: id_size as u64,
            }),
            SUB_TAG_ROOT_THREAD_BLOCK => SubRecord::GcRoot(GcRootRecord::ThreadBlock {
                id: reader.read_id(id_size)?,
                thread_serial_number: reader.read_u32()?,
                body_length: id_size as u64 + 4,
            }),
            SUB_TAG_ROOT_MONITOR_USED => SubRecord::GcRoot(GcRootRecord::MonitorUsed {
                id: reader.read_id(id_size)?,
                body_length: id_size as u64,
            }),
            SUB_TAG_ROOT_THREAD_OBJECT => SubRecord::GcRoot(GcRootRecord::ThreadObject {
                id: reader.read_id(id_size)?,
                thread_serial_number: reader.read_u32()?,
                frame_number: reader.read_u32()?,
                body_length: id_size as u64 + 8,
            }),
            SUB_TAG_ROOT_INTERNED_STRING => SubRecord::GcRoot(GcRootRecord::InternedString {
                id: reader.read_id(id_size)?,
                body_length: id_size as u64,
            }),
            SUB_TAG_ROOT_FINALIZING => SubRecord::GcRoot(GcRootRecord::Finalizing {
                id: reader.read_id(id_size)?,
                body_length: id_size as u64,
            }),
            SUB_TAG_ROOT_DEBUGGER => SubRecord::GcRoot(GcRootRecord::Debugger {
                id: reader.read_id(id_size)?,
                body_length: id_size as u64,
            }),
            SUB_TAG_ROOT_REFERENCE_CLEANUP => SubRecord::GcRoot(GcRootRecord::ReferenceCleanup {
                id: reader.read_id(id_size)?,
                body_length: id_size as u64,
            }),
            SUB_TAG_ROOT_VM_INTERNAL => SubRecord::GcRoot(GcRootRecord::VmInternal {
                id: reader.read_id(id_size)?,
                body_length: id_size as u64,
            }),
            SUB_TAG_ROOT_JNI_MONITOR => SubRecord::GcRoot(GcRootRecord::JniMonitor {
                id: reader.read_id(id_size)?,
                thread_serial_number: reader.read_u32()?,
                stack_depth: reader.read_u32()?,
                body_length: id_size as u64 + 8,
            }),
            SUB_TAG_ROOT_UNREACHABLE => SubRecord::GcRoot(GcRootRecord::Unreachable {
                id: reader.read_id(id_size)?,
                body_length: id_size as u64,
            }),
            SUB_TAG_CLASS_DUMP => SubRecord::ClassDump(read_class_dump(&mut reader, id_size)?),
            SUB_TAG_INSTANCE_DUMP => {
                SubRecord::InstanceDump(read_instance_dump(&mut reader, id_size)?)
            }
            SUB_TAG_OBJECT_ARRAY_DUMP => {
                SubRecord::ObjectArray(read_object_array_dump(&mut reader, id_size)?)
            }
            SUB_TAG_PRIMITIVE_ARRAY_DUMP => {
                SubRecord::PrimitiveArray(read_primitive_array_dump(&mut reader, id_size)?)
            }
            SUB_TAG_PRIMITIVE_ARRAY_NODATA => {
                SubRecord::PrimitiveArrayNoData(PrimitiveArrayNoDataRecord {
                    id: reader.read_id(id_size)?,
                    stack_trace_serial_number: reader.read_u32()?,
                    array_length: reader.read_u32()?,
                    element_type_code: reader.read_u8()?,
                    body_length: id_size as u64 + 4 + 4 + 1,
                })
            }
            SUB_TAG_HEAP_DUMP_INFO => SubRecord::HeapDumpInfo(HeapDumpInfoRecord {
                heap_id: reader.read_id(id_size)?,
                string_id: reader.read_id(id_size)?,
                body_length: id_size as u64 * 2,
            }),
            other => return Err(HprofError::UnsupportedSubRecordTag(other)),
        };
        sub_records.push(record);
    }

    Ok(sub_records)
}

/// Class dump layout:
/// id, stack trace serial, superclass id, classloader id, signers id,
/// protection domain id, two reserved ids (skipped), instance size, then
/// the three counted field tables.
fn read_class_dump(
    reader: &mut ByteReader<'_>,
    id_size: u32,
) -> Result<ClassDumpRecord, HprofError> {
    let mut body_length = 0u64;
    let id = reader.read_id(id_size)?;
    body_length += id_size as u64;
    let stack_trace_serial_number = reader.read_u32()?;
    body_length += 4;
    let super_class_id = reader.read_id(id_size)?;
    body_length += id_size as u64;
    let class_loader_id = reader.read_id(id_size)?;
    body_length += id_size as u64;
    let signers_id = reader.read_id(id_size)?;
    body_length += id_size as u64;
    let protection_domain_id = reader.read_id(id_size)?;
    body_length += id_size as u64;
    // two reserved identifier slots
    reader.skip(2 * id_size as usize)?;
    body_length += id_size as u64 * 2;
    let instance_size = reader.read_u32()?;
    body_length += 4;

    let const_pool_count = reader.read_u16()?;
    body_length += 2;
    let mut const_fields = Vec::with_capacity(const_pool_count as usize);
    for _ in 0..const_pool_count {
        let field = read_const_field(reader, id_size)?;
        body_length += field.size as u64;
        const_fields.push(field);
    }

    let static_field_count = reader.read_u16()?;
    body_length += 2;
    let mut static_fields = Vec::with_capacity(static_field_count as usize);
    for _ in 0..static_field_count {
        let field = read_static_field(reader, id_size)?;
        body_length += field.size as u64;
        static_fields.push(field);
    }

    let member_field_count = reader.read_u16()?;
    body_length += 2;
    let mut member_fields = Vec::with_capacity(member_field_count as usize);
    for _ in 0..member_field_count {
        let field = read_member_field(reader, id_size)?;
        body_length += field.size as u64;
        member_fields.push(field);
    }

    Ok(ClassDumpRecord {
        id,
        stack_trace_serial_number,
        super_class_id,
        class_loader_id,
        signers_id,
        protection_domain_id,
        instance_size,
        const_fields,
        static_fields,
        member_fields,
        body_length,
    })
}

fn read_const_field(
    reader: &mut ByteReader<'_>,
    id_size: u32,
) -> Result<ConstField, HprofError> {
    let const_pool_index = reader.read_u32()?;
    let type_code = reader.read_u8()?;
    let value = read_value(reader, type_code, id_size)?;
    let size = 4 + 1 + value.byte_size();
    Ok(ConstField {
        const_pool_index,
        value,
        size,
    })
}

fn read_static_field(
    reader: &mut ByteReader<'_>,
    id_size: u32,
) -> Result<StaticField, HprofError> {
    let name_string_id = reader.read_id(id_size)?;
    let type_code = reader.read_u8()?;
    let value = read_value(reader, type_code, id_size)?;
    let size = id_size + 1 + value.byte_size();
    Ok(StaticField {
        name_string_id,
        name: None,
        value,
        size,
    })
}

fn read_member_field(
    reader: &mut ByteReader<'_>,
    id_size: u32,
) -> Result<MemberField, HprofError> {
    let name_string_id = reader.read_id(id_size)?;
    let type_code = reader.read_u8()?;
    Ok(MemberField {
        name_string_id,
        name: None,
        type_code,
        size: id_size + 1,
    })
}

fn read_instance_dump(
    reader: &mut ByteReader<'_>,
    id_size: u32,
) -> Result<InstanceDumpRecord, HprofError> {
    let id = reader.read_id(id_size)?;
    let stack_trace_serial_number = reader.read_u32()?;
    let class_id = reader.read_id(id_size)?;
    let byte_count = reader.read_u32()?;
    let field_values = reader.read_bytes(byte_count as usize)?.to_vec();
    Ok(InstanceDumpRecord {
        id,
        stack_trace_serial_number,
        class_id,
        body_length: id_size as u64 * 2 + 4 * 2 + byte_count as u64,
        field_values,
    })
}

fn read_object_array_dump(
    reader: &mut ByteReader<'_>,
    id_size: u32,
) -> Result<ObjectArrayRecord, HprofError> {
    let id = reader.read_id(id_size)?;
    let stack_trace_serial_number = reader.read_u32()?;
    let array_length = reader.read_u32()?;
    let array_class_id = reader.read_id(id_size)?;
    let mut element_ids = Vec::with_capacity(array_length as usize);
    for _ in 0..array_length {
        element_ids.push(reader.read_id(id_size)?);
    }
    Ok(ObjectArrayRecord {
        id,
        stack_trace_serial_number,
        array_length,
        array_class_id,
        element_ids,
        body_length: id_size as u64 * (2 + array_length as u64) + 4 * 2,
    })
}

/// Primitive array layout: id, stack trace serial, element count, element
/// type code, then count x element-width payload bytes.
fn read_primitive_array_dump(
    reader: &mut ByteReader<'_>,
    id_size: u32,
) -> Result<PrimitiveArrayRecord, HprofError> {
    let id = reader.read_id(id_size)?;
    let stack_trace_serial_number = reader.read_u32()?;
    let array_length = reader.read_u32()? as usize;
    let type_code = reader.read_u8()?;
    let element_type = PrimitiveType::from_type_code(type_code)
        .ok_or(HprofError::UnknownValueType(type_code))?;

    let elements = match element_type {
        PrimitiveType::Boolean => {
            let mut v = Vec::with_capacity(array_length);
            for _ in 0..array_length {
                v.push(reader.read_bool()?);
            }
            PrimitiveArrayData::Bool(v)
        }
        PrimitiveType::Char => {
            let mut v = Vec::with_capacity(array_length);
            for _ in 0..array_length {
                v.push(reader.read_char()?);
            }
            PrimitiveArrayData::Char(v)
        }
        PrimitiveType::Float => {
            let mut v = Vec::with_capacity(array_length);
            for _ in 0..array_length {
                v.push(reader.read_f32()?);
            }
            PrimitiveArrayData::Float(v)
        }
        PrimitiveType::Double => {
            let mut v = Vec::with_capacity(array_length);
            for _ in 0..array_length {
                v.push(reader.read_f64()?);
            }
            PrimitiveArrayData::Double(v)
        }
        PrimitiveType::Byte => {
            let mut v = Vec::with_capacity(array_length);
            for _ in 0..array_length {
                v.push(reader.read_i8()?);
            }
            PrimitiveArrayData::Byte(v)
        }
        PrimitiveType::Short => {
            let mut v = Vec::with_capacity(array_length);
            for _ in 0..array_length {
                v.push(reader.read_i16()?);
            }
            PrimitiveArrayData::Short(v)
        }
        PrimitiveType::Int => {
            let mut v = Vec::with_capacity(array_length);
            for _ in 0..array_length {
                v.push(reader.read_i32()?);
            }
            PrimitiveArrayData::Int(v)
        }
        PrimitiveType::Long => {
            let mut v = Vec::with_capacity(array_length);
            for _ in 0..array_length {
                v.push(reader.read_i64()?);
            }
            PrimitiveArrayData::Long(v)
        }
    };

    let payload = array_length as u64 * element_type.byte_size() as u64;
    Ok(PrimitiveArrayRecord {
        id,
        stack_trace_serial_number,
        elements,
        body_length: id_size as u64 + 4 + 4 + 1 + payload,
    })
}
