//! Shared test support: byte-level builders for synthetic hprof dumps.
//!
//! The crate deliberately has no encoder, so tests assemble dump images by
//! hand: big-endian fields, tag-prefixed records, nested segment bodies.

#![allow(dead_code)]

use hprof_studio::utils::config::*;

/// Fixed capture timestamp used by every fixture.
pub const TEST_TIMESTAMP: i64 = 1_700_000_000_000;

/// Default version string used by fixtures.
pub const TEST_VERSION: &str = "JAVA PROFILE 1.0.2";

fn push_id(bytes: &mut Vec<u8>, id: u64, id_size: u32) {
    match id_size {
        1 => bytes.push(id as u8),
        2 => bytes.extend_from_slice(&(id as u16).to_be_bytes()),
        4 => bytes.extend_from_slice(&(id as u32).to_be_bytes()),
        8 => bytes.extend_from_slice(&id.to_be_bytes()),
        other => panic!("unsupported id size {other}"),
    }
}

/// A typed value for static field tables and instance blobs.
#[derive(Debug, Clone, Copy)]
pub enum ValueSpec {
    Ref(u64),
    Bool(bool),
    Int(i32),
    Long(i64),
}

impl ValueSpec {
    pub fn type_code(&self) -> u8 {
        match self {
            ValueSpec::Ref(_) => REFERENCE_TYPE_CODE,
            ValueSpec::Bool(_) => 4,
            ValueSpec::Int(_) => 10,
            ValueSpec::Long(_) => 11,
        }
    }

    fn encode(&self, bytes: &mut Vec<u8>, id_size: u32) {
        match self {
            ValueSpec::Ref(id) => push_id(bytes, *id, id_size),
            ValueSpec::Bool(b) => bytes.push(*b as u8),
            ValueSpec::Int(v) => bytes.extend_from_slice(&v.to_be_bytes()),
            ValueSpec::Long(v) => bytes.extend_from_slice(&v.to_be_bytes()),
        }
    }
}

/// Builds a whole dump file: header plus top-level records.
pub struct DumpBuilder {
    bytes: Vec<u8>,
    id_size: u32,
}

impl DumpBuilder {
    pub fn new(id_size: u32) -> Self {
        Self::with_header(TEST_VERSION, id_size, TEST_TIMESTAMP)
    }

    pub fn with_header(version: &str, id_size: u32, timestamp: i64) -> Self {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(version.as_bytes());
        bytes.push(0x00);
        bytes.extend_from_slice(&id_size.to_be_bytes());
        bytes.extend_from_slice(&timestamp.to_be_bytes());
        Self { bytes, id_size }
    }

    pub fn id_size(&self) -> u32 {
        self.id_size
    }

    /// Append one top-level record with the given tag and body.
    pub fn record(&mut self, tag: u8, body: &[u8]) -> &mut Self {
        self.bytes.push(tag);
        self.bytes.extend_from_slice(&0u32.to_be_bytes()); // timestamp
        self.bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        self.bytes.extend_from_slice(body);
        self
    }

    pub fn string(&mut self, id: u64, text: &str) -> &mut Self {
        let mut body = Vec::new();
        push_id(&mut body, id, self.id_size);
        body.extend_from_slice(text.as_bytes());
        self.record(TAG_STRING_IN_UTF8, &body)
    }

    pub fn load_class(&mut self, serial: u32, id: u64, name_string_id: u64) -> &mut Self {
        let mut body = Vec::new();
        body.extend_from_slice(&serial.to_be_bytes());
        push_id(&mut body, id, self.id_size);
        body.extend_from_slice(&0u32.to_be_bytes()); // stack trace serial
        push_id(&mut body, name_string_id, self.id_size);
        self.record(TAG_LOAD_CLASS, &body)
    }

    pub fn stack_frame(
        &mut self,
        id: u64,
        method_name_id: u64,
        signature_id: u64,
        source_file_id: u64,
        class_serial: u32,
        line: i32,
    ) -> &mut Self {
        let mut body = Vec::new();
        push_id(&mut body, id, self.id_size);
        push_id(&mut body, method_name_id, self.id_size);
        push_id(&mut body, signature_id, self.id_size);
        push_id(&mut body, source_file_id, self.id_size);
        body.extend_from_slice(&class_serial.to_be_bytes());
        body.extend_from_slice(&line.to_be_bytes());
        self.record(TAG_STACK_FRAME, &body)
    }

    pub fn stack_trace(&mut self, serial: u32, thread_serial: u32, frame_ids: &[u64]) -> &mut Self {
        let mut body = Vec::new();
        body.extend_from_slice(&serial.to_be_bytes());
        body.extend_from_slice(&thread_serial.to_be_bytes());
        body.extend_from_slice(&(frame_ids.len() as u32).to_be_bytes());
        for id in frame_ids {
            push_id(&mut body, *id, self.id_size);
        }
        self.record(TAG_STACK_TRACE, &body)
    }

    pub fn heap_dump(&mut self, segment: SegmentBuilder) -> &mut Self {
        let body = segment.build();
        self.record(TAG_HEAP_DUMP_SEGMENT, &body)
    }

    pub fn build(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

/// Builds one heap dump segment body out of sub-records.
pub struct SegmentBuilder {
    bytes: Vec<u8>,
    id_size: u32,
}

impl SegmentBuilder {
    pub fn new(id_size: u32) -> Self {
        Self {
            bytes: Vec::new(),
            id_size,
        }
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn root_unknown(mut self, id: u64) -> Self {
        self.bytes.push(SUB_TAG_ROOT_UNKNOWN);
        push_id(&mut self.bytes, id, self.id_size);
        self
    }

    pub fn root_jni_global(mut self, id: u64, ref_id: u64) -> Self {
        self.bytes.push(SUB_TAG_ROOT_JNI_GLOBAL);
        push_id(&mut self.bytes, id, self.id_size);
        push_id(&mut self.bytes, ref_id, self.id_size);
        self
    }

    pub fn root_sticky_class(mut self, id: u64) -> Self {
        self.bytes.push(SUB_TAG_ROOT_STICKY_CLASS);
        push_id(&mut self.bytes, id, self.id_size);
        self
    }

    pub fn root_thread_object(mut self, id: u64, thread_serial: u32, frame_number: u32) -> Self {
        self.bytes.push(SUB_TAG_ROOT_THREAD_OBJECT);
        push_id(&mut self.bytes, id, self.id_size);
        self.bytes.extend_from_slice(&thread_serial.to_be_bytes());
        self.bytes.extend_from_slice(&frame_number.to_be_bytes());
        self
    }

    pub fn root_java_frame(mut self, id: u64, thread_serial: u32, frame_number: u32) -> Self {
        self.bytes.push(SUB_TAG_ROOT_JAVA_FRAME);
        push_id(&mut self.bytes, id, self.id_size);
        self.bytes.extend_from_slice(&thread_serial.to_be_bytes());
        self.bytes.extend_from_slice(&frame_number.to_be_bytes());
        self
    }

    /// Class dump with empty const pool. Static fields carry typed values;
    /// member fields are (name string id, type code) schemas.
    pub fn class_dump(
        mut self,
        id: u64,
        super_class_id: u64,
        class_loader_id: u64,
        instance_size: u32,
        static_fields: &[(u64, ValueSpec)],
        member_fields: &[(u64, u8)],
    ) -> Self {
        self.bytes.push(SUB_TAG_CLASS_DUMP);
        push_id(&mut self.bytes, id, self.id_size);
        self.bytes.extend_from_slice(&0u32.to_be_bytes()); // stack trace serial
        push_id(&mut self.bytes, super_class_id, self.id_size);
        push_id(&mut self.bytes, class_loader_id, self.id_size);
        push_id(&mut self.bytes, 0, self.id_size); // signers
        push_id(&mut self.bytes, 0, self.id_size); // protection domain
        push_id(&mut self.bytes, 0, self.id_size); // reserved
        push_id(&mut self.bytes, 0, self.id_size); // reserved
        self.bytes.extend_from_slice(&instance_size.to_be_bytes());
        self.bytes.extend_from_slice(&0u16.to_be_bytes()); // const pool
        self.bytes
            .extend_from_slice(&(static_fields.len() as u16).to_be_bytes());
        for (name_id, value) in static_fields {
            push_id(&mut self.bytes, *name_id, self.id_size);
            self.bytes.push(value.type_code());
            value.encode(&mut self.bytes, self.id_size);
        }
        self.bytes
            .extend_from_slice(&(member_fields.len() as u16).to_be_bytes());
        for (name_id, type_code) in member_fields {
            push_id(&mut self.bytes, *name_id, self.id_size);
            self.bytes.push(*type_code);
        }
        self
    }

    /// Instance dump whose field blob is the concatenation of the given
    /// values, encoded in schema order.
    pub fn instance_dump(mut self, id: u64, class_id: u64, values: &[ValueSpec]) -> Self {
        let mut blob = Vec::new();
        for value in values {
            value.encode(&mut blob, self.id_size);
        }
        self.bytes.push(SUB_TAG_INSTANCE_DUMP);
        push_id(&mut self.bytes, id, self.id_size);
        self.bytes.extend_from_slice(&0u32.to_be_bytes()); // stack trace serial
        push_id(&mut self.bytes, class_id, self.id_size);
        self.bytes.extend_from_slice(&(blob.len() as u32).to_be_bytes());
        self.bytes.extend_from_slice(&blob);
        self
    }

    pub fn object_array(mut self, id: u64, array_class_id: u64, element_ids: &[u64]) -> Self {
        self.bytes.push(SUB_TAG_OBJECT_ARRAY_DUMP);
        push_id(&mut self.bytes, id, self.id_size);
        self.bytes.extend_from_slice(&0u32.to_be_bytes()); // stack trace serial
        self.bytes
            .extend_from_slice(&(element_ids.len() as u32).to_be_bytes());
        push_id(&mut self.bytes, array_class_id, self.id_size);
        for element in element_ids {
            push_id(&mut self.bytes, *element, self.id_size);
        }
        self
    }

    pub fn byte_array(mut self, id: u64, data: &[u8]) -> Self {
        self.bytes.push(SUB_TAG_PRIMITIVE_ARRAY_DUMP);
        push_id(&mut self.bytes, id, self.id_size);
        self.bytes.extend_from_slice(&0u32.to_be_bytes()); // stack trace serial
        self.bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
        self.bytes.push(8); // byte element type
        self.bytes.extend_from_slice(data);
        self
    }

    pub fn int_array(mut self, id: u64, values: &[i32]) -> Self {
        self.bytes.push(SUB_TAG_PRIMITIVE_ARRAY_DUMP);
        push_id(&mut self.bytes, id, self.id_size);
        self.bytes.extend_from_slice(&0u32.to_be_bytes()); // stack trace serial
        self.bytes
            .extend_from_slice(&(values.len() as u32).to_be_bytes());
        self.bytes.push(10); // int element type
        for value in values {
            self.bytes.extend_from_slice(&value.to_be_bytes());
        }
        self
    }

    pub fn heap_dump_info(mut self, heap_id: u64, string_id: u64) -> Self {
        self.bytes.push(SUB_TAG_HEAP_DUMP_INFO);
        push_id(&mut self.bytes, heap_id, self.id_size);
        push_id(&mut self.bytes, string_id, self.id_size);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
