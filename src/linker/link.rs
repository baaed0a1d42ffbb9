//! Cross-reference linker.
//!
//! Consumes the decoded records and builds every lookup index in dependency
//! order: strings first (every name resolves through them), then classes,
//! frames and traces, then the merged heap sub-records, the shared instance
//! index, the field-decoding pass and finally thread discovery.

use crate::parser::header::HprofHeader;
use crate::parser::heap_dump::{
    ClassDumpRecord, GcRootRecord, HeapDumpInfoRecord, InstanceDumpRecord, MemberField,
    ObjectArrayRecord, PrimitiveArrayNoDataRecord, PrimitiveArrayRecord, SubRecord,
};
use crate::parser::reader::{ByteReader, Id};
use crate::parser::records::{RecordsByKind, StringRecord};
use crate::parser::values::{read_value, ValueHolder};
use crate::utils::error::HprofError;
use log::debug;
use std::collections::HashMap;

use super::model::*;

/// All cross-reference indices derived from one dump.
///
/// Built once per parse and read-only afterwards. Identifier-keyed maps
/// share one namespace: classes, objects and arrays all live in
/// `instances`.
#[derive(Debug, Default, Clone)]
pub struct LinkedRecords {
    pub strings: HashMap<Id, StringRecord>,
    pub loaded_classes: HashMap<Id, LoadedClass>,
    pub loaded_classes_by_serial: HashMap<u32, LoadedClass>,
    pub stack_frames: HashMap<Id, StackFrame>,
    pub stack_traces: HashMap<u32, StackTrace>,
    pub gc_roots: HashMap<Id, GcRootRecord>,
    pub instances: HashMap<Id, Instance>,
    /// Object instances grouped by resolved class name.
    pub instances_by_class_name: HashMap<String, Vec<Id>>,
    pub heap_dump_info: HashMap<Id, HeapDumpInfo>,
    pub threads_by_serial: HashMap<u32, ActiveThread>,
    pub threads: HashMap<Id, ActiveThread>,
}

impl LinkedRecords {
    pub fn query_string(&self, id: Id) -> Option<&StringRecord> {
        self.strings.get(&id)
    }

    pub fn query_loaded_class(&self, id: Id) -> Option<&LoadedClass> {
        self.loaded_classes.get(&id)
    }

    pub fn query_loaded_class_by_serial(&self, serial: u32) -> Option<&LoadedClass> {
        self.loaded_classes_by_serial.get(&serial)
    }

    pub fn query_stack_frame(&self, id: Id) -> Option<&StackFrame> {
        self.stack_frames.get(&id)
    }

    pub fn query_stack_trace_by_serial(&self, serial: u32) -> Option<&StackTrace> {
        self.stack_traces.get(&serial)
    }

    pub fn query_root(&self, id: Id) -> Option<&GcRootRecord> {
        self.gc_roots.get(&id)
    }

    pub fn query_instance(&self, id: Id) -> Option<&Instance> {
        self.instances.get(&id)
    }

    pub fn query_object_instances_by_class_name(&self, class_name: &str) -> Option<&[Id]> {
        self.instances_by_class_name
            .get(class_name)
            .map(|v| v.as_slice())
    }

    pub fn query_heap_dump_info(&self, heap_id: Id) -> Option<&HeapDumpInfo> {
        self.heap_dump_info.get(&heap_id)
    }

    pub fn query_thread_by_serial(&self, serial: u32) -> Option<&ActiveThread> {
        self.threads_by_serial.get(&serial)
    }

    pub fn query_thread(&self, id: Id) -> Option<&ActiveThread> {
        self.threads.get(&id)
    }

    pub fn is_thread_instance(&self, id: Id) -> bool {
        self.threads.contains_key(&id)
    }

    fn string_text(&self, id: Id) -> Option<String> {
        self.strings.get(&id).map(|s| s.text.clone())
    }
}

/// Heap sub-records merged across every segment, grouped by kind.
/// Segment boundaries are erased here: all segments of a file contribute
/// to one logical heap.
#[derive(Debug, Default)]
struct MergedSubRecords {
    roots: Vec<GcRootRecord>,
    class_dumps: Vec<ClassDumpRecord>,
    instance_dumps: Vec<InstanceDumpRecord>,
    object_arrays: Vec<ObjectArrayRecord>,
    primitive_arrays: Vec<PrimitiveArrayRecord>,
    primitive_arrays_no_data: Vec<PrimitiveArrayNoDataRecord>,
    heap_dump_infos: Vec<HeapDumpInfoRecord>,
}

/// Build every index from the decoded records.
///
/// # Errors
/// The field-decoding pass re-runs the value codec over instance blobs, so
/// it can surface `TruncatedInput` (blob shorter than its schema) or
/// `UnknownValueType` (corrupt member type code). Everything else links
/// best-effort with `None` for dangling references.
pub fn link_records(
    records: &RecordsByKind,
    header: &HprofHeader,
) -> Result<LinkedRecords, HprofError> {
    let mut linked = LinkedRecords::default();

    // 1. Strings, keyed by id. Everything downstream names things through
    // this table.
    for r in &records.strings {
        linked.strings.insert(r.id, r.clone());
    }

    // 2. Loaded classes, keyed by id and by class serial number.
    for r in &records.load_classes {
        let loaded = LoadedClass {
            class_serial_number: r.class_serial_number,
            id: r.id,
            stack_trace_serial_number: r.stack_trace_serial_number,
            class_name: linked.string_text(r.class_name_string_id),
        };
        linked
            .loaded_classes_by_serial
            .insert(r.class_serial_number, loaded.clone());
        linked.loaded_classes.insert(r.id, loaded);
    }

    // 3. Stack frames, then stack traces. Unresolved frame ids are silently
    // dropped from a trace's frame list.
    for r in &records.stack_frames {
        let frame = StackFrame {
            id: r.id,
            method_name: linked.string_text(r.method_name_string_id),
            method_signature: linked.string_text(r.method_signature_string_id),
            source_file_name: linked.string_text(r.source_file_name_string_id),
            class: linked
                .loaded_classes_by_serial
                .get(&r.class_serial_number)
                .cloned(),
            line_number: r.line_number,
        };
        linked.stack_frames.insert(r.id, frame);
    }
    for r in &records.stack_traces {
        let trace = StackTrace {
            stack_trace_serial_number: r.stack_trace_serial_number,
            thread_serial_number: r.thread_serial_number,
            frames: r
                .stack_frame_ids
                .iter()
                .filter_map(|id| linked.stack_frames.get(id).cloned())
                .collect(),
        };
        linked
            .stack_traces
            .insert(trace.stack_trace_serial_number, trace);
    }

    // 4. Merge every segment's sub-records by kind.
    let merged = merge_sub_records(records);

    // 5. GC roots, keyed by the rooted id across all sixteen kinds.
    for r in &merged.roots {
        linked.gc_roots.insert(r.id(), r.clone());
    }

    build_instances(&mut linked, &merged);

    // 7. Heap dump info, keyed by heap id.
    for r in &merged.heap_dump_infos {
        let info = HeapDumpInfo {
            heap_id: r.heap_id,
            description: linked.string_text(r.string_id),
        };
        linked.heap_dump_info.insert(r.heap_id, info);
    }

    decode_instance_fields(&mut linked, header)?;
    discover_threads(&mut linked, &merged);

    debug!(
        "Linked {} instances, {} classes, {} roots, {} threads",
        linked.instances.len(),
        linked.loaded_classes.len(),
        linked.gc_roots.len(),
        linked.threads_by_serial.len()
    );

    Ok(linked)
}

fn merge_sub_records(records: &RecordsByKind) -> MergedSubRecords {
    let mut merged = MergedSubRecords::default();
    for dump in &records.heap_dumps {
        for sub in &dump.sub_records {
            match sub {
                SubRecord::GcRoot(r) => merged.roots.push(r.clone()),
                SubRecord::ClassDump(r) => merged.class_dumps.push(r.clone()),
                SubRecord::InstanceDump(r) => merged.instance_dumps.push(r.clone()),
                SubRecord::ObjectArray(r) => merged.object_arrays.push(r.clone()),
                SubRecord::PrimitiveArray(r) => merged.primitive_arrays.push(r.clone()),
                SubRecord::PrimitiveArrayNoData(r) => {
                    merged.primitive_arrays_no_data.push(r.clone())
                }
                SubRecord::HeapDumpInfo(r) => merged.heap_dump_infos.push(r.clone()),
            }
        }
    }
    merged
}

/// Pass 6: the shared instance index, built in this exact order because
/// later steps assume earlier entries may already exist:
/// object instances, then class instances (classloader resolves against
/// the index as populated so far), then primitive arrays, then object
/// arrays in two internal passes.
fn build_instances(linked: &mut LinkedRecords, merged: &MergedSubRecords) {
    // 6a. Object instances; simultaneously grouped by class name.
    for r in &merged.instance_dumps {
        let class = linked.loaded_classes.get(&r.class_id).cloned();
        if let Some(name) = class.as_ref().and_then(|c| c.class_name.clone()) {
            linked
                .instances_by_class_name
                .entry(name)
                .or_default()
                .push(r.id);
        }
        linked.instances.insert(
            r.id,
            Instance::Object(ObjectInstance {
                id: r.id,
                stack_trace_serial_number: r.stack_trace_serial_number,
                class,
                raw_field_values: r.field_values.clone(),
                fields: Vec::new(),
            }),
        );
    }

    // 6b. Class instances. The classloader link only resolves if the
    // loader is already indexed at this point - replicated single-pass
    // semantics, see DESIGN.md.
    for r in &merged.class_dumps {
        let class_loader = if linked.instances.contains_key(&r.class_loader_id) {
            Some(r.class_loader_id)
        } else {
            None
        };
        let class_instance = ClassInstance {
            id: r.id,
            stack_trace_serial_number: r.stack_trace_serial_number,
            class: linked.loaded_classes.get(&r.id).cloned(),
            super_class: linked.loaded_classes.get(&r.super_class_id).cloned(),
            class_loader,
            signers_id: r.signers_id,
            protection_domain_id: r.protection_domain_id,
            instance_size: r.instance_size,
            const_fields: r.const_fields.clone(),
            static_fields: r
                .static_fields
                .iter()
                .map(|f| {
                    let mut f = f.clone();
                    f.name = linked.string_text(f.name_string_id);
                    f
                })
                .collect(),
            member_fields: r
                .member_fields
                .iter()
                .map(|f| {
                    let mut f = f.clone();
                    f.name = linked.string_text(f.name_string_id);
                    f
                })
                .collect(),
        };
        linked.instances.insert(r.id, Instance::Class(class_instance));
    }

    // 6c. Primitive arrays, verbatim.
    for r in &merged.primitive_arrays {
        linked.instances.insert(
            r.id,
            Instance::PrimitiveArray(PrimitiveArrayInstance {
                id: r.id,
                stack_trace_serial_number: r.stack_trace_serial_number,
                elements: r.elements.clone(),
            }),
        );
    }

    // 6d. Object arrays: create every array first so element ids can
    // resolve to other arrays, then resolve elements against the complete
    // index. A missing element id is a null slot, not an error.
    for r in &merged.object_arrays {
        let array_instance = ObjectArrayInstance {
            id: r.id,
            stack_trace_serial_number: r.stack_trace_serial_number,
            array_length: r.array_length,
            array_class: linked.loaded_classes.get(&r.array_class_id).cloned(),
            elements: Vec::new(),
        };
        linked
            .instances
            .insert(r.id, Instance::ObjectArray(array_instance));
    }
    for r in &merged.object_arrays {
        let elements: Vec<Option<Id>> = r
            .element_ids
            .iter()
            .map(|id| linked.instances.contains_key(id).then_some(*id))
            .collect();
        if let Some(Instance::ObjectArray(arr)) = linked.instances.get_mut(&r.id) {
            arr.elements = elements;
        }
    }
}

/// Pass 8: decode every object instance's raw field blob against the
/// member-field schemas collected along its superclass chain - declaring
/// class first, then each ancestor, the order instance dumps serialize
/// fields in. A class missing from the index ends the walk early, leaving
/// a partial field set.
fn decode_instance_fields(
    linked: &mut LinkedRecords,
    header: &HprofHeader,
) -> Result<(), HprofError> {
    let mut decoded: Vec<(Id, Vec<MemberFieldAndValue>)> = Vec::new();

    for instance in linked.instances.values() {
        let obj = match instance {
            Instance::Object(obj) => obj,
            _ => continue,
        };

        let mut schema: Vec<&MemberField> = Vec::new();
        let mut class_id = obj.class.as_ref().map(|c| c.id);
        while let Some(id) = class_id {
            match linked.instances.get(&id) {
                Some(Instance::Class(c)) => {
                    schema.extend(c.member_fields.iter());
                    class_id = c.super_class.as_ref().map(|s| s.id);
                }
                _ => break,
            }
        }
        if schema.is_empty() {
            continue;
        }

        let mut reader = ByteReader::new(&obj.raw_field_values);
        let mut fields = Vec::with_capacity(schema.len());
        for field in schema {
            let value = read_value(&mut reader, field.type_code, header.identifier_byte_size)?;
            fields.push(MemberFieldAndValue {
                field: field.clone(),
                value,
            });
        }
        decoded.push((obj.id, fields));
    }

    for (id, fields) in decoded {
        if let Some(Instance::Object(obj)) = linked.instances.get_mut(&id) {
            obj.fields = fields;
        }
    }
    Ok(())
}

/// Pass 9: thread discovery. Java-frame roots group by thread serial; a
/// thread-object root registers a thread when its instance is an object
/// carrying a reference-typed `name` member field. Any missing link in the
/// name chain leaves the name `None` rather than failing the pass.
fn discover_threads(linked: &mut LinkedRecords, merged: &MergedSubRecords) {
    let mut frames_by_serial: HashMap<u32, Vec<ActiveThreadFrame>> = HashMap::new();
    for r in &merged.roots {
        if let GcRootRecord::JavaFrame {
            id,
            thread_serial_number,
            frame_number,
            ..
        } = r
        {
            frames_by_serial
                .entry(*thread_serial_number)
                .or_default()
                .push(ActiveThreadFrame {
                    id: *id,
                    thread_serial_number: *thread_serial_number,
                    frame_number: *frame_number,
                });
        }
    }

    for r in &merged.roots {
        let (id, thread_serial_number, frame_number) = match r {
            GcRootRecord::ThreadObject {
                id,
                thread_serial_number,
                frame_number,
                ..
            } => (*id, *thread_serial_number, *frame_number),
            _ => continue,
        };
        let obj = match linked.instances.get(&id) {
            Some(Instance::Object(obj)) => obj,
            _ => continue,
        };
        let name_value = match obj.member_field("name") {
            Some(f) if matches!(f.value, ValueHolder::Reference { .. }) => f.value.clone(),
            _ => continue,
        };
        let thread = ActiveThread {
            id,
            thread_serial_number,
            frame_number,
            name: reference_as_string(&name_value, &linked.instances),
            frames: frames_by_serial
                .get(&thread_serial_number)
                .cloned()
                .unwrap_or_default(),
        };
        linked
            .threads_by_serial
            .insert(thread_serial_number, thread.clone());
        linked.threads.insert(id, thread);
    }
}

/// Follow a reference value to a string-backed object: the target's `value`
/// member field must reference a byte array, which decodes as UTF-8. Any
/// break in the chain yields `None`.
pub fn reference_as_string(
    value: &ValueHolder,
    instances: &HashMap<Id, Instance>,
) -> Option<String> {
    use crate::parser::heap_dump::PrimitiveArrayData;

    let id = value.reference_id()?;
    let obj = match instances.get(&id) {
        Some(Instance::Object(obj)) => obj,
        _ => return None,
    };
    let backing_id = obj.member_field("value")?.value.reference_id()?;
    match instances.get(&backing_id) {
        Some(Instance::PrimitiveArray(arr)) => match &arr.elements {
            PrimitiveArrayData::Byte(bytes) => {
                let raw: Vec<u8> = bytes.iter().map(|b| *b as u8).collect();
                Some(String::from_utf8_lossy(&raw).into_owned())
            }
            _ => None,
        },
        _ => None,
    }
}
