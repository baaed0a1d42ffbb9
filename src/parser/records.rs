//! Top-level record decoder.
//!
//! The flat record stream after the header: every record is a 1-byte tag,
//! a 4-byte timestamp, a 4-byte body length and the body. Decoding here is
//! deliberately lenient - an unrecognized tag is preserved verbatim as an
//! unknown record and the loop continues, so a dump written by a newer
//! runtime still parses.

use crate::parser::header::HprofHeader;
use crate::parser::heap_dump::{parse_heap_dump_body, SubRecord};
use crate::parser::reader::{ByteReader, Id};
use crate::utils::config::*;
use crate::utils::error::HprofError;
use log::debug;

/// UTF-8 string record: the string table entry other records name things by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringRecord {
    pub id: Id,
    pub text: String,
    pub body_length: u64,
}

/// A class known to the runtime, keyed by both id and serial number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadClassRecord {
    pub class_serial_number: u32,
    pub id: Id,
    pub stack_trace_serial_number: u32,
    pub class_name_string_id: Id,
    pub body_length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnloadClassRecord {
    pub class_serial_number: u32,
    pub body_length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrameRecord {
    pub id: Id,
    pub method_name_string_id: Id,
    pub method_signature_string_id: Id,
    pub source_file_name_string_id: Id,
    pub class_serial_number: u32,
    /// Line number, or a negative marker (unknown / compiled / native).
    pub line_number: i32,
    pub body_length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTraceRecord {
    pub stack_trace_serial_number: u32,
    pub thread_serial_number: u32,
    pub stack_frame_ids: Vec<Id>,
    pub body_length: u64,
}

/// One heap dump segment: a container whose body is the nested sub-record
/// stream decoded by [`parse_heap_dump_body`]. Multiple segments form one
/// logical heap; identifiers are file-global, never segment-scoped.
#[derive(Debug, Clone, PartialEq)]
pub struct HeapDumpRecord {
    pub sub_records: Vec<SubRecord>,
    pub body_length: u64,
}

/// A top-level record with a tag this decoder does not know. Preserved
/// verbatim for inspection and forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRecord {
    pub tag: u8,
    pub timestamp: u32,
    pub body: Vec<u8>,
    pub body_length: u64,
}

/// Every decoded top-level record, bucketed by kind in file order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordsByKind {
    pub strings: Vec<StringRecord>,
    pub load_classes: Vec<LoadClassRecord>,
    pub unload_classes: Vec<UnloadClassRecord>,
    pub stack_frames: Vec<StackFrameRecord>,
    pub stack_traces: Vec<StackTraceRecord>,
    pub heap_dumps: Vec<HeapDumpRecord>,
    /// Count of heap-dump-end markers seen (they carry no payload).
    pub heap_dump_ends: usize,
    pub unknown: Vec<UnknownRecord>,
}

impl RecordsByKind {
    /// Total number of decoded records across all buckets.
    pub fn total(&self) -> usize {
        self.strings.len()
            + self.load_classes.len()
            + self.unload_classes.len()
            + self.stack_frames.len()
            + self.stack_traces.len()
            + self.heap_dumps.len()
            + self.heap_dump_ends
            + self.unknown.len()
    }
}

/// Decode the flat top-level record stream until the input is exhausted.
///
/// # Errors
/// Structural decode errors only (truncation, and the strict sub-record
/// errors bubbling out of segment bodies). Unknown top-level tags are not
/// errors.
pub fn parse_records(
    reader: &mut ByteReader<'_>,
    header: &HprofHeader,
) -> Result<RecordsByKind, HprofError> {
    let id_size = header.identifier_byte_size;
    let mut records = RecordsByKind::default();

    while !reader.is_exhausted() {
        let tag = reader.read_u8()?;
        let timestamp = reader.read_u32()?;
        let body_length = reader.read_u32()?;

        match tag {
            TAG_STRING_IN_UTF8 => {
                let id = reader.read_id(id_size)?;
                let text_length = (body_length as usize)
                    .checked_sub(id_size as usize)
                    .ok_or(HprofError::TruncatedInput)?;
                let text = reader.read_utf8(text_length)?;
                records.strings.push(StringRecord {
                    id,
                    text,
                    body_length: body_length as u64,
                });
            }
            TAG_LOAD_CLASS => {
                records.load_classes.push(LoadClassRecord {
                    class_serial_number: reader.read_u32()?,
                    id: reader.read_id(id_size)?,
                    stack_trace_serial_number: reader.read_u32()?,
                    class_name_string_id: reader.read_id(id_size)?,
                    body_length: 4 * 2 + id_size as u64 * 2,
                });
            }
            TAG_UNLOAD_CLASS => {
                records.unload_classes.push(UnloadClassRecord {
                    class_serial_number: reader.read_u32()?,
                    body_length: 4,
                });
            }
            TAG_STACK_FRAME => {
                records.stack_frames.push(StackFrameRecord {
                    id: reader.read_id(id_size)?,
                    method_name_string_id: reader.read_id(id_size)?,
                    method_signature_string_id: reader.read_id(id_size)?,
                    source_file_name_string_id: reader.read_id(id_size)?,
                    class_serial_number: reader.read_u32()?,
                    line_number: reader.read_i32()?,
                    body_length: 4 * 2 + id_size as u64 * 4,
                });
            }
            TAG_STACK_TRACE => {
                let stack_trace_serial_number = reader.read_u32()?;
                let thread_serial_number = reader.read_u32()?;
                let frame_count = reader.read_u32()?;
                let mut stack_frame_ids = Vec::with_capacity(frame_count as usize);
                for _ in 0..frame_count {
                    stack_frame_ids.push(reader.read_id(id_size)?);
                }
                records.stack_traces.push(StackTraceRecord {
                    stack_trace_serial_number,
                    thread_serial_number,
                    body_length: 4 * 3 + id_size as u64 * frame_count as u64,
                    stack_frame_ids,
                });
            }
            TAG_HEAP_DUMP | TAG_HEAP_DUMP_SEGMENT => {
                let body = reader.read_bytes(body_length as usize)?;
                let sub_records = parse_heap_dump_body(body, id_size)?;
                records.heap_dumps.push(HeapDumpRecord {
                    sub_records,
                    body_length: body_length as u64,
                });
            }
            TAG_HEAP_DUMP_END => {
                records.heap_dump_ends += 1;
            }
            other => {
                let body = reader.read_bytes(body_length as usize)?.to_vec();
                debug!(
                    "Bucketing unknown top-level record: tag 0x{:02x}, {} body bytes",
                    other, body_length
                );
                records.unknown.push(UnknownRecord {
                    tag: other,
                    timestamp,
                    body,
                    body_length: body_length as u64,
                });
            }
        }
    }

    debug!("Parsed {} top-level records", records.total());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::header::HprofVersion;

    fn test_header() -> HprofHeader {
        HprofHeader {
            timestamp: 0,
            version: HprofVersion::Jdk102,
            identifier_byte_size: 4,
        }
    }

    fn push_record(bytes: &mut Vec<u8>, tag: u8, body: &[u8]) {
        bytes.push(tag);
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(body);
    }

    #[test]
    fn test_string_and_load_class() {
        let mut bytes = Vec::new();
        let mut body = 5u32.to_be_bytes().to_vec();
        body.extend_from_slice(b"Foo");
        push_record(&mut bytes, TAG_STRING_IN_UTF8, &body);

        let mut body = Vec::new();
        body.extend_from_slice(&1u32.to_be_bytes()); // class serial
        body.extend_from_slice(&0x100u32.to_be_bytes()); // class id
        body.extend_from_slice(&0u32.to_be_bytes()); // stack trace serial
        body.extend_from_slice(&5u32.to_be_bytes()); // name string id
        push_record(&mut bytes, TAG_LOAD_CLASS, &body);

        let records = parse_records(&mut ByteReader::new(&bytes), &test_header()).unwrap();
        assert_eq!(records.strings[0].id, 5);
        assert_eq!(records.strings[0].text, "Foo");
        assert_eq!(records.load_classes[0].class_name_string_id, 5);
        assert_eq!(records.load_classes[0].id, 0x100);
    }

    #[test]
    fn test_unknown_tag_is_bucketed() {
        let mut bytes = Vec::new();
        push_record(&mut bytes, 0x0e, &[0xde, 0xad]);
        push_record(&mut bytes, TAG_UNLOAD_CLASS, &3u32.to_be_bytes());

        let records = parse_records(&mut ByteReader::new(&bytes), &test_header()).unwrap();
        assert_eq!(records.unknown.len(), 1);
        assert_eq!(records.unknown[0].tag, 0x0e);
        assert_eq!(records.unknown[0].body, vec![0xde, 0xad]);
        // parsing continued past the unknown record
        assert_eq!(records.unload_classes[0].class_serial_number, 3);
    }

    #[test]
    fn test_stack_trace_frame_ids() {
        let mut body = Vec::new();
        body.extend_from_slice(&9u32.to_be_bytes()); // trace serial
        body.extend_from_slice(&3u32.to_be_bytes()); // thread serial
        body.extend_from_slice(&2u32.to_be_bytes()); // frame count
        body.extend_from_slice(&0xaau32.to_be_bytes());
        body.extend_from_slice(&0xbbu32.to_be_bytes());
        let mut bytes = Vec::new();
        push_record(&mut bytes, TAG_STACK_TRACE, &body);

        let records = parse_records(&mut ByteReader::new(&bytes), &test_header()).unwrap();
        let trace = &records.stack_traces[0];
        assert_eq!(trace.stack_trace_serial_number, 9);
        assert_eq!(trace.thread_serial_number, 3);
        assert_eq!(trace.stack_frame_ids, vec![0xaa, 0xbb]);
    }

    #[test]
    fn test_truncated_record_header() {
        let bytes = vec![TAG_STRING_IN_UTF8, 0x00];
        assert!(matches!(
            parse_records(&mut ByteReader::new(&bytes), &test_header()),
            Err(HprofError::TruncatedInput)
        ));
    }
}
