mod common;

use common::{DumpBuilder, SegmentBuilder, ValueSpec, TEST_VERSION};
use hprof_studio::output::{build_summary, read_summary, write_summary};
use hprof_studio::parse_hprof_bytes;

const REF: u8 = 2;

fn fixture() -> Vec<u8> {
    let mut builder = DumpBuilder::new(8);
    builder.string(1, "com.example.Widget");
    builder.string(2, "peer");
    builder.string(3, "com.example.Gadget");
    builder.load_class(1, 0x100, 1);
    builder.load_class(2, 0x110, 3);
    builder.record(0x0e, &[0x01]); // unknown top-level record
    builder.heap_dump(
        SegmentBuilder::new(8)
            .class_dump(0x100, 0, 0, 8, &[], &[(2, REF)])
            .class_dump(0x110, 0, 0, 0, &[], &[])
            .instance_dump(0x200, 0x100, &[ValueSpec::Ref(0x201)])
            .instance_dump(0x201, 0x100, &[ValueSpec::Ref(0)])
            .instance_dump(0x210, 0x110, &[])
            .byte_array(0x300, &[9, 9])
            .object_array(0x400, 0x100, &[0x200])
            .root_unknown(0x200)
            .root_unknown(0x400),
    );
    builder.build()
}

#[test]
fn test_build_summary_counts() {
    let hprof = parse_hprof_bytes(&fixture()).unwrap();
    let summary = build_summary(&hprof, "fixture.hprof", 10);

    assert_eq!(summary.source, "fixture.hprof");
    assert_eq!(summary.format_version, TEST_VERSION);
    assert_eq!(summary.identifier_byte_size, 8);
    assert_eq!(summary.timestamp, common::TEST_TIMESTAMP);

    assert_eq!(summary.record_counts.strings, 3);
    assert_eq!(summary.record_counts.load_classes, 2);
    assert_eq!(summary.record_counts.heap_dump_segments, 1);
    assert_eq!(summary.record_counts.unknown, 1);

    assert_eq!(summary.heap.classes, 2);
    assert_eq!(summary.heap.object_instances, 3);
    assert_eq!(summary.heap.object_arrays, 1);
    assert_eq!(summary.heap.primitive_arrays, 1);
    assert_eq!(summary.heap.gc_roots, 2);
    assert_eq!(summary.heap.threads, 0);

    // graph: root + 0x200 + 0x201 + 0x400 (array slots reuse 0x200)
    assert_eq!(summary.graph.root_children, 2);
    assert_eq!(summary.graph.node_count, 4);
}

#[test]
fn test_top_classes_ranked_by_instance_count() {
    let hprof = parse_hprof_bytes(&fixture()).unwrap();
    let summary = build_summary(&hprof, "fixture.hprof", 10);

    assert_eq!(summary.top_classes.len(), 2);
    assert_eq!(summary.top_classes[0].class_name, "com.example.Widget");
    assert_eq!(summary.top_classes[0].instance_count, 2);
    assert_eq!(summary.top_classes[1].class_name, "com.example.Gadget");
    assert_eq!(summary.top_classes[1].instance_count, 1);

    // the cap is honored
    let capped = build_summary(&hprof, "fixture.hprof", 1);
    assert_eq!(capped.top_classes.len(), 1);
}

#[test]
fn test_summary_file_round_trip() {
    let hprof = parse_hprof_bytes(&fixture()).unwrap();
    let summary = build_summary(&hprof, "fixture.hprof", 5);

    let temp = tempfile::NamedTempFile::new().unwrap();
    write_summary(&summary, temp.path()).unwrap();
    let loaded = read_summary(temp.path()).unwrap();

    assert_eq!(loaded.version, summary.version);
    assert_eq!(loaded.heap.object_instances, summary.heap.object_instances);
    assert_eq!(loaded.graph.node_count, summary.graph.node_count);
    assert_eq!(loaded.top_classes.len(), summary.top_classes.len());
}
