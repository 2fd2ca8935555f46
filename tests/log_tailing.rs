//! Log tailing across a growing stream

use batchrun::mock::MockBatch;
use batchrun::tail::{LogCursor, LogTailer};
use batchrun_protocol::{OutputLogEvent, DEFAULT_LOG_GROUP};

fn push(batch: &MockBatch, events: &[(i64, &str)]) {
    for (timestamp, message) in events {
        batch.push_log_event("job/default/1", OutputLogEvent::new(*timestamp, *message));
    }
}

#[test]
fn test_growing_stream_delivers_every_event_once() {
    let batch = MockBatch::new().with_page_size(3);
    let tailer = LogTailer::new(&batch, DEFAULT_LOG_GROUP);
    let mut cursor = LogCursor::default();
    let mut out = Vec::new();

    push(&batch, &[(100, "a"), (110, "b"), (120, "c"), (130, "d")]);
    let report = tailer.tail("job/default/1", &cursor, &mut out).unwrap();
    cursor = cursor.advance(&report);
    assert_eq!(report.delivered, 4);

    // Nothing new: an idle poll writes nothing and keeps the cursor.
    let idle = tailer.tail("job/default/1", &cursor, &mut out).unwrap();
    assert_eq!(idle.delivered, 0);
    assert_eq!(cursor.advance(&idle), cursor);

    push(&batch, &[(140, "e"), (150, "f")]);
    let report = tailer.tail("job/default/1", &cursor, &mut out).unwrap();
    cursor = cursor.advance(&report);

    assert_eq!(String::from_utf8(out).unwrap(), "a\nb\nc\nd\ne\nf\n");
    assert_eq!(cursor.start_time(), 151);
}

#[test]
fn test_out_of_order_ingestion_is_sorted() {
    let batch = MockBatch::new();
    push(&batch, &[(300, "third"), (100, "first"), (200, "second")]);
    let tailer = LogTailer::new(&batch, DEFAULT_LOG_GROUP);
    let mut out = Vec::new();

    let report = tailer
        .tail("job/default/1", &LogCursor::default(), &mut out)
        .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "first\nsecond\nthird\n");
    assert_eq!(report.last_timestamp, Some(300));
}

#[test]
fn test_missing_stream_is_a_fetch_error() {
    let batch = MockBatch::new();
    let tailer = LogTailer::new(&batch, DEFAULT_LOG_GROUP);
    let mut out = Vec::new();

    let err = tailer
        .tail("job/default/unknown", &LogCursor::default(), &mut out)
        .unwrap_err();
    assert!(err.to_string().contains("ResourceNotFoundException"));
}
