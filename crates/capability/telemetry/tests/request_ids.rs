use plc_telemetry::{metrics, new_request_ids, record_poll_failure, record_poll_success};

#[test]
fn request_ids_are_distinct() {
    let first = new_request_ids();
    let second = new_request_ids();
    assert_ne!(first.request_id, second.request_id);
    assert_ne!(first.trace_id, second.trace_id);
    assert_ne!(first.request_id, first.trace_id);
}

#[test]
fn counters_accumulate_into_snapshot() {
    let before = metrics().snapshot();
    record_poll_success();
    record_poll_success();
    record_poll_failure();
    let after = metrics().snapshot();
    assert_eq!(after.polls_succeeded - before.polls_succeeded, 2);
    assert_eq!(after.polls_failed - before.polls_failed, 1);
}
