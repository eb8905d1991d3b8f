//! Tests for `bleframe` metrics.
//!
//! These tests verify that counters and gauges update as expected using
//! `metrics_util::debugging::DebuggingRecorder`.

mod common;

use bleframe::{
    FrameTransport,
    metrics::{FRAMES_DROPPED, FRAMES_TOTAL, MESSAGES_REASSEMBLED, QUEUE_DEPTH},
};
use bleframe_testing::{MetricsSnapshot, capture, patterned, pump};
use common::{CMD, central, robot};
use metrics_util::debugging::{DebuggingRecorder, Snapshotter};
use rstest::rstest;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

#[rstest]
fn reassembly_and_inbound_frames_are_counted(
    mut central: FrameTransport,
    mut robot: FrameTransport,
) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let seen = capture(&mut robot, CMD);
    metrics::with_local_recorder(&recorder, || {
        central.send(CMD, patterned(48));
        pump(&mut central, &mut robot);
    });

    assert_eq!(seen.take().len(), 1);
    let snapshot = MetricsSnapshot::take(&snapshotter);
    assert_eq!(snapshot.counter(FRAMES_TOTAL, &[("direction", "inbound")]), 3);
    assert_eq!(snapshot.counter(MESSAGES_REASSEMBLED, &[]), 1);
    assert_eq!(snapshot.counter(FRAMES_DROPPED, &[]), 0);
}

#[rstest]
#[case::malformed(&[0x16], "malformed")]
#[case::unhandled(&[1, 0x42], "unhandled")]
#[case::orphan(&[2, 0xF1, 0], "orphan")]
fn drops_are_labelled_by_reason(
    mut robot: FrameTransport,
    #[case] frame: &[u8],
    #[case] reason: &str,
) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || robot.on_frame_received(frame));

    let snapshot = MetricsSnapshot::take(&snapshotter);
    assert_eq!(snapshot.counter(FRAMES_DROPPED, &[("reason", reason)]), 1);
}

#[rstest]
fn abandoned_partial_is_counted(mut central: FrameTransport, mut robot: FrameTransport) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        central.send(CMD, patterned(48));
        let start = central.poll_outgoing().expect("start fragment");
        robot.on_frame_received(&start);
        robot.on_frame_received(&start);
    });

    let snapshot = MetricsSnapshot::take(&snapshotter);
    assert_eq!(snapshot.counter(FRAMES_DROPPED, &[("reason", "abandoned")]), 1);
}

#[rstest]
fn queue_depth_tracks_enqueue_and_drain(mut central: FrameTransport) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        central.send(CMD, patterned(48));
    });
    assert_eq!(MetricsSnapshot::take(&snapshotter).gauge(QUEUE_DEPTH), Some(3.0));

    metrics::with_local_recorder(&recorder, || {
        central.poll_outgoing();
    });
    assert_eq!(MetricsSnapshot::take(&snapshotter).gauge(QUEUE_DEPTH), Some(2.0));
}
