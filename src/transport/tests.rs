//! Unit tests for the synchronous transport core.

use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use bytes::Bytes;
use rstest::{fixture, rstest};

use super::FrameTransport;
use crate::{
    config::TransportConfig,
    error::{DropReason, TransportError},
    fragment::{OrphanPolicy, ReassemblyState},
    frame::{MAX_PAYLOAD, MessageId, MultipartKind, Role},
    hooks::TransportHooks,
};

const CMD: MessageId = MessageId::new(0x94);
const PING: MessageId = MessageId::new(0x16);

type Seen = Arc<Mutex<Vec<(MessageId, Vec<u8>)>>>;

fn record(transport: &mut FrameTransport, id: MessageId) -> Seen {
    let seen: Seen = Arc::default();
    let sink = Arc::clone(&seen);
    transport
        .register_handler(id, move |payload| {
            sink.lock().expect("lock").push((id, payload.to_vec()));
        })
        .expect("register handler");
    seen
}

fn record_drops(transport: &mut FrameTransport) -> Arc<Mutex<Vec<DropReason>>> {
    let drops: Arc<Mutex<Vec<DropReason>>> = Arc::default();
    let sink = Arc::clone(&drops);
    transport.set_hooks(TransportHooks::on_drop(move |reason| {
        sink.lock().expect("lock").push(*reason);
    }));
    drops
}

fn drain(transport: &mut FrameTransport) -> Vec<Bytes> {
    std::iter::from_fn(|| transport.poll_outgoing()).collect()
}

fn patterned(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| u8::try_from(i % 241).unwrap_or_default())
        .collect()
}

#[fixture]
fn central() -> FrameTransport { FrameTransport::new(TransportConfig::for_role(Role::Central)) }

#[fixture]
fn robot() -> FrameTransport { FrameTransport::new(TransportConfig::for_role(Role::Peripheral)) }

#[rstest]
fn small_send_queues_one_frame(mut central: FrameTransport) {
    assert_eq!(central.send(PING, [7_u8, 8]), 1);
    assert_eq!(central.queued_frames(), 1);
    assert_eq!(
        central.poll_outgoing(),
        Some(Bytes::from_static(&[3, 0x16, 7, 8]))
    );
    assert_eq!(central.poll_outgoing(), None);
}

#[rstest]
fn empty_payload_is_a_header_only_frame(mut central: FrameTransport) {
    central.send(PING, [0_u8; 0]);
    assert_eq!(drain(&mut central), vec![Bytes::from_static(&[1, 0x16])]);
}

#[rstest]
fn frames_leave_in_send_order(mut central: FrameTransport) {
    central.send(CMD, patterned(40));
    central.send(PING, [1_u8]);
    let ids: Vec<u8> = drain(&mut central).iter().map(|f| f[1]).collect();
    assert_eq!(ids, vec![0xF0, 0xF1, 0xF2, 0x16]);
}

#[rstest]
fn ordinary_frame_reaches_its_handler(mut robot: FrameTransport) {
    let seen = record(&mut robot, PING);
    robot.on_frame_received(&[3, 0x16, 0xAA, 0xBB]);
    assert_eq!(*seen.lock().expect("lock"), vec![(PING, vec![0xAA, 0xBB])]);
}

#[rstest]
fn size_byte_is_not_trusted_on_receive(mut robot: FrameTransport) {
    let seen = record(&mut robot, PING);
    robot.on_frame_received(&[9, 0x16, 1, 2]);
    assert_eq!(*seen.lock().expect("lock"), vec![(PING, vec![1, 2])]);
}

#[rstest]
#[case(&[])]
#[case(&[0x16])]
fn short_frames_are_dropped(mut robot: FrameTransport, #[case] frame: &[u8]) {
    let seen = record(&mut robot, PING);
    let drops = record_drops(&mut robot);
    robot.on_frame_received(frame);
    assert!(seen.lock().expect("lock").is_empty());
    assert_eq!(
        *drops.lock().expect("lock"),
        vec![DropReason::Malformed { len: frame.len() }]
    );
}

#[rstest]
fn short_frames_leave_reassembly_untouched(mut central: FrameTransport, mut robot: FrameTransport) {
    let seen = record(&mut robot, CMD);
    central.send(CMD, patterned(48));
    let frames = drain(&mut central);

    robot.on_frame_received(&frames[0]);
    robot.on_frame_received(&[0xF1]);
    robot.on_frame_received(&[]);
    for frame in &frames[1..] {
        robot.on_frame_received(frame);
    }
    assert_eq!(*seen.lock().expect("lock"), vec![(CMD, patterned(48))]);
}

#[rstest]
fn unknown_id_is_dropped(mut robot: FrameTransport) {
    let drops = record_drops(&mut robot);
    robot.on_frame_received(&[1, 0x42]);
    assert_eq!(
        *drops.lock().expect("lock"),
        vec![DropReason::Unhandled {
            id: MessageId::new(0x42)
        }]
    );
}

#[rstest]
fn default_handler_catches_unknown_ids(mut robot: FrameTransport) {
    let seen: Seen = Arc::default();
    let sink = Arc::clone(&seen);
    robot.set_default_handler(move |id, payload| {
        sink.lock().expect("lock").push((id, payload.to_vec()));
    });
    robot.on_frame_received(&[2, 0x42, 5]);
    assert_eq!(
        *seen.lock().expect("lock"),
        vec![(MessageId::new(0x42), vec![5])]
    );

    robot.clear_default_handler();
    let drops = record_drops(&mut robot);
    robot.on_frame_received(&[2, 0x42, 5]);
    assert_eq!(drops.lock().expect("lock").len(), 1);
}

#[rstest]
fn inbound_multipart_ids_are_reserved(mut robot: FrameTransport) {
    let result = robot.register_handler(MessageId::new(0xF0), |_| {});
    assert!(matches!(result, Err(TransportError::ReservedId(id)) if id.get() == 0xF0));
    // The peripheral only reserves what it receives; 0xF3 is its outbound id.
    assert!(robot.register_handler(MessageId::new(0xF3), |_| {}).is_ok());
}

#[rstest]
fn duplicate_handlers_are_rejected(mut robot: FrameTransport) {
    robot.register_handler(PING, |_| {}).expect("first");
    assert!(matches!(
        robot.register_handler(PING, |_| {}),
        Err(TransportError::DuplicateHandler(_))
    ));
    assert!(robot.unregister_handler(PING));
    assert!(!robot.has_handler(PING));
    assert!(robot.register_handler(PING, |_| {}).is_ok());
}

#[rstest]
#[case(0)]
#[case(MAX_PAYLOAD)]
#[case(MAX_PAYLOAD + 1)]
#[case(48)]
#[case(700)]
fn loopback_delivers_original_payload(
    mut central: FrameTransport,
    mut robot: FrameTransport,
    #[case] len: usize,
) {
    let seen = record(&mut robot, CMD);
    let payload = patterned(len);
    central.send(CMD, &payload);
    for frame in drain(&mut central) {
        robot.on_frame_received(&frame);
    }
    assert_eq!(*seen.lock().expect("lock"), vec![(CMD, payload)]);
    assert_eq!(robot.reassembly_state(), ReassemblyState::Idle);
}

#[rstest]
fn new_start_abandons_previous_message(mut central: FrameTransport, mut robot: FrameTransport) {
    let seen = record(&mut robot, CMD);
    let drops = record_drops(&mut robot);
    central.send(CMD, patterned(48));
    let first = drain(&mut central);
    central.send(CMD, [9_u8; 30]);
    let second = drain(&mut central);

    robot.on_frame_received(&first[0]);
    robot.on_frame_received(&first[1]);
    for frame in &second {
        robot.on_frame_received(frame);
    }

    assert_eq!(*seen.lock().expect("lock"), vec![(CMD, vec![9; 30])]);
    assert_eq!(
        *drops.lock().expect("lock"),
        vec![DropReason::Abandoned { fragments: 2 }]
    );
}

#[rstest]
fn ordinary_frame_mid_reassembly_is_dispatched_without_disturbing_it(
    mut central: FrameTransport,
    mut robot: FrameTransport,
) {
    let commands = record(&mut robot, CMD);
    let pings = record(&mut robot, PING);
    central.send(CMD, patterned(48));
    let frames = drain(&mut central);

    robot.on_frame_received(&frames[0]);
    robot.on_frame_received(&[2, 0x16, 1]);
    assert_eq!(*pings.lock().expect("lock"), vec![(PING, vec![1])]);
    assert_eq!(
        robot.reassembly_state(),
        ReassemblyState::Reassembling {
            fragments: 1,
            buffered: 18
        }
    );

    for frame in &frames[1..] {
        robot.on_frame_received(frame);
    }
    assert_eq!(*commands.lock().expect("lock"), vec![(CMD, patterned(48))]);
}

#[rstest]
fn orphan_fragments_are_discarded_by_default(mut robot: FrameTransport) {
    let seen = record(&mut robot, CMD);
    let drops = record_drops(&mut robot);
    robot.on_frame_received(&[3, 0xF1, 1, 2]);
    robot.on_frame_received(&[3, 0xF2, 3, 4]);
    assert!(seen.lock().expect("lock").is_empty());
    assert_eq!(
        *drops.lock().expect("lock"),
        vec![
            DropReason::Orphan {
                kind: MultipartKind::Continue
            },
            DropReason::Orphan {
                kind: MultipartKind::Final
            },
        ]
    );
}

#[test]
fn tolerated_orphans_rebuild_from_empty_buffer() {
    let config = TransportConfig::builder()
        .role(Role::Peripheral)
        .orphan_policy(OrphanPolicy::Tolerate)
        .build()
        .expect("valid");
    let mut robot = FrameTransport::new(config);
    let seen = record(&mut robot, CMD);

    // Body of the lone final fragment is read as [size, id, payload..].
    robot.on_frame_received(&[5, 0xF2, 3, 0x94, 0xAB, 0xCD]);
    assert_eq!(*seen.lock().expect("lock"), vec![(CMD, vec![0xAB, 0xCD])]);
}

#[rstest]
fn truncated_reassembly_is_dropped(mut robot: FrameTransport) {
    let drops = record_drops(&mut robot);
    robot.on_frame_received(&[2, 0xF0, 9]);
    robot.on_frame_received(&[1, 0xF2]);
    assert_eq!(
        *drops.lock().expect("lock"),
        vec![DropReason::Truncated { len: 1 }]
    );
}

#[rstest]
fn nested_multipart_id_is_not_reassembled_again(mut robot: FrameTransport) {
    let drops = record_drops(&mut robot);
    robot.on_frame_received(&[5, 0xF0, 3, 0xF0, 1, 2]);
    robot.on_frame_received(&[1, 0xF2]);
    assert_eq!(robot.reassembly_state(), ReassemblyState::Idle);
    assert_eq!(
        *drops.lock().expect("lock"),
        vec![DropReason::Unhandled {
            id: MessageId::new(0xF0)
        }]
    );
}

#[test]
fn oversized_reassembly_is_dropped_when_capped() {
    let config = TransportConfig::builder()
        .role(Role::Peripheral)
        .max_message_size(NonZeroUsize::new(30))
        .build()
        .expect("valid");
    let mut central = FrameTransport::default();
    let mut robot = FrameTransport::new(config);
    let seen = record(&mut robot, CMD);
    let drops = record_drops(&mut robot);

    central.send(CMD, patterned(48));
    for frame in drain(&mut central) {
        robot.on_frame_received(&frame);
    }

    assert!(seen.lock().expect("lock").is_empty());
    let drops = drops.lock().expect("lock");
    assert_eq!(drops[0], DropReason::TooLarge { attempted: 36 });
    assert!(drops[1..]
        .iter()
        .all(|reason| matches!(reason, DropReason::Orphan { .. })));
}

#[test]
fn oversized_start_reports_the_partial_it_replaced() {
    let config = TransportConfig::builder()
        .role(Role::Peripheral)
        .max_message_size(NonZeroUsize::new(10))
        .build()
        .expect("valid");
    let mut robot = FrameTransport::new(config);
    let drops = record_drops(&mut robot);

    robot.on_frame_received(&[4, 0xF0, 3, 0x94, 1]);
    let mut oversized = vec![19_u8, 0xF0];
    oversized.resize(20, 0);
    robot.on_frame_received(&oversized);

    assert_eq!(
        *drops.lock().expect("lock"),
        vec![
            DropReason::Abandoned { fragments: 1 },
            DropReason::TooLarge { attempted: 18 },
        ]
    );
    assert_eq!(robot.reassembly_state(), ReassemblyState::Idle);
}

#[test]
fn stale_partial_expires_before_next_frame() {
    let timeout = Duration::from_secs(2);
    let config = TransportConfig::builder()
        .role(Role::Peripheral)
        .reassembly_timeout(Some(timeout))
        .build()
        .expect("valid");
    let mut robot = FrameTransport::new(config);
    let seen = record(&mut robot, PING);
    let drops = record_drops(&mut robot);
    let start = Instant::now();

    let mut start_frame = vec![19_u8, 0xF0, 40, 0x94];
    start_frame.resize(20, 0);
    robot.on_frame_received_at(&start_frame, start);
    robot.on_frame_received_at(&[1, 0x16], start + timeout);

    assert_eq!(robot.reassembly_state(), ReassemblyState::Idle);
    assert_eq!(*seen.lock().expect("lock"), vec![(PING, vec![])]);
    assert_eq!(
        *drops.lock().expect("lock"),
        vec![DropReason::Expired { fragments: 1 }]
    );
}

#[rstest]
fn reset_discards_queue_and_partial(mut central: FrameTransport) {
    let drops = record_drops(&mut central);
    central.send(CMD, patterned(48));
    central.on_frame_received(&[3, 0xF3, 2, 0x16]);
    assert_eq!(central.reset(), 3);
    assert_eq!(central.queued_frames(), 0);
    assert_eq!(central.reassembly_state(), ReassemblyState::Idle);
    assert_eq!(
        *drops.lock().expect("lock"),
        vec![DropReason::Abandoned { fragments: 1 }]
    );
}
