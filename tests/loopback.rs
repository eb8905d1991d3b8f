//! End-to-end framing between a central and a peripheral transport.
//!
//! Frames are moved by hand, so these tests exercise the send path,
//! reassembly and dispatch without any timing.

mod common;

use bleframe::{FrameTransport, MessageId, RawFrame, ReassemblyState, frame::MAX_PAYLOAD};
use bleframe_testing::{capture, drain, patterned, pump};
use common::{CMD, PING, central, robot};
use rstest::rstest;

#[rstest]
#[case(0)]
#[case(5)]
#[case(MAX_PAYLOAD)]
fn small_payload_is_one_plain_frame(
    mut central: FrameTransport,
    mut robot: FrameTransport,
    #[case] len: usize,
) {
    let seen = capture(&mut robot, PING);
    let payload = patterned(len);
    central.send(PING, &payload);

    let frames = drain(&mut central);
    assert_eq!(frames.len(), 1);
    let mut expected = vec![u8::try_from(len + 1).expect("fits"), PING.get()];
    expected.extend_from_slice(&payload);
    assert_eq!(frames[0].as_ref(), expected.as_slice());

    robot.on_frame_received(&frames[0]);
    assert_eq!(seen.take(), vec![payload]);
}

#[rstest]
fn fifty_byte_message_uses_three_fragments(mut central: FrameTransport, mut robot: FrameTransport) {
    let seen = capture(&mut robot, CMD);
    let payload = patterned(48);
    central.send(CMD, &payload);

    let frames = drain(&mut central);
    let ids: Vec<u8> = frames.iter().map(|frame| frame[1]).collect();
    assert_eq!(ids, vec![0xF0, 0xF1, 0xF2]);
    for frame in &frames {
        assert!(RawFrame::parse(frame).expect("parses").is_consistent());
    }
    assert_eq!(&frames[0][2..4], &[49, CMD.get()]);

    for frame in &frames {
        robot.on_frame_received(frame);
    }
    assert_eq!(seen.take(), vec![payload]);
}

#[rstest]
fn boundary_between_plain_and_multipart(mut central: FrameTransport) {
    central.send(CMD, patterned(MAX_PAYLOAD));
    assert_eq!(central.queued_frames(), 1);
    drain(&mut central);

    central.send(CMD, patterned(MAX_PAYLOAD + 1));
    assert_eq!(central.queued_frames(), 2);
}

#[rstest]
fn robot_replies_use_the_central_bound_ids(mut central: FrameTransport, mut robot: FrameTransport) {
    let response = MessageId::new(0x95);
    let seen = capture(&mut central, response);
    let output = b"total 0\ndrwxr-xr-x  2 root root 40 Jan  1 00:00 .\n".to_vec();

    robot.send(response, &output);
    let ids: Vec<u8> = drain(&mut robot).iter().map(|frame| frame[1]).collect();
    assert_eq!(ids.first(), Some(&0xF3));
    assert_eq!(ids.last(), Some(&0xF5));

    robot.send(response, &output);
    pump(&mut robot, &mut central);
    assert_eq!(seen.take(), vec![output]);
}

#[rstest]
fn only_the_latest_multipart_message_is_delivered(
    mut central: FrameTransport,
    mut robot: FrameTransport,
) {
    let seen = capture(&mut robot, CMD);
    central.send(CMD, vec![b'a'; 60]);
    let first = drain(&mut central);
    central.send(CMD, vec![b'b'; 40]);
    let second = drain(&mut central);

    robot.on_frame_received(&first[0]);
    robot.on_frame_received(&first[1]);
    for frame in &second {
        robot.on_frame_received(frame);
    }
    // The rest of the abandoned message now arrives as orphans.
    for frame in &first[2..] {
        robot.on_frame_received(frame);
    }

    assert_eq!(seen.take(), vec![vec![b'b'; 40]]);
    assert_eq!(robot.reassembly_state(), ReassemblyState::Idle);
}

#[rstest]
fn back_to_back_messages_arrive_in_order(mut central: FrameTransport, mut robot: FrameTransport) {
    let commands = capture(&mut robot, CMD);
    let pings = capture(&mut robot, PING);
    central.send(CMD, patterned(100));
    central.send(PING, [0_u8; 0]);
    central.send(CMD, patterned(3));

    assert_eq!(pump(&mut central, &mut robot), 8);
    assert_eq!(commands.take(), vec![patterned(100), patterned(3)]);
    assert_eq!(pings.take(), vec![Vec::<u8>::new()]);
}

#[test]
fn negotiated_mtu_carries_larger_frames() {
    use bleframe::{Role, TransportConfig};

    let config = |role| {
        TransportConfig::builder()
            .role(role)
            .max_frame_size(185)
            .build()
            .expect("valid")
    };
    let mut central = FrameTransport::new(config(Role::Central));
    let mut robot = FrameTransport::new(config(Role::Peripheral));
    let seen = capture(&mut robot, CMD);

    central.send(CMD, patterned(400));
    let frames = drain(&mut central);
    assert_eq!(frames.len(), 402_usize.div_ceil(183));
    assert!(frames.iter().all(|frame| frame.len() <= 185));

    for frame in &frames {
        robot.on_frame_received(frame);
    }
    assert_eq!(seen.take(), vec![patterned(400)]);
}
