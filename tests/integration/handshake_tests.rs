//! End-to-end handshake scenarios against a scripted receiver.

use crate::mock_link::{MockLink, RecordingSink, Reply, ack, control};
use sds_transfer::sds::{ControlKind, DumpRequest, Message};
use sds_transfer::{
    TransferConfig, TransferError, TransferEvent, TransportFailure, Waveform, transfer,
};

fn ramp(n: usize) -> Vec<i32> {
    (0..n as i32).map(|i| (i % 256) - 128).collect()
}

fn eight_bit(samples: &[i32]) -> Waveform<'_> {
    Waveform {
        samples,
        sample_rate: 32_000,
        bit_depth: 8,
    }
}

#[test]
fn acking_receiver_gets_every_packet_once() {
    let samples = ramp(600); // 10 packets at 8-bit
    let mut link = MockLink::acking();
    let mut sink = RecordingSink::new();

    transfer(&TransferConfig::default(), &eight_bit(&samples), &mut link, &mut sink).unwrap();

    let numbers: Vec<u8> = link.data_packets().map(|p| p.packet_number).collect();
    assert_eq!(numbers, (0..10).collect::<Vec<u8>>());
    assert!(link.data_packets().all(|p| p.has_valid_checksum()));
    assert_eq!(sink.events[1], TransferEvent::HeaderAccepted);
    assert_eq!(
        sink.events.last(),
        Some(&TransferEvent::Completed { packets: 10 })
    );
}

#[test]
fn silent_receiver_is_sent_blind() {
    let samples = ramp(300);
    let mut link = MockLink::silent();
    let mut sink = RecordingSink::new();

    transfer(&TransferConfig::default(), &eight_bit(&samples), &mut link, &mut sink).unwrap();

    assert_eq!(sink.events[1], TransferEvent::AssumedNonHandshaking);
    assert_eq!(link.data_packets().count(), 5);
    // One header wait plus one wait per packet.
    assert_eq!(link.receive_calls, 1 + 5);
}

#[test]
fn header_wait_suppresses_fallback_until_ack() {
    let samples = ramp(120);
    let mut link = MockLink::silent().preload([
        control(ControlKind::Wait, 0, 0),
        Reply::Silence,
        Reply::Silence,
        Reply::Silence,
        ack(0),
    ]);
    let mut sink = RecordingSink::new();

    transfer(&TransferConfig::default(), &eight_bit(&samples), &mut link, &mut sink).unwrap();

    assert_eq!(
        &sink.events[..3],
        &[
            TransferEvent::HeaderSent,
            TransferEvent::Paused { packet: 0 },
            TransferEvent::HeaderAccepted,
        ]
    );
    // No data went out while the receiver held the header.
    assert_eq!(link.receive_calls, 5 + 2);
    assert_eq!(link.data_packets().count(), 2);
}

#[test]
fn nak_in_data_phase_aborts_without_retransmit() {
    let samples = ramp(600);
    let mut link = MockLink::with_responder(|msg| match msg {
        Message::DumpHeader(_) => vec![ack(0)],
        Message::DataPacket(p) if p.packet_number == 5 => {
            vec![control(ControlKind::Nak, 0, 5)]
        }
        Message::DataPacket(p) => vec![ack(p.packet_number)],
        _ => Vec::new(),
    });
    let mut sink = RecordingSink::new();

    let result = transfer(&TransferConfig::default(), &eight_bit(&samples), &mut link, &mut sink);

    assert_eq!(result, Err(TransferError::Rejected { packet: 5 }));
    let numbers: Vec<u8> = link.data_packets().map(|p| p.packet_number).collect();
    assert_eq!(numbers, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(
        sink.events.last(),
        Some(&TransferEvent::Aborted(TransferError::Rejected { packet: 5 }))
    );
}

#[test]
fn cancel_on_header_aborts() {
    let mut link = MockLink::silent().preload([control(ControlKind::Cancel, 0, 0)]);
    let result = transfer(
        &TransferConfig::default(),
        &eight_bit(&ramp(10)),
        &mut link,
        &mut RecordingSink::new(),
    );
    assert_eq!(result, Err(TransferError::Cancelled { packet: 0 }));
    assert_eq!(link.sent.len(), 1);
}

#[test]
fn noise_on_the_link_is_ignored() {
    let samples = ramp(120);
    let mut link = MockLink::silent().preload([
        Reply::Raw(vec![0xF0, 0x7E, 0x00, 0x55, 0xF7]), // unknown sub-ID
        Reply::Raw(vec![0xF0, 0x7E, 0x00, 0x7F, 0xF7]), // short control
        Reply::Raw(Message::from(DumpRequest { channel: 0, number: 1 }).to_bytes()),
        control(ControlKind::Nak, 3, 0), // another device
        ack(0),
    ]);
    let mut sink = RecordingSink::new();

    transfer(&TransferConfig::default(), &eight_bit(&samples), &mut link, &mut sink).unwrap();

    assert_eq!(sink.events[1], TransferEvent::HeaderAccepted);
    assert_eq!(link.data_packets().count(), 2);
}

#[test]
fn data_phase_wait_pauses_sending() {
    let samples = ramp(300); // 5 packets
    let mut link = MockLink::with_responder(|msg| match msg {
        Message::DumpHeader(_) => vec![ack(0)],
        Message::DataPacket(p) if p.packet_number == 1 => vec![
            control(ControlKind::Wait, 0, 1),
            Reply::Silence,
            Reply::Silence,
            ack(1),
        ],
        _ => Vec::new(),
    });
    let mut sink = RecordingSink::new();

    transfer(&TransferConfig::default(), &eight_bit(&samples), &mut link, &mut sink).unwrap();

    let numbers: Vec<u8> = link.data_packets().map(|p| p.packet_number).collect();
    assert_eq!(numbers, vec![0, 1, 2, 3, 4]);
    let position = |want: TransferEvent| sink.events.iter().position(|e| *e == want).unwrap();
    assert!(position(TransferEvent::Resumed) > position(TransferEvent::Paused { packet: 1 }));
    // header + 5 packets + 3 polls while paused
    assert_eq!(link.receive_calls, 1 + 5 + 3);
}

#[test]
fn wait_after_last_packet_still_completes() {
    let samples = ramp(60); // exactly one packet
    let mut link = MockLink::with_responder(|msg| match msg {
        Message::DumpHeader(_) => vec![ack(0)],
        Message::DataPacket(_) => vec![control(ControlKind::Wait, 0, 0)],
        _ => Vec::new(),
    });
    let mut sink = RecordingSink::new();

    transfer(&TransferConfig::default(), &eight_bit(&samples), &mut link, &mut sink).unwrap();
    assert_eq!(
        sink.events.last(),
        Some(&TransferEvent::Completed { packets: 1 })
    );
}

#[test]
fn receive_failure_is_fatal() {
    let mut link = MockLink::acking().fail_receive_at(3);
    let mut sink = RecordingSink::new();
    let result = transfer(
        &TransferConfig::default(),
        &eight_bit(&ramp(600)),
        &mut link,
        &mut sink,
    );
    let want = TransferError::TransportFailure(TransportFailure::Receive);
    assert_eq!(result, Err(want));
    assert_eq!(sink.events.last(), Some(&TransferEvent::Aborted(want)));
    // header, packet 0, packet 1
    assert_eq!(link.sent.len(), 3);
}

#[test]
fn packet_numbers_wrap_on_the_wire() {
    let samples = vec![0i32; 200 * 60];
    let mut link = MockLink::silent();
    transfer(
        &TransferConfig::default(),
        &eight_bit(&samples),
        &mut link,
        &mut RecordingSink::new(),
    )
    .unwrap();

    let numbers: Vec<u8> = link.data_packets().map(|p| p.packet_number).collect();
    let want: Vec<u8> = (0..=127).chain(0..=71).collect();
    assert_eq!(numbers, want);
}

#[test]
fn progress_is_coarse_and_finishes_at_100() {
    let samples = ramp(60 * 37);
    let mut sink = RecordingSink::new();
    transfer(
        &TransferConfig::default(),
        &eight_bit(&samples),
        &mut MockLink::silent(),
        &mut sink,
    )
    .unwrap();

    let p = sink.progress();
    assert_eq!(p.last(), Some(&100));
    assert!(p.windows(2).all(|w| w[1] >= w[0] + 5 || w[1] == 100));
    assert_eq!(p.iter().filter(|v| **v == 100).count(), 1);
}

#[test]
fn config_channel_and_loop_reach_the_header() {
    let config = TransferConfig::from_json(
        r#"{"channel": 9, "slot": 300, "loop_start": 10, "loop_end": 50, "loop_type": "PingPong"}"#,
    )
    .unwrap();
    let mut link = MockLink::silent();
    transfer(&config, &eight_bit(&ramp(100)), &mut link, &mut RecordingSink::new()).unwrap();

    let Message::DumpHeader(h) = &link.sent[0] else {
        panic!("expected header first, got {:?}", link.sent[0]);
    };
    assert_eq!((h.channel, h.number), (9, 300));
    assert_eq!((h.loop_start, h.loop_end), (10, 50));
    assert_eq!(h.loop_type, sds_transfer::sds::LoopType::PingPong);
    assert!(link.data_packets().all(|p| p.channel == 9));
}
