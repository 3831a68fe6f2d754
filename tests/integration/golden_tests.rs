//! Golden capture of a 600-sample, 24-bit, 44.1 kHz transfer to channel 1,
//! slot 2, as a non-handshaking receiver sees it on the wire.

use crate::mock_link::{MockLink, RecordingSink};
use sds_transfer::sds::codec::{DATA_PACKET_SIZE, DUMP_HEADER_SIZE};
use sds_transfer::sds::{BitDepth, Capture, DumpHeader, LoopType, Message, render_transfer, split_frames};
use sds_transfer::transfer::sample_rate_to_period;
use sds_transfer::{TransferConfig, Waveform, transfer};

const GOLDEN: &[u8] = include_bytes!("../testdata/saw_24bit_44k.sds");

/// Sawtooth the capture was made from.
fn saw() -> Vec<i32> {
    (0..600i64)
        .map(|i| ((i * 27_961 + 1_234) % (1 << 24) - (1 << 23)) as i32)
        .collect()
}

fn header() -> DumpHeader {
    DumpHeader::new(1, 2, 24, sample_rate_to_period(44_100))
}

#[test]
fn capture_header_fields() {
    let cap = Capture::parse(GOLDEN).unwrap();
    let h = cap.header;
    assert_eq!(h.channel, 1);
    assert_eq!(h.number, 2);
    assert_eq!(h.bit_depth, 24);
    assert_eq!(h.period_ns, 22_675);
    assert_eq!(h.length, 600);
    assert_eq!((h.loop_start, h.loop_end, h.loop_type), (0, 0, LoopType::Forward));
}

#[test]
fn capture_decodes_to_source_samples() {
    let cap = Capture::parse(GOLDEN).unwrap();
    assert_eq!(cap.packets, 20);
    assert_eq!(cap.samples, saw());
}

#[test]
fn capture_layout() {
    assert_eq!(GOLDEN.len(), DUMP_HEADER_SIZE + 20 * DATA_PACKET_SIZE);
    let frames: Vec<&[u8]> = split_frames(GOLDEN).map(Result::unwrap).collect();
    assert_eq!(frames.len(), 21);

    for (i, frame) in frames[1..].iter().enumerate() {
        let Ok(Message::DataPacket(p)) = Message::decode(frame) else {
            panic!("frame {} is not a data packet", i + 1);
        };
        assert_eq!(usize::from(p.packet_number), i);
        assert!(p.has_valid_checksum(), "packet {i}");
    }
}

#[test]
fn last_packet_holds_only_the_tail() {
    let depth = BitDepth::new(24).unwrap();
    let frames: Vec<&[u8]> = split_frames(GOLDEN).map(Result::unwrap).collect();
    let Ok(Message::DataPacket(last)) = Message::decode(frames[20]) else {
        panic!("last frame is not a data packet");
    };
    let mut out = Vec::new();
    last.get_samples(depth, &mut out);
    assert_eq!(out.len(), depth.samples_per_packet());
    assert_eq!(out, saw()[570..]);
}

#[test]
fn render_reproduces_capture() {
    let bytes = render_transfer(&header(), &saw()).unwrap();
    assert_eq!(bytes, GOLDEN);
}

#[test]
fn transfer_to_silent_receiver_reproduces_capture() {
    let samples = saw();
    let config = TransferConfig {
        channel: 1,
        slot: 2,
        ..TransferConfig::default()
    };
    let waveform = Waveform {
        samples: &samples,
        sample_rate: 44_100,
        bit_depth: 24,
    };
    let mut link = MockLink::silent();
    transfer(&config, &waveform, &mut link, &mut RecordingSink::new()).unwrap();
    assert_eq!(link.raw, GOLDEN);
}

#[test]
fn corrupted_checksum_still_decodes() {
    let mut bytes = GOLDEN.to_vec();
    let at = DUMP_HEADER_SIZE + DATA_PACKET_SIZE - 2;
    bytes[at] ^= 0x40;

    let frame = &bytes[DUMP_HEADER_SIZE..DUMP_HEADER_SIZE + DATA_PACKET_SIZE];
    let Ok(Message::DataPacket(p)) = Message::decode(frame) else {
        panic!("framing must not depend on the checksum");
    };
    assert!(!p.has_valid_checksum());
    assert!(Capture::parse(&bytes).is_err());
}
