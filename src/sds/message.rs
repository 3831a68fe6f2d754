//! Sample Dump Standard message types.
//!
//! The message set is fixed by the protocol, so it is a closed enum that
//! the codec and the handshake logic match exhaustively.  Every variant
//! shares the universal non-real-time envelope:
//!
//! ```text
//! F0 7E <channel> <sub-id> ... F7
//! ```

use serde::{Deserialize, Serialize};

/// Number of waveform bytes carried by every data packet.
pub const PAYLOAD_LEN: usize = 120;

/// Sustain loop mode carried in the dump header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopType {
    #[default]
    Forward,
    PingPong,
    /// Loop disabled (`0x7F`).
    Off,
    /// Any other value a peer put on the wire.
    Other(u8),
}

impl LoopType {
    pub const fn from_byte(b: u8) -> Self {
        match b {
            0x00 => Self::Forward,
            0x01 => Self::PingPong,
            0x7F => Self::Off,
            other => Self::Other(other),
        }
    }

    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Forward => 0x00,
            Self::PingPong => 0x01,
            Self::Off => 0x7F,
            Self::Other(b) => b,
        }
    }
}

/// Announces the waveform that the following data packets carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpHeader {
    pub channel: u8,
    /// Waveform slot (14 bits).
    pub number: u16,
    /// Significant bits per sample, 8..=28.
    pub bit_depth: u8,
    /// Sample period in nanoseconds (20 bits).
    pub period_ns: u32,
    /// Total sample count (20 bits).
    pub length: u32,
    pub loop_start: u32,
    pub loop_end: u32,
    pub loop_type: LoopType,
}

impl DumpHeader {
    /// Header with no sustain loop points; `length` is stamped later by
    /// the transfer session.
    pub fn new(channel: u8, number: u16, bit_depth: u8, period_ns: u32) -> Self {
        Self {
            channel,
            number,
            bit_depth,
            period_ns,
            length: 0,
            loop_start: 0,
            loop_end: 0,
            loop_type: LoopType::Forward,
        }
    }
}

/// Sent by a receiver that wants a device to start dumping slot `number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpRequest {
    pub channel: u8,
    pub number: u16,
}

/// One 120-byte chunk of packed waveform data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPacket {
    pub channel: u8,
    /// Sequence number, wraps 127 -> 0.
    pub packet_number: u8,
    pub payload: [u8; PAYLOAD_LEN],
    pub checksum: u8,
}

impl DataPacket {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            packet_number: 0,
            payload: [0; PAYLOAD_LEN],
            checksum: 0,
        }
    }
}

/// Handshake response kinds. The discriminant is the wire sub-ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ControlKind {
    /// Paused: wait indefinitely for another control message.
    Wait = 0x7C,
    /// Stop the dump.
    Cancel = 0x7D,
    /// Last message was not received correctly.
    Nak = 0x7E,
    /// Last message was received correctly.
    Ack = 0x7F,
}

impl ControlKind {
    /// Map a sub-ID to a control kind; `None` for non-control sub-IDs.
    pub const fn from_sub_id(id: u8) -> Option<Self> {
        match id {
            0x7C => Some(Self::Wait),
            0x7D => Some(Self::Cancel),
            0x7E => Some(Self::Nak),
            0x7F => Some(Self::Ack),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Wait => "WAIT",
            Self::Cancel => "CANCEL",
            Self::Nak => "NAK",
            Self::Ack => "ACK",
        }
    }
}

/// Handshake message sent by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlPacket {
    pub kind: ControlKind,
    pub channel: u8,
    /// Packet the response refers to (0 when answering a header).
    pub packet_number: u8,
}

/// Any Sample Dump Standard message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    DumpHeader(DumpHeader),
    DataPacket(DataPacket),
    DumpRequest(DumpRequest),
    Control(ControlPacket),
}

impl Message {
    /// Device channel the message is addressed to or sent from.
    pub fn channel(&self) -> u8 {
        match self {
            Self::DumpHeader(m) => m.channel,
            Self::DataPacket(m) => m.channel,
            Self::DumpRequest(m) => m.channel,
            Self::Control(m) => m.channel,
        }
    }
}

impl From<DumpHeader> for Message {
    fn from(m: DumpHeader) -> Self {
        Self::DumpHeader(m)
    }
}

impl From<DataPacket> for Message {
    fn from(m: DataPacket) -> Self {
        Self::DataPacket(m)
    }
}

impl From<DumpRequest> for Message {
    fn from(m: DumpRequest) -> Self {
        Self::DumpRequest(m)
    }
}

impl From<ControlPacket> for Message {
    fn from(m: ControlPacket) -> Self {
        Self::Control(m)
    }
}
