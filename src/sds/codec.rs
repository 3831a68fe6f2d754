//! Byte-exact encoder and decoder for the four message variants.
//!
//! Wire formats (offsets from message start):
//! ```text
//! DumpHeader    F0 7E ch 01 nn nn bd pp pp pp ll ll ll ss ss ss ee ee ee lt F7   (21)
//! DataPacket    F0 7E ch 02 pk <120 payload bytes> cs F7                       (127)
//! DumpRequest   F0 7E ch 03 nn nn F7                                             (7)
//! ControlPacket F0 7E ch kk pk F7          kk = 7C WAIT, 7D CANCEL, 7E NAK, 7F ACK (6)
//! ```
//!
//! 14-bit fields are sent low 7 bits first.  20-bit fields are sent as
//! three groups: low 7, mid 7, high 6.
//!
//! Decoding validates framing only.  The data packet checksum is a
//! receiver-side integrity check, see [`DataPacket::has_valid_checksum`].

use crate::error::CodecError;

use super::message::{
    ControlKind, ControlPacket, DataPacket, DumpHeader, DumpRequest, LoopType, Message,
    PAYLOAD_LEN,
};

/// Start of system-exclusive.
pub const SOX: u8 = 0xF0;
/// End of system-exclusive.
pub const EOX: u8 = 0xF7;
/// Universal non-real-time ID.
pub const NON_REAL_TIME: u8 = 0x7E;

const PREFIX: [u8; 2] = [SOX, NON_REAL_TIME];

const SUB_HEADER: u8 = 0x01;
const SUB_DATA_PACKET: u8 = 0x02;
const SUB_DUMP_REQUEST: u8 = 0x03;

pub const DUMP_HEADER_SIZE: usize = 21;
pub const DATA_PACKET_SIZE: usize = 127;
pub const DUMP_REQUEST_SIZE: usize = 7;
pub const CONTROL_PACKET_SIZE: usize = 6;

/// Offset of the checksum byte inside an encoded data packet.
const CHECKSUM_OFFSET: usize = DATA_PACKET_SIZE - 2;

const MIN_BIT_DEPTH: u8 = 8;
const MAX_BIT_DEPTH: u8 = 28;

// ── Field helpers ────────────────────────────────────────────

pub(crate) fn push_14bit(out: &mut Vec<u8>, num: u16) {
    out.extend_from_slice(&[(num & 0x7F) as u8, ((num >> 7) & 0x7F) as u8]);
}

pub(crate) fn push_20bit(out: &mut Vec<u8>, num: u32) {
    out.extend_from_slice(&[
        (num & 0x7F) as u8,
        ((num >> 7) & 0x7F) as u8,
        ((num >> 14) & 0x3F) as u8,
    ]);
}

pub(crate) fn read_14bit(l: u8, h: u8) -> u16 {
    u16::from(l & 0x7F) | u16::from(h & 0x7F) << 7
}

pub(crate) fn read_20bit(l: u8, m: u8, h: u8) -> u32 {
    u32::from(l & 0x7F) | u32::from(m & 0x7F) << 7 | u32::from(h & 0x3F) << 14
}

// ── Encoding ─────────────────────────────────────────────────

impl DumpHeader {
    /// Append the encoding of the header to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[SOX, NON_REAL_TIME, self.channel & 0x7F, SUB_HEADER]);
        push_14bit(out, self.number);
        out.push(self.bit_depth & 0x7F);
        push_20bit(out, self.period_ns);
        push_20bit(out, self.length);
        push_20bit(out, self.loop_start);
        push_20bit(out, self.loop_end);
        out.push(self.loop_type.to_byte() & 0x7F);
        out.push(EOX);
    }
}

impl DumpRequest {
    /// Append the encoding of the request to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[SOX, NON_REAL_TIME, self.channel & 0x7F, SUB_DUMP_REQUEST]);
        push_14bit(out, self.number);
        out.push(EOX);
    }
}

impl ControlPacket {
    /// Append the encoding of the control packet to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[
            SOX,
            NON_REAL_TIME,
            self.channel & 0x7F,
            self.kind as u8,
            self.packet_number & 0x7F,
            EOX,
        ]);
    }
}

impl DataPacket {
    /// Encode into a fixed buffer; the hot packet loop never allocates.
    pub fn encode_into(&self, buf: &mut [u8; DATA_PACKET_SIZE]) {
        buf[..5].copy_from_slice(&[
            SOX,
            NON_REAL_TIME,
            self.channel & 0x7F,
            SUB_DATA_PACKET,
            self.packet_number & 0x7F,
        ]);
        buf[5..5 + PAYLOAD_LEN].copy_from_slice(&self.payload);
        buf[CHECKSUM_OFFSET] = self.checksum & 0x7F;
        buf[DATA_PACKET_SIZE - 1] = EOX;
    }

    /// Append the encoding of the packet to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        let mut buf = [0u8; DATA_PACKET_SIZE];
        self.encode_into(&mut buf);
        out.extend_from_slice(&buf);
    }

    /// XOR of every encoded byte from the `7E` ID through the last payload
    /// byte, masked to 7 bits.  The leading `F0` does not contribute.
    pub fn compute_checksum(&self) -> u8 {
        let mut buf = [0u8; DATA_PACKET_SIZE];
        self.encode_into(&mut buf);
        buf[1..CHECKSUM_OFFSET].iter().fold(0, |acc, b| acc ^ b) & 0x7F
    }

    /// Receiver-side integrity check.
    pub fn has_valid_checksum(&self) -> bool {
        self.compute_checksum() == self.checksum & 0x7F
    }
}

impl Message {
    /// Append the encoding of the message to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Self::DumpHeader(m) => m.encode(out),
            Self::DataPacket(m) => m.encode(out),
            Self::DumpRequest(m) => m.encode(out),
            Self::Control(m) => m.encode(out),
        }
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode(&mut out);
        out
    }

    /// Exact number of bytes [`encode`](Self::encode) appends.
    pub const fn encoded_len(&self) -> usize {
        match self {
            Self::DumpHeader(_) => DUMP_HEADER_SIZE,
            Self::DataPacket(_) => DATA_PACKET_SIZE,
            Self::DumpRequest(_) => DUMP_REQUEST_SIZE,
            Self::Control(_) => CONTROL_PACKET_SIZE,
        }
    }

    // ── Decoding ─────────────────────────────────────────────

    /// Decode one complete framed message.
    pub fn decode(sysex: &[u8]) -> Result<Self, CodecError> {
        if !sysex.starts_with(&PREFIX) || sysex.last() != Some(&EOX) {
            return Err(CodecError::NotSysex);
        }
        if sysex.len() < 4 {
            return Err(CodecError::TooShort);
        }
        match sysex[3] {
            SUB_HEADER => decode_dump_header(sysex).map(Self::DumpHeader),
            SUB_DATA_PACKET => decode_data_packet(sysex).map(Self::DataPacket),
            SUB_DUMP_REQUEST => decode_dump_request(sysex).map(Self::DumpRequest),
            id => match ControlKind::from_sub_id(id) {
                Some(kind) => decode_control_packet(kind, sysex).map(Self::Control),
                None => Err(CodecError::UnknownMessageType(id)),
            },
        }
    }
}

fn check_size(msg: &[u8], expected: usize, kind: &'static str) -> Result<(), CodecError> {
    if msg.len() == expected {
        Ok(())
    } else {
        Err(CodecError::BadSize {
            kind,
            len: msg.len(),
        })
    }
}

fn decode_dump_header(msg: &[u8]) -> Result<DumpHeader, CodecError> {
    check_size(msg, DUMP_HEADER_SIZE, "DumpHeader")?;
    let bit_depth = msg[6];
    if !(MIN_BIT_DEPTH..=MAX_BIT_DEPTH).contains(&bit_depth) {
        return Err(CodecError::UnsupportedBitDepth(bit_depth));
    }
    Ok(DumpHeader {
        channel: msg[2],
        number: read_14bit(msg[4], msg[5]),
        bit_depth,
        period_ns: read_20bit(msg[7], msg[8], msg[9]),
        length: read_20bit(msg[10], msg[11], msg[12]),
        loop_start: read_20bit(msg[13], msg[14], msg[15]),
        loop_end: read_20bit(msg[16], msg[17], msg[18]),
        loop_type: LoopType::from_byte(msg[19]),
    })
}

fn decode_data_packet(msg: &[u8]) -> Result<DataPacket, CodecError> {
    check_size(msg, DATA_PACKET_SIZE, "DataPacket")?;
    let mut payload = [0u8; PAYLOAD_LEN];
    payload.copy_from_slice(&msg[5..CHECKSUM_OFFSET]);
    Ok(DataPacket {
        channel: msg[2],
        packet_number: msg[4],
        payload,
        checksum: msg[CHECKSUM_OFFSET],
    })
}

fn decode_dump_request(msg: &[u8]) -> Result<DumpRequest, CodecError> {
    check_size(msg, DUMP_REQUEST_SIZE, "DumpRequest")?;
    Ok(DumpRequest {
        channel: msg[2],
        number: read_14bit(msg[4], msg[5]),
    })
}

fn decode_control_packet(kind: ControlKind, msg: &[u8]) -> Result<ControlPacket, CodecError> {
    check_size(msg, CONTROL_PACKET_SIZE, "ControlPacket")?;
    Ok(ControlPacket {
        kind,
        channel: msg[2],
        packet_number: msg[4],
    })
}

// ── Tests ────────────────────────────────────────────────────
