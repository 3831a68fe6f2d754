//! Flat wire captures (`.sds` files).
//!
//! A capture is the raw concatenation of framed messages as they crossed
//! the link, each one ending at its `F7`.  Used for golden fixtures and for
//! rendering a whole non-handshaking transfer in one go.

use core::fmt;

use log::debug;

use crate::error::CodecError;
use crate::transfer::session::TransferSession;

use super::codec::{DATA_PACKET_SIZE, DUMP_HEADER_SIZE, EOX};
use super::message::{DumpHeader, Message};
use super::packing::BitDepth;

/// Iterate the framed messages of a capture.
///
/// Each item includes its trailing `F7`.  A trailing fragment with no
/// terminator yields a single `NotSysex` error and ends the iteration.
pub fn split_frames(bytes: &[u8]) -> Frames<'_> {
    Frames { rest: bytes }
}

/// Iterator returned by [`split_frames`].
pub struct Frames<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Frames<'a> {
    type Item = Result<&'a [u8], CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        match self.rest.iter().position(|&b| b == EOX) {
            Some(end) => {
                let (frame, rest) = self.rest.split_at(end + 1);
                self.rest = rest;
                Some(Ok(frame))
            }
            None => {
                self.rest = &[];
                Some(Err(CodecError::NotSysex))
            }
        }
    }
}

// ── Capture parsing ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    Codec(CodecError),
    MissingHeader,
    DuplicateHeader,
    DataBeforeHeader,
    /// Data packet at frame `index` failed its checksum.
    BadChecksum { index: usize },
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(e) => write!(f, "{e}"),
            Self::MissingHeader => write!(f, "no dump header found"),
            Self::DuplicateHeader => write!(f, "duplicate dump header"),
            Self::DataBeforeHeader => write!(f, "data packet before dump header"),
            Self::BadChecksum { index } => write!(f, "checksum mismatch in frame {index}"),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<CodecError> for CaptureError {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

/// A decoded capture: one header and the samples its data packets carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub header: DumpHeader,
    /// Decoded samples, truncated to `header.length`.
    pub samples: Vec<i32>,
    /// Number of data packets in the capture.
    pub packets: usize,
}

impl Capture {
    pub fn parse(bytes: &[u8]) -> Result<Self, CaptureError> {
        let mut header: Option<(DumpHeader, BitDepth)> = None;
        let mut samples = Vec::new();
        let mut packets = 0;

        for (index, frame) in split_frames(bytes).enumerate() {
            match Message::decode(frame?)? {
                Message::DumpHeader(h) => {
                    if header.is_some() {
                        return Err(CaptureError::DuplicateHeader);
                    }
                    header = Some((h, BitDepth::new(h.bit_depth)?));
                }
                Message::DataPacket(p) => {
                    let Some((_, depth)) = header else {
                        return Err(CaptureError::DataBeforeHeader);
                    };
                    if !p.has_valid_checksum() {
                        return Err(CaptureError::BadChecksum { index });
                    }
                    p.get_samples(depth, &mut samples);
                    packets += 1;
                }
                other => debug!("capture: skipping {other:?} at frame {index}"),
            }
        }

        let (header, _) = header.ok_or(CaptureError::MissingHeader)?;
        samples.truncate(header.length as usize);
        Ok(Self {
            header,
            samples,
            packets,
        })
    }
}

/// Render the wire bytes of a non-handshaking transfer: the header
/// (stamped with the sample count) followed by every data packet.
pub fn render_transfer(header: &DumpHeader, samples: &[i32]) -> Result<Vec<u8>, CodecError> {
    let mut header = *header;
    let mut session = TransferSession::new(samples, &mut header)?;

    let mut out =
        Vec::with_capacity(DUMP_HEADER_SIZE + session.packet_count() * DATA_PACKET_SIZE);
    header.encode(&mut out);
    while let Some(packet) = session.next_message() {
        packet.encode(&mut out);
    }
    Ok(out)
}
