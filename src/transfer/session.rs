//! Outgoing transfer session.
//!
//! Turns a borrowed sample buffer into the ordered run of data packets
//! that carries it.  One scratch [`DataPacket`] is reused for every
//! packet: the link is half-duplex, so only one is ever in flight.
//!
//! Flow: new (stamps header length) → N × next_message → done

use log::debug;

use crate::error::CodecError;
use crate::sds::message::{DataPacket, DumpHeader};
use crate::sds::packing::BitDepth;

/// Largest sample count the 20-bit header length field carries.
pub const MAX_SAMPLES: usize = 0xF_FFFF;

pub struct TransferSession<'a> {
    remaining: &'a [i32],
    total: usize,
    depth: BitDepth,
    next_number: u8,
    sent: usize,
    scratch: DataPacket,
}

impl<'a> TransferSession<'a> {
    /// Start a session for `samples`, writing their count into
    /// `header.length`.
    pub fn new(samples: &'a [i32], header: &mut DumpHeader) -> Result<Self, CodecError> {
        let depth = BitDepth::new(header.bit_depth)?;
        if samples.len() > MAX_SAMPLES {
            return Err(CodecError::SampleCountOverflow(samples.len()));
        }
        header.length = samples.len() as u32;

        Ok(Self {
            remaining: samples,
            total: samples.len(),
            depth,
            next_number: 0,
            sent: 0,
            scratch: DataPacket::new(header.channel),
        })
    }

    /// All samples have been packed.
    pub fn done(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Percentage of samples packed so far, rounded to nearest.
    /// Reads 100 only once done; an empty buffer is done from the start.
    pub fn progress(&self) -> u8 {
        if self.done() {
            return 100;
        }
        let done = (self.total - self.remaining.len()) as u64;
        let total = self.total as u64;
        (((200 * done + total) / (2 * total)) as u8).min(99)
    }

    /// Pack the next packet and return it, or `None` once done.
    ///
    /// Every call consumes samples and a sequence number.
    pub fn next_message(&mut self) -> Option<&DataPacket> {
        if self.done() {
            return None;
        }
        self.remaining = self.scratch.set_samples(self.remaining, self.depth);
        self.scratch.packet_number = self.advance_number();
        self.scratch.checksum = self.scratch.compute_checksum();
        self.sent += 1;
        debug!(
            "session: packed packet {} ({} samples left)",
            self.scratch.packet_number,
            self.remaining.len()
        );
        Some(&self.scratch)
    }

    /// Post-increment the sequence number, wrapping 127 -> 0.
    fn advance_number(&mut self) -> u8 {
        let n = self.next_number;
        self.next_number = if n >= 0x7F { 0 } else { n + 1 };
        n
    }

    pub fn packets_sent(&self) -> usize {
        self.sent
    }

    /// Packets needed for the whole buffer.
    pub fn packet_count(&self) -> usize {
        self.total.div_ceil(self.depth.samples_per_packet())
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.depth
    }
}
