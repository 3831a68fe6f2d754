//! Packs signed PCM samples into 7-bit-clean byte groups.
//!
//! A sample of depth `d` is offset to unsigned (`u = s + 2^(d-1)`) and
//! spread most-significant-first over `g(d)` bytes of 7 bits each:
//!
//! ```text
//!  d  8..=14  ->  2 bytes/sample  60 samples/packet
//!  d 15..=21  ->  3 bytes/sample  40 samples/packet
//!  d 22..=28  ->  4 bytes/sample  30 samples/packet
//!
//!  byte i < g-1 : (u >> (d - 7(i+1))) & 0x7F
//!  last byte    : (u << (7g - d))     & 0x7F    (left-justified remainder)
//! ```

use crate::error::CodecError;

use super::message::{DataPacket, PAYLOAD_LEN};

/// A validated sample bit depth in 8..=28.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitDepth(u8);

impl BitDepth {
    pub const MIN: u8 = 8;
    pub const MAX: u8 = 28;

    pub fn new(bits: u8) -> Result<Self, CodecError> {
        if (Self::MIN..=Self::MAX).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(CodecError::UnsupportedBitDepth(bits))
        }
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Bytes used per sample.
    pub const fn group_size(self) -> usize {
        match self.0 {
            0..=14 => 2,
            15..=21 => 3,
            _ => 4,
        }
    }

    /// Samples carried by one full data packet.
    pub const fn samples_per_packet(self) -> usize {
        PAYLOAD_LEN / self.group_size()
    }

    /// Unsigned offset that maps the most negative sample to zero.
    const fn zero(self) -> u32 {
        1 << (self.0 - 1)
    }

    /// Shift for byte `i` of a group: right-shift for all but the last
    /// byte, left-shift for the last.
    const fn shift(self, i: usize) -> u32 {
        let g = self.group_size() as u32;
        let d = self.0 as u32;
        if (i as u32) < g - 1 {
            d - 7 * (i as u32 + 1)
        } else {
            7 * g - d
        }
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = CodecError;

    fn try_from(bits: u8) -> Result<Self, CodecError> {
        Self::new(bits)
    }
}

impl DataPacket {
    /// Pack as many samples as fit into the payload, zero-filling the rest.
    /// Returns the samples that did not fit.
    pub fn set_samples<'a>(&mut self, samples: &'a [i32], depth: BitDepth) -> &'a [i32] {
        let g = depth.group_size();
        let zero = depth.zero();
        let last = g - 1;

        let taken = samples.len().min(depth.samples_per_packet());
        for (group, &s) in self.payload.chunks_exact_mut(g).zip(&samples[..taken]) {
            let u = (s as u32).wrapping_add(zero);
            for (i, byte) in group.iter_mut().enumerate() {
                let v = if i < last {
                    u >> depth.shift(i)
                } else {
                    u << depth.shift(i)
                };
                *byte = (v & 0x7F) as u8;
            }
        }
        self.payload[taken * g..].fill(0);

        &samples[taken..]
    }

    /// Decode every sample slot of the packet and append them to `out`.
    ///
    /// Always yields the full per-packet count; a trailing packet carries
    /// zero padding that callers truncate using the header length.
    pub fn get_samples(&self, depth: BitDepth, out: &mut Vec<i32>) {
        let g = depth.group_size();
        let zero = depth.zero();
        let last = g - 1;

        out.reserve(depth.samples_per_packet());
        for group in self.payload.chunks_exact(g) {
            let mut u = 0u32;
            for (i, &byte) in group.iter().enumerate() {
                let b = u32::from(byte & 0x7F);
                u |= if i < last {
                    b << depth.shift(i)
                } else {
                    b >> depth.shift(i)
                };
            }
            out.push(u.wrapping_sub(zero) as i32);
        }
    }
}

// ── Tests ────────────────────────────────────────────────────
