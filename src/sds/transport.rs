//! Transport abstraction for any duplex, message-oriented link.
//!
//! The handshake controller is generic over [`Transport`], so the device
//! layer (MIDI port, loopback, test double) never touches protocol logic.
//!
//! Inbound frames usually arrive on a listener thread owned by the device
//! layer.  [`InboundQueue`] bridges that thread to the synchronous transfer
//! loop through a bounded `embassy-sync` channel:
//!
//! ```text
//! ┌──────────────┐  push (try_send)  ┌──────────────┐  recv_timeout  ┌──────────────┐
//! │   Listener   │──────────────────▶│ InboundQueue │───────────────▶│ Transfer loop│
//! │  (device)    │   drop when full  │  (bounded)   │   1ms polling  │   (sync)     │
//! └──────────────┘                   └──────────────┘                └──────────────┘
//! ```

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use super::codec::{EOX, SOX};

/// Largest inbound frame kept by the queue; a full data packet is 127 bytes.
pub const FRAME_CAPACITY: usize = 128;

/// One inbound system-exclusive frame, stored inline.
pub type Frame = heapless::Vec<u8, FRAME_CAPACITY>;

/// Default inbound queue depth.
pub const QUEUE_DEPTH: usize = 512;

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Duplex message link.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Write one complete encoded message.
    fn send(&mut self, msg: &[u8]) -> Result<(), Self::Error>;

    /// Wait up to `timeout` for the next inbound frame.
    /// Returns `Ok(None)` when the timeout elapses with nothing received.
    fn receive(&mut self, timeout: Duration) -> Result<Option<Frame>, Self::Error>;
}

/// A transport that discards all sends and never receives.
/// Behaves like a receiver that does not handshake.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn send(&mut self, _msg: &[u8]) -> Result<(), ()> {
        Ok(())
    }

    fn receive(&mut self, _timeout: Duration) -> Result<Option<Frame>, ()> {
        Ok(None)
    }
}

// ── Inbound queue ────────────────────────────────────────────

/// Bounded, lock-free-to-the-producer queue of inbound frames.
///
/// Producers never block: when the queue is full the newest frame is
/// dropped.  The transfer loop tolerates lost control messages.
pub struct InboundQueue<const N: usize = QUEUE_DEPTH> {
    channel: Channel<CriticalSectionRawMutex, Frame, N>,
}

impl<const N: usize> InboundQueue<N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Offer raw bytes from the device.  Anything that is not a complete
    /// `F0 .. F7` frame is ignored.  Returns `true` if the frame was queued.
    pub fn push(&self, bytes: &[u8]) -> bool {
        if bytes.len() < 2 || bytes[0] != SOX || bytes[bytes.len() - 1] != EOX {
            return false;
        }
        let mut frame = Frame::new();
        if frame.extend_from_slice(bytes).is_err() {
            warn!("inbound: {} byte frame too large, dropping", bytes.len());
            return false;
        }
        if self.channel.try_send(frame).is_err() {
            warn!("inbound: queue full, dropping frame");
            return false;
        }
        true
    }

    pub fn try_recv(&self) -> Option<Frame> {
        self.channel.try_receive().ok()
    }

    /// Poll for a frame until `timeout` elapses.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Frame> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(frame) = self.try_recv() {
                return Some(frame);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl<const N: usize> Default for InboundQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Queued transport ─────────────────────────────────────────

/// [`Transport`] that writes to an [`std::io::Write`] sink and receives
/// from a shared [`InboundQueue`] fed by a listener.
pub struct QueuedTransport<W, const N: usize = QUEUE_DEPTH> {
    out: W,
    inbound: Arc<InboundQueue<N>>,
}

impl<W: Write, const N: usize> QueuedTransport<W, N> {
    pub fn new(out: W, inbound: Arc<InboundQueue<N>>) -> Self {
        Self { out, inbound }
    }

    pub fn inbound(&self) -> &Arc<InboundQueue<N>> {
        &self.inbound
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write, const N: usize> Transport for QueuedTransport<W, N> {
    type Error = std::io::Error;

    fn send(&mut self, msg: &[u8]) -> std::io::Result<()> {
        self.out.write_all(msg)?;
        self.out.flush()
    }

    fn receive(&mut self, timeout: Duration) -> std::io::Result<Option<Frame>> {
        Ok(self.inbound.recv_timeout(timeout))
    }
}
