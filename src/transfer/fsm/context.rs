//! Shared mutable context threaded through every handshake handler.
//!
//! Handlers read the event they are given and write their outputs here:
//! the phase the transfer is in, the fatal error that ended it, and a
//! notice for the controller to forward to the event sink.

use crate::error::TransferError;
use crate::sds::message::ControlKind;
use crate::transfer::events::TransferEvent;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// What the controller observed while waiting on the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeEvent {
    /// The wait window elapsed with no control message for our channel.
    Timeout,
    /// A control message arrived on our channel.
    Control { kind: ControlKind, packet_number: u8 },
}

impl HandshakeEvent {
    pub const fn control(kind: ControlKind, packet_number: u8) -> Self {
        Self::Control {
            kind,
            packet_number,
        }
    }
}

/// Which half of the protocol is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Header sent, waiting for the receiver's verdict.
    Header,
    /// Streaming data packets.
    Data,
}

// ---------------------------------------------------------------------------
// HandshakeContext
// ---------------------------------------------------------------------------

pub struct HandshakeContext {
    // -- Timing --
    /// Events handled since the current state was entered, including the
    /// one being handled.
    pub events_in_state: u64,

    // -- Protocol --
    pub phase: Phase,
    /// Fatal result, set when a handler moves to `Aborted`.
    pub abort: Option<TransferError>,

    // -- Outputs --
    /// Event for the controller to emit after this step.
    pub notice: Option<TransferEvent>,
}

impl HandshakeContext {
    pub fn new() -> Self {
        Self {
            events_in_state: 0,
            phase: Phase::Header,
            abort: None,
            notice: None,
        }
    }

    pub fn take_notice(&mut self) -> Option<TransferEvent> {
        self.notice.take()
    }

    pub fn in_header_phase(&self) -> bool {
        self.phase == Phase::Header
    }
}

impl Default for HandshakeContext {
    fn default() -> Self {
        Self::new()
    }
}
