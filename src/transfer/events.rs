//! Outbound transfer events and the sink port they flow through.
//!
//! ```text
//!   HandshakeController ──▶ EventSink ──▶ LogEventSink (serial log)
//!                                    └──▶ progress bar, GUI, test recorder, ...
//! ```

use log::{info, warn};

use crate::error::TransferError;

/// Structured events emitted while a transfer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEvent {
    /// The dump header went out on the link.
    HeaderSent,

    /// The receiver acknowledged the header.
    HeaderAccepted,

    /// No response to the header; sending blind.
    AssumedNonHandshaking,

    /// The receiver asked us to hold off.
    Paused { packet: u8 },

    /// A paused data phase was acknowledged and continues.
    Resumed,

    /// Coarse completion percentage.
    Progress(u8),

    /// Every data packet was sent.
    Completed { packets: usize },

    /// The transfer ended with a fatal error.
    Aborted(TransferError),
}

/// Domain → outside world.  Adapters decide where events go.
pub trait EventSink {
    fn emit(&mut self, event: &TransferEvent);
}

/// Adapter that logs every [`TransferEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &TransferEvent) {
        match event {
            TransferEvent::HeaderSent => info!("requesting transfer"),
            TransferEvent::HeaderAccepted => info!("<< ACK"),
            TransferEvent::AssumedNonHandshaking => {
                info!("receiver did not respond, assumed to be non-handshaking");
            }
            TransferEvent::Paused { packet } => info!("<< WAIT (packet {})", packet),
            TransferEvent::Resumed => info!("resuming transfer"),
            TransferEvent::Progress(p) => info!("progress: {}%", p),
            TransferEvent::Completed { packets } => {
                info!("transfer complete ({} packets)", packets);
            }
            TransferEvent::Aborted(e) => warn!("transfer aborted: {}", e),
        }
    }
}
