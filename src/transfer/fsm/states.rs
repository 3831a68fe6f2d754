//! Concrete state handler functions and table builder.
//!
//! ```text
//!  AWAIT_HEADER_ACK ──[ACK 0 | timeout]──▶ SENDING_DATA ──[session empty]──▶ DONE
//!      │     ▲                               │     ▲
//!   [WAIT] [ACK n≠0]                      [WAIT] [ACK]
//!      ▼     │                               ▼     │
//!  WAITING_PAUSED (header)            WAITING_PAUSED (data)
//!
//!  WAITING_PAUSED (header) ──[ACK 0]──▶ SENDING_DATA
//!  Any live state ──[NAK | CANCEL]──▶ ABORTED
//! ```
//!
//! A timeout while paused never resumes: only the receiver can lift a WAIT.

use super::context::{HandshakeContext, HandshakeEvent, Phase};
use super::{StateDescriptor, StateId};
use crate::error::TransferError;
use crate::sds::message::ControlKind;
use crate::transfer::events::TransferEvent;
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the state table.  Called once per transfer.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: AwaitHeaderAck
        StateDescriptor {
            id: StateId::AwaitHeaderAck,
            name: "AwaitHeaderAck",
            on_enter: Some(await_header_enter),
            on_exit: None,
            on_event: await_header_event,
        },
        // Index 1: SendingData
        StateDescriptor {
            id: StateId::SendingData,
            name: "SendingData",
            on_enter: Some(sending_enter),
            on_exit: None,
            on_event: sending_event,
        },
        // Index 2: WaitingPaused
        StateDescriptor {
            id: StateId::WaitingPaused,
            name: "WaitingPaused",
            on_enter: None,
            on_exit: None,
            on_event: waiting_event,
        },
        // Index 3: Done
        StateDescriptor {
            id: StateId::Done,
            name: "Done",
            on_enter: None,
            on_exit: None,
            on_event: terminal_event,
        },
        // Index 4: Aborted
        StateDescriptor {
            id: StateId::Aborted,
            name: "Aborted",
            on_enter: Some(aborted_enter),
            on_exit: None,
            on_event: terminal_event,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Shared guards
// ═══════════════════════════════════════════════════════════════════════════

/// NAK and CANCEL end the transfer in every live state.
fn reject(ctx: &mut HandshakeContext, kind: ControlKind, packet: u8) -> Option<StateId> {
    let err = match kind {
        ControlKind::Nak => TransferError::Rejected { packet },
        ControlKind::Cancel => TransferError::Cancelled { packet },
        ControlKind::Ack | ControlKind::Wait => return None,
    };
    warn!("<< {} (packet {})", kind.name(), packet);
    ctx.abort = Some(err);
    Some(StateId::Aborted)
}

fn pause(ctx: &mut HandshakeContext, packet: u8) -> Option<StateId> {
    ctx.notice = Some(TransferEvent::Paused { packet });
    Some(StateId::WaitingPaused)
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAIT_HEADER_ACK: header sent, waiting for the receiver's verdict
// ═══════════════════════════════════════════════════════════════════════════

fn await_header_enter(ctx: &mut HandshakeContext) {
    ctx.phase = Phase::Header;
}

fn await_header_event(ctx: &mut HandshakeContext, event: HandshakeEvent) -> Option<StateId> {
    match event {
        HandshakeEvent::Timeout => {
            ctx.notice = Some(TransferEvent::AssumedNonHandshaking);
            Some(StateId::SendingData)
        }
        HandshakeEvent::Control {
            kind: ControlKind::Ack,
            packet_number: 0,
        } => {
            ctx.notice = Some(TransferEvent::HeaderAccepted);
            Some(StateId::SendingData)
        }
        HandshakeEvent::Control {
            kind: ControlKind::Ack,
            packet_number,
        } => {
            debug!("ignoring ACK for packet {} while awaiting header", packet_number);
            None
        }
        HandshakeEvent::Control {
            kind: ControlKind::Wait,
            packet_number,
        } => pause(ctx, packet_number),
        HandshakeEvent::Control {
            kind,
            packet_number,
        } => reject(ctx, kind, packet_number),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  SENDING_DATA: one packet per step, responses are advisory
// ═══════════════════════════════════════════════════════════════════════════

fn sending_enter(ctx: &mut HandshakeContext) {
    if ctx.phase == Phase::Header {
        info!("SENDING: header phase complete");
    }
    ctx.phase = Phase::Data;
}

fn sending_event(ctx: &mut HandshakeContext, event: HandshakeEvent) -> Option<StateId> {
    match event {
        // Silence is the normal cadence of a non-handshaking receiver.
        HandshakeEvent::Timeout => None,
        HandshakeEvent::Control {
            kind: ControlKind::Ack,
            packet_number,
        } => {
            debug!("<< ACK (packet {})", packet_number);
            None
        }
        HandshakeEvent::Control {
            kind: ControlKind::Wait,
            packet_number,
        } => pause(ctx, packet_number),
        HandshakeEvent::Control {
            kind,
            packet_number,
        } => reject(ctx, kind, packet_number),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  WAITING_PAUSED: receiver asked us to hold; poll until it speaks again
// ═══════════════════════════════════════════════════════════════════════════

fn waiting_event(ctx: &mut HandshakeContext, event: HandshakeEvent) -> Option<StateId> {
    match event {
        HandshakeEvent::Timeout
        | HandshakeEvent::Control {
            kind: ControlKind::Wait,
            ..
        } => None,
        HandshakeEvent::Control {
            kind: ControlKind::Ack,
            packet_number,
        } => {
            info!("WAIT lifted after {} polls", ctx.events_in_state.saturating_sub(1));
            match ctx.phase {
                Phase::Data => {
                    ctx.notice = Some(TransferEvent::Resumed);
                    Some(StateId::SendingData)
                }
                Phase::Header if packet_number == 0 => {
                    ctx.notice = Some(TransferEvent::HeaderAccepted);
                    Some(StateId::SendingData)
                }
                Phase::Header => Some(StateId::AwaitHeaderAck),
            }
        }
        HandshakeEvent::Control {
            kind,
            packet_number,
        } => reject(ctx, kind, packet_number),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  DONE / ABORTED
// ═══════════════════════════════════════════════════════════════════════════

fn terminal_event(_ctx: &mut HandshakeContext, _event: HandshakeEvent) -> Option<StateId> {
    None
}

fn aborted_enter(ctx: &mut HandshakeContext) {
    if let Some(err) = ctx.abort {
        warn!("ABORTED: {}", err);
    }
}
