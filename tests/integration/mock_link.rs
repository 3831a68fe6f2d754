//! Mock receiver link for integration tests.
//!
//! Records every message the controller sends and answers through a
//! caller-supplied responder, so tests can script a receiver without a
//! real MIDI port.

use sds_transfer::sds::{ControlKind, ControlPacket, Frame, Message, Transport};
use sds_transfer::{EventSink, TransferEvent};
use std::collections::VecDeque;
use std::time::Duration;

// ── Replies ───────────────────────────────────────────────────

/// One answer to a `receive` call.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Let the wait time out.
    Silence,
    /// Deliver these raw bytes.
    Raw(Vec<u8>),
}

pub fn control(kind: ControlKind, channel: u8, packet_number: u8) -> Reply {
    Reply::Raw(
        Message::from(ControlPacket {
            kind,
            channel,
            packet_number,
        })
        .to_bytes(),
    )
}

pub fn ack(packet_number: u8) -> Reply {
    control(ControlKind::Ack, 0, packet_number)
}

// ── MockLink ──────────────────────────────────────────────────

type Responder = Box<dyn FnMut(&Message) -> Vec<Reply>>;

pub struct MockLink {
    /// Decoded copy of every sent message.
    pub sent: Vec<Message>,
    /// Every sent byte, concatenated as on the wire.
    pub raw: Vec<u8>,
    pub receive_calls: usize,
    pending: VecDeque<Reply>,
    responder: Responder,
    fail_receive_at: Option<usize>,
}

#[allow(dead_code)]
impl MockLink {
    /// A receiver that never answers.
    pub fn silent() -> Self {
        Self::with_responder(|_| Vec::new())
    }

    /// Answers each sent message with whatever `responder` returns.
    pub fn with_responder(responder: impl FnMut(&Message) -> Vec<Reply> + 'static) -> Self {
        Self {
            sent: Vec::new(),
            raw: Vec::new(),
            receive_calls: 0,
            pending: VecDeque::new(),
            responder: Box::new(responder),
            fail_receive_at: None,
        }
    }

    /// A handshaking receiver that ACKs the header and every packet.
    pub fn acking() -> Self {
        Self::with_responder(|msg| match msg {
            Message::DumpHeader(_) => vec![ack(0)],
            Message::DataPacket(p) => vec![ack(p.packet_number)],
            _ => Vec::new(),
        })
    }

    /// Queue replies ahead of anything the responder produces.
    pub fn preload(mut self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.pending.extend(replies);
        self
    }

    pub fn fail_receive_at(mut self, call: usize) -> Self {
        self.fail_receive_at = Some(call);
        self
    }

    pub fn data_packets(&self) -> impl Iterator<Item = &sds_transfer::sds::DataPacket> {
        self.sent.iter().filter_map(|m| match m {
            Message::DataPacket(p) => Some(p),
            _ => None,
        })
    }
}

impl Transport for MockLink {
    type Error = String;

    fn send(&mut self, msg: &[u8]) -> Result<(), String> {
        let decoded = Message::decode(msg).map_err(|e| e.to_string())?;
        self.raw.extend_from_slice(msg);
        let replies = (self.responder)(&decoded);
        self.pending.extend(replies);
        self.sent.push(decoded);
        Ok(())
    }

    fn receive(&mut self, _timeout: Duration) -> Result<Option<Frame>, String> {
        self.receive_calls += 1;
        if self.fail_receive_at == Some(self.receive_calls) {
            return Err("port closed".into());
        }
        match self.pending.pop_front() {
            None | Some(Reply::Silence) => Ok(None),
            Some(Reply::Raw(bytes)) => Frame::from_slice(&bytes)
                .map(Some)
                .map_err(|()| "frame too large".into()),
        }
    }
}

// ── Recording sink ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<TransferEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TransferEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &TransferEvent) {
        self.events.push(*event);
    }
}
