//! Handshake controller: drives one waveform dump over a [`Transport`].
//!
//! Flow: header → (ACK | WAIT.. | timeout) → N × (packet → wait ≤ 20ms) → done
//!
//! Every wait outcome becomes a [`HandshakeEvent`] for the state machine;
//! the controller only decides *when* to send and *how long* to wait:
//!
//! | State            | Sends              | Waits for          |
//! |------------------|--------------------|--------------------|
//! | `AwaitHeaderAck` | –                  | header timeout     |
//! | `SendingData`    | next data packet   | packet timeout     |
//! | `WaitingPaused`  | –                  | phase's timeout    |

use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::config::TransferConfig;
use crate::error::{TransferError, TransportFailure};
use crate::sds::message::{DumpHeader, Message};
use crate::sds::transport::Transport;

use super::events::{EventSink, TransferEvent};
use super::fsm::context::{HandshakeContext, HandshakeEvent};
use super::fsm::{HandshakeFsm, StateId, states};
use super::session::TransferSession;

/// Sample period in nanoseconds, truncated.  A zero rate yields 0.
pub fn sample_rate_to_period(rate_hz: u32) -> u32 {
    if rate_hz == 0 {
        return 0;
    }
    1_000_000_000 / rate_hz
}

/// Mono sample buffer handed to [`transfer`].
#[derive(Debug, Clone, Copy)]
pub struct Waveform<'a> {
    pub samples: &'a [i32],
    pub sample_rate: u32,
    /// Significant bits per sample, 8..=28.
    pub bit_depth: u8,
}

/// Send `waveform` to the receiver addressed by `config`.
///
/// Returns once every data packet is out, or with the fatal error that
/// stopped the transfer.
pub fn transfer<T, E>(
    config: &TransferConfig,
    waveform: &Waveform<'_>,
    transport: &mut T,
    sink: &mut E,
) -> Result<(), TransferError>
where
    T: Transport,
    E: EventSink,
{
    config.validate()?;

    let mut header = DumpHeader {
        loop_start: config.loop_start,
        loop_end: config.loop_end,
        loop_type: config.loop_type,
        ..DumpHeader::new(
            config.channel,
            config.slot,
            waveform.bit_depth,
            sample_rate_to_period(waveform.sample_rate),
        )
    };
    let mut session = TransferSession::new(waveform.samples, &mut header)?;

    HandshakeController::new(config, transport, sink).run(&header, &mut session)
}

pub struct HandshakeController<'a, T, E> {
    channel: u8,
    header_timeout: Duration,
    packet_timeout: Duration,
    progress_step: u8,
    transport: &'a mut T,
    sink: &'a mut E,
    fsm: HandshakeFsm,
    ctx: HandshakeContext,
    last_progress: u8,
    out: Vec<u8>,
}

impl<'a, T: Transport, E: EventSink> HandshakeController<'a, T, E> {
    pub fn new(config: &TransferConfig, transport: &'a mut T, sink: &'a mut E) -> Self {
        Self {
            channel: config.channel,
            header_timeout: config.header_timeout(),
            packet_timeout: config.packet_timeout(),
            progress_step: config.progress_step_percent,
            transport,
            sink,
            fsm: HandshakeFsm::new(states::build_state_table(), StateId::AwaitHeaderAck),
            ctx: HandshakeContext::new(),
            last_progress: 0,
            out: Vec::with_capacity(crate::sds::codec::DATA_PACKET_SIZE),
        }
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Run the header handshake and the data loop to completion.
    pub fn run(
        &mut self,
        header: &DumpHeader,
        session: &mut TransferSession<'_>,
    ) -> Result<(), TransferError> {
        self.fsm.start(&mut self.ctx);

        self.out.clear();
        header.encode(&mut self.out);
        self.send_out()?;
        self.sink.emit(&TransferEvent::HeaderSent);

        while self.ctx.in_header_phase() {
            let event = self.receive_control(self.header_timeout)?;
            self.step(event)?;
        }

        while !session.done() {
            if self.state() == StateId::SendingData {
                if let Some(packet) = session.next_message() {
                    self.out.clear();
                    packet.encode(&mut self.out);
                    debug!(">> packet {}", packet.packet_number);
                    self.send_out()?;
                }
            }
            let event = self.receive_control(self.packet_timeout)?;
            self.step(event)?;
            self.report_progress(session.progress());
        }

        self.report_progress(session.progress());
        self.fsm.force_transition(StateId::Done, &mut self.ctx);
        self.sink.emit(&TransferEvent::Completed {
            packets: session.packets_sent(),
        });
        Ok(())
    }

    /// Feed one event to the state machine and forward its outputs.
    fn step(&mut self, event: HandshakeEvent) -> Result<(), TransferError> {
        self.fsm.handle(event, &mut self.ctx);
        if let Some(notice) = self.ctx.take_notice() {
            self.sink.emit(&notice);
        }
        match self.ctx.abort {
            Some(err) if self.state() == StateId::Aborted => {
                self.sink.emit(&TransferEvent::Aborted(err));
                Err(err)
            }
            _ => Ok(()),
        }
    }

    /// Abort from outside the state machine (transport failure).
    fn fail(&mut self, err: TransferError) -> TransferError {
        self.ctx.abort = Some(err);
        self.fsm.force_transition(StateId::Aborted, &mut self.ctx);
        self.sink.emit(&TransferEvent::Aborted(err));
        err
    }

    fn send_out(&mut self) -> Result<(), TransferError> {
        if let Err(e) = self.transport.send(&self.out) {
            warn!("transport send failed: {:?}", e);
            return Err(self.fail(TransportFailure::Send.into()));
        }
        Ok(())
    }

    /// Wait up to `timeout` for a control message on our channel.
    ///
    /// Malformed frames, other message types and other channels are
    /// dropped; the wait continues for whatever is left of the window.
    fn receive_control(&mut self, timeout: Duration) -> Result<HandshakeEvent, TransferError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let frame = match self.transport.receive(remaining) {
                Ok(Some(frame)) => frame,
                Ok(None) => return Ok(HandshakeEvent::Timeout),
                Err(e) => {
                    warn!("transport receive failed: {:?}", e);
                    return Err(self.fail(TransportFailure::Receive.into()));
                }
            };

            match Message::decode(&frame) {
                Ok(Message::Control(c)) if c.channel == self.channel => {
                    return Ok(HandshakeEvent::control(c.kind, c.packet_number));
                }
                Ok(other) => debug!("ignoring message {:?}", other),
                Err(e) => warn!("msg {:02x?}: {}", &frame[..], e),
            }

            if Instant::now() >= deadline {
                return Ok(HandshakeEvent::Timeout);
            }
        }
    }

    fn report_progress(&mut self, p: u8) {
        let stepped = p >= self.last_progress.saturating_add(self.progress_step);
        let finished = p == 100 && self.last_progress != 100;
        if stepped || finished {
            self.last_progress = p;
            self.sink.emit(&TransferEvent::Progress(p));
        }
    }
}
