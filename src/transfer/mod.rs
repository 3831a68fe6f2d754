//! Outgoing waveform transfer.
//!
//! ```text
//!  transfer() ──▶ HandshakeController ──▶ HandshakeFsm (states, context)
//!                        │
//!                        ├──▶ TransferSession ──▶ DataPacket (packing, codec)
//!                        └──▶ EventSink
//! ```

pub mod controller;
pub mod events;
pub mod fsm;
pub mod session;

pub use controller::{HandshakeController, Waveform, sample_rate_to_period, transfer};
pub use events::{EventSink, LogEventSink, TransferEvent};
pub use fsm::StateId;
pub use session::TransferSession;
