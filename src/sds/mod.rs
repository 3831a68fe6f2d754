//! MIDI Sample Dump Standard wire layer.
//!
//! ```text
//!  i32 samples ──▶ packing ──▶ DataPacket ──▶ codec ──▶ F0 7E .. F7 ──▶ Transport
//!                                              ▲
//!  Transport ──▶ InboundQueue ──▶ codec ───────┘  (ControlPacket back in)
//! ```
//!
//! - [`message`]  : closed set of protocol messages
//! - [`codec`]    : byte-exact encode/decode and data-packet checksum
//! - [`packing`]  : 7-bit-clean sample packing for 8..=28 bit depths
//! - [`capture`]  : flat `.sds` capture framing and whole-transfer rendering
//! - [`transport`]: duplex link port and the bounded inbound frame queue

pub mod capture;
pub mod codec;
pub mod message;
pub mod packing;
pub mod transport;

pub use capture::{Capture, CaptureError, render_transfer, split_frames};
pub use message::{
    ControlKind, ControlPacket, DataPacket, DumpHeader, DumpRequest, LoopType, Message, PAYLOAD_LEN,
};
pub use packing::BitDepth;
pub use transport::{Frame, InboundQueue, QueuedTransport, Transport};
