//! MIDI Sample Dump Standard (SDS) codec and handshaking waveform transfer.
//!
//! - [`sds`]: wire messages, sample packing, captures and the transport port
//! - [`transfer`]: session, handshake state machine and the [`transfer()`] entry point
//! - [`config`]: per-transfer tunables
//!
//! Device discovery, audio file decoding and the command line live outside
//! this crate; they hand a [`Waveform`] and a [`Transport`] to [`transfer()`].

#![deny(unused_must_use)]

pub mod config;
pub mod error;
pub mod sds;
pub mod transfer;

pub use config::TransferConfig;
pub use error::{CodecError, ConfigError, TransferError, TransportFailure};
pub use sds::Transport;
pub use transfer::{EventSink, LogEventSink, TransferEvent, Waveform, transfer};
