//! Error types for the sample dump codec and transfer loop.
//!
//! Two taxonomies with different handling:
//!
//! - [`CodecError`] is local and recoverable.  A malformed inbound frame
//!   is logged and discarded; it never ends a transfer on its own.
//! - [`TransferError`] is fatal.  It terminates the transfer and is the
//!   terminal result handed back to the caller.
//!
//! All variants are `Copy` so they can be passed through the handshake
//! state machine and event sink without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

/// Framing and field validation failures from the message codec and packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Missing `F0 7E` prefix or `F7` terminator.
    NotSysex,
    /// Fewer bytes than the envelope needs to carry a sub-ID.
    TooShort,
    /// Sub-ID byte does not select any known message.
    UnknownMessageType(u8),
    /// Message length does not match its fixed layout.
    BadSize { kind: &'static str, len: usize },
    /// Bit depth outside 8..=28.
    UnsupportedBitDepth(u8),
    /// Sample buffer longer than the 20-bit header length field.
    SampleCountOverflow(usize),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSysex => write!(f, "not a sysex message"),
            Self::TooShort => write!(f, "message too short"),
            Self::UnknownMessageType(id) => write!(f, "invalid message id {id:#04x}"),
            Self::BadSize { kind, len } => write!(f, "bad size {len} for {kind}"),
            Self::UnsupportedBitDepth(bits) => write!(f, "unsupported bit depth {bits}"),
            Self::SampleCountOverflow(n) => {
                write!(f, "{n} samples exceed the 20-bit length field")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from [`TransferConfig`](crate::config::TransferConfig) validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration text could not be parsed.
    Malformed,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed configuration"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transfer errors
// ---------------------------------------------------------------------------

/// Which side of the duplex link failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    Send,
    Receive,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send => write!(f, "send failed"),
            Self::Receive => write!(f, "receive failed"),
        }
    }
}

/// Terminal result of a failed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    /// Receiver answered with NAK.
    Rejected { packet: u8 },
    /// Receiver answered with CANCEL.
    Cancelled { packet: u8 },
    /// The underlying link reported an I/O failure.
    TransportFailure(TransportFailure),
    /// The transfer configuration is out of range.
    InvalidConfig(ConfigError),
    /// The waveform cannot be expressed on the wire.
    Codec(CodecError),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { packet } => write!(f, "transfer denied: NAK (packet {packet})"),
            Self::Cancelled { packet } => {
                write!(f, "transfer denied: CANCEL (packet {packet})")
            }
            Self::TransportFailure(e) => write!(f, "transport: {e}"),
            Self::InvalidConfig(e) => write!(f, "config: {e}"),
            Self::Codec(e) => write!(f, "codec: {e}"),
        }
    }
}

impl From<TransportFailure> for TransferError {
    fn from(e: TransportFailure) -> Self {
        Self::TransportFailure(e)
    }
}

impl From<ConfigError> for TransferError {
    fn from(e: ConfigError) -> Self {
        Self::InvalidConfig(e)
    }
}

impl From<CodecError> for TransferError {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

impl std::error::Error for CodecError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for TransferError {}
