//! Error types for the znp library.

use thiserror::Error;

use crate::protocol::{CommandKey, DeviceErrorCode, Frame, Subsystem};

/// The main error type for znp operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Payload could not be decoded into the requested record.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Record could not be encoded into a payload.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// A record's wire layout is inconsistent.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The device rejected the request with an error frame.
    #[error("device error: {code}")]
    Device { code: DeviceErrorCode },

    /// No response arrived before the deadline.
    #[error(
        "timed out after {timeout_ms}ms waiting for response to command 0x{command:02x} sent to subsystem {subsystem}"
    )]
    Timeout {
        subsystem: Subsystem,
        command: u8,
        timeout_ms: u64,
    },

    /// A response arrived for which no request is pending.
    #[error("unmatched response received: {frame}")]
    UnmatchedResponse { frame: Frame },

    /// An asynchronous frame arrived whose key has no prototype.
    #[error("unknown async command received: {key}")]
    UnknownAsyncCommand { key: CommandKey },

    /// The device sent a frame of a type a client never receives.
    #[error("unexpected frame received: {frame}")]
    UnexpectedFrame { frame: Frame },

    /// A request with the same key is already waiting for its response.
    #[error("a request for {key} is already pending")]
    DuplicateTransaction { key: CommandKey },

    /// Transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The request was abandoned because the client shut down.
    #[error("request cancelled: client shut down")]
    Cancelled,

    /// The client is no longer running.
    #[error("not connected")]
    NotConnected,
}

impl Error {
    /// Returns the device error code if this is a device error.
    #[must_use]
    pub const fn device_code(&self) -> Option<DeviceErrorCode> {
        match self {
            Self::Device { code } => Some(*code),
            _ => None,
        }
    }

    /// Returns true if this is a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Payload decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The payload ended before the record was complete.
    #[error("unexpected end of payload: need {needed} more bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// A raw string field did not contain valid UTF-8.
    #[error("field {field} is not valid UTF-8")]
    InvalidString { field: &'static str },
}

/// Payload encoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// A hex-address field did not hold a `0x`-prefixed value of the declared width.
    #[error("field {field}: invalid hex value {value:?} for a {width}-byte address")]
    InvalidHex {
        field: &'static str,
        value: String,
        width: usize,
    },

    /// A dynamic field is longer than its length prefix can express.
    #[error("field {field}: length {len} exceeds the {width}-byte length prefix")]
    LengthOverflow {
        field: &'static str,
        len: usize,
        width: usize,
    },

    /// An integer does not fit in its bounded width.
    #[error("field {field}: value {value} does not fit in {width} bytes")]
    ValueOverflow {
        field: &'static str,
        value: u64,
        width: usize,
    },
}

/// Wire layout errors, raised once when a record type is registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The field carries a tag the codec does not know.
    #[error("{record}.{field}: unknown tag `{tag}`")]
    UnknownTag {
        record: &'static str,
        field: &'static str,
        tag: &'static str,
    },

    /// The tag value could not be parsed.
    #[error("{record}.{field}: invalid value {value:?} for tag `{tag}`")]
    InvalidTagValue {
        record: &'static str,
        field: &'static str,
        tag: &'static str,
        value: &'static str,
    },

    /// The tag names a width the codec cannot express.
    #[error("{record}.{field}: unsupported width {value:?} for tag `{tag}`")]
    UnsupportedWidth {
        record: &'static str,
        field: &'static str,
        tag: &'static str,
        value: &'static str,
    },

    /// The tag does not apply to the field's type.
    #[error("{record}.{field}: tag `{tag}` does not apply to this field type")]
    TagMismatch {
        record: &'static str,
        field: &'static str,
        tag: &'static str,
    },

    /// A bit-mask role was declared without a mask.
    #[error("{record}.{field}: bitmask role declared without a `bits` mask")]
    MissingMask {
        record: &'static str,
        field: &'static str,
    },

    /// A masked field appears outside an open bit-mask run.
    #[error("{record}.{field}: masked field outside a bitmask run")]
    OrphanBitField {
        record: &'static str,
        field: &'static str,
    },

    /// A bit-mask run was opened but never closed.
    #[error("{record}.{field}: bitmask run is never closed")]
    UnterminatedRun {
        record: &'static str,
        field: &'static str,
    },

    /// Two fields of one run claim the same bits.
    #[error("{record}.{field}: mask overlaps an earlier field of the same run")]
    OverlappingMask {
        record: &'static str,
        field: &'static str,
    },

    /// A mask does not fit in the run's container.
    #[error("{record}.{field}: mask exceeds the {width}-byte run container")]
    MaskTooWide {
        record: &'static str,
        field: &'static str,
        width: usize,
    },

    /// A bound is wider than the field's declared integer.
    #[error("{record}.{field}: bound of {bound} bytes exceeds declared width of {declared}")]
    BoundTooWide {
        record: &'static str,
        field: &'static str,
        bound: usize,
        declared: usize,
    },

    /// A presence condition names a field that is not an earlier integer sibling.
    #[error("{record}.{field}: condition refers to unknown or later field `{target}`")]
    InvalidCondition {
        record: &'static str,
        field: &'static str,
        target: String,
    },
}

/// Errors raised by the transport collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Serial port error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame encoding/decoding error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The transport reached end of stream.
    #[error("transport closed")]
    Closed,
}

impl TransportError {
    /// Returns true if the transport can no longer deliver frames.
    ///
    /// Framing errors are recoverable: the decoder resynchronises on the next
    /// start-of-frame byte.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Frame(_))
    }
}

/// Frame-specific errors.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Frame payload exceeds maximum size.
    #[error("frame too large: {size} bytes exceeds maximum {max}")]
    TooLarge { size: usize, max: usize },

    /// The frame check sequence did not match.
    #[error("checksum mismatch: expected 0x{expected:02x}, got 0x{got:02x}")]
    Checksum { expected: u8, got: u8 },

    /// The header named a command type outside SREQ/AREQ/SRSP.
    #[error("invalid command type {0}")]
    InvalidCommandType(u8),
}

/// Result type alias for znp operations.
pub type Result<T> = std::result::Result<T, Error>;
