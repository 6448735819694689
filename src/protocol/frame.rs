//! Frame types and UNPI framing for the ZNP serial protocol.
//!
//! Every frame on the wire is wrapped as:
//! ```text
//! ┌──────┬────────┬────────┬────────┬─────────────────┬────────┐
//! │ 0xfe │  len   │  cmd0  │  cmd1  │    payload      │  fcs   │
//! │  1   │   1    │   1    │   1    │   len bytes     │   1    │
//! └──────┴────────┴────────┴────────┴─────────────────┴────────┘
//! ```
//! `cmd0` carries the command type in its top three bits and the subsystem in
//! the low five. `fcs` is the XOR of every byte from `len` through the payload.

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::FrameError;

/// Start-of-frame byte.
pub const SOF: u8 = 0xfe;

/// Largest payload the radio accepts.
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// Bytes surrounding the payload: SOF, length, two header bytes and FCS.
pub const FRAME_OVERHEAD: usize = 5;

/// Type of a ZNP frame, from the top three bits of `cmd0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandType {
    /// Synchronous request (SREQ).
    SyncRequest = 1,
    /// Asynchronous request or indication (AREQ).
    AsyncRequest = 2,
    /// Synchronous response (SRSP).
    SyncResponse = 3,
}

impl CommandType {
    /// Converts the three type bits into a command type.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(Self::SyncRequest),
            2 => Some(Self::AsyncRequest),
            3 => Some(Self::SyncResponse),
            _ => None,
        }
    }
}

/// Command namespace of a frame.
///
/// Only the low five bits are significant. Unnamed ids stay representable so
/// that error frames naming any subsystem can be reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subsystem(u8);

impl Subsystem {
    /// Reserved; device error frames are sent here.
    pub const RES0: Self = Self(0);
    /// System interface.
    pub const SYS: Self = Self(1);
    /// MAC layer.
    pub const MAC: Self = Self(2);
    /// Network layer.
    pub const NWK: Self = Self(3);
    /// Application framework.
    pub const AF: Self = Self(4);
    /// Zigbee device object.
    pub const ZDO: Self = Self(5);
    /// Simple API.
    pub const SAPI: Self = Self(6);
    /// Utilities.
    pub const UTIL: Self = Self(7);
    /// Debug interface.
    pub const DEBUG: Self = Self(8);
    /// Application interface.
    pub const APP: Self = Self(9);
    /// Application configuration (BDB commissioning).
    pub const APP_CNF: Self = Self(15);
    /// Green Power.
    pub const GREENPOWER: Self = Self(21);

    /// Creates a subsystem from the low five bits of `id`.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id & 0x1f)
    }

    /// Returns the numeric id.
    #[must_use]
    pub const fn id(self) -> u8 {
        self.0
    }

    /// Returns the conventional name, if the id is assigned.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            0 => "RES0",
            1 => "SYS",
            2 => "MAC",
            3 => "NWK",
            4 => "AF",
            5 => "ZDO",
            6 => "SAPI",
            7 => "UTIL",
            8 => "DEBUG",
            9 => "APP",
            15 => "APP_CNF",
            21 => "GREENPOWER",
            _ => return None,
        })
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:02x}", self.0),
        }
    }
}

/// Correlation key of a command: subsystem plus command id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandKey {
    /// Subsystem.
    pub subsystem: Subsystem,
    /// Command id within the subsystem.
    pub command: u8,
}

impl CommandKey {
    /// Key of the SRSP the device sends when it rejects a request.
    pub const DEVICE_ERROR: Self = Self::new(Subsystem::RES0, 0x00);

    /// Creates a key.
    #[must_use]
    pub const fn new(subsystem: Subsystem, command: u8) -> Self {
        Self { subsystem, command }
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/0x{:02x}", self.subsystem, self.command)
    }
}

/// One ZNP frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame type.
    pub command_type: CommandType,
    /// Subsystem.
    pub subsystem: Subsystem,
    /// Command id.
    pub command: u8,
    /// Encoded payload.
    pub payload: Bytes,
}

impl Frame {
    /// Creates a frame.
    #[must_use]
    pub fn new(
        command_type: CommandType,
        subsystem: Subsystem,
        command: u8,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            command_type,
            subsystem,
            command,
            payload: payload.into(),
        }
    }

    /// Returns the frame's correlation key.
    #[must_use]
    pub const fn key(&self) -> CommandKey {
        CommandKey::new(self.subsystem, self.command)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.command_type {
            CommandType::SyncRequest => "SREQ",
            CommandType::AsyncRequest => "AREQ",
            CommandType::SyncResponse => "SRSP",
        };
        write!(f, "{kind} {} [{}]", self.key(), hex::encode(&self.payload))
    }
}

fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// Wraps a frame for the wire.
///
/// # Errors
///
/// Returns [`FrameError::TooLarge`] if the payload exceeds [`MAX_PAYLOAD_SIZE`].
pub fn encode(frame: &Frame) -> Result<Bytes, FrameError> {
    let len = frame.payload.len();
    if len > MAX_PAYLOAD_SIZE {
        return Err(FrameError::TooLarge {
            size: len,
            max: MAX_PAYLOAD_SIZE,
        });
    }

    let mut buf = BytesMut::with_capacity(FRAME_OVERHEAD + len);
    buf.put_u8(SOF);
    buf.put_u8(len as u8);
    buf.put_u8(((frame.command_type as u8) << 5) | frame.subsystem.id());
    buf.put_u8(frame.command);
    buf.put_slice(&frame.payload);
    let fcs = checksum(&buf[1..]);
    buf.put_u8(fcs);
    Ok(buf.freeze())
}

/// Frame decoder that handles partial data and resynchronises on garbage.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    /// Creates a new frame decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds data into the decoder.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Attempts to decode the next complete frame.
    ///
    /// Returns `Ok(Some(frame))` if a complete frame was decoded, `Ok(None)`
    /// if more data is needed. Bytes before a start-of-frame marker are
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns a `FrameError` if the checksum does not match or the header
    /// names an unknown command type. The offending bytes are consumed so the
    /// next call continues with the following frame.
    pub fn decode(&mut self) -> Result<Option<Frame>, FrameError> {
        match self.buffer.iter().position(|&b| b == SOF) {
            Some(0) => {}
            Some(skip) => {
                tracing::trace!("discarding {skip} bytes before start of frame");
                self.buffer.advance(skip);
            }
            None => {
                self.buffer.clear();
                return Ok(None);
            }
        }

        if self.buffer.len() < FRAME_OVERHEAD {
            return Ok(None);
        }

        let len = self.buffer[1] as usize;
        let total = FRAME_OVERHEAD + len;
        if self.buffer.len() < total {
            return Ok(None);
        }

        let expected = checksum(&self.buffer[1..total - 1]);
        let got = self.buffer[total - 1];
        if expected != got {
            // Drop only the SOF so a real frame hidden inside is still found.
            self.buffer.advance(1);
            return Err(FrameError::Checksum { expected, got });
        }

        let mut raw = self.buffer.split_to(total);
        raw.advance(2);
        let cmd0 = raw.get_u8();
        let command = raw.get_u8();
        raw.truncate(len);

        let command_type = CommandType::from_bits(cmd0 >> 5)
            .ok_or(FrameError::InvalidCommandType(cmd0 >> 5))?;

        Ok(Some(Frame {
            command_type,
            subsystem: Subsystem::new(cmd0),
            command,
            payload: raw.freeze(),
        }))
    }

    /// Returns the number of bytes currently buffered.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ping() -> Frame {
        Frame::new(
            CommandType::SyncRequest,
            Subsystem::SYS,
            0x01,
            Bytes::new(),
        )
    }

    #[test]
    fn test_encode_simple() {
        let wire = encode(&ping()).unwrap();
        assert_eq!(wire.as_ref(), &[0xfe, 0x00, 0x21, 0x01, 0x20]);
    }

    #[test]
    fn test_encode_too_large() {
        let frame = Frame::new(
            CommandType::AsyncRequest,
            Subsystem::AF,
            0x01,
            vec![0u8; MAX_PAYLOAD_SIZE + 1],
        );
        assert!(matches!(
            encode(&frame),
            Err(FrameError::TooLarge { size: 251, .. })
        ));
    }

    #[test]
    fn test_round_trip() {
        let frame = Frame::new(
            CommandType::SyncResponse,
            Subsystem::SYS,
            0x01,
            vec![0x59, 0x06],
        );
        let mut decoder = FrameDecoder::new();
        decoder.feed(&encode(&frame).unwrap());
        assert_eq!(decoder.decode().unwrap(), Some(frame));
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_decode_partial_frame() {
        let wire = encode(&ping()).unwrap();
        let mut decoder = FrameDecoder::new();

        decoder.feed(&wire[..3]);
        assert_eq!(decoder.decode().unwrap(), None);

        decoder.feed(&wire[3..]);
        assert_eq!(decoder.decode().unwrap(), Some(ping()));
    }

    #[test]
    fn test_decode_skips_garbage() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&[0x00, 0x13, 0x37]);
        decoder.feed(&encode(&ping()).unwrap());
        assert_eq!(decoder.decode().unwrap(), Some(ping()));
    }

    #[test]
    fn test_decode_bad_checksum() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&[0xfe, 0x00, 0x21, 0x01, 0x21]);
        decoder.feed(&encode(&ping()).unwrap());

        assert!(matches!(
            decoder.decode(),
            Err(FrameError::Checksum {
                expected: 0x20,
                got: 0x21
            })
        ));
        assert_eq!(decoder.decode().unwrap(), Some(ping()));
    }

    #[test]
    fn test_decode_invalid_command_type() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&[0xfe, 0x00, 0xa1, 0x01, 0xa0]);
        assert!(matches!(
            decoder.decode(),
            Err(FrameError::InvalidCommandType(5))
        ));
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_decode_multiple_frames() {
        let second = Frame::new(
            CommandType::AsyncRequest,
            Subsystem::ZDO,
            0xc0,
            vec![0x09],
        );
        let mut decoder = FrameDecoder::new();
        decoder.feed(&encode(&ping()).unwrap());
        decoder.feed(&encode(&second).unwrap());

        assert_eq!(decoder.decode().unwrap(), Some(ping()));
        assert_eq!(decoder.decode().unwrap(), Some(second));
        assert_eq!(decoder.decode().unwrap(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Subsystem::APP_CNF.to_string(), "APP_CNF");
        assert_eq!(Subsystem::new(0x1e).to_string(), "0x1e");
        assert_eq!(CommandKey::new(Subsystem::SYS, 0x01).to_string(), "SYS/0x01");
        let frame = Frame::new(CommandType::SyncResponse, Subsystem::SYS, 2, vec![0xab]);
        assert_eq!(frame.to_string(), "SRSP SYS/0x02 [ab]");
    }
}
