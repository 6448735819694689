//! Transport layer for ZNP communication.
//!
//! A [`Transport`] splits into a [`FrameReader`] driven by the client's read
//! task and a [`FrameWriter`] owned by the engine, so reads and writes never
//! contend. [`StreamTransport`] frames any byte stream with UNPI; the serial
//! transport builds on it.

pub mod serial;
mod stream;

use futures::future::BoxFuture;

use crate::error::Result;
use crate::protocol::Frame;

/// Receiving half of a transport.
pub trait FrameReader: Send + 'static {
    /// Reads the next complete frame.
    fn read_frame(&mut self) -> BoxFuture<'_, Result<Frame>>;
}

/// Sending half of a transport.
pub trait FrameWriter: Send + 'static {
    /// Writes one frame.
    fn write_frame<'a>(&'a mut self, frame: &'a Frame) -> BoxFuture<'a, Result<()>>;
}

/// Trait for transport implementations.
pub trait Transport: Send + 'static {
    /// Reader half.
    type Reader: FrameReader;
    /// Writer half.
    type Writer: FrameWriter;

    /// Splits the transport into independently owned halves.
    fn split(self) -> (Self::Reader, Self::Writer);
}

pub use serial::{SerialConfig, SerialTransport};
pub use stream::{StreamReader, StreamTransport, StreamWriter};
