//! UNPI framing over any async byte stream.

use futures::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};

use super::{FrameReader, FrameWriter, Transport};
use crate::error::{Result, TransportError};
use crate::protocol::{Frame, FrameDecoder, encode_frame};

const READ_BUFFER_SIZE: usize = 256;

/// Transport over a byte stream such as a serial port or socket.
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Wraps a stream.
    pub const fn new(stream: S) -> Self {
        Self { stream }
    }
}

impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    type Reader = StreamReader<ReadHalf<S>>;
    type Writer = StreamWriter<WriteHalf<S>>;

    fn split(self) -> (Self::Reader, Self::Writer) {
        let (reader, writer) = tokio::io::split(self.stream);
        (
            StreamReader {
                reader,
                decoder: FrameDecoder::new(),
            },
            StreamWriter { writer },
        )
    }
}

/// Reading half of a [`StreamTransport`].
#[derive(Debug)]
pub struct StreamReader<R> {
    reader: R,
    decoder: FrameDecoder,
}

impl<R> FrameReader for StreamReader<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    fn read_frame(&mut self) -> BoxFuture<'_, Result<Frame>> {
        Box::pin(async move {
            let mut buf = [0u8; READ_BUFFER_SIZE];
            loop {
                if let Some(frame) = self.decoder.decode().map_err(TransportError::Frame)? {
                    return Ok(frame);
                }

                let n = self
                    .reader
                    .read(&mut buf)
                    .await
                    .map_err(TransportError::Io)?;
                if n == 0 {
                    tracing::debug!("stream closed");
                    return Err(TransportError::Closed.into());
                }
                tracing::trace!("received {n} bytes");
                self.decoder.feed(&buf[..n]);
            }
        })
    }
}

/// Writing half of a [`StreamTransport`].
#[derive(Debug)]
pub struct StreamWriter<W> {
    writer: W,
}

impl<W> FrameWriter for StreamWriter<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn write_frame<'a>(&'a mut self, frame: &'a Frame) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let wire = encode_frame(frame).map_err(TransportError::Frame)?;
            tracing::trace!("sending frame: {} bytes", wire.len());
            self.writer
                .write_all(&wire)
                .await
                .map_err(TransportError::Io)?;
            self.writer.flush().await.map_err(TransportError::Io)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, FrameError};
    use crate::protocol::{CommandType, Subsystem};

    #[tokio::test]
    async fn test_frames_cross_a_duplex_stream() {
        let (host, device) = tokio::io::duplex(256);
        let (_host_reader, mut host_writer) = StreamTransport::new(host).split();
        let (mut device_reader, _device_writer) = StreamTransport::new(device).split();

        let frame = Frame::new(
            CommandType::SyncRequest,
            Subsystem::UTIL,
            0x10,
            vec![1, 2, 3],
        );
        host_writer.write_frame(&frame).await.unwrap();
        assert_eq!(device_reader.read_frame().await.unwrap(), frame);
    }

    #[tokio::test]
    async fn test_bad_checksum_is_recoverable() {
        let (host, mut device) = tokio::io::duplex(256);
        let (mut reader, _writer) = StreamTransport::new(host).split();

        device
            .write_all(&[0xfe, 0x00, 0x61, 0x01, 0x00])
            .await
            .unwrap();
        let good = Frame::new(CommandType::SyncResponse, Subsystem::SYS, 0x01, vec![]);
        device.write_all(&encode_frame(&good).unwrap()).await.unwrap();

        let err = reader.read_frame().await.unwrap_err();
        match err {
            Error::Transport(ref e @ TransportError::Frame(FrameError::Checksum { .. })) => {
                assert!(!e.is_fatal());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(reader.read_frame().await.unwrap(), good);
    }

    #[tokio::test]
    async fn test_eof_is_closed() {
        let (host, device) = tokio::io::duplex(64);
        let (mut reader, _writer) = StreamTransport::new(host).split();
        drop(device);

        let err = reader.read_frame().await.unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::Closed)));
    }
}
