//! Test support: a fake device on the far end of an in-memory stream.

use std::sync::Once;

use tokio::io::{DuplexStream, ReadHalf, WriteHalf};
use tracing_subscriber::EnvFilter;

use crate::client::{Znp, ZnpConfig};
use crate::protocol::{CommandType, Frame};
use crate::transport::{FrameReader, FrameWriter, StreamReader, StreamTransport, StreamWriter, Transport};

static INIT_TRACING: Once = Once::new();

/// Installs a test log subscriber filtered by `RUST_LOG`.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub struct FakeDevice {
    pub reader: StreamReader<ReadHalf<DuplexStream>>,
    pub writer: StreamWriter<WriteHalf<DuplexStream>>,
}

impl FakeDevice {
    /// Reads one request and answers it with `payload` under the same key.
    pub async fn answer(&mut self, payload: &'static [u8]) -> Frame {
        let request = self.receive().await;
        let response = Frame::new(
            CommandType::SyncResponse,
            request.subsystem,
            request.command,
            payload,
        );
        self.send(&response).await;
        request
    }

    pub async fn receive(&mut self) -> Frame {
        self.reader.read_frame().await.unwrap()
    }

    pub async fn send(&mut self, frame: &Frame) {
        self.writer.write_frame(frame).await.unwrap();
    }
}

pub fn connect_with(config: ZnpConfig) -> (Znp, FakeDevice) {
    init_tracing();
    let (host, device) = tokio::io::duplex(1024);
    let client = Znp::with_config(StreamTransport::new(host), config).unwrap();
    let (reader, writer) = StreamTransport::new(device).split();
    (client, FakeDevice { reader, writer })
}

pub fn connect() -> (Znp, FakeDevice) {
    connect_with(ZnpConfig::new())
}
