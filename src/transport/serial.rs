//! Serial port transport.
//!
//! ZNP radios are usually CC2531/CC2652 sticks exposed as a USB serial port.

use std::time::Duration;

use tokio::io::{AsyncReadExt, ReadHalf, WriteHalf};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use super::{StreamReader, StreamTransport, StreamWriter, Transport};
use crate::error::{Result, TransportError};

/// Default baud rate for ZNP firmware.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default delay between opening the port and the first request.
pub const DEFAULT_CONNECTION_DELAY: Duration = Duration::from_millis(300);

/// How long stale bytes are drained after opening the port.
const DRAIN_WINDOW: Duration = Duration::from_millis(500);

/// Configuration for serial transport.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Serial port path (e.g., "/dev/ttyACM0" or "COM3").
    pub port: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Level the RTS line is driven to after opening.
    pub rts: bool,
    /// Delay after connection before sending commands.
    pub connection_delay: Duration,
}

impl SerialConfig {
    /// Creates a new serial configuration with default settings.
    #[must_use]
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            rts: true,
            connection_delay: DEFAULT_CONNECTION_DELAY,
        }
    }

    /// Sets the baud rate.
    #[must_use]
    pub const fn baud_rate(mut self, rate: u32) -> Self {
        self.baud_rate = rate;
        self
    }

    /// Sets the RTS level.
    #[must_use]
    pub const fn rts(mut self, level: bool) -> Self {
        self.rts = level;
        self
    }

    /// Sets the connection delay.
    #[must_use]
    pub const fn connection_delay(mut self, delay: Duration) -> Self {
        self.connection_delay = delay;
        self
    }
}

/// Serial transport for ZNP communication.
pub struct SerialTransport {
    inner: StreamTransport<SerialStream>,
}

impl SerialTransport {
    /// Opens the port, waits for the radio to settle and drains stale bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be opened.
    pub async fn open(config: SerialConfig) -> Result<Self> {
        tracing::info!("connecting to serial port: {}", config.port);

        let mut stream = tokio_serial::new(&config.port, config.baud_rate)
            .open_native_async()
            .map_err(TransportError::Serial)?;

        if let Err(e) = tokio_serial::SerialPort::write_request_to_send(&mut stream, config.rts) {
            tracing::warn!("failed to set RTS: {}", e);
        }

        tokio::time::sleep(config.connection_delay).await;

        let mut buf = [0u8; 256];
        let mut total_drained = 0usize;
        let drain_deadline = tokio::time::Instant::now() + DRAIN_WINDOW;
        while tokio::time::Instant::now() < drain_deadline {
            match tokio::time::timeout(Duration::from_millis(20), stream.read(&mut buf)).await {
                Ok(Ok(n)) if n > 0 => total_drained += n,
                _ => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
        if total_drained > 0 {
            tracing::debug!("drained {} stale bytes from buffer", total_drained);
        }

        tracing::info!("connected to serial port");
        Ok(Self {
            inner: StreamTransport::new(stream),
        })
    }
}

impl Transport for SerialTransport {
    type Reader = StreamReader<ReadHalf<SerialStream>>;
    type Writer = StreamWriter<WriteHalf<SerialStream>>;

    fn split(self) -> (Self::Reader, Self::Writer) {
        self.inner.split()
    }
}

/// Lists available serial ports.
///
/// # Errors
///
/// Returns an error if the port list cannot be retrieved.
pub fn list_ports() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports().map_err(TransportError::Serial)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_config_defaults() {
        let config = SerialConfig::new("/dev/ttyACM0");
        assert_eq!(config.port, "/dev/ttyACM0");
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
        assert!(config.rts);
        assert_eq!(config.connection_delay, DEFAULT_CONNECTION_DELAY);
    }

    #[test]
    fn test_serial_config_builder() {
        let config = SerialConfig::new("/dev/ttyACM0")
            .baud_rate(9600)
            .rts(false)
            .connection_delay(Duration::from_secs(1));
        assert_eq!(config.baud_rate, 9600);
        assert!(!config.rts);
        assert_eq!(config.connection_delay, Duration::from_secs(1));
    }

    #[test]
    #[ignore = "Requires /sys/class/tty - not available in sandboxed builds"]
    fn test_list_ports() {
        let _ = list_ports();
    }
}
