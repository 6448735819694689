//! Main [`Znp`] client implementation.
//!
//! The client splits a transport into a read task and an engine task. Calls
//! are queued to the engine, which registers them, writes the frame and
//! resolves the caller once the response, a device error, the deadline or
//! shutdown arrives. Indications and stray errors are delivered on two
//! bounded channels taken with [`Znp::take_events`] and [`Znp::take_errors`].

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::codec::{self, Wire};
use crate::error::{Error, FrameError, Result, TransportError};
use crate::event::{AsyncEvent, EventDispatcher, PrototypeTable};
use crate::protocol::engine::{Engine, Outgoing, read_loop};
use crate::protocol::{CommandType, Frame, MAX_PAYLOAD_SIZE, Registry, Subsystem};
use crate::transport::{SerialConfig, SerialTransport, Transport};

/// Default time a request waits for its response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_EVENT_CAPACITY: usize = 256;
const DEFAULT_ERROR_CAPACITY: usize = 64;
const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Client tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZnpConfig {
    /// Time a request waits for its response.
    pub timeout: Duration,
    /// Capacity of the event channel.
    pub event_capacity: usize,
    /// Capacity of the error channel.
    pub error_capacity: usize,
    /// Capacity of the inbound and outbound frame queues.
    pub queue_capacity: usize,
}

impl Default for ZnpConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ZnpConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            error_capacity: DEFAULT_ERROR_CAPACITY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the event channel capacity.
    #[must_use]
    pub const fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Sets the error channel capacity.
    #[must_use]
    pub const fn error_capacity(mut self, capacity: usize) -> Self {
        self.error_capacity = capacity;
        self
    }

    /// Sets the frame queue capacity.
    #[must_use]
    pub const fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

/// Client for a ZNP coordinator.
pub struct Znp {
    outbound: mpsc::Sender<Outgoing>,
    registry: Arc<Registry>,
    events: Option<mpsc::Receiver<AsyncEvent>>,
    errors: Option<mpsc::Receiver<Error>>,
    shutdown: Option<oneshot::Sender<()>>,

    // Background tasks
    read_task: Option<JoinHandle<()>>,
    engine_task: Option<JoinHandle<()>>,

    config: ZnpConfig,
}

impl Znp {
    /// Opens a serial port with default settings and starts a client on it.
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g., "/dev/ttyACM0")
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be opened.
    pub async fn serial(port: impl Into<String>) -> Result<Self> {
        Self::with_serial_config(SerialConfig::new(port), ZnpConfig::new()).await
    }

    /// Opens a serial port with custom settings and starts a client on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be opened.
    pub async fn with_serial_config(serial: SerialConfig, config: ZnpConfig) -> Result<Self> {
        let transport = SerialTransport::open(serial).await?;
        Self::with_config(transport, config)
    }

    /// Starts a client on `transport` with default settings.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an event record has an invalid layout.
    pub fn new<T: Transport>(transport: T) -> Result<Self> {
        Self::with_config(transport, ZnpConfig::new())
    }

    /// Starts a client on `transport`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an event record has an invalid layout.
    pub fn with_config<T: Transport>(transport: T, config: ZnpConfig) -> Result<Self> {
        let prototypes = PrototypeTable::standard()?;
        Ok(Self::with_prototypes(transport, config, prototypes))
    }

    /// Starts a client on `transport` that decodes indications with `prototypes`.
    ///
    /// Spawns the read and engine tasks on the current Tokio runtime.
    #[must_use]
    pub fn with_prototypes<T: Transport>(
        transport: T,
        config: ZnpConfig,
        prototypes: PrototypeTable,
    ) -> Self {
        let (reader, writer) = transport.split();
        let (dispatcher, events, errors) =
            EventDispatcher::new(config.event_capacity, config.error_capacity);
        let (inbound_tx, inbound_rx) = mpsc::channel(config.queue_capacity.max(1));
        let (outbound_tx, outbound_rx) = mpsc::channel(config.queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let registry = Arc::new(Registry::new());

        let read_task = tokio::spawn(read_loop(reader, inbound_tx, dispatcher.clone()));

        let engine = Engine::new(
            writer,
            Arc::clone(&registry),
            Arc::new(prototypes),
            dispatcher,
            config.timeout,
        );
        let engine_task = tokio::spawn(engine.run(inbound_rx, outbound_rx, shutdown_rx));

        tracing::debug!("client started, timeout {:?}", config.timeout);

        Self {
            outbound: outbound_tx,
            registry,
            events: Some(events),
            errors: Some(errors),
            shutdown: Some(shutdown_tx),
            read_task: Some(read_task),
            engine_task: Some(engine_task),
            config,
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ZnpConfig {
        &self.config
    }

    /// Takes the receiver of decoded indications.
    ///
    /// Returns `None` after the first call.
    pub const fn take_events(&mut self) -> Option<mpsc::Receiver<AsyncEvent>> {
        self.events.take()
    }

    /// Takes the receiver of errors that belong to no caller.
    ///
    /// Returns `None` after the first call.
    pub const fn take_errors(&mut self) -> Option<mpsc::Receiver<Error>> {
        self.errors.take()
    }

    /// Returns the number of requests waiting for a response.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.registry.len()
    }

    /// Returns true while the engine task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.engine_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Sends a synchronous request and decodes the response into a new `Rsp`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails, the device rejects the request,
    /// no response arrives in time, the client shuts down, or the response
    /// does not decode.
    pub async fn request<Req, Rsp>(
        &self,
        subsystem: Subsystem,
        command: impl Into<u8>,
        req: &Req,
    ) -> Result<Rsp>
    where
        Req: Wire + ?Sized,
        Rsp: Wire + Default,
    {
        let mut rsp = Rsp::default();
        self.request_into(subsystem, command, req, &mut rsp).await?;
        Ok(rsp)
    }

    /// Sends a synchronous request and decodes the response into `rsp`.
    ///
    /// Use this when the response shape depends on the request, as with a
    /// variant field whose case the caller picks before decoding.
    ///
    /// # Errors
    ///
    /// See [`Znp::request`].
    pub async fn request_into<Req, Rsp>(
        &self,
        subsystem: Subsystem,
        command: impl Into<u8>,
        req: &Req,
        rsp: &mut Rsp,
    ) -> Result<()>
    where
        Req: Wire + ?Sized,
        Rsp: Wire + ?Sized,
    {
        let frame = build_frame(CommandType::SyncRequest, subsystem, command.into(), req)?;
        let payload = self.exchange(frame).await?;
        codec::decode(&payload, rsp)
    }

    /// Sends a synchronous request with a pre-encoded payload and returns the
    /// raw response payload.
    ///
    /// # Errors
    ///
    /// See [`Znp::request`].
    pub async fn request_raw(
        &self,
        subsystem: Subsystem,
        command: u8,
        payload: impl Into<Bytes>,
    ) -> Result<Bytes> {
        let frame = Frame::new(CommandType::SyncRequest, subsystem, command, payload);
        check_size(&frame)?;
        self.exchange(frame).await
    }

    /// Sends an asynchronous request.
    ///
    /// Returns once the frame is queued; write failures are reported on the
    /// error channel.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the client is not running.
    pub async fn send<Req>(
        &self,
        subsystem: Subsystem,
        command: impl Into<u8>,
        req: &Req,
    ) -> Result<()>
    where
        Req: Wire + ?Sized,
    {
        let frame = build_frame(CommandType::AsyncRequest, subsystem, command.into(), req)?;
        self.outbound
            .send(Outgoing::Async { frame })
            .await
            .map_err(|_| Error::NotConnected)
    }

    async fn exchange(&self, frame: Frame) -> Result<Bytes> {
        let (reply, response) = oneshot::channel();
        self.outbound
            .send(Outgoing::Sync { frame, reply })
            .await
            .map_err(|_| Error::NotConnected)?;

        // The engine drops the reply sender only when it stops before
        // registering the request.
        response.await.map_err(|_| Error::Cancelled)?
    }

    /// Stops the client.
    ///
    /// Pending requests resolve with [`Error::Cancelled`]; later calls fail
    /// with [`Error::NotConnected`].
    pub async fn shutdown(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.engine_task.take() {
            if let Err(e) = task.await {
                tracing::error!("engine task failed: {e}");
            }
        }
        if let Some(task) = self.read_task.take() {
            task.abort();
        }
        tracing::debug!("client stopped");
    }
}

fn build_frame<Req: Wire + ?Sized>(
    command_type: CommandType,
    subsystem: Subsystem,
    command: u8,
    req: &Req,
) -> Result<Frame> {
    let frame = Frame::new(command_type, subsystem, command, codec::encode(req)?);
    check_size(&frame)?;
    Ok(frame)
}

fn check_size(frame: &Frame) -> Result<()> {
    let size = frame.payload.len();
    if size > MAX_PAYLOAD_SIZE {
        return Err(Error::Transport(TransportError::Frame(FrameError::TooLarge {
            size,
            max: MAX_PAYLOAD_SIZE,
        })));
    }
    Ok(())
}

impl Drop for Znp {
    fn drop(&mut self) {
        // Abort background tasks
        if let Some(task) = self.read_task.take() {
            task.abort();
        }
        if let Some(task) = self.engine_task.take() {
            task.abort();
        }
        // Aborted engines never reach their own cleanup.
        self.registry.cancel_all();
    }
}
