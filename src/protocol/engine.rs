//! Engine task: owns the writer, registers transactions and routes inbound frames.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use super::command::ErrorFrame;
use super::frame::{CommandKey, CommandType, Frame};
use super::registry::{Registry, ReplySender, Transaction};
use crate::codec;
use crate::error::Error;
use crate::event::{EventDispatcher, PrototypeTable};
use crate::transport::{FrameReader, FrameWriter};

/// A frame queued for the engine to write.
#[derive(Debug)]
pub(crate) enum Outgoing {
    /// SREQ whose response is delivered through `reply`.
    Sync { frame: Frame, reply: ReplySender },
    /// AREQ with no response.
    Async { frame: Frame },
}

pub(crate) struct Engine<W> {
    writer: W,
    registry: Arc<Registry>,
    prototypes: Arc<PrototypeTable>,
    dispatcher: EventDispatcher,
    timeout: Duration,
}

impl<W: FrameWriter> Engine<W> {
    pub(crate) const fn new(
        writer: W,
        registry: Arc<Registry>,
        prototypes: Arc<PrototypeTable>,
        dispatcher: EventDispatcher,
        timeout: Duration,
    ) -> Self {
        Self {
            writer,
            registry,
            prototypes,
            dispatcher,
            timeout,
        }
    }

    /// Runs until shutdown, or until the inbound or outbound queue closes.
    ///
    /// Every transaction still pending on exit is cancelled.
    pub(crate) async fn run(
        mut self,
        mut inbound: mpsc::Receiver<Frame>,
        mut outbound: mpsc::Receiver<Outgoing>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                frame = inbound.recv() => {
                    let Some(frame) = frame else {
                        tracing::debug!("inbound queue closed, stopping engine");
                        break;
                    };
                    self.handle_inbound(frame);
                }
                outgoing = outbound.recv() => {
                    let Some(outgoing) = outgoing else {
                        tracing::debug!("client dropped, stopping engine");
                        break;
                    };
                    self.handle_outgoing(outgoing).await;
                }
                _ = &mut shutdown => {
                    tracing::debug!("shutdown requested");
                    break;
                }
            }
        }

        let cancelled = self.registry.cancel_all();
        if cancelled > 0 {
            tracing::debug!("cancelled {cancelled} pending requests");
        }
    }

    async fn handle_outgoing(&mut self, outgoing: Outgoing) {
        match outgoing {
            Outgoing::Sync { frame, reply } => {
                let txn = Transaction::new(frame.key(), self.timeout, reply);
                if let Err(e) = self.registry.register(Arc::clone(&txn)) {
                    txn.resolve(Err(e));
                    return;
                }
                self.registry.arm_deadline(&txn);

                tracing::trace!("sending {frame}");
                if let Err(e) = self.writer.write_frame(&frame).await {
                    tracing::warn!("failed to write {}: {e}", frame.key());
                    if let Some(txn) = self.registry.expire(&txn.key(), txn.id()) {
                        txn.resolve(Err(e));
                    }
                }
            }
            Outgoing::Async { frame } => {
                tracing::trace!("sending {frame}");
                if let Err(e) = self.writer.write_frame(&frame).await {
                    tracing::warn!("failed to write {}: {e}", frame.key());
                    self.dispatcher.report(e);
                }
            }
        }
    }

    fn handle_inbound(&self, frame: Frame) {
        tracing::trace!("received {frame}");
        match frame.command_type {
            CommandType::SyncResponse if frame.key() == CommandKey::DEVICE_ERROR => {
                self.resolve_device_error(frame);
            }
            CommandType::SyncResponse => self.resolve_response(frame),
            CommandType::AsyncRequest => self.dispatch_async(&frame),
            CommandType::SyncRequest => {
                tracing::warn!("device sent a request frame: {frame}");
                self.dispatcher.report(Error::UnexpectedFrame { frame });
            }
        }
    }

    fn resolve_device_error(&self, frame: Frame) {
        let body: ErrorFrame = match codec::decode_new(&frame.payload) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("malformed device error frame: {frame}");
                self.dispatcher.report(e);
                return;
            }
        };

        let key = body.failed_key();
        let code = body.error_code();
        tracing::debug!("device rejected {key}: {code}");
        match self.registry.unregister(&key) {
            Some(txn) => {
                txn.resolve(Err(Error::Device { code }));
            }
            None => self.dispatcher.report(Error::UnmatchedResponse { frame }),
        }
    }

    fn resolve_response(&self, frame: Frame) {
        match self.registry.unregister(&frame.key()) {
            Some(txn) => {
                txn.resolve(Ok(frame.payload));
            }
            None => {
                tracing::debug!("no pending request for {frame}");
                self.dispatcher.report(Error::UnmatchedResponse { frame });
            }
        }
    }

    fn dispatch_async(&self, frame: &Frame) {
        let key = frame.key();
        match self.prototypes.instantiate(key, &frame.payload) {
            Some(Ok(event)) => self.dispatcher.deliver(event),
            Some(Err(e)) => {
                tracing::warn!("failed to decode {key}: {e}");
                self.dispatcher.report(e);
            }
            None => {
                tracing::debug!("no prototype for {key}");
                self.dispatcher.report(Error::UnknownAsyncCommand { key });
            }
        }
    }
}

/// Reads frames until the transport fails, forwarding them to the engine.
///
/// Framing errors are reported and skipped; any other error ends the loop,
/// which in turn stops the engine.
pub(crate) async fn read_loop<R: FrameReader>(
    mut reader: R,
    inbound: mpsc::Sender<Frame>,
    dispatcher: EventDispatcher,
) {
    loop {
        match reader.read_frame().await {
            Ok(frame) => {
                if inbound.send(frame).await.is_err() {
                    tracing::debug!("engine stopped, ending read loop");
                    return;
                }
            }
            Err(Error::Transport(e)) if !e.is_fatal() => {
                tracing::warn!("discarding bad frame: {e}");
                dispatcher.report(Error::Transport(e));
            }
            Err(e) => {
                tracing::error!("transport read failed: {e}");
                dispatcher.report(e);
                return;
            }
        }
    }
}
