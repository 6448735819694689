//! Event system for unsolicited device frames.
//!
//! AREQ frames are matched against a [`PrototypeTable`] by command key. The
//! prototype is cloned, the payload decoded into the clone, and the result is
//! handed to the application through a bounded channel. Errors that belong to
//! no caller travel on a second bounded channel.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::codec;
use crate::error::{Error, Result};
use crate::protocol::{
    AfCommand, AppCnfCommand, CommandKey, SapiCommand, Subsystem, SysCommand, ZdoCommand,
};
use crate::types::{af, app_cnf, sapi, sys, zdo};

macro_rules! async_events {
    ($(
        $(#[$meta:meta])*
        $variant:ident($ty:ty) = ($subsystem:ident, $command:expr)
    ),* $(,)?) => {
        /// A decoded asynchronous indication.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum AsyncEvent {
            $(
                $(#[$meta])*
                $variant($ty),
            )*
        }

        impl AsyncEvent {
            /// Returns the command key this event arrives under.
            #[must_use]
            pub const fn key(&self) -> CommandKey {
                match self {
                    $(Self::$variant(_) => CommandKey::new(Subsystem::$subsystem, $command as u8),)*
                }
            }

            /// Decodes `payload` into this event's record.
            pub fn decode_payload(&mut self, payload: &[u8]) -> Result<()> {
                match self {
                    $(Self::$variant(record) => codec::decode(payload, record),)*
                }
            }

            /// Validates the layout of this event's record type.
            pub fn validate(&self) -> Result<()> {
                match self {
                    $(Self::$variant(_) => codec::register::<$ty>(),)*
                }
            }

            fn catalog() -> Vec<Self> {
                vec![$(Self::$variant(<$ty>::default()),)*]
            }
        }
    };
}

async_events! {
    /// The device reset.
    ResetIndication(sys::ResetIndication) = (SYS, SysCommand::ResetInd),
    /// An OSAL timer expired.
    OsalTimerExpired(sys::OsalTimerExpired) = (SYS, SysCommand::OsalTimerExpired),
    /// A data request completed.
    DataConfirm(af::DataConfirm) = (AF, AfCommand::DataConfirm),
    /// Application data arrived.
    IncomingMessage(af::IncomingMessage) = (AF, AfCommand::IncomingMsg),
    NwkAddrResponse(zdo::NwkAddrResponse) = (ZDO, ZdoCommand::NwkAddrRsp),
    IeeeAddrResponse(zdo::IeeeAddrResponse) = (ZDO, ZdoCommand::IeeeAddrRsp),
    ActiveEpResponse(zdo::ActiveEpResponse) = (ZDO, ZdoCommand::ActiveEpRsp),
    BindResponse(zdo::ZdoStatusResponse) = (ZDO, ZdoCommand::BindRsp),
    MgmtNwkDiscResponse(zdo::MgmtNwkDiscResponse) = (ZDO, ZdoCommand::MgmtNwkDiscRsp),
    MgmtLeaveResponse(zdo::ZdoStatusResponse) = (ZDO, ZdoCommand::MgmtLeaveRsp),
    MgmtPermitJoinResponse(zdo::ZdoStatusResponse) = (ZDO, ZdoCommand::MgmtPermitJoinRsp),
    /// The coordinator's network state changed.
    StateChange(zdo::StateChangeIndication) = (ZDO, ZdoCommand::StateChangeInd),
    /// A device announced itself.
    EndDeviceAnnounce(zdo::EndDeviceAnnounceIndication) = (ZDO, ZdoCommand::EndDeviceAnnceInd),
    /// A device left the network.
    Leave(zdo::LeaveIndication) = (ZDO, ZdoCommand::LeaveInd),
    TcDevice(zdo::TcDeviceIndication) = (ZDO, ZdoCommand::TcDevInd),
    StartConfirm(sapi::StartConfirm) = (SAPI, SapiCommand::StartConfirm),
    FindDeviceConfirm(sapi::FindDeviceConfirm) = (SAPI, SapiCommand::FindDeviceConfirm),
    /// Commissioning progressed.
    CommissioningNotification(app_cnf::BdbCommissioningNotification) =
        (APP_CNF, AppCnfCommand::BdbCommissioningNotification),
}

/// Immutable map from command key to the default event decoded under it.
#[derive(Debug, Clone, Default)]
pub struct PrototypeTable {
    prototypes: HashMap<CommandKey, AsyncEvent>,
}

impl PrototypeTable {
    /// Creates a table with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a table covering every indication in the catalog.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any event record has an invalid layout.
    pub fn standard() -> Result<Self> {
        let mut table = Self::empty();
        for prototype in AsyncEvent::catalog() {
            table.insert(prototype)?;
        }
        Ok(table)
    }

    /// Adds a prototype under its own key, returning any entry it replaces.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the record's layout is invalid.
    pub fn insert(&mut self, prototype: AsyncEvent) -> Result<Option<AsyncEvent>> {
        prototype.validate()?;
        Ok(self.prototypes.insert(prototype.key(), prototype))
    }

    /// Returns true if an event is registered for `key`.
    #[must_use]
    pub fn contains(&self, key: &CommandKey) -> bool {
        self.prototypes.contains_key(key)
    }

    /// Returns the number of prototypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    /// Decodes `payload` into a fresh copy of the prototype registered for `key`.
    ///
    /// Returns `None` if no prototype is registered.
    #[must_use]
    pub fn instantiate(&self, key: CommandKey, payload: &[u8]) -> Option<Result<AsyncEvent>> {
        let mut event = self.prototypes.get(&key)?.clone();
        Some(event.decode_payload(payload).map(|()| event))
    }
}

/// Delivers events and stray errors to the application without blocking.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    events: mpsc::Sender<AsyncEvent>,
    errors: mpsc::Sender<Error>,
}

impl EventDispatcher {
    /// Creates a dispatcher and the receiving ends of its two channels.
    #[must_use]
    pub fn new(
        event_capacity: usize,
        error_capacity: usize,
    ) -> (Self, mpsc::Receiver<AsyncEvent>, mpsc::Receiver<Error>) {
        let (events, event_rx) = mpsc::channel(event_capacity.max(1));
        let (errors, error_rx) = mpsc::channel(error_capacity.max(1));
        (Self { events, errors }, event_rx, error_rx)
    }

    /// Queues an event, dropping it if the consumer has fallen behind.
    pub fn deliver(&self, event: AsyncEvent) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!("event queue full, dropping {}", event.key());
            }
            Err(TrySendError::Closed(_)) => {
                tracing::trace!("event receiver dropped");
            }
        }
    }

    /// Queues an error, dropping it if the consumer has fallen behind.
    pub fn report(&self, error: Error) {
        match self.errors.try_send(error) {
            Ok(()) => {}
            Err(TrySendError::Full(error)) => {
                tracing::warn!("error queue full, dropping: {error}");
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::zdo::StateChangeIndication;

    const STATE_CHANGE: CommandKey = CommandKey::new(Subsystem::ZDO, 0xc0);

    #[test]
    fn test_standard_table_covers_catalog() {
        let table = PrototypeTable::standard().unwrap();
        assert_eq!(table.len(), AsyncEvent::catalog().len());
        assert!(table.contains(&STATE_CHANGE));
        assert!(table.contains(&CommandKey::new(Subsystem::SYS, 0x80)));
        assert!(table.contains(&CommandKey::new(Subsystem::APP_CNF, 0x80)));
    }

    #[test]
    fn test_instantiate_decodes_into_copy() {
        let table = PrototypeTable::standard().unwrap();
        let event = table.instantiate(STATE_CHANGE, &[0x09]).unwrap().unwrap();
        assert_eq!(
            event,
            AsyncEvent::StateChange(StateChangeIndication { state: 9 })
        );
        assert!(table.instantiate(CommandKey::new(Subsystem::ZDO, 0x7f), &[]).is_none());
    }

    #[test]
    fn test_instantiate_reports_decode_errors() {
        let table = PrototypeTable::standard().unwrap();
        let key = CommandKey::new(Subsystem::AF, 0x80);
        assert!(matches!(
            table.instantiate(key, &[0x00]),
            Some(Err(Error::Decode(_)))
        ));
    }

    #[test]
    fn test_concurrent_instantiation_shares_nothing() {
        let table = std::sync::Arc::new(PrototypeTable::standard().unwrap());
        let handles: Vec<_> = (0u8..8)
            .map(|state| {
                let table = std::sync::Arc::clone(&table);
                std::thread::spawn(move || {
                    (0..200)
                        .map(|_| table.instantiate(STATE_CHANGE, &[state]).unwrap().unwrap())
                        .all(|event| {
                            event == AsyncEvent::StateChange(StateChangeIndication { state })
                        })
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }

        let pristine = table.instantiate(STATE_CHANGE, &[]).unwrap();
        assert!(pristine.is_err());
        assert_eq!(
            table.prototypes.get(&STATE_CHANGE),
            Some(&AsyncEvent::StateChange(StateChangeIndication::default()))
        );
    }

    #[tokio::test]
    async fn test_full_event_queue_drops() {
        let (dispatcher, mut events, _errors) = EventDispatcher::new(1, 1);
        let event = AsyncEvent::StateChange(StateChangeIndication { state: 1 });
        dispatcher.deliver(event.clone());
        dispatcher.deliver(AsyncEvent::StateChange(StateChangeIndication { state: 2 }));

        assert_eq!(events.recv().await, Some(event));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_report_error() {
        let (dispatcher, _events, mut errors) = EventDispatcher::new(1, 1);
        dispatcher.report(Error::UnknownAsyncCommand { key: STATE_CHANGE });
        assert!(matches!(
            errors.recv().await,
            Some(Error::UnknownAsyncCommand { key }) if key == STATE_CHANGE
        ));
    }
}
