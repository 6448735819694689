//! # znp
//!
//! A Rust client library for Z-Stack ZNP Zigbee coordinator radios.
//!
//! The radio speaks UNPI frames over a serial link. Requests are matched with
//! their responses by subsystem and command id, and unsolicited indications
//! are decoded into typed events.
//!
//! ## Features
//!
//! - Async/await based API using Tokio
//! - Declarative wire records with the [`schema!`] macro
//! - Typed calls for the SYS, AF, ZDO, SAPI, UTIL and `APP_CNF` subsystems
//! - Bounded event and error channels that never stall the reader
//!
//! ## Quick Start
//!
//! ```no_run
//! use znp::Znp;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), znp::Error> {
//!     let mut client = Znp::serial("/dev/ttyACM0").await?;
//!     let mut events = client.take_events().expect("events taken once");
//!
//!     let version = client.version().await?;
//!     println!("firmware {}.{}.{}", version.major_rel, version.minor_rel, version.maint_rel);
//!     println!("IEEE address: {}", client.get_ext_addr().await?);
//!
//!     client.zdo_startup_from_app(100).await?;
//!     while let Some(event) = events.recv().await {
//!         println!("{event:?}");
//!     }
//!
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`codec`] - Schema-driven binary encoding of wire records
//! - [`protocol`] - UNPI frames, command ids and the transaction registry
//! - [`types`] - Wire records of the command catalog
//! - [`transport`] - Byte stream and serial transports
//! - [`event`] - Asynchronous indications and their dispatch
//! - [`commands`] - Typed calls per subsystem
//! - [`client`] - High-level [`Znp`] client

pub mod client;
pub mod codec;
pub mod commands;
pub mod error;
pub mod event;
pub mod protocol;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use client::{DEFAULT_TIMEOUT, Znp, ZnpConfig};
pub use codec::{Schema, Wire};
pub use error::{
    ConfigurationError, DecodeError, EncodeError, Error, FrameError, Result, TransportError,
};
pub use event::{AsyncEvent, EventDispatcher, PrototypeTable};
pub use protocol::{CommandKey, CommandType, DeviceErrorCode, Frame, Subsystem};
pub use transport::{SerialConfig, SerialTransport, StreamTransport, Transport, serial::list_ports};
