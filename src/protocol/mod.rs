//! Protocol definitions for ZNP communication.
//!
//! This module contains:
//! - UNPI frame encoding/decoding and the frame model
//! - Subsystem command ids and the device error frame
//! - The transaction registry and the engine task that drives it

pub mod command;
pub(crate) mod engine;
pub mod frame;
pub mod registry;

pub use command::{
    AfCommand, AppCnfCommand, DeviceErrorCode, ErrorFrame, SapiCommand, SysCommand, UtilCommand,
    ZdoCommand,
};
pub use frame::{
    CommandKey, CommandType, Frame, FrameDecoder, MAX_PAYLOAD_SIZE, SOF, Subsystem,
    encode as encode_frame,
};
pub use registry::{Registry, Transaction, TransactionState};
