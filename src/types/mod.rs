//! Wire records of the ZNP command catalog.
//!
//! Records are grouped by subsystem. Every type here is declared with
//! [`schema!`](crate::schema), so its field order is its wire order.

pub mod af;
pub mod app_cnf;
pub mod sapi;
pub mod sys;
pub mod util;
pub mod zdo;

crate::schema! {
    /// Single status byte returned by most commands.
    pub struct StatusResponse {
        /// `0x00` on success.
        pub status: u8,
    }
}

impl StatusResponse {
    /// Returns true if the device reported success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status == 0
    }
}

/// Addressing modes used by AF and ZDO requests.
pub mod addr_mode {
    /// No address; use bindings.
    pub const NOT_PRESENT: u8 = 0x00;
    /// Group address.
    pub const GROUP: u8 = 0x01;
    /// 16-bit network address.
    pub const SHORT: u8 = 0x02;
    /// 64-bit IEEE address.
    pub const IEEE: u8 = 0x03;
    /// Broadcast.
    pub const BROADCAST: u8 = 0xff;
}

pub use af::{
    DataConfirm, DataRequest, DataRequestExt, DataRequestOptions, IncomingMessage,
    RegisterRequest,
};
pub use sys::{Capabilities, PingResponse, ResetIndication, ResetRequest, VersionResponse};
pub use util::DeviceInfoResponse;
pub use zdo::{EndDeviceAnnounceIndication, Network, StateChangeIndication};
