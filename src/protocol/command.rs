//! Command ids of the ZNP subsystems and the device error frame.
//!
//! Ids are only unique within a subsystem, so each subsystem gets its own
//! opcode enum. Ids of `0x80` and above are indications the device sends as
//! AREQ frames.

use std::fmt;

use super::frame::{CommandKey, Subsystem};

macro_rules! opcode_into_u8 {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for u8 {
                fn from(cmd: $ty) -> Self {
                    cmd as Self
                }
            }
        )*
    };
}

/// SYS subsystem commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SysCommand {
    /// Reset the device (AREQ, no response).
    ResetReq = 0x00,
    /// Liveness check, returns capabilities.
    Ping = 0x01,
    /// Firmware version.
    Version = 0x02,
    /// Set the IEEE address.
    SetExtAddr = 0x03,
    /// Get the IEEE address.
    GetExtAddr = 0x04,
    /// Read device memory.
    RamRead = 0x05,
    /// Write device memory.
    RamWrite = 0x06,
    /// Read a non-volatile item.
    OsalNvRead = 0x08,
    /// Write a non-volatile item.
    OsalNvWrite = 0x09,
    /// Start an OSAL timer.
    OsalStartTimer = 0x0A,
    /// Stop an OSAL timer.
    OsalStopTimer = 0x0B,
    /// Random number.
    Random = 0x0C,
    /// Set the real-time clock.
    SetTime = 0x10,
    /// Read the real-time clock.
    GetTime = 0x11,
    /// Set the radio transmit power.
    SetTxPower = 0x14,
    /// The device has reset.
    ResetInd = 0x80,
    /// An OSAL timer expired.
    OsalTimerExpired = 0x81,
}

/// AF subsystem commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AfCommand {
    /// Register an application endpoint.
    Register = 0x00,
    /// Send data to a short address.
    DataRequest = 0x01,
    /// Send data with extended addressing.
    DataRequestExt = 0x02,
    /// Remove an application endpoint.
    Delete = 0x04,
    /// A data request completed.
    DataConfirm = 0x80,
    /// Data was received.
    IncomingMsg = 0x81,
}

/// ZDO subsystem commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ZdoCommand {
    /// Resolve a network address from an IEEE address.
    NwkAddrReq = 0x00,
    /// Resolve an IEEE address from a network address.
    IeeeAddrReq = 0x01,
    /// List a node's active endpoints.
    ActiveEpReq = 0x05,
    /// Create a binding.
    BindReq = 0x21,
    /// Scan for nearby networks.
    MgmtNwkDiscReq = 0x30,
    /// Ask a node to leave the network.
    MgmtLeaveReq = 0x34,
    /// Open or close the network for joining.
    MgmtPermitJoinReq = 0x36,
    /// Start the network stack.
    StartupFromApp = 0x40,
    /// Answer to `NwkAddrReq`.
    NwkAddrRsp = 0x80,
    /// Answer to `IeeeAddrReq`.
    IeeeAddrRsp = 0x81,
    /// Answer to `ActiveEpReq`.
    ActiveEpRsp = 0x85,
    /// Answer to `BindReq`.
    BindRsp = 0xA1,
    /// Answer to `MgmtNwkDiscReq`.
    MgmtNwkDiscRsp = 0xB0,
    /// Answer to `MgmtLeaveReq`.
    MgmtLeaveRsp = 0xB4,
    /// Answer to `MgmtPermitJoinReq`.
    MgmtPermitJoinRsp = 0xB6,
    /// The device's network state changed.
    StateChangeInd = 0xC0,
    /// A device announced itself.
    EndDeviceAnnceInd = 0xC1,
    /// A device left the network.
    LeaveInd = 0xC9,
    /// The trust center admitted a device.
    TcDevInd = 0xCA,
}

/// SAPI subsystem commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SapiCommand {
    /// Start the Zigbee stack.
    StartRequest = 0x00,
    /// Read a configuration item.
    ReadConfiguration = 0x04,
    /// Write a configuration item.
    WriteConfiguration = 0x05,
    /// Read one device information parameter.
    GetDeviceInfo = 0x06,
    /// Open or close the network for joining.
    PermitJoiningRequest = 0x08,
    /// The stack finished starting.
    StartConfirm = 0x80,
    /// A device search completed.
    FindDeviceConfirm = 0x85,
}

/// UTIL subsystem commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UtilCommand {
    /// Device information summary.
    GetDeviceInfo = 0x00,
    /// Drive an LED.
    LedControl = 0x0A,
    /// Echo data back.
    Loopback = 0x10,
}

/// `APP_CNF` subsystem commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AppCnfCommand {
    /// Start base device behaviour commissioning.
    BdbStartCommissioning = 0x05,
    /// Select the commissioning channel mask.
    BdbSetChannel = 0x08,
    /// Commissioning progressed.
    BdbCommissioningNotification = 0x80,
}

opcode_into_u8!(
    SysCommand,
    AfCommand,
    ZdoCommand,
    SapiCommand,
    UtilCommand,
    AppCnfCommand
);

/// Reason code of a device error frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceErrorCode {
    /// The subsystem id is not supported.
    InvalidSubsystem,
    /// The command id is not supported.
    InvalidCommandId,
    /// A parameter was rejected.
    InvalidParameter,
    /// The payload length was wrong.
    InvalidLength,
    /// A code this library does not recognise.
    Unknown(u8),
}

impl DeviceErrorCode {
    /// Converts the raw code byte.
    #[must_use]
    pub const fn from_byte(code: u8) -> Self {
        match code {
            0x01 => Self::InvalidSubsystem,
            0x02 => Self::InvalidCommandId,
            0x03 => Self::InvalidParameter,
            0x04 => Self::InvalidLength,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw code byte.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::InvalidSubsystem => 0x01,
            Self::InvalidCommandId => 0x02,
            Self::InvalidParameter => 0x03,
            Self::InvalidLength => 0x04,
            Self::Unknown(code) => code,
        }
    }

    /// Returns the human-readable reason.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidSubsystem => "Invalid subsystem",
            Self::InvalidCommandId => "Invalid command ID",
            Self::InvalidParameter => "Invalid parameter",
            Self::InvalidLength => "Invalid length",
            Self::Unknown(_) => "Unknown error",
        }
    }
}

impl fmt::Display for DeviceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "Unknown error code 0x{code:02x}"),
            known => f.write_str(known.message()),
        }
    }
}

crate::schema! {
    /// Body of the SRSP sent on `RES0/0x00` when the device rejects a request.
    ///
    /// The second byte is the `cmd0` header byte of the rejected request.
    pub struct ErrorFrame {
        pub code: u8,
        pub subsystem: u8 [bitmask = "start", bits = "0x1f"],
        pub command_type: u8 [bitmask = "end", bits = "0xe0"],
        pub command: u8,
    }
}

impl ErrorFrame {
    /// Returns the reason code.
    #[must_use]
    pub const fn error_code(&self) -> DeviceErrorCode {
        DeviceErrorCode::from_byte(self.code)
    }

    /// Returns the key of the rejected request.
    #[must_use]
    pub const fn failed_key(&self) -> CommandKey {
        CommandKey::new(Subsystem::new(self.subsystem), self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::error::{DecodeError, Error};

    #[test]
    fn test_command_values() {
        assert_eq!(SysCommand::Ping as u8, 0x01);
        assert_eq!(SysCommand::ResetInd as u8, 0x80);
        assert_eq!(AfCommand::IncomingMsg as u8, 0x81);
        assert_eq!(ZdoCommand::StateChangeInd as u8, 0xC0);
        assert_eq!(SapiCommand::FindDeviceConfirm as u8, 0x85);
        assert_eq!(AppCnfCommand::BdbCommissioningNotification as u8, 0x80);
    }

    #[test]
    fn test_command_from_conversion() {
        let cmd: u8 = UtilCommand::Loopback.into();
        assert_eq!(cmd, 0x10);
    }

    #[test]
    fn test_error_code_messages() {
        assert_eq!(DeviceErrorCode::from_byte(1).to_string(), "Invalid subsystem");
        assert_eq!(DeviceErrorCode::from_byte(2).to_string(), "Invalid command ID");
        assert_eq!(DeviceErrorCode::from_byte(3).to_string(), "Invalid parameter");
        assert_eq!(DeviceErrorCode::from_byte(4).to_string(), "Invalid length");
        assert_eq!(
            DeviceErrorCode::from_byte(0x42),
            DeviceErrorCode::Unknown(0x42)
        );
        assert_eq!(DeviceErrorCode::Unknown(0x42).code(), 0x42);
    }

    #[test]
    fn test_error_frame_names_failed_command() {
        let frame: ErrorFrame = codec::decode_new(&[0x02, 0x21, 0x01]).unwrap();
        assert_eq!(frame.error_code(), DeviceErrorCode::InvalidCommandId);
        assert_eq!(frame.failed_key(), CommandKey::new(Subsystem::SYS, 0x01));
        assert_eq!(frame.command_type, 1);
    }

    #[test]
    fn test_short_error_frame() {
        let err = codec::decode_new::<ErrorFrame>(&[0x02, 0x01]).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode(DecodeError::UnexpectedEof { .. })
        ));
    }
}
