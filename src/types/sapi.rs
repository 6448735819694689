//! SAPI (simple API) records.

crate::schema! {
    pub struct ReadConfigurationRequest {
        pub config_id: u8,
    }
}

crate::schema! {
    pub struct ReadConfigurationResponse {
        pub status: u8,
        pub config_id: u8,
        pub value: Vec<u8> [len = "uint8"],
    }
}

crate::schema! {
    pub struct WriteConfigurationRequest {
        pub config_id: u8,
        pub value: Vec<u8> [len = "uint8"],
    }
}

crate::schema! {
    pub struct PermitJoiningRequest {
        /// Target device, `0xfffc` for all routers.
        pub destination: String [hex = "uint16"],
        /// Seconds; `0xff` keeps joining open.
        pub timeout: u8,
    }
}

/// Parameter selector of a device information request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DeviceInfoParam {
    /// Network state.
    State = 0,
    /// Own IEEE address.
    IeeeAddress = 1,
    /// Own short address.
    ShortAddress = 2,
    /// Parent's short address.
    ParentShortAddress = 3,
    /// Parent's IEEE address.
    ParentIeeeAddress = 4,
    /// Operating channel.
    Channel = 5,
    /// PAN id.
    PanId = 6,
    /// Extended PAN id.
    ExtPanId = 7,
}

impl DeviceInfoParam {
    /// Returns an empty value of the shape this parameter is answered with.
    #[must_use]
    pub fn empty_value(self) -> DeviceInfoValue {
        match self {
            Self::State => DeviceInfoValue::State(DeviceStateValue::default()),
            Self::IeeeAddress | Self::ParentIeeeAddress | Self::ExtPanId => {
                DeviceInfoValue::Ieee(IeeeValue::default())
            }
            Self::ShortAddress | Self::ParentShortAddress => {
                DeviceInfoValue::Short(ShortValue::default())
            }
            Self::Channel => DeviceInfoValue::Channel(ChannelValue::default()),
            Self::PanId => DeviceInfoValue::PanId(PanIdValue::default()),
        }
    }
}

crate::schema! {
    pub struct GetDeviceInfoRequest {
        pub param: u8,
    }
}

crate::schema! {
    pub struct DeviceStateValue {
        pub state: u8,
        pub padding: [u8; 7],
    }
}

crate::schema! {
    pub struct IeeeValue {
        pub address: String [hex = "uint64"],
    }
}

crate::schema! {
    pub struct ShortValue {
        pub address: String [hex = "uint16"],
        pub padding: [u8; 6],
    }
}

crate::schema! {
    pub struct ChannelValue {
        pub channel: u8,
        pub padding: [u8; 7],
    }
}

crate::schema! {
    pub struct PanIdValue {
        pub pan_id: u16,
        pub padding: [u8; 6],
    }
}

crate::schema! {
    /// The eight-byte value of a device information answer. Its layout
    /// depends on the parameter asked for, so the caller picks the variant.
    pub enum DeviceInfoValue {
        State(DeviceStateValue),
        Ieee(IeeeValue),
        Short(ShortValue),
        Channel(ChannelValue),
        PanId(PanIdValue),
    }
}

crate::schema! {
    pub struct GetDeviceInfoResponse {
        pub param: u8,
        pub value: DeviceInfoValue,
    }
}

crate::schema! {
    pub struct StartConfirm {
        pub status: u8,
    }
}

crate::schema! {
    /// Result of a device search by IEEE address.
    pub struct FindDeviceConfirm {
        pub search_type: u8,
        pub search_key: String [hex = "uint16"],
        pub result: String [hex = "uint64"],
    }
}
