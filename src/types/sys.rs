//! SYS subsystem records.

crate::schema! {
    /// Resets the device. Sent as AREQ; the device answers with a
    /// [`ResetIndication`] once it has restarted.
    pub struct ResetRequest {
        /// `0` for a hardware (watchdog) reset, `1` for a soft reset.
        pub reset_type: u8,
    }
}

crate::schema! {
    /// Subsystems compiled into the firmware, one bit each.
    pub struct Capabilities {
        pub sys: u16 [bitmask = "start", bits = "0x0001"],
        pub mac: u16 [bits = "0x0002"],
        pub nwk: u16 [bits = "0x0004"],
        pub af: u16 [bits = "0x0008"],
        pub zdo: u16 [bits = "0x0010"],
        pub sapi: u16 [bits = "0x0020"],
        pub util: u16 [bits = "0x0040"],
        pub debug: u16 [bits = "0x0080"],
        pub app: u16 [bits = "0x0100"],
        pub zoad: u16 [bitmask = "end", bits = "0x1000"],
    }
}

crate::schema! {
    pub struct PingResponse {
        pub capabilities: Capabilities,
    }
}

crate::schema! {
    pub struct VersionResponse {
        /// Transport protocol revision.
        pub transport_rev: u8,
        /// Product id.
        pub product: u8,
        pub major_rel: u8,
        pub minor_rel: u8,
        pub maint_rel: u8,
    }
}

crate::schema! {
    pub struct SetExtAddrRequest {
        /// New IEEE address.
        pub ext_address: String [hex = "uint64"],
    }
}

crate::schema! {
    pub struct GetExtAddrResponse {
        pub ext_address: String [hex = "uint64"],
    }
}

crate::schema! {
    /// Reads `len` bytes of device RAM at `address`.
    pub struct RamReadRequest {
        pub address: u16,
        pub len: u8,
    }
}

crate::schema! {
    pub struct RamReadResponse {
        pub status: u8,
        pub value: Vec<u8> [len = "uint8"],
    }
}

crate::schema! {
    pub struct RamWriteRequest {
        pub address: u16,
        pub value: Vec<u8> [len = "uint8"],
    }
}

crate::schema! {
    pub struct OsalNvReadRequest {
        pub id: u16,
        pub offset: u8,
    }
}

crate::schema! {
    pub struct OsalNvReadResponse {
        pub status: u8,
        pub value: Vec<u8> [len = "uint8"],
    }
}

crate::schema! {
    pub struct OsalNvWriteRequest {
        pub id: u16,
        pub offset: u8,
        pub value: Vec<u8> [len = "uint8"],
    }
}

crate::schema! {
    /// Starts OSAL timer `id`; expiry is reported as [`OsalTimerExpired`].
    pub struct OsalStartTimerRequest {
        pub id: u8,
        /// Milliseconds.
        pub timeout: u16,
    }
}

crate::schema! {
    pub struct OsalStopTimerRequest {
        pub id: u8,
    }
}

crate::schema! {
    pub struct RandomResponse {
        pub value: u16,
    }
}

crate::schema! {
    /// Real-time clock value. Used both to set and to read the clock.
    pub struct Time {
        /// Seconds since 2000-01-01, or `0` to use the fields below.
        pub utc_time: u32,
        pub hour: u8,
        pub minute: u8,
        pub second: u8,
        pub month: u8,
        pub day: u8,
        pub year: u16,
    }
}

crate::schema! {
    pub struct SetTxPowerRequest {
        /// Requested power in dBm.
        pub tx_power: u8,
    }
}

crate::schema! {
    pub struct SetTxPowerResponse {
        /// Power actually applied.
        pub tx_power: u8,
    }
}

crate::schema! {
    /// Sent by the device after every reset.
    pub struct ResetIndication {
        pub reason: u8,
        pub transport_rev: u8,
        pub product_id: u8,
        pub major_rel: u8,
        pub minor_rel: u8,
        pub hw_rev: u8,
    }
}

crate::schema! {
    pub struct OsalTimerExpired {
        pub id: u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    #[test]
    fn test_capabilities_bits() {
        let ping: PingResponse = codec::decode_new(&[0x59, 0x11]).unwrap();
        let caps = ping.capabilities;
        assert_eq!(caps.sys, 1);
        assert_eq!(caps.mac, 0);
        assert_eq!(caps.af, 1);
        assert_eq!(caps.zdo, 1);
        assert_eq!(caps.util, 1);
        assert_eq!(caps.app, 1);
        assert_eq!(caps.zoad, 1);
        assert_eq!(codec::encode(&caps).unwrap().as_ref(), &[0x59, 0x11]);
    }

    #[test]
    fn test_ext_addr() {
        let req = SetExtAddrRequest {
            ext_address: "0x00124b00019c2ee9".to_string(),
        };
        let bytes = codec::encode(&req).unwrap();
        let rsp: GetExtAddrResponse = codec::decode_new(&bytes).unwrap();
        assert_eq!(rsp.ext_address, req.ext_address);
    }

    #[test]
    fn test_time_layout() {
        let time = Time {
            utc_time: 1,
            hour: 2,
            minute: 3,
            second: 4,
            month: 5,
            day: 6,
            year: 2024,
        };
        let bytes = codec::encode(&time).unwrap();
        assert_eq!(bytes.as_ref(), &[1, 0, 0, 0, 2, 3, 4, 5, 6, 0xe8, 0x07]);
    }
}
