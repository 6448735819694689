//! UTIL subsystem records.

crate::schema! {
    /// Logical device types the firmware supports.
    pub struct DeviceTypes {
        pub coordinator: u8 [bitmask = "start", bits = "0x01"],
        pub router: u8 [bits = "0x02"],
        pub end_device: u8 [bitmask = "end", bits = "0x04"],
    }
}

crate::schema! {
    pub struct DeviceInfoResponse {
        pub status: u8,
        pub ieee_addr: String [hex = "uint64"],
        pub short_addr: String [hex = "uint16"],
        pub device_type: DeviceTypes,
        pub device_state: u8,
        pub assoc_devices: Vec<String> [hex = "uint16", len = "uint8"],
    }
}

crate::schema! {
    pub struct LedControlRequest {
        pub led_id: u8,
        pub mode: u8,
    }
}

crate::schema! {
    /// Arbitrary bytes echoed back by the device.
    pub struct LoopbackData {
        pub data: Vec<u8>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    #[test]
    fn test_device_info_response() {
        let payload = [
            0x00, 0xe9, 0x2e, 0x9c, 0x01, 0x00, 0x4b, 0x12, 0x00, 0x00, 0x00, 0x07, 0x09, 0x01,
            0x01, 0x00,
        ];
        let rsp: DeviceInfoResponse = codec::decode_new(&payload).unwrap();
        assert_eq!(rsp.ieee_addr, "0x00124b00019c2ee9");
        assert_eq!(rsp.short_addr, "0x0000");
        assert_eq!(
            rsp.device_type,
            DeviceTypes {
                coordinator: 1,
                router: 1,
                end_device: 1
            }
        );
        assert_eq!(rsp.device_state, 9);
        assert_eq!(rsp.assoc_devices, vec!["0x0001"]);
    }

    #[test]
    fn test_loopback_takes_rest_of_payload() {
        let data: LoopbackData = codec::decode_new(&[1, 2, 3]).unwrap();
        assert_eq!(data.data, vec![1, 2, 3]);
        assert_eq!(codec::encode(&data).unwrap().as_ref(), &[1, 2, 3]);
    }
}
