//! AF (application framework) records.

/// Latency requirements of a registered endpoint.
pub mod latency {
    /// No latency requirement.
    pub const NO_LATENCY: u8 = 0x00;
    /// Fast beacons.
    pub const FAST_BEACONS: u8 = 0x01;
    /// Slow beacons.
    pub const SLOW_BEACONS: u8 = 0x02;
}

crate::schema! {
    /// Registers an application endpoint with its cluster lists.
    pub struct RegisterRequest {
        pub end_point: u8,
        pub app_prof_id: u16,
        pub app_device_id: u16,
        pub add_dev_ver: u8,
        /// See [`latency`].
        pub latency_req: u8,
        pub app_in_cluster_list: Vec<u16> [len = "uint8"],
        pub app_out_cluster_list: Vec<u16> [len = "uint8"],
    }
}

crate::schema! {
    /// Transmit options of a data request, packed into one byte.
    pub struct DataRequestOptions {
        pub wildcard_profile_id: u8 [bitmask = "start", bits = "0b00000010"],
        pub aps_ack: u8 [bits = "0b00010000"],
        pub discover_route: u8 [bits = "0b00100000"],
        pub aps_security: u8 [bits = "0b01000000"],
        pub skip_routing: u8 [bitmask = "end", bits = "0b10000000"],
    }
}

crate::schema! {
    /// Sends data to an endpoint on a device identified by its short address.
    pub struct DataRequest {
        pub dst_addr: String [hex = "uint16"],
        pub dst_endpoint: u8,
        pub src_endpoint: u8,
        pub cluster_id: u16,
        pub trans_id: u8,
        pub options: DataRequestOptions,
        pub radius: u8,
        pub data: Vec<u8> [len = "uint8"],
    }
}

crate::schema! {
    /// Sends data with extended addressing and a 16-bit data length.
    pub struct DataRequestExt {
        /// See [`addr_mode`](crate::types::addr_mode).
        pub dst_addr_mode: u8,
        pub dst_addr: String [hex = "uint64"],
        pub dst_endpoint: u8,
        pub dst_pan_id: u16,
        pub src_endpoint: u8,
        pub cluster_id: u16,
        pub trans_id: u8,
        pub options: DataRequestOptions,
        pub radius: u8,
        pub data: Vec<u8> [len = "uint16"],
    }
}

crate::schema! {
    pub struct DeleteRequest {
        pub endpoint: u8,
    }
}

crate::schema! {
    /// Outcome of an earlier data request.
    pub struct DataConfirm {
        pub status: u8,
        pub endpoint: u8,
        pub trans_id: u8,
    }
}

crate::schema! {
    /// Application data received from the network.
    pub struct IncomingMessage {
        pub group_id: u16,
        pub cluster_id: u16,
        pub src_addr: String [hex = "uint16"],
        pub src_endpoint: u8,
        pub dst_endpoint: u8,
        pub was_broadcast: u8,
        pub link_quality: u8,
        pub security_use: u8,
        pub timestamp: u32,
        pub trans_seq_number: u8,
        pub data: Vec<u8> [len = "uint8"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    #[test]
    fn test_register_request_layout() {
        let req = RegisterRequest {
            end_point: 1,
            app_prof_id: 0x0104,
            app_device_id: 0x0005,
            add_dev_ver: 0,
            latency_req: latency::NO_LATENCY,
            app_in_cluster_list: vec![0x0006],
            app_out_cluster_list: vec![],
        };
        let bytes = codec::encode(&req).unwrap();
        assert_eq!(
            bytes.as_ref(),
            &[0x01, 0x04, 0x01, 0x05, 0x00, 0x00, 0x00, 0x01, 0x06, 0x00, 0x00]
        );
    }

    #[test]
    fn test_data_request_options_byte() {
        let req = DataRequest {
            dst_addr: "0x1234".to_string(),
            dst_endpoint: 1,
            src_endpoint: 1,
            cluster_id: 6,
            trans_id: 9,
            options: DataRequestOptions {
                aps_ack: 1,
                discover_route: 1,
                ..DataRequestOptions::default()
            },
            radius: 30,
            data: vec![0xaa],
        };
        let bytes = codec::encode(&req).unwrap();
        assert_eq!(
            bytes.as_ref(),
            &[0x34, 0x12, 1, 1, 6, 0, 9, 0x30, 30, 1, 0xaa]
        );
        assert_eq!(codec::decode_new::<DataRequest>(&bytes).unwrap(), req);
    }

    #[test]
    fn test_incoming_message() {
        let payload = [
            0x00, 0x00, 0x06, 0x00, 0x34, 0x12, 0x01, 0x01, 0x00, 0x50, 0x00, 0x10, 0x00, 0x00,
            0x00, 0x07, 0x02, 0xde, 0xad,
        ];
        let msg: IncomingMessage = codec::decode_new(&payload).unwrap();
        assert_eq!(msg.cluster_id, 6);
        assert_eq!(msg.src_addr, "0x1234");
        assert_eq!(msg.link_quality, 0x50);
        assert_eq!(msg.timestamp, 0x10);
        assert_eq!(msg.trans_seq_number, 7);
        assert_eq!(msg.data, vec![0xde, 0xad]);
    }
}
