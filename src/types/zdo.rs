//! ZDO (Zigbee device object) records.

crate::schema! {
    pub struct NwkAddrRequest {
        pub ieee_addr: String [hex = "uint64"],
        /// `0` for a single device, `1` to include associated devices.
        pub req_type: u8,
        pub start_index: u8,
    }
}

crate::schema! {
    pub struct IeeeAddrRequest {
        pub short_addr: String [hex = "uint16"],
        pub req_type: u8,
        pub start_index: u8,
    }
}

crate::schema! {
    pub struct ActiveEpRequest {
        pub dst_addr: String [hex = "uint16"],
        pub nwk_addr_of_interest: String [hex = "uint16"],
    }
}

crate::schema! {
    /// Creates a binding on `dst_addr`.
    ///
    /// `dst_endpoint` is only on the wire when the destination is addressed
    /// by IEEE address.
    pub struct BindRequest {
        pub dst_addr: String [hex = "uint16"],
        pub src_address: String [hex = "uint64"],
        pub src_endpoint: u8,
        pub cluster_id: u16,
        pub dst_addr_mode: u8,
        pub dst_address: String [hex = "uint64"],
        pub dst_endpoint: u8 [cond = "uint:dst_addr_mode==3"],
    }
}

crate::schema! {
    pub struct MgmtNwkDiscRequest {
        pub dst_addr: String [hex = "uint16"],
        /// Channel bit mask.
        pub scan_channels: u32,
        pub scan_duration: u8,
        pub start_index: u8,
    }
}

crate::schema! {
    pub struct MgmtLeaveRequest {
        pub dst_addr: String [hex = "uint16"],
        pub device_address: String [hex = "uint64"],
        /// Bit 0 rejoin, bit 1 remove children.
        pub remove_children_rejoin: u8,
    }
}

crate::schema! {
    pub struct MgmtPermitJoinRequest {
        pub addr_mode: u8,
        pub dst_addr: String [hex = "uint16"],
        /// Seconds; `0` closes the network, `0xff` opens it indefinitely.
        pub duration: u8,
        pub tc_significance: u8,
    }
}

crate::schema! {
    pub struct StartupFromAppRequest {
        /// Milliseconds to wait before starting.
        pub start_delay: u16,
    }
}

crate::schema! {
    pub struct StartupFromAppResponse {
        /// `0` restored network state, `1` new network state, `2` leave and
        /// not started.
        pub status: u8,
    }
}

crate::schema! {
    pub struct NwkAddrResponse {
        pub status: u8,
        pub ieee_addr: String [hex = "uint64"],
        pub nwk_addr: String [hex = "uint16"],
        pub start_index: u8,
        pub assoc_dev_list: Vec<String> [hex = "uint16", len = "uint8"],
    }
}

crate::schema! {
    pub struct IeeeAddrResponse {
        pub status: u8,
        pub ieee_addr: String [hex = "uint64"],
        pub nwk_addr: String [hex = "uint16"],
        pub start_index: u8,
        pub assoc_dev_list: Vec<String> [hex = "uint16", len = "uint8"],
    }
}

crate::schema! {
    pub struct ActiveEpResponse {
        pub src_addr: String [hex = "uint16"],
        pub status: u8,
        pub nwk_addr: String [hex = "uint16"],
        pub active_ep_list: Vec<u8> [len = "uint8"],
    }
}

crate::schema! {
    /// Source address and status of a ZDO management response.
    pub struct ZdoStatusResponse {
        pub src_addr: String [hex = "uint16"],
        pub status: u8,
    }
}

crate::schema! {
    /// A network found by a discovery scan.
    pub struct Network {
        pub neighbor_pan_id: u16,
        pub logical_channel: u8,
        pub stack_profile: u8 [bitmask = "start", bits = "0b00001111"],
        pub zigbee_version: u8 [bitmask = "end", bits = "0b11110000"],
        pub beacon_order: u8 [bitmask = "start", bits = "0b00001111"],
        pub super_frame_order: u8 [bitmask = "end", bits = "0b11110000"],
        pub permit_join: u8,
    }
}

crate::schema! {
    pub struct MgmtNwkDiscResponse {
        pub src_addr: String [hex = "uint16"],
        pub status: u8,
        pub network_count: u8,
        pub start_index: u8,
        pub network_list: Vec<Network> [len = "uint8"],
    }
}

crate::schema! {
    /// The coordinator's network state changed.
    pub struct StateChangeIndication {
        /// Device state, `0x09` once started as coordinator.
        pub state: u8,
    }
}

crate::schema! {
    /// MAC capability flags of an announcing device.
    pub struct DeviceCapabilities {
        pub alternate_pan_coordinator: u8 [bitmask = "start", bits = "0x01"],
        pub router: u8 [bits = "0x02"],
        pub mains_powered: u8 [bits = "0x04"],
        pub receiver_on_when_idle: u8 [bits = "0x08"],
        pub security_capability: u8 [bits = "0x40"],
        pub allocate_address: u8 [bitmask = "end", bits = "0x80"],
    }
}

crate::schema! {
    /// A device joined or rejoined and announced itself.
    pub struct EndDeviceAnnounceIndication {
        pub src_addr: String [hex = "uint16"],
        pub nwk_addr: String [hex = "uint16"],
        pub ieee_addr: String [hex = "uint64"],
        pub capabilities: DeviceCapabilities,
    }
}

crate::schema! {
    pub struct LeaveIndication {
        pub src_addr: String [hex = "uint16"],
        pub ext_addr: String [hex = "uint64"],
        pub request: u8,
        pub remove: u8,
        pub rejoin: u8,
    }
}

crate::schema! {
    /// The trust center admitted a device.
    pub struct TcDeviceIndication {
        pub nwk_addr: String [hex = "uint16"],
        pub ext_addr: String [hex = "uint64"],
        pub parent_addr: String [hex = "uint16"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::types::addr_mode;

    #[test]
    fn test_bind_request_endpoint_by_mode() {
        let mut req = BindRequest {
            dst_addr: "0x0000".to_string(),
            src_address: "0x00124b0001020304".to_string(),
            src_endpoint: 1,
            cluster_id: 6,
            dst_addr_mode: addr_mode::IEEE,
            dst_address: "0x00124b0005060708".to_string(),
            dst_endpoint: 1,
        };
        assert_eq!(codec::encode(&req).unwrap().len(), 23);

        req.dst_addr_mode = addr_mode::GROUP;
        req.dst_endpoint = 0;
        let bytes = codec::encode(&req).unwrap();
        assert_eq!(bytes.len(), 22);
        assert_eq!(codec::decode_new::<BindRequest>(&bytes).unwrap(), req);
    }

    #[test]
    fn test_ieee_addr_response_list() {
        let payload = [
            0x00, 0xe9, 0x2e, 0x9c, 0x01, 0x00, 0x4b, 0x12, 0x00, 0x00, 0x00, 0x00, 0x02, 0x34,
            0x12, 0xcd, 0xab,
        ];
        let rsp: IeeeAddrResponse = codec::decode_new(&payload).unwrap();
        assert_eq!(rsp.ieee_addr, "0x00124b00019c2ee9");
        assert_eq!(rsp.nwk_addr, "0x0000");
        assert_eq!(rsp.assoc_dev_list, vec!["0x1234", "0xabcd"]);
    }

    #[test]
    fn test_network_two_runs() {
        let payload = [
            0x02, 0x00, 0x00, 0x01, 0x00, 0x01, 0x01, 0x00, 0x0b, 0x12, 0xff, 0x01,
        ];
        let rsp: MgmtNwkDiscResponse = codec::decode_new(&payload).unwrap();
        assert_eq!(rsp.network_list.len(), 1);
        let network = &rsp.network_list[0];
        assert_eq!(network.neighbor_pan_id, 0x0001);
        assert_eq!(network.logical_channel, 0x0b);
        assert_eq!(network.stack_profile, 2);
        assert_eq!(network.zigbee_version, 1);
        assert_eq!(network.beacon_order, 0xf);
        assert_eq!(network.super_frame_order, 0xf);
        assert_eq!(network.permit_join, 1);
    }

    #[test]
    fn test_end_device_announce() {
        let payload = [
            0x34, 0x12, 0x34, 0x12, 0x08, 0x07, 0x06, 0x05, 0x00, 0x4b, 0x12, 0x00, 0x8e,
        ];
        let ind: EndDeviceAnnounceIndication = codec::decode_new(&payload).unwrap();
        assert_eq!(ind.ieee_addr, "0x00124b0005060708");
        assert_eq!(ind.capabilities.router, 1);
        assert_eq!(ind.capabilities.mains_powered, 1);
        assert_eq!(ind.capabilities.receiver_on_when_idle, 1);
        assert_eq!(ind.capabilities.allocate_address, 1);
        assert_eq!(ind.capabilities.alternate_pan_coordinator, 0);
    }
}
