use crate::Znp;
use crate::error::Result;
use crate::protocol::{Subsystem, ZdoCommand};
use crate::types::StatusResponse;
use crate::types::zdo::{
    ActiveEpRequest, BindRequest, IeeeAddrRequest, MgmtLeaveRequest, MgmtNwkDiscRequest,
    MgmtPermitJoinRequest, NwkAddrRequest, StartupFromAppRequest, StartupFromAppResponse,
};

// ZDO requests are acknowledged with a status; the answer from the remote
// node arrives later as an event.
impl Znp {
    /// Asks for the network address of a device by IEEE address.
    pub async fn zdo_nwk_addr(&self, req: &NwkAddrRequest) -> Result<StatusResponse> {
        self.request(Subsystem::ZDO, ZdoCommand::NwkAddrReq, req)
            .await
    }

    /// Asks for the IEEE address of a device by network address.
    pub async fn zdo_ieee_addr(&self, req: &IeeeAddrRequest) -> Result<StatusResponse> {
        self.request(Subsystem::ZDO, ZdoCommand::IeeeAddrReq, req)
            .await
    }

    /// Lists the active endpoints of `nwk_addr`.
    pub async fn zdo_active_ep(
        &self,
        dst_addr: impl Into<String>,
        nwk_addr: impl Into<String>,
    ) -> Result<StatusResponse> {
        let req = ActiveEpRequest {
            dst_addr: dst_addr.into(),
            nwk_addr_of_interest: nwk_addr.into(),
        };
        self.request(Subsystem::ZDO, ZdoCommand::ActiveEpReq, &req)
            .await
    }

    /// Creates a binding.
    pub async fn zdo_bind(&self, req: &BindRequest) -> Result<StatusResponse> {
        self.request(Subsystem::ZDO, ZdoCommand::BindReq, req).await
    }

    /// Scans for networks through `req.dst_addr`.
    pub async fn zdo_mgmt_nwk_disc(&self, req: &MgmtNwkDiscRequest) -> Result<StatusResponse> {
        self.request(Subsystem::ZDO, ZdoCommand::MgmtNwkDiscReq, req)
            .await
    }

    /// Asks a device to leave the network.
    pub async fn zdo_mgmt_leave(&self, req: &MgmtLeaveRequest) -> Result<StatusResponse> {
        self.request(Subsystem::ZDO, ZdoCommand::MgmtLeaveReq, req)
            .await
    }

    /// Opens or closes the network for joining.
    pub async fn zdo_mgmt_permit_join(
        &self,
        req: &MgmtPermitJoinRequest,
    ) -> Result<StatusResponse> {
        self.request(Subsystem::ZDO, ZdoCommand::MgmtPermitJoinReq, req)
            .await
    }

    /// Starts the network stack after `start_delay_ms`.
    pub async fn zdo_startup_from_app(
        &self,
        start_delay_ms: u16,
    ) -> Result<StartupFromAppResponse> {
        let req = StartupFromAppRequest {
            start_delay: start_delay_ms,
        };
        self.request(Subsystem::ZDO, ZdoCommand::StartupFromApp, &req)
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::connect;
    use crate::types::addr_mode;
    use crate::types::zdo::BindRequest;

    #[tokio::test]
    async fn test_zdo_bind_short_destination_omits_endpoint() {
        let (client, mut device) = connect();
        let req = BindRequest {
            dst_addr: "0x0001".to_string(),
            src_address: "0x00124b00019c2ee9".to_string(),
            src_endpoint: 1,
            cluster_id: 0x0006,
            dst_addr_mode: addr_mode::GROUP,
            dst_address: "0x000000000000abcd".to_string(),
            dst_endpoint: 1,
        };
        let (status, request) = tokio::join!(client.zdo_bind(&req), device.answer(&[0x00]));
        assert!(status.unwrap().is_success());
        assert_eq!(request.payload.len(), 22);
    }

    #[tokio::test]
    async fn test_zdo_startup_from_app() {
        let (client, mut device) = connect();
        let (rsp, request) =
            tokio::join!(client.zdo_startup_from_app(100), device.answer(&[0x01]));
        assert_eq!(rsp.unwrap().status, 1);
        assert_eq!(request.payload.as_ref(), &[0x64, 0x00]);
    }
}
