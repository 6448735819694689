use crate::Znp;
use crate::error::Result;
use crate::protocol::{Subsystem, SysCommand};
use crate::types::StatusResponse;
use crate::types::sys::{
    Capabilities, GetExtAddrResponse, OsalNvReadRequest, OsalNvReadResponse, OsalNvWriteRequest,
    OsalStartTimerRequest, OsalStopTimerRequest, PingResponse, RamReadRequest, RamReadResponse,
    RamWriteRequest, RandomResponse, ResetRequest, SetExtAddrRequest, SetTxPowerRequest,
    SetTxPowerResponse, Time, VersionResponse,
};

impl Znp {
    /// Resets the device.
    ///
    /// The device does not answer the request itself; a
    /// [`ResetIndication`](crate::types::ResetIndication) event follows once
    /// it has restarted.
    ///
    /// # Arguments
    ///
    /// * `soft` - Soft reset instead of a watchdog reset
    pub async fn reset(&self, soft: bool) -> Result<()> {
        let req = ResetRequest {
            reset_type: u8::from(soft),
        };
        self.send(Subsystem::SYS, SysCommand::ResetReq, &req).await
    }

    /// Checks that the device is alive and returns the compiled-in subsystems.
    pub async fn ping(&self) -> Result<Capabilities> {
        let rsp: PingResponse = self.request(Subsystem::SYS, SysCommand::Ping, &()).await?;
        Ok(rsp.capabilities)
    }

    /// Gets the firmware version.
    pub async fn version(&self) -> Result<VersionResponse> {
        self.request(Subsystem::SYS, SysCommand::Version, &()).await
    }

    /// Sets the device's IEEE address.
    ///
    /// # Arguments
    ///
    /// * `ext_address` - `0x`-prefixed 64-bit address
    pub async fn set_ext_addr(&self, ext_address: impl Into<String>) -> Result<StatusResponse> {
        let req = SetExtAddrRequest {
            ext_address: ext_address.into(),
        };
        self.request(Subsystem::SYS, SysCommand::SetExtAddr, &req)
            .await
    }

    /// Gets the device's IEEE address.
    pub async fn get_ext_addr(&self) -> Result<String> {
        let rsp: GetExtAddrResponse = self
            .request(Subsystem::SYS, SysCommand::GetExtAddr, &())
            .await?;
        Ok(rsp.ext_address)
    }

    /// Reads `len` bytes of device memory.
    pub async fn ram_read(&self, address: u16, len: u8) -> Result<RamReadResponse> {
        let req = RamReadRequest { address, len };
        self.request(Subsystem::SYS, SysCommand::RamRead, &req).await
    }

    /// Writes device memory.
    pub async fn ram_write(&self, address: u16, value: &[u8]) -> Result<StatusResponse> {
        let req = RamWriteRequest {
            address,
            value: value.to_vec(),
        };
        self.request(Subsystem::SYS, SysCommand::RamWrite, &req).await
    }

    /// Reads a non-volatile item starting at `offset`.
    pub async fn osal_nv_read(&self, id: u16, offset: u8) -> Result<OsalNvReadResponse> {
        let req = OsalNvReadRequest { id, offset };
        self.request(Subsystem::SYS, SysCommand::OsalNvRead, &req)
            .await
    }

    /// Writes a non-volatile item starting at `offset`.
    pub async fn osal_nv_write(&self, id: u16, offset: u8, value: &[u8]) -> Result<StatusResponse> {
        let req = OsalNvWriteRequest {
            id,
            offset,
            value: value.to_vec(),
        };
        self.request(Subsystem::SYS, SysCommand::OsalNvWrite, &req)
            .await
    }

    /// Starts an OSAL timer.
    ///
    /// Expiry arrives as an [`AsyncEvent::OsalTimerExpired`](crate::AsyncEvent::OsalTimerExpired).
    pub async fn osal_start_timer(&self, id: u8, timeout_ms: u16) -> Result<StatusResponse> {
        let req = OsalStartTimerRequest {
            id,
            timeout: timeout_ms,
        };
        self.request(Subsystem::SYS, SysCommand::OsalStartTimer, &req)
            .await
    }

    /// Stops an OSAL timer.
    pub async fn osal_stop_timer(&self, id: u8) -> Result<StatusResponse> {
        let req = OsalStopTimerRequest { id };
        self.request(Subsystem::SYS, SysCommand::OsalStopTimer, &req)
            .await
    }

    /// Gets a random number from the device.
    pub async fn random(&self) -> Result<u16> {
        let rsp: RandomResponse = self.request(Subsystem::SYS, SysCommand::Random, &()).await?;
        Ok(rsp.value)
    }

    /// Sets the real-time clock.
    pub async fn set_time(&self, time: &Time) -> Result<StatusResponse> {
        self.request(Subsystem::SYS, SysCommand::SetTime, time).await
    }

    /// Reads the real-time clock.
    pub async fn get_time(&self) -> Result<Time> {
        self.request(Subsystem::SYS, SysCommand::GetTime, &()).await
    }

    /// Sets the transmit power and returns the power actually applied.
    pub async fn set_tx_power(&self, dbm: u8) -> Result<u8> {
        let req = SetTxPowerRequest { tx_power: dbm };
        let rsp: SetTxPowerResponse = self
            .request(Subsystem::SYS, SysCommand::SetTxPower, &req)
            .await?;
        Ok(rsp.tx_power)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::connect;
    use crate::protocol::{CommandKey, CommandType, Subsystem};

    #[tokio::test]
    async fn test_get_ext_addr() {
        let (client, mut device) = connect();
        let (addr, request) = tokio::join!(
            client.get_ext_addr(),
            device.answer(&[0xe9, 0x2e, 0x9c, 0x01, 0x00, 0x4b, 0x12, 0x00])
        );
        assert_eq!(request.key(), CommandKey::new(Subsystem::SYS, 0x04));
        assert_eq!(addr.unwrap(), "0x00124b00019c2ee9");
    }

    #[tokio::test]
    async fn test_osal_nv_write_encodes_request() {
        let (client, mut device) = connect();
        let (status, request) = tokio::join!(
            client.osal_nv_write(0x0003, 0, &[0x01, 0x02]),
            device.answer(&[0x00])
        );
        assert!(status.unwrap().is_success());
        assert_eq!(request.payload.as_ref(), &[0x03, 0x00, 0x00, 0x02, 0x01, 0x02]);
    }

    #[tokio::test]
    async fn test_reset_is_async() {
        let (client, mut device) = connect();
        client.reset(true).await.unwrap();

        let request = device.receive().await;
        assert_eq!(request.command_type, CommandType::AsyncRequest);
        assert_eq!(request.payload.as_ref(), &[0x01]);
        assert_eq!(client.pending(), 0);
    }
}
