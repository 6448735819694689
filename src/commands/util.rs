use crate::Znp;
use crate::error::Result;
use crate::protocol::{Subsystem, UtilCommand};
use crate::types::StatusResponse;
use crate::types::util::{DeviceInfoResponse, LedControlRequest, LoopbackData};

impl Znp {
    /// Gets the device's addresses, type, state and associated devices.
    pub async fn util_device_info(&self) -> Result<DeviceInfoResponse> {
        self.request(Subsystem::UTIL, UtilCommand::GetDeviceInfo, &())
            .await
    }

    pub async fn util_led_control(&self, led_id: u8, on: bool) -> Result<StatusResponse> {
        let req = LedControlRequest {
            led_id,
            mode: u8::from(on),
        };
        self.request(Subsystem::UTIL, UtilCommand::LedControl, &req)
            .await
    }

    /// Sends `data` to the device and returns what it echoes back.
    pub async fn util_loopback(&self, data: &[u8]) -> Result<Vec<u8>> {
        let req = LoopbackData {
            data: data.to_vec(),
        };
        let rsp: LoopbackData = self
            .request(Subsystem::UTIL, UtilCommand::Loopback, &req)
            .await?;
        Ok(rsp.data)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::connect;

    #[tokio::test]
    async fn test_loopback() {
        let (client, mut device) = connect();
        let (echo, request) = tokio::join!(
            client.util_loopback(&[0xde, 0xad]),
            device.answer(&[0xde, 0xad])
        );
        assert_eq!(request.payload.as_ref(), &[0xde, 0xad]);
        assert_eq!(echo.unwrap(), vec![0xde, 0xad]);
    }
}
