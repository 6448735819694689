use crate::Znp;
use crate::error::Result;
use crate::protocol::{SapiCommand, Subsystem};
use crate::types::StatusResponse;
use crate::types::sapi::{
    DeviceInfoParam, DeviceInfoValue, GetDeviceInfoRequest, GetDeviceInfoResponse,
    PermitJoiningRequest, ReadConfigurationRequest, ReadConfigurationResponse,
    WriteConfigurationRequest,
};

impl Znp {
    /// Starts the Zigbee stack. Completion arrives as a start confirm event.
    pub async fn sapi_start(&self) -> Result<()> {
        self.request(Subsystem::SAPI, SapiCommand::StartRequest, &())
            .await
    }

    /// Reads a configuration item from the device's non-volatile memory.
    pub async fn sapi_read_configuration(
        &self,
        config_id: u8,
    ) -> Result<ReadConfigurationResponse> {
        let req = ReadConfigurationRequest { config_id };
        self.request(Subsystem::SAPI, SapiCommand::ReadConfiguration, &req)
            .await
    }

    /// Writes a configuration item to the device's non-volatile memory.
    pub async fn sapi_write_configuration(
        &self,
        config_id: u8,
        value: &[u8],
    ) -> Result<StatusResponse> {
        let req = WriteConfigurationRequest {
            config_id,
            value: value.to_vec(),
        };
        self.request(Subsystem::SAPI, SapiCommand::WriteConfiguration, &req)
            .await
    }

    /// Opens joining on `destination` for `timeout` seconds.
    pub async fn sapi_permit_joining(
        &self,
        destination: impl Into<String>,
        timeout: u8,
    ) -> Result<StatusResponse> {
        let req = PermitJoiningRequest {
            destination: destination.into(),
            timeout,
        };
        self.request(Subsystem::SAPI, SapiCommand::PermitJoiningRequest, &req)
            .await
    }

    /// Reads one device information parameter.
    ///
    /// The value's layout depends on `param`, so the response is decoded into
    /// the variant `param` selects.
    pub async fn sapi_get_device_info(&self, param: DeviceInfoParam) -> Result<DeviceInfoValue> {
        let req = GetDeviceInfoRequest { param: param as u8 };
        let mut rsp = GetDeviceInfoResponse {
            param: 0,
            value: param.empty_value(),
        };
        self.request_into(Subsystem::SAPI, SapiCommand::GetDeviceInfo, &req, &mut rsp)
            .await?;
        Ok(rsp.value)
    }
}
