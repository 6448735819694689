use crate::Znp;
use crate::error::Result;
use crate::protocol::{AfCommand, Subsystem};
use crate::types::StatusResponse;
use crate::types::af::{DataRequest, DataRequestExt, DeleteRequest, RegisterRequest};

impl Znp {
    /// Registers an application endpoint.
    pub async fn af_register(&self, req: &RegisterRequest) -> Result<StatusResponse> {
        self.request(Subsystem::AF, AfCommand::Register, req).await
    }

    /// Sends data to a device by short address.
    ///
    /// Delivery is reported later as an
    /// [`AsyncEvent::DataConfirm`](crate::AsyncEvent::DataConfirm) carrying
    /// the same `trans_id`.
    pub async fn af_data_request(&self, req: &DataRequest) -> Result<StatusResponse> {
        self.request(Subsystem::AF, AfCommand::DataRequest, req).await
    }

    /// Sends data with extended addressing.
    pub async fn af_data_request_ext(&self, req: &DataRequestExt) -> Result<StatusResponse> {
        self.request(Subsystem::AF, AfCommand::DataRequestExt, req)
            .await
    }

    /// Removes an application endpoint.
    pub async fn af_delete(&self, endpoint: u8) -> Result<StatusResponse> {
        let req = DeleteRequest { endpoint };
        self.request(Subsystem::AF, AfCommand::Delete, &req).await
    }
}
