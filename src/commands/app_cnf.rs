use crate::Znp;
use crate::error::Result;
use crate::protocol::{AppCnfCommand, Subsystem};
use crate::types::StatusResponse;
use crate::types::app_cnf::{BdbSetChannelRequest, BdbStartCommissioningRequest};

impl Znp {
    /// Starts commissioning in `mode`, a combination of
    /// [`commissioning_mode`](crate::types::app_cnf::commissioning_mode) bits.
    ///
    /// Progress is reported as commissioning notification events.
    pub async fn bdb_start_commissioning(&self, mode: u8) -> Result<StatusResponse> {
        let req = BdbStartCommissioningRequest { mode };
        self.request(Subsystem::APP_CNF, AppCnfCommand::BdbStartCommissioning, &req)
            .await
    }

    /// Sets the primary or secondary commissioning channel mask.
    pub async fn bdb_set_channel(&self, primary: bool, channels: u32) -> Result<StatusResponse> {
        let req = BdbSetChannelRequest {
            is_primary: u8::from(primary),
            channel: channels,
        };
        self.request(Subsystem::APP_CNF, AppCnfCommand::BdbSetChannel, &req)
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::connect;
    use crate::protocol::{CommandKey, Subsystem};

    #[tokio::test]
    async fn test_bdb_set_channel() {
        let (client, mut device) = connect();
        let (status, request) = tokio::join!(
            client.bdb_set_channel(true, 1 << 11),
            device.answer(&[0x00])
        );
        assert!(status.unwrap().is_success());
        assert_eq!(request.key(), CommandKey::new(Subsystem::APP_CNF, 0x08));
        assert_eq!(request.payload.as_ref(), &[0x01, 0x00, 0x08, 0x00, 0x00]);
    }
}
