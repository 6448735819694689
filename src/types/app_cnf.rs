//! `APP_CNF` (base device behaviour commissioning) records.

/// Commissioning mode bits.
pub mod commissioning_mode {
    /// Touchlink.
    pub const TOUCHLINK: u8 = 0x01;
    /// Network steering.
    pub const STEERING: u8 = 0x02;
    /// Network formation.
    pub const FORMATION: u8 = 0x04;
    /// Finding and binding.
    pub const FINDING_BINDING: u8 = 0x08;
}

crate::schema! {
    pub struct BdbStartCommissioningRequest {
        /// See [`commissioning_mode`].
        pub mode: u8,
    }
}

crate::schema! {
    pub struct BdbSetChannelRequest {
        /// `1` for the primary channel set, `0` for the secondary.
        pub is_primary: u8,
        /// Channel bit mask.
        pub channel: u32,
    }
}

crate::schema! {
    pub struct BdbCommissioningNotification {
        pub status: u8,
        pub mode: u8,
        pub remaining_modes: u8,
    }
}
