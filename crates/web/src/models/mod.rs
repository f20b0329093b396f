//! Types stored in the session.

pub mod flash;

/// Session keys.
pub mod session_keys {
    /// Notifications carried across a redirect.
    pub const FLASH: &str = "flash_notifications";
}
