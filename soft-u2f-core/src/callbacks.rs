//! Callback traits for user presence and usage-counter storage
//!
//! These traits define the interface between the U2F message processing
//! and the platform-specific user interaction and persistence mechanisms.

use crate::status::StatusWord;

/// Result of a user presence check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpResult {
    /// User denied the operation
    Denied,
    /// User accepted (presence confirmed)
    Accepted,
    /// Operation timed out waiting for user
    Timeout,
}

impl UpResult {
    /// Check if user presence was confirmed
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

/// Callback for user interaction
///
/// Invoked by the authenticator before creating a credential (unless the
/// request opted out) and before every signing authentication.
pub trait UserPresence {
    /// Request user presence confirmation
    ///
    /// This is typically a simple "tap to confirm" action.
    ///
    /// # Arguments
    ///
    /// * `info` - Context information (e.g., "U2F Register", "U2F Authenticate")
    /// * `application` - Application parameter of the requesting relying party
    ///
    /// # Returns
    ///
    /// Result indicating whether user presence was confirmed. Only
    /// [`UpResult::Accepted`] lets the operation proceed.
    fn request_up(&self, info: &str, application: &[u8; 32]) -> Result<UpResult, StatusWord>;
}

/// Callback for the device-wide usage counter
///
/// Implementations must serialize concurrent increments and must have
/// persisted the new value before returning it.
pub trait CounterStore {
    /// Atomically read, increment and persist the counter
    ///
    /// # Returns
    ///
    /// The new counter value. A storage failure or overflow is `NoMemory`.
    fn increment(&self) -> Result<u32, StatusWord>;

    /// Current counter value without modifying it
    fn current(&self) -> Result<u32, StatusWord>;
}

/// Combined callbacks interface
///
/// Combines user presence and counter storage callbacks.
pub trait AuthenticatorCallbacks: UserPresence + CounterStore {}

impl<T> AuthenticatorCallbacks for T where T: UserPresence + CounterStore {}
