//! U2F Authenticator
//!
//! This module ties configuration, the platform callbacks, key handle storage
//! and the attestation identity together and exposes the Register,
//! Authenticate and Version operations.

use crate::{
    attestation::{Attestation, AttestationIdentity},
    callbacks::{AuthenticatorCallbacks, UpResult},
    commands::{self, AuthenticateMode, RegisterMode},
    key_handle::{KeyHandleStore, WrappedKeyHandles},
    response::Response,
    status::{Result, StatusWord},
};

use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};

/// Authenticator configuration
///
/// Defines the device secrets and user-facing settings of a U2F authenticator.
#[derive(Clone)]
pub struct AuthenticatorConfig {
    /// Key handle wrapping key
    ///
    /// Used to seal private keys into key handles. If None, a random key will
    /// be generated when the authenticator is created, and key handles will
    /// not survive a restart.
    pub key_wrapping_key: Option<[u8; 32]>,

    /// Prefix of the context string passed to presence requests
    ///
    /// Default: "U2F" (prompts read "U2F Register" / "U2F Authenticate")
    pub presence_info: String,
}

impl AuthenticatorConfig {
    /// Create a new authenticator configuration with defaults
    pub fn new() -> Self {
        Self {
            key_wrapping_key: None,
            presence_info: "U2F".to_string(),
        }
    }

    /// Set key handle wrapping key
    pub fn with_key_wrapping_key(mut self, key: [u8; 32]) -> Self {
        self.key_wrapping_key = Some(key);
        self
    }

    /// Set presence prompt prefix
    pub fn with_presence_info(mut self, info: impl Into<String>) -> Self {
        self.presence_info = info.into();
        self
    }
}

impl Default for AuthenticatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for AuthenticatorConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthenticatorConfig")
            .field(
                "key_wrapping_key",
                &self.key_wrapping_key.map(|_| "<redacted>"),
            )
            .field("presence_info", &self.presence_info)
            .finish()
    }
}

/// U2F authenticator
///
/// Every operation takes `&self`; the only shared mutable state is the usage
/// counter, which the callbacks serialize. Wrap in an `Arc` to serve several
/// transports at once.
pub struct Authenticator<C, K = WrappedKeyHandles, A = AttestationIdentity>
where
    C: AuthenticatorCallbacks,
    K: KeyHandleStore,
    A: Attestation,
{
    /// Authenticator configuration
    config: AuthenticatorConfig,

    /// Callbacks for user presence and counter storage
    callbacks: C,

    /// Key handle creation and resolution
    key_handles: K,

    /// Device attestation identity
    attestation: A,
}

impl<C, A> Authenticator<C, WrappedKeyHandles, A>
where
    C: AuthenticatorCallbacks,
    A: Attestation,
{
    /// Create a new authenticator with stateless wrapped key handles
    ///
    /// # Arguments
    ///
    /// * `config` - Authenticator configuration
    /// * `callbacks` - User presence and counter callbacks
    /// * `attestation` - Device attestation identity
    ///
    /// # Errors
    ///
    /// `NoMemory` if no wrapping key is configured and the OS random number
    /// generator fails.
    pub fn new(config: AuthenticatorConfig, callbacks: C, attestation: A) -> Result<Self> {
        let key_handles = match &config.key_wrapping_key {
            Some(key) => WrappedKeyHandles::new(key),
            None => {
                log::debug!("No wrapping key configured, generating an ephemeral one");
                WrappedKeyHandles::generate()?
            }
        };

        Ok(Self::with_key_handles(
            config,
            callbacks,
            key_handles,
            attestation,
        ))
    }
}

impl<C, K, A> Authenticator<C, K, A>
where
    C: AuthenticatorCallbacks,
    K: KeyHandleStore,
    A: Attestation,
{
    /// Create an authenticator with a custom key handle store
    ///
    /// The configured wrapping key is not used by this constructor.
    pub fn with_key_handles(
        config: AuthenticatorConfig,
        callbacks: C,
        key_handles: K,
        attestation: A,
    ) -> Self {
        Self {
            config,
            callbacks,
            key_handles,
            attestation,
        }
    }

    /// Get authenticator configuration
    pub fn config(&self) -> &AuthenticatorConfig {
        &self.config
    }

    /// Get callbacks reference
    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    /// Get key handle store
    pub fn key_handles(&self) -> &K {
        &self.key_handles
    }

    /// Get attestation identity
    pub fn attestation(&self) -> &A {
        &self.attestation
    }

    /// Register a new key pair
    ///
    /// # Arguments
    ///
    /// * `mode` - Presence policy from the control byte
    /// * `data` - 64-byte registration request
    ///
    /// # Returns
    ///
    /// Encoded registration response
    pub fn register(&self, mode: RegisterMode, data: &[u8]) -> Result<Vec<u8>> {
        commands::register::handle(self, mode, data)
    }

    /// Authenticate with a previously registered key handle
    ///
    /// # Arguments
    ///
    /// * `mode` - Enforce-and-sign or check-only
    /// * `data` - Authentication request
    ///
    /// # Returns
    ///
    /// Encoded authentication response. Check-only requests on a valid key
    /// handle always return `Err(ConditionsNotSatisfied)`.
    pub fn authenticate(&self, mode: AuthenticateMode, data: &[u8]) -> Result<Vec<u8>> {
        commands::authenticate::handle(self, mode, data)
    }

    /// Protocol version string ("U2F_V2")
    pub fn version(&self, data: &[u8]) -> Result<Vec<u8>> {
        commands::version::handle(data)
    }

    /// Register from the raw control byte and payload
    pub fn register_raw(&self, control: u8, data: &[u8]) -> Response {
        let result = RegisterMode::from_u8(control).and_then(|mode| self.register(mode, data));
        Self::finish("Register", result)
    }

    /// Authenticate from the raw control byte and payload
    pub fn authenticate_raw(&self, control: u8, data: &[u8]) -> Response {
        let result =
            AuthenticateMode::from_u8(control).and_then(|mode| self.authenticate(mode, data));
        Self::finish("Authenticate", result)
    }

    /// Version from the raw payload
    pub fn version_raw(&self, data: &[u8]) -> Response {
        Self::finish("Version", self.version(data))
    }

    /// Gate an operation on user presence
    ///
    /// Denied and timed-out requests both become `ConditionsNotSatisfied`.
    pub(crate) fn check_presence(&self, action: &str, application: &[u8; 32]) -> Result<()> {
        let info = format!("{} {}", self.config.presence_info, action);

        match self.callbacks.request_up(&info, application)? {
            UpResult::Accepted => Ok(()),
            result => {
                log::warn!("User presence not confirmed for {}: {:?}", action, result);
                Err(StatusWord::ConditionsNotSatisfied)
            }
        }
    }

    fn finish(operation: &str, result: Result<Vec<u8>>) -> Response {
        if let Err(status) = &result {
            log::debug!("{} finished with {}", operation, status);
        }
        Response::from_result(result)
    }
}
