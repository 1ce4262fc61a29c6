//! Common test utilities for soft-u2f-core integration tests
//!
//! This module provides shared implementations of test callbacks, constants,
//! and helper functions to reduce code duplication across test files.

#![allow(dead_code)]

use soft_u2f_core::{
    AttestationIdentity, AuthenticateMode, Authenticator, AuthenticatorConfig, CounterStore,
    MemoryCounter, PrivateKey, RegisterMode, RegistrationResponse, Result, UpResult,
    UserPresence, codec,
};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const TEST_APP_ID: &str = "https://example.com";
pub const OTHER_APP_ID: &str = "https://example.org";
pub const TEST_WRAPPING_KEY: [u8; 32] = [0x5E; 32];

/// Test callbacks with scripted user presence and an in-memory counter
///
/// Presence answers are consumed from the script in order; once it is empty
/// every request is accepted. Every prompt is recorded.
#[derive(Clone, Default)]
pub struct TestCallbacks {
    script: Arc<Mutex<VecDeque<UpResult>>>,
    prompts: Arc<Mutex<Vec<(String, [u8; 32])>>>,
    counter: Arc<MemoryCounter>,
}

impl TestCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue presence answers
    pub fn script(&self, results: &[UpResult]) {
        self.script.lock().unwrap().extend(results.iter().copied());
    }

    /// Number of presence prompts seen so far
    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Recorded prompts (info string, application parameter)
    pub fn prompts(&self) -> Vec<(String, [u8; 32])> {
        self.prompts.lock().unwrap().clone()
    }
}

impl UserPresence for TestCallbacks {
    fn request_up(&self, info: &str, application: &[u8; 32]) -> Result<UpResult> {
        self.prompts
            .lock()
            .unwrap()
            .push((info.to_string(), *application));
        Ok(self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(UpResult::Accepted))
    }
}

impl CounterStore for TestCallbacks {
    fn increment(&self) -> Result<u32> {
        self.counter.increment()
    }

    fn current(&self) -> Result<u32> {
        self.counter.current()
    }
}

/// Initialize logging once per test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Self-signed P-256 attestation certificate, DER
pub const TEST_CERTIFICATE: &[u8] = include_bytes!("../data/attestation.der");

/// Private scalar matching `TEST_CERTIFICATE`
pub const TEST_ATTESTATION_KEY: &[u8; 32] = include_bytes!("../data/attestation.key");

pub fn test_identity() -> AttestationIdentity {
    let key = PrivateKey::from_slice(TEST_ATTESTATION_KEY).unwrap();
    AttestationIdentity::new(key, TEST_CERTIFICATE.to_vec()).unwrap()
}

pub fn test_config() -> AuthenticatorConfig {
    AuthenticatorConfig::new().with_key_wrapping_key(TEST_WRAPPING_KEY)
}

pub fn new_authenticator() -> Authenticator<TestCallbacks> {
    init_logging();
    Authenticator::new(test_config(), TestCallbacks::new(), test_identity()).unwrap()
}

pub fn registration_request(challenge: &[u8; 32], app_id: &str) -> Vec<u8> {
    let mut data = challenge.to_vec();
    data.extend_from_slice(&codec::application_parameter(app_id));
    data
}

pub fn authentication_request(challenge: &[u8; 32], app_id: &str, key_handle: &[u8]) -> Vec<u8> {
    let mut data = registration_request(challenge, app_id);
    data.push(key_handle.len() as u8);
    data.extend_from_slice(key_handle);
    data
}

/// Register for `app_id` with presence enforced and decode the response
pub fn register<C>(auth: &Authenticator<C>, app_id: &str) -> RegistrationResponse
where
    C: soft_u2f_core::AuthenticatorCallbacks,
{
    let response = auth
        .register(
            RegisterMode::EnforcePresence,
            &registration_request(&[0x11; 32], app_id),
        )
        .unwrap();
    RegistrationResponse::decode(&response).unwrap()
}

/// Sign-mode authentication
pub fn authenticate<C>(
    auth: &Authenticator<C>,
    challenge: &[u8; 32],
    app_id: &str,
    key_handle: &[u8],
) -> Result<Vec<u8>>
where
    C: soft_u2f_core::AuthenticatorCallbacks,
{
    auth.authenticate(
        AuthenticateMode::EnforcePresenceAndSign,
        &authentication_request(challenge, app_id, key_handle),
    )
}

/// Authenticator with its own wrapping key, standing in for another device
pub fn new_authenticator_with_key(wrapping_key: [u8; 32]) -> Authenticator<TestCallbacks> {
    init_logging();
    let config = AuthenticatorConfig::new().with_key_wrapping_key(wrapping_key);
    Authenticator::new(config, TestCallbacks::new(), test_identity()).unwrap()
}
