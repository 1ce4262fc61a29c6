//! U2F_REGISTER command
//!
//! Creates a new key pair bound to an application and returns it, together
//! with a key handle, under the device attestation signature.
//!
//! FIDO U2F raw message formats: <https://fidoalliance.org/specs/fido-u2f-v1.2-ps-20170411/fido-u2f-raw-message-formats-v1.2-ps-20170411.html#registration-messages>

use crate::{
    attestation::Attestation,
    authenticator::Authenticator,
    callbacks::AuthenticatorCallbacks,
    codec::{self, RegistrationResponse},
    consts::{AUTH_ENFORCE, MAX_KEY_HANDLE_SIZE, REGISTER_DONT_ENFORCE},
    key_handle::KeyHandleStore,
    private_key::PrivateKey,
    status::{Result, StatusWord},
};

use alloc::vec::Vec;

/// Presence policy requested by the registration control byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterMode {
    /// Ask the user before creating the key pair
    EnforcePresence,
    /// Create the key pair without asking (U2F v1.2 "dont-enforce")
    SkipPresence,
}

impl RegisterMode {
    /// Parse the control byte
    ///
    /// `0x00` (no flags, as sent by U2F v1.0 clients) and `0x03` enforce
    /// presence, `0x08` skips it; anything else is `WrongData`.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0x00 | AUTH_ENFORCE => Ok(Self::EnforcePresence),
            REGISTER_DONT_ENFORCE => Ok(Self::SkipPresence),
            _ => Err(StatusWord::WrongData),
        }
    }
}

/// Handle a registration request
///
/// Decodes the 64-byte request, gates on user presence (unless skipped),
/// generates a fresh P-256 key pair, wraps it into a key handle bound to the
/// application parameter and signs
/// `0x00 || application || challenge || key handle || public key` with the
/// attestation key.
pub fn handle<C, K, A>(auth: &Authenticator<C, K, A>, mode: RegisterMode, data: &[u8]) -> Result<Vec<u8>>
where
    C: AuthenticatorCallbacks,
    K: KeyHandleStore,
    A: Attestation,
{
    let request = codec::decode_registration_request(data)?;

    log::debug!(
        "Register for application {:02x?} ({:?})",
        &request.application[..4],
        mode
    );

    if mode == RegisterMode::EnforcePresence {
        auth.check_presence("Register", &request.application)?;
    }

    let private_key = PrivateKey::generate().map_err(|_| StatusWord::NoMemory)?;
    let public_key = private_key.public_key().map_err(|_| StatusWord::NoMemory)?;

    let key_handle = auth
        .key_handles()
        .create(&request.application, &private_key)?;
    if key_handle.len() > MAX_KEY_HANDLE_SIZE {
        log::warn!(
            "Key handle store produced {} bytes, above the {} byte limit",
            key_handle.len(),
            MAX_KEY_HANDLE_SIZE
        );
        return Err(StatusWord::WrongData);
    }

    let signature_base = codec::registration_signature_base(
        &request.application,
        &request.challenge,
        &key_handle,
        &public_key,
    );
    let signature = auth
        .attestation()
        .sign(&signature_base)
        .map_err(|_| StatusWord::NoMemory)?;

    let response = RegistrationResponse {
        public_key,
        key_handle,
        attestation_certificate: auth.attestation().certificate().to_vec(),
        signature,
    };

    response.encode()
}
