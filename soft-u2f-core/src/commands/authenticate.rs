//! U2F_AUTHENTICATE command
//!
//! Proves possession of a previously registered key, or only checks that a
//! key handle belongs to this device.
//!
//! FIDO U2F raw message formats: <https://fidoalliance.org/specs/fido-u2f-v1.2-ps-20170411/fido-u2f-raw-message-formats-v1.2-ps-20170411.html#authentication-messages>

use crate::{
    attestation::Attestation,
    authenticator::Authenticator,
    callbacks::AuthenticatorCallbacks,
    codec::{self, AuthenticationResponse},
    consts::{AUTH_CHECK_ONLY, AUTH_ENFORCE, AUTH_FLAG_TUP},
    key_handle::KeyHandleStore,
    status::{Result, StatusWord},
};

use alloc::vec::Vec;

/// Behaviour requested by the authentication control byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticateMode {
    /// Gate on user presence, bump the counter and sign
    EnforcePresenceAndSign,
    /// Only report whether the key handle belongs to this device
    CheckOnly,
}

impl AuthenticateMode {
    /// Parse the control byte; anything but `0x03` or `0x07` is `WrongData`
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            AUTH_ENFORCE => Ok(Self::EnforcePresenceAndSign),
            AUTH_CHECK_ONLY => Ok(Self::CheckOnly),
            _ => Err(StatusWord::WrongData),
        }
    }

    /// Wire value
    pub fn to_u8(self) -> u8 {
        match self {
            Self::EnforcePresenceAndSign => AUTH_ENFORCE,
            Self::CheckOnly => AUTH_CHECK_ONLY,
        }
    }
}

/// Handle an authentication request
///
/// The key handle is resolved before anything else touches the user or the
/// counter. In check-only mode a handle that resolves is answered with
/// `ConditionsNotSatisfied` and nothing is signed. Otherwise the user must
/// confirm presence, the counter is incremented and persisted, and
/// `application || flags || counter || challenge` is signed with the
/// credential key.
pub fn handle<C, K, A>(
    auth: &Authenticator<C, K, A>,
    mode: AuthenticateMode,
    data: &[u8],
) -> Result<Vec<u8>>
where
    C: AuthenticatorCallbacks,
    K: KeyHandleStore,
    A: Attestation,
{
    let request = codec::decode_authentication_request(data)?;

    log::debug!(
        "Authenticate for application {:02x?} ({:?}, key handle {} bytes)",
        &request.application[..4],
        mode,
        request.key_handle.len()
    );

    let private_key = auth
        .key_handles()
        .resolve(&request.application, &request.key_handle)?;

    if mode == AuthenticateMode::CheckOnly {
        return Err(StatusWord::ConditionsNotSatisfied);
    }

    auth.check_presence("Authenticate", &request.application)?;

    let counter = auth.callbacks().increment().map_err(|e| {
        log::warn!("Counter store failed: {}", e);
        StatusWord::NoMemory
    })?;

    let flags = AUTH_FLAG_TUP;
    let signature_base =
        codec::authentication_signature_base(&request.application, flags, counter, &request.challenge);
    let signature = private_key
        .sign(&signature_base)
        .map_err(|_| StatusWord::NoMemory)?;

    log::debug!("Authenticated with counter {}", counter);

    AuthenticationResponse {
        flags,
        counter,
        signature,
    }
    .encode()
}
