//! Pure Rust U2F raw message implementation
//!
//! This crate provides the message codec and the Register, Authenticate and
//! Version operations of a software U2F (CTAP1) authenticator. Transports
//! (USB HID framing, APDU parsing, NFC) are left to the host: it hands the
//! control byte and request payload to an [`Authenticator`] and forwards the
//! [`Response`] it gets back.
//!
//! Implements the FIDO U2F raw message formats:
//! <https://fidoalliance.org/specs/fido-u2f-v1.2-ps-20170411/fido-u2f-raw-message-formats-v1.2-ps-20170411.html>

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod attestation;
pub mod authenticator;
pub mod callbacks;
pub mod codec;
pub mod commands;
pub mod consts;
pub mod counter;
pub mod key_handle;
pub mod private_key;
pub mod response;
pub mod status;

// Re-export commonly used types
pub use attestation::{Attestation, AttestationIdentity};
pub use authenticator::{Authenticator, AuthenticatorConfig};
pub use callbacks::{AuthenticatorCallbacks, CounterStore, UpResult, UserPresence};
pub use codec::{
    AuthenticationRequest, AuthenticationResponse, EcPoint, RegistrationRequest,
    RegistrationResponse,
};
pub use commands::{AuthenticateMode, CommandCode, RegisterMode};
#[cfg(feature = "std")]
pub use counter::FileCounter;
pub use counter::MemoryCounter;
pub use key_handle::{KeyHandleStore, WrappedKeyHandles};
pub use private_key::PrivateKey;
pub use response::Response;
pub use status::{Result, StatusWord};
