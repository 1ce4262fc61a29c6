//! Pure Rust cryptographic primitives for U2F authenticators
//!
//! This crate provides the cryptographic operations required by the U2F raw
//! message protocol:
//!
//! - **ECDSA**: P-256 key generation and DER-encoded signatures for
//!   registration (attestation) and authentication (assertion)
//! - **Key wrapping**: sealing a per-registration private key into an opaque
//!   key handle bound to an application parameter
//!
//! Message formats follow the FIDO U2F raw message formats document:
//! <https://fidoalliance.org/specs/fido-u2f-v1.2-ps-20170411/fido-u2f-raw-message-formats-v1.2-ps-20170411.html>

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod ecdsa;
pub mod error;
pub mod key_wrap;

// Re-export commonly used types
pub use error::{CryptoError, Result};
