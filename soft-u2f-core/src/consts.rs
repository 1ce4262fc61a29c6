//! Protocol constants of the U2F raw message format
//!
//! Every size ceiling and magic byte the codec enforces lives here.

/// EC key size in bytes
pub const EC_KEY_SIZE: usize = 32;

/// Size of an uncompressed EC point
pub const EC_POINT_SIZE: usize = EC_KEY_SIZE * 2 + 1;

/// Max size of a key handle
pub const MAX_KEY_HANDLE_SIZE: usize = 128;

/// Max size of the attestation certificate
pub const MAX_ATTESTATION_CERT_SIZE: usize = 2048;

/// Max size of a DER-encoded EC signature
pub const MAX_EC_SIGNATURE_SIZE: usize = 72;

/// Size of the counter field
pub const COUNTER_SIZE: usize = 4;

/// Size of the application parameter
pub const APPLICATION_ID_SIZE: usize = 32;

/// Size of the challenge parameter
pub const CHALLENGE_SIZE: usize = 32;

/// Uncompressed point format tag
pub const POINT_UNCOMPRESSED: u8 = 0x04;

/// Version 2 registration identifier (first byte of a registration response)
pub const REGISTER_ID: u8 = 0x05;

/// Version 2 hash identifier (first byte of the registration signature base)
pub const REGISTER_HASH_ID: u8 = 0x00;

/// Authentication control: enforce user presence and sign
pub const AUTH_ENFORCE: u8 = 0x03;

/// Authentication control: check key handle only
pub const AUTH_CHECK_ONLY: u8 = 0x07;

/// Registration control: proceed without a presence check (U2F v1.2 "dont-enforce")
pub const REGISTER_DONT_ENFORCE: u8 = 0x08;

/// Response flag: test of user presence set
pub const AUTH_FLAG_TUP: u8 = 0x01;

/// Exact size of a registration request
pub const REGISTER_REQUEST_SIZE: usize = CHALLENGE_SIZE + APPLICATION_ID_SIZE;

/// Fixed prefix of an authentication request (challenge, application, key handle length)
pub const AUTHENTICATE_REQUEST_PREFIX_SIZE: usize = CHALLENGE_SIZE + APPLICATION_ID_SIZE + 1;

/// Fixed prefix of an authentication response (flags, counter)
pub const AUTHENTICATE_RESPONSE_PREFIX_SIZE: usize = 1 + COUNTER_SIZE;

/// Fixed prefix of a registration response (id, public key, key handle length)
pub const REGISTER_RESPONSE_PREFIX_SIZE: usize = 1 + EC_POINT_SIZE + 1;

/// Largest registration response
pub const MAX_REGISTER_RESPONSE_SIZE: usize = REGISTER_RESPONSE_PREFIX_SIZE
    + MAX_KEY_HANDLE_SIZE
    + MAX_ATTESTATION_CERT_SIZE
    + MAX_EC_SIGNATURE_SIZE;

/// Largest request buffer a transport must accept (largest request plus header margin)
pub const MAX_REQUEST_SIZE: usize = AUTHENTICATE_REQUEST_PREFIX_SIZE + MAX_KEY_HANDLE_SIZE + 10;

/// Largest response buffer a transport must provide (largest response plus status word)
pub const MAX_RESPONSE_SIZE: usize = MAX_REGISTER_RESPONSE_SIZE + 2;

/// Version string returned by the version command
pub const VERSION: &str = "U2F_V2";
