//! U2F raw message codec
//!
//! Explicit, offset-based encoders and decoders for the registration and
//! authentication messages. Nothing here relies on in-memory struct layout;
//! every field is read and written at its wire offset.
//!
//! FIDO U2F raw message formats: <https://fidoalliance.org/specs/fido-u2f-v1.2-ps-20170411/fido-u2f-raw-message-formats-v1.2-ps-20170411.html>

use crate::consts::{
    APPLICATION_ID_SIZE, AUTHENTICATE_REQUEST_PREFIX_SIZE, AUTHENTICATE_RESPONSE_PREFIX_SIZE,
    CHALLENGE_SIZE, EC_KEY_SIZE, EC_POINT_SIZE, MAX_ATTESTATION_CERT_SIZE, MAX_EC_SIGNATURE_SIZE,
    MAX_KEY_HANDLE_SIZE, POINT_UNCOMPRESSED, REGISTER_HASH_ID, REGISTER_ID,
    REGISTER_REQUEST_SIZE, REGISTER_RESPONSE_PREFIX_SIZE,
};
use crate::status::{Result, StatusWord};

use alloc::vec::Vec;

use der::{Decode, Header, Reader, SliceReader, Tag};
use sha2::{Digest, Sha256};
use soft_u2f_crypto::ecdsa;

/// Size of the authentication signature base
pub const AUTHENTICATION_SIGNATURE_BASE_SIZE: usize =
    APPLICATION_ID_SIZE + 1 + 4 + CHALLENGE_SIZE;

/// Uncompressed P-256 point: `0x04 || x || y`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcPoint {
    x: [u8; EC_KEY_SIZE],
    y: [u8; EC_KEY_SIZE],
}

impl EcPoint {
    /// Build a point from its big-endian coordinates
    pub fn from_coordinates(x: [u8; EC_KEY_SIZE], y: [u8; EC_KEY_SIZE]) -> Self {
        Self { x, y }
    }

    /// Parse a 65-byte uncompressed SEC1 point
    pub fn from_sec1(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != EC_POINT_SIZE || bytes[0] != POINT_UNCOMPRESSED {
            return Err(StatusWord::WrongData);
        }

        let mut x = [0u8; EC_KEY_SIZE];
        let mut y = [0u8; EC_KEY_SIZE];
        x.copy_from_slice(&bytes[1..1 + EC_KEY_SIZE]);
        y.copy_from_slice(&bytes[1 + EC_KEY_SIZE..]);

        Ok(Self { x, y })
    }

    /// X coordinate
    pub fn x(&self) -> &[u8; EC_KEY_SIZE] {
        &self.x
    }

    /// Y coordinate
    pub fn y(&self) -> &[u8; EC_KEY_SIZE] {
        &self.y
    }

    /// Wire form
    pub fn to_bytes(&self) -> [u8; EC_POINT_SIZE] {
        let mut out = [0u8; EC_POINT_SIZE];
        out[0] = POINT_UNCOMPRESSED;
        out[1..1 + EC_KEY_SIZE].copy_from_slice(&self.x);
        out[1 + EC_KEY_SIZE..].copy_from_slice(&self.y);
        out
    }
}

/// Registration request message
///
/// Layout: `challenge (32) || application (32)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Challenge parameter (SHA-256 of the client data)
    pub challenge: [u8; CHALLENGE_SIZE],
    /// Application parameter (SHA-256 of the application identity)
    pub application: [u8; APPLICATION_ID_SIZE],
}

impl RegistrationRequest {
    /// Decode a registration request; the input must be exactly 64 bytes
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != REGISTER_REQUEST_SIZE {
            return Err(StatusWord::WrongLength);
        }

        let mut challenge = [0u8; CHALLENGE_SIZE];
        let mut application = [0u8; APPLICATION_ID_SIZE];
        challenge.copy_from_slice(&data[..CHALLENGE_SIZE]);
        application.copy_from_slice(&data[CHALLENGE_SIZE..]);

        Ok(Self {
            challenge,
            application,
        })
    }

    /// Encode to the 64-byte wire form
    pub fn encode(&self) -> [u8; REGISTER_REQUEST_SIZE] {
        let mut out = [0u8; REGISTER_REQUEST_SIZE];
        out[..CHALLENGE_SIZE].copy_from_slice(&self.challenge);
        out[CHALLENGE_SIZE..].copy_from_slice(&self.application);
        out
    }
}

/// Authentication request message
///
/// Layout: `challenge (32) || application (32) || key handle length (1) || key handle`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationRequest {
    /// Challenge parameter
    pub challenge: [u8; CHALLENGE_SIZE],
    /// Application parameter
    pub application: [u8; APPLICATION_ID_SIZE],
    /// Key handle returned at registration (at most 128 bytes)
    pub key_handle: Vec<u8>,
}

impl AuthenticationRequest {
    /// Decode an authentication request
    ///
    /// - shorter than the 65-byte prefix: `WrongLength`
    /// - declared key handle length above 128: `WrongData`
    /// - declared extent differs from the buffer (truncated or trailing bytes): `WrongLength`
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < AUTHENTICATE_REQUEST_PREFIX_SIZE {
            return Err(StatusWord::WrongLength);
        }

        let key_handle_len = data[AUTHENTICATE_REQUEST_PREFIX_SIZE - 1] as usize;
        if key_handle_len > MAX_KEY_HANDLE_SIZE {
            return Err(StatusWord::WrongData);
        }
        if data.len() != AUTHENTICATE_REQUEST_PREFIX_SIZE + key_handle_len {
            return Err(StatusWord::WrongLength);
        }

        let mut challenge = [0u8; CHALLENGE_SIZE];
        let mut application = [0u8; APPLICATION_ID_SIZE];
        challenge.copy_from_slice(&data[..CHALLENGE_SIZE]);
        application.copy_from_slice(&data[CHALLENGE_SIZE..CHALLENGE_SIZE + APPLICATION_ID_SIZE]);

        Ok(Self {
            challenge,
            application,
            key_handle: data[AUTHENTICATE_REQUEST_PREFIX_SIZE..].to_vec(),
        })
    }

    /// Encode to wire form; key handles above 128 bytes are `WrongData`
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.key_handle.len() > MAX_KEY_HANDLE_SIZE {
            return Err(StatusWord::WrongData);
        }

        let mut out = Vec::with_capacity(AUTHENTICATE_REQUEST_PREFIX_SIZE + self.key_handle.len());
        out.extend_from_slice(&self.challenge);
        out.extend_from_slice(&self.application);
        out.push(self.key_handle.len() as u8);
        out.extend_from_slice(&self.key_handle);
        Ok(out)
    }
}

/// Registration response message
///
/// Layout: `0x05 || public key (65) || key handle length (1) || key handle ||
/// attestation certificate || signature`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationResponse {
    /// Newly generated user public key
    pub public_key: EcPoint,
    /// Key handle for the new key pair
    pub key_handle: Vec<u8>,
    /// Attestation certificate, X.509 DER
    pub attestation_certificate: Vec<u8>,
    /// DER ECDSA signature over the registration signature base
    pub signature: Vec<u8>,
}

impl RegistrationResponse {
    /// Encode to wire form
    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_registration_response(
            &self.public_key,
            &self.key_handle,
            &self.attestation_certificate,
            &self.signature,
        )
    }

    /// Decode a registration response
    ///
    /// The certificate/signature boundary is found from the certificate's own
    /// DER header. The certificate must parse as X.509 and the remaining bytes
    /// must be exactly one DER ECDSA signature.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < REGISTER_RESPONSE_PREFIX_SIZE {
            return Err(StatusWord::WrongLength);
        }
        if data[0] != REGISTER_ID {
            return Err(StatusWord::WrongData);
        }

        let public_key = EcPoint::from_sec1(&data[1..1 + EC_POINT_SIZE])?;

        let key_handle_len = data[REGISTER_RESPONSE_PREFIX_SIZE - 1] as usize;
        if key_handle_len > MAX_KEY_HANDLE_SIZE {
            return Err(StatusWord::WrongData);
        }
        let cert_start = REGISTER_RESPONSE_PREFIX_SIZE + key_handle_len;
        if data.len() < cert_start {
            return Err(StatusWord::WrongLength);
        }
        let key_handle = data[REGISTER_RESPONSE_PREFIX_SIZE..cert_start].to_vec();

        let rest = &data[cert_start..];
        let cert_len = sequence_length(rest)?;
        if cert_len > MAX_ATTESTATION_CERT_SIZE {
            return Err(StatusWord::WrongData);
        }
        if cert_len >= rest.len() {
            return Err(StatusWord::WrongLength);
        }

        let (certificate, signature) = rest.split_at(cert_len);
        validate_certificate(certificate)?;
        validate_signature(signature)?;

        Ok(Self {
            public_key,
            key_handle,
            attestation_certificate: certificate.to_vec(),
            signature: signature.to_vec(),
        })
    }
}

/// Authentication response message
///
/// Layout: `flags (1) || counter (4, big-endian) || signature`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResponse {
    /// User presence flags (bit 0: test of user presence)
    pub flags: u8,
    /// Usage counter
    pub counter: u32,
    /// DER ECDSA signature over the authentication signature base
    pub signature: Vec<u8>,
}

impl AuthenticationResponse {
    /// Encode to wire form
    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_authentication_response(self.flags, self.counter, &self.signature)
    }

    /// Decode an authentication response
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() <= AUTHENTICATE_RESPONSE_PREFIX_SIZE {
            return Err(StatusWord::WrongLength);
        }

        let signature = &data[AUTHENTICATE_RESPONSE_PREFIX_SIZE..];
        validate_signature(signature)?;

        Ok(Self {
            flags: data[0],
            counter: u32::from_be_bytes([data[1], data[2], data[3], data[4]]),
            signature: signature.to_vec(),
        })
    }
}

/// Decode a registration request (exactly 64 bytes)
pub fn decode_registration_request(data: &[u8]) -> Result<RegistrationRequest> {
    RegistrationRequest::decode(data)
}

/// Decode an authentication request
pub fn decode_authentication_request(data: &[u8]) -> Result<AuthenticationRequest> {
    AuthenticationRequest::decode(data)
}

/// Encode a registration response
///
/// Oversized blocks are rejected with `WrongData`, never truncated. An empty
/// signature is rejected the same way.
pub fn encode_registration_response(
    public_key: &EcPoint,
    key_handle: &[u8],
    certificate: &[u8],
    signature: &[u8],
) -> Result<Vec<u8>> {
    if key_handle.len() > MAX_KEY_HANDLE_SIZE
        || certificate.len() > MAX_ATTESTATION_CERT_SIZE
        || signature.len() > MAX_EC_SIGNATURE_SIZE
        || signature.is_empty()
    {
        return Err(StatusWord::WrongData);
    }

    let mut out = Vec::with_capacity(
        REGISTER_RESPONSE_PREFIX_SIZE + key_handle.len() + certificate.len() + signature.len(),
    );
    out.push(REGISTER_ID);
    out.extend_from_slice(&public_key.to_bytes());
    out.push(key_handle.len() as u8);
    out.extend_from_slice(key_handle);
    out.extend_from_slice(certificate);
    out.extend_from_slice(signature);
    Ok(out)
}

/// Encode an authentication response
pub fn encode_authentication_response(flags: u8, counter: u32, signature: &[u8]) -> Result<Vec<u8>> {
    if signature.is_empty() || signature.len() > MAX_EC_SIGNATURE_SIZE {
        return Err(StatusWord::WrongData);
    }

    let mut out = Vec::with_capacity(AUTHENTICATE_RESPONSE_PREFIX_SIZE + signature.len());
    out.push(flags);
    out.extend_from_slice(&counter.to_be_bytes());
    out.extend_from_slice(signature);
    Ok(out)
}

/// Bytes signed by the attestation key at registration
///
/// `0x00 || application (32) || challenge (32) || key handle || public key (65)`.
/// The key handle length byte is not part of the signed data.
pub fn registration_signature_base(
    application: &[u8; APPLICATION_ID_SIZE],
    challenge: &[u8; CHALLENGE_SIZE],
    key_handle: &[u8],
    public_key: &EcPoint,
) -> Vec<u8> {
    let mut base = Vec::with_capacity(
        1 + APPLICATION_ID_SIZE + CHALLENGE_SIZE + key_handle.len() + EC_POINT_SIZE,
    );
    base.push(REGISTER_HASH_ID);
    base.extend_from_slice(application);
    base.extend_from_slice(challenge);
    base.extend_from_slice(key_handle);
    base.extend_from_slice(&public_key.to_bytes());
    base
}

/// Bytes signed by the credential key at authentication
///
/// `application (32) || flags (1) || counter (4, big-endian) || challenge (32)`
pub fn authentication_signature_base(
    application: &[u8; APPLICATION_ID_SIZE],
    flags: u8,
    counter: u32,
    challenge: &[u8; CHALLENGE_SIZE],
) -> [u8; AUTHENTICATION_SIGNATURE_BASE_SIZE] {
    let mut base = [0u8; AUTHENTICATION_SIGNATURE_BASE_SIZE];
    base[..APPLICATION_ID_SIZE].copy_from_slice(application);
    base[APPLICATION_ID_SIZE] = flags;
    base[APPLICATION_ID_SIZE + 1..APPLICATION_ID_SIZE + 5].copy_from_slice(&counter.to_be_bytes());
    base[APPLICATION_ID_SIZE + 5..].copy_from_slice(challenge);
    base
}

/// Application parameter for an application identity (SHA-256 of the app id string)
pub fn application_parameter(app_id: &str) -> [u8; APPLICATION_ID_SIZE] {
    Sha256::digest(app_id.as_bytes()).into()
}

/// Challenge parameter for the client data (SHA-256 of the client data bytes)
pub fn challenge_parameter(client_data: &[u8]) -> [u8; CHALLENGE_SIZE] {
    Sha256::digest(client_data).into()
}

/// Check that `certificate` is exactly one DER-encoded X.509 certificate
///
/// Without `std` only the outer SEQUENCE framing is checked.
pub fn validate_certificate(certificate: &[u8]) -> Result<()> {
    if sequence_length(certificate)? != certificate.len() {
        return Err(StatusWord::WrongData);
    }

    #[cfg(feature = "std")]
    {
        use x509_parser::{certificate::X509Certificate, prelude::FromDer};

        let (rest, _) = X509Certificate::from_der(certificate).map_err(|e| {
            log::debug!("Attestation certificate is not X.509: {}", e);
            StatusWord::WrongData
        })?;
        if !rest.is_empty() {
            return Err(StatusWord::WrongData);
        }
    }

    Ok(())
}

/// Check that `signature` is one DER ECDSA signature within the U2F size limit
pub fn validate_signature(signature: &[u8]) -> Result<()> {
    if signature.len() > MAX_EC_SIGNATURE_SIZE {
        return Err(StatusWord::WrongData);
    }
    ecdsa::validate_signature(signature).map_err(|_| StatusWord::WrongData)
}

/// Encoded length (header + content) of the DER SEQUENCE starting `data`
///
/// Only the header is read, so `data` may be shorter than the element or
/// continue past it. Non-minimal length encodings are rejected.
fn sequence_length(data: &[u8]) -> Result<usize> {
    let mut reader = SliceReader::new(data).map_err(|_| StatusWord::WrongData)?;
    let header = Header::decode(&mut reader).map_err(|_| StatusWord::WrongData)?;
    if header.tag != Tag::Sequence {
        return Err(StatusWord::WrongData);
    }

    let total = (reader.position() + header.length).map_err(|_| StatusWord::WrongData)?;
    usize::try_from(total).map_err(|_| StatusWord::WrongData)
}
