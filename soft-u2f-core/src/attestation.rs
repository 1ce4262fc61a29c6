//! Device attestation identity
//!
//! The attestation key signs every registration response and the matching
//! certificate travels with it so the relying party can check who made the
//! device.

use crate::codec::{self, EcPoint};
use crate::consts::MAX_ATTESTATION_CERT_SIZE;
use crate::private_key::PrivateKey;
use crate::status::{Result, StatusWord};

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

/// Source of attestation signatures
pub trait Attestation {
    /// X.509 attestation certificate, DER-encoded
    fn certificate(&self) -> &[u8];

    /// DER ECDSA-SHA256 signature over `data` with the attestation key
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// In-memory attestation key and certificate
///
/// Serializable so a host can persist the device identity alongside its
/// wrapping key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IdentityRecord", into = "IdentityRecord")]
pub struct AttestationIdentity {
    private_key: PrivateKey,
    certificate: Vec<u8>,
}

impl AttestationIdentity {
    /// Create an identity from its key and certificate
    ///
    /// # Arguments
    ///
    /// * `private_key` - Attestation private key
    /// * `certificate` - DER certificate for the key (at most 2048 bytes)
    ///
    /// # Errors
    ///
    /// `WrongData` if the certificate is empty, oversized, or not exactly one
    /// DER-encoded X.509 certificate.
    pub fn new(private_key: PrivateKey, certificate: Vec<u8>) -> Result<Self> {
        if certificate.is_empty() || certificate.len() > MAX_ATTESTATION_CERT_SIZE {
            return Err(StatusWord::WrongData);
        }
        codec::validate_certificate(&certificate)?;

        Ok(Self {
            private_key,
            certificate,
        })
    }

    /// Attestation public key
    pub fn public_key(&self) -> Result<EcPoint> {
        self.private_key.public_key()
    }

    /// Attestation private key
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }
}

impl Attestation for AttestationIdentity {
    fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.private_key.sign(data)
    }
}

/// Serialized form; validated on the way back in
#[derive(Serialize, Deserialize)]
struct IdentityRecord {
    private_key: PrivateKey,
    certificate: Vec<u8>,
}

impl TryFrom<IdentityRecord> for AttestationIdentity {
    type Error = StatusWord;

    fn try_from(record: IdentityRecord) -> Result<Self> {
        Self::new(record.private_key, record.certificate)
    }
}

impl From<AttestationIdentity> for IdentityRecord {
    fn from(identity: AttestationIdentity) -> Self {
        Self {
            private_key: identity.private_key,
            certificate: identity.certificate,
        }
    }
}
