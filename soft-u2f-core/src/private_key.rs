//! Secret storage for P-256 private keys
//!
//! Credential keys and the attestation key only ever live inside
//! [`PrivateKey`], which zeroes its bytes on drop, never prints them and
//! compares in constant time.

use crate::codec::EcPoint;
use crate::consts::EC_KEY_SIZE;
use crate::status::{Result, StatusWord};

use alloc::vec::Vec;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use soft_u2f_crypto::ecdsa;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// A validated P-256 private scalar
#[derive(Clone)]
pub struct PrivateKey {
    inner: Zeroizing<[u8; EC_KEY_SIZE]>,
}

impl PrivateKey {
    /// Generate a fresh random key
    pub fn generate() -> Result<Self> {
        let (private_key, _) = ecdsa::generate_keypair().map_err(|_| StatusWord::NoMemory)?;
        Ok(Self { inner: private_key })
    }

    /// Create from raw bytes (copies data)
    ///
    /// Anything other than a 32-byte, in-range scalar is `WrongData`.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        if data.len() != EC_KEY_SIZE {
            return Err(StatusWord::WrongData);
        }

        let mut inner = Zeroizing::new([0u8; EC_KEY_SIZE]);
        inner.copy_from_slice(data);
        Self::from_zeroizing(inner)
    }

    pub(crate) fn from_zeroizing(inner: Zeroizing<[u8; EC_KEY_SIZE]>) -> Result<Self> {
        ecdsa::validate_private_key(&inner).map_err(|_| StatusWord::WrongData)?;
        Ok(Self { inner })
    }

    /// Perform an operation with access to the raw scalar
    ///
    /// Prefer this over copying the key out.
    pub fn with_bytes<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[u8; EC_KEY_SIZE]) -> R,
    {
        let result = f(&self.inner);
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
        result
    }

    /// Matching public key
    pub fn public_key(&self) -> Result<EcPoint> {
        let point = self
            .with_bytes(|bytes| ecdsa::public_from_private(bytes))
            .map_err(StatusWord::from)?;
        EcPoint::from_sec1(&point)
    }

    /// ECDSA-SHA256 signature over `data`, DER-encoded
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.with_bytes(|bytes| ecdsa::sign(bytes, data))
            .map_err(StatusWord::from)
    }
}

impl core::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("data", &"<redacted>")
            .finish()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner[..].ct_eq(&other.inner[..]).into()
    }
}

impl Eq for PrivateKey {}

impl Serialize for PrivateKey {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.inner[..])
    }
}

impl<'de> Deserialize<'de> for PrivateKey {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data: Zeroizing<Vec<u8>> = Zeroizing::new(Deserialize::deserialize(deserializer)?);
        PrivateKey::from_slice(&data)
            .map_err(|_| serde::de::Error::custom("invalid P-256 private key"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_random() {
        let a = PrivateKey::generate().unwrap();
        let b = PrivateKey::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_slice() {
        let key = PrivateKey::generate().unwrap();
        let copy = key.with_bytes(|bytes| PrivateKey::from_slice(bytes)).unwrap();
        assert_eq!(key, copy);
        assert_eq!(key.public_key().unwrap(), copy.public_key().unwrap());
    }

    #[test]
    fn test_from_slice_rejects_invalid() {
        assert_eq!(
            PrivateKey::from_slice(&[1u8; 31]).unwrap_err(),
            StatusWord::WrongData
        );
        assert_eq!(
            PrivateKey::from_slice(&[0u8; 32]).unwrap_err(),
            StatusWord::WrongData
        );
        assert_eq!(
            PrivateKey::from_slice(&[0xFF; 32]).unwrap_err(),
            StatusWord::WrongData
        );
    }

    #[test]
    fn test_sign_verifies() {
        let key = PrivateKey::generate().unwrap();
        let signature = key.sign(b"message").unwrap();
        let public_key = key.public_key().unwrap().to_bytes();

        assert!(ecdsa::verify(&public_key, b"message", &signature).is_ok());
        assert!(ecdsa::verify(&public_key, b"other", &signature).is_err());
    }

    #[test]
    fn test_debug() {
        let key = PrivateKey::from_slice(&[0x01; 32]).unwrap();
        let debug_str = format!("{:?}", key);
        assert!(debug_str.contains("PrivateKey"));
        assert!(debug_str.contains("redacted"));
        assert!(!debug_str.contains("1,"));
    }
}
