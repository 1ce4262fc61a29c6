//! P-256 ECDSA for U2F registration and authentication signatures
//!
//! U2F fixes the algorithm to ECDSA over NIST P-256 with SHA-256. Public keys
//! travel as 65-byte uncompressed SEC1 points and signatures as ASN.1 DER.
//!
//! - Curve: P-256 (secp256r1 / prime256v1)
//! - Hash: SHA-256 (applied internally by the signer)
//! - Signature format: DER `SEQUENCE { r INTEGER, s INTEGER }`, at most 72 bytes

use alloc::vec::Vec;

use crate::error::{CryptoError, Result};

use p256::ecdsa::{Signature, SigningKey, VerifyingKey, signature::Signer, signature::Verifier};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Length of a P-256 private scalar
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Length of an uncompressed SEC1 P-256 point (0x04 || x || y)
pub const PUBLIC_KEY_LENGTH: usize = 65;

/// Generate new random P-256 key pair
///
/// Returns (private_key, public_key) where:
/// - private_key: 32-byte scalar, zeroed on drop
/// - public_key: 65-byte uncompressed SEC1 format (0x04 || x || y)
///
/// # Examples
///
/// ```
/// use soft_u2f_crypto::ecdsa;
///
/// let (private_key, public_key) = ecdsa::generate_keypair().unwrap();
/// assert_eq!(private_key.len(), 32);
/// assert_eq!(public_key.len(), 65);
/// assert_eq!(public_key[0], 0x04);
/// ```
pub fn generate_keypair() -> Result<(Zeroizing<[u8; PRIVATE_KEY_LENGTH]>, [u8; PUBLIC_KEY_LENGTH])>
{
    let signing_key = SigningKey::random(&mut OsRng);

    let private_key = Zeroizing::new(<[u8; PRIVATE_KEY_LENGTH]>::from(signing_key.to_bytes()));
    let public_key = encode_point(signing_key.verifying_key())
        .map_err(|_| CryptoError::KeyGenerationFailed)?;

    Ok((private_key, public_key))
}

/// Sign data with P-256 + SHA-256
///
/// The data is hashed with SHA-256 internally by the signing operation.
/// Returns the DER-encoded signature (70-72 bytes in practice).
///
/// # Examples
///
/// ```
/// use soft_u2f_crypto::ecdsa;
///
/// let (private_key, _) = ecdsa::generate_keypair().unwrap();
/// let signature = ecdsa::sign(&private_key, b"Hello, U2F!").unwrap();
/// assert!(signature.len() <= 72);
/// assert_eq!(signature[0], 0x30);
/// ```
pub fn sign(private_key: &[u8; PRIVATE_KEY_LENGTH], data: &[u8]) -> Result<Vec<u8>> {
    let signing_key =
        SigningKey::from_bytes(private_key.into()).map_err(|_| CryptoError::InvalidPrivateKey)?;

    let signature: Signature = signing_key
        .try_sign(data)
        .map_err(|_| CryptoError::SigningFailed)?;

    Ok(signature.to_der().as_bytes().to_vec())
}

/// Verify a DER-encoded P-256 signature
///
/// # Arguments
///
/// * `public_key` - 65-byte uncompressed SEC1 format (0x04 || x || y)
/// * `data` - Data that was signed
/// * `signature` - DER-encoded signature
///
/// # Examples
///
/// ```
/// use soft_u2f_crypto::ecdsa;
///
/// let (private_key, public_key) = ecdsa::generate_keypair().unwrap();
/// let signature = ecdsa::sign(&private_key, b"message").unwrap();
///
/// assert!(ecdsa::verify(&public_key, b"message", &signature).is_ok());
/// assert!(ecdsa::verify(&public_key, b"other", &signature).is_err());
/// ```
pub fn verify(public_key: &[u8], data: &[u8], signature: &[u8]) -> Result<()> {
    let verifying_key =
        VerifyingKey::from_sec1_bytes(public_key).map_err(|_| CryptoError::InvalidPublicKey)?;

    let sig = Signature::from_der(signature).map_err(|_| CryptoError::InvalidSignature)?;

    verifying_key
        .verify(data, &sig)
        .map_err(|_| CryptoError::InvalidSignature)
}

/// Check that bytes are exactly one strict-DER P-256 signature
///
/// Non-minimal lengths, trailing bytes and zero or out-of-range `r`/`s`
/// are all `InvalidSignature`.
pub fn validate_signature(signature: &[u8]) -> Result<()> {
    Signature::from_der(signature)
        .map(|_| ())
        .map_err(|_| CryptoError::InvalidSignature)
}

/// Derive the uncompressed public point for a private scalar
///
/// # Examples
///
/// ```
/// use soft_u2f_crypto::ecdsa;
///
/// let (private_key, expected_public) = ecdsa::generate_keypair().unwrap();
/// let derived_public = ecdsa::public_from_private(&private_key).unwrap();
/// assert_eq!(derived_public, expected_public);
/// ```
pub fn public_from_private(
    private_key: &[u8; PRIVATE_KEY_LENGTH],
) -> Result<[u8; PUBLIC_KEY_LENGTH]> {
    let signing_key =
        SigningKey::from_bytes(private_key.into()).map_err(|_| CryptoError::InvalidPrivateKey)?;

    encode_point(signing_key.verifying_key())
}

/// Check that 32 bytes form a usable P-256 scalar (non-zero, below the order)
pub fn validate_private_key(private_key: &[u8; PRIVATE_KEY_LENGTH]) -> Result<()> {
    SigningKey::from_bytes(private_key.into())
        .map(|_| ())
        .map_err(|_| CryptoError::InvalidPrivateKey)
}

fn encode_point(verifying_key: &VerifyingKey) -> Result<[u8; PUBLIC_KEY_LENGTH]> {
    let point = verifying_key.to_encoded_point(false);
    point
        .as_bytes()
        .try_into()
        .map_err(|_| CryptoError::InvalidPublicKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let (private_key, public_key) = generate_keypair().unwrap();

        assert_eq!(private_key.len(), 32);
        assert_eq!(public_key.len(), 65);
        assert_eq!(public_key[0], 0x04); // Uncompressed point marker

        assert_ne!(*private_key, [0u8; 32]);
    }

    #[test]
    fn test_keypairs_are_distinct() {
        let (first, _) = generate_keypair().unwrap();
        let (second, _) = generate_keypair().unwrap();
        assert_ne!(*first, *second);
    }

    #[test]
    fn test_sign_and_verify() {
        let (private_key, public_key) = generate_keypair().unwrap();
        let message = b"Hello, U2F!";

        let signature = sign(&private_key, message).unwrap();

        // DER SEQUENCE of two INTEGERs, never above the U2F ceiling
        assert_eq!(signature[0], 0x30);
        assert!(signature.len() >= 8 && signature.len() <= 72);
        assert_eq!(signature[1] as usize, signature.len() - 2);

        assert!(verify(&public_key, message, &signature).is_ok());
    }

    #[test]
    fn test_verify_wrong_message() {
        let (private_key, public_key) = generate_keypair().unwrap();

        let signature = sign(&private_key, b"Hello, U2F!").unwrap();

        assert_eq!(
            verify(&public_key, b"Wrong message", &signature),
            Err(CryptoError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_wrong_public_key() {
        let (private_key, _) = generate_keypair().unwrap();
        let (_, wrong_public_key) = generate_keypair().unwrap();
        let message = b"Hello, U2F!";

        let signature = sign(&private_key, message).unwrap();

        assert!(verify(&wrong_public_key, message, &signature).is_err());
    }

    #[test]
    fn test_verify_invalid_signature() {
        let (_, public_key) = generate_keypair().unwrap();
        let bad_signature = vec![0u8; 72];

        assert_eq!(
            verify(&public_key, b"Hello, U2F!", &bad_signature),
            Err(CryptoError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_invalid_public_key() {
        let (private_key, mut public_key) = generate_keypair().unwrap();
        let signature = sign(&private_key, b"data").unwrap();

        public_key[0] = 0x05;
        assert_eq!(
            verify(&public_key, b"data", &signature),
            Err(CryptoError::InvalidPublicKey)
        );
    }

    #[test]
    fn test_validate_signature() {
        let (private_key, _) = generate_keypair().unwrap();
        let signature = sign(&private_key, b"message").unwrap();
        assert!(validate_signature(&signature).is_ok());

        // r = 1, s = 1 with a long-form length where the short form fits
        let non_minimal = [0x30, 0x81, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01];
        assert_eq!(
            validate_signature(&non_minimal),
            Err(CryptoError::InvalidSignature)
        );
        assert!(validate_signature(&[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01]).is_ok());

        let mut trailing = signature.clone();
        trailing.push(0x00);
        assert_eq!(validate_signature(&trailing), Err(CryptoError::InvalidSignature));

        assert_eq!(
            validate_signature(&[0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x01]),
            Err(CryptoError::InvalidSignature)
        );
        assert_eq!(validate_signature(&[]), Err(CryptoError::InvalidSignature));
    }

    #[test]
    fn test_deterministic_public_key() {
        let private_key = [42u8; 32];

        let pub1 = public_from_private(&private_key).unwrap();
        let pub2 = public_from_private(&private_key).unwrap();

        assert_eq!(pub1, pub2);
    }

    #[test]
    fn test_invalid_private_key() {
        // All zeros is not a valid scalar
        let invalid_key = [0u8; 32];
        assert_eq!(sign(&invalid_key, b"test"), Err(CryptoError::InvalidPrivateKey));
        assert!(public_from_private(&invalid_key).is_err());
        assert!(validate_private_key(&invalid_key).is_err());

        // Above the curve order
        assert!(validate_private_key(&[0xFF; 32]).is_err());
        assert!(validate_private_key(&[42u8; 32]).is_ok());
    }
}
