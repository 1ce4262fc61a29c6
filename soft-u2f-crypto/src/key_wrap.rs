//! Sealing per-registration private keys into key handles
//!
//! A U2F token may wrap the generated private key together with the
//! application parameter it was created for and hand the result out as the
//! key handle. The device then needs no per-registration storage: it
//! recovers the key from the handle on every authentication.
//!
//! Layout of a wrapped key (65 bytes):
//!
//! ```text
//! version (1) || IV (16) || AES-256-CBC(private key) (32) || tag (16)
//! ```
//!
//! The tag is the first 16 bytes of HMAC-SHA-256 over
//! `version || IV || ciphertext || binding`, where `binding` is the
//! application parameter. The binding is authenticated but never stored, so a
//! handle presented for another application fails the same tag check as a
//! forged or corrupted one.
//!
//! Encryption and MAC keys are independent HKDF-SHA-256 expansions of one
//! 32-byte device wrapping key.

use crate::error::{CryptoError, Result};

use aes::Aes256;
use cbc::{
    Decryptor, Encryptor,
    cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::NoPadding},
};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;
type Aes256CbcEnc = Encryptor<Aes256>;
type Aes256CbcDec = Decryptor<Aes256>;

/// Length of the device wrapping key
pub const WRAPPING_KEY_LENGTH: usize = 32;

/// Format version of wrapped keys produced by this module
pub const WRAPPED_KEY_VERSION: u8 = 0x01;

const IV_LENGTH: usize = 16;
const SECRET_LENGTH: usize = 32;
const TAG_LENGTH: usize = 16;

const CIPHERTEXT_OFFSET: usize = 1 + IV_LENGTH;
const TAG_OFFSET: usize = CIPHERTEXT_OFFSET + SECRET_LENGTH;

/// Total length of a wrapped key
pub const WRAPPED_KEY_LENGTH: usize = TAG_OFFSET + TAG_LENGTH;

const HKDF_SALT: [u8; 32] = [0u8; 32];
const ENCRYPTION_INFO: &[u8] = b"soft-u2f key handle encryption";
const MAC_INFO: &[u8] = b"soft-u2f key handle authentication";

/// Wraps and unwraps 32-byte secrets under a device wrapping key
pub struct KeyWrapper {
    encryption_key: Zeroizing<[u8; 32]>,
    mac_key: Zeroizing<[u8; 32]>,
}

impl KeyWrapper {
    /// Derive the encryption and MAC subkeys from the device wrapping key
    ///
    /// # Examples
    ///
    /// ```
    /// use soft_u2f_crypto::key_wrap::KeyWrapper;
    ///
    /// let wrapper = KeyWrapper::new(&[0x42u8; 32]);
    /// let binding = [0x11u8; 32];
    ///
    /// let wrapped = wrapper.wrap(&[0x07u8; 32], &binding).unwrap();
    /// let secret = wrapper.unwrap(&wrapped, &binding).unwrap();
    /// assert_eq!(*secret, [0x07u8; 32]);
    /// ```
    pub fn new(wrapping_key: &[u8; WRAPPING_KEY_LENGTH]) -> Self {
        let hkdf = Hkdf::<Sha256>::new(Some(&HKDF_SALT), wrapping_key);

        let mut encryption_key = Zeroizing::new([0u8; 32]);
        hkdf.expand(ENCRYPTION_INFO, &mut encryption_key[..])
            .expect("32 bytes is valid length for HKDF-SHA-256");

        let mut mac_key = Zeroizing::new([0u8; 32]);
        hkdf.expand(MAC_INFO, &mut mac_key[..])
            .expect("32 bytes is valid length for HKDF-SHA-256");

        Self {
            encryption_key,
            mac_key,
        }
    }

    /// Seal `secret` and bind it to `binding`
    ///
    /// A fresh random IV is drawn for every call, so wrapping the same
    /// secret twice yields different handles.
    pub fn wrap(
        &self,
        secret: &[u8; SECRET_LENGTH],
        binding: &[u8],
    ) -> Result<[u8; WRAPPED_KEY_LENGTH]> {
        let mut wrapped = [0u8; WRAPPED_KEY_LENGTH];
        wrapped[0] = WRAPPED_KEY_VERSION;

        let mut iv = [0u8; IV_LENGTH];
        OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|_| CryptoError::WrapFailed)?;
        wrapped[1..CIPHERTEXT_OFFSET].copy_from_slice(&iv);

        let ciphertext = &mut wrapped[CIPHERTEXT_OFFSET..TAG_OFFSET];
        ciphertext.copy_from_slice(secret);
        let key: &[u8; 32] = &self.encryption_key;
        Aes256CbcEnc::new(key.into(), &iv.into())
            .encrypt_padded_mut::<NoPadding>(ciphertext, SECRET_LENGTH)
            .map_err(|_| CryptoError::WrapFailed)?;

        let tag = self.tag(&wrapped[..TAG_OFFSET], binding)?;
        wrapped[TAG_OFFSET..].copy_from_slice(&tag);

        Ok(wrapped)
    }

    /// Recover the secret sealed in `wrapped` for `binding`
    ///
    /// Every failure (wrong length, unknown version, foreign binding,
    /// tampering) is reported as [`CryptoError::UnwrapFailed`]. The input is
    /// copied into a fixed-size buffer first, so the tag is computed and
    /// compared in constant time whatever the handle length. Nothing is
    /// decrypted until all checks pass.
    pub fn unwrap(&self, wrapped: &[u8], binding: &[u8]) -> Result<Zeroizing<[u8; SECRET_LENGTH]>> {
        let mut buffer = Zeroizing::new([0u8; WRAPPED_KEY_LENGTH]);
        let copied = wrapped.len().min(WRAPPED_KEY_LENGTH);
        buffer[..copied].copy_from_slice(&wrapped[..copied]);

        let expected = self.tag(&buffer[..TAG_OFFSET], binding)?;
        let length_valid = (wrapped.len() as u64).ct_eq(&(WRAPPED_KEY_LENGTH as u64));
        let tag_valid = expected[..].ct_eq(&buffer[TAG_OFFSET..]);
        let version_valid = buffer[0].ct_eq(&WRAPPED_KEY_VERSION);
        if !bool::from(length_valid & tag_valid & version_valid) {
            return Err(CryptoError::UnwrapFailed);
        }

        let mut iv = [0u8; IV_LENGTH];
        iv.copy_from_slice(&buffer[1..CIPHERTEXT_OFFSET]);

        let mut secret = Zeroizing::new([0u8; SECRET_LENGTH]);
        secret.copy_from_slice(&buffer[CIPHERTEXT_OFFSET..TAG_OFFSET]);
        let key: &[u8; 32] = &self.encryption_key;
        Aes256CbcDec::new(key.into(), &iv.into())
            .decrypt_padded_mut::<NoPadding>(&mut secret[..])
            .map_err(|_| CryptoError::UnwrapFailed)?;

        Ok(secret)
    }

    fn tag(&self, header_and_ciphertext: &[u8], binding: &[u8]) -> Result<[u8; TAG_LENGTH]> {
        let mut mac = HmacSha256::new_from_slice(&self.mac_key[..]).map_err(|_| {
            CryptoError::InvalidKeyLength {
                expected: 32,
                actual: self.mac_key.len(),
            }
        })?;
        mac.update(header_and_ciphertext);
        mac.update(binding);

        let mut tag = [0u8; TAG_LENGTH];
        tag.copy_from_slice(&mac.finalize().into_bytes()[..TAG_LENGTH]);
        Ok(tag)
    }
}

impl core::fmt::Debug for KeyWrapper {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyWrapper")
            .field("keys", &"<redacted>")
            .finish()
    }
}
