//! Key handle creation and resolution
//!
//! A key handle is the opaque token a relying party stores at registration
//! and presents back at authentication. [`KeyHandleStore`] abstracts how the
//! device turns it back into a private key; [`WrappedKeyHandles`] is the
//! stateless implementation that seals the key inside the handle itself.

use crate::consts::{APPLICATION_ID_SIZE, MAX_KEY_HANDLE_SIZE};
use crate::private_key::PrivateKey;
use crate::status::{Result, StatusWord};

use alloc::vec::Vec;

use rand::{RngCore, rngs::OsRng};
use soft_u2f_crypto::key_wrap::{KeyWrapper, WRAPPED_KEY_LENGTH, WRAPPING_KEY_LENGTH};
use zeroize::Zeroizing;

/// Creation and resolution of key handles
pub trait KeyHandleStore {
    /// Create a key handle for `private_key`, bound to `application`
    ///
    /// The returned handle must not exceed 128 bytes.
    fn create(
        &self,
        application: &[u8; APPLICATION_ID_SIZE],
        private_key: &PrivateKey,
    ) -> Result<Vec<u8>>;

    /// Recover the private key behind `key_handle` for `application`
    ///
    /// Unknown, malformed, tampered and foreign-application handles must all
    /// be reported as `WrongData`, without revealing which case applied.
    fn resolve(
        &self,
        application: &[u8; APPLICATION_ID_SIZE],
        key_handle: &[u8],
    ) -> Result<PrivateKey>;
}

/// Stateless key handles: the private key, encrypted and authenticated under
/// a device wrapping key, bound to the application parameter
pub struct WrappedKeyHandles {
    wrapper: KeyWrapper,
}

impl WrappedKeyHandles {
    /// Length of every handle this store produces
    pub const KEY_HANDLE_LENGTH: usize = WRAPPED_KEY_LENGTH;

    /// Create from a 32-byte device wrapping key
    pub fn new(wrapping_key: &[u8; WRAPPING_KEY_LENGTH]) -> Self {
        Self {
            wrapper: KeyWrapper::new(wrapping_key),
        }
    }

    /// Create with a fresh random wrapping key
    ///
    /// Handles issued by this store cannot be resolved by any other instance.
    pub fn generate() -> Result<Self> {
        let mut wrapping_key = Zeroizing::new([0u8; WRAPPING_KEY_LENGTH]);
        OsRng
            .try_fill_bytes(&mut wrapping_key[..])
            .map_err(|_| StatusWord::NoMemory)?;
        Ok(Self::new(&wrapping_key))
    }
}

impl core::fmt::Debug for WrappedKeyHandles {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WrappedKeyHandles")
            .field("wrapper", &self.wrapper)
            .finish()
    }
}

impl KeyHandleStore for WrappedKeyHandles {
    fn create(
        &self,
        application: &[u8; APPLICATION_ID_SIZE],
        private_key: &PrivateKey,
    ) -> Result<Vec<u8>> {
        let wrapped = private_key
            .with_bytes(|bytes| self.wrapper.wrap(bytes, application))
            .map_err(|_| StatusWord::NoMemory)?;

        debug_assert!(wrapped.len() <= MAX_KEY_HANDLE_SIZE);
        Ok(wrapped.to_vec())
    }

    fn resolve(
        &self,
        application: &[u8; APPLICATION_ID_SIZE],
        key_handle: &[u8],
    ) -> Result<PrivateKey> {
        let secret = self.wrapper.unwrap(key_handle, application).map_err(|_| {
            log::warn!(
                "Rejected key handle ({} bytes) for application {:02x?}",
                key_handle.len(),
                &application[..4]
            );
            StatusWord::WrongData
        })?;

        PrivateKey::from_zeroizing(secret)
    }
}
