//! Error types for cryptographic operations

#[cfg(feature = "std")]
use thiserror::Error;

#[cfg(not(feature = "std"))]
use core::fmt;

/// Cryptographic operation errors
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Invalid public key provided
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key provided
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Invalid signature format
    #[error("Invalid signature")]
    InvalidSignature,

    /// Key pair generation failed
    #[error("Key generation failed")]
    KeyGenerationFailed,

    /// Signing failed
    #[error("Signing failed")]
    SigningFailed,

    /// Wrapped key failed its integrity check or could not be decrypted
    #[error("Unwrap failed")]
    UnwrapFailed,

    /// Key wrapping failed
    #[error("Wrap failed")]
    WrapFailed,

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
}

/// Cryptographic operation errors (no_std version)
#[cfg(not(feature = "std"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid public key provided
    InvalidPublicKey,

    /// Invalid private key provided
    InvalidPrivateKey,

    /// Invalid signature format
    InvalidSignature,

    /// Key pair generation failed
    KeyGenerationFailed,

    /// Signing failed
    SigningFailed,

    /// Wrapped key failed its integrity check or could not be decrypted
    UnwrapFailed,

    /// Key wrapping failed
    WrapFailed,

    /// Invalid key length
    InvalidKeyLength { expected: usize, actual: usize },
}

// Manual Display implementation for no_std
#[cfg(not(feature = "std"))]
impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPublicKey => write!(f, "Invalid public key"),
            Self::InvalidPrivateKey => write!(f, "Invalid private key"),
            Self::InvalidSignature => write!(f, "Invalid signature"),
            Self::KeyGenerationFailed => write!(f, "Key generation failed"),
            Self::SigningFailed => write!(f, "Signing failed"),
            Self::UnwrapFailed => write!(f, "Unwrap failed"),
            Self::WrapFailed => write!(f, "Wrap failed"),
            Self::InvalidKeyLength { expected, actual } => {
                write!(
                    f,
                    "Invalid key length: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

/// Result type alias for cryptographic operations
pub type Result<T> = core::result::Result<T, CryptoError>;
