//! U2F status words
//!
//! ISO 7816-4 status words returned with (or instead of) every response.
//! Values from the FIDO U2F raw message formats, section 3.3:
//! <https://fidoalliance.org/specs/fido-u2f-v1.2-ps-20170411/fido-u2f-raw-message-formats-v1.2-ps-20170411.html#status-codes>

use core::fmt;

use soft_u2f_crypto::CryptoError;

/// U2F status words
///
/// Exactly one status word terminates every operation. Only [`StatusWord::NoError`]
/// is ever accompanied by a response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StatusWord {
    /// The command completed successfully without error
    NoError = 0x9000,

    /// The length of the request was invalid
    WrongLength = 0x6700,

    /// The request was rejected due to an invalid key handle or malformed data
    WrongData = 0x6A80,

    /// The request was rejected because test-of-user-presence is required
    ConditionsNotSatisfied = 0x6985,

    /// The command is not allowed in the current state
    CommandNotAllowed = 0x6986,

    /// The instruction of the request is not supported
    InsNotSupported = 0x6D00,

    /// The class byte of the request is not supported
    ClaNotSupported = 0x6E00,

    /// Vendor status: resource exhaustion (allocation, storage, crypto failure)
    NoMemory = 0xEE04,
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NoError => "No error",
            Self::WrongLength => "Wrong length",
            Self::WrongData => "Wrong data",
            Self::ConditionsNotSatisfied => "Conditions not satisfied",
            Self::CommandNotAllowed => "Command not allowed",
            Self::InsNotSupported => "Instruction not supported",
            Self::ClaNotSupported => "Class not supported",
            Self::NoMemory => "Out of memory",
        };
        write!(f, "{} (0x{:04X})", msg, self.to_u16())
    }
}

/// Implement std::error::Error only when std is available
#[cfg(feature = "std")]
impl std::error::Error for StatusWord {}

impl StatusWord {
    /// Convert status word to its 16-bit value
    pub fn to_u16(self) -> u16 {
        self as u16
    }

    /// Look up a status word by its 16-bit value
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x9000 => Some(Self::NoError),
            0x6700 => Some(Self::WrongLength),
            0x6A80 => Some(Self::WrongData),
            0x6985 => Some(Self::ConditionsNotSatisfied),
            0x6986 => Some(Self::CommandNotAllowed),
            0x6D00 => Some(Self::InsNotSupported),
            0x6E00 => Some(Self::ClaNotSupported),
            0xEE04 => Some(Self::NoMemory),
            _ => None,
        }
    }

    /// Wire form (big-endian)
    pub fn to_be_bytes(self) -> [u8; 2] {
        self.to_u16().to_be_bytes()
    }

    /// Check if this is the success status
    pub fn is_success(self) -> bool {
        self == Self::NoError
    }
}

impl From<StatusWord> for u16 {
    fn from(status: StatusWord) -> u16 {
        status.to_u16()
    }
}

impl From<CryptoError> for StatusWord {
    fn from(err: CryptoError) -> Self {
        match err {
            // A key handle that does not open under this device's key
            CryptoError::UnwrapFailed => Self::WrongData,
            CryptoError::InvalidPublicKey
            | CryptoError::InvalidPrivateKey
            | CryptoError::InvalidSignature
            | CryptoError::KeyGenerationFailed
            | CryptoError::SigningFailed
            | CryptoError::WrapFailed
            | CryptoError::InvalidKeyLength { .. } => Self::NoMemory,
        }
    }
}

/// Result type for U2F operations
pub type Result<T> = core::result::Result<T, StatusWord>;
