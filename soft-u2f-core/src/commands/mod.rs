//! U2F command handlers
//!
//! This module contains the implementations of the U2F raw message commands.
//!
//! See the FIDO U2F raw message formats, section 4 and following:
//! <https://fidoalliance.org/specs/fido-u2f-v1.2-ps-20170411/fido-u2f-raw-message-formats-v1.2-ps-20170411.html>

pub mod authenticate;
pub mod register;
pub mod version;

pub use authenticate::AuthenticateMode;
pub use register::RegisterMode;

/// First instruction byte of the vendor-specific range
const VENDOR_FIRST: u8 = 0xC0;

/// U2F command codes (APDU instruction byte)
///
/// Exposed for transports; routing is left to them. `CheckRegister` and
/// `AuthenticateBatch` are reserved codes without defined behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandCode {
    Register,
    Authenticate,
    Version,
    CheckRegister,
    AuthenticateBatch,
    /// Vendor-specific instruction (0xC0-0xFF)
    Vendor(u8),
}

impl CommandCode {
    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Register),
            0x02 => Some(Self::Authenticate),
            0x03 => Some(Self::Version),
            0x04 => Some(Self::CheckRegister),
            0x05 => Some(Self::AuthenticateBatch),
            VENDOR_FIRST..=0xFF => Some(Self::Vendor(value)),
            _ => None,
        }
    }

    /// Convert to u8
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Register => 0x01,
            Self::Authenticate => 0x02,
            Self::Version => 0x03,
            Self::CheckRegister => 0x04,
            Self::AuthenticateBatch => 0x05,
            Self::Vendor(value) => value,
        }
    }

    /// Check if this is a vendor-specific instruction
    pub fn is_vendor(self) -> bool {
        matches!(self, Self::Vendor(_))
    }
}
