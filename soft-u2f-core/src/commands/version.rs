//! U2F_VERSION command

use crate::{
    consts::VERSION,
    status::{Result, StatusWord},
};

use alloc::vec::Vec;

/// Handle a version request; the payload must be empty
pub fn handle(data: &[u8]) -> Result<Vec<u8>> {
    if !data.is_empty() {
        return Err(StatusWord::WrongLength);
    }

    Ok(VERSION.as_bytes().to_vec())
}
