//! Response envelope returned to the transport

use crate::status::{Result, StatusWord};

use alloc::vec::Vec;

/// Outcome of one U2F operation: a status word and, on success, a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusWord,
    data: Vec<u8>,
}

impl Response {
    /// Successful response carrying `data`
    pub fn success(data: Vec<u8>) -> Self {
        Self {
            status: StatusWord::NoError,
            data,
        }
    }

    /// Failure response; never carries data
    pub fn error(status: StatusWord) -> Self {
        Self {
            status,
            data: Vec::new(),
        }
    }

    /// Build from an operation result
    pub fn from_result(result: Result<Vec<u8>>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(status) => Self::error(status),
        }
    }

    /// Status word
    pub fn status(&self) -> StatusWord {
        self.status
    }

    /// Response payload (empty on failure)
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Check if the operation succeeded
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Wire form: payload followed by the big-endian status word
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() + 2);
        out.extend_from_slice(&self.data);
        out.extend_from_slice(&self.status.to_be_bytes());
        out
    }

    /// Split into status word and payload
    pub fn into_parts(self) -> (StatusWord, Vec<u8>) {
        (self.status, self.data)
    }
}

impl From<Result<Vec<u8>>> for Response {
    fn from(result: Result<Vec<u8>>) -> Self {
        Self::from_result(result)
    }
}
