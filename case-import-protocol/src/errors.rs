use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unknown opcode: {0}")]
    UnknownOpCode(u8),

    #[error("Unexpected opcode in response: expected {expected:?}, found {found:?}")]
    UnexpectedOpCode {
        expected: crate::OpCode,
        found: crate::OpCode,
    },

    #[error("Incomplete frame")]
    IncompleteFrame,

    #[error("Frame payload of {0} bytes exceeds the frame size limit")]
    FrameTooLarge(usize),

    #[error("Payload decode error: {0}")]
    PayloadError(String),

    #[error("Unknown frame type: {0}")]
    UnknownFrameType(u8),

    #[error("Checksum Mismatch expected: {expected} found: {found}")]
    ChecksumMismatch { expected: u32, found: u32 },

    #[error("IoError: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server returned an error: {0}")]
    Remote(String),
}
