/*
[ version        : u8  ]
[ frame_type     : u8  ]
[ correlation_id : u32 ]
[ payload_len    : u32 ]
[ checksum       : u32 ]  xxh32(payload, 0)
[ payload bytes...     ]
*/

use bytes::{Buf, BufMut, BytesMut};
use xxhash_rust::xxh32::xxh32;
use crate::ProtocolError;

pub const PROTOCOL_VERSION: u8 = 1;
pub const HEADER_LEN: usize = 14;
pub const MAX_PAYLOAD_LEN: usize = 8 * 1024 * 1024;

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameType {
    Request = 1,
    Response = 2,
    Error = 3,
}

impl TryFrom<u8> for FrameType {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, ProtocolError> {
        match value {
            1 => Ok(FrameType::Request),
            2 => Ok(FrameType::Response),
            3 => Ok(FrameType::Error),
            _ => Err(ProtocolError::UnknownFrameType(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub version: u8,
    pub frame_type: FrameType,
    pub correlation_id: u32, // echoed back on the response
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn request(correlation_id: u32, payload: Vec<u8>) -> Self {
        Frame {
            version: PROTOCOL_VERSION,
            frame_type: FrameType::Request,
            correlation_id,
            payload,
        }
    }

    pub fn response(correlation_id: u32, payload: Vec<u8>) -> Self {
        Frame {
            version: PROTOCOL_VERSION,
            frame_type: FrameType::Response,
            correlation_id,
            payload,
        }
    }

    /// An error frame carries a UTF-8 message instead of a payload.
    pub fn error(correlation_id: u32, message: &str) -> Self {
        Frame {
            version: PROTOCOL_VERSION,
            frame_type: FrameType::Error,
            correlation_id,
            payload: message.as_bytes().to_vec(),
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.reserve(HEADER_LEN + self.payload.len());
        buf.put_u8(self.version);
        buf.put_u8(self.frame_type as u8);
        buf.put_u32(self.correlation_id);
        buf.put_u32(self.payload.len() as u32);
        buf.put_u32(xxh32(&self.payload, 0));
        buf.extend_from_slice(&self.payload);
    }

    /// Returns `Ok(None)` and leaves `buf` untouched until a whole frame is buffered.
    pub fn decode(buf: &mut BytesMut) -> Result<Option<Frame>, ProtocolError> {
        if buf.len() < HEADER_LEN {
            return Ok(None);
        }

        let mut cursor = &buf[..];

        let version = cursor.get_u8();
        let frame_type_raw = cursor.get_u8();
        let correlation_id = cursor.get_u32();
        let payload_len = cursor.get_u32() as usize;
        let checksum_expected = cursor.get_u32();

        if payload_len > MAX_PAYLOAD_LEN {
            return Err(ProtocolError::FrameTooLarge(payload_len));
        }
        if cursor.remaining() < payload_len {
            return Ok(None);
        }

        let frame_type = FrameType::try_from(frame_type_raw)?;

        buf.advance(HEADER_LEN);
        let payload = buf.split_to(payload_len).to_vec();
        let checksum_actual = xxh32(&payload, 0);

        if checksum_actual != checksum_expected {
            return Err(ProtocolError::ChecksumMismatch {
                expected: checksum_expected,
                found: checksum_actual,
            });
        }

        Ok(Some(Frame {
            version,
            frame_type,
            correlation_id,
            payload,
        }))
    }
}
