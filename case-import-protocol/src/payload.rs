use bytes::{Buf, BufMut, Bytes, BytesMut};
use crate::errors::ProtocolError;
use crate::op_code::OpCode;

/// `[op_code: u8][data...]`, the body of a request frame.
#[derive(Debug)]
pub struct RequestPayload {
    pub op_code: OpCode,
    pub data: Bytes,
}

impl RequestPayload {
    pub fn serialize(&self) -> Bytes {
        encode(self.op_code, &self.data)
    }

    pub fn deserialize(mut buf: Bytes) -> Result<Self, ProtocolError> {
        if buf.remaining() < 1 {
            return Err(ProtocolError::PayloadError("Empty request payload".into()));
        }

        let op_code = OpCode::try_from(buf.get_u8())?;
        Ok(RequestPayload { op_code, data: buf })
    }
}

#[derive(Debug)]
pub struct ResponsePayload {
    pub op_code: OpCode,
    pub data: Bytes,
}

impl ResponsePayload {
    pub fn serialize(&self) -> Bytes {
        encode(self.op_code, &self.data)
    }

    pub fn deserialize(mut buf: Bytes) -> Result<Self, ProtocolError> {
        if buf.remaining() < 1 {
            return Err(ProtocolError::PayloadError("Empty response payload".into()));
        }

        let op_code = OpCode::try_from(buf.get_u8())?;
        Ok(ResponsePayload { op_code, data: buf })
    }

    pub fn expect_op(self, expected: OpCode) -> Result<Bytes, ProtocolError> {
        if self.op_code != expected {
            return Err(ProtocolError::UnexpectedOpCode {
                expected,
                found: self.op_code,
            });
        }
        Ok(self.data)
    }
}

fn encode(op_code: OpCode, data: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + data.len());
    buf.put_u8(op_code as u8);
    buf.extend_from_slice(data);
    buf.freeze()
}
