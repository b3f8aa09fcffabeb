use crate::ProtocolError;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(u8)]
pub enum OpCode {
    PublishCaseEvent = 1,
    Ping = 2,
}

impl TryFrom<u8> for OpCode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(OpCode::PublishCaseEvent),
            2 => Ok(OpCode::Ping),
            _ => Err(ProtocolError::UnknownOpCode(value)),
        }
    }
}
