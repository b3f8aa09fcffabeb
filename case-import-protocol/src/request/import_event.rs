use bytes::Bytes;
use serde::{Deserialize, Serialize};
use crate::errors::ProtocolError;
use crate::event::CaseEvent;

/// Body of a `PublishCaseEvent` call. An absent or `null` event is a valid
/// request that the server answers with a failure response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportEventRequest {
    #[serde(default)]
    pub event: Option<CaseEvent>,
}

impl ImportEventRequest {
    pub fn new(event: Option<CaseEvent>) -> Self {
        ImportEventRequest { event }
    }

    pub fn serialize(&self) -> Result<Bytes, ProtocolError> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    pub fn deserialize(buf: Bytes) -> Result<Self, ProtocolError> {
        serde_json::from_slice(&buf)
            .map_err(|e| ProtocolError::PayloadError(format!("invalid import event request: {e}")))
    }
}
