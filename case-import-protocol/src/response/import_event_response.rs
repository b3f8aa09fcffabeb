use bytes::Bytes;
use serde::{Deserialize, Serialize};
use crate::errors::ProtocolError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEventResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl ImportEventResponse {
    pub const PUBLISHED: &'static str = "Event published successfully";

    pub fn published(event_id: impl Into<String>) -> Self {
        ImportEventResponse {
            success: true,
            message: Self::PUBLISHED.to_string(),
            event_id: Some(event_id.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ImportEventResponse {
            success: false,
            message: message.into(),
            event_id: None,
        }
    }

    pub fn serialize(&self) -> Result<Bytes, ProtocolError> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    pub fn deserialize(buf: Bytes) -> Result<Self, ProtocolError> {
        serde_json::from_slice(&buf)
            .map_err(|e| ProtocolError::PayloadError(format!("invalid import event response: {e}")))
    }
}
