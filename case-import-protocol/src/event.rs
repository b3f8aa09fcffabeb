use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A case event as submitted by a caller.
///
/// Only `caseId` is read by the server (it is echoed back as the event id).
/// Every other field is carried through untouched. `caseId` is always
/// published: an event that arrived without one goes out with `"caseId": ""`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseEvent {
    #[serde(default)]
    pub case_id: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CaseEvent {
    pub fn new(case_id: impl Into<String>) -> Self {
        CaseEvent {
            case_id: case_id.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}
