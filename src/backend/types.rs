//! Wire types for the chat backend

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Instruction id used before the catalog is known
pub const DEFAULT_INSTRUCTION_ID: &str = "default";

/// Named instruction presets offered by the backend.
///
/// Decoded entries follow JavaScript property order: integer-like ids
/// ascending first, then the remaining ids in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionCatalog {
    entries: Vec<(String, String)>,
}

impl InstructionCatalog {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Identifier of the first preset
    pub fn first_id(&self) -> Option<&str> {
        self.entries.first().map(|(id, _)| id.as_str())
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, name)| name.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(entry_id, _)| entry_id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for InstructionCatalog {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // serde_json is built with preserve_order, so the sort below is stable
        // over document order.
        let map = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        let mut entries: Vec<(String, String)> = map
            .into_iter()
            .map(|(id, name)| {
                let name = match name {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (id, name)
            })
            .collect();
        entries.sort_by_key(|(id, _)| match array_index(id) {
            Some(index) => (0, index),
            None => (1, 0),
        });
        Ok(Self { entries })
    }
}

/// Canonical array index as JavaScript orders object keys: no sign, no
/// leading zeros, at most 2^32 - 2.
fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse::<u32>().ok().filter(|&index| index != u32::MAX)
}

/// Opaque session identifier issued by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NewSessionResponse {
    pub session_id: SessionId,
}

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub session_id: Option<SessionId>,
    pub instruction_id: String,
    pub question: String,
}

/// Successful reply from `POST /chat`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// Error body returned with a non-success status
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
