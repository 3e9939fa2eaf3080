//! Index Identity
//!
//! Name plus stable unique id of an index. The id keeps resolving to the
//! same index on the leader cluster after a rename.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Composite identity of an index
///
/// Binary form is `name` then `uuid`, both length-prefixed. Document form
/// is `{"index_name": ..., "index_uuid": ...}` with both keys required.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Index {
    #[serde(rename = "index_name")]
    name: String,
    #[serde(rename = "index_uuid")]
    uuid: String,
}

impl Index {
    pub fn new(name: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: uuid.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}]", self.name, self.uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_keys() {
        let index = Index::new("logs-2021", "abc123");
        let value = serde_json::to_value(&index).unwrap();
        assert_eq!(value["index_name"], "logs-2021");
        assert_eq!(value["index_uuid"], "abc123");
    }

    #[test]
    fn test_missing_uuid_is_rejected() {
        let result: Result<Index, _> = serde_json::from_str(r#"{"index_name": "logs-2021"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_binary_layout() {
        let bytes = bincode::serialize(&Index::new("ab", "c")).unwrap();
        // u64 length + bytes, twice
        assert_eq!(bytes.len(), 8 + 2 + 8 + 1);
        assert_eq!(&bytes[0..8], &2u64.to_le_bytes());
        assert_eq!(&bytes[8..10], b"ab");
    }

    #[test]
    fn test_display() {
        assert_eq!(Index::new("logs", "u1").to_string(), "[logs/u1]");
    }
}
