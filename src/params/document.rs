//! Structured-document codec
//!
//! `{"leader_alias": ..., "leader_index": {...}, "follower_index": ...}`.
//! Unknown keys are ignored so older readers accept documents written by
//! newer nodes. Every known key is required. The document and the nested
//! `leader_index` must both be objects; positional arrays are rejected.

use serde::de::Error as _;
use serde::Deserialize;
use serde_json::Value;

use super::ReplicationTaskParams;
use crate::error::{Error, Result};
use crate::index::Index;

/// Parameters as they are filled in while parsing a document
#[derive(Debug, Deserialize)]
struct ParamsBuilder {
    leader_alias: Option<String>,
    leader_index: Option<Value>,
    follower_index: Option<String>,
}

fn expect_object(doc: &Value, what: &str) -> Result<()> {
    if doc.is_object() {
        Ok(())
    } else {
        Err(Error::MalformedDocument(serde_json::Error::custom(format!(
            "{} must be an object",
            what
        ))))
    }
}

impl ParamsBuilder {
    fn build(self) -> Result<ReplicationTaskParams> {
        let leader_alias = self.leader_alias.ok_or(Error::MissingField {
            field: "leader_alias",
        })?;
        let leader_index = self.leader_index.ok_or(Error::MissingField {
            field: "leader_index",
        })?;
        expect_object(&leader_index, "leader_index")?;
        let leader_index: Index = serde_json::from_value(leader_index)?;
        let follower_index = self.follower_index.ok_or(Error::MissingField {
            field: "follower_index",
        })?;

        Ok(ReplicationTaskParams::from_parts(
            leader_alias,
            leader_index,
            follower_index,
        ))
    }
}

impl ReplicationTaskParams {
    /// Render as a document value
    pub fn to_document(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Render as compact JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from a document value
    pub fn from_document(doc: Value) -> Result<Self> {
        expect_object(&doc, "task parameter document")?;
        let builder: ParamsBuilder = serde_json::from_value(doc)?;
        builder.build()
    }

    /// Parse from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_document(serde_json::from_str(json)?)
    }
}
