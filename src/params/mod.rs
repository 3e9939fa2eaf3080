//! Replication Task Parameters
//!
//! The identifying payload of one index replication task: which remote
//! cluster connection to follow, which leader index, and the local
//! follower index that mirrors it.

mod document;
mod stream;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::index::Index;
use crate::version::Version;

/// Task type name shared with the replication executor
pub const TASK_NAME: &str = "cluster:indices/admin/replication";

/// Oldest node version that can decode the binary form
pub const MINIMUM_SUPPORTED_VERSION: Version = Version::V_1_1_0;

/// Parameters of an index replication task
///
/// Field order is the binary layout; do not reorder. The derived
/// `Deserialize` serves the positional binary codec; documents are parsed
/// with [`ReplicationTaskParams::from_document`] or
/// [`ReplicationTaskParams::from_json`], which report missing keys as
/// [`Error::MissingField`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplicationTaskParams {
    /// Registered remote cluster connection
    #[serde(rename = "leader_alias")]
    leader_alias: String,
    #[serde(rename = "leader_index")]
    leader_index: Index,
    #[serde(rename = "follower_index")]
    follower_index_name: String,
}

impl ReplicationTaskParams {
    /// Create parameters for a newly submitted task
    pub fn new(
        leader_alias: impl Into<String>,
        leader_index: Index,
        follower_index_name: impl Into<String>,
    ) -> Result<Self> {
        let leader_alias = leader_alias.into();
        let follower_index_name = follower_index_name.into();

        if leader_alias.is_empty() {
            return Err(Error::InvalidArgument {
                field: "leader_alias",
                reason: "cannot be empty".into(),
            });
        }

        if follower_index_name.is_empty() {
            return Err(Error::InvalidArgument {
                field: "follower_index",
                reason: "cannot be empty".into(),
            });
        }

        Ok(Self::from_parts(leader_alias, leader_index, follower_index_name))
    }

    /// Codecs rebuild already-encoded parameters without re-validating them
    pub(crate) fn from_parts(
        leader_alias: String,
        leader_index: Index,
        follower_index_name: String,
    ) -> Self {
        Self {
            leader_alias,
            leader_index,
            follower_index_name,
        }
    }

    pub fn leader_alias(&self) -> &str {
        &self.leader_alias
    }

    pub fn leader_index(&self) -> &Index {
        &self.leader_index
    }

    pub fn follower_index_name(&self) -> &str {
        &self.follower_index_name
    }

    /// Dispatch key used by the task framework to pick a decoder
    pub fn writeable_name(&self) -> &'static str {
        TASK_NAME
    }

    pub fn minimal_supported_version(&self) -> Version {
        MINIMUM_SUPPORTED_VERSION
    }
}

impl fmt::Display for ReplicationTaskParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReplicationTaskParams {
        ReplicationTaskParams::new(
            "leader-cluster-1",
            Index::new("logs-2021", "abc123"),
            "logs-2021-follower",
        )
        .unwrap()
    }

    #[test]
    fn test_new_accepts_valid_triple() {
        let params = sample();
        assert_eq!(params.leader_alias(), "leader-cluster-1");
        assert_eq!(params.leader_index().name(), "logs-2021");
        assert_eq!(params.leader_index().uuid(), "abc123");
        assert_eq!(params.follower_index_name(), "logs-2021-follower");
    }

    #[test]
    fn test_new_rejects_empty_alias() {
        let err = ReplicationTaskParams::new("", Index::new("logs", "u1"), "logs-follower")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { field: "leader_alias", .. }));
    }

    #[test]
    fn test_new_rejects_empty_follower() {
        let err = ReplicationTaskParams::new("leader", Index::new("logs", "u1"), "").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { field: "follower_index", .. }));
    }

    #[test]
    fn test_task_constants() {
        let params = sample();
        assert_eq!(params.writeable_name(), "cluster:indices/admin/replication");
        assert_eq!(params.minimal_supported_version(), Version::V_1_1_0);
    }

    #[test]
    fn test_display_is_document() {
        let rendered = sample().to_string();
        assert!(rendered.starts_with("{\"leader_alias\":\"leader-cluster-1\""));
        assert!(rendered.contains("\"follower_index\":\"logs-2021-follower\""));
    }
}
