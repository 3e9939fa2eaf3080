//! ccrepl - Cross-Cluster Index Replication Task Parameters
//!
//! The identifying payload of an index replication task, and the codecs
//! that move it between nodes: a positional binary form for transport
//! and persisted task state, and a structured document for status APIs.
//!
//! # Compatibility
//!
//! The binary form carries no tags or version markers. A node decodes it
//! only when its own version is at least the parameters' minimum
//! supported version; the [`registry`] applies that gate before any byte
//! is read.

pub mod config;
pub mod error;
pub mod index;
pub mod params;
pub mod persist;
pub mod registry;
pub mod version;

pub use config::ReplConfig;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::ReplConfig;
    pub use crate::error::{Error, Result};
    pub use crate::index::Index;
    pub use crate::params::{ReplicationTaskParams, MINIMUM_SUPPORTED_VERSION, TASK_NAME};
    pub use crate::persist::TaskEnvelope;
    pub use crate::registry::{Registration, RegisteredTaskParams, TaskParams, TaskParamsRegistry};
    pub use crate::version::Version;
}
