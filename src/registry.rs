//! Task Parameter Registry
//!
//! Host side of the persistent-task contract. Parameter kinds register
//! their type name and minimum version once at startup; incoming blobs
//! are routed to a decoder by name, after the version gate.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::params::{ReplicationTaskParams, MINIMUM_SUPPORTED_VERSION, TASK_NAME};
use crate::version::Version;

/// Dispatch key and compatibility floor of one parameter kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub name: &'static str,
    pub minimum_version: Version,
}

/// Parameters that can travel as persisted task state
pub trait TaskParams: fmt::Debug + Send + Sync + 'static {
    fn registration(&self) -> Registration;

    /// Binary form
    fn encode(&self) -> Result<Vec<u8>>;

    /// Structured-document form
    fn render(&self) -> Result<Value>;

    fn as_any(&self) -> &dyn Any;
}

/// Parameter kinds a registry can decode
pub trait RegisteredTaskParams: TaskParams + Sized {
    const REGISTRATION: Registration;

    fn decode(bytes: &[u8]) -> Result<Self>;
}

impl TaskParams for ReplicationTaskParams {
    fn registration(&self) -> Registration {
        Self::REGISTRATION
    }

    fn encode(&self) -> Result<Vec<u8>> {
        self.to_bytes()
    }

    fn render(&self) -> Result<Value> {
        self.to_document()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RegisteredTaskParams for ReplicationTaskParams {
    const REGISTRATION: Registration = Registration {
        name: TASK_NAME,
        minimum_version: MINIMUM_SUPPORTED_VERSION,
    };

    fn decode(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}

type Decoder = fn(&[u8]) -> Result<Box<dyn TaskParams>>;

fn decode_boxed<P: RegisteredTaskParams>(bytes: &[u8]) -> Result<Box<dyn TaskParams>> {
    Ok(Box::new(P::decode(bytes)?))
}

struct Entry {
    registration: Registration,
    decoder: Decoder,
}

/// Routes encoded parameters to their decoder
pub struct TaskParamsRegistry {
    node_version: Version,
    entries: HashMap<&'static str, Entry>,
}

impl TaskParamsRegistry {
    /// Create an empty registry for a node running `node_version`
    pub fn new(node_version: Version) -> Self {
        Self {
            node_version,
            entries: HashMap::new(),
        }
    }

    /// Registry with every parameter kind this crate provides
    pub fn with_defaults(node_version: Version) -> Result<Self> {
        let mut registry = Self::new(node_version);
        registry.register::<ReplicationTaskParams>()?;
        Ok(registry)
    }

    /// Register a parameter kind
    pub fn register<P: RegisteredTaskParams>(&mut self) -> Result<()> {
        let registration = P::REGISTRATION;
        if self.entries.contains_key(registration.name) {
            return Err(Error::DuplicateTaskType(registration.name.to_string()));
        }

        tracing::debug!(
            "Registered task params {} (minimum version {})",
            registration.name,
            registration.minimum_version
        );
        self.entries.insert(
            registration.name,
            Entry {
                registration,
                decoder: decode_boxed::<P>,
            },
        );
        Ok(())
    }

    pub fn node_version(&self) -> Version {
        self.node_version
    }

    /// Look up the registration for a type name
    pub fn registration(&self, name: &str) -> Option<Registration> {
        self.entries.get(name).map(|e| e.registration)
    }

    /// Apply the version gate for a type name
    pub fn check(&self, name: &str) -> Result<Registration> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| Error::UnknownTaskType(name.to_string()))?;

        let required = entry.registration.minimum_version;
        if !self.node_version.can_decode(required) {
            tracing::warn!(
                "Refusing to decode {}: requires version {}, node is {}",
                name,
                required,
                self.node_version
            );
            return Err(Error::UnsupportedVersion {
                required,
                actual: self.node_version,
            });
        }

        Ok(entry.registration)
    }

    /// Decode a blob of the named kind
    pub fn decode(&self, name: &str, bytes: &[u8]) -> Result<Box<dyn TaskParams>> {
        self.check(name)?;
        let entry = &self.entries[name];
        let params = (entry.decoder)(bytes)?;
        tracing::debug!("Decoded {} task params ({} bytes)", name, bytes.len());
        Ok(params)
    }

    /// Decode a blob that must be of kind `P`
    pub fn decode_as<P: RegisteredTaskParams>(&self, name: &str, bytes: &[u8]) -> Result<P> {
        if name != P::REGISTRATION.name {
            return Err(Error::UnknownTaskType(name.to_string()));
        }
        self.check(name)?;
        P::decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Index;

    fn sample() -> ReplicationTaskParams {
        ReplicationTaskParams::new(
            "leader-cluster-1",
            Index::new("logs-2021", "abc123"),
            "logs-2021-follower",
        )
        .unwrap()
    }

    #[test]
    fn test_dispatch_by_name() {
        let registry = TaskParamsRegistry::with_defaults(Version::CURRENT).unwrap();
        let bytes = sample().to_bytes().unwrap();

        let decoded = registry.decode(TASK_NAME, &bytes).unwrap();
        assert_eq!(decoded.registration().name, TASK_NAME);

        let params = decoded
            .as_any()
            .downcast_ref::<ReplicationTaskParams>()
            .unwrap();
        assert_eq!(params, &sample());
    }

    #[test]
    fn test_unknown_task_type() {
        let registry = TaskParamsRegistry::with_defaults(Version::CURRENT).unwrap();
        let err = registry.decode("cluster:indices/shards/replication", &[]).unwrap_err();
        assert!(matches!(err, Error::UnknownTaskType(_)));
    }

    #[test]
    fn test_old_node_refuses_to_decode() {
        let registry = TaskParamsRegistry::with_defaults(Version::V_1_0_0).unwrap();
        let bytes = sample().to_bytes().unwrap();

        let err = registry.decode(TASK_NAME, &bytes).unwrap_err();
        match err {
            Error::UnsupportedVersion { required, actual } => {
                assert_eq!(required, Version::V_1_1_0);
                assert_eq!(actual, Version::V_1_0_0);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_gate_runs_before_decoding() {
        let registry = TaskParamsRegistry::with_defaults(Version::V_1_0_0).unwrap();
        let err = registry.decode(TASK_NAME, b"garbage").unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { .. }));
    }

    #[test]
    fn test_minimum_version_node_accepted() {
        let registry = TaskParamsRegistry::with_defaults(Version::V_1_1_0).unwrap();
        let bytes = sample().to_bytes().unwrap();
        let params: ReplicationTaskParams = registry.decode_as(TASK_NAME, &bytes).unwrap();
        assert_eq!(params, sample());
    }

    #[test]
    fn test_defaults_go_through_register() {
        let mut registry = TaskParamsRegistry::with_defaults(Version::CURRENT).unwrap();
        assert_eq!(
            registry.registration(TASK_NAME),
            Some(ReplicationTaskParams::REGISTRATION)
        );
        let err = registry.register::<ReplicationTaskParams>().unwrap_err();
        assert!(matches!(err, Error::DuplicateTaskType(_)));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = TaskParamsRegistry::new(Version::CURRENT);
        registry.register::<ReplicationTaskParams>().unwrap();
        let err = registry.register::<ReplicationTaskParams>().unwrap_err();
        assert!(matches!(err, Error::DuplicateTaskType(_)));
        assert_eq!(
            registry.registration(TASK_NAME),
            Some(ReplicationTaskParams::REGISTRATION)
        );
    }

    #[test]
    fn test_decode_errors_propagate() {
        let registry = TaskParamsRegistry::with_defaults(Version::CURRENT).unwrap();
        let bytes = sample().to_bytes().unwrap();
        let err = registry.decode(TASK_NAME, &bytes[..10]).unwrap_err();
        assert!(matches!(err, Error::TruncatedOrMalformedBinary(_)));
    }
}
