//! Persisted Task State
//!
//! Envelope that carries encoded task parameters to disk and between
//! nodes. The parameter bytes stay opaque here; they are decoded through
//! the registry so the version gate always applies.
//!
//! Layout: `[magic: 8][length: u32][crc32: u32][body: bincode TaskEnvelope]`

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::registry::{RegisteredTaskParams, TaskParams, TaskParamsRegistry};
use crate::version::Version;

/// Magic bytes at the start of each persisted task file
const ENVELOPE_MAGIC: &[u8; 8] = b"CCRTASK1";

/// Fixed-size prefix of a persisted envelope: magic, body length, body crc32
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub body_len: u32,
    pub body_crc: u32,
}

impl EnvelopeHeader {
    /// Header size in bytes, magic included
    pub const SIZE: usize = ENVELOPE_MAGIC.len() + 8;

    /// Header describing `body`
    pub fn for_body(body: &[u8]) -> Result<Self> {
        let body_len = u32::try_from(body.len())
            .map_err(|_| Error::Corrupted("envelope body too large".into()))?;
        Ok(Self {
            body_len,
            body_crc: crc32fast::hash(body),
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(ENVELOPE_MAGIC);
        bytes[8..12].copy_from_slice(&self.body_len.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.body_crc.to_le_bytes());
        bytes
    }

    /// Parse the header at the start of `bytes`
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(Error::Corrupted("envelope too short".into()));
        }

        if &bytes[0..8] != ENVELOPE_MAGIC {
            return Err(Error::Corrupted("invalid envelope magic bytes".into()));
        }

        let word = |at: usize| {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&bytes[at..at + 4]);
            u32::from_le_bytes(raw)
        };

        Ok(Self {
            body_len: word(8),
            body_crc: word(12),
        })
    }

    /// Check that `body` is exactly what this header describes
    pub fn verify(&self, body: &[u8]) -> Result<()> {
        if body.len() != self.body_len as usize {
            return Err(Error::Corrupted(format!(
                "body length {} does not match header length {}",
                body.len(),
                self.body_len
            )));
        }

        if crc32fast::hash(body) != self.body_crc {
            return Err(Error::Corrupted("checksum mismatch".into()));
        }

        Ok(())
    }
}

/// Encoded task parameters with the metadata needed to route them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    /// Type name used to pick the decoder
    pub task_name: String,
    /// Version of the node that wrote the envelope
    pub written_by: Version,
    pub persisted_at: DateTime<Utc>,
    /// Binary form of the parameters
    pub params: Vec<u8>,
}

impl TaskEnvelope {
    /// Wrap parameters written by this node
    pub fn seal(params: &dyn TaskParams) -> Result<Self> {
        Ok(Self {
            task_name: params.registration().name.to_string(),
            written_by: Version::CURRENT,
            persisted_at: Utc::now(),
            params: params.encode()?,
        })
    }

    /// Decode the parameters through the registry
    pub fn open(&self, registry: &TaskParamsRegistry) -> Result<Box<dyn TaskParams>> {
        registry.decode(&self.task_name, &self.params)
    }

    /// Decode parameters that must be of kind `P`
    pub fn open_as<P: RegisteredTaskParams>(&self, registry: &TaskParamsRegistry) -> Result<P> {
        registry.decode_as(&self.task_name, &self.params)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let body = bincode::serialize(self)?;
        let header = EnvelopeHeader::for_body(&body)?;

        let mut bytes = Vec::with_capacity(EnvelopeHeader::SIZE + body.len());
        bytes.extend_from_slice(&header.to_bytes());
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header = EnvelopeHeader::parse(bytes)?;
        let body = &bytes[EnvelopeHeader::SIZE..];
        header.verify(body)?;
        Ok(bincode::deserialize(body)?)
    }

    /// Atomically replace the file at `path` with this envelope
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let bytes = self.encode()?;
        let tmp = path.with_extension("tmp");

        let mut file = File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)?;

        tracing::debug!("Persisted {} task state to {:?}", self.task_name, path);
        Ok(())
    }

    pub fn read_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let envelope = Self::decode(&bytes).map_err(|e| {
            tracing::error!("Failed to read task state from {:?}: {}", path, e);
            e
        })?;

        tracing::debug!(
            "Loaded {} task state written by {} at {}",
            envelope.task_name,
            envelope.written_by,
            envelope.persisted_at
        );
        Ok(envelope)
    }
}
