//! Binary stream codec
//!
//! Positional bincode layout, untagged:
//! `[leader_alias: u64 len + utf8][leader_index][follower_index: u64 len + utf8]`.
//! Compatibility across releases is handled by the version gate, not by
//! markers in the byte stream.

use std::io::{Read, Write};

use bincode::Options;

use super::ReplicationTaskParams;
use crate::error::Result;

/// Upper bound on an encoded parameter record
const MAX_PARAMS_SIZE: u64 = 1024 * 1024;

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_PARAMS_SIZE)
}

impl ReplicationTaskParams {
    /// Write the record to a stream
    pub fn write_to<W: Write>(&self, out: W) -> Result<()> {
        codec().serialize_into(out, self)?;
        Ok(())
    }

    /// Read exactly one record from a stream, leaving anything after it unread
    pub fn read_from<R: Read>(inp: R) -> Result<Self> {
        Ok(codec().deserialize_from(inp)?)
    }

    /// Serialize to a standalone blob
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(codec().serialize(self)?)
    }

    /// Deserialize a standalone blob; trailing bytes are rejected
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(codec().reject_trailing_bytes().deserialize(bytes)?)
    }
}
