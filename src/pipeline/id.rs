//! Identity types for the pipeline graph.
//!
//! Block ids are strings so they survive a round trip through the Brain
//! pipeline API unchanged. New ids are minted by [`BlockIdGenerator`], which
//! only ever counts upwards and skips ids already present in the graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a block instance on the canvas.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Prefix used for generated block ids.
pub const BLOCK_ID_PREFIX: &str = "block_";

/// Monotonic generator for `block_<n>` ids.
#[derive(Debug, Clone, Default)]
pub struct BlockIdGenerator {
    next: u64,
}

impl BlockIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce an id that is not contained in `taken`.
    pub fn next_id<'a, I>(&mut self, taken: I) -> BlockId
    where
        I: IntoIterator<Item = &'a BlockId> + Clone,
    {
        loop {
            let candidate = BlockId(format!("{}{}", BLOCK_ID_PREFIX, self.next));
            self.next += 1;
            if !taken.clone().into_iter().any(|id| *id == candidate) {
                return candidate;
            }
        }
    }

    /// Advance the counter past every generated-looking id in `ids`.
    ///
    /// Called after loading a document so that freshly added blocks never
    /// collide with, or resurrect, ids from the stored pipeline.
    pub fn observe<'a>(&mut self, ids: impl IntoIterator<Item = &'a BlockId>) {
        for id in ids {
            if let Some(n) = id
                .as_str()
                .strip_prefix(BLOCK_ID_PREFIX)
                .and_then(|rest| rest.parse::<u64>().ok())
            {
                self.next = self.next.max(n + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_counts_up() {
        let mut gen = BlockIdGenerator::new();
        let taken: Vec<BlockId> = Vec::new();
        assert_eq!(gen.next_id(&taken).as_str(), "block_0");
        assert_eq!(gen.next_id(&taken).as_str(), "block_1");
    }

    #[test]
    fn test_generator_skips_taken() {
        let mut gen = BlockIdGenerator::new();
        let taken = vec![BlockId::from("block_0"), BlockId::from("block_1")];
        assert_eq!(gen.next_id(&taken).as_str(), "block_2");
    }

    #[test]
    fn test_generator_never_reuses_after_delete() {
        let mut gen = BlockIdGenerator::new();
        let mut taken = Vec::new();
        let first = gen.next_id(&taken);
        taken.push(first.clone());
        taken.clear(); // block deleted
        let second = gen.next_id(&taken);
        assert_ne!(first, second);
    }

    #[test]
    fn test_observe_loaded_ids() {
        let mut gen = BlockIdGenerator::new();
        let loaded = vec![
            BlockId::from("block_7"),
            BlockId::from("loader-csi"),
            BlockId::from("block_3"),
        ];
        gen.observe(&loaded);
        assert_eq!(gen.next_id(&loaded).as_str(), "block_8");
    }

    #[test]
    fn test_serde_transparent() {
        let id = BlockId::from("block_4");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"block_4\"");
    }
}
