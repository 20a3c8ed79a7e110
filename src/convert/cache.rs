//! Per-run conversion identity cache
//!
//! Guarantees at most one target node allocation per source node. A node
//! feeding several consumers is converted on first demand and every later
//! resolution returns the memoized record. Entries double as in-flight
//! markers: a node that is re-resolved while still mid-conversion means the
//! source graph has a cycle, which is a structural error rather than
//! something to recurse into.

use super::error::{ConvertError, ConvertResult};
use std::collections::HashMap;

/// Translation from source output plug names to target output plug names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlugMap {
    /// Fixed per-rule lookup table.
    Table(&'static [(&'static str, &'static str)]),
    /// Every requested plug maps to one output (fallback nodes).
    Fixed(&'static str),
    /// Plug names carry over unchanged (pass-through and identical-schema
    /// nodes, and materials referenced by their own combined output).
    Same,
}

impl PlugMap {
    pub fn translate(&self, plug: &str) -> Option<String> {
        match self {
            PlugMap::Table(entries) => entries
                .iter()
                .find(|(src, _)| *src == plug)
                .map(|(_, dst)| (*dst).to_string()),
            PlugMap::Fixed(out) => Some((*out).to_string()),
            PlugMap::Same => Some(plug.to_string()),
        }
    }
}

/// The record produced by converting one source node.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Name of the allocated target node (or the source node itself for
    /// pass-through conversions).
    pub target: String,
    pub plugs: PlugMap,
}

impl Conversion {
    pub fn new(target: impl Into<String>, plugs: PlugMap) -> Self {
        Self {
            target: target.into(),
            plugs,
        }
    }
}

#[derive(Debug)]
enum Slot {
    Resolving,
    Done(Conversion),
}

/// Memo of converted source nodes, scoped to exactly one run.
#[derive(Debug, Default)]
pub struct IdentityCache {
    entries: HashMap<String, Slot>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memoized record for a source node, if conversion already finished.
    pub fn get(&self, source: &str) -> Option<&Conversion> {
        match self.entries.get(source) {
            Some(Slot::Done(conv)) => Some(conv),
            _ => None,
        }
    }

    /// Mark a source node as mid-resolution. Re-entry is a cycle.
    pub fn begin(&mut self, source: &str) -> ConvertResult<()> {
        match self.entries.get(source) {
            Some(Slot::Resolving) => Err(ConvertError::Cycle(source.to_string())),
            Some(Slot::Done(_)) => Ok(()),
            None => {
                self.entries
                    .insert(source.to_string(), Slot::Resolving);
                Ok(())
            }
        }
    }

    /// Store the finished record for a source node.
    pub fn finish(&mut self, source: &str, conversion: Conversion) {
        self.entries
            .insert(source.to_string(), Slot::Done(conversion));
    }

    /// Drop the in-flight marker after a failed conversion so the failure
    /// stays isolated to the entity that triggered it.
    pub fn abort(&mut self, source: &str) {
        if let Some(Slot::Resolving) = self.entries.get(source) {
            self.entries.remove(source);
        }
    }

    /// Number of completed conversions.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|slot| matches!(slot, Slot::Done(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
