//! Mapped buffer region tracking
//!
//! A successful map call returns a host-visible pointer that later calls
//! (memcpy records, unmap) refer to. The tracker keys regions by that
//! pointer so the matching unmap can release exactly the region the map
//! registered. An unmap with no registered region is a trace
//! inconsistency, reported but never fatal.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Metadata for one active buffer mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Buffer object the mapping belongs to
    pub buffer: u32,
    /// Offset of the mapped range within the buffer
    pub offset: i64,
    /// Length of the mapped range in bytes
    pub length: i64,
}

/// Active mappings keyed by mapped pointer
#[derive(Debug, Default)]
pub struct RegionTracker {
    regions: HashMap<u64, Region>,
}

impl RegionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping returned by a map call
    pub fn register(&mut self, pointer: u64, region: Region) {
        if let Some(old) = self.regions.insert(pointer, region) {
            log::warn!(
                "mapping at {pointer:#x} replaced while still active (buffer {})",
                old.buffer
            );
        }
    }

    /// Release the mapping at a pointer, if one is registered
    pub fn release(&mut self, pointer: u64) -> Option<Region> {
        self.regions.remove(&pointer)
    }

    pub fn get(&self, pointer: u64) -> Option<&Region> {
        self.regions.get(&pointer)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
