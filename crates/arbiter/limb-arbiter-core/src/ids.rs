//! Identifiers for appendages and state sources.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of appendages tracked per avatar.
pub const APPENDAGE_COUNT: usize = 2;

/// Identifies one of the avatar's independently animated appendages.
///
/// Only [`AppendageId::LEFT`] and [`AppendageId::RIGHT`] are valid; any other
/// value is rejected by the arbiter with `InvalidAppendageId`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AppendageId(pub u32);

impl AppendageId {
    pub const LEFT: AppendageId = AppendageId(0);
    pub const RIGHT: AppendageId = AppendageId(1);
    pub const ALL: [AppendageId; APPENDAGE_COUNT] = [Self::LEFT, Self::RIGHT];

    /// Dense slot index, or `None` when the id does not name a real appendage.
    #[inline]
    pub fn index(self) -> Option<usize> {
        let idx = self.0 as usize;
        (idx < APPENDAGE_COUNT).then_some(idx)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.index().is_some()
    }
}

impl fmt::Display for AppendageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::LEFT => f.write_str("left"),
            Self::RIGHT => f.write_str("right"),
            AppendageId(n) => write!(f, "appendage#{n}"),
        }
    }
}

/// Stable id assigned to a state source when it is registered on the engine.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u32);

/// Monotonic allocator for SourceId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_source: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_source(&mut self) -> SourceId {
        let id = SourceId(self.next_source);
        self.next_source = self.next_source.wrapping_add(1);
        id
    }
}
