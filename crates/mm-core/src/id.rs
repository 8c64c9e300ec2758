use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a node in the mind map.
///
/// Plain integer, assigned by a strictly increasing counter. Id `0` is
/// reserved for the central node created at session start.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// The reserved id of the central node. Never deletable.
    pub const ROOT: NodeId = NodeId(0);

    pub const fn from_raw(raw: u64) -> Self {
        NodeId(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source. Ids are never handed out twice, even after the node
/// they belonged to is deleted. The counter only moves when a serialized
/// document restores it — and then only upward (see [`IdAllocator::restore`]).
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Hand out the next id and advance the counter.
    pub fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Keep the counter strictly above a forced id so it can never be
    /// reissued to a later node.
    pub fn ensure_above(&mut self, id: NodeId) {
        if id.0 >= self.next {
            self.next = id.0 + 1;
        }
    }

    /// Rebuild the allocator from a serialized counter. The counter is
    /// clamped to `max_existing + 1` so a document carrying a stale counter
    /// cannot cause id reuse.
    pub fn restore(counter: u64, max_existing: Option<NodeId>) -> Self {
        let floor = max_existing.map(|id| id.0 + 1).unwrap_or(0);
        Self {
            next: counter.max(floor),
        }
    }

    /// The value the next `allocate` call would return.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_is_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.allocate(), NodeId::ROOT);
        assert_eq!(alloc.allocate(), NodeId::from_raw(1));
        assert_eq!(alloc.allocate(), NodeId::from_raw(2));
    }

    #[test]
    fn forced_ids_advance_the_counter() {
        let mut alloc = IdAllocator::new();
        alloc.ensure_above(NodeId::from_raw(7));
        assert_eq!(alloc.allocate(), NodeId::from_raw(8));
        // Lower forced ids leave the counter alone
        alloc.ensure_above(NodeId::from_raw(3));
        assert_eq!(alloc.allocate(), NodeId::from_raw(9));
    }

    #[test]
    fn restore_clamps_stale_counters() {
        let mut alloc = IdAllocator::restore(2, Some(NodeId::from_raw(5)));
        assert_eq!(alloc.allocate(), NodeId::from_raw(6));

        let mut alloc = IdAllocator::restore(10, Some(NodeId::from_raw(5)));
        assert_eq!(alloc.allocate(), NodeId::from_raw(10));
    }
}
