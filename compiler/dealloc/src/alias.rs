//! Alias registry: equivalence classes of values plus the current
//! ownership indicator of each tracked buffer.
//!
//! # Algorithm
//!
//! A union-find over [`ValueId`] indices with union by rank and path
//! halving. Values are registered lazily: any ID not seen yet is its own
//! singleton class. Classes only ever merge, so once `equivalent(a, b)`
//! holds it holds for the rest of the routine.
//!
//! Recording an indicator for a buffer also merges the two, which lets the
//! transform keep indicators in its owned sets and still match them against
//! the buffers released or yielded later.

use dealloc_ir::ValueId;
use rustc_hash::FxHashMap;

/// Value equivalence classes and the buffer -> indicator map for one routine.
#[derive(Debug, Default)]
pub struct AliasRegistry {
    parent: Vec<u32>,
    rank: Vec<u8>,
    indicators: FxHashMap<ValueId, ValueId>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, value: ValueId) {
        let raw = value.raw();
        if value.index() >= self.parent.len() {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "the arena is shorter than `raw`, which is a u32"
            )]
            let start = self.parent.len() as u32;
            self.parent.extend(start..=raw);
            self.rank.resize(value.index() + 1, 0);
        }
    }

    fn find(&mut self, value: ValueId) -> u32 {
        self.register(value);
        let mut x = value.raw();
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Merge the classes of `a` and `b`. No-op if already equivalent.
    pub fn union(&mut self, a: ValueId, b: ValueId) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        let (ra_rank, rb_rank) = (self.rank[ra as usize], self.rank[rb as usize]);
        if ra_rank < rb_rank {
            self.parent[ra as usize] = rb;
        } else {
            self.parent[rb as usize] = ra;
            if ra_rank == rb_rank {
                self.rank[ra as usize] = ra_rank.saturating_add(1);
            }
        }
    }

    /// Returns `true` if `a` and `b` are in the same class.
    pub fn equivalent(&mut self, a: ValueId, b: ValueId) -> bool {
        a == b || self.find(a) == self.find(b)
    }

    /// Canonical representative of `value`'s class.
    pub fn leader(&mut self, value: ValueId) -> ValueId {
        ValueId::new(self.find(value))
    }

    /// Record `indicator` as the current indicator of `buffer`, replacing
    /// any earlier one, and merge the two classes.
    pub fn set_indicator(&mut self, buffer: ValueId, indicator: ValueId) {
        self.indicators.insert(buffer, indicator);
        self.union(buffer, indicator);
    }

    /// The indicator currently recorded for `buffer`.
    pub fn indicator_of(&self, buffer: ValueId) -> Option<ValueId> {
        self.indicators.get(&buffer).copied()
    }

    /// Remove and return the indicator recorded for `buffer`.
    ///
    /// Class membership is unaffected.
    pub fn take_indicator(&mut self, buffer: ValueId) -> Option<ValueId> {
        self.indicators.remove(&buffer)
    }
}

#[cfg(test)]
mod tests;
