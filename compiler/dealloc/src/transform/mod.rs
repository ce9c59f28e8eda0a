//! The ownership transform proper.
//!
//! Makes buffer ownership explicit by threading ownership indicators
//! through every block, region-branch construct, and routine body. The
//! walk is a depth-first recursion mirroring region nesting:
//!
//! - [`dispatch`] classifies each operation and routes it to one of the
//!   handlers below.
//! - [`block`] transforms one straight-line block: tracks what it owns,
//!   releases what does not escape, and consolidates what does.
//! - [`branch`] transforms `If`/`For`/`While`: per-region block transforms,
//!   implicit-capture reconciliation, operand ownership transfer, and the
//!   rebuild with indicator results.
//! - [`primitives`] emits `Own`, `Retain`, and `Null`, and answers the
//!   "does this operation touch that buffer" question.
//!
//! All of them share one [`AliasRegistry`] per routine.

mod block;
mod branch;
mod dispatch;
mod primitives;

use std::collections::BTreeSet;
use std::ops::AddAssign;

use dealloc_ir::ValueId;

use crate::alias::AliasRegistry;
use crate::config::DeallocConfig;

pub use self::block::{plan_escapes, EscapeGroup};

/// Ownership indicators held by a block at some point of its walk.
///
/// Ordered so that emission order, and therefore the output, is
/// deterministic.
pub(crate) type OwnedSet = BTreeSet<ValueId>;

/// What a block, region, or operation did to ownership.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransformResult {
    /// Values no longer owned by the enclosing scope afterwards. May name
    /// buffers the scope never owned; those releases are forwarded to the
    /// nearest ancestor that does, without crossing a loop boundary.
    pub released: BTreeSet<ValueId>,
    /// Indicators newly owned by the enclosing scope, positionally aligned
    /// with the escaping buffers (terminator operands or results).
    pub acquired: Vec<ValueId>,
}

/// Counts of what the transform inserted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeallocStats {
    /// `Own` operations.
    pub owns: usize,
    /// `Retain` operations still present after the transform.
    pub retains: usize,
    /// `Null` placeholders.
    pub nulls: usize,
    /// Buffer operands whose indicator was handed to a construct.
    pub transfers: usize,
}

impl AddAssign for DeallocStats {
    fn add_assign(&mut self, other: Self) {
        self.owns += other.owns;
        self.retains += other.retains;
        self.nulls += other.nulls;
        self.transfers += other.transfers;
    }
}

/// Per-routine transform state.
pub(crate) struct Deallocator<'c> {
    aliases: AliasRegistry,
    config: &'c DeallocConfig,
    stats: DeallocStats,
}

impl<'c> Deallocator<'c> {
    pub(crate) fn new(config: &'c DeallocConfig) -> Self {
        Self {
            aliases: AliasRegistry::new(),
            config,
            stats: DeallocStats::default(),
        }
    }

    pub(crate) fn stats(&self) -> DeallocStats {
        self.stats
    }

    #[cfg(test)]
    pub(crate) fn aliases_mut(&mut self) -> &mut AliasRegistry {
        &mut self.aliases
    }
}
