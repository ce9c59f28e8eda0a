//! Block transform.
//!
//! # Algorithm
//!
//! 1. If the block owns its inputs, append one ownership argument per buffer
//!    argument and record it as that buffer's indicator. These start the
//!    owned set.
//! 2. Dispatch every non-terminator operation in order. A released value
//!    either cancels an owned indicator of the same alias class or is
//!    forwarded in the block's own `released` set. Acquired indicators join
//!    the owned set.
//! 3. The buffer operands of the terminator are the escaping values.
//! 4. Every owned indicator aliasing no escaping value gets its own
//!    `Retain([], [indicator])`, hoisted backward from the terminator past
//!    every operation that does not alias it.
//! 5. Escaping values and owned indicators are grouped by alias-class
//!    leader ([`plan_escapes`]). A group of one owned indicator and one
//!    escaping value forwards the indicator directly; any other group gets a
//!    `Retain(escaping, owned)` whose results become the escaping values'
//!    indicators.
//!
//! The terminator itself is left alone; the caller decides where the
//! acquired indicators go.

use dealloc_ir::{BlockId, Function, InsertPoint, OpId, Type, ValueId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::primitives::does_alias;
use super::{Deallocator, OwnedSet, TransformResult};
use crate::alias::AliasRegistry;
use crate::error::DeallocError;

/// One alias class among a block's escaping values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscapeGroup {
    pub leader: ValueId,
    /// Escaping values of the class with their position among the
    /// escaping values.
    pub escaping: SmallVec<[(usize, ValueId); 2]>,
    /// Owned indicators of the class.
    pub owned: SmallVec<[ValueId; 2]>,
}

impl EscapeGroup {
    /// One owned indicator for one escaping value: no `Retain` needed.
    pub fn is_direct(&self) -> bool {
        self.owned.len() == 1 && self.escaping.len() == 1
    }
}

/// Group `escaping` values and `owned` indicators by alias-class leader.
///
/// Groups come out in order of their first escaping value. Owned
/// indicators whose class has no escaping value are left out.
pub fn plan_escapes(
    aliases: &mut AliasRegistry,
    escaping: &[ValueId],
    owned: &OwnedSet,
) -> Vec<EscapeGroup> {
    let mut by_leader: FxHashMap<ValueId, usize> = FxHashMap::default();
    let mut groups: Vec<EscapeGroup> = Vec::new();
    for (pos, &value) in escaping.iter().enumerate() {
        let leader = aliases.leader(value);
        let idx = *by_leader.entry(leader).or_insert_with(|| {
            groups.push(EscapeGroup {
                leader,
                escaping: SmallVec::new(),
                owned: SmallVec::new(),
            });
            groups.len() - 1
        });
        groups[idx].escaping.push((pos, value));
    }
    for &indicator in owned {
        if let Some(&idx) = by_leader.get(&aliases.leader(indicator)) {
            groups[idx].owned.push(indicator);
        }
    }
    groups
}

impl Deallocator<'_> {
    /// Transform `block`, taking ownership of its buffer arguments if
    /// `owns_inputs` is set.
    pub(super) fn transform_block(
        &mut self,
        func: &mut Function,
        block: BlockId,
        owns_inputs: bool,
    ) -> Result<TransformResult, DeallocError> {
        let Some(terminator) = func.terminator(block) else {
            let parent = func.region(func.block(block).parent).parent;
            return Err(DeallocError::MissingTerminator {
                op: parent,
                name: func.kind(parent).name().to_owned(),
                block,
            });
        };

        let mut owned = OwnedSet::new();
        if owns_inputs {
            let buffer_args: SmallVec<[ValueId; 4]> = func
                .block_args(block)
                .iter()
                .copied()
                .filter(|&arg| func.is_buffer(arg))
                .collect();
            for arg in buffer_args {
                let indicator = func.add_block_arg(block, Type::Ownership);
                owned.insert(indicator);
                self.aliases.set_indicator(arg, indicator);
            }
        }

        let mut result = TransformResult::default();
        let ops = func.ops_without_terminator(block).to_vec();
        for op in ops {
            let op_result = self.transform_op(func, op, &owned)?;
            for released in op_result.released {
                let resolved = owned
                    .iter()
                    .copied()
                    .find(|&indicator| self.aliases.equivalent(released, indicator));
                match resolved {
                    Some(indicator) => {
                        owned.remove(&indicator);
                    }
                    None => {
                        result.released.insert(released);
                    }
                }
            }
            owned.extend(op_result.acquired);
        }

        let escaping: Vec<ValueId> = func
            .operands(terminator)
            .iter()
            .copied()
            .filter(|&v| func.is_buffer(v))
            .collect();

        for &indicator in &owned {
            if escaping
                .iter()
                .any(|&value| self.aliases.equivalent(value, indicator))
            {
                continue;
            }
            let anchor = self.release_point(func, terminator, indicator);
            self.emit_retain(func, InsertPoint::Before(anchor), &[], &[indicator]);
        }

        let mut slots: Vec<Option<ValueId>> = vec![None; escaping.len()];
        for group in plan_escapes(&mut self.aliases, &escaping, &owned) {
            if group.is_direct() {
                slots[group.escaping[0].0] = Some(group.owned[0]);
                continue;
            }
            let retained: SmallVec<[ValueId; 2]> =
                group.escaping.iter().map(|&(_, value)| value).collect();
            let retain = self.emit_retain(
                func,
                InsertPoint::Before(terminator),
                &retained,
                &group.owned,
            );
            for (&(pos, value), &indicator) in group.escaping.iter().zip(func.results(retain)) {
                self.aliases.union(indicator, value);
                slots[pos] = Some(indicator);
            }
        }

        // Positions left without an indicator share one lazily created
        // placeholder.
        let mut null = None;
        for slot in slots {
            let indicator = match (slot, null) {
                (Some(indicator), _) | (None, Some(indicator)) => indicator,
                (None, None) => {
                    let placeholder = self.null_indicator(func, InsertPoint::Before(terminator));
                    null = Some(placeholder);
                    placeholder
                }
            };
            result.acquired.push(indicator);
        }

        tracing::trace!(
            block = block.raw(),
            owned = owned.len(),
            escaping = escaping.len(),
            released = result.released.len(),
            "block transformed"
        );
        Ok(result)
    }

    /// Earliest point before `terminator` at which `indicator` can be
    /// released: past every trailing operation that does not alias it.
    fn release_point(&mut self, func: &Function, terminator: OpId, indicator: ValueId) -> OpId {
        let mut anchor = terminator;
        if !self.config.hoist_releases {
            return anchor;
        }
        while let Some(prev) = func.prev_op(anchor) {
            if does_alias(func, &mut self.aliases, prev, indicator, true) {
                break;
            }
            anchor = prev;
        }
        anchor
    }
}

#[cfg(test)]
mod tests;
