//! Branch-region transform for `If`, `For`, and `While`.
//!
//! # Algorithm
//!
//! 1. Transform each region's block with ownership of its buffer arguments.
//!    A loop region that releases anything is rejected: the released buffer
//!    lives outside the loop and would be freed on every iteration.
//! 2. If the two branches of an `If` disagree on what they release, the
//!    branch that keeps a released buffer must yield it; its slot in that
//!    branch's acquired list is patched with the buffer's recorded
//!    indicator ("implicit capture").
//! 3. Each region's acquired indicators are appended to its terminator.
//! 4. Every buffer operand gets an extra indicator operand: its own owned
//!    indicator if this is its last use and it has not been released yet,
//!    a `Null` placeholder otherwise.
//! 5. The construct is rebuilt with one extra ownership result per buffer
//!    result, regions moved over, uses rewired, and the old one erased.
//! 6. Aliases are unioned along every successor edge, between buffer
//!    arguments and their indicator arguments, and between buffer results
//!    and their indicator results.

use std::collections::BTreeSet;

use dealloc_ir::{
    successor_edges, BranchKind, Builder, Function, InsertPoint, OpId, RegionId, Type, ValueId,
};
use smallvec::SmallVec;

use super::primitives::does_alias;
use super::{Deallocator, OwnedSet, TransformResult};
use crate::error::DeallocError;

impl Deallocator<'_> {
    pub(super) fn transform_region_branch(
        &mut self,
        func: &mut Function,
        op: OpId,
        branch: BranchKind,
        owned: &OwnedSet,
    ) -> Result<TransformResult, DeallocError> {
        let name = func.kind(op).name().to_owned();
        let regions: SmallVec<[RegionId; 2]> = func.regions(op).iter().copied().collect();
        if regions.iter().any(|&r| func.region_blocks(r).len() > 1) {
            return Err(DeallocError::MultiBlockRegion { op, name });
        }

        let mut original_num_args: SmallVec<[usize; 2]> = SmallVec::new();
        let mut results: SmallVec<[TransformResult; 2]> = SmallVec::new();
        for &region in &regions {
            original_num_args.push(func.region_args(region).len());
            let Some(block) = func.single_block(region) else {
                results.push(TransformResult::default());
                continue;
            };
            let region_result = self.transform_block(func, block, true)?;
            if !region_result.released.is_empty() && branch == BranchKind::Loop {
                return Err(DeallocError::CrossLoopRelease { op, name });
            }
            results.push(region_result);
        }

        let mut released = BTreeSet::new();
        let mut displaced = Vec::new();
        if results.iter().any(|r| !r.released.is_empty()) {
            released =
                self.reconcile_implicit_capture(func, op, &name, &mut results, &mut displaced)?;
        }

        for (&region, region_result) in regions.iter().zip(&results) {
            let Some(block) = func.single_block(region) else {
                continue;
            };
            if let Some(terminator) = func.terminator(block) {
                func.append_operands(terminator, &region_result.acquired);
            }
        }
        for value in displaced {
            self.erase_if_dead_retain(func, value);
        }

        let extra_operands = self.transfer_operands(func, op, owned, &mut released);
        let num_results = func.results(op).len();
        let new_op = rebuild_with_indicators(func, op, extra_operands);

        let new_results = func.results(new_op).to_vec();
        let (kept, retained) = new_results.split_at(num_results);
        self.union_edges(func, new_op, None);
        for (index, &region) in regions.iter().enumerate() {
            self.union_edges(func, new_op, Some(index));
            let args = func.region_args(region);
            let (original, appended) = args.split_at(original_num_args[index].min(args.len()));
            for (&arg, &indicator) in original
                .iter()
                .filter(|&&arg| func.is_buffer(arg))
                .zip(appended)
            {
                self.aliases.union(arg, indicator);
            }
        }
        for (&result, &indicator) in kept
            .iter()
            .filter(|&&result| func.is_buffer(result))
            .zip(retained)
        {
            self.aliases.union(result, indicator);
        }

        tracing::trace!(
            op = new_op.raw(),
            kind = name.as_str(),
            released = released.len(),
            retained = retained.len(),
            "region branch transformed"
        );
        Ok(TransformResult {
            released,
            acquired: retained.to_vec(),
        })
    }

    /// Reconcile the release sets of the two branches of an `If`.
    ///
    /// Returns the union of both sets. Every acquired slot that gets patched
    /// has its previous indicator pushed onto `displaced`.
    fn reconcile_implicit_capture(
        &mut self,
        func: &Function,
        op: OpId,
        name: &str,
        results: &mut [TransformResult],
        displaced: &mut Vec<ValueId>,
    ) -> Result<BTreeSet<ValueId>, DeallocError> {
        let regions = func.regions(op);
        let ([then_result, else_result], [then_region, else_region]) = (results, regions) else {
            return Err(DeallocError::CaptureWithoutElse {
                op,
                name: name.to_owned(),
            });
        };
        if then_result.released == else_result.released {
            return Ok(then_result.released.clone());
        }

        for &value in then_result.released.difference(&else_result.released) {
            displaced.push(self.capture_from_branch(
                func,
                op,
                name,
                *else_region,
                value,
                &mut else_result.acquired,
            )?);
        }
        for &value in else_result.released.difference(&then_result.released) {
            displaced.push(self.capture_from_branch(
                func,
                op,
                name,
                *then_region,
                value,
                &mut then_result.acquired,
            )?);
        }

        let mut released = then_result.released.clone();
        released.extend(else_result.released.iter().copied());
        Ok(released)
    }

    /// Make the branch in `region` hand back the indicator of `value`,
    /// which the other branch releases. Returns the indicator it replaces.
    fn capture_from_branch(
        &mut self,
        func: &Function,
        op: OpId,
        name: &str,
        region: RegionId,
        value: ValueId,
        acquired: &mut [ValueId],
    ) -> Result<ValueId, DeallocError> {
        let Some(&block) = func.region_blocks(region).first() else {
            return Err(DeallocError::CaptureWithoutElse {
                op,
                name: name.to_owned(),
            });
        };
        let not_yielded = || DeallocError::ReleasedValueNotYielded {
            op,
            name: name.to_owned(),
            value,
        };
        let operands = func
            .terminator(block)
            .map(|terminator| func.operands(terminator))
            .unwrap_or_default();
        let position = operands
            .iter()
            .position(|&operand| operand == value)
            .ok_or_else(not_yielded)?;
        let slot = operands[..position]
            .iter()
            .filter(|&&operand| func.is_buffer(operand))
            .count();
        let slot = acquired.get_mut(slot).ok_or_else(not_yielded)?;
        let indicator =
            self.aliases
                .take_indicator(value)
                .ok_or_else(|| DeallocError::MissingIndicator {
                    op,
                    name: name.to_owned(),
                    value,
                })?;
        Ok(std::mem::replace(slot, indicator))
    }

    /// Pick one extra indicator operand per buffer operand of `op`.
    ///
    /// A transferred indicator is added to `released`.
    fn transfer_operands(
        &mut self,
        func: &mut Function,
        op: OpId,
        owned: &OwnedSet,
        released: &mut BTreeSet<ValueId>,
    ) -> Vec<ValueId> {
        let buffer_operands: SmallVec<[ValueId; 4]> = func
            .operands(op)
            .iter()
            .copied()
            .filter(|&operand| func.is_buffer(operand))
            .collect();

        let mut extra = Vec::with_capacity(buffer_operands.len());
        for operand in buffer_operands {
            let transferable = self.transferable_indicator(func, op, operand, owned, released);
            match transferable {
                Some(indicator) => {
                    released.insert(indicator);
                    self.stats.transfers += 1;
                    extra.push(indicator);
                }
                None => extra.push(self.null_indicator(func, InsertPoint::Before(op))),
            }
        }
        extra
    }

    /// The owned indicator of `operand`, if ownership can move into `op`.
    fn transferable_indicator(
        &mut self,
        func: &Function,
        op: OpId,
        operand: ValueId,
        owned: &OwnedSet,
        released: &BTreeSet<ValueId>,
    ) -> Option<ValueId> {
        if !self.config.transfer_operand_ownership {
            return None;
        }
        let indicator = owned
            .iter()
            .copied()
            .find(|&indicator| self.aliases.equivalent(indicator, operand))?;
        if released
            .iter()
            .any(|&value| self.aliases.equivalent(value, operand))
        {
            return None;
        }
        self.is_last_use(func, op, operand).then_some(indicator)
    }

    /// Returns `true` if nothing from `op` to the end of its block aliases
    /// `value`, ignoring `op`'s own operands.
    fn is_last_use(&mut self, func: &Function, op: OpId, value: ValueId) -> bool {
        let mut candidate = Some(op);
        while let Some(current) = candidate {
            if does_alias(func, &mut self.aliases, current, value, current != op) {
                return false;
            }
            candidate = func.next_op(current);
        }
        true
    }

    /// Union predecessor operands with successor values along every edge
    /// leaving `from` (the parent entry when `None`).
    fn union_edges(&mut self, func: &Function, op: OpId, from: Option<usize>) {
        for edge in successor_edges(func, op, from) {
            for (&pred, &succ) in edge.predecessor_operands.iter().zip(&edge.successor_values) {
                self.aliases.union(pred, succ);
            }
        }
    }
}

/// Replace `op` by a construct of the same kind with `extra_operands`
/// appended, one extra ownership result per buffer result, and `op`'s
/// regions. Uses of the old results are rewired to the new ones.
fn rebuild_with_indicators(func: &mut Function, op: OpId, extra_operands: Vec<ValueId>) -> OpId {
    let old_results = func.results(op).to_vec();
    let mut result_types: Vec<Type> = old_results.iter().map(|&r| func.value_type(r)).collect();
    let num_buffers = result_types.iter().filter(|ty| ty.is_buffer()).count();
    result_types.extend(std::iter::repeat(Type::Ownership).take(num_buffers));

    let mut operands = func.operands(op).to_vec();
    operands.extend(extra_operands);
    let kind = func.kind(op).clone();

    let new_op = Builder::before(func, op).create(kind, operands, &result_types, 0);
    func.move_regions(op, new_op);
    let new_results = func.results(new_op).to_vec();
    for (&old, &new) in old_results.iter().zip(&new_results) {
        func.replace_all_uses(old, new);
    }
    func.erase_op(op);
    new_op
}
