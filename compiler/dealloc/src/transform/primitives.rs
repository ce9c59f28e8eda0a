//! Ownership primitives and the aliasing-use query.

use dealloc_ir::{Builder, Function, InsertPoint, OpId, OpKind, ValueDef, ValueId};

use super::Deallocator;
use crate::alias::AliasRegistry;

impl Deallocator<'_> {
    /// `MakeOwned`: emit `Own(buffer)` at `point` and record it as the
    /// buffer's indicator.
    pub(super) fn make_owned(
        &mut self,
        func: &mut Function,
        point: InsertPoint,
        buffer: ValueId,
    ) -> ValueId {
        let indicator = Builder::new(func, point).own(buffer);
        self.aliases.set_indicator(buffer, indicator);
        self.stats.owns += 1;
        indicator
    }

    /// Emit `Retain(retained, owned)` at `point`.
    pub(super) fn emit_retain(
        &mut self,
        func: &mut Function,
        point: InsertPoint,
        retained: &[ValueId],
        owned: &[ValueId],
    ) -> OpId {
        self.stats.retains += 1;
        Builder::new(func, point).retain(retained, owned)
    }

    /// `NullIndicator`: emit a "no ownership" placeholder at `point`.
    pub(super) fn null_indicator(&mut self, func: &mut Function, point: InsertPoint) -> ValueId {
        self.stats.nulls += 1;
        Builder::new(func, point).null()
    }

    /// Erase the `Retain` defining `value` if it consumes no indicators and
    /// none of its results is used.
    pub(super) fn erase_if_dead_retain(&mut self, func: &mut Function, value: ValueId) {
        let ValueDef::OpResult { op, .. } = func.value(value).def else {
            return;
        };
        let consumes_nothing = match func.kind(op) {
            OpKind::Retain { num_retained } => *num_retained as usize == func.operands(op).len(),
            _ => false,
        };
        let unused = func.results(op).iter().all(|&r| func.uses(r).is_empty());
        if consumes_nothing && !func.op(op).erased && unused {
            func.erase_op(op);
            self.stats.retains = self.stats.retains.saturating_sub(1);
        }
    }
}

/// Returns `true` if `op` reads or defines a value aliasing `value`,
/// directly or through any operation nested in its regions.
///
/// With `consider_operands` off, only `op`'s own operands are ignored;
/// nested operations are always checked in full.
pub(super) fn does_alias(
    func: &Function,
    aliases: &mut AliasRegistry,
    op: OpId,
    value: ValueId,
    consider_operands: bool,
) -> bool {
    if consider_operands
        && func
            .operands(op)
            .iter()
            .any(|&operand| aliases.equivalent(value, operand))
    {
        return true;
    }
    if func
        .results(op)
        .iter()
        .any(|&result| aliases.equivalent(value, result))
    {
        return true;
    }
    func.regions(op).iter().any(|&region| {
        func.region_blocks(region).iter().any(|&block| {
            func.block_ops(block)
                .iter()
                .any(|&nested| does_alias(func, aliases, nested, value, true))
        })
    })
}
