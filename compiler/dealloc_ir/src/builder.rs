//! Operation builder with an insertion point.
//!
//! Follows the "position, then emit" pattern of LLVM's `IRBuilder`: every
//! `create`/typed helper links the new operation at the current insertion
//! point. Consecutive operations emitted at the same point keep their
//! emission order.

use crate::function::{Function, InsertPoint};
use crate::ids::{BlockId, OpId, ValueId};
use crate::ops::{EffectSpec, OpKind};
use crate::types::{ElemType, Type};

/// Handles for a freshly built `If`.
#[derive(Clone, Copy, Debug)]
pub struct IfOp {
    pub op: OpId,
    pub then_block: BlockId,
    /// `None` when the `If` was built without an else region body.
    pub else_block: Option<BlockId>,
}

/// Handles for a freshly built `For`.
#[derive(Clone, Debug)]
pub struct ForOp {
    pub op: OpId,
    pub body: BlockId,
    pub induction_var: ValueId,
    pub iter_args: Vec<ValueId>,
}

/// Handles for a freshly built `While`.
#[derive(Clone, Debug)]
pub struct WhileOp {
    pub op: OpId,
    pub before: BlockId,
    pub after: BlockId,
}

/// Operation builder positioned at an [`InsertPoint`].
pub struct Builder<'f> {
    func: &'f mut Function,
    point: InsertPoint,
}

impl<'f> Builder<'f> {
    pub fn new(func: &'f mut Function, point: InsertPoint) -> Self {
        Builder { func, point }
    }

    /// Position at the end of `block`.
    pub fn at_end(func: &'f mut Function, block: BlockId) -> Self {
        Self::new(func, InsertPoint::End(block))
    }

    /// Position immediately before `op`.
    pub fn before(func: &'f mut Function, op: OpId) -> Self {
        Self::new(func, InsertPoint::Before(op))
    }

    /// Position immediately after `op`.
    pub fn after(func: &'f mut Function, op: OpId) -> Self {
        let point = func.point_after(op);
        Self::new(func, point)
    }

    /// Access the function being built.
    pub fn func(&mut self) -> &mut Function {
        &mut *self.func
    }

    pub fn set_point(&mut self, point: InsertPoint) {
        self.point = point;
    }

    /// Create an operation and link it at the insertion point.
    pub fn create(
        &mut self,
        kind: OpKind,
        operands: Vec<ValueId>,
        result_types: &[Type],
        num_regions: usize,
    ) -> OpId {
        let op = self
            .func
            .create_op(kind, operands, result_types, num_regions);
        self.func.insert_op(op, self.point);
        op
    }

    fn create_single(&mut self, kind: OpKind, operands: Vec<ValueId>, ty: Type) -> ValueId {
        let op = self.create(kind, operands, &[ty], 0);
        self.func.results(op)[0]
    }

    // ── Memory ──────────────────────────────────────────────────

    pub fn alloc(&mut self, ty: Type) -> ValueId {
        self.create_single(OpKind::Alloc, Vec::new(), ty)
    }

    pub fn dealloc(&mut self, buffer: ValueId) -> OpId {
        self.create(OpKind::Dealloc, vec![buffer], &[], 0)
    }

    pub fn realloc(&mut self, buffer: ValueId, ty: Type) -> ValueId {
        self.create_single(OpKind::Realloc, vec![buffer], ty)
    }

    // ── Generic operations ──────────────────────────────────────

    /// Emit a generic operation with declared effects and no regions.
    pub fn generic(
        &mut self,
        name: &str,
        operands: Vec<ValueId>,
        result_types: &[Type],
        effects: Vec<EffectSpec>,
    ) -> OpId {
        let kind = OpKind::Generic {
            name: name.to_owned(),
            effects,
        };
        self.create(kind, operands, result_types, 0)
    }

    /// Emit a plain scalar constant.
    pub fn constant(&mut self, elem: ElemType) -> ValueId {
        self.create_single(OpKind::generic("constant"), Vec::new(), Type::Scalar(elem))
    }

    /// Emit a generic operation carrying `num_regions` regions, each with one
    /// empty block. Returns the op and the blocks in region order.
    pub fn opaque(
        &mut self,
        name: &str,
        operands: Vec<ValueId>,
        result_types: &[Type],
        num_regions: usize,
    ) -> (OpId, Vec<BlockId>) {
        let op = self.create(OpKind::generic(name), operands, result_types, num_regions);
        let regions = self.func.regions(op).to_vec();
        let blocks = regions
            .into_iter()
            .map(|region| self.func.create_block(region, &[]))
            .collect();
        (op, blocks)
    }

    // ── Ownership primitives ────────────────────────────────────

    pub fn own(&mut self, buffer: ValueId) -> ValueId {
        self.create_single(OpKind::Own, vec![buffer], Type::Ownership)
    }

    /// Emit `Retain(retained, owned)` producing one indicator per retained value.
    pub fn retain(&mut self, retained: &[ValueId], owned: &[ValueId]) -> OpId {
        let num_retained =
            u32::try_from(retained.len()).unwrap_or_else(|_| panic!("too many retained values"));
        let mut operands = Vec::with_capacity(retained.len() + owned.len());
        operands.extend_from_slice(retained);
        operands.extend_from_slice(owned);
        let types = vec![Type::Ownership; retained.len()];
        self.create(OpKind::Retain { num_retained }, operands, &types, 0)
    }

    pub fn null(&mut self) -> ValueId {
        self.create_single(OpKind::Null, Vec::new(), Type::Ownership)
    }

    // ── Terminators ─────────────────────────────────────────────

    pub fn yield_values(&mut self, values: &[ValueId]) -> OpId {
        self.create(OpKind::Yield, values.to_vec(), &[], 0)
    }

    pub fn return_values(&mut self, values: &[ValueId]) -> OpId {
        self.create(OpKind::Return, values.to_vec(), &[], 0)
    }

    pub fn condition(&mut self, cond: ValueId, forwarded: &[ValueId]) -> OpId {
        let mut operands = Vec::with_capacity(1 + forwarded.len());
        operands.push(cond);
        operands.extend_from_slice(forwarded);
        self.create(OpKind::Condition, operands, &[], 0)
    }

    // ── Structured control flow ─────────────────────────────────

    /// Emit an `If` with an empty then block and, if `with_else`, an empty
    /// else block. Both blocks still need their `Yield`.
    pub fn if_op(&mut self, cond: ValueId, result_types: &[Type], with_else: bool) -> IfOp {
        let op = self.create(OpKind::If, vec![cond], result_types, 2);
        let (then_region, else_region) = (self.func.regions(op)[0], self.func.regions(op)[1]);
        let then_block = self.func.create_block(then_region, &[]);
        let else_block = with_else.then(|| self.func.create_block(else_region, &[]));
        IfOp {
            op,
            then_block,
            else_block,
        }
    }

    /// Emit a `For` over `[lb, ub)` by `step` carrying `inits`.
    ///
    /// The body block takes the induction variable followed by one iter arg
    /// per init and still needs its `Yield`.
    pub fn for_op(&mut self, lb: ValueId, ub: ValueId, step: ValueId, inits: &[ValueId]) -> ForOp {
        let types: Vec<Type> = inits.iter().map(|&v| self.func.value_type(v)).collect();
        let mut operands = vec![lb, ub, step];
        operands.extend_from_slice(inits);
        let op = self.create(OpKind::For, operands, &types, 1);
        let region = self.func.regions(op)[0];
        let iv_ty = self.func.value_type(lb);
        let mut arg_types = Vec::with_capacity(1 + types.len());
        arg_types.push(iv_ty);
        arg_types.extend_from_slice(&types);
        let body = self.func.create_block(region, &arg_types);
        let args = self.func.block_args(body);
        ForOp {
            op,
            body,
            induction_var: args[0],
            iter_args: args[1..].to_vec(),
        }
    }

    /// Emit a `While` carrying `inits` into the before region and
    /// `after_types` from the `Condition` into the after region and results.
    pub fn while_op(&mut self, inits: &[ValueId], after_types: &[Type]) -> WhileOp {
        let before_types: Vec<Type> = inits.iter().map(|&v| self.func.value_type(v)).collect();
        let op = self.create(OpKind::While, inits.to_vec(), after_types, 2);
        let (before_region, after_region) = (self.func.regions(op)[0], self.func.regions(op)[1]);
        let before = self.func.create_block(before_region, &before_types);
        let after = self.func.create_block(after_region, after_types);
        WhileOp { op, before, after }
    }
}

#[cfg(test)]
mod tests;
