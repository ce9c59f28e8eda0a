//! Routine arena: values, operations, blocks and regions of one routine.
//!
//! A [`Function`] owns every entity of a single routine. Entities refer to
//! each other by ID; nothing is reference counted or shared across routines,
//! so separate routines can be mutated on separate threads.
//!
//! # Mutation model
//!
//! Erasing an operation unlinks it from its block and retires its ID; the
//! arena slot stays behind marked as erased. Replacing uses is an explicit
//! scan over live operations' operand lists.

use crate::ids::{next_raw, BlockId, OpId, RegionId, ValueId};
use crate::ops::OpKind;
use crate::types::Type;

// ── Arena entries ───────────────────────────────────────────────────

/// Where a value is defined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueDef {
    /// Result `index` of operation `op`.
    OpResult { op: OpId, index: u32 },
    /// Argument `index` of block `block`.
    BlockArg { block: BlockId, index: u32 },
}

/// Arena entry for a value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueData {
    pub ty: Type,
    pub def: ValueDef,
}

/// Arena entry for an operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct OpData {
    pub kind: OpKind,
    pub operands: Vec<ValueId>,
    pub results: Vec<ValueId>,
    pub regions: Vec<RegionId>,
    /// Block this operation is linked into, `None` while detached.
    pub parent: Option<BlockId>,
    pub erased: bool,
}

/// Arena entry for a block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockData {
    pub args: Vec<ValueId>,
    /// Operations in execution order; the last one is the terminator.
    pub ops: Vec<OpId>,
    pub parent: RegionId,
}

/// Arena entry for a region.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionData {
    pub blocks: Vec<BlockId>,
    pub parent: OpId,
}

/// Position at which a new operation is linked into a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InsertPoint {
    /// Immediately before an existing operation.
    Before(OpId),
    /// At the end of a block (after its terminator, if any).
    End(BlockId),
}

// ── Function ────────────────────────────────────────────────────────

/// One routine: a root `Func` operation and everything nested in it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Function {
    values: Vec<ValueData>,
    ops: Vec<OpData>,
    blocks: Vec<BlockData>,
    regions: Vec<RegionData>,
    root: OpId,
}

impl Function {
    /// Create a routine with an empty entry block taking `params`.
    ///
    /// The entry block has no terminator yet; callers append the body and a
    /// `Return` through a [`Builder`](crate::Builder).
    pub fn new(name: impl Into<String>, params: &[Type]) -> Self {
        let mut func = Function {
            values: Vec::new(),
            ops: Vec::new(),
            blocks: Vec::new(),
            regions: Vec::new(),
            root: OpId::new(0),
        };
        let root = func.create_op(OpKind::Func { name: name.into() }, Vec::new(), &[], 1);
        func.root = root;
        let body = func.ops[root.index()].regions[0];
        func.create_block(body, params);
        func
    }

    /// The root `Func` operation.
    #[inline]
    pub fn root(&self) -> OpId {
        self.root
    }

    /// Routine name (from the root `Func`).
    pub fn name(&self) -> &str {
        match &self.op(self.root).kind {
            OpKind::Func { name } => name.as_str(),
            other => other.name(),
        }
    }

    /// The entry block of the routine body.
    pub fn entry_block(&self) -> BlockId {
        let body = self.op(self.root).regions[0];
        self.regions[body.index()].blocks[0]
    }

    /// Routine parameters (entry block arguments).
    pub fn params(&self) -> &[ValueId] {
        &self.block(self.entry_block()).args
    }

    // ── Queries ─────────────────────────────────────────────────

    #[inline]
    pub fn value(&self, value: ValueId) -> &ValueData {
        &self.values[value.index()]
    }

    #[inline]
    pub fn value_type(&self, value: ValueId) -> Type {
        self.values[value.index()].ty
    }

    /// Returns `true` if `value` has a buffer type.
    #[inline]
    pub fn is_buffer(&self, value: ValueId) -> bool {
        self.value_type(value).is_buffer()
    }

    #[inline]
    pub fn op(&self, op: OpId) -> &OpData {
        &self.ops[op.index()]
    }

    #[inline]
    pub fn kind(&self, op: OpId) -> &OpKind {
        &self.ops[op.index()].kind
    }

    #[inline]
    pub fn operands(&self, op: OpId) -> &[ValueId] {
        &self.ops[op.index()].operands
    }

    #[inline]
    pub fn results(&self, op: OpId) -> &[ValueId] {
        &self.ops[op.index()].results
    }

    #[inline]
    pub fn regions(&self, op: OpId) -> &[RegionId] {
        &self.ops[op.index()].regions
    }

    #[inline]
    pub fn block(&self, block: BlockId) -> &BlockData {
        &self.blocks[block.index()]
    }

    #[inline]
    pub fn block_args(&self, block: BlockId) -> &[ValueId] {
        &self.blocks[block.index()].args
    }

    #[inline]
    pub fn block_ops(&self, block: BlockId) -> &[OpId] {
        &self.blocks[block.index()].ops
    }

    #[inline]
    pub fn region(&self, region: RegionId) -> &RegionData {
        &self.regions[region.index()]
    }

    #[inline]
    pub fn region_blocks(&self, region: RegionId) -> &[BlockId] {
        &self.regions[region.index()].blocks
    }

    /// The single block of `region`, if it has exactly one.
    pub fn single_block(&self, region: RegionId) -> Option<BlockId> {
        match self.region_blocks(region) {
            [block] => Some(*block),
            _ => None,
        }
    }

    /// Argument list of the first block of `region` (empty for empty regions).
    pub fn region_args(&self, region: RegionId) -> &[ValueId] {
        match self.region_blocks(region).first() {
            Some(&block) => self.block_args(block),
            None => &[],
        }
    }

    /// The terminator of `block`: its last operation, if that is a terminator.
    pub fn terminator(&self, block: BlockId) -> Option<OpId> {
        self.block_ops(block)
            .last()
            .copied()
            .filter(|&op| self.kind(op).is_terminator())
    }

    /// Operations of `block` except a trailing terminator.
    pub fn ops_without_terminator(&self, block: BlockId) -> &[OpId] {
        let ops = self.block_ops(block);
        match self.terminator(block) {
            Some(_) => &ops[..ops.len() - 1],
            None => ops,
        }
    }

    /// The operation immediately before `op` in its block.
    pub fn prev_op(&self, op: OpId) -> Option<OpId> {
        let (ops, pos) = self.position(op)?;
        pos.checked_sub(1).map(|prev| ops[prev])
    }

    /// The operation immediately after `op` in its block.
    pub fn next_op(&self, op: OpId) -> Option<OpId> {
        let (ops, pos) = self.position(op)?;
        ops.get(pos + 1).copied()
    }

    /// Insertion point directly after `op`.
    ///
    /// Repeated insertions at the returned point keep their creation order.
    pub fn point_after(&self, op: OpId) -> InsertPoint {
        match (self.next_op(op), self.op(op).parent) {
            (Some(next), _) => InsertPoint::Before(next),
            (None, Some(block)) => InsertPoint::End(block),
            (None, None) => InsertPoint::Before(op),
        }
    }

    /// Iterate over live operations in arena order.
    pub fn live_ops(&self) -> impl Iterator<Item = OpId> + '_ {
        self.ops
            .iter()
            .enumerate()
            .filter(|(_, data)| !data.erased)
            .map(|(idx, _)| OpId::new(next_raw(idx)))
    }

    /// Every `(op, operand index)` pair reading `value`.
    pub fn uses(&self, value: ValueId) -> Vec<(OpId, usize)> {
        self.live_ops()
            .flat_map(|op| {
                self.operands(op)
                    .iter()
                    .enumerate()
                    .filter(move |&(_, &operand)| operand == value)
                    .map(move |(idx, _)| (op, idx))
            })
            .collect()
    }

    fn position(&self, op: OpId) -> Option<(&[OpId], usize)> {
        let block = self.op(op).parent?;
        let ops = self.block_ops(block);
        ops.iter().position(|&o| o == op).map(|pos| (ops, pos))
    }

    // ── Construction ────────────────────────────────────────────

    fn push_value(&mut self, ty: Type, def: ValueDef) -> ValueId {
        let id = ValueId::new(next_raw(self.values.len()));
        self.values.push(ValueData { ty, def });
        id
    }

    /// Create a detached operation with fresh results and empty regions.
    pub fn create_op(
        &mut self,
        kind: OpKind,
        operands: Vec<ValueId>,
        result_types: &[Type],
        num_regions: usize,
    ) -> OpId {
        let op = OpId::new(next_raw(self.ops.len()));
        let results = result_types
            .iter()
            .enumerate()
            .map(|(index, &ty)| {
                self.push_value(
                    ty,
                    ValueDef::OpResult {
                        op,
                        index: next_raw(index),
                    },
                )
            })
            .collect();
        let regions = (0..num_regions)
            .map(|_| {
                let region = RegionId::new(next_raw(self.regions.len()));
                self.regions.push(RegionData {
                    blocks: Vec::new(),
                    parent: op,
                });
                region
            })
            .collect();
        self.ops.push(OpData {
            kind,
            operands,
            results,
            regions,
            parent: None,
            erased: false,
        });
        op
    }

    /// Append a new block with arguments of `arg_types` to `region`.
    pub fn create_block(&mut self, region: RegionId, arg_types: &[Type]) -> BlockId {
        let block = BlockId::new(next_raw(self.blocks.len()));
        self.blocks.push(BlockData {
            args: Vec::new(),
            ops: Vec::new(),
            parent: region,
        });
        self.regions[region.index()].blocks.push(block);
        for &ty in arg_types {
            self.add_block_arg(block, ty);
        }
        block
    }

    /// Append an argument of type `ty` to `block`.
    pub fn add_block_arg(&mut self, block: BlockId, ty: Type) -> ValueId {
        let index = next_raw(self.blocks[block.index()].args.len());
        let arg = self.push_value(ty, ValueDef::BlockArg { block, index });
        self.blocks[block.index()].args.push(arg);
        arg
    }

    /// Link a detached operation into a block.
    ///
    /// # Panics
    ///
    /// Panics if `op` is already linked, or if `Before` names an operation
    /// that is not linked into a block.
    pub fn insert_op(&mut self, op: OpId, point: InsertPoint) {
        assert!(
            self.op(op).parent.is_none(),
            "insert_op: {op:?} is already linked"
        );
        let (block, pos) = match point {
            InsertPoint::Before(anchor) => {
                let block = self
                    .op(anchor)
                    .parent
                    .unwrap_or_else(|| panic!("insert_op: anchor {anchor:?} is detached"));
                let pos = self.blocks[block.index()]
                    .ops
                    .iter()
                    .position(|&o| o == anchor)
                    .unwrap_or_else(|| panic!("insert_op: anchor {anchor:?} not in its block"));
                (block, pos)
            }
            InsertPoint::End(block) => (block, self.blocks[block.index()].ops.len()),
        };
        self.blocks[block.index()].ops.insert(pos, op);
        self.ops[op.index()].parent = Some(block);
    }

    // ── Mutation ────────────────────────────────────────────────

    /// Append operands to `op`.
    pub fn append_operands(&mut self, op: OpId, operands: &[ValueId]) {
        self.ops[op.index()].operands.extend_from_slice(operands);
    }

    /// Replace every read of `old` in live operations with `new`.
    pub fn replace_all_uses(&mut self, old: ValueId, new: ValueId) {
        for data in self.ops.iter_mut().filter(|data| !data.erased) {
            for operand in &mut data.operands {
                if *operand == old {
                    *operand = new;
                }
            }
        }
    }

    /// Move every region of `from` onto `to`, in order.
    ///
    /// `from` is left without regions.
    pub fn move_regions(&mut self, from: OpId, to: OpId) {
        let regions = std::mem::take(&mut self.ops[from.index()].regions);
        for &region in &regions {
            self.regions[region.index()].parent = to;
        }
        self.ops[to.index()].regions.extend(regions);
    }

    /// Unlink `op` from its block and retire it together with everything
    /// nested in its regions.
    pub fn erase_op(&mut self, op: OpId) {
        if let Some(block) = self.ops[op.index()].parent.take() {
            self.blocks[block.index()].ops.retain(|&o| o != op);
        }
        let mut worklist = vec![op];
        while let Some(current) = worklist.pop() {
            self.ops[current.index()].erased = true;
            for &region in &self.ops[current.index()].regions {
                for &block in &self.regions[region.index()].blocks {
                    worklist.extend_from_slice(&self.blocks[block.index()].ops);
                }
            }
        }
    }
}

// ── Module ──────────────────────────────────────────────────────────

/// A program: independent routines, transformed one at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Module {
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(functions: Vec<Function>) -> Self {
        Module { functions }
    }
}
