//! Shared helpers for the transform's unit tests.

use dealloc_ir::{BlockId, ElemType, Function, OpId, OpKind, Type, ValueDef, ValueId};

use crate::config::DeallocConfig;

/// A rank-1 `f32` buffer type.
pub(crate) fn buf() -> Type {
    Type::buffer(ElemType::F32, 1)
}

/// The operation defining `value`.
///
/// # Panics
///
/// Panics if `value` is a block argument.
pub(crate) fn def_op(func: &Function, value: ValueId) -> OpId {
    match func.value(value).def {
        ValueDef::OpResult { op, .. } => op,
        ValueDef::BlockArg { .. } => panic!("{value:?} is a block argument"),
    }
}

/// Sequential config with verification on.
pub(crate) fn test_config() -> DeallocConfig {
    crate::init_tracing();
    DeallocConfig::sequential().with_verify(true)
}

/// Live operations whose kind prints as `name`.
pub(crate) fn ops_named(func: &Function, name: &str) -> Vec<OpId> {
    func.live_ops()
        .filter(|&op| func.kind(op).name() == name)
        .collect()
}

/// Number of live operations whose kind prints as `name`.
pub(crate) fn count_named(func: &Function, name: &str) -> usize {
    ops_named(func, name).len()
}

/// Kind names of the operations in `block`, in order.
pub(crate) fn block_shape(func: &Function, block: BlockId) -> Vec<String> {
    func.block_ops(block)
        .iter()
        .map(|&op| func.kind(op).name().to_owned())
        .collect()
}

/// Retained values and consumed indicators of a `Retain`.
pub(crate) fn retain_parts(func: &Function, op: OpId) -> (Vec<ValueId>, Vec<ValueId>) {
    let OpKind::Retain { num_retained } = func.kind(op) else {
        panic!("{op:?} is not a retain");
    };
    let (retained, owned) = func.operands(op).split_at(*num_retained as usize);
    (retained.to_vec(), owned.to_vec())
}

/// The indicator an `Own` created for `buffer`.
pub(crate) fn own_of(func: &Function, buffer: ValueId) -> ValueId {
    ops_named(func, "own")
        .into_iter()
        .find(|&op| func.operands(op) == [buffer])
        .map(|op| func.results(op)[0])
        .unwrap_or_else(|| panic!("no own for {buffer:?}"))
}
