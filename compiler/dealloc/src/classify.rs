//! Operation classification for dispatch.
//!
//! Every operation falls into exactly one [`OpClass`], checked in order:
//! region-branch construct, allocate/free effects, routine, opaque regions,
//! plain. Declared effects that contain neither an allocation nor a free
//! fall through to the later classes.

use dealloc_ir::{branch_kind, BranchKind, EffectKind, Function, OpId, OpKind, ValueId};
use smallvec::SmallVec;

/// How the transform treats an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpClass {
    /// `If`, `For`, `While`.
    RegionBranch(BranchKind),
    /// Allocates and/or frees buffers.
    MemoryEffects {
        allocs: SmallVec<[ValueId; 2]>,
        frees: SmallVec<[ValueId; 2]>,
    },
    /// The root `Func` of a routine.
    Routine,
    /// Carries regions the transform knows nothing about.
    OpaqueRegions,
    /// No ownership semantics; may alias its buffer operands.
    Plain,
}

/// Classify `op`.
pub fn classify(func: &Function, op: OpId) -> OpClass {
    let kind = func.kind(op);
    if let Some(branch) = branch_kind(kind) {
        return OpClass::RegionBranch(branch);
    }

    let mut allocs = SmallVec::new();
    let mut frees = SmallVec::new();
    for effect in kind.memory_effects(func.operands(op), func.results(op)) {
        match effect.kind {
            EffectKind::Allocate => allocs.push(effect.value),
            EffectKind::Free => frees.push(effect.value),
        }
    }
    if !allocs.is_empty() || !frees.is_empty() {
        return OpClass::MemoryEffects { allocs, frees };
    }

    if matches!(kind, OpKind::Func { .. }) {
        OpClass::Routine
    } else if !func.regions(op).is_empty() {
        OpClass::OpaqueRegions
    } else {
        OpClass::Plain
    }
}
