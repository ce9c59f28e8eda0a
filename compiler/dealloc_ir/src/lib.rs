//! Host program representation for the ownership deallocation transform.
//!
//! This crate provides:
//!
//! - **Arenas** ([`Function`], [`Module`]): values, operations, blocks and
//!   regions of one routine, named by [`ValueId`], [`OpId`], [`BlockId`] and
//!   [`RegionId`].
//!
//! - **Operation kinds** ([`OpKind`]): a closed set of memory, control-flow
//!   and ownership operations, plus [`Generic`](OpKind::Generic) operations
//!   that declare their allocate/free effects ([`EffectSpec`]).
//!
//! - **Region-branch edges** ([`successor_edges`]): which values flow from
//!   a construct into its regions and back out, positionally.
//!
//! - **Construction and inspection** ([`Builder`], `Display` for
//!   [`Function`], [`verify_function`]).
//!
//! # Design
//!
//! Regions of structured control flow (`If`, `For`, `While`) hold exactly
//! one block, in the style of MLIR's `scf` dialect. A routine owns all of
//! its entities, so routines are independent and can be transformed on
//! separate threads.

mod builder;
mod function;
mod ids;
mod ops;
mod print;
mod region_branch;
mod types;
mod verify;

pub use builder::{Builder, ForOp, IfOp, WhileOp};
pub use function::{
    BlockData, Function, InsertPoint, Module, OpData, RegionData, ValueData, ValueDef,
};
pub use ids::{BlockId, OpId, RegionId, ValueId};
pub use ops::{EffectKind, EffectSpec, MemoryEffect, OpKind};
pub use region_branch::{branch_kind, successor_edges, BranchKind, EdgeTarget, SuccessorEdge};
pub use types::{ElemType, Type};
pub use verify::{verify_function, VerifyError};
