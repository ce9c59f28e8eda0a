//! Operation dispatch.
//!
//! Routes every operation to the handler for its [`OpClass`]. This is the
//! recursion point of the transform: region-branch constructs, routines,
//! and opaque regions all come back here through the block transform, so
//! the stack is grown on demand for deeply nested input.

use dealloc_ir::{BlockId, Function, OpId, ValueId};
use smallvec::SmallVec;

use super::{Deallocator, OwnedSet, TransformResult};
use crate::classify::{classify, OpClass};
use crate::error::DeallocError;

/// Minimum stack space to keep available before recursing (100KB).
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
#[cfg(not(target_arch = "wasm32"))]
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

impl Deallocator<'_> {
    /// Transform `op`, given the indicators its enclosing block owns right
    /// before it.
    pub(crate) fn transform_op(
        &mut self,
        func: &mut Function,
        op: OpId,
        owned: &OwnedSet,
    ) -> Result<TransformResult, DeallocError> {
        ensure_sufficient_stack(|| {
            match classify(func, op) {
                OpClass::RegionBranch(branch) => {
                    self.transform_region_branch(func, op, branch, owned)
                }
                OpClass::MemoryEffects { allocs, frees } => {
                    Ok(self.transform_memory_effects(func, op, &allocs, frees))
                }
                OpClass::Routine => self.transform_routine(func, op),
                OpClass::OpaqueRegions => self.transform_opaque_regions(func, op),
                OpClass::Plain => {
                    self.alias_plain(func, op);
                    Ok(TransformResult::default())
                }
            }
        })
    }

    /// `Own` every allocated buffer right after `op`; report every freed one
    /// as released.
    fn transform_memory_effects(
        &mut self,
        func: &mut Function,
        op: OpId,
        allocs: &[ValueId],
        frees: SmallVec<[ValueId; 2]>,
    ) -> TransformResult {
        let point = func.point_after(op);
        let acquired = allocs
            .iter()
            .map(|&buffer| self.make_owned(func, point, buffer))
            .collect();
        TransformResult {
            released: frees.into_iter().collect(),
            acquired,
        }
    }

    /// Transform a routine body without ownership of its parameters.
    ///
    /// The acquired indicators are the ones the routine hands to its caller.
    /// The `Return` itself is left as is.
    fn transform_routine(
        &mut self,
        func: &mut Function,
        op: OpId,
    ) -> Result<TransformResult, DeallocError> {
        let name = func.name().to_owned();
        tracing::debug!(function = name.as_str(), "inserting ownership indicators");

        let body = func
            .regions(op)
            .first()
            .and_then(|&region| func.single_block(region));
        let Some(body) = body else {
            return Err(DeallocError::MultiBlockRegion { op, name });
        };
        let result = self.transform_block(func, body, false)?;
        if !result.released.is_empty() {
            return Err(DeallocError::InvalidRealloc { op, name });
        }
        Ok(TransformResult {
            released: Default::default(),
            acquired: result.acquired,
        })
    }

    /// Transform every block of an operation with opaque regions. Such
    /// operations must be ownership-transparent.
    fn transform_opaque_regions(
        &mut self,
        func: &mut Function,
        op: OpId,
    ) -> Result<TransformResult, DeallocError> {
        let opaque_error = |func: &Function, returns_buffer: bool| {
            let name = func.kind(op).name().to_owned();
            if returns_buffer {
                DeallocError::OpaqueRegionReturnsBuffer { op, name }
            } else {
                DeallocError::OpaqueRegionOwnership { op, name }
            }
        };
        if func.results(op).iter().any(|&result| func.is_buffer(result)) {
            return Err(opaque_error(func, true));
        }

        let blocks: Vec<BlockId> = func
            .regions(op)
            .iter()
            .flat_map(|&region| func.region_blocks(region).iter().copied())
            .collect();
        for block in blocks {
            let result = self.transform_block(func, block, false)?;
            if !result.acquired.is_empty() || !result.released.is_empty() {
                return Err(opaque_error(func, false));
            }
        }
        Ok(TransformResult::default())
    }

    /// Treat every buffer result as a possible view of every buffer operand
    /// with the same element type.
    fn alias_plain(&mut self, func: &Function, op: OpId) {
        let buffers = |values: &[ValueId]| -> SmallVec<[ValueId; 4]> {
            values
                .iter()
                .copied()
                .filter(|&value| func.is_buffer(value))
                .collect()
        };
        let operands = buffers(func.operands(op));
        for result in buffers(func.results(op)) {
            let elem = func.value_type(result).element_type();
            for &operand in &operands {
                if func.value_type(operand).element_type() == elem {
                    self.aliases.union(result, operand);
                }
            }
        }
    }
}
