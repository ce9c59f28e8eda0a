//! Errors reported by the deallocation transform.
//!
//! Every error is fatal for the routine being transformed: it means the
//! input breaks the ownership discipline the transform relies on, so there
//! is nothing to recover locally. The routine is left partially rewritten
//! and must be discarded by the caller.
//!
//! Codes follow the compiler's `E####` scheme; the `E7xxx` range belongs to
//! ownership/deallocation.

use dealloc_ir::{BlockId, OpId, ValueId, VerifyError};
use thiserror::Error;

/// A routine-fatal ownership violation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeallocError {
    /// A loop region releases a buffer defined outside of it.
    #[error("`{name}` ({op:?}): can't implicitly capture across loop boundaries; use an explicit iter arg instead")]
    CrossLoopRelease { op: OpId, name: String },

    /// One branch of an `If` releases a buffer but there is no else body to
    /// hand the matching indicator back.
    #[error("`{name}` ({op:?}): cannot implicitly capture from an if without else")]
    CaptureWithoutElse { op: OpId, name: String },

    /// One branch releases `value` and the other branch does not yield it.
    #[error("`{name}` ({op:?}): released value {value:?} not yielded on other branch")]
    ReleasedValueNotYielded {
        op: OpId,
        name: String,
        value: ValueId,
    },

    /// No indicator is on record for a released value.
    #[error("`{name}` ({op:?}): no ownership indicator found for {value:?}; same value released twice?")]
    MissingIndicator {
        op: OpId,
        name: String,
        value: ValueId,
    },

    /// A block nested in an opaque operation acquires or releases buffers.
    #[error("`{name}` ({op:?}): block unexpectedly released or returned an alloc")]
    OpaqueRegionOwnership { op: OpId, name: String },

    /// An opaque operation with regions produces a buffer.
    #[error("`{name}` ({op:?}): operation with opaque regions must not return a buffer")]
    OpaqueRegionReturnsBuffer { op: OpId, name: String },

    /// The routine body releases a buffer it never owned.
    #[error("`{name}` ({op:?}): invalid realloc of a buffer the routine does not own")]
    InvalidRealloc { op: OpId, name: String },

    /// A region-branch construct has a region with more than one block.
    #[error("`{name}` ({op:?}): regions with more than one block are not supported")]
    MultiBlockRegion { op: OpId, name: String },

    /// A block the transform has to extend has no terminator.
    #[error("`{name}` ({op:?}): block {block:?} has no terminator")]
    MissingTerminator {
        op: OpId,
        name: String,
        block: BlockId,
    },

    /// The structural verifier rejected the transformed routine.
    #[error("verification failed: {0}")]
    Verification(#[from] VerifyError),
}

impl DeallocError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            DeallocError::CrossLoopRelease { .. } => "E7001",
            DeallocError::CaptureWithoutElse { .. } => "E7002",
            DeallocError::ReleasedValueNotYielded { .. } => "E7003",
            DeallocError::MissingIndicator { .. } => "E7004",
            DeallocError::OpaqueRegionOwnership { .. } => "E7005",
            DeallocError::OpaqueRegionReturnsBuffer { .. } => "E7006",
            DeallocError::InvalidRealloc { .. } => "E7007",
            DeallocError::MultiBlockRegion { .. } => "E7008",
            DeallocError::MissingTerminator { .. } => "E7009",
            DeallocError::Verification(_) => "E7010",
        }
    }

    /// The operation the error is attached to, if any.
    pub fn op(&self) -> Option<OpId> {
        match self {
            DeallocError::CrossLoopRelease { op, .. }
            | DeallocError::CaptureWithoutElse { op, .. }
            | DeallocError::ReleasedValueNotYielded { op, .. }
            | DeallocError::MissingIndicator { op, .. }
            | DeallocError::OpaqueRegionOwnership { op, .. }
            | DeallocError::OpaqueRegionReturnsBuffer { op, .. }
            | DeallocError::InvalidRealloc { op, .. }
            | DeallocError::MultiBlockRegion { op, .. }
            | DeallocError::MissingTerminator { op, .. } => Some(*op),
            DeallocError::Verification(
                VerifyError::MisplacedTerminator { op, .. }
                | VerifyError::MultiBlockRegion { op, .. }
                | VerifyError::RetainSegments { op, .. }
                | VerifyError::IfWithoutElse { op }
                | VerifyError::EdgeArity { op, .. },
            ) => Some(*op),
            DeallocError::Verification(VerifyError::MissingTerminator { .. }) => None,
        }
    }
}
