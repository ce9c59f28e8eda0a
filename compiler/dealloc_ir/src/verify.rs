//! Structural verifier.
//!
//! Checks the shape invariants the deallocation transform relies on and
//! preserves. Run it on inputs before transforming and on outputs after; a
//! routine that verified before and fails after is a transform bug.
//!
//! Checked, for every live operation reachable from the root:
//! - each block of each region ends with exactly one terminator;
//! - region-branch constructs have at most one block per region;
//! - `Retain` operand segments match its result count;
//! - an `If` producing results has an else body;
//! - every region-branch edge pairs as many predecessor operands as it has
//!   successor values.

use thiserror::Error;

use crate::function::Function;
use crate::ids::{BlockId, OpId};
use crate::ops::OpKind;
use crate::region_branch::{branch_kind, successor_edges, EdgeTarget};

/// A structural invariant violated by a routine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("block {block:?} does not end with a terminator")]
    MissingTerminator { block: BlockId },

    #[error("terminator `{name}` ({op:?}) is not the last operation of its block")]
    MisplacedTerminator { op: OpId, name: String },

    #[error("region of `{name}` ({op:?}) has more than one block")]
    MultiBlockRegion { op: OpId, name: String },

    #[error("retain ({op:?}) declares {num_retained} retained values but has {operands} operands and {results} results")]
    RetainSegments {
        op: OpId,
        num_retained: u32,
        operands: usize,
        results: usize,
    },

    #[error("if ({op:?}) produces results but has no else body")]
    IfWithoutElse { op: OpId },

    #[error(
        "edge of `{name}` ({op:?}) from {from} to {to} passes {predecessors} values to {successors} receivers"
    )]
    EdgeArity {
        op: OpId,
        name: String,
        from: String,
        to: String,
        predecessors: usize,
        successors: usize,
    },
}

/// Verify every operation nested under the routine's root.
pub fn verify_function(func: &Function) -> Result<(), VerifyError> {
    let mut worklist = vec![func.root()];
    while let Some(op) = worklist.pop() {
        verify_op(func, op)?;
        for &region in func.regions(op) {
            for &block in func.region_blocks(region) {
                verify_block(func, block)?;
                worklist.extend_from_slice(func.block_ops(block));
            }
        }
    }
    Ok(())
}

fn verify_block(func: &Function, block: BlockId) -> Result<(), VerifyError> {
    let ops = func.block_ops(block);
    let Some((&last, body)) = ops.split_last() else {
        return Err(VerifyError::MissingTerminator { block });
    };
    if !func.kind(last).is_terminator() {
        return Err(VerifyError::MissingTerminator { block });
    }
    if let Some(&op) = body.iter().find(|&&op| func.kind(op).is_terminator()) {
        return Err(VerifyError::MisplacedTerminator {
            op,
            name: func.kind(op).name().to_owned(),
        });
    }
    Ok(())
}

fn verify_op(func: &Function, op: OpId) -> Result<(), VerifyError> {
    let kind = func.kind(op);
    match kind {
        OpKind::Retain { num_retained } => {
            let operands = func.operands(op).len();
            let results = func.results(op).len();
            if *num_retained as usize > operands || results != *num_retained as usize {
                return Err(VerifyError::RetainSegments {
                    op,
                    num_retained: *num_retained,
                    operands,
                    results,
                });
            }
        }
        OpKind::If => {
            let else_empty = func
                .regions(op)
                .get(1)
                .map_or(true, |&r| func.region_blocks(r).is_empty());
            if else_empty && !func.results(op).is_empty() {
                return Err(VerifyError::IfWithoutElse { op });
            }
        }
        _ => {}
    }

    if branch_kind(kind).is_none() {
        return Ok(());
    }
    let regions = func.regions(op);
    if regions.iter().any(|&r| func.region_blocks(r).len() > 1) {
        return Err(VerifyError::MultiBlockRegion {
            op,
            name: kind.name().to_owned(),
        });
    }
    let sources = std::iter::once(None).chain((0..regions.len()).map(Some));
    for from in sources {
        for edge in successor_edges(func, op, from) {
            if edge.predecessor_operands.len() != edge.successor_values.len() {
                return Err(VerifyError::EdgeArity {
                    op,
                    name: kind.name().to_owned(),
                    from: from.map_or_else(|| "entry".to_owned(), |i| format!("region {i}")),
                    to: match edge.target {
                        EdgeTarget::Region(i) => format!("region {i}"),
                        EdgeTarget::Parent => "results".to_owned(),
                    },
                    predecessors: edge.predecessor_operands.len(),
                    successors: edge.successor_values.len(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
