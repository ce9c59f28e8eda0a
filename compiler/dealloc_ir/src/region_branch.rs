//! Region-branch control flow: which regions an operation may enter, and
//! which values flow along each edge.
//!
//! Region-branch constructs are operations whose semantics is one or more
//! single-block regions executed either as mutually exclusive alternatives
//! (`If`) or repeatedly (`For`, `While`). Control enters a region from the
//! parent operation or from a region's terminator, and leaves to another
//! region or back to the parent's results.
//!
//! Every edge pairs the *predecessor operands* (what the source passes) with
//! the *successor values* (block arguments or parent results receiving them),
//! positionally. Trailing ownership indicators appended by the deallocation
//! transform flow along the same edges, so edges are computed from the
//! current operand/argument/result lists rather than from a fixed arity.

use smallvec::SmallVec;

use crate::function::Function;
use crate::ids::{OpId, ValueId};
use crate::ops::OpKind;

/// How the regions of a region-branch construct execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BranchKind {
    /// Exactly one of the regions runs, once.
    Conditional,
    /// Regions may run zero or many times.
    Loop,
}

/// Returns the branch kind if `kind` is a region-branch construct.
pub fn branch_kind(kind: &OpKind) -> Option<BranchKind> {
    match kind {
        OpKind::If => Some(BranchKind::Conditional),
        OpKind::For | OpKind::While => Some(BranchKind::Loop),
        _ => None,
    }
}

/// Destination of a control-flow edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeTarget {
    /// Region `n` of the construct.
    Region(usize),
    /// Back to the parent operation (its results).
    Parent,
}

/// One control-flow edge of a region-branch construct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuccessorEdge {
    pub target: EdgeTarget,
    /// Values passed by the source of the edge.
    pub predecessor_operands: Vec<ValueId>,
    /// Values receiving them at the target.
    pub successor_values: Vec<ValueId>,
}

impl SuccessorEdge {
    fn new(target: EdgeTarget, predecessor_operands: &[ValueId], successor_values: &[ValueId]) -> Self {
        SuccessorEdge {
            target,
            predecessor_operands: predecessor_operands.to_vec(),
            successor_values: successor_values.to_vec(),
        }
    }
}

/// Outgoing edges of a region-branch construct.
///
/// `from = None` asks for the edges taken on entry from the parent;
/// `from = Some(i)` asks for the edges leaving region `i` through its
/// terminator. Empty regions and non-region-branch operations have no edges.
pub fn successor_edges(func: &Function, op: OpId, from: Option<usize>) -> SmallVec<[SuccessorEdge; 2]> {
    let operands = func.operands(op);
    let results = func.results(op);
    let regions = func.regions(op);
    let region_args = |index: usize| regions.get(index).map_or(&[][..], |&r| func.region_args(r));
    // Operands of the terminator of region `index`.
    let terminator_operands = |index: usize| {
        regions
            .get(index)
            .and_then(|&r| func.region_blocks(r).first())
            .and_then(|&block| func.terminator(block))
            .map(|term| func.operands(term))
    };

    let mut edges = SmallVec::new();
    match (func.kind(op), from) {
        (OpKind::If, None) => {
            edges.push(SuccessorEdge::new(EdgeTarget::Region(0), &[], &[]));
            let else_empty = regions.get(1).map_or(true, |&r| func.region_blocks(r).is_empty());
            let target = if else_empty {
                EdgeTarget::Parent
            } else {
                EdgeTarget::Region(1)
            };
            edges.push(SuccessorEdge::new(target, &[], &[]));
        }
        (OpKind::If, Some(index)) => {
            if let Some(yielded) = terminator_operands(index) {
                edges.push(SuccessorEdge::new(EdgeTarget::Parent, yielded, results));
            }
        }
        (OpKind::For, None) => {
            let inits = operands.get(3..).unwrap_or(&[]);
            let iter_args = region_args(0).get(1..).unwrap_or(&[]);
            edges.push(SuccessorEdge::new(EdgeTarget::Region(0), inits, iter_args));
            edges.push(SuccessorEdge::new(EdgeTarget::Parent, inits, results));
        }
        (OpKind::For, Some(0)) => {
            if let Some(yielded) = terminator_operands(0) {
                let iter_args = region_args(0).get(1..).unwrap_or(&[]);
                edges.push(SuccessorEdge::new(EdgeTarget::Region(0), yielded, iter_args));
                edges.push(SuccessorEdge::new(EdgeTarget::Parent, yielded, results));
            }
        }
        (OpKind::While, None) => {
            edges.push(SuccessorEdge::new(EdgeTarget::Region(0), operands, region_args(0)));
        }
        (OpKind::While, Some(0)) => {
            if let Some(cond_operands) = terminator_operands(0) {
                let forwarded = cond_operands.get(1..).unwrap_or(&[]);
                edges.push(SuccessorEdge::new(EdgeTarget::Region(1), forwarded, region_args(1)));
                edges.push(SuccessorEdge::new(EdgeTarget::Parent, forwarded, results));
            }
        }
        (OpKind::While, Some(1)) => {
            if let Some(yielded) = terminator_operands(1) {
                edges.push(SuccessorEdge::new(EdgeTarget::Region(0), yielded, region_args(0)));
            }
        }
        _ => {}
    }
    edges
}
