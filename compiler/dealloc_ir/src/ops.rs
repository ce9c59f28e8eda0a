//! Operation kinds and declared memory effects.
//!
//! The set of operation kinds is closed. Everything the transform does not
//! know by name is a [`OpKind::Generic`] operation, which declares its
//! allocate/free effects explicitly and may carry opaque regions.

use smallvec::SmallVec;

use crate::ids::ValueId;

// ── Effects ─────────────────────────────────────────────────────────

/// An allocate or free effect declared on a [`OpKind::Generic`] operation.
///
/// Effects name operand/result slots rather than values so that the kind
/// stays valid when the operation is rebuilt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectSpec {
    /// Result `n` is a freshly allocated buffer.
    AllocatesResult(u32),
    /// Operand `n` is freed by this operation.
    FreesOperand(u32),
}

/// Kind of a resolved memory effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Allocate,
    Free,
}

/// A memory effect resolved against an operation's operands and results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemoryEffect {
    pub kind: EffectKind,
    pub value: ValueId,
}

// ── Operation kinds ─────────────────────────────────────────────────

/// The kind of an operation.
///
/// Operand/result/region conventions per kind:
///
/// | Kind | Operands | Results | Regions |
/// |---|---|---|---|
/// | `Func` | – | – | 1 (entry block args = params) |
/// | `Return` | returned values | – | – |
/// | `Alloc` | dynamic sizes | 1 buffer | – |
/// | `Dealloc` | 1 buffer | – | – |
/// | `Realloc` | buffer, sizes | 1 buffer | – |
/// | `If` | cond | any | then, else (else may be empty) |
/// | `For` | lb, ub, step, inits | one per init | body (iv, iter args) |
/// | `While` | inits | one per forwarded value | before, after |
/// | `Yield` | yielded values | – | – |
/// | `Condition` | cond, forwarded values | – | – |
/// | `Own` | 1 buffer | 1 ownership | – |
/// | `Retain` | retained values, owned indicators | 1 ownership per retained | – |
/// | `Null` | – | 1 ownership | – |
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum OpKind {
    /// A routine. Its single region holds the body.
    Func { name: String },
    /// Routine terminator.
    Return,

    Alloc,
    Dealloc,
    /// Frees operand 0 and allocates result 0 in one step.
    Realloc,

    /// Two mutually exclusive alternatives.
    If,
    /// Counted loop with loop-carried values.
    For,
    /// Loop with a `before` region deciding continuation and an `after` body.
    While,
    /// Terminator of `If`/`For` regions and of the `While` after-region.
    Yield,
    /// Terminator of the `While` before-region.
    Condition,

    // ── Ownership primitives (inserted by the transform) ────────
    /// `MakeOwned`: fresh indicator for a newly allocated buffer.
    Own,
    /// `Retain`: consolidates owned indicators into one indicator per
    /// retained value. The first `num_retained` operands are retained values,
    /// the rest are the owned indicators consumed.
    Retain { num_retained: u32 },
    /// `NullIndicator`: "no ownership" placeholder.
    Null,

    /// Any other operation. Without effects and regions it is a plain value
    /// operation (possibly a view or cast of its buffer operands).
    Generic {
        name: String,
        effects: Vec<EffectSpec>,
    },
}

impl OpKind {
    /// Shorthand for a generic operation without declared effects.
    pub fn generic(name: impl Into<String>) -> Self {
        OpKind::Generic {
            name: name.into(),
            effects: Vec::new(),
        }
    }

    /// Textual name used by the printer and in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            OpKind::Func { .. } => "func",
            OpKind::Return => "return",
            OpKind::Alloc => "alloc",
            OpKind::Dealloc => "dealloc",
            OpKind::Realloc => "realloc",
            OpKind::If => "if",
            OpKind::For => "for",
            OpKind::While => "while",
            OpKind::Yield => "yield",
            OpKind::Condition => "condition",
            OpKind::Own => "own",
            OpKind::Retain { .. } => "retain",
            OpKind::Null => "null",
            OpKind::Generic { name, .. } => name.as_str(),
        }
    }

    /// Returns `true` for block terminators.
    pub const fn is_terminator(&self) -> bool {
        matches!(self, OpKind::Return | OpKind::Yield | OpKind::Condition)
    }

    /// Resolve the declared allocate/free effects against concrete values.
    ///
    /// Effects naming an out-of-range slot are ignored.
    pub fn memory_effects(
        &self,
        operands: &[ValueId],
        results: &[ValueId],
    ) -> SmallVec<[MemoryEffect; 2]> {
        let alloc = |slot: usize| {
            results.get(slot).map(|&value| MemoryEffect {
                kind: EffectKind::Allocate,
                value,
            })
        };
        let free = |slot: usize| {
            operands.get(slot).map(|&value| MemoryEffect {
                kind: EffectKind::Free,
                value,
            })
        };
        match self {
            OpKind::Alloc => alloc(0).into_iter().collect(),
            OpKind::Dealloc => free(0).into_iter().collect(),
            OpKind::Realloc => free(0).into_iter().chain(alloc(0)).collect(),
            OpKind::Generic { effects, .. } => effects
                .iter()
                .filter_map(|effect| match *effect {
                    EffectSpec::AllocatesResult(slot) => alloc(slot as usize),
                    EffectSpec::FreesOperand(slot) => free(slot as usize),
                })
                .collect(),
            _ => SmallVec::new(),
        }
    }
}
