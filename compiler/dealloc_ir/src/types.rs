//! Value types.
//!
//! The transform only distinguishes three shapes of type: scalars (never
//! tracked), buffers (tracked through alias classes), and the ownership
//! indicator marker type it introduces itself.

use std::fmt;

/// Element type of a scalar or of a buffer's elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ElemType {
    I1,
    I8,
    I16,
    I32,
    I64,
    Index,
    F16,
    F32,
    F64,
}

impl ElemType {
    /// Textual spelling used by the printer.
    pub const fn name(self) -> &'static str {
        match self {
            ElemType::I1 => "i1",
            ElemType::I8 => "i8",
            ElemType::I16 => "i16",
            ElemType::I32 => "i32",
            ElemType::I64 => "i64",
            ElemType::Index => "index",
            ElemType::F16 => "f16",
            ElemType::F32 => "f32",
            ElemType::F64 => "f64",
        }
    }
}

/// Type of an SSA value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    /// A plain scalar. Untouched by the transform.
    Scalar(ElemType),
    /// A dynamically sized memory allocation of `rank` dimensions.
    Buffer { elem: ElemType, rank: u32 },
    /// Ownership indicator: "the holder must release or forward this".
    Ownership,
}

impl Type {
    /// Shorthand for a buffer type.
    pub const fn buffer(elem: ElemType, rank: u32) -> Self {
        Type::Buffer { elem, rank }
    }

    /// Returns `true` for buffer types.
    #[inline]
    pub const fn is_buffer(self) -> bool {
        matches!(self, Type::Buffer { .. })
    }

    /// Returns `true` for the ownership indicator type.
    #[inline]
    pub const fn is_ownership(self) -> bool {
        matches!(self, Type::Ownership)
    }

    /// Element type of a buffer, or the scalar itself.
    ///
    /// The ownership type has no element type.
    pub const fn element_type(self) -> Option<ElemType> {
        match self {
            Type::Scalar(elem) | Type::Buffer { elem, .. } => Some(elem),
            Type::Ownership => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Scalar(elem) => f.write_str(elem.name()),
            Type::Buffer { elem, rank } => {
                f.write_str("buffer<")?;
                for _ in 0..*rank {
                    f.write_str("?x")?;
                }
                write!(f, "{}>", elem.name())
            }
            Type::Ownership => f.write_str("ownership"),
        }
    }
}

#[cfg(test)]
mod tests;
