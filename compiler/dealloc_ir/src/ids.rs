//! Arena ID newtypes.
//!
//! Every entity of a routine (value, operation, block, region) lives in an
//! arena owned by [`Function`](crate::Function) and is named by a `u32`
//! index. IDs are allocated sequentially and never reused: erasing an
//! operation retires its index, it does not free it.

/// Macro to define arena ID newtypes.
///
/// Each generated type has:
/// - a private `u32` field, `#[repr(transparent)]`
/// - `new()`, `raw()`, `index()` accessors
/// - `Debug` rendering as `Prefix(raw)`
macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident => $prefix:literal),* $(,)?) => { $(
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an ID from a raw index.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw `u32` value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Get the index as `usize` (for indexing into arenas).
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({})", $prefix, self.0)
            }
        }
    )* };
}

define_id!(
    /// An SSA value: an operation result or a block argument.
    ValueId => "Value",
    /// An operation in the routine arena.
    OpId => "Op",
    /// A block: arguments, operations, and a trailing terminator.
    BlockId => "Block",
    /// A region: an ordered list of blocks owned by one operation.
    RegionId => "Region",
);

/// Convert an arena length into the next sequential ID.
///
/// # Panics
///
/// Panics if the arena exceeds `u32::MAX` entries.
pub(crate) fn next_raw(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("arena size exceeds u32::MAX"))
}
