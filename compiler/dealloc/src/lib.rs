//! Ownership-tracking deallocation transform.
//!
//! Rewrites a routine in which buffers are allocated, aliased, and freed
//! implicitly into one where every buffer's ownership is an explicit value:
//!
//! - `Own(buffer)` creates an ownership indicator for a fresh allocation.
//! - `Retain(values | indicators)` consolidates the indicators owned at a
//!   point into one indicator per escaping value; with no values it simply
//!   releases its indicators.
//! - `Null` stands in where no ownership is passed, keeping operand and
//!   result lists uniform across branches.
//!
//! Every block, region-branch construct, and routine body is extended with
//! indicator arguments, operands, and results. A later lowering turns
//! indicators reaching a release point into actual frees.
//!
//! # Entry Points
//!
//! - [`deallocate_function`]: one routine.
//! - [`deallocate_module`]: every routine of a module, optionally on a
//!   thread pool, collected into a [`ModuleReport`].
//!
//! # Design
//!
//! Aliasing is tracked by a union-find over value IDs ([`AliasRegistry`])
//! that only ever merges. Operation kinds are dispatched through a closed
//! classification ([`OpClass`]); there is no open interface to implement.

mod alias;
mod classify;
mod config;
mod error;
mod pipeline;
mod transform;

#[cfg(test)]
mod test_helpers;

use std::sync::Once;

pub use alias::AliasRegistry;
pub use classify::{classify, OpClass};
pub use config::DeallocConfig;
pub use error::DeallocError;
pub use pipeline::{
    deallocate_function, deallocate_module, ModuleReport, RoutineOutcome, RoutineReport,
};
pub use transform::{plan_escapes, DeallocStats, EscapeGroup, TransformResult};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Call this early in tests or main to enable tracing output.
/// Set `RUST_LOG=dealloc=debug` to see debug output, or `RUST_LOG=dealloc=trace`
/// for every block and construct.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
