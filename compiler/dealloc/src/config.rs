//! Transform configuration.

/// Configuration for the deallocation transform.
///
/// The defaults produce the full transform. The switches exist to isolate
/// individual rewrites when debugging a miscompile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeallocConfig {
    /// Hand a buffer operand's indicator to a region-branch construct when
    /// the operand is not used again afterwards. When off, every buffer
    /// operand is paired with a null indicator.
    pub transfer_operand_ownership: bool,

    /// Place the release of a non-escaping buffer right after its last
    /// aliasing operation. When off, releases go right before the terminator.
    pub hoist_releases: bool,

    /// Transform the routines of a module on a rayon thread pool.
    pub parallel: bool,

    /// Once a routine fails, report routines that have not started yet as
    /// skipped instead of transforming them.
    pub fail_fast: bool,

    /// Run the structural verifier on every transformed routine.
    /// Defaults to on in debug builds.
    pub verify: bool,
}

impl Default for DeallocConfig {
    fn default() -> Self {
        Self {
            transfer_operand_ownership: true,
            hoist_releases: true,
            parallel: true,
            fail_fast: false,
            verify: cfg!(debug_assertions),
        }
    }
}

impl DeallocConfig {
    /// Default configuration, transforming routines one after another.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Default::default()
        }
    }

    /// Set the fail-fast policy.
    #[must_use]
    pub fn with_fail_fast(self, fail_fast: bool) -> Self {
        Self { fail_fast, ..self }
    }

    /// Set whether the verifier runs after the transform.
    #[must_use]
    pub fn with_verify(self, verify: bool) -> Self {
        Self { verify, ..self }
    }
}
