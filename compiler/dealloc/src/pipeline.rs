//! Entry points: one routine, or every routine of a module.
//!
//! Routines are independent. Each one gets its own [`Deallocator`] and alias
//! registry, so a module can be transformed on a thread pool without any
//! shared mutable state.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use dealloc_ir::{verify_function, Function, Module, ValueId};
use rayon::prelude::*;

use crate::config::DeallocConfig;
use crate::error::DeallocError;
use crate::transform::{DeallocStats, Deallocator};

/// Outcome of transforming one routine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutineReport {
    pub stats: DeallocStats,
    /// Indicators of the buffers the routine returns, one per buffer
    /// operand of its `Return`.
    pub returned: Vec<ValueId>,
}

/// Per-routine result of a module run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoutineOutcome {
    Transformed(RoutineReport),
    Failed(DeallocError),
    /// Not attempted because another routine failed first (fail-fast).
    Skipped,
}

/// Outcomes of a module run, in routine order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleReport {
    pub outcomes: Vec<(String, RoutineOutcome)>,
}

impl ModuleReport {
    /// Returns `true` if every routine was transformed.
    pub fn is_success(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, outcome)| matches!(outcome, RoutineOutcome::Transformed(_)))
    }

    /// Stats summed over the transformed routines.
    pub fn stats(&self) -> DeallocStats {
        let mut total = DeallocStats::default();
        for (_, outcome) in &self.outcomes {
            if let RoutineOutcome::Transformed(report) = outcome {
                total += report.stats;
            }
        }
        total
    }

    /// Failed routines with their errors.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &DeallocError)> + '_ {
        self.outcomes.iter().filter_map(|(name, outcome)| match outcome {
            RoutineOutcome::Failed(err) => Some((name.as_str(), err)),
            _ => None,
        })
    }
}

/// Make buffer ownership in `func` explicit.
///
/// On error the routine is left partially rewritten and should be
/// discarded.
pub fn deallocate_function(
    func: &mut Function,
    config: &DeallocConfig,
) -> Result<RoutineReport, DeallocError> {
    let mut deallocator = Deallocator::new(config);
    let root = func.root();
    let result = match deallocator.transform_op(func, root, &BTreeSet::new()) {
        Ok(result) => result,
        Err(err) => {
            tracing::debug!(function = func.name(), code = err.code(), "transform failed: {err}");
            return Err(err);
        }
    };
    if config.verify {
        verify_function(func)?;
    }

    let stats = deallocator.stats();
    tracing::debug!(
        function = func.name(),
        owns = stats.owns,
        retains = stats.retains,
        nulls = stats.nulls,
        transfers = stats.transfers,
        "ownership indicators inserted"
    );
    Ok(RoutineReport {
        stats,
        returned: result.acquired,
    })
}

/// Transform every routine of `module`.
///
/// Routines run in parallel when `config.parallel` is set. A failing
/// routine never stops the others that are already running; with
/// `config.fail_fast`, routines that have not started yet are skipped.
pub fn deallocate_module(module: &mut Module, config: &DeallocConfig) -> ModuleReport {
    let failed = AtomicBool::new(false);
    let run = |func: &mut Function| {
        let name = func.name().to_owned();
        if config.fail_fast && failed.load(Ordering::Acquire) {
            return (name, RoutineOutcome::Skipped);
        }
        let outcome = match deallocate_function(func, config) {
            Ok(report) => RoutineOutcome::Transformed(report),
            Err(err) => {
                failed.store(true, Ordering::Release);
                RoutineOutcome::Failed(err)
            }
        };
        (name, outcome)
    };

    let outcomes = if config.parallel {
        let pool = rayon::ThreadPoolBuilder::new().build_scoped(rayon::ThreadBuilder::run, |pool| {
            pool.install(|| module.functions.par_iter_mut().map(run).collect::<Vec<_>>())
        });
        match pool {
            Ok(outcomes) => outcomes,
            Err(e) => {
                tracing::warn!("failed to create thread pool ({e}), running sequentially");
                module.functions.iter_mut().map(run).collect()
            }
        }
    } else {
        module.functions.iter_mut().map(run).collect()
    };

    let report = ModuleReport { outcomes };
    tracing::debug!(
        routines = report.outcomes.len(),
        failed = report.errors().count(),
        "module transformed"
    );
    report
}

#[cfg(test)]
mod tests;
