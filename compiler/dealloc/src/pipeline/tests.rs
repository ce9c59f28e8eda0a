use dealloc_ir::{verify_function, Builder, ElemType, Function, Module, VerifyError};
use pretty_assertions::assert_eq;

use crate::config::DeallocConfig;
use crate::error::DeallocError;
use crate::test_helpers::{buf, test_config};

use super::{deallocate_function, deallocate_module, RoutineOutcome};

/// `a = alloc; return a`
fn returns_fresh(name: &str) -> Function {
    let mut func = Function::new(name, &[]);
    let entry = func.entry_block();
    let mut b = Builder::at_end(&mut func, entry);
    let a = b.alloc(buf());
    b.return_values(&[a]);
    func
}

/// Frees its own parameter.
fn frees_param(name: &str) -> Function {
    let mut func = Function::new(name, &[buf()]);
    let entry = func.entry_block();
    let p = func.params()[0];
    let mut b = Builder::at_end(&mut func, entry);
    b.dealloc(p);
    b.return_values(&[]);
    func
}

fn sample_module() -> Module {
    Module::new(vec![
        returns_fresh("first"),
        frees_param("bad"),
        returns_fresh("last"),
    ])
}

#[test]
fn transformed_routine_verifies() {
    let mut func = returns_fresh("f");

    let report = deallocate_function(&mut func, &test_config());

    assert!(report.is_ok(), "{report:?}");
    assert_eq!(verify_function(&func), Ok(()));
}

#[test]
fn verifier_catches_malformed_output() {
    // An `if` with results but no else body only surfaces once verified.
    let build = || {
        let mut func = Function::new("f", &[]);
        let entry = func.entry_block();
        let mut b = Builder::at_end(&mut func, entry);
        let c = b.constant(ElemType::I1);
        let if_op = b.if_op(c, &[buf()], false);
        b.return_values(&[]);
        let mut then_b = Builder::at_end(&mut func, if_op.then_block);
        let a = then_b.alloc(buf());
        then_b.yield_values(&[a]);
        func
    };

    let mut checked = build();
    let err = deallocate_function(&mut checked, &test_config());
    assert!(
        matches!(
            err,
            Err(DeallocError::Verification(VerifyError::IfWithoutElse { .. }))
        ),
        "{err:?}"
    );

    let mut unchecked = build();
    let config = test_config().with_verify(false);
    assert!(deallocate_function(&mut unchecked, &config).is_ok());
}

#[test]
fn module_reports_every_routine_in_order() {
    let mut module = sample_module();

    let report = deallocate_module(&mut module, &test_config());

    let names: Vec<&str> = report.outcomes.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["first", "bad", "last"]);
    assert!(matches!(report.outcomes[0].1, RoutineOutcome::Transformed(_)));
    assert!(matches!(
        report.outcomes[1].1,
        RoutineOutcome::Failed(DeallocError::InvalidRealloc { .. })
    ));
    assert!(matches!(report.outcomes[2].1, RoutineOutcome::Transformed(_)));
    assert!(!report.is_success());

    let errors: Vec<(&str, &str)> = report.errors().map(|(name, err)| (name, err.code())).collect();
    assert_eq!(errors, [("bad", "E7007")]);
    assert_eq!(report.stats().owns, 2);
}

#[test]
fn fail_fast_skips_the_remaining_routines() {
    let mut module = sample_module();
    let config = test_config().with_fail_fast(true);

    let report = deallocate_module(&mut module, &config);

    assert!(matches!(report.outcomes[0].1, RoutineOutcome::Transformed(_)));
    assert!(matches!(report.outcomes[1].1, RoutineOutcome::Failed(_)));
    assert_eq!(report.outcomes[2].1, RoutineOutcome::Skipped);
    // Skipped routines are left untouched.
    assert_eq!(module.functions[2], returns_fresh("last"));
}

#[test]
fn parallel_run_matches_sequential_run() {
    let mut sequential = sample_module();
    let mut parallel = sample_module();
    let parallel_config = DeallocConfig {
        parallel: true,
        ..test_config()
    };

    let sequential_report = deallocate_module(&mut sequential, &test_config());
    let parallel_report = deallocate_module(&mut parallel, &parallel_config);

    assert_eq!(parallel_report, sequential_report);
    assert_eq!(parallel.functions[0], sequential.functions[0]);
    assert_eq!(parallel.functions[2], sequential.functions[2]);
}

#[test]
fn empty_module_succeeds() {
    let mut module = Module::default();

    let report = deallocate_module(&mut module, &test_config());

    assert!(report.outcomes.is_empty());
    assert!(report.is_success());
    assert_eq!(report.stats(), crate::DeallocStats::default());
}
