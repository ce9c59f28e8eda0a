use pretty_assertions::assert_eq;

use crate::builder::Builder;
use crate::function::Function;
use crate::ops::OpKind;
use crate::types::{ElemType, Type};

use super::*;

fn buf() -> Type {
    Type::buffer(ElemType::F32, 1)
}

#[test]
fn well_formed_routine_verifies() {
    let mut func = Function::new("f", &[buf()]);
    let entry = func.entry_block();
    let arg = func.params()[0];
    let mut b = Builder::at_end(&mut func, entry);
    let cond = b.constant(ElemType::I1);
    let if_op = b.if_op(cond, &[buf()], true);
    let if_result = func.results(if_op.op)[0];
    Builder::at_end(&mut func, entry).return_values(&[if_result]);
    Builder::at_end(&mut func, if_op.then_block).yield_values(&[arg]);
    if let Some(else_block) = if_op.else_block {
        Builder::at_end(&mut func, else_block).yield_values(&[arg]);
    }

    assert_eq!(verify_function(&func), Ok(()));
}

#[test]
fn missing_terminator() {
    let mut func = Function::new("f", &[]);
    let entry = func.entry_block();
    Builder::at_end(&mut func, entry).alloc(buf());
    assert_eq!(
        verify_function(&func),
        Err(VerifyError::MissingTerminator { block: entry })
    );
}

#[test]
fn terminator_in_the_middle() {
    let mut func = Function::new("f", &[]);
    let entry = func.entry_block();
    let mut b = Builder::at_end(&mut func, entry);
    let early = b.return_values(&[]);
    b.return_values(&[]);
    assert_eq!(
        verify_function(&func),
        Err(VerifyError::MisplacedTerminator {
            op: early,
            name: "return".to_owned()
        })
    );
}

#[test]
fn if_with_results_needs_else() {
    let mut func = Function::new("f", &[buf()]);
    let entry = func.entry_block();
    let arg = func.params()[0];
    let mut b = Builder::at_end(&mut func, entry);
    let cond = b.constant(ElemType::I1);
    let if_op = b.if_op(cond, &[buf()], false);
    b.return_values(&[]);
    Builder::at_end(&mut func, if_op.then_block).yield_values(&[arg]);

    assert_eq!(
        verify_function(&func),
        Err(VerifyError::IfWithoutElse { op: if_op.op })
    );
}

#[test]
fn retain_segments_must_match_results() {
    let mut func = Function::new("f", &[buf()]);
    let entry = func.entry_block();
    let arg = func.params()[0];
    let mut b = Builder::at_end(&mut func, entry);
    let bad = b.create(OpKind::Retain { num_retained: 2 }, vec![arg], &[Type::Ownership], 0);
    b.return_values(&[]);

    assert_eq!(
        verify_function(&func),
        Err(VerifyError::RetainSegments {
            op: bad,
            num_retained: 2,
            operands: 1,
            results: 1
        })
    );
}

#[test]
fn loop_region_with_two_blocks() {
    let mut func = Function::new("f", &[buf()]);
    let entry = func.entry_block();
    let arg = func.params()[0];
    let mut b = Builder::at_end(&mut func, entry);
    let lb = b.constant(ElemType::Index);
    let for_op = b.for_op(lb, lb, lb, &[arg]);
    b.return_values(&[]);
    let iter = for_op.iter_args[0];
    Builder::at_end(&mut func, for_op.body).yield_values(&[iter]);
    let region = func.regions(for_op.op)[0];
    let extra = func.create_block(region, &[]);
    Builder::at_end(&mut func, extra).yield_values(&[]);

    assert_eq!(
        verify_function(&func),
        Err(VerifyError::MultiBlockRegion {
            op: for_op.op,
            name: "for".to_owned()
        })
    );
}

#[test]
fn edge_arity_mismatch() {
    let mut func = Function::new("f", &[buf()]);
    let entry = func.entry_block();
    let arg = func.params()[0];
    let mut b = Builder::at_end(&mut func, entry);
    let lb = b.constant(ElemType::Index);
    let for_op = b.for_op(lb, lb, lb, &[arg]);
    b.return_values(&[]);
    let iter = for_op.iter_args[0];
    let null = {
        let mut b = Builder::at_end(&mut func, for_op.body);
        b.null()
    };
    Builder::at_end(&mut func, for_op.body).yield_values(&[iter, null]);

    let err = verify_function(&func).unwrap_err();
    assert!(
        matches!(
            err,
            VerifyError::EdgeArity {
                predecessors: 2,
                successors: 1,
                ..
            }
        ),
        "{err}"
    );
}
