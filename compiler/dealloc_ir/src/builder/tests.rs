use pretty_assertions::assert_eq;

use crate::function::{Function, ValueDef};
use crate::ops::OpKind;
use crate::types::{ElemType, Type};

use super::*;

fn buf() -> Type {
    Type::buffer(ElemType::F32, 1)
}

#[test]
fn emission_order_is_preserved_at_one_point() {
    let mut func = Function::new("f", &[]);
    let entry = func.entry_block();
    let mut b = Builder::at_end(&mut func, entry);
    let a = b.alloc(buf());
    let c = b.alloc(buf());
    b.return_values(&[a, c]);

    let kinds: Vec<&str> = func
        .block_ops(entry)
        .iter()
        .map(|&op| func.kind(op).name())
        .collect();
    assert_eq!(kinds, vec!["alloc", "alloc", "return"]);
}

#[test]
fn after_inserts_in_creation_order() {
    let mut func = Function::new("f", &[]);
    let entry = func.entry_block();
    let mut b = Builder::at_end(&mut func, entry);
    let a = b.alloc(buf());
    b.return_values(&[]);
    let ValueDef::OpResult { op: alloc, .. } = func.value(a).def else {
        panic!("alloc result is not an op result");
    };

    let mut b = Builder::after(&mut func, alloc);
    b.own(a);
    b.null();

    let kinds: Vec<&str> = func
        .block_ops(entry)
        .iter()
        .map(|&op| func.kind(op).name())
        .collect();
    assert_eq!(kinds, vec!["alloc", "own", "null", "return"]);
}

#[test]
fn retain_segments() {
    let mut func = Function::new("f", &[buf()]);
    let entry = func.entry_block();
    let arg = func.params()[0];
    let mut b = Builder::at_end(&mut func, entry);
    let ind = b.null();
    let retain = b.retain(&[arg], &[ind]);

    assert_eq!(func.kind(retain), &OpKind::Retain { num_retained: 1 });
    assert_eq!(func.operands(retain), &[arg, ind]);
    assert_eq!(func.results(retain).len(), 1);
    assert_eq!(func.value_type(func.results(retain)[0]), Type::Ownership);
}

#[test]
fn if_without_else_has_empty_else_region() {
    let mut func = Function::new("f", &[]);
    let entry = func.entry_block();
    let mut b = Builder::at_end(&mut func, entry);
    let cond = b.constant(ElemType::I1);
    let if_op = b.if_op(cond, &[], false);

    assert!(if_op.else_block.is_none());
    let else_region = func.regions(if_op.op)[1];
    assert!(func.region_blocks(else_region).is_empty());
    assert_eq!(func.single_block(func.regions(if_op.op)[0]), Some(if_op.then_block));
}

#[test]
fn for_body_args_follow_inits() {
    let mut func = Function::new("f", &[buf()]);
    let entry = func.entry_block();
    let arg = func.params()[0];
    let mut b = Builder::at_end(&mut func, entry);
    let lb = b.constant(ElemType::Index);
    let ub = b.constant(ElemType::Index);
    let step = b.constant(ElemType::Index);
    let for_op = b.for_op(lb, ub, step, &[arg]);

    assert_eq!(func.operands(for_op.op), &[lb, ub, step, arg]);
    assert_eq!(func.results(for_op.op).len(), 1);
    assert_eq!(func.value_type(for_op.induction_var), Type::Scalar(ElemType::Index));
    assert_eq!(for_op.iter_args.len(), 1);
    assert_eq!(func.value_type(for_op.iter_args[0]), buf());
}

#[test]
fn while_regions() {
    let mut func = Function::new("f", &[buf()]);
    let entry = func.entry_block();
    let arg = func.params()[0];
    let mut b = Builder::at_end(&mut func, entry);
    let w = b.while_op(&[arg], &[buf()]);

    assert_eq!(func.block_args(w.before).len(), 1);
    assert_eq!(func.block_args(w.after).len(), 1);
    assert_eq!(func.results(w.op).len(), 1);
}

#[test]
fn opaque_creates_one_block_per_region() {
    let mut func = Function::new("f", &[]);
    let entry = func.entry_block();
    let mut b = Builder::at_end(&mut func, entry);
    let (op, blocks) = b.opaque("test.region", Vec::new(), &[], 2);

    assert_eq!(blocks.len(), 2);
    assert_eq!(func.regions(op).len(), 2);
    assert_eq!(func.kind(op).name(), "test.region");
}
