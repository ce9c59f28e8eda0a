use pretty_assertions::assert_eq;

use crate::builder::Builder;
use crate::function::Function;
use crate::types::{ElemType, Type};

fn buf() -> Type {
    Type::buffer(ElemType::F32, 1)
}

#[test]
fn straight_line_routine() {
    let mut func = Function::new("f", &[buf()]);
    let entry = func.entry_block();
    let mut b = Builder::at_end(&mut func, entry);
    let alloc = b.alloc(buf());
    b.own(alloc);
    b.return_values(&[alloc]);

    assert_eq!(
        func.to_string(),
        "func @f(%0: buffer<?xf32>) {\n\
         \x20 %1 = alloc() : buffer<?xf32>\n\
         \x20 %2 = own(%1) : ownership\n\
         \x20 return(%1)\n\
         }\n"
    );
}

#[test]
fn retain_separates_retained_from_owned() {
    let mut func = Function::new("f", &[buf()]);
    let entry = func.entry_block();
    let arg = func.params()[0];
    let mut b = Builder::at_end(&mut func, entry);
    let ind = b.null();
    b.retain(&[arg], &[ind]);

    let text = func.to_string();
    assert!(text.contains("%2 = retain(%0 | %1) : ownership"), "{text}");
}

#[test]
fn nested_regions() {
    let mut func = Function::new("g", &[]);
    let entry = func.entry_block();
    let mut b = Builder::at_end(&mut func, entry);
    let cond = b.constant(ElemType::I1);
    let if_op = b.if_op(cond, &[], true);
    b.return_values(&[]);
    Builder::at_end(&mut func, if_op.then_block).yield_values(&[]);
    if let Some(else_block) = if_op.else_block {
        Builder::at_end(&mut func, else_block).yield_values(&[]);
    }

    assert_eq!(
        func.to_string(),
        "func @g() {\n\
         \x20 %0 = constant() : i1\n\
         \x20 if(%0) {\n\
         \x20 ^bb1:\n\
         \x20   yield()\n\
         \x20 }, {\n\
         \x20 ^bb2:\n\
         \x20   yield()\n\
         \x20 }\n\
         \x20 return()\n\
         }\n"
    );
}

#[test]
fn empty_region() {
    let mut func = Function::new("g", &[]);
    let entry = func.entry_block();
    let mut b = Builder::at_end(&mut func, entry);
    let cond = b.constant(ElemType::I1);
    let if_op = b.if_op(cond, &[], false);
    Builder::at_end(&mut func, if_op.then_block).yield_values(&[]);

    assert!(func.to_string().contains("  }, {}\n"));
}
