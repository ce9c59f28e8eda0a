use pretty_assertions::assert_eq;

use super::*;

#[test]
fn buffer_predicates() {
    let buf = Type::buffer(ElemType::F32, 2);
    assert!(buf.is_buffer());
    assert!(!buf.is_ownership());
    assert!(!Type::Scalar(ElemType::I64).is_buffer());
    assert!(Type::Ownership.is_ownership());
}

#[test]
fn element_type_or_self() {
    assert_eq!(
        Type::buffer(ElemType::F64, 1).element_type(),
        Some(ElemType::F64)
    );
    assert_eq!(
        Type::Scalar(ElemType::Index).element_type(),
        Some(ElemType::Index)
    );
    assert_eq!(Type::Ownership.element_type(), None);
}

#[test]
fn display() {
    assert_eq!(Type::buffer(ElemType::F32, 2).to_string(), "buffer<?x?xf32>");
    assert_eq!(Type::buffer(ElemType::I8, 0).to_string(), "buffer<i8>");
    assert_eq!(Type::Scalar(ElemType::I1).to_string(), "i1");
    assert_eq!(Type::Ownership.to_string(), "ownership");
}
