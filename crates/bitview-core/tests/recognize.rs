//! Tests for dynamic type recognition of clang::Type and clang::Stmt values.

mod common;

use bitview_core::prelude::*;
use bitview_core::recognize::{recognize_dynamic, recognize_stmt, recognize_type};
use common::*;

fn fixture() -> Fixture
{
    let mut fixture = Fixture::new();
    // Type at 0x1500 is a builtin, pointer to it at 0x1050
    fixture.write_u64(0x1510, 0);
    fixture.write_u64(0x1050, 0x1500);
    // Expr at 0x1610 is an IntegerLiteral, pointer to it at 0x1058
    fixture.write_u64(0x1610, 2);
    fixture.write_u64(0x1058, 0x1610);
    // Type at 0x1580 has an unhandled class
    fixture.write_u64(0x1590, TC_UNHANDLED);
    fixture
}

#[test]
fn test_type_pointer_becomes_derived_pointer()
{
    let session = fixture().session();

    let pointer = session.value_at("t", "clang::Type *", Address::new(0x1050)).unwrap();
    let recognized = recognize_type(&session, &pointer).unwrap();
    assert_eq!(recognized.ty.name, "clang::BuiltinType *");
    assert!(recognized.ty.is_pointer());
    assert_eq!(recognized.address(), pointer.address());
    assert_eq!(recognized.name, "t");

    // the retyped pointer still dereferences to the same object
    let object = session.dereference(&recognized).unwrap();
    assert_eq!(object.ty.name, "clang::BuiltinType");
    assert_eq!(object.address(), Some(Address::new(0x1500)));
}

#[test]
fn test_objects_and_references_keep_their_shape()
{
    let session = fixture().session();

    let object = session.value_at("t", "clang::Type", Address::new(0x1500)).unwrap();
    assert_eq!(recognize_type(&session, &object).unwrap().ty.name, "clang::BuiltinType");

    let reference = session.value_at("e", "clang::Expr &", Address::new(0x1058)).unwrap();
    let recognized = recognize_stmt(&session, &reference).unwrap();
    assert_eq!(recognized.ty.name, "clang::IntegerLiteral &");
    assert!(recognized.ty.is_reference());
}

#[test]
fn test_recognize_dynamic_picks_by_static_type()
{
    let session = fixture().session();

    let stmt = session.value_at("s", "const clang::Stmt *", Address::new(0x1058)).unwrap();
    let recognized = recognize_dynamic(&session, &stmt).unwrap().unwrap();
    assert_eq!(recognized.ty.name, "clang::IntegerLiteral *");

    let ty = session.value_at("t", "clang::Type *", Address::new(0x1050)).unwrap();
    assert_eq!(
        recognize_dynamic(&session, &ty).unwrap().unwrap().ty.name,
        "clang::BuiltinType *"
    );

    let decl = session.value_at("d", "clang::Decl", Address::new(0x1100)).unwrap();
    assert!(recognize_dynamic(&session, &decl).unwrap().is_none());
}

#[test]
fn test_unhandled_class_is_an_error()
{
    let session = fixture().session();

    let ty = session.value_at("t", "clang::Type", Address::new(0x1580)).unwrap();
    let err = recognize_type(&session, &ty).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownVariant { .. }), "{err}");
}

#[test]
fn test_missing_derived_type_is_reported()
{
    let mut fixture = fixture();
    // TC = Enum; the fixture has no clang::EnumType
    fixture.write_u64(0x1510, 2);
    let session = fixture.session();

    let ty = session.value_at("t", "clang::Type", Address::new(0x1500)).unwrap();
    assert!(matches!(
        recognize_type(&session, &ty),
        Err(DecodeError::TypeNotFound(name)) if name == "clang::EnumType"
    ));
}
