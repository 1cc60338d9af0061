//! # Dynamic Type Recognition
//!
//! `clang::Type` and `clang::Stmt` values are almost always handled through
//! a base-class pointer. The recognizers read the class discriminant and hand
//! back the same storage typed as the concrete derived class, so a host can
//! show a `clang::Type *` as the `clang::BuiltinType *` it really is.
//!
//! Pointer and reference shape is preserved: a `clang::Stmt &` comes back as
//! a reference to the derived statement.

use crate::dispatch;
use crate::dispatch::TaggedUnionLayout;
use crate::error::{DecodeError, DecodeResult};
use crate::layouts::{STMT_CLASS_LAYOUT, TYPE_CLASS_LAYOUT};
use crate::session::Session;
use crate::types::unqualified_name;
use crate::value::Value;
use crate::view::providers::bits;

/// Retype a `clang::Type` value (or pointer/reference) as its type class.
pub fn recognize_type(session: &Session, value: &Value) -> DecodeResult<Value>
{
    recognize(session, value, &TYPE_CLASS_LAYOUT)
}

/// Retype a `clang::Stmt` or `clang::Expr` value (or pointer/reference) as
/// its statement class.
pub fn recognize_stmt(session: &Session, value: &Value) -> DecodeResult<Value>
{
    recognize(session, value, &STMT_CLASS_LAYOUT)
}

/// Apply whichever recognizer fits the value's static type, if any.
pub fn recognize_dynamic(session: &Session, value: &Value) -> DecodeResult<Option<Value>>
{
    let static_type = unqualified_name(value.ty.target_name().unwrap_or(&value.ty.name));
    match static_type {
        "clang::Type" => recognize_type(session, value).map(Some),
        "clang::Stmt" | "clang::Expr" | "clang::ValueStmt" => recognize_stmt(session, value).map(Some),
        _ => Ok(None),
    }
}

fn recognize(session: &Session, value: &Value, layout: &TaggedUnionLayout) -> DecodeResult<Value>
{
    let _scope = session.trace("recognize");
    let object = session.resolve_target(value)?;
    let discriminant = bits::read_discriminant(session, &object, layout)?;
    let variant = dispatch::resolve(session, &discriminant, layout)?;
    let derived = variant.derived.ok_or_else(|| {
        DecodeError::UnsupportedLayout(format!(
            "{} names no class for {}",
            layout.name, variant.discriminant
        ))
    })?;

    let ty = if value.ty.is_pointer() {
        session.pointer_to(&derived)
    } else if value.ty.is_reference() {
        session.reference_to(&derived)
    } else {
        derived
    };
    tracing::debug!(value = %value.name, from = %value.ty.name, to = %ty.name, "recognized dynamic type");
    Ok(value.retyped(ty))
}
