//! `clang::TemplateTypeParmType`
//!
//! An anonymous union holds either `CanTTPTInfo` (depth, index, pack flag)
//! for the canonical type or `TTPDecl` for a sugared one.

use crate::error::{DecodeError, DecodeResult};
use crate::session::Session;
use crate::types::unqualified_name;
use crate::value::Value;
use crate::view::builder::ViewBuilder;
use crate::view::providers::qual_type;

const INFO_UNION: &str = "clang::TemplateTypeParmType::(anonymous union)";

/// Canonical when `CanonicalType` points back at this object with no local
/// qualifiers.
pub fn is_canonical(session: &Session, value: &Value) -> DecodeResult<bool>
{
    let address = session.address_of(value)?;
    let canonical = session.member(value, "CanonicalType")?;
    let decoded = qual_type::decode(session, &canonical)?;
    Ok(decoded.type_address == address.value() && decoded.qualifiers.is_empty())
}

/// Underlying members with the anonymous union replaced by its active member.
pub fn build(session: &Session, value: &Value) -> DecodeResult<ViewBuilder>
{
    let mut builder = ViewBuilder::from_underlying(session.children(value)?);
    let index = builder
        .position(|child| unqualified_name(&child.ty.name) == INFO_UNION)
        .ok_or_else(|| DecodeError::missing_member(&value.ty.name, INFO_UNION))?;
    let info = builder
        .value(index)
        .cloned()
        .ok_or_else(|| DecodeError::InvariantViolation(format!("lost child {index} of {}", value.name)))?;

    let active = if is_canonical(session, value)? { "CanTTPTInfo" } else { "TTPDecl" };
    builder.replace(index, session.member(&info, active)?)?;
    Ok(builder)
}
