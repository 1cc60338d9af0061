//! `llvm::PointerUnion<PTs...>`
//!
//! A tagged union with an external tag: the `Val` member is a
//! `PointerIntPair` whose integer selects which of the template arguments
//! the pointer bits point to.

use std::sync::Arc;

use crate::error::{DecodeError, DecodeResult};
use crate::session::Session;
use crate::types::TypeDescriptor;
use crate::value::Value;
use crate::view::builder::ViewBuilder;
use crate::view::providers::{pointer_int_pair, DEREFERENCE};

/// Decoded `PointerUnion`
#[derive(Debug, Clone)]
pub struct PointerUnion
{
    pub pointer: u64,
    /// Index of the active alternative
    pub tag: u64,
    /// Pointer type of the active alternative
    pub alternative: Arc<TypeDescriptor>,
}

pub fn decode(session: &Session, value: &Value) -> DecodeResult<PointerUnion>
{
    let val = session.member(value, "Val")?;
    let pair = pointer_int_pair::decode(session, &val)?;
    let alternative = alternative(session, &value.ty, pair.int)?;
    Ok(PointerUnion {
        pointer: pair.pointer,
        tag: pair.int,
        alternative,
    })
}

/// Decode a union that is not in memory, from its raw word.
///
/// Used when a union sits inside another packed word (`QualType`).
pub fn resolve_raw(session: &Session, union_type: &TypeDescriptor, raw: u64) -> DecodeResult<PointerUnion>
{
    let pair_type = session.member_type(union_type, "Val")?;
    let (layout, _) = pointer_int_pair::layout_of(session, &pair_type)?;
    let (pointer, tag) = layout.split(raw);
    let alternative = alternative(session, union_type, tag)?;
    Ok(PointerUnion {
        pointer,
        tag,
        alternative,
    })
}

/// Template argument selected by `tag`.
///
/// ## Errors
///
/// `UnknownVariant` when `tag` is not a valid argument index.
pub fn alternative(session: &Session, union_type: &TypeDescriptor, tag: u64) -> DecodeResult<Arc<TypeDescriptor>>
{
    let index = usize::try_from(tag)
        .ok()
        .filter(|index| *index < union_type.template_args.len())
        .ok_or_else(|| DecodeError::UnknownVariant {
            layout: union_type.name.clone(),
            discriminant: tag.to_string(),
        })?;
    session.template_type(union_type, index)
}

pub fn build(session: &Session, value: &Value) -> DecodeResult<ViewBuilder>
{
    let union = decode(session, value)?;
    let mut builder = ViewBuilder::new();
    builder.push(session.synthesize_unsigned("Pointer", union.pointer, union.alternative.clone())?);
    if let Some(pointee) = session.pointee(DEREFERENCE, &union.alternative, union.pointer)? {
        builder.hide(pointee);
    }
    Ok(builder)
}
