//! Bit-field unions of `clang::Type`, `clang::Stmt`, `clang::Expr` and
//! `clang::DeclContext`.
//!
//! Each of these bases packs its own bits and those of every derived class
//! into one anonymous union. The common member (`TypeBits`, `StmtBits`,
//! `DeclContextBits`) is always valid and carries the discriminant; the
//! layout table says which other member belongs to the dynamic class.

use crate::dispatch::{self, Discriminant, TaggedUnionLayout};
use crate::error::{DecodeError, DecodeResult};
use crate::session::Session;
use crate::types::unqualified_name;
use crate::value::Value;
use crate::view::builder::ViewBuilder;

/// Read the discriminant of `object` as `layout` describes it.
pub fn read_discriminant(session: &Session, object: &Value, layout: &TaggedUnionLayout) -> DecodeResult<Discriminant>
{
    let common = session.member(object, common_bits(layout)?)?;
    let field = session.member(&common, layout.discriminant_field)?;
    session.discriminant(&field)
}

/// Underlying members with the anonymous union replaced by the common bits,
/// then the bits of the dynamic class if it has its own.
pub fn build(session: &Session, value: &Value, layout: &TaggedUnionLayout) -> DecodeResult<ViewBuilder>
{
    let common_name = common_bits(layout)?;
    let union_type = layout.bits_union_type();

    let mut builder = ViewBuilder::from_underlying(session.children(value)?);
    let index = builder
        .position(|child| unqualified_name(&child.ty.name) == union_type)
        .ok_or_else(|| DecodeError::missing_member(&value.ty.name, &union_type))?;
    let bits_union = builder
        .value(index)
        .cloned()
        .ok_or_else(|| DecodeError::InvariantViolation(format!("lost child {index} of {}", value.name)))?;

    let common = session.member(&bits_union, common_name)?;
    let field = session.member(&common, layout.discriminant_field)?;
    let entry = dispatch::classify(session, &session.discriminant(&field)?, layout)?;
    tracing::debug!(layout = layout.name, class = entry.discriminant, "decoding bits");

    builder.replace(index, common)?;
    if let Some(bits) = entry.bits_member.filter(|bits| *bits != common_name) {
        builder.push(session.member(&bits_union, bits)?);
    }
    Ok(builder)
}

/// `clang::Expr`: underlying members, then `ExprBits` from the `clang::Stmt`
/// base.
pub fn build_expr(session: &Session, value: &Value) -> DecodeResult<ViewBuilder>
{
    let mut builder = ViewBuilder::from_underlying(session.children(value)?);
    builder.push(session.member(value, "ExprBits")?);
    Ok(builder)
}

fn common_bits(layout: &TaggedUnionLayout) -> DecodeResult<&'static str>
{
    layout.common_bits.ok_or_else(|| {
        DecodeError::UnsupportedLayout(format!("layout {} has no common bits member", layout.name))
    })
}
