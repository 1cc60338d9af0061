//! `clang::DeclarationName`
//!
//! `Ptr` is a `uintptr_t` whose low bits (`StoredNameKind::PtrMask`) hold the
//! stored name kind. The kind decides what the remaining bits point to; see
//! [`NAME_KIND_LAYOUT`].

use std::sync::Arc;

use crate::dispatch::{self, Discriminant};
use crate::error::{DecodeError, DecodeResult};
use crate::layouts::NAME_KIND_LAYOUT;
use crate::session::Session;
use crate::tagged;
use crate::types::{Address, PointerWidth, TypeDescriptor};
use crate::value::Value;
use crate::view::builder::ViewBuilder;

/// Decoded `DeclarationName`
#[derive(Debug, Clone)]
pub struct DeclarationName
{
    /// Stored name kind, as an integer
    pub kind: u64,
    /// Enumerator name of [`kind`](Self::kind)
    pub kind_name: String,
    /// `clang::DeclarationName::StoredNameKind`
    pub kind_type: Arc<TypeDescriptor>,
    /// Address the name points to, kind bits cleared
    pub pointer: u64,
    /// Type of the object at [`pointer`](Self::pointer)
    pub pointee_type: Arc<TypeDescriptor>,
}

pub fn decode(session: &Session, value: &Value) -> DecodeResult<DeclarationName>
{
    let ptr = session.member(value, "Ptr")?;
    let width = PointerWidth::from_bytes(ptr.ty.byte_size)?;
    let layout = tagged::declaration_name_layout(session, &value.ty, width)?;
    let raw = session.read_raw(&ptr, ptr.ty.byte_size)?;
    let (pointer, kind) = layout.split(raw);

    let variant = dispatch::resolve(session, &Discriminant::Raw(kind), &NAME_KIND_LAYOUT)?;
    let pointee_type = variant.derived.ok_or_else(|| {
        DecodeError::InvariantViolation(format!("name kind {} has no pointee type", variant.discriminant))
    })?;

    Ok(DeclarationName {
        kind,
        kind_name: variant.discriminant,
        kind_type: session.nested_type(&value.ty.name, "StoredNameKind")?,
        pointer,
        pointee_type,
    })
}

/// Underlying members with `Ptr` replaced by the typed `Pointer`, then
/// `NameKind`.
pub fn build(session: &Session, value: &Value) -> DecodeResult<ViewBuilder>
{
    let name = decode(session, value)?;
    let mut builder = ViewBuilder::from_underlying(session.children(value)?);
    builder.replace_named(
        "Ptr",
        Value::at_address("Pointer", name.pointee_type.clone(), Address::new(name.pointer)),
    )?;
    builder.push(session.synthesize_unsigned("NameKind", name.kind, name.kind_type)?);
    Ok(builder)
}
