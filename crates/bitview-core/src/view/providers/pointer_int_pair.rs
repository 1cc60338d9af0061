//! `llvm::PointerIntPair<PointerTy, IntBits, IntType, PtrTraits, Info>`
//!
//! The pair stores one pointer-sized word (a `PunnedPointer<PointerTy>` named
//! `Value`). The split between pointer and integer comes from
//! `Info::MaskAndShiftConstants`; see [`tagged::pointer_int_pair_layout`].

use std::sync::Arc;

use crate::error::DecodeResult;
use crate::session::Session;
use crate::tagged::{self, TaggedPointerLayout};
use crate::types::{unqualified_name, PointerWidth, TypeDescriptor};
use crate::value::Value;
use crate::view::builder::ViewBuilder;
use crate::view::providers::{punned_pointer, DEREFERENCE};

/// Decoded `PointerIntPair`
#[derive(Debug, Clone)]
pub struct PointerIntPair
{
    /// Pointer bits, unshifted
    pub pointer: u64,
    /// Integer bits, shifted down to bit 0
    pub int: u64,
    /// `PointerTy`
    pub pointer_type: Arc<TypeDescriptor>,
    pub layout: TaggedPointerLayout,
    /// The `Value` member holding the packed word
    pub storage: Value,
}

/// Layout and `PointerTy` of a `PointerIntPair` specialization.
///
/// The word is as wide as `PointerTy`, which must be 4 or 8 bytes.
pub fn layout_of(session: &Session, pair_type: &TypeDescriptor) -> DecodeResult<(TaggedPointerLayout, Arc<TypeDescriptor>)>
{
    let pointer_type = session.template_type(pair_type, 0)?;
    let width = PointerWidth::from_bytes(pointer_type.byte_size)?;
    let layout = tagged::pointer_int_pair_layout(session, pair_type, width)?;
    Ok((layout, pointer_type))
}

pub fn decode(session: &Session, value: &Value) -> DecodeResult<PointerIntPair>
{
    let (layout, pointer_type) = layout_of(session, &value.ty)?;
    let storage = session.member(value, "Value")?;
    let raw = if unqualified_name(&storage.ty.name).starts_with("llvm::detail::PunnedPointer<") {
        punned_pointer::decode(session, &storage)?.raw
    } else {
        // older LLVM keeps a plain intptr_t
        session.read_raw(&storage, layout.width.bytes() as u64)?
    };
    let (pointer, int) = layout.split(raw);
    tracing::trace!(pair = %value.ty.name, raw = format_args!("{raw:#x}"), pointer, int, "split PointerIntPair");
    Ok(PointerIntPair {
        pointer,
        int,
        pointer_type,
        layout,
        storage,
    })
}

/// `Pointer` is the pointee when `PointerTy` is a real pointer, otherwise the
/// pointer bits synthesized as a `PointerTy` (a nested `PointerUnion`, for
/// instance).
pub fn build(session: &Session, value: &Value) -> DecodeResult<ViewBuilder>
{
    let pair = decode(session, value)?;
    let mut builder = ViewBuilder::new();

    let pointee = session.pointee("Pointer", &pair.pointer_type, pair.pointer)?;
    match &pointee {
        Some(pointee) => builder.push(pointee.clone()),
        None => builder.push(session.synthesize_unsigned("Pointer", pair.pointer, pair.pointer_type.clone())?),
    }
    builder.push(session.synthesize_int("Int", pair.int)?);

    if let Some(pointee) = pointee {
        builder.hide(pointee.clone_named(DEREFERENCE));
    }
    builder.hide(pair.storage.clone_named("Value"));
    Ok(builder)
}
