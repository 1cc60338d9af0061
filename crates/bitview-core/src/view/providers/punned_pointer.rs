//! `llvm::detail::PunnedPointer<T>`: a pointer stored in a `char` buffer
//! sized and aligned like `T`.

use std::sync::Arc;

use crate::error::DecodeResult;
use crate::session::Session;
use crate::types::TypeDescriptor;
use crate::value::Value;
use crate::view::builder::ViewBuilder;
use crate::view::providers::DEREFERENCE;

/// Decoded `PunnedPointer`
#[derive(Debug, Clone)]
pub struct PunnedPointer
{
    /// Pointer-sized integer held by the buffer
    pub raw: u64,
    /// `T`
    pub pointer_type: Arc<TypeDescriptor>,
    /// The `Data` buffer itself
    pub data: Value,
}

/// Read the pointer out of the `Data` buffer.
///
/// The read width is the size of `T`, so only 4- and 8-byte pointers decode.
pub fn decode(session: &Session, value: &Value) -> DecodeResult<PunnedPointer>
{
    let pointer_type = session.template_type(&value.ty, 0)?;
    let data = session.member(value, "Data")?;
    let raw = session.read_raw(&data, pointer_type.byte_size)?;
    Ok(PunnedPointer {
        raw,
        pointer_type,
        data,
    })
}

pub fn build(session: &Session, value: &Value) -> DecodeResult<ViewBuilder>
{
    let punned = decode(session, value)?;
    let mut builder = ViewBuilder::new();
    builder.push(session.synthesize_unsigned("Pointer", punned.raw, punned.pointer_type.clone())?);
    if let Some(pointee) = session.pointee(DEREFERENCE, &punned.pointer_type, punned.raw)? {
        builder.hide(pointee);
    }
    builder.hide(punned.data.clone_named("Data"));
    Ok(builder)
}
