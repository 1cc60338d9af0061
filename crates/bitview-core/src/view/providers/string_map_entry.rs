//! `llvm::StringMapEntry<V>`
//!
//! The key is not a member: `keyLength` characters plus a terminating NUL
//! are allocated right after the entry object.

use std::sync::Arc;

use crate::error::{DecodeError, DecodeResult};
use crate::reader;
use crate::session::Session;
use crate::types::{BasicType, TypeDescriptor};
use crate::value::Value;
use crate::view::builder::ViewBuilder;

/// Longest key read as text
const MAX_KEY_TEXT: u64 = 4096;

/// The `Key` pseudo-member, or `None` for entries without `keyLength`.
pub fn key(session: &Session, value: &Value) -> DecodeResult<Option<Value>>
{
    let Some(key_length) = session.find_member(value, "keyLength")? else {
        return Ok(None);
    };
    let len = session.read_unsigned(&key_length)?;
    let address = session.address_of(value)?;
    let address = address.checked_add(value.ty.byte_size).ok_or_else(|| {
        DecodeError::InvariantViolation(format!("key of {} lies past the end of memory", value.name))
    })?;

    let count = len.saturating_add(1);
    let key_type = session.find_type(&format!("char[{count}]")).unwrap_or_else(|| {
        Arc::new(TypeDescriptor::array_of(&session.basic_type(BasicType::Char), count))
    });
    Ok(Some(Value::at_address("Key", key_type, address)))
}

/// Key text, without the terminating NUL.
pub fn key_text(session: &Session, value: &Value) -> DecodeResult<Option<String>>
{
    let Some(key) = key(session, value)? else {
        return Ok(None);
    };
    let address = session.address_of(&key)?;
    let len = key.ty.byte_size.saturating_sub(1).min(MAX_KEY_TEXT);
    let bytes = reader::read_bytes(session.memory(), address, len as usize, session.byte_order())?;
    Ok(Some(String::from_utf8_lossy(bytes.as_slice()).into_owned()))
}

/// Underlying members, then `Key` and `Value` when the entry has them.
pub fn build(session: &Session, value: &Value) -> DecodeResult<ViewBuilder>
{
    let mut builder = ViewBuilder::from_underlying(session.children(value)?);
    if let Some(key) = key(session, value)? {
        builder.push(key);
    }
    if let Some(second) = session.find_member(value, "second")? {
        builder.push(second.clone_named("Value"));
    }
    Ok(builder)
}
