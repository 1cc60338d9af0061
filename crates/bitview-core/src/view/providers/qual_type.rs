//! `clang::QualType`
//!
//! `Value` is a `PointerIntPair<PointerUnion<const Type *, const ExtQuals *>,
//! FastWidth>`: the integer holds the local (fast) qualifiers and the pointer
//! bits are themselves a packed `PointerUnion`.

use std::sync::Arc;

use crate::error::DecodeResult;
use crate::session::Session;
use crate::types::{unqualified_name, Address, TypeDescriptor};
use crate::value::Value;
use crate::view::builder::ViewBuilder;
use crate::view::providers::{pointer_int_pair, pointer_union};

/// Enum holding the qualifier bit masks
pub const QUALIFIERS_ENUM: &str = "clang::Qualifiers::TQ";

/// Local qualifiers of a `QualType`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Qualifiers
{
    pub is_const: bool,
    pub is_restrict: bool,
    pub is_volatile: bool,
}

impl Qualifiers
{
    /// Interpret the integer bits of the pair through `clang::Qualifiers::TQ`.
    pub fn from_bits(session: &Session, bits: u64) -> DecodeResult<Self>
    {
        let tq = session.require_type(QUALIFIERS_ENUM)?;
        let set = |name: &str| -> DecodeResult<bool> { Ok(bits & session.enumerator_value(&tq, name)? != 0) };
        Ok(Self {
            is_const: set("Const")?,
            is_restrict: set("Restrict")?,
            is_volatile: set("Volatile")?,
        })
    }

    pub const fn is_empty(self) -> bool
    {
        !self.is_const && !self.is_restrict && !self.is_volatile
    }
}

/// Decoded `QualType`
#[derive(Debug, Clone)]
pub struct QualType
{
    /// Address of the `Type` (or `ExtQuals`) object
    pub type_address: u64,
    /// Pointer type of the active union alternative
    pub type_pointer: Arc<TypeDescriptor>,
    pub qualifiers: Qualifiers,
    /// The `Value` member holding the packed word
    pub storage: Value,
}

pub fn decode(session: &Session, value: &Value) -> DecodeResult<QualType>
{
    let storage = session.member(value, "Value")?;
    let pair = pointer_int_pair::decode(session, &storage)?;
    let qualifiers = Qualifiers::from_bits(session, pair.int)?;

    let (type_address, type_pointer) = if unqualified_name(&pair.pointer_type.name).starts_with("llvm::PointerUnion<") {
        let union = pointer_union::resolve_raw(session, &pair.pointer_type, pair.pointer)?;
        (union.pointer, union.alternative)
    } else {
        (pair.pointer, pair.pointer_type)
    };

    Ok(QualType {
        type_address,
        type_pointer,
        qualifiers,
        storage: pair.storage,
    })
}

/// Whether no local qualifier bit is set.
pub fn is_unqualified(session: &Session, value: &Value) -> DecodeResult<bool>
{
    Ok(decode(session, value)?.qualifiers.is_empty())
}

pub fn build(session: &Session, value: &Value) -> DecodeResult<ViewBuilder>
{
    let qual_type = decode(session, value)?;
    let mut builder = ViewBuilder::new();

    match session.pointee("Type", &qual_type.type_pointer, qual_type.type_address)? {
        Some(pointee) => builder.push(pointee),
        None => builder.push(Value::at_address(
            "Type",
            qual_type.type_pointer.clone(),
            Address::new(qual_type.type_address),
        )),
    }
    builder.push(session.synthesize_bool("LocalConstQualified", qual_type.qualifiers.is_const)?);
    builder.push(session.synthesize_bool("LocalRestrictQualified", qual_type.qualifiers.is_restrict)?);
    builder.push(session.synthesize_bool("LocalVolatileQualified", qual_type.qualifiers.is_volatile)?);
    builder.hide(qual_type.storage.clone_named("Value"));
    Ok(builder)
}
