//! Decoded values: a name, a type, and where the bytes live.

use std::fmt;
use std::sync::Arc;

use crate::types::{Address, BitRange, RawBytes, TypeDescriptor};

/// Where a value's bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueLocation
{
    /// The value lives in the inspected process at this address
    Address(Address),
    /// The engine produced the bytes; no memory read is ever attempted
    Synthesized(RawBytes),
}

/// A named, typed value, either in process memory or synthesized by the engine
///
/// This is what views hand back to the host as a child. Values are cheap to
/// clone: the descriptor is shared and synthesized bytes stay inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value
{
    pub name: String,
    pub ty: Arc<TypeDescriptor>,
    pub location: ValueLocation,
    /// Set for bit-field members; the range is relative to the location
    pub bits: Option<BitRange>,
}

impl Value
{
    pub fn at_address(name: impl Into<String>, ty: Arc<TypeDescriptor>, address: Address) -> Self
    {
        Self {
            name: name.into(),
            ty,
            location: ValueLocation::Address(address),
            bits: None,
        }
    }

    pub fn synthesized(name: impl Into<String>, ty: Arc<TypeDescriptor>, bytes: RawBytes) -> Self
    {
        Self {
            name: name.into(),
            ty,
            location: ValueLocation::Synthesized(bytes),
            bits: None,
        }
    }

    #[must_use]
    pub fn with_bits(mut self, bits: Option<BitRange>) -> Self
    {
        self.bits = bits;
        self
    }

    /// Same value under a different name.
    #[must_use]
    pub fn clone_named(&self, name: impl Into<String>) -> Self
    {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Same storage reinterpreted as another type.
    #[must_use]
    pub fn retyped(&self, ty: Arc<TypeDescriptor>) -> Self
    {
        Self { ty, ..self.clone() }
    }

    pub fn address(&self) -> Option<Address>
    {
        match self.location {
            ValueLocation::Address(address) => Some(address),
            ValueLocation::Synthesized(_) => None,
        }
    }

    pub fn is_synthesized(&self) -> bool
    {
        matches!(self.location, ValueLocation::Synthesized(_))
    }
}

impl fmt::Display for Value
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match &self.location {
            ValueLocation::Address(address) => write!(f, "({}) {} @ {address}", self.ty.name, self.name),
            ValueLocation::Synthesized(bytes) => write!(f, "({}) {} = {:02x?}", self.ty.name, self.name, bytes.as_slice()),
        }
    }
}
