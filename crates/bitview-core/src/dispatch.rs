//! # Discriminant Dispatcher
//!
//! Maps a discriminant (a type class, a statement class, a declaration kind) to
//! the concrete layout that applies to an otherwise untyped block of memory.
//!
//! A [`TaggedUnionLayout`] is a static table of [`LayoutEntry`] rows keyed by
//! enumerator name. Lookup is an exact match on that name. A discriminant that
//! is not in the table is an error ([`DecodeError::UnknownVariant`]), never a
//! silent fallback to some default variant.
//!
//! When the tag field is a plain integer bit-field (as `clang::Type::TC` is),
//! the layout's discriminant enum translates the number into its enumerator
//! name before lookup.

use std::fmt;
use std::sync::Arc;

use crate::error::{DecodeError, DecodeResult};
use crate::session::Session;
use crate::types::TypeDescriptor;

/// A discriminant as read from memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discriminant
{
    /// Enumerator name (`"Builtin"`, `"IfStmtClass"`)
    Symbolic(String),
    /// Raw value of a tag field that is not typed as an enum
    Raw(u64),
}

impl fmt::Display for Discriminant
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Discriminant::Symbolic(name) => write!(f, "{name}"),
            Discriminant::Raw(value) => write!(f, "{value:#x}"),
        }
    }
}

/// One row of a tagged union layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEntry
{
    /// Enumerator name of the discriminant
    pub discriminant: &'static str,
    /// Concrete derived class, if the table carries one
    pub derived_type: Option<&'static str>,
    /// Member of the anonymous bits union that belongs to this variant
    pub bits_member: Option<&'static str>,
}

impl LayoutEntry
{
    pub const fn new(discriminant: &'static str, derived_type: Option<&'static str>, bits_member: Option<&'static str>) -> Self
    {
        Self {
            discriminant,
            derived_type,
            bits_member,
        }
    }
}

/// Static description of a tagged union and how to find its discriminant
#[derive(Debug, Clone, Copy)]
pub struct TaggedUnionLayout
{
    /// Name used in diagnostics
    pub name: &'static str,
    /// Type whose instances carry the discriminant (`clang::Type`)
    pub base_type: &'static str,
    /// Member of the base's anonymous union that is always valid (`TypeBits`)
    pub common_bits: Option<&'static str>,
    /// Field holding the discriminant (`TC`)
    pub discriminant_field: &'static str,
    /// Enum that names the discriminant values (`clang::Type::TypeClass`)
    pub discriminant_enum: &'static str,
    /// Enumerators that are not variants (`PtrMask`, range markers)
    pub markers: &'static [&'static str],
    /// Whether every enumerator of the discriminant enum needs an entry
    pub exhaustive: bool,
    pub entries: &'static [LayoutEntry],
}

impl TaggedUnionLayout
{
    /// Exact-match lookup by enumerator name.
    pub fn lookup(&self, name: &str) -> Option<&LayoutEntry>
    {
        self.entries.iter().find(|entry| entry.discriminant == name)
    }

    /// Entry for an already symbolic discriminant.
    ///
    /// ## Errors
    ///
    /// `UnknownVariant` when the name has no entry or the discriminant is
    /// still raw. Use [`resolve`] to translate raw values.
    pub fn entry(&self, discriminant: &Discriminant) -> DecodeResult<&LayoutEntry>
    {
        match discriminant {
            Discriminant::Symbolic(name) => self.lookup(name).ok_or_else(|| self.unknown(discriminant)),
            Discriminant::Raw(_) => Err(self.unknown(discriminant)),
        }
    }

    /// Name of the anonymous union in the base type that holds the bits.
    pub fn bits_union_type(&self) -> String
    {
        format!("{}::(anonymous union)", self.base_type)
    }

    /// Whether `enumerator` is a marker rather than a variant.
    ///
    /// Besides the explicit list, `firstX`/`lastX` range markers and the
    /// `TypeLast` sentinel are never variants.
    pub fn is_marker(&self, enumerator: &str) -> bool
    {
        self.markers.contains(&enumerator)
            || enumerator.starts_with("first")
            || enumerator.starts_with("last")
            || enumerator == "TypeLast"
    }

    fn unknown(&self, discriminant: &Discriminant) -> DecodeError
    {
        DecodeError::UnknownVariant {
            layout: self.name.to_string(),
            discriminant: discriminant.to_string(),
        }
    }
}

/// Outcome of a successful dispatch
#[derive(Debug, Clone)]
pub struct ResolvedVariant
{
    pub discriminant: String,
    /// Concrete type, for layouts whose entries name one
    pub derived: Option<Arc<TypeDescriptor>>,
    pub bits_member: Option<&'static str>,
}

/// Translate a discriminant into its table entry without looking up the
/// derived type.
///
/// Raw discriminants go through the layout's discriminant enum first.
///
/// ## Errors
///
/// `UnknownVariant` for a discriminant with no entry (or no enumerator).
pub fn classify(session: &Session, discriminant: &Discriminant, layout: &TaggedUnionLayout) -> DecodeResult<LayoutEntry>
{
    let symbolic = match discriminant {
        Discriminant::Symbolic(_) => discriminant.clone(),
        Discriminant::Raw(raw) => {
            let enum_type = session.require_type(layout.discriminant_enum)?;
            match enum_type.enumerator_by_value(*raw) {
                Some(enumerator) => Discriminant::Symbolic(enumerator.name.clone()),
                None => return Err(layout.unknown(discriminant)),
            }
        }
    };
    layout.entry(&symbolic).copied()
}

/// Resolve a discriminant against `layout`.
///
/// Like [`classify`], and the derived type, when the entry names one, must
/// exist in the type system.
///
/// ## Errors
///
/// - `UnknownVariant` for a discriminant with no entry (or no enumerator)
/// - `TypeNotFound` when the table names a type the target does not have
pub fn resolve(session: &Session, discriminant: &Discriminant, layout: &TaggedUnionLayout) -> DecodeResult<ResolvedVariant>
{
    let entry = classify(session, discriminant, layout)?;
    let derived = entry
        .derived_type
        .map(|name| session.require_type(name))
        .transpose()?;

    tracing::debug!(
        layout = layout.name,
        discriminant = entry.discriminant,
        derived = entry.derived_type.unwrap_or("-"),
        bits = entry.bits_member.unwrap_or("-"),
        "resolved variant"
    );

    Ok(ResolvedVariant {
        discriminant: entry.discriminant.to_string(),
        derived,
        bits_member: entry.bits_member,
    })
}
