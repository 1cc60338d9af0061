//! Type descriptors: the engine's read-only view of the target's type system.

use std::fmt;

/// Scalar flavours the engine needs to tell apart when synthesizing values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind
{
    Bool,
    Char,
    Signed,
    Unsigned,
    Float,
}

/// Basic types the engine synthesizes values of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicType
{
    Bool,
    Char,
    Int,
}

impl BasicType
{
    /// Canonical C spelling, also used as the lookup key in type systems.
    pub const fn name(self) -> &'static str
    {
        match self {
            BasicType::Bool => "bool",
            BasicType::Char => "char",
            BasicType::Int => "int",
        }
    }

    pub const fn byte_size(self) -> u64
    {
        match self {
            BasicType::Bool | BasicType::Char => 1,
            BasicType::Int => 4,
        }
    }

    pub const fn scalar_kind(self) -> ScalarKind
    {
        match self {
            BasicType::Bool => ScalarKind::Bool,
            BasicType::Char => ScalarKind::Char,
            BasicType::Int => ScalarKind::Signed,
        }
    }
}

/// Structural kind of a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind
{
    Scalar(ScalarKind),
    Pointer
    {
        pointee: String
    },
    Reference
    {
        referent: String
    },
    Enum,
    Struct,
    Union,
    Array
    {
        element: String,
        count: u64,
    },
    /// Void, functions, and anything else without a decodable layout
    Opaque,
}

/// Bit range of a bit-field member, relative to the member's byte offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRange
{
    /// Bits from the start of the storage byte (counted from the least
    /// significant bit on little-endian targets, from the most significant on
    /// big-endian ones, matching DWARF `DW_AT_data_bit_offset`)
    pub offset: u32,
    /// Width of the field in bits
    pub size: u32,
}

impl BitRange
{
    pub const fn new(offset: u32, size: u32) -> Self
    {
        Self { offset, size }
    }

    /// Number of bytes that must be read to cover the field
    pub const fn storage_bytes(self) -> usize
    {
        ((self.offset as u64 + self.size as u64 + 7) / 8) as usize
    }
}

/// A data member or base class of an aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member
{
    /// `None` for anonymous unions/structs
    pub name: Option<String>,
    pub type_name: String,
    pub byte_offset: u64,
    pub bits: Option<BitRange>,
    /// Base-class subobject rather than a data member
    pub is_base: bool,
}

impl Member
{
    pub fn field(name: impl Into<String>, type_name: impl Into<String>, byte_offset: u64) -> Self
    {
        Self {
            name: Some(name.into()),
            type_name: type_name.into(),
            byte_offset,
            bits: None,
            is_base: false,
        }
    }

    pub fn bitfield(name: impl Into<String>, type_name: impl Into<String>, byte_offset: u64, bits: BitRange) -> Self
    {
        Self {
            bits: Some(bits),
            ..Self::field(name, type_name, byte_offset)
        }
    }

    /// Base classes are named after their type, like debuggers show them.
    pub fn base(type_name: impl Into<String>, byte_offset: u64) -> Self
    {
        let type_name = type_name.into();
        Self {
            name: Some(type_name.clone()),
            type_name,
            byte_offset,
            bits: None,
            is_base: true,
        }
    }

    pub fn anonymous(type_name: impl Into<String>, byte_offset: u64) -> Self
    {
        Self {
            name: None,
            type_name: type_name.into(),
            byte_offset,
            bits: None,
            is_base: false,
        }
    }
}

/// A named constant of an enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumerator
{
    pub name: String,
    pub value: i64,
}

impl Enumerator
{
    pub fn new(name: impl Into<String>, value: i64) -> Self
    {
        Self {
            name: name.into(),
            value,
        }
    }

    /// The value reinterpreted as unsigned; masks stored as negative
    /// enumerators (`~0x7`) come out with all high bits set.
    pub const fn unsigned(&self) -> u64
    {
        self.value as u64
    }
}

/// A template argument, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateArg
{
    Type(String),
    /// Non-type argument; only its type is needed for lookups
    Value
    {
        type_name: String,
        value: Option<i64>,
    },
}

impl TemplateArg
{
    pub fn type_name(&self) -> &str
    {
        match self {
            TemplateArg::Type(name) | TemplateArg::Value { type_name: name, .. } => name,
        }
    }
}

/// Description of one type in the inspected process
///
/// Descriptors refer to other types by qualified name; the [`TypeSystem`]
/// resolves those names. Nested types are found as `Parent::Nested`.
///
/// [`TypeSystem`]: crate::host::TypeSystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor
{
    pub name: String,
    pub byte_size: u64,
    pub kind: TypeKind,
    pub members: Vec<Member>,
    pub enumerators: Vec<Enumerator>,
    pub template_args: Vec<TemplateArg>,
}

impl TypeDescriptor
{
    pub fn new(name: impl Into<String>, byte_size: u64, kind: TypeKind) -> Self
    {
        Self {
            name: name.into(),
            byte_size,
            kind,
            members: Vec::new(),
            enumerators: Vec::new(),
            template_args: Vec::new(),
        }
    }

    pub fn basic(basic: BasicType) -> Self
    {
        Self::new(basic.name(), basic.byte_size(), TypeKind::Scalar(basic.scalar_kind()))
    }

    /// Pointer to `pointee`, named the way C++ debuggers spell it (`T *`)
    pub fn pointer_to(pointee: &str, byte_size: u64) -> Self
    {
        Self::new(
            format!("{pointee} *"),
            byte_size,
            TypeKind::Pointer {
                pointee: pointee.to_string(),
            },
        )
    }

    pub fn reference_to(referent: &str, byte_size: u64) -> Self
    {
        Self::new(
            format!("{referent} &"),
            byte_size,
            TypeKind::Reference {
                referent: referent.to_string(),
            },
        )
    }

    pub fn array_of(element: &TypeDescriptor, count: u64) -> Self
    {
        Self::new(
            format!("{}[{count}]", element.name),
            element.byte_size.saturating_mul(count),
            TypeKind::Array {
                element: element.name.clone(),
                count,
            },
        )
    }

    #[must_use]
    pub fn with_members(mut self, members: Vec<Member>) -> Self
    {
        self.members = members;
        self
    }

    #[must_use]
    pub fn with_enumerators(mut self, enumerators: Vec<Enumerator>) -> Self
    {
        self.enumerators = enumerators;
        self
    }

    #[must_use]
    pub fn with_template_args(mut self, template_args: Vec<TemplateArg>) -> Self
    {
        self.template_args = template_args;
        self
    }

    pub fn is_pointer(&self) -> bool
    {
        matches!(self.kind, TypeKind::Pointer { .. })
    }

    pub fn is_reference(&self) -> bool
    {
        matches!(self.kind, TypeKind::Reference { .. })
    }

    pub fn is_enum(&self) -> bool
    {
        self.kind == TypeKind::Enum
    }

    pub fn is_union(&self) -> bool
    {
        self.kind == TypeKind::Union
    }

    /// Target type name of a pointer or reference
    pub fn target_name(&self) -> Option<&str>
    {
        match &self.kind {
            TypeKind::Pointer { pointee } => Some(pointee),
            TypeKind::Reference { referent } => Some(referent),
            _ => None,
        }
    }

    pub fn member(&self, name: &str) -> Option<&Member>
    {
        self.members.iter().find(|member| member.name.as_deref() == Some(name))
    }

    pub fn enumerator_by_name(&self, name: &str) -> Option<&Enumerator>
    {
        self.enumerators.iter().find(|enumerator| enumerator.name == name)
    }

    /// First enumerator whose unsigned value equals `value`
    pub fn enumerator_by_value(&self, value: u64) -> Option<&Enumerator>
    {
        let width_mask = if self.byte_size >= 8 || self.byte_size == 0 {
            u64::MAX
        } else {
            (1u64 << (self.byte_size * 8)) - 1
        };
        self.enumerators
            .iter()
            .find(|enumerator| enumerator.unsigned() & width_mask == value & width_mask)
    }

    pub fn template_arg(&self, index: usize) -> Option<&TemplateArg>
    {
        self.template_args.get(index)
    }
}

impl fmt::Display for TypeDescriptor
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.name)
    }
}

/// Strip leading cv-qualifiers from a type name.
///
/// ```rust
/// use bitview_core::types::unqualified_name;
///
/// assert_eq!(unqualified_name("const volatile clang::Type"), "clang::Type");
/// assert_eq!(unqualified_name("clang::QualType"), "clang::QualType");
/// ```
pub fn unqualified_name(name: &str) -> &str
{
    let mut rest = name.trim();
    loop {
        if let Some(stripped) = rest.strip_prefix("const ") {
            rest = stripped.trim_start();
        } else if let Some(stripped) = rest.strip_prefix("volatile ") {
            rest = stripped.trim_start();
        } else {
            return rest;
        }
    }
}
