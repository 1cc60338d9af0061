//! Aggregate kinds with a dedicated provider.

use std::fmt;

use crate::error::DecodeResult;
use crate::layouts::{DECL_KIND_LAYOUT, STMT_CLASS_LAYOUT, TYPE_CLASS_LAYOUT};
use crate::session::Session;
use crate::types::unqualified_name;
use crate::value::Value;
use crate::view::builder::ViewBuilder;
use crate::view::providers::{
    bits, declaration_name, pointer_int_pair, pointer_union, punned_pointer, qual_type, string_map_entry,
    template_type_parm,
};

/// How a type name is matched
#[derive(Debug, Clone, Copy)]
enum Pattern
{
    Exact(&'static str),
    /// Any specialization of the named template
    Template(&'static str),
}

/// An aggregate the engine knows how to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind
{
    PointerIntPair,
    PunnedPointer,
    PointerUnion,
    DeclarationName,
    QualType,
    TemplateTypeParmType,
    Type,
    Stmt,
    Expr,
    DeclContext,
    StringMapEntry,
}

impl AggregateKind
{
    pub const ALL: [AggregateKind; 11] = [
        AggregateKind::PointerIntPair,
        AggregateKind::PunnedPointer,
        AggregateKind::PointerUnion,
        AggregateKind::DeclarationName,
        AggregateKind::QualType,
        AggregateKind::TemplateTypeParmType,
        AggregateKind::Type,
        AggregateKind::Stmt,
        AggregateKind::Expr,
        AggregateKind::DeclContext,
        AggregateKind::StringMapEntry,
    ];

    /// Kind of the aggregate named `type_name`, ignoring cv-qualifiers.
    ///
    /// Pointers and references are not aggregates; pass the pointee's name.
    ///
    /// ```rust
    /// use bitview_core::view::AggregateKind;
    ///
    /// assert_eq!(
    ///     AggregateKind::recognize("llvm::PointerIntPair<clang::Decl *, 2, unsigned int>"),
    ///     Some(AggregateKind::PointerIntPair)
    /// );
    /// assert_eq!(AggregateKind::recognize("const clang::QualType"), Some(AggregateKind::QualType));
    /// assert_eq!(AggregateKind::recognize("clang::Type *"), None);
    /// assert_eq!(AggregateKind::recognize("clang::TypeLoc"), None);
    /// ```
    pub fn recognize(type_name: &str) -> Option<Self>
    {
        let name = unqualified_name(type_name);
        if name.ends_with('*') || name.ends_with('&') {
            return None;
        }
        Self::ALL.into_iter().find(|kind| kind.matches(name))
    }

    pub const fn name(self) -> &'static str
    {
        match self {
            AggregateKind::PointerIntPair => "PointerIntPair",
            AggregateKind::PunnedPointer => "PunnedPointer",
            AggregateKind::PointerUnion => "PointerUnion",
            AggregateKind::DeclarationName => "DeclarationName",
            AggregateKind::QualType => "QualType",
            AggregateKind::TemplateTypeParmType => "TemplateTypeParmType",
            AggregateKind::Type => "Type",
            AggregateKind::Stmt => "Stmt",
            AggregateKind::Expr => "Expr",
            AggregateKind::DeclContext => "DeclContext",
            AggregateKind::StringMapEntry => "StringMapEntry",
        }
    }

    /// Run this kind's provider over `value` (the object, not a pointer to it).
    pub fn build(self, session: &Session, value: &Value) -> DecodeResult<ViewBuilder>
    {
        match self {
            AggregateKind::PointerIntPair => pointer_int_pair::build(session, value),
            AggregateKind::PunnedPointer => punned_pointer::build(session, value),
            AggregateKind::PointerUnion => pointer_union::build(session, value),
            AggregateKind::DeclarationName => declaration_name::build(session, value),
            AggregateKind::QualType => qual_type::build(session, value),
            AggregateKind::TemplateTypeParmType => template_type_parm::build(session, value),
            AggregateKind::Type => bits::build(session, value, &TYPE_CLASS_LAYOUT),
            AggregateKind::Stmt => bits::build(session, value, &STMT_CLASS_LAYOUT),
            AggregateKind::Expr => bits::build_expr(session, value),
            AggregateKind::DeclContext => bits::build(session, value, &DECL_KIND_LAYOUT),
            AggregateKind::StringMapEntry => string_map_entry::build(session, value),
        }
    }

    const fn pattern(self) -> Pattern
    {
        match self {
            AggregateKind::PointerIntPair => Pattern::Template("llvm::PointerIntPair"),
            AggregateKind::PunnedPointer => Pattern::Template("llvm::detail::PunnedPointer"),
            AggregateKind::PointerUnion => Pattern::Template("llvm::PointerUnion"),
            AggregateKind::DeclarationName => Pattern::Exact("clang::DeclarationName"),
            AggregateKind::QualType => Pattern::Exact("clang::QualType"),
            AggregateKind::TemplateTypeParmType => Pattern::Exact("clang::TemplateTypeParmType"),
            AggregateKind::Type => Pattern::Exact("clang::Type"),
            AggregateKind::Stmt => Pattern::Exact("clang::Stmt"),
            AggregateKind::Expr => Pattern::Exact("clang::Expr"),
            AggregateKind::DeclContext => Pattern::Exact("clang::DeclContext"),
            AggregateKind::StringMapEntry => Pattern::Template("llvm::StringMapEntry"),
        }
    }

    fn matches(self, name: &str) -> bool
    {
        match self.pattern() {
            Pattern::Exact(expected) => name == expected,
            Pattern::Template(template) => name
                .strip_prefix(template)
                .is_some_and(|rest| rest.starts_with('<') && rest.ends_with('>')),
        }
    }
}

impl fmt::Display for AggregateKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_template_patterns_need_arguments()
    {
        assert_eq!(
            AggregateKind::recognize("llvm::StringMapEntry<unsigned int>"),
            Some(AggregateKind::StringMapEntry)
        );
        assert_eq!(AggregateKind::recognize("llvm::StringMapEntryBase"), None);
        assert_eq!(AggregateKind::recognize("llvm::PointerUnion"), None);
        assert_eq!(
            AggregateKind::recognize("llvm::detail::PunnedPointer<void *>"),
            Some(AggregateKind::PunnedPointer)
        );
    }

    #[test]
    fn test_every_kind_has_a_distinct_name()
    {
        let names: std::collections::HashSet<&str> = AggregateKind::ALL.iter().map(|kind| kind.name()).collect();
        assert_eq!(names.len(), AggregateKind::ALL.len());
    }

    #[test]
    fn test_references_are_not_aggregates()
    {
        assert_eq!(AggregateKind::recognize("clang::Stmt &"), None);
        assert_eq!(AggregateKind::recognize("volatile clang::Stmt"), Some(AggregateKind::Stmt));
    }
}
