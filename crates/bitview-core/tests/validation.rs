//! Tests for checking layout tables against a target's type system.

mod common;

use std::sync::Arc;

use bitview_core::dispatch::{LayoutEntry, TaggedUnionLayout};
use bitview_core::layouts::{self, LayoutReport};
use bitview_core::prelude::*;
use common::*;

fn report<'a>(reports: &'a [LayoutReport], layout: &str) -> &'a LayoutReport
{
    reports
        .iter()
        .find(|report| report.layout == layout)
        .unwrap_or_else(|| panic!("no report for {layout}"))
}

#[test]
fn test_builtin_tables_against_partial_target()
{
    let session = Fixture::new().session();
    let reports = session.validate_layouts();
    assert_eq!(reports.len(), layouts::BUILTIN_LAYOUTS.len());

    let type_class = report(&reports, "TypeClass");
    assert!(type_class.enum_found);
    assert!(!type_class.is_clean());
    // markers are never variants
    assert_eq!(type_class.missing_entries, ["Unhandled"]);
    assert!(type_class.unknown_entries.contains(&"Adjusted"));
    assert!(!type_class.unknown_entries.contains(&"Builtin"));
    assert!(type_class.missing_types.contains(&"clang::AdjustedType"));
    assert!(!type_class.missing_types.contains(&"clang::BuiltinType"));
    assert!(type_class.missing_bits.contains(&"ConstantArrayTypeBits"));
    assert!(!type_class.missing_bits.contains(&"BuiltinTypeBits"));

    let stmt_class = report(&reports, "StmtClass");
    assert!(stmt_class.missing_entries.is_empty());
    assert!(!stmt_class.missing_bits.contains(&"IfStmtBits"));

    // not exhaustive: Var has no entry and that is fine
    let decl_kind = report(&reports, "DeclKind");
    assert!(decl_kind.missing_entries.is_empty());
    assert!(!decl_kind.missing_bits.contains(&"RecordDeclBits"));

    let name_kind = report(&reports, "StoredNameKind");
    assert!(name_kind.missing_entries.is_empty());
    assert!(name_kind.unknown_entries.is_empty());
    assert!(name_kind.missing_types.contains(&"clang::Selector"));
    assert!(!name_kind.missing_types.contains(&"clang::IdentifierInfo"));
}

#[test]
fn test_matching_table_is_clean()
{
    static STMT_SUBSET: TaggedUnionLayout = TaggedUnionLayout {
        name: "StmtSubset",
        base_type: "clang::Stmt",
        common_bits: Some("StmtBits"),
        discriminant_field: "sClass",
        discriminant_enum: "clang::Stmt::StmtClass",
        markers: &["NoStmtClass"],
        exhaustive: true,
        entries: &[
            LayoutEntry::new("IfStmtClass", Some("clang::IfStmt"), Some("IfStmtBits")),
            LayoutEntry::new("IntegerLiteralClass", Some("clang::IntegerLiteral"), None),
            LayoutEntry::new("ImplicitCastExprClass", Some("clang::ImplicitCastExpr"), Some("CastExprBits")),
        ],
    };

    let session = Fixture::new().session();
    let report = layouts::validate(&session, &STMT_SUBSET);
    assert!(report.is_clean(), "{report:?}");
}

#[test]
fn test_empty_target_has_no_enums()
{
    let registry = TypeRegistry::new(ByteOrder::Little, PointerWidth::Bits64);
    let session = Session::new(Arc::new(SnapshotMemory::new()), Arc::new(registry));

    for report in session.validate_layouts() {
        assert!(!report.enum_found, "{}", report.layout);
        assert!(!report.is_clean());
        assert!(report.missing_entries.is_empty());
    }
}

#[test]
fn test_validate_on_start()
{
    let fixture = Fixture::new();
    let config = SessionConfig::default().validate_on_start(true).trace_calls(true);
    let session = Session::with_config(Arc::new(fixture.memory), Arc::new(fixture.registry), config);
    assert_eq!(session.config(), config);
    assert_eq!(session.generation(), 0);
}
