//! Tests for the packed-pointer providers: PointerIntPair, PunnedPointer,
//! PointerUnion, QualType and DeclarationName.

mod common;

use std::sync::Arc;

use bitview_core::mask::MaskShift;
use bitview_core::prelude::*;
use bitview_core::view::providers::{declaration_name, pointer_int_pair, pointer_union, qual_type, DEREFERENCE};
use common::*;

const DECL: u64 = 0x1100;
const EXT_QUALS: u64 = 0x1200;
const TYPE: u64 = 0x1300;

#[test]
fn test_pointer_int_pair_decode()
{
    let mut fixture = Fixture::new();
    fixture.write_u64(0x1000, DECL | (2 << 1));
    let session = fixture.session();

    let pair = session.value_at("p", DECL_PAIR, Address::new(0x1000)).unwrap();
    let decoded = pointer_int_pair::decode(&session, &pair).unwrap();
    assert_eq!(decoded.pointer, DECL);
    assert_eq!(decoded.int, 2);
    assert_eq!(decoded.pointer_type.name, "clang::Decl *");
    assert_eq!(decoded.layout.pointer, MaskShift::new(0xFFFF_FFFF_FFFF_FFF8, 0));
    assert_eq!(decoded.layout.tag, MaskShift::new(0x6, 1));
    assert_eq!(decoded.layout.width, PointerWidth::Bits64);
    assert_eq!(decoded.layout.join(decoded.pointer, decoded.int), DECL | (2 << 1));
}

#[test]
fn test_pointer_int_pair_view()
{
    let mut fixture = Fixture::new();
    fixture.write_u64(0x1000, DECL | (3 << 1));
    let session = fixture.session();

    let pair = session.value_at("p", DECL_PAIR, Address::new(0x1000)).unwrap();
    let mut view = session.view(pair);
    assert_eq!(child_names(&mut view), ["Pointer", "Int"]);
    assert_eq!(slot_names(&mut view), ["Pointer", "Int", DEREFERENCE, "Value"]);

    let pointer = child(&mut view, "Pointer");
    assert_eq!(pointer.ty.name, "clang::Decl");
    assert_eq!(pointer.address(), Some(Address::new(DECL)));

    let int = child(&mut view, "Int");
    assert!(int.is_synthesized());
    assert_eq!(int.ty.name, "int");
    assert_eq!(session.read_unsigned(&int).unwrap(), 3);

    assert_eq!(child(&mut view, DEREFERENCE).address(), Some(Address::new(DECL)));
    assert_eq!(child(&mut view, "Value").ty.name, DECL_PUNNED);
}

#[test]
fn test_pointer_int_pair_through_pointer_and_intptr_storage()
{
    let mut fixture = Fixture::new();
    fixture.write_u64(0x1000, DECL | (1 << 1));
    fixture.write_u64(0x1040, 0x1000);
    fixture.write_u64(0x1010, EXT_QUALS | (1 << 3));
    let session = fixture.session();

    // views of a pointer show the pair it points to
    let pointer = session
        .value_at("pp", &format!("{DECL_PAIR} *"), Address::new(0x1040))
        .unwrap();
    let mut view = session.view(pointer);
    assert_eq!(view.kind(), Some(AggregateKind::PointerIntPair));
    assert_eq!(session.read_unsigned(&child(&mut view, "Int")).unwrap(), 1);

    // older LLVM stores the word as a plain intptr_t
    let union_pair = session.value_at("v", TYPE_UNION_PAIR, Address::new(0x1010)).unwrap();
    let decoded = pointer_int_pair::decode(&session, &union_pair).unwrap();
    assert_eq!(decoded.storage.ty.name, "intptr_t");
    assert_eq!((decoded.pointer, decoded.int), (EXT_QUALS, 1));
}

#[test]
fn test_punned_pointer_view()
{
    let mut fixture = Fixture::new();
    fixture.write_u64(0x1000, DECL | (2 << 1));
    let session = fixture.session();

    let punned = session.value_at("d", DECL_PUNNED, Address::new(0x1000)).unwrap();
    let mut view = session.view(punned);
    assert_eq!(view.status(), &ViewStatus::Decoded(AggregateKind::PunnedPointer));
    assert_eq!(child_names(&mut view), ["Pointer"]);
    assert_eq!(slot_names(&mut view), ["Pointer", DEREFERENCE, "Data"]);

    // no tag stripping: the buffer holds the whole word
    let pointer = child(&mut view, "Pointer");
    assert_eq!(pointer.ty.name, "clang::Decl *");
    assert_eq!(session.read_unsigned(&pointer).unwrap(), DECL | (2 << 1));
    assert_eq!(child(&mut view, "Data").ty.name, "char[8]");
}

#[test]
fn test_pointer_union_selects_alternative_by_tag()
{
    let mut fixture = Fixture::new();
    fixture.write_u64(0x1010, EXT_QUALS | (1 << 3));
    fixture.write_u64(0x1018, TYPE);
    let session = fixture.session();

    let ext = session.value_at("u", TYPE_UNION, Address::new(0x1010)).unwrap();
    let decoded = pointer_union::decode(&session, &ext).unwrap();
    assert_eq!(decoded.tag, 1);
    assert_eq!(decoded.pointer, EXT_QUALS);
    assert_eq!(decoded.alternative.name, "const clang::ExtQuals *");

    let mut view = session.view(ext);
    assert_eq!(child_names(&mut view), ["Pointer"]);
    let pointer = child(&mut view, "Pointer");
    assert_eq!(pointer.ty.name, "const clang::ExtQuals *");
    assert_eq!(session.read_unsigned(&pointer).unwrap(), EXT_QUALS);
    let target = child(&mut view, DEREFERENCE);
    assert_eq!(target.ty.name, "clang::ExtQuals");
    assert_eq!(target.address(), Some(Address::new(EXT_QUALS)));

    let ty = session.value_at("u", TYPE_UNION, Address::new(0x1018)).unwrap();
    let decoded = pointer_union::decode(&session, &ty).unwrap();
    assert_eq!((decoded.pointer, decoded.tag), (TYPE, 0));
    assert_eq!(decoded.alternative.name, "const clang::Type *");
}

#[test]
fn test_pointer_union_rejects_tags_past_the_alternatives()
{
    let session = Fixture::new().session();
    let union_type = session.require_type(TYPE_UNION).unwrap();

    assert!(pointer_union::alternative(&session, &union_type, 1).is_ok());
    for tag in [2, 3, u64::MAX] {
        let err = pointer_union::alternative(&session, &union_type, tag).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownVariant { .. }), "tag {tag}: {err}");
    }
}

#[test]
fn test_qual_type_view()
{
    let mut fixture = Fixture::new();
    // const, pointing at a Type
    fixture.write_u64(0x1020, TYPE | 1);
    let session = fixture.session();

    let qt = session.value_at("q", "clang::QualType", Address::new(0x1020)).unwrap();
    let mut view = session.view(qt);
    assert_eq!(
        child_names(&mut view),
        ["Type", "LocalConstQualified", "LocalRestrictQualified", "LocalVolatileQualified"]
    );
    assert_eq!(view.index_of("Value"), Some(4));

    let ty = child(&mut view, "Type");
    assert_eq!(ty.ty.name, "clang::Type");
    assert_eq!(ty.address(), Some(Address::new(TYPE)));

    let flags: Vec<u64> = ["LocalConstQualified", "LocalRestrictQualified", "LocalVolatileQualified"]
        .into_iter()
        .map(|name| session.read_unsigned(&child(&mut view, name)).unwrap())
        .collect();
    assert_eq!(flags, [1, 0, 0]);
    assert_eq!(child(&mut view, "LocalConstQualified").ty.name, "bool");
}

#[test]
fn test_qual_type_over_ext_quals()
{
    let mut fixture = Fixture::new();
    // volatile, union tag selects ExtQuals
    fixture.write_u64(0x1020, EXT_QUALS | (1 << 3) | 4);
    let session = fixture.session();

    let qt = session.value_at("q", "clang::QualType", Address::new(0x1020)).unwrap();
    let decoded = qual_type::decode(&session, &qt).unwrap();
    assert_eq!(decoded.type_address, EXT_QUALS);
    assert_eq!(decoded.type_pointer.name, "const clang::ExtQuals *");
    assert!(decoded.qualifiers.is_volatile);
    assert!(!decoded.qualifiers.is_const);

    let mut view = session.view(qt);
    assert_eq!(child(&mut view, "Type").ty.name, "clang::ExtQuals");
}

#[test]
fn test_is_unqualified()
{
    let mut fixture = Fixture::new();
    fixture.write_u64(0x1020, TYPE);
    fixture.write_u64(0x1028, TYPE | 2);
    let session = fixture.session();

    let plain = session.value_at("a", "clang::QualType", Address::new(0x1020)).unwrap();
    let restrict = session.value_at("b", "clang::QualType", Address::new(0x1028)).unwrap();
    assert!(qual_type::is_unqualified(&session, &plain).unwrap());
    assert!(!qual_type::is_unqualified(&session, &restrict).unwrap());
}

#[test]
fn test_declaration_name_kinds()
{
    let mut fixture = Fixture::new();
    fixture.write_u64(0x1030, 0x1900);
    fixture.write_u64(0x1038, 0x1940 | 6);
    let session = fixture.session();

    let identifier = session.value_at("n", "clang::DeclarationName", Address::new(0x1030)).unwrap();
    let decoded = declaration_name::decode(&session, &identifier).unwrap();
    assert_eq!(decoded.kind_name, "StoredIdentifier");
    assert_eq!(decoded.pointee_type.name, "clang::IdentifierInfo");
    assert_eq!(decoded.pointer, 0x1900);

    let mut view = session.view(identifier);
    assert_eq!(child_names(&mut view), ["Pointer", "NameKind"]);
    let kind = child(&mut view, "NameKind");
    assert_eq!(kind.ty.name, "clang::DeclarationName::StoredNameKind");
    assert_eq!(session.enumerator_name(&kind).unwrap().as_deref(), Some("StoredIdentifier"));

    let operator = session.value_at("n", "clang::DeclarationName", Address::new(0x1038)).unwrap();
    let mut view = session.view(operator);
    let pointer = child(&mut view, "Pointer");
    assert_eq!(pointer.ty.name, "clang::detail::CXXOperatorIdName");
    assert_eq!(pointer.address(), Some(Address::new(0x1940)));
    let kind = child(&mut view, "NameKind");
    assert_eq!(session.enumerator_name(&kind).unwrap().as_deref(), Some("StoredCXXOperatorName"));
}

#[test]
fn test_declaration_name_with_missing_pointee_type_falls_back()
{
    let mut fixture = Fixture::new();
    // zero-argument selector; the fixture has no clang::Selector
    fixture.write_u64(0x1030, 0x1980 | 1);
    let session = fixture.session();

    let name = session.value_at("n", "clang::DeclarationName", Address::new(0x1030)).unwrap();
    assert!(matches!(
        declaration_name::decode(&session, &name),
        Err(DecodeError::TypeNotFound(missing)) if missing == "clang::Selector"
    ));

    let mut view = session.view(name);
    assert_eq!(child_names(&mut view), ["Ptr"]);
    assert!(matches!(
        view.status(),
        ViewStatus::Fallback {
            category: ErrorCategory::InvariantViolation,
            ..
        }
    ));
}

#[test]
fn test_narrow_pointer_pair_falls_back_without_breaking_the_session()
{
    const NARROW_PAIR: &str = "llvm::PointerIntPair<Narrow *, 1, unsigned int>";
    const NARROW_INFO: &str = "llvm::PointerIntPairInfo<Narrow *, 1>";

    let mut fixture = Fixture::new();
    fixture.registry.insert(TypeDescriptor::pointer_to("Narrow", 2));
    fixture.registry.insert(pair(NARROW_PAIR, "Narrow *", 1, NARROW_INFO, "intptr_t"));
    fixture.write_u64(0x1000, DECL | (2 << 1));
    let session = fixture.session();

    let narrow = session.value_at("n", NARROW_PAIR, Address::new(0x1020)).unwrap();
    assert!(matches!(
        pointer_int_pair::decode(&session, &narrow),
        Err(DecodeError::UnsupportedWidth(2))
    ));
    let mut view = session.view(narrow);
    assert_eq!(child_names(&mut view), ["Value"]);
    match view.status() {
        ViewStatus::Fallback { kind, category, reason } => {
            assert_eq!(*kind, AggregateKind::PointerIntPair);
            assert_eq!(*category, ErrorCategory::UnsupportedLayout);
            assert!(reason.contains("2 bytes"), "{reason}");
        }
        other => panic!("expected a fallback, got {other:?}"),
    }

    // the failure stays with that one view
    let pair = session.value_at("p", DECL_PAIR, Address::new(0x1000)).unwrap();
    let mut view = session.view(pair);
    assert_eq!(child_names(&mut view), ["Pointer", "Int"]);
    assert_eq!(view.status(), &ViewStatus::Decoded(AggregateKind::PointerIntPair));
    assert_eq!(session.read_unsigned(&child(&mut view, "Int")).unwrap(), 2);
}

#[test]
fn test_pointer_int_pair_on_big_endian_32_bit_target()
{
    const NODE_PAIR: &str = "llvm::PointerIntPair<Node *, 2, unsigned int>";
    const NODE_INFO: &str = "llvm::PointerIntPairInfo<Node *, 2>";
    const NODE_PUNNED: &str = "llvm::detail::PunnedPointer<Node *>";

    let mut registry = TypeRegistry::new(ByteOrder::Big, PointerWidth::Bits32);
    registry.insert(record("Node", 8, Vec::new()));
    let mut node_pair = pair(NODE_PAIR, "Node *", 2, NODE_INFO, NODE_PUNNED);
    node_pair.byte_size = 4;
    registry.insert(node_pair);
    registry.insert(record(NODE_INFO, 1, Vec::new()));
    let mut constants = pair_constants(NODE_INFO, -8, 1, 0x6);
    constants.byte_size = 4;
    registry.insert(constants);
    registry.insert(
        record(NODE_PUNNED, 4, vec![Member::field("Data", "char[4]", 0)])
            .with_template_args(vec![TemplateArg::Type("Node *".to_string())]),
    );
    let mut memory = SnapshotMemory::new();
    memory.add_region(0x100, 0x0000_0204u32.to_be_bytes().to_vec());
    let session = Session::new(Arc::new(memory), Arc::new(registry));

    let value = session.value_at("p", NODE_PAIR, Address::new(0x100)).unwrap();
    let decoded = pointer_int_pair::decode(&session, &value).unwrap();
    assert_eq!((decoded.pointer, decoded.int), (0x200, 2));
    assert_eq!(decoded.layout.width, PointerWidth::Bits32);
    assert_eq!(decoded.pointer_type.byte_size, 4);

    let mut view = session.view(value);
    assert_eq!(view.status(), &ViewStatus::Decoded(AggregateKind::PointerIntPair));
    let pointer = child(&mut view, "Pointer");
    assert_eq!(pointer.ty.name, "Node");
    assert_eq!(pointer.address(), Some(Address::new(0x200)));
    assert_eq!(session.read_unsigned(&child(&mut view, "Int")).unwrap(), 2);
}
