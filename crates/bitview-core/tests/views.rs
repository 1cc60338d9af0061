//! Tests for view lifecycle: staleness, recomputation and layout changes
//! when the inspected memory changes under a view.

mod common;

use bitview_core::prelude::*;
use common::*;

#[test]
fn test_view_is_snapshot_consistent_until_update()
{
    let mut fixture = Fixture::new();
    // TC = Builtin
    fixture.write_u64(0x1510, 0);
    let (session, memory) = fixture.shared_session();

    let ty = session.value_at("t", "clang::Type", Address::new(0x1500)).unwrap();
    let mut view = session.view(ty);
    assert_eq!(view.state(), ViewState::Stale);
    assert_eq!(view.child_count(), 3);
    assert_eq!(view.epoch(), 1);

    // the class flips to Pointer, but the view has not been told
    memory.write_u64(0x1510, 1);
    assert_eq!(view.state(), ViewState::Fresh);
    assert_eq!(view.child_count(), 3);
    assert_eq!(view.index_of("BuiltinTypeBits"), Some(2));

    session.set_context();
    assert_eq!(view.state(), ViewState::Stale);
    assert!(view.update());
    assert_eq!(view.epoch(), 2);
    assert_eq!(view.child_count(), 2);
    assert_eq!(view.index_of("BuiltinTypeBits"), None);
    assert!(!view.reordered());

    // nothing changed since
    assert!(!view.update());
}

#[test]
fn test_every_epoch_has_its_own_indices()
{
    let mut fixture = Fixture::new();
    fixture.write_u64(0x1708, 1);
    let (session, memory) = fixture.shared_session();

    let context = session.value_at("dc", "clang::DeclContext", Address::new(0x1700)).unwrap();
    let mut view = session.view(context);
    let before = child_names(&mut view);
    assert_eq!(before, ["DeclContextBits", "FirstDecl", "RecordDeclBits"]);

    // Var is not a context: the view falls back to the raw members
    memory.write_u64(0x1708, 3);
    view.invalidate();
    let after = child_names(&mut view);
    assert_eq!(after, ["(anonymous union)", "FirstDecl"]);
    assert!(matches!(view.status(), ViewStatus::Fallback { .. }));
    assert!(!view.reordered());
    for (index, name) in after.iter().enumerate() {
        assert_eq!(view.index_of(name), Some(index));
    }

    memory.write_u64(0x1708, 1);
    assert!(view.update());
    assert_eq!(child_names(&mut view), before);
    assert_eq!(view.status(), &ViewStatus::Decoded(AggregateKind::DeclContext));
}

#[test]
fn test_children_lists_visible_slots_only()
{
    let mut fixture = Fixture::new();
    fixture.write_u64(0x1000, 0x1100 | (1 << 1));
    let session = fixture.session();

    let pair = session.value_at("p", DECL_PAIR, Address::new(0x1000)).unwrap();
    let mut view = session.view(pair);
    let children = view.children();
    let names: Vec<&str> = children.iter().map(|child| child.name()).collect();
    assert_eq!(names, ["Pointer", "Int"]);
    assert!(children.iter().all(|child| child.is_available()));
    let visible = view.child_count();
    let total = view.slots().len();
    assert_eq!(total, 4);
    assert_eq!(view.child_name(visible + 1), Some("Value"));
    assert!(view.child_name(total).is_none());
}

#[test]
fn test_plain_aggregates_pass_members_through()
{
    let mut fixture = Fixture::new();
    fixture.write_u32(0x1108, 77);
    let session = fixture.session();

    let decl = session.value_at("d", "clang::Decl", Address::new(0x1100)).unwrap();
    let mut view = session.view(decl);
    assert_eq!(view.kind(), None);
    assert_eq!(view.status(), &ViewStatus::Plain);
    assert_eq!(child_names(&mut view), ["NextInContextAndBits", "Loc"]);
    assert_eq!(session.read_unsigned(&child(&mut view, "Loc")).unwrap(), 77);
}
