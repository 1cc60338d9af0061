//! # Structural Views
//!
//! A [`SyntheticView`] is what a host shows in place of an aggregate's raw
//! members: an ordered, named child list assembled by the provider for the
//! aggregate's [`AggregateKind`].
//!
//! ## Contract
//!
//! - `child_count()`, `child_name(i)`, `child_at(i)`, `index_of(name)` and
//!   `update()`
//! - `index_of(child_name(i)) == i` for every visible index
//! - hidden alias children (`$$dereference$$`, raw backing members) sit after
//!   the visible ones in the same slot arena and are reachable by name only
//!
//! ## Staleness
//!
//! A view starts out stale. Any query on a stale view recomputes it first,
//! as does a change of the session's context generation. Every recomputation
//! starts a new epoch.
//!
//! ## Errors
//!
//! View operations never fail. A provider error is logged by category and
//! the view falls back to the raw underlying members; a child whose bytes
//! cannot be read comes back as [`ChildValue::Unavailable`].

pub mod builder;
pub mod kind;
pub mod providers;

use std::fmt;

pub use builder::{Slot, SlotOrigin, ViewBuilder};
pub use kind::AggregateKind;

use crate::error::{DecodeError, ErrorCategory};
use crate::session::Session;
use crate::value::Value;

/// Freshness of a view's slot arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState
{
    Stale,
    Fresh,
}

/// How the current child list came about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus
{
    /// No provider applies; the children are the raw members
    Plain,
    /// The provider for this kind succeeded
    Decoded(AggregateKind),
    /// The provider failed; the children are the raw members
    Fallback
    {
        kind: AggregateKind,
        category: ErrorCategory,
        reason: String,
    },
    /// Not even the raw members could be listed
    Unavailable
    {
        reason: String
    },
}

/// Stand-in for a child whose value cannot be produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder
{
    pub name: String,
    pub type_name: String,
    pub reason: String,
}

/// A child as handed to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildValue
{
    Value(Value),
    Unavailable(Placeholder),
}

impl ChildValue
{
    pub fn name(&self) -> &str
    {
        match self {
            ChildValue::Value(value) => &value.name,
            ChildValue::Unavailable(placeholder) => &placeholder.name,
        }
    }

    pub fn value(&self) -> Option<&Value>
    {
        match self {
            ChildValue::Value(value) => Some(value),
            ChildValue::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool
    {
        matches!(self, ChildValue::Value(_))
    }
}

impl fmt::Display for ChildValue
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            ChildValue::Value(value) => write!(f, "{value}"),
            ChildValue::Unavailable(placeholder) => write!(
                f,
                "({}) {} = <unavailable: {}>",
                placeholder.type_name, placeholder.name, placeholder.reason
            ),
        }
    }
}

/// Decoded child list of one value
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use bitview_core::prelude::*;
///
/// let mut registry = TypeRegistry::new(ByteOrder::Little, PointerWidth::Bits64);
/// registry.insert(
///     TypeDescriptor::new("Point", 8, TypeKind::Struct)
///         .with_members(vec![Member::field("x", "int", 0), Member::field("y", "int", 4)]),
/// );
/// let mut memory = SnapshotMemory::new();
/// memory.add_region(0x1000, vec![1, 0, 0, 0, 2, 0, 0, 0]);
/// let session = Session::new(Arc::new(memory), Arc::new(registry));
///
/// let point = session.value_at("p", "Point", Address::new(0x1000)).unwrap();
/// let mut view = session.view(point);
/// assert_eq!(view.child_count(), 2);
/// assert_eq!(view.index_of("y"), Some(1));
/// assert_eq!(view.status(), &ViewStatus::Plain);
/// ```
pub struct SyntheticView<'s>
{
    session: &'s Session,
    value: Value,
    kind: Option<AggregateKind>,
    state: ViewState,
    status: ViewStatus,
    slots: Vec<Slot>,
    visible: usize,
    epoch: u64,
    generation: u64,
    reordered: bool,
    changed: bool,
}

impl<'s> SyntheticView<'s>
{
    /// Create a stale view over `value`.
    ///
    /// The kind is recognized from the value's type, or from the pointee's
    /// for pointers and references.
    pub fn new(session: &'s Session, value: Value) -> Self
    {
        let kind = AggregateKind::recognize(value.ty.target_name().unwrap_or(&value.ty.name));
        Self {
            session,
            value,
            kind,
            state: ViewState::Stale,
            status: ViewStatus::Plain,
            slots: Vec::new(),
            visible: 0,
            epoch: 0,
            generation: session.generation(),
            reordered: false,
            changed: false,
        }
    }

    pub fn value(&self) -> &Value
    {
        &self.value
    }

    pub fn kind(&self) -> Option<AggregateKind>
    {
        self.kind
    }

    pub fn state(&self) -> ViewState
    {
        if self.generation == self.session.generation() {
            self.state
        } else {
            ViewState::Stale
        }
    }

    /// Number of recomputations so far
    pub fn epoch(&self) -> u64
    {
        self.epoch
    }

    /// Whether the last recomputation moved names shared with the epoch
    /// before it
    pub fn reordered(&self) -> bool
    {
        self.reordered
    }

    /// Mark the view stale; the next query recomputes it.
    pub fn invalidate(&mut self)
    {
        self.state = ViewState::Stale;
    }

    /// Recompute now. Returns whether the child layout changed.
    pub fn update(&mut self) -> bool
    {
        self.recompute();
        self.changed
    }

    pub fn status(&mut self) -> &ViewStatus
    {
        self.ensure_fresh();
        &self.status
    }

    /// Number of visible children
    pub fn child_count(&mut self) -> usize
    {
        self.ensure_fresh();
        self.visible
    }

    /// Name of the child at `index` (visible or hidden)
    pub fn child_name(&mut self, index: usize) -> Option<&str>
    {
        self.ensure_fresh();
        self.slots.get(index).map(|slot| slot.name.as_str())
    }

    /// Index of the child called `name` (visible or hidden)
    pub fn index_of(&mut self, name: &str) -> Option<usize>
    {
        self.ensure_fresh();
        self.slots.iter().position(|slot| slot.name == name)
    }

    /// Child at `index` (visible or hidden), probed for readability.
    pub fn child_at(&mut self, index: usize) -> Option<ChildValue>
    {
        self.ensure_fresh();
        let slot = self.slots.get(index)?;
        let value = slot.value.clone_named(slot.name.clone());
        Some(match self.session.probe(&value) {
            Ok(()) => ChildValue::Value(value),
            Err(err) => {
                tracing::debug!(child = %slot.name, error = %err, "child unavailable");
                ChildValue::Unavailable(Placeholder {
                    name: slot.name.clone(),
                    type_name: value.ty.name.clone(),
                    reason: err.to_string(),
                })
            }
        })
    }

    /// All visible children, in order.
    pub fn children(&mut self) -> Vec<ChildValue>
    {
        let count = self.child_count();
        (0..count).filter_map(|index| self.child_at(index)).collect()
    }

    /// The whole slot arena, hidden slots included.
    pub fn slots(&mut self) -> &[Slot]
    {
        self.ensure_fresh();
        &self.slots
    }

    fn ensure_fresh(&mut self)
    {
        if self.state() == ViewState::Stale {
            self.recompute();
        }
    }

    fn recompute(&mut self)
    {
        let _scope = self.session.trace("view_update");
        let generation = self.session.generation();
        let (builder, status) = self.build();
        let (slots, visible) = builder.finish();

        let previous: Vec<&str> = self.slots.iter().map(|slot| slot.name.as_str()).collect();
        let current: Vec<&str> = slots.iter().map(|slot| slot.name.as_str()).collect();
        let changed = self.epoch == 0 || previous != current || self.visible != visible || self.status != status;
        let reordered = self.epoch > 0 && is_reordered(&previous, &current);

        self.slots = slots;
        self.visible = visible;
        self.status = status;
        self.changed = changed;
        self.reordered = reordered;
        self.epoch += 1;
        self.generation = generation;
        self.state = ViewState::Fresh;

        tracing::trace!(
            value = %self.value.name,
            kind = self.kind.map_or("-", AggregateKind::name),
            epoch = self.epoch,
            visible,
            hidden = self.slots.len() - visible,
            changed,
            "view recomputed"
        );
    }

    fn build(&self) -> (ViewBuilder, ViewStatus)
    {
        let target = match self.session.resolve_target(&self.value) {
            Ok(target) => target,
            Err(err) => {
                report(self.kind, &self.value, &err);
                return (ViewBuilder::new(), ViewStatus::Unavailable { reason: err.to_string() });
            }
        };

        let Some(kind) = self.kind else {
            return match self.session.children(&target) {
                Ok(children) => (ViewBuilder::from_underlying(children), ViewStatus::Plain),
                Err(err) => {
                    report(None, &target, &err);
                    (ViewBuilder::new(), ViewStatus::Unavailable { reason: err.to_string() })
                }
            };
        };

        match kind.build(self.session, &target) {
            Ok(builder) => (builder, ViewStatus::Decoded(kind)),
            Err(err) => {
                report(Some(kind), &target, &err);
                match self.session.children(&target) {
                    Ok(children) => {
                        let status = ViewStatus::Fallback {
                            kind,
                            category: err.category(),
                            reason: err.to_string(),
                        };
                        (ViewBuilder::from_underlying(children), status)
                    }
                    Err(raw_err) => {
                        report(Some(kind), &target, &raw_err);
                        let reason = format!("{err}; raw members: {raw_err}");
                        (ViewBuilder::new(), ViewStatus::Unavailable { reason })
                    }
                }
            }
        }
    }
}

impl fmt::Debug for SyntheticView<'_>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("SyntheticView")
            .field("value", &self.value.name)
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("epoch", &self.epoch)
            .field("slots", &self.slots.len())
            .finish_non_exhaustive()
    }
}

/// Whether names present in both lists appear in a different relative order.
fn is_reordered(previous: &[&str], current: &[&str]) -> bool
{
    let kept_previous = previous.iter().filter(|name| current.contains(name));
    let kept_current = current.iter().filter(|name| previous.contains(name));
    !kept_previous.eq(kept_current)
}

fn report(kind: Option<AggregateKind>, value: &Value, err: &DecodeError)
{
    let kind = kind.map_or("-", AggregateKind::name);
    match err.category() {
        ErrorCategory::UnsupportedLayout => {
            tracing::warn!(kind, value = %value.name, ty = %value.ty.name, error = %err, "could not format, showing raw members");
        }
        ErrorCategory::ReadFailure => {
            tracing::debug!(kind, value = %value.name, error = %err, "value unavailable");
        }
        ErrorCategory::InvariantViolation | ErrorCategory::Environment => {
            tracing::error!(kind, value = %value.name, ty = %value.ty.name, error = %err, "layout assumption broken");
        }
    }
}

#[cfg(test)]
mod tests
{
    use std::sync::Arc;

    use super::*;
    use crate::memory::SnapshotMemory;
    use crate::registry::TypeRegistry;
    use crate::types::{Address, ByteOrder, Member, PointerWidth, TypeDescriptor, TypeKind};

    fn point_session() -> Session
    {
        let mut registry = TypeRegistry::new(ByteOrder::Little, PointerWidth::Bits64);
        registry.insert(
            TypeDescriptor::new("Point", 8, TypeKind::Struct)
                .with_members(vec![Member::field("x", "int", 0), Member::field("y", "int", 4)]),
        );
        let mut memory = SnapshotMemory::new();
        memory.add_region(0x100, vec![1, 0, 0, 0, 2, 0, 0, 0]);
        memory.add_region(0x200, 0x100u64.to_le_bytes().to_vec());
        Session::new(Arc::new(memory), Arc::new(registry))
    }

    #[test]
    fn test_stale_view_recomputes_on_first_query()
    {
        let session = point_session();
        let point = session.value_at("p", "Point", Address::new(0x100)).unwrap();
        let mut view = session.view(point);

        assert_eq!(view.state(), ViewState::Stale);
        assert_eq!(view.epoch(), 0);
        assert_eq!(view.child_count(), 2);
        assert_eq!(view.state(), ViewState::Fresh);
        assert_eq!(view.epoch(), 1);

        // fresh: no recomputation
        view.child_name(0);
        assert_eq!(view.epoch(), 1);
    }

    #[test]
    fn test_context_change_marks_view_stale()
    {
        let session = point_session();
        let point = session.value_at("p", "Point", Address::new(0x100)).unwrap();
        let mut view = session.view(point);
        view.child_count();

        session.set_context();
        assert_eq!(view.state(), ViewState::Stale);
        assert_eq!(view.index_of("x"), Some(0));
        assert_eq!(view.epoch(), 2);
        assert!(!view.reordered());
    }

    #[test]
    fn test_update_reports_layout_changes()
    {
        let session = point_session();
        let point = session.value_at("p", "Point", Address::new(0x100)).unwrap();
        let mut view = session.view(point);

        assert!(view.update());
        assert!(!view.update());
        view.invalidate();
        assert_eq!(view.state(), ViewState::Stale);
    }

    #[test]
    fn test_pointer_views_show_the_pointee()
    {
        let session = point_session();
        let pointer = session.value_at("pp", "Point *", Address::new(0x200)).unwrap();
        let mut view = session.view(pointer);

        let children = view.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].value().unwrap().address(), Some(Address::new(0x104)));
    }

    #[test]
    fn test_unreadable_target_gives_unavailable_status()
    {
        let session = point_session();
        let pointer = session.value_at("bad", "Point *", Address::new(0x9000)).unwrap();
        let mut view = session.view(pointer);

        assert_eq!(view.child_count(), 0);
        assert!(matches!(view.status(), ViewStatus::Unavailable { .. }));
    }

    #[test]
    fn test_failed_decode_without_raw_members_is_unavailable()
    {
        let mut registry = TypeRegistry::new(ByteOrder::Little, PointerWidth::Bits64);
        registry.insert(
            TypeDescriptor::new("llvm::PointerIntPair<Point *, 1, unsigned int>", 8, TypeKind::Struct)
                .with_members(vec![Member::field("Value", "Unregistered", 0)]),
        );
        let mut memory = SnapshotMemory::new();
        memory.add_region(0x100, vec![0; 8]);
        let session = Session::new(Arc::new(memory), Arc::new(registry));
        let pair = session
            .value_at("pair", "llvm::PointerIntPair<Point *, 1, unsigned int>", Address::new(0x100))
            .unwrap();
        let mut view = session.view(pair);

        assert_eq!(view.child_count(), 0);
        match view.status() {
            ViewStatus::Unavailable { reason } => assert!(reason.contains("Unregistered"), "{reason}"),
            other => panic!("expected an unavailable view, got {other:?}"),
        }
    }

    #[test]
    fn test_reorder_detection()
    {
        assert!(!is_reordered(&["a", "b"], &["a", "b", "c"]));
        assert!(is_reordered(&["a", "b"], &["b", "a"]));
        assert!(!is_reordered(&["a", "b"], &["b"]));
    }
}
