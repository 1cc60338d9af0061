//! Child list under construction.

use std::collections::HashSet;

use crate::error::{DecodeError, DecodeResult};
use crate::value::Value;

/// Where a view child came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOrigin
{
    /// One of the aggregate's own members, passed through
    Underlying,
    /// Produced by the decoder (replaced or appended)
    Decoded,
}

/// One entry of a view's slot arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot
{
    pub name: String,
    pub value: Value,
    pub origin: SlotOrigin,
}

/// Ordered child list a provider edits: start from the underlying members,
/// replace the ones that need decoding, append synthesized fields, and stash
/// alias children in the hidden section.
#[derive(Debug, Default)]
pub struct ViewBuilder
{
    visible: Vec<Slot>,
    hidden: Vec<Slot>,
}

impl ViewBuilder
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Start from the aggregate's underlying children, in order.
    pub fn from_underlying(children: Vec<Value>) -> Self
    {
        let visible = children
            .into_iter()
            .map(|value| Slot {
                name: value.name.clone(),
                value,
                origin: SlotOrigin::Underlying,
            })
            .collect();
        Self {
            visible,
            hidden: Vec::new(),
        }
    }

    /// Append a decoded child after everything visible so far.
    pub fn push(&mut self, value: Value)
    {
        self.visible.push(decoded(value));
    }

    /// Add a child reachable only by name.
    pub fn hide(&mut self, value: Value)
    {
        self.hidden.push(decoded(value));
    }

    /// Index of the first visible child matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&Value) -> bool) -> Option<usize>
    {
        self.visible.iter().position(|slot| predicate(&slot.value))
    }

    pub fn value(&self, index: usize) -> Option<&Value>
    {
        self.visible.get(index).map(|slot| &slot.value)
    }

    /// Put a decoded child in place of the visible child at `index`.
    pub fn replace(&mut self, index: usize, value: Value) -> DecodeResult<()>
    {
        let slot = self.visible.get_mut(index).ok_or_else(|| {
            DecodeError::InvariantViolation(format!("no child at index {index} to replace with {}", value.name))
        })?;
        *slot = decoded(value);
        Ok(())
    }

    /// Put a decoded child in place of the visible child called `name`.
    pub fn replace_named(&mut self, name: &str, value: Value) -> DecodeResult<()>
    {
        let index = self
            .visible
            .iter()
            .position(|slot| slot.name == name)
            .ok_or_else(|| DecodeError::InvariantViolation(format!("no child named {name} to replace")))?;
        self.replace(index, value)
    }

    pub fn visible_len(&self) -> usize
    {
        self.visible.len()
    }

    /// Flatten into the slot arena (visible first, then hidden) and the
    /// number of visible slots.
    ///
    /// Names are made unique across the arena: later duplicates get a `#n`
    /// suffix, so lookup by name always finds the slot that carries it.
    pub(crate) fn finish(self) -> (Vec<Slot>, usize)
    {
        let visible = self.visible.len();
        let mut taken = HashSet::new();
        let slots = self
            .visible
            .into_iter()
            .chain(self.hidden)
            .map(|mut slot| {
                if !taken.insert(slot.name.clone()) {
                    let mut suffix = 2;
                    while !taken.insert(format!("{}#{suffix}", slot.name)) {
                        suffix += 1;
                    }
                    slot.name = format!("{}#{suffix}", slot.name);
                }
                slot
            })
            .collect();
        (slots, visible)
    }
}

fn decoded(value: Value) -> Slot
{
    Slot {
        name: value.name.clone(),
        value,
        origin: SlotOrigin::Decoded,
    }
}
