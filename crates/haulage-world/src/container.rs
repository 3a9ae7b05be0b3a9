//! Bin containers: slot storage with locks, labels, and open-claims.
//!
//! A [`BinContainer`] is the item storage behind a bin cell. Slots hold at
//! most one stack each. The container also tracks which couriers currently
//! have it open -- the queue predicate reads this set fresh every step, so
//! there is no persistent lock object anywhere; whoever observes the set
//! non-empty while travelling simply queues.

use std::collections::BTreeSet;

use haulage_types::{AgentId, ItemStack};

/// Item storage at a bin cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinContainer {
    /// Slot storage; `None` is an empty slot.
    slots: Vec<Option<ItemStack>>,
    /// Whether access to the container is locked.
    locked: bool,
    /// The label written on the bin, if any. Drives deposit filters.
    label: Option<String>,
    /// Couriers that currently have this container open.
    open_by: BTreeSet<AgentId>,
}

impl BinContainer {
    /// Create an empty container with the given number of slots.
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
            locked: false,
            label: None,
            open_by: BTreeSet::new(),
        }
    }

    /// Number of slots.
    pub const fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The stack in a slot, if the slot exists and is occupied.
    pub fn slot(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Replace the contents of a slot. Out-of-range indices are ignored.
    pub fn set_slot(&mut self, index: usize, stack: Option<ItemStack>) {
        if let Some(entry) = self.slots.get_mut(index) {
            *entry = stack.filter(|s| !s.is_empty());
        }
    }

    /// Mutable access to the stack in a slot.
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut ItemStack> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Whether every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Iterate the occupied slots as `(index, stack)` pairs.
    pub fn occupied_slots(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|s| (i, s)))
    }

    /// Iterate the occupied stacks.
    pub fn stacks(&self) -> impl Iterator<Item = &ItemStack> {
        self.occupied_slots().map(|(_, s)| s)
    }

    /// Remove up to `count` units from a slot.
    ///
    /// Returns the removed stack (details preserved), or `None` if the
    /// slot is missing or empty. The slot is cleared when fully drained.
    pub fn remove_items(&mut self, index: usize, count: u32) -> Option<ItemStack> {
        let entry = self.slots.get_mut(index)?;
        let stack = entry.as_mut()?;
        let taken = stack.count.min(count);
        if taken == 0 {
            return None;
        }
        let mut removed = stack.clone();
        removed.count = taken;
        stack.count = stack.count.saturating_sub(taken);
        if stack.count == 0 {
            *entry = None;
        }
        Some(removed)
    }

    /// Add a stack into the first empty slot. Returns the stack back if
    /// no slot is free.
    pub fn insert_into_empty_slot(&mut self, stack: ItemStack) -> Option<ItemStack> {
        for entry in &mut self.slots {
            if entry.is_none() {
                *entry = Some(stack);
                return None;
            }
        }
        Some(stack)
    }

    // -----------------------------------------------------------------------
    // Lock and label
    // -----------------------------------------------------------------------

    /// Whether access to this container is locked.
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Lock or unlock the container.
    pub const fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// The label written on the bin, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Write or erase the bin's label.
    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    // -----------------------------------------------------------------------
    // Open-claims
    // -----------------------------------------------------------------------

    /// Record that a courier opened this container.
    pub fn open(&mut self, agent: AgentId) {
        self.open_by.insert(agent);
    }

    /// Record that a courier closed this container.
    pub fn close(&mut self, agent: AgentId) {
        self.open_by.remove(&agent);
    }

    /// Whether any courier currently has this container open.
    pub fn is_open(&self) -> bool {
        !self.open_by.is_empty()
    }

    /// Whether a specific courier has this container open.
    pub fn is_open_by(&self, agent: AgentId) -> bool {
        self.open_by.contains(&agent)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
