//! Item model: identifiers, stacks, detail text, and the catalog.
//!
//! Goods are identified by a canonical snake_case path ([`ItemId`]) such as
//! `iron_ingot`. A stack carries a count plus descriptive details --
//! certification stamps, handling notes, treatments, and an optional label
//! -- whose lowercased concatenation ([`ItemStack::detail_text`]) is what
//! detail-level filter terms match against. Packed goods (a crate of
//! crates) nest stacks inside a stack; a uniformly packed stack can be
//! reduced to a representative unit of its content type.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ItemId
// ---------------------------------------------------------------------------

/// Canonical identifier of a kind of good.
///
/// The wrapped string is the item's stable identifier path, always
/// lowercase snake_case. Identity-level filter terms match against this
/// path by substring, never against display names.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ItemId(String);

impl ItemId {
    /// Create an identifier from its path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The identifier path.
    pub fn path(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ItemStack
// ---------------------------------------------------------------------------

/// Largest count a single slot or hand can hold of one item.
pub const MAX_STACK_SIZE: u32 = 64;

/// A quantity of one kind of good, with its descriptive details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// The kind of good.
    pub item: ItemId,
    /// How many units this stack holds.
    pub count: u32,
    /// Certification stamps applied to the goods.
    #[serde(default)]
    pub stamps: Vec<String>,
    /// Free-form handling notes.
    #[serde(default)]
    pub notes: Vec<String>,
    /// Treatments the goods have received.
    #[serde(default)]
    pub treatments: Vec<String>,
    /// Optional label written on the stack.
    #[serde(default)]
    pub label: Option<String>,
    /// Stacks nested inside this one (packed goods).
    #[serde(default)]
    pub packed: Vec<ItemStack>,
}

impl ItemStack {
    /// Create a plain stack with no details.
    pub const fn new(item: ItemId, count: u32) -> Self {
        Self {
            item,
            count,
            stamps: Vec::new(),
            notes: Vec::new(),
            treatments: Vec::new(),
            label: None,
            packed: Vec::new(),
        }
    }

    /// Whether the stack holds nothing.
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Maximum count a slot can hold of this item.
    pub const fn max_stack_size(&self) -> u32 {
        MAX_STACK_SIZE
    }

    /// Whether two stacks hold the same kind of good, ignoring details.
    pub fn is_same_item(&self, other: &Self) -> bool {
        self.item == other.item
    }

    /// Whether two stacks hold the same good with identical details.
    ///
    /// This is the mergeability test: stacks that differ in stamps, notes,
    /// treatments, label, or packed contents must not be combined.
    pub fn is_same_item_same_details(&self, other: &Self) -> bool {
        self.item == other.item
            && self.stamps == other.stamps
            && self.notes == other.notes
            && self.treatments == other.treatments
            && self.label == other.label
            && self.packed == other.packed
    }

    /// Render the searchable detail text for this stack.
    ///
    /// Concatenates stamps, notes, treatments, and the label, separated by
    /// spaces and lowercased. Detail-level filter terms are matched against
    /// this string by substring.
    pub fn detail_text(&self) -> String {
        let mut text = String::new();
        for stamp in &self.stamps {
            text.push_str(stamp);
            text.push(' ');
        }
        for note in &self.notes {
            text.push_str(note);
            text.push(' ');
        }
        for treatment in &self.treatments {
            text.push_str(treatment);
            text.push(' ');
        }
        if let Some(label) = &self.label {
            text.push_str(label);
            text.push(' ');
        }
        text.to_lowercase()
    }

    /// The single item type this stack's packed contents hold, if uniform.
    ///
    /// Returns `None` when the stack has no packed contents, when every
    /// packed stack is empty, or when the contents mix item types.
    pub fn uniform_packed_item(&self) -> Option<ItemId> {
        let mut uniform: Option<&ItemId> = None;
        for contained in &self.packed {
            if contained.is_empty() {
                continue;
            }
            match uniform {
                None => uniform = Some(&contained.item),
                Some(seen) if *seen == contained.item => {}
                Some(_) => return None,
            }
        }
        uniform.cloned()
    }
}

// ---------------------------------------------------------------------------
// ItemCatalog
// ---------------------------------------------------------------------------

/// The registry of every item identifier known to the simulation.
///
/// Include-term resolution iterates the catalog in insertion order; the
/// order is otherwise insignificant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCatalog {
    items: Vec<ItemId>,
}

impl ItemCatalog {
    /// Build a catalog from identifier paths.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: paths.into_iter().map(ItemId::new).collect(),
        }
    }

    /// Iterate every known item identifier.
    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.items.iter()
    }

    /// Whether the catalog lists the given identifier.
    pub fn contains(&self, item: &ItemId) -> bool {
        self.items.contains(item)
    }

    /// Number of cataloged items.
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog is empty.
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a ItemCatalog {
    type Item = &'a ItemId;
    type IntoIter = core::slice::Iter<'a, ItemId>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stamped(path: &str, stamps: &[&str]) -> ItemStack {
        let mut stack = ItemStack::new(ItemId::new(path), 1);
        stack.stamps = stamps.iter().map(|s| String::from(*s)).collect();
        stack
    }

    #[test]
    fn detail_text_is_lowercased_concatenation() {
        let mut stack = stamped("wool_bale", &["Grade-A"]);
        stack.notes.push(String::from("Keep Dry"));
        stack.label = Some(String::from("NORTH DOCK"));
        let text = stack.detail_text();
        assert!(text.contains("grade-a"));
        assert!(text.contains("keep dry"));
        assert!(text.contains("north dock"));
    }

    #[test]
    fn detail_text_empty_for_plain_stack() {
        let stack = ItemStack::new(ItemId::new("iron_ingot"), 4);
        assert!(stack.detail_text().is_empty());
    }

    #[test]
    fn same_item_ignores_details() {
        let plain = ItemStack::new(ItemId::new("iron_ingot"), 1);
        let marked = stamped("iron_ingot", &["grade-a"]);
        assert!(plain.is_same_item(&marked));
        assert!(!plain.is_same_item_same_details(&marked));
    }

    #[test]
    fn same_details_requires_equal_detail_fields() {
        let a = stamped("iron_ingot", &["grade-a"]);
        let b = stamped("iron_ingot", &["grade-a"]);
        assert!(a.is_same_item_same_details(&b));
    }

    #[test]
    fn uniform_packed_item_detected() {
        let mut crate_stack = ItemStack::new(ItemId::new("bundle_crate"), 1);
        crate_stack.packed.push(ItemStack::new(ItemId::new("iron_ingot"), 8));
        crate_stack.packed.push(ItemStack::new(ItemId::new("iron_ingot"), 3));
        assert_eq!(
            crate_stack.uniform_packed_item(),
            Some(ItemId::new("iron_ingot"))
        );
    }

    #[test]
    fn mixed_packed_contents_are_not_uniform() {
        let mut crate_stack = ItemStack::new(ItemId::new("bundle_crate"), 1);
        crate_stack.packed.push(ItemStack::new(ItemId::new("iron_ingot"), 8));
        crate_stack.packed.push(ItemStack::new(ItemId::new("gold_bar"), 1));
        assert_eq!(crate_stack.uniform_packed_item(), None);
    }

    #[test]
    fn empty_packed_contents_are_not_uniform() {
        let mut crate_stack = ItemStack::new(ItemId::new("bundle_crate"), 1);
        crate_stack.packed.push(ItemStack::new(ItemId::new("iron_ingot"), 0));
        assert_eq!(crate_stack.uniform_packed_item(), None);
    }

    #[test]
    fn stack_serde_round_trip() {
        let mut stack = stamped("wool_bale", &["grade-a"]);
        stack.label = Some(String::from("north dock"));
        let json = serde_json::to_string(&stack);
        let back: Option<ItemStack> = json
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok());
        assert_eq!(back, Some(stack));
    }

    #[test]
    fn stack_deserializes_with_missing_detail_fields() {
        let parsed: Option<ItemStack> =
            serde_json::from_str(r#"{"item":"iron_ingot","count":3}"#).ok();
        assert_eq!(
            parsed.map(|s| (s.item, s.count, s.stamps.len())),
            Some((ItemId::new("iron_ingot"), 3, 0))
        );
    }

    #[test]
    fn catalog_lookup_and_order() {
        let catalog = ItemCatalog::from_paths(["iron_ingot", "gold_bar"]);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains(&ItemId::new("iron_ingot")));
        assert!(!catalog.contains(&ItemId::new("tin_ingot")));
        let first = catalog.iter().next();
        assert_eq!(first.map(ItemId::path), Some("iron_ingot"));
    }
}
