//! Label-derived content filters.
//!
//! A courier's or bin's label is parsed into a [`FilterResult`]: a set of
//! item identities to include plus term lists matched against identifier
//! paths and stack detail text. The grammar, token by token:
//!
//! - `term` -- plain identity term; includes every item whose identifier
//!   path contains it as a substring.
//! - `!term` -- plain exclusion term; rejects matching identifier paths.
//! - `.term` / `!.term` -- detail term; matched against the stack's
//!   rendered detail text (stamps, notes, treatments, label) instead of
//!   the identifier path.
//! - `$name` / `!$name` -- alias; expands to the configured term list, or
//!   to nothing when the alias is not configured.
//!
//! A label with no include terms of any kind matches everything (unless
//! exclusions reject); a label with only exclusions starts from the whole
//! catalog. Parsing is case-insensitive: the label is lowercased before
//! tokenizing, so equal labels always yield equal results.

use std::collections::BTreeSet;

use haulage_types::{ItemCatalog, ItemId, ItemStack};

use crate::config::FilterConfig;

// ---------------------------------------------------------------------------
// FilterResult
// ---------------------------------------------------------------------------

/// Parsed, resolved form of a filter label.
///
/// Immutable once built; cached by the lowercased label (see
/// [`FilterCache`](crate::cache::FilterCache)) and rebuilt from scratch
/// whenever the alias configuration changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterResult {
    /// Item identities that pass inclusion.
    include_items: BTreeSet<ItemId>,
    /// Plain exclusion terms, matched against identifier paths.
    exclude_terms: Vec<String>,
    /// Detail inclusion terms, matched against stack detail text.
    detail_include_terms: Vec<String>,
    /// Detail exclusion terms, matched against stack detail text.
    detail_exclude_terms: Vec<String>,
    /// Whether any plain include term was present.
    has_plain_includes: bool,
    /// Whether any include term (plain or detail) was present.
    has_any_includes: bool,
}

impl FilterResult {
    /// Whether the filter includes anything explicitly.
    ///
    /// `false` means match-all: every stack passes inclusion and only the
    /// exclusion terms can reject it.
    pub const fn has_any_includes(&self) -> bool {
        self.has_any_includes
    }

    /// Whether any plain (identity) include term was present.
    pub const fn has_plain_includes(&self) -> bool {
        self.has_plain_includes
    }

    /// The resolved include-item identity set.
    pub const fn include_items(&self) -> &BTreeSet<ItemId> {
        &self.include_items
    }

    /// Whether an item identity is in the resolved include set.
    pub fn includes_item(&self, item: &ItemId) -> bool {
        self.include_items.contains(item)
    }

    /// Test a stack against the filter.
    ///
    /// Inclusion first: match-all filters include everything; otherwise
    /// the item identity must be in the include set, or -- only when that
    /// misses and detail include terms exist -- the detail text must
    /// contain one of them. The detail text is rendered lazily, at most
    /// once. Stacks that pass inclusion are then rejected if any plain
    /// exclusion term hits the identifier path or any detail exclusion
    /// term hits the detail text.
    pub fn matches_stack(&self, stack: &ItemStack) -> bool {
        let mut detail_text: Option<String> = None;

        let included = if self.has_any_includes {
            let mut included = self.include_items.contains(&stack.item);
            if !included && !self.detail_include_terms.is_empty() {
                let text = detail_text.get_or_insert_with(|| stack.detail_text());
                included = self
                    .detail_include_terms
                    .iter()
                    .any(|term| text.contains(term.as_str()));
            }
            included
        } else {
            true
        };

        if !included {
            return false;
        }

        if !self.exclude_terms.is_empty() {
            let path = stack.item.path();
            if self.exclude_terms.iter().any(|term| path.contains(term.as_str())) {
                return false;
            }
        }

        if !self.detail_exclude_terms.is_empty() {
            let text = detail_text.get_or_insert_with(|| stack.detail_text());
            if self
                .detail_exclude_terms
                .iter()
                .any(|term| text.contains(term.as_str()))
            {
                return false;
            }
        }

        true
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a filter label against the given aliases and catalog.
///
/// The include-item set is resolved eagerly: with plain include terms it
/// holds every cataloged item whose path contains one of them; with only
/// exclusion terms it holds the whole catalog (exclusion-only mode); with
/// no terms at all it stays empty and the filter matches everything.
pub fn parse_filter(label: &str, config: &FilterConfig, catalog: &ItemCatalog) -> FilterResult {
    let lowered = label.to_lowercase();

    let mut include_terms: Vec<String> = Vec::new();
    let mut exclude_terms: Vec<String> = Vec::new();
    let mut detail_include_terms: Vec<String> = Vec::new();
    let mut detail_exclude_terms: Vec<String> = Vec::new();

    for token in lowered.split_whitespace() {
        let (exclude, term) = token
            .strip_prefix('!')
            .map_or((false, token), |rest| (true, rest));

        if let Some(detail_term) = term.strip_prefix('.') {
            if detail_term.is_empty() {
                continue;
            }
            if exclude {
                detail_exclude_terms.push(String::from(detail_term));
            } else {
                detail_include_terms.push(String::from(detail_term));
            }
        } else if let Some(alias_name) = term.strip_prefix('$') {
            let Some(alias_terms) = config.alias(alias_name) else {
                continue;
            };
            let expanded = alias_terms.iter().map(|t| t.to_lowercase());
            if exclude {
                exclude_terms.extend(expanded);
            } else {
                include_terms.extend(expanded);
            }
        } else if !term.is_empty() {
            if exclude {
                exclude_terms.push(String::from(term));
            } else {
                include_terms.push(String::from(term));
            }
        }
    }

    let has_plain_includes = !include_terms.is_empty();
    let has_detail_includes = !detail_include_terms.is_empty();

    let mut include_items: BTreeSet<ItemId> = BTreeSet::new();
    if !has_plain_includes && !has_detail_includes {
        if !exclude_terms.is_empty() || !detail_exclude_terms.is_empty() {
            // Only exclusions: start from every known item.
            include_items = catalog.iter().cloned().collect();
        }
    } else if has_plain_includes {
        for item in catalog {
            if include_terms
                .iter()
                .any(|term| item.path().contains(term.as_str()))
            {
                include_items.insert(item.clone());
            }
        }
    }

    FilterResult {
        include_items,
        exclude_terms,
        detail_include_terms,
        detail_exclude_terms,
        has_plain_includes,
        has_any_includes: has_plain_includes || has_detail_includes,
    }
}

// ---------------------------------------------------------------------------
// Effective stacks
// ---------------------------------------------------------------------------

/// Resolve the stack a deposit filter should be matched against.
///
/// A stack whose packed contents hold exactly one item type is represented
/// by a single unit of that type; anything else is returned unchanged.
/// The reduction applies to matching only -- the physical stack moved by
/// the transaction is always the original.
pub fn effective_stack(stack: &ItemStack) -> ItemStack {
    stack
        .uniform_packed_item()
        .map_or_else(|| stack.clone(), |item| ItemStack::new(item, 1))
}

// ===========================================================================
// Tests
// ===========================================================================
