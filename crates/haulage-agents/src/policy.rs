//! Haul policies: the three pluggable decision points of the transport
//! behavior.
//!
//! The state machine never hard-codes what counts as a takeable stack, a
//! viable source, or an acceptable deposit; it asks a [`HaulPolicy`]
//! supplied at construction. [`DefaultPolicy`] gives the plain rules
//! (first non-empty slot, non-empty source, empty-or-matching deposit).
//! [`FilterPolicy`] layers label-derived content filters on top, including
//! the reserved wildcard deposit routing.

use std::sync::Arc;

use haulage_types::{ItemId, ItemStack};

use crate::agent::CourierBody;
use crate::cache::FilterEngine;

/// The reserved bin label that triggers wildcard deposit routing.
pub const WILDCARD_LABEL: &str = "*";

// ---------------------------------------------------------------------------
// Decision context and verdicts
// ---------------------------------------------------------------------------

/// What a deposit decision may conclude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositVerdict {
    /// The container takes the held stack.
    Accept,
    /// The container refuses the held stack.
    Reject,
    /// The container refuses for now, but its position should be recorded
    /// as the courier's wildcard fallback destination.
    Defer,
}

/// Everything a deposit decision can see.
#[derive(Debug)]
pub struct DepositContext<'a> {
    /// The courier attempting the deposit.
    pub courier: &'a CourierBody,
    /// The stack in the courier's hand.
    pub held: &'a ItemStack,
    /// The label on the logical container, if any.
    pub container_label: Option<&'a str>,
    /// Whether every slot of the logical container is empty.
    pub container_empty: bool,
    /// The occupied stacks of the logical container.
    pub stacks: Vec<&'a ItemStack>,
    /// Whether the courier's forced-fallback flag names this exact
    /// container position.
    pub forced_here: bool,
}

impl DepositContext<'_> {
    fn holds_same_item(&self, stack: &ItemStack) -> bool {
        self.stacks.iter().any(|s| s.is_same_item(stack))
    }

    /// The plain deposit rule: empty container, or one already holding
    /// the same kind of good.
    fn empty_or_matching(&self, stack: &ItemStack) -> DepositVerdict {
        if self.container_empty || self.holds_same_item(stack) {
            DepositVerdict::Accept
        } else {
            DepositVerdict::Reject
        }
    }
}

// ---------------------------------------------------------------------------
// HaulPolicy trait
// ---------------------------------------------------------------------------

/// The three decision points the state machine delegates.
pub trait HaulPolicy: Send + Sync {
    /// Whether a pickup may take this stack.
    ///
    /// The machine scans the source's slots in order and takes the first
    /// occupied one this accepts.
    fn pickup_matches(&self, courier: &CourierBody, stack: &ItemStack) -> bool {
        let _ = (courier, stack);
        true
    }

    /// Whether a candidate source container is worth targeting.
    ///
    /// Consulted at search time, only while the courier is empty-handed.
    /// `stacks` holds the occupied stacks of the logical container.
    fn source_viable(&self, courier: &CourierBody, stacks: &[&ItemStack]) -> bool {
        let _ = courier;
        !stacks.is_empty()
    }

    /// Whether a destination container accepts the held stack.
    fn deposit_verdict(&self, ctx: &DepositContext<'_>) -> DepositVerdict {
        ctx.empty_or_matching(ctx.held)
    }
}

/// The plain rules, with no filtering anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl HaulPolicy for DefaultPolicy {}

// ---------------------------------------------------------------------------
// FilterPolicy
// ---------------------------------------------------------------------------

/// Label-driven decisions backed by a shared [`FilterEngine`].
///
/// Unlabeled couriers and bins fall back to the plain rules; labels are
/// parsed through the engine's cache on every decision, so configuration
/// changes take effect at the next step.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    filters: Arc<FilterEngine>,
}

impl FilterPolicy {
    /// Create a policy over the given filter engine.
    pub const fn new(filters: Arc<FilterEngine>) -> Self {
        Self { filters }
    }

    /// The stack deposit filters are matched against: uniformly packed
    /// goods reduce to a representative unit of their content type.
    fn effective_held(held: &ItemStack) -> Option<ItemStack> {
        held.uniform_packed_item()
            .map(|item: ItemId| ItemStack::new(item, 1))
    }
}

impl HaulPolicy for FilterPolicy {
    fn pickup_matches(&self, courier: &CourierBody, stack: &ItemStack) -> bool {
        courier.filter_label().is_none_or(|label| {
            self.filters.filter_for(label).matches_stack(stack)
        })
    }

    fn source_viable(&self, courier: &CourierBody, stacks: &[&ItemStack]) -> bool {
        courier.filter_label().map_or_else(
            || !stacks.is_empty(),
            |label| {
                let result = self.filters.filter_for(label);
                stacks.iter().any(|stack| result.matches_stack(stack))
            },
        )
    }

    fn deposit_verdict(&self, ctx: &DepositContext<'_>) -> DepositVerdict {
        let effective = Self::effective_held(ctx.held);

        if let Some(label) = ctx.container_label.filter(|l| !l.is_empty()) {
            if label == WILDCARD_LABEL {
                // A wildcard bin takes anything once the courier has been
                // force-redirected to it; before that it only records
                // itself as the fallback destination.
                return if ctx.forced_here {
                    DepositVerdict::Accept
                } else {
                    DepositVerdict::Defer
                };
            }
            let result = self.filters.filter_for(label);
            let matched = result.matches_stack(effective.as_ref().unwrap_or(ctx.held));
            return if matched {
                DepositVerdict::Accept
            } else {
                DepositVerdict::Reject
            };
        }

        // Unlabeled bin: packed goods match by their effective item.
        if let Some(effective) = &effective {
            return ctx.empty_or_matching(effective);
        }
        ctx.empty_or_matching(ctx.held)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
