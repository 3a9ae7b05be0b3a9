//! Per-courier position memory: bounded expiring sets and the search
//! cooldown.
//!
//! While hauling, a courier remembers which bin positions it has already
//! visited and which turned out to be unreachable, so repeated searches do
//! not thrash between the same few bins. Both sets are bounded: storing
//! past the cap is refused and reported to the caller, which responds by
//! entering cooldown and clearing everything. Entries also expire on their
//! own after a fixed horizon, so a courier parked next to the same bins
//! eventually reconsiders them.
//!
//! The cooldown is a plain countdown. While it is positive the transport
//! behavior performs no target search and no interaction; it is the sole
//! timeout mechanism in the behavior -- there is no other cancellation.

use std::collections::BTreeMap;

use haulage_types::WorldPos;
use tracing::debug;

/// Maximum number of remembered visited positions.
pub const MAX_VISITED_POSITIONS: usize = 10;

/// Maximum number of remembered unreachable positions.
pub const MAX_UNREACHABLE_POSITIONS: usize = 50;

/// Steps a remembered position is retained before it expires.
pub const POSITION_MEMORY_HORIZON: u64 = 6000;

/// Steps of idling after a failed search.
pub const SEARCH_COOLDOWN_STEPS: u32 = 140;

/// Bounded, expiring position memory scoped to one courier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionMemory {
    /// Visited positions, each mapped to the step at which it expires.
    visited: BTreeMap<WorldPos, u64>,
    /// Unreachable positions, each mapped to the step at which it expires.
    unreachable: BTreeMap<WorldPos, u64>,
    /// Steps of cooldown remaining.
    cooldown: u32,
}

impl PositionMemory {
    /// Create an empty memory.
    pub const fn new() -> Self {
        Self {
            visited: BTreeMap::new(),
            unreachable: BTreeMap::new(),
            cooldown: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Expiry
    // -----------------------------------------------------------------------

    /// Drop entries whose horizon has passed.
    ///
    /// Called at the start of every behavior step; expiry is independent
    /// of the caps.
    pub fn purge_expired(&mut self, step: u64) {
        self.visited.retain(|_, expires_at| *expires_at > step);
        self.unreachable.retain(|_, expires_at| *expires_at > step);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Whether the position is in either set.
    pub fn contains(&self, pos: &WorldPos) -> bool {
        self.visited.contains_key(pos) || self.unreachable.contains_key(pos)
    }

    /// Whether the position is in the visited set.
    pub fn visited_contains(&self, pos: &WorldPos) -> bool {
        self.visited.contains_key(pos)
    }

    /// Whether the position is in the unreachable set.
    pub fn unreachable_contains(&self, pos: &WorldPos) -> bool {
        self.unreachable.contains_key(pos)
    }

    /// Number of visited positions currently remembered.
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Number of unreachable positions currently remembered.
    pub fn unreachable_len(&self) -> usize {
        self.unreachable.len()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Remember a position as visited.
    ///
    /// Returns `false` when storing a new distinct position would exceed
    /// [`MAX_VISITED_POSITIONS`]; nothing is stored in that case and the
    /// caller is expected to enter cooldown and clear the sets. Re-visiting
    /// a remembered position refreshes its expiry instead.
    pub fn record_visited(&mut self, pos: WorldPos, step: u64) -> bool {
        if !self.visited.contains_key(&pos) && self.visited.len() >= MAX_VISITED_POSITIONS {
            debug!(visited = self.visited.len(), "visited-position memory full");
            return false;
        }
        self.visited
            .insert(pos, step.saturating_add(POSITION_MEMORY_HORIZON));
        true
    }

    /// Move a position from the visited set into the unreachable set.
    ///
    /// Returns `false` when storing a new distinct unreachable position
    /// would exceed [`MAX_UNREACHABLE_POSITIONS`]; the visited-side removal
    /// still happens, but the caller is expected to enter cooldown and
    /// clear both sets anyway.
    pub fn demote_to_unreachable(&mut self, pos: WorldPos, step: u64) -> bool {
        self.visited.remove(&pos);
        if !self.unreachable.contains_key(&pos)
            && self.unreachable.len() >= MAX_UNREACHABLE_POSITIONS
        {
            debug!(
                unreachable = self.unreachable.len(),
                "unreachable-position memory full"
            );
            return false;
        }
        self.unreachable
            .insert(pos, step.saturating_add(POSITION_MEMORY_HORIZON));
        true
    }

    /// Forget every remembered position. The cooldown is unaffected.
    pub fn clear_positions(&mut self) {
        self.visited.clear();
        self.unreachable.clear();
    }

    // -----------------------------------------------------------------------
    // Cooldown
    // -----------------------------------------------------------------------

    /// Steps of cooldown remaining.
    pub const fn cooldown_remaining(&self) -> u32 {
        self.cooldown
    }

    /// Begin a fresh cooldown of [`SEARCH_COOLDOWN_STEPS`].
    pub const fn start_cooldown(&mut self) {
        self.cooldown = SEARCH_COOLDOWN_STEPS;
    }

    /// Count one step of cooldown down.
    pub const fn tick_cooldown(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    /// Cancel any remaining cooldown.
    pub const fn clear_cooldown(&mut self) {
        self.cooldown = 0;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
