//! Enumeration types for the Haulage simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Transport state
// ---------------------------------------------------------------------------

/// The phase a courier's transport behavior is in.
///
/// Exactly one state is live per courier; only the state machine mutates
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransportState {
    /// Walking toward the current target bin.
    Travelling,
    /// Stopped near a target that another courier currently has open.
    Queuing,
    /// Standing at the target, counting interaction steps toward commit.
    Interacting,
}

// ---------------------------------------------------------------------------
// Interaction outcome
// ---------------------------------------------------------------------------

/// What a target interaction will do, chosen once per interaction attempt.
///
/// Selected from held-item state and container contents when the courier
/// reaches the target, and used to key the presentation hooks (open the
/// bin, play a cue) that fire at fixed step offsets during the
/// interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InteractionOutcome {
    /// The source bin has goods to take.
    PickupItem,
    /// The source bin turned out to be empty.
    PickupNoItem,
    /// The destination bin will accept the held goods.
    PlaceItem,
    /// The destination bin refuses the held goods.
    PlaceNoItem,
}

// ---------------------------------------------------------------------------
// Cell kind
// ---------------------------------------------------------------------------

/// What occupies a cell of the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Nothing; couriers and rays pass through.
    Empty,
    /// Solid structure; blocks movement and line of sight.
    Wall,
    /// A timber storage bin (the pickup side of the demo warehouse).
    TimberBin,
    /// A steel storage bin (the drop-off side of the demo warehouse).
    SteelBin,
}

impl CellKind {
    /// Whether the cell stops a ray.
    pub const fn is_solid(self) -> bool {
        !matches!(self, Self::Empty)
    }

    /// Whether the cell bears a container.
    pub const fn is_bin(self) -> bool {
        matches!(self, Self::TimberBin | Self::SteelBin)
    }
}
