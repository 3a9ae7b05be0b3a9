//! The world contract consumed by the transport behavior.
//!
//! The behavior core never owns world state; it reads and mutates it
//! through the [`World`] trait. The trait is deliberately narrow: cell
//! snapshots, container lookup by position, region enumeration for
//! neighborhood scans, an access-lock check, and ray clipping for line
//! of sight. A single authoritative simulation implements it (see
//! [`GridWorld`](crate::grid::GridWorld)); the behavior is evaluated
//! synchronously against it, one courier at a time, once per step.

use haulage_types::{CellKind, EntityId, GridPos, PartitionId, RegionPos, Vec3};

use crate::container::BinContainer;

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// What a cell looked like when it was observed.
///
/// Stored inside a transport target at acquisition time; the behavior
/// re-checks its wanted-kind predicate against this snapshot, and detects
/// replacement through the container entity ID instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSnapshot {
    /// What occupies the cell.
    pub kind: CellKind,
    /// The other half of a double-wide bin, if this cell is joined.
    pub joined: Option<GridPos>,
}

impl CellSnapshot {
    /// Snapshot of an empty cell.
    pub const EMPTY: Self = Self {
        kind: CellKind::Empty,
        joined: None,
    };

    /// Snapshot of a lone cell of the given kind.
    pub const fn lone(kind: CellKind) -> Self {
        Self { kind, joined: None }
    }
}

/// Result of clipping a ray against the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayHit {
    /// The ray reached its end without striking a solid cell.
    Miss,
    /// The first solid cell the ray struck.
    Cell(GridPos),
}

// ---------------------------------------------------------------------------
// World trait
// ---------------------------------------------------------------------------

/// Read/write access to the simulation world.
pub trait World {
    /// The partition this world instance represents.
    fn partition(&self) -> PartitionId;

    /// Snapshot of the cell at the given position.
    fn cell(&self, pos: GridPos) -> CellSnapshot;

    /// Identity of the container entity at a position, if one exists.
    fn container_entity(&self, pos: GridPos) -> Option<EntityId>;

    /// The container at a position, if one exists.
    fn container(&self, pos: GridPos) -> Option<&BinContainer>;

    /// Mutable access to the container at a position.
    fn container_mut(&mut self, pos: GridPos) -> Option<&mut BinContainer>;

    /// Positions of every container in the given region.
    ///
    /// Returns an empty list for regions that are not loaded; the scan
    /// silently skips them, same as any other region with no containers.
    fn container_positions_in(&self, region: RegionPos) -> Vec<GridPos>;

    /// Whether access to the cell is blocked (something sits on the lid).
    fn is_access_blocked(&self, pos: GridPos) -> bool;

    /// Clip a ray from `from` to `to`, reporting the first solid cell hit.
    fn clip_ray(&self, from: Vec3, to: Vec3) -> RayHit;
}
