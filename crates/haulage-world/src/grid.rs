//! In-memory reference world and a straight-line navigator.
//!
//! [`GridWorld`] backs the demo engine and the integration tests: a sparse
//! cell map, one container per bin cell, double-wide bins joined by
//! position, and a sampled ray clip. It is not a physics engine -- just
//! enough world for the transport behavior to be exercised end to end.

use std::collections::{BTreeMap, BTreeSet};

use haulage_types::{
    CellKind, EntityId, GridPos, PartitionId, RegionPos, Vec3,
};

use crate::container::BinContainer;
use crate::error::WorldError;
use crate::nav::{NavPath, Navigator};
use crate::world::{CellSnapshot, RayHit, World};

/// Sampling interval (world units) for the ray clip.
const RAY_SAMPLE_STEP: f64 = 0.05;

/// A container entity placed at a bin cell.
#[derive(Debug, Clone)]
struct BinEntry {
    /// Stable identity of the entity; survives content changes, not
    /// replacement.
    entity: EntityId,
    /// The item storage.
    container: BinContainer,
}

/// Sparse in-memory world implementation.
#[derive(Debug, Clone, Default)]
pub struct GridWorld {
    partition: PartitionId,
    cells: BTreeMap<GridPos, CellKind>,
    joins: BTreeMap<GridPos, GridPos>,
    bins: BTreeMap<GridPos, BinEntry>,
    access_blocked: BTreeSet<GridPos>,
}

impl GridWorld {
    /// Create an empty world in the given partition.
    pub const fn new(partition: PartitionId) -> Self {
        Self {
            partition,
            cells: BTreeMap::new(),
            joins: BTreeMap::new(),
            bins: BTreeMap::new(),
            access_blocked: BTreeSet::new(),
        }
    }

    /// Place a bin of the given kind with an empty container.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotABin`] if `kind` cannot bear a container.
    pub fn place_bin(
        &mut self,
        pos: GridPos,
        kind: CellKind,
        slot_count: usize,
    ) -> Result<EntityId, WorldError> {
        if !kind.is_bin() {
            return Err(WorldError::NotABin { pos });
        }
        let entity = EntityId::new();
        self.cells.insert(pos, kind);
        self.bins.insert(
            pos,
            BinEntry {
                entity,
                container: BinContainer::new(slot_count),
            },
        );
        Ok(entity)
    }

    /// Remove a bin and its container, leaving the cell empty.
    pub fn remove_bin(&mut self, pos: GridPos) {
        self.cells.remove(&pos);
        self.bins.remove(&pos);
        if let Some(partner) = self.joins.remove(&pos) {
            self.joins.remove(&partner);
        }
    }

    /// Join two bins into one double-wide logical container.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::JoinWithoutContainers`] unless both cells
    /// hold containers.
    pub fn join_bins(&mut self, a: GridPos, b: GridPos) -> Result<(), WorldError> {
        if !self.bins.contains_key(&a) || !self.bins.contains_key(&b) {
            return Err(WorldError::JoinWithoutContainers { a, b });
        }
        self.joins.insert(a, b);
        self.joins.insert(b, a);
        Ok(())
    }

    /// Raise a solid wall at a cell.
    pub fn set_wall(&mut self, pos: GridPos) {
        self.cells.insert(pos, CellKind::Wall);
    }

    /// Mark or clear a cell as access-blocked (something on the lid).
    pub fn set_access_blocked(&mut self, pos: GridPos, blocked: bool) {
        if blocked {
            self.access_blocked.insert(pos);
        } else {
            self.access_blocked.remove(&pos);
        }
    }
}

impl World for GridWorld {
    fn partition(&self) -> PartitionId {
        self.partition
    }

    fn cell(&self, pos: GridPos) -> CellSnapshot {
        let kind = self.cells.get(&pos).copied().unwrap_or(CellKind::Empty);
        CellSnapshot {
            kind,
            joined: self.joins.get(&pos).copied(),
        }
    }

    fn container_entity(&self, pos: GridPos) -> Option<EntityId> {
        self.bins.get(&pos).map(|entry| entry.entity)
    }

    fn container(&self, pos: GridPos) -> Option<&BinContainer> {
        self.bins.get(&pos).map(|entry| &entry.container)
    }

    fn container_mut(&mut self, pos: GridPos) -> Option<&mut BinContainer> {
        self.bins.get_mut(&pos).map(|entry| &mut entry.container)
    }

    fn container_positions_in(&self, region: RegionPos) -> Vec<GridPos> {
        self.bins
            .keys()
            .copied()
            .filter(|pos| RegionPos::containing(*pos) == region)
            .collect()
    }

    fn is_access_blocked(&self, pos: GridPos) -> bool {
        self.access_blocked.contains(&pos)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn clip_ray(&self, from: Vec3, to: Vec3) -> RayHit {
        let length = from.distance_sq(to).sqrt();
        if length <= f64::EPSILON {
            return RayHit::Miss;
        }
        let steps = (length / RAY_SAMPLE_STEP).ceil().max(1.0) as u32;
        let start_cell = GridPos::containing(from);

        // Sample strictly between the endpoints; the end point itself sits
        // exactly on a cell face, so it is resolved separately with a nudge
        // back toward the origin.
        for i in 1..steps {
            let t = f64::from(i) / f64::from(steps);
            let point = Vec3::new(
                from.x + (to.x - from.x) * t,
                from.y + (to.y - from.y) * t,
                from.z + (to.z - from.z) * t,
            );
            let cell = GridPos::containing(point);
            if cell == start_cell {
                continue;
            }
            if self.cell(cell).kind.is_solid() {
                return RayHit::Cell(cell);
            }
        }

        // The end point sits exactly on a cell face; push it a hair past
        // the face so a ray aimed at a face center registers the cell
        // behind that face.
        let overshoot = 1.0e-6 / length;
        let end_point = Vec3::new(
            to.x + (to.x - from.x) * overshoot,
            to.y + (to.y - from.y) * overshoot,
            to.z + (to.z - from.z) * overshoot,
        );
        let end_cell = GridPos::containing(end_point);
        if end_cell != start_cell && self.cell(end_cell).kind.is_solid() {
            return RayHit::Cell(end_cell);
        }
        RayHit::Miss
    }
}

// ---------------------------------------------------------------------------
// GridNavigator
// ---------------------------------------------------------------------------

/// Distance (world units) a courier covers per step at speed 1.0.
const BASE_WALK_STEP: f64 = 0.25;

/// Horizontal distance at which a walk goal counts as reached.
const GOAL_REACHED_DISTANCE: f64 = 0.6;

/// Straight-line navigator for the reference world.
///
/// Paths end at an approach cell beside the goal -- a walker stands next
/// to a bin, never inside it. Pathing succeeds unless the goal cell was
/// marked unreachable, or is detoured to a configured stand-in end node.
/// [`advance`](Self::advance) moves a position toward the current walk
/// goal and flags the path done when close enough; the demo engine calls
/// it once per step after the behavior has run.
#[derive(Debug, Clone, Default)]
pub struct GridNavigator {
    path: Option<NavPath>,
    walk_goal: Option<(GridPos, f32)>,
    last_pos: Option<Vec3>,
    unreachable: BTreeSet<GridPos>,
    detours: BTreeMap<GridPos, GridPos>,
}

impl GridNavigator {
    /// Create a navigator with no active path.
    pub const fn new() -> Self {
        Self {
            path: None,
            walk_goal: None,
            last_pos: None,
            unreachable: BTreeSet::new(),
            detours: BTreeMap::new(),
        }
    }

    /// Declare a cell unreachable: path computation toward it fails.
    pub fn mark_unreachable(&mut self, pos: GridPos) {
        self.unreachable.insert(pos);
    }

    /// Make paths toward `goal` end at `end_node` instead of beside it,
    /// imitating a partial path to a walled-off goal.
    pub fn set_detour(&mut self, goal: GridPos, end_node: GridPos) {
        self.detours.insert(goal, end_node);
    }

    /// Tell the navigator where its walker currently stands.
    ///
    /// Approach cells are chosen relative to this; hosts call it before
    /// stepping the behavior.
    pub const fn sync_position(&mut self, pos: Vec3) {
        self.last_pos = Some(pos);
    }

    /// The horizontal neighbor of `goal` nearest to the walker.
    fn approach_cell(&self, goal: GridPos) -> GridPos {
        let from = self.last_pos.unwrap_or(Vec3::new(0.0, 0.0, 0.0));
        let neighbors = [
            GridPos::new(goal.x.saturating_sub(1), goal.y, goal.z),
            GridPos::new(goal.x.saturating_add(1), goal.y, goal.z),
            GridPos::new(goal.x, goal.y, goal.z.saturating_sub(1)),
            GridPos::new(goal.x, goal.y, goal.z.saturating_add(1)),
        ];
        let mut best = neighbors[0];
        let mut best_distance = f64::MAX;
        for neighbor in neighbors {
            let distance = neighbor.distance_sq_to_center(from);
            if distance < best_distance {
                best = neighbor;
                best_distance = distance;
            }
        }
        best
    }

    fn plan(&self, to: GridPos) -> Option<NavPath> {
        if self.unreachable.contains(&to) {
            return None;
        }
        let end_node = self
            .detours
            .get(&to)
            .copied()
            .unwrap_or_else(|| self.approach_cell(to));
        Some(NavPath::to(end_node))
    }

    /// Move `pos` toward the current walk goal.
    ///
    /// Marks the path done once the position is within reach of the path
    /// end node's center.
    pub fn advance(&mut self, pos: &mut Vec3) {
        self.last_pos = Some(*pos);
        let Some((_, speed)) = self.walk_goal else {
            return;
        };
        let Some(end_node) = self.path.as_ref().map(|p| p.end_node) else {
            return;
        };
        let center = end_node.bottom_center();
        let dx = center.x - pos.x;
        let dz = center.z - pos.z;
        let distance = dz.mul_add(dz, dx * dx).sqrt();
        if distance <= GOAL_REACHED_DISTANCE {
            if let Some(path) = self.path.as_mut() {
                path.done = true;
            }
            return;
        }
        let step = (BASE_WALK_STEP * f64::from(speed)).min(distance);
        pos.x += dx / distance * step;
        pos.z += dz / distance * step;
    }
}

impl Navigator for GridNavigator {
    fn current_path(&self) -> Option<&NavPath> {
        self.path.as_ref()
    }

    fn create_path(&mut self, to: GridPos) -> Option<NavPath> {
        self.plan(to)
    }

    fn start_walking(&mut self, to: GridPos, speed: f32) {
        let Some(planned) = self.plan(to) else {
            self.path = None;
            self.walk_goal = None;
            return;
        };
        let keep_done = self
            .path
            .as_ref()
            .is_some_and(|p| p.end_node == planned.end_node && p.done);
        if !keep_done {
            self.path = Some(planned);
        }
        self.walk_goal = Some((to, speed));
    }

    fn stop(&mut self) {
        self.path = None;
        self.walk_goal = None;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
