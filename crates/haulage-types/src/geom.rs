//! Grid and continuous geometry for the Haulage world.
//!
//! The world is a sparse grid of unit cells addressed by [`GridPos`].
//! Couriers move continuously through that grid, so distance and reach
//! checks operate on [`Vec3`] points and [`Aabb`] boxes. Cells are grouped
//! into 16x16 columns ([`RegionPos`]) for neighborhood scans, and memory
//! sets store positions qualified by their partition ([`WorldPos`]).

use serde::{Deserialize, Serialize};

use crate::ids::PartitionId;

/// Edge length (cells) of a spatial region column.
pub const REGION_SIZE: i32 = 16;

// ---------------------------------------------------------------------------
// Vec3
// ---------------------------------------------------------------------------

/// A point or offset in continuous world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// East-west coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// North-south coordinate.
    pub z: f64,
}

impl Vec3 {
    /// Create a point from its coordinates.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Return this point translated by the given offsets.
    pub const fn offset(self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Squared distance to another point.
    pub fn distance_sq(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy))
    }
}

// ---------------------------------------------------------------------------
// GridPos
// ---------------------------------------------------------------------------

/// Address of a unit cell in the world grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GridPos {
    /// East-west cell index.
    pub x: i32,
    /// Vertical cell index.
    pub y: i32,
    /// North-south cell index.
    pub z: i32,
}

impl GridPos {
    /// Create a cell address from its indices.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The center point of this cell.
    pub fn center(self) -> Vec3 {
        Vec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 0.5,
            f64::from(self.z) + 0.5,
        )
    }

    /// The center of this cell's bottom face (a standing position).
    pub fn bottom_center(self) -> Vec3 {
        Vec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y),
            f64::from(self.z) + 0.5,
        )
    }

    /// Squared distance from this cell's center to a point.
    pub fn distance_sq_to_center(self, point: Vec3) -> f64 {
        self.center().distance_sq(point)
    }

    /// Center points of the six faces of this cell.
    ///
    /// Used by line-of-sight checks: a cell is visible if a ray to any of
    /// its face centers first strikes the cell itself.
    pub fn face_centers(self) -> [Vec3; 6] {
        let c = self.center();
        [
            c.offset(0.5, 0.0, 0.0),
            c.offset(-0.5, 0.0, 0.0),
            c.offset(0.0, 0.5, 0.0),
            c.offset(0.0, -0.5, 0.0),
            c.offset(0.0, 0.0, 0.5),
            c.offset(0.0, 0.0, -0.5),
        ]
    }

    /// The cell containing the given continuous point.
    #[allow(clippy::cast_possible_truncation)]
    pub fn containing(point: Vec3) -> Self {
        Self::new(
            point.x.floor() as i32,
            point.y.floor() as i32,
            point.z.floor() as i32,
        )
    }
}

// ---------------------------------------------------------------------------
// Aabb
// ---------------------------------------------------------------------------

/// An axis-aligned bounding box in continuous space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Corner with the smallest coordinates.
    pub min: Vec3,
    /// Corner with the largest coordinates.
    pub max: Vec3,
}

impl Aabb {
    /// Box spanning the two given corners (assumed ordered).
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The unit cube occupied by a grid cell.
    pub fn unit_cube(pos: GridPos) -> Self {
        let min = Vec3::new(f64::from(pos.x), f64::from(pos.y), f64::from(pos.z));
        Self::new(min, min.offset(1.0, 1.0, 1.0))
    }

    /// Box of the given extents centered on a point.
    pub fn of_size(center: Vec3, x_size: f64, y_size: f64, z_size: f64) -> Self {
        let half = Vec3::new(x_size / 2.0, y_size / 2.0, z_size / 2.0);
        Self::new(
            center.offset(-half.x, -half.y, -half.z),
            center.offset(half.x, half.y, half.z),
        )
    }

    /// Grow the box by the given amounts on each axis (both directions).
    pub const fn inflate(self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(
            self.min.offset(-dx, -dy, -dz),
            self.max.offset(dx, dy, dz),
        )
    }

    /// Whether the point lies inside the box (inclusive bounds).
    pub fn contains(self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Whether two boxes overlap (strict on all axes).
    pub fn intersects(self, other: Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

// ---------------------------------------------------------------------------
// RegionPos
// ---------------------------------------------------------------------------

/// Address of a 16x16 column of cells, the unit of neighborhood scans.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RegionPos {
    /// East-west region index.
    pub x: i32,
    /// North-south region index.
    pub z: i32,
}

impl RegionPos {
    /// Create a region address from its indices.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The region containing the given cell.
    pub const fn containing(pos: GridPos) -> Self {
        Self::new(
            pos.x.div_euclid(REGION_SIZE),
            pos.z.div_euclid(REGION_SIZE),
        )
    }

    /// All regions within `radius` of `center`, inclusive.
    ///
    /// Enumerated row-major from the minimum corner. The order is stable,
    /// which keeps the target scan deterministic: ties on distance resolve
    /// to the first-found candidate.
    pub fn range_closed(center: Self, radius: i32) -> Vec<Self> {
        let r = radius.max(0);
        let mut regions = Vec::new();
        for x in center.x.saturating_sub(r)..=center.x.saturating_add(r) {
            for z in center.z.saturating_sub(r)..=center.z.saturating_add(r) {
                regions.push(Self::new(x, z));
            }
        }
        regions
    }
}

// ---------------------------------------------------------------------------
// WorldPos
// ---------------------------------------------------------------------------

/// A cell address qualified by the partition it belongs to.
///
/// Position memory stores these so that a courier moved between partitions
/// does not confuse same-numbered cells in different areas.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct WorldPos {
    /// The partition the cell belongs to.
    pub partition: PartitionId,
    /// The cell address within the partition.
    pub pos: GridPos,
}

impl WorldPos {
    /// Qualify a cell address with its partition.
    pub const fn new(partition: PartitionId, pos: GridPos) -> Self {
        Self { partition, pos }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
