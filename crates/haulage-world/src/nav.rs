//! Navigation contract: paths and walk requests.
//!
//! Pathfinding internals are out of scope for this workspace; the
//! behavior core only needs the narrow surface below. A path's end node
//! doubles as the closest reachable approach point, which the behavior
//! uses as the vantage for its reachability and line-of-sight checks.

use haulage_types::GridPos;

/// A computed path toward a goal cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPath {
    /// The final node of the path -- the closest reachable approach point.
    pub end_node: GridPos,
    /// Whether the walker has consumed the path.
    pub done: bool,
}

impl NavPath {
    /// A fresh, unconsumed path ending at the given cell.
    pub const fn to(end_node: GridPos) -> Self {
        Self {
            end_node,
            done: false,
        }
    }
}

/// Movement control for a single courier.
pub trait Navigator {
    /// The path currently being followed, if any.
    fn current_path(&self) -> Option<&NavPath>;

    /// Compute a path toward a cell without starting to follow it.
    ///
    /// Returns `None` when no path exists.
    fn create_path(&mut self, to: GridPos) -> Option<NavPath>;

    /// Request walking toward a cell at the given speed modifier.
    fn start_walking(&mut self, to: GridPos, speed: f32);

    /// Stop moving and discard the current path and walk request.
    fn stop(&mut self);
}
