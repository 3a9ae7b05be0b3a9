//! Target search: find the nearest valid container in a courier's
//! neighborhood.
//!
//! The scan enumerates the regions covering the search radius and walks
//! every container position they report, keeping the nearest candidate
//! that survives validation. Candidates are compared by squared distance
//! and replaced only when strictly nearer, so ties resolve to the first
//! candidate found in the stable region/position scan order.
//!
//! Finding nothing is an expected outcome, not an error; the state
//! machine responds by entering cooldown.

use haulage_types::{Aabb, GridPos, ItemStack, REGION_SIZE, RegionPos, Vec3, WorldPos};
use haulage_world::world::CellSnapshot;
use haulage_world::{BinContainer, World};

use crate::agent::CourierBody;
use crate::memory::PositionMemory;
use crate::policy::HaulPolicy;
use crate::transport::TransportTarget;

/// Search for the nearest container the courier should target.
///
/// `wanted` is the cell predicate for the container kind the courier
/// currently needs (source when empty-handed, destination otherwise);
/// the radii are the effective search distances, already reduced when
/// the courier is carried.
pub fn find_nearest_target(
    world: &dyn World,
    courier: &CourierBody,
    memory: &PositionMemory,
    policy: &dyn HaulPolicy,
    wanted: &dyn Fn(&CellSnapshot) -> bool,
    horizontal: i32,
    vertical: i32,
) -> Option<TransportTarget> {
    let origin = GridPos::containing(courier.pos);
    let search_area = Aabb::unit_cube(origin).inflate(
        f64::from(horizontal),
        f64::from(vertical),
        f64::from(horizontal),
    );
    let region_radius = horizontal.div_euclid(REGION_SIZE).saturating_add(1);

    let mut best: Option<TransportTarget> = None;
    let mut best_distance = f64::MAX;

    for region in RegionPos::range_closed(RegionPos::containing(origin), region_radius) {
        for pos in world.container_positions_in(region) {
            let distance = pos.distance_sq_to_center(courier.pos);
            if distance < best_distance {
                if let Some(target) =
                    validate_candidate(world, courier, memory, policy, wanted, search_area, pos)
                {
                    best = Some(target);
                    best_distance = distance;
                }
            }
        }
    }

    best
}

/// Validate one candidate position, resolving it into a target.
fn validate_candidate(
    world: &dyn World,
    courier: &CourierBody,
    memory: &PositionMemory,
    policy: &dyn HaulPolicy,
    wanted: &dyn Fn(&CellSnapshot) -> bool,
    search_area: Aabb,
    pos: GridPos,
) -> Option<TransportTarget> {
    if !search_area.contains(Vec3::new(
        f64::from(pos.x),
        f64::from(pos.y),
        f64::from(pos.z),
    )) {
        return None;
    }

    let target = TransportTarget::resolve(world, pos)?;
    if !wanted(&target.cell) {
        return None;
    }
    if position_remembered(world, memory, &target) {
        return None;
    }
    if world.container(pos).is_some_and(BinContainer::is_locked) {
        return None;
    }
    if courier.is_empty_handed() {
        let stacks = logical_stacks(world, &target);
        if !policy.source_viable(courier, &stacks) {
            return None;
        }
    }

    Some(target)
}

/// Whether the target or its joined partner is in either memory set.
fn position_remembered(
    world: &dyn World,
    memory: &PositionMemory,
    target: &TransportTarget,
) -> bool {
    target
        .logical_cells(world)
        .into_iter()
        .any(|cell| memory.contains(&WorldPos::new(world.partition(), cell)))
}

/// Collect the occupied stacks across a target's logical cells.
pub(crate) fn logical_stacks<'a>(
    world: &'a dyn World,
    target: &TransportTarget,
) -> Vec<&'a ItemStack> {
    let mut stacks = Vec::new();
    for cell in target.logical_cells(world) {
        if let Some(container) = world.container(cell) {
            stacks.extend(container.stacks());
        }
    }
    stacks
}

// ===========================================================================
// Tests
// ===========================================================================
