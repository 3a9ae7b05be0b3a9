//! The transport state machine: travel, queue, interact, commit.
//!
//! One [`TransportBehavior`] runs per courier. Each simulation step it
//! re-validates its target, searches for a new one when needed, and drives
//! the Travelling / Queuing / Interacting cycle:
//!
//! - **Travelling** walks toward the target. Close to a target another
//!   courier has open, it queues; within interaction range it selects the
//!   [`InteractionOutcome`] and starts interacting.
//! - **Queuing** stands still and re-checks the claim predicate every
//!   step; the predicate is computed fresh from current container
//!   occupancy, never cached, which is the whole arbitration mechanism.
//! - **Interacting** counts steps, firing the configured hook for the
//!   selected outcome each step, and commits the transaction at
//!   [`TARGET_INTERACTION_STEPS`].
//!
//! Failure handling is cooldown, not errors: a fruitless search or an
//! overflowing position memory idles the courier for
//! [`SEARCH_COOLDOWN_STEPS`](crate::memory::SEARCH_COOLDOWN_STEPS) and
//! clears its memory. A courier left holding goods consumes its recorded
//! wildcard position at that moment instead, force-redirecting to the
//! wildcard bin (see [`WildcardRouting`]).

use std::collections::BTreeMap;
use std::sync::Arc;

use haulage_types::{
    Aabb, EntityId, GridPos, InteractionOutcome, ItemStack, TransportState, Vec3, WorldPos,
};
use haulage_world::world::{CellSnapshot, RayHit};
use haulage_world::{BinContainer, NavPath, Navigator, World};
use tracing::{debug, info};

use crate::agent::CourierBody;
use crate::locator;
use crate::memory::PositionMemory;
use crate::policy::{DepositContext, DepositVerdict, HaulPolicy};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Interaction steps before the transaction commits.
pub const TARGET_INTERACTION_STEPS: u32 = 60;

/// Most units a courier moves in one transaction.
pub const MAX_HAUL_COUNT: u32 = 16;

/// Search radius used while the courier is being carried.
pub const CARRIED_SEARCH_RADIUS: i32 = 1;

/// Distance at which a claimed target makes the courier queue.
const QUEUE_RADIUS: f64 = 3.0;

/// Interaction range when the current path has been fully walked.
const INTERACT_RADIUS_PATH_DONE: f64 = 1.0;

/// Interaction range while still pathing.
const INTERACT_RADIUS_PATHING: f64 = 0.5;

/// Drift tolerance while interacting; beyond it the interaction aborts.
const KEEP_INTERACTING_RADIUS: f64 = 2.0;

// ---------------------------------------------------------------------------
// Strategy types
// ---------------------------------------------------------------------------

/// Predicate over cell snapshots selecting a container kind.
pub type CellPredicate = Arc<dyn Fn(&CellSnapshot) -> bool + Send + Sync>;

/// Predicate reporting whether a target is claimed by another courier.
pub type ClaimPredicate = Arc<dyn Fn(&TransportTarget, &dyn World) -> bool + Send + Sync>;

/// Hook fired whenever the behavior resets to Travelling.
pub type TravelHook = Arc<dyn Fn(&mut CourierBody) + Send + Sync>;

/// Hook fired once per interaction step with the current step count.
///
/// Presentation layers use the count to open the bin at step 1, play a
/// cue at step 9, and close at step [`TARGET_INTERACTION_STEPS`] without
/// the behavior depending on presentation.
pub type InteractionHook =
    Arc<dyn Fn(&mut dyn World, &mut CourierBody, &TransportTarget, u32) + Send + Sync>;

// ---------------------------------------------------------------------------
// TransportTarget
// ---------------------------------------------------------------------------

/// A resolved container the courier is working toward.
///
/// Immutable once created; re-targeting replaces it, never mutates it.
/// The cell snapshot is taken at resolution time and is what the wanted
/// predicate is re-checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportTarget {
    /// The targeted cell (one specific half of a joined pair).
    pub pos: GridPos,
    /// Identity of the container entity backing the cell.
    pub entity: EntityId,
    /// The cell as it looked at resolution time.
    pub cell: CellSnapshot,
}

impl TransportTarget {
    /// Resolve a target at a position, if a container exists there.
    pub fn resolve(world: &dyn World, pos: GridPos) -> Option<Self> {
        let entity = world.container_entity(pos)?;
        world.container(pos)?;
        Some(Self {
            pos,
            entity,
            cell: world.cell(pos),
        })
    }

    /// The cells making up the logical container: the targeted cell,
    /// then the joined partner when it still resolves to a container.
    pub fn logical_cells(&self, world: &dyn World) -> Vec<GridPos> {
        let mut cells = vec![self.pos];
        if let Some(partner) = self.cell.joined {
            if Self::resolve(world, partner).is_some() {
                cells.push(partner);
            }
        }
        cells
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Construction-time configuration of a transport behavior.
///
/// Every decision the behavior does not own outright arrives here as an
/// explicit strategy: which cell kinds count as source and destination,
/// when a target counts as claimed, and what presentation does at each
/// interaction step.
pub struct TransportConfig {
    /// Walk speed modifier passed to the navigator.
    pub speed: f32,
    /// Cell kinds an empty-handed courier targets.
    pub source_kind: CellPredicate,
    /// Cell kinds a loaded courier targets.
    pub destination_kind: CellPredicate,
    /// Horizontal search radius in cells.
    pub horizontal_search: i32,
    /// Vertical search radius in cells.
    pub vertical_search: i32,
    /// Fresh-per-step claim check driving the Queuing state.
    pub claimed: ClaimPredicate,
    /// Fired whenever the behavior resets to Travelling.
    pub on_start_travelling: TravelHook,
    /// Per-outcome interaction hooks.
    pub interaction_hooks: BTreeMap<InteractionOutcome, InteractionHook>,
}

impl TransportConfig {
    /// Configuration with the given kind predicates and default tuning:
    /// speed 1.0, radii 32/8, claim = "someone has the container open",
    /// no hooks.
    pub fn new(source_kind: CellPredicate, destination_kind: CellPredicate) -> Self {
        Self {
            speed: 1.0,
            source_kind,
            destination_kind,
            horizontal_search: 32,
            vertical_search: 8,
            claimed: Arc::new(|target: &TransportTarget, world: &dyn World| {
                world
                    .container(target.pos)
                    .is_some_and(BinContainer::is_open)
            }),
            on_start_travelling: Arc::new(|_: &mut CourierBody| {}),
            interaction_hooks: BTreeMap::new(),
        }
    }
}

impl core::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("speed", &self.speed)
            .field("horizontal_search", &self.horizontal_search)
            .field("vertical_search", &self.vertical_search)
            .field("interaction_hooks", &self.interaction_hooks.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Wildcard routing state
// ---------------------------------------------------------------------------

/// Per-courier wildcard deposit routing state.
///
/// `recorded` is the position of a wildcard bin the courier failed to
/// deposit into; it is consumed at cooldown entry, becoming `forced_to`.
/// A deposit at the `forced_to` position succeeds unconditionally. Both
/// fields clear on a successful transaction and on behavior termination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WildcardRouting {
    recorded: Option<GridPos>,
    forced_to: Option<GridPos>,
}

impl WildcardRouting {
    /// Remember a wildcard bin position as the fallback destination.
    pub const fn record(&mut self, pos: GridPos) {
        self.recorded = Some(pos);
    }

    /// Consume the recorded position.
    pub const fn take_recorded(&mut self) -> Option<GridPos> {
        self.recorded.take()
    }

    /// The recorded fallback position, if any.
    pub const fn recorded(&self) -> Option<GridPos> {
        self.recorded
    }

    /// Force deposits at the given position to succeed.
    pub const fn set_forced(&mut self, pos: GridPos) {
        self.forced_to = Some(pos);
    }

    /// The position where deposits are forced, if any.
    pub const fn forced_to(&self) -> Option<GridPos> {
        self.forced_to
    }

    /// Drop all routing state.
    pub const fn clear(&mut self) {
        self.recorded = None;
        self.forced_to = None;
    }

    /// Whether no routing state is held.
    pub const fn is_clear(&self) -> bool {
        self.recorded.is_none() && self.forced_to.is_none()
    }
}

// ---------------------------------------------------------------------------
// Step plumbing
// ---------------------------------------------------------------------------

/// Mutable collaborators handed to the behavior for one step.
pub struct StepContext<'a> {
    /// The authoritative world.
    pub world: &'a mut dyn World,
    /// The courier's navigator.
    pub nav: &'a mut dyn Navigator,
    /// The courier's body.
    pub courier: &'a mut CourierBody,
    /// Current simulation step number.
    pub step: u64,
}

/// What a behavior step amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Cooldown is running; nothing was done.
    CoolingDown,
    /// No target could be found or kept; the behavior reset itself.
    Stopped,
    /// The behavior is working; the contained state is the one it ended
    /// the step in.
    Active(TransportState),
}

// ---------------------------------------------------------------------------
// TransportBehavior
// ---------------------------------------------------------------------------

/// The per-courier transport state machine.
pub struct TransportBehavior {
    config: Arc<TransportConfig>,
    policy: Arc<dyn HaulPolicy>,
    memory: PositionMemory,
    routing: WildcardRouting,
    target: Option<TransportTarget>,
    state: TransportState,
    outcome: Option<InteractionOutcome>,
    interaction_steps: u32,
}

impl TransportBehavior {
    /// Create a behavior with the given configuration and policy.
    pub fn new(config: Arc<TransportConfig>, policy: Arc<dyn HaulPolicy>) -> Self {
        Self {
            config,
            policy,
            memory: PositionMemory::new(),
            routing: WildcardRouting::default(),
            target: None,
            state: TransportState::Travelling,
            outcome: None,
            interaction_steps: 0,
        }
    }

    /// The current state.
    pub const fn state(&self) -> TransportState {
        self.state
    }

    /// The current target, if any.
    pub const fn target(&self) -> Option<TransportTarget> {
        self.target
    }

    /// The outcome selected for the current interaction, if any.
    pub const fn outcome(&self) -> Option<InteractionOutcome> {
        self.outcome
    }

    /// Interaction steps counted so far.
    pub const fn interaction_steps(&self) -> u32 {
        self.interaction_steps
    }

    /// The courier's position memory.
    pub const fn memory(&self) -> &PositionMemory {
        &self.memory
    }

    /// The courier's wildcard routing state.
    pub const fn routing(&self) -> &WildcardRouting {
        &self.routing
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Advance the behavior by one simulation step.
    pub fn step(&mut self, ctx: &mut StepContext<'_>) -> StepStatus {
        self.memory.purge_expired(ctx.step);

        if self.memory.cooldown_remaining() > 0 {
            self.memory.tick_cooldown();
            return StepStatus::CoolingDown;
        }

        let retargeted = self.refresh_target(ctx);

        if self.target.is_none() {
            self.halt(ctx);
            return StepStatus::Stopped;
        }

        if !retargeted {
            // Deliberate fall-through: a released queue travels this same
            // step, and arriving begins the interaction (and delivers its
            // first hook step) this same step.
            if self.state == TransportState::Queuing {
                self.step_queuing(ctx);
            }
            if self.state == TransportState::Travelling {
                self.step_travelling(ctx);
            }
            if self.state == TransportState::Interacting {
                self.step_interacting(ctx);
            }
        }

        StepStatus::Active(self.state)
    }

    /// End the behavior: reset to Travelling and drop routing state.
    ///
    /// Hosts call this when the behavior is deactivated externally; the
    /// step loop calls it whenever the courier ends up targetless.
    pub fn terminate(&mut self, ctx: &mut StepContext<'_>) {
        self.halt(ctx);
    }

    fn halt(&mut self, ctx: &mut StepContext<'_>) {
        self.begin_travelling(ctx);
        self.routing.clear();
    }

    // -----------------------------------------------------------------------
    // Target maintenance
    // -----------------------------------------------------------------------

    /// Re-validate the current target, re-searching when it is gone.
    ///
    /// Returns `true` when the target changed this step (acquired or
    /// failed), in which case the state handlers are skipped.
    fn refresh_target(&mut self, ctx: &mut StepContext<'_>) -> bool {
        if self.has_valid_target(ctx) {
            return false;
        }

        self.stop_targeting(ctx);

        let wanted = self.wanted_predicate(ctx.courier);
        let wanted_ref = |cell: &CellSnapshot| (*wanted)(cell);
        let (horizontal, vertical) = self.search_radii(ctx.courier);
        let found = locator::find_nearest_target(
            &*ctx.world,
            ctx.courier,
            &self.memory,
            self.policy.as_ref(),
            &wanted_ref,
            horizontal,
            vertical,
        );

        match found {
            Some(target) => {
                debug!(courier = %ctx.courier.id, pos = ?target.pos, "transport target acquired");
                let pos = target.pos;
                self.target = Some(target);
                self.begin_travelling(ctx);
                self.record_visited(ctx, pos);
            }
            None => {
                self.enter_cooldown(ctx);
            }
        }
        true
    }

    fn has_valid_target(&mut self, ctx: &mut StepContext<'_>) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        let wanted = self.wanted_predicate(ctx.courier);
        let intact = (*wanted)(&target.cell)
            && ctx.world.container_entity(target.pos) == Some(target.entity);
        if !intact || ctx.world.is_access_blocked(target.pos) {
            return false;
        }
        if self.state != TransportState::Travelling {
            return true;
        }
        if self.has_valid_travel_path(ctx, &target) {
            return true;
        }
        self.mark_unreachable(ctx, target.pos);
        false
    }

    fn has_valid_travel_path(
        &self,
        ctx: &mut StepContext<'_>,
        target: &TransportTarget,
    ) -> bool {
        let mut path: Option<NavPath> = ctx.nav.current_path().cloned();
        if path.is_none() {
            path = ctx.nav.create_path(target.pos);
        }
        let vantage = approach_vantage(path.as_ref(), ctx.courier);
        let in_range = within_target_distance(
            interaction_range(ctx.nav),
            target.pos,
            ctx.courier,
            vantage,
        );
        // A missing path while out of interaction range counts as
        // reachable.
        let no_path_out_of_range = path.is_none() && !in_range;
        no_path_out_of_range
            || (in_range && can_see_any_face(&*ctx.world, target, vantage))
    }

    fn wanted_predicate(&self, courier: &CourierBody) -> CellPredicate {
        if courier.is_empty_handed() {
            Arc::clone(&self.config.source_kind)
        } else {
            Arc::clone(&self.config.destination_kind)
        }
    }

    fn search_radii(&self, courier: &CourierBody) -> (i32, i32) {
        if courier.carried {
            (CARRIED_SEARCH_RADIUS, CARRIED_SEARCH_RADIUS)
        } else {
            (self.config.horizontal_search, self.config.vertical_search)
        }
    }

    // -----------------------------------------------------------------------
    // State handlers
    // -----------------------------------------------------------------------

    fn step_queuing(&mut self, ctx: &mut StepContext<'_>) {
        let Some(target) = self.target else {
            return;
        };
        if !self.target_claimed(ctx, &target) {
            self.state = TransportState::Travelling;
            self.walk_towards(ctx);
        }
    }

    fn step_travelling(&mut self, ctx: &mut StepContext<'_>) {
        let Some(target) = self.target else {
            return;
        };
        let center = ctx.courier.center();
        if within_target_distance(QUEUE_RADIUS, target.pos, ctx.courier, center)
            && self.target_claimed(ctx, &target)
        {
            ctx.nav.stop();
            self.state = TransportState::Queuing;
        } else if within_target_distance(
            interaction_range(ctx.nav),
            target.pos,
            ctx.courier,
            center,
        ) {
            self.begin_interaction(ctx, &target);
        } else {
            self.walk_towards(ctx);
        }
    }

    fn step_interacting(&mut self, ctx: &mut StepContext<'_>) {
        let Some(target) = self.target else {
            return;
        };
        let center = ctx.courier.center();
        if !within_target_distance(KEEP_INTERACTING_RADIUS, target.pos, ctx.courier, center) {
            // Drifted away; abort without transacting.
            self.begin_travelling(ctx);
            return;
        }

        self.interaction_steps = self.interaction_steps.saturating_add(1);
        ctx.nav.stop();

        if let Some(outcome) = self.outcome {
            if let Some(hook) = self.config.interaction_hooks.get(&outcome) {
                let hook = Arc::clone(hook);
                (*hook)(&mut *ctx.world, ctx.courier, &target, self.interaction_steps);
            }
        }

        if self.interaction_steps >= TARGET_INTERACTION_STEPS {
            self.commit_transaction(ctx, &target);
            self.begin_travelling(ctx);
        }
    }

    fn begin_interaction(&mut self, ctx: &mut StepContext<'_>, target: &TransportTarget) {
        self.outcome = Some(self.choose_outcome(ctx, target));
        self.state = TransportState::Interacting;
    }

    fn begin_travelling(&mut self, ctx: &mut StepContext<'_>) {
        (*self.config.on_start_travelling)(ctx.courier);
        self.state = TransportState::Travelling;
        self.outcome = None;
        self.interaction_steps = 0;
    }

    fn walk_towards(&self, ctx: &mut StepContext<'_>) {
        if let Some(target) = &self.target {
            ctx.nav.start_walking(target.pos, self.config.speed);
        }
    }

    fn target_claimed(&self, ctx: &StepContext<'_>, target: &TransportTarget) -> bool {
        target.logical_cells(&*ctx.world).into_iter().any(|cell| {
            TransportTarget::resolve(&*ctx.world, cell)
                .is_some_and(|half| (*self.config.claimed)(&half, &*ctx.world))
        })
    }

    // -----------------------------------------------------------------------
    // Outcome selection and transactions
    // -----------------------------------------------------------------------

    fn choose_outcome(
        &mut self,
        ctx: &mut StepContext<'_>,
        target: &TransportTarget,
    ) -> InteractionOutcome {
        if ctx.courier.is_empty_handed() {
            if logical_container_occupied(&*ctx.world, target) {
                InteractionOutcome::PickupItem
            } else {
                InteractionOutcome::PickupNoItem
            }
        } else {
            match self.evaluate_deposit(&*ctx.world, ctx.courier, target) {
                DepositVerdict::Accept => InteractionOutcome::PlaceItem,
                DepositVerdict::Reject => InteractionOutcome::PlaceNoItem,
                DepositVerdict::Defer => {
                    debug!(pos = ?target.pos, "wildcard deposit position recorded");
                    self.routing.record(target.pos);
                    InteractionOutcome::PlaceNoItem
                }
            }
        }
    }

    fn commit_transaction(&mut self, ctx: &mut StepContext<'_>, target: &TransportTarget) {
        if ctx.courier.is_empty_handed() {
            if logical_container_occupied(&*ctx.world, target) {
                self.execute_pickup(ctx, target);
            } else {
                self.stop_targeting(ctx);
            }
        } else {
            match self.evaluate_deposit(&*ctx.world, ctx.courier, target) {
                DepositVerdict::Accept => self.execute_deposit(ctx, target),
                DepositVerdict::Reject => self.stop_targeting(ctx),
                DepositVerdict::Defer => {
                    self.routing.record(target.pos);
                    self.stop_targeting(ctx);
                }
            }
        }
    }

    fn evaluate_deposit(
        &self,
        world: &dyn World,
        courier: &CourierBody,
        target: &TransportTarget,
    ) -> DepositVerdict {
        let Some(held) = courier.hand.as_ref().filter(|stack| !stack.is_empty()) else {
            return DepositVerdict::Reject;
        };
        let cells = target.logical_cells(world);

        let mut label: Option<&str> = None;
        for cell in &cells {
            if let Some(found) = world
                .container(*cell)
                .and_then(|container| container.label().filter(|l| !l.is_empty()))
            {
                label = Some(found);
                break;
            }
        }

        let mut stacks: Vec<&ItemStack> = Vec::new();
        for cell in &cells {
            if let Some(container) = world.container(*cell) {
                stacks.extend(container.stacks());
            }
        }

        let deposit = DepositContext {
            courier,
            held,
            container_label: label,
            container_empty: stacks.is_empty(),
            stacks,
            forced_here: self.routing.forced_to() == Some(target.pos),
        };
        self.policy.deposit_verdict(&deposit)
    }

    fn execute_pickup(&mut self, ctx: &mut StepContext<'_>, target: &TransportTarget) {
        let mut picked: Option<ItemStack> = None;
        for cell in target.logical_cells(&*ctx.world) {
            let slot = ctx.world.container(cell).and_then(|container| {
                container
                    .occupied_slots()
                    .find(|(_, stack)| self.policy.pickup_matches(ctx.courier, stack))
                    .map(|(index, _)| index)
            });
            if let Some(index) = slot {
                picked = ctx
                    .world
                    .container_mut(cell)
                    .and_then(|container| container.remove_items(index, MAX_HAUL_COUNT));
                break;
            }
        }

        if let Some(stack) = picked {
            info!(
                courier = %ctx.courier.id,
                item = %stack.item,
                count = stack.count,
                "picked up goods"
            );
            ctx.courier.hand = Some(stack);
        }
        self.clear_after_success(ctx);
    }

    fn execute_deposit(&mut self, ctx: &mut StepContext<'_>, target: &TransportTarget) {
        let Some(held) = ctx.courier.hand.take() else {
            self.stop_targeting(ctx);
            return;
        };
        let item = held.item.clone();

        let mut remainder = Some(held);
        for cell in target.logical_cells(&*ctx.world) {
            let Some(stack) = remainder.take() else {
                break;
            };
            remainder = match ctx.world.container_mut(cell) {
                Some(container) => add_to_container(container, stack),
                None => Some(stack),
            };
        }

        match remainder {
            None => {
                info!(courier = %ctx.courier.id, item = %item, "deposited goods");
                self.clear_after_success(ctx);
            }
            Some(stack) => {
                ctx.courier.hand = Some(stack);
                self.stop_targeting(ctx);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Memory and cooldown
    // -----------------------------------------------------------------------

    fn record_visited(&mut self, ctx: &mut StepContext<'_>, pos: GridPos) {
        let qualified = WorldPos::new(ctx.world.partition(), pos);
        if !self.memory.record_visited(qualified, ctx.step) {
            self.enter_cooldown(ctx);
        }
    }

    fn mark_unreachable(&mut self, ctx: &mut StepContext<'_>, pos: GridPos) {
        debug!(courier = %ctx.courier.id, ?pos, "target unreachable");
        let qualified = WorldPos::new(ctx.world.partition(), pos);
        if !self.memory.demote_to_unreachable(qualified, ctx.step) {
            self.enter_cooldown(ctx);
        }
    }

    fn stop_targeting(&mut self, ctx: &mut StepContext<'_>) {
        self.interaction_steps = 0;
        self.target = None;
        ctx.nav.stop();
    }

    fn clear_after_success(&mut self, ctx: &mut StepContext<'_>) {
        self.stop_targeting(ctx);
        self.memory.clear_positions();
        self.routing.clear();
    }

    fn enter_cooldown(&mut self, ctx: &mut StepContext<'_>) {
        // A courier still holding goods consumes its recorded wildcard
        // position instead of idling. The position is consumed even when
        // nothing resolves there anymore.
        if !ctx.courier.is_empty_handed() {
            if let Some(pos) = self.routing.take_recorded() {
                if let Some(target) = TransportTarget::resolve(&*ctx.world, pos) {
                    info!(courier = %ctx.courier.id, ?pos, "redirecting to wildcard bin");
                    self.routing.set_forced(pos);
                    self.target = Some(target);
                    self.state = TransportState::Travelling;
                    self.outcome = None;
                    self.interaction_steps = 0;
                    ctx.nav.stop();
                    self.memory.clear_positions();
                    return;
                }
            }
        }

        debug!(courier = %ctx.courier.id, "no transport target, entering cooldown");
        self.stop_targeting(ctx);
        self.memory.start_cooldown();
        self.memory.clear_positions();
    }
}

impl core::fmt::Debug for TransportBehavior {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransportBehavior")
            .field("state", &self.state)
            .field("target", &self.target)
            .field("outcome", &self.outcome)
            .field("interaction_steps", &self.interaction_steps)
            .field("routing", &self.routing)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Geometry helpers
// ---------------------------------------------------------------------------

/// The interaction range for the courier's current pathing state.
fn interaction_range(nav: &dyn Navigator) -> f64 {
    if nav.current_path().is_some_and(|path| path.done) {
        INTERACT_RADIUS_PATH_DONE
    } else {
        INTERACT_RADIUS_PATHING
    }
}

/// The point reachability is judged from: the path's end node when one
/// exists, else the courier's own position, lifted to body mid-height.
fn approach_vantage(path: Option<&NavPath>, courier: &CourierBody) -> Vec3 {
    let base = path.map_or(courier.pos, |p| p.end_node.bottom_center());
    base.offset(0.0, courier.height / 2.0, 0.0)
}

/// Whether the courier's body, placed at `vantage`, touches the target
/// cell's bounds inflated by `(distance, 0.5, distance)`.
fn within_target_distance(
    distance: f64,
    target_pos: GridPos,
    courier: &CourierBody,
    vantage: Vec3,
) -> bool {
    let body = Aabb::of_size(vantage, courier.width, courier.height, courier.width);
    let reach = Aabb::unit_cube(target_pos).inflate(distance, 0.5, distance);
    reach.intersects(body)
}

/// Whether any face center of the target cell is visible from `vantage`.
fn can_see_any_face(world: &dyn World, target: &TransportTarget, vantage: Vec3) -> bool {
    target.pos.face_centers().into_iter().any(|face| {
        matches!(world.clip_ray(vantage, face), RayHit::Cell(hit) if hit == target.pos)
    })
}

/// Whether any logical cell of the target holds goods.
fn logical_container_occupied(world: &dyn World, target: &TransportTarget) -> bool {
    target
        .logical_cells(world)
        .into_iter()
        .any(|cell| world.container(cell).is_some_and(|c| !c.is_empty()))
}

/// Merge a stack into a container: top up matching stacks below the max
/// stack size, else take the first empty slot. Returns the remainder.
fn add_to_container(container: &mut BinContainer, mut stack: ItemStack) -> Option<ItemStack> {
    for index in 0..container.slot_count() {
        if container.slot(index).is_none() {
            container.set_slot(index, Some(stack));
            return None;
        }
        if let Some(existing) = container.slot_mut(index) {
            if existing.is_same_item_same_details(&stack)
                && existing.count < existing.max_stack_size()
            {
                let space = existing.max_stack_size().saturating_sub(existing.count);
                let moved = space.min(stack.count);
                existing.count = existing.count.saturating_add(moved);
                stack.count = stack.count.saturating_sub(moved);
                if stack.count == 0 {
                    return None;
                }
            }
        }
    }
    Some(stack)
}

// ===========================================================================
// Tests
// ===========================================================================
