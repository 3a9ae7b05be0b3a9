//! End-to-end transport flows against the in-memory grid world.
//!
//! These tests step real couriers through [`GridWorld`]: full haul cycles,
//! filter-gated sourcing, wildcard deposit routing, queuing arbitration,
//! and the memory-cap cooldowns.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::{Arc, Mutex};

use haulage_agents::{
    CourierBody, FilterConfig, FilterEngine, FilterPolicy, InteractionHook, StepContext,
    StepStatus, TARGET_INTERACTION_STEPS, TransportBehavior, TransportConfig,
};
use haulage_types::{
    AgentId, CellKind, GridPos, InteractionOutcome, ItemCatalog, ItemId, ItemStack,
    PartitionId, TransportState, Vec3,
};
use haulage_world::world::CellSnapshot;
use haulage_world::{GridNavigator, GridWorld, World};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

type EventLog = Arc<Mutex<Vec<(InteractionOutcome, u32)>>>;

struct SimCourier {
    body: CourierBody,
    nav: GridNavigator,
    behavior: TransportBehavior,
}

struct Sim {
    world: GridWorld,
    couriers: Vec<SimCourier>,
    step: u64,
}

impl Sim {
    fn new(world: GridWorld) -> Self {
        Self {
            world,
            couriers: Vec::new(),
            step: 0,
        }
    }

    fn add_courier(
        &mut self,
        pos: Vec3,
        label: Option<&str>,
        hand: Option<ItemStack>,
        config: Arc<TransportConfig>,
        policy: Arc<FilterPolicy>,
    ) -> usize {
        let mut body = CourierBody::new(AgentId::new(), pos);
        body.label = label.map(String::from);
        body.hand = hand;
        let mut nav = GridNavigator::new();
        nav.sync_position(pos);
        self.couriers.push(SimCourier {
            body,
            nav,
            behavior: TransportBehavior::new(config, policy),
        });
        self.couriers.len() - 1
    }

    fn step_once(&mut self) -> Vec<StepStatus> {
        self.step += 1;
        let mut statuses = Vec::new();
        for courier in &mut self.couriers {
            courier.nav.sync_position(courier.body.pos);
            let mut ctx = StepContext {
                world: &mut self.world,
                nav: &mut courier.nav,
                courier: &mut courier.body,
                step: self.step,
            };
            statuses.push(courier.behavior.step(&mut ctx));
            courier.nav.advance(&mut courier.body.pos);
        }
        statuses
    }

    fn run(&mut self, steps: u32) {
        for _ in 0..steps {
            self.step_once();
        }
    }

    /// Step until the predicate holds; `true` when it did in time.
    fn run_until(&mut self, max_steps: u32, predicate: impl Fn(&Self) -> bool) -> bool {
        for _ in 0..max_steps {
            if predicate(self) {
                return true;
            }
            self.step_once();
        }
        predicate(self)
    }

    fn bin_stack(&self, pos: GridPos, slot: usize) -> Option<ItemStack> {
        self.world.container(pos).and_then(|c| c.slot(slot).cloned())
    }
}

fn is_timber(cell: &CellSnapshot) -> bool {
    cell.kind == CellKind::TimberBin
}

fn is_steel(cell: &CellSnapshot) -> bool {
    cell.kind == CellKind::SteelBin
}

fn catalog() -> ItemCatalog {
    ItemCatalog::from_paths(["iron_ingot", "iron_nugget", "gold_bar", "wool_bale"])
}

fn filter_policy() -> Arc<FilterPolicy> {
    Arc::new(FilterPolicy::new(Arc::new(FilterEngine::new(
        catalog(),
        FilterConfig::empty(),
    ))))
}

/// Transport config wired with open/close hooks and an event log.
fn hooked_config(events: &EventLog) -> Arc<TransportConfig> {
    let mut config = TransportConfig::new(Arc::new(is_timber), Arc::new(is_steel));
    for outcome in [
        InteractionOutcome::PickupItem,
        InteractionOutcome::PickupNoItem,
        InteractionOutcome::PlaceItem,
        InteractionOutcome::PlaceNoItem,
    ] {
        let events = Arc::clone(events);
        let hook: InteractionHook = Arc::new(move |world, courier, target, step| {
            events.lock().unwrap().push((outcome, step));
            if step == 1 {
                if let Some(container) = world.container_mut(target.pos) {
                    container.open(courier.id);
                }
            }
            if step == TARGET_INTERACTION_STEPS {
                if let Some(container) = world.container_mut(target.pos) {
                    container.close(courier.id);
                }
            }
        });
        config.interaction_hooks.insert(outcome, hook);
    }
    Arc::new(config)
}

fn stocked_bin(world: &mut GridWorld, pos: GridPos, kind: CellKind, path: &str, count: u32) {
    world.place_bin(pos, kind, 9).unwrap();
    world
        .container_mut(pos)
        .unwrap()
        .set_slot(0, Some(ItemStack::new(ItemId::new(path), count)));
}

// ---------------------------------------------------------------------------
// Full haul cycle
// ---------------------------------------------------------------------------

#[test]
fn courier_hauls_goods_between_bins() {
    let mut world = GridWorld::new(PartitionId::new());
    let source = GridPos::new(3, 0, 0);
    let sink = GridPos::new(7, 0, 0);
    stocked_bin(&mut world, source, CellKind::TimberBin, "iron_ingot", 40);
    world.place_bin(sink, CellKind::SteelBin, 9).unwrap();

    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Sim::new(world);
    let courier = sim.add_courier(
        Vec3::new(0.5, 0.0, 0.5),
        None,
        None,
        hooked_config(&events),
        filter_policy(),
    );

    // Pickup: 16 units move into the hand, capped by the haul limit.
    assert!(sim.run_until(200, |sim| {
        !sim.couriers[courier].body.is_empty_handed()
    }));
    let hand = sim.couriers[courier].body.hand.clone().unwrap();
    assert_eq!(hand.item, ItemId::new("iron_ingot"));
    assert_eq!(hand.count, 16);
    assert_eq!(sim.bin_stack(source, 0).map(|s| s.count), Some(24));
    // Success clears the memory sets without any cooldown.
    assert_eq!(sim.couriers[courier].behavior.memory().visited_len(), 0);
    assert_eq!(
        sim.couriers[courier].behavior.memory().cooldown_remaining(),
        0
    );

    // Deposit: the full hand lands in the empty steel bin.
    assert!(sim.run_until(300, |sim| {
        sim.bin_stack(sink, 0).is_some()
    }));
    assert!(sim.run_until(10, |sim| {
        sim.couriers[courier].body.is_empty_handed()
    }));
    assert_eq!(
        sim.bin_stack(sink, 0).map(|s| (s.item, s.count)),
        Some((ItemId::new("iron_ingot"), 16))
    );

    // Presentation hooks observed the agreed step offsets.
    let log = events.lock().unwrap();
    assert!(log.contains(&(InteractionOutcome::PickupItem, 1)));
    assert!(log.contains(&(InteractionOutcome::PickupItem, 9)));
    assert!(log.contains(&(InteractionOutcome::PickupItem, TARGET_INTERACTION_STEPS)));
    assert!(log.contains(&(InteractionOutcome::PlaceItem, 1)));
    assert!(log.contains(&(InteractionOutcome::PlaceItem, TARGET_INTERACTION_STEPS)));
}

// ---------------------------------------------------------------------------
// Filtered sourcing
// ---------------------------------------------------------------------------

#[test]
fn labeled_courier_sources_only_matching_goods() {
    let mut world = GridWorld::new(PartitionId::new());
    // The nearer bin holds only excluded goods.
    stocked_bin(
        &mut world,
        GridPos::new(3, 0, 0),
        CellKind::TimberBin,
        "iron_nugget",
        20,
    );
    stocked_bin(
        &mut world,
        GridPos::new(8, 0, 0),
        CellKind::TimberBin,
        "iron_ingot",
        20,
    );

    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Sim::new(world);
    let courier = sim.add_courier(
        Vec3::new(0.5, 0.0, 0.5),
        Some("iron !nugget"),
        None,
        hooked_config(&events),
        filter_policy(),
    );

    assert!(sim.run_until(300, |sim| {
        !sim.couriers[courier].body.is_empty_handed()
    }));
    let hand = sim.couriers[courier].body.hand.clone().unwrap();
    assert_eq!(hand.item, ItemId::new("iron_ingot"));
    // The nugget bin was never touched.
    assert_eq!(
        sim.bin_stack(GridPos::new(3, 0, 0), 0).map(|s| s.count),
        Some(20)
    );
}

#[test]
fn labeled_courier_picks_matching_slot_not_first_slot() {
    let mut world = GridWorld::new(PartitionId::new());
    let source = GridPos::new(3, 0, 0);
    world.place_bin(source, CellKind::TimberBin, 9).unwrap();
    {
        let container = world.container_mut(source).unwrap();
        container.set_slot(0, Some(ItemStack::new(ItemId::new("wool_bale"), 5)));
        container.set_slot(1, Some(ItemStack::new(ItemId::new("iron_ingot"), 5)));
    }

    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Sim::new(world);
    let courier = sim.add_courier(
        Vec3::new(0.5, 0.0, 0.5),
        Some("iron"),
        None,
        hooked_config(&events),
        filter_policy(),
    );

    assert!(sim.run_until(200, |sim| {
        !sim.couriers[courier].body.is_empty_handed()
    }));
    let hand = sim.couriers[courier].body.hand.clone().unwrap();
    assert_eq!(hand.item, ItemId::new("iron_ingot"));
    // The non-matching first slot stays put.
    assert_eq!(
        sim.bin_stack(source, 0).map(|s| (s.item, s.count)),
        Some((ItemId::new("wool_bale"), 5))
    );
}

// ---------------------------------------------------------------------------
// Wildcard routing
// ---------------------------------------------------------------------------

#[test]
fn wildcard_round_trip_redirects_and_force_deposits() {
    let mut world = GridWorld::new(PartitionId::new());
    // A labeled bin that refuses the held goods...
    world.place_bin(GridPos::new(2, 0, 0), CellKind::SteelBin, 9).unwrap();
    world
        .container_mut(GridPos::new(2, 0, 0))
        .unwrap()
        .set_label(Some(String::from("iron")));
    // ...and a joined wildcard pair, labeled on the far half.
    let near_half = GridPos::new(5, 0, 0);
    let far_half = GridPos::new(6, 0, 0);
    world.place_bin(near_half, CellKind::SteelBin, 9).unwrap();
    world.place_bin(far_half, CellKind::SteelBin, 9).unwrap();
    world.join_bins(near_half, far_half).unwrap();
    world
        .container_mut(far_half)
        .unwrap()
        .set_label(Some(String::from("*")));

    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Sim::new(world);
    let courier = sim.add_courier(
        Vec3::new(0.5, 0.0, 0.5),
        None,
        Some(ItemStack::new(ItemId::new("gold_bar"), 1)),
        hooked_config(&events),
        filter_policy(),
    );

    // The wildcard visit records the exact targeted half, keeps the item.
    assert!(sim.run_until(300, |sim| {
        sim.couriers[courier].behavior.routing().recorded().is_some()
    }));
    assert_eq!(
        sim.couriers[courier].behavior.routing().recorded(),
        Some(near_half)
    );
    assert!(!sim.couriers[courier].body.is_empty_handed());

    // Search exhaustion consumes the record into a forced redirect
    // instead of a cooldown.
    assert!(sim.run_until(300, |sim| {
        sim.couriers[courier].behavior.routing().forced_to().is_some()
    }));
    assert_eq!(
        sim.couriers[courier].behavior.routing().forced_to(),
        Some(near_half)
    );
    assert_eq!(
        sim.couriers[courier].behavior.routing().recorded(),
        None
    );
    assert_eq!(
        sim.couriers[courier].behavior.memory().cooldown_remaining(),
        0
    );
    assert_eq!(
        sim.couriers[courier].behavior.target().map(|t| t.pos),
        Some(near_half)
    );

    // The forced deposit succeeds unconditionally and clears everything.
    assert!(sim.run_until(300, |sim| {
        sim.couriers[courier].body.is_empty_handed()
    }));
    assert_eq!(
        sim.bin_stack(near_half, 0).map(|s| s.item),
        Some(ItemId::new("gold_bar"))
    );
    assert!(sim.couriers[courier].behavior.routing().is_clear());
    assert_eq!(sim.couriers[courier].behavior.memory().visited_len(), 0);
}

// ---------------------------------------------------------------------------
// Queuing arbitration
// ---------------------------------------------------------------------------

#[test]
fn second_courier_queues_until_the_claim_lifts() {
    let mut world = GridWorld::new(PartitionId::new());
    let source = GridPos::new(3, 0, 0);
    stocked_bin(&mut world, source, CellKind::TimberBin, "iron_ingot", 40);
    world.place_bin(GridPos::new(3, 0, 8), CellKind::SteelBin, 9).unwrap();

    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let config = hooked_config(&events);
    let policy = filter_policy();
    let mut sim = Sim::new(world);
    // First courier starts beside the bin, the second a little behind.
    let first = sim.add_courier(
        Vec3::new(2.0, 0.0, 0.5),
        None,
        None,
        Arc::clone(&config),
        Arc::clone(&policy),
    );
    let second = sim.add_courier(
        Vec3::new(0.2, 0.0, 0.5),
        None,
        None,
        config,
        policy,
    );

    let mut saw_queue_during_claim = false;
    for _ in 0..400 {
        let statuses = sim.step_once();
        if statuses[first] == StepStatus::Active(TransportState::Interacting)
            && statuses[second] == StepStatus::Active(TransportState::Queuing)
        {
            saw_queue_during_claim = true;
        }
        if !sim.couriers[second].body.is_empty_handed() {
            break;
        }
    }

    // The second courier queued while the first held the bin open, then
    // got its turn once the claim predicate reported the bin free.
    assert!(saw_queue_during_claim);
    assert!(!sim.couriers[first].body.is_empty_handed() || {
        // The first courier may already have deposited; either way it
        // picked up first.
        sim.bin_stack(GridPos::new(3, 0, 8), 0).is_some()
    });
    assert!(!sim.couriers[second].body.is_empty_handed());
    // 40 minus two hauls of 16.
    assert_eq!(sim.bin_stack(source, 0).map(|s| s.count), Some(8));
}

// ---------------------------------------------------------------------------
// Memory caps and cooldown
// ---------------------------------------------------------------------------

#[test]
fn eleventh_visited_position_forces_cooldown_and_clear() {
    let mut world = GridWorld::new(PartitionId::new());
    let mut bins = Vec::new();
    for i in 0..11_i32 {
        let pos = GridPos::new(2 + i * 2, 0, 0);
        stocked_bin(&mut world, pos, CellKind::TimberBin, "iron_ingot", 8);
        bins.push(pos);
    }

    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Sim::new(world);
    let courier = sim.add_courier(
        Vec3::new(0.5, 0.0, 0.5),
        None,
        None,
        hooked_config(&events),
        filter_policy(),
    );

    // Invalidate each acquired target so every step re-targets a fresh
    // bin and records another visited position.
    let mut last_status = StepStatus::Stopped;
    for _ in 0..11 {
        last_status = sim.step_once().remove(courier);
        if let Some(target) = sim.couriers[courier].behavior.target() {
            sim.world.remove_bin(target.pos);
        }
    }

    // The 11th distinct position overflowed: cooldown, everything cleared.
    assert_eq!(last_status, StepStatus::Stopped);
    assert_eq!(sim.couriers[courier].behavior.memory().visited_len(), 0);
    assert_eq!(
        sim.couriers[courier].behavior.memory().cooldown_remaining(),
        haulage_agents::SEARCH_COOLDOWN_STEPS
    );

    // The cooldown holds for its full duration, then search resumes.
    for _ in 0..haulage_agents::SEARCH_COOLDOWN_STEPS {
        assert_eq!(sim.step_once().remove(courier), StepStatus::CoolingDown);
    }
    let resumed = sim.step_once().remove(courier);
    assert!(matches!(resumed, StepStatus::Active(_)));
}

#[test]
fn failed_path_demotes_target_to_unreachable() {
    let mut world = GridWorld::new(PartitionId::new());
    let walled = GridPos::new(3, 0, 0);
    let open = GridPos::new(9, 0, 0);
    stocked_bin(&mut world, walled, CellKind::TimberBin, "iron_ingot", 8);
    stocked_bin(&mut world, open, CellKind::TimberBin, "iron_ingot", 8);

    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Sim::new(world);
    let courier = sim.add_courier(
        Vec3::new(0.5, 0.0, 0.5),
        None,
        None,
        hooked_config(&events),
        filter_policy(),
    );
    // Paths toward the near bin dead-end far away from it.
    sim.couriers[courier].nav.set_detour(walled, GridPos::new(0, 0, 12));

    sim.run(2);

    let partition = sim.world.partition();
    let memory = sim.couriers[courier].behavior.memory();
    assert!(memory.unreachable_contains(&haulage_types::WorldPos::new(partition, walled)));
    assert!(memory.visited_contains(&haulage_types::WorldPos::new(partition, open)));
    assert_eq!(
        sim.couriers[courier].behavior.target().map(|t| t.pos),
        Some(open)
    );
}

#[test]
fn missing_path_while_out_of_range_counts_as_reachable() {
    // A navigator that cannot produce a path at all leaves the target
    // standing: the no-path-and-out-of-range branch reports reachable,
    // so nothing is demoted. Kept as observed behavior of the transport
    // cycle; see the reachability note in DESIGN.md.
    let mut world = GridWorld::new(PartitionId::new());
    let bin = GridPos::new(6, 0, 0);
    stocked_bin(&mut world, bin, CellKind::TimberBin, "iron_ingot", 8);

    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Sim::new(world);
    let courier = sim.add_courier(
        Vec3::new(0.5, 0.0, 0.5),
        None,
        None,
        hooked_config(&events),
        filter_policy(),
    );
    sim.couriers[courier].nav.mark_unreachable(bin);

    sim.run(10);

    assert_eq!(
        sim.couriers[courier].behavior.target().map(|t| t.pos),
        Some(bin)
    );
    assert_eq!(sim.couriers[courier].behavior.memory().unreachable_len(), 0);
    assert_eq!(
        sim.couriers[courier].behavior.state(),
        TransportState::Travelling
    );
}

#[test]
fn carried_courier_searches_only_its_immediate_surroundings() {
    let mut world = GridWorld::new(PartitionId::new());
    let bin = GridPos::new(4, 0, 0);
    stocked_bin(&mut world, bin, CellKind::TimberBin, "iron_ingot", 8);

    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Sim::new(world);
    let courier = sim.add_courier(
        Vec3::new(0.5, 0.0, 0.5),
        None,
        None,
        hooked_config(&events),
        filter_policy(),
    );
    sim.couriers[courier].body.carried = true;

    // Four cells away is outside the carried search radius.
    assert_eq!(sim.step_once().remove(courier), StepStatus::Stopped);
    assert!(
        sim.couriers[courier].behavior.memory().cooldown_remaining() > 0
    );

    // Set back down, the full radius applies again.
    let mut sim = Sim::new({
        let mut world = GridWorld::new(PartitionId::new());
        stocked_bin(&mut world, bin, CellKind::TimberBin, "iron_ingot", 8);
        world
    });
    let courier = sim.add_courier(
        Vec3::new(0.5, 0.0, 0.5),
        None,
        None,
        hooked_config(&events),
        filter_policy(),
    );
    assert!(matches!(
        sim.step_once().remove(courier),
        StepStatus::Active(_)
    ));
}

// ---------------------------------------------------------------------------
// Interaction aborts
// ---------------------------------------------------------------------------

#[test]
fn drifting_away_aborts_the_interaction_without_transacting() {
    let mut world = GridWorld::new(PartitionId::new());
    let source = GridPos::new(3, 0, 0);
    stocked_bin(&mut world, source, CellKind::TimberBin, "iron_ingot", 8);

    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Sim::new(world);
    let courier = sim.add_courier(
        Vec3::new(2.0, 0.0, 0.5),
        None,
        None,
        hooked_config(&events),
        filter_policy(),
    );

    assert!(sim.run_until(50, |sim| {
        sim.couriers[courier].behavior.state() == TransportState::Interacting
    }));
    // Something yanks the courier far from the bin mid-interaction.
    sim.couriers[courier].body.pos = Vec3::new(12.5, 0.0, 0.5);
    sim.step_once();

    assert_eq!(
        sim.couriers[courier].behavior.state(),
        TransportState::Travelling
    );
    // Nothing was transacted.
    assert!(sim.couriers[courier].body.is_empty_handed());
    assert_eq!(sim.bin_stack(source, 0).map(|s| s.count), Some(8));
}
