//! Demo warehouse runner for the Haulage simulation.
//!
//! Wires the full stack together: an in-memory grid world with stocked
//! timber bins and empty steel bins (one of them a wildcard), two
//! couriers -- one filtered, one not -- with open/close/cue presentation
//! hooks, and the shared filter engine loaded from `haulage-filters.json`.
//! Steps the world for a fixed number of steps and logs what moved where.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load the filter alias configuration
//! 3. Build the item catalog and filter engine
//! 4. Lay out the warehouse (bins, stock, labels)
//! 5. Spawn the couriers
//! 6. Run the simulation loop
//! 7. Log the final bin contents

use std::path::PathBuf;
use std::sync::Arc;

use haulage_agents::{
    CourierBody, FilterConfig, FilterEngine, FilterPolicy, InteractionHook, StepContext,
    TARGET_INTERACTION_STEPS, TransportBehavior, TransportConfig,
};
use haulage_types::{
    AgentId, CellKind, GridPos, InteractionOutcome, ItemCatalog, ItemId, ItemStack,
    PartitionId, Vec3,
};
use haulage_world::world::CellSnapshot;
use haulage_world::{GridNavigator, GridWorld, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Number of simulation steps the demo runs.
const DEMO_STEPS: u64 = 2400;

/// One courier and everything that moves it.
struct Courier {
    body: CourierBody,
    nav: GridNavigator,
    behavior: TransportBehavior,
}

/// Application entry point for the demo warehouse.
fn main() {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("haulage-engine starting");

    // 2. Load the filter alias configuration.
    let config_path = PathBuf::from("haulage-filters.json");
    let filter_config = FilterConfig::load(&config_path);
    info!(
        aliases = filter_config.aliases().len(),
        path = %config_path.display(),
        "Filter aliases loaded"
    );

    // 3. Build the item catalog and filter engine.
    let catalog = ItemCatalog::from_paths([
        "iron_ingot",
        "iron_nugget",
        "gold_bar",
        "copper_coil",
        "tin_ingot",
        "wool_bale",
        "oak_plank",
        "bread_loaf",
        "bundle_crate",
    ]);
    let filters = Arc::new(FilterEngine::new(catalog, filter_config));
    let policy = Arc::new(FilterPolicy::new(Arc::clone(&filters)));

    // 4. Lay out the warehouse.
    let mut world = GridWorld::new(PartitionId::new());
    stock_bin(&mut world, GridPos::new(6, 0, 2), "iron_ingot", 48);
    stock_bin(&mut world, GridPos::new(6, 0, 6), "iron_nugget", 32);
    stock_bin(&mut world, GridPos::new(6, 0, 10), "wool_bale", 24);

    place_steel_bin(&mut world, GridPos::new(-4, 0, 2), Some("iron !nugget"));
    place_steel_bin(&mut world, GridPos::new(-4, 0, 6), Some("$textiles"));
    place_steel_bin(&mut world, GridPos::new(-4, 0, 10), Some("*"));
    info!(bins = 6, "Warehouse laid out");

    // 5. Spawn the couriers.
    let transport_config = Arc::new(demo_transport_config());
    let mut couriers = vec![
        spawn_courier(
            Vec3::new(0.5, 0.0, 2.5),
            Some("iron !nugget"),
            Arc::clone(&transport_config),
            Arc::clone(&policy),
        ),
        spawn_courier(
            Vec3::new(0.5, 0.0, 9.5),
            None,
            Arc::clone(&transport_config),
            policy,
        ),
    ];
    for courier in &couriers {
        info!(
            courier = %courier.body.id,
            label = courier.body.label.as_deref().unwrap_or("<none>"),
            "Courier spawned"
        );
    }

    // 6. Run the simulation loop.
    for step in 1..=DEMO_STEPS {
        for courier in &mut couriers {
            courier.nav.sync_position(courier.body.pos);
            let mut ctx = StepContext {
                world: &mut world,
                nav: &mut courier.nav,
                courier: &mut courier.body,
                step,
            };
            courier.behavior.step(&mut ctx);
            courier.nav.advance(&mut courier.body.pos);
        }
    }
    info!(steps = DEMO_STEPS, "Simulation finished");

    // 7. Log the final bin contents.
    for pos in [
        GridPos::new(6, 0, 2),
        GridPos::new(6, 0, 6),
        GridPos::new(6, 0, 10),
        GridPos::new(-4, 0, 2),
        GridPos::new(-4, 0, 6),
        GridPos::new(-4, 0, 10),
    ] {
        let summary = world.container(pos).map_or_else(
            || String::from("<missing>"),
            |container| {
                let stacks: Vec<String> = container
                    .stacks()
                    .map(|stack| format!("{}x{}", stack.item, stack.count))
                    .collect();
                if stacks.is_empty() {
                    String::from("<empty>")
                } else {
                    stacks.join(", ")
                }
            },
        );
        info!(?pos, contents = %summary, "Final bin contents");
    }
}

/// Place a stocked timber bin.
fn stock_bin(world: &mut GridWorld, pos: GridPos, path: &str, count: u32) {
    if world.place_bin(pos, CellKind::TimberBin, 9).is_ok() {
        if let Some(container) = world.container_mut(pos) {
            container.set_slot(0, Some(ItemStack::new(ItemId::new(path), count)));
        }
    }
}

/// Place an empty steel bin with an optional label.
fn place_steel_bin(world: &mut GridWorld, pos: GridPos, label: Option<&str>) {
    if world.place_bin(pos, CellKind::SteelBin, 9).is_ok() {
        if let Some(container) = world.container_mut(pos) {
            container.set_label(label.map(String::from));
        }
    }
}

/// Build a courier at a position with an optional filter label.
fn spawn_courier(
    pos: Vec3,
    label: Option<&str>,
    config: Arc<TransportConfig>,
    policy: Arc<FilterPolicy>,
) -> Courier {
    let mut body = CourierBody::new(AgentId::new(), pos);
    body.label = label.map(String::from);
    let mut nav = GridNavigator::new();
    nav.sync_position(pos);
    Courier {
        body,
        nav,
        behavior: TransportBehavior::new(config, policy),
    }
}

/// Transport configuration for the demo: timber bins feed steel bins,
/// with presentation hooks that open the bin at interaction step 1, cue
/// at step 9, and close at the commit step.
fn demo_transport_config() -> TransportConfig {
    let mut config = TransportConfig::new(
        Arc::new(|cell: &CellSnapshot| cell.kind == CellKind::TimberBin),
        Arc::new(|cell: &CellSnapshot| cell.kind == CellKind::SteelBin),
    );
    for outcome in [
        InteractionOutcome::PickupItem,
        InteractionOutcome::PickupNoItem,
        InteractionOutcome::PlaceItem,
        InteractionOutcome::PlaceNoItem,
    ] {
        let hook: InteractionHook = Arc::new(move |world, courier, target, step| {
            if step == 1 {
                if let Some(container) = world.container_mut(target.pos) {
                    container.open(courier.id);
                }
            }
            if step == 9 {
                info!(courier = %courier.id, ?outcome, "interaction cue");
            }
            if step == TARGET_INTERACTION_STEPS {
                if let Some(container) = world.container_mut(target.pos) {
                    container.close(courier.id);
                }
            }
        });
        config.interaction_hooks.insert(outcome, hook);
    }
    config
}
