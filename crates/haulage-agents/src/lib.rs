//! Courier transport behavior, content filters, and haul policies for the
//! Haulage simulation.
//!
//! This crate is the behavior core: everything that decides what a courier
//! does, without owning world state or doing I/O beyond alias-config
//! persistence. It sits between `haulage-types`/`haulage-world` (data and
//! collaborator contracts) and whatever host steps the simulation.
//!
//! # Modules
//!
//! - [`agent`] -- Courier body state ([`CourierBody`])
//! - [`cache`] -- Filter memoization and the shared engine ([`FilterCache`], [`FilterEngine`])
//! - [`config`] -- Alias configuration with load/merge/save ([`FilterConfig`])
//! - [`filter`] -- Label parsing and stack matching ([`FilterResult`])
//! - [`locator`] -- Neighborhood search for the nearest valid container
//! - [`memory`] -- Bounded expiring position memory and cooldown ([`PositionMemory`])
//! - [`policy`] -- The pluggable decision points ([`HaulPolicy`], [`FilterPolicy`])
//! - [`transport`] -- The transport state machine ([`TransportBehavior`])

pub mod agent;
pub mod cache;
pub mod config;
pub mod filter;
pub mod locator;
pub mod memory;
pub mod policy;
pub mod transport;

// Re-export primary types at crate root for convenience.
pub use agent::CourierBody;
pub use cache::{FilterCache, FilterEngine};
pub use config::{ConfigError, FilterConfig};
pub use filter::{FilterResult, effective_stack, parse_filter};
pub use locator::find_nearest_target;
pub use memory::{
    MAX_UNREACHABLE_POSITIONS, MAX_VISITED_POSITIONS, POSITION_MEMORY_HORIZON,
    PositionMemory, SEARCH_COOLDOWN_STEPS,
};
pub use policy::{
    DefaultPolicy, DepositContext, DepositVerdict, FilterPolicy, HaulPolicy, WILDCARD_LABEL,
};
pub use transport::{
    CARRIED_SEARCH_RADIUS, CellPredicate, ClaimPredicate, InteractionHook, MAX_HAUL_COUNT,
    StepContext, StepStatus, TARGET_INTERACTION_STEPS, TransportBehavior, TransportConfig,
    TransportTarget, TravelHook, WildcardRouting,
};
