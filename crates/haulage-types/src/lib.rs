//! Shared type definitions for the Haulage simulation.
//!
//! This crate holds the data vocabulary used by every other crate in the
//! workspace: typed identifiers, grid/continuous geometry, the item model,
//! and the enumerations driven by the transport behavior. It has no
//! behavior of its own beyond small derived helpers.

pub mod enums;
pub mod geom;
pub mod ids;
pub mod item;

pub use enums::{CellKind, InteractionOutcome, TransportState};
pub use geom::{Aabb, GridPos, REGION_SIZE, RegionPos, Vec3, WorldPos};
pub use ids::{AgentId, EntityId, PartitionId};
pub use item::{ItemCatalog, ItemId, ItemStack};
