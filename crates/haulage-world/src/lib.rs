//! World model, containers, and navigation contracts for the Haulage
//! simulation.
//!
//! This crate defines the collaborators the transport behavior consumes:
//! the [`World`] trait (cell snapshots, container lookup, spatial regions,
//! ray clipping), the [`Navigator`] trait (paths and walk requests), and
//! the [`BinContainer`] storage model. It also ships [`GridWorld`], an
//! in-memory reference implementation used by the demo engine and the
//! integration tests.
//!
//! # Modules
//!
//! - [`container`] -- Slot storage, locks, labels, and open-claims ([`BinContainer`])
//! - [`error`] -- Error types for world construction ([`WorldError`])
//! - [`grid`] -- In-memory world and straight-line navigator ([`GridWorld`], [`GridNavigator`])
//! - [`nav`] -- Navigation contract ([`Navigator`], [`NavPath`])
//! - [`world`] -- World contract and snapshots ([`World`], [`CellSnapshot`], [`RayHit`])

pub mod container;
pub mod error;
pub mod grid;
pub mod nav;
pub mod world;

pub use container::BinContainer;
pub use error::WorldError;
pub use grid::{GridNavigator, GridWorld};
pub use nav::{NavPath, Navigator};
pub use world::{CellSnapshot, RayHit, World};
