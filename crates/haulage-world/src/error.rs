//! Error types for the haulage-world crate.

use haulage_types::GridPos;

/// Errors that can occur while constructing or editing a world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Attempted to place a container on a cell kind that cannot bear one.
    #[error("cell kind at {pos:?} cannot bear a container")]
    NotABin {
        /// The cell that was targeted.
        pos: GridPos,
    },

    /// Attempted to join two bins that are not both containers.
    #[error("cannot join {a:?} and {b:?}: both cells must hold containers")]
    JoinWithoutContainers {
        /// First cell of the attempted pair.
        a: GridPos,
        /// Second cell of the attempted pair.
        b: GridPos,
    },

    /// No container exists at the given position.
    #[error("no container at {pos:?}")]
    NoContainer {
        /// The cell that was queried.
        pos: GridPos,
    },
}
