//! A* path finding over a hexagonal world grid whose
//! edges are discovered during the search.
//!
//! Edge costs and even edge existence are not known up front. The
//! [`PathFinder`] asks a [`GroundQuery`] for the height of each cell it
//! steps into and a [`MovementValidator`] whether the straight move is
//! possible. Steps that move closer to the goal are validated as soon as
//! they are generated; the rest are kept as deferred nodes and validated
//! only if the search ever pops them.
//!
//! A found path is reduced to the points where the step direction changes,
//! then simplified by cutting straight across turns the validator allows.
//!
//! # Collaborators
//!
//! | Trait | Role |
//! |---|---|
//! | [`GridAddressing`] | cells, neighbors, base costs, directions, heuristic |
//! | [`GroundQuery`] | ground height under a world point |
//! | [`MovementValidator`] | straight-move checks, speed modifiers, facing |
//!
//! [`HexGrid`](hexnav_core::HexGrid) implements [`GridAddressing`].
//!
//! # Status codes
//!
//! Every outcome is a [`PathStatus`]: positive codes for success, codes with
//! the high bit set for failure. Searches never panic on a blocked world.
//!
//! # Threads
//!
//! [`PathSearchTask`] runs one search on a worker thread and supports
//! cooperative cancellation through a [`CancelToken`].

mod astar;
mod config;
mod graph;
mod simplify;
mod status;
mod task;
mod traits;

#[cfg(test)]
mod testworld;

pub use astar::{EdgeCheck, GridGraph, PathFinder, PathResult};
pub use config::{ConfigError, DEFAULT_ITERATION_LIMIT, SearchConfig};
pub use graph::{NewNode, NodeId, PathNode, SearchGraph};
pub use simplify::{RawPath, reconstruct};
pub use status::PathStatus;
pub use task::{CancelToken, PathSearchTask};
pub use traits::{GridAddressing, GroundQuery, MoveReport, MovementValidator};
