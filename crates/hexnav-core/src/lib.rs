//! Geometry types shared by the *hexnav* crates.
//!
//! This crate provides the world-space point type used by movement and
//! ground queries, and the hexagonal grid addressing scheme the path finder
//! searches over: grid points, neighbor enumeration, per-edge base costs,
//! direction labels and the distance heuristic.

pub mod geom;
pub mod hex;

pub use geom::Vec3;
pub use hex::{GridError, HexDirection, HexGrid, HexPoint, NEIGHBOR_COUNT};
