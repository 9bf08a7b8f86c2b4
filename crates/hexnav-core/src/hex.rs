//! Hexagonal world grid: [`HexPoint`], [`HexDirection`] and [`HexGrid`].
//!
//! Cells are flat-topped hexagons laid out in columns (`a`) along world X and
//! rows (`b`) along world Z. Odd columns are shifted by half a row, so the
//! neighbor table has one row-offset line per column parity.
//!
//! Every cell has twelve neighbors: the six adjacent cells ("direct", cost
//! = row spacing) and the six cells across a shared vertex ("diagonal",
//! cost = twice the column spacing).

use std::fmt;

use thiserror::Error;

use crate::geom::Vec3;

/// Number of neighbors enumerated for every grid point.
pub const NEIGHBOR_COUNT: usize = 12;

/// Neighbor offsets indexed by neighbor number.
///
/// - row 0: column (`a`) offset
/// - row 1: row (`b`) offset for even columns (parity index 1)
/// - row 2: row (`b`) offset for odd columns (parity index 2)
/// - row 3: neighbor mode, 0 for direct neighbors, 1 for diagonal ones
const NEIGHBOR_OFFSET: [[i8; NEIGHBOR_COUNT]; 4] = [
    [-2, 0, 2, 0, -1, -1, -1, -1, 1, 1, 1, 1],
    [0, 1, 0, -1, -1, 0, 2, 1, -1, 0, 2, 1],
    [0, 1, 0, -1, -2, -1, 1, 0, -2, -1, 1, 0],
    [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0],
];

/// `cos(30°)`: column spacing relative to row spacing.
const COLUMN_RATIO: f32 = 0.866_025_4;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while building a [`HexGrid`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Cell size must be finite and strictly positive.
    #[error("invalid hexagonal cell size: {0}")]
    InvalidCellSize(f32),
}

// ---------------------------------------------------------------------------
// HexPoint
// ---------------------------------------------------------------------------

/// A discrete hexagonal grid address: column `a`, row `b`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HexPoint {
    pub a: i32,
    pub b: i32,
}

impl HexPoint {
    /// Create a new grid point.
    #[inline]
    pub const fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Row-offset selector for the neighbor table: 1 for even columns,
    /// 2 for odd columns.
    #[inline]
    pub const fn parity_index(self) -> usize {
        1 + (self.a & 1) as usize
    }

    /// Neighbor number `index` using a precomputed [`parity_index`].
    ///
    /// [`parity_index`]: Self::parity_index
    #[inline]
    pub fn neighbor(self, index: usize, parity_index: usize) -> Self {
        Self::new(
            self.a + NEIGHBOR_OFFSET[0][index] as i32,
            self.b + NEIGHBOR_OFFSET[parity_index][index] as i32,
        )
    }

    /// Neighbor mode for neighbor number `index`: 0 direct, 1 diagonal.
    #[inline]
    pub fn neighbor_mode(index: usize) -> usize {
        NEIGHBOR_OFFSET[3][index] as usize
    }

    /// Iterate over all twelve neighbors.
    pub fn neighbors(self) -> impl Iterator<Item = HexPoint> {
        let parity = self.parity_index();
        (0..NEIGHBOR_COUNT).map(move |i| self.neighbor(i, parity))
    }

    /// Direction label of the step from `self` to `other`.
    ///
    /// The label depends on the order of the points and on their distance
    /// (it is not normalized), and is only comparable between steps to
    /// neighboring points. It does not depend on the position on the grid,
    /// so a straight run of identical steps keeps a single label.
    #[inline]
    pub fn direction_to(self, other: HexPoint) -> HexDirection {
        let dx = other.a - self.a;
        let dy = other.b - self.b + (self.a & dx & 1);
        HexDirection::from_offsets(dx, dy)
    }
}

impl PartialOrd for HexPoint {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HexPoint {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.b.cmp(&other.b).then(self.a.cmp(&other.a))
    }
}

impl fmt::Display for HexPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.a, self.b)
    }
}

// ---------------------------------------------------------------------------
// HexDirection
// ---------------------------------------------------------------------------

/// Packed step direction: `(dx + 12) | (dy + 12) << 8`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HexDirection(pub u16);

impl HexDirection {
    #[inline]
    const fn from_offsets(dx: i32, dy: i32) -> Self {
        let lo = (dx + 0x0c) as u8 as u16;
        let hi = (dy + 0x0c) as u8 as u16;
        Self(lo | (hi << 8))
    }

    /// Column and (parity corrected) row offsets encoded in the label.
    #[inline]
    pub const fn offsets(self) -> (i32, i32) {
        let dx = (self.0 & 0xff) as i32 - 0x0c;
        let dy = (self.0 >> 8) as i32 - 0x0c;
        (dx, dy)
    }
}

impl fmt::Display for HexDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// HexGrid
// ---------------------------------------------------------------------------

/// Sizing of the hexagonal grid and conversions between grid and world.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "GridSize", into = "GridSize")
)]
pub struct HexGrid {
    /// Row spacing (hexagon size along Z).
    distance_y: f32,
    /// Column spacing (3/4 of the hexagon size along X).
    distance_x: f32,
    half_distance_y: f32,
    /// Base step costs indexed by neighbor mode.
    neighbor_cost: [f32; 2],
}

/// Serialized form of a [`HexGrid`]: only the cell size, so loading goes
/// through [`HexGrid::new`].
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct GridSize {
    cell_size: f32,
}

#[cfg(feature = "serde")]
impl TryFrom<GridSize> for HexGrid {
    type Error = GridError;

    fn try_from(size: GridSize) -> Result<Self, GridError> {
        Self::new(size.cell_size)
    }
}

#[cfg(feature = "serde")]
impl From<HexGrid> for GridSize {
    fn from(grid: HexGrid) -> Self {
        Self {
            cell_size: grid.cell_size(),
        }
    }
}

impl Default for HexGrid {
    fn default() -> Self {
        Self::from_size(1.0)
    }
}

impl HexGrid {
    /// Create a grid whose rows are `cell_size` world units apart.
    pub fn new(cell_size: f32) -> Result<Self, GridError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(cell_size));
        }
        Ok(Self::from_size(cell_size))
    }

    fn from_size(size: f32) -> Self {
        let distance_x = size * COLUMN_RATIO;
        Self {
            distance_y: size,
            distance_x,
            half_distance_y: size * 0.5,
            neighbor_cost: [size, 2.0 * distance_x],
        }
    }

    /// Row spacing, the size of one cell.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.distance_y
    }

    /// Column spacing.
    #[inline]
    pub fn column_spacing(&self) -> f32 {
        self.distance_x
    }

    /// Grid point containing the world point (Y is ignored).
    ///
    /// Points close to a cell border may round into the neighboring cell.
    pub fn from_world(&self, v: Vec3) -> HexPoint {
        let a = (v.x / self.distance_x).round() as i32;
        let b = ((v.z + (a & 1) as f32 * self.half_distance_y) / self.distance_y).round() as i32;
        HexPoint::new(a, b)
    }

    /// World-space center of the cell, with Y = 0.
    pub fn to_world(&self, p: HexPoint) -> Vec3 {
        Vec3::new(
            p.a as f32 * self.distance_x,
            0.0,
            p.b as f32 * self.distance_y - (p.a & 1) as f32 * self.half_distance_y,
        )
    }

    /// Base cost of a step in the given neighbor mode.
    #[inline]
    pub fn neighbor_cost(&self, mode: usize) -> f32 {
        self.neighbor_cost[mode]
    }

    /// Euclidean distance between cell centers.
    pub fn heuristic(&self, from: HexPoint, to: HexPoint) -> f32 {
        self.to_world(from).distance(self.to_world(to))
    }

    /// Direction of the direct neighbor closest to the world heading.
    ///
    /// Returns `None` when the heading has no XZ component.
    pub fn direction_of_heading(&self, p: HexPoint, heading: Vec3) -> Option<HexDirection> {
        let flat = Vec3::new(heading.x, 0.0, heading.z).normalized();
        if flat == Vec3::ZERO {
            return None;
        }
        let origin = self.to_world(p);
        let parity = p.parity_index();
        (0..NEIGHBOR_COUNT)
            .filter(|&i| HexPoint::neighbor_mode(i) == 0)
            .map(|i| p.neighbor(i, parity))
            .map(|n| ((self.to_world(n) - origin).normalized().dot(flat), n))
            .max_by(|x, y| x.0.total_cmp(&y.0))
            .map(|(_, n)| p.direction_to(n))
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn hexpoint_round_trip() {
        let p = HexPoint::new(-7, 12);
        let json = serde_json::to_string(&p).unwrap();
        let back: HexPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn grid_round_trip() {
        let grid = HexGrid::new(0.75).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, r#"{"cell_size":0.75}"#);
        let back: HexGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(grid, back);
    }

    #[test]
    fn grid_rejects_bad_cell_size() {
        assert!(serde_json::from_str::<HexGrid>(r#"{"cell_size":0.0}"#).is_err());
        assert!(serde_json::from_str::<HexGrid>(r#"{"cell_size":-2.5}"#).is_err());
        assert!(serde_json::from_str::<HexGrid>(r#"{"distance_y":1.0}"#).is_err());
    }
}
