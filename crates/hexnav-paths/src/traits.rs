use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use hexnav_core::{HexDirection, HexGrid, HexPoint, NEIGHBOR_COUNT, Vec3};

use crate::PathStatus;

/// Grid addressing the path finder searches over.
///
/// Every world position maps to exactly one grid point, and each point has a
/// fixed number of neighbors. Neighbor enumeration may depend on a parity
/// index computed once per point (`parity_index`), which is passed back into
/// `neighbor` for every index.
pub trait GridAddressing {
    /// Grid cell address.
    type Point: Copy + Eq + Ord + Hash + Debug;
    /// Step direction label. Equal for steps along the same grid line.
    type Direction: Copy + Eq + Debug;

    /// World position of the cell center, with `y = 0`.
    fn to_world(&self, p: Self::Point) -> Vec3;
    /// Cell containing the world position (Y is ignored).
    fn from_world(&self, v: Vec3) -> Self::Point;
    /// Number of neighbors of `p`.
    fn neighbor_count(&self, p: Self::Point) -> usize;
    /// Parity index of `p`, passed to [`neighbor`](Self::neighbor).
    fn parity_index(&self, p: Self::Point) -> usize;
    /// The `index`-th neighbor of `p`.
    fn neighbor(&self, p: Self::Point, index: usize, parity_index: usize) -> Self::Point;
    /// Cost class of the `index`-th neighbor step.
    fn neighbor_mode(&self, p: Self::Point, index: usize) -> usize;
    /// Base cost of a step in the given cost class.
    fn neighbor_cost(&self, p: Self::Point, mode: usize) -> f32;
    /// Direction label of the step `from -> to`.
    fn direction_between(&self, from: Self::Point, to: Self::Point) -> Self::Direction;
    /// Direction label closest to a world-space heading at `p`, if any.
    fn direction_of_heading(&self, p: Self::Point, heading: Vec3) -> Option<Self::Direction>;
    /// Admissible estimate of the cost between two points.
    fn heuristic_distance(&self, from: Self::Point, to: Self::Point) -> f32;
    /// Nominal cell size, the unit turn penalties are scaled by.
    fn cell_size(&self) -> f32;
}

/// Height of the walkable surface.
pub trait GroundQuery {
    /// Ground height under `(x, z)`, or `None` where there is no ground.
    fn height_at(&self, x: f32, z: f32) -> Option<f32>;
}

/// Out-parameters filled by [`MovementValidator::can_move`].
#[derive(Clone, Debug, PartialEq)]
pub struct MoveReport<T, C> {
    /// Multiplier on movement speed along the segment. Edge costs are divided
    /// by it, so values above 1 make a segment cheaper.
    pub speed_modifier: f32,
    /// Squared world length of the segment.
    pub squared_length: f32,
    /// Height difference `to.y - from.y`.
    pub height_diff: f32,
    /// Triggers crossed by the segment. Only collected when `Some`.
    pub triggers: Option<Vec<T>>,
    /// Object the segment collided with, if any.
    pub collider: Option<C>,
}

impl<T, C> MoveReport<T, C> {
    /// Report with a neutral speed modifier that does not collect triggers.
    pub fn new() -> Self {
        Self {
            speed_modifier: 1.0,
            squared_length: 0.0,
            height_diff: 0.0,
            triggers: None,
            collider: None,
        }
    }

    /// Report that collects crossed triggers.
    pub fn with_triggers() -> Self {
        Self {
            triggers: Some(Vec::new()),
            ..Self::new()
        }
    }

    /// Record a crossed trigger if this report collects them.
    pub fn record_trigger(&mut self, trigger: T) {
        if let Some(triggers) = &mut self.triggers {
            triggers.push(trigger);
        }
    }

    /// Segment length from `squared_length`.
    #[inline]
    pub fn length(&self) -> f32 {
        self.squared_length.sqrt()
    }
}

impl<T, C> Default for MoveReport<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks whether a moving object can travel a straight segment.
pub trait MovementValidator {
    /// The object being moved.
    type Object;
    /// Trigger identity reported in [`MoveReport::triggers`].
    type Trigger;
    /// Collider identity reported in [`MoveReport::collider`].
    type Collider;

    /// Check the straight move `from -> to`. Both points carry their ground
    /// height in `y`. Returns a success code when the move is possible.
    fn can_move(
        &self,
        object: &Self::Object,
        from: Vec3,
        to: Vec3,
        report: &mut MoveReport<Self::Trigger, Self::Collider>,
    ) -> PathStatus;

    /// Current facing of the object, used to label the start node.
    fn heading(&self, _object: &Self::Object) -> Option<Vec3> {
        None
    }
}

// ---------------------------------------------------------------------------
// Forwarding impls
// ---------------------------------------------------------------------------

macro_rules! forward_grid {
    ($ty:ty) => {
        impl<T: GridAddressing + ?Sized> GridAddressing for $ty {
            type Point = T::Point;
            type Direction = T::Direction;

            fn to_world(&self, p: Self::Point) -> Vec3 {
                (**self).to_world(p)
            }
            fn from_world(&self, v: Vec3) -> Self::Point {
                (**self).from_world(v)
            }
            fn neighbor_count(&self, p: Self::Point) -> usize {
                (**self).neighbor_count(p)
            }
            fn parity_index(&self, p: Self::Point) -> usize {
                (**self).parity_index(p)
            }
            fn neighbor(&self, p: Self::Point, index: usize, parity_index: usize) -> Self::Point {
                (**self).neighbor(p, index, parity_index)
            }
            fn neighbor_mode(&self, p: Self::Point, index: usize) -> usize {
                (**self).neighbor_mode(p, index)
            }
            fn neighbor_cost(&self, p: Self::Point, mode: usize) -> f32 {
                (**self).neighbor_cost(p, mode)
            }
            fn direction_between(&self, from: Self::Point, to: Self::Point) -> Self::Direction {
                (**self).direction_between(from, to)
            }
            fn direction_of_heading(
                &self,
                p: Self::Point,
                heading: Vec3,
            ) -> Option<Self::Direction> {
                (**self).direction_of_heading(p, heading)
            }
            fn heuristic_distance(&self, from: Self::Point, to: Self::Point) -> f32 {
                (**self).heuristic_distance(from, to)
            }
            fn cell_size(&self) -> f32 {
                (**self).cell_size()
            }
        }
    };
}

macro_rules! forward_ground {
    ($ty:ty) => {
        impl<T: GroundQuery + ?Sized> GroundQuery for $ty {
            fn height_at(&self, x: f32, z: f32) -> Option<f32> {
                (**self).height_at(x, z)
            }
        }
    };
}

macro_rules! forward_validator {
    ($ty:ty) => {
        impl<T: MovementValidator + ?Sized> MovementValidator for $ty {
            type Object = T::Object;
            type Trigger = T::Trigger;
            type Collider = T::Collider;

            fn can_move(
                &self,
                object: &Self::Object,
                from: Vec3,
                to: Vec3,
                report: &mut MoveReport<Self::Trigger, Self::Collider>,
            ) -> PathStatus {
                (**self).can_move(object, from, to, report)
            }
            fn heading(&self, object: &Self::Object) -> Option<Vec3> {
                (**self).heading(object)
            }
        }
    };
}

forward_grid!(&T);
forward_grid!(Arc<T>);
forward_ground!(&T);
forward_ground!(Arc<T>);
forward_validator!(&T);
forward_validator!(Arc<T>);

// ---------------------------------------------------------------------------
// HexGrid
// ---------------------------------------------------------------------------

impl GridAddressing for HexGrid {
    type Point = HexPoint;
    type Direction = HexDirection;

    fn to_world(&self, p: HexPoint) -> Vec3 {
        HexGrid::to_world(self, p)
    }

    fn from_world(&self, v: Vec3) -> HexPoint {
        HexGrid::from_world(self, v)
    }

    fn neighbor_count(&self, _p: HexPoint) -> usize {
        NEIGHBOR_COUNT
    }

    fn parity_index(&self, p: HexPoint) -> usize {
        p.parity_index()
    }

    fn neighbor(&self, p: HexPoint, index: usize, parity_index: usize) -> HexPoint {
        p.neighbor(index, parity_index)
    }

    fn neighbor_mode(&self, _p: HexPoint, index: usize) -> usize {
        HexPoint::neighbor_mode(index)
    }

    fn neighbor_cost(&self, _p: HexPoint, mode: usize) -> f32 {
        HexGrid::neighbor_cost(self, mode)
    }

    fn direction_between(&self, from: HexPoint, to: HexPoint) -> HexDirection {
        from.direction_to(to)
    }

    fn direction_of_heading(&self, p: HexPoint, heading: Vec3) -> Option<HexDirection> {
        HexGrid::direction_of_heading(self, p, heading)
    }

    fn heuristic_distance(&self, from: HexPoint, to: HexPoint) -> f32 {
        self.heuristic(from, to)
    }

    fn cell_size(&self) -> f32 {
        HexGrid::cell_size(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbors_of<G: GridAddressing>(grid: &G, p: G::Point) -> Vec<G::Point> {
        let parity = grid.parity_index(p);
        (0..grid.neighbor_count(p))
            .map(|i| grid.neighbor(p, i, parity))
            .collect()
    }

    #[test]
    fn hex_grid_through_trait() {
        let grid = HexGrid::new(1.0).unwrap();
        let p = HexPoint::new(3, -2);
        let ns = neighbors_of(&grid, p);
        assert_eq!(ns.len(), NEIGHBOR_COUNT);
        assert_eq!(ns, p.neighbors().collect::<Vec<_>>());
        for (i, n) in ns.iter().enumerate() {
            let mode = GridAddressing::neighbor_mode(&grid, p, i);
            let d = GridAddressing::to_world(&grid, p).distance(GridAddressing::to_world(&grid, *n));
            assert!((d - GridAddressing::neighbor_cost(&grid, p, mode)).abs() < 1e-4);
        }
    }

    #[test]
    fn forwarding_through_arc_and_ref() {
        let grid = Arc::new(HexGrid::new(2.0).unwrap());
        let p = HexPoint::new(1, 1);
        let q = HexPoint::new(4, 7);
        assert_eq!(neighbors_of(&grid, p), neighbors_of(&*grid, p));
        assert_eq!(
            grid.heuristic_distance(p, q),
            (&*grid).heuristic_distance(p, q)
        );
        assert_eq!(GridAddressing::cell_size(&grid), 2.0);
    }

    #[test]
    fn report_collects_triggers_only_when_asked() {
        let mut plain: MoveReport<u8, ()> = MoveReport::new();
        plain.record_trigger(1);
        assert_eq!(plain.triggers, None);
        assert_eq!(plain.speed_modifier, 1.0);

        let mut collecting: MoveReport<u8, ()> = MoveReport::with_triggers();
        collecting.record_trigger(1);
        collecting.record_trigger(2);
        assert_eq!(collecting.triggers, Some(vec![1, 2]));

        collecting.squared_length = 9.0;
        assert_eq!(collecting.length(), 3.0);
    }
}
