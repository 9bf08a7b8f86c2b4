use hexnav_core::Vec3;

use crate::PathFinder;
use crate::astar::GridGraph;
use crate::graph::NodeId;
use crate::traits::{GridAddressing, GroundQuery, MoveReport, MovementValidator};

/// Waypoints with the cost of each segment between them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawPath {
    pub points: Vec<Vec3>,
    /// `segment_costs[i]` is the cost from `points[i]` to `points[i + 1]`.
    pub segment_costs: Vec<f32>,
}

impl RawPath {
    pub fn total_cost(&self) -> f32 {
        self.segment_costs.iter().sum()
    }
}

/// Turn the parent chain ending at `goal` into turn-point waypoints.
///
/// A waypoint is emitted wherever the step direction changes. Turn points sit
/// at the node's ground height; the first and last waypoints are the exact
/// `src` and `dst`.
pub fn reconstruct<G: GridAddressing>(
    graph: &GridGraph<G>,
    grid: &G,
    goal: NodeId,
    src: Vec3,
    dst: Vec3,
) -> RawPath {
    let mut points = vec![dst];
    let mut segment_costs = Vec::new();

    let end = graph.node(goal);
    let mut segment = end.cost_from_parent;
    let mut prev_dir = end.direction;
    let mut cursor = end.parent;
    let mut budget = graph.len();

    while let Some(id) = cursor {
        let node = graph.node(id);
        let Some(parent) = node.parent else {
            break;
        };
        if budget == 0 {
            break;
        }
        budget -= 1;

        if node.direction != prev_dir {
            points.push(grid.to_world(node.point).with_y(node.ground_height));
            segment_costs.push(segment);
            segment = 0.0;
            prev_dir = node.direction;
        }
        segment += node.cost_from_parent;
        cursor = Some(parent);
    }

    segment_costs.push(segment);
    points.push(src);
    points.reverse();
    segment_costs.reverse();
    RawPath {
        points,
        segment_costs,
    }
}

impl<G, Q, V> PathFinder<G, Q, V>
where
    G: GridAddressing,
    Q: GroundQuery,
    V: MovementValidator,
{
    /// Drop turn points the object can cut straight across.
    ///
    /// Passes repeat until one drops nothing. The total cost never grows.
    pub fn simplify(&self, object: &V::Object, mut path: RawPath) -> RawPath {
        let mut passes = 0;
        while self.simplify_pass(object, &mut path) {
            passes += 1;
        }
        log::trace!(
            "simplified to {} waypoints in {} passes",
            path.points.len(),
            passes + 1
        );
        path
    }

    /// One forward pass. Returns whether a turn point was dropped.
    fn simplify_pass(&self, object: &V::Object, path: &mut RawPath) -> bool {
        let n = path.points.len();
        if n < 3 || path.segment_costs.len() != n - 1 {
            return false;
        }
        let ratio = self.config().simplify_ratio;

        let mut points = Vec::with_capacity(n);
        let mut costs = Vec::with_capacity(n - 1);
        points.push(path.points[0]);

        // Raw input cost since the anchor, and cost of the output segment
        // from the anchor up to the current turn.
        let mut raw = path.segment_costs[0];
        let mut segment = raw;
        let mut dropped = false;

        for turn in 1..n - 1 {
            let anchor = points[points.len() - 1];
            let next = path.points[turn + 1];
            let from_turn = path.segment_costs[turn];
            raw += from_turn;

            match self.direct_cost(object, anchor, next) {
                Some(direct) if direct <= ratio * raw => {
                    segment = direct;
                    dropped = true;
                }
                _ => {
                    points.push(path.points[turn]);
                    costs.push(segment);
                    raw = from_turn;
                    segment = from_turn;
                }
            }
        }

        points.push(path.points[n - 1]);
        costs.push(segment);
        path.points = points;
        path.segment_costs = costs;
        dropped
    }

    /// Cost of moving straight from `from` to `to`, or `None` if impassable.
    fn direct_cost(&self, object: &V::Object, from: Vec3, to: Vec3) -> Option<f32> {
        let mut report = MoveReport::new();
        let status = self.validator().can_move(object, from, to, &mut report);
        if status.is_err() || report.speed_modifier <= 0.0 || report.speed_modifier.is_nan() {
            return None;
        }
        let length = if report.squared_length > 0.0 {
            report.length()
        } else {
            from.distance(to)
        };
        Some(length / report.speed_modifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SearchConfig;
    use crate::graph::{NewNode, SearchGraph};
    use crate::testworld::{Mover, TestWorld};
    use hexnav_core::{HexDirection, HexGrid, HexPoint};

    type Graph = SearchGraph<HexPoint, HexDirection>;

    fn finder(world: TestWorld) -> PathFinder<HexGrid, TestWorld, TestWorld> {
        // Ground and validator roles on separate values; only the validator matters here.
        let ground = TestWorld::open(world.bounds());
        PathFinder::new(HexGrid::default(), ground, world)
    }

    fn raw(points: &[(f32, f32)], costs: &[f32]) -> RawPath {
        RawPath {
            points: points
                .iter()
                .map(|&(x, z)| Vec3::new(x, 0.0, z))
                .collect(),
            segment_costs: costs.to_vec(),
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn corner_cut_in_open_field() {
        let f = finder(TestWorld::open(50.0));
        let path = raw(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0)], &[10.0, 10.0]);
        let out = f.simplify(&Mover::default(), path.clone());
        assert_eq!(out.points, vec![path.points[0], path.points[2]]);
        assert!(approx(out.total_cost(), 200f32.sqrt()));
        assert!(out.total_cost() <= path.total_cost());
    }

    #[test]
    fn corner_kept_when_blocked() {
        let f = finder(TestWorld::open(50.0).with_rock(5.0, 5.0, 2.0));
        let path = raw(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0)], &[10.0, 10.0]);
        let out = f.simplify(&Mover::default(), path.clone());
        assert_eq!(out, path);
    }

    #[test]
    fn marginal_gain_keeps_turn() {
        // Direct 10 vs. 10.5 through the turn: not cheap enough to cut.
        let f = finder(TestWorld::open(50.0));
        let path = raw(&[(0.0, 0.0), (0.0, 5.0), (0.0, 10.0)], &[5.25, 5.25]);
        let out = f.simplify(&Mover::default(), path.clone());
        assert_eq!(out, path);
    }

    #[test]
    fn zigzag_with_turn_costs_collapses() {
        let f = finder(TestWorld::open(50.0));
        let mut points = Vec::new();
        let mut costs = Vec::new();
        for i in 0..=20 {
            let x = if i % 2 == 0 { 0.0 } else { 0.866 };
            points.push((x, i as f32 * 1.5));
            if i > 0 {
                costs.push(1.732 + 2.0);
            }
        }
        let path = raw(&points, &costs);
        let out = f.simplify(&Mover::default(), path.clone());
        assert_eq!(out.points.len(), 2);
        assert!(approx(out.total_cost(), 30.0));
    }

    #[test]
    fn slow_direct_segment_not_taken() {
        // The shortcut crosses a zone at quarter speed and ends up costlier.
        let f = finder(TestWorld::open(50.0).with_zone(5.0, 5.0, 1.0, 0.25));
        let path = raw(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0)], &[10.0, 10.0]);
        let out = f.simplify(&Mover::default(), path.clone());
        assert_eq!(out, path);
    }

    #[test]
    fn no_removable_turn_remains() {
        let world = TestWorld::open(50.0)
            .with_rock(5.0, 5.0, 2.0)
            .with_rock(15.0, 5.0, 2.0);
        let f = finder(world);
        let path = raw(
            &[
                (0.0, 0.0),
                (0.0, 10.0),
                (5.0, 10.0),
                (10.0, 10.0),
                (10.0, 0.0),
                (20.0, 0.0),
                (20.0, 10.0),
            ],
            &[10.0, 5.0, 5.0, 10.0, 10.0, 10.0],
        );
        let out = f.simplify(&Mover::default(), path.clone());
        assert!(out.total_cost() <= path.total_cost());
        assert_eq!(out.segment_costs.len(), out.points.len() - 1);
        let ratio = f.config().simplify_ratio;
        for i in 1..out.points.len() - 1 {
            let keep = out.segment_costs[i - 1] + out.segment_costs[i];
            if let Some(direct) =
                f.direct_cost(&Mover::default(), out.points[i - 1], out.points[i + 1])
            {
                assert!(direct > ratio * keep, "turn {i} removable");
            }
        }
    }

    #[test]
    fn two_points_untouched() {
        let f = finder(TestWorld::open(50.0));
        let path = raw(&[(0.0, 0.0), (3.0, 4.0)], &[5.0]);
        assert_eq!(f.simplify(&Mover::default(), path.clone()), path);
    }

    #[test]
    fn reconstruct_emits_turn_points() {
        let grid = HexGrid::default();
        let mut graph = Graph::new();
        let start = HexPoint::new(0, 0);
        let root = graph.insert_root(start, None, 0.0, 0.0);

        // Two steps up, then two steps along the (1, 1) direct neighbor line.
        let mut cursor = (root, start);
        let mut walk = |to: HexPoint, cost: f32, height: f32, graph: &mut Graph| {
            let id = graph.insert_node(
                cursor.0,
                NewNode {
                    point: to,
                    direction: cursor.1.direction_to(to),
                    cost_from_parent: cost,
                    estimate_cost_to_end: 0.0,
                    ground_height: height,
                    needs_check: false,
                },
            );
            cursor = (id, to);
            id
        };
        walk(HexPoint::new(0, 1), 3.0, 0.1, &mut graph);
        let corner = HexPoint::new(0, 2);
        walk(corner, 1.0, 0.2, &mut graph);
        walk(HexPoint::new(1, 3), 1.0, 0.3, &mut graph);
        let goal = walk(HexPoint::new(2, 3), 1.0, 0.4, &mut graph);

        let src = Vec3::new(0.05, 0.0, -0.05);
        let dst = Vec3::new(1.7, 0.4, 3.1);
        let path = reconstruct(&graph, &grid, goal, src, dst);

        assert_eq!(path.points.len(), 3);
        assert_eq!(path.points[0], src);
        assert_eq!(path.points[1], grid.to_world(corner).with_y(0.2));
        assert_eq!(path.points[2], dst);
        assert_eq!(path.segment_costs, vec![4.0, 2.0]);
    }

    #[test]
    fn reconstruct_single_step() {
        let grid = HexGrid::default();
        let mut graph = Graph::new();
        let start = HexPoint::new(0, 0);
        let root = graph.insert_root(start, None, 0.0, 0.0);
        let next = HexPoint::new(0, 1);
        let goal = graph.insert_node(
            root,
            NewNode {
                point: next,
                direction: start.direction_to(next),
                cost_from_parent: 3.0,
                estimate_cost_to_end: 0.0,
                ground_height: 0.0,
                needs_check: false,
            },
        );
        let path = reconstruct(&graph, &grid, goal, Vec3::ZERO, grid.to_world(next));
        assert_eq!(path.points, vec![Vec3::ZERO, grid.to_world(next)]);
        assert_eq!(path.segment_costs, vec![3.0]);
    }

    #[test]
    fn disabled_simplify_returns_turns() {
        let config = SearchConfig {
            simplify: false,
            ..Default::default()
        };
        let f = finder(TestWorld::open(60.0)).with_config(config).unwrap();
        let src = HexGrid::default().to_world(HexPoint::new(0, 0));
        let dst = HexGrid::default().to_world(HexPoint::new(0, 20));
        let found = f.find_path(&Mover::default(), src, dst);
        assert!(found.is_ok());

        let simplified = f.simplify(
            &Mover::default(),
            RawPath {
                points: found.points.clone(),
                segment_costs: found.segment_costs.clone(),
            },
        );
        assert!(simplified.points.len() <= found.points.len());
        assert!(simplified.total_cost() <= found.total_cost() + 1e-3);
    }
}
