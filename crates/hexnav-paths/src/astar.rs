use hexnav_core::Vec3;

use crate::graph::{NewNode, NodeId, SearchGraph};
use crate::simplify::{RawPath, reconstruct};
use crate::traits::{GridAddressing, GroundQuery, MoveReport, MovementValidator};
use crate::{CancelToken, ConfigError, PathStatus, SearchConfig};

/// Graph type searched by a [`PathFinder`] over grid `G`.
pub type GridGraph<G> =
    SearchGraph<<G as GridAddressing>::Point, <G as GridAddressing>::Direction>;

/// Outcome of a path search.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    pub status: PathStatus,
    /// Waypoints from the exact start to the exact destination. Empty on failure.
    pub points: Vec<Vec3>,
    /// Cost of each segment, `points.len() - 1` entries.
    pub segment_costs: Vec<f32>,
    /// Nodes closed by the search.
    pub iterations: usize,
}

impl PathResult {
    pub(crate) fn failed(status: PathStatus, iterations: usize) -> Self {
        Self {
            status,
            points: Vec::new(),
            segment_costs: Vec::new(),
            iterations,
        }
    }

    fn found(path: RawPath, iterations: usize) -> Self {
        Self {
            status: PathStatus::PATH_OK,
            points: path.points,
            segment_costs: path.segment_costs,
            iterations,
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Sum of the segment costs.
    pub fn total_cost(&self) -> f32 {
        self.segment_costs.iter().sum()
    }
}

/// Result of validating one grid edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCheck {
    pub status: PathStatus,
    /// Base cost divided by the reported speed modifier.
    pub cost: f32,
    /// Target cell center, with the sampled ground height when found.
    pub target: Vec3,
}

/// A* path finder over a grid with lazily validated edges.
///
/// The finder owns its collaborators; pass references or `Arc`s to share
/// them. Each search builds its own [`SearchGraph`], so a finder can serve
/// several searches at once from different threads.
pub struct PathFinder<G, Q, V> {
    grid: G,
    ground: Q,
    validator: V,
    config: SearchConfig,
}

impl<G, Q, V> PathFinder<G, Q, V>
where
    G: GridAddressing,
    Q: GroundQuery,
    V: MovementValidator,
{
    /// Create a finder with the default [`SearchConfig`].
    pub fn new(grid: G, ground: Q, validator: V) -> Self {
        Self {
            grid,
            ground,
            validator,
            config: SearchConfig::default(),
        }
    }

    /// Replace the search config after validating it.
    pub fn with_config(mut self, config: SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    #[inline]
    pub fn grid(&self) -> &G {
        &self.grid
    }

    #[inline]
    pub fn ground(&self) -> &Q {
        &self.ground
    }

    #[inline]
    pub fn validator(&self) -> &V {
        &self.validator
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Find a path with the configured iteration limit.
    pub fn find_path(&self, object: &V::Object, src: Vec3, dst: Vec3) -> PathResult {
        self.find_path_with_limit(object, src, dst, self.config.iteration_limit)
    }

    /// Find a path closing at most `iteration_limit` nodes.
    pub fn find_path_with_limit(
        &self,
        object: &V::Object,
        src: Vec3,
        dst: Vec3,
        iteration_limit: usize,
    ) -> PathResult {
        let mut graph = GridGraph::<G>::new();
        self.search(&mut graph, object, src, dst, iteration_limit, None).0
    }

    /// Find a path, giving up with `CANCELLED` once `cancel` is set.
    pub fn find_path_cancellable(
        &self,
        object: &V::Object,
        src: Vec3,
        dst: Vec3,
        iteration_limit: usize,
        cancel: &CancelToken,
    ) -> PathResult {
        let mut graph = GridGraph::<G>::new();
        self.search(&mut graph, object, src, dst, iteration_limit, Some(cancel))
            .0
    }

    /// Validate the edge from world point `from` into cell `to`.
    ///
    /// Samples the ground at the target center and asks the validator about
    /// the straight move. A missing ground sample fails with
    /// `GROUND_NOT_FOUND` without calling the validator. A non-positive
    /// speed modifier counts as `TRIGGER_NO_ACCESS`.
    pub fn check_edge(
        &self,
        object: &V::Object,
        from: Vec3,
        to: G::Point,
        base_cost: f32,
    ) -> EdgeCheck {
        let center = self.grid.to_world(to);
        let Some(height) = self.ground.height_at(center.x, center.z) else {
            return EdgeCheck {
                status: PathStatus::GROUND_NOT_FOUND,
                cost: base_cost,
                target: center,
            };
        };
        let target = center.with_y(height);

        let mut report = MoveReport::new();
        let mut status = self.validator.can_move(object, from, target, &mut report);
        let cost = if report.speed_modifier > 0.0 {
            base_cost / report.speed_modifier
        } else {
            if status.is_ok() {
                status = PathStatus::TRIGGER_NO_ACCESS;
            }
            base_cost
        };
        EdgeCheck {
            status,
            cost,
            target,
        }
    }

    /// Run a search inside `graph`, returning the result and the goal node.
    pub(crate) fn search(
        &self,
        graph: &mut GridGraph<G>,
        object: &V::Object,
        src: Vec3,
        dst: Vec3,
        iteration_limit: usize,
        cancel: Option<&CancelToken>,
    ) -> (PathResult, Option<NodeId>) {
        log::info!("path search {src} -> {dst} (limit {iteration_limit})");
        let (result, goal) = self.run(graph, object, src, dst, iteration_limit, cancel);
        log::info!(
            "path search finished: {} after {} iterations, {} nodes, {} waypoints",
            result.status,
            result.iterations,
            graph.len(),
            result.points.len()
        );
        (result, goal)
    }

    fn run(
        &self,
        graph: &mut GridGraph<G>,
        object: &V::Object,
        src: Vec3,
        dst: Vec3,
        iteration_limit: usize,
        cancel: Option<&CancelToken>,
    ) -> (PathResult, Option<NodeId>) {
        let start = self.grid.from_world(src);
        let goal = self.grid.from_world(dst);

        if start == goal {
            let path = RawPath {
                points: vec![src, dst],
                segment_costs: vec![src.distance(dst)],
            };
            return (PathResult::found(path, 0), None);
        }

        if self.config.precheck_target && self.ground.height_at(dst.x, dst.z).is_none() {
            log::debug!("no ground at target {dst}");
            return (PathResult::failed(PathStatus::GROUND_NOT_FOUND, 0), None);
        }

        let turn_cost = self.config.turn_penalty * self.grid.cell_size();
        let heading = self
            .validator
            .heading(object)
            .and_then(|h| self.grid.direction_of_heading(start, h));
        let root = graph.insert_root(
            start,
            heading,
            self.grid.heuristic_distance(start, goal),
            src.y,
        );

        let mut iterations = 0;
        let mut status = PathStatus::NOT_AVAILABLE;

        while let Some(current) = graph.pop_open() {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                log::debug!("path search cancelled after {iterations} iterations");
                status = PathStatus::CANCELLED;
                break;
            }

            if graph.node(current).needs_check && !self.validate_deferred(graph, object, current, root)
            {
                continue;
            }

            if iterations >= iteration_limit {
                log::debug!("path search gave up after {iterations} iterations");
                status = PathStatus::TOO_MANY_STEPS;
                break;
            }
            graph.node_mut(current).is_open = false;
            iterations += 1;

            if graph.node(current).point == goal {
                let raw = reconstruct(graph, &self.grid, current, src, dst);
                let path = if self.config.simplify {
                    self.simplify(object, raw)
                } else {
                    raw
                };
                return (PathResult::found(path, iterations), Some(current));
            }

            self.expand(graph, object, current, root, goal, turn_cost);
        }

        (PathResult::failed(status, iterations), None)
    }

    /// Validate the edge into a deferred node. On success the node gets its
    /// real cost and ground height and may become canonical; on failure it
    /// is closed and detached from its parent.
    fn validate_deferred(
        &self,
        graph: &mut GridGraph<G>,
        object: &V::Object,
        id: NodeId,
        root: NodeId,
    ) -> bool {
        let node = graph.node(id);
        let Some(parent_id) = node.parent else {
            return true;
        };
        let parent = graph.node(parent_id);
        let from = self.grid.to_world(parent.point).with_y(parent.ground_height);
        let parent_cost = parent.cost_from_start;
        let check = self.check_edge(object, from, node.point, node.cost_from_parent);

        let mut cost = check.cost;
        if check.status.is_err() {
            if parent_id == root && check.status != PathStatus::GROUND_NOT_FOUND {
                log::debug!("leaving start cell through blocked edge ({})", check.status);
                cost *= self.config.root_penalty;
            } else {
                log::debug!(
                    "rejected deferred edge {:?} -> {:?}: {}",
                    parent.point,
                    node.point,
                    check.status
                );
                graph.detach_from_parent(id);
                // Drops any duplicate heap entries; not counted as a closing.
                graph.node_mut(id).is_open = false;
                return false;
            }
        }

        let node = graph.node_mut(id);
        node.needs_check = false;
        node.cost_from_parent = cost;
        node.cost_from_start = parent_cost + cost;
        node.ground_height = check.target.y;
        graph.register_canonical(id);
        true
    }

    /// Generate the successors of a closed node.
    ///
    /// Neighbors that move closer to the goal are validated right away;
    /// the rest become deferred nodes checked only if they are ever popped.
    fn expand(
        &self,
        graph: &mut GridGraph<G>,
        object: &V::Object,
        current: NodeId,
        root: NodeId,
        goal: G::Point,
        turn_cost: f32,
    ) {
        let (point, direction, g, h, height, parent) = {
            let n = graph.node(current);
            (
                n.point,
                n.direction,
                n.cost_from_start,
                n.estimate_cost_to_end,
                n.ground_height,
                n.parent,
            )
        };
        log::trace!("analysing {point:?} g={g} h={h}");
        let grand_point = parent.map(|p| graph.node(p).point);
        let from = self.grid.to_world(point).with_y(height);
        let parity = self.grid.parity_index(point);

        for i in 0..self.grid.neighbor_count(point) {
            let next = self.grid.neighbor(point, i, parity);
            if grand_point == Some(next) {
                continue;
            }

            let step = self.grid.direction_between(point, next);
            let mut cost_from_parent = self
                .grid
                .neighbor_cost(point, self.grid.neighbor_mode(point, i));
            if direction != Some(step) {
                cost_from_parent += turn_cost;
            }
            let estimate = self.grid.heuristic_distance(next, goal);
            let existing = graph.find_by_edge(next, point);

            if estimate < h {
                let check = self.check_edge(object, from, next, cost_from_parent);
                let mut cost = check.cost;
                if check.status.is_err() {
                    if current == root && check.status != PathStatus::GROUND_NOT_FOUND {
                        cost *= self.config.root_penalty;
                    } else {
                        log::debug!("rejected edge {point:?} -> {next:?}: {}", check.status);
                        continue;
                    }
                }

                let cost_from_start = g + cost;
                if let Some(canonical) = graph.canonical(next) {
                    if cost_from_start < graph.node(canonical).cost_from_start {
                        log::debug!("re-parenting {next:?} under {point:?}");
                        graph.reparent(canonical, current, step, cost);
                    }
                } else if existing.is_none() {
                    let id = graph.insert_node(
                        current,
                        NewNode {
                            point: next,
                            direction: step,
                            cost_from_parent: cost,
                            estimate_cost_to_end: estimate,
                            ground_height: check.target.y,
                            needs_check: false,
                        },
                    );
                    graph.register_canonical(id);
                }
            } else if existing.is_none() {
                graph.insert_node(
                    current,
                    NewNode {
                        point: next,
                        direction: step,
                        cost_from_parent,
                        estimate_cost_to_end: estimate,
                        ground_height: 0.0,
                        needs_check: true,
                    },
                );
            }
        }
    }
}
