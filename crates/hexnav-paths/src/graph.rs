use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Index of a node in a [`SearchGraph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A search node: one way of reaching a grid cell from a specific parent.
///
/// Several nodes may exist for the same cell. At most one per cell is
/// canonical (see [`SearchGraph::canonical`]); the rest are speculative
/// nodes created for deferred validation.
#[derive(Clone, Debug)]
pub struct PathNode<P, D> {
    pub point: P,
    pub parent: Option<NodeId>,
    /// Nodes created or re-parented from this one. Entries whose `parent`
    /// no longer points back here are stale and ignored.
    pub children: SmallVec<[NodeId; 4]>,
    /// Direction of the step from the parent, `None` for an unknown start heading.
    pub direction: Option<D>,
    pub cost_from_parent: f32,
    pub cost_from_start: f32,
    pub estimate_cost_to_end: f32,
    /// Ground height at the cell center. Only meaningful once validated.
    pub ground_height: f32,
    pub is_open: bool,
    /// The edge from the parent has not been validated yet.
    pub needs_check: bool,
    generation: u32,
}

impl<P, D> PathNode<P, D> {
    /// Open-set key. Validated nodes are ordered by the estimate alone;
    /// deferred nodes by the full `g + h`.
    #[inline]
    pub fn priority(&self) -> f32 {
        if self.needs_check {
            self.estimate_cost_to_end + self.cost_from_start
        } else {
            self.estimate_cost_to_end
        }
    }
}

/// Fields of a node about to be inserted under a parent.
#[derive(Clone, Debug)]
pub struct NewNode<P, D> {
    pub point: P,
    pub direction: D,
    pub cost_from_parent: f32,
    pub estimate_cost_to_end: f32,
    pub ground_height: f32,
    pub needs_check: bool,
}

/// Open-set entry, ordered by key with FIFO tie-break.
#[derive(Clone, Copy)]
struct OpenEntry {
    key: f32,
    seq: u64,
    node: NodeId,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so BinaryHeap (max-heap) pops the smallest key, then the oldest entry.
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// SearchGraph
// ---------------------------------------------------------------------------

/// Node arena, registries and open set of a single search.
///
/// Nodes are never removed; [`NodeId`]s stay valid for the lifetime of the
/// graph. The open set may hold stale entries for closed nodes or for nodes
/// that were reinserted with a new key; [`pop_open`](Self::pop_open) skips
/// them.
pub struct SearchGraph<P, D> {
    nodes: Vec<PathNode<P, D>>,
    by_edge: FxHashMap<(P, P), NodeId>,
    by_point: FxHashMap<P, NodeId>,
    open: BinaryHeap<OpenEntry>,
    seq: u64,
    generation: u32,
    worklist: Vec<NodeId>,
}

impl<P, D> Default for SearchGraph<P, D>
where
    P: Copy + Eq + Hash,
    D: Copy + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, D> SearchGraph<P, D>
where
    P: Copy + Eq + Hash,
    D: Copy + Eq,
{
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            by_edge: FxHashMap::default(),
            by_point: FxHashMap::default(),
            open: BinaryHeap::new(),
            seq: 0,
            generation: 0,
            worklist: Vec::new(),
        }
    }

    /// Number of nodes ever created.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &PathNode<P, D> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut PathNode<P, D> {
        &mut self.nodes[id.index()]
    }

    /// All nodes with their ids, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &PathNode<P, D>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    fn push_node(&mut self, node: PathNode<P, D>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Insert the start node: validated, open, canonical for its cell and
    /// registered under the edge `(point, point)`.
    pub fn insert_root(
        &mut self,
        point: P,
        direction: Option<D>,
        estimate_cost_to_end: f32,
        ground_height: f32,
    ) -> NodeId {
        let id = self.push_node(PathNode {
            point,
            parent: None,
            children: SmallVec::new(),
            direction,
            cost_from_parent: 0.0,
            cost_from_start: 0.0,
            estimate_cost_to_end,
            ground_height,
            is_open: true,
            needs_check: false,
            generation: 0,
        });
        self.by_edge.insert((point, point), id);
        self.by_point.insert(point, id);
        self.push_open(id);
        id
    }

    /// Insert an open node under `parent`, register it by edge, add it to the
    /// parent's children and push it into the open set.
    ///
    /// Canonical registration is left to the caller since it depends on
    /// whether the edge was validated.
    pub fn insert_node(&mut self, parent: NodeId, new: NewNode<P, D>) -> NodeId {
        let (parent_point, parent_cost) = {
            let p = self.node(parent);
            (p.point, p.cost_from_start)
        };
        let id = self.push_node(PathNode {
            point: new.point,
            parent: Some(parent),
            children: SmallVec::new(),
            direction: Some(new.direction),
            cost_from_parent: new.cost_from_parent,
            cost_from_start: parent_cost + new.cost_from_parent,
            estimate_cost_to_end: new.estimate_cost_to_end,
            ground_height: new.ground_height,
            is_open: true,
            needs_check: new.needs_check,
            generation: 0,
        });
        self.by_edge.insert((new.point, parent_point), id);
        self.add_child(parent, id);
        self.push_open(id);
        id
    }

    /// Make `id` the canonical node of its cell unless the cell already has
    /// one. Returns whether `id` was registered.
    pub fn register_canonical(&mut self, id: NodeId) -> bool {
        let point = self.node(id).point;
        if self.by_point.contains_key(&point) {
            return false;
        }
        self.by_point.insert(point, id);
        true
    }

    /// The canonical (validated) node of a cell.
    #[inline]
    pub fn canonical(&self, point: P) -> Option<NodeId> {
        self.by_point.get(&point).copied()
    }

    /// The node created for the edge `parent_point -> point`, if any.
    #[inline]
    pub fn find_by_edge(&self, point: P, parent_point: P) -> Option<NodeId> {
        self.by_edge.get(&(point, parent_point)).copied()
    }

    /// Push `id` into the open set under its current priority.
    pub fn push_open(&mut self, id: NodeId) {
        let key = self.node(id).priority();
        self.seq += 1;
        self.open.push(OpenEntry {
            key,
            seq: self.seq,
            node: id,
        });
    }

    /// Pop the open node with the smallest key, skipping closed nodes.
    pub fn pop_open(&mut self) -> Option<NodeId> {
        while let Some(entry) = self.open.pop() {
            if self.node(entry.node).is_open {
                return Some(entry.node);
            }
        }
        None
    }

    /// Number of open-set entries, stale ones included.
    #[inline]
    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    /// Add `child` to the children of `parent` if not already there.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let children = &mut self.node_mut(parent).children;
        if !children.contains(&child) {
            children.push(child);
        }
    }

    /// Remove `id` from its parent's children.
    pub fn detach_from_parent(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
    }

    /// Attach `id` under `new_parent` with a new step, then propagate the
    /// cost change to its descendants.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId, direction: D, cost_from_parent: f32) {
        let base = self.node(new_parent).cost_from_start;
        let node = self.node_mut(id);
        node.parent = Some(new_parent);
        node.direction = Some(direction);
        node.cost_from_parent = cost_from_parent;
        node.cost_from_start = base + cost_from_parent;
        self.add_child(new_parent, id);
        self.update_descendant_costs(id);
    }

    /// Recompute `cost_from_start` below `id` after its own cost changed.
    ///
    /// Only children whose parent is still the visited node are updated.
    /// Open children are reinserted under their new key; closed children are
    /// walked further. Each node is visited at most once per call.
    pub fn update_descendant_costs(&mut self, id: NodeId) {
        self.generation = self.generation.wrapping_add(1);
        let stamp = self.generation;

        let mut stack = std::mem::take(&mut self.worklist);
        stack.clear();
        self.node_mut(id).generation = stamp;
        stack.push(id);

        while let Some(current) = stack.pop() {
            let base = self.node(current).cost_from_start;
            let count = self.node(current).children.len();
            for i in 0..count {
                let child = self.node(current).children[i];
                let node = self.node_mut(child);
                if node.parent != Some(current) || node.generation == stamp {
                    continue;
                }
                node.generation = stamp;
                node.cost_from_start = base + node.cost_from_parent;
                if node.is_open {
                    self.push_open(child);
                } else {
                    stack.push(child);
                }
            }
        }

        self.worklist = stack;
    }

    /// Node ids from `id` up to the start node, `id` first.
    ///
    /// The walk is bounded by the node count, so a corrupted parent chain
    /// cannot loop forever.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut cursor = self.node(id).parent;
        while let Some(next) = cursor {
            if path.len() > self.nodes.len() {
                break;
            }
            path.push(next);
            cursor = self.node(next).parent;
        }
        path
    }
}
