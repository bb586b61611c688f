//! Dynamic AABB bounding-volume hierarchy: binned-SAH bulk build, Catto-style
//! incremental insertion with sibling-swap rotations, bonsai re-pruning, and
//! BFS range/ray queries. No teacher counterpart exists (the teacher uses a
//! uniform `SpatialGrid`); this module is grounded on the node/slab shape of
//! `examples/other_examples/4a9ff301_dbenson24-bvh__src-lib.rs.rs` combined
//! with the teacher's `utils::allocator` generational slab for storage, and
//! written directly from SPEC_FULL §4.6 for the build/prune/rotate algorithms
//! themselves.

use glam::Vec3;

use crate::collision::aabb::Aabb;
use crate::config::{
    BVH_BONSAI_PRUNE_THRESHOLD, BVH_MIN_AXIS_EXTENT, BVH_SAH_BINS, DEFAULT_QUEUE_CAPACITY,
};
use crate::error::Result;
use crate::utils::allocator::{Arena, EntityId};
use crate::utils::queue::Queue;

/// Handle into the world's body arena, carried as a leaf's payload.
pub type BodyHandle = EntityId;
/// Handle into the BVH's own node slab; callers store this per-body to
/// later call [`Bvh::update`]/[`Bvh::remove`].
pub type NodeHandle = EntityId;

#[derive(Clone, Copy)]
enum NodeKind {
    Leaf(BodyHandle),
    Branch { left: NodeHandle, right: NodeHandle },
}

struct Node {
    aabb: Aabb,
    parent: Option<NodeHandle>,
    kind: NodeKind,
}

/// Dynamic BVH over fat body AABBs.
pub struct Bvh {
    nodes: Arena<Node>,
    root: Option<NodeHandle>,
}

impl Default for Bvh {
    fn default() -> Self {
        Self::new()
    }
}

impl Bvh {
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Inserts a leaf with the given (already fattened) AABB and returns
    /// its node handle, to be stored by the caller for later `update`s.
    pub fn insert(&mut self, body: BodyHandle, aabb: Aabb) -> NodeHandle {
        let leaf = self.nodes.insert(Node {
            aabb,
            parent: None,
            kind: NodeKind::Leaf(body),
        });

        let Some(root) = self.root else {
            self.root = Some(leaf);
            return leaf;
        };

        let sibling = self.best_sibling(root, aabb);
        let old_parent = self.nodes.get(sibling).unwrap().parent;

        let new_parent_aabb = self.nodes.get(sibling).unwrap().aabb.union(&aabb);
        let new_parent = self.nodes.insert(Node {
            aabb: new_parent_aabb,
            parent: old_parent,
            kind: NodeKind::Branch {
                left: sibling,
                right: leaf,
            },
        });

        self.nodes.get_mut(sibling).unwrap().parent = Some(new_parent);
        self.nodes.get_mut(leaf).unwrap().parent = Some(new_parent);

        match old_parent {
            None => self.root = Some(new_parent),
            Some(gp) => self.replace_child(gp, sibling, new_parent),
        }

        self.refit_and_rotate_upward(old_parent);
        leaf
    }

    /// Removes the leaf at `node`.
    pub fn remove(&mut self, node: NodeHandle) {
        let parent = match self.nodes.get(node) {
            Some(n) => n.parent,
            None => return,
        };
        self.nodes.remove(node);

        let Some(parent) = parent else {
            self.root = None;
            return;
        };

        let grandparent = self.nodes.get(parent).unwrap().parent;
        let sibling = match self.nodes.get(parent).unwrap().kind {
            NodeKind::Branch { left, right } => {
                if left == node {
                    right
                } else {
                    left
                }
            }
            NodeKind::Leaf(_) => unreachable!("parent of a leaf must be a branch"),
        };

        self.nodes.get_mut(sibling).unwrap().parent = grandparent;
        self.nodes.remove(parent);

        match grandparent {
            None => self.root = Some(sibling),
            Some(gp) => {
                self.replace_child(gp, parent, sibling);
                self.refit_and_rotate_upward(Some(gp));
            }
        }
    }

    /// Re-inserts a leaf whose actual AABB has escaped its stored fat AABB.
    /// `fat_aabb` is the caller's padded replacement bound.
    pub fn update(&mut self, node: NodeHandle, body: BodyHandle, actual_aabb: Aabb, fat_aabb: Aabb) -> NodeHandle {
        if self
            .nodes
            .get(node)
            .map(|n| n.aabb.contains(&actual_aabb))
            .unwrap_or(false)
        {
            return node;
        }
        self.remove(node);
        self.insert(body, fat_aabb)
    }

    fn replace_child(&mut self, parent: NodeHandle, old_child: NodeHandle, new_child: NodeHandle) {
        if let Some(node) = self.nodes.get_mut(parent) {
            if let NodeKind::Branch { left, right } = &mut node.kind {
                if *left == old_child {
                    *left = new_child;
                } else if *right == old_child {
                    *right = new_child;
                }
            }
        }
    }

    /// Catto's branch-and-bound sibling search: descend from `start` while
    /// the best child's inherited cost beats the cost of attaching directly
    /// to the current node.
    fn best_sibling(&self, start: NodeHandle, leaf_aabb: Aabb) -> NodeHandle {
        let mut index = start;
        loop {
            let node = self.nodes.get(index).unwrap();
            let (left, right) = match node.kind {
                NodeKind::Leaf(_) => return index,
                NodeKind::Branch { left, right } => (left, right),
            };

            let area = node.aabb.surface_area();
            let combined_area = node.aabb.union(&leaf_aabb).surface_area();
            let direct_cost = 2.0 * combined_area;
            let inherited = 2.0 * (combined_area - area);

            let child_cost = |child: NodeHandle| -> f32 {
                let child_node = self.nodes.get(child).unwrap();
                let new_area = child_node.aabb.union(&leaf_aabb).surface_area();
                match child_node.kind {
                    NodeKind::Leaf(_) => new_area + inherited,
                    NodeKind::Branch { .. } => {
                        new_area - child_node.aabb.surface_area() + inherited
                    }
                }
            };

            let cost_left = child_cost(left);
            let cost_right = child_cost(right);

            if direct_cost < cost_left && direct_cost < cost_right {
                return index;
            }
            index = if cost_left < cost_right { left } else { right };
        }
    }

    /// Refits AABBs from `start` up to the root, applying one `rotate` step
    /// at each ancestor along the way.
    fn refit_and_rotate_upward(&mut self, start: Option<NodeHandle>) {
        let mut current = start;
        while let Some(index) = current {
            self.rotate(index);
            let node = self.nodes.get(index).unwrap();
            if let NodeKind::Branch { left, right } = node.kind {
                let new_aabb = self
                    .nodes
                    .get(left)
                    .unwrap()
                    .aabb
                    .union(&self.nodes.get(right).unwrap().aabb);
                self.nodes.get_mut(index).unwrap().aabb = new_aabb;
            }
            current = self.nodes.get(index).unwrap().parent;
        }
    }

    /// Single-step tree rotation (SPEC_FULL §4.6): compares union(S,L),
    /// union(S,R), union(L,R) for node X's sibling S and children L,R;
    /// swaps whichever child does not belong to the cheapest pair.
    fn rotate(&mut self, node: NodeHandle) {
        let Some(parent) = self.nodes.get(node).unwrap().parent else {
            return;
        };
        let (left, right) = match self.nodes.get(node).unwrap().kind {
            NodeKind::Branch { left, right } => (left, right),
            NodeKind::Leaf(_) => return,
        };

        let sibling = match self.nodes.get(parent).unwrap().kind {
            NodeKind::Branch { left: pl, right: pr } => {
                if pl == node {
                    pr
                } else {
                    pl
                }
            }
            NodeKind::Leaf(_) => unreachable!(),
        };

        let s_aabb = self.nodes.get(sibling).unwrap().aabb;
        let l_aabb = self.nodes.get(left).unwrap().aabb;
        let r_aabb = self.nodes.get(right).unwrap().aabb;

        let cost_sl = s_aabb.union(&l_aabb).surface_area();
        let cost_sr = s_aabb.union(&r_aabb).surface_area();
        let cost_lr = l_aabb.union(&r_aabb).surface_area();

        if cost_lr <= cost_sl && cost_lr <= cost_sr {
            return;
        }

        if cost_sl < cost_sr {
            // swap sibling with right child of node
            self.swap_nodes(parent, sibling, node, right);
        } else {
            self.swap_nodes(parent, sibling, node, left);
        }
    }

    fn swap_nodes(&mut self, parent: NodeHandle, a: NodeHandle, b_parent: NodeHandle, b: NodeHandle) {
        self.replace_child(parent, a, b);
        self.replace_child(b_parent, b, a);
        self.nodes.get_mut(a).unwrap().parent = Some(b_parent);
        self.nodes.get_mut(b).unwrap().parent = Some(parent);
    }

    /// BFS range query: returns every body whose leaf AABB overlaps the
    /// proxy `[min, max]`.
    pub fn query(&self, min: Vec3, max: Vec3) -> Result<Vec<BodyHandle>> {
        let proxy = Aabb::new(min, max);
        let mut results = Vec::new();
        let Some(root) = self.root else {
            return Ok(results);
        };

        let mut queue: Queue<NodeHandle> = Queue::with_capacity(DEFAULT_QUEUE_CAPACITY);
        queue.enqueue(root)?;
        while let Some(index) = queue.dequeue() {
            let node = match self.nodes.get(index) {
                Some(n) => n,
                None => continue,
            };
            if !node.aabb.overlaps(&proxy) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf(body) => results.push(body),
                NodeKind::Branch { left, right } => {
                    queue.enqueue(left)?;
                    queue.enqueue(right)?;
                }
            }
        }
        Ok(results)
    }

    /// BFS ray/segment query from `origin` along `dir` (t in [0,1] covers
    /// the segment); each node's AABB is expanded by `size/2` before the
    /// slab test, per SPEC_FULL §4.6.
    pub fn trace(&self, origin: Vec3, dir: Vec3, size: Vec3) -> Result<Vec<BodyHandle>> {
        let mut results = Vec::new();
        let Some(root) = self.root else {
            return Ok(results);
        };
        let inv_dir = Vec3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);
        let half = size * 0.5;

        let mut queue: Queue<NodeHandle> = Queue::with_capacity(DEFAULT_QUEUE_CAPACITY);
        queue.enqueue(root)?;
        while let Some(index) = queue.dequeue() {
            let node = match self.nodes.get(index) {
                Some(n) => n,
                None => continue,
            };
            let expanded = node.aabb.pad(half.x.max(half.y).max(half.z));
            let Some((t_min, t_max)) = slab_test(origin, inv_dir, expanded) else {
                continue;
            };
            if !(t_min <= 1.0 && t_min <= t_max && t_max >= 0.0) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf(body) => results.push(body),
                NodeKind::Branch { left, right } => {
                    queue.enqueue(left)?;
                    queue.enqueue(right)?;
                }
            }
        }
        Ok(results)
    }

    /// Bulk-builds a tree over `leaves` (body handle + already-fat AABB)
    /// using binned-SAH splits, then runs a bonsai prune pass. Replaces any
    /// existing tree.
    pub fn build(&mut self, leaves: Vec<(BodyHandle, Aabb)>) -> Result<()> {
        self.nodes = Arena::new();
        self.root = None;
        if leaves.is_empty() {
            return Ok(());
        }

        let mut items: Vec<(BodyHandle, Aabb)> = leaves;
        let len = items.len();
        self.root = Some(self.build_range(&mut items, 0, len));
        self.bonsai_prune()?;
        Ok(())
    }

    fn build_range(&mut self, items: &mut [(BodyHandle, Aabb)], lo: usize, hi: usize) -> NodeHandle {
        debug_assert!(hi > lo);
        if hi - lo == 1 {
            let (body, aabb) = items[lo];
            return self.nodes.insert(Node {
                aabb,
                parent: None,
                kind: NodeKind::Leaf(body),
            });
        }

        let bounds = Aabb::from_points(items[lo..hi].iter().map(|(_, a)| a.center()));
        let split = binned_sah_split(items, lo, hi, bounds);

        let mid = match split {
            Some((axis, threshold)) => partition(items, lo, hi, axis, threshold),
            None => (lo + hi) / 2,
        };
        let mid = mid.clamp(lo + 1, hi - 1);

        let left = self.build_range(items, lo, mid);
        let right = self.build_range(items, mid, hi);
        let union = self.nodes.get(left).unwrap().aabb.union(&self.nodes.get(right).unwrap().aabb);
        let parent = self.nodes.insert(Node {
            aabb: union,
            parent: None,
            kind: NodeKind::Branch { left, right },
        });
        self.nodes.get_mut(left).unwrap().parent = Some(parent);
        self.nodes.get_mut(right).unwrap().parent = Some(parent);
        parent
    }

    /// Bottom-up rotate pass followed by a root-down free-and-reinsert pass
    /// for any subtree whose SAH cost is at or below
    /// [`BVH_BONSAI_PRUNE_THRESHOLD`] of the root's cost (SPEC_FULL §4.6).
    fn bonsai_prune(&mut self) -> Result<()> {
        let Some(root) = self.root else {
            return Ok(());
        };

        let mut postorder = Vec::new();
        self.collect_postorder(root, &mut postorder);
        for node in postorder {
            self.rotate(node);
        }

        let root_cost = self.subtree_sah_cost(root);
        let mut to_prune = Vec::new();
        self.find_prune_candidates(root, root_cost, true, &mut to_prune);

        for candidate in to_prune {
            self.free_and_reinsert_subtree(candidate)?;
        }
        Ok(())
    }

    fn collect_postorder(&self, node: NodeHandle, out: &mut Vec<NodeHandle>) {
        if let NodeKind::Branch { left, right } = self.nodes.get(node).unwrap().kind {
            self.collect_postorder(left, out);
            self.collect_postorder(right, out);
            out.push(node);
        }
    }

    fn subtree_sah_cost(&self, node: NodeHandle) -> f32 {
        let n = self.nodes.get(node).unwrap();
        match n.kind {
            NodeKind::Leaf(_) => 0.0,
            NodeKind::Branch { left, right } => {
                n.aabb.surface_area()
                    + self.subtree_sah_cost(left)
                    + self.subtree_sah_cost(right)
            }
        }
    }

    /// Walks the tree from the root; any branch at or below the prune
    /// threshold (relative to `root_cost`) is recorded and not descended
    /// into further.
    fn find_prune_candidates(
        &self,
        node: NodeHandle,
        root_cost: f32,
        is_root: bool,
        out: &mut Vec<NodeHandle>,
    ) {
        let (left, right) = match self.nodes.get(node).unwrap().kind {
            NodeKind::Leaf(_) => return,
            NodeKind::Branch { left, right } => (left, right),
        };

        let cost = self.subtree_sah_cost(node);
        if !is_root && root_cost > 0.0 && cost <= BVH_BONSAI_PRUNE_THRESHOLD * root_cost {
            out.push(node);
            return;
        }

        self.find_prune_candidates(left, root_cost, false, out);
        self.find_prune_candidates(right, root_cost, false, out);
    }

    fn free_and_reinsert_subtree(&mut self, node: NodeHandle) -> Result<()> {
        let mut leaves = Vec::new();
        self.collect_leaves(node, &mut leaves);

        let parent = self.nodes.get(node).unwrap().parent;
        self.free_subtree(node);

        match parent {
            None => self.root = None,
            Some(p) => {
                // The pruned node's parent now has a dangling child slot;
                // since its sibling is unaffected, collapse the parent by
                // promoting nothing here (both children removed would be
                // unusual for a non-root candidate, so this path only runs
                // when `node` itself is a whole child of `p`: remove `p`
                // exactly like `remove` does for a leaf).
                let grandparent = self.nodes.get(p).unwrap().parent;
                let sibling = match self.nodes.get(p).unwrap().kind {
                    NodeKind::Branch { left, right } => {
                        if left == node {
                            right
                        } else {
                            left
                        }
                    }
                    NodeKind::Leaf(_) => unreachable!(),
                };
                self.nodes.get_mut(sibling).unwrap().parent = grandparent;
                self.nodes.remove(p);
                match grandparent {
                    None => self.root = Some(sibling),
                    Some(gp) => self.replace_child(gp, p, sibling),
                }
            }
        }

        for (body, aabb) in leaves {
            self.insert(body, aabb);
        }
        Ok(())
    }

    fn collect_leaves(&self, node: NodeHandle, out: &mut Vec<(BodyHandle, Aabb)>) {
        let n = self.nodes.get(node).unwrap();
        match n.kind {
            NodeKind::Leaf(body) => out.push((body, n.aabb)),
            NodeKind::Branch { left, right } => {
                self.collect_leaves(left, out);
                self.collect_leaves(right, out);
            }
        }
    }

    fn free_subtree(&mut self, node: NodeHandle) {
        if let Some(n) = self.nodes.get(node) {
            if let NodeKind::Branch { left, right } = n.kind {
                self.free_subtree(left);
                self.free_subtree(right);
            }
        }
        self.nodes.remove(node);
    }

    /// Checks the containment invariant (every branch's AABB encloses both
    /// children's) over the whole tree; used by tests.
    pub fn check_containment_invariant(&self) -> bool {
        match self.root {
            None => true,
            Some(root) => self.check_containment_from(root),
        }
    }

    fn check_containment_from(&self, node: NodeHandle) -> bool {
        let n = self.nodes.get(node).unwrap();
        match n.kind {
            NodeKind::Leaf(_) => true,
            NodeKind::Branch { left, right } => {
                let l = self.nodes.get(left).unwrap();
                let r = self.nodes.get(right).unwrap();
                n.aabb.contains(&l.aabb)
                    && n.aabb.contains(&r.aabb)
                    && self.check_containment_from(left)
                    && self.check_containment_from(right)
            }
        }
    }
}

fn slab_test(origin: Vec3, inv_dir: Vec3, aabb: Aabb) -> Option<(f32, f32)> {
    let t0 = (aabb.min - origin) * inv_dir;
    let t1 = (aabb.max - origin) * inv_dir;
    let tmin = t0.min(t1);
    let tmax = t0.max(t1);
    let t_enter = tmin.max_element();
    let t_exit = tmax.min_element();
    if t_enter <= t_exit {
        Some((t_enter, t_exit))
    } else {
        None
    }
}

/// Binned surface-area-heuristic split search over the three world axes.
/// Returns the chosen `(axis, world-space split coordinate)`, or `None`
/// when no axis has enough extent to bin (caller falls back to midpoint).
fn binned_sah_split(
    items: &[(BodyHandle, Aabb)],
    lo: usize,
    hi: usize,
    bounds: Aabb,
) -> Option<(usize, f32)> {
    let extent = bounds.extent();
    let axes = [extent.x, extent.y, extent.z];

    let mut best: Option<(usize, f32, f32)> = None; // axis, coord, cost

    for axis in 0..3 {
        if axes[axis] < BVH_MIN_AXIS_EXTENT {
            continue;
        }
        let min_proj = component(bounds.min, axis);
        let scale = (BVH_SAH_BINS as f32 - 1.0) / axes[axis];

        let mut bin_aabb = vec![Aabb::EMPTY; BVH_SAH_BINS];
        let mut bin_count = vec![0usize; BVH_SAH_BINS];

        for (_, aabb) in &items[lo..hi] {
            let proj = component(aabb.center(), axis);
            let bin = (((proj - min_proj) * scale) as usize).min(BVH_SAH_BINS - 1);
            bin_aabb[bin] = bin_aabb[bin].union(aabb);
            bin_count[bin] += 1;
        }

        let mut left_aabb = vec![Aabb::EMPTY; BVH_SAH_BINS];
        let mut left_count = vec![0usize; BVH_SAH_BINS];
        let mut running = Aabb::EMPTY;
        let mut running_count = 0usize;
        for b in 0..BVH_SAH_BINS {
            running = running.union(&bin_aabb[b]);
            running_count += bin_count[b];
            left_aabb[b] = running;
            left_count[b] = running_count;
        }

        let mut right_aabb = vec![Aabb::EMPTY; BVH_SAH_BINS];
        let mut right_count = vec![0usize; BVH_SAH_BINS];
        running = Aabb::EMPTY;
        running_count = 0;
        for b in (0..BVH_SAH_BINS).rev() {
            running = running.union(&bin_aabb[b]);
            running_count += bin_count[b];
            right_aabb[b] = running;
            right_count[b] = running_count;
        }

        for split in 0..BVH_SAH_BINS - 1 {
            let n_left = left_count[split];
            let n_right = right_count[split + 1];
            if n_left == 0 || n_right == 0 {
                continue;
            }
            let cost = 2.0 * left_aabb[split].surface_area() * n_left as f32
                + 2.0 * right_aabb[split + 1].surface_area() * n_right as f32;

            if best.map(|(_, _, c)| cost < c).unwrap_or(true) {
                let coord = min_proj + (split as f32 + 1.0) / scale;
                best = Some((axis, coord, cost));
            }
        }
    }

    best.map(|(axis, coord, _)| (axis, coord))
}

fn component(v: Vec3, axis: usize) -> f32 {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}

/// Two-pointer in-place partition of `items[lo..hi]` by whether their
/// center's `axis` coordinate is below `threshold`. Falls back to midpoint
/// when the resulting partition would be degenerate.
fn partition(items: &mut [(BodyHandle, Aabb)], lo: usize, hi: usize, axis: usize, threshold: f32) -> usize {
    let mut i = lo;
    let mut j = hi;
    while i < j {
        while i < j && component(items[i].1.center(), axis) < threshold {
            i += 1;
        }
        while i < j && component(items[j - 1].1.center(), axis) >= threshold {
            j -= 1;
        }
        if i < j {
            items.swap(i, j - 1);
            i += 1;
            j -= 1;
        }
    }
    if i <= lo || i >= hi {
        (lo + hi) / 2
    } else {
        i
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(i: usize) -> BodyHandle {
        let mut arena: Arena<()> = Arena::new();
        for _ in 0..i {
            arena.insert(());
        }
        arena.insert(())
    }

    #[test]
    fn insert_then_query_finds_leaf() {
        let mut bvh = Bvh::new();
        let body = handle(0);
        bvh.insert(body, Aabb::new(Vec3::ZERO, Vec3::ONE));
        let results = bvh.query(Vec3::splat(0.2), Vec3::splat(0.8)).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn containment_invariant_holds_after_several_inserts() {
        let mut bvh = Bvh::new();
        for i in 0..50 {
            let pos = Vec3::new(i as f32, 0.0, 0.0);
            bvh.insert(handle(i), Aabb::new(pos, pos + Vec3::ONE));
        }
        assert!(bvh.check_containment_invariant());
    }

    #[test]
    fn remove_keeps_tree_valid() {
        let mut bvh = Bvh::new();
        let mut leaf_nodes = Vec::new();
        for i in 0..20 {
            let pos = Vec3::new(i as f32, 0.0, 0.0);
            leaf_nodes.push(bvh.insert(handle(i), Aabb::new(pos, pos + Vec3::ONE)));
        }
        bvh.remove(leaf_nodes[5]);
        bvh.remove(leaf_nodes[10]);
        assert!(bvh.check_containment_invariant());
    }

    #[test]
    fn bulk_build_over_many_leaves_is_queryable() {
        let mut bvh = Bvh::new();
        let mut items = Vec::new();
        for i in 0..1000 {
            let pos = Vec3::new((i % 10) as f32, ((i / 10) % 10) as f32, (i / 100) as f32);
            items.push((handle(i), Aabb::new(pos, pos + Vec3::splat(0.9))));
        }
        bvh.build(items).unwrap();
        assert!(bvh.check_containment_invariant());
        let results = bvh.query(Vec3::splat(2.0), Vec3::splat(5.0)).unwrap();
        assert!(!results.is_empty());
    }

    #[test]
    fn trace_finds_floor_leaf() {
        let mut bvh = Bvh::new();
        let floor = handle(0);
        bvh.insert(
            floor,
            Aabb::new(Vec3::new(-50.0, -1.0, -50.0), Vec3::new(50.0, 0.0, 50.0)),
        );
        let results = bvh
            .trace(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -20.0, 0.0), Vec3::ZERO)
            .unwrap();
        assert!(results.contains(&floor));
    }
}
