//! Bounding Volume Hierarchy
//!
//! A binary tree of axis-aligned boxes built top-down by median split on the
//! longest axis. Nodes live in a flat arena and refer to each other by
//! [`NodeId`], which keeps parent links cheap and the tree trivially
//! `Send + Sync` for concurrent queries.
//!
//! The tree is immutable once built. Rebuild it when the geometry changes.

use crate::collision::{HitObject, Ray, AABB};
use crate::foundation::logging::debug;
use crate::foundation::math::{Mat4, Vec3, WorldTransform};

/// Index of a node in a [`BVH`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
enum NodeKind<T> {
    Leaf(T),
    Internal { left: NodeId, right: NodeId },
}

/// Single node in the hierarchy
#[derive(Debug, Clone)]
pub struct BVHNode<T> {
    bounds: AABB,
    parent: Option<NodeId>,
    kind: NodeKind<T>,
}

impl<T> BVHNode<T> {
    /// Object-space bounds of everything below this node
    pub const fn bounds(&self) -> &AABB {
        &self.bounds
    }

    /// Parent node, `None` for the root
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Check if this node is a leaf (holds data, no children)
    pub const fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Payload of a leaf
    pub const fn data(&self) -> Option<&T> {
        match &self.kind {
            NodeKind::Leaf(data) => Some(data),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Child ids of an internal node
    pub const fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Internal { left, right } => Some((left, right)),
        }
    }

    /// Left child of an internal node
    pub const fn left(&self) -> Option<NodeId> {
        match self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Internal { left, .. } => Some(left),
        }
    }

    /// Right child of an internal node
    pub const fn right(&self) -> Option<NodeId> {
        match self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Internal { right, .. } => Some(right),
        }
    }
}

/// Closest leaf hit by a ray
#[derive(Debug, Clone, Copy)]
pub struct BVHHit<'a, T> {
    /// Payload of the leaf that was hit
    pub data: &'a T,
    /// Leaf node that was hit
    pub node: NodeId,
    /// World-space hit point
    pub point: Vec3,
    /// Distance from the ray origin to `point`
    pub distance: f32,
}

/// Bounding Volume Hierarchy over [`HitObject`]s
#[derive(Debug, Clone)]
pub struct BVH<T> {
    nodes: Vec<BVHNode<T>>,
    root: Option<NodeId>,
}

impl<T> Default for BVH<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }
}

impl<T: HitObject> BVH<T> {
    /// Build a hierarchy over `entries`, taking ownership of them.
    ///
    /// An empty input gives an empty tree on which every query misses.
    pub fn build(entries: Vec<T>) -> Self {
        let mut bvh = Self {
            nodes: Vec::with_capacity(entries.len().saturating_mul(2)),
            root: None,
        };
        if !entries.is_empty() {
            let leaf_count = entries.len();
            bvh.root = Some(bvh.build_recursive(entries));
            debug!(
                "Built BVH with {} leaves in {} nodes",
                leaf_count,
                bvh.nodes.len()
            );
        }
        bvh
    }

    /// Build the subtree for a non-empty set of entries and return its id.
    ///
    /// Children are pushed before their parent, so parent links are patched
    /// once the parent's id is known.
    fn build_recursive(&mut self, mut entries: Vec<T>) -> NodeId {
        if entries.len() == 1 {
            if let Some(data) = entries.pop() {
                return self.push(BVHNode {
                    bounds: data.bounds(),
                    parent: None,
                    kind: NodeKind::Leaf(data),
                });
            }
        }

        let bounds = entries
            .iter()
            .map(HitObject::bounds)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_default();
        let axis = bounds.longest_axis().index();

        // Stable, so equal centers keep their input order
        entries.sort_by(|a, b| a.bounds().center[axis].total_cmp(&b.bounds().center[axis]));
        let right_entries = entries.split_off(entries.len() / 2);

        let left = self.build_recursive(entries);
        let right = self.build_recursive(right_entries);
        let id = self.push(BVHNode {
            bounds: self.nodes[left.0].bounds.union(&self.nodes[right.0].bounds),
            parent: None,
            kind: NodeKind::Internal { left, right },
        });
        self.nodes[left.0].parent = Some(id);
        self.nodes[right.0].parent = Some(id);
        id
    }

    fn push(&mut self, node: BVHNode<T>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Bounds of the whole tree.
    ///
    /// Object space without a transform, otherwise re-bounded in world space.
    /// An empty tree reports a zero box.
    pub fn bounds(&self, transform: Option<&dyn WorldTransform>) -> AABB {
        let Some(root) = self.root() else {
            return AABB::default();
        };
        match transform {
            Some(t) => root.bounds.transformed(&t.world_matrix()),
            None => root.bounds,
        }
    }

    /// Check whether the ray hits any leaf within `length`
    pub fn ray_intersect(
        &self,
        ray: &Ray,
        length: f32,
        transform: Option<&dyn WorldTransform>,
    ) -> bool {
        let matrix = transform.map(WorldTransform::world_matrix);
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if !Self::bounds_hit(node, ray, matrix.as_ref()) {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf(data) => {
                    if data.ray_intersect(ray, length, transform) {
                        return true;
                    }
                }
                NodeKind::Internal { left, right } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }
        false
    }

    /// Find the leaf hit closest to the ray origin within `length`
    pub fn ray_cast(
        &self,
        ray: &Ray,
        length: f32,
        transform: Option<&dyn WorldTransform>,
    ) -> Option<BVHHit<'_, T>> {
        let matrix = transform.map(WorldTransform::world_matrix);
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        let mut closest: Option<(BVHHit<'_, T>, f32)> = None;

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if !Self::bounds_hit(node, ray, matrix.as_ref()) {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf(data) => {
                    let Some(point) = data.ray_hit(ray, length, transform) else {
                        continue;
                    };
                    let distance_sq = (point - ray.origin).magnitude_squared();
                    if closest.as_ref().map_or(true, |(_, best)| distance_sq < *best) {
                        let hit = BVHHit {
                            data,
                            node: id,
                            point,
                            distance: distance_sq.sqrt(),
                        };
                        closest = Some((hit, distance_sq));
                    }
                }
                NodeKind::Internal { left, right } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }
        closest.map(|(hit, _)| hit)
    }

    fn bounds_hit(node: &BVHNode<T>, ray: &Ray, matrix: Option<&Mat4>) -> bool {
        let bounds = matrix.map_or(node.bounds, |m| node.bounds.transformed(m));
        bounds.ray_hit(ray).is_some()
    }
}

impl<T> BVH<T> {
    /// Root node, `None` for an empty tree
    pub fn root(&self) -> Option<&BVHNode<T>> {
        self.root.map(|id| &self.nodes[id.0])
    }

    /// Id of the root node
    pub const fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Look up a node by id
    pub fn node(&self, id: NodeId) -> Option<&BVHNode<T>> {
        self.nodes.get(id.0)
    }

    /// Number of leaves
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Total number of nodes, internal and leaf
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree holds no data
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Iterate over every leaf payload
    pub fn leaves(&self) -> impl Iterator<Item = &T> {
        self.nodes.iter().filter_map(BVHNode::data)
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(BVHNode::parent)
    }

    /// Walk from a node up to the root, excluding the node itself
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }
}

impl<T: HitObject> HitObject for BVH<T> {
    fn bounds(&self) -> AABB {
        self.bounds(None)
    }

    fn ray_hit(
        &self,
        ray: &Ray,
        length: f32,
        transform: Option<&dyn WorldTransform>,
    ) -> Option<Vec3> {
        self.ray_cast(ray, length, transform).map(|hit| hit.point)
    }

    fn ray_intersect(
        &self,
        ray: &Ray,
        length: f32,
        transform: Option<&dyn WorldTransform>,
    ) -> bool {
        Self::ray_intersect(self, ray, length, transform)
    }
}
