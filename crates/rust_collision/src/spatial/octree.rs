//! Octree spatial partitioning structure
//!
//! Divides a cube into a fixed hierarchy of octants, allocated up front to a
//! chosen depth. Objects sink to the deepest octant that fully contains them
//! along every axis; anything straddling a split plane stays at the node
//! where it straddles.
//!
//! Each node also tracks the union bounds of everything stored beneath it, so
//! queries skip empty cells and still find objects that poke outside the cell
//! they were filed under.

use crate::collision::{HitObject, Ray, AABB};
use crate::config::OctreeConfig;
use crate::foundation::logging::{debug, trace};
use crate::foundation::math::{Mat4, Vec3, WorldTransform};

/// Subdivision depth used by [`Octree::for_mesh`]
pub const MESH_OCTREE_DEPTH: u32 = 5;

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode<T> {
    center: Vec3,
    half_width: f32,
    depth: u32,
    children: Option<Box<[OctreeNode<T>; 8]>>,
    objects: Vec<T>,
    content_bounds: Option<AABB>,
}

impl<T> OctreeNode<T> {
    /// Create a node and eagerly subdivide it `remaining` more levels
    fn new(center: Vec3, half_width: f32, depth: u32, remaining: u32) -> Self {
        let children = (remaining > 0).then(|| {
            let offset = half_width * 0.5;
            Box::new(std::array::from_fn(|octant| {
                Self::new(
                    Self::child_center(center, offset, octant),
                    offset,
                    depth + 1,
                    remaining - 1,
                )
            }))
        });

        Self {
            center,
            half_width,
            depth,
            children,
            objects: Vec::new(),
            content_bounds: None,
        }
    }

    // Octant layout: bit 0 is +X, bit 1 is +Y, bit 2 is +Z
    fn child_center(center: Vec3, offset: f32, octant: usize) -> Vec3 {
        let sign = |bit: usize| if octant & bit != 0 { offset } else { -offset };
        center + Vec3::new(sign(1), sign(2), sign(4))
    }

    /// Center of this node's cell
    pub const fn center(&self) -> Vec3 {
        self.center
    }

    /// Half the edge length of this node's cell
    pub const fn half_width(&self) -> f32 {
        self.half_width
    }

    /// Depth in the tree (0 = root)
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// The 8 children, `None` at the bottom level
    pub fn children(&self) -> Option<&[Self; 8]> {
        self.children.as_deref()
    }

    /// Objects filed directly at this node
    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    /// This node's cube
    pub fn cell(&self) -> AABB {
        AABB::from_width(self.center, self.half_width)
    }

    /// Union bounds of every object in this subtree, `None` when empty
    pub const fn content_bounds(&self) -> Option<AABB> {
        self.content_bounds
    }

    /// Check if this node is a leaf (has no children)
    pub const fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    fn count_nodes(&self) -> usize {
        1 + self
            .children
            .iter()
            .flat_map(|children| children.iter())
            .map(Self::count_nodes)
            .sum::<usize>()
    }

    fn clear(&mut self) {
        self.objects.clear();
        self.content_bounds = None;
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                child.clear();
            }
        }
    }
}

impl<T: HitObject> OctreeNode<T> {
    fn insert(&mut self, object: T, bounds: &AABB) {
        self.content_bounds = Some(
            self.content_bounds
                .map_or(*bounds, |content| content.union(bounds)),
        );

        let delta = bounds.center - self.center;
        let straddles = (0..3).any(|i| delta[i].abs() <= bounds.extent[i]);
        if !straddles {
            let octant = (0..3)
                .filter(|&i| delta[i] > 0.0)
                .fold(0, |acc, i| acc | (1 << i));
            if let Some(children) = self.children.as_mut() {
                children[octant].insert(object, bounds);
                return;
            }
        }

        trace!(
            "Octree: filed object at depth {} (center {:?}, straddles: {})",
            self.depth,
            self.center,
            straddles
        );
        self.objects.push(object);
    }

    fn ray_intersect(
        &self,
        ray: &Ray,
        length: f32,
        transform: Option<&dyn WorldTransform>,
        matrix: Option<&Mat4>,
    ) -> bool {
        if !Self::content_hit(self.content_bounds, ray, matrix) {
            return false;
        }
        if self
            .objects
            .iter()
            .any(|object| object.ray_intersect(ray, length, transform))
        {
            return true;
        }
        self.children.as_ref().is_some_and(|children| {
            children
                .iter()
                .any(|child| child.ray_intersect(ray, length, transform, matrix))
        })
    }

    fn ray_cast<'a>(
        &'a self,
        ray: &Ray,
        length: f32,
        transform: Option<&dyn WorldTransform>,
        matrix: Option<&Mat4>,
        closest: &mut Option<OctreeHit<'a, T>>,
    ) {
        if !Self::content_hit(self.content_bounds, ray, matrix) {
            return;
        }
        for object in &self.objects {
            let Some(point) = object.ray_hit(ray, length, transform) else {
                continue;
            };
            let distance = (point - ray.origin).magnitude();
            if closest.as_ref().map_or(true, |best| distance < best.distance) {
                *closest = Some(OctreeHit {
                    data: object,
                    point,
                    distance,
                });
            }
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.ray_cast(ray, length, transform, matrix, closest);
            }
        }
    }

    fn query_aabb<'a>(&'a self, area: &AABB, results: &mut Vec<&'a T>) {
        if !self
            .content_bounds
            .is_some_and(|content| content.intersects(area))
        {
            return;
        }
        results.extend(
            self.objects
                .iter()
                .filter(|object| object.bounds().intersects(area)),
        );
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query_aabb(area, results);
            }
        }
    }

    fn content_hit(content: Option<AABB>, ray: &Ray, matrix: Option<&Mat4>) -> bool {
        content.is_some_and(|bounds| {
            let bounds = matrix.map_or(bounds, |m| bounds.transformed(m));
            bounds.ray_hit(ray).is_some()
        })
    }
}

/// Closest object hit by a ray
#[derive(Debug, Clone, Copy)]
pub struct OctreeHit<'a, T> {
    /// The object that was hit
    pub data: &'a T,
    /// World-space hit point
    pub point: Vec3,
    /// Distance from the ray origin to `point`
    pub distance: f32,
}

/// Octree over [`HitObject`]s with a fixed subdivision
#[derive(Debug, Clone)]
pub struct Octree<T> {
    root: OctreeNode<T>,
    max_depth: u32,
}

impl<T> Octree<T> {
    /// Create an octree covering the cube at `center` with the given half
    /// width, subdivided `max_depth` levels below the root
    pub fn new(center: Vec3, half_width: f32, max_depth: u32) -> Self {
        let octree = Self {
            root: OctreeNode::new(center, half_width, 0, max_depth),
            max_depth,
        };
        debug!(
            "Created octree: center {:?}, half width {}, depth {}, {} nodes",
            center,
            half_width,
            max_depth,
            octree.node_count()
        );
        octree
    }

    /// Create an octree sized to a mesh's vertices at [`MESH_OCTREE_DEPTH`]
    pub fn for_mesh(points: &[Vec3]) -> Self {
        Self::for_mesh_with_config(points, &OctreeConfig::default())
    }

    /// Create an octree sized to a mesh's vertices using the given settings
    pub fn for_mesh_with_config(points: &[Vec3], config: &OctreeConfig) -> Self {
        let bounds = if config.seed_bounds_at_origin {
            points.iter().fold(AABB::default(), |acc, p| {
                acc.union(&AABB::new(*p, Vec3::zeros()))
            })
        } else {
            AABB::from_points(points).unwrap_or_default()
        };
        Self::new(bounds.center, bounds.extent.max(), config.mesh_depth)
    }

    /// Root node
    pub const fn root(&self) -> &OctreeNode<T> {
        &self.root
    }

    /// Subdivision depth below the root
    pub const fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.root.count_nodes()
    }

    /// Iterate over every stored object, depth first
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            stack: vec![&self.root],
            current: Default::default(),
        }
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Check if no objects are stored
    pub const fn is_empty(&self) -> bool {
        self.root.content_bounds.is_none()
    }

    /// Drop every object while keeping the subdivision
    pub fn clear(&mut self) {
        self.root.clear();
    }
}

impl<T: HitObject> Octree<T> {
    /// Insert an object below the deepest node that contains it
    pub fn insert(&mut self, object: T) {
        let bounds = object.bounds();
        self.root.insert(object, &bounds);
    }

    /// Check whether the ray hits any stored object within `length`
    pub fn ray_intersect(
        &self,
        ray: &Ray,
        length: f32,
        transform: Option<&dyn WorldTransform>,
    ) -> bool {
        let matrix = transform.map(WorldTransform::world_matrix);
        self.root
            .ray_intersect(ray, length, transform, matrix.as_ref())
    }

    /// Find the stored object hit closest to the ray origin within `length`
    pub fn ray_cast(
        &self,
        ray: &Ray,
        length: f32,
        transform: Option<&dyn WorldTransform>,
    ) -> Option<OctreeHit<'_, T>> {
        let matrix = transform.map(WorldTransform::world_matrix);
        let mut closest = None;
        self.root
            .ray_cast(ray, length, transform, matrix.as_ref(), &mut closest);
        closest
    }

    /// Every object whose bounds intersect `area`
    pub fn query_aabb(&self, area: &AABB) -> Vec<&T> {
        let mut results = Vec::new();
        self.root.query_aabb(area, &mut results);
        results
    }
}

impl<T: HitObject> Extend<T> for Octree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for object in iter {
            self.insert(object);
        }
    }
}

impl<'a, T> IntoIterator for &'a Octree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Depth-first iterator over the objects of an [`Octree`]
#[derive(Debug)]
pub struct Iter<'a, T> {
    stack: Vec<&'a OctreeNode<T>>,
    current: std::slice::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(object) = self.current.next() {
                return Some(object);
            }
            let node = self.stack.pop()?;
            if node.content_bounds.is_none() {
                continue;
            }
            if let Some(children) = node.children.as_ref() {
                self.stack.extend(children.iter().rev());
            }
            self.current = node.objects.iter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::DetailedTriangle;
    use crate::foundation::logging;
    use crate::foundation::math::Transform;
    use approx::assert_relative_eq;

    fn small_box(center: Vec3) -> AABB {
        AABB::from_width(center, 0.1)
    }

    /// Depth of the node holding an object with the given bounds
    fn depth_of<T: HitObject>(node: &OctreeNode<T>, bounds: &AABB) -> Option<u32> {
        if node.objects().iter().any(|o| o.bounds() == *bounds) {
            return Some(node.depth());
        }
        node.children()?
            .iter()
            .find_map(|child| depth_of(child, bounds))
    }

    #[test]
    fn test_node_count_matches_depth() {
        assert_eq!(Octree::<AABB>::new(Vec3::zeros(), 1.0, 0).node_count(), 1);
        assert_eq!(Octree::<AABB>::new(Vec3::zeros(), 1.0, 1).node_count(), 9);
        assert_eq!(Octree::<AABB>::new(Vec3::zeros(), 1.0, 2).node_count(), 73);
    }

    #[test]
    fn test_child_centers() {
        let octree: Octree<AABB> = Octree::new(Vec3::new(1.0, 1.0, 1.0), 4.0, 1);
        let children = octree.root().children().unwrap();

        assert_relative_eq!(children[0].center(), Vec3::new(-1.0, -1.0, -1.0));
        assert_relative_eq!(children[1].center(), Vec3::new(3.0, -1.0, -1.0));
        assert_relative_eq!(children[2].center(), Vec3::new(-1.0, 3.0, -1.0));
        assert_relative_eq!(children[5].center(), Vec3::new(3.0, -1.0, 3.0));
        assert_relative_eq!(children[7].center(), Vec3::new(3.0, 3.0, 3.0));
        for child in children {
            assert_relative_eq!(child.half_width(), 2.0);
            assert_eq!(child.depth(), 1);
            assert!(child.is_leaf());
        }
        assert_eq!(octree.root().cell(), AABB::from_width(Vec3::new(1.0, 1.0, 1.0), 4.0));
    }

    #[test]
    fn test_insert_sinks_to_deepest_octant() {
        logging::try_init();
        let mut octree = Octree::new(Vec3::zeros(), 4.0, 2);
        let b = small_box(Vec3::new(1.5, 1.5, 1.5));
        octree.insert(b);

        assert_eq!(depth_of(octree.root(), &b), Some(2));
        let child = &octree.root().children().unwrap()[7];
        assert_eq!(child.content_bounds(), Some(b));
    }

    #[test]
    fn test_straddling_object_stays_at_node() {
        let mut octree = Octree::new(Vec3::zeros(), 4.0, 3);
        let across_x = AABB::new(Vec3::new(0.05, 2.0, 2.0), Vec3::new(0.1, 0.1, 0.1));
        octree.insert(across_x);
        assert_eq!(octree.root().objects(), &[across_x]);

        // Crosses the y split of the +X+Y+Z child at (2, 2, 2)
        let across_child = AABB::new(Vec3::new(1.0, 2.0, 1.0), Vec3::new(0.1, 0.1, 0.1));
        octree.insert(across_child);
        assert_eq!(depth_of(octree.root(), &across_child), Some(1));
    }

    #[test]
    fn test_inserted_objects_are_reachable() {
        let mut octree = Octree::new(Vec3::zeros(), 8.0, 3);
        let objects = [
            small_box(Vec3::new(1.0, 2.0, 3.0)),
            small_box(Vec3::new(-5.0, 0.5, -2.0)),
            small_box(Vec3::zeros()),
            small_box(Vec3::new(7.0, -7.0, 7.0)),
        ];
        octree.extend(objects);

        assert_eq!(octree.len(), objects.len());
        assert!(!octree.is_empty());
        for object in &objects {
            assert!(octree.iter().any(|o| o == object));
            assert!(depth_of(octree.root(), object).is_some());
        }
    }

    #[test]
    fn test_object_outside_root_cell_is_kept() {
        let mut octree = Octree::new(Vec3::zeros(), 1.0, 2);
        let outside = small_box(Vec3::new(10.0, 10.0, 10.0));
        octree.insert(outside);

        assert_eq!(octree.len(), 1);
        let ray = Ray::new(Vec3::new(10.0, 20.0, 10.0), Vec3::new(0.0, -1.0, 0.0));
        assert!(octree.ray_intersect(&ray, 100.0, None));
    }

    #[test]
    fn test_for_mesh_bounds() {
        let points = [Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 5.0, 2.0)];
        let octree: Octree<DetailedTriangle> = Octree::for_mesh(&points);

        assert_relative_eq!(octree.root().center(), Vec3::new(2.0, 3.0, 1.5));
        assert_relative_eq!(octree.root().half_width(), 2.0);
        assert_eq!(octree.max_depth(), MESH_OCTREE_DEPTH);
    }

    #[test]
    fn test_for_mesh_origin_seeding() {
        let points = [Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 5.0, 2.0)];
        let config = OctreeConfig {
            mesh_depth: 1,
            seed_bounds_at_origin: true,
        };
        let octree: Octree<DetailedTriangle> = Octree::for_mesh_with_config(&points, &config);

        assert_relative_eq!(octree.root().center(), Vec3::new(1.5, 2.5, 1.0));
        assert_relative_eq!(octree.root().half_width(), 2.5);
        assert_eq!(octree.node_count(), 9);
    }

    #[test]
    fn test_for_mesh_empty_points() {
        let octree: Octree<AABB> = Octree::for_mesh_with_config(
            &[],
            &OctreeConfig {
                mesh_depth: 0,
                ..OctreeConfig::default()
            },
        );
        assert_relative_eq!(octree.root().half_width(), 0.0);
        assert!(octree.is_empty());
    }

    #[test]
    fn test_ray_queries() {
        let mut octree = Octree::new(Vec3::zeros(), 8.0, 3);
        for z in [-2.0, -4.0, -6.0] {
            octree.insert(DetailedTriangle::from_points([
                Vec3::new(-1.0, -1.0, z),
                Vec3::new(1.0, -1.0, z),
                Vec3::new(0.0, 1.0, z),
            ]));
        }

        let ray = Ray::new(Vec3::new(0.0, 0.0, 4.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(octree.ray_intersect(&ray, 20.0, None));
        let hit = octree.ray_cast(&ray, 20.0, None).unwrap();
        assert_relative_eq!(hit.point, Vec3::new(0.0, 0.0, -2.0), epsilon = 1e-5);
        assert_relative_eq!(hit.distance, 6.0, epsilon = 1e-5);

        // Too short to reach the first triangle
        assert!(!octree.ray_intersect(&ray, 5.0, None));

        let beside = Ray::new(Vec3::new(5.0, 0.0, 4.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!octree.ray_intersect(&beside, 20.0, None));
        assert!(octree.ray_cast(&beside, 20.0, None).is_none());

        let moved = Transform::from_position(Vec3::new(5.0, 0.0, 0.0));
        assert!(octree.ray_intersect(&beside, 20.0, Some(&moved)));
    }

    #[test]
    fn test_query_aabb() {
        let mut octree = Octree::new(Vec3::zeros(), 8.0, 3);
        let near = small_box(Vec3::new(1.0, 1.0, 1.0));
        let far = small_box(Vec3::new(-6.0, -6.0, -6.0));
        let center = small_box(Vec3::zeros());
        octree.extend([near, far, center]);

        let found = octree.query_aabb(&AABB::from_width(Vec3::new(0.5, 0.5, 0.5), 1.0));
        assert_eq!(found.len(), 2);
        assert!(found.contains(&&near));
        assert!(found.contains(&&center));
        assert!(octree.query_aabb(&AABB::from_width(Vec3::new(5.0, 5.0, 5.0), 1.0)).is_empty());
    }

    #[test]
    fn test_clear_keeps_subdivision() {
        let mut octree = Octree::new(Vec3::zeros(), 4.0, 2);
        octree.insert(small_box(Vec3::new(1.5, 1.5, 1.5)));
        octree.clear();

        assert!(octree.is_empty());
        assert_eq!(octree.len(), 0);
        assert_eq!(octree.node_count(), 73);
        assert!(octree.root().children().unwrap()[7].content_bounds().is_none());
    }

    #[test]
    fn test_concurrent_queries() {
        let mut octree = Octree::new(Vec3::zeros(), 8.0, 2);
        octree.extend((0..8).map(|i| small_box(Vec3::new(i as f32 - 4.0, 1.0, 1.0))));
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let octree = &octree;
                scope.spawn(move || {
                    let ray = Ray::new(Vec3::new(-4.0, 5.0, 1.0), Vec3::new(0.0, -1.0, 0.0));
                    assert!(octree.ray_intersect(&ray, 10.0, None));
                    assert_eq!(octree.len(), 8);
                });
            }
        });
    }
}
