use glam::Vec3;

use crate::mesh::TriangleMesh;

/// Minimum accepted hit distance along a ray.
const EPS_T: f32 = 1e-6;
/// Slack on the barycentric inside test, so rays grazing a shared edge
/// cannot slip between two adjacent triangles.
const EPS_B: f32 = 1e-6;
/// Determinant cutoff below which a triangle counts as edge-on (or
/// degenerate) and reports no hit.
const DET_EPS: f32 = 1e-8;

/// Leaves hold at most this many triangles.
const LEAF_THRESHOLD: usize = 4;

/// Child sentinel marking a node as a leaf.
const NO_CHILD: u32 = u32::MAX;

/// Traversal stack capacity. The median split halves every range, so tree
/// depth is bounded by log2 of the u32 triangle count plus the root.
const STACK_DEPTH: usize = 64;

/// A ray defined by an origin and a direction.
///
/// The direction should be normalised (unit-length) for the intersection
/// distances returned by [`Ray::cast`] to represent metres. Callers are
/// responsible for normalisation.
#[derive(Clone, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Cast this ray against a BVH and return the closest intersection within `t_max`.
    pub fn cast(&self, bvh: &Bvh, mesh: &TriangleMesh, t_max: f32) -> Option<Hit> {
        bvh.closest_hit(mesh, self.origin, self.direction, t_max)
    }
}

/// The result of a successful closest-hit query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Distance along the ray from the origin to the hit point.
    pub t: f32,
    /// Index of the hit triangle in the source index buffer.
    pub triangle: u32,
}

/// An axis-aligned bounding box (AABB).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Whether `point` lies inside the box (boundary included).
    pub fn contains(&self, point: Vec3) -> bool {
        self.min.x <= point.x
            && self.min.y <= point.y
            && self.min.z <= point.z
            && point.x <= self.max.x
            && point.y <= self.max.y
            && point.z <= self.max.z
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z).
    pub fn longest_axis(&self) -> usize {
        let extent = self.max - self.min;
        if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        }
    }

    /// Slab-method ray-AABB intersection test.
    ///
    /// `inv_dir` is the reciprocal of the ray direction; zero components map
    /// to ±∞ and the test stays correct under IEEE-754. Returns the entry
    /// distance (clamped to zero for origins inside the box), or `None` when
    /// the box is missed or cannot contain a hit closer than `t_limit`.
    pub fn entry_distance(&self, origin: Vec3, inv_dir: Vec3, t_limit: f32) -> Option<f32> {
        let t1 = (self.min - origin) * inv_dir;
        let t2 = (self.max - origin) * inv_dir;
        let t_near = t1.min(t2).max_element();
        let t_far = t1.max(t2).min_element();
        if t_near <= t_far && t_far >= 0.0 && t_near < t_limit {
            Some(t_near.max(0.0))
        } else {
            None
        }
    }
}

/// Möller–Trumbore ray-triangle intersection, double-sided.
/// Returns the hit distance in `(EPS_T, t_limit]`, or None.
fn intersect_triangle(
    a: Vec3,
    b: Vec3,
    c: Vec3,
    origin: Vec3,
    direction: Vec3,
    t_limit: f32,
) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let h = direction.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < DET_EPS {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = inv_det * s.dot(h);
    if u < -EPS_B {
        return None;
    }
    let q = s.cross(edge1);
    let v = inv_det * direction.dot(q);
    if v < -EPS_B || u + v > 1.0 + EPS_B {
        return None;
    }
    let t = inv_det * edge2.dot(q);
    if t > EPS_T && t <= t_limit {
        Some(t)
    } else {
        None
    }
}

/// A node of the flattened BVH.
///
/// Leaves reference a contiguous `[begin, end)` range of the triangle
/// permutation and carry the `NO_CHILD` sentinel in both child slots;
/// internal nodes carry `begin == end` and two child node indices.
#[derive(Clone, Copy, Debug)]
pub struct BvhNode {
    pub aabb: Aabb,
    pub begin: u32,
    pub end: u32,
    pub left: u32,
    pub right: u32,
}

impl BvhNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left == NO_CHILD
    }
}

/// Bounding Volume Hierarchy accelerator over a [`TriangleMesh`].
///
/// Nodes are stored as a flat array in depth-first preorder (root at index 0,
/// left subtree before right). Leaves index triangles through a permutation
/// of `[0, triangle_count)`, so the mesh's own buffers are never reordered.
/// The build is deterministic: ties on the split coordinate break by triangle
/// index.
pub struct Bvh {
    nodes: Vec<BvhNode>,
    order: Vec<u32>,
}

impl Bvh {
    /// Build a BVH over every triangle of `mesh` by recursive median split
    /// on the longest centroid axis.
    pub fn build(mesh: &TriangleMesh) -> Bvh {
        let count = mesh.triangle_count();
        let mut bvh = Bvh {
            nodes: Vec::with_capacity(count.saturating_mul(2)),
            order: (0..count as u32).collect(),
        };
        if count > 0 {
            bvh.build_range(mesh, 0, count);
        }
        bvh
    }

    /// Build the subtree over `order[begin..end]`, returning its node index.
    /// Nodes are emitted in preorder, so a subtree's root precedes both
    /// children and the whole array ends up in depth-first layout.
    fn build_range(&mut self, mesh: &TriangleMesh, begin: usize, end: usize) -> u32 {
        let mut aabb = Aabb::empty();
        let mut centroid_bounds = Aabb::empty();
        for &tri in &self.order[begin..end] {
            aabb = aabb.merge(mesh.aabb(tri));
            centroid_bounds.expand(mesh.centroid(tri));
        }

        let index = self.nodes.len() as u32;
        self.nodes.push(BvhNode {
            aabb,
            begin: begin as u32,
            end: end as u32,
            left: NO_CHILD,
            right: NO_CHILD,
        });

        let len = end - begin;
        let axis = centroid_bounds.longest_axis();
        // A zero centroid extent means no split can separate the range.
        if len <= LEAF_THRESHOLD || centroid_bounds.min[axis] >= centroid_bounds.max[axis] {
            return index;
        }

        let mid = len / 2;
        self.order[begin..end].select_nth_unstable_by(mid, |&a, &b| {
            mesh.centroid(a)[axis]
                .partial_cmp(&mesh.centroid(b)[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let left = self.build_range(mesh, begin, begin + mid);
        let right = self.build_range(mesh, begin + mid, end);
        let node = &mut self.nodes[index as usize];
        node.begin = begin as u32;
        node.end = begin as u32;
        node.left = left;
        node.right = right;
        index
    }

    /// Cast a ray and return the closest hit with `t` in `(0, t_max]`, or None.
    ///
    /// `mesh` must be the mesh this BVH was built over.
    pub fn closest_hit(
        &self,
        mesh: &TriangleMesh,
        origin: Vec3,
        direction: Vec3,
        t_max: f32,
    ) -> Option<Hit> {
        if self.nodes.is_empty() {
            return None;
        }
        let inv_dir = direction.recip();
        let mut best_t = t_max;
        let mut best_tri = 0u32;
        let mut found = false;

        let t_root = self.nodes[0].aabb.entry_distance(origin, inv_dir, best_t)?;
        let mut stack = [(0u32, 0.0f32); STACK_DEPTH];
        stack[0] = (0, t_root);
        let mut top = 1usize;

        while top > 0 {
            top -= 1;
            let (node_index, t_enter) = stack[top];
            // The best hit may have improved since this node was pushed.
            if found && t_enter >= best_t {
                continue;
            }
            let node = &self.nodes[node_index as usize];
            if node.is_leaf() {
                for &tri in &self.order[node.begin as usize..node.end as usize] {
                    let [a, b, c] = mesh.triangle_vertices(tri);
                    if let Some(t) = intersect_triangle(a, b, c, origin, direction, best_t) {
                        // Strictly-closer updates keep the earliest triangle
                        // in permutation order on an exact tie.
                        if !found || t < best_t {
                            best_t = t;
                            best_tri = tri;
                            found = true;
                        }
                    }
                }
            } else {
                let t_left = self.nodes[node.left as usize]
                    .aabb
                    .entry_distance(origin, inv_dir, best_t);
                let t_right = self.nodes[node.right as usize]
                    .aabb
                    .entry_distance(origin, inv_dir, best_t);
                match (t_left, t_right) {
                    (Some(tl), Some(tr)) => {
                        // Push the farther child first so the nearer pops first.
                        let (near, t_near, far, t_far) = if tl <= tr {
                            (node.left, tl, node.right, tr)
                        } else {
                            (node.right, tr, node.left, tl)
                        };
                        stack[top] = (far, t_far);
                        stack[top + 1] = (near, t_near);
                        top += 2;
                    }
                    (Some(tl), None) => {
                        stack[top] = (node.left, tl);
                        top += 1;
                    }
                    (None, Some(tr)) => {
                        stack[top] = (node.right, tr);
                        top += 1;
                    }
                    (None, None) => {}
                }
            }
        }

        found.then_some(Hit {
            t: best_t,
            triangle: best_tri,
        })
    }

    /// The flattened node array in depth-first layout (root at 0).
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// The triangle permutation that leaf ranges index into.
    pub fn triangle_order(&self) -> &[u32] {
        &self.order
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
