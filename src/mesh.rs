use glam::Vec3;

use crate::bvh::Aabb;
use crate::error::SimError;

/// An indexed triangle mesh decoded from the host's flat buffers.
///
/// Vertices and triangle indices are owned copies of the caller's data;
/// per-triangle centroids and bounding boxes are computed once at load time
/// so the BVH builder never touches the vertex buffer again.
#[derive(Debug)]
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    centroids: Vec<Vec3>,
    bounds: Vec<Aabb>,
}

impl TriangleMesh {
    /// Decode a mesh from flat buffers.
    ///
    /// * `vertices` – Flat `[x,y,z, x,y,z, …]` positions.
    /// * `indices`  – Flat `[i0,i1,i2, …]` triangle vertex indices.
    ///
    /// Triangles with repeated indices are kept; they are degenerate and the
    /// intersection epsilons guarantee they never produce a hit.
    pub fn from_buffers(vertices: &[f32], indices: &[u32]) -> Result<TriangleMesh, SimError> {
        if vertices.len() % 3 != 0 {
            return Err(SimError::geometry(format!(
                "vertex buffer length {} is not a multiple of 3",
                vertices.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(SimError::geometry(format!(
                "index buffer length {} is not a multiple of 3",
                indices.len()
            )));
        }
        let vertex_count = vertices.len() / 3;
        if vertex_count > u32::MAX as usize {
            return Err(SimError::geometry(format!(
                "vertex count {vertex_count} exceeds the u32 index space"
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(SimError::geometry(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }

        let vertices: Vec<Vec3> = vertices
            .chunks_exact(3)
            .map(|v| Vec3::new(v[0], v[1], v[2]))
            .collect();
        let triangles: Vec<[u32; 3]> = indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect();

        let mut centroids = Vec::with_capacity(triangles.len());
        let mut bounds = Vec::with_capacity(triangles.len());
        for tri in &triangles {
            let [a, b, c] = [
                vertices[tri[0] as usize],
                vertices[tri[1] as usize],
                vertices[tri[2] as usize],
            ];
            centroids.push((a + b + c) / 3.0);
            let mut aabb = Aabb::empty();
            aabb.expand(a);
            aabb.expand(b);
            aabb.expand(c);
            bounds.push(aabb);
        }

        Ok(TriangleMesh {
            vertices,
            triangles,
            centroids,
            bounds,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// The three corner positions of triangle `i`.
    #[inline]
    pub fn triangle_vertices(&self, i: u32) -> [Vec3; 3] {
        let tri = self.triangles[i as usize];
        [
            self.vertices[tri[0] as usize],
            self.vertices[tri[1] as usize],
            self.vertices[tri[2] as usize],
        ]
    }

    /// Component-wise mean of triangle `i`'s corners, precomputed at load.
    #[inline]
    pub fn centroid(&self, i: u32) -> Vec3 {
        self.centroids[i as usize]
    }

    /// World-space bounding box of triangle `i`, precomputed at load.
    #[inline]
    pub fn aabb(&self, i: u32) -> &Aabb {
        &self.bounds[i as usize]
    }
}
