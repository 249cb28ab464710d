//! Simulation of a rotating multi-beam LiDAR against a static triangle mesh.
//!
//! The host flattens its scene to vertex/index buffers and loads them into a
//! [`Simulator`]; each [`Simulator::scan`] casts one full rotation of rays
//! (elevation-major) through a BVH and returns the world-space hit points as
//! a packed `[x, y, z, …]` buffer.

mod bvh;
mod error;
mod mesh;
mod raycaster;
mod sensor;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use bvh::{Aabb, Bvh, BvhNode, Hit, Ray};
pub use error::SimError;
pub use mesh::TriangleMesh;
pub use sensor::{Pose, SensorConfig};

use rand::rngs::StdRng;
use rand::SeedableRng;

struct Geometry {
    mesh: TriangleMesh,
    bvh: Bvh,
}

/// The LiDAR simulator.
///
/// Owns the sensor configuration, the loaded environment (triangle store plus
/// its BVH), the reusable hit buffer, and the noise RNG. A simulator is not
/// safe to share between threads; hosts wanting concurrency run one instance
/// per thread.
pub struct Simulator {
    config: SensorConfig,
    geometry: Option<Geometry>,
    /// Pre-allocated hit buffer re-used across scans to avoid repeated allocation.
    hit_buffer: Vec<f32>,
    noise_seed: Option<u64>,
    rng: Option<StdRng>,
}

impl Simulator {
    /// Create a simulator with no geometry loaded.
    ///
    /// Scans before [`load_geometry`] succeed and return an empty buffer.
    ///
    /// [`load_geometry`]: Simulator::load_geometry
    pub fn new(config: SensorConfig) -> Result<Simulator, SimError> {
        config.validate()?;
        Ok(Simulator {
            config,
            geometry: None,
            hit_buffer: Vec::new(),
            noise_seed: None,
            rng: None,
        })
    }

    /// Ingest environment geometry and (re)build the internal BVH.
    ///
    /// * `vertices` – Flat vertex positions `[x,y,z, …]`.
    /// * `indices`  – Flat triangle vertex indices.
    ///
    /// May be called any number of times to swap the environment; the
    /// previous store and BVH are released atomically on success and kept
    /// untouched on error.
    pub fn load_geometry(&mut self, vertices: &[f32], indices: &[u32]) -> Result<(), SimError> {
        let mesh = TriangleMesh::from_buffers(vertices, indices)?;
        let bvh = Bvh::build(&mesh);
        log::debug!(
            "loaded environment: {} triangles, {} BVH nodes",
            mesh.triangle_count(),
            bvh.node_count()
        );
        self.geometry = Some(Geometry { mesh, bvh });
        Ok(())
    }

    /// Replace the sensor configuration without rebuilding the BVH.
    pub fn set_config(&mut self, config: SensorConfig) -> Result<(), SimError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }

    /// Seed the range-noise RNG so noisy scans become bit-reproducible.
    ///
    /// Without a seed the RNG draws from OS entropy on the first noisy scan.
    pub fn set_noise_seed(&mut self, seed: u64) {
        self.noise_seed = Some(seed);
        self.rng = Some(StdRng::seed_from_u64(seed));
    }

    /// Run a full scan from `pose` and return the hit point cloud.
    ///
    /// The returned slice is a view into the simulator-owned buffer, laid out
    /// `[x,y,z, x,y,z, …]` in elevation-major ray order, and stays valid only
    /// until the next call that may resize it (any scan or geometry load).
    /// With no geometry loaded the scan is empty.
    pub fn scan(&mut self, pose: Pose) -> &[f32] {
        let Some(geometry) = self.geometry.as_ref() else {
            self.hit_buffer.clear();
            return &self.hit_buffer;
        };
        let rng = if self.config.noise_stddev > 0.0 {
            Some(self.rng.get_or_insert_with(|| match self.noise_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            }))
        } else {
            None
        };
        raycaster::scan_into(
            &geometry.bvh,
            &geometry.mesh,
            &self.config,
            pose,
            rng,
            &mut self.hit_buffer,
        );
        &self.hit_buffer
    }

    /// Returns the number of valid hits from the last scan (0 before any scan).
    pub fn last_hit_count(&self) -> usize {
        self.hit_buffer.len() / 3
    }

    /// Release all owned storage: geometry, BVH, hit buffer, RNG state.
    ///
    /// Idempotent. The simulator behaves as freshly created afterwards, so
    /// stray calls degrade to the no-geometry case instead of crashing.
    pub fn free(&mut self) {
        self.geometry = None;
        self.hit_buffer = Vec::new();
        self.noise_seed = None;
        self.rng = None;
    }
}
