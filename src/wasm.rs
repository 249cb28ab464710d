//! JavaScript host surface, compiled only for wasm32.
//!
//! Wraps the native [`Simulator`] behind `wasm-bindgen`, taking the sensor
//! configuration as plain scalars and handing scan results back as a
//! zero-copy `Float32Array` view into Wasm linear memory.

use glam::{Quat, Vec3};
use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

use crate::{Pose, SensorConfig, Simulator};

/// The LiDAR simulator as seen from JavaScript.
#[wasm_bindgen]
pub struct LidarSimulator {
    inner: Simulator,
}

#[wasm_bindgen]
impl LidarSimulator {
    /// Create a new simulator from the seven sensor configuration fields.
    ///
    /// Call [`load_geometry`] before [`scan`]; scans without geometry return
    /// an empty array.
    ///
    /// [`load_geometry`]: LidarSimulator::load_geometry
    /// [`scan`]: LidarSimulator::scan
    #[wasm_bindgen(constructor)]
    pub fn new(
        horizontal_resolution: u32,
        vertical_channels: u32,
        vertical_fov_upper: f32,
        vertical_fov_lower: f32,
        min_range: f32,
        max_range: f32,
        noise_stddev: f32,
    ) -> Result<LidarSimulator, JsError> {
        let config = SensorConfig::new(
            horizontal_resolution,
            vertical_channels,
            vertical_fov_upper,
            vertical_fov_lower,
            min_range,
            max_range,
            noise_stddev,
        );
        Ok(LidarSimulator {
            inner: Simulator::new(config)?,
        })
    }

    /// Ingest environment geometry and (re)build the internal BVH.
    ///
    /// * `vertices` – Flat `Float32Array` of vertex positions `[x,y,z, …]`.
    /// * `indices`  – Flat `Uint32Array` of triangle vertex indices.
    ///
    /// This method may be called multiple times to swap the environment at runtime.
    pub fn load_geometry(&mut self, vertices: &[f32], indices: &[u32]) -> Result<(), JsError> {
        Ok(self.inner.load_geometry(vertices, indices)?)
    }

    /// Replace the sensor configuration without rebuilding the BVH.
    pub fn set_config(
        &mut self,
        horizontal_resolution: u32,
        vertical_channels: u32,
        vertical_fov_upper: f32,
        vertical_fov_lower: f32,
        min_range: f32,
        max_range: f32,
        noise_stddev: f32,
    ) -> Result<(), JsError> {
        Ok(self.inner.set_config(SensorConfig::new(
            horizontal_resolution,
            vertical_channels,
            vertical_fov_upper,
            vertical_fov_lower,
            min_range,
            max_range,
            noise_stddev,
        ))?)
    }

    /// Seed the range-noise RNG so noisy scans become reproducible.
    pub fn set_noise_seed(&mut self, seed: u64) {
        self.inner.set_noise_seed(seed);
    }

    /// Run a full scan from a given pose and return the hit point cloud.
    ///
    /// * `x`, `y`, `z`           – Sensor world-space position.
    /// * `qx`, `qy`, `qz`, `qw` – Sensor orientation as a unit quaternion.
    ///
    /// Returns a `Float32Array` view `[x,y,z, x,y,z, …]` directly into Wasm
    /// linear memory.
    ///
    /// # Safety
    ///
    /// The returned `Float32Array` is a direct view into Wasm linear memory.
    /// The caller must consume or copy it before the next call into this
    /// module: any scan or geometry load may replace the backing buffer, and
    /// a memory grow could invalidate the underlying pointer.
    pub fn scan(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        qx: f32,
        qy: f32,
        qz: f32,
        qw: f32,
    ) -> Float32Array {
        let pose = Pose::new(Vec3::new(x, y, z), Quat::from_xyzw(qx, qy, qz, qw));
        let hits = self.inner.scan(pose);
        // SAFETY: the slice borrows the simulator-owned buffer, which is not
        // resized again within this call frame. The contract above makes the
        // caller responsible for consuming the view before the next call.
        unsafe { Float32Array::view(hits) }
    }

    /// Returns the number of valid hits from the last scan.
    pub fn last_hit_count(&self) -> usize {
        self.inner.last_hit_count()
    }
}
