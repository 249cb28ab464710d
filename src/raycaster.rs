use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::bvh::Bvh;
use crate::mesh::TriangleMesh;
use crate::sensor::{Pose, SensorConfig};

/// Execute a single LiDAR scan and pack the hit points into `hits`.
///
/// Rays are cast in elevation-major order; each closest hit within
/// `max_range` is kept if it clears `min_range`, optionally perturbed by
/// Gaussian range noise (clamped back into the valid range), and appended as
/// an `[x, y, z]` triple. The buffer is cleared first and its capacity is
/// reused across scans.
///
/// `rng` must be `Some` when `config.noise_stddev > 0`; with zero noise it is
/// never touched and the scan is bit-reproducible.
pub(crate) fn scan_into(
    bvh: &Bvh,
    mesh: &TriangleMesh,
    config: &SensorConfig,
    pose: Pose,
    mut rng: Option<&mut StdRng>,
    hits: &mut Vec<f32>,
) {
    let directions = config.scan_directions(pose.rotation);
    hits.clear();
    hits.reserve(directions.len() * 3);

    let noise: Option<Normal<f32>> = (config.noise_stddev > 0.0)
        .then(|| Normal::new(0.0, config.noise_stddev).expect("valid stddev"));

    for dir in &directions {
        let Some(hit) = bvh.closest_hit(mesh, pose.position, *dir, config.max_range) else {
            continue;
        };
        if hit.t < config.min_range {
            continue;
        }
        let mut t = hit.t;
        if let (Some(rng), Some(dist)) = (rng.as_deref_mut(), noise.as_ref()) {
            let n: f32 = dist.sample(rng);
            // Range-gated noise: the perturbed reading is clamped back into
            // the valid interval, never re-gated out.
            t = (t + n).clamp(config.min_range, config.max_range);
        }
        let point = pose.position + *dir * t;
        hits.extend_from_slice(&[point.x, point.y, point.z]);
    }
}
