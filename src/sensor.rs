use glam::{Quat, Vec3};

use crate::error::SimError;

/// Sensor configuration mirroring real-world LiDARs (e.g., Velodyne VLP-16, Ouster).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorConfig {
    /// Number of rays per full horizontal sweep (360°).
    pub horizontal_resolution: u32,
    /// Number of vertical laser channels / rings (e.g. 16, 32, 64).
    pub vertical_channels: u32,
    /// Upper vertical FOV limit in degrees (e.g. +15.0 for VLP-16).
    pub vertical_fov_upper: f32,
    /// Lower vertical FOV limit in degrees (e.g. -15.0 for VLP-16).
    pub vertical_fov_lower: f32,
    /// Minimum valid range in metres.
    pub min_range: f32,
    /// Maximum valid range in metres.
    pub max_range: f32,
    /// Standard deviation of Gaussian noise added to each hit distance (0 = no noise).
    pub noise_stddev: f32,
}

impl SensorConfig {
    /// Create a new sensor configuration.
    pub fn new(
        horizontal_resolution: u32,
        vertical_channels: u32,
        vertical_fov_upper: f32,
        vertical_fov_lower: f32,
        min_range: f32,
        max_range: f32,
        noise_stddev: f32,
    ) -> SensorConfig {
        SensorConfig {
            horizontal_resolution,
            vertical_channels,
            vertical_fov_upper,
            vertical_fov_lower,
            min_range,
            max_range,
            noise_stddev,
        }
    }

    /// Returns a preset matching the Velodyne VLP-16.
    pub fn vlp16() -> SensorConfig {
        SensorConfig::new(1800, 16, 15.0, -15.0, 0.1, 100.0, 0.0)
    }

    /// Returns a preset matching the Ouster OS1-32.
    pub fn ouster_os1_32() -> SensorConfig {
        SensorConfig::new(1024, 32, 22.5, -22.5, 0.1, 120.0, 0.0)
    }

    /// Returns a preset matching the Ouster OS1-64.
    pub fn ouster_os1_64() -> SensorConfig {
        SensorConfig::new(2048, 64, 22.5, -22.5, 0.1, 120.0, 0.0)
    }

    /// Total number of rays fired per scan.
    pub fn total_rays(&self) -> u32 {
        self.horizontal_resolution * self.vertical_channels
    }

    /// Check every field against the contract the scan engine assumes.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.horizontal_resolution == 0 {
            return Err(SimError::config("horizontal_resolution must be at least 1"));
        }
        if self.vertical_channels == 0 {
            return Err(SimError::config("vertical_channels must be at least 1"));
        }
        let floats = [
            ("vertical_fov_upper", self.vertical_fov_upper),
            ("vertical_fov_lower", self.vertical_fov_lower),
            ("min_range", self.min_range),
            ("max_range", self.max_range),
            ("noise_stddev", self.noise_stddev),
        ];
        for (name, value) in floats {
            if !value.is_finite() {
                return Err(SimError::config(format!("{name} must be finite")));
            }
        }
        if self.vertical_fov_upper < self.vertical_fov_lower {
            return Err(SimError::config(format!(
                "vertical_fov_upper {} is below vertical_fov_lower {}",
                self.vertical_fov_upper, self.vertical_fov_lower
            )));
        }
        if self.min_range < 0.0 {
            return Err(SimError::config("min_range must not be negative"));
        }
        if self.max_range <= self.min_range {
            return Err(SimError::config(format!(
                "max_range {} must exceed min_range {}",
                self.max_range, self.min_range
            )));
        }
        if self.noise_stddev < 0.0 {
            return Err(SimError::config("noise_stddev must not be negative"));
        }
        Ok(())
    }

    /// Generate all ray directions for a full scan, rotated into world space.
    ///
    /// Rays are ordered elevation-major: ring 0 (the lowest elevation) sweeps
    /// all azimuth steps before ring 1 begins. Azimuth step 0 points along
    /// local +x and the sweep runs counter-clockwise viewed from +y. A single
    /// ring sits at the upper FOV limit.
    ///
    /// `rotation` is applied as-is; a non-unit quaternion yields non-unit
    /// directions (the caller owns normalisation).
    pub fn scan_directions(&self, rotation: Quat) -> Vec<Vec3> {
        let mut directions = Vec::with_capacity(self.total_rays() as usize);

        let v_step = if self.vertical_channels > 1 {
            (self.vertical_fov_upper - self.vertical_fov_lower)
                / (self.vertical_channels - 1) as f32
        } else {
            0.0
        };

        for ring in 0..self.vertical_channels {
            let elevation_deg = if self.vertical_channels == 1 {
                self.vertical_fov_upper
            } else {
                self.vertical_fov_lower + ring as f32 * v_step
            };
            let (sin_elev, cos_elev) = elevation_deg.to_radians().sin_cos();

            for h in 0..self.horizontal_resolution {
                let azimuth =
                    std::f32::consts::TAU * h as f32 / self.horizontal_resolution as f32;
                let local = Vec3::new(cos_elev * azimuth.cos(), sin_elev, cos_elev * azimuth.sin());
                directions.push(rotation * local);
            }
        }
        directions
    }
}

/// A rigid-body sensor pose: position plus orientation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    /// Orientation as a unit quaternion. The core never normalises it.
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// A pose at `position` with the identity orientation.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::from_position(Vec3::ZERO)
    }
}
