use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

/// Ego-lane box used to crop lidar points before clustering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    pub min_x: f64,
    pub max_x: f64,
    pub max_abs_y: f64,
    pub min_z: f64,
    pub max_z: f64,
    pub min_reflectivity: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            min_x: 2.0,
            max_x: 20.0,
            max_abs_y: 2.0,
            min_z: -1.5,
            max_z: -0.9,
            min_reflectivity: 0.1,
        }
    }
}

impl CropConfig {
    pub fn contains(&self, x: f64, y: f64, z: f64, r: f64) -> bool {
        x >= self.min_x
            && x <= self.max_x
            && y.abs() <= self.max_abs_y
            && z >= self.min_z
            && z <= self.max_z
            && r >= self.min_reflectivity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// fraction of each region removed before the lidar containment test
    pub shrink_factor: f64,
    /// sensor frame rate in Hz
    pub frame_rate_hz: f64,
    /// a region match needs strictly more votes than this
    pub support_threshold: u32,
    /// rank used as the robust nearest distance, in [0, 1)
    pub distance_percentile: f64,
    /// lidar crop box, `None` keeps every point
    pub crop: Option<CropConfig>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            shrink_factor: 0.10,
            frame_rate_hz: 10.0,
            support_threshold: 1,
            distance_percentile: 0.1,
            crop: Some(CropConfig::default()),
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.shrink_factor) {
            return Err(FusionError::InvalidConfig(format!(
                "shrink_factor must be in [0, 1), got {}",
                self.shrink_factor
            )));
        }
        if !self.frame_rate_hz.is_finite() || self.frame_rate_hz <= 0.0 {
            return Err(FusionError::InvalidConfig(format!(
                "frame_rate_hz must be positive, got {}",
                self.frame_rate_hz
            )));
        }
        if !(0.0..1.0).contains(&self.distance_percentile) {
            return Err(FusionError::InvalidConfig(format!(
                "distance_percentile must be in [0, 1), got {}",
                self.distance_percentile
            )));
        }
        Ok(())
    }
}
