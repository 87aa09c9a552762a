use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single lidar return in the ego-vehicle frame.
///
/// x points forward, y to the left and z up, all in meters.
/// `r` is the reflectivity reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub r: f64,
}

impl RangePoint {
    pub fn new(x: f64, y: f64, z: f64, r: f64) -> RangePoint {
        RangePoint { x, y, z, r }
    }
}

/// Axis-aligned rectangle in pixel space.
///
/// Containment is half-open: the left and top edges are inside, the right and
/// bottom edges are not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Roi {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Roi {
        Roi {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, u: f64, v: f64) -> bool {
        u >= self.x && u < self.x + self.width && v >= self.y && v < self.y + self.height
    }

    /// Shrinks the rectangle symmetrically towards its center.
    ///
    /// `shrink_factor` is the fraction of width and height removed in total,
    /// half on each side.
    pub fn shrink(&self, shrink_factor: f64) -> Roi {
        Roi {
            x: self.x + shrink_factor * self.width / 2.0,
            y: self.y + shrink_factor * self.height / 2.0,
            width: self.width * (1.0 - shrink_factor),
            height: self.height * (1.0 - shrink_factor),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// A keypoint position in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub pt: glam::Vec2,
}

impl Keypoint {
    pub fn new(u: f32, v: f32) -> Keypoint {
        Keypoint {
            pt: glam::Vec2::new(u, v),
        }
    }
}

/// A keypoint match between the previous and the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeypointCorrespondence {
    /// index into the previous frame's keypoints
    pub prev_idx: usize,
    /// index into the current frame's keypoints
    pub curr_idx: usize,
    /// descriptor distance reported by the matcher
    #[serde(default)]
    pub distance: f32,
}

impl KeypointCorrespondence {
    pub fn new(prev_idx: usize, curr_idx: usize) -> KeypointCorrespondence {
        KeypointCorrespondence {
            prev_idx,
            curr_idx,
            distance: 0.0,
        }
    }
}

/// Previous region id to current region id.
pub type RegionMatch = BTreeMap<i32, i32>;
