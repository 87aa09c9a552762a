use nalgebra as na;
use rayon::prelude::*;
use thiserror::Error;

use crate::calibration::CalibrationSet;
use crate::types::RangePoint;

/// Projected depth below this is treated as behind the camera.
const MIN_DEPTH: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("point is behind the camera (depth {0})")]
    BehindSensor(f64),
    #[error("projection is not finite")]
    NonFinite,
}

/// Maps lidar points into pixel coordinates with a fixed calibration.
#[derive(Debug, Clone)]
pub struct Projector {
    composite: na::Matrix3x4<f64>,
}

impl Projector {
    pub fn new(calib: &CalibrationSet) -> Projector {
        Projector {
            composite: calib.composite(),
        }
    }

    pub fn project_one(&self, pt: &RangePoint) -> Result<na::Point2<f64>, GeometryError> {
        let y = self.composite * na::Vector4::new(pt.x, pt.y, pt.z, 1.0);
        if !y.iter().all(|v| v.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        if y[2] < MIN_DEPTH {
            return Err(GeometryError::BehindSensor(y[2]));
        }
        Ok(na::Point2::new(y[0] / y[2], y[1] / y[2]))
    }

    /// Projects every point, keeping the input order.
    pub fn project(&self, pts: &[RangePoint]) -> Vec<Result<na::Point2<f64>, GeometryError>> {
        pts.par_iter().map(|pt| self.project_one(pt)).collect()
    }
}

/// One-shot projection, see [`Projector`] when projecting many points.
pub fn project(pt: &RangePoint, calib: &CalibrationSet) -> Result<na::Point2<f64>, GeometryError> {
    Projector::new(calib).project_one(pt)
}
