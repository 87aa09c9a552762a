use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

/// Camera/lidar calibration, stored row-major.
///
/// * `p_rect` - 3x4 projection of the rectified camera
/// * `r_rect` - 4x4 rectifying rotation
/// * `rt` - 4x4 rigid transform from the lidar frame into the camera frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSet {
    pub p_rect: [[f64; 4]; 3],
    pub r_rect: [[f64; 4]; 4],
    pub rt: [[f64; 4]; 4],
}

impl Default for CalibrationSet {
    /// KITTI raw sequence calibration (camera 00, velodyne to camera).
    fn default() -> Self {
        Self {
            p_rect: [
                [7.215377e+02, 0.000000e+00, 6.095593e+02, 0.000000e+00],
                [0.000000e+00, 7.215377e+02, 1.728540e+02, 0.000000e+00],
                [0.000000e+00, 0.000000e+00, 1.000000e+00, 0.000000e+00],
            ],
            r_rect: [
                [9.999239e-01, 9.837760e-03, -7.445048e-03, 0.0],
                [-9.869795e-03, 9.999421e-01, -4.278459e-03, 0.0],
                [7.402527e-03, 4.351614e-03, 9.999631e-01, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            rt: [
                [7.533745e-03, -9.999714e-01, -6.166020e-04, -4.069766e-03],
                [1.480249e-02, 7.280733e-04, -9.998902e-01, -7.631618e-02],
                [9.998621e-01, 7.523790e-03, 1.480755e-02, -2.717806e-01],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}

impl CalibrationSet {
    pub fn from_matrices(
        p_rect: &na::Matrix3x4<f64>,
        r_rect: &na::Matrix4<f64>,
        rt: &na::Matrix4<f64>,
    ) -> CalibrationSet {
        let mut out = CalibrationSet {
            p_rect: [[0.0; 4]; 3],
            r_rect: [[0.0; 4]; 4],
            rt: [[0.0; 4]; 4],
        };
        for c in 0..4 {
            for r in 0..3 {
                out.p_rect[r][c] = p_rect[(r, c)];
            }
            for r in 0..4 {
                out.r_rect[r][c] = r_rect[(r, c)];
                out.rt[r][c] = rt[(r, c)];
            }
        }
        out
    }

    /// Ideal pinhole camera looking along the lidar's x axis, no rectification.
    pub fn pinhole(focal: f64, cx: f64, cy: f64) -> CalibrationSet {
        let p_rect = na::Matrix3x4::new(
            focal, 0.0, cx, 0.0, //
            0.0, focal, cy, 0.0, //
            0.0, 0.0, 1.0, 0.0,
        );
        // lidar (forward, left, up) -> camera (right, down, forward)
        let rt = na::Matrix4::new(
            0.0, -1.0, 0.0, 0.0, //
            0.0, 0.0, -1.0, 0.0, //
            1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        );
        CalibrationSet::from_matrices(&p_rect, &na::Matrix4::identity(), &rt)
    }

    pub fn p_rect_mat(&self) -> na::Matrix3x4<f64> {
        na::Matrix3x4::from_fn(|r, c| self.p_rect[r][c])
    }

    pub fn r_rect_mat(&self) -> na::Matrix4<f64> {
        na::Matrix4::from_fn(|r, c| self.r_rect[r][c])
    }

    pub fn rt_mat(&self) -> na::Matrix4<f64> {
        na::Matrix4::from_fn(|r, c| self.rt[r][c])
    }

    /// P * R * RT
    pub fn composite(&self) -> na::Matrix3x4<f64> {
        self.p_rect_mat() * self.r_rect_mat() * self.rt_mat()
    }

    /// Checks that every entry is finite and that the 4x4 matrices are affine.
    pub fn validate(&self) -> Result<()> {
        let mut values = self
            .p_rect
            .iter()
            .chain(self.r_rect.iter())
            .chain(self.rt.iter())
            .flat_map(|row| row.iter());
        if values.any(|v| !v.is_finite()) {
            return Err(FusionError::InvalidConfig(
                "calibration contains non-finite values".to_string(),
            ));
        }
        for (name, m) in [("r_rect", &self.r_rect), ("rt", &self.rt)] {
            if m[3] != [0.0, 0.0, 0.0, 1.0] {
                return Err(FusionError::InvalidConfig(format!(
                    "last row of {} must be [0, 0, 0, 1], got {:?}",
                    name, m[3]
                )));
            }
        }
        Ok(())
    }
}
