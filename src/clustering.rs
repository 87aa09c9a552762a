use log::{debug, trace};
use serde::Serialize;

use crate::calibration::CalibrationSet;
use crate::config::CropConfig;
use crate::error::{FusionError, Result};
use crate::frame::DetectionRegion;
use crate::projection::Projector;
use crate::types::RangePoint;

/// Counts of what happened to each lidar point during one clustering pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClusterStats {
    pub assigned: usize,
    /// inside no region
    pub unassigned: usize,
    /// inside more than one region
    pub ambiguous: usize,
    /// projection failed
    pub behind_sensor: usize,
}

impl ClusterStats {
    pub fn total(&self) -> usize {
        self.assigned + self.unassigned + self.ambiguous + self.behind_sensor
    }
}

/// Groups lidar points by the detection region their projection falls into.
///
/// Every region is shrunk by `shrink_factor` first to keep edge and occlusion
/// points out. A point goes to a region only when exactly one shrunk region
/// encloses it. Existing region points are replaced, so running this twice on
/// the same input gives the same result.
pub fn cluster_range_with_regions(
    regions: &mut [DetectionRegion],
    range_points: &[RangePoint],
    shrink_factor: f64,
    projector: &Projector,
) -> Result<ClusterStats> {
    if !(0.0..1.0).contains(&shrink_factor) {
        return Err(FusionError::InvalidConfig(format!(
            "shrink_factor must be in [0, 1), got {}",
            shrink_factor
        )));
    }
    for region in regions.iter_mut() {
        region.range_points.clear();
    }
    let shrunk: Vec<_> = regions.iter().map(|r| r.roi.shrink(shrink_factor)).collect();

    let mut stats = ClusterStats::default();
    let p2ds = projector.project(range_points);
    for (pt, p2d) in range_points.iter().zip(p2ds) {
        let p2d = match p2d {
            Ok(p) => p,
            Err(e) => {
                trace!("skip lidar point ({:.2}, {:.2}, {:.2}): {}", pt.x, pt.y, pt.z, e);
                stats.behind_sensor += 1;
                continue;
            }
        };
        let mut enclosing = shrunk
            .iter()
            .enumerate()
            .filter(|(_, roi)| roi.contains(p2d.x, p2d.y))
            .map(|(i, _)| i);
        match (enclosing.next(), enclosing.next()) {
            (Some(idx), None) => {
                regions[idx].range_points.push(*pt);
                stats.assigned += 1;
            }
            (None, _) => stats.unassigned += 1,
            (Some(_), Some(_)) => {
                trace!("point ({:.2}, {:.2}) is in several regions", p2d.x, p2d.y);
                stats.ambiguous += 1;
            }
        }
    }
    debug!(
        "clustered {} lidar points: {} assigned, {} outside, {} ambiguous, {} behind sensor",
        stats.total(),
        stats.assigned,
        stats.unassigned,
        stats.ambiguous,
        stats.behind_sensor
    );
    Ok(stats)
}

/// Same as [`cluster_range_with_regions`] but builds the projector on the fly.
pub fn cluster_range_with_roi(
    regions: &mut [DetectionRegion],
    range_points: &[RangePoint],
    shrink_factor: f64,
    calib: &CalibrationSet,
) -> Result<ClusterStats> {
    cluster_range_with_regions(regions, range_points, shrink_factor, &Projector::new(calib))
}

/// Keeps the points inside the ego-lane crop box.
pub fn crop_range_points(range_points: &[RangePoint], crop: &CropConfig) -> Vec<RangePoint> {
    range_points
        .iter()
        .filter(|p| crop.contains(p.x, p.y, p.z, p.r))
        .copied()
        .collect()
}

/// Top-view summary of one clustered object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub id: i32,
    pub num_points: usize,
    /// closest forward distance, meters
    pub x_min: f64,
    /// lateral extent y_max - y_min, meters
    pub width: f64,
}

impl RegionSummary {
    /// `None` when the region holds no points.
    pub fn from_region(region: &DetectionRegion) -> Option<RegionSummary> {
        if region.range_points.is_empty() {
            return None;
        }
        let (x_min, y_min, y_max) = region.range_points.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(x_min, y_min, y_max), p| (x_min.min(p.x), y_min.min(p.y), y_max.max(p.y)),
        );
        Some(RegionSummary {
            id: region.id,
            num_points: region.range_points.len(),
            x_min,
            width: y_max - y_min,
        })
    }
}
