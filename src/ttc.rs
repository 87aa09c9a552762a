use log::{debug, trace};
use serde::Serialize;

use crate::types::RangePoint;

/// Rank of the point used as the robust nearest distance.
pub const DEFAULT_DISTANCE_PERCENTILE: f64 = 0.1;

/// Distance changes below this (meters) count as no relative motion.
const MIN_CLOSING_DISTANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndeterminateReason {
    EmptyPrevious,
    EmptyCurrent,
    InvalidFrameRate,
    NoRelativeMotion,
}

/// Outcome of a lidar time-to-collision estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TtcEstimate {
    /// The object is getting closer.
    Collision {
        ttc: f64,
        /// meters per second
        closing_speed: f64,
        prev_distance: f64,
        curr_distance: f64,
    },
    /// The object keeps its distance or moves away; time to collision is infinite.
    NotApproaching {
        closing_speed: f64,
        prev_distance: f64,
        curr_distance: f64,
    },
    Indeterminate { reason: IndeterminateReason },
}

impl TtcEstimate {
    /// Seconds to collision; infinite when not approaching, `None` when unknown.
    pub fn ttc_seconds(&self) -> Option<f64> {
        match self {
            TtcEstimate::Collision { ttc, .. } => Some(*ttc),
            TtcEstimate::NotApproaching { .. } => Some(f64::INFINITY),
            TtcEstimate::Indeterminate { .. } => None,
        }
    }

    pub fn is_collision(&self) -> bool {
        matches!(self, TtcEstimate::Collision { .. })
    }
}

/// Forward distance of the point at rank `floor(percentile * n)` after sorting by x.
///
/// Points with a non-finite x are ignored. Returns `None` for an empty set.
pub fn percentile_distance(range_points: &[RangePoint], percentile: f64) -> Option<f64> {
    let mut xs: Vec<f64> = range_points
        .iter()
        .map(|p| p.x)
        .filter(|x| x.is_finite())
        .collect();
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    let idx = ((xs.len() as f64 * percentile).floor() as usize).min(xs.len() - 1);
    Some(xs[idx])
}

/// Time to collision from two lidar clusters of the same object.
pub fn compute_ttc_range(
    prev_points: &[RangePoint],
    curr_points: &[RangePoint],
    frame_rate_hz: f64,
) -> TtcEstimate {
    compute_ttc_range_with_percentile(
        prev_points,
        curr_points,
        frame_rate_hz,
        DEFAULT_DISTANCE_PERCENTILE,
    )
}

/// Constant velocity model: `speed = (d_prev - d_curr) * frame_rate`,
/// `ttc = d_curr / speed`, where `d` is the percentile forward distance.
pub fn compute_ttc_range_with_percentile(
    prev_points: &[RangePoint],
    curr_points: &[RangePoint],
    frame_rate_hz: f64,
    percentile: f64,
) -> TtcEstimate {
    trace!(
        "lidar ttc from {} previous and {} current points",
        prev_points.len(),
        curr_points.len()
    );
    if !frame_rate_hz.is_finite() || frame_rate_hz <= 0.0 {
        return TtcEstimate::Indeterminate {
            reason: IndeterminateReason::InvalidFrameRate,
        };
    }
    let Some(prev_distance) = percentile_distance(prev_points, percentile) else {
        return TtcEstimate::Indeterminate {
            reason: IndeterminateReason::EmptyPrevious,
        };
    };
    let Some(curr_distance) = percentile_distance(curr_points, percentile) else {
        return TtcEstimate::Indeterminate {
            reason: IndeterminateReason::EmptyCurrent,
        };
    };
    debug!("prev x = {:.3} m, curr x = {:.3} m", prev_distance, curr_distance);

    let delta_x = prev_distance - curr_distance;
    if delta_x.abs() <= MIN_CLOSING_DISTANCE {
        return TtcEstimate::Indeterminate {
            reason: IndeterminateReason::NoRelativeMotion,
        };
    }
    let delta_t = 1.0 / frame_rate_hz;
    let closing_speed = delta_x / delta_t;
    if delta_x < 0.0 {
        return TtcEstimate::NotApproaching {
            closing_speed,
            prev_distance,
            curr_distance,
        };
    }
    TtcEstimate::Collision {
        ttc: curr_distance / closing_speed,
        closing_speed,
        prev_distance,
        curr_distance,
    }
}
