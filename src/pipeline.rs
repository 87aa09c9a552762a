use log::{debug, info};
use serde::Serialize;

use crate::calibration::CalibrationSet;
use crate::clustering::{
    ClusterStats, RegionSummary, cluster_range_with_regions, crop_range_points,
};
use crate::config::FusionConfig;
use crate::error::Result;
use crate::frame::{Frame, FrameBuffer};
use crate::matching::{MatchStats, match_regions_with_stats};
use crate::projection::Projector;
use crate::ttc::{TtcEstimate, compute_ttc_range_with_percentile};
use crate::types::RegionMatch;

/// TTC of one object tracked from the previous into the current frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionTtc {
    pub prev_id: i32,
    pub curr_id: i32,
    pub estimate: TtcEstimate,
    pub prev_summary: Option<RegionSummary>,
    pub curr_summary: Option<RegionSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FramePairReport {
    pub prev_time_ns: i64,
    pub curr_time_ns: i64,
    pub matches: RegionMatch,
    pub ttc: Vec<RegionTtc>,
    pub cluster_stats: ClusterStats,
    pub match_stats: MatchStats,
}

impl FramePairReport {
    /// Smallest finite TTC among the approaching objects.
    pub fn min_ttc(&self) -> Option<f64> {
        self.ttc
            .iter()
            .filter_map(|t| match t.estimate {
                TtcEstimate::Collision { ttc, .. } => Some(ttc),
                _ => None,
            })
            .min_by(|a, b| a.total_cmp(b))
    }
}

/// Runs cropping, clustering, region matching and lidar TTC frame by frame.
pub struct FusionPipeline {
    config: FusionConfig,
    projector: Projector,
    buffer: FrameBuffer,
}

impl FusionPipeline {
    pub fn new(config: FusionConfig, calib: &CalibrationSet) -> Result<FusionPipeline> {
        config.validate()?;
        calib.validate()?;
        Ok(FusionPipeline {
            config,
            projector: Projector::new(calib),
            buffer: FrameBuffer::new(),
        })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn frames(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Forgets the buffered frames, e.g. after a gap in the sequence.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Clusters the lidar points of `frame` into its regions without touching
    /// the frame buffer.
    pub fn cluster_frame(&self, frame: &mut Frame) -> Result<ClusterStats> {
        if let Some(crop) = &self.config.crop {
            let n_before = frame.range_points.len();
            frame.range_points = crop_range_points(&frame.range_points, crop);
            debug!("cropped lidar points {} -> {}", n_before, frame.range_points.len());
        }
        cluster_range_with_regions(
            &mut frame.regions,
            &frame.range_points,
            self.config.shrink_factor,
            &self.projector,
        )
    }

    /// Consumes the next frame. Returns `None` for the first frame since there
    /// is nothing to compare against yet.
    pub fn process(&mut self, mut frame: Frame) -> Result<Option<FramePairReport>> {
        let cluster_stats = self.cluster_frame(&mut frame)?;
        self.buffer.push(frame);
        let Some((prev, curr)) = self.buffer.pair() else {
            return Ok(None);
        };

        let (matches, match_stats) = match_regions_with_stats(
            &curr.kpt_matches,
            prev,
            curr,
            self.config.support_threshold,
        );
        let ttc = matches
            .iter()
            .filter_map(|(prev_id, curr_id)| {
                let prev_region = prev.region(*prev_id)?;
                let curr_region = curr.region(*curr_id)?;
                let estimate = compute_ttc_range_with_percentile(
                    &prev_region.range_points,
                    &curr_region.range_points,
                    self.config.frame_rate_hz,
                    self.config.distance_percentile,
                );
                Some(RegionTtc {
                    prev_id: *prev_id,
                    curr_id: *curr_id,
                    estimate,
                    prev_summary: RegionSummary::from_region(prev_region),
                    curr_summary: RegionSummary::from_region(curr_region),
                })
            })
            .collect();

        let report = FramePairReport {
            prev_time_ns: prev.time_ns,
            curr_time_ns: curr.time_ns,
            matches,
            ttc,
            cluster_stats,
            match_stats,
        };
        if let Some(min_ttc) = report.min_ttc() {
            info!("frame {}: min lidar ttc {:.3} s", curr.time_ns, min_ttc);
        }
        Ok(Some(report))
    }

    /// Processes a whole sequence in order.
    pub fn process_sequence(
        &mut self,
        frames: impl IntoIterator<Item = Frame>,
    ) -> Result<Vec<FramePairReport>> {
        let mut reports = Vec::new();
        for frame in frames {
            if let Some(report) = self.process(frame)? {
                reports.push(report);
            }
        }
        Ok(reports)
    }
}
