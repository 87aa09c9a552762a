use std::collections::BTreeMap;

use log::{debug, trace, warn};
use nalgebra as na;
use serde::Serialize;

use crate::frame::{DetectionRegion, Frame};
use crate::types::{KeypointCorrespondence, RegionMatch};

/// Minimum-support rule: a region pair needs strictly more votes than this.
pub const DEFAULT_SUPPORT_THRESHOLD: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    /// correspondences counted in the vote matrix
    pub voted: usize,
    /// previous keypoint outside every previous region
    pub unresolved_prev: usize,
    /// current keypoint outside every current region
    pub unresolved_curr: usize,
    /// keypoint index out of range
    pub invalid_index: usize,
}

/// Index of the first region, in list order, whose rectangle contains `pt`.
///
/// Overlapping regions are not disambiguated: the earlier one wins.
pub fn first_containing_region(regions: &[DetectionRegion], pt: glam::Vec2) -> Option<usize> {
    regions
        .iter()
        .position(|r| r.roi.contains(pt.x as f64, pt.y as f64))
}

/// Counts correspondences per (previous region, current region) pair.
///
/// Rows follow `prev.regions` order, columns follow `curr.regions` order.
pub fn build_vote_matrix(
    correspondences: &[KeypointCorrespondence],
    prev: &Frame,
    curr: &Frame,
) -> (na::DMatrix<u32>, MatchStats) {
    let mut votes = na::DMatrix::<u32>::zeros(prev.regions.len(), curr.regions.len());
    let mut stats = MatchStats::default();
    for m in correspondences {
        let (Some(prev_kpt), Some(curr_kpt)) =
            (prev.keypoints.get(m.prev_idx), curr.keypoints.get(m.curr_idx))
        else {
            trace!("correspondence {} -> {} out of range", m.prev_idx, m.curr_idx);
            stats.invalid_index += 1;
            continue;
        };
        let Some(row) = first_containing_region(&prev.regions, prev_kpt.pt) else {
            stats.unresolved_prev += 1;
            continue;
        };
        let Some(col) = first_containing_region(&curr.regions, curr_kpt.pt) else {
            stats.unresolved_curr += 1;
            continue;
        };
        votes[(row, col)] += 1;
        stats.voted += 1;
    }
    (votes, stats)
}

/// Picks the best current region for every previous region.
///
/// Ties go to the first column. Rows whose best count does not exceed
/// `support_threshold` are left out.
pub fn select_best_matches(
    votes: &na::DMatrix<u32>,
    prev_regions: &[DetectionRegion],
    curr_regions: &[DetectionRegion],
    support_threshold: u32,
) -> RegionMatch {
    let mut best_matches = RegionMatch::new();
    for (row, prev_region) in prev_regions.iter().enumerate() {
        let mut best: Option<(usize, u32)> = None;
        for col in 0..votes.ncols() {
            let count = votes[(row, col)];
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((col, count));
            }
        }
        if let Some((col, count)) = best {
            if count > support_threshold {
                best_matches.insert(prev_region.id, curr_regions[col].id);
            }
        }
    }

    let mut matched_by: BTreeMap<i32, usize> = BTreeMap::new();
    for curr_id in best_matches.values() {
        *matched_by.entry(*curr_id).or_default() += 1;
    }
    for (curr_id, n) in matched_by.iter().filter(|(_, n)| **n > 1) {
        debug!("current region {} is matched by {} previous regions", curr_id, n);
    }
    best_matches
}

/// Associates regions of two consecutive frames through keypoint votes.
pub fn match_regions_with_stats(
    correspondences: &[KeypointCorrespondence],
    prev: &Frame,
    curr: &Frame,
    support_threshold: u32,
) -> (RegionMatch, MatchStats) {
    if prev.has_duplicate_region_ids() || curr.has_duplicate_region_ids() {
        warn!("duplicate region ids in frame, matches may be ambiguous");
    }
    let (votes, stats) = build_vote_matrix(correspondences, prev, curr);
    let best_matches = select_best_matches(&votes, &prev.regions, &curr.regions, support_threshold);
    debug!(
        "matched {} of {} regions from {} votes ({} prev / {} curr keypoints outside regions)",
        best_matches.len(),
        prev.regions.len(),
        stats.voted,
        stats.unresolved_prev,
        stats.unresolved_curr
    );
    (best_matches, stats)
}

pub fn match_regions(
    correspondences: &[KeypointCorrespondence],
    prev: &Frame,
    curr: &Frame,
) -> RegionMatch {
    match_regions_with_stats(correspondences, prev, curr, DEFAULT_SUPPORT_THRESHOLD).0
}
