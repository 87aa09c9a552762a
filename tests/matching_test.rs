use ttc_fusion::frame::{DetectionRegion, Frame};
use ttc_fusion::matching::{
    build_vote_matrix, first_containing_region, match_regions, match_regions_with_stats,
};
use ttc_fusion::types::{Keypoint, KeypointCorrespondence, Roi};

/// Three side-by-side 100 x 100 regions with ids 0, 1, 2.
fn three_regions() -> Vec<DetectionRegion> {
    (0..3)
        .map(|i| DetectionRegion::new(i, Roi::new(i as f64 * 100.0, 0.0, 100.0, 100.0)))
        .collect()
}

fn frame(keypoints: Vec<Keypoint>, regions: Vec<DetectionRegion>) -> Frame {
    Frame {
        keypoints,
        regions,
        ..Default::default()
    }
}

fn correspondences(n: usize) -> Vec<KeypointCorrespondence> {
    (0..n).map(|i| KeypointCorrespondence::new(i, i)).collect()
}

#[test]
fn test_zero_correspondences() {
    let prev = frame(vec![Keypoint::new(50.0, 50.0)], three_regions());
    let curr = frame(vec![Keypoint::new(50.0, 50.0)], three_regions());
    assert!(match_regions(&[], &prev, &curr).is_empty());
}

#[test]
fn test_three_votes_make_a_match() {
    // all keypoints move from region 0 into region 2
    let prev = frame(vec![Keypoint::new(10.0, 10.0); 3], three_regions());
    let curr = frame(vec![Keypoint::new(250.0, 50.0); 3], three_regions());
    let matches = match_regions(&correspondences(3), &prev, &curr);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches.get(&0), Some(&2));
}

#[test]
fn test_single_vote_is_not_enough() {
    let prev = frame(vec![Keypoint::new(10.0, 10.0)], three_regions());
    let curr = frame(vec![Keypoint::new(250.0, 50.0)], three_regions());
    let matches = match_regions(&correspondences(1), &prev, &curr);
    assert!(matches.is_empty());
}

#[test]
fn test_two_votes_pass_the_threshold() {
    let prev = frame(vec![Keypoint::new(10.0, 10.0); 2], three_regions());
    let curr = frame(vec![Keypoint::new(150.0, 10.0); 2], three_regions());
    let matches = match_regions(&correspondences(2), &prev, &curr);
    assert_eq!(matches.get(&0), Some(&1));
}

#[test]
fn test_ties_go_to_first_column() {
    // region 0 votes twice for region 2 and twice for region 1
    let prev = frame(vec![Keypoint::new(10.0, 10.0); 4], three_regions());
    let curr = frame(
        vec![
            Keypoint::new(250.0, 10.0),
            Keypoint::new(250.0, 10.0),
            Keypoint::new(150.0, 10.0),
            Keypoint::new(150.0, 10.0),
        ],
        three_regions(),
    );
    let matches = match_regions(&correspondences(4), &prev, &curr);
    assert_eq!(matches.get(&0), Some(&1));
}

#[test]
fn test_unresolved_keypoints_are_discarded() {
    let prev = frame(
        vec![
            Keypoint::new(10.0, 10.0),
            Keypoint::new(10.0, 500.0), // outside every previous region
            Keypoint::new(10.0, 10.0),
            Keypoint::new(10.0, 10.0),
        ],
        three_regions(),
    );
    let curr = frame(
        vec![
            Keypoint::new(150.0, 10.0),
            Keypoint::new(150.0, 10.0),
            Keypoint::new(150.0, 900.0), // outside every current region
            Keypoint::new(150.0, 10.0),
        ],
        three_regions(),
    );
    let mut corr = correspondences(4);
    corr.push(KeypointCorrespondence::new(40, 0)); // bad index

    let (matches, stats) = match_regions_with_stats(&corr, &prev, &curr, 1);
    assert_eq!(stats.voted, 2);
    assert_eq!(stats.unresolved_prev, 1);
    assert_eq!(stats.unresolved_curr, 1);
    assert_eq!(stats.invalid_index, 1);
    // a miss does not stop the vote, the last correspondence still counts
    assert_eq!(matches.get(&0), Some(&1));
}

#[test]
fn test_first_containing_region_prefers_list_order() {
    let regions = vec![
        DetectionRegion::new(5, Roi::new(0.0, 0.0, 100.0, 100.0)),
        DetectionRegion::new(6, Roi::new(40.0, 40.0, 20.0, 20.0)),
    ];
    assert_eq!(first_containing_region(&regions, glam::Vec2::new(50.0, 50.0)), Some(0));
    assert_eq!(first_containing_region(&regions[1..], glam::Vec2::new(50.0, 50.0)), Some(0));
    assert_eq!(first_containing_region(&regions, glam::Vec2::new(150.0, 50.0)), None);
}

#[test]
fn test_vote_matrix_uses_region_positions() {
    // ids are not contiguous and not in order
    let prev_regions = vec![
        DetectionRegion::new(42, Roi::new(0.0, 0.0, 100.0, 100.0)),
        DetectionRegion::new(7, Roi::new(100.0, 0.0, 100.0, 100.0)),
    ];
    let curr_regions = vec![
        DetectionRegion::new(13, Roi::new(100.0, 0.0, 100.0, 100.0)),
        DetectionRegion::new(99, Roi::new(0.0, 0.0, 100.0, 100.0)),
    ];
    let prev = frame(
        vec![
            Keypoint::new(10.0, 10.0),
            Keypoint::new(20.0, 10.0),
            Keypoint::new(110.0, 10.0),
            Keypoint::new(120.0, 10.0),
            Keypoint::new(130.0, 10.0),
        ],
        prev_regions,
    );
    let curr = frame(
        vec![
            Keypoint::new(15.0, 10.0),
            Keypoint::new(25.0, 10.0),
            Keypoint::new(115.0, 10.0),
            Keypoint::new(125.0, 10.0),
            Keypoint::new(135.0, 10.0),
        ],
        curr_regions,
    );
    let (votes, _) = build_vote_matrix(&correspondences(5), &prev, &curr);
    assert_eq!(votes.shape(), (2, 2));
    assert_eq!(votes[(0, 1)], 2);
    assert_eq!(votes[(1, 0)], 3);

    let matches = match_regions(&correspondences(5), &prev, &curr);
    assert_eq!(matches.get(&42), Some(&99));
    assert_eq!(matches.get(&7), Some(&13));
}

#[test]
fn test_two_previous_regions_may_share_a_current_region() {
    let prev = frame(
        vec![
            Keypoint::new(10.0, 10.0),
            Keypoint::new(10.0, 10.0),
            Keypoint::new(110.0, 10.0),
            Keypoint::new(110.0, 10.0),
        ],
        three_regions(),
    );
    let curr = frame(vec![Keypoint::new(250.0, 10.0); 4], three_regions());
    let matches = match_regions(&correspondences(4), &prev, &curr);
    assert_eq!(matches.get(&0), Some(&2));
    assert_eq!(matches.get(&1), Some(&2));
    assert!(matches.get(&2).is_none());
}

#[test]
fn test_empty_current_regions() {
    let prev = frame(vec![Keypoint::new(10.0, 10.0); 3], three_regions());
    let curr = frame(vec![Keypoint::new(10.0, 10.0); 3], Vec::new());
    let (matches, stats) = match_regions_with_stats(&correspondences(3), &prev, &curr, 1);
    assert!(matches.is_empty());
    assert_eq!(stats.unresolved_curr, 3);
}
