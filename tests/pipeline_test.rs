use ttc_fusion::calibration::CalibrationSet;
use ttc_fusion::config::FusionConfig;
use ttc_fusion::frame::{DetectionRegion, Frame};
use ttc_fusion::pipeline::FusionPipeline;
use ttc_fusion::synthetic::{SceneConfig, generate_sequence};
use ttc_fusion::ttc::{IndeterminateReason, TtcEstimate};
use ttc_fusion::types::{Keypoint, KeypointCorrespondence, RangePoint, Roi};

#[test]
fn test_synthetic_sequence_ttc() {
    let calib = CalibrationSet::default();
    let scene = SceneConfig::default();
    let frames = generate_sequence(&scene, &calib);
    assert_eq!(frames.len(), scene.num_frames);

    let mut pipeline = FusionPipeline::new(FusionConfig::default(), &calib).unwrap();
    let reports = pipeline.process_sequence(frames).unwrap();
    assert_eq!(reports.len(), scene.num_frames - 1);

    for (k, report) in reports.iter().enumerate() {
        assert_eq!(report.matches.get(&0), Some(&0));
        assert_eq!(report.matches.get(&1), Some(&1));
        assert!(report.cluster_stats.assigned > 0);

        let lead = report.ttc.iter().find(|t| t.prev_id == 0).unwrap();
        let curr_distance =
            scene.initial_distance - scene.closing_speed * (k + 1) as f64 / scene.frame_rate_hz;
        let expected = curr_distance / scene.closing_speed;
        let ttc = lead.estimate.ttc_seconds().unwrap();
        assert!(
            (ttc - expected).abs() < expected * 0.15,
            "frame {}: ttc {} expected {}",
            k,
            ttc,
            expected
        );

        // the parked car is outside the ego lane, its lidar points are cropped away
        let parked = report.ttc.iter().find(|t| t.prev_id == 1).unwrap();
        assert_eq!(
            parked.estimate,
            TtcEstimate::Indeterminate {
                reason: IndeterminateReason::EmptyPrevious
            }
        );
    }
    let min_ttc = reports.last().unwrap().min_ttc().unwrap();
    assert!(min_ttc < reports[0].min_ttc().unwrap());
}

#[test]
fn test_first_frame_has_no_report() {
    let calib = CalibrationSet::pinhole(100.0, 50.0, 50.0);
    let mut pipeline = FusionPipeline::new(FusionConfig::default(), &calib).unwrap();
    assert!(pipeline.process(Frame::default()).unwrap().is_none());
    assert_eq!(pipeline.frames().len(), 1);
    assert!(pipeline.process(Frame::default()).unwrap().is_some());

    pipeline.reset();
    assert!(pipeline.process(Frame::default()).unwrap().is_none());
}

/// One region covering the whole 100 x 100 image, lidar points straight ahead
/// at `distances`, four keypoints inside the region.
fn simple_frame(time_ns: i64, distances: &[f64], with_matches: bool) -> Frame {
    let range_points = distances
        .iter()
        .map(|x| RangePoint::new(*x, 0.0, -1.2, 0.5))
        .collect();
    let kpt_matches = if with_matches {
        (0..4).map(|i| KeypointCorrespondence::new(i, i)).collect()
    } else {
        Vec::new()
    };
    Frame {
        time_ns,
        keypoints: vec![Keypoint::new(50.0, 50.0); 4],
        regions: vec![DetectionRegion::new(0, Roi::new(0.0, 0.0, 100.0, 200.0))],
        range_points,
        kpt_matches,
    }
}

#[test]
fn test_pipeline_reports_physical_inconsistency() {
    let calib = CalibrationSet::pinhole(100.0, 50.0, 50.0);
    let config = FusionConfig {
        crop: None,
        ..Default::default()
    };
    let mut pipeline = FusionPipeline::new(config, &calib).unwrap();
    let reports = pipeline
        .process_sequence([
            simple_frame(0, &[8.0, 9.0, 10.0], false),
            simple_frame(1, &[9.0, 10.0, 11.0], true),
            simple_frame(2, &[9.0, 10.0, 11.0], true),
            simple_frame(3, &[7.0, 8.0, 9.0], true),
        ])
        .unwrap();
    assert_eq!(reports.len(), 3);
    assert!(matches!(
        reports[0].ttc[0].estimate,
        TtcEstimate::NotApproaching { .. }
    ));
    assert_eq!(
        reports[1].ttc[0].estimate,
        TtcEstimate::Indeterminate {
            reason: IndeterminateReason::NoRelativeMotion
        }
    );
    let ttc = reports[2].ttc[0].estimate.ttc_seconds().unwrap();
    assert!((ttc - 7.0 / 20.0).abs() < 1e-9);
    assert_eq!(reports[0].min_ttc(), None);
}

#[test]
fn test_pipeline_rejects_bad_config() {
    let calib = CalibrationSet::default();
    let bad_shrink = FusionConfig {
        shrink_factor: 1.5,
        ..Default::default()
    };
    assert!(FusionPipeline::new(bad_shrink, &calib).is_err());

    let bad_rate = FusionConfig {
        frame_rate_hz: 0.0,
        ..Default::default()
    };
    assert!(FusionPipeline::new(bad_rate, &calib).is_err());
}
