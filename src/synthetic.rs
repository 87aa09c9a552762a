use nalgebra as na;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationSet;
use crate::frame::{DetectionRegion, Frame};
use crate::projection::Projector;
use crate::types::{Keypoint, KeypointCorrespondence, RangePoint, Roi};

/// Road scene with a lead vehicle closing in and a parked vehicle in the next lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub num_frames: usize,
    pub frame_rate_hz: f64,
    /// lead vehicle distance in the first frame, meters
    pub initial_distance: f64,
    /// meters per second, positive when approaching
    pub closing_speed: f64,
    pub points_per_frame: usize,
    pub keypoints_per_object: usize,
    /// lidar range noise amplitude, meters
    pub range_noise: f64,
    /// fraction of lidar returns that land in front of the vehicle
    pub outlier_fraction: f64,
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            num_frames: 10,
            frame_rate_hz: 10.0,
            initial_distance: 15.0,
            closing_speed: 5.0,
            points_per_frame: 300,
            keypoints_per_object: 40,
            range_noise: 0.02,
            outlier_fraction: 0.02,
            seed: 0,
        }
    }
}

const VEHICLE_HALF_WIDTH: f64 = 0.9;
const VEHICLE_LENGTH: f64 = 4.0;
const VEHICLE_BOTTOM: f64 = -1.6;
const VEHICLE_TOP: f64 = -0.2;
const NEIGHBOR_LANE_Y: f64 = 3.5;
const NEIGHBOR_DISTANCE: f64 = 20.0;

struct SceneObject {
    id: i32,
    x: f64,
    y: f64,
}

impl SceneObject {
    /// Image rectangle around the projected 3D box, `None` if any corner is
    /// behind the camera.
    fn roi(&self, projector: &Projector) -> Option<Roi> {
        let mut min = na::Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = na::Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for dx in [0.0, VEHICLE_LENGTH] {
            for dy in [-VEHICLE_HALF_WIDTH, VEHICLE_HALF_WIDTH] {
                for z in [VEHICLE_BOTTOM, VEHICLE_TOP] {
                    let corner = RangePoint::new(self.x + dx, self.y + dy, z, 1.0);
                    let p = projector.project_one(&corner).ok()?;
                    min = min.inf(&p);
                    max = max.sup(&p);
                }
            }
        }
        Some(Roi::new(
            min.x.floor(),
            min.y.floor(),
            (max.x - min.x).ceil(),
            (max.y - min.y).ceil(),
        ))
    }
}

/// Generates a sequence of frames with lidar points, detections and keypoint
/// matches between consecutive frames.
pub fn generate_sequence(scene: &SceneConfig, calib: &CalibrationSet) -> Vec<Frame> {
    let projector = Projector::new(calib);
    let mut rng = ChaCha8Rng::seed_from_u64(scene.seed);
    let frame_interval_ns = (1e9 / scene.frame_rate_hz) as i64;

    // keypoints live on the rear faces, fixed in object coordinates
    let kpt_anchors: Vec<(f64, f64)> = (0..scene.keypoints_per_object)
        .map(|_| {
            (
                rng.random_range(-VEHICLE_HALF_WIDTH * 0.9..VEHICLE_HALF_WIDTH * 0.9),
                rng.random_range(VEHICLE_BOTTOM * 0.9..VEHICLE_TOP * 1.1),
            )
        })
        .collect();

    let mut frames = Vec::with_capacity(scene.num_frames);
    for k in 0..scene.num_frames {
        let lead_x = scene.initial_distance - scene.closing_speed * k as f64 / scene.frame_rate_hz;
        if lead_x <= 1.0 {
            break;
        }
        let objects = [
            SceneObject {
                id: 0,
                x: lead_x,
                y: 0.0,
            },
            SceneObject {
                id: 1,
                x: NEIGHBOR_DISTANCE,
                y: NEIGHBOR_LANE_Y,
            },
        ];

        let regions: Vec<DetectionRegion> = objects
            .iter()
            .filter_map(|obj| {
                let mut region = DetectionRegion::new(obj.id, obj.roi(&projector)?);
                region.class_id = 2;
                region.confidence = rng.random_range(0.6..0.99);
                Some(region)
            })
            .collect();

        let mut range_points = Vec::with_capacity(scene.points_per_frame);
        for _ in 0..scene.points_per_frame {
            let obj = &objects[rng.random_range(0..objects.len())];
            let mut x = obj.x + rng.random_range(-scene.range_noise..=scene.range_noise);
            if rng.random_bool(scene.outlier_fraction.clamp(0.0, 1.0)) {
                x -= rng.random_range(0.5..1.5);
            }
            range_points.push(RangePoint::new(
                x,
                obj.y + rng.random_range(-VEHICLE_HALF_WIDTH * 0.95..VEHICLE_HALF_WIDTH * 0.95),
                rng.random_range(-1.5..-0.9),
                rng.random_range(0.2..1.0),
            ));
        }

        let mut keypoints = Vec::new();
        for obj in &objects {
            for (dy, z) in &kpt_anchors {
                let p3d = RangePoint::new(obj.x, obj.y + dy, *z, 1.0);
                let kpt = match projector.project_one(&p3d) {
                    Ok(p) => Keypoint::new(
                        (p.x + rng.random_range(-0.5..0.5)) as f32,
                        (p.y + rng.random_range(-0.5..0.5)) as f32,
                    ),
                    Err(_) => Keypoint::new(-1.0, -1.0),
                };
                keypoints.push(kpt);
            }
        }

        let kpt_matches = if k == 0 {
            Vec::new()
        } else {
            (0..keypoints.len())
                .map(|i| KeypointCorrespondence {
                    prev_idx: i,
                    curr_idx: i,
                    distance: rng.random_range(0.0..64.0),
                })
                .collect()
        };

        frames.push(Frame {
            time_ns: (k as i64 + 1) * frame_interval_ns,
            keypoints,
            regions,
            range_points,
            kpt_matches,
        });
    }
    frames
}
