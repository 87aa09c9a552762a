use serde::{Deserialize, Serialize};

use crate::types::{Keypoint, KeypointCorrespondence, RangePoint, Roi};

/// An object detection in one frame together with the lidar points that
/// project into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRegion {
    /// unique within its frame
    pub id: i32,
    pub roi: Roi,
    #[serde(default)]
    pub class_id: i32,
    #[serde(default)]
    pub confidence: f64,
    /// filled by clustering, empty until then
    #[serde(default)]
    pub range_points: Vec<RangePoint>,
}

impl DetectionRegion {
    pub fn new(id: i32, roi: Roi) -> DetectionRegion {
        DetectionRegion {
            id,
            roi,
            class_id: 0,
            confidence: 0.0,
            range_points: Vec::new(),
        }
    }
}

/// Everything observed during one sensor cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub time_ns: i64,
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
    #[serde(default)]
    pub regions: Vec<DetectionRegion>,
    #[serde(default)]
    pub range_points: Vec<RangePoint>,
    /// matches from the previous frame's keypoints into this frame's keypoints
    #[serde(default)]
    pub kpt_matches: Vec<KeypointCorrespondence>,
}

impl Frame {
    pub fn region(&self, id: i32) -> Option<&DetectionRegion> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Returns true if two regions share an id.
    pub fn has_duplicate_region_ids(&self) -> bool {
        let mut ids: Vec<_> = self.regions.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.windows(2).any(|w| w[0] == w[1])
    }
}

/// Holds the previous and the current frame, nothing older.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    prev: Option<Frame>,
    curr: Option<Frame>,
}

impl FrameBuffer {
    pub fn new() -> FrameBuffer {
        FrameBuffer::default()
    }

    /// Pushes a new frame, retiring the oldest one.
    pub fn push(&mut self, frame: Frame) {
        self.prev = self.curr.take();
        self.curr = Some(frame);
    }

    pub fn len(&self) -> usize {
        self.prev.is_some() as usize + self.curr.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.curr.is_none()
    }

    pub fn current(&self) -> Option<&Frame> {
        self.curr.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Frame> {
        self.curr.as_mut()
    }

    pub fn previous(&self) -> Option<&Frame> {
        self.prev.as_ref()
    }

    /// Both frames, once two have been pushed.
    pub fn pair(&self) -> Option<(&Frame, &Frame)> {
        match (&self.prev, &self.curr) {
            (Some(prev), Some(curr)) => Some((prev, curr)),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.prev = None;
        self.curr = None;
    }
}
