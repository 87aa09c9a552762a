use std::path::{Path, PathBuf};

use glob::glob;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;

use crate::error::{FusionError, Result};
use crate::frame::Frame;
use crate::io::{object_from_json, object_to_json};

/// Frame spacing used when neither the file nor its name carries a timestamp.
const DEFAULT_FRAME_INTERVAL_NS: i64 = 100_000_000;

/// Parses the timestamp from a file path.
///
/// Assumes the filename (without extension) is a timestamp in nanoseconds.
fn path_to_timestamp(path: &Path) -> Option<i64> {
    path.file_stem()?.to_str()?.parse().ok()
}

fn json_filter(rp: glob::GlobResult) -> Option<PathBuf> {
    match rp {
        Ok(p) if p.extension().is_some_and(|ext| ext == "json") => Some(p),
        Ok(_) => None,
        Err(e) => {
            log::warn!("skip unreadable path: {}", e);
            None
        }
    }
}

/// Loads a recorded sequence from `{root_folder}/frames/*.json`.
///
/// Files are parsed in parallel and returned in time order. A frame without
/// `time_ns` takes it from its file name, or from its position in the
/// sorted file list when the name is not a number.
pub fn load_sequence(root_folder: impl AsRef<Path>) -> Result<Vec<Frame>> {
    let root = root_folder.as_ref();
    let pattern = format!("{}/frames/*.json", root.display());
    let frame_paths = glob(&pattern)
        .map_err(|e| FusionError::InvalidConfig(format!("bad sequence path {}: {}", pattern, e)))?;
    let mut sorted_path: Vec<PathBuf> = frame_paths.filter_map(json_filter).collect();
    sorted_path.sort();
    if sorted_path.is_empty() {
        return Err(FusionError::EmptySequence(root.display().to_string()));
    }
    log::trace!("loading {} frames from {}", sorted_path.len(), root.display());

    let mut frames: Vec<Frame> = sorted_path
        .par_iter()
        .enumerate()
        .progress_count(sorted_path.len() as u64)
        .map(|(idx, path)| -> Result<Frame> {
            let mut frame: Frame = object_from_json(path)?;
            if frame.time_ns == 0 {
                frame.time_ns =
                    path_to_timestamp(path).unwrap_or(idx as i64 * DEFAULT_FRAME_INTERVAL_NS);
            }
            Ok(frame)
        })
        .collect::<Result<_>>()?;
    frames.sort_by_key(|f| f.time_ns);
    Ok(frames)
}

/// Writes frames as `{root_folder}/frames/{time_ns}.json`.
pub fn save_sequence(root_folder: impl AsRef<Path>, frames: &[Frame]) -> Result<()> {
    let frame_dir = root_folder.as_ref().join("frames");
    std::fs::create_dir_all(&frame_dir)?;
    frames.par_iter().try_for_each(|frame| {
        object_to_json(frame_dir.join(format!("{:019}.json", frame.time_ns)), frame)
    })
}
