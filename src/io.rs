use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::calibration::CalibrationSet;
use crate::config::FusionConfig;
use crate::error::Result;
use crate::pipeline::FramePairReport;

/// Serializes an object to a JSON file.
pub fn object_to_json<T: Serialize>(output_path: impl AsRef<Path>, object: &T) -> Result<()> {
    let j = serde_json::to_string_pretty(object)?;
    std::fs::write(output_path, j)?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> Result<T> {
    let contents = std::fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn calibration_from_json(file_path: impl AsRef<Path>) -> Result<CalibrationSet> {
    let calib: CalibrationSet = object_from_json(file_path)?;
    calib.validate()?;
    Ok(calib)
}

pub fn config_from_json(file_path: impl AsRef<Path>) -> Result<FusionConfig> {
    let config: FusionConfig = object_from_json(file_path)?;
    config.validate()?;
    Ok(config)
}

#[derive(Serialize)]
struct SequenceReport<'a> {
    timestamp: String,
    config: &'a FusionConfig,
    frame_pairs: usize,
    min_ttc: Option<f64>,
    reports: &'a [FramePairReport],
}

/// Writes every frame-pair report of a sequence to a JSON file.
pub fn write_sequence_report(
    output_path: impl AsRef<Path>,
    config: &FusionConfig,
    reports: &[FramePairReport],
) -> Result<()> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let timestamp = now.format(&Rfc3339).unwrap_or_else(|_| now.to_string());
    let min_ttc = reports
        .iter()
        .filter_map(|r| r.min_ttc())
        .min_by(|a, b| a.total_cmp(b));
    let report = SequenceReport {
        timestamp,
        config,
        frame_pairs: reports.len(),
        min_ttc,
        reports,
    };
    object_to_json(output_path, &report)
}

/// Plain-text summary, one line per tracked object and frame pair.
pub fn write_text_report(output_path: impl AsRef<Path>, reports: &[FramePairReport]) -> Result<()> {
    let mut s = String::new();
    for r in reports {
        s += format!("frame {} -> {}:\n", r.prev_time_ns, r.curr_time_ns).as_str();
        for t in &r.ttc {
            let ttc = match t.estimate.ttc_seconds() {
                Some(v) if v.is_finite() => format!("{:.3} s", v),
                Some(_) => "inf".to_string(),
                None => "indeterminate".to_string(),
            };
            s += format!("    region {} -> {}: ttc {}\n", t.prev_id, t.curr_id, ttc).as_str();
        }
    }
    std::fs::write(output_path, s)?;
    Ok(())
}
