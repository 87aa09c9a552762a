use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use ttc_fusion::calibration::CalibrationSet;
use ttc_fusion::config::FusionConfig;
use ttc_fusion::data_loader::load_sequence;
use ttc_fusion::io::{calibration_from_json, config_from_json, write_sequence_report, write_text_report};
use ttc_fusion::pipeline::FusionPipeline;

#[derive(Parser)]
#[command(version, about, author)]
struct TtcCli {
    /// path to sequence folder (frames/*.json)
    path: PathBuf,

    /// calibration json, defaults to <path>/calibration.json or KITTI values
    #[arg(long)]
    calib: Option<PathBuf>,

    /// fusion config json, defaults to <path>/config.json or built-in values
    #[arg(long)]
    config: Option<PathBuf>,

    /// output report
    #[arg(short, long, default_value = "ttc_report.json")]
    output: PathBuf,

    /// also write a plain-text summary next to the report
    #[arg(long)]
    text: bool,
}

fn explicit_or_in_folder(explicit: Option<PathBuf>, folder: &Path, name: &str) -> Option<PathBuf> {
    explicit.or_else(|| {
        let p = folder.join(name);
        p.exists().then_some(p)
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = TtcCli::parse();

    let calib = match explicit_or_in_folder(cli.calib, &cli.path, "calibration.json") {
        Some(p) => calibration_from_json(p)?,
        None => CalibrationSet::default(),
    };
    let config = match explicit_or_in_folder(cli.config, &cli.path, "config.json") {
        Some(p) => config_from_json(p)?,
        None => FusionConfig::default(),
    };

    let now = Instant::now();
    let frames = load_sequence(&cli.path)?;
    println!("loading {} frames took {:.6} sec", frames.len(), now.elapsed().as_secs_f64());

    let now = Instant::now();
    let num_frames = frames.len();
    let mut pipeline = FusionPipeline::new(config, &calib)?;
    let reports = pipeline.process_sequence(frames)?;
    let duration_sec = now.elapsed().as_secs_f64();
    println!("fusion took {:.6} sec", duration_sec);
    println!("avg: {} sec", duration_sec / num_frames as f64);

    for r in &reports {
        match r.min_ttc() {
            Some(ttc) => println!("{}: ttc {:.3} s", r.curr_time_ns, ttc),
            None => println!("{}: no approaching object", r.curr_time_ns),
        }
    }

    write_sequence_report(&cli.output, pipeline.config(), &reports)?;
    if cli.text {
        write_text_report(cli.output.with_extension("txt"), &reports)?;
    }
    Ok(())
}
