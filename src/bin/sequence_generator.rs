use clap::{Parser, Subcommand};
use std::path::Path;
use ttc_fusion::calibration::CalibrationSet;
use ttc_fusion::config::FusionConfig;
use ttc_fusion::data_loader::save_sequence;
use ttc_fusion::io::{calibration_from_json, object_to_json};
use ttc_fusion::synthetic::{SceneConfig, generate_sequence};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic approaching-vehicle sequence
    Generate {
        /// Output directory
        #[arg(short, long)]
        output: String,

        /// Calibration JSON, KITTI values if omitted
        #[arg(short, long)]
        calib: Option<String>,

        /// Number of frames to generate
        #[arg(short, long, default_value = "10")]
        num_frames: usize,

        /// Lead vehicle distance in the first frame (m)
        #[arg(long, default_value = "15.0")]
        distance: f64,

        /// Closing speed (m/s)
        #[arg(long, default_value = "5.0")]
        speed: f64,

        /// Frame rate (Hz)
        #[arg(long, default_value = "10.0")]
        frame_rate: f64,

        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Generate {
            output,
            calib,
            num_frames,
            distance,
            speed,
            frame_rate,
            seed,
        } => {
            let calib = match calib {
                Some(p) => calibration_from_json(p)?,
                None => CalibrationSet::default(),
            };
            let scene = SceneConfig {
                num_frames,
                frame_rate_hz: frame_rate,
                initial_distance: distance,
                closing_speed: speed,
                seed,
                ..Default::default()
            };
            generate(&output, &scene, &calib)?;
        }
    }

    Ok(())
}

fn generate(
    output_dir: &str,
    scene: &SceneConfig,
    calib: &CalibrationSet,
) -> Result<(), Box<dyn std::error::Error>> {
    let frames = generate_sequence(scene, calib);
    save_sequence(output_dir, &frames)?;

    let config = FusionConfig {
        frame_rate_hz: scene.frame_rate_hz,
        ..Default::default()
    };
    object_to_json(Path::new(output_dir).join("calibration.json"), calib)?;
    object_to_json(Path::new(output_dir).join("config.json"), &config)?;
    object_to_json(Path::new(output_dir).join("scene.json"), scene)?;

    println!("Generated {} frames in {}", frames.len(), output_dir);
    Ok(())
}
