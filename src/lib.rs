pub mod calibration;
pub mod clustering;
pub mod config;
pub mod data_loader;
pub mod error;
pub mod frame;
pub mod io;
pub mod matching;
pub mod pipeline;
pub mod projection;
pub mod synthetic;
pub mod ttc;
pub mod types;

pub use error::{FusionError, Result};
