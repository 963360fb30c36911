//! Run options from the environment and command line

use planar_motion::error::{MotionError, Result};
use std::path::PathBuf;

const DEFAULT_SECONDS: f32 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SimOptions {
    /// Motion configuration file; defaults are used when absent
    pub config_path: Option<PathBuf>,
    /// Simulated time, seconds
    pub seconds: f32,
    /// Where to write the final motion snapshot
    pub snapshot_path: Option<PathBuf>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            seconds: DEFAULT_SECONDS,
            snapshot_path: None,
        }
    }
}

impl SimOptions {
    /// Environment first, then arguments
    ///
    /// `PLANAR_SECONDS` and `PLANAR_SNAPSHOT` set the run length and snapshot
    /// path; `--seconds <n>` and `--snapshot <path>` override them. The first
    /// positional argument is the configuration file.
    pub fn load() -> Result<Self> {
        let mut options = Self::default();

        if let Ok(seconds) = std::env::var("PLANAR_SECONDS") {
            options.seconds = parse_seconds(&seconds)?;
            log::info!("Run length from env: {}s", options.seconds);
        }
        if let Ok(path) = std::env::var("PLANAR_SNAPSHOT") {
            if !path.is_empty() {
                options.snapshot_path = Some(PathBuf::from(path));
            }
        }

        options.apply_args(std::env::args().skip(1))?;
        Ok(options)
    }

    pub fn apply_args<I>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seconds" => {
                    let value = args.next().ok_or_else(|| missing_value(&arg))?;
                    self.seconds = parse_seconds(&value)?;
                }
                "--snapshot" => {
                    let value = args.next().ok_or_else(|| missing_value(&arg))?;
                    self.snapshot_path = Some(PathBuf::from(value));
                }
                flag if flag.starts_with("--") => {
                    log::warn!("Ignoring unknown flag {}", flag);
                }
                _ if self.config_path.is_none() => {
                    self.config_path = Some(PathBuf::from(arg));
                }
                _ => log::warn!("Ignoring extra argument {}", arg),
            }
        }
        Ok(())
    }
}

fn parse_seconds(value: &str) -> Result<f32> {
    match value.parse::<f32>() {
        Ok(seconds) if seconds.is_finite() && seconds > 0.0 => Ok(seconds),
        _ => Err(MotionError::InvalidConfig(format!(
            "run length must be a positive number of seconds, got {:?}",
            value
        ))),
    }
}

fn missing_value(flag: &str) -> MotionError {
    MotionError::InvalidConfig(format!("{} needs a value", flag))
}
