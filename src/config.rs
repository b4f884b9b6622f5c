use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::Level;

use crate::constants::DEFAULT_DEBOUNCE;

/// Environment variable that overrides the default data directory.
pub const HOME_ENV: &str = "OVERLAY_SHELL_HOME";

const APP_DIR: &str = "overlay-shell";
const FALLBACK_DIR: &str = ".overlay-shell";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "overlay-shell",
    version = env!("CARGO_PKG_VERSION"),
    about = "Floating windows and widgets whose layout survives restarts"
)]
pub struct Cli {
    /// Where the layout and window content files live.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Delay before continuous changes (moves, resizes, edits) are saved.
    #[arg(
        long = "debounce-ms",
        value_name = "MS",
        default_value_t = DEFAULT_DEBOUNCE.as_millis() as u64
    )]
    pub debounce_ms: u64,

    #[arg(long = "log-level", value_name = "LEVEL", default_value_t = Level::INFO)]
    pub log_level: Level,

    /// Append logs to this file instead of stderr.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Frame ticks per second. Drag commits are coalesced to one per frame.
    #[arg(short = 'f', long = "fps", value_name = "FPS", default_value_t = 60.0)]
    pub fps: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    pub data_dir: PathBuf,
    pub debounce: Duration,
    pub log_level: Level,
    pub log_file: Option<PathBuf>,
    pub frame_budget: Duration,
}

impl TryFrom<&Cli> for ShellConfig {
    type Error = String;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        if cli.debounce_ms > 10_000 {
            return Err("debounce must be between 0 and 10000 ms".to_string());
        }
        if !(1.0..=240.0).contains(&cli.fps) {
            return Err("fps must be between 1 and 240".to_string());
        }
        Ok(Self {
            data_dir: cli
                .data_dir
                .clone()
                .unwrap_or_else(|| default_data_dir(env::var_os(HOME_ENV).map(PathBuf::from))),
            debounce: Duration::from_millis(cli.debounce_ms),
            log_level: cli.log_level,
            log_file: cli.log_file.clone(),
            frame_budget: Duration::from_secs_f64(1.0 / cli.fps),
        })
    }
}

/// `override_dir`, else the platform data directory, else a dot directory
/// under the working directory.
pub fn default_data_dir(override_dir: Option<PathBuf>) -> PathBuf {
    override_dir
        .filter(|dir| !dir.as_os_str().is_empty())
        .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR))
}
