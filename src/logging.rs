//! Logging setup for the `taco` binary.
//!
//! The terminal belongs to the viewer while it runs, so logs only go to
//! stderr in `--print` mode. Otherwise they go to a log file, or nowhere.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Level;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stderr,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub target: LogTarget,
}

impl LogConfig {
    /// 0 is info, 1 is debug, 2 and more is trace.
    pub fn from_verbosity(verbosity: u8, target: LogTarget) -> Self {
        let level = match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self { level, target }
    }
}

/// `RUST_LOG` wins over the verbosity flag.
pub fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str().to_lowercase();
        EnvFilter::new(format!("warn,taco_table={level},taco={level}"))
    })
}

pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    match &config.target {
        LogTarget::Off => {}
        LogTarget::Stderr => init_logging_with_writer(config.level, io::stderr, true),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            init_logging_with_writer(config.level, Mutex::new(file), false);
        }
    }
    Ok(())
}

fn init_logging_with_writer<W>(level: Level, writer: W, with_ansi: bool)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(with_ansi)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_env_filter(level))
        .with(layer)
        .with(ErrorLayer::default())
        .init();
}
