//! Command line arguments.

use crate::config::{DEFAULT_CACHE_CAPACITY, DEFAULT_RESIZE_DELAY_MS, Settings};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "media-tagger", version, about = "Browse a folder of media and rate each file")]
pub struct Cli {
    /// Folder to open on startup
    pub folder: Option<PathBuf>,

    /// Quiet period after the last window resize before re-rendering
    #[arg(long, default_value_t = DEFAULT_RESIZE_DELAY_MS, value_parser = clap::value_parser!(u64).range(1..=2000))]
    pub resize_delay_ms: u64,

    /// Number of decoded media files kept in memory
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY, value_parser = parse_capacity)]
    pub cache_size: usize,

    /// Log filter (overrides RUST_LOG), e.g. "debug" or "media_tagger=trace"
    #[arg(long)]
    pub log_level: Option<String>,
}

fn parse_capacity(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("cache size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            initial_folder: self.folder.clone(),
            resize_delay: Duration::from_millis(self.resize_delay_ms),
            cache_capacity: self.cache_size,
        }
    }
}
