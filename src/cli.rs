use clap::Parser;
use std::path::PathBuf;

/// Labelled fish swimming around your terminal.
#[derive(Parser, Debug, Default)]
#[command(name = "fishtank", version, about)]
pub(crate) struct Cli {
    /// Settings file to use instead of the one in the data directory.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    /// Seed for placement and drift choices.
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Frame rate cap.
    #[arg(long, value_name = "FPS")]
    pub(crate) fps: Option<u32>,

    /// Fish label; repeat to stock the tank. Replaces the configured fish.
    #[arg(long = "fish", value_name = "NAME")]
    pub(crate) fish: Vec<String>,

    /// Run this many frames without a terminal and print a JSON report.
    #[arg(long, value_name = "FRAMES")]
    pub(crate) headless: Option<u64>,

    /// Where to write logs. Defaults to fishtank.log in the data directory.
    #[arg(long, value_name = "PATH")]
    pub(crate) log_file: Option<PathBuf>,
}
