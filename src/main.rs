mod app;
mod cli;
mod clock;
mod config;
mod error;
mod fish;
mod input;
mod logging;
mod motion;
mod render;
mod scheduler;
mod tank;


use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    app::run(cli::Cli::parse())
}
