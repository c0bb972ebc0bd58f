use clap::Parser;

use musify_bridge::runtime::{self, Cli};

fn main() -> anyhow::Result<()> {
    runtime::run(Cli::parse())
}
