use clap::Parser;

use model_viewer::{config::Cli, flow};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    flow::run(cli.into())
}
