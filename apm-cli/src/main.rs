//! APM CLI - run athlete workload and intensity transforms over exported data.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "apm-cli",
    version,
    about = "Athlete performance monitoring data toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: apm_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    apm_cmd::run(cli.command)
}
