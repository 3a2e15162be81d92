//! TWX CLI - explore regional tourism, bed capacity and weather series.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "twx-cli",
    version,
    about = "Regional tourism and weather exploration toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: twx_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let output = twx_cmd::run(cli.command).await?;
    println!("{}", output);
    Ok(())
}
