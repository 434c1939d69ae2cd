// touchminer entry point.
// Single-threaded runtime: requests are issued strictly one after another.

use anyhow::Result;
use touchminer::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.execute().await
}
