use std::io::BufWriter;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use weft_cli::cli::{Cli, init_tracing};
use weft_core::{WeftConfig, WeftError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Usage errors exit with 2 from inside clap.
    let cli = Cli::parse();
    init_tracing(cli.level());

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(kind) = e.downcast_ref::<WeftError>().map(WeftError::kind) {
                tracing::debug!("failure kind: {:?}", kind);
            }
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config =
        WeftConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut config);
    tracing::debug!("effective config: {:?}", config);

    let mut out = BufWriter::new(std::io::stdout().lock());
    weft_core::render(&cli.source, &config, &mut out)
        .await
        .with_context(|| format!("failed to render {}", cli.source.display()))?;

    tracing::info!("rendered {}", cli.source.display());
    Ok(())
}
