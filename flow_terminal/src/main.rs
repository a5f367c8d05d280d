use anyhow::Result;
use clap::Parser;
use flow_terminal::{app, cli::Cli, config::TerminalConfig, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = TerminalConfig::load(cli.config.as_deref())?;
    logging::init(&cfg.log)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    app::run(cli.command, cfg, &mut out).await
}
