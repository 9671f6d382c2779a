use acbledger::{config::Config, Compiler};
use anyhow::Context;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;

    let summary = Compiler::run(&config).with_context(|| {
        format!(
            "building {} ledger from {}",
            config.asset,
            config.ir_directory.display()
        )
    })?;

    tracing::info!(
        transactions = summary.transactions,
        rows = summary.rows,
        "done"
    );
    Ok(())
}
