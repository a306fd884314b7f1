use anyhow::Context;
use strata_config::StrataConfig;
use strata_engine::Orchestrator;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            StrataConfig::load(&path).with_context(|| format!("loading config '{path}'"))?
        }
        None => StrataConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level)
                .with_context(|| format!("invalid log_level '{}'", config.log_level))?,
        )
        .init();

    let summary = Orchestrator::new(config.source_items, config.rounds, config.consumers)
        .run()
        .context("run failed")?;

    tracing::info!(
        entries = summary.entries.len(),
        consumers = summary.consumers.len(),
        "run complete"
    );
    Ok(())
}
