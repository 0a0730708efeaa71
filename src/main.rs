mod checker;
mod config;
mod diagnostics;
mod error;
mod ospf;
mod report;
mod routes;
mod sources;
mod state;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

use checker::{StateChecker, select_nodes};
use config::{CliArgs, Config, parse_log_level};
use diagnostics::TracingSink;
use error::AppError;
use report::Report;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Logs go to stderr so stdout carries only the report
    let level = parse_log_level(&args.log_level)?;
    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(level).into())
                .from_env_lossy(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = run(args).await {
        if let Some(app_error) = e.downcast_ref::<AppError>() {
            tracing::error!("{}", app_error.user_message());
        }
        return Err(e);
    }
    Ok(())
}

async fn run(args: CliArgs) -> Result<()> {
    let config = Config::from_args(args)?;
    tracing::info!(
        "network {}: {} ({}) -> {} ({})",
        config.network,
        config.src.env_type.section(),
        config.src.snapshot,
        config.dst.env_type.section(),
        config.dst.snapshot
    );

    let nodes = select_nodes(&config.node_params, config.node.as_deref())?;
    let checker = Arc::new(StateChecker::new(&config, Arc::new(TracingSink)));
    let all_results = checker.check_nodes(nodes).await?;

    let report = Report {
        src_env: config.src.env_type,
        dst_env: config.dst.env_type,
        all_results,
    };
    println!("{}", report.render(config.output)?);

    let failed = report.failed_nodes();
    if failed > 0 {
        anyhow::bail!("{} node(s) could not be checked", failed);
    }
    Ok(())
}
