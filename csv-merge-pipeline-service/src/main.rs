mod encoding;
mod merge;
mod pipeline;
mod reader;
mod store;

use csv_merge_service::dto::PipelineConfig;
use store::SaveOutcome;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(stage = %err.stage, "{}", err.msg);
            return;
        }
    };

    let start = std::time::Instant::now();
    let summary = pipeline::run(&config);
    for report in &summary.reports {
        info!("{}", report.to_json());
    }
    match summary.saved {
        Some(SaveOutcome::Inserted(id)) => info!(id, "Run stored a new payload"),
        Some(SaveOutcome::AlreadyExists) => info!("Run payload was already stored"),
        Some(SaveOutcome::NoData) => info!("Run produced no payload to store"),
        None => error!("Run payload could not be stored"),
    }
    info!(
        "Run completed in {:.4} secs",
        (std::time::Instant::now() - start).as_secs_f64()
    );
}
