use anyhow::Result;
use tracing_subscriber::EnvFilter;

use xscout::config::PipelineConfig;
use xscout::pipeline::run_pipeline;

const MAX_ERRORS_SHOWN: usize = 8;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cfg = PipelineConfig::load()?;

    let source = cfg.open_source();
    let report = run_pipeline(source.as_ref(), &cfg)?;

    println!("xScout pipeline complete");
    println!(
        "Competition {} / season {}",
        cfg.competition_id, cfg.season_id
    );
    println!(
        "Matches: {}/{}",
        report.matches_ingested, report.matches_listed
    );
    println!("Events: {}", report.events);
    println!(
        "Players: {} tracked, {} qualified (>= {} min)",
        report.players_tracked, report.players_qualified, cfg.metrics.min_minutes
    );
    println!("Output: {}", cfg.output.display());
    if let Some(xlsx) = cfg.xlsx.as_ref() {
        println!("Workbook: {}", xlsx.display());
    }
    if !report.errors.is_empty() {
        println!("Errors: {}", report.errors.len());
        for err in report.errors.iter().take(MAX_ERRORS_SHOWN) {
            println!(" - {err}");
        }
    }

    Ok(())
}
