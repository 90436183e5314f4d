use anyhow::Result;
use tracing::info;

use crate::age::AgeTable;
use crate::aggregate::{AggregateRules, aggregate_season};
use crate::config::{MetricSettings, PipelineConfig};
use crate::export::{self, PlayerRecord};
use crate::ingest::{EventCollection, ingest_season};
use crate::minutes::estimate_minutes;
use crate::position::classify_all;
use crate::rates::{RatedPlayer, rate_players};
use crate::source::EventSource;

/// Everything the core hands to the exporter for one run.
#[derive(Debug, Clone)]
pub struct PlayerDataset {
    pub players_tracked: usize,
    pub rated: Vec<RatedPlayer>,
    pub records: Vec<PlayerRecord>,
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub matches_listed: usize,
    pub matches_ingested: usize,
    pub events: usize,
    pub players_tracked: usize,
    pub players_qualified: usize,
    pub records: Vec<PlayerRecord>,
    pub errors: Vec<String>,
}

/// Minutes, aggregation, rates, positions and shaping over an already
/// ingested collection. Pure: the same collection always yields the same
/// dataset.
pub fn build_dataset(collection: &EventCollection, settings: &MetricSettings) -> PlayerDataset {
    let events = &collection.events;

    let minutes = estimate_minutes(events);
    info!(players = minutes.len(), "tracked unique players");

    let rules = AggregateRules {
        progressive_pass_min_x: settings.progressive_pass_min_x,
        ..AggregateRules::default()
    };
    let stats = aggregate_season(events, &minutes, &rules);
    let players_tracked = stats.len();

    let rated = rate_players(stats, settings.min_minutes);
    let positions = classify_all(events);
    let ages = AgeTable::new(&collection.matches, &collection.lineups, settings.default_age);
    let records = export::shape_records(&rated, &positions, &ages);

    PlayerDataset {
        players_tracked,
        rated,
        records,
    }
}

pub fn run_pipeline(source: &dyn EventSource, cfg: &PipelineConfig) -> Result<PipelineReport> {
    let collection = ingest_season(source, cfg.competition_id, cfg.season_id, cfg.ingest)?;
    let dataset = build_dataset(&collection, &cfg.metrics);

    export::write_json(&cfg.output, &dataset.records)?;
    info!(
        players = dataset.records.len(),
        path = %cfg.output.display(),
        "exported players"
    );
    if let Some(xlsx) = cfg.xlsx.as_ref() {
        export::write_xlsx(xlsx, &dataset.records, &dataset.rated)?;
        info!(path = %xlsx.display(), "exported workbook");
    }

    Ok(PipelineReport {
        matches_listed: collection.matches.len(),
        matches_ingested: collection.ingested.len(),
        events: collection.events.len(),
        players_tracked: dataset.players_tracked,
        players_qualified: dataset.rated.len(),
        records: dataset.records,
        errors: collection.errors,
    })
}
