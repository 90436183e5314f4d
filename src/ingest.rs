use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::event::{Event, LineupPlayer, MatchId, MatchInfo};
use crate::source::EventSource;

const PROGRESS_EVERY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub parallelism: usize,
    pub with_lineups: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            parallelism: 6,
            with_lineups: true,
        }
    }
}

/// The unified, read-only event snapshot every later stage works from.
#[derive(Debug, Clone, Default)]
pub struct EventCollection {
    pub matches: Vec<MatchInfo>,
    pub ingested: Vec<MatchId>,
    /// Ordered by `(match_id, index)`.
    pub events: Vec<Event>,
    pub lineups: Vec<LineupPlayer>,
    pub errors: Vec<String>,
}

impl EventCollection {
    pub fn from_events(mut events: Vec<Event>) -> Self {
        events.sort_by_key(|e| (e.match_id, e.index));
        let mut ingested: Vec<MatchId> = events.iter().map(|e| e.match_id).collect();
        ingested.dedup();
        Self {
            ingested,
            events,
            ..Self::default()
        }
    }
}

struct MatchFetch {
    match_id: MatchId,
    events: Result<Vec<Event>>,
    lineups: Option<Result<Vec<LineupPlayer>>>,
}

/// Lists the season's matches and pulls every match's events on a bounded
/// worker pool. A match whose events cannot be fetched is recorded in
/// `errors` and left out; only losing the whole source is fatal.
pub fn ingest_season(
    source: &dyn EventSource,
    competition_id: u32,
    season_id: u32,
    opts: IngestOptions,
) -> Result<EventCollection> {
    info!(
        competition_id,
        season_id,
        source = %source.describe(),
        "fetching matches"
    );
    let matches = source
        .list_matches(competition_id, season_id)
        .with_context(|| format!("list matches for {competition_id}/{season_id}"))?;
    if matches.is_empty() {
        return Err(anyhow!(
            "no matches found for competition {competition_id} season {season_id}"
        ));
    }
    info!(matches = matches.len(), "fetching events (this may take a few minutes)");

    let total = matches.len();
    let done = AtomicUsize::new(0);
    let mut fetched: Vec<MatchFetch> = with_fetch_pool(opts.parallelism, || {
        matches
            .par_iter()
            .map(|m| {
                let events = source.match_events(m.match_id);
                let lineups = opts.with_lineups.then(|| source.match_lineups(m.match_id));
                let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                if n % PROGRESS_EVERY == 0 {
                    info!("processed {n}/{total} matches");
                }
                MatchFetch {
                    match_id: m.match_id,
                    events,
                    lineups,
                }
            })
            .collect()
    });
    fetched.sort_by_key(|f| f.match_id);

    let mut collection = EventCollection {
        matches,
        ..EventCollection::default()
    };
    for fetch in fetched {
        match fetch.events {
            Ok(mut events) => {
                events.sort_by_key(|e| e.index);
                collection.events.extend(events);
                collection.ingested.push(fetch.match_id);
            }
            Err(err) => {
                warn!(match_id = fetch.match_id, "skipped match: {err:#}");
                collection
                    .errors
                    .push(format!("match {} skipped: {err:#}", fetch.match_id));
                continue;
            }
        }
        match fetch.lineups {
            Some(Ok(lineups)) => collection.lineups.extend(lineups),
            Some(Err(err)) => collection
                .errors
                .push(format!("match {} lineups unavailable: {err:#}", fetch.match_id)),
            None => {}
        }
    }

    if collection.events.is_empty() {
        return Err(anyhow!(
            "no events collected from {} matches ({} failed)",
            total,
            total - collection.ingested.len()
        ));
    }
    info!(
        events = collection.events.len(),
        matches = collection.ingested.len(),
        "total events collected"
    );
    Ok(collection)
}

fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.clamp(1, 32))
        .build()
    {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
