use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use xscout::config::PipelineConfig;
use xscout::event::MatchId;
use xscout::minutes::{match_durations, participations, player_names};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let match_id =
        parse_match_arg().ok_or_else(|| anyhow!("usage: match_minutes --match <id>"))?;
    let cfg = PipelineConfig::load()?;
    let source = cfg.open_source();
    let events = source
        .match_events(match_id)
        .with_context(|| format!("fetch events for match {match_id}"))?;
    if events.is_empty() {
        return Err(anyhow!("match {match_id} has no events"));
    }

    let duration = match_durations(&events)
        .get(&match_id)
        .copied()
        .unwrap_or_default();
    let names = player_names(&events);
    let mut rows = participations(&events);
    rows.sort_by(|a, b| b.minutes.cmp(&a.minutes).then(a.player_id.cmp(&b.player_id)));

    let fixture = source
        .list_matches(cfg.competition_id, cfg.season_id)
        .ok()
        .and_then(|matches| matches.into_iter().find(|m| m.match_id == match_id))
        .map(|m| format!(" ({} vs {})", m.home_team, m.away_team))
        .unwrap_or_default();

    println!(
        "Match {match_id}{fixture}: {} events, duration {duration}'",
        events.len()
    );
    for row in rows {
        let name = names.get(&row.player_id).map(String::as_str).unwrap_or("?");
        println!("{:>4}'  {:>8}  {}", row.minutes, row.player_id, name);
    }
    Ok(())
}

fn parse_match_arg() -> Option<MatchId> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix("--match=") {
            return raw.trim().parse().ok();
        }
        if arg == "--match"
            && let Some(next) = args.get(idx + 1)
        {
            return next.trim().parse().ok();
        }
    }
    None
}
