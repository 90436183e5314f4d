use std::collections::{BTreeMap, HashMap};

use tracing::info;

use crate::event::{DuelDetail, Event, EventKind, PlayerId};
use crate::minutes::PlayerMinutes;

/// Pass end-locations at or beyond this x (0-120 pitch length) count as progressive.
pub const PROGRESSIVE_PASS_MIN_X: f64 = 80.0;

/// Substrings (case-insensitive) marking a duel as aerial.
pub const AERIAL_DUEL_KEYWORDS: &[&str] = &["aerial"];

/// Substrings (case-insensitive) marking a duel outcome as won.
pub const DUEL_WON_KEYWORDS: &[&str] = &["won", "success"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateRules {
    pub progressive_pass_min_x: f64,
    pub aerial_duel_keywords: &'static [&'static str],
    pub duel_won_keywords: &'static [&'static str],
}

impl Default for AggregateRules {
    fn default() -> Self {
        Self {
            progressive_pass_min_x: PROGRESSIVE_PASS_MIN_X,
            aerial_duel_keywords: AERIAL_DUEL_KEYWORDS,
            duel_won_keywords: DUEL_WON_KEYWORDS,
        }
    }
}

/// Season totals for one player. Zero means "no such events", never "unknown".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCounts {
    pub shots: u32,
    pub goals: u32,
    pub total_xg: f64,
    pub total_passes: u32,
    pub completed_passes: u32,
    pub progressive_passes: u32,
    pub key_passes: u32,
    pub dribbles: u32,
    pub pressures: u32,
    pub press_successes: u32,
    pub aerial_total: u32,
    pub aerial_wins: u32,
    pub carry_distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSeasonStats {
    pub player_id: PlayerId,
    pub name: String,
    pub minutes_played: u32,
    pub counts: RawCounts,
}

/// One pass over the events, accumulating every category per acting player.
pub fn aggregate_counts(events: &[Event], rules: &AggregateRules) -> HashMap<PlayerId, RawCounts> {
    let mut out: HashMap<PlayerId, RawCounts> = HashMap::new();
    for e in events {
        let Some(player_id) = e.player_id() else {
            continue;
        };
        match &e.kind {
            EventKind::Shot(shot) => {
                let c = out.entry(player_id).or_default();
                c.shots += 1;
                if shot.is_goal() {
                    c.goals += 1;
                }
                c.total_xg += shot.xg.filter(|v| v.is_finite()).unwrap_or(0.0);
            }
            EventKind::Pass(pass) => {
                let c = out.entry(player_id).or_default();
                c.total_passes += 1;
                if pass.is_completed() {
                    c.completed_passes += 1;
                }
                if pass
                    .end_location
                    .is_some_and(|end| end.x >= rules.progressive_pass_min_x)
                {
                    c.progressive_passes += 1;
                }
                if pass.is_key_pass() {
                    c.key_passes += 1;
                }
            }
            EventKind::Dribble { outcome } => {
                if outcome.as_deref() == Some("Complete") {
                    out.entry(player_id).or_default().dribbles += 1;
                }
            }
            EventKind::Pressure { counterpress } => {
                let c = out.entry(player_id).or_default();
                c.pressures += 1;
                if *counterpress {
                    c.press_successes += 1;
                }
            }
            EventKind::Duel(duel) => {
                if is_aerial(duel, rules) {
                    let c = out.entry(player_id).or_default();
                    c.aerial_total += 1;
                    if is_won(duel, rules) {
                        c.aerial_wins += 1;
                    }
                }
            }
            EventKind::Carry { end_location } => {
                // Carries without both ends are left out of the sum entirely.
                if let (Some(start), Some(end)) = (e.location, end_location) {
                    out.entry(player_id).or_default().carry_distance += start.distance_to(end);
                }
            }
            EventKind::Substitution { .. } | EventKind::Other(_) => {}
        }
    }
    out
}

fn contains_any(text: Option<&str>, keywords: &[&str]) -> bool {
    let Some(text) = text else {
        return false;
    };
    let lowered = text.to_lowercase();
    keywords.iter().any(|kw| lowered.contains(&kw.to_lowercase()))
}

fn is_aerial(duel: &DuelDetail, rules: &AggregateRules) -> bool {
    contains_any(duel.duel_type.as_deref(), rules.aerial_duel_keywords)
}

fn is_won(duel: &DuelDetail, rules: &AggregateRules) -> bool {
    contains_any(duel.outcome.as_deref(), rules.duel_won_keywords)
}

/// Left-joins counts onto the minutes table. Players without counted events
/// keep all-zero counters; the result is ordered by player id.
pub fn build_season_stats(
    minutes: &BTreeMap<PlayerId, PlayerMinutes>,
    mut counts: HashMap<PlayerId, RawCounts>,
) -> Vec<PlayerSeasonStats> {
    let rows: Vec<PlayerSeasonStats> = minutes
        .values()
        .map(|m| PlayerSeasonStats {
            player_id: m.player_id,
            name: m.name.clone(),
            minutes_played: m.minutes,
            counts: counts.remove(&m.player_id).unwrap_or_default(),
        })
        .collect();
    info!(players = rows.len(), "aggregated player metrics");
    rows
}

pub fn aggregate_season(
    events: &[Event],
    minutes: &BTreeMap<PlayerId, PlayerMinutes>,
    rules: &AggregateRules,
) -> Vec<PlayerSeasonStats> {
    build_season_stats(minutes, aggregate_counts(events, rules))
}
