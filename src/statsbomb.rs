use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::event::{
    DuelDetail, Event, EventKind, LineupPlayer, Location, MatchId, MatchInfo, PassDetail,
    PlayerRef, ShotDetail,
};

const UNREADABLE_TAG: &str = "Unknown";

pub fn parse_matches_json(raw: &str) -> Result<Vec<MatchInfo>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let parsed: Vec<RawMatch> = serde_json::from_str(trimmed).context("invalid matches json")?;
    let mut out: Vec<MatchInfo> = parsed
        .into_iter()
        .map(|m| MatchInfo {
            match_id: m.match_id,
            match_date: m.match_date.as_deref().and_then(parse_date),
            home_team: m.home_team.and_then(|t| t.home_team_name).unwrap_or_default(),
            away_team: m.away_team.and_then(|t| t.away_team_name).unwrap_or_default(),
        })
        .collect();
    out.sort_by_key(|m| m.match_id);
    out.dedup_by_key(|m| m.match_id);
    Ok(out)
}

/// Parses one match's event file.
///
/// Sub-fields with an unexpected shape fall back to "absent" without losing
/// the event. A record is dropped only when it is not an object or its
/// `type` has no usable name; a malformed top-level document is an error.
pub fn parse_events_json(match_id: MatchId, raw: &str) -> Result<Vec<Event>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let values: Vec<Value> = serde_json::from_str(trimmed).context("invalid events json")?;

    let mut events = Vec::with_capacity(values.len());
    let mut dropped = 0usize;
    for value in values {
        match serde_json::from_value::<RawEvent>(value)
            .ok()
            .and_then(|raw| raw.into_event(match_id))
        {
            Some(event) => events.push(event),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(match_id, dropped, "dropped event records without a usable type");
    }
    events.sort_by_key(|e| e.index);
    Ok(events)
}

pub fn parse_lineups_json(raw: &str) -> Result<Vec<LineupPlayer>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let teams: Vec<RawLineupTeam> =
        serde_json::from_str(trimmed).context("invalid lineups json")?;
    Ok(teams
        .into_iter()
        .flat_map(|team| team.lineup)
        .map(|p| LineupPlayer {
            player_id: p.player_id,
            birth_date: p.birth_date.as_deref().and_then(parse_date),
        })
        .collect())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    match_id: MatchId,
    #[serde(default, deserialize_with = "string_or_none")]
    match_date: Option<String>,
    #[serde(default, deserialize_with = "object_or_none")]
    home_team: Option<RawHomeTeam>,
    #[serde(default, deserialize_with = "object_or_none")]
    away_team: Option<RawAwayTeam>,
}

#[derive(Debug, Deserialize)]
struct RawHomeTeam {
    #[serde(default, deserialize_with = "string_or_none")]
    home_team_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAwayTeam {
    #[serde(default, deserialize_with = "string_or_none")]
    away_team_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLineupTeam {
    #[serde(default, deserialize_with = "vec_or_default")]
    lineup: Vec<RawLineupPlayer>,
}

#[derive(Debug, Deserialize)]
struct RawLineupPlayer {
    player_id: u64,
    #[serde(default, deserialize_with = "string_or_none")]
    birth_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default, deserialize_with = "u32_or_default")]
    index: u32,
    #[serde(default, deserialize_with = "u32_or_default")]
    minute: u32,
    #[serde(default, rename = "type", deserialize_with = "name_or_none")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "object_or_none")]
    player: Option<RawPlayer>,
    #[serde(default, deserialize_with = "name_or_none")]
    position: Option<String>,
    #[serde(default, deserialize_with = "location_or_none")]
    location: Option<Location>,
    #[serde(default, deserialize_with = "bool_or_none")]
    counterpress: Option<bool>,
    #[serde(default, deserialize_with = "object_or_none")]
    shot: Option<RawShot>,
    #[serde(default, deserialize_with = "object_or_none")]
    pass: Option<RawPass>,
    #[serde(default, deserialize_with = "object_or_none")]
    dribble: Option<RawOutcomeOnly>,
    #[serde(default, deserialize_with = "object_or_none")]
    duel: Option<RawDuel>,
    #[serde(default, deserialize_with = "object_or_none")]
    carry: Option<RawCarry>,
    #[serde(default, deserialize_with = "object_or_none")]
    substitution: Option<RawSubstitution>,
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    id: u64,
    #[serde(default, deserialize_with = "string_or_none")]
    name: Option<String>,
}

impl From<RawPlayer> for PlayerRef {
    fn from(raw: RawPlayer) -> Self {
        PlayerRef {
            id: raw.id,
            name: raw.name.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawShot {
    #[serde(default, deserialize_with = "float_or_none")]
    statsbomb_xg: Option<f64>,
    #[serde(default, deserialize_with = "name_or_none")]
    outcome: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPass {
    #[serde(default, deserialize_with = "failure_tag_or_unreadable")]
    outcome: Option<String>,
    #[serde(default, deserialize_with = "location_or_none")]
    end_location: Option<Location>,
    #[serde(default, deserialize_with = "bool_or_none")]
    goal_assist: Option<bool>,
    #[serde(default, deserialize_with = "bool_or_none")]
    shot_assist: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawOutcomeOnly {
    #[serde(default, deserialize_with = "name_or_none")]
    outcome: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDuel {
    #[serde(default, rename = "type", deserialize_with = "name_or_none")]
    duel_type: Option<String>,
    #[serde(default, deserialize_with = "name_or_none")]
    outcome: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCarry {
    #[serde(default, deserialize_with = "location_or_none")]
    end_location: Option<Location>,
}

#[derive(Debug, Deserialize)]
struct RawSubstitution {
    #[serde(default, deserialize_with = "object_or_none")]
    replacement: Option<RawPlayer>,
}

impl RawEvent {
    fn into_event(self, match_id: MatchId) -> Option<Event> {
        let type_name = self.kind?;
        let kind = match type_name.as_str() {
            "Shot" => {
                let (xg, outcome) = match self.shot {
                    Some(shot) => (shot.statsbomb_xg, shot.outcome),
                    None => (None, None),
                };
                EventKind::Shot(ShotDetail { outcome, xg })
            }
            "Pass" => match self.pass {
                Some(pass) => EventKind::Pass(PassDetail {
                    outcome: pass.outcome,
                    end_location: pass.end_location,
                    goal_assist: pass.goal_assist.unwrap_or(false),
                    shot_assist: pass.shot_assist.unwrap_or(false),
                }),
                None => EventKind::Pass(PassDetail::default()),
            },
            "Dribble" => EventKind::Dribble {
                outcome: self.dribble.and_then(|d| d.outcome),
            },
            "Pressure" => EventKind::Pressure {
                counterpress: self.counterpress.unwrap_or(false),
            },
            "Duel" => {
                let (duel_type, outcome) = match self.duel {
                    Some(duel) => (duel.duel_type, duel.outcome),
                    None => (None, None),
                };
                EventKind::Duel(DuelDetail { duel_type, outcome })
            }
            "Carry" => EventKind::Carry {
                end_location: self.carry.and_then(|c| c.end_location),
            },
            "Substitution" => EventKind::Substitution {
                replacement: self
                    .substitution
                    .and_then(|s| s.replacement)
                    .map(PlayerRef::from),
            },
            _ => EventKind::Other(type_name),
        };

        Some(Event {
            match_id,
            index: self.index,
            minute: self.minute,
            player: self.player.map(PlayerRef::from),
            position: self.position,
            location: self.location,
            kind,
        })
    }
}

fn clean_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `{"id": .., "name": "Goal"}` or a bare `"Goal"`; anything else is absent.
fn name_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => clean_name(&s),
        Value::Object(map) => map.get("name").and_then(Value::as_str).and_then(clean_name),
        _ => None,
    })
}

/// Pass failure tag. An absent or null tag means the pass was completed; a tag
/// that is present but unreadable counts as a failure.
fn failure_tag_or_unreadable<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(s) => Some(clean_name(&s).unwrap_or_else(|| UNREADABLE_TAG.to_string())),
        Value::Object(map) => Some(
            map.get("name")
                .and_then(Value::as_str)
                .and_then(clean_name)
                .unwrap_or_else(|| UNREADABLE_TAG.to_string()),
        ),
        _ => Some(UNREADABLE_TAG.to_string()),
    })
}

fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn bool_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool())
}

fn u32_or_default<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_default())
}

/// A nested payload that does not fit its struct is treated as absent.
fn object_or_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

fn location_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<Location>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(None);
    };
    if items.len() < 2 {
        return Ok(None);
    }
    match (items[0].as_f64(), items[1].as_f64()) {
        (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Ok(Some(Location::new(x, y))),
        _ => Ok(None),
    }
}

fn float_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => Ok(s.parse::<f64>().ok()),
        _ => Ok(None),
    }
}

fn vec_or_default<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    let value = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
