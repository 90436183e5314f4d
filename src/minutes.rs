use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::event::{Event, EventKind, MatchId, PlayerId, PlayerRef};

/// Minutes credited to one player across the whole dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerMinutes {
    pub player_id: PlayerId,
    pub name: String,
    pub minutes: u32,
}

/// One player's appearance in one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participation {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub minutes: u32,
}

#[derive(Debug, Default, Clone, Copy)]
struct SubWindow {
    off: Option<u32>,
    on: Option<u32>,
}

impl SubWindow {
    fn minutes(&self, duration: u32) -> u32 {
        // An "off" record wins over an "on" record for the same match.
        match (self.off, self.on) {
            (Some(off), _) => off,
            (None, Some(on)) => duration.saturating_sub(on),
            (None, None) => duration,
        }
    }
}

/// Match length approximated as the latest minute offset seen in the match.
/// Matches without events get no entry.
pub fn match_durations(events: &[Event]) -> BTreeMap<MatchId, u32> {
    let mut out: BTreeMap<MatchId, u32> = BTreeMap::new();
    for e in events {
        let slot = out.entry(e.match_id).or_insert(0);
        *slot = (*slot).max(e.minute);
    }
    out
}

/// Per (match, player) minutes, ordered by match then player.
///
/// Every player with an event in a match defaults to the full duration. A
/// substitution caps the outgoing player at the substitution minute and
/// credits the incoming player from that minute to the end. Incoming players
/// are seeded here even when they never act on the ball.
pub fn participations(events: &[Event]) -> Vec<Participation> {
    let durations = match_durations(events);
    let mut windows: BTreeMap<(MatchId, PlayerId), SubWindow> = BTreeMap::new();

    for e in events {
        if let Some(id) = e.player_id() {
            windows.entry((e.match_id, id)).or_default();
        }
    }

    for e in events {
        let EventKind::Substitution { replacement } = &e.kind else {
            continue;
        };
        if let Some(id) = e.player_id() {
            let window = windows.entry((e.match_id, id)).or_default();
            window.off = Some(window.off.map_or(e.minute, |m| m.min(e.minute)));
        }
        if let Some(incoming) = replacement {
            let window = windows.entry((e.match_id, incoming.id)).or_default();
            window.on = Some(window.on.map_or(e.minute, |m| m.min(e.minute)));
        }
    }

    windows
        .into_iter()
        .filter_map(|((match_id, player_id), window)| {
            let duration = *durations.get(&match_id)?;
            Some(Participation {
                match_id,
                player_id,
                minutes: window.minutes(duration),
            })
        })
        .collect()
}

/// Total minutes per player across all matches, keyed by player id.
pub fn estimate_minutes(events: &[Event]) -> BTreeMap<PlayerId, PlayerMinutes> {
    let names = player_names(events);
    let mut out: BTreeMap<PlayerId, PlayerMinutes> = BTreeMap::new();
    for p in participations(events) {
        out.entry(p.player_id)
            .or_insert_with(|| PlayerMinutes {
                player_id: p.player_id,
                name: names.get(&p.player_id).cloned().unwrap_or_default(),
                minutes: 0,
            })
            .minutes += p.minutes;
    }
    out
}

/// First display name seen for each player, including players who only
/// appear as a substitution replacement.
pub fn player_names(events: &[Event]) -> BTreeMap<PlayerId, String> {
    let mut names: BTreeMap<PlayerId, String> = BTreeMap::new();
    let mut remember = |player: &PlayerRef| {
        if let Entry::Vacant(slot) = names.entry(player.id) {
            slot.insert(player.name.clone());
        }
    };
    for e in events {
        if let Some(player) = &e.player {
            remember(player);
        }
        if let EventKind::Substitution {
            replacement: Some(incoming),
        } = &e.kind
        {
            remember(incoming);
        }
    }
    names
}
