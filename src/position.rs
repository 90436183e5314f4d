use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::event::{Event, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Position {
    FW,
    MF,
    DF,
    GK,
}

impl Position {
    pub fn code(self) -> &'static str {
        match self {
            Position::FW => "FW",
            Position::MF => "MF",
            Position::DF => "DF",
            Position::GK => "GK",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Checked top to bottom against the lower-cased position label; first hit wins.
pub const POSITION_KEYWORDS: &[(Position, &[&str])] = &[
    (Position::FW, &["forward", "striker", "wing"]),
    (Position::MF, &["midfield", "midfielder"]),
    (Position::DF, &["back", "defender", "center back"]),
    (Position::GK, &["keeper", "goalkeeper"]),
];

pub const FALLBACK_POSITION: Position = Position::MF;

pub fn classify_label(label: &str) -> Position {
    let lowered = label.to_lowercase();
    POSITION_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(pos, _)| *pos)
        .unwrap_or(FALLBACK_POSITION)
}

/// Position labels in first-seen order with their counts.
#[derive(Debug, Default, Clone)]
struct LabelTally {
    labels: Vec<(String, usize)>,
}

impl LabelTally {
    fn add(&mut self, label: &str) {
        match self.labels.iter_mut().find(|(l, _)| l == label) {
            Some((_, n)) => *n += 1,
            None => self.labels.push((label.to_string(), 1)),
        }
    }

    /// Most frequent label; ties go to the label seen first.
    fn mode(&self) -> Option<&str> {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.labels {
            if best.is_none_or(|b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(label, _)| label.as_str())
    }
}

pub fn most_common_label(events: &[Event], player_id: PlayerId) -> Option<String> {
    let mut tally = LabelTally::default();
    for e in events.iter().filter(|e| e.player_id() == Some(player_id)) {
        if let Some(label) = e.position.as_deref() {
            tally.add(label);
        }
    }
    tally.mode().map(str::to_string)
}

/// Never fails: players without position data fall back to midfield.
pub fn classify_player(events: &[Event], player_id: PlayerId) -> Position {
    most_common_label(events, player_id)
        .map(|label| classify_label(&label))
        .unwrap_or(FALLBACK_POSITION)
}

/// Same rule as [`classify_player`], for every player in one pass.
pub fn classify_all(events: &[Event]) -> HashMap<PlayerId, Position> {
    let mut tallies: HashMap<PlayerId, LabelTally> = HashMap::new();
    for e in events {
        let (Some(id), Some(label)) = (e.player_id(), e.position.as_deref()) else {
            continue;
        };
        tallies.entry(id).or_default().add(label);
    }
    tallies
        .into_iter()
        .map(|(id, tally)| {
            let pos = tally.mode().map(classify_label).unwrap_or(FALLBACK_POSITION);
            (id, pos)
        })
        .collect()
}
