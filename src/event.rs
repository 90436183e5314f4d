use chrono::NaiveDate;

pub type MatchId = u64;
pub type PlayerId = u64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Location) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRef {
    pub id: PlayerId,
    pub name: String,
}

/// One observed action in a match. Never mutated after ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub match_id: MatchId,
    pub index: u32,
    pub minute: u32,
    pub player: Option<PlayerRef>,
    pub position: Option<String>,
    pub location: Option<Location>,
    pub kind: EventKind,
}

impl Event {
    pub fn player_id(&self) -> Option<PlayerId> {
        self.player.as_ref().map(|p| p.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Shot(ShotDetail),
    Pass(PassDetail),
    Dribble { outcome: Option<String> },
    Pressure { counterpress: bool },
    Duel(DuelDetail),
    Carry { end_location: Option<Location> },
    Substitution { replacement: Option<PlayerRef> },
    Other(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShotDetail {
    pub outcome: Option<String>,
    pub xg: Option<f64>,
}

impl ShotDetail {
    pub fn is_goal(&self) -> bool {
        self.outcome.as_deref() == Some("Goal")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassDetail {
    /// Failure tag ("Incomplete", "Out", ...). `None` means the pass was completed.
    pub outcome: Option<String>,
    pub end_location: Option<Location>,
    pub goal_assist: bool,
    pub shot_assist: bool,
}

impl PassDetail {
    pub fn is_completed(&self) -> bool {
        self.outcome.is_none()
    }

    pub fn is_key_pass(&self) -> bool {
        self.goal_assist || self.shot_assist
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DuelDetail {
    pub duel_type: Option<String>,
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchInfo {
    pub match_id: MatchId,
    pub match_date: Option<NaiveDate>,
    pub home_team: String,
    pub away_team: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineupPlayer {
    pub player_id: PlayerId,
    pub birth_date: Option<NaiveDate>,
}
