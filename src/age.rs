use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::event::{LineupPlayer, MatchInfo, PlayerId};

pub const DEFAULT_AGE: u32 = 25;

/// Ages are taken at the season's first recorded match date.
pub fn season_reference_date(matches: &[MatchInfo]) -> Option<NaiveDate> {
    matches.iter().filter_map(|m| m.match_date).min()
}

/// Whole years between `birth` and `on`; `None` when `on` precedes `birth`.
pub fn age_on(birth: NaiveDate, on: NaiveDate) -> Option<u32> {
    let mut years = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

pub fn birth_dates(lineups: &[LineupPlayer]) -> HashMap<PlayerId, NaiveDate> {
    let mut out = HashMap::new();
    for p in lineups {
        if let Some(birth) = p.birth_date {
            out.entry(p.player_id).or_insert(birth);
        }
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct AgeTable {
    reference: Option<NaiveDate>,
    births: HashMap<PlayerId, NaiveDate>,
    default_age: u32,
}

impl AgeTable {
    pub fn new(matches: &[MatchInfo], lineups: &[LineupPlayer], default_age: u32) -> Self {
        Self {
            reference: season_reference_date(matches),
            births: birth_dates(lineups),
            default_age,
        }
    }

    pub fn age_of(&self, player_id: PlayerId) -> u32 {
        let Some(reference) = self.reference else {
            return self.default_age;
        };
        self.births
            .get(&player_id)
            .and_then(|birth| age_on(*birth, reference))
            .unwrap_or(self.default_age)
    }
}
