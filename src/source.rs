use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::event::{Event, LineupPlayer, MatchId, MatchInfo};
use crate::http_cache::fetch_json_cached;
use crate::http_client::http_client;
use crate::statsbomb::{parse_events_json, parse_lineups_json, parse_matches_json};

pub const OPEN_DATA_URL: &str = "https://raw.githubusercontent.com/statsbomb/open-data/master/data";

/// Capability boundary to the upstream event-data provider.
///
/// Every call may fail independently; callers decide which failures are fatal.
pub trait EventSource: Sync {
    fn list_matches(&self, competition_id: u32, season_id: u32) -> Result<Vec<MatchInfo>>;

    fn match_events(&self, match_id: MatchId) -> Result<Vec<Event>>;

    fn match_lineups(&self, _match_id: MatchId) -> Result<Vec<LineupPlayer>> {
        Ok(Vec::new())
    }

    fn describe(&self) -> String;
}

/// StatsBomb open data served over HTTP (GitHub raw by default).
pub struct OpenDataHttp {
    base_url: String,
}

impl OpenDataHttp {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    fn get(&self, path: &str) -> Result<String> {
        let client = http_client()?;
        let url = format!("{}/{}", self.base_url, path);
        fetch_json_cached(client, &url).with_context(|| format!("GET {url}"))
    }
}

impl Default for OpenDataHttp {
    fn default() -> Self {
        Self::new(OPEN_DATA_URL)
    }
}

impl EventSource for OpenDataHttp {
    fn list_matches(&self, competition_id: u32, season_id: u32) -> Result<Vec<MatchInfo>> {
        let body = self.get(&format!("matches/{competition_id}/{season_id}.json"))?;
        parse_matches_json(&body)
    }

    fn match_events(&self, match_id: MatchId) -> Result<Vec<Event>> {
        let body = self.get(&format!("events/{match_id}.json"))?;
        parse_events_json(match_id, &body)
    }

    fn match_lineups(&self, match_id: MatchId) -> Result<Vec<LineupPlayer>> {
        let body = self.get(&format!("lineups/{match_id}.json"))?;
        parse_lineups_json(&body)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// A local checkout of the open-data repository. `root` may point at the
/// checkout itself or at its `data/` directory.
pub struct OpenDataDir {
    data_dir: PathBuf,
}

impl OpenDataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let nested = root.join("data");
        let data_dir = if nested.join("matches").is_dir() {
            nested
        } else {
            root
        };
        Self { data_dir }
    }

    fn read(&self, relative: &str) -> Result<String> {
        let path = self.data_dir.join(relative);
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    }
}

impl EventSource for OpenDataDir {
    fn list_matches(&self, competition_id: u32, season_id: u32) -> Result<Vec<MatchInfo>> {
        let raw = self.read(&format!("matches/{competition_id}/{season_id}.json"))?;
        parse_matches_json(&raw)
    }

    fn match_events(&self, match_id: MatchId) -> Result<Vec<Event>> {
        let raw = self.read(&format!("events/{match_id}.json"))?;
        parse_events_json(match_id, &raw)
    }

    fn match_lineups(&self, match_id: MatchId) -> Result<Vec<LineupPlayer>> {
        let raw = self.read(&format!("lineups/{match_id}.json"))?;
        parse_lineups_json(&raw)
    }

    fn describe(&self) -> String {
        self.data_dir.display().to_string()
    }
}
