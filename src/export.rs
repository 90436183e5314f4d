use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::Serialize;

use crate::age::AgeTable;
use crate::event::PlayerId;
use crate::position::{FALLBACK_POSITION, Position};
use crate::rates::{Metric, RatedPlayer};

/// One row of the published dataset. Field order is the output schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub name: String,
    pub player_id: PlayerId,
    pub position: Position,
    pub age: u32,
    pub minutes_played: u32,
    pub shots_p90: f64,
    pub xg_p90: f64,
    pub shot_conversion: f64,
    pub prog_passes_p90: f64,
    pub pass_completion: f64,
    pub key_passes_p90: f64,
    pub dribbles_p90: f64,
    pub pressures_p90: f64,
    pub press_success: f64,
    pub aerial_win_rate: f64,
    pub distance_p90: f64,
}

impl PlayerRecord {
    pub fn score(&self, metric: Metric) -> f64 {
        match metric {
            Metric::ShotsP90 => self.shots_p90,
            Metric::XgP90 => self.xg_p90,
            Metric::ShotConversion => self.shot_conversion,
            Metric::ProgPassesP90 => self.prog_passes_p90,
            Metric::PassCompletion => self.pass_completion,
            Metric::KeyPassesP90 => self.key_passes_p90,
            Metric::DribblesP90 => self.dribbles_p90,
            Metric::PressuresP90 => self.pressures_p90,
            Metric::PressSuccess => self.press_success,
            Metric::AerialWinRate => self.aerial_win_rate,
            Metric::DistanceP90 => self.distance_p90,
        }
    }
}

/// Scores arrive already rounded to one decimal.
fn record_from(
    rated: &RatedPlayer,
    positions: &HashMap<PlayerId, Position>,
    ages: &AgeTable,
) -> PlayerRecord {
    let s = &rated.scores;
    let id = rated.stats.player_id;
    PlayerRecord {
        name: rated.stats.name.clone(),
        player_id: id,
        position: positions.get(&id).copied().unwrap_or(FALLBACK_POSITION),
        age: ages.age_of(id),
        minutes_played: rated.stats.minutes_played,
        shots_p90: s.get(Metric::ShotsP90),
        xg_p90: s.get(Metric::XgP90),
        shot_conversion: s.get(Metric::ShotConversion),
        prog_passes_p90: s.get(Metric::ProgPassesP90),
        pass_completion: s.get(Metric::PassCompletion),
        key_passes_p90: s.get(Metric::KeyPassesP90),
        dribbles_p90: s.get(Metric::DribblesP90),
        pressures_p90: s.get(Metric::PressuresP90),
        press_success: s.get(Metric::PressSuccess),
        aerial_win_rate: s.get(Metric::AerialWinRate),
        distance_p90: s.get(Metric::DistanceP90),
    }
}

/// Output rows sorted by name (player id breaks ties).
pub fn shape_records(
    rated: &[RatedPlayer],
    positions: &HashMap<PlayerId, Position>,
    ages: &AgeTable,
) -> Vec<PlayerRecord> {
    let mut records: Vec<PlayerRecord> = rated
        .iter()
        .map(|r| record_from(r, positions, ages))
        .collect();
    records.sort_by(|a, b| a.name.cmp(&b.name).then(a.player_id.cmp(&b.player_id)));
    records
}

pub fn records_to_json(records: &[PlayerRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).context("serialize player records")
}

pub fn write_json(path: &Path, records: &[PlayerRecord]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }
    let json = records_to_json(records)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

/// Workbook with the published scores and the raw per-90 values behind them.
pub fn write_xlsx(path: &Path, records: &[PlayerRecord], rated: &[RatedPlayer]) -> Result<()> {
    let mut workbook = Workbook::new();

    let mut header: Vec<String> = ["name", "player_id", "position", "age", "minutes_played"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(Metric::ALL.iter().map(|m| m.key().to_string()));

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Players")?;
        write_header(sheet, &header)?;
        for (idx, rec) in records.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet.write_string(row, 0, &rec.name)?;
            sheet.write_number(row, 1, rec.player_id as f64)?;
            sheet.write_string(row, 2, rec.position.code())?;
            sheet.write_number(row, 3, f64::from(rec.age))?;
            sheet.write_number(row, 4, f64::from(rec.minutes_played))?;
            write_metrics(sheet, row, 5, |m| rec.score(m))?;
        }
    }

    {
        let by_id: HashMap<PlayerId, &RatedPlayer> =
            rated.iter().map(|r| (r.stats.player_id, r)).collect();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Per90")?;
        write_header(sheet, &header)?;
        for (idx, rec) in records.iter().enumerate() {
            let Some(r) = by_id.get(&rec.player_id) else {
                continue;
            };
            let row = idx as u32 + 1;
            sheet.write_string(row, 0, &rec.name)?;
            sheet.write_number(row, 1, rec.player_id as f64)?;
            sheet.write_string(row, 2, rec.position.code())?;
            sheet.write_number(row, 3, f64::from(rec.age))?;
            sheet.write_number(row, 4, f64::from(rec.minutes_played))?;
            write_metrics(sheet, row, 5, |m| (r.per90.get(m) * 100.0).round() / 100.0)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn write_header(worksheet: &mut Worksheet, header: &[String]) -> Result<()> {
    for (col_idx, value) in header.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, value)
            .with_context(|| format!("write header cell {col_idx}"))?;
    }
    Ok(())
}

fn write_metrics(
    worksheet: &mut Worksheet,
    row: u32,
    first_col: u16,
    value: impl Fn(Metric) -> f64,
) -> Result<()> {
    for (offset, metric) in Metric::ALL.iter().enumerate() {
        let col = first_col + offset as u16;
        worksheet
            .write_number(row, col, value(*metric))
            .with_context(|| format!("write cell ({row},{col})"))?;
    }
    Ok(())
}
