use tracing::info;

use crate::aggregate::PlayerSeasonStats;

/// Players at or above this many minutes are ranked (five full matches).
pub const DEFAULT_MIN_MINUTES: u32 = 450;

/// Score given to every player when a metric has no spread across the pool.
pub const FLAT_METRIC_SCORE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    ShotsP90,
    XgP90,
    ShotConversion,
    ProgPassesP90,
    PassCompletion,
    KeyPassesP90,
    DribblesP90,
    PressuresP90,
    PressSuccess,
    AerialWinRate,
    DistanceP90,
}

impl Metric {
    pub const ALL: [Metric; 11] = [
        Metric::ShotsP90,
        Metric::XgP90,
        Metric::ShotConversion,
        Metric::ProgPassesP90,
        Metric::PassCompletion,
        Metric::KeyPassesP90,
        Metric::DribblesP90,
        Metric::PressuresP90,
        Metric::PressSuccess,
        Metric::AerialWinRate,
        Metric::DistanceP90,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Metric::ShotsP90 => "shots_p90",
            Metric::XgP90 => "xg_p90",
            Metric::ShotConversion => "shot_conversion",
            Metric::ProgPassesP90 => "prog_passes_p90",
            Metric::PassCompletion => "pass_completion",
            Metric::KeyPassesP90 => "key_passes_p90",
            Metric::DribblesP90 => "dribbles_p90",
            Metric::PressuresP90 => "pressures_p90",
            Metric::PressSuccess => "press_success",
            Metric::AerialWinRate => "aerial_win_rate",
            Metric::DistanceP90 => "distance_p90",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// One value per [`Metric`], indexed by the metric.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricValues([f64; 11]);

impl MetricValues {
    pub fn get(&self, metric: Metric) -> f64 {
        self.0[metric.slot()]
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        self.0[metric.slot()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.iter().map(move |m| (*m, self.get(*m)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatedPlayer {
    pub stats: PlayerSeasonStats,
    /// Pre-normalization per-90 and percentage values.
    pub per90: MetricValues,
    /// 0-100 pool-relative scores, one decimal.
    pub scores: MetricValues,
}

pub fn qualify(stats: Vec<PlayerSeasonStats>, min_minutes: u32) -> Vec<PlayerSeasonStats> {
    stats
        .into_iter()
        .filter(|s| s.minutes_played >= min_minutes)
        .collect()
}

/// `success / attempts * 100`, or 0 when there were no attempts.
pub fn percentage(success: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        0.0
    } else {
        f64::from(success) / f64::from(attempts) * 100.0
    }
}

pub fn per90_values(stats: &PlayerSeasonStats) -> MetricValues {
    let factor = f64::from(stats.minutes_played) / 90.0;
    let per90 = |raw: f64| if factor > 0.0 { raw / factor } else { 0.0 };
    let c = &stats.counts;

    let mut out = MetricValues::default();
    out.set(Metric::ShotsP90, per90(f64::from(c.shots)));
    out.set(Metric::XgP90, per90(c.total_xg));
    out.set(Metric::ShotConversion, percentage(c.goals, c.shots));
    out.set(Metric::ProgPassesP90, per90(f64::from(c.progressive_passes)));
    out.set(
        Metric::PassCompletion,
        percentage(c.completed_passes, c.total_passes),
    );
    out.set(Metric::KeyPassesP90, per90(f64::from(c.key_passes)));
    out.set(Metric::DribblesP90, per90(f64::from(c.dribbles)));
    out.set(Metric::PressuresP90, per90(f64::from(c.pressures)));
    out.set(Metric::PressSuccess, percentage(c.press_successes, c.pressures));
    out.set(Metric::AerialWinRate, percentage(c.aerial_wins, c.aerial_total));
    out.set(Metric::DistanceP90, per90(c.carry_distance));
    out
}

/// One decimal, ties to even (0.25 -> 0.2, 0.75 -> 0.8).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Min-max scales a column onto 0-100, one decimal. A column without spread
/// maps every entry to [`FLAT_METRIC_SCORE`].
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    if max <= min {
        return vec![FLAT_METRIC_SCORE; values.len()];
    }
    let span = max - min;
    values
        .iter()
        .map(|v| round1((v - min) / span * 100.0).clamp(0.0, 100.0))
        .collect()
}

pub fn normalize(per90: &[MetricValues]) -> Vec<MetricValues> {
    let mut out = vec![MetricValues::default(); per90.len()];
    for metric in Metric::ALL {
        let column: Vec<f64> = per90.iter().map(|v| v.get(metric)).collect();
        for (row, scaled) in out.iter_mut().zip(min_max_scale(&column)) {
            row.set(metric, scaled);
        }
    }
    out
}

/// Qualification, per-90 conversion, then normalization over the qualifying
/// pool only. An empty pool yields an empty result.
pub fn rate_players(stats: Vec<PlayerSeasonStats>, min_minutes: u32) -> Vec<RatedPlayer> {
    let pool = qualify(stats, min_minutes);
    info!(
        qualifying = pool.len(),
        min_minutes, "players meet the minutes threshold"
    );
    let per90: Vec<MetricValues> = pool.iter().map(per90_values).collect();
    let scores = normalize(&per90);
    pool.into_iter()
        .zip(per90)
        .zip(scores)
        .map(|((stats, per90), scores)| RatedPlayer {
            stats,
            per90,
            scores,
        })
        .collect()
}
