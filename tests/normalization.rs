use std::collections::HashMap;

use xscout::age::AgeTable;
use xscout::aggregate::{PlayerSeasonStats, RawCounts};
use xscout::export::shape_records;
use xscout::rates::{
    FLAT_METRIC_SCORE, Metric, min_max_scale, per90_values, qualify, rate_players,
};

fn stats(id: u64, minutes: u32, counts: RawCounts) -> PlayerSeasonStats {
    PlayerSeasonStats {
        player_id: id,
        name: format!("Player {id}"),
        minutes_played: minutes,
        counts,
    }
}

fn shooter(id: u64, minutes: u32, shots: u32) -> PlayerSeasonStats {
    stats(
        id,
        minutes,
        RawCounts {
            shots,
            ..RawCounts::default()
        },
    )
}

#[test]
fn min_max_maps_extremes_to_bounds() {
    assert_eq!(min_max_scale(&[1.0, 2.0, 3.0]), vec![0.0, 50.0, 100.0]);
    assert_eq!(min_max_scale(&[3.0, 1.0]), vec![100.0, 0.0]);
}

#[test]
fn constant_column_scores_fifty() {
    assert_eq!(
        min_max_scale(&[7.5, 7.5, 7.5]),
        vec![FLAT_METRIC_SCORE; 3]
    );
}

#[test]
fn scaled_values_have_one_decimal() {
    let scaled = min_max_scale(&[0.0, 1.0, 3.0]);
    assert_eq!(scaled, vec![0.0, 33.3, 100.0]);
}

#[test]
fn per90_uses_minutes_over_ninety() {
    let s = shooter(1, 180, 6);
    assert_eq!(per90_values(&s).get(Metric::ShotsP90), 3.0);
}

#[test]
fn zero_attempts_give_zero_percentage() {
    let s = stats(1, 900, RawCounts::default());
    let v = per90_values(&s);
    assert_eq!(v.get(Metric::PassCompletion), 0.0);
    assert_eq!(v.get(Metric::ShotConversion), 0.0);
    assert_eq!(v.get(Metric::PressSuccess), 0.0);
    assert_eq!(v.get(Metric::AerialWinRate), 0.0);
}

#[test]
fn zero_minutes_give_zero_rates() {
    let s = shooter(1, 0, 4);
    assert_eq!(per90_values(&s).get(Metric::ShotsP90), 0.0);
}

#[test]
fn percentages_are_ratios_times_hundred() {
    let s = stats(
        1,
        900,
        RawCounts {
            total_passes: 40,
            completed_passes: 30,
            shots: 8,
            goals: 2,
            ..RawCounts::default()
        },
    );
    let v = per90_values(&s);
    assert_eq!(v.get(Metric::PassCompletion), 75.0);
    assert_eq!(v.get(Metric::ShotConversion), 25.0);
}

#[test]
fn threshold_is_inclusive() {
    let pool = qualify(
        vec![shooter(1, 449, 1), shooter(2, 450, 1), shooter(3, 900, 1)],
        450,
    );
    let ids: Vec<u64> = pool.iter().map(|s| s.player_id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn scores_are_relative_to_qualifying_pool_only() {
    // Player 9 would dominate shots_p90 but sits below the threshold.
    let rated = rate_players(
        vec![shooter(1, 900, 10), shooter(2, 900, 20), shooter(9, 90, 50)],
        450,
    );
    assert_eq!(rated.len(), 2);
    assert!(rated.iter().all(|r| r.stats.minutes_played >= 450));
    assert_eq!(rated[0].scores.get(Metric::ShotsP90), 0.0);
    assert_eq!(rated[1].scores.get(Metric::ShotsP90), 100.0);
    assert_eq!(rated[0].per90.get(Metric::ShotsP90), 1.0);
}

#[test]
fn every_score_is_within_bounds() {
    let pool: Vec<PlayerSeasonStats> = (1..=12)
        .map(|id| {
            stats(
                id,
                450 + (id as u32) * 37,
                RawCounts {
                    shots: (id as u32 * 7) % 11,
                    goals: (id as u32) % 3,
                    total_xg: id as f64 * 0.13,
                    total_passes: 100 + id as u32,
                    completed_passes: 60 + (id as u32 * 3) % 40,
                    pressures: 10 + id as u32,
                    press_successes: (id as u32) % 5,
                    carry_distance: id as f64 * 123.4,
                    ..RawCounts::default()
                },
            )
        })
        .collect();
    let rated = rate_players(pool, 450);
    assert_eq!(rated.len(), 12);
    for r in &rated {
        for (_, score) in r.scores.iter() {
            assert!((0.0..=100.0).contains(&score), "score {score} out of range");
        }
    }
    // No spread in aerial duels: everyone gets the flat score.
    assert!(
        rated
            .iter()
            .all(|r| r.scores.get(Metric::AerialWinRate) == FLAT_METRIC_SCORE)
    );
}

#[test]
fn empty_pool_rates_nobody() {
    assert!(rate_players(vec![shooter(1, 100, 3)], 450).is_empty());
    assert!(rate_players(Vec::new(), 0).is_empty());
}

fn with_xg(id: u64, total_xg: f64) -> PlayerSeasonStats {
    stats(
        id,
        900,
        RawCounts {
            total_xg,
            ..RawCounts::default()
        },
    )
}

#[test]
fn rated_xg_spread_maps_to_zero_fifty_hundred() {
    // 900 minutes: per-90 xG equals total / 10.
    let rated = rate_players(
        vec![with_xg(1, 10.0), with_xg(2, 20.0), with_xg(3, 30.0)],
        450,
    );
    let per90: Vec<f64> = rated.iter().map(|r| r.per90.get(Metric::XgP90)).collect();
    assert_eq!(per90, vec![1.0, 2.0, 3.0]);
    let scores: Vec<f64> = rated.iter().map(|r| r.scores.get(Metric::XgP90)).collect();
    assert_eq!(scores, vec![0.0, 50.0, 100.0]);
}

#[test]
fn identical_shot_rates_all_score_fifty() {
    let rated = rate_players(
        vec![shooter(1, 900, 10), shooter(2, 1800, 20), shooter(3, 450, 5)],
        450,
    );
    assert_eq!(rated.len(), 3);
    for r in &rated {
        assert_eq!(r.per90.get(Metric::ShotsP90), 1.0);
        assert_eq!(r.scores.get(Metric::ShotsP90), FLAT_METRIC_SCORE);
    }
}

#[test]
fn published_scores_round_half_to_even_once() {
    // shots_p90 of 0, 1 and 400: the middle player sits at exactly 0.25.
    let rated = rate_players(
        vec![shooter(1, 900, 0), shooter(2, 900, 10), shooter(3, 900, 4000)],
        450,
    );
    let records = shape_records(&rated, &HashMap::new(), &AgeTable::new(&[], &[], 25));
    let shots: Vec<f64> = records.iter().map(|r| r.shots_p90).collect();
    assert_eq!(shots, vec![0.0, 0.2, 100.0]);
    for (record, r) in records.iter().zip(&rated) {
        assert_eq!(record.player_id, r.stats.player_id);
        for (metric, score) in r.scores.iter() {
            assert_eq!(record.score(metric), score);
        }
    }
}
