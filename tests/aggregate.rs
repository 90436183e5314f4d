use std::fs;
use std::path::PathBuf;

use xscout::aggregate::{AggregateRules, RawCounts, aggregate_counts, aggregate_season};
use xscout::event::{
    DuelDetail, Event, EventKind, Location, PassDetail, PlayerId, PlayerRef, ShotDetail,
};
use xscout::minutes::estimate_minutes;
use xscout::statsbomb::parse_events_json;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures/open-data/data/events");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture_events() -> Vec<Event> {
    let mut events = parse_events_json(3001, &read_fixture("3001.json")).unwrap();
    events.extend(parse_events_json(3002, &read_fixture("3002.json")).unwrap());
    events
}

fn event(id: PlayerId, location: Option<Location>, kind: EventKind) -> Event {
    Event {
        match_id: 1,
        index: 1,
        minute: 10,
        player: Some(PlayerRef {
            id,
            name: format!("Player {id}"),
        }),
        position: None,
        location,
        kind,
    }
}

#[test]
fn fixture_counts_per_player() {
    let events = fixture_events();
    let counts = aggregate_counts(&events, &AggregateRules::default());

    let forward = &counts[&101];
    assert_eq!(forward.shots, 3);
    assert_eq!(forward.goals, 1);
    assert!((forward.total_xg - 0.6).abs() < 1e-9);
    assert_eq!(forward.total_passes, 1);
    assert_eq!(forward.progressive_passes, 1);
    assert_eq!(forward.key_passes, 1);
    assert_eq!(forward.dribbles, 1);

    let midfielder = &counts[&102];
    assert_eq!(midfielder.total_passes, 3);
    assert_eq!(midfielder.completed_passes, 2);
    assert_eq!(midfielder.progressive_passes, 1);
    assert_eq!(midfielder.pressures, 2);
    assert_eq!(midfielder.press_successes, 1);

    let back = &counts[&103];
    assert_eq!(back.aerial_total, 2);
    assert_eq!(back.aerial_wins, 1);
    assert!((back.carry_distance - 5.0).abs() < 1e-9);

    let keeper = &counts[&105];
    assert_eq!(keeper.total_passes, 2);
    assert_eq!(keeper.completed_passes, 2);
    assert_eq!(keeper.progressive_passes, 0);
}

#[test]
fn players_without_counted_events_get_zero_rows() {
    let events = fixture_events();
    let minutes = estimate_minutes(&events);
    let stats = aggregate_season(&events, &minutes, &AggregateRules::default());
    assert_eq!(stats.len(), minutes.len());

    let sub = stats.iter().find(|s| s.player_id == 104).unwrap();
    assert_eq!(sub.minutes_played, 30);
    assert_eq!(sub.name, "Diego Sub");
    assert_eq!(sub.counts, RawCounts::default());

    let forward = stats.iter().find(|s| s.player_id == 101).unwrap();
    assert_eq!(forward.minutes_played, 185);
}

#[test]
fn progressive_threshold_is_inclusive_and_configurable() {
    let pass_to = |x: f64| {
        EventKind::Pass(PassDetail {
            end_location: Some(Location::new(x, 40.0)),
            ..PassDetail::default()
        })
    };
    let events = vec![
        event(1, None, pass_to(80.0)),
        event(1, None, pass_to(79.9)),
        event(1, None, pass_to(60.0)),
    ];
    let default = aggregate_counts(&events, &AggregateRules::default());
    assert_eq!(default[&1].progressive_passes, 1);

    let looser = AggregateRules {
        progressive_pass_min_x: 60.0,
        ..AggregateRules::default()
    };
    assert_eq!(aggregate_counts(&events, &looser)[&1].progressive_passes, 3);
}

#[test]
fn unusable_xg_counts_as_zero() {
    let shot = |xg: Option<f64>| {
        EventKind::Shot(ShotDetail {
            outcome: Some("Saved".to_string()),
            xg,
        })
    };
    let events = vec![
        event(1, None, shot(Some(0.3))),
        event(1, None, shot(None)),
        event(1, None, shot(Some(f64::NAN))),
    ];
    let counts = aggregate_counts(&events, &AggregateRules::default());
    assert_eq!(counts[&1].shots, 3);
    assert!((counts[&1].total_xg - 0.3).abs() < 1e-9);
}

#[test]
fn duel_keywords_match_case_insensitively() {
    let duel = |duel_type: &str, outcome: Option<&str>| {
        EventKind::Duel(DuelDetail {
            duel_type: Some(duel_type.to_string()),
            outcome: outcome.map(str::to_string),
        })
    };
    let events = vec![
        event(1, None, duel("AERIAL Lost", Some("Success In Play"))),
        event(1, None, duel("Aerial Lost", Some("Lost Out"))),
        event(1, None, duel("Tackle", Some("Won"))),
    ];
    let counts = aggregate_counts(&events, &AggregateRules::default());
    assert_eq!(counts[&1].aerial_total, 2);
    assert_eq!(counts[&1].aerial_wins, 1);
}

#[test]
fn carry_needs_both_ends() {
    let carry = |end: Option<Location>| EventKind::Carry { end_location: end };
    let events = vec![
        event(1, Some(Location::new(0.0, 0.0)), carry(Some(Location::new(6.0, 8.0)))),
        event(1, None, carry(Some(Location::new(50.0, 50.0)))),
        event(1, Some(Location::new(10.0, 10.0)), carry(None)),
    ];
    let counts = aggregate_counts(&events, &AggregateRules::default());
    assert!((counts[&1].carry_distance - 10.0).abs() < 1e-9);
}

#[test]
fn incomplete_dribbles_are_ignored() {
    let dribble = |outcome: &str| EventKind::Dribble {
        outcome: Some(outcome.to_string()),
    };
    let events = vec![
        event(1, None, dribble("Incomplete")),
        event(2, None, dribble("Complete")),
    ];
    let counts = aggregate_counts(&events, &AggregateRules::default());
    assert!(!counts.contains_key(&1));
    assert_eq!(counts[&2].dribbles, 1);
}

#[test]
fn pass_with_both_assist_flags_is_one_key_pass() {
    let events = vec![event(
        1,
        None,
        EventKind::Pass(PassDetail {
            goal_assist: true,
            shot_assist: true,
            end_location: Some(Location::new(110.0, 40.0)),
            ..PassDetail::default()
        }),
    )];
    let counts = aggregate_counts(&events, &AggregateRules::default());
    assert_eq!(counts[&1].key_passes, 1);
    assert_eq!(counts[&1].total_passes, 1);
}

#[test]
fn pass_without_end_location_counts_but_is_not_progressive() {
    let events = vec![
        event(1, None, EventKind::Pass(PassDetail::default())),
        event(
            1,
            None,
            EventKind::Pass(PassDetail {
                outcome: Some("Incomplete".to_string()),
                ..PassDetail::default()
            }),
        ),
    ];
    let counts = aggregate_counts(&events, &AggregateRules::default());
    assert_eq!(counts[&1].total_passes, 2);
    assert_eq!(counts[&1].completed_passes, 1);
    assert_eq!(counts[&1].progressive_passes, 0);
}
