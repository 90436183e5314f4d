use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use xscout::aggregate::{AggregateRules, aggregate_counts};
use xscout::event::{EventKind, Location};
use xscout::minutes::estimate_minutes;
use xscout::statsbomb::{parse_events_json, parse_lineups_json, parse_matches_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("open-data");
    path.push("data");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_season_match_list_sorted() {
    let raw = read_fixture("matches/11/27.json");
    let matches = parse_matches_json(&raw).expect("fixture should parse");
    let ids: Vec<u64> = matches.iter().map(|m| m.match_id).collect();
    assert_eq!(ids, vec![3001, 3002, 3003]);
    assert_eq!(matches[0].home_team, "Home FC");
    assert_eq!(matches[0].away_team, "Visitors CF");
    assert_eq!(matches[0].match_date, NaiveDate::from_ymd_opt(2015, 8, 23));
}

#[test]
fn parses_event_fixture_into_typed_kinds() {
    let raw = read_fixture("events/3001.json");
    let events = parse_events_json(3001, &raw).expect("fixture should parse");
    assert_eq!(events.len(), 15);
    assert!(events.iter().all(|e| e.match_id == 3001));
    assert!(events.windows(2).all(|w| w[0].index < w[1].index));

    assert!(events[0].player.is_none());
    assert_eq!(events[0].kind, EventKind::Other("Half Start".to_string()));

    let EventKind::Shot(goal) = &events[8].kind else {
        panic!("expected shot at index 9");
    };
    assert!(goal.is_goal());
    assert_eq!(goal.xg, Some(0.5));

    let EventKind::Pass(incomplete) = &events[3].kind else {
        panic!("expected pass at index 4");
    };
    assert!(!incomplete.is_completed());
    assert_eq!(incomplete.end_location, Some(Location::new(60.0, 10.0)));

    let EventKind::Pass(key) = &events[7].kind else {
        panic!("expected pass at index 8");
    };
    assert!(key.is_key_pass());

    assert_eq!(
        events[5].kind,
        EventKind::Pressure { counterpress: true }
    );
    assert_eq!(events[6].kind, EventKind::Pressure { counterpress: false });
}

#[test]
fn substitution_carries_incoming_player() {
    let raw = read_fixture("events/3001.json");
    let events = parse_events_json(3001, &raw).expect("fixture should parse");
    let sub = events
        .iter()
        .find(|e| matches!(e.kind, EventKind::Substitution { .. }))
        .expect("fixture has a substitution");
    assert_eq!(sub.minute, 60);
    assert_eq!(sub.player_id(), Some(102));
    let EventKind::Substitution {
        replacement: Some(incoming),
    } = &sub.kind
    else {
        panic!("substitution should name the incoming player");
    };
    assert_eq!(incoming.id, 104);
    assert_eq!(incoming.name, "Diego Sub");
}

#[test]
fn non_array_location_becomes_none() {
    let raw = read_fixture("events/3001.json");
    let events = parse_events_json(3001, &raw).expect("fixture should parse");
    let last = events.last().expect("fixture is not empty");
    assert_eq!(last.index, 15);
    assert_eq!(last.location, None);
    assert_eq!(
        last.kind,
        EventKind::Carry {
            end_location: Some(Location::new(20.0, 20.0))
        }
    );
}

#[test]
fn missing_xg_stays_unknown() {
    let raw = read_fixture("events/3002.json");
    let events = parse_events_json(3002, &raw).expect("fixture should parse");
    let EventKind::Shot(shot) = &events[4].kind else {
        panic!("expected shot at index 5");
    };
    assert_eq!(shot.xg, None);
    assert_eq!(shot.outcome.as_deref(), Some("Off T"));
}

#[test]
fn lineups_flatten_both_teams() {
    let raw = read_fixture("lineups/3001.json");
    let players = parse_lineups_json(&raw).expect("fixture should parse");
    assert_eq!(players.len(), 5);
    let forward = players.iter().find(|p| p.player_id == 101).unwrap();
    assert_eq!(forward.birth_date, NaiveDate::from_ymd_opt(1988, 9, 1));
    let back = players.iter().find(|p| p.player_id == 103).unwrap();
    assert_eq!(back.birth_date, None);
    let sub = players.iter().find(|p| p.player_id == 104).unwrap();
    assert_eq!(sub.birth_date, None);
}

#[test]
fn empty_and_null_documents_parse_to_nothing() {
    assert!(parse_events_json(1, "").unwrap().is_empty());
    assert!(parse_events_json(1, "null").unwrap().is_empty());
    assert!(parse_matches_json("  null ").unwrap().is_empty());
    assert!(parse_lineups_json("").unwrap().is_empty());
}

#[test]
fn malformed_document_is_an_error() {
    assert!(parse_events_json(1, "{\"not\": \"a list\"}").is_err());
    assert!(parse_matches_json("[{\"match_id\": \"x\"}]").is_err());
}

#[test]
fn malformed_payload_keeps_participation_and_counts() {
    let raw = r#"[
        {"index":1,"minute":3,"type":{"name":"Pass"},"player":{"id":7,"name":"Passer"},
         "pass":{"goal_assist":1,"end_location":[85.0,20.0]}},
        {"index":2,"minute":88,"type":{"name":"Duel"},"player":{"id":8,"name":"Header"},
         "duel":{"type":"Aerial Lost","outcome":{"name":"Won"}}}
    ]"#;
    let events = parse_events_json(9, raw).expect("document should parse");
    assert_eq!(events.len(), 2);

    let minutes = estimate_minutes(&events);
    assert_eq!(minutes.get(&7).map(|m| m.minutes), Some(88));
    assert_eq!(minutes.get(&8).map(|m| m.minutes), Some(88));

    let counts = aggregate_counts(&events, &AggregateRules::default());
    assert_eq!(counts[&7].total_passes, 1);
    assert_eq!(counts[&7].progressive_passes, 1);
    assert_eq!(counts[&7].key_passes, 0);
    assert_eq!(counts[&8].aerial_total, 1);
    assert_eq!(counts[&8].aerial_wins, 1);
}
