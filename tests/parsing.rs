use std::fs;
use std::path::PathBuf;

use star_desk::api::{
    assignments_body_json, batch_create_url, find_session, parse_star_sessions_json,
    parse_team_members_json, star_sessions_url, stars_report_url, team_members_url,
};
use star_desk::config::ApiConfig;
use star_desk::gate::check_date_range;
use star_desk::state::StarAssignment;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn cfg() -> ApiConfig {
    ApiConfig {
        team_members_api: "http://members.local:8000".to_string(),
        star_tracking_api: "http://stars.local:8002/api".to_string(),
        ..ApiConfig::default()
    }
}

#[test]
fn parses_star_sessions_fixture() {
    let raw = read_fixture("star_sessions.json");
    let sessions = parse_star_sessions_json(&raw).expect("fixture should parse");
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[1].name, "Match Day");
    assert_eq!(sessions[1].session_date, "2026-10-20T18:30:00Z");
}

#[test]
fn finds_session_by_id() {
    let sessions = parse_star_sessions_json(&read_fixture("star_sessions.json")).expect("parse");
    let session = find_session(sessions.clone(), "s-100").expect("present");
    assert_eq!(session.team_id, "team-7");

    let err = find_session(sessions, "s-404").unwrap_err();
    assert_eq!(err.to_string(), "Star Session with ID s-404 not found.");
}

#[test]
fn parses_team_members_fixture() {
    let raw = read_fixture("team_members.json");
    let members = parse_team_members_json(&raw).expect("fixture should parse");
    assert_eq!(members.len(), 3);
    assert_eq!(members[0].email, "ada@example.com");
    assert!(members[2].email.is_empty());
}

#[test]
fn null_bodies_are_empty() {
    assert!(parse_star_sessions_json("null").expect("null should parse").is_empty());
    assert!(parse_team_members_json("null").expect("null should parse").is_empty());
}

#[test]
fn rejects_malformed_members() {
    assert!(parse_team_members_json(r#"[{"name": "no id"}]"#).is_err());
}

#[test]
fn builds_service_urls() {
    let cfg = cfg();
    assert_eq!(
        star_sessions_url(&cfg).expect("url").as_str(),
        "http://stars.local:8002/api/v1/star-sessions"
    );
    assert_eq!(
        team_members_url(&cfg, "team-7").expect("url").as_str(),
        "http://members.local:8000/v1/teams/team-7/members"
    );
    assert_eq!(
        batch_create_url(&cfg).expect("url").as_str(),
        "http://stars.local:8002/api/v1/star-assignments/batch-create"
    );
}

#[test]
fn report_url_carries_date_range() {
    let range = check_date_range("2026-10-01", "2026-10-31").expect("range");
    let url = stars_report_url(&cfg(), "team 7", &range).expect("url");
    assert_eq!(
        url.as_str(),
        "http://stars.local:8002/api/v1/teams/team%207/stars-report/download?start_date=2026-10-01&end_date=2026-10-31"
    );
}

#[test]
fn batch_body_lists_every_member() {
    let body = assignments_body_json(
        "s-100",
        &[
            StarAssignment {
                team_member_id: "m-1".to_string(),
                selected: true,
            },
            StarAssignment {
                team_member_id: "m-2".to_string(),
                selected: false,
            },
        ],
    )
    .expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&body).expect("json");
    assert_eq!(value["star_session_id"], "s-100");
    assert_eq!(value["assignments"][0]["team_member_id"], "m-1");
    assert_eq!(value["assignments"][0]["selected"], true);
    assert_eq!(value["assignments"][1]["selected"], false);
}
