use star_desk::location::{Location, Route, STAR_SESSION_ID, TEAM_ID, ViewError, require_param};

#[test]
fn reads_star_session_id_from_query() {
    let loc = Location::parse("/star-assignment?star_session_id=s-100").expect("location");
    assert_eq!(loc.route(), Ok(Route::StarAssignment));
    assert_eq!(require_param(&loc, STAR_SESSION_ID).as_deref(), Ok("s-100"));
}

#[test]
fn missing_param_is_an_error_state() {
    let loc = Location::parse("/team-star-report/").expect("location");
    assert_eq!(loc.route(), Ok(Route::TeamStarReport));
    let err = require_param(&loc, TEAM_ID).unwrap_err();
    assert_eq!(err, ViewError::MissingParam("team_id".to_string()));
    assert_eq!(err.to_string(), "team_id is missing from the URL.");
}

#[test]
fn empty_param_counts_as_missing() {
    let loc = Location::parse("/star-assignment?star_session_id=").expect("location");
    assert!(require_param(&loc, STAR_SESSION_ID).is_err());
}

#[test]
fn decodes_query_values() {
    let loc = Location::parse("team-star-report?team_id=team%207&x=a+b").expect("location");
    assert_eq!(loc.param("team_id"), Some("team 7"));
    assert_eq!(loc.param("x"), Some("a b"));
}

#[test]
fn accepts_full_urls() {
    let loc = Location::parse("http://desk.local:3000/star-assignment?star_session_id=s-1")
        .expect("location");
    assert_eq!(loc.path, "/star-assignment");
    assert_eq!(loc.param(STAR_SESSION_ID), Some("s-1"));
}

#[test]
fn ball_collection_takes_team_from_path() {
    let loc = Location::parse("/ball-collection/team-9?team_id=other").expect("location");
    assert_eq!(loc.route(), Ok(Route::BallCollection));
    assert_eq!(loc.team_id().as_deref(), Ok("team-9"));

    let query_only = Location::parse("/ball-collection?team_id=team-3").expect("location");
    assert_eq!(query_only.team_id().as_deref(), Ok("team-3"));
}

#[test]
fn path_team_id_is_decoded_like_the_query() {
    let from_path = Location::parse("/ball-collection/team%207").expect("location");
    let from_query = Location::parse("/ball-collection?team_id=team%207").expect("location");
    assert_eq!(from_path.team_id().as_deref(), Ok("team 7"));
    assert_eq!(from_path.team_id(), from_query.team_id());
}

#[test]
fn unknown_route_is_rejected() {
    let loc = Location::parse("/settings").expect("location");
    assert!(matches!(loc.route(), Err(ViewError::UnknownRoute(_))));
}
