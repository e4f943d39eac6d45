use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Response;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::gate::DateRange;
use crate::http_client::http_client;
use crate::state::{StarAssignment, StarSession, TeamMember};

/// A service answered with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("http {status}: {body}")]
pub struct FetchError {
    pub status: StatusCode,
    pub body: String,
}

#[derive(Debug, Serialize)]
struct BatchCreateBody<'a> {
    star_session_id: &'a str,
    assignments: &'a [StarAssignment],
}

pub fn star_sessions_url(cfg: &ApiConfig) -> Result<Url> {
    endpoint(&cfg.star_tracking_api, &["v1", "star-sessions"])
}

pub fn team_members_url(cfg: &ApiConfig, team_id: &str) -> Result<Url> {
    endpoint(&cfg.team_members_api, &["v1", "teams", team_id, "members"])
}

pub fn batch_create_url(cfg: &ApiConfig) -> Result<Url> {
    endpoint(
        &cfg.star_tracking_api,
        &["v1", "star-assignments", "batch-create"],
    )
}

pub fn stars_report_url(cfg: &ApiConfig, team_id: &str, range: &DateRange) -> Result<Url> {
    let mut url = endpoint(
        &cfg.star_tracking_api,
        &["v1", "teams", team_id, "stars-report", "download"],
    )?;
    url.query_pairs_mut()
        .append_pair("start_date", &range.start_param())
        .append_pair("end_date", &range.end_param());
    Ok(url)
}

fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("invalid base url {base}"))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("base url {base} cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub fn fetch_star_sessions(cfg: &ApiConfig) -> Result<Vec<StarSession>> {
    let client = http_client(cfg)?;
    let url = star_sessions_url(cfg)?;
    let resp = client
        .get(url)
        .header(ACCEPT, "application/json")
        .send()
        .context("request failed")?;
    let body = ok_body(resp).context("Failed to fetch star sessions.")?;
    parse_star_sessions_json(&body)
}

pub fn find_session(sessions: Vec<StarSession>, session_id: &str) -> Result<StarSession> {
    sessions
        .into_iter()
        .find(|s| s.id == session_id)
        .ok_or_else(|| anyhow!("Star Session with ID {session_id} not found."))
}

pub fn fetch_team_members(cfg: &ApiConfig, team_id: &str) -> Result<Vec<TeamMember>> {
    let client = http_client(cfg)?;
    let url = team_members_url(cfg, team_id)?;
    let resp = client
        .get(url)
        .header(ACCEPT, "application/json")
        .send()
        .context("request failed")?;
    let body = ok_body(resp).context("Failed to fetch team members.")?;
    parse_team_members_json(&body)
}

/// Returns the raw response body for the log console.
pub fn submit_assignments(
    cfg: &ApiConfig,
    session_id: &str,
    assignments: &[StarAssignment],
) -> Result<String> {
    let client = http_client(cfg)?;
    let url = batch_create_url(cfg)?;
    let body = assignments_body_json(session_id, assignments)?;
    let resp = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .context("request failed")?;
    ok_body(resp).context("Failed to submit star assignments.")
}

pub fn download_stars_report(cfg: &ApiConfig, team_id: &str, range: &DateRange) -> Result<String> {
    let client = http_client(cfg)?;
    let url = stars_report_url(cfg, team_id, range)?;
    let resp = client
        .get(url)
        .header(CONTENT_TYPE, "application/json")
        .send()
        .context("request failed")?;
    ok_body(resp).context("Failed to fetch team stars data.")
}

fn ok_body(resp: Response) -> Result<String> {
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(FetchError {
            status,
            body: body.trim().to_string(),
        }
        .into());
    }
    Ok(body)
}

pub fn parse_star_sessions_json(raw: &str) -> Result<Vec<StarSession>> {
    let sessions: Option<Vec<StarSession>> =
        serde_json::from_str(raw).context("invalid star sessions json")?;
    Ok(sessions.unwrap_or_default())
}

pub fn parse_team_members_json(raw: &str) -> Result<Vec<TeamMember>> {
    let members: Option<Vec<TeamMember>> =
        serde_json::from_str(raw).context("invalid team members json")?;
    Ok(members.unwrap_or_default())
}

pub fn assignments_body_json(session_id: &str, assignments: &[StarAssignment]) -> Result<String> {
    serde_json::to_string(&BatchCreateBody {
        star_session_id: session_id,
        assignments,
    })
    .context("serialize assignments")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> Response {
        let resp = http::Response::builder()
            .status(status)
            .body(body)
            .expect("valid response");
        Response::from(resp)
    }

    #[test]
    fn non_success_status_carries_status_and_body() {
        let err = ok_body(response(500, "boom\n")).unwrap_err();
        assert_eq!(err.to_string(), "http 500 Internal Server Error: boom");
        let fetch = err.downcast_ref::<FetchError>().expect("fetch error");
        assert_eq!(fetch.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(fetch.body, "boom");
    }

    #[test]
    fn success_status_returns_body_untouched() {
        let body = ok_body(response(200, "a,b\n1,2\n")).expect("ok body");
        assert_eq!(body, "a,b\n1,2\n");
    }
}
