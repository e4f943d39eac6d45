use percent_encoding::percent_decode_str;
use reqwest::Url;
use thiserror::Error;

pub const STAR_SESSION_ID: &str = "star_session_id";
pub const TEAM_ID: &str = "team_id";

const LOCAL_ORIGIN: &str = "http://localhost/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("{0} is missing from the URL.")]
    MissingParam(String),
    #[error("no view is mounted at {0}")]
    UnknownRoute(String),
    #[error("unreadable location {0:?}")]
    BadLocation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    StarAssignment,
    TeamStarReport,
    BallCollection,
}

/// Path and decoded query pairs of a browser-style location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
    segments: Vec<String>,
}

impl Location {
    /// Accepts `/path?query`, `path?query` or a full `http(s)://` URL.
    pub fn parse(raw: &str) -> Result<Self, ViewError> {
        let trimmed = raw.trim();
        let base = Url::parse(LOCAL_ORIGIN).map_err(|_| ViewError::BadLocation(raw.to_string()))?;
        let url = base
            .join(trimmed)
            .map_err(|_| ViewError::BadLocation(raw.to_string()))?;
        let query = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let segments = url
            .path_segments()
            .map(|segs| {
                segs.filter(|s| !s.is_empty())
                    .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            path: url.path().to_string(),
            query,
            segments,
        })
    }

    /// First non-empty value for `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Decoded, non-empty path segments.
    fn segments(&self) -> Vec<&str> {
        self.segments.iter().map(String::as_str).collect()
    }

    pub fn route(&self) -> Result<Route, ViewError> {
        match self.segments().as_slice() {
            ["star-assignment"] => Ok(Route::StarAssignment),
            ["team-star-report"] => Ok(Route::TeamStarReport),
            ["ball-collection"] | ["ball-collection", _] => Ok(Route::BallCollection),
            _ => Err(ViewError::UnknownRoute(self.path.clone())),
        }
    }

    /// Team id for the report views. The ball-collection route also takes it
    /// as a path segment, which wins over the query.
    pub fn team_id(&self) -> Result<String, ViewError> {
        if let ["ball-collection", id] = self.segments().as_slice() {
            return Ok((*id).to_string());
        }
        require_param(self, TEAM_ID)
    }
}

pub fn require_param(location: &Location, key: &str) -> Result<String, ViewError> {
    location
        .param(key)
        .map(str::to_string)
        .ok_or_else(|| ViewError::MissingParam(key.to_string()))
}

pub fn route_label(route: Route) -> &'static str {
    match route {
        Route::StarAssignment => "STAR ASSIGNMENT",
        Route::TeamStarReport => "TEAM STARS REPORT",
        Route::BallCollection => "BALL COLLECTION",
    }
}
