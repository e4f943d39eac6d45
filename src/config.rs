use std::env;
use std::path::PathBuf;

pub const DEFAULT_TEAM_MEMBERS_API: &str = "http://192.168.100.21:8000";
pub const DEFAULT_STAR_TRACKING_API: &str = "http://192.168.100.21:8002";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the two services live and how long we wait on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub team_members_api: String,
    pub star_tracking_api: String,
    pub timeout_secs: u64,
    pub export_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            team_members_api: DEFAULT_TEAM_MEMBERS_API.to_string(),
            star_tracking_api: DEFAULT_STAR_TRACKING_API.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            export_dir: PathBuf::from("."),
        }
    }
}

impl ApiConfig {
    /// Reads `TEAM_MEMBERS_API`, `STAR_TRACKING_API`, `HTTP_TIMEOUT_SECS` and
    /// `STAR_DESK_EXPORT_DIR`. Call after the dotenv files are loaded.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let team_members_api = lookup("TEAM_MEMBERS_API")
            .and_then(|val| non_empty_base(&val))
            .unwrap_or(defaults.team_members_api);
        let star_tracking_api = lookup("STAR_TRACKING_API")
            .and_then(|val| non_empty_base(&val))
            .unwrap_or(defaults.star_tracking_api);
        let timeout_secs = lookup("HTTP_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(defaults.timeout_secs)
            .max(1);
        let export_dir = lookup("STAR_DESK_EXPORT_DIR")
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.export_dir);
        Self {
            team_members_api,
            star_tracking_api,
            timeout_secs,
            export_dir,
        }
    }
}

fn non_empty_base(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_defaults() {
        let cfg = ApiConfig::from_lookup(|_| None);
        assert_eq!(cfg, ApiConfig::default());
    }

    #[test]
    fn trims_base_urls_and_clamps_timeout() {
        let cfg = ApiConfig::from_lookup(|key| match key {
            "TEAM_MEMBERS_API" => Some("http://members.local/ ".to_string()),
            "STAR_TRACKING_API" => Some("  ".to_string()),
            "HTTP_TIMEOUT_SECS" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(cfg.team_members_api, "http://members.local");
        assert_eq!(cfg.star_tracking_api, DEFAULT_STAR_TRACKING_API);
        assert_eq!(cfg.timeout_secs, 1);
    }
}
