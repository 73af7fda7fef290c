// ===============================
// src/config.rs
// ===============================
use std::env;

use chrono_tz::Tz;
use dotenvy::dotenv;
use thiserror::Error;

/// Report window selector. `Received` is the dashboard default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportMode {
    Received,
    Today,
    Yesterday,
    Tomorrow,
    Weekly,
    Monthly,
}

impl ReportMode {
    pub fn parse_one(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "received"  => Some(ReportMode::Received),
            "today"     => Some(ReportMode::Today),
            "yesterday" => Some(ReportMode::Yesterday),
            "tomorrow"  => Some(ReportMode::Tomorrow),
            "weekly"    => Some(ReportMode::Weekly),
            "monthly"   => Some(ReportMode::Monthly),
            _ => None,
        }
    }

    pub fn from_env(key: &str, default_mode: ReportMode) -> ReportMode {
        env::var(key)
            .ok()
            .and_then(|s| Self::parse_one(&s))
            .unwrap_or(default_mode)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportMode::Received  => "received",
            ReportMode::Today     => "today",
            ReportMode::Yesterday => "yesterday",
            ReportMode::Tomorrow  => "tomorrow",
            ReportMode::Weekly    => "weekly",
            ReportMode::Monthly   => "monthly",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API_URL is not set")]
    MissingApiUrl,
    #[error("CLAIM_SECRETS is not set or empty")]
    MissingSecrets,
    #[error("CLIENT_TIMEZONE {0:?} is not a known IANA timezone")]
    BadTimezone(String),
}

/// Paths to the three zone GeoJSON documents.
#[derive(Clone, Debug)]
pub struct ZonePaths {
    pub sdd: String,
    pub ndd_near: String,
    pub ndd_far: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    // upstream API
    pub api_url: String,
    pub claim_secrets: Vec<String>, // ordered bearer tokens
    pub page_limit: u32,
    /// Fixed UTC offset applied to both search bounds (e.g. "-04:00").
    pub request_utc_offset: String,

    // reference timezone for all row timestamps and date bucketing
    pub client_timezone: Tz,

    // presentation
    pub status_filter: Vec<String>,

    // cache / metrics
    pub cache_ttl_secs: u64,
    pub metrics_port: u16,

    // zone geometry sources
    pub zone_paths: ZonePaths,
}

pub fn load() -> Result<Config, ConfigError> {
    // Make sure .env is read (CLAIM_SECRETS, API_URL, ...)
    let _ = dotenv();

    let api_url = env::var("API_URL").map_err(|_| ConfigError::MissingApiUrl)?;

    // CLAIM_SECRETS=token1,token2,...
    let claim_secrets: Vec<String> = env::var("CLAIM_SECRETS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();
    if claim_secrets.is_empty() {
        return Err(ConfigError::MissingSecrets);
    }

    let tz_name = env::var("CLIENT_TIMEZONE").unwrap_or_else(|_| "America/Santiago".to_string());
    let client_timezone: Tz = tz_name
        .parse()
        .map_err(|_| ConfigError::BadTimezone(tz_name))?;

    let request_utc_offset =
        env::var("REQUEST_UTC_OFFSET").unwrap_or_else(|_| "-04:00".to_string());

    let page_limit = env::var("PAGE_LIMIT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000);

    // STATUS_FILTER=performer_lookup,performer_draft
    let status_filter: Vec<String> = env::var("STATUS_FILTER")
        .unwrap_or_else(|_| "performer_lookup".to_string())
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();

    let cache_ttl_secs = env::var("CACHE_TTL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3600);

    let metrics_port = env::var("METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9898);

    let zone_paths = ZonePaths {
        sdd: env::var("SDD_ZONE_FILE").unwrap_or_else(|_| "zones/sdd.json".to_string()),
        ndd_near: env::var("NDD_NEAR_ZONE_FILE")
            .unwrap_or_else(|_| "zones/ndd_near.json".to_string()),
        ndd_far: env::var("NDD_FAR_ZONE_FILE")
            .unwrap_or_else(|_| "zones/ndd_far.json".to_string()),
    };

    Ok(Config {
        api_url,
        claim_secrets,
        page_limit,
        request_utc_offset,
        client_timezone,
        status_filter,
        cache_ttl_secs,
        metrics_port,
        zone_paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parsing_is_case_insensitive() {
        assert_eq!(ReportMode::parse_one("Received"), Some(ReportMode::Received));
        assert_eq!(ReportMode::parse_one(" MONTHLY "), Some(ReportMode::Monthly));
        assert_eq!(ReportMode::parse_one("next_week"), None);
    }

    #[test]
    fn mode_round_trips_through_as_str() {
        for mode in [
            ReportMode::Received,
            ReportMode::Today,
            ReportMode::Yesterday,
            ReportMode::Tomorrow,
            ReportMode::Weekly,
            ReportMode::Monthly,
        ] {
            assert_eq!(ReportMode::parse_one(mode.as_str()), Some(mode));
        }
    }
}
