use std::time::Duration;

use url::Url;

use crate::{
    app_constants::{
        BACKEND_READY_POLL_INTERVAL_MAX_MS, BACKEND_READY_POLL_INTERVAL_MIN_MS,
        DEFAULT_BACKEND_READY_HTTP_PATH, DEFAULT_BACKEND_READY_POLL_INTERVAL_MS,
        DEFAULT_GRACEFUL_STOP_TIMEOUT_MS, DEFAULT_READINESS_DELAY_MS, DEV_BACKEND_TIMEOUT_MS,
        GRACEFUL_STOP_TIMEOUT_MAX_MS, GRACEFUL_STOP_TIMEOUT_MIN_MS, PACKAGED_BACKEND_TIMEOUT_MS,
    },
    startup_mode::DesktopMode,
};

pub fn normalize_backend_url(raw: &str, default_url: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default_url.to_string();
    }

    match Url::parse(trimmed) {
        Ok(mut parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            if !parsed.path().ends_with('/') {
                let path = format!("{}/", parsed.path());
                parsed.set_path(&path);
            }
            parsed.to_string()
        }
        _ => default_url.to_string(),
    }
}

pub fn parse_ms(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
}

pub fn parse_clamped_ms(raw: Option<&str>, default_ms: u64, min_ms: u64, max_ms: u64) -> Duration {
    let value = parse_ms(raw).unwrap_or(default_ms).clamp(min_ms, max_ms);
    Duration::from_millis(value)
}

/// `0` or an unparseable value selects the mode-specific default deadline.
pub fn resolve_backend_timeout(raw: Option<&str>, mode: DesktopMode) -> Duration {
    let default_ms = if mode.is_packaged() {
        PACKAGED_BACKEND_TIMEOUT_MS
    } else {
        DEV_BACKEND_TIMEOUT_MS
    };
    match parse_ms(raw) {
        Some(value) if value > 0 => Duration::from_millis(value),
        _ => Duration::from_millis(default_ms),
    }
}

pub fn resolve_ready_poll_interval(raw: Option<&str>) -> Duration {
    parse_clamped_ms(
        raw,
        DEFAULT_BACKEND_READY_POLL_INTERVAL_MS,
        BACKEND_READY_POLL_INTERVAL_MIN_MS,
        BACKEND_READY_POLL_INTERVAL_MAX_MS,
    )
}

pub fn resolve_readiness_delay(raw: Option<&str>) -> Duration {
    Duration::from_millis(parse_ms(raw).unwrap_or(DEFAULT_READINESS_DELAY_MS))
}

pub fn resolve_graceful_stop_timeout(raw: Option<&str>) -> Duration {
    parse_clamped_ms(
        raw,
        DEFAULT_GRACEFUL_STOP_TIMEOUT_MS,
        GRACEFUL_STOP_TIMEOUT_MIN_MS,
        GRACEFUL_STOP_TIMEOUT_MAX_MS,
    )
}

pub fn normalize_ready_http_path(raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return DEFAULT_BACKEND_READY_HTTP_PATH.to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

pub fn backend_port(backend_url: &str) -> Option<u16> {
    Url::parse(backend_url)
        .ok()
        .and_then(|parsed| parsed.port_or_known_default())
}
