/// Application-level constants
pub const APP_NAME: &str = "CampusMed";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default school backend API root. Every endpoint path is relative to this.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Environment variable overriding the backend API root.
pub const API_URL_ENV: &str = "CAMPUSMED_API_URL";

/// Per-request timeout for backend calls, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "warn,campusmed_lib=info"
}

/// Resolve the backend API root: environment override, else the default.
/// Trailing slashes are trimmed so endpoint paths can always start with `/`.
pub fn api_base_url() -> String {
    std::env::var(API_URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_url_has_no_trailing_slash() {
        assert!(!api_base_url().ends_with('/'));
    }

    #[test]
    fn app_name_is_campusmed() {
        assert_eq!(APP_NAME, "CampusMed");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn log_filter_scopes_crate_to_info() {
        assert!(default_log_filter().contains("campusmed_lib=info"));
    }
}
