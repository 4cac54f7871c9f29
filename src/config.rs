//! Build-time configuration.
//!
//! The WASM bundle has no process environment, so values are baked in by
//! `option_env!` when Trunk compiles the crate. The dev-server port lives in
//! `Trunk.toml`.

use log::warn;
use thiserror::Error;
use url::Url;

/// Backend used when `BUSINESS_GRAPH_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Request timeout used when `BUSINESS_GRAPH_TIMEOUT_MS` is unset.
pub const DEFAULT_TIMEOUT_MS: u32 = 10_000;

/// A build-time value that can't be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
	/// Raw value and the parser's complaint.
	#[error("invalid API base URL `{0}`: {1}")]
	InvalidUrl(String, String),
	/// Parsed, but not http(s).
	#[error("API base URL `{0}` must use http or https")]
	UnsupportedScheme(String),
	/// Not a positive integer.
	#[error("invalid request timeout `{0}`: expected a positive number of milliseconds")]
	InvalidTimeout(String),
}

/// Resolved client configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
	/// Backend root, always without a trailing slash.
	pub api_base_url: Url,
	/// Per-request budget, covering the body read.
	pub request_timeout_ms: u32,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base_url: parse_base_url(DEFAULT_API_URL).expect("default URL is valid"),
			request_timeout_ms: DEFAULT_TIMEOUT_MS,
		}
	}
}

impl AppConfig {
	/// Builds a config from raw values; `None` selects the default.
	pub fn from_values(base_url: Option<&str>, timeout_ms: Option<&str>) -> Result<Self, ConfigError> {
		let defaults = Self::default();
		let api_base_url = match base_url.map(str::trim).filter(|s| !s.is_empty()) {
			Some(raw) => parse_base_url(raw)?,
			None => defaults.api_base_url,
		};
		let request_timeout_ms = match timeout_ms.map(str::trim).filter(|s| !s.is_empty()) {
			Some(raw) => match raw.parse::<u32>() {
				Ok(ms) if ms > 0 => ms,
				_ => return Err(ConfigError::InvalidTimeout(raw.to_string())),
			},
			None => defaults.request_timeout_ms,
		};
		Ok(Self {
			api_base_url,
			request_timeout_ms,
		})
	}

	/// Reads the values captured at build time, falling back field by field.
	pub fn from_build_env() -> Self {
		let base_url = option_env!("BUSINESS_GRAPH_API_URL");
		let timeout_ms = option_env!("BUSINESS_GRAPH_TIMEOUT_MS");

		let mut config = Self::default();
		match Self::from_values(base_url, None) {
			Ok(c) => config.api_base_url = c.api_base_url,
			Err(e) => warn!("{e}; using {DEFAULT_API_URL}"),
		}
		match Self::from_values(None, timeout_ms) {
			Ok(c) => config.request_timeout_ms = c.request_timeout_ms,
			Err(e) => warn!("{e}; using {DEFAULT_TIMEOUT_MS}ms"),
		}
		config
	}
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
	let trimmed = raw.trim_end_matches('/');
	let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))?;
	match url.scheme() {
		"http" | "https" => Ok(url),
		_ => Err(ConfigError::UnsupportedScheme(raw.to_string())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_when_unset() {
		let config = AppConfig::from_values(None, None).unwrap();
		assert_eq!(config, AppConfig::default());
		assert_eq!(config.request_timeout_ms, 10_000);
		assert_eq!(config.api_base_url.as_str(), "http://localhost:8000/");
	}

	#[test]
	fn blank_values_fall_back() {
		let config = AppConfig::from_values(Some("  "), Some("")).unwrap();
		assert_eq!(config, AppConfig::default());
	}

	#[test]
	fn strips_trailing_slash_from_path() {
		let config = AppConfig::from_values(Some("https://api.example.com/v1/"), None).unwrap();
		assert_eq!(config.api_base_url.path(), "/v1");
	}

	#[test]
	fn rejects_non_http_scheme() {
		assert_eq!(
			AppConfig::from_values(Some("ftp://example.com"), None),
			Err(ConfigError::UnsupportedScheme("ftp://example.com".into()))
		);
	}

	#[test]
	fn rejects_relative_url() {
		assert!(matches!(
			AppConfig::from_values(Some("/api"), None),
			Err(ConfigError::InvalidUrl(..))
		));
	}

	#[test]
	fn rejects_zero_and_garbage_timeouts() {
		assert_eq!(
			AppConfig::from_values(None, Some("0")),
			Err(ConfigError::InvalidTimeout("0".into()))
		);
		assert!(AppConfig::from_values(None, Some("ten")).is_err());
		assert_eq!(
			AppConfig::from_values(None, Some("2500")).unwrap().request_timeout_ms,
			2500
		);
	}
}
