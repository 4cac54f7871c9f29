//! Failures surfaced to the user.

use thiserror::Error;

/// Failure of a single backend request.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FetchError {
	/// Non-2xx response; `reason` is the status text sent by the server.
	#[error("{}", status_message(.status, .reason))]
	Status {
		/// HTTP status code.
		status: u16,
		/// Status text, possibly empty.
		reason: String,
	},
	/// The request never got a response.
	#[error("network error: {0}")]
	Network(String),
	/// Aborted after the configured timeout.
	#[error("request timed out after {millis}ms")]
	Timeout {
		/// The timeout that expired.
		millis: u32,
	},
	/// The body was not the expected JSON.
	#[error("unexpected response body: {0}")]
	Decode(String),
	/// The request URL could not be built.
	#[error("invalid request URL: {0}")]
	InvalidUrl(String),
}

fn status_message(status: &u16, reason: &str) -> String {
	if reason.is_empty() {
		format!("HTTP {status}")
	} else {
		format!("HTTP {status}: {reason}")
	}
}

/// Everything a search can fail with. Rendered once, as the panel's error text.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SearchError {
	/// Input rejected before any request was made.
	#[error("{0}")]
	Validation(String),
	/// A backend request failed.
	#[error(transparent)]
	Fetch(#[from] FetchError),
}
