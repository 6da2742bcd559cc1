use core::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const RES_PER_PAGE: usize = 10;
/// Seconds until the upload window closes after a successful upload.
pub const MODAL_CLOSE_SEC: f64 = 2.5;
pub const TIMEOUT_SEC: u64 = 10;

/// Runtime settings. Missing fields in JSON take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub results_per_page: usize,
	pub modal_close: Duration,
	pub request_timeout: Duration,
	/// URL of the SVG sprite sheet.
	pub icons: String,
	/// Local storage key of the persisted bookmarks.
	pub storage_key: String,
	/// Marks uploaded recipes as user generated.
	pub upload_key: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			results_per_page: RES_PER_PAGE,
			modal_close: Duration::from_secs_f64(MODAL_CLOSE_SEC),
			request_timeout: Duration::from_secs(TIMEOUT_SEC),
			icons: "img/icons.svg".to_owned(),
			storage_key: "bookmarks".to_owned(),
			upload_key: "forkful-local".to_owned(),
		}
	}
}

impl Config {
	/// # Errors
	///
	/// If `json` isn't a valid (partial) configuration object.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		let config: Self = serde_json::from_str(json)?;
		Ok(config.sanitized())
	}

	/// Replaces unusable values with their defaults.
	#[must_use]
	pub fn sanitized(mut self) -> Self {
		if self.results_per_page == 0 {
			warn!("`results_per_page` must be at least 1. Using the default.");
			self.results_per_page = RES_PER_PAGE;
		}
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config = Config::from_json(r#"{ "results_per_page": 5, "icons": "icons.svg" }"#).unwrap();
		assert_eq!(config.results_per_page, 5);
		assert_eq!(config.icons, "icons.svg");
		assert_eq!(config.modal_close, Duration::from_millis(2500));
		assert_eq!(config.request_timeout, Duration::from_secs(10));
	}

	#[test]
	fn zero_page_size_falls_back() {
		assert_eq!(Config::from_json(r#"{ "results_per_page": 0 }"#).unwrap().results_per_page, RES_PER_PAGE);
	}
}
