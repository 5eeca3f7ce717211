//! Dashboard configuration
//!
//! All knobs the synchronizer and gateway need, overridable via environment
//! variables. The display-name override table replaces the inline positional
//! rename the original UI hardcoded.

use std::time::Duration;

/// Default backend base address
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Presentation-only relabeling of a camera by its ordinal position in the
/// fetched list. Never written back to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameOverride {
    pub ordinal: usize,
    pub label: String,
}

impl NameOverride {
    pub fn new(ordinal: usize, label: impl Into<String>) -> Self {
        Self {
            ordinal,
            label: label.into(),
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend base address, e.g. `http://localhost:8000/api`
    pub base_url: String,
    /// Server-side and client-side cap on the recent-detections feed
    pub detection_limit: usize,
    /// Detection refresh cadence
    pub refresh_interval: Duration,
    /// Display clock cadence
    pub clock_interval: Duration,
    /// Ordinal -> display name overrides applied on initial load
    pub name_overrides: Vec<NameOverride>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            detection_limit: 20,
            refresh_interval: Duration::from_secs(5),
            clock_interval: Duration::from_secs(1),
            name_overrides: vec![
                NameOverride::new(0, "Kitchen"),
                NameOverride::new(1, "Garden"),
            ],
        }
    }
}

impl DashboardConfig {
    /// Build a config from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CCTV_API_URL") {
            config.base_url = url;
        }
        if let Some(limit) = std::env::var("CCTV_DETECTION_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.detection_limit = limit;
        }
        if let Some(secs) = std::env::var("CCTV_REFRESH_INTERVAL_SEC")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.refresh_interval = Duration::from_secs(secs);
        }

        config
    }

    /// Display label for a camera at the given ordinal, if overridden
    pub fn override_for(&self, ordinal: usize) -> Option<&str> {
        self.name_overrides
            .iter()
            .find(|o| o.ordinal == ordinal)
            .map(|o| o.label.as_str())
    }
}
