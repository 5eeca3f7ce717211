//! View/Selection projections
//!
//! Pure functions over `DashboardState`. Transitions themselves live on the
//! synchronizer so all mutation goes through the single writer; this module
//! holds the derived read-only numbers the home screen renders.

use crate::state::DashboardState;
use serde::Serialize;

/// Aggregate stats for the home view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HomeStats {
    pub camera_count: usize,
    pub detection_count: usize,
    /// Cameras with `is_active` set
    pub online_count: usize,
    /// Mean confidence fraction over the current detections, 0.0 when empty
    pub average_confidence: f64,
}

impl HomeStats {
    /// Display form of the aggregate, scaled with the same convention as
    /// per-detection confidences
    pub fn average_confidence_percent(&self) -> f64 {
        confidence_percent(self.average_confidence)
    }
}

/// Project home-screen stats from the current state
pub fn home_stats(state: &DashboardState) -> HomeStats {
    let sum: f64 = state.detections.iter().map(|d| d.confidence).sum();
    let average_confidence = if state.detections.is_empty() {
        0.0
    } else {
        sum / state.detections.len() as f64
    };

    HomeStats {
        camera_count: state.cameras.len(),
        detection_count: state.detections.len(),
        online_count: state.cameras.iter().filter(|c| c.is_active).count(),
        average_confidence,
    }
}

/// Confidence fraction scaled for display
pub fn confidence_percent(confidence: f64) -> f64 {
    confidence * 100.0
}
