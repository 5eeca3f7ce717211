//! Dashboard state
//!
//! Derived, never persisted. Created empty at startup, populated by the
//! first successful initial load, then mutated only by the synchronizer's
//! refresh cycles and by user navigation actions routed through it.

use crate::models::{Camera, Detection};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Currently rendered screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ActiveView {
    /// Grid of all cameras plus stats and the detections feed
    #[default]
    Home,
    /// Single-camera view; the id may dangle if the camera has since
    /// disappeared from a refresh, the renderer shows a generic label then
    PerCamera(i64),
}

/// In-memory view model the renderer consumes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    /// Backend response order, unique by id
    pub cameras: Vec<Camera>,
    /// Most-recent-first, capped at the configured limit, replaced wholesale
    /// each refresh
    pub detections: Vec<Detection>,
    /// Set to the first camera's id on initial load; not revalidated against
    /// later refreshes
    pub selected_camera_id: Option<i64>,
    pub active_view: ActiveView,
    /// Message from the most recent initial-load failure only
    pub last_error: Option<String>,
    /// Camera id -> locally-ticked wall clock, independent of any server
    /// timestamp
    pub display_clocks: HashMap<i64, DateTime<Utc>>,
    /// True until the initial load resolves, success or failure
    pub loading: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            cameras: Vec::new(),
            detections: Vec::new(),
            selected_camera_id: None,
            active_view: ActiveView::Home,
            last_error: None,
            display_clocks: HashMap::new(),
            loading: true,
        }
    }
}

impl DashboardState {
    /// Camera for the current selection, if it still exists
    pub fn selected_camera(&self) -> Option<&Camera> {
        let id = self.selected_camera_id?;
        self.cameras.iter().find(|c| c.id == id)
    }

    /// Camera shown by a per-camera view, if it still exists
    pub fn viewed_camera(&self) -> Option<&Camera> {
        match self.active_view {
            ActiveView::PerCamera(id) => self.cameras.iter().find(|c| c.id == id),
            ActiveView::Home => None,
        }
    }
}
