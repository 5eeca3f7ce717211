//! Stream display slots
//!
//! Per-camera-slot lifecycle for the live image resource. Availability is
//! best-effort: a load failure swaps in the placeholder graphic and never
//! surfaces as an application-level error. `Failed` is terminal for a slot
//! instance; a re-rendered slot starts over at `Loading`.

use crate::error::Error;
use serde::Serialize;

/// Fixed embedded placeholder substituted when a stream fails to load
pub const STREAM_PLACEHOLDER: &str = "data:image/svg+xml,%3Csvg xmlns=\"http://www.w3.org/2000/svg\" width=\"100\" height=\"100\"%3E%3Crect fill=\"%23333\" width=\"100\" height=\"100\"/%3E%3C/svg%3E";

/// Slot lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StreamPhase {
    /// Resource resolved, waiting for the first frame
    Loading,
    /// Frames arriving, no error seen
    Streaming,
    /// The image resource signaled a load error; terminal for this slot
    Failed,
}

/// One camera's display slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamSlot {
    camera_id: i64,
    url: String,
    phase: StreamPhase,
}

impl StreamSlot {
    /// Create a fresh slot for a resolved stream URL
    pub fn new(camera_id: i64, url: impl Into<String>) -> Self {
        Self {
            camera_id,
            url: url.into(),
            phase: StreamPhase::Loading,
        }
    }

    pub fn camera_id(&self) -> i64 {
        self.camera_id
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// First frame arrived
    pub fn mark_streaming(&mut self) {
        if self.phase == StreamPhase::Loading {
            self.phase = StreamPhase::Streaming;
        }
    }

    /// The underlying resource errored; no automatic retry
    pub fn mark_failed(&mut self) {
        if self.phase != StreamPhase::Failed {
            // Logged but never propagated beyond this slot
            tracing::debug!(
                error = %Error::StreamUnavailable(self.camera_id),
                url = %self.url,
                "Substituting placeholder"
            );
        }
        self.phase = StreamPhase::Failed;
    }

    /// URL the renderer should show: the stream, or the placeholder once
    /// the slot has failed
    pub fn display_url(&self) -> &str {
        match self.phase {
            StreamPhase::Failed => STREAM_PLACEHOLDER,
            _ => &self.url,
        }
    }
}
