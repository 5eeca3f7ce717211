//! Domain models
//!
//! Read-only cached copies of backend resources. The backend owns both
//! Camera and Detection; the dashboard never writes them back except through
//! the explicit gateway CRUD operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Camera as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub camera_index: i32,
    pub created_at: DateTime<Utc>,
}

/// Detection event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionType {
    Person,
    Car,
    Object,
    Motion,
}

impl DetectionType {
    /// Capitalized label for display
    pub fn label(&self) -> &'static str {
        match self {
            DetectionType::Person => "Person",
            DetectionType::Car => "Car",
            DetectionType::Object => "Object",
            DetectionType::Motion => "Motion",
        }
    }
}

/// Detection event reported by the backend
///
/// `camera_name` is a denormalized snapshot of the camera name at detection
/// time, so it may differ from the current camera name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: i64,
    /// References Camera.id
    pub camera: i64,
    pub camera_name: String,
    pub detection_type: DetectionType,
    /// Confidence fraction in [0, 1]
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// Partial camera field set for create/update (PATCH semantics)
#[derive(Debug, Clone, Default, Serialize)]
pub struct CameraPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_index: Option<i32>,
}
