//! CCTV Dashboard State Synchronization Core
//!
//! Client-side engine behind the live camera dashboard: it polls the backend
//! REST service for camera/detection snapshots, reconciles them into one
//! in-memory view model, drives view/selection transitions, and degrades
//! gracefully when a feed or stream fails.
//!
//! ## Components
//!
//! 1. GatewayClient - typed HTTP wrapper over the backend API
//! 2. DashboardSynchronizer - polling schedules and state reconciliation
//! 3. View/Selection - pure projections and navigation over DashboardState
//! 4. StreamSlot - per-camera stream lifecycle with placeholder fallback
//!
//! ## Design Principles
//!
//! - Single writer: only the synchronizer produces DashboardState snapshots;
//!   consumers subscribe to a watch channel of immutable views
//! - No operation is user-fatal: the dashboard stays interactive when every
//!   network call fails, showing empty or placeholder content

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod state;
pub mod stream;
pub mod sync;
pub mod view;

pub use config::DashboardConfig;
pub use error::{Error, Result};
pub use state::{ActiveView, DashboardState};
