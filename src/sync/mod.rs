//! DashboardSynchronizer - Snapshot Polling and Reconciliation
//!
//! ## Responsibilities
//!
//! - One-shot initial load (active cameras + recent detections, concurrent)
//! - Periodic detection refresh
//! - Display clock tick
//! - Sole writer of `DashboardState`; consumers subscribe to a watch channel
//!
//! Refresh completions carry a monotonically increasing sequence number so a
//! late-arriving response can never overwrite a newer snapshot. Teardown is
//! first-class and idempotent: `stop` halts both schedules and no state
//! mutation happens afterwards.

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::gateway::GatewayClient;
use crate::models::{Camera, Detection};
use crate::state::{ActiveView, DashboardState};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Fetch seam the synchronizer polls through
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Cameras flagged active by the backend, in backend order
    async fn active_cameras(&self) -> Result<Vec<Camera>>;

    /// Recent detections, newest first, truncated server-side to `limit`
    async fn recent_detections(&self, limit: usize) -> Result<Vec<Detection>>;
}

#[async_trait]
impl SnapshotSource for GatewayClient {
    async fn active_cameras(&self) -> Result<Vec<Camera>> {
        self.list_active_cameras().await
    }

    async fn recent_detections(&self, limit: usize) -> Result<Vec<Detection>> {
        self.list_recent_detections(limit).await
    }
}

/// The only component that mutates `DashboardState`
pub struct DashboardSynchronizer {
    source: Arc<dyn SnapshotSource>,
    config: DashboardConfig,
    state_tx: Arc<watch::Sender<DashboardState>>,
    state_rx: watch::Receiver<DashboardState>,
    running: Arc<RwLock<bool>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    /// Issue counter for refresh attempts
    refresh_seq: Arc<AtomicU64>,
    /// Highest sequence whose snapshot has been applied
    applied_seq: Arc<AtomicU64>,
}

impl DashboardSynchronizer {
    /// Create a new synchronizer over the given snapshot source
    pub fn new(source: Arc<dyn SnapshotSource>, config: DashboardConfig) -> Self {
        let (state_tx, state_rx) = watch::channel(DashboardState::default());

        Self {
            source,
            config,
            state_tx: Arc::new(state_tx),
            state_rx,
            running: Arc::new(RwLock::new(false)),
            tasks: Mutex::new(Vec::new()),
            refresh_seq: Arc::new(AtomicU64::new(0)),
            applied_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscribe to state snapshots
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state_tx.subscribe()
    }

    /// Current state snapshot
    pub fn state(&self) -> DashboardState {
        self.state_rx.borrow().clone()
    }

    /// Start the initial load and both recurring schedules
    pub async fn start(&self) {
        {
            let mut running = self.running.write().await;
            if *running {
                tracing::warn!("Synchronizer already running");
                return;
            }
            *running = true;
        }

        tracing::info!("Starting dashboard synchronizer");

        let mut tasks = self.tasks.lock().await;
        tasks.push(self.spawn_initial_load());
        tasks.push(self.spawn_refresh_loop());
        tasks.push(self.spawn_clock_loop());
    }

    /// Stop both schedules; idempotent, no mutation occurs afterwards
    pub async fn stop(&self) {
        {
            let mut running = self.running.write().await;
            if !*running {
                return;
            }
            *running = false;
        }

        for handle in self.tasks.lock().await.drain(..) {
            handle.abort();
        }

        tracing::info!("Dashboard synchronizer stopped");
    }

    // ========================================
    // Navigation (user actions routed through the single writer)
    // ========================================

    /// Show the home grid
    pub fn select_home(&self) {
        self.state_tx
            .send_modify(|s| s.active_view = ActiveView::Home);
    }

    /// Show a single camera. The id is not validated against the current
    /// camera list; the renderer handles a dangling reference.
    pub fn select_camera(&self, camera_id: i64) {
        self.state_tx
            .send_modify(|s| s.active_view = ActiveView::PerCamera(camera_id));
    }

    /// Highlight a camera card on the home grid
    pub fn focus_camera(&self, camera_id: i64) {
        self.state_tx
            .send_modify(|s| s.selected_camera_id = Some(camera_id));
    }

    // ========================================
    // Schedules
    // ========================================

    fn spawn_initial_load(&self) -> JoinHandle<()> {
        let source = self.source.clone();
        let config = self.config.clone();
        let state_tx = self.state_tx.clone();
        let refresh_seq = self.refresh_seq.clone();
        let applied_seq = self.applied_seq.clone();

        tokio::spawn(async move {
            let seq = refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;

            let (cameras, detections) = tokio::join!(
                source.active_cameras(),
                source.recent_detections(config.detection_limit),
            );

            match (cameras, detections) {
                (Ok(mut cameras), Ok(mut detections)) => {
                    for o in &config.name_overrides {
                        if let Some(camera) = cameras.get_mut(o.ordinal) {
                            camera.name = o.label.clone();
                        }
                    }
                    detections.truncate(config.detection_limit);

                    let prev = applied_seq.fetch_max(seq, Ordering::SeqCst);
                    let detections_fresh = seq > prev;

                    state_tx.send_modify(move |s| {
                        s.cameras = cameras;
                        if detections_fresh {
                            s.detections = detections;
                        }
                        if s.selected_camera_id.is_none() {
                            s.selected_camera_id = s.cameras.first().map(|c| c.id);
                        }
                        s.last_error = None;
                        s.loading = false;
                    });

                    tracing::info!("Initial dashboard load complete");
                }
                (Err(e), _) | (_, Err(e)) => {
                    tracing::error!(error = %e, "Initial dashboard load failed");

                    // Leave prior cameras/detections alone but unblock the UI
                    let message = e.to_string();
                    state_tx.send_modify(move |s| {
                        s.last_error = Some(message);
                        s.loading = false;
                    });
                }
            }
        })
    }

    fn spawn_refresh_loop(&self) -> JoinHandle<()> {
        let source = self.source.clone();
        let state_tx = self.state_tx.clone();
        let running = self.running.clone();
        let refresh_seq = self.refresh_seq.clone();
        let applied_seq = self.applied_seq.clone();
        let period = self.config.refresh_interval;
        let limit = self.config.detection_limit;

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);

            loop {
                ticker.tick().await;

                if !*running.read().await {
                    break;
                }

                let seq = refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;

                match source.recent_detections(limit).await {
                    Ok(detections) => {
                        apply_detections(&state_tx, &applied_seq, seq, detections, limit);
                    }
                    // Transient hiccup: keep the displayed feed, no banner
                    Err(e) => {
                        tracing::warn!(error = %e, "Detection refresh failed, keeping current feed");
                    }
                }
            }

            tracing::info!("Detection refresh loop stopped");
        })
    }

    fn spawn_clock_loop(&self) -> JoinHandle<()> {
        let state_tx = self.state_tx.clone();
        let running = self.running.clone();
        let period = self.config.clock_interval;

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);

            loop {
                ticker.tick().await;

                if !*running.read().await {
                    break;
                }

                let now = Utc::now();
                state_tx.send_modify(|s| {
                    for camera in &s.cameras {
                        s.display_clocks.insert(camera.id, now);
                    }
                });
            }
        })
    }
}

/// Apply a refresh completion, discarding it if a newer one already landed
fn apply_detections(
    state_tx: &watch::Sender<DashboardState>,
    applied_seq: &AtomicU64,
    seq: u64,
    mut detections: Vec<Detection>,
    limit: usize,
) {
    let prev = applied_seq.fetch_max(seq, Ordering::SeqCst);
    if seq <= prev {
        tracing::debug!(seq, last_applied = prev, "Discarding stale refresh completion");
        return;
    }

    detections.truncate(limit);
    state_tx.send_modify(move |s| s.detections = detections);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NameOverride;
    use crate::error::Error;
    use crate::models::DetectionType;
    use crate::view;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    struct StubSource {
        cameras: StdMutex<VecDeque<Result<Vec<Camera>>>>,
        detections: StdMutex<VecDeque<Result<Vec<Detection>>>>,
    }

    impl StubSource {
        fn new(
            cameras: Vec<Result<Vec<Camera>>>,
            detections: Vec<Result<Vec<Detection>>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                cameras: StdMutex::new(cameras.into()),
                detections: StdMutex::new(detections.into()),
            })
        }

        fn exhausted() -> crate::error::Error {
            Error::Gateway {
                status: 503,
                status_text: "Service Unavailable".to_string(),
            }
        }
    }

    #[async_trait]
    impl SnapshotSource for StubSource {
        async fn active_cameras(&self) -> Result<Vec<Camera>> {
            self.cameras
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Self::exhausted()))
        }

        async fn recent_detections(&self, _limit: usize) -> Result<Vec<Detection>> {
            self.detections
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Self::exhausted()))
        }
    }

    fn camera(id: i64, name: &str) -> Camera {
        Camera {
            id,
            name: name.to_string(),
            is_active: true,
            camera_index: 0,
            created_at: Utc::now(),
        }
    }

    fn detection(id: i64, confidence: f64) -> Detection {
        Detection {
            id,
            camera: 5,
            camera_name: "Cam A".to_string(),
            detection_type: DetectionType::Motion,
            confidence,
            timestamp: Utc::now(),
        }
    }

    fn three_cameras() -> Vec<Camera> {
        vec![camera(5, "Cam A"), camera(7, "Cam B"), camera(9, "Cam C")]
    }

    /// Let spawned tasks run to their next await point
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_renames_selects_and_clears_error() {
        let source = StubSource::new(
            vec![Ok(three_cameras())],
            vec![Ok(vec![
                detection(1, 0.9),
                detection(2, 0.5),
                detection(3, 0.2),
            ])],
        );
        let sync = DashboardSynchronizer::new(source, DashboardConfig::default());

        sync.start().await;
        settle().await;

        let state = sync.state();
        let names: Vec<&str> = state.cameras.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Kitchen", "Garden", "Cam C"]);
        assert_eq!(state.selected_camera_id, Some(5));
        assert_eq!(state.last_error, None);
        assert!(!state.loading);

        let stats = view::home_stats(&state);
        assert!((stats.average_confidence - 0.5333333333333333).abs() < 1e-12);

        sync.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_respects_configured_overrides() {
        let source = StubSource::new(vec![Ok(three_cameras())], vec![Ok(vec![])]);
        let config = DashboardConfig {
            name_overrides: vec![NameOverride::new(2, "Back Alley")],
            ..Default::default()
        };
        let sync = DashboardSynchronizer::new(source, config);

        sync.start().await;
        settle().await;

        let names: Vec<String> = sync.state().cameras.iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["Cam A", "Cam B", "Back Alley"]);

        sync.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_failure_sets_banner_and_unblocks() {
        let source = StubSource::new(
            vec![Err(Error::Gateway {
                status: 502,
                status_text: "Bad Gateway".to_string(),
            })],
            vec![Ok(vec![detection(1, 0.9)])],
        );
        let sync = DashboardSynchronizer::new(source, DashboardConfig::default());

        sync.start().await;
        settle().await;

        let state = sync.state();
        assert!(state.cameras.is_empty());
        assert!(state.detections.is_empty());
        assert_eq!(
            state.last_error.as_deref(),
            Some("Gateway error: 502 Bad Gateway")
        );
        assert!(!state.loading);

        sync.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_replaces_wholesale_and_truncates() {
        let big_batch: Vec<Detection> = (100..125).map(|id| detection(id, 0.5)).collect();
        let source = StubSource::new(
            vec![Ok(three_cameras())],
            vec![Ok(vec![detection(1, 0.9)]), Ok(big_batch.clone())],
        );
        let sync = DashboardSynchronizer::new(source, DashboardConfig::default());

        sync.start().await;
        settle().await;
        assert_eq!(sync.state().detections.len(), 1);

        tokio::time::advance(Duration::from_millis(5100)).await;
        settle().await;

        let state = sync.state();
        assert_eq!(state.detections.len(), 20);
        assert_eq!(state.detections, big_batch[..20].to_vec());
        assert!(state.detections.iter().all(|d| d.id != 1));
        // Cameras untouched by the refresh cycle
        assert_eq!(state.cameras.len(), 3);

        sync.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_refresh_disturbs_nothing() {
        let source = StubSource::new(
            vec![Ok(three_cameras())],
            vec![
                Ok(vec![detection(1, 0.9), detection(2, 0.5)]),
                Err(Error::Gateway {
                    status: 500,
                    status_text: "Internal Server Error".to_string(),
                }),
            ],
        );
        let sync = DashboardSynchronizer::new(source, DashboardConfig::default());

        sync.start().await;
        settle().await;
        let before = sync.state();

        tokio::time::advance(Duration::from_millis(5100)).await;
        settle().await;

        let after = sync.state();
        assert_eq!(after.detections, before.detections);
        assert_eq!(after.last_error, None);

        sync.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_both_schedules() {
        let source = StubSource::new(
            vec![Ok(three_cameras())],
            vec![Ok(vec![detection(1, 0.9)]), Ok(vec![detection(2, 0.4)])],
        );
        let sync = DashboardSynchronizer::new(source, DashboardConfig::default());

        sync.start().await;
        settle().await;

        sync.stop().await;
        // Teardown is idempotent
        sync.stop().await;

        let mut rx = sync.subscribe();
        rx.mark_unchanged();

        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;

        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_tick_stamps_all_cameras() {
        let source = StubSource::new(vec![Ok(three_cameras())], vec![Ok(vec![])]);
        let sync = DashboardSynchronizer::new(source, DashboardConfig::default());

        sync.start().await;
        settle().await;
        assert!(sync.state().display_clocks.is_empty());

        tokio::time::advance(Duration::from_millis(1100)).await;
        settle().await;

        let clocks = sync.state().display_clocks;
        assert_eq!(clocks.len(), 3);
        assert!(clocks.contains_key(&5));
        assert!(clocks.contains_key(&7));
        assert!(clocks.contains_key(&9));

        sync.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_refresh_does_not_delay_clock_tick() {
        // First detections call (initial load) resolves, every later one
        // (the refresh cycles) hangs forever
        struct HangingRefreshSource {
            calls: AtomicU64,
        }

        #[async_trait]
        impl SnapshotSource for HangingRefreshSource {
            async fn active_cameras(&self) -> Result<Vec<Camera>> {
                Ok(vec![camera(5, "Cam A")])
            }

            async fn recent_detections(&self, _limit: usize) -> Result<Vec<Detection>> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(vec![])
                } else {
                    std::future::pending().await
                }
            }
        }

        let source = Arc::new(HangingRefreshSource {
            calls: AtomicU64::new(0),
        });
        let sync = DashboardSynchronizer::new(source, DashboardConfig::default());

        sync.start().await;
        settle().await;
        assert!(!sync.state().loading);

        // Past the first refresh tick (now hung) and the next clock tick
        tokio::time::advance(Duration::from_millis(6100)).await;
        settle().await;

        // The hung fetch delays only its own cycle; clocks keep ticking
        assert!(sync.state().display_clocks.contains_key(&5));

        sync.stop().await;
    }

    #[tokio::test]
    async fn test_stale_completion_is_discarded() {
        let (tx, _rx) = watch::channel(DashboardState::default());
        let applied = AtomicU64::new(0);

        apply_detections(&tx, &applied, 2, vec![detection(2, 0.4)], 20);
        assert_eq!(tx.borrow().detections[0].id, 2);

        // An older in-flight completion lands afterwards and must lose
        apply_detections(&tx, &applied, 1, vec![detection(1, 0.9)], 20);
        assert_eq!(tx.borrow().detections[0].id, 2);

        apply_detections(&tx, &applied, 3, vec![detection(3, 0.7)], 20);
        assert_eq!(tx.borrow().detections[0].id, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_transitions() {
        let source = StubSource::new(vec![Ok(three_cameras())], vec![Ok(vec![])]);
        let sync = DashboardSynchronizer::new(source, DashboardConfig::default());

        sync.start().await;
        settle().await;

        // Dangling id is allowed; the renderer shows a generic label
        sync.select_camera(42);
        assert_eq!(sync.state().active_view, ActiveView::PerCamera(42));
        assert!(sync.state().viewed_camera().is_none());

        sync.select_camera(7);
        assert_eq!(sync.state().active_view, ActiveView::PerCamera(7));
        assert_eq!(sync.state().viewed_camera().map(|c| c.id), Some(7));

        sync.select_home();
        assert_eq!(sync.state().active_view, ActiveView::Home);

        sync.focus_camera(9);
        assert_eq!(sync.state().selected_camera_id, Some(9));

        sync.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent() {
        let source = StubSource::new(vec![Ok(three_cameras())], vec![Ok(vec![])]);
        let sync = DashboardSynchronizer::new(source, DashboardConfig::default());

        sync.start().await;
        sync.start().await;
        settle().await;

        assert_eq!(sync.state().cameras.len(), 3);

        sync.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_survives_camera_disappearing() {
        // Selection is set once on initial load and not revalidated
        let source = StubSource::new(vec![Ok(three_cameras())], vec![Ok(vec![]), Ok(vec![])]);
        let sync = DashboardSynchronizer::new(source, DashboardConfig::default());

        sync.start().await;
        settle().await;
        assert_eq!(sync.state().selected_camera_id, Some(5));

        tokio::time::advance(Duration::from_millis(5100)).await;
        settle().await;
        assert_eq!(sync.state().selected_camera_id, Some(5));

        sync.stop().await;
    }
}
