use crate::cache::CacheGateway;
use crate::config::TweetsConfig;
use crate::error::RefreshError;
use crate::parser::parse_posts;
use crate::post::Snapshot;
use crate::render::{Reconciler, RenderPass};
use crate::template::build_content_block;
use crate::transport::Transport;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Attempt bookkeeping for the refresh loop. One instance per widget
/// lifetime; the count only goes back to zero through [`reset`].
///
/// [`reset`]: ScheduleState::reset
#[derive(Debug)]
pub struct ScheduleState {
    attempt_count: u32,
    attempt_limit: u32,
}

impl ScheduleState {
    pub fn new(attempt_limit: u32) -> Self {
        Self {
            attempt_count: 0,
            attempt_limit,
        }
    }

    /// Count this cycle. Returns false once the ceiling is exceeded; the
    /// caller must then pause instead of fetching.
    fn begin_cycle(&mut self) -> bool {
        self.attempt_count += 1;
        self.attempt_count <= self.attempt_limit
    }

    /// External reset capability, e.g. wired to user activity by the host.
    pub fn reset(&mut self) {
        self.attempt_count = 0;
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }
}

/// How one refresh cycle resolved. Every variant except `Paused` re-arms
/// the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Fresh content rendered and persisted.
    Rendered,
    /// Fetch and parse worked but the display already showed this content.
    Unchanged,
    /// Parse failure or nothing renderable; no display mutation.
    NoRender,
    /// Transport failed; the cached snapshot went through the render path.
    ServedFromCache,
    /// Transport failed with no fallback and nothing on screen.
    ErrorDisplayed,
    /// Attempt ceiling reached; no fetch, no re-arm.
    Paused,
}

/// Drives the fetch → build → reconcile → persist cycle on a fixed
/// interval, bounded by the attempt ceiling.
pub struct RefreshScheduler {
    config: TweetsConfig,
    transport: Box<dyn Transport>,
    cache: CacheGateway,
    reconciler: Reconciler,
    state: ScheduleState,
}

impl RefreshScheduler {
    pub fn new(
        config: TweetsConfig,
        transport: Box<dyn Transport>,
        cache: CacheGateway,
        reconciler: Reconciler,
    ) -> Self {
        let state = ScheduleState::new(config.effective_attempt_limit());
        Self {
            config,
            transport,
            cache,
            reconciler,
            state,
        }
    }

    /// Clear the attempt count so automatic refreshing can resume. Exposed
    /// for the host to wire to an external signal such as user activity.
    pub fn reset_attempts(&mut self) {
        self.state.reset();
    }

    /// Run cycles until the attempt ceiling pauses the loop. Re-arms
    /// exactly once per cycle, at the end, so a new cycle can never start
    /// while the previous one is still in flight.
    pub async fn run(&mut self) {
        self.reconciler.attach();
        loop {
            if self.run_cycle().await == CycleOutcome::Paused {
                break;
            }
            tokio::time::sleep(Duration::from_secs(self.config.refresh_interval_secs)).await;
        }
    }

    /// One full refresh cycle.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        if !self.state.begin_cycle() {
            info!(
                error = %RefreshError::AttemptsExhausted,
                attempts = self.state.attempt_count(),
                "pausing automatic refresh"
            );
            return CycleOutcome::Paused;
        }

        let mut params = Vec::new();
        if let Some(limit) = self.config.limit {
            params.push(("per_page".to_string(), limit.to_string()));
        }

        match self.transport.fetch(&self.config.request_url, &params).await {
            Ok(body) => self.handle_response(&body).await,
            Err(err) => {
                warn!(
                    error = %RefreshError::Network(err),
                    "fetch failed, falling back to cached content"
                );
                self.handle_failure().await
            }
        }
    }

    async fn handle_response(&mut self, body: &str) -> CycleOutcome {
        let posts = match parse_posts(body) {
            Ok(posts) => posts,
            Err(err) => {
                // Not a fetch failure for scheduling purposes; the cycle
                // just skips rendering and the timer re-arms as usual.
                warn!(error = %RefreshError::MalformedResponse(err), "skipping render this cycle");
                return CycleOutcome::NoRender;
            }
        };

        // The snapshot lives here for the rest of the cycle and is handed
        // to the cache only once the display confirms a change.
        let snapshot = Snapshot::new(posts);
        let block = build_content_block(&snapshot.posts, self.config.limit);
        let had_content = block.is_some();
        let changed = self
            .reconciler
            .reconcile(block.as_deref(), true, RenderPass::Fresh)
            .await;

        if changed {
            self.cache.save(&snapshot);
            CycleOutcome::Rendered
        } else if had_content {
            CycleOutcome::Unchanged
        } else {
            debug!("response contained no renderable posts");
            CycleOutcome::NoRender
        }
    }

    async fn handle_failure(&mut self) -> CycleOutcome {
        if let Some(snapshot) = self.cache.load() {
            let block = build_content_block(&snapshot.posts, self.config.limit);
            self.reconciler
                .reconcile(block.as_deref(), true, RenderPass::CacheFallback)
                .await;
            return CycleOutcome::ServedFromCache;
        }

        if self.reconciler.display_is_empty() {
            warn!(error = %RefreshError::NoFallback, "switching to error display");
            self.reconciler.show_error();
            CycleOutcome::ErrorDisplayed
        } else {
            // Something is already on screen; leave it alone.
            CycleOutcome::NoRender
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheGateway, KeyValueStore, MemoryStore};
    use crate::render::test_surface::MockSurface;
    use crate::render::{Reconciler, ERROR_CLASS};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Scripted transport: pops the next canned result per fetch and
    /// counts the calls.
    #[derive(Default)]
    struct MockTransport {
        responses: Mutex<Vec<Result<String>>>,
        fetch_count: Arc<AtomicUsize>,
        last_params: Mutex<Vec<(String, String)>>,
    }

    impl MockTransport {
        fn scripted(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn fetch(&self, _url: &str, params: &[(String, String)]) -> Result<String> {
            self.fetch_count.fetch_add(1, Ordering::SeqCst);
            *self.last_params.lock().unwrap() = params.to_vec();
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(anyhow::anyhow!("network down")))
        }
    }

    fn post_json(id: &str, text: &str) -> String {
        format!(
            r#"{{"id_str": "{id}", "full_text": "{text}", "user": {{"screen_name": "wpc"}}}}"#
        )
    }

    fn config(attempt_limit: u32) -> TweetsConfig {
        TweetsConfig {
            attempt_limit: Some(attempt_limit),
            ..TweetsConfig::default()
        }
    }

    struct Fixture {
        scheduler: RefreshScheduler,
        surface: MockSurface,
        fetch_count: Arc<AtomicUsize>,
        store: Arc<MemoryStore>,
    }

    fn fixture(config: TweetsConfig, transport: MockTransport) -> Fixture {
        let surface = MockSurface::default();
        let store = Arc::new(MemoryStore::new());
        let fetch_count = transport.fetch_count.clone();
        let scheduler = RefreshScheduler::new(
            config,
            Box::new(transport),
            CacheGateway::new(Box::new(store.clone())),
            Reconciler::new(Box::new(surface.clone())),
        );
        Fixture {
            scheduler,
            surface,
            fetch_count,
            store,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_renders_and_persists() {
        let transport =
            MockTransport::scripted(vec![Ok(format!("[{}]", post_json("1", "hello")))]);
        let mut fx = fixture(config(5), transport);

        let outcome = fx.scheduler.run_cycle().await;
        assert_eq!(outcome, CycleOutcome::Rendered);
        assert!(fx.surface.state().markup.contains("hello"));
        assert!(fx.store.get(crate::cache::CONTENT_KEY).is_some());
        assert!(fx.store.get(crate::cache::TIME_KEY).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_content_not_repersisted() {
        let body = format!("[{}]", post_json("1", "hello"));
        let transport = MockTransport::scripted(vec![Ok(body.clone()), Ok(body)]);
        let mut fx = fixture(config(5), transport);

        assert_eq!(fx.scheduler.run_cycle().await, CycleOutcome::Rendered);
        let cached_time = fx.store.get(crate::cache::TIME_KEY);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(fx.scheduler.run_cycle().await, CycleOutcome::Unchanged);
        assert_eq!(fx.store.get(crate::cache::TIME_KEY), cached_time);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_ceiling_pauses_fourth_cycle() {
        let body = format!("[{}]", post_json("1", "hello"));
        let transport = MockTransport::scripted(vec![
            Ok(body.clone()),
            Ok(body.clone()),
            Ok(body),
        ]);
        let mut fx = fixture(config(3), transport);

        for _ in 0..3 {
            assert_ne!(fx.scheduler.run_cycle().await, CycleOutcome::Paused);
        }
        assert_eq!(fx.fetch_count.load(Ordering::SeqCst), 3);

        assert_eq!(fx.scheduler.run_cycle().await, CycleOutcome::Paused);
        assert_eq!(fx.fetch_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_resumes_after_pause() {
        let transport = MockTransport::scripted(vec![]);
        let mut fx = fixture(config(1), transport);

        fx.scheduler.run_cycle().await;
        assert_eq!(fx.scheduler.run_cycle().await, CycleOutcome::Paused);

        fx.scheduler.reset_attempts();
        let outcome = fx.scheduler.run_cycle().await;
        assert_ne!(outcome, CycleOutcome::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_serves_cached_content_with_fade() {
        let transport = MockTransport::scripted(vec![
            Err(anyhow::anyhow!("connection refused")),
            Ok(format!("[{}]", post_json("1", "first batch"))),
        ]);
        let mut fx = fixture(config(5), transport);

        // Cycle 1 paints and caches the first batch.
        assert_eq!(fx.scheduler.run_cycle().await, CycleOutcome::Rendered);

        // Replace the cached snapshot so the fallback differs from the
        // display, which must trigger a fade transition.
        fx.store.set(
            crate::cache::CONTENT_KEY,
            r#"[{"id": "2", "author_handle": "wpc", "raw_text": "cached batch", "created_at": null}]"#,
        );
        fx.store.set(crate::cache::TIME_KEY, "1700000000");

        assert_eq!(fx.scheduler.run_cycle().await, CycleOutcome::ServedFromCache);
        let state = fx.surface.state();
        assert!(state.markup.contains("cached batch"));
        assert_eq!(state.fade_outs, 1);
        assert_eq!(state.fade_ins, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_without_fallback_shows_error() {
        let transport = MockTransport::scripted(vec![]);
        let mut fx = fixture(config(5), transport);

        assert_eq!(fx.scheduler.run_cycle().await, CycleOutcome::ErrorDisplayed);
        let state = fx.surface.state();
        assert!(state.classes.contains(&ERROR_CLASS.to_string()));
        assert!(state.markup.contains("wpc-component__error-message"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_keeps_existing_display_when_cache_empty() {
        let transport = MockTransport::scripted(vec![
            Err(anyhow::anyhow!("down")),
            Ok(format!("[{}]", post_json("1", "shown"))),
        ]);
        let mut fx = fixture(config(5), transport);

        assert_eq!(fx.scheduler.run_cycle().await, CycleOutcome::Rendered);
        // Wipe the cache so the failure path has no fallback.
        fx.store.set(crate::cache::CONTENT_KEY, "");
        fx.store.set(crate::cache::TIME_KEY, "");

        assert_eq!(fx.scheduler.run_cycle().await, CycleOutcome::NoRender);
        let state = fx.surface.state();
        assert!(state.markup.contains("shown"));
        assert!(!state.classes.contains(&ERROR_CLASS.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_response_is_no_render_not_failure() {
        let transport = MockTransport::scripted(vec![Ok("{not json".to_string())]);
        let mut fx = fixture(config(5), transport);

        assert_eq!(fx.scheduler.run_cycle().await, CycleOutcome::NoRender);
        let state = fx.surface.state();
        assert_eq!(state.set_markup_calls, 0);
        assert!(!state.classes.contains(&ERROR_CLASS.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_limit_sent_as_per_page_param() {
        let transport = MockTransport::scripted(vec![Ok("[]".to_string())]);
        let surface = MockSurface::default();
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(transport);
        let mut scheduler = RefreshScheduler::new(
            TweetsConfig {
                limit: Some(3),
                attempt_limit: Some(5),
                ..TweetsConfig::default()
            },
            Box::new(SharedTransport(transport.clone())),
            CacheGateway::new(Box::new(store)),
            Reconciler::new(Box::new(surface)),
        );

        scheduler.run_cycle().await;
        assert_eq!(
            *transport.last_params.lock().unwrap(),
            vec![("per_page".to_string(), "3".to_string())]
        );
    }

    struct SharedTransport(Arc<MockTransport>);

    #[async_trait]
    impl Transport for SharedTransport {
        async fn fetch(&self, url: &str, params: &[(String, String)]) -> Result<String> {
            self.0.fetch(url, params).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loop_rearms_until_paused() {
        let transport = MockTransport::scripted(vec![]);
        let fetch_count = transport.fetch_count.clone();
        let mut fx = fixture(config(2), transport);
        // Seed the cache so failures resolve as cache-served no-ops.
        fx.scheduler.cache.save(&Snapshot::new(vec![crate::post::Post {
            id: Some("1".to_string()),
            author_handle: Some("wpc".to_string()),
            raw_text: "seeded".to_string(),
            ..crate::post::Post::default()
        }]));

        fx.scheduler.run().await;

        // Two counted fetch cycles, then the third begin_cycle paused the
        // loop without fetching.
        assert_eq!(fetch_count.load(Ordering::SeqCst), 2);
        assert!(fx.surface.state().markup.contains("seeded"));
    }

    #[test]
    fn test_schedule_state_counts_and_resets() {
        let mut state = ScheduleState::new(2);
        assert!(state.begin_cycle());
        assert!(state.begin_cycle());
        assert!(!state.begin_cycle());
        assert_eq!(state.attempt_count(), 3);

        state.reset();
        assert_eq!(state.attempt_count(), 0);
        assert!(state.begin_cycle());
    }
}
