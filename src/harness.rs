//! # Task Harness
//!
//! Spawns the radar's tasks on the tokio runtime and wires them to the
//! shared state.
//!
//! | Task | Priority | Wakes on |
//! |---|---|---|
//! | link reader | 0 | serial bytes |
//! | record parser | 1 | record ready |
//! | swap | 2 | burst complete |
//! | range/toggle control | 10 | button edge |
//! | selection | 11 | click edge, stick poll while selected |
//! | main render | 12 | radar refresh |
//! | info render | 13 | info refresh |
//!
//! Priorities are static and attached to each task's span; the runtime
//! does the scheduling. Nothing runs at idle priority: tokio parks its
//! workers when every task is suspended.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, info_span, trace, warn, Instrument};

use crate::config::{Config, InputConfig};
use crate::control::{apply_control, ControlAction, ControlOutcome, DisplaySettings};
use crate::ingest::link::{run_link_reader, LinkHandler};
use crate::ingest::parser::RecordParser;
use crate::ingest::queue::telemetry_queue;
use crate::ingest::IngestContext;
use crate::input::{AxisSource, ButtonSource};
use crate::projection::Projector;
use crate::render::{render_info, render_radar, DisplaySurface, RenderLayout};
use crate::selection::{DirectionClassifier, Rebind};
use crate::serial::TelemetryLink;
use crate::signal::{EdgeLine, Refresh};
use crate::telemetry::{BurstLogger, BurstSummary};
use crate::track::TrackStore;

/// Static task priority; lower is more urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Priority {
    /// Receive context of the serial link
    Link = 0,
    Parser = 1,
    Swap = 2,
    Control = 10,
    Selection = 11,
    MainRender = 12,
    InfoRender = 13,
    /// Not spawned; the runtime parks idle workers
    Idle = 255,
}

impl Priority {
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }
}

/// Refresh requests for the two render passes
#[derive(Debug, Clone, Default)]
pub struct RenderRequests {
    pub radar: Refresh,
    pub info: Refresh,
}

impl RenderRequests {
    pub fn request_all(&self) {
        self.radar.request();
        self.info.request();
    }
}

/// Input settle, re-arm and polling delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputTiming {
    pub settle: Duration,
    pub rearm: Duration,
    pub poll_interval: Duration,
}

impl Default for InputTiming {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(5),
            rearm: Duration::from_millis(50),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl From<&InputConfig> for InputTiming {
    fn from(config: &InputConfig) -> Self {
        Self {
            settle: Duration::from_millis(config.settle_ms),
            rearm: Duration::from_millis(config.rearm_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }
}

/// State handed to every task at construction
#[derive(Debug, Clone)]
pub struct Shared {
    pub store: Arc<TrackStore>,
    pub ingest: IngestContext,
    pub projector: Projector,
    pub render: RenderRequests,
}

impl Shared {
    #[must_use]
    pub fn new(projector: Projector, display: DisplaySettings, table_capacity: usize) -> Self {
        Self {
            store: Arc::new(TrackStore::new(table_capacity, display)),
            ingest: IngestContext::new(),
            projector,
            render: RenderRequests::default(),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.projector(),
            config.display_settings(),
            config.ingest.table_capacity,
        )
    }

    /// Publish the staged burst, reproject it and request redraws.
    ///
    /// The caller must already have waited for the parser to stage the
    /// burst's records; see [`swap_next_burst`].
    pub async fn publish_burst(&self) -> BurstSummary {
        let projector = self.projector;
        let (published, (visible, range_km, selected, deselected)) = self
            .store
            .publish_then(|view| {
                let report = projector.reproject(view);
                (
                    report.visible,
                    view.display.range_km,
                    view.selection.callsign(),
                    report.deselected,
                )
            })
            .await;
        let burst = self.ingest.stats.burst_published();

        self.render.radar.request();
        if !matches!(published.selection, Rebind::Unselected) || deselected.is_some() {
            self.render.info.request();
        }

        BurstSummary {
            timestamp: Utc::now(),
            burst,
            tracks: published.tracks,
            visible,
            range_km,
            selected,
            ingest: self.ingest.stats.snapshot(),
        }
    }

    /// Apply one button-bank reading to the display settings.
    ///
    /// Returns `None` when no button is held.
    pub async fn apply_buttons(&self, mask: u8) -> Option<ControlOutcome> {
        let Some(action) = ControlAction::from_button_mask(mask) else {
            debug!("Button edge with no button held (mask {:#04x})", mask);
            return None;
        };

        let outcome = {
            let mut view = self.store.current().await;
            apply_control(&mut view, &self.projector, action)
        };

        if outcome.needs_render() {
            self.render.radar.request();
        }
        if outcome.reprojection.map_or(false, |r| r.deselected.is_some()) {
            self.render.info.request();
        }
        Some(outcome)
    }
}

/// Wait for the next burst-complete signal and publish exactly that burst.
///
/// Records of the following burst stay queued until this returns.
pub async fn swap_next_burst(shared: &Shared) -> BurstSummary {
    shared.ingest.burst_complete.wait().await;
    let burst = shared.ingest.wait_for_burst().await;
    let summary = shared.publish_burst().await;
    shared.ingest.bursts.mark_published(burst);
    summary
}

/// Swap task body: one publish per burst-complete signal.
pub async fn run_swap(shared: Shared, mut burst_log: Option<BurstLogger>) {
    loop {
        let summary = swap_next_burst(&shared).await;
        debug!(
            "Burst {}: {} tracks, {} visible at {} km",
            summary.burst, summary.tracks, summary.visible, summary.range_km
        );

        if let Some(logger) = burst_log.as_mut() {
            if let Err(e) = logger.log(&summary) {
                warn!("Failed to write burst log: {}", e);
            }
        }
    }
}

/// Range and overlay control driven by button edges
pub struct ControlWorker<B> {
    shared: Shared,
    buttons: Arc<Mutex<B>>,
    line: EdgeLine,
    timing: InputTiming,
}

impl<B: ButtonSource> ControlWorker<B> {
    pub fn new(shared: Shared, buttons: Arc<Mutex<B>>, line: EdgeLine, timing: InputTiming) -> Self {
        Self {
            shared,
            buttons,
            line,
            timing,
        }
    }

    /// Handle one debounced button edge.
    pub async fn step(&mut self) -> Option<ControlOutcome> {
        self.line.wait().await;
        sleep(self.timing.settle).await;

        let reading = self.buttons.lock().await.read_buttons();
        let outcome = match reading {
            Ok(mask) => self.shared.apply_buttons(mask).await,
            Err(e) => {
                warn!("Failed to read buttons: {}", e);
                None
            }
        };

        sleep(self.timing.rearm).await;
        self.line.rearm();
        outcome
    }

    pub async fn run(mut self) {
        loop {
            self.step().await;
        }
    }
}

/// Click-to-select and stick hopping
pub struct SelectionWorker<A> {
    shared: Shared,
    axes: Arc<Mutex<A>>,
    click: EdgeLine,
    classifier: DirectionClassifier,
    timing: InputTiming,
    /// Cleared by a hop, set again once the stick is back in the deadzone
    hop_armed: bool,
}

impl<A: AxisSource> SelectionWorker<A> {
    pub fn new(
        shared: Shared,
        axes: Arc<Mutex<A>>,
        click: EdgeLine,
        classifier: DirectionClassifier,
        timing: InputTiming,
    ) -> Self {
        Self {
            shared,
            axes,
            click,
            classifier,
            timing,
            hop_armed: false,
        }
    }

    /// Wait for a click while unselected, or poll the stick once while
    /// selected. Returns true if the selection changed.
    pub async fn step(&mut self) -> bool {
        let selected = self.shared.store.current().await.selection.is_selected();

        let changed = if selected {
            self.poll_stick().await
        } else {
            self.await_click().await
        };

        if changed {
            self.shared.render.request_all();
        }
        changed
    }

    pub async fn run(mut self) {
        loop {
            self.step().await;
        }
    }

    async fn await_click(&mut self) -> bool {
        self.click.wait().await;
        sleep(self.timing.settle).await;

        let reading = self.axes.lock().await.read_click();
        let changed = match reading {
            Ok(true) => {
                let center = self.shared.projector.viewport().center();
                let mut guard = self.shared.store.current().await;
                let view = &mut *guard;
                let changed = view.selection.click(&view.tracks, center);
                if changed {
                    info!("Selected {}", view.selection);
                } else {
                    debug!("Click with no track in range");
                }
                changed
            }
            Ok(false) => {
                debug!("Click edge without a held click");
                false
            }
            Err(e) => {
                warn!("Failed to read stick click: {}", e);
                false
            }
        };

        sleep(self.timing.rearm).await;
        self.click.rearm();
        self.hop_armed = false;
        changed
    }

    async fn poll_stick(&mut self) -> bool {
        sleep(self.timing.poll_interval).await;

        if self.click.try_wait() {
            debug!("Click ignored while a track is selected");
            sleep(self.timing.rearm).await;
            self.click.rearm();
        }

        let sample = match self.axes.lock().await.read_axes() {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Failed to read stick: {}", e);
                return false;
            }
        };

        if self.classifier.is_neutral(sample) {
            self.hop_armed = true;
            return false;
        }
        if !self.hop_armed {
            return false;
        }
        let Some(direction) = self.classifier.classify(sample) else {
            return false;
        };
        self.hop_armed = false;

        let mut guard = self.shared.store.current().await;
        let view = &mut *guard;
        let changed = view.selection.hop(&view.tracks, direction);
        if changed {
            info!(?direction, "Selection moved to {}", view.selection);
        } else {
            debug!(?direction, "No track that way");
        }
        changed
    }
}

/// Which pass a render task draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    Radar,
    Info,
}

/// Render task body: redraw `pass` on every refresh request.
pub async fn run_renderer<S: DisplaySurface>(
    store: Arc<TrackStore>,
    refresh: Refresh,
    surface: Arc<Mutex<S>>,
    layout: RenderLayout,
    pass: RenderPass,
) {
    loop {
        refresh.wait().await;

        let view = store.current().await;
        let mut surface = surface.lock().await;
        match pass {
            RenderPass::Radar => render_radar(&mut *surface, &view, &layout),
            RenderPass::Info => render_info(&mut *surface, &view, &layout),
        }
        trace!(?pass, "Frame drawn");
    }
}

#[derive(Debug)]
struct TaskHandle {
    name: &'static str,
    priority: Priority,
    handle: JoinHandle<()>,
}

/// Owns the spawned tasks
#[derive(Debug)]
pub struct Harness {
    shared: Shared,
    tasks: Vec<TaskHandle>,
}

impl Harness {
    #[must_use]
    pub fn new(shared: Shared) -> Self {
        Self {
            shared,
            tasks: Vec::new(),
        }
    }

    #[must_use]
    pub fn shared(&self) -> &Shared {
        &self.shared
    }

    /// Spawn the record parser and the link reader feeding it.
    ///
    /// When the link reaches end of stream the queue closes, the parser
    /// stops and the current table stays on display.
    pub fn spawn_ingest<L: TelemetryLink + 'static>(&mut self, link: L, queue_capacity: usize) {
        let (producer, consumer) = telemetry_queue(queue_capacity);

        let parser = RecordParser::new(consumer, Arc::clone(&self.shared.store), self.shared.ingest.clone());
        self.spawn(Priority::Parser, "parser", parser.run());

        let handler = LinkHandler::new(producer, self.shared.ingest.clone());
        self.spawn(Priority::Link, "link", async move {
            match run_link_reader(link, handler).await {
                Ok(()) => debug!("Link reader stopped"),
                Err(e) => error!("Telemetry link failed: {}", e),
            }
        });
    }

    pub fn spawn_swap(&mut self, burst_log: Option<BurstLogger>) {
        self.spawn(Priority::Swap, "swap", run_swap(self.shared.clone(), burst_log));
    }

    pub fn spawn_controls<B: ButtonSource + 'static>(&mut self, buttons: B, line: EdgeLine, timing: InputTiming) {
        let worker = ControlWorker::new(self.shared.clone(), Arc::new(Mutex::new(buttons)), line, timing);
        self.spawn(Priority::Control, "control", worker.run());
    }

    pub fn spawn_selection<A: AxisSource + 'static>(
        &mut self,
        axes: A,
        click: EdgeLine,
        classifier: DirectionClassifier,
        timing: InputTiming,
    ) {
        let worker = SelectionWorker::new(
            self.shared.clone(),
            Arc::new(Mutex::new(axes)),
            click,
            classifier,
            timing,
        );
        self.spawn(Priority::Selection, "selection", worker.run());
    }

    /// Spawn both render passes on one surface and draw the first frame.
    pub fn spawn_renderers<S: DisplaySurface + 'static>(&mut self, surface: Arc<Mutex<S>>, layout: RenderLayout) {
        let store = &self.shared.store;
        let radar = run_renderer(
            Arc::clone(store),
            self.shared.render.radar.clone(),
            Arc::clone(&surface),
            layout,
            RenderPass::Radar,
        );
        let info = run_renderer(
            Arc::clone(store),
            self.shared.render.info.clone(),
            surface,
            layout,
            RenderPass::Info,
        );

        self.spawn(Priority::MainRender, "render-main", radar);
        self.spawn(Priority::InfoRender, "render-info", info);
        self.shared.render.request_all();
    }

    /// Tasks spawned so far, in spawn order.
    pub fn tasks(&self) -> impl Iterator<Item = (&'static str, Priority)> + '_ {
        self.tasks.iter().map(|t| (t.name, t.priority))
    }

    /// Tasks that have not finished.
    #[must_use]
    pub fn running(&self) -> usize {
        self.tasks.iter().filter(|t| !t.handle.is_finished()).count()
    }

    /// Abort every task.
    pub fn shutdown(self) {
        for task in &self.tasks {
            task.handle.abort();
        }
        info!("Stopped {} tasks", self.tasks.len());
    }

    fn spawn<F>(&mut self, priority: Priority, name: &'static str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let span = info_span!("task", task = name, priority = priority.level());
        debug!("Spawning {} at priority {}", name, priority.level());
        let handle = tokio::spawn(future.instrument(span));
        self.tasks.push(TaskHandle {
            name,
            priority,
            handle,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{AxisSample, MockAxisSource, MockButtonSource, BUTTON_SW2, BUTTONS_RELEASED};
    use crate::protocol::encoder::{encode_burst, encode_record_words};
    use crate::protocol::wire::RECORD_SIZE;
    use crate::render::testing::RecordingSurface;
    use crate::selection::Selection;
    use crate::serial::port_trait::mocks::MockLink;
    use crate::track::{Callsign, TrackRecord};
    use std::collections::VecDeque;
    use tokio_test::{assert_pending, assert_ready, task};

    fn shared() -> Shared {
        Shared::from_config(&Config::default())
    }

    fn east_10km() -> TrackRecord {
        TrackRecord::new(Callsign::new("AAL1"), -82.25, 29.6465, 3000.0, 200.0, 90.0)
    }

    fn north_17km() -> TrackRecord {
        TrackRecord::new(Callsign::new("N1"), -82.3533, 29.8, 0.0, 0.0, 0.0)
    }

    async fn stage_and_publish(shared: &Shared, records: Vec<TrackRecord>) -> BurstSummary {
        for record in records {
            shared.store.stage(record).await.unwrap();
        }
        shared.publish_burst().await
    }

    fn scripted_axes(samples: Vec<AxisSample>) -> MockAxisSource {
        let mut samples = VecDeque::from(samples);
        let mut axes = MockAxisSource::new();
        axes.expect_read_axes()
            .returning(move || Ok(samples.pop_front().unwrap_or(AxisSample::new(2048, 2048))));
        axes.expect_read_click().returning(|| Ok(true));
        axes
    }

    #[test]
    fn test_priority_order() {
        assert!(Priority::Link < Priority::Parser);
        assert!(Priority::Parser < Priority::Swap);
        assert!(Priority::Swap < Priority::Control);
        assert!(Priority::Control < Priority::Selection);
        assert!(Priority::Selection < Priority::MainRender);
        assert!(Priority::MainRender < Priority::InfoRender);
        assert!(Priority::InfoRender < Priority::Idle);
        assert_eq!(Priority::Idle.level(), 255);
    }

    #[test]
    fn test_timing_from_config() {
        let timing = InputTiming::from(&InputConfig::default());
        assert_eq!(timing, InputTiming::default());
    }

    #[tokio::test]
    async fn test_publish_burst_reprojects_and_requests_radar() {
        let shared = shared();
        let summary = stage_and_publish(&shared, vec![east_10km(), north_17km()]).await;

        assert_eq!(summary.burst, 1);
        assert_eq!(summary.tracks, 2);
        assert_eq!(summary.visible, 2);
        assert_eq!(summary.range_km, 50);
        assert_eq!(summary.selected, None);
        assert_eq!(summary.ingest.bursts_published, 1);

        let view = shared.store.current().await;
        assert_eq!(view.tracks.get(0).unwrap().screen, Some(crate::track::ScreenPoint::new(140, 175)));
        drop(view);

        let mut radar = task::spawn(shared.render.radar.wait());
        assert_ready!(radar.poll());
        let mut info = task::spawn(shared.render.info.wait());
        assert_pending!(info.poll());
    }

    #[tokio::test]
    async fn test_publish_burst_rebinds_selection() {
        let shared = shared();
        stage_and_publish(&shared, vec![east_10km(), north_17km()]).await;
        {
            let mut view = shared.store.current().await;
            let view = &mut *view;
            view.selection = Selection::at(&view.tracks, 1);
        }

        // N1 moves to slot 0 in the next burst
        let summary = stage_and_publish(&shared, vec![north_17km(), east_10km()]).await;
        assert_eq!(summary.selected, Some(Callsign::new("N1")));
        assert_eq!(shared.store.current().await.selection.index(), Some(0));

        let mut info = task::spawn(shared.render.info.wait());
        assert_ready!(info.poll());
    }

    #[tokio::test]
    async fn test_range_down_deselects_out_of_range_track() {
        let shared = shared();
        // About 25 km north of the reference
        let far = TrackRecord::new(Callsign::new("N25"), -82.3533, 29.87, 0.0, 0.0, 0.0);
        stage_and_publish(&shared, vec![far]).await;
        {
            let mut view = shared.store.current().await;
            let view = &mut *view;
            view.selection = Selection::at(&view.tracks, 0);
        }

        shared.apply_buttons(!BUTTON_SW2).await.unwrap();
        shared.apply_buttons(!BUTTON_SW2).await.unwrap();
        assert!(shared.store.current().await.selection.is_selected());

        let outcome = shared.apply_buttons(!BUTTON_SW2).await.unwrap();
        assert_eq!(
            outcome.effect,
            crate::control::ControlEffect::RangeChanged { from_km: 30, to_km: 20 }
        );
        assert_eq!(
            outcome.reprojection.unwrap().deselected,
            Some(Callsign::new("N25"))
        );
        assert!(!shared.store.current().await.selection.is_selected());

        let mut info = task::spawn(shared.render.info.wait());
        assert_ready!(info.poll());
    }

    #[tokio::test]
    async fn test_released_mask_is_ignored() {
        let shared = shared();
        assert!(shared.apply_buttons(BUTTONS_RELEASED).await.is_none());
        assert_eq!(shared.store.current().await.display, DisplaySettings::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_control_worker_reads_after_edge_and_rearms() {
        let shared = shared();
        let mut buttons = MockButtonSource::new();
        buttons.expect_read_buttons().times(1).returning(|| Ok(!BUTTON_SW2));

        let line = EdgeLine::new();
        let mut worker = ControlWorker::new(
            shared.clone(),
            Arc::new(Mutex::new(buttons)),
            line.clone(),
            InputTiming::default(),
        );

        assert!(line.trigger());
        assert!(!line.trigger());
        let outcome = worker.step().await.unwrap();

        assert!(outcome.needs_render());
        assert!(line.is_armed());
        assert_eq!(shared.store.current().await.display.range_km, 40);
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_click_then_hop_once_per_tilt() {
        let shared = shared();
        stage_and_publish(&shared, vec![east_10km(), north_17km()]).await;

        let north = AxisSample::new(2048, 0);
        let neutral = AxisSample::new(2048, 2048);
        let axes = scripted_axes(vec![north, neutral, north]);

        let click = EdgeLine::new();
        let mut worker = SelectionWorker::new(
            shared.clone(),
            Arc::new(Mutex::new(axes)),
            click.clone(),
            DirectionClassifier::default(),
            InputTiming::default(),
        );

        // Click picks AAL1, nearest the center
        click.trigger();
        assert!(worker.step().await);
        assert_eq!(shared.store.current().await.selection.callsign(), Some(Callsign::new("AAL1")));
        assert!(click.is_armed());

        // Tilt held since the click: no hop until the stick returns to neutral
        assert!(!worker.step().await);
        assert!(!worker.step().await);
        assert!(worker.step().await);
        assert_eq!(shared.store.current().await.selection.callsign(), Some(Callsign::new("N1")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_while_selected_is_drained() {
        let shared = shared();
        stage_and_publish(&shared, vec![east_10km()]).await;
        {
            let mut view = shared.store.current().await;
            let view = &mut *view;
            view.selection = Selection::at(&view.tracks, 0);
        }

        let click = EdgeLine::new();
        let mut worker = SelectionWorker::new(
            shared.clone(),
            Arc::new(Mutex::new(scripted_axes(Vec::new()))),
            click.clone(),
            DirectionClassifier::default(),
            InputTiming::default(),
        );

        click.trigger();
        let started = tokio::time::Instant::now();
        assert!(!worker.step().await);
        assert!(click.is_armed());
        assert!(!click.try_wait());
        let timing = InputTiming::default();
        assert!(started.elapsed() >= timing.poll_interval + timing.rearm);
        assert_eq!(shared.store.current().await.selection.index(), Some(0));
    }

    async fn current_names(shared: &Shared) -> Vec<String> {
        let view = shared.store.current().await;
        view.tracks.iter().map(|t| t.callsign.to_string()).collect()
    }

    #[tokio::test]
    async fn test_back_to_back_bursts_publish_separately() {
        let shared = shared();
        let (producer, consumer) = telemetry_queue(256);
        let mut handler = LinkHandler::new(producer, shared.ingest.clone());
        let parser = RecordParser::new(consumer, Arc::clone(&shared.store), shared.ingest.clone());
        let parser = tokio::spawn(parser.run());

        let record = |name: &str| encode_record_words(name, -82.25, 29.6465, 3000.0, 200.0, 90.0);
        let mut stream = encode_burst(vec![record("A1"), record("A2")]).to_vec();
        let first_len = stream.len();
        stream.extend_from_slice(&encode_burst(vec![record("B1"), record("B2")]));

        // One read ends the first burst and starts the second
        let split = first_len + RECORD_SIZE;
        handler.on_bytes(&stream[..split]);

        let first = swap_next_burst(&shared).await;
        assert_eq!(first.burst, 1);
        assert_eq!(first.tracks, 2);
        assert_eq!(current_names(&shared).await, ["A1", "A2"]);

        handler.on_bytes(&stream[split..]);

        let second = swap_next_burst(&shared).await;
        assert_eq!(second.burst, 2);
        assert_eq!(second.tracks, 2);
        assert_eq!(current_names(&shared).await, ["B1", "B2"]);

        handler.close();
        parser.await.unwrap();
        assert_eq!(shared.store.staging_len().await, 0);
        assert_eq!(shared.ingest.stats.snapshot().records_parsed, 4);
    }

    #[tokio::test]
    async fn test_selection_follows_each_burst_in_one_read() {
        let shared = shared();
        let (producer, consumer) = telemetry_queue(256);
        let mut handler = LinkHandler::new(producer, shared.ingest.clone());
        let parser = RecordParser::new(consumer, Arc::clone(&shared.store), shared.ingest.clone());
        let parser = tokio::spawn(parser.run());

        let record = |name: &str| encode_record_words(name, -82.25, 29.6465, 3000.0, 200.0, 90.0);
        handler.on_bytes(&encode_burst(vec![record("A1"), record("B1")]));
        swap_next_burst(&shared).await;
        {
            let mut view = shared.store.current().await;
            let view = &mut *view;
            view.selection = Selection::at(&view.tracks, 1);
        }

        // Two whole bursts in one read; B1 leads the second
        let mut stream = encode_burst(vec![record("A1")]).to_vec();
        stream.extend_from_slice(&encode_burst(vec![record("B1"), record("A1")]));
        handler.on_bytes(&stream);

        swap_next_burst(&shared).await;
        assert_eq!(current_names(&shared).await, ["A1"]);
        assert!(!shared.store.current().await.selection.is_selected());

        swap_next_burst(&shared).await;
        assert_eq!(current_names(&shared).await, ["B1", "A1"]);

        handler.close();
        parser.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_end_to_end_burst_reaches_display() {
        let burst = encode_burst(vec![
            encode_record_words("AAL1", -82.25, 29.6465, 3000.0, 200.0, 90.0),
            encode_record_words("FAR9", -82.3533, 35.0, 9000.0, 250.0, 180.0),
        ]);
        let link = MockLink::new().with_chunks_of(&burst, 5);

        let mut harness = Harness::new(shared());
        let surface = Arc::new(Mutex::new(RecordingSurface::default()));
        harness.spawn_ingest(link, 256);
        harness.spawn_swap(None);
        harness.spawn_renderers(Arc::clone(&surface), RenderLayout::default());

        let names: Vec<_> = harness.tasks().map(|(name, _)| name).collect();
        assert_eq!(names, ["parser", "link", "swap", "render-main", "render-info"]);

        let shared = harness.shared().clone();
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let published = shared.ingest.stats.snapshot().bursts_published == 1;
                if published && surface.lock().await.texts().contains(&"AAL1") {
                    break;
                }
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        let view = shared.store.current().await;
        assert_eq!(view.tracks.len(), 2);
        assert_eq!(view.tracks.visible_count(), 1);
        assert_eq!(shared.ingest.stats.snapshot().records_parsed, 2);
        assert!(!surface.lock().await.texts().contains(&"FAR9"));
        drop(view);

        harness.shutdown();
    }
}
