//! Tick scheduling and frame publication.
//!
//! A [`Graph`] binds one active provider to its history, axis scaler,
//! configuration and caption. The [`Sampler`] runs every graph on a
//! dedicated thread and publishes an immutable [`Frame`] after each tick,
//! then signals its [`Notifier`]. Consumers only ever see whole frames.
//!
//! Activation, deactivation, reconfiguration, pause and resume are requests
//! handled by the sampler thread between ticks, so a provider is never
//! dropped or reconfigured while it is sampling.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::autoscaler::AutoScaler;
use crate::caption::{Caption, CaptionComponent};
use crate::collector::{CommandRunner, FileSystem, Sources};
use crate::dataset::{Dataset, DatasetMode};
use crate::notifier::Notifier;
use crate::provider::{
    Provider, ProviderConfig, ProviderDescriptor, ProviderError, SamplingContext, Severity, find,
};

/// Identifies an active graph for the lifetime of a sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GraphId(pub u32);

impl std::fmt::Display for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Failure of the latest tick, as shown to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphError {
    pub message: String,
    pub severity: Severity,
}

impl From<&ProviderError> for GraphError {
    fn from(e: &ProviderError) -> Self {
        Self {
            message: e.message().to_string(),
            severity: e.severity(),
        }
    }
}

/// Immutable copy of a graph's committed state.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSnapshot {
    pub id: GraphId,
    pub provider: &'static str,
    pub label: &'static str,
    pub paused: bool,
    pub ceiling: u64,
    pub dataset: Dataset,
    pub caption: Caption,
    pub error: Option<GraphError>,
    pub footprint: usize,
}

/// Everything a consumer needs to draw one tick.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub tick: u64,
    pub timestamp: DateTime<Utc>,
    pub graphs: Vec<GraphSnapshot>,
}

impl Frame {
    fn empty() -> Self {
        Self {
            tick: 0,
            timestamp: Utc::now(),
            graphs: Vec::new(),
        }
    }

    pub fn graph(&self, id: GraphId) -> Option<&GraphSnapshot> {
        self.graphs.iter().find(|g| g.id == id)
    }
}

/// One active provider with its history.
pub struct Graph {
    id: GraphId,
    descriptor: &'static ProviderDescriptor,
    provider: Box<dyn Provider>,
    config: ProviderConfig,
    dataset: Dataset,
    scaler: AutoScaler,
    caption: Caption,
    first_call: bool,
    paused: bool,
    error: Option<ProviderError>,
}

impl Graph {
    /// Creates the provider registered under `name` with default settings.
    pub fn activate(
        id: GraphId,
        name: &str,
        capacity: usize,
        interval_ms: u64,
        sources: Sources<'_>,
    ) -> Result<Self, ProviderError> {
        let descriptor = find(name)
            .ok_or_else(|| ProviderError::Configuration(format!("unknown provider '{}'", name)))?;
        let dataset = Dataset::allocate(descriptor.n, capacity, descriptor.mode, interval_ms)
            .map_err(|e| {
                ProviderError::Allocation(format!(
                    "cannot hold {} samples for '{}': {}",
                    capacity, descriptor.name, e
                ))
            })?;
        let mut config = ProviderConfig::new();
        let provider = (descriptor.init)(&mut config)?;

        info!(graph = %id, provider = descriptor.name, "activated");
        let mut graph = Self {
            id,
            descriptor,
            provider,
            config,
            dataset,
            scaler: AutoScaler::new(0),
            caption: Caption::new(),
            first_call: true,
            paused: false,
            error: None,
        };
        graph.reconfigure(sources);
        Ok(graph)
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn descriptor(&self) -> &'static ProviderDescriptor {
        self.descriptor
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn ceiling(&self) -> u64 {
        self.scaler.ceiling()
    }

    pub fn caption(&self) -> &Caption {
        &self.caption
    }

    pub fn last_error(&self) -> Option<&ProviderError> {
        self.error.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Applies persisted settings, then lets the provider re-read them.
    ///
    /// Every valid setting is applied even if another one is rejected; the
    /// first rejection is returned and the rejected entry keeps its value.
    pub fn configure<'k, I>(&mut self, sources: Sources<'_>, settings: I) -> Result<(), ProviderError>
    where
        I: IntoIterator<Item = (&'k str, &'k str)>,
    {
        let mut first_error = None;
        for (key, value) in settings {
            if let Err(e) = self.config.set_from_str(key, value) {
                warn!(graph = %self.id, key, value, error = %e, "rejected setting");
                first_error.get_or_insert(e);
            }
        }
        self.reconfigure(sources);
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    fn reconfigure(&mut self, sources: Sources<'_>) {
        let mut ctx = SamplingContext::new(sources, &self.config, self.descriptor.n, self.first_call);
        self.provider.configure(&mut ctx);
        let (need_reset, first_call) = (ctx.need_data_reset(), ctx.is_first_call());

        if need_reset {
            debug!(graph = %self.id, "configuration changed, discarding history");
            self.dataset.clear();
            self.scaler.reset();
            self.caption.clear();
            if self.descriptor.mode == DatasetMode::Delta {
                self.first_call = true;
            }
        }
        self.first_call |= first_call;
    }

    /// Stops sampling until [`Graph::resume`]. History is kept.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self, sources: Sources<'_>) {
        if !self.paused {
            return;
        }
        self.paused = false;
        let mut ctx = SamplingContext::new(sources, &self.config, self.descriptor.n, self.first_call);
        self.provider.resume(&mut ctx);
        self.first_call |= ctx.is_first_call();
    }

    /// Samples once and commits the result. A failed tick leaves history,
    /// ceiling and caption untouched; the next tick retries.
    pub fn tick(&mut self, sources: Sources<'_>) -> Result<(), ProviderError> {
        if self.paused {
            return Ok(());
        }

        let result = {
            let mut ctx =
                SamplingContext::new(sources, &self.config, self.descriptor.n, self.first_call);
            self.provider
                .sample(&mut ctx)
                .and_then(|()| ctx.into_sample())
        };

        let (values, floor) = match result {
            Ok(sample) => sample,
            Err(e) => {
                warn!(graph = %self.id, provider = self.descriptor.name, error = %e, "tick failed");
                self.error = Some(e.clone());
                return Err(e);
            }
        };

        self.dataset
            .push(&values)
            .map_err(|e| ProviderError::DataUnavailable(e.to_string()))?;
        self.scaler.set_floor(floor);
        self.scaler
            .update(values.iter().copied().max().unwrap_or(0));
        self.first_call = false;
        self.error = None;

        self.caption.clear();
        self.caption
            .set(CaptionComponent::Title, format_args!("{}", self.descriptor.label));
        self.provider.caption(&mut self.caption, &self.dataset);
        Ok(())
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            id: self.id,
            provider: self.descriptor.name,
            label: self.descriptor.label,
            paused: self.paused,
            ceiling: self.scaler.ceiling(),
            dataset: self.dataset.clone(),
            caption: self.caption.clone(),
            error: self.error.as_ref().map(GraphError::from),
            footprint: self.footprint(),
        }
    }

    /// Approximate heap usage of the graph in bytes.
    pub fn footprint(&self) -> usize {
        self.provider.footprint()
            + self.config.footprint()
            + self.dataset.footprint()
            + self.scaler.footprint()
    }
}

/// Error returned by sampler requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamplerError {
    /// No active graph with this id.
    UnknownGraph(GraphId),
    /// The provider rejected activation or configuration.
    Provider(ProviderError),
    /// The sampler thread is gone.
    Stopped,
}

impl std::fmt::Display for SamplerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplerError::UnknownGraph(id) => write!(f, "no active graph {}", id),
            SamplerError::Provider(e) => write!(f, "{}", e),
            SamplerError::Stopped => write!(f, "sampler is not running"),
        }
    }
}

impl std::error::Error for SamplerError {}

impl From<ProviderError> for SamplerError {
    fn from(e: ProviderError) -> Self {
        SamplerError::Provider(e)
    }
}

/// Sampler timing and history length.
#[derive(Debug, Clone, Copy)]
pub struct SamplerOptions {
    pub interval: Duration,
    /// Samples kept per series.
    pub capacity: usize,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            capacity: 120,
        }
    }
}

/// Latest frame, replaced wholesale after every tick.
#[derive(Debug)]
pub struct Published {
    frame: Mutex<Arc<Frame>>,
}

impl Published {
    fn new() -> Self {
        Self {
            frame: Mutex::new(Arc::new(Frame::empty())),
        }
    }

    fn store(&self, frame: Frame) {
        let frame = Arc::new(frame);
        match self.frame.lock() {
            Ok(mut slot) => *slot = frame,
            Err(poisoned) => *poisoned.into_inner() = frame,
        }
    }

    pub fn load(&self) -> Arc<Frame> {
        match self.frame.lock() {
            Ok(slot) => Arc::clone(&slot),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }
}

enum Request {
    Activate {
        name: String,
        settings: Vec<(String, String)>,
    },
    Deactivate(GraphId),
    Configure {
        id: GraphId,
        key: String,
        value: String,
    },
    Pause(GraphId),
    Resume(GraphId),
}

type Reply = Result<GraphId, SamplerError>;

enum Message {
    Request(Request, mpsc::Sender<Reply>),
    Shutdown,
}

/// State owned by the sampler thread.
struct Worker {
    options: SamplerOptions,
    fs: Arc<dyn FileSystem>,
    commands: Arc<dyn CommandRunner>,
    graphs: Vec<Graph>,
    next_id: u32,
    tick: u64,
    published: Arc<Published>,
    notifier: Arc<Notifier>,
}

impl Worker {
    fn graph_mut(&mut self, id: GraphId) -> Result<&mut Graph, SamplerError> {
        self.graphs
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(SamplerError::UnknownGraph(id))
    }

    fn apply(&mut self, request: Request) -> Reply {
        let interval_ms = self.options.interval.as_millis() as u64;
        match request {
            Request::Activate { name, settings } => {
                let id = GraphId(self.next_id);
                let sources = Sources::new(self.fs.as_ref(), self.commands.as_ref());
                let mut graph =
                    Graph::activate(id, &name, self.options.capacity, interval_ms, sources)?;
                // a rejected setting keeps its default; the graph is still wanted
                if let Err(e) = graph.configure(
                    sources,
                    settings.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                ) {
                    warn!(
                        graph = %id,
                        provider = %name,
                        error = %e,
                        "activated with default for rejected setting"
                    );
                }
                self.next_id += 1;
                self.graphs.push(graph);
                Ok(id)
            }
            Request::Deactivate(id) => {
                let index = self
                    .graphs
                    .iter()
                    .position(|g| g.id == id)
                    .ok_or(SamplerError::UnknownGraph(id))?;
                let graph = self.graphs.remove(index);
                info!(graph = %id, provider = graph.descriptor.name, "deactivated");
                drop(graph);
                Ok(id)
            }
            Request::Configure { id, key, value } => {
                let sources = Sources::new(self.fs.as_ref(), self.commands.as_ref());
                let graph = self
                    .graphs
                    .iter_mut()
                    .find(|g| g.id == id)
                    .ok_or(SamplerError::UnknownGraph(id))?;
                graph.configure(sources, [(key.as_str(), value.as_str())])?;
                Ok(id)
            }
            Request::Pause(id) => {
                self.graph_mut(id)?.pause();
                Ok(id)
            }
            Request::Resume(id) => {
                let sources = Sources::new(self.fs.as_ref(), self.commands.as_ref());
                let graph = self
                    .graphs
                    .iter_mut()
                    .find(|g| g.id == id)
                    .ok_or(SamplerError::UnknownGraph(id))?;
                graph.resume(sources);
                Ok(id)
            }
        }
    }

    fn tick(&mut self) {
        self.tick += 1;
        let sources = Sources::new(self.fs.as_ref(), self.commands.as_ref());
        let mut failed = 0;
        for graph in &mut self.graphs {
            if graph.tick(sources).is_err() {
                failed += 1;
            }
        }
        debug!(tick = self.tick, graphs = self.graphs.len(), failed, "tick done");
        self.publish();
    }

    fn publish(&self) {
        self.published.store(Frame {
            tick: self.tick,
            timestamp: Utc::now(),
            graphs: self.graphs.iter().map(Graph::snapshot).collect(),
        });
        self.notifier.signal();
    }

    fn run(mut self, messages: mpsc::Receiver<Message>) {
        info!(
            interval_ms = self.options.interval.as_millis() as u64,
            capacity = self.options.capacity,
            "sampler started"
        );
        let mut next_tick = Instant::now();
        loop {
            let now = Instant::now();
            if now >= next_tick {
                self.tick();
                next_tick += self.options.interval;
                if next_tick <= now {
                    // fell behind by more than one interval; skip the backlog
                    next_tick = now + self.options.interval;
                }
            }

            match messages.recv_timeout(next_tick.saturating_duration_since(Instant::now())) {
                Ok(Message::Request(request, reply)) => {
                    let result = self.apply(request);
                    if result.is_ok() {
                        self.publish();
                    }
                    let _ = reply.send(result);
                }
                Ok(Message::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
        info!(tick = self.tick, "sampler stopped");
    }
}

/// Handle to the sampler thread. Dropping it stops the thread and drops
/// every provider on it.
pub struct Sampler {
    messages: mpsc::Sender<Message>,
    published: Arc<Published>,
    notifier: Arc<Notifier>,
    worker: Option<JoinHandle<()>>,
}

impl Sampler {
    pub fn spawn(
        options: SamplerOptions,
        fs: Arc<dyn FileSystem>,
        commands: Arc<dyn CommandRunner>,
    ) -> io::Result<Self> {
        let published = Arc::new(Published::new());
        let notifier = Arc::new(Notifier::new());
        let (tx, rx) = mpsc::channel();

        let worker = Worker {
            options,
            fs,
            commands,
            graphs: Vec::new(),
            next_id: 1,
            tick: 0,
            published: Arc::clone(&published),
            notifier: Arc::clone(&notifier),
        };
        let handle = thread::Builder::new()
            .name("sampler".to_string())
            .spawn(move || worker.run(rx))?;

        Ok(Self {
            messages: tx,
            published,
            notifier,
            worker: Some(handle),
        })
    }

    fn request(&self, request: Request) -> Reply {
        let (tx, rx) = mpsc::channel();
        self.messages
            .send(Message::Request(request, tx))
            .map_err(|_| SamplerError::Stopped)?;
        rx.recv().map_err(|_| SamplerError::Stopped)?
    }

    /// Activates a provider with persisted settings (`key`, `text`).
    pub fn activate(&self, name: &str, settings: &[(String, String)]) -> Result<GraphId, SamplerError> {
        self.request(Request::Activate {
            name: name.to_string(),
            settings: settings.to_vec(),
        })
    }

    /// Removes a graph. Returns after its provider was dropped.
    pub fn deactivate(&self, id: GraphId) -> Result<(), SamplerError> {
        self.request(Request::Deactivate(id)).map(|_| ())
    }

    pub fn configure(&self, id: GraphId, key: &str, value: &str) -> Result<(), SamplerError> {
        self.request(Request::Configure {
            id,
            key: key.to_string(),
            value: value.to_string(),
        })
        .map(|_| ())
    }

    pub fn pause(&self, id: GraphId) -> Result<(), SamplerError> {
        self.request(Request::Pause(id)).map(|_| ())
    }

    pub fn resume(&self, id: GraphId) -> Result<(), SamplerError> {
        self.request(Request::Resume(id)).map(|_| ())
    }

    /// Most recently published frame.
    pub fn latest(&self) -> Arc<Frame> {
        self.published.load()
    }

    /// Signaled after every published frame.
    pub fn notifier(&self) -> Arc<Notifier> {
        Arc::clone(&self.notifier)
    }

    /// Stops the sampler thread and waits for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.messages.send(Message::Shutdown);
        if let Some(handle) = self.worker.take()
            && handle.join().is_err()
        {
            warn!("sampler thread panicked");
        }
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{MockCommands, MockFs};

    fn sources<'a>(fs: &'a MockFs, commands: &'a MockCommands) -> Sources<'a> {
        Sources::new(fs, commands)
    }

    #[test]
    fn test_graph_commits_values_and_ceiling() {
        let mut fs = MockFs::typical_system();
        let commands = MockCommands::new();
        let mut graph =
            Graph::activate(GraphId(1), "net", 10, 1000, sources(&fs, &commands)).unwrap();

        graph.tick(sources(&fs, &commands)).unwrap();
        assert_eq!(graph.dataset().len(), 1);
        assert_eq!(graph.ceiling(), 100);

        fs.set_net_dev(&[
            ("lo", 12345678, 9876, 12345678, 9876),
            ("eth0", 987654321 + 50_000, 654321, 123456789, 456789),
        ]);
        graph.tick(sources(&fs, &commands)).unwrap();
        assert_eq!(graph.dataset().latest(0), 50_000);
        assert_eq!(graph.ceiling(), 50_000);
        assert_eq!(graph.caption().get(CaptionComponent::Title), "Network");
    }

    #[test]
    fn test_failed_tick_commits_nothing_and_is_retried() {
        let mut fs = MockFs::typical_system();
        let commands = MockCommands::new();
        let mut graph =
            Graph::activate(GraphId(1), "load", 10, 1000, sources(&fs, &commands)).unwrap();
        graph.tick(sources(&fs, &commands)).unwrap();

        fs.remove("/proc/loadavg");
        assert!(graph.tick(sources(&fs, &commands)).is_err());
        assert_eq!(graph.dataset().len(), 1);
        let snapshot = graph.snapshot();
        assert_eq!(snapshot.error.unwrap().severity, Severity::Warning);

        fs.add_file("/proc/loadavg", "1.00 0.50 0.25 1/100 1\n");
        graph.tick(sources(&fs, &commands)).unwrap();
        assert_eq!(graph.dataset().len(), 2);
        assert!(graph.last_error().is_none());
    }

    #[test]
    fn test_config_change_resets_history() {
        let mut fs = MockFs::typical_system();
        let commands = MockCommands::new();
        let mut graph =
            Graph::activate(GraphId(1), "net", 10, 1000, sources(&fs, &commands)).unwrap();
        graph.tick(sources(&fs, &commands)).unwrap();
        graph.tick(sources(&fs, &commands)).unwrap();

        graph
            .configure(sources(&fs, &commands), [("use_packets", "true")])
            .unwrap();
        assert!(graph.dataset().is_empty());
        assert_eq!(graph.ceiling(), 100);

        // first tick after reset is suppressed even though counters moved
        fs.set_net_dev(&[("eth0", 1, 999_999, 1, 999_999)]);
        graph.tick(sources(&fs, &commands)).unwrap();
        assert_eq!(graph.dataset().latest(0), 0);
    }

    #[test]
    fn test_rejected_setting_keeps_previous_value() {
        let fs = MockFs::typical_system();
        let commands = MockCommands::new();
        let mut graph =
            Graph::activate(GraphId(1), "net", 10, 1000, sources(&fs, &commands)).unwrap();

        let err = graph
            .configure(
                sources(&fs, &commands),
                [("count_in", "maybe"), ("count_out", "false")],
            )
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
        assert_eq!(graph.config().get_bool("count_in"), Some(true));
        assert_eq!(graph.config().get_bool("count_out"), Some(false));
    }

    #[test]
    fn test_pause_and_resume() {
        let mut fs = MockFs::typical_system();
        let commands = MockCommands::new();
        let mut graph =
            Graph::activate(GraphId(1), "net", 10, 1000, sources(&fs, &commands)).unwrap();
        graph.tick(sources(&fs, &commands)).unwrap();

        graph.pause();
        graph.tick(sources(&fs, &commands)).unwrap();
        assert_eq!(graph.dataset().len(), 1);

        fs.set_net_dev(&[("eth0", u64::MAX / 2, 1, u64::MAX / 2, 1)]);
        graph.resume(sources(&fs, &commands));
        graph.tick(sources(&fs, &commands)).unwrap();
        assert_eq!(graph.dataset().len(), 2);
        assert_eq!(graph.dataset().latest(0), 0);
        assert_eq!(graph.dataset().latest(1), 0);
    }

    #[test]
    fn test_unknown_provider() {
        let fs = MockFs::new();
        let commands = MockCommands::new();
        assert!(matches!(
            Graph::activate(GraphId(1), "gpu", 10, 1000, sources(&fs, &commands)),
            Err(ProviderError::Configuration(_))
        ));
    }

    #[test]
    fn test_oversized_history_is_allocation_error() {
        let fs = MockFs::typical_system();
        let commands = MockCommands::new();
        let err = Graph::activate(GraphId(1), "net", usize::MAX / 4, 1000, sources(&fs, &commands))
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::Allocation(_)));
        assert_eq!(err.severity(), Severity::Error);
    }

    #[test]
    fn test_sampler_survives_failed_allocation() {
        let options = SamplerOptions {
            interval: Duration::from_millis(1000),
            capacity: usize::MAX / 4,
        };
        let sampler = Sampler::spawn(
            options,
            Arc::new(MockFs::typical_system()),
            Arc::new(MockCommands::new()),
        )
        .unwrap();

        for name in ["load", "mem"] {
            assert!(matches!(
                sampler.activate(name, &[]),
                Err(SamplerError::Provider(ProviderError::Allocation(_)))
            ));
        }
        assert_eq!(
            sampler.pause(GraphId(42)),
            Err(SamplerError::UnknownGraph(GraphId(42)))
        );
    }

    fn wait_for_tick(sampler: &Sampler, tick: u64) -> Arc<Frame> {
        let notifier = sampler.notifier();
        for _ in 0..1000 {
            let frame = sampler.latest();
            if frame.tick >= tick {
                return frame;
            }
            notifier.wait();
        }
        panic!("sampler did not reach tick {}", tick);
    }

    #[test]
    fn test_sampler_publishes_frames() {
        let options = SamplerOptions {
            interval: Duration::from_millis(5),
            capacity: 4,
        };
        let sampler = Sampler::spawn(
            options,
            Arc::new(MockFs::typical_system()),
            Arc::new(MockCommands::new()),
        )
        .unwrap();

        let load = sampler.activate("load", &[]).unwrap();
        let mem = sampler.activate("mem", &[]).unwrap();
        assert_ne!(load, mem);

        let start = sampler.latest().tick;
        let frame = wait_for_tick(&sampler, start + 6);
        let graph = frame.graph(load).unwrap();
        assert_eq!(graph.provider, "load");
        assert_eq!(graph.dataset.latest(0), 15);
        assert!(graph.dataset.len() <= 4);
        assert!(frame.graph(mem).is_some());

        sampler.deactivate(load).unwrap();
        assert!(sampler.latest().graph(load).is_none());
        assert_eq!(
            sampler.deactivate(load),
            Err(SamplerError::UnknownGraph(load))
        );

        sampler.shutdown();
    }

    #[test]
    fn test_sampler_activation_and_requests() {
        let sampler = Sampler::spawn(
            SamplerOptions::default(),
            Arc::new(MockFs::typical_system()),
            Arc::new(MockCommands::new()),
        )
        .unwrap();

        assert!(matches!(
            sampler.activate("gpu", &[]),
            Err(SamplerError::Provider(ProviderError::Configuration(_)))
        ));
        assert!(sampler.latest().graphs.is_empty());

        let kept = sampler
            .activate(
                "net",
                &[
                    ("filter".into(), "a\nb".into()),
                    ("use_packets".into(), "true".into()),
                ],
            )
            .unwrap();
        let frame = sampler.latest();
        assert_eq!(frame.graph(kept).unwrap().provider, "net");
        sampler.deactivate(kept).unwrap();

        let id = sampler
            .activate("net", &[("filter".into(), "eth0".into())])
            .unwrap();
        sampler.configure(id, "count_local", "false").unwrap();
        assert!(sampler.configure(id, "nope", "1").is_err());
        sampler.pause(id).unwrap();
        assert!(sampler.latest().graph(id).unwrap().paused);
        sampler.resume(id).unwrap();
        assert!(!sampler.latest().graph(id).unwrap().paused);
    }
}
