use std::sync::Arc;

use crate::core::Config;
use crate::core::orchestrator::Orchestrator;
use crate::output::{Output, Sink};
use crate::subscribers::Subscribe;
use crate::sync::MutexRegistry;

/// Builder for an [`Orchestrator`] with optional subscribers, output sink and
/// a shared mutex registry.
pub struct OrchestratorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    sink: Sink,
    mutexes: Option<Arc<MutexRegistry>>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            sink: Sink::default(),
            mutexes: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (registration, unit lifecycle,
    /// failures) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Sends unit output to `sink` instead of stdout.
    pub fn with_output(mut self, sink: Sink) -> Self {
        self.sink = sink;
        self
    }

    /// Uses an existing mutex registry, e.g. one shared with code outside the run.
    ///
    /// Its default id takes precedence over `Config::default_mutex`.
    pub fn with_mutexes(mut self, mutexes: Arc<MutexRegistry>) -> Self {
        self.mutexes = Some(mutexes);
        self
    }

    /// Builds the orchestrator. Needs no runtime; units are spawned at start.
    pub fn build(self) -> Orchestrator {
        let output = Arc::new(Output::new(self.sink, &self.cfg));
        let mutexes = self
            .mutexes
            .unwrap_or_else(|| Arc::new(MutexRegistry::new(self.cfg.default_mutex.clone())));
        Orchestrator::from_parts(self.cfg, self.subscribers, output, mutexes)
    }
}
