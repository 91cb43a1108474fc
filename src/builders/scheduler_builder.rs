//! Builder assembling a [`Scheduler`] from configuration and collaborators.

use std::sync::Arc;

use crate::config::GlobalConfig;
use crate::core::activity::ActivityMonitor;
use crate::core::audit::AuditSink;
use crate::core::error::{AppResult, SchedulerError};
use crate::core::loader::Loader;
use crate::core::priority::PriorityScorer;
use crate::core::scheduler::{Scheduler, SchedulerParts};
use crate::core::spawn::Spawn;

/// Collects the scheduler's collaborators; unset parts take defaults.
///
/// ```rust,ignore
/// let scheduler = SchedulerBuilder::new(loader, TokioSpawner::current())
///     .config(GlobalConfig::from_env()?)
///     .audit(Arc::new(TracingAuditSink))
///     .build()?;
/// ```
pub struct SchedulerBuilder<L, S> {
    loader: L,
    spawner: S,
    config: GlobalConfig,
    monitor: Option<ActivityMonitor>,
    scorer: PriorityScorer,
    audit: Option<Arc<dyn AuditSink>>,
}

impl<L, S> SchedulerBuilder<L, S>
where
    L: Loader,
    S: Spawn + Clone + Send + Sync + 'static,
{
    /// Start from the default configuration.
    pub fn new(loader: L, spawner: S) -> Self {
        Self {
            loader,
            spawner,
            config: GlobalConfig::default(),
            monitor: None,
            scorer: PriorityScorer::default(),
            audit: None,
        }
    }

    /// Use an explicit configuration.
    #[must_use]
    pub fn config(mut self, config: GlobalConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from `LOAD_SCHEDULER_*` environment variables.
    pub fn config_from_env(mut self) -> AppResult<Self> {
        self.config = GlobalConfig::from_env()?;
        Ok(self)
    }

    /// Share an existing activity monitor. Its settings are overwritten by the
    /// configuration at build time.
    #[must_use]
    pub fn monitor(mut self, monitor: ActivityMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Replace the priority scorer.
    #[must_use]
    pub const fn scorer(mut self, scorer: PriorityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Record lifecycle events to an audit sink.
    #[must_use]
    pub fn audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Configuration the scheduler will be built with.
    pub const fn configuration(&self) -> &GlobalConfig {
        &self.config
    }

    /// Validate and build.
    pub fn build(self) -> Result<Scheduler<L, S>, SchedulerError> {
        let monitor = self
            .monitor
            .unwrap_or_else(|| ActivityMonitor::new(self.config.monitor_settings()));
        Scheduler::from_parts(SchedulerParts {
            config: self.config,
            loader: self.loader,
            monitor,
            spawner: self.spawner,
            scorer: self.scorer,
            audit: self.audit,
        })
    }
}
