//! Loader port: the deferred unit of work the scheduler invokes.

use std::future::Future;

use async_trait::async_trait;

use crate::core::error::LoadFailure;

/// Outcome of one loader invocation.
pub type LoadOutcome = Result<(), LoadFailure>;

/// Abstraction for performing a task's load.
///
/// The scheduler treats the loader as opaque and non-interruptible: every
/// invocation must eventually resolve exactly once. A hanging invocation is
/// bounded only by the configured `load_timeout`.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use prometheus_load_scheduler::core::{LoadFailure, Loader};
///
/// struct ModuleLoader;
///
/// #[async_trait]
/// impl Loader for ModuleLoader {
///     async fn load(&self, task_id: &str) -> Result<(), LoadFailure> {
///         fetch_module(task_id).await.map_err(|e| LoadFailure::new(e.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    /// Load the task identified by `task_id`.
    async fn load(&self, task_id: &str) -> LoadOutcome;
}

/// Adapter turning an async closure into a [`Loader`].
#[derive(Clone)]
pub struct LoaderFn<F> {
    f: F,
}

impl<F> LoaderFn<F> {
    /// Wrap a closure `Fn(String) -> impl Future<Output = LoadOutcome>`.
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Loader for LoaderFn<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = LoadOutcome> + Send + 'static,
{
    async fn load(&self, task_id: &str) -> LoadOutcome {
        (self.f)(task_id.to_string()).await
    }
}
