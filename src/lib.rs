//! # Prometheus Load Scheduler
//!
//! A deferred-work scheduler that loads non-critical components once the
//! critical path is done: when the consumer goes idle, when a named event
//! fires, when a predicate holds, or on explicit request.
//!
//! ## Core Problem Solved
//!
//! Applications ship many components that are not needed for first use.
//! Loading them eagerly competes with the work the user is waiting for;
//! loading them lazily makes the first interaction with each one slow. The
//! scheduler sits between the two:
//!
//! - **Triggers**: each task declares when it becomes eligible (immediately,
//!   on idle, on the next idle edge, on an event, or on a condition)
//! - **Priority Queue**: eligible tasks are ordered by importance, estimated
//!   cost and recent consumer activity, FIFO among equal scores
//! - **Concurrency Budget**: at most `max_concurrent_loads` loader invocations
//!   run at once, and never more than one per task
//! - **Retries**: failed attempts are resubmitted after a delay until the
//!   retry bound is exhausted
//! - **Observability**: per-task state, aggregate metrics, an audit trail and
//!   structured `tracing` logs
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use prometheus_load_scheduler::builders::SchedulerBuilder;
//! use prometheus_load_scheduler::config::GlobalConfig;
//! use prometheus_load_scheduler::core::{Importance, LoaderFn, TaskDeclaration, Trigger};
//! use prometheus_load_scheduler::runtime::TokioSpawner;
//!
//! let scheduler = SchedulerBuilder::new(
//!     LoaderFn::new(|id| async move { import_module(&id).await }),
//!     TokioSpawner::current(),
//! )
//! .config(GlobalConfig::from_env()?)
//! .build()?;
//! scheduler.start();
//!
//! scheduler.register(TaskDeclaration::new(
//!     "analytics",
//!     Importance::Low,
//!     Trigger::OnIdle,
//!     Duration::from_millis(300),
//! ))?;
//!
//! // Feed consumer activity into the idle detector.
//! scheduler.pulse();
//! ```
//!
//! For complete scenarios, see `tests/scheduler_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: tasks, triggers, priority, queueing and dispatch.
pub mod core;
/// Configuration models and loaders.
pub mod config;
/// Builders to construct a scheduler from configuration.
pub mod builders;
/// Runtime adapters.
pub mod runtime;
/// Shared utilities.
pub mod util;
