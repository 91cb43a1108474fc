//! Configuration models for the scheduler.

pub mod scheduler;

pub use scheduler::{ConfigPatch, GlobalConfig, ENV_PREFIX};
