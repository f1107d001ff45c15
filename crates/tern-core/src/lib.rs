//! Core engine for the tern command runner.
//!
//! This crate turns a validated `tern.toml` model plus a command-line
//! invocation into an ordered sequence of subprocess phases, runs them on the
//! host or inside docker containers, and aggregates the per-target results
//! into a single process exit status.

pub mod config;
pub mod constants;
pub mod driver;
pub mod engine;
pub mod invocation;
pub mod options;
pub mod plan;
pub mod select;
pub mod spawn;
mod validate;

pub use config::{CommandSpec, ContainerEntry, ContainerKind, Model};
pub use engine::{aggregate, TargetResult};
pub use invocation::Invocation;
pub use plan::{ExecutionPlan, Phase, Rendering, Role};
pub use spawn::{HostSpawner, Spawner};
