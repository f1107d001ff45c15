//! The subprocess facility behind the executor.

use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use crate::constants::SHELL;
use crate::plan::{Phase, Rendering};

/// Runs phases to completion, one at a time.
///
/// Production code uses [`HostSpawner`]; tests substitute a recording double
/// to inspect the phase sequence without touching the system.
pub trait Spawner {
    /// Blocks until the phase's child exits and returns its exit status.
    fn spawn(&mut self, phase: &Phase) -> Result<i32>;
}

/// Spawns phases on the host, inheriting the caller's standard streams.
#[derive(Debug, Default)]
pub struct HostSpawner;

impl Spawner for HostSpawner {
    fn spawn(&mut self, phase: &Phase) -> Result<i32> {
        let mut child = match &phase.rendering {
            Rendering::Shell(text) => {
                let mut child = Command::new(SHELL);
                child.arg("-c").arg(text);
                child
            }
            Rendering::Argv(argv) => {
                let (program, args) = argv.split_first().context("phase argv is empty")?;
                let mut child = Command::new(program);
                child.args(args);
                child
            }
        };
        if phase.quiet {
            child.stdout(Stdio::null());
        }
        let status = child
            .status()
            .with_context(|| format!("failed to start '{}'", phase.rendering.render()))?;
        // A signal-terminated child has no exit code; report the all-ones
        // status the aggregator already treats as failure.
        Ok(status.code().unwrap_or(-1))
    }
}
