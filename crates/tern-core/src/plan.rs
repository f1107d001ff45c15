//! Execution plans: control flow modeled as data.
//!
//! Every target driver emits an [`ExecutionPlan`] instead of spawning
//! imperatively, so phase ordering and short-circuit rules stay inspectable
//! by substituting the subprocess facility in tests.

/// How a phase is handed to the operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendering {
    /// One shell string, run through `/bin/sh -c` so the surrounding shell
    /// performs `$(...)` substitution before the container tool sees it.
    Shell(String),
    /// A plain argv vector, spawned directly.
    Argv(Vec<String>),
}

impl Rendering {
    /// The exact text echoed by `--debug`; identical to what is spawned.
    pub fn render(&self) -> String {
        match self {
            Self::Shell(text) => text.clone(),
            Self::Argv(argv) => argv.join(" "),
        }
    }
}

/// The role a phase plays inside a target's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Image build; a failure aborts the remaining phases of the target.
    Build,
    /// The command itself; its status becomes the target result.
    Main,
    /// `after` statements; skipped when the main phase failed.
    After,
    /// Teardown; always runs, status recorded only as an anomaly.
    Cleanup,
}

/// A single subprocess descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub role: Role,
    pub rendering: Rendering,
    /// Suppress stdout; build and teardown output is noise.
    pub quiet: bool,
}

impl Phase {
    pub fn shell(role: Role, text: String) -> Self {
        Self {
            role,
            rendering: Rendering::Shell(text),
            quiet: false,
        }
    }

    pub fn argv(role: Role, argv: Vec<String>, quiet: bool) -> Self {
        Self {
            role,
            rendering: Rendering::Argv(argv),
            quiet,
        }
    }
}

/// The ordered phases realizing one command in one target.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    /// Container name, or `"host"`.
    pub target: String,
    pub phases: Vec<Phase>,
    /// Sanitizer traces, echoed before the first spawn under `--debug`.
    pub notes: Vec<String>,
}
