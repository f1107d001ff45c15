/// A single parsed command-line invocation, as delivered by the CLI.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Name of the command to execute.
    pub command: String,
    /// Pass-through tail appended verbatim to the command's `execute`.
    pub extra_args: Vec<String>,
    /// `-c`/`--container` selectors; `*` expands to all declared containers.
    pub containers: Vec<String>,
    /// Echo every phase before spawning it.
    pub debug: bool,
}
