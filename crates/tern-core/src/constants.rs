//! Constants used across the tern workspace.

/// The configuration file tern looks for in the working directory.
pub const CONFIG_FILE: &str = "tern.toml";

/// Environment variable that exposes the selected container to the command.
pub const CONTAINER_NAME_ENV: &str = "TERN_CONTAINER_NAME";

/// Shell used for every quoted command body.
pub const SHELL: &str = "/bin/sh";

/// Container selector that expands to every declared container.
pub const ALL_CONTAINERS: &str = "*";

/// Target name reported for commands that run directly on the host.
pub const HOST_TARGET: &str = "host";

/// Process exit codes; the config/resource cases follow sysexits.h.
pub const EXIT_OK: i32 = 0;
pub const EXIT_UNAVAILABLE: i32 = 69;
pub const EXIT_PROTOCOL: i32 = 76;
pub const EXIT_CONFIG: i32 = 78;

/// All-ones status reported when a multi-container fan-out had failures.
pub const EXIT_FANOUT_FAILURE: i32 = -1;
