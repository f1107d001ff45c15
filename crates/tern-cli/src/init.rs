//! The `--init` bootstrap: writes a commented example configuration.

use std::path::Path;

use anyhow::{Context, Result};

use tern_core::constants::{EXIT_OK, EXIT_PROTOCOL};

const TEMPLATE: &str = include_str!("../resources/tern.toml");

/// Writes the example configuration, refusing to clobber an existing file.
/// Returns the process exit code.
pub fn run(config_path: &str) -> Result<i32> {
    if Path::new(config_path).exists() {
        eprintln!("file '{config_path}' already exists.");
        eprintln!("Please review that file. If it is needed, you can either:");
        eprintln!(
            "- keep it where it is and generate the new config under a different path \
             (use '--config')"
        );
        eprintln!("- move it somewhere else and call '--init' again");
        eprintln!("If you don't need that file, just remove it and try again.");
        return Ok(EXIT_PROTOCOL);
    }
    std::fs::write(config_path, TEMPLATE)
        .with_context(|| format!("failed to write '{config_path}'"))?;
    println!("config created: {config_path}");
    Ok(EXIT_OK)
}
