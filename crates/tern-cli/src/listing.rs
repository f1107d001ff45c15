//! Listings of configured commands and containers.

use tern_core::constants::{EXIT_CONFIG, EXIT_OK};
use tern_core::{CommandSpec, Model};

/// Prints the command listing and returns the process exit code.
pub fn commands(model: &Model) -> i32 {
    report_errors("commands", &model.command_errors);
    if model.commands.is_empty() {
        println!("Config file is present, but there are no any valid commands configured there");
        return section_code(&model.command_errors);
    }
    println!("Following commands are available:");
    for command in &model.commands {
        println!(
            "  * {} - {} (e.g. {})",
            command.name,
            command.description,
            rendered_examples(command)
        );
    }
    EXIT_OK
}

/// Prints the container listing and returns the process exit code.
///
/// Only clean declarations are listed; a named entry with diagnostics is
/// kept in the model for targeted error reporting but is not usable.
pub fn containers(model: &Model) -> i32 {
    report_errors("containers", &model.container_errors);
    let valid: Vec<_> = model
        .containers
        .iter()
        .filter(|entry| entry.kind.is_some())
        .collect();
    if valid.is_empty() {
        println!("No any valid container configuration found");
        return section_code(&model.container_errors);
    }
    println!("Following containers are available:");
    for entry in valid {
        println!("  * {}", entry.name);
    }
    EXIT_OK
}

/// Each example is an argument tail for the runner; a command without
/// examples gets its bare name as the generated one.
fn rendered_examples(command: &CommandSpec) -> String {
    let examples = if command.examples.is_empty() {
        std::slice::from_ref(&command.name)
    } else {
        command.examples.as_slice()
    };
    examples
        .iter()
        .map(|example| format!("'./tern {example}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn report_errors(section: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    eprintln!("errors detected in configured {section}:");
    for error in errors {
        eprintln!("  - {error}");
    }
}

/// Diagnostics make the listing itself an error only when nothing
/// survived to be listed.
fn section_code(errors: &[String]) -> i32 {
    if errors.is_empty() {
        EXIT_OK
    } else {
        EXIT_CONFIG
    }
}
