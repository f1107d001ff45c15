//! The four target drivers.
//!
//! Each driver turns a command plus a resolved target into an
//! [`ExecutionPlan`]. Main phases are single shell strings (the surrounding
//! shell substitutes the forwarded `$(id -u):$(id -g)` identity); build and
//! teardown phases are plain argv vectors with their stdout suppressed.

use crate::config::{CommandSpec, ContainerKind};
use crate::constants::{CONTAINER_NAME_ENV, HOST_TARGET, SHELL};
use crate::options::{sanitize_run_options, SanitizedOptions};
use crate::plan::{ExecutionPlan, Phase, Role};
use crate::select::Target;

/// Builds the plan realizing `command` for one target.
pub fn plan(
    command: &CommandSpec,
    extra_args: &[String],
    target: &Target<'_>,
    stdin_is_tty: bool,
) -> ExecutionPlan {
    match target {
        Target::Host => native_plan(command, extra_args),
        Target::Container { name, kind } => {
            container_plan(command, extra_args, name, kind, stdin_is_tty)
        }
    }
}

/// Host execution: `before`, the command, and `after` run as one `&&` chain
/// in a single shell, stopping at the first non-zero status.
fn native_plan(command: &CommandSpec, extra_args: &[String]) -> ExecutionPlan {
    let mut statements = command.before.clone();
    statements.push(execute_statement(command, extra_args));
    statements.extend(command.after.iter().cloned());
    ExecutionPlan {
        target: HOST_TARGET.to_string(),
        phases: vec![Phase::shell(
            Role::Main,
            shell_wrap(&statements.join(" && ")),
        )],
        notes: Vec::new(),
    }
}

fn container_plan(
    command: &CommandSpec,
    extra_args: &[String],
    name: &str,
    kind: &ContainerKind,
    stdin_is_tty: bool,
) -> ExecutionPlan {
    let SanitizedOptions {
        tokens: run_options,
        traces,
    } = sanitize_run_options(&command.run_options, stdin_is_tty);
    let body = shell_wrap(&main_body(command, extra_args));

    let mut phases = Vec::new();
    match kind {
        ContainerKind::Image { image } => {
            phases.push(run_phase(name, &run_options, image, &body));
        }
        ContainerKind::Build {
            dockerfile,
            build_options,
        } => {
            let default_tag = format!("{name}-for-app");
            let user_options: Vec<String> = build_options
                .split_whitespace()
                .map(str::to_owned)
                .collect();
            // No options configured: build with a synthesized file/tag pair.
            // Anything user-supplied is passed through verbatim, broken or not.
            let build_args = if user_options.is_empty() {
                vec![
                    "--file".to_string(),
                    dockerfile.clone(),
                    "--tag".to_string(),
                    default_tag.clone(),
                ]
            } else {
                user_options.clone()
            };
            let mut argv = vec!["docker".to_string(), "build".to_string(), ".".to_string()];
            argv.extend(build_args);
            phases.push(Phase::argv(Role::Build, argv, true));

            let tag = token_after_last(&user_options, "--tag").unwrap_or(&default_tag);
            phases.push(run_phase(name, &run_options, tag, &body));
        }
        ContainerKind::Compose {
            file,
            service,
            options,
        } => {
            let file_args: Vec<String> = match options {
                Some(options) => options.split_whitespace().map(str::to_owned).collect(),
                None => vec!["--file".to_string(), file.clone()],
            };
            let mut parts = vec![
                "docker".to_string(),
                "compose".to_string(),
                "--progress".to_string(),
                "quiet".to_string(),
            ];
            parts.extend(file_args);
            parts.push("run".to_string());
            parts.extend(run_options.iter().cloned());
            parts.push(service.clone());
            parts.push(body.clone());
            phases.push(Phase::shell(Role::Main, parts.join(" ")));
        }
    }

    if !command.after.is_empty() {
        phases.push(Phase::shell(
            Role::After,
            shell_wrap(&command.after.join(" && ")),
        ));
    }

    // A composition leaves services behind; tear the whole thing down no
    // matter how the run went.
    if let ContainerKind::Compose { file, options, .. } = kind {
        let compose_tokens: Vec<String> = options
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_owned)
            .collect();
        let teardown_file = token_after_last(&compose_tokens, "--file")
            .unwrap_or(file)
            .to_string();
        phases.push(Phase::argv(
            Role::Cleanup,
            vec![
                "docker".to_string(),
                "compose".to_string(),
                "down".to_string(),
                "--remove-orphans".to_string(),
            ],
            true,
        ));
        phases.push(Phase::argv(
            Role::Cleanup,
            vec![
                "docker".to_string(),
                "compose".to_string(),
                "--file".to_string(),
                teardown_file,
                "rm".to_string(),
                "-fsv".to_string(),
            ],
            true,
        ));
    }

    ExecutionPlan {
        target: name.to_string(),
        phases,
        notes: traces,
    }
}

fn run_phase(name: &str, run_options: &[String], image: &str, body: &str) -> Phase {
    let mut parts = vec![
        "docker".to_string(),
        "run".to_string(),
        "--quiet".to_string(),
        "-e".to_string(),
        format!("{CONTAINER_NAME_ENV}={name}"),
    ];
    parts.extend(run_options.iter().cloned());
    parts.push(image.to_string());
    parts.push(body.to_string());
    Phase::shell(Role::Main, parts.join(" "))
}

fn main_body(command: &CommandSpec, extra_args: &[String]) -> String {
    let mut statements = command.before.clone();
    statements.push(execute_statement(command, extra_args));
    statements.join(" && ")
}

fn execute_statement(command: &CommandSpec, extra_args: &[String]) -> String {
    let mut parts = vec![command.execute.clone()];
    parts.extend(extra_args.iter().cloned());
    parts.join(" ")
}

fn shell_wrap(body: &str) -> String {
    format!("{SHELL} -c '{body}'")
}

/// Token immediately following the last occurrence of `flag`, if any.
fn token_after_last<'a>(tokens: &'a [String], flag: &str) -> Option<&'a str> {
    let mut found = None;
    for (index, token) in tokens.iter().enumerate() {
        if token == flag {
            found = tokens.get(index + 1).map(String::as_str);
        }
    }
    found
}
