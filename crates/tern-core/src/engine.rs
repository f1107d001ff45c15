//! Invocation resolution, sequential execution, and result aggregation.
//!
//! Targets run one after another in declaration order; within a target the
//! phases run in plan order with one active child at a time. The engine
//! holds no state between invocations.

use anyhow::Result;
use tracing::warn;

use crate::config::Model;
use crate::constants::{EXIT_CONFIG, EXIT_FANOUT_FAILURE, EXIT_OK, EXIT_UNAVAILABLE};
use crate::driver;
use crate::invocation::Invocation;
use crate::plan::{ExecutionPlan, Role};
use crate::select;
use crate::spawn::Spawner;

/// Outcome of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetResult {
    /// Container name, or `"host"`.
    pub target: String,
    /// Exit status of the main phase (or of a failed build).
    pub status: i32,
    /// Whether an after or cleanup phase misbehaved.
    pub anomalies: bool,
}

/// Runs one invocation against the model and returns the process exit code.
///
/// Diagnostics go to stderr and debug traces to stdout; the caller only has
/// to exit with the returned code.
pub fn run(
    model: &Model,
    invocation: &Invocation,
    stdin_is_tty: bool,
    spawner: &mut dyn Spawner,
) -> Result<i32> {
    let Some(command) = model.command(&invocation.command) else {
        eprintln!(
            "command '{}' is not present in the config",
            invocation.command
        );
        if model.command_errors.is_empty() {
            return Ok(EXIT_UNAVAILABLE);
        }
        eprintln!(
            "errors detected in 'commands' configurations \
             (probably this is the reason why command can't be found):"
        );
        for error in &model.command_errors {
            eprintln!("  - {error}");
        }
        return Ok(EXIT_CONFIG);
    };

    let targets = match select::resolve_targets(model, command, &invocation.containers) {
        Ok(targets) => targets,
        Err(error) => {
            eprintln!("{error}");
            return Ok(EXIT_CONFIG);
        }
    };

    let mut results = Vec::with_capacity(targets.len());
    for target in &targets {
        let plan = driver::plan(command, &invocation.extra_args, target, stdin_is_tty);
        results.push(execute_plan(&plan, invocation.debug, spawner)?);
    }

    let (code, summary) = aggregate(&command.name, &results);
    if let Some(summary) = summary {
        eprintln!("{summary}");
    }
    Ok(code)
}

fn execute_plan(
    plan: &ExecutionPlan,
    debug: bool,
    spawner: &mut dyn Spawner,
) -> Result<TargetResult> {
    if debug {
        for note in &plan.notes {
            println!("{note}");
        }
    }

    let mut status = EXIT_OK;
    let mut anomalies = false;
    let mut aborted = false;
    for phase in &plan.phases {
        let skip = match phase.role {
            Role::Build | Role::Main | Role::Cleanup => aborted,
            Role::After => aborted || status != EXIT_OK,
        };
        if skip {
            continue;
        }
        if debug {
            println!("[DEBUG] running: {}", phase.rendering.render());
        }
        let code = spawner.spawn(phase)?;
        match phase.role {
            Role::Build => {
                if code != EXIT_OK {
                    eprintln!(
                        "error at attempt to build docker image. \
                         Can't proceed further. Please check the output"
                    );
                    status = code;
                    aborted = true;
                }
            }
            Role::Main => status = code,
            Role::After | Role::Cleanup => {
                if code != EXIT_OK {
                    warn!(target: "tern", "cleanup phase returned {code} in '{}'", plan.target);
                    anomalies = true;
                }
            }
        }
    }

    Ok(TargetResult {
        target: plan.target.clone(),
        status,
        anomalies,
    })
}

/// Combines per-target results into a process exit status and an optional
/// failure summary for stderr.
///
/// A single target passes its status through verbatim. A fan-out reports
/// the all-ones status when any target failed, with one line per failure.
pub fn aggregate(command_name: &str, results: &[TargetResult]) -> (i32, Option<String>) {
    if results.len() <= 1 {
        let status = results.first().map_or(EXIT_OK, |result| result.status);
        return (status, None);
    }

    let failed: Vec<&TargetResult> = results
        .iter()
        .filter(|result| result.status != EXIT_OK)
        .collect();
    if failed.is_empty() {
        return (EXIT_OK, None);
    }

    let mut summary = format!(
        "command '{command_name}' has failed in {}/{} containers:",
        failed.len(),
        results.len()
    );
    for result in failed {
        summary.push_str(&format!(
            "\n  - {} has returned {}",
            result.target, result.status
        ));
    }
    (EXIT_FANOUT_FAILURE, Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Phase;
    use std::collections::VecDeque;

    struct RecordingSpawner {
        statuses: VecDeque<i32>,
        spawned: Vec<Phase>,
    }

    impl RecordingSpawner {
        fn with_statuses(statuses: &[i32]) -> Self {
            Self {
                statuses: statuses.iter().copied().collect(),
                spawned: Vec::new(),
            }
        }

        fn renderings(&self) -> Vec<String> {
            self.spawned
                .iter()
                .map(|phase| phase.rendering.render())
                .collect()
        }
    }

    impl Spawner for RecordingSpawner {
        fn spawn(&mut self, phase: &Phase) -> Result<i32> {
            self.spawned.push(phase.clone());
            Ok(self.statuses.pop_front().unwrap_or(EXIT_OK))
        }
    }

    fn invocation(command: &str) -> Invocation {
        Invocation {
            command: command.to_string(),
            ..Default::default()
        }
    }

    fn result(target: &str, status: i32) -> TargetResult {
        TargetResult {
            target: target.to_string(),
            status,
            anomalies: false,
        }
    }

    #[test]
    fn runs_a_plain_command_on_the_host() {
        let model = Model::from_toml(
            "[[commands]]\nname = \"t\"\ndescription = \"-\"\nexecute = \"echo PASSED\"",
        )
        .unwrap();
        let mut spawner = RecordingSpawner::with_statuses(&[]);
        let code = run(&model, &invocation("t"), true, &mut spawner).unwrap();
        assert_eq!(code, EXIT_OK);
        assert_eq!(spawner.renderings(), vec!["/bin/sh -c 'echo PASSED'"]);
    }

    #[test]
    fn missing_command_without_validator_errors() {
        let model = Model::from_toml(
            "[[commands]]\nname = \"other\"\ndescription = \"-\"\nexecute = \"echo OK\"",
        )
        .unwrap();
        let mut spawner = RecordingSpawner::with_statuses(&[]);
        let code = run(&model, &invocation("native"), true, &mut spawner).unwrap();
        assert_eq!(code, EXIT_UNAVAILABLE);
        assert!(spawner.spawned.is_empty());
    }

    #[test]
    fn missing_command_with_validator_errors() {
        let model = Model::from_toml("[[commands]]\nname = \"native\"").unwrap();
        let mut spawner = RecordingSpawner::with_statuses(&[]);
        let code = run(&model, &invocation("native"), true, &mut spawner).unwrap();
        assert_eq!(code, EXIT_CONFIG);
        assert!(spawner.spawned.is_empty());
    }

    #[test]
    fn unknown_container_override_is_a_config_error() {
        let model = Model::from_toml(
            "[[commands]]\nname = \"t\"\ndescription = \"-\"\nexecute = \"echo OK\"",
        )
        .unwrap();
        let mut request = invocation("t");
        request.containers = vec!["no_such_container".to_string()];
        let mut spawner = RecordingSpawner::with_statuses(&[]);
        let code = run(&model, &request, true, &mut spawner).unwrap();
        assert_eq!(code, EXIT_CONFIG);
        assert!(spawner.spawned.is_empty());
    }

    #[test]
    fn single_target_failure_propagates_the_status() {
        let model = Model::from_toml(
            "[[commands]]\nname = \"t\"\ndescription = \"-\"\nexecute = \"boolsheet\"",
        )
        .unwrap();
        let mut spawner = RecordingSpawner::with_statuses(&[127]);
        let code = run(&model, &invocation("t"), true, &mut spawner).unwrap();
        assert_eq!(code, 127);
    }

    #[test]
    fn build_failure_short_circuits_the_run_phase() {
        let model = Model::from_toml(
            r#"
            [[commands]]
            name = "t"
            description = "-"
            execute = "echo OK"
            docker_container = "local"

            [[docker_containers]]
            name = "local"
            docker_file_path = "Dockerfile_test"
            "#,
        )
        .unwrap();
        let mut spawner = RecordingSpawner::with_statuses(&[13]);
        let code = run(&model, &invocation("t"), true, &mut spawner).unwrap();
        assert_eq!(code, 13);
        assert_eq!(
            spawner.renderings(),
            vec!["docker build . --file Dockerfile_test --tag local-for-app"]
        );
    }

    #[test]
    fn compose_cleanups_always_run() {
        let model = Model::from_toml(
            r#"
            [[commands]]
            name = "t"
            description = "-"
            execute = "echo OK"
            after = ["echo done"]
            docker_container = "stack"

            [[docker_containers]]
            name = "stack"
            docker_compose_file_path = "docker-compose.yml"
            docker_compose_service = "client"
            "#,
        )
        .unwrap();
        let mut spawner = RecordingSpawner::with_statuses(&[13, 0, 0]);
        let code = run(&model, &invocation("t"), true, &mut spawner).unwrap();
        assert_eq!(code, 13);
        // The failed run skips `after` but both teardowns still happen.
        let spawned = spawner.renderings();
        assert_eq!(spawned.len(), 3);
        assert_eq!(spawned[1], "docker compose down --remove-orphans");
        assert_eq!(spawned[2], "docker compose --file docker-compose.yml rm -fsv");
    }

    #[test]
    fn after_phase_runs_only_on_success() {
        let config = r#"
            [[commands]]
            name = "t"
            description = "-"
            execute = "echo OK"
            after = ["echo done"]
            docker_container = "img"

            [[docker_containers]]
            name = "img"
            docker_image = "alpine:3.14"
            "#;

        let model = Model::from_toml(config).unwrap();
        let mut spawner = RecordingSpawner::with_statuses(&[0, 0]);
        let code = run(&model, &invocation("t"), true, &mut spawner).unwrap();
        assert_eq!(code, EXIT_OK);
        assert_eq!(spawner.spawned.len(), 2);
        assert_eq!(spawner.renderings()[1], "/bin/sh -c 'echo done'");

        let mut spawner = RecordingSpawner::with_statuses(&[5]);
        let code = run(&model, &invocation("t"), true, &mut spawner).unwrap();
        assert_eq!(code, 5);
        assert_eq!(spawner.spawned.len(), 1);
    }

    #[test]
    fn failing_after_phase_marks_an_anomaly_but_keeps_the_status() {
        let model = Model::from_toml(
            r#"
            [[commands]]
            name = "t"
            description = "-"
            execute = "echo OK"
            after = ["exit 3"]
            docker_container = "img"

            [[docker_containers]]
            name = "img"
            docker_image = "alpine:3.14"
            "#,
        )
        .unwrap();
        let command = model.command("t").unwrap();
        let targets = select::resolve_targets(&model, command, &[]).unwrap();
        let plan = driver::plan(command, &[], &targets[0], true);

        let mut spawner = RecordingSpawner::with_statuses(&[0, 3]);
        let outcome = execute_plan(&plan, false, &mut spawner).unwrap();
        assert_eq!(outcome.status, EXIT_OK);
        assert!(outcome.anomalies);
    }

    #[test]
    fn fan_out_runs_every_target_in_declaration_order() {
        let model = Model::from_toml(
            r#"
            [[commands]]
            name = "t"
            description = "-"
            execute = "echo OK"

            [[docker_containers]]
            name = "c1"
            docker_image = "container1image"

            [[docker_containers]]
            name = "c2"
            docker_image = "container2image"
            "#,
        )
        .unwrap();
        let mut request = invocation("t");
        request.containers = vec!["*".to_string()];
        let mut spawner = RecordingSpawner::with_statuses(&[0, 13]);
        let code = run(&model, &request, true, &mut spawner).unwrap();
        assert_eq!(code, EXIT_FANOUT_FAILURE);
        let spawned = spawner.renderings();
        assert_eq!(spawned.len(), 2);
        assert!(spawned[0].contains("container1image"));
        assert!(spawned[1].contains("container2image"));
    }

    #[test]
    fn aggregate_passes_a_single_status_through() {
        assert_eq!(aggregate("t", &[result("host", 13)]), (13, None));
        assert_eq!(aggregate("t", &[]), (EXIT_OK, None));
    }

    #[test]
    fn aggregate_is_quiet_when_every_target_passed() {
        let results = [result("c1", 0), result("c2", 0)];
        assert_eq!(aggregate("t", &results), (EXIT_OK, None));
    }

    #[test]
    fn aggregate_formats_the_failure_summary() {
        let results = [result("c1", 0), result("c2", 13)];
        let (code, summary) = aggregate("command_without_container", &results);
        assert_eq!(code, EXIT_FANOUT_FAILURE);
        assert_eq!(
            summary.as_deref(),
            Some(
                "command 'command_without_container' has failed in 1/2 containers:\n\
                 \x20 - c2 has returned 13"
            )
        );
    }
}
