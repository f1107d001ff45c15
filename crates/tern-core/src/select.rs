//! Target selection: which environments a command fans out to.

use thiserror::Error;

use crate::config::{CommandSpec, ContainerKind, Model};
use crate::constants::ALL_CONTAINERS;

/// A resolved execution environment for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Target<'a> {
    Host,
    Container {
        name: &'a str,
        kind: &'a ContainerKind,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error(
        "Container '{0}' is not found in the config.\n\
         Please use '--containers' option to list all containers, present in the config"
    )]
    NotFound(String),
    #[error(
        "Container '{name}' is invalid:\n{details}\n\
         Please use '--containers' option to list all containers, present in the config"
    )]
    Invalid { name: String, details: String },
}

/// Computes the ordered, de-duplicated target list for `command`.
///
/// Override selectors win over the command's default container; `*` expands
/// to every declared container in declaration order; duplicates collapse
/// keeping the first occurrence. Without overrides or a default container
/// the single target is the host. Any selector that does not resolve to a
/// clean container declaration aborts the whole invocation.
pub fn resolve_targets<'a>(
    model: &'a Model,
    command: &'a CommandSpec,
    overrides: &'a [String],
) -> Result<Vec<Target<'a>>, SelectError> {
    let mut names: Vec<&str> = Vec::new();
    if !overrides.is_empty() {
        for selector in overrides {
            if selector == ALL_CONTAINERS {
                for entry in &model.containers {
                    push_unique(&mut names, &entry.name);
                }
            } else {
                push_unique(&mut names, selector);
            }
        }
    } else if let Some(default) = &command.container {
        names.push(default);
    } else {
        return Ok(vec![Target::Host]);
    }

    names
        .into_iter()
        .map(|name| {
            let entry = model
                .container(name)
                .ok_or_else(|| SelectError::NotFound(name.to_string()))?;
            match &entry.kind {
                Some(kind) if entry.errors.is_empty() => Ok(Target::Container {
                    name: &entry.name,
                    kind,
                }),
                _ => Err(SelectError::Invalid {
                    name: entry.name.clone(),
                    details: entry
                        .errors
                        .iter()
                        .map(|error| format!("  - {error}"))
                        .collect::<Vec<_>>()
                        .join("\n"),
                }),
            }
        })
        .collect()
}

fn push_unique<'a>(names: &mut Vec<&'a str>, name: &'a str) {
    if !names.contains(&name) {
        names.push(name);
    }
}
