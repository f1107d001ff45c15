//! Schema validation for the raw `tern.toml` sections.
//!
//! Validation is permissive: every problem found in a section is collected
//! as a `section.index.field: message` diagnostic instead of aborting at the
//! first one, and whatever entries survive intact become part of the model.

use toml::{Table, Value};

use crate::config::{CommandSpec, ContainerEntry, ContainerKind, Model, RawConfig};

const COMMAND_FIELDS: &[&str] = &[
    "name",
    "description",
    "execute",
    "before",
    "after",
    "examples",
    "docker_container",
    "docker_run_options",
];

const CONTAINER_FIELDS: &[&str] = &[
    "name",
    "docker_image",
    "docker_file_path",
    "docker_build_options",
    "docker_compose_file_path",
    "docker_compose_service",
    "docker_compose_options",
];

/// Fields that decide a container's family; at least one must be present.
const CONTAINER_FAMILY_FIELDS: &[&str] = &[
    "docker_compose_file_path",
    "docker_compose_options",
    "docker_file_path",
    "docker_image",
];

pub fn build_model(raw: &RawConfig) -> Model {
    let (commands, command_errors) = validate_commands(raw.commands.as_ref());
    let (containers, container_errors) = validate_containers(raw.docker_containers.as_ref());
    Model {
        commands,
        command_errors,
        containers,
        container_errors,
    }
}

fn validate_commands(section: Option<&Value>) -> (Vec<CommandSpec>, Vec<String>) {
    let mut errors = Vec::new();
    let Some(items) = section_array("commands", section, &mut errors) else {
        return (Vec::new(), errors);
    };

    let mut commands = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let path = format!("commands.{index}");
        let Some(table) = item.as_table() else {
            errors.push(format!("{path}: must be a table, got {}", item.type_str()));
            continue;
        };

        let mut check = EntryCheck::new(&path, table);
        check.reject_unknown(COMMAND_FIELDS);
        let name = check.required_slug("name");
        let description = check.required_string("description");
        let execute = check.required_string("execute");
        let before = check.string_list("before");
        let after = check.string_list("after");
        let examples = check.string_list("examples");
        let container = check.string("docker_container");
        let run_options = check.string("docker_run_options");

        let entry_errors = check.finish();
        if !entry_errors.is_empty() {
            errors.extend(entry_errors);
            continue;
        }

        commands.push(CommandSpec {
            name: name.unwrap_or_default(),
            description: description.unwrap_or_default(),
            before,
            execute: execute.unwrap_or_default(),
            after,
            examples,
            container,
            run_options: run_options.unwrap_or_default(),
        });
    }
    (commands, errors)
}

fn validate_containers(section: Option<&Value>) -> (Vec<ContainerEntry>, Vec<String>) {
    let mut errors = Vec::new();
    let Some(items) = section_array("docker_containers", section, &mut errors) else {
        return (Vec::new(), errors);
    };

    let mut entries = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let path = format!("docker_containers.{index}");
        let Some(table) = item.as_table() else {
            errors.push(format!("{path}: must be a table, got {}", item.type_str()));
            continue;
        };

        let mut check = EntryCheck::new(&path, table);
        check.reject_unknown(CONTAINER_FIELDS);
        let name = check.required_slug("name");
        let image = check.string("docker_image");
        let dockerfile = check.string("docker_file_path");
        let build_options = check.string("docker_build_options");
        let compose_file = check.string("docker_compose_file_path");
        let compose_service = check.string("docker_compose_service");
        let compose_options = check.string("docker_compose_options");

        if CONTAINER_FAMILY_FIELDS
            .iter()
            .all(|field| !table.contains_key(*field))
        {
            check.note(
                "*",
                format!(
                    "one of the following fields must be present: {}",
                    CONTAINER_FAMILY_FIELDS.join(", ")
                ),
            );
        }
        check.conflict("docker_image", "docker_file_path");
        check.conflict("docker_image", "docker_compose_file_path");
        check.conflict("docker_file_path", "docker_compose_file_path");
        check.requires("docker_compose_file_path", "docker_compose_service");
        check.requires("docker_compose_service", "docker_compose_file_path");
        check.requires("docker_compose_options", "docker_compose_file_path");

        let entry_errors = check.finish();
        errors.extend(entry_errors.iter().cloned());

        // Without a usable name the entry cannot be targeted at all; its
        // diagnostics still surface through the section list above.
        let Some(name) = name else {
            continue;
        };

        let kind = if entry_errors.is_empty() {
            resolve_kind(
                image,
                dockerfile,
                build_options,
                compose_file,
                compose_service,
                compose_options,
            )
        } else {
            None
        };
        entries.push(ContainerEntry {
            name,
            kind,
            errors: entry_errors,
        });
    }
    (entries, errors)
}

fn resolve_kind(
    image: Option<String>,
    dockerfile: Option<String>,
    build_options: Option<String>,
    compose_file: Option<String>,
    compose_service: Option<String>,
    compose_options: Option<String>,
) -> Option<ContainerKind> {
    if let Some(file) = compose_file {
        let service = compose_service?;
        return Some(ContainerKind::Compose {
            file,
            service,
            options: compose_options,
        });
    }
    if let Some(dockerfile) = dockerfile {
        return Some(ContainerKind::Build {
            dockerfile,
            build_options: build_options.unwrap_or_default(),
        });
    }
    image.map(|image| ContainerKind::Image { image })
}

fn section_array<'a>(
    section: &str,
    value: Option<&'a Value>,
    errors: &mut Vec<String>,
) -> Option<&'a Vec<Value>> {
    let value = value?;
    match value.as_array() {
        Some(items) => Some(items),
        None => {
            errors.push(format!(
                "{section} should be represented by an array of tables, got {}",
                value.type_str()
            ));
            None
        }
    }
}

/// Collects field-level diagnostics for one section entry.
struct EntryCheck<'a> {
    path: &'a str,
    table: &'a Table,
    errors: Vec<(String, String)>,
}

impl<'a> EntryCheck<'a> {
    fn new(path: &'a str, table: &'a Table) -> Self {
        Self {
            path,
            table,
            errors: Vec::new(),
        }
    }

    fn note(&mut self, field: &str, message: String) {
        self.errors.push((field.to_string(), message));
    }

    fn reject_unknown(&mut self, allowed: &[&str]) {
        for key in self.table.keys() {
            if !allowed.contains(&key.as_str()) {
                self.note(key, "unsupported field".to_string());
            }
        }
    }

    fn string(&mut self, field: &str) -> Option<String> {
        let value = self.table.get(field)?;
        match value.as_str() {
            Some(text) => Some(text.to_string()),
            None => {
                self.note(
                    field,
                    format!("should be of type string, got {}", value.type_str()),
                );
                None
            }
        }
    }

    fn required_string(&mut self, field: &str) -> Option<String> {
        if !self.table.contains_key(field) {
            self.note(field, "mandatory field missing".to_string());
            return None;
        }
        self.string(field)
    }

    fn required_slug(&mut self, field: &str) -> Option<String> {
        let value = self.required_string(field)?;
        let is_slug = !value.is_empty()
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !is_slug {
            self.note(
                field,
                format!("should consist only of letters, digits, '-', or '_', got '{value}'"),
            );
            return None;
        }
        Some(value)
    }

    fn string_list(&mut self, field: &str) -> Vec<String> {
        let Some(value) = self.table.get(field) else {
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            self.note(
                field,
                format!("should be of type array of strings, got {}", value.type_str()),
            );
            return Vec::new();
        };
        let mut out = Vec::new();
        for item in items {
            let Some(text) = item.as_str() else {
                self.note(
                    field,
                    format!("elements should be of type string, got {}", item.type_str()),
                );
                return Vec::new();
            };
            out.push(text.to_string());
        }
        out
    }

    fn conflict(&mut self, field: &str, other: &str) {
        if self.table.contains_key(field) && self.table.contains_key(other) {
            self.note(field, format!("conflicts with '{other}'"));
            self.note(other, format!("conflicts with '{field}'"));
        }
    }

    fn requires(&mut self, field: &str, other: &str) {
        if self.table.contains_key(field) && !self.table.contains_key(other) {
            self.note(field, format!("requires '{other}' to be present"));
        }
    }

    /// Renders the diagnostics as `path.field: message` lines, sorted by field.
    fn finish(mut self) -> Vec<String> {
        let path = self.path;
        self.errors.sort();
        self.errors
            .into_iter()
            .map(|(field, message)| format!("{path}.{field}: {message}"))
            .collect()
    }
}
