use anyhow::{Context, Result};
use serde::Deserialize;

use crate::validate;

/// Raw shape of `tern.toml`.
///
/// The two sections are kept as loose TOML values: validation must be able
/// to report every field-level problem at once, which a strict deserialize
/// cannot do (it stops at the first type mismatch).
#[derive(Debug, Default, Deserialize)]
pub struct RawConfig {
    pub commands: Option<toml::Value>,
    pub docker_containers: Option<toml::Value>,
}

/// A validated command declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    pub before: Vec<String>,
    pub execute: String,
    pub after: Vec<String>,
    pub examples: Vec<String>,
    /// Container to run in when no `-c` override is given.
    pub container: Option<String>,
    /// Free-form `docker run` option string, spliced in after sanitation.
    pub run_options: String,
}

/// A declared execution environment.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerKind {
    /// `docker run` of a pre-published image.
    Image { image: String },
    /// `docker build` from a local Dockerfile, then `docker run` the result.
    Build {
        dockerfile: String,
        build_options: String,
    },
    /// `docker compose run` of one service, with mandatory teardown.
    Compose {
        file: String,
        service: String,
        options: Option<String>,
    },
}

/// One `[[docker_containers]]` entry that at least carries a usable name.
///
/// An entry with validator diagnostics keeps its name so the engine can
/// report it when a command targets it; `kind` is only present when the
/// entry is clean.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerEntry {
    pub name: String,
    pub kind: Option<ContainerKind>,
    pub errors: Vec<String>,
}

/// The validated model the engine runs against.
#[derive(Debug, Default)]
pub struct Model {
    pub commands: Vec<CommandSpec>,
    pub command_errors: Vec<String>,
    pub containers: Vec<ContainerEntry>,
    pub container_errors: Vec<String>,
}

impl Model {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {path}"))?;
        Self::from_toml(&text).with_context(|| format!("failed to parse TOML config: {path}"))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let raw = toml::from_str::<RawConfig>(text)?;
        Ok(validate::build_model(&raw))
    }

    pub fn command(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|command| command.name == name)
    }

    pub fn container(&self, name: &str) -> Option<&ContainerEntry> {
        self.containers.iter().find(|entry| entry.name == name)
    }
}
