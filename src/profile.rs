//! Environment profile data model.
//!
//! A [`Profile`] is one saved project environment: where the project lives,
//! which interpreter environment to activate, which variables to export and
//! which commands to run afterwards. [`HistoryEntry`] records a single switch.
//!
//! The serialized field names are the on-disk format of `environments.json`
//! and `history.json`, so they differ from the Rust field names in places.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One saved environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,

    /// Absolute path of the project directory
    pub project_path: PathBuf,

    /// Root of the interpreter environment (e.g. a Python virtualenv)
    #[serde(rename = "python_env", default)]
    pub interpreter_env: Option<PathBuf>,

    /// Version label of the secondary runtime, stored as given
    #[serde(rename = "node_version", default)]
    pub runtime_version: Option<String>,

    /// Variables to export, in insertion order
    #[serde(rename = "env_vars", default)]
    pub variables: IndexMap<String, String>,

    #[serde(rename = "shell_commands", default)]
    pub commands: Vec<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,

    #[serde(rename = "created", deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,

    #[serde(
        rename = "last_used",
        default,
        deserialize_with = "timestamp::deserialize_option"
    )]
    pub last_used_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub use_count: u64,
}

impl Profile {
    /// Case-insensitive name comparison
    pub fn matches_name(&self, name: &str) -> bool {
        fold(&self.name) == fold(name)
    }

    /// Case-insensitive substring match against name, description and
    /// project path. An empty needle matches every profile.
    pub fn matches_filter(&self, needle: &str) -> bool {
        let needle = fold(needle);
        fold(&self.name).contains(&needle)
            || fold(&self.description).contains(&needle)
            || fold(&self.project_path.to_string_lossy()).contains(&needle)
    }
}

/// Arguments for creating a profile
///
/// `project_path` may be relative; the store resolves it at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProfile {
    pub name: String,
    pub project_path: PathBuf,
    pub interpreter_env: Option<PathBuf>,
    pub runtime_version: Option<String>,
    pub variables: IndexMap<String, String>,
    pub commands: Vec<String>,
    pub description: String,
}

impl NewProfile {
    pub fn new(name: impl Into<String>, project_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            project_path: project_path.into(),
            ..Self::default()
        }
    }

    pub fn interpreter_env(mut self, path: impl Into<PathBuf>) -> Self {
        self.interpreter_env = Some(path.into());
        self
    }

    pub fn runtime_version(mut self, version: impl Into<String>) -> Self {
        self.runtime_version = Some(version.into());
        self
    }

    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// One recorded switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "environment")]
    pub environment_name: String,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamp parsing that also accepts offset-less ISO-8601 strings, which
/// are read as local time.
pub(crate) mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Ok(dt.with_timezone(&Utc)),
            Err(err) => {
                let naive =
                    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map_err(|_| err)?;
                Ok(Local
                    .from_local_datetime(&naive)
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|| naive.and_utc()))
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse(&raw))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}
