//! Configuration file loading with environment variable overrides.
//!
//! The configuration is read once at startup and shared immutably. A missing
//! or malformed file is fatal: the service never starts without a model
//! registry and a list of valid teams.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::warn;

use crate::error::GatewayError;
use crate::model::ModelKey;
use crate::params::Action;

/// Fully validated, immutable configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider model ids keyed by `(model_type, version)`.
    pub model_registry: HashMap<ModelKey, String>,
    /// Fallback model per team.
    pub team_defaults: HashMap<String, ModelKey>,
    /// Request validation rules.
    pub validation: ValidationConfig,
    /// AWS account wiring.
    pub aws: AwsConfig,
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Per-call deadlines for external services.
    pub timeouts: TimeoutsConfig,
    /// Profile lifecycle behaviour.
    pub profiles: ProfilesConfig,
}

/// Request validation rules.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Teams allowed to own profiles.
    pub valid_teams: Vec<String>,
    /// Known model types. Informational only; requests are not checked against it.
    #[serde(default)]
    pub valid_model_types: Vec<String>,
    /// Known versions. Informational only.
    #[serde(default)]
    pub valid_versions: Vec<String>,
    /// Actions accepted on the profile endpoint.
    #[serde(default = "default_actions")]
    pub valid_actions: Vec<String>,
    /// Version used when a request omits one.
    pub default_version: String,
}

/// AWS account wiring.
#[derive(Debug, Clone, Deserialize)]
pub struct AwsConfig {
    /// Region for every AWS client.
    pub region: String,
    /// `DynamoDB` table holding profile records.
    pub dynamodb_table: String,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port. The `PORT` environment variable takes precedence.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// Per-call deadlines in seconds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    /// Caller identity lookup.
    pub identity: u64,
    /// Inference profile create/delete/list.
    pub provisioning: u64,
    /// Profile table reads and writes.
    pub store: u64,
    /// Model conversation calls.
    pub invocation: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self { identity: 10, provisioning: 30, store: 10, invocation: 120 }
    }
}

/// Profile lifecycle behaviour.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfilesConfig {
    /// Delete a freshly provisioned profile when its record cannot be stored.
    pub compensate_orphans: bool,
    /// Replaces the built-in system prompt for `use` requests without one.
    pub default_system_prompt: Option<String>,
}

/// On-disk layout, shared by the TOML and JSON formats.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    model_registry: BTreeMap<String, String>,
    #[serde(default)]
    team_defaults: BTreeMap<String, TeamDefaultEntry>,
    validation: ValidationConfig,
    aws_config: AwsConfig,
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    timeouts: TimeoutsConfig,
    #[serde(default)]
    profiles: ProfilesConfig,
}

#[derive(Debug, Deserialize)]
struct TeamDefaultEntry {
    model_type: String,
    version: String,
}

fn default_actions() -> Vec<String> {
    Action::ALL.iter().map(|a| a.as_str().to_string()).collect()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    80
}

impl Config {
    /// Load configuration from the given path.
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the file is missing, cannot be
    /// parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self, GatewayError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&contents, path)
        } else {
            Self::from_toml_str(&contents, path)
        }
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] on parse or validation failure.
    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self, GatewayError> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| {
            GatewayError::Config(format!("Failed to parse config {}: {e}", origin.display()))
        })?;
        Self::build(file)
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] on parse or validation failure.
    pub fn from_json_str(contents: &str, origin: &Path) -> Result<Self, GatewayError> {
        let file: ConfigFile = serde_json::from_str(contents).map_err(|e| {
            GatewayError::Config(format!("Failed to parse config {}: {e}", origin.display()))
        })?;
        Self::build(file)
    }

    fn build(file: ConfigFile) -> Result<Self, GatewayError> {
        let mut model_registry = HashMap::with_capacity(file.model_registry.len());
        for (raw_key, model_id) in file.model_registry {
            let key = ModelKey::from_registry_key(&raw_key).ok_or_else(|| {
                GatewayError::Config(format!(
                    "Invalid model_registry key '{raw_key}': expected '<model_type>_<version>'"
                ))
            })?;
            model_registry.insert(key, model_id);
        }

        let mut team_defaults = HashMap::with_capacity(file.team_defaults.len());
        for (team, entry) in file.team_defaults {
            let key = ModelKey::new(entry.model_type, entry.version);
            if !model_registry.contains_key(&key) {
                warn!(team = %team, model = %key, "team default is not in the model registry");
            }
            team_defaults.insert(team, key);
        }

        if file.validation.valid_teams.is_empty() {
            return Err(GatewayError::Config("validation.valid_teams must not be empty".into()));
        }
        for action in &file.validation.valid_actions {
            Action::from_str(action).map_err(|_| {
                GatewayError::Config(format!(
                    "Unknown action '{action}' in validation.valid_actions"
                ))
            })?;
        }
        if file.aws_config.region.trim().is_empty() {
            return Err(GatewayError::Config("aws_config.region must not be empty".into()));
        }
        if file.aws_config.dynamodb_table.trim().is_empty() {
            return Err(GatewayError::Config("aws_config.dynamodb_table must not be empty".into()));
        }

        Ok(Self {
            model_registry,
            team_defaults,
            validation: file.validation,
            aws: file.aws_config,
            server: file.server,
            timeouts: file.timeouts,
            profiles: file.profiles,
        })
    }

    /// Port to listen on, preferring the `PORT` environment variable.
    #[must_use]
    pub fn listen_port(&self) -> u16 {
        std::env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(self.server.port)
    }

    /// Registry rendered with `"{model_type}_{version}"` keys.
    #[must_use]
    pub fn registry_by_name(&self) -> BTreeMap<String, String> {
        self.model_registry.iter().map(|(k, v)| (k.registry_key(), v.clone())).collect()
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `PROFILE_GATEWAY_CONFIG` environment variable
/// 3. `MODEL_CONFIG_PATH` environment variable
/// 4. `config/models.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    ["PROFILE_GATEWAY_CONFIG", "MODEL_CONFIG_PATH"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .map_or_else(|| PathBuf::from("config/models.toml"), PathBuf::from)
}

#[cfg(test)]
pub(crate) const SAMPLE_TOML: &str = r#"
[model_registry]
"claude_3.5" = "us.anthropic.claude-3-5-sonnet-20240620-v1:0"
"claude_3" = "us.anthropic.claude-3-haiku-20240307-v1:0"
"nova_1.0" = "us.amazon.nova-pro-v1:0"

[team_defaults.teama]
model_type = "claude"
version = "3.5"

[team_defaults.teamb]
model_type = "nova"
version = "1.0"

[validation]
valid_teams = ["teama", "teamb", "teamc"]
valid_model_types = ["claude", "nova"]
valid_versions = ["3", "3.5", "1.0"]
valid_actions = ["create", "get", "delete", "use"]
default_version = "3.5"

[aws_config]
region = "us-west-2"
dynamodb_table = "team-profile"
"#;

#[cfg(test)]
impl Config {
    /// Configuration used across unit tests.
    pub(crate) fn sample() -> Self {
        Self::from_toml_str(SAMPLE_TOML, Path::new("sample.toml")).expect("sample config parses")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_parses() {
        let config = Config::sample();
        assert_eq!(config.model_registry.len(), 3);
        assert_eq!(
            config.model_registry.get(&ModelKey::new("claude", "3.5")).map(String::as_str),
            Some("us.anthropic.claude-3-5-sonnet-20240620-v1:0")
        );
        assert_eq!(config.team_defaults.get("teamb"), Some(&ModelKey::new("nova", "1.0")));
        assert_eq!(config.validation.default_version, "3.5");
        assert_eq!(config.aws.region, "us-west-2");
        assert_eq!(config.aws.dynamodb_table, "team-profile");
    }

    #[test]
    fn optional_sections_default() {
        let config = Config::sample();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 80);
        assert_eq!(config.timeouts.invocation, 120);
        assert!(!config.profiles.compensate_orphans);
        assert!(config.profiles.default_system_prompt.is_none());
    }

    #[test]
    fn registry_key_splits_on_first_underscore() {
        let toml = SAMPLE_TOML.replace("\"nova_1.0\"", "\"nova_pro_1.0\"");
        let config = Config::from_toml_str(&toml, Path::new("t.toml")).unwrap();
        assert!(config.model_registry.contains_key(&ModelKey::new("nova", "pro_1.0")));
    }

    #[test]
    fn registry_key_without_separator_is_rejected() {
        let toml = SAMPLE_TOML.replace("\"nova_1.0\"", "\"nova\"");
        let err = Config::from_toml_str(&toml, Path::new("t.toml")).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
        assert!(err.to_string().contains("Invalid model_registry key 'nova'"));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let toml = SAMPLE_TOML.replace("\"use\"]", "\"use\", \"update\"]");
        let err = Config::from_toml_str(&toml, Path::new("t.toml")).unwrap_err();
        assert!(err.to_string().contains("Unknown action 'update'"));
    }

    #[test]
    fn empty_team_list_is_rejected() {
        let toml = SAMPLE_TOML.replace("[\"teama\", \"teamb\", \"teamc\"]", "[]");
        assert!(Config::from_toml_str(&toml, Path::new("t.toml")).is_err());
    }

    #[test]
    fn missing_section_is_rejected() {
        let toml = SAMPLE_TOML.replace("[aws_config]", "[aws]");
        assert!(Config::from_toml_str(&toml, Path::new("t.toml")).is_err());
    }

    #[test]
    fn load_nonexistent_fails() {
        let err = Config::load(Path::new("/nonexistent/path/models.toml")).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn load_json_layout() {
        let dir = std::env::temp_dir().join("profile_gateway_config_json_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("models.json");
        std::fs::write(
            &path,
            r#"{
  "model_registry": {"claude_3.5": "us.anthropic.claude-3-5-sonnet-20240620-v1:0"},
  "team_defaults": {"teama": {"model_type": "claude", "version": "3.5"}},
  "validation": {
    "valid_teams": ["teama"],
    "valid_model_types": ["claude"],
    "valid_versions": ["3.5"],
    "valid_actions": ["create", "get", "delete", "use"],
    "default_version": "3.5"
  },
  "aws_config": {"region": "us-east-1", "dynamodb_table": "profiles"}
}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.aws.region, "us-east-1");
        assert_eq!(config.validation.valid_teams, vec!["teama".to_string()]);
        assert_eq!(config.registry_by_name().len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_invalid_toml() {
        let dir = std::env::temp_dir().join("profile_gateway_config_bad_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        assert!(Config::load(&path).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn discover_explicit_path() {
        let path = discover_config_path(Some("/tmp/my-models.toml"));
        assert_eq!(path, PathBuf::from("/tmp/my-models.toml"));
    }
}
