//! Validation of inbound profile requests.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::config::ValidationConfig;
use crate::error::GatewayError;

/// Operations accepted on the profile endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Provision and record a profile.
    Create,
    /// Read a profile record.
    Get,
    /// Deprovision and forget a profile.
    Delete,
    /// Converse through a profile.
    Use,
}

impl Action {
    /// Every action, in the order they are listed to callers.
    pub const ALL: [Self; 4] = [Self::Create, Self::Get, Self::Delete, Self::Use];

    /// Wire name of the action.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Get => "get",
            Self::Delete => "delete",
            Self::Use => "use",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("Unknown action '{s}'"))
    }
}

/// Raw request body of `POST /team-profile`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileRequest {
    /// Owning team.
    #[serde(default)]
    pub team_tag: Option<String>,
    /// One of `create`, `get`, `delete`, `use`.
    #[serde(default)]
    pub action: Option<String>,
    /// Model family.
    #[serde(default)]
    pub model_type: Option<String>,
    /// Model version; the configured default applies when absent.
    #[serde(default)]
    pub version: Option<String>,
    /// Message for `use`.
    #[serde(default)]
    pub user_message: Option<String>,
    /// Optional system prompt for `use`.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl ProfileRequest {
    /// Interpret a JSON body as a request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] for an empty body or fields of the
    /// wrong type.
    pub fn from_json(body: serde_json::Value) -> Result<Self, GatewayError> {
        let is_empty = match &body {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if is_empty {
            return Err(GatewayError::Validation("No data provided".into()));
        }
        serde_json::from_value(body)
            .map_err(|e| GatewayError::Validation(format!("Invalid request body: {e}")))
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Owning team, a member of the configured teams.
    pub team: String,
    /// Requested operation.
    pub action: Action,
    /// Model family.
    pub model_type: String,
    /// Model version, defaulted when absent.
    pub version: String,
    /// Present whenever `action` is [`Action::Use`].
    pub user_message: Option<String>,
    /// Optional system prompt.
    pub system_prompt: Option<String>,
}

/// Check a request against the configured teams and actions.
///
/// Empty strings count as absent. `model_type` is only checked for presence.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] describing the first problem found.
pub fn validate_request(
    request: ProfileRequest,
    rules: &ValidationConfig,
) -> Result<ValidatedRequest, GatewayError> {
    let team = non_empty(request.team_tag)
        .filter(|t| rules.valid_teams.contains(t))
        .ok_or_else(|| {
            GatewayError::Validation(format!(
                "Invalid team_tag. Must be one of: {}",
                rules.valid_teams.join(", ")
            ))
        })?;

    let action = non_empty(request.action)
        .filter(|a| rules.valid_actions.contains(a))
        .and_then(|a| a.parse::<Action>().ok())
        .ok_or_else(|| {
            GatewayError::Validation(format!(
                "Invalid action. Must be one of: {}",
                rules.valid_actions.join(", ")
            ))
        })?;

    let model_type = non_empty(request.model_type)
        .ok_or_else(|| GatewayError::Validation("model_type is required".into()))?;

    let version = non_empty(request.version).unwrap_or_else(|| rules.default_version.clone());

    let user_message = non_empty(request.user_message);
    if action == Action::Use && user_message.is_none() {
        return Err(GatewayError::Validation("user_message is required for 'use' action".into()));
    }

    Ok(ValidatedRequest {
        team,
        action,
        model_type,
        version,
        user_message,
        system_prompt: non_empty(request.system_prompt),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
