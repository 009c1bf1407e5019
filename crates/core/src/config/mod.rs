//! Remote-store configuration discovery and validation.
//!
//! Resolution order, first match wins:
//! 1. a manually entered configuration blob persisted locally,
//! 2. environment variables, tried unprefixed and under the conventional
//!    build-tool prefixes.
//!
//! An incomplete configuration is treated as absent and falls through; if
//! every source is absent the app runs in degraded local-only mode, which
//! is not an error.

mod paste;

pub use paste::parse_pasted_config;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, Result};
use crate::sync::{LocalStore, MANUAL_CONFIG_KEY};

/// Environment-name prefixes tried in order. The empty prefix first, then
/// the well-known build-tool conventions.
pub const ENV_PREFIXES: [&str; 4] = ["", "VITE_", "NEXT_PUBLIC_", "REACT_APP_"];

/// Remote document store credentials and addressing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    pub api_key: String,
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_sender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<String>,
}

impl RemoteConfig {
    /// Minimum viable configuration: non-empty API key and project id.
    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.project_id.trim().is_empty()
    }

    /// Auth domain, defaulting to `{projectId}.firebaseapp.com`.
    pub fn auth_domain_or_default(&self) -> String {
        self.auth_domain
            .clone()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| format!("{}.firebaseapp.com", self.project_id))
    }

    /// Storage bucket, defaulting to `{projectId}.appspot.com`.
    pub fn storage_bucket_or_default(&self) -> String {
        self.storage_bucket
            .clone()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| format!("{}.appspot.com", self.project_id))
    }
}

/// Resolve the remote-store configuration from the layered sources.
///
/// `None` means no usable configuration anywhere: run local-only.
pub fn resolve_remote_config(local: &dyn LocalStore) -> Option<RemoteConfig> {
    if let Some(config) = resolve_manual_config(local) {
        debug!("Using manually entered remote configuration");
        return Some(config);
    }
    let config = resolve_env_config(|name| std::env::var(name).ok());
    if config.is_some() {
        debug!("Using remote configuration from environment");
    }
    config
}

/// Read and tolerantly parse the manually entered blob, if any.
fn resolve_manual_config(local: &dyn LocalStore) -> Option<RemoteConfig> {
    let raw = match local.get(MANUAL_CONFIG_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!("Failed to read manual remote configuration: {}", err);
            return None;
        }
    };
    let value = parse_pasted_config(&raw)?;
    match serde_json::from_value::<RemoteConfig>(value) {
        Ok(config) if config.is_complete() => Some(config),
        Ok(_) => {
            warn!("Stored manual configuration is incomplete; ignoring it");
            None
        }
        Err(err) => {
            warn!("Stored manual configuration did not decode: {}", err);
            None
        }
    }
}

/// Environment discovery over an injected lookup. Pure; tests never touch
/// the process environment. A prefix matches only when both required names
/// resolve to non-empty values under it.
pub fn resolve_env_config<F>(lookup: F) -> Option<RemoteConfig>
where
    F: Fn(&str) -> Option<String>,
{
    for prefix in ENV_PREFIXES {
        let get = |name: &str| {
            lookup(&format!("{}{}", prefix, name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let Some(api_key) = get("FIREBASE_API_KEY") else {
            continue;
        };
        let Some(project_id) = get("FIREBASE_PROJECT_ID") else {
            continue;
        };

        return Some(RemoteConfig {
            api_key,
            project_id,
            auth_domain: get("FIREBASE_AUTH_DOMAIN"),
            storage_bucket: get("FIREBASE_STORAGE_BUCKET"),
            messaging_sender_id: get("FIREBASE_MESSAGING_SENDER_ID"),
            app_id: get("FIREBASE_APP_ID"),
            measurement_id: get("FIREBASE_MEASUREMENT_ID"),
        });
    }
    None
}

/// Validate and persist a manually entered configuration blob.
///
/// Rejected input leaves any previously stored configuration untouched;
/// an active [`crate::sync::StorageContext`] keeps its current remote
/// handle until it is explicitly reinitialized.
pub fn save_manual_config(local: &dyn LocalStore, raw: &str) -> Result<RemoteConfig> {
    let value = parse_pasted_config(raw).ok_or(ConfigError::Unparseable)?;

    for field in ["apiKey", "projectId"] {
        let present = value
            .get(field)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .is_some_and(|v| !v.is_empty());
        if !present {
            return Err(ConfigError::MissingField(field).into());
        }
    }

    let config: RemoteConfig =
        serde_json::from_value(value.clone()).map_err(|_| ConfigError::Unparseable)?;
    local.set(MANUAL_CONFIG_KEY, &value.to_string())?;
    Ok(config)
}

/// Forget any manually entered configuration. Environment discovery still
/// applies on the next resolution.
pub fn clear_manual_config(local: &dyn LocalStore) -> Result<()> {
    local.set(MANUAL_CONFIG_KEY, "")?;
    Ok(())
}
