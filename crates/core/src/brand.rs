//! Business profile domain model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Output language for generated content.
///
/// Serialized as the capitalized variant name; this matches the values
/// persisted by existing installs and must not change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Hinglish,
    Hindi,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::English => "English",
            Language::Hinglish => "Hinglish",
            Language::Hindi => "Hindi",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" => Ok(Language::English),
            "hinglish" => Ok(Language::Hinglish),
            "hindi" => Ok(Language::Hindi),
            other => Err(format!(
                "unknown language '{}' (expected English, Hinglish or Hindi)",
                other
            )),
        }
    }
}

/// Voice used for generated content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Professional,
    #[default]
    Friendly,
    Local,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tone::Professional => "Professional",
            Tone::Friendly => "Friendly",
            Tone::Local => "Local",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "professional" => Ok(Tone::Professional),
            "friendly" => Ok(Tone::Friendly),
            "local" => Ok(Tone::Local),
            other => Err(format!(
                "unknown tone '{}' (expected Professional, Friendly or Local)",
                other
            )),
        }
    }
}

/// The single business configuration record driving all generation
/// prompts.
///
/// Exactly one profile is authoritative per device at any time: it is
/// either absent (onboarding required) or valid per [`BrandProfile::validate`].
/// Mutations are full-replace only; there are no partial-field patches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandProfile {
    pub business_name: String,
    pub category: String,
    pub city: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_description: Option<String>,
    /// Generation-backend credential. Absence is a valid state surfaced by
    /// the gateway at use-time, not at load-time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl BrandProfile {
    /// Enforce the required-field invariant for a completed onboarding.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("businessName", &self.business_name),
            ("category", &self.category),
            ("city", &self.city),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Profile(format!(
                    "required field '{}' is empty",
                    field
                )));
            }
        }
        Ok(())
    }
}
