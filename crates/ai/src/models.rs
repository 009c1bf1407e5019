//! Structured generation shapes and their response schemas.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured prompt handed to a designer or image model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePrompt {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub image_type: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub text_on_image: String,
    #[serde(default)]
    pub aspect_ratio: String,
}

impl ImagePrompt {
    /// True when the backend produced nothing usable.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// One suggested slot of the 30-day content outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPlanItem {
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub topic: String,
}

/// Response schema for image prompts.
pub fn image_prompt_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "platform": { "type": "STRING" },
            "image_type": { "type": "STRING" },
            "subject": { "type": "STRING" },
            "setting": { "type": "STRING" },
            "style": { "type": "STRING" },
            "text_on_image": { "type": "STRING" },
            "aspect_ratio": { "type": "STRING" }
        },
        "required": [
            "platform", "image_type", "subject", "setting",
            "style", "text_on_image", "aspect_ratio"
        ]
    })
}

/// Response schema for the monthly plan.
pub fn monthly_plan_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "date": { "type": "STRING" },
                "type": { "type": "STRING" },
                "topic": { "type": "STRING" }
            },
            "required": ["date", "type", "topic"]
        }
    })
}
