//! Instruction context and per-operation prompt templates.

use postmitra_core::brand::{BrandProfile, Language};
use postmitra_core::history::HistoryItem;

/// Number of recent history items embedded as de-duplication context.
const RECENT_THEMES: usize = 5;

/// Fixed instruction template parameterized by the brand profile.
///
/// Directs the backend to answer exclusively in the configured language
/// and tone, concisely, ready to paste verbatim.
pub fn system_instruction(brand: &BrandProfile) -> String {
    let mut instruction = format!(
        "You are a social media and WhatsApp assistant for an Indian MSME.\n\
         Business Name: {}\n\
         Category: {}\n\
         Location: {}\n",
        brand.business_name, brand.category, brand.city
    );
    if let Some(description) = brand
        .business_description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        instruction.push_str(&format!("Business Description: {}\n", description));
    }
    instruction.push_str(&format!(
        "Preferred Language: {}\nTone: {}\n\n",
        brand.language, brand.tone
    ));

    instruction.push_str("Rules:\n");
    instruction.push_str(&format!("1. Always respond in {}.", brand.language));
    if brand.language == Language::Hinglish {
        instruction.push_str(" If Hinglish, use Latin script but Hindi vocabulary.");
    }
    instruction.push('\n');
    instruction.push_str("2. Keep it short and task-focused.\n");
    instruction.push_str(&format!("3. Use {} tone.\n", brand.tone));
    instruction.push_str("4. Avoid excessive emojis.\n");
    instruction.push_str("5. Content must be ready to copy-paste.\n");
    instruction.push_str("6. Use the business description to make content specific to their services.\n");
    instruction.push_str("7. For post generation, include emojis sparingly to keep it professional.\n");
    instruction
}

/// Daily post, with recent content embedded so the backend avoids
/// repeating itself.
pub fn today_post_prompt(history: &[HistoryItem]) -> String {
    let previous_themes = history
        .iter()
        .take(RECENT_THEMES)
        .map(|item| item.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Give me a post for today.\n\
         Recent posts to avoid repeating: {}\n\
         Output format:\n\
         [CAPTION]\n\
         [HASHTAGS]\n\
         [CTA]\n\
         Keep caption under 100 words.",
        previous_themes
    )
}

pub fn offer_prompt(product: &str, details: &str) -> String {
    format!(
        "Create an offer for \"{}\". Details: {}. Provide WhatsApp and Instagram versions.",
        product, details
    )
}

pub fn reply_prompt(customer_message: &str) -> String {
    format!(
        "Reply to: \"{}\". Focus on helpful intent.",
        customer_message
    )
}

pub fn broadcast_prompt() -> String {
    "Short WhatsApp broadcast message for today. Non-spammy.".to_string()
}

pub fn image_prompt_for_post(post_content: &str) -> String {
    format!(
        "Based on: \"{}\", generate a structured image prompt JSON.",
        post_content
    )
}

pub fn image_prompt_for_topic(topic: &str) -> String {
    format!("Generate an image prompt for: {}. Format as JSON.", topic)
}

pub fn monthly_plan_prompt() -> String {
    "30-day social media plan JSON.".to_string()
}
