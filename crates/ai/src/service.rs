//! Typed generation operations over the backend client.

use postmitra_core::brand::BrandProfile;
use postmitra_core::history::HistoryItem;
use postmitra_core::utils::json::parse_or_default;

use crate::client::GeminiClient;
use crate::error::{GenerationError, Result};
use crate::models::{self, ImagePrompt, MonthlyPlanItem};
use crate::prompts;

/// The content-generation gateway.
///
/// Every operation checks the credential precondition first: an empty API
/// key fails immediately with [`GenerationError::MissingApiKey`] and makes
/// no network call. Structured responses degrade to empty defaults on
/// parse failure; plain-text responses default to `""`.
#[derive(Debug, Clone, Default)]
pub struct ContentService {
    client: GeminiClient,
}

impl ContentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Against a non-default backend endpoint, mainly for tests.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: GeminiClient::with_base_url(base_url),
        }
    }

    fn require_api_key(brand: &BrandProfile) -> Result<&str> {
        brand
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(GenerationError::MissingApiKey)
    }

    /// Daily post caption, with recent history as de-duplication context.
    pub async fn generate_today_post(
        &self,
        brand: &BrandProfile,
        history: &[HistoryItem],
    ) -> Result<String> {
        let key = Self::require_api_key(brand)?;
        self.client
            .generate_content(
                key,
                &prompts::system_instruction(brand),
                &prompts::today_post_prompt(history),
                None,
            )
            .await
    }

    /// Visual prompt matching an already generated caption. Runs after the
    /// caption call; the two are sequential, never concurrent.
    pub async fn generate_image_prompt_for_post(
        &self,
        brand: &BrandProfile,
        post_content: &str,
    ) -> Result<ImagePrompt> {
        let key = Self::require_api_key(brand)?;
        let text = self
            .client
            .generate_content(
                key,
                &prompts::system_instruction(brand),
                &prompts::image_prompt_for_post(post_content),
                Some(models::image_prompt_schema()),
            )
            .await?;
        Ok(parse_or_default(&text))
    }

    pub async fn generate_offer(
        &self,
        brand: &BrandProfile,
        product: &str,
        details: &str,
    ) -> Result<String> {
        let key = Self::require_api_key(brand)?;
        self.client
            .generate_content(
                key,
                &prompts::system_instruction(brand),
                &prompts::offer_prompt(product, details),
                None,
            )
            .await
    }

    pub async fn generate_reply(
        &self,
        brand: &BrandProfile,
        customer_message: &str,
    ) -> Result<String> {
        let key = Self::require_api_key(brand)?;
        self.client
            .generate_content(
                key,
                &prompts::system_instruction(brand),
                &prompts::reply_prompt(customer_message),
                None,
            )
            .await
    }

    pub async fn generate_broadcast(&self, brand: &BrandProfile) -> Result<String> {
        let key = Self::require_api_key(brand)?;
        self.client
            .generate_content(
                key,
                &prompts::system_instruction(brand),
                &prompts::broadcast_prompt(),
                None,
            )
            .await
    }

    pub async fn generate_image_prompt(
        &self,
        brand: &BrandProfile,
        topic: &str,
    ) -> Result<ImagePrompt> {
        let key = Self::require_api_key(brand)?;
        let text = self
            .client
            .generate_content(
                key,
                &prompts::system_instruction(brand),
                &prompts::image_prompt_for_topic(topic),
                Some(models::image_prompt_schema()),
            )
            .await?;
        Ok(parse_or_default(&text))
    }

    pub async fn generate_monthly_plan(
        &self,
        brand: &BrandProfile,
    ) -> Result<Vec<MonthlyPlanItem>> {
        let key = Self::require_api_key(brand)?;
        let text = self
            .client
            .generate_content(
                key,
                &prompts::system_instruction(brand),
                &prompts::monthly_plan_prompt(),
                Some(models::monthly_plan_schema()),
            )
            .await?;
        Ok(parse_or_default(&text))
    }
}
