//! Content-generation gateway for postmitra.
//!
//! Routes typed requests (post, offer, reply, broadcast, image prompt,
//! monthly plan) to the generative-language backend, building the
//! instruction context from the brand profile and parsing structured
//! responses defensively.

mod client;
mod error;
mod models;
mod prompts;
mod service;

pub use client::GeminiClient;
pub use error::GenerationError;
pub use models::{ImagePrompt, MonthlyPlanItem};
pub use service::ContentService;
