//! Command handlers wiring the reconciler and the generation gateway.

use std::io::Read;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, Local};

use postmitra_ai::ContentService;
use postmitra_core::brand::{BrandProfile, Language, Tone};
use postmitra_core::config;
use postmitra_core::history::{ContentKind, HistoryItem, NewHistoryEntry};
use postmitra_core::sync::{LocalStore, StorageContext};

use crate::bootstrap;
use crate::cli::{Cli, Commands, ConfigCommands, GenerateCommands};

pub async fn run(cli: Cli) -> Result<()> {
    let local: Arc<dyn LocalStore> = Arc::new(bootstrap::open_local_store()?);
    let remote = bootstrap::build_remote(local.as_ref());
    let mut context = StorageContext::new(Arc::clone(&local), remote);

    match cli.command {
        Commands::Onboard {
            name,
            category,
            city,
            language,
            tone,
            description,
            api_key,
        } => {
            onboard(
                &context, name, category, city, language, tone, description, api_key,
            )
            .await
        }
        Commands::Profile => show_profile(&context).await,
        Commands::Generate { cmd } => generate(&context, cmd).await,
        Commands::History { limit } => show_history(&context, limit).await,
        Commands::Config { cmd } => manage_config(&mut context, local.as_ref(), cmd),
    }
}

#[allow(clippy::too_many_arguments)]
async fn onboard(
    context: &StorageContext,
    name: String,
    category: String,
    city: String,
    language: Language,
    tone: Tone,
    description: Option<String>,
    api_key: Option<String>,
) -> Result<()> {
    let profile = BrandProfile {
        business_name: name,
        category,
        city,
        language,
        tone,
        business_description: description.filter(|d| !d.trim().is_empty()),
        api_key: api_key.filter(|k| !k.trim().is_empty()),
    };
    profile.validate()?;

    context.save_profile(&profile).await;
    println!("Profile saved for {}.", profile.business_name);
    if context.has_remote() {
        println!("Synced to the cloud as {} (best effort).", context.client_id());
    } else {
        println!("Running local-only; add a remote configuration to sync across devices.");
    }
    if profile.api_key.is_none() {
        println!("Note: no API key set. Generation commands will ask for one.");
    }
    Ok(())
}

async fn require_profile(context: &StorageContext) -> Result<BrandProfile> {
    context
        .load_profile()
        .await
        .context("No business profile yet. Run `postmitra onboard` first.")
}

async fn show_profile(context: &StorageContext) -> Result<()> {
    let profile = require_profile(context).await?;
    println!("Business:  {}", profile.business_name);
    println!("Category:  {}", profile.category);
    println!("City:      {}", profile.city);
    println!("Language:  {}", profile.language);
    println!("Tone:      {}", profile.tone);
    if let Some(description) = &profile.business_description {
        println!("About:     {}", description);
    }
    println!(
        "API key:   {}",
        if profile.api_key.is_some() {
            "configured"
        } else {
            "not set"
        }
    );
    println!("Device id: {}", context.client_id());
    Ok(())
}

async fn generate(context: &StorageContext, cmd: GenerateCommands) -> Result<()> {
    let profile = require_profile(context).await?;
    let service = ContentService::new();

    match cmd {
        GenerateCommands::Post => {
            let history = context.load_history().await;
            let caption = service.generate_today_post(&profile, &history).await?;
            if caption.is_empty() {
                bail!("The backend returned no content. Try again.");
            }
            println!("{}\n", caption);
            context
                .append_history(NewHistoryEntry::new(ContentKind::Post, caption.clone()))
                .await;

            // The visual prompt depends on the caption, so it runs second.
            let visual = service
                .generate_image_prompt_for_post(&profile, &caption)
                .await?;
            println!("Matching visual prompt:");
            println!("{}", serde_json::to_string_pretty(&visual)?);
        }
        GenerateCommands::Offer { product, details } => {
            let offer = service.generate_offer(&profile, &product, &details).await?;
            if offer.is_empty() {
                bail!("The backend returned no content. Try again.");
            }
            println!("{}", offer);
            context
                .append_history(
                    NewHistoryEntry::new(ContentKind::Offer, offer)
                        .with_meta(serde_json::json!({ "product": product })),
                )
                .await;
        }
        GenerateCommands::Reply { message } => {
            let reply = service.generate_reply(&profile, &message).await?;
            if reply.is_empty() {
                bail!("The backend returned no content. Try again.");
            }
            println!("{}", reply);
            context
                .append_history(NewHistoryEntry::new(ContentKind::Reply, reply))
                .await;
        }
        GenerateCommands::Broadcast => {
            let broadcast = service.generate_broadcast(&profile).await?;
            if broadcast.is_empty() {
                bail!("The backend returned no content. Try again.");
            }
            println!("{}", broadcast);
            context
                .append_history(NewHistoryEntry::new(ContentKind::Broadcast, broadcast))
                .await;
        }
        GenerateCommands::ImagePrompt { topic } => {
            let prompt = service.generate_image_prompt(&profile, &topic).await?;
            let rendered = serde_json::to_string_pretty(&prompt)?;
            println!("{}", rendered);
            context
                .append_history(NewHistoryEntry::new(
                    ContentKind::Prompt,
                    serde_json::to_string(&prompt)?,
                ))
                .await;
        }
        GenerateCommands::Plan => {
            let plan = service.generate_monthly_plan(&profile).await?;
            if plan.is_empty() {
                println!("No plan came back. Try again.");
                return Ok(());
            }
            for item in plan {
                println!("{:<8} {:<10} {}", item.date, item.kind, item.topic);
            }
        }
    }
    Ok(())
}

async fn show_history(context: &StorageContext, limit: usize) -> Result<()> {
    let history = context.load_history().await;
    if history.is_empty() {
        println!("No history yet.");
        return Ok(());
    }
    for item in history.iter().take(limit) {
        print_history_item(item);
    }
    Ok(())
}

fn print_history_item(item: &HistoryItem) {
    let stamp = DateTime::from_timestamp_millis(item.timestamp)
        .map(|dt| {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| item.timestamp.to_string());
    println!("[{}] {} ({})", stamp, item.kind, item.id);
    println!("{}\n", item.content);
}

fn manage_config(
    context: &mut StorageContext,
    local: &dyn LocalStore,
    cmd: ConfigCommands,
) -> Result<()> {
    match cmd {
        ConfigCommands::Show => match config::resolve_remote_config(local) {
            Some(config) => {
                println!("Project:     {}", config.project_id);
                println!("Auth domain: {}", config.auth_domain_or_default());
                println!("API key:     {}", redact(&config.api_key));
            }
            None => println!("No remote configuration; running local-only."),
        },
        ConfigCommands::Set { blob } => {
            let raw = match blob {
                Some(raw) => raw,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buffer)
                        .context("reading configuration from stdin")?;
                    buffer
                }
            };
            let saved = config::save_manual_config(local, &raw)?;
            // Rebuild the storage context in place; no restart needed.
            context.replace_remote(Some(bootstrap::remote_from_config(&saved)));
            println!(
                "Remote configuration saved for project {}.",
                saved.project_id
            );
        }
        ConfigCommands::Clear => {
            config::clear_manual_config(local)?;
            context.replace_remote(bootstrap::build_remote(local));
            if context.has_remote() {
                println!("Manual configuration cleared; using environment configuration.");
            } else {
                println!("Manual configuration cleared; running local-only.");
            }
        }
    }
    Ok(())
}

fn redact(key: &str) -> String {
    let visible: String = key.chars().take(6).collect();
    format!("{}…", visible)
}
