use clap::{Parser, Subcommand};

use postmitra_core::brand::{Language, Tone};

#[derive(Parser)]
#[command(name = "postmitra")]
#[command(about = "Content assistant for small businesses: posts, offers, replies and more")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or fully replace the business profile
    Onboard {
        /// Business name
        #[arg(long)]
        name: String,

        /// Business category (e.g. Retail)
        #[arg(long)]
        category: String,

        /// City the business operates in
        #[arg(long)]
        city: String,

        /// Content language (English, Hinglish or Hindi)
        #[arg(long, default_value = "English")]
        language: Language,

        /// Content tone (Professional, Friendly or Local)
        #[arg(long, default_value = "Friendly")]
        tone: Tone,

        /// What the business sells or does
        #[arg(long)]
        description: Option<String>,

        /// Gemini API key used for generation
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show the current profile
    Profile,

    /// Generate content and record it in the history
    Generate {
        #[command(subcommand)]
        cmd: GenerateCommands,
    },

    /// Show recent generation history, newest first
    History {
        /// Maximum number of entries to print
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },

    /// Manage the remote-store configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum GenerateCommands {
    /// Today's post caption plus a matching visual prompt
    Post,

    /// Offer announcement with WhatsApp and Instagram versions
    Offer {
        /// Product or offer name
        #[arg(long)]
        product: String,

        /// Offer details (discount, validity, ...)
        #[arg(long, default_value = "")]
        details: String,
    },

    /// Draft a reply to a customer message
    Reply {
        /// The customer message to answer
        message: String,
    },

    /// Short WhatsApp broadcast message for today
    Broadcast,

    /// Structured image prompt for a topic
    ImagePrompt {
        /// What the image should be about
        topic: String,
    },

    /// 30-day content outline (display only, not saved)
    Plan,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved remote configuration (key redacted)
    Show,

    /// Validate and save a pasted configuration blob; reads stdin if omitted
    Set {
        /// The configuration, as strict JSON or a pasted console snippet
        blob: Option<String>,
    },

    /// Forget the manually entered configuration
    Clear,
}
