use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use sticker_collector::classifier::StickerClassifier;
use sticker_collector::config::Config;
use sticker_collector::db::SqliteStore;
use sticker_collector::llm::OpenAiCompatProvider;
use sticker_collector::message::{MessageComponent, MessageEvent, Reply};
use sticker_collector::pipeline::{retrieve, CollectOutcome};
use sticker_collector::plugin::StickerCollectorPlugin;

/// Sticker Collector: gather reaction stickers from group chats with an LLM.
///
/// This binary drives the plugin the way a chat host would, which is handy
/// for seeding the database and checking the classifier by hand.
#[derive(Parser)]
#[command(name = "sticker-collector", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the sticker database
    Init,

    /// Show how many stickers are stored
    Count,

    /// Search stickers by emotion or description
    Search {
        /// Substring to look for
        keyword: String,
    },

    /// Pick a random sticker, as the `send_sticker` tool would
    Send {
        /// Emotion the sticker should express (e.g. 高兴)
        emotion: String,

        /// Extra words the description must contain
        #[arg(long, default_value = "")]
        keywords: String,
    },

    /// Ask the LLM about one image without storing anything
    Classify {
        /// Image URL
        url: String,
    },

    /// Run the full collection pipeline on one image
    Collect {
        /// Image URL
        url: String,

        /// Platform name recorded as provenance
        #[arg(long, default_value = "cli")]
        platform: String,

        /// Group id recorded as provenance
        #[arg(long)]
        group: Option<String>,

        /// Sender id recorded as provenance
        #[arg(long)]
        sender: Option<String>,
    },

    /// Print the tool definitions to register with an LLM
    ToolSchema,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sticker_collector=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let config = Config::load()?;
            let db_path = config.db_path();
            info!(path = %db_path.display(), "Initializing sticker database");
            let store = SqliteStore::open(&db_path)?;
            println!("Database initialized at: {}", db_path.display());
            println!("Tables: {}", store.table_count().await?);
            if !config.has_provider() {
                println!(
                    "{}",
                    "LLM_API_KEY is not set; collection stays off until it is.".yellow()
                );
            }
        }

        Commands::Count => {
            let plugin = StickerCollectorPlugin::initialize(&Config::load()?).await?;
            print_command(&plugin, "sticker count").await;
        }

        Commands::Search { keyword } => {
            let plugin = StickerCollectorPlugin::initialize(&Config::load()?).await?;
            print_reply(&retrieve::search_stickers(plugin.store().as_ref(), &keyword).await);
        }

        Commands::Send { emotion, keywords } => {
            let plugin = StickerCollectorPlugin::initialize(&Config::load()?).await?;
            print_reply(&plugin.send_sticker(&emotion, &keywords).await);
        }

        Commands::Classify { url } => {
            let config = Config::load()?;
            config.require_provider()?;
            let provider =
                OpenAiCompatProvider::new(&config.llm_api_base, &config.llm_api_key, &config.llm_model)?;
            let classifier = StickerClassifier::new(Arc::new(provider))
                .with_timeout(config.classify_timeout);

            let verdict = classifier.classify(&url).await?;
            let accepted = verdict.is_accepted(config.settings.min_confidence);
            println!("is_sticker:  {}", verdict.is_sticker);
            println!("confidence:  {:.2}", verdict.confidence);
            println!("emotion:     {}", verdict.emotion.as_deref().unwrap_or("-"));
            println!("description: {}", verdict.description.as_deref().unwrap_or("-"));
            if accepted {
                println!("{}", "Would be collected".green().bold());
            } else {
                println!("{}", "Would be skipped".dimmed());
            }
        }

        Commands::Collect {
            url,
            platform,
            group,
            sender,
        } => {
            let config = Config::load()?;
            config.require_provider()?;
            let plugin = StickerCollectorPlugin::initialize(&config).await?;

            let mut event = MessageEvent::new(platform, vec![MessageComponent::image(url)]);
            event.group_id = group;
            event.sender_id = sender;

            match plugin.on_group_message(&event).await {
                CollectOutcome::Stored { url } => println!("{} {url}", "Collected".green().bold()),
                CollectOutcome::Duplicate { url } => println!("Already collected: {url}"),
                CollectOutcome::Rejected { url, verdict } => println!(
                    "{} {url} (is_sticker={}, confidence={:.2})",
                    "Skipped".yellow(),
                    verdict.is_sticker,
                    verdict.confidence
                ),
                CollectOutcome::Failed { url, error } => {
                    println!("{} {url}: {error}", "Failed".red().bold())
                }
                other => println!("Not classified: {other:?}"),
            }
        }

        Commands::ToolSchema => {
            let tools: Vec<_> = StickerCollectorPlugin::tool_definitions()
                .iter()
                .map(|tool| tool.to_openai_tool())
                .collect();
            println!("{}", serde_json::to_string_pretty(&tools)?);
        }
    }

    Ok(())
}

async fn print_command(plugin: &StickerCollectorPlugin, line: &str) {
    if let Some(reply) = plugin.handle_command(line).await {
        print_reply(&reply);
    }
}

fn print_reply(reply: &Reply) {
    match reply {
        Reply::Plain { text } => println!("{text}"),
        Reply::Image { url } => println!("{} {url}", "[image]".cyan()),
    }
}
