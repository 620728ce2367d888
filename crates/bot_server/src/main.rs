use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use bot_server::dispatch::Dispatcher;
use bot_server::handlers::Handlers;
use bot_server::poller::UpdatePoller;
use bot_server::strings;
use chat_storage::{ConversationStore, SqliteChatStorage, Whitelist};
use llm_client::{ChatGenerator, OpenAiGenerator};
use session_manager::{InactivityReaper, ReaperConfig, SessionStore};
use telegram_transport::{ChatTransport, TelegramApi};

#[derive(Parser, Debug, Clone)]
#[command(name = "studybot")]
#[command(about = "Telegram study assistant bot")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Telegram bot token
    #[arg(long, env = "BOT_TOKEN")]
    bot_token: String,

    /// Telegram user id of the bot admin
    #[arg(long, env = "ADMIN_ID")]
    admin_id: i64,

    /// Path of the SQLite database
    #[arg(long, env = "DATABASE_PATH", default_value = "studybot.db")]
    database_path: String,

    /// LLM API base URL
    #[arg(long, env = "LLM_BASE_URL", default_value = "https://api.openai.com/v1")]
    llm_base_url: String,

    /// LLM model name
    #[arg(long, env = "LLM_MODEL", default_value = "gpt-4o-mini")]
    llm_model: String,

    /// LLM API key
    #[arg(long, env = "LLM_API_KEY")]
    llm_api_key: String,

    /// Seconds of inactivity before a session is reset
    #[arg(long, env = "IDLE_TIMEOUT_SECS", default_value = "1800")]
    idle_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    log::info!("starting studybot");
    log::info!("  database: {}", cli.database_path);
    log::info!("  llm base url: {}", cli.llm_base_url);
    log::info!("  llm model: {}", cli.llm_model);
    log::info!("  idle timeout: {}s", cli.idle_timeout_secs);

    let storage = Arc::new(SqliteChatStorage::new(&cli.database_path));
    storage
        .init()
        .await
        .context("failed to initialize the database")?;

    let conversations: Arc<dyn ConversationStore> = storage.clone();
    let whitelist: Arc<dyn Whitelist> = storage.clone();

    let api = Arc::new(TelegramApi::new(cli.bot_token));
    let transport: Arc<dyn ChatTransport> = api.clone();

    let generator: Arc<dyn ChatGenerator> = Arc::new(
        OpenAiGenerator::new(cli.llm_api_key)
            .with_base_url(cli.llm_base_url)
            .with_model(cli.llm_model),
    );

    // Restore a session slot for every whitelisted user so the reaper
    // and dispatcher see them from the first update.
    let store = Arc::new(SessionStore::new());
    let known = whitelist
        .list_authorized()
        .await
        .context("failed to load the whitelist")?;
    store.seed(&known).await;
    log::info!("restored {} whitelisted users", known.len());

    let handlers = Arc::new(Handlers {
        store: store.clone(),
        transport: transport.clone(),
        conversations,
        whitelist: whitelist.clone(),
        generator,
        admin_id: cli.admin_id,
    });
    let dispatcher = Arc::new(Dispatcher::new(handlers));

    let cancel = CancellationToken::new();

    let reaper = InactivityReaper::new(
        store,
        transport,
        ReaperConfig {
            idle_timeout: Duration::from_secs(cli.idle_timeout_secs),
            timeout_notice: strings::timeout_message(),
            ..ReaperConfig::default()
        },
    );
    let reaper_task = tokio::spawn(reaper.run(cancel.clone()));

    let poller = UpdatePoller::new(api, dispatcher, whitelist);
    let poller_task = tokio::spawn(poller.run(cancel.clone()));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    log::info!("shutting down");
    cancel.cancel();

    let _ = poller_task.await;
    let _ = reaper_task.await;
    Ok(())
}
