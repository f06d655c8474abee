use anyhow::Result;
use clap::Parser;
use serenity::all::GatewayIntents;
use serenity::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use switchboard::application::bot::Bot;
use switchboard::application::logging;
use switchboard::application::mirror::StateMirror;
use switchboard::domain::config::AppConfig;
use switchboard::infrastructure::discord::{DiscordSession, Handler};
use switchboard::interface::commands;
use switchboard::strings::logs;

/// Prefix-command bot with optional Redis state mirroring
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "data/config.yaml")]
    config: PathBuf,

    /// Bot token (overrides config file)
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Redis address for state mirroring (overrides config file)
    #[arg(long, env = "REDIS_URL")]
    redis: Option<String>,

    /// Command prefix, repeatable; earlier prefixes are tried first
    #[arg(short, long = "prefix")]
    prefixes: Vec<String>,

    /// Directory for the log file (overrides config file)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<(AppConfig, bool)> {
    let found = args.config.exists();
    let mut config = AppConfig::load(&args.config)?;
    if let Some(token) = &args.token {
        config.discord.token = Some(token.clone());
    }
    if let Some(redis) = &args.redis {
        config.state.redis = Some(redis.clone());
    }
    if !args.prefixes.is_empty() {
        config.discord.prefixes = args.prefixes.clone();
    }
    if let Some(dir) = &args.log_dir {
        config.logging.dir = dir.display().to_string();
    }
    Ok((config, found))
}

#[cfg(feature = "redis")]
async fn connect_state(url: &str) -> Result<Arc<StateMirror>> {
    use switchboard::infrastructure::kv::RedisStore;

    let store = RedisStore::connect(url).await?;
    Ok(Arc::new(StateMirror::new(Arc::new(store))))
}

#[cfg(not(feature = "redis"))]
async fn connect_state(_url: &str) -> Result<Arc<StateMirror>> {
    anyhow::bail!("built without the `redis` feature")
}

#[tokio::main]
async fn main() -> Result<()> {
    run(Args::parse()).await
}

async fn run(args: Args) -> Result<()> {
    let (config, found) = load_config(&args)?;

    // Nothing is written, not even the log file, without a token.
    let Some(token) = config.token().map(str::to_string) else {
        return Ok(());
    };

    let _guard = logging::init(Path::new(&config.logging.dir), config.logging.filter.as_deref())?;

    let config_path = args.config.display().to_string();
    if found {
        info!("{}", logs::config_loaded(&config_path));
    } else {
        info!("{}", logs::config_missing(&config_path));
    }

    let state = match config.redis_url() {
        Some(url) => match connect_state(&url).await {
            Ok(state) => Some(state),
            Err(e) => {
                error!("{}", logs::redis_connect_fail(&e.to_string()));
                return Err(e);
            }
        },
        None => {
            info!("{}", logs::STATE_DISABLED);
            None
        }
    };

    let session = Arc::new(DiscordSession::from_token(&token));
    let mut bot = Bot::new(session, config.prefixes(), config.discord.description.clone());
    if let Some(state) = &state {
        bot = bot.with_state(state.clone());
    }
    let bot = bot.init();
    commands::install(&bot);
    info!(
        "{}",
        logs::registered_commands(bot.commands().len(), bot.prefixes())
    );

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_EMOJIS_AND_STICKERS
        | GatewayIntents::GUILD_PRESENCES
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_TYPING
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let handler = Handler::new(bot, state);
    let mut client = Client::builder(&token, intents)
        .event_handler(handler.clone())
        .raw_event_handler(handler)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Discord client: {}", e))?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("{}", logs::SHUTDOWN);
                shard_manager.shutdown_all().await;
            }
            Err(e) => warn!("{}", logs::shutdown_fail(&e.to_string())),
        }
    });

    if let Err(e) = client.start_autosharded().await {
        error!("{}", logs::client_fail(&e.to_string()));
        return Err(e.into());
    }
    Ok(())
}
