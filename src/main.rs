use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use zoom_archive_server::access::AccessGate;
use zoom_archive_server::bot::{run_bot, BotServices, TelegramTransport};
use zoom_archive_server::catalogue::{CatalogueChat, CatalogueQuery};
use zoom_archive_server::config::{AppConfig, CliConfig, FileConfig};
use zoom_archive_server::delivery::{ChatTransport, DeliveryService};
use zoom_archive_server::download_manager::{DownloadOrchestrator, YtDlpDownloader};
use zoom_archive_server::ingestion::IngestionService;
use zoom_archive_server::recording::{RecordingStore, SqliteRecordingStore};
use zoom_archive_server::server::{run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file win over the flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the recordings database.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Where downloaded recordings are stored. Defaults to <db-dir>/downloads.
    #[clap(long, value_parser = parse_path)]
    pub downloads_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Telegram bot token. Without it only the web interface runs.
    #[clap(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Telegram id allowed to authorize uploaders.
    #[clap(long, env = "ADMIN_ID")]
    pub admin_id: Option<i64>,

    /// yt-dlp executable.
    #[clap(long)]
    pub downloader_path: Option<PathBuf>,

    /// Files larger than this are kept locally instead of being sent to the chat.
    #[clap(long)]
    pub max_upload_mb: Option<u64>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            downloads_dir: self.downloads_dir.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            frontend_dir_path: self.frontend_dir_path.clone(),
            bot_token: self.bot_token.clone(),
            admin_id: self.admin_id,
            downloader_path: self.downloader_path.clone(),
            max_upload_mb: self.max_upload_mb,
        }
    }
}

fn start_bot(
    config: &AppConfig,
    token: &str,
    store: Arc<dyn RecordingStore>,
    query: Arc<CatalogueQuery>,
) -> Result<JoinHandle<()>> {
    let bot = teloxide::Bot::new(token);
    let transport: Arc<dyn ChatTransport> = Arc::new(TelegramTransport::new(bot.clone()));

    if config.bot.admin_id.is_none() {
        warn!("No admin id configured, /adduploader is disabled");
    }
    let gate = Arc::new(AccessGate::warmed(store.clone(), config.bot.admin_id)?);

    let delivery = Arc::new(DeliveryService::new(
        store.clone(),
        transport.clone(),
        config.downloader.max_upload_bytes,
    ));
    let orchestrator = Arc::new(DownloadOrchestrator::new(
        store.clone(),
        Arc::new(YtDlpDownloader::new(config.downloader.executable.clone())),
        delivery.clone(),
        config.downloads_dir.clone(),
    ));
    let ingestion = Arc::new(IngestionService::new(
        gate.clone(),
        store,
        orchestrator,
        transport.clone(),
    ));
    let catalogue = Arc::new(CatalogueChat::new(query, delivery));

    let services = Arc::new(BotServices {
        gate,
        ingestion,
        catalogue,
        transport,
    });
    Ok(tokio::spawn(run_bot(bot, services)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let db_path = config.recordings_db_path();
    info!("Opening recordings database at {:?}...", db_path);
    let store: Arc<dyn RecordingStore> = Arc::new(SqliteRecordingStore::new(&db_path)?);
    let query = Arc::new(CatalogueQuery::new(store.clone()));

    info!("Recordings are stored in {:?}", config.downloads_dir);

    let bot_handle = match config.bot.token.as_deref() {
        Some(token) => Some(start_bot(&config, token, store.clone(), query.clone())?),
        None => {
            warn!("No bot token configured, running the web interface only");
            None
        }
    };

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level.clone(),
        port: config.port,
        frontend_dir_path: config.frontend_dir_path.clone(),
    };
    let server = run_server(server_config, query, env!("GIT_HASH").to_string());

    match bot_handle {
        Some(handle) => {
            tokio::select! {
                result = server => result,
                _ = handle => {
                    info!("Telegram bot stopped, shutting down");
                    Ok(())
                }
            }
        }
        None => server.await,
    }
}
