mod file_config;

pub use file_config::{BotConfig, DownloaderConfig, FileConfig};

use crate::delivery::DEFAULT_MAX_UPLOAD_BYTES;
use crate::download_manager::YtDlpDownloader;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub downloads_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub bot_token: Option<String>,
    pub admin_id: Option<i64>,
    pub downloader_path: Option<PathBuf>,
    pub max_upload_mb: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub db_dir: PathBuf,
    pub downloads_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,

    // Feature configs (with defaults)
    pub bot: BotSettings,
    pub downloader: DownloaderSettings,
}

#[derive(Debug, Clone, Default)]
pub struct BotSettings {
    /// No token means the server runs without the Telegram bot.
    pub token: Option<String>,
    pub admin_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct DownloaderSettings {
    pub executable: PathBuf,
    pub max_upload_bytes: u64,
}

impl Default for DownloaderSettings {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(YtDlpDownloader::DEFAULT_EXECUTABLE),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    ///
    /// Creates the downloads directory if it does not exist yet.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let downloads_dir = file
            .downloads_dir
            .map(PathBuf::from)
            .or_else(|| cli.downloads_dir.clone())
            .unwrap_or_else(|| db_dir.join("downloads"));
        if downloads_dir.exists() && !downloads_dir.is_dir() {
            bail!("downloads_dir is not a directory: {:?}", downloads_dir);
        }
        std::fs::create_dir_all(&downloads_dir).with_context(|| {
            format!("Failed to create downloads directory {:?}", downloads_dir)
        })?;

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let bot_file = file.bot.unwrap_or_default();
        let bot = BotSettings {
            token: bot_file
                .token
                .or_else(|| cli.bot_token.clone())
                .filter(|t| !t.trim().is_empty()),
            admin_id: bot_file.admin_id.or(cli.admin_id),
        };

        let downloader_file = file.downloader.unwrap_or_default();
        let defaults = DownloaderSettings::default();
        let downloader = DownloaderSettings {
            executable: downloader_file
                .path
                .map(PathBuf::from)
                .or_else(|| cli.downloader_path.clone())
                .unwrap_or(defaults.executable),
            max_upload_bytes: downloader_file
                .max_upload_mb
                .or(cli.max_upload_mb)
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(defaults.max_upload_bytes),
        };

        Ok(Self {
            db_dir,
            downloads_dir,
            port,
            logging_level,
            frontend_dir_path,
            bot,
            downloader,
        })
    }

    pub fn recordings_db_path(&self) -> PathBuf {
        self.db_dir.join("zoom_bot.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
