//! Telegram bot: update dispatching and command routing.
//!
//! Commands are answered here; any other text is treated as a possible
//! recording submission and handed to the ingestion service.

mod commands;
mod transport;

pub use commands::Command;
pub use transport::TelegramTransport;

use crate::access::AccessGate;
use crate::catalogue::CatalogueChat;
use crate::delivery::{ChatTransport, TextFormat};
use crate::ingestion::{InboundMessage, IngestionService, SubmissionOutcome};
use commands::*;
use std::sync::Arc;
use teloxide::dispatching::{HandlerExt, UpdateFilterExt};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use tracing::{debug, info, warn};

/// Everything the update handlers need.
pub struct BotServices {
    pub gate: Arc<AccessGate>,
    pub ingestion: Arc<IngestionService>,
    pub catalogue: Arc<CatalogueChat>,
    pub transport: Arc<dyn ChatTransport>,
}

/// Sender of an update, when Telegram reports one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: i64,
    pub username: Option<String>,
}

/// Long-polls Telegram until interrupted.
pub async fn run_bot(bot: Bot, services: Arc<BotServices>) {
    let handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(command_endpoint),
        )
        .branch(dptree::endpoint(message_endpoint));

    info!("Starting Telegram dispatcher");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![services])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in Telegram update handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    warn!("Telegram dispatcher stopped");
}

fn sender_of(msg: &Message) -> Option<Sender> {
    msg.from.as_ref().map(|user| Sender {
        id: user.id.0 as i64,
        username: user.username.clone(),
    })
}

async fn command_endpoint(
    msg: Message,
    cmd: Command,
    services: Arc<BotServices>,
) -> ResponseResult<()> {
    handle_command(&services, sender_of(&msg), msg.chat.id.0, cmd).await;
    Ok(())
}

async fn message_endpoint(msg: Message, services: Arc<BotServices>) -> ResponseResult<()> {
    if let (Some(sender), Some(text)) = (sender_of(&msg), msg.text()) {
        handle_text(&services, sender.id, msg.chat.id.0, text).await;
    }
    Ok(())
}

pub async fn handle_command(
    services: &BotServices,
    sender: Option<Sender>,
    channel: i64,
    cmd: Command,
) {
    debug!("Command {:?} in {}", cmd, channel);
    match cmd {
        Command::Start => {
            if let Some(sender) = &sender {
                if let Err(e) = services.gate.register(sender.id, sender.username.as_deref()) {
                    warn!("Failed to register {}: {}", sender.id, e);
                }
            }
            reply(services, channel, WELCOME_MESSAGE, TextFormat::Html).await;
        }
        Command::Help => reply(services, channel, HELP_MESSAGE, TextFormat::Html).await,
        Command::Search(query) => {
            if query.trim().is_empty() {
                reply(services, channel, EMPTY_QUERY_MESSAGE, TextFormat::Plain).await;
            } else {
                services.catalogue.search_for_channel(channel, &query).await;
            }
        }
        Command::List => services.catalogue.recent_for_channel(channel).await,
        Command::AddUploader(arg) => {
            let is_admin = sender
                .as_ref()
                .map(|s| services.gate.is_admin(s.id))
                .unwrap_or(false);
            if !is_admin {
                reply(services, channel, UNAUTHORIZED_MESSAGE, TextFormat::Plain).await;
                return;
            }
            let Some(target) = parse_principal_id(&arg) else {
                reply(services, channel, ADD_UPLOADER_USAGE, TextFormat::Plain).await;
                return;
            };
            let text = match services.gate.grant(target) {
                Ok(()) => format!("✅ User {} can now upload recordings", target),
                Err(e) => {
                    warn!("Failed to grant upload to {}: {}", target, e);
                    format!("❌ Could not authorize user {}", target)
                }
            };
            reply(services, channel, &text, TextFormat::Plain).await;
        }
    }
}

/// Non-command text. Anything starting with `/` is an unknown command and
/// is ignored.
pub async fn handle_text(
    services: &BotServices,
    sender_id: i64,
    channel: i64,
    text: &str,
) -> Option<SubmissionOutcome> {
    if text.starts_with('/') {
        return None;
    }
    let outcome = services
        .ingestion
        .submit(InboundMessage {
            sender_id,
            channel,
            text: text.to_string(),
        })
        .await;
    Some(outcome)
}

async fn reply(services: &BotServices, channel: i64, text: &str, format: TextFormat) {
    if let Err(e) = services.transport.send_text(channel, text, format).await {
        warn!("Failed to reply in {}: {}", channel, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::CatalogueQuery;
    use crate::delivery::testing::FakeTransport;
    use crate::delivery::DeliveryService;
    use crate::download_manager::{DownloadOrchestrator, YtDlpDownloader};
    use crate::ingestion::IgnoreReason;
    use crate::recording::{RecordingStore, SqliteRecordingStore};

    const ADMIN: i64 = 100;
    const USER: i64 = 200;
    const CHANNEL: i64 = 300;

    struct Fixture {
        store: Arc<SqliteRecordingStore>,
        transport: Arc<FakeTransport>,
        services: BotServices,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(SqliteRecordingStore::in_memory().unwrap());
        let transport = Arc::new(FakeTransport::default());
        let gate = Arc::new(AccessGate::new(store.clone(), Some(ADMIN)));
        let delivery = Arc::new(DeliveryService::new(store.clone(), transport.clone(), 1024));
        let orchestrator = Arc::new(DownloadOrchestrator::new(
            store.clone(),
            Arc::new(YtDlpDownloader::new("/nonexistent/yt-dlp")),
            delivery.clone(),
            std::env::temp_dir(),
        ));
        let ingestion = Arc::new(IngestionService::new(
            gate.clone(),
            store.clone(),
            orchestrator,
            transport.clone(),
        ));
        let catalogue = Arc::new(CatalogueChat::new(
            Arc::new(CatalogueQuery::new(store.clone())),
            delivery,
        ));
        Fixture {
            store,
            transport: transport.clone(),
            services: BotServices {
                gate,
                ingestion,
                catalogue,
                transport,
            },
        }
    }

    fn sender(id: i64) -> Option<Sender> {
        Some(Sender {
            id,
            username: Some(format!("user{}", id)),
        })
    }

    #[tokio::test]
    async fn test_start_registers_without_permission() {
        let f = fixture();
        handle_command(&f.services, sender(USER), CHANNEL, Command::Start).await;

        let principal = f.store.get_principal(USER).unwrap().unwrap();
        assert_eq!(principal.username.as_deref(), Some("user200"));
        assert!(!principal.can_upload);
        assert_eq!(f.transport.texts(), vec![WELCOME_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_add_uploader_requires_admin() {
        let f = fixture();
        handle_command(
            &f.services,
            sender(USER),
            CHANNEL,
            Command::AddUploader(USER.to_string()),
        )
        .await;

        assert_eq!(f.transport.texts(), vec![UNAUTHORIZED_MESSAGE.to_string()]);
        assert!(f.store.get_principal(USER).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_uploader_grants_permission() {
        let f = fixture();
        assert!(!f.services.gate.is_authorized(USER).unwrap());

        handle_command(
            &f.services,
            sender(ADMIN),
            CHANNEL,
            Command::AddUploader("200".to_string()),
        )
        .await;

        assert_eq!(
            f.transport.texts(),
            vec!["✅ User 200 can now upload recordings".to_string()]
        );
        assert!(f.services.gate.is_authorized(USER).unwrap());
    }

    #[tokio::test]
    async fn test_add_uploader_rejects_bad_id() {
        let f = fixture();
        handle_command(
            &f.services,
            sender(ADMIN),
            CHANNEL,
            Command::AddUploader("bob".to_string()),
        )
        .await;

        assert_eq!(f.transport.texts(), vec![ADD_UPLOADER_USAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_empty_search_asks_for_query() {
        let f = fixture();
        handle_command(&f.services, sender(USER), CHANNEL, Command::Search(" ".to_string()))
            .await;

        assert_eq!(f.transport.texts(), vec![EMPTY_QUERY_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_commands_are_not_submissions() {
        let f = fixture();
        let outcome = handle_text(&f.services, USER, CHANNEL, "/delete 3").await;
        assert!(outcome.is_none());
        assert!(f.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_text_goes_through_ingestion() {
        let f = fixture();
        let outcome = handle_text(&f.services, USER, CHANNEL, "hello").await;
        assert!(matches!(
            outcome,
            Some(SubmissionOutcome::Ignored(IgnoreReason::NotAuthorized))
        ));
    }
}
