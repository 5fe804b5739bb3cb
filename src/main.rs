//! FareBuddy Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Update;
use teloxide::utils::command::BotCommands as TeloxideBotCommands;
use tracing::{error, info, warn};

use FareBuddy::{
    catalog::AirportCatalog,
    config::Settings,
    database::{connection, DatabaseService},
    handlers::{
        callbacks::handle_callback_query,
        commands::{admin, donate, help, info as info_cmd, start},
        messages::handle_message,
    },
    services::ServiceFactory,
    state::StateStorage,
    utils::logging,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting FareBuddy Telegram Bot...");

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = connection::create_pool(&settings.database).await?;
    connection::run_migrations(&db_pool).await?;
    let database_service = DatabaseService::new(db_pool);

    // Initialize Redis-backed conversation storage
    info!("Connecting to Redis...");
    let state_storage = StateStorage::new(settings.redis.clone()).await?;
    state_storage.test_connection().await?;

    // Load the embedded airport catalog
    let catalog = AirportCatalog::load()?;

    // Initialize bot and services
    let bot = Bot::new(&settings.bot.token);
    let redis_client = redis::Client::open(settings.redis.url.clone())?;
    let services = ServiceFactory::new(settings, database_service, redis_client)?;

    info!("Setting up bot handlers...");
    let mut dispatcher = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![
            Arc::new(services),
            Arc::new(state_storage),
            Arc::new(catalog)
        ])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    info!("FareBuddy bot is ready, starting polling...");
    dispatcher.dispatch().await;

    info!("FareBuddy bot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<BotCommands>()
                        .endpoint(handle_commands),
                )
                .branch(
                    dptree::filter(|msg: Message| msg.successful_payment().is_some())
                        .endpoint(handle_payments),
                )
                .branch(dptree::endpoint(handle_messages)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callbacks))
        .branch(Update::filter_pre_checkout_query().endpoint(handle_pre_checkouts))
}

#[derive(TeloxideBotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "FareBuddy commands")]
enum BotCommands {
    #[command(description = "Start a flight search")]
    Start,
    #[command(description = "Show help information")]
    Help,
    #[command(description = "Cancel the current search")]
    Cancel,
    #[command(description = "Repeat your last search")]
    Last,
    #[command(description = "Show currency exchange rates")]
    Rates,
    #[command(description = "Show the weather in a city")]
    Weather(String),
    #[command(description = "Support the bot with Stars")]
    Donate,
    #[command(description = "Show usage statistics (admin only)")]
    Stats,
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: BotCommands,
    services: Arc<ServiceFactory>,
    state_storage: Arc<StateStorage>,
    catalog: Arc<AirportCatalog>,
) -> HandlerResult {
    let services = (*services).clone();
    let state_storage = (*state_storage).clone();

    let result = match cmd {
        BotCommands::Start => start::handle_start(bot, msg, services, state_storage).await,
        BotCommands::Help => help::handle_help(bot, msg).await,
        BotCommands::Cancel => start::handle_cancel(bot, msg, state_storage).await,
        BotCommands::Last => {
            start::handle_last(bot, msg, services, state_storage, catalog).await
        }
        BotCommands::Rates => info_cmd::handle_rates(bot, msg, services).await,
        BotCommands::Weather(city) => info_cmd::handle_weather(bot, msg, city, services).await,
        BotCommands::Donate => donate::handle_donate(bot, msg, services).await,
        BotCommands::Stats => admin::handle_stats(bot, msg, services).await,
    };

    if let Err(e) = result {
        error!(error = %e, "Error handling command");
        return Err(e.into());
    }
    Ok(())
}

/// Handle regular messages
async fn handle_messages(
    bot: Bot,
    msg: Message,
    services: Arc<ServiceFactory>,
    state_storage: Arc<StateStorage>,
    catalog: Arc<AirportCatalog>,
) -> HandlerResult {
    let services = (*services).clone();
    let state_storage = (*state_storage).clone();

    if let Err(e) = handle_message(bot, msg, services, state_storage, catalog).await {
        error!(error = %e, "Error handling message");
        return Err(e.into());
    }
    Ok(())
}

/// Handle callback queries
async fn handle_callbacks(
    bot: Bot,
    query: teloxide::types::CallbackQuery,
    services: Arc<ServiceFactory>,
    state_storage: Arc<StateStorage>,
    catalog: Arc<AirportCatalog>,
) -> HandlerResult {
    let services = (*services).clone();
    let state_storage = (*state_storage).clone();

    if let Err(e) = handle_callback_query(bot, query, services, state_storage, catalog).await {
        error!(error = %e, "Error handling callback query");
        return Err(e.into());
    }
    Ok(())
}

/// Handle successful Stars payments
async fn handle_payments(bot: Bot, msg: Message) -> HandlerResult {
    if let Err(e) = donate::handle_successful_payment(bot, msg).await {
        error!(error = %e, "Error handling payment");
        return Err(e.into());
    }
    Ok(())
}

/// Handle pre-checkout queries
async fn handle_pre_checkouts(
    bot: Bot,
    query: teloxide::types::PreCheckoutQuery,
) -> HandlerResult {
    if let Err(e) = donate::handle_pre_checkout(bot, query).await {
        error!(error = %e, "Error handling pre-checkout query");
        return Err(e.into());
    }
    Ok(())
}
