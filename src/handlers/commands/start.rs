//! Conversation lifecycle commands
//!
//! /start opens the main menu, /cancel drops the conversation, /last
//! re-executes the most recent saved search.

use std::sync::Arc;

use chrono::{Duration, Utc};
use teloxide::prelude::*;
use teloxide::types::Message;
use tracing::info;

use crate::catalog::AirportCatalog;
use crate::handlers::callbacks::{execute_search, show_step};
use crate::services::ServiceFactory;
use crate::state::{render, SearchParameters, StateStorage};
use crate::utils::errors::{FareBuddyError, Result};

/// Handle /start: register the user and show the search menu
pub async fn handle_start(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    state_storage: StateStorage,
) -> Result<()> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| FareBuddyError::InvalidInput("No user in message".to_string()))?;
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    if !chat_id.is_user() {
        bot.send_message(chat_id, "I only work in private chats.").await?;
        return Ok(());
    }

    services
        .user_service
        .register_or_get_user(
            user_id,
            user.username.clone(),
            Some(user.first_name.clone()),
            user.last_name.clone(),
        )
        .await?;
    crate::utils::logging::log_user_action(user_id, "start", None);

    let mut params = SearchParameters::new(user_id);
    let view = render::render_main_menu();
    show_step(&bot, chat_id, &mut params, &view, false).await?;
    state_storage.save(&params).await?;
    Ok(())
}

/// Handle /cancel: drop the conversation cooperatively
pub async fn handle_cancel(bot: Bot, msg: Message, state_storage: StateStorage) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    state_storage.delete(user_id).await?;
    bot.send_message(msg.chat.id, "Search cancelled. Send /start to begin again.")
        .await?;
    info!(user_id, "Conversation cancelled");
    Ok(())
}

/// Handle /last: replay the most recent saved search
pub async fn handle_last(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    state_storage: StateStorage,
    catalog: Arc<AirportCatalog>,
) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    let Some(mut params) = services.history_service.load_latest(user_id).await? else {
        bot.send_message(chat_id, "You have no saved searches yet.").await?;
        return Ok(());
    };

    // Fresh conversation bookkeeping around the saved selections
    params.user_id = user_id;
    params.prompt_message_id = None;
    params.already_searched_alternatives = false;
    params.expires_at = Some(Utc::now() + Duration::hours(24));
    params.touch();

    bot.send_message(chat_id, "Repeating your last search…").await?;
    execute_search(
        &bot,
        chat_id,
        &services,
        &state_storage,
        &catalog,
        &mut params,
        false,
    )
    .await
}
