//! Message handlers module
//!
//! Free-text input only matters inside a conversation: typed country and
//! city names, and the custom maximum price. Text-driven transitions always
//! produce a fresh prompt message instead of editing the old one.

use std::sync::Arc;

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::Message;
use tracing::{debug, error};

use crate::catalog::AirportCatalog;
use crate::handlers::callbacks::{execute_search, show_step};
use crate::services::ServiceFactory;
use crate::state::{Action, Event, Machine, StateStorage};
use crate::utils::errors::Result;

const NO_CONVERSATION_HINT: &str = "Send /start to begin a flight search.";

/// Handle a regular (non-command) message
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    state_storage: StateStorage,
    catalog: Arc<AirportCatalog>,
) -> Result<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;
    debug!(user_id, "Text message in private chat");

    let Some(mut params) = state_storage.load(user_id).await? else {
        bot.send_message(chat_id, NO_CONVERSATION_HINT).await?;
        return Ok(());
    };

    let machine = Machine::new(&catalog, Utc::now().date_naive());
    let action = match machine.apply(&mut params, Event::Text(text)) {
        Ok(action) => action,
        Err(e) => {
            error!(user_id, error = %e, "Conversation failed on text input");
            bot.send_message(
                chat_id,
                "😕 Something went wrong. Please start over with /start.",
            )
            .await?;
            state_storage.delete(user_id).await?;
            return Ok(());
        }
    };

    match action {
        Action::Render(view) => {
            show_step(&bot, chat_id, &mut params, &view, false).await?;
            state_storage.save(&params).await?;
        }
        Action::ExecuteSearch { include_alternatives } => {
            execute_search(
                &bot,
                chat_id,
                &services,
                &state_storage,
                &catalog,
                &mut params,
                include_alternatives,
            )
            .await?;
        }
        Action::Toast(toast) => {
            bot.send_message(chat_id, toast).await?;
        }
        Action::EndConversation(text) => {
            bot.send_message(chat_id, text).await?;
            state_storage.delete(user_id).await?;
        }
    }

    Ok(())
}
