//! Callback query handlers module
//!
//! Every inline button press lands here: the token is handed to the state
//! machine and the returned action is translated into Telegram calls. The
//! dispatcher itself never interprets tokens beyond the donation shortcut.

use std::sync::Arc;

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatId, MessageId};
use tracing::{debug, error, info, warn};

use crate::catalog::AirportCatalog;
use crate::flights::{ranking, run_alternatives_search, run_search};
use crate::handlers::commands::donate;
use crate::handlers::keyboards;
use crate::services::ServiceFactory;
use crate::state::{Action, Event, Machine, PriceMode, SearchFlow, SearchParameters, SearchState, StateStorage, StepView};
use crate::utils::errors::Result;

const NO_CONVERSATION_TOAST: &str = "This search has expired. Send /start to begin.";
const SEARCH_FAILED_TEXT: &str =
    "😕 Something went wrong while searching. Please try again with /start.";

/// Main callback query dispatcher
pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    services: ServiceFactory,
    state_storage: StateStorage,
    catalog: Arc<AirportCatalog>,
) -> Result<()> {
    let user_id = query.from.id.0 as i64;
    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(user_id));

    let Some(data) = query.data.clone() else {
        bot.answer_callback_query(query.id).await?;
        return Ok(());
    };
    debug!(user_id, data = %data, "Callback received");

    // Donation buttons live outside the search conversation
    if let Some(amount) = data.strip_prefix("donate_").and_then(|v| v.parse::<u32>().ok()) {
        bot.answer_callback_query(query.id).await?;
        return donate::send_invoice(&bot, chat_id, amount).await;
    }

    let Some(mut params) = state_storage.load(user_id).await? else {
        bot.answer_callback_query(query.id)
            .text(NO_CONVERSATION_TOAST)
            .await?;
        return Ok(());
    };

    let machine = Machine::new(&catalog, Utc::now().date_naive());
    let action = match machine.apply(&mut params, Event::Callback(&data)) {
        Ok(action) => action,
        Err(e) => {
            // Lost upstream fields or render failure: terminate cleanly
            error!(user_id, error = %e, "Conversation failed on callback");
            bot.answer_callback_query(query.id).await?;
            bot.send_message(chat_id, SEARCH_FAILED_TEXT).await?;
            state_storage.delete(user_id).await?;
            return Ok(());
        }
    };

    match action {
        Action::Toast(text) => {
            bot.answer_callback_query(query.id).text(text).await?;
        }
        Action::Render(view) => {
            bot.answer_callback_query(query.id).await?;
            show_step(&bot, chat_id, &mut params, &view, true).await?;
            state_storage.save(&params).await?;
        }
        Action::ExecuteSearch { include_alternatives } => {
            bot.answer_callback_query(query.id).await?;
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
        Action::EndConversation(text) => {
            bot.answer_callback_query(query.id).await?;
            bot.send_message(chat_id, text).await?;
            state_storage.delete(user_id).await?;
            info!(user_id, "Conversation ended");
        }
    }

    Ok(())
}

/// Show a step: edit the tracked prompt in place for button-driven
/// transitions, send a fresh message otherwise
pub(crate) async fn show_step(
    bot: &Bot,
    chat_id: ChatId,
    params: &mut SearchParameters,
    view: &StepView,
    prefer_edit: bool,
) -> Result<()> {
    let markup = (!view.keyboard.is_empty()).then(|| keyboards::to_markup(view));

    if prefer_edit {
        if let Some(message_id) = params.prompt_message_id {
            let mut edit = bot.edit_message_text(chat_id, MessageId(message_id), &view.text);
            if let Some(markup) = markup.clone() {
                edit = edit.reply_markup(markup);
            }
            match edit.await {
                Ok(_) => return Ok(()),
                // Identical content or an evicted message; fall through to send
                Err(e) => debug!(chat_id = chat_id.0, error = %e, "Prompt edit failed"),
            }
        }
    }

    let mut send = bot.send_message(chat_id, &view.text);
    if let Some(markup) = markup {
        send = send.reply_markup(markup);
    }
    let sent = send.await?;
    params.prompt_message_id = Some(sent.id.0);
    Ok(())
}

/// Run the gateway search and walk the machine past it
pub(crate) async fn execute_search(
    bot: &Bot,
    chat_id: ChatId,
    services: &ServiceFactory,
    state_storage: &StateStorage,
    catalog: &AirportCatalog,
    params: &mut SearchParameters,
    include_alternatives: bool,
) -> Result<()> {
    let today = Utc::now().date_naive();
    let config = &services.settings.flights;

    if let Err(e) = services.history_service.record(params).await {
        warn!(user_id = params.user_id, error = %e, "Failed to snapshot search");
    }

    bot.send_message(chat_id, "🔎 Searching…").await?;
    let result = if include_alternatives {
        run_alternatives_search(&services.fare_client, catalog, params, config, today).await
    } else {
        run_search(&services.fare_client, params, config, today).await
    };

    let offers = match result {
        Ok(offers) => offers,
        Err(e) => {
            error!(user_id = params.user_id, error = %e, "Search failed");
            bot.send_message(chat_id, SEARCH_FAILED_TEXT).await?;
            state_storage.delete(params.user_id).await?;
            return Ok(());
        }
    };

    let found_any = !offers.is_empty();
    crate::utils::logging::log_search_executed(
        params.user_id,
        params.flow.name(),
        params.departure_iata.as_deref(),
        ranking::total_offers(&offers),
    );
    if found_any {
        let text = if params.flow == SearchFlow::Top3 {
            keyboards::format_top3(&ranking::top_destinations(&offers, 3))
        } else {
            let filtered = match params.price_mode {
                Some(PriceMode::CheapestOnly) => ranking::cheapest_only(offers),
                _ => offers,
            };
            if filtered.is_empty() {
                "I found flights, but none with a usable price.".to_string()
            } else {
                let (capped, truncated) =
                    ranking::cap_cheapest(filtered, config.max_rendered_offers);
                keyboards::format_results(&capped, truncated)
            }
        };
        bot.send_message(chat_id, text).await?;
    }

    let machine = Machine::new(catalog, today);
    let action = machine.after_search(params, found_any)?;

    // The alternatives offer explains the empty result itself
    if !found_any && params.state == SearchState::ShowingOutcome {
        bot.send_message(chat_id, "😕 No flights found for your search.").await?;
    }

    if let Action::Render(view) = action {
        show_step(bot, chat_id, params, &view, false).await?;
    }
    state_storage.save(params).await?;
    Ok(())
}
