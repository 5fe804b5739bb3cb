//! Telegram Stars donation handlers
//!
//! /donate shows the configured amounts as buttons; pressing one sends a
//! Stars invoice (currency XTR, no provider token). Pre-checkout is always
//! approved and a successful payment gets a thank-you.

use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, LabeledPrice, Message, PreCheckoutQuery,
};
use tracing::info;

use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// Handle /donate: offer the configured Stars amounts
pub async fn handle_donate(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let config = &services.settings.donations;
    if !config.enabled || config.amounts.is_empty() {
        bot.send_message(msg.chat.id, "Donations are currently disabled.").await?;
        return Ok(());
    }

    let row = config
        .amounts
        .iter()
        .map(|amount| {
            InlineKeyboardButton::callback(format!("⭐ {amount}"), format!("donate_{amount}"))
        })
        .collect::<Vec<_>>();

    bot.send_message(
        msg.chat.id,
        "Thank you for supporting FareBuddy! Pick an amount:",
    )
    .reply_markup(InlineKeyboardMarkup::new(vec![row]))
    .await?;
    Ok(())
}

/// Send one Stars invoice for the chosen amount
pub async fn send_invoice(bot: &Bot, chat_id: ChatId, amount: u32) -> Result<()> {
    bot.send_invoice(
        chat_id,
        "Support FareBuddy",
        "A voluntary donation that keeps the search running.",
        format!("donate-{amount}"),
        "XTR",
        vec![LabeledPrice {
            label: format!("{amount} Stars"),
            amount,
        }],
    )
    .await?;
    Ok(())
}

/// Approve every pre-checkout query
pub async fn handle_pre_checkout(bot: Bot, query: PreCheckoutQuery) -> Result<()> {
    bot.answer_pre_checkout_query(query.id, true).await?;
    Ok(())
}

/// Thank the user after a completed payment
pub async fn handle_successful_payment(bot: Bot, msg: Message) -> Result<()> {
    if let Some(payment) = msg.successful_payment() {
        info!(
            chat_id = msg.chat.id.0,
            amount = payment.total_amount,
            currency = %payment.currency,
            "Donation received"
        );
    }
    bot.send_message(msg.chat.id, "💛 Thank you for your support!").await?;
    Ok(())
}
