//! Rates and weather command handlers

use teloxide::prelude::*;
use teloxide::types::Message;
use tracing::warn;

use crate::handlers::keyboards;
use crate::services::ServiceFactory;
use crate::utils::errors::{FareBuddyError, Result};

/// Handle /rates: cached currency rates
pub async fn handle_rates(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    match services.rates_service.get_rates().await {
        Ok(snapshot) => {
            bot.send_message(msg.chat.id, keyboards::format_rates(&snapshot)).await?;
        }
        Err(e) => {
            warn!(error = %e, "Rates lookup failed");
            bot.send_message(msg.chat.id, "💱 Rates are unavailable right now, try again later.")
                .await?;
        }
    }
    Ok(())
}

/// Handle /weather <city>
pub async fn handle_weather(
    bot: Bot,
    msg: Message,
    city: String,
    services: ServiceFactory,
) -> Result<()> {
    match services.weather_service.lookup(&city).await {
        Ok(report) => {
            bot.send_message(msg.chat.id, keyboards::format_weather(&report)).await?;
        }
        Err(FareBuddyError::InvalidInput(text)) => {
            bot.send_message(msg.chat.id, text).await?;
        }
        Err(e) => {
            warn!(error = %e, "Weather lookup failed");
            bot.send_message(msg.chat.id, "🌧 Weather is unavailable right now, try again later.")
                .await?;
        }
    }
    Ok(())
}
