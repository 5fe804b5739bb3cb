//! Help command handler

use teloxide::prelude::*;
use teloxide::types::Message;

use crate::utils::errors::Result;

const HELP_TEXT: &str = "✈️ FareBuddy — cheap flight search\n\n\
/start — begin a new flight search\n\
/last — repeat your most recent search\n\
/cancel — abandon the current search\n\
/rates — current exchange rates\n\
/weather <city> — current weather\n\
/donate — support the bot with Stars\n\
/help — this message\n\n\
During a search, use the buttons under my messages. \
You can also type a country, city or price when I ask for one.";

pub async fn handle_help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, HELP_TEXT).await?;
    Ok(())
}
