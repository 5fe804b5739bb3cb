//! Admin command handlers

use teloxide::prelude::*;
use teloxide::types::Message;

use crate::handlers::keyboards;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// Handle /stats: usage numbers, admins only
pub async fn handle_stats(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    if !services.is_admin(user_id) {
        bot.send_message(msg.chat.id, "This command is for admins only.").await?;
        return Ok(());
    }

    let stats = services.database.usage_stats().await?;
    crate::utils::logging::log_admin_action(user_id, "stats");
    bot.send_message(msg.chat.id, keyboards::format_stats(&stats)).await?;
    Ok(())
}
