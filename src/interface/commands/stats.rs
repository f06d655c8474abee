//! # Stats
//!
//! Reports the state mirror's event counter and store size.

use anyhow::Result;

use crate::application::command::{Command, DEFAULT_CATEGORY};
use crate::application::context::Context;
use crate::domain::types::Embed;
use crate::strings::messages;

pub async fn handle_stats(ctx: Context) -> Result<()> {
    let Some(state) = ctx.state() else {
        ctx.reply(messages::STATE_DISABLED).await?;
        return Ok(());
    };

    let events = state.events().await?;
    let size = state.size().await?;
    let embed = Embed::new()
        .title(messages::STATS_TITLE)
        .field(messages::STATS_EVENTS_FIELD, events, true)
        .field(messages::STATS_SIZE_FIELD, size, true);
    ctx.reply_embed(&embed).await?;
    Ok(())
}

pub fn command() -> Command {
    Command::new("stats", handle_stats)
        .description("Shows how much the bot has seen")
        .category(DEFAULT_CATEGORY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::bot::testing::{
        RecordingSession, message_from, ready_bot, ready_bot_with_state,
    };
    use crate::application::mirror::StateMirror;
    use crate::domain::events::GatewayEvent;
    use crate::infrastructure::kv::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_stats_without_state() {
        let session = Arc::new(RecordingSession::default());
        let bot = ready_bot(session.clone());
        bot.register_command(command());

        bot.handle_message(Arc::new(message_from("42", "?stats")))
            .await
            .unwrap();

        assert_eq!(
            session.texts(),
            vec![("c1".to_string(), messages::STATE_DISABLED.to_string())]
        );
    }

    #[tokio::test]
    async fn test_stats_reports_counter_and_size() {
        let session = Arc::new(RecordingSession::default());
        let mirror = Arc::new(StateMirror::new(Arc::new(MemoryStore::new())));
        for _ in 0..2 {
            mirror
                .on_event(&GatewayEvent::Generic {
                    name: "TYPING_START".into(),
                })
                .await;
        }
        let bot = ready_bot_with_state(session.clone(), mirror);
        bot.register_command(command());

        bot.handle_message(Arc::new(message_from("42", "?stats")))
            .await
            .unwrap();

        let embeds = session.embeds();
        assert_eq!(embeds.len(), 1);
        let embed = &embeds[0].1;
        assert_eq!(embed.title.as_deref(), Some("Bot statistics"));
        assert_eq!(
            embed.get_field("Events processed").map(|f| f.value.as_str()),
            Some("2 events")
        );
        assert_eq!(
            embed.get_field("State cache size").map(|f| f.value.as_str()),
            Some("1 keys")
        );
    }
}
