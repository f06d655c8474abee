//! # Check Chain
//!
//! Runs a command's checks in registration order and stops at the first one
//! that fails. Also provides a few stock checks.

use std::sync::Arc;
use tracing::warn;

use crate::application::command::Check;
use crate::application::context::Context;
use crate::strings::messages;

/// Index of the first failing check, or `Ok` when all pass.
pub async fn evaluate(checks: &[Arc<dyn Check>], ctx: &Context) -> Result<(), usize> {
    for (index, check) in checks.iter().enumerate() {
        if !check.check(ctx).await {
            return Err(index);
        }
    }
    Ok(())
}

/// Rejects invocations outside a guild.
pub fn guild_only() -> impl Check {
    |ctx: Context| async move {
        if ctx.guild_id.is_some() {
            return true;
        }
        if let Err(e) = ctx.reply(messages::GUILD_ONLY).await {
            warn!("Failed to send guild-only notice: {}", e);
        }
        false
    }
}

/// Rejects invocations with fewer than `count` arguments.
pub fn min_args(count: usize) -> impl Check {
    move |ctx: Context| async move {
        if ctx.args.len() >= count {
            return true;
        }
        let usage = messages::too_few_args(&ctx.prefix, &ctx.command.name, count);
        if let Err(e) = ctx.reply(&usage).await {
            warn!("Failed to send usage hint: {}", e);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::bot::testing::{RecordingSession, ready_bot};
    use crate::application::command::Command;
    use crate::domain::model::{Message, User};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn context(session: &Arc<RecordingSession>, guild_id: Option<&str>, args: &[&str]) -> Context {
        let bot = ready_bot(session.clone());
        let command = Arc::new(Command::new("kick", |_ctx: Context| async { anyhow::Ok(()) }));
        let message = Message {
            id: "m1".into(),
            channel_id: "c1".into(),
            guild_id: guild_id.map(str::to_string),
            author: User {
                id: "u1".into(),
                ..Default::default()
            },
            content: "?kick".into(),
            ..Default::default()
        };
        Context::new(
            bot,
            "?",
            command,
            args.iter().map(|a| a.to_string()).collect(),
            Arc::new(message),
        )
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_failure() {
        let session = Arc::new(RecordingSession::default());
        let ctx = context(&session, Some("g1"), &[]);
        let calls = Arc::new(AtomicUsize::new(0));

        let counting = |result: bool| {
            let calls = calls.clone();
            move |_ctx: Context| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    result
                }
            }
        };
        let checks: Vec<Arc<dyn Check>> = vec![
            Arc::new(counting(true)),
            Arc::new(counting(false)),
            Arc::new(counting(true)),
        ];

        assert_eq!(evaluate(&checks, &ctx).await, Err(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_chain_passes() {
        let session = Arc::new(RecordingSession::default());
        let ctx = context(&session, None, &[]);
        assert_eq!(evaluate(&[], &ctx).await, Ok(()));
    }

    #[tokio::test]
    async fn test_guild_only_replies_in_direct_messages() {
        let session = Arc::new(RecordingSession::default());
        let check = guild_only();

        assert!(check.check(&context(&session, Some("g1"), &[])).await);
        assert!(session.texts().is_empty());

        assert!(!check.check(&context(&session, None, &[])).await);
        assert_eq!(session.texts(), vec![("c1".to_string(), messages::GUILD_ONLY.to_string())]);
    }

    #[tokio::test]
    async fn test_min_args_sends_usage_hint() {
        let session = Arc::new(RecordingSession::default());
        let check = min_args(1);

        assert!(check.check(&context(&session, None, &["@someone"])).await);
        assert!(!check.check(&context(&session, None, &[])).await);

        let texts = session.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].1.contains("?kick"));
    }
}
