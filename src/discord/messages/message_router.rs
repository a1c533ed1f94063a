// Plain messages: capture-mode text, voice notes and the DM hint.

use crate::core::session::SessionKey;
use crate::discord::flows::{self, BotReply};
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;
use std::io::Write;

const AUDIO_EXTENSIONS: &[&str] = &[".ogg", ".oga", ".opus", ".mp3", ".m4a", ".wav", ".webm"];

/// Handles one incoming message that is not a slash command.
pub async fn handle_message(
    ctx: &serenity::Context,
    message: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    // Ignore bot messages (including our own)
    if message.author.bot {
        return Ok(());
    }

    let key = SessionKey::new(message.channel_id.get(), message.author.id.get());

    if let Some(attachment) = message.attachments.iter().find(|a| is_audio(a)) {
        // A voice note consumes capture mode just like a text entry.
        let capture_mode = data.sessions.take_capture_mode(key);
        if accepts_voice_note(message.guild_id.is_none(), capture_mode) {
            let _ = message.channel_id.broadcast_typing(&ctx.http).await;
            let reply = transcribe_attachment(data, attachment).await;
            send(ctx, message, reply).await?;
            return Ok(());
        }
    }

    let text = message.content.trim();
    if text.is_empty() {
        return Ok(());
    }

    if data.sessions.take_capture_mode(key) {
        let reply = flows::capture(data, text).await;
        send(ctx, message, reply).await?;
        return Ok(());
    }

    // Guild channels are shared; only nudge in direct messages.
    if message.guild_id.is_none() {
        send(
            ctx,
            message,
            BotReply::text("💬 Use /start to open the menu, or /capture to add a task."),
        )
        .await?;
    }

    Ok(())
}

/// Audio in a shared guild channel is only a backlog entry when its author
/// asked for capture mode first.
fn accepts_voice_note(is_direct_message: bool, capture_mode: bool) -> bool {
    is_direct_message || capture_mode
}

fn is_audio(attachment: &serenity::Attachment) -> bool {
    let by_type = attachment
        .content_type
        .as_deref()
        .is_some_and(|t| t.starts_with("audio/"));
    let name = attachment.filename.to_lowercase();
    by_type || AUDIO_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Downloads the attachment to a temporary file and runs the voice flow.
async fn transcribe_attachment(data: &Data, attachment: &serenity::Attachment) -> BotReply {
    let bytes = match attachment.download().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, file = %attachment.filename, "Could not download voice note");
            return BotReply::text(format!("⚠️ Could not download the voice message: {}", e));
        }
    };

    let suffix = attachment
        .filename
        .rfind('.')
        .map(|idx| attachment.filename[idx..].to_string())
        .unwrap_or_else(|| ".ogg".to_string());

    // The file is removed when `file` goes out of scope.
    let file = match write_temp_file(&bytes, &suffix) {
        Ok(file) => file,
        Err(e) => {
            tracing::error!(error = %e, "Could not store voice note");
            return BotReply::text(format!("⚠️ Could not store the voice message: {}", e));
        }
    };

    flows::voice(data, file.path()).await
}

fn write_temp_file(bytes: &[u8], suffix: &str) -> std::io::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("voice-")
        .suffix(suffix)
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

async fn send(
    ctx: &serenity::Context,
    message: &serenity::Message,
    reply: BotReply,
) -> Result<(), Error> {
    message
        .channel_id
        .send_message(&ctx.http, reply.into_message())
        .await?;
    Ok(())
}
