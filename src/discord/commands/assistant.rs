// Slash commands for the assistant.
//
// **Notice the pattern:**
// 1. Extract the session key from Discord types
// 2. Run the shared flow
// 3. Send the reply
//
// This layer is THIN - the flows do the work so buttons and commands
// answer the same way.

use crate::core::ai::AdviceService;
use crate::core::backlog::BacklogService;
use crate::core::calendar::{CalendarService, EventWindow};
use crate::core::config::Settings;
use crate::core::session::{SessionKey, SessionStore};
use crate::core::speech::SpeechService;
use crate::discord::flows;
use crate::infra::google::{GoogleCalendarClient, GoogleSheetsClient};
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub settings: Arc<Settings>,
    pub backlog: Arc<BacklogService<GoogleSheetsClient>>,
    pub calendar: Arc<CalendarService<GoogleCalendarClient>>,
    pub advice: Arc<AdviceService>,
    pub speech: Arc<SpeechService>,
    pub sessions: Arc<SessionStore>,
}

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum Period {
    #[name = "Day"]
    Day,
    #[name = "Week"]
    Week,
    #[name = "Month"]
    Month,
}

impl From<Period> for EventWindow {
    fn from(period: Period) -> Self {
        match period {
            Period::Day => EventWindow::Day,
            Period::Week => EventWindow::Week,
            Period::Month => EventWindow::Month,
        }
    }
}

fn session_key(ctx: &Context<'_>) -> SessionKey {
    SessionKey::new(ctx.channel_id().get(), ctx.author().id.get())
}

/// Open the assistant menu.
#[poise::command(slash_command)]
pub async fn start(ctx: Context<'_>) -> Result<(), Error> {
    ctx.send(flows::menu().into_poise()).await?;
    Ok(())
}

/// Analyze the latest KPI row.
#[poise::command(slash_command)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let reply = flows::status(ctx.data(), session_key(&ctx)).await;
    ctx.send(reply.into_poise()).await?;
    Ok(())
}

/// Rank active tasks and suggest what to do next.
#[poise::command(slash_command)]
pub async fn focus(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let reply = flows::focus(ctx.data(), session_key(&ctx)).await;
    ctx.send(reply.into_poise()).await?;
    Ok(())
}

/// List upcoming calendar events.
#[poise::command(slash_command)]
pub async fn events(
    ctx: Context<'_>,
    #[description = "How far ahead to look"] period: Period,
) -> Result<(), Error> {
    ctx.defer().await?;
    let reply = flows::events(ctx.data(), period.into()).await;
    ctx.send(reply.into_poise()).await?;
    Ok(())
}

/// Add a task to the backlog (or switch on capture mode).
#[poise::command(slash_command)]
pub async fn capture(
    ctx: Context<'_>,
    #[description = "Task text, e.g. \"order lemons #bar tomorrow\""] text: Option<String>,
) -> Result<(), Error> {
    let reply = match text.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => {
            ctx.defer().await?;
            flows::capture(ctx.data(), text).await
        }
        _ => flows::start_capture(ctx.data(), session_key(&ctx)),
    };
    ctx.send(reply.into_poise()).await?;
    Ok(())
}
