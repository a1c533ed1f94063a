// This is the entry point of the assistant bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (Google APIs, AI and speech providers)
// - `discord/` = Discord-specific adapters (commands, buttons, messages)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::ai::{AdviceService, AiProvider, AiService};
use crate::core::backlog::BacklogService;
use crate::core::calendar::CalendarService;
use crate::core::config::Settings;
use crate::core::session::SessionStore;
use crate::core::speech::{SpeechProvider, SpeechService};
use crate::discord::interactions::handle_component;
use crate::discord::messages::handle_message;
use crate::discord::{Data, Error};
use crate::infra::ai::{OpenAiClient, OpenRouterClient};
use crate::infra::google::{GoogleCalendarClient, GoogleSheetsClient};
use crate::infra::speech::{OpenAiTranscriber, YandexSpeechClient};
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Event handler for non-command Discord events.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) = handle_message(ctx, new_message, data).await {
                tracing::error!(error = %e, channel_id = new_message.channel_id.get(), "Error handling message");
            }
        }
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(component),
        } => {
            if let Err(e) = handle_component(ctx, component, data).await {
                tracing::error!(error = %e, custom_id = %component.data.custom_id, "Error handling button");
            }
        }
        _ => {}
    }

    Ok(())
}

/// Top-level handler for anything a command returns as an error.
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(command = %ctx.command().name, error = %error, "Command failed");
            let _ = ctx
                .say("⚠️ Something went wrong on my side. Please try again in a minute.")
                .await;
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!(error = %e, "Error while handling error");
            }
        }
    }
}

/// Ordered advice providers: OpenAI first, then OpenRouter.
fn ai_providers(settings: &Settings) -> Vec<Box<dyn AiProvider>> {
    let mut providers: Vec<Box<dyn AiProvider>> = Vec::new();
    if let Some(key) = &settings.openai_api_key {
        providers.push(Box::new(OpenAiClient::new(
            key.clone(),
            settings.openai_model.clone(),
        )));
    }
    if let Some(key) = &settings.openrouter_api_key {
        providers.push(Box::new(OpenRouterClient::new(
            key.clone(),
            settings.openrouter_model.clone(),
        )));
    }
    providers
}

/// Ordered speech providers: Yandex SpeechKit first, then OpenAI.
fn speech_providers(settings: &Settings) -> Vec<Box<dyn SpeechProvider>> {
    let mut providers: Vec<Box<dyn SpeechProvider>> = Vec::new();
    if let (Some(key), Some(folder)) = (&settings.yandex_api_key, &settings.yandex_folder_id) {
        providers.push(Box::new(YandexSpeechClient::new(
            key.clone(),
            folder.clone(),
            settings.yandex_language.clone(),
        )));
    }
    if let Some(key) = &settings.openai_api_key {
        providers.push(Box::new(OpenAiTranscriber::new(key.clone())));
    }
    providers
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let settings = Settings::from_env();
    let token = settings
        .discord_token
        .clone()
        .context("Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.")?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let sheets = GoogleSheetsClient::new(
        settings.sheet_id.clone(),
        settings.credential_source.clone(),
    );
    let backlog = Arc::new(BacklogService::new(
        sheets,
        settings.worksheets.clone(),
        settings.timezone,
    ));

    let calendar_client = GoogleCalendarClient::new(
        settings.calendar_id.clone(),
        settings.credential_source.clone(),
    );
    let calendar = Arc::new(CalendarService::new(calendar_client, settings.timezone));

    let ai_providers = ai_providers(&settings);
    let speech_providers = speech_providers(&settings);
    tracing::info!(
        ai_providers = ?ai_providers.iter().map(|p| p.name().to_string()).collect::<Vec<_>>(),
        speech_providers = ?speech_providers.iter().map(|p| p.name().to_string()).collect::<Vec<_>>(),
        timezone = %settings.timezone,
        "Providers configured"
    );
    let advice = Arc::new(AdviceService::new(AiService::new(ai_providers)));
    let speech = Arc::new(SpeechService::new(speech_providers));

    if let Some(base_url) = &settings.base_url {
        // Discord delivers events over the gateway, so no webhook is served.
        tracing::info!(base_url = %base_url, port = settings.port, "BASE_URL/PORT are set but not used by the gateway client");
    }

    // Create the data structure that will be shared across all commands
    let data = Data {
        settings: Arc::new(settings),
        backlog,
        calendar,
        advice,
        speech,
        sessions: Arc::new(SessionStore::new()),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILDS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            // Register all our commands here
            commands: vec![
                discord::commands::assistant::start(),
                discord::commands::assistant::status(),
                discord::commands::assistant::focus(),
                discord::commands::assistant::events(),
                discord::commands::assistant::capture(),
                discord::commands::help::help(),
            ],
            // Event handler for messages and button clicks
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!(user = %ready.user.name, "Bot is starting up");

                // Register slash commands globally (can take up to an hour to propagate)
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                tracing::info!("Commands registered, bot is ready");
                Ok(data)
            })
        })
        .build();

    // Create the client and start the bot
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}
