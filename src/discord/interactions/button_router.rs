// Button clicks (component interactions).
//
// Every button the bot posts carries a custom id that parses back into a
// `MenuAction`. Clicks are deferred right away because the Google and AI
// calls behind most buttons easily take longer than Discord's 3 seconds.

use crate::core::calendar::EventWindow;
use crate::core::focus::COMMIT_DURATIONS;
use crate::core::session::SessionKey;
use crate::discord::flows;
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Status,
    Events(EventWindow),
    Focus,
    Capture,
    ContinueStatus,
    Commit { index: usize, minutes: u32 },
}

impl MenuAction {
    pub fn custom_id(self) -> String {
        match self {
            MenuAction::Status => "menu:status".to_string(),
            MenuAction::Events(EventWindow::Day) => "menu:day".to_string(),
            MenuAction::Events(EventWindow::Week) => "menu:week".to_string(),
            MenuAction::Events(EventWindow::Month) => "menu:month".to_string(),
            MenuAction::Focus => "menu:focus".to_string(),
            MenuAction::Capture => "menu:capture".to_string(),
            MenuAction::ContinueStatus => "more:status".to_string(),
            MenuAction::Commit { index, minutes } => format!("commit:{}:{}", index, minutes),
        }
    }

    pub fn parse(custom_id: &str) -> Option<Self> {
        let action = match custom_id {
            "menu:status" => MenuAction::Status,
            "menu:day" => MenuAction::Events(EventWindow::Day),
            "menu:week" => MenuAction::Events(EventWindow::Week),
            "menu:month" => MenuAction::Events(EventWindow::Month),
            "menu:focus" => MenuAction::Focus,
            "menu:capture" => MenuAction::Capture,
            "more:status" => MenuAction::ContinueStatus,
            other => {
                let rest = other.strip_prefix("commit:")?;
                let (index, minutes) = rest.split_once(':')?;
                let index = index.parse().ok()?;
                let minutes = minutes.parse().ok()?;
                if !COMMIT_DURATIONS.contains(&minutes) {
                    return None;
                }
                MenuAction::Commit { index, minutes }
            }
        };
        Some(action)
    }
}

/// Handles one button click.
pub async fn handle_component(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some(action) = MenuAction::parse(&interaction.data.custom_id) else {
        tracing::debug!(custom_id = %interaction.data.custom_id, "Ignoring unknown button");
        return Ok(());
    };

    // Defer the update to prevent "Unknown interaction" errors if processing takes > 3s
    interaction.defer(&ctx.http).await?;

    let key = SessionKey::new(interaction.channel_id.get(), interaction.user.id.get());
    tracing::info!(?action, user_id = key.user_id, channel_id = key.channel_id, "Button pressed");

    let reply = match action {
        MenuAction::Status => flows::status(data, key).await,
        MenuAction::Events(window) => flows::events(data, window).await,
        MenuAction::Focus => flows::focus(data, key).await,
        MenuAction::Capture => flows::start_capture(data, key),
        MenuAction::ContinueStatus => flows::continue_status(data, key).await,
        MenuAction::Commit { index, minutes } => flows::commit(data, key, index, minutes).await,
    };

    interaction
        .create_followup(&ctx.http, reply.into_followup())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_parse_back() {
        let actions = [
            MenuAction::Status,
            MenuAction::Events(EventWindow::Day),
            MenuAction::Events(EventWindow::Week),
            MenuAction::Events(EventWindow::Month),
            MenuAction::Focus,
            MenuAction::Capture,
            MenuAction::ContinueStatus,
            MenuAction::Commit {
                index: 2,
                minutes: 60,
            },
        ];
        for action in actions {
            assert_eq!(MenuAction::parse(&action.custom_id()), Some(action));
        }
    }

    #[test]
    fn test_rejects_unknown_ids() {
        assert_eq!(MenuAction::parse("prev"), None);
        assert_eq!(MenuAction::parse("commit:x:30"), None);
        assert_eq!(MenuAction::parse("commit:1"), None);
        assert_eq!(MenuAction::parse("commit:1:45"), None);
        assert_eq!(MenuAction::parse("menu:year"), None);
    }
}
