// What the bot answers, independent of how it was asked.
//
// Slash commands, buttons and plain messages all end up here. Each flow
// returns a `BotReply`; the caller decides whether it becomes a command
// reply, an interaction followup or a channel message. Failures are turned
// into readable text at this level and never bubble up as errors.

use std::path::Path;

use crate::core::ai::advice_service::{NO_CONTEXT, NO_TASKS};
use crate::core::calendar::{format_events, EventWindow};
use crate::core::focus::{commit_focus, task_title, CommitOutcome, COMMIT_DURATIONS};
use crate::core::planning::{columns, parse_capture, pick_next, SheetRecord, DEFAULT_FOCUS_SIZE};
use crate::core::session::SessionKey;
use crate::core::speech::is_warning;
use crate::discord::interactions::MenuAction;
use crate::discord::Data;
use poise::serenity_prelude as serenity;

/// Discord rejects message content longer than this (in characters).
pub const MESSAGE_LIMIT: usize = 2000;

const TASK_LIMIT: usize = 50;
const EFFECTIVENESS_LIMIT: usize = 50;
const CALENDAR_WEB_URL: &str = "https://calendar.google.com";

pub struct BotReply {
    pub content: String,
    pub components: Vec<serenity::CreateActionRow>,
}

impl BotReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: fit_message(&content.into()),
            components: Vec::new(),
        }
    }

    pub fn with_components(mut self, components: Vec<serenity::CreateActionRow>) -> Self {
        self.components = components;
        self
    }

    pub fn into_poise(self) -> poise::CreateReply {
        poise::CreateReply::default()
            .content(self.content)
            .components(self.components)
    }

    pub fn into_followup(self) -> serenity::CreateInteractionResponseFollowup {
        serenity::CreateInteractionResponseFollowup::new()
            .content(self.content)
            .components(self.components)
    }

    pub fn into_message(self) -> serenity::CreateMessage {
        serenity::CreateMessage::new()
            .content(self.content)
            .components(self.components)
    }
}

/// Cuts `text` to fit in one Discord message.
pub fn fit_message(text: &str) -> String {
    if text.chars().count() <= MESSAGE_LIMIT {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MESSAGE_LIMIT - 1).collect();
    cut.push('…');
    cut
}

fn button(action: MenuAction, label: &str, style: serenity::ButtonStyle) -> serenity::CreateButton {
    serenity::CreateButton::new(action.custom_id())
        .label(label)
        .style(style)
}

// ============================================================================
// Menu
// ============================================================================

pub fn menu() -> BotReply {
    let components = vec![
        serenity::CreateActionRow::Buttons(vec![
            button(MenuAction::Status, "📊 Status", serenity::ButtonStyle::Primary),
            button(MenuAction::Focus, "🎯 Focus", serenity::ButtonStyle::Primary),
            button(MenuAction::Capture, "➕ Add task", serenity::ButtonStyle::Success),
        ]),
        serenity::CreateActionRow::Buttons(vec![
            button(
                MenuAction::Events(EventWindow::Day),
                "🗓 Day",
                serenity::ButtonStyle::Secondary,
            ),
            button(
                MenuAction::Events(EventWindow::Week),
                "📅 Week",
                serenity::ButtonStyle::Secondary,
            ),
            button(
                MenuAction::Events(EventWindow::Month),
                "🗓️ Month",
                serenity::ButtonStyle::Secondary,
            ),
            serenity::CreateButton::new_link(CALENDAR_WEB_URL).label("📎 Calendar"),
        ]),
    ];

    BotReply::text("👋 Welcome! Pick an action:").with_components(components)
}

// ============================================================================
// Status / KPI analysis
// ============================================================================

pub async fn status(data: &Data, key: SessionKey) -> BotReply {
    let kpi = match data.backlog.latest_kpi().await {
        Ok(kpi) => kpi,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read KPI");
            return BotReply::text(format!("⚠️ Could not read KPI: {}", e));
        }
    };

    let (analysis, prompt) = data.advice.analyze_kpi(kpi.as_ref()).await;
    let reply = BotReply::text(format!("🤖 Analysis:\n{}", analysis));
    if prompt.is_empty() {
        return reply;
    }

    data.sessions.remember_analysis(key, prompt, analysis);
    reply.with_components(vec![serenity::CreateActionRow::Buttons(vec![button(
        MenuAction::ContinueStatus,
        "⏭ Continue",
        serenity::ButtonStyle::Secondary,
    )])])
}

pub async fn continue_status(data: &Data, key: SessionKey) -> BotReply {
    let session = data.sessions.snapshot(key);
    if session.last_prompt.trim().is_empty() || session.last_response.trim().is_empty() {
        return BotReply::text(NO_CONTEXT);
    }

    let continuation = data
        .advice
        .continue_analysis(&session.last_prompt, &session.last_response)
        .await;
    data.sessions.extend_analysis(key, &continuation);
    BotReply::text(format!("🤖 Continued:\n{}", continuation))
}

// ============================================================================
// Calendar
// ============================================================================

pub async fn events(data: &Data, window: EventWindow) -> BotReply {
    match data.calendar.upcoming(window).await {
        Ok(events) => {
            let title = format!("🗓 Events ({})", window.label());
            let text = format_events(&title, &events, data.calendar.timezone());
            if text.is_empty() {
                BotReply::text("No events yet.")
            } else {
                BotReply::text(text)
            }
        }
        Err(e) => BotReply::text(format!("⚠️ Could not read the calendar: {}", e)),
    }
}

// ============================================================================
// Focus and commitments
// ============================================================================

pub async fn focus(data: &Data, key: SessionKey) -> BotReply {
    let tasks = data.backlog.active_tasks(TASK_LIMIT).await;
    let effectiveness = data.backlog.effectiveness_rows(EFFECTIVENESS_LIMIT).await;
    let (tasks, effectiveness) = match (tasks, effectiveness) {
        (Ok(tasks), Ok(effectiveness)) => (tasks, effectiveness),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not read the backlog");
            return BotReply::text(format!("⚠️ Could not read the backlog: {}", e));
        }
    };

    let ranked = pick_next(
        &tasks,
        &effectiveness,
        DEFAULT_FOCUS_SIZE,
        data.settings.today(),
    );
    data.sessions.remember_focus(key, ranked.clone());
    if ranked.is_empty() {
        return BotReply::text(NO_TASKS);
    }

    let advice = data.advice.summarize_tasks(&ranked, &effectiveness).await;

    let content = format!("🎯 Next up:\n{}\n\n💡 {}", focus_lines(&ranked), advice);
    BotReply::text(content).with_components(commit_rows(ranked.len()))
}

fn focus_lines(ranked: &[SheetRecord]) -> String {
    ranked
        .iter()
        .enumerate()
        .map(|(idx, task)| {
            let mut line = format!("{}. {}", idx + 1, task_title(task));
            let category = task.get(columns::CATEGORY).trim();
            if !category.is_empty() {
                line.push_str(&format!(" [{}]", category));
            }
            let deadline = task.get(columns::DEADLINE).trim();
            if !deadline.is_empty() {
                line.push_str(&format!(" (due {})", deadline));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One row of commitment buttons per ranked task.
fn commit_rows(count: usize) -> Vec<serenity::CreateActionRow> {
    (0..count)
        .map(|index| {
            let buttons = COMMIT_DURATIONS
                .iter()
                .map(|&minutes| {
                    button(
                        MenuAction::Commit { index, minutes },
                        &format!("#{} · {} min", index + 1, minutes),
                        serenity::ButtonStyle::Success,
                    )
                })
                .collect();
            serenity::CreateActionRow::Buttons(buttons)
        })
        .collect()
}

pub async fn commit(data: &Data, key: SessionKey, index: usize, minutes: u32) -> BotReply {
    let Some(task) = data.sessions.focus_task(key, index) else {
        return BotReply::text("That focus list is gone. Run /focus again.");
    };
    let title = task_title(&task);

    let outcome = commit_focus(
        &*data.backlog,
        &*data.calendar,
        &task,
        minutes,
        &data.settings.author_name,
        data.settings.today(),
    )
    .await;

    match outcome {
        Ok(CommitOutcome::Booked { link }) => {
            let mut text = format!(
                "✅ {} min for \"{}\" logged and booked for tomorrow 06:00.",
                minutes, title
            );
            if let Some(link) = link {
                text.push('\n');
                text.push_str(&link);
            }
            BotReply::text(text)
        }
        Ok(CommitOutcome::LoggedOnly { calendar_error }) => BotReply::text(format!(
            "✅ Logged \"{}\" in the backlog, but the calendar booking failed: {}",
            title, calendar_error
        )),
        Err(e) => BotReply::text(format!("⚠️ Could not log the commitment: {}", e)),
    }
}

// ============================================================================
// Capture
// ============================================================================

pub fn start_capture(data: &Data, key: SessionKey) -> BotReply {
    data.sessions.set_capture_mode(key, true);
    BotReply::text("📝 Write the task (for example: \"buy potatoes #family tomorrow\"):")
}

/// Parses and stores one captured entry.
pub async fn capture(data: &Data, text: &str) -> BotReply {
    match append_capture(data, text).await {
        Ok(summary) => BotReply::text(format!("✅ Task added:\n{}", summary)),
        Err(reply) => reply,
    }
}

/// Transcribes a voice note and stores it like a typed entry.
pub async fn voice(data: &Data, audio_path: &Path) -> BotReply {
    let transcript = data.speech.transcribe(audio_path).await;
    if is_warning(&transcript) {
        return BotReply::text(transcript);
    }

    match append_capture(data, &transcript).await {
        Ok(summary) => BotReply::text(format!("🗣 Recognized and added:\n{}", summary)),
        Err(reply) => reply,
    }
}

async fn append_capture(data: &Data, text: &str) -> Result<String, BotReply> {
    let entry = parse_capture(text, data.settings.today());
    if entry.text.is_empty() {
        return Err(BotReply::text("Nothing to add: the message is empty."));
    }

    data.backlog
        .append_entry(
            &entry.text,
            &entry.category,
            &entry.due,
            &data.settings.author_name,
        )
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Could not append backlog entry");
            BotReply::text(format!("⚠️ Could not save the task: {}", e))
        })?;

    let mut summary = entry.text.clone();
    if !entry.category.is_empty() {
        summary.push_str(&format!("\nCategory: {}", entry.category));
    }
    if !entry.due.is_empty() {
        summary.push_str(&format!("\nDue: {}", entry.due));
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_message() {
        assert_eq!(fit_message("short"), "short");

        let long = "я".repeat(MESSAGE_LIMIT + 10);
        let cut = fit_message(&long);
        assert_eq!(cut.chars().count(), MESSAGE_LIMIT);
        assert!(cut.ends_with('…'));

        let exact = "x".repeat(MESSAGE_LIMIT);
        assert_eq!(fit_message(&exact), exact);
    }

    #[test]
    fn test_focus_lines() {
        let ranked = vec![
            SheetRecord::default()
                .with(columns::TASK, "Order kegs")
                .with(columns::CATEGORY, "Bar")
                .with(columns::DEADLINE, "2026-10-21"),
            SheetRecord::default().with(columns::TASK, "Call the landlord"),
        ];
        assert_eq!(
            focus_lines(&ranked),
            "1. Order kegs [Bar] (due 2026-10-21)\n2. Call the landlord"
        );
    }

    #[test]
    fn test_commit_rows_per_task() {
        assert_eq!(commit_rows(3).len(), 3);
        assert!(commit_rows(0).is_empty());
    }
}
