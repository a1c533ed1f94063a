use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::collections::HashMap;

// Category definitions with emojis and order
const CATEGORY_ORDER: &[&str] = &["Quick Start", "Planning", "Backlog", "Calendar"];

fn get_category_emoji(category: &str) -> &'static str {
    match category {
        "Quick Start" => "🚀",
        "Planning" => "🎯",
        "Backlog" => "📝",
        "Calendar" => "🗓",
        _ => "•",
    }
}

struct CommandMetadata {
    category: &'static str,
    priority: i32,
    note: Option<&'static str>,
}

fn get_command_metadata(name: &str) -> CommandMetadata {
    match name {
        "start" => CommandMetadata {
            category: "Quick Start",
            priority: 100,
            note: Some("Every menu button also works as a slash command."),
        },
        "status" => CommandMetadata {
            category: "Planning",
            priority: 90,
            note: Some("Press ⏭ Continue for more of the same answer."),
        },
        "focus" => CommandMetadata {
            category: "Planning",
            priority: 80,
            note: Some("The buttons under the list book a 30 or 60 minute block."),
        },
        "capture" => CommandMetadata {
            category: "Backlog",
            priority: 70,
            note: Some("Add `#category` and a date like `tomorrow` or `15.03`. Voice notes work too."),
        },
        "events" => CommandMetadata {
            category: "Calendar",
            priority: 60,
            note: None,
        },
        _ => CommandMetadata {
            category: "Quick Start",
            priority: 0,
            note: None,
        },
    }
}

/// Show a categorized list of commands.
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let mut categories: HashMap<&str, Vec<(i32, String)>> = HashMap::new();

    for command in &ctx.framework().options().commands {
        if command.hide_in_help || command.name == "help" {
            continue;
        }

        let metadata = get_command_metadata(&command.name);
        let description = command
            .description
            .as_deref()
            .unwrap_or("No description provided.");

        let mut entry = format!("• **/{0}** — {1}", command.name, description);
        if let Some(note) = metadata.note {
            entry.push_str(&format!("\n  ⤷ {}", note));
        }

        categories
            .entry(metadata.category)
            .or_default()
            .push((metadata.priority, entry));
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("Assistant Command Guide")
        .description(
            "Use slash commands with `/`, or open the button menu with `/start`. \
             While capture mode is on, your next message (or voice note) goes straight to the backlog.",
        )
        .color(serenity::Colour::from_rgb(88, 101, 242))
        .timestamp(serenity::Timestamp::now());

    // Sort categories based on defined order, then alphabetically for others
    let mut sorted_categories: Vec<_> = categories.keys().cloned().collect();
    sorted_categories.sort_by(|a, b| {
        let pos_a = CATEGORY_ORDER.iter().position(|&x| x == *a).unwrap_or(999);
        let pos_b = CATEGORY_ORDER.iter().position(|&x| x == *b).unwrap_or(999);
        pos_a.cmp(&pos_b).then(a.cmp(b))
    });

    for category in sorted_categories {
        if let Some(entries) = categories.get_mut(category) {
            // Sort by priority (descending), then name (ascending)
            entries.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

            let title = format!("{} {}", get_category_emoji(category), category);
            let formatted_entries: Vec<String> = entries.iter().map(|(_, s)| s.clone()).collect();

            for (i, chunk) in chunk_entries(&formatted_entries).iter().enumerate() {
                let field_name = if i == 0 {
                    title.clone()
                } else {
                    format!("{} (cont.)", title)
                };
                embed = embed.field(field_name, chunk.join("\n"), false);
            }
        }
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

fn chunk_entries(entries: &[String]) -> Vec<Vec<String>> {
    let mut chunks = Vec::new();
    let mut current_chunk = Vec::new();
    let mut current_length = 0;

    for entry in entries {
        let entry_len = entry.len();
        // Discord field value limit is 1024. We leave a bit of buffer.
        if !current_chunk.is_empty() && current_length + entry_len + 1 > 1000 {
            chunks.push(current_chunk);
            current_chunk = Vec::new();
            current_length = 0;
        }

        current_chunk.push(entry.clone());
        current_length += entry_len + 1; // +1 for newline
    }

    if !current_chunk.is_empty() {
        chunks.push(current_chunk);
    }

    chunks
}
