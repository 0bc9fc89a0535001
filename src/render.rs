//! Plain-text rendering of the board.

use chrono::{DateTime, Local, Utc};

use crate::board::BoardState;
use crate::models::{CurrentUser, Message};

/// Page heading
pub const TITLE: &str = "Message Board";
/// Shown instead of the list while a load is in flight
pub const LOADING: &str = "Loading...";
/// Placeholder for the draft box
pub const DRAFT_PLACEHOLDER: &str = "Write a message...";

/// `"{name}: {content}"`
#[must_use]
pub fn message_line(message: &Message) -> String {
    format!("{}: {}", message.profile_name, message.content)
}

/// One [`message_line`] per message, in display order.
#[must_use]
pub fn message_lines(messages: &[Message]) -> Vec<String> {
    messages.iter().map(message_line).collect()
}

/// Creation date as a short local date, e.g. `1/2/2024`.
#[must_use]
pub fn format_date(created_at: &DateTime<Utc>) -> String {
    created_at.with_timezone(&Local).format("%-m/%-d/%Y").to_string()
}

/// Render the whole view for `user`.
///
/// While loading only the heading and [`LOADING`] are shown. The delete hint
/// appears only on the user's own messages.
#[must_use]
pub fn render_board(state: &BoardState, user: Option<&CurrentUser>) -> String {
    let mut lines = vec![TITLE.to_string(), "=".repeat(TITLE.len())];

    if state.is_loading {
        lines.push(LOADING.to_string());
        return finish(lines);
    }

    if let Some(error) = &state.error_message {
        lines.push(format!("! {error}"));
    }

    match user {
        Some(user) => {
            let who = user.email.as_deref().unwrap_or(&user.id);
            let draft = if state.draft.is_empty() { DRAFT_PLACEHOLDER } else { state.draft.as_str() };
            lines.push(format!("[{who}] > {draft}"));
        },
        None => lines.push("Sign in to post messages.".to_string()),
    }
    lines.push(String::new());

    for message in &state.messages {
        lines.extend(message_block(message, user.is_some_and(|u| message.is_authored_by(u))));
    }

    if state.messages.is_empty() {
        lines.push("No messages yet.".to_string());
    } else if state.has_more {
        lines.push("... older messages available".to_string());
    }

    finish(lines)
}

fn message_block(message: &Message, can_delete: bool) -> Vec<String> {
    let mut header = format!("{} ({})", message.profile_name, format_date(&message.created_at));
    if can_delete {
        header.push_str(&format!("  [delete: {}]", message.id));
    }

    let mut block = vec![header];
    block.extend(message.content.lines().map(|line| format!("    {line}")));
    block.push(String::new());
    block
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
