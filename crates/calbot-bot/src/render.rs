//! Reply text for slash commands.

use calbot_core::{Event, Filter, FilterError, Subscription};
use calbot_server::{FilterOutcome, SubscribeOutcome, SyncError, UnsubscribeOutcome};

use crate::slash::InputError;

/// Maximum length of a Discord message, in characters.
pub const MESSAGE_LIMIT: usize = 2000;

const ELLIPSIS: &str = "…";

/// Fits `text` into one message, keeping the most recent lines.
pub fn clamp(text: &str) -> String {
    if text.chars().count() <= MESSAGE_LIMIT {
        return text.to_string();
    }

    let budget = MESSAGE_LIMIT - ELLIPSIS.chars().count() - 1;
    let mut kept = Vec::new();
    let mut used = 0;
    for line in text.lines().rev() {
        let len = line.chars().count() + 1;
        if used + len > budget {
            break;
        }
        used += len;
        kept.push(line);
    }

    if kept.is_empty() {
        let skip = text.chars().count() - budget;
        let tail: String = text.chars().skip(skip).collect();
        return format!("{ELLIPSIS}\n{tail}");
    }

    kept.reverse();
    format!("{ELLIPSIS}\n{}", kept.join("\n"))
}

pub fn input_error(err: &InputError) -> String {
    format!("Input error: {}", err)
}

pub fn filter_error(err: &FilterError) -> String {
    clamp(&format!("Error subscribing with filter: {}", err))
}

pub fn guild_only() -> String {
    "This command can only be used in a server.".to_string()
}

pub fn subscribed(url: &str, outcome: &SubscribeOutcome) -> String {
    let mut text = format!(
        "Subscribed to calendar at {} with {} events",
        url,
        outcome.published.len()
    );
    if outcome.skipped_invalid + outcome.skipped_filtered + outcome.skipped_past > 0 {
        text.push_str(&format!(
            "\nSkipped {} invalid, {} filtered and {} past events",
            outcome.skipped_invalid, outcome.skipped_filtered, outcome.skipped_past
        ));
    }
    clamp(&text)
}

pub fn unsubscribed(url: &str, outcome: &UnsubscribeOutcome) -> String {
    clamp(&format!(
        "Unsubscribed from calendar at {}, removed {} events",
        url,
        outcome.removed.len()
    ))
}

pub fn filtered(outcome: &FilterOutcome) -> String {
    clamp(&format!(
        "Added filter `{}` to {}, removed {} events",
        outcome.filter,
        outcome.filter.url(),
        outcome.removed.len()
    ))
}

pub fn unfiltered(filter: &Filter) -> String {
    clamp(&format!("Removed filter `{}` from {}", filter, filter.url()))
}

/// Lists events with Discord timestamps so each reader sees local time.
pub fn events(url: &str, events: &[Event]) -> String {
    if events.is_empty() {
        return clamp(&format!("No events stored for {}", url));
    }

    let mut lines = vec![format!("Events for {}:", url)];
    for event in events {
        let mut line = format!(
            "- **{}** <t:{}:f>",
            event.name,
            event.start_time.timestamp()
        );
        if !event.location.is_empty() {
            line.push_str(&format!(" ({})", event.location));
        }
        lines.push(line);
    }
    clamp(&lines.join("\n"))
}

pub fn filters(url: &str, filters: &[Filter]) -> String {
    if filters.is_empty() {
        return clamp(&format!("No filters for {}", url));
    }

    let mut lines = vec![format!("Filters for {}:", url)];
    lines.extend(filters.iter().map(|f| format!("- `{}`", f)));
    clamp(&lines.join("\n"))
}

/// Reply for a URL with no subscription, listing the known ones.
pub fn not_subscribed(url: &str, subscriptions: &[Subscription]) -> String {
    if subscriptions.is_empty() {
        return clamp(&format!("Not subscribed to {}. No calendars are subscribed.", url));
    }

    let mut lines = vec![format!(
        "Not subscribed to {}. Subscribed calendars:",
        url
    )];
    lines.extend(subscriptions.iter().map(|s| format!("- {}", s.url)));
    clamp(&lines.join("\n"))
}

/// Reply for a failed operation. Publish failures list every target.
pub fn sync_error(action: &str, err: &SyncError) -> String {
    let mut lines = vec![format!("{}: {}", action, err)];
    if let SyncError::Publish(failures) = err
        && failures.len() > 1
    {
        lines.extend(
            failures
                .iter()
                .map(|f| format!("- {}: {}", f.target, f.error)),
        );
    }
    clamp(&lines.join("\n"))
}
