//! Terminal rendering of the transcript, the session list, and the welcome
//! screen.
//!
//! Every function here builds a `String` from borrowed data. None of them can
//! reach storage, so redrawing a transcript never records anything.

use chatdeck_core::{Message, Sender, Session, SessionId};
use chatdeck_session::Theme;
use chrono::{DateTime, Local, Utc};

/// ANSI clear-and-home sequence.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";

/// Example prompts offered on the welcome screen as `(prompt, description)`.
pub const EXAMPLE_PROMPTS: [(&str, &str); 3] = [
    ("🎯 Set a goal today", "Let's plan something amazing"),
    ("🧘 Need a break tip?", "Quick relaxation ideas"),
    ("💬 Inspire me with a quote", "Daily motivation boost"),
];

/// Accent colour for the active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    accent: &'static str,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        let accent = match theme {
            Theme::Light => "\x1b[34m",
            Theme::Dark => "\x1b[96m",
        };
        Self { accent }
    }

    pub fn accent(&self, text: &str) -> String {
        format!("{}{text}{RESET}", self.accent)
    }

    pub fn dim(&self, text: &str) -> String {
        format!("{DIM}{text}{RESET}")
    }
}

/// Human label for how long ago `ts` was, relative to `now`.
pub fn format_relative(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(ts);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        ts.format("%Y-%m-%d").to_string()
    }
}

/// The whole transcript, oldest first.
pub fn render_transcript(messages: &[Message], user_name: &str, palette: Palette) -> String {
    let mut out = String::new();
    for message in messages {
        let who = match message.sender {
            Sender::User => user_name,
            Sender::Assistant => "Assistant",
        };
        let time = message.timestamp.with_timezone(&Local).format("%H:%M");
        out.push_str(&format!(
            "{} {}\n{}\n\n",
            palette.accent(who),
            palette.dim(&time.to_string()),
            message.content
        ));
    }
    out
}

/// One row of the session list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    /// 1-based position, usable with `/load` and `/delete`.
    pub index: usize,
    pub title: String,
    pub preview: String,
    /// Relative time of the last update.
    pub when: String,
    pub current: bool,
}

/// Builds the list rows from sessions already ordered by recency.
pub fn sidebar_entries(
    sessions: &[&Session],
    current_id: &SessionId,
    now: DateTime<Utc>,
) -> Vec<SidebarEntry> {
    sessions
        .iter()
        .enumerate()
        .map(|(i, session)| SidebarEntry {
            index: i + 1,
            title: session.title.clone(),
            preview: session.preview(),
            when: format_relative(session.updated_at, now),
            current: &session.id == current_id,
        })
        .collect()
}

/// The `/list` output, one numbered line per entry.
pub fn render_sidebar(entries: &[SidebarEntry], palette: Palette) -> String {
    let mut out = String::new();
    for entry in entries {
        let marker = if entry.current { "▶" } else { " " };
        let title = if entry.current {
            palette.accent(&entry.title)
        } else {
            entry.title.clone()
        };
        out.push_str(&format!(
            "{marker} {:>2}. {title}  {}\n      {}\n",
            entry.index,
            palette.dim(&entry.when),
            palette.dim(&entry.preview)
        ));
    }
    out
}

/// Greeting plus the numbered example prompts.
pub fn render_welcome(user_name: &str, palette: Palette) -> String {
    let mut out = format!(
        "{}\nReady to continue from where we left off?\n\n",
        palette.accent(&format!("Welcome back, {user_name}!"))
    );
    for (i, (prompt, description)) in EXAMPLE_PROMPTS.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {prompt}  {}\n",
            i + 1,
            palette.dim(description)
        ));
    }
    out.push_str("\nType a message, pick an example by number, or /help for commands.\n");
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs_ago: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        (now - Duration::seconds(secs_ago), now)
    }

    #[test]
    fn relative_labels() {
        let (ts, now) = at(45);
        assert_eq!(format_relative(ts, now), "Just now");
        let (ts, now) = at(5 * 60);
        assert_eq!(format_relative(ts, now), "5m ago");
        let (ts, now) = at(3 * 3600);
        assert_eq!(format_relative(ts, now), "3h ago");
        let (ts, now) = at(2 * 86_400);
        assert_eq!(format_relative(ts, now), "2d ago");
        let (ts, now) = at(10 * 86_400);
        assert_eq!(format_relative(ts, now), "2024-03-10");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let (ts, now) = at(-30);
        assert_eq!(format_relative(ts, now), "Just now");
    }

    #[test]
    fn transcript_keeps_order() {
        let messages = vec![Message::user("first"), Message::assistant("second")];
        let out = render_transcript(&messages, "Ada", Palette::for_theme(Theme::Light));
        let first = out.find("first").unwrap();
        let second = out.find("second").unwrap();
        assert!(first < second);
        assert!(out.contains("Ada"));
        assert!(out.contains("Assistant"));
    }

    #[test]
    fn sidebar_marks_current_and_previews() {
        let mut a = Session::new();
        a.add_message(Message::user("Explain quicksort in detail please"));
        let b = Session::new();
        let now = Utc::now();
        let entries = sidebar_entries(&[&a, &b], &b.id, now);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 1);
        assert!(!entries[0].current);
        assert_eq!(entries[0].preview, "Explain quicksort in detail pl...");
        assert!(entries[1].current);
        assert_eq!(entries[1].preview, "New chat");
        assert_eq!(entries[1].when, "Just now");

        let out = render_sidebar(&entries, Palette::for_theme(Theme::Dark));
        assert!(out.contains("▶"));
        assert!(out.contains(" 2. "));
    }

    #[test]
    fn welcome_lists_examples() {
        let out = render_welcome("Legend", Palette::for_theme(Theme::Light));
        assert!(out.contains("Welcome back, Legend!"));
        for (prompt, _) in EXAMPLE_PROMPTS {
            assert!(out.contains(prompt));
        }
    }

    #[test]
    fn themes_use_different_accents() {
        assert_ne!(
            Palette::for_theme(Theme::Light),
            Palette::for_theme(Theme::Dark)
        );
    }
}
