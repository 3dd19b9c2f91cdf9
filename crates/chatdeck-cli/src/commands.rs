//! Parsing of interactive input lines.

use crate::view::EXAMPLE_PROMPTS;
use chatdeck_core::SessionId;
use chatdeck_session::SessionRepository;
use std::path::PathBuf;

/// Shown by `/help`.
pub const HELP: &str = "\
Commands:
  /new               start a new chat
  /list              list chats, most recent first
  /load <n|id>       switch to a chat
  /rename <title>    rename the current chat
  /delete [n|id]     delete a chat (default: current)
  /export            export the current chat to JSON
  /export-all        export every chat to JSON
  /import <path>     import an exported chat
  /clear             delete all chat history
  /theme             toggle light/dark accent
  /speak             read the last reply aloud (again to stop)
  /listen            dictate a message
  /help              show this help
  /quit              exit
Anything else is sent as a message. On the welcome screen 1-3 send an
example prompt.";

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text to send to the assistant.
    Send(String),
    New,
    List,
    /// Switch to a session by sidebar position or id.
    Load(String),
    Rename(String),
    /// Delete a session; `None` means the current one.
    Delete(Option<String>),
    Export,
    ExportAll,
    Import(PathBuf),
    Clear,
    Theme,
    Speak,
    Listen,
    Help,
    Quit,
    /// A blank line.
    Empty,
    /// A slash command that is unknown or missing its argument.
    Invalid(String),
}

impl Command {
    /// Parses one input line. `on_welcome` is true while the current
    /// transcript is empty, which is the only time `1`-`3` pick an example.
    pub fn parse(line: &str, on_welcome: bool) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if on_welcome {
            if let Some(prompt) = example_prompt(line) {
                return Self::Send(prompt.to_string());
            }
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Send(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let arg = (!arg.is_empty()).then(|| arg.to_string());

        match (name, arg) {
            ("new", _) => Self::New,
            ("list", _) => Self::List,
            ("load", Some(target)) => Self::Load(target),
            ("rename", Some(title)) => Self::Rename(title),
            ("delete", target) => Self::Delete(target),
            ("export", _) => Self::Export,
            ("export-all", _) => Self::ExportAll,
            ("import", Some(path)) => Self::Import(PathBuf::from(path)),
            ("clear", _) => Self::Clear,
            ("theme", _) => Self::Theme,
            ("speak", _) => Self::Speak,
            ("listen", _) => Self::Listen,
            ("help", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            ("load" | "rename" | "import", None) => {
                Self::Invalid(format!("/{name} needs an argument. Try /help."))
            }
            _ => Self::Invalid(format!("Unknown command /{name}. Try /help.")),
        }
    }
}

/// `"1"`..`"3"` select a welcome-screen example.
fn example_prompt(line: &str) -> Option<&'static str> {
    let n: usize = line.parse().ok()?;
    EXAMPLE_PROMPTS
        .get(n.checked_sub(1)?)
        .map(|(prompt, _)| *prompt)
}

/// Resolves a 1-based position in the recency list, or a literal session id.
pub fn resolve_target(repo: &SessionRepository, target: &str) -> Option<SessionId> {
    if let Ok(n) = target.parse::<usize>() {
        let listed = repo.list_by_recency();
        return n
            .checked_sub(1)
            .and_then(|i| listed.get(i))
            .map(|session| session.id.clone());
    }
    repo.get(target).map(|session| session.id.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chatdeck_core::Message;
    use chatdeck_session::{DeleteOutcome, MemoryKvStore, Storage, StorageKeys};
    use std::sync::Arc;
    use std::time::Duration;

    /// Three sessions; the newest ("third") is current.
    async fn repo_with_three() -> SessionRepository {
        let storage = Storage::open(Arc::new(MemoryKvStore::new())).await;
        let mut repo = SessionRepository::open(storage, StorageKeys::default()).await;
        repo.append_to_current(Message::user("first")).await;
        for text in ["second", "third"] {
            tokio::time::sleep(Duration::from_millis(2)).await;
            repo.create().await;
            repo.append_to_current(Message::user(text)).await;
        }
        repo
    }

    #[test]
    fn plain_text_is_sent() {
        assert_eq!(
            Command::parse("  hello there \n", false),
            Command::Send("hello there".into())
        );
        assert_eq!(Command::parse("   ", false), Command::Empty);
    }

    #[test]
    fn numbers_pick_examples_on_welcome_screen() {
        assert_eq!(Command::parse("1", true), Command::Send("🎯 Set a goal today".into()));
        assert_eq!(Command::parse("3", true), Command::Send("💬 Inspire me with a quote".into()));
        assert_eq!(Command::parse("0", true), Command::Send("0".into()));
        assert_eq!(Command::parse("4", true), Command::Send("4".into()));
    }

    #[test]
    fn numbers_are_literal_mid_conversation() {
        assert_eq!(Command::parse("1", false), Command::Send("1".into()));
        assert_eq!(Command::parse(" 2 ", false), Command::Send("2".into()));
    }

    #[test]
    fn slash_commands() {
        assert_eq!(Command::parse("/new", false), Command::New);
        assert_eq!(Command::parse("/load 2", false), Command::Load("2".into()));
        assert_eq!(
            Command::parse("/rename  My  plan ", false),
            Command::Rename("My  plan".into())
        );
        assert_eq!(Command::parse("/delete", false), Command::Delete(None));
        assert_eq!(Command::parse("/delete 3", false), Command::Delete(Some("3".into())));
        assert_eq!(
            Command::parse("/import out/chat.json", false),
            Command::Import(PathBuf::from("out/chat.json"))
        );
        assert_eq!(Command::parse("/export-all", false), Command::ExportAll);
        assert_eq!(Command::parse("/exit", false), Command::Quit);
    }

    #[test]
    fn bad_commands_are_invalid() {
        assert!(matches!(Command::parse("/load", false), Command::Invalid(_)));
        assert!(matches!(Command::parse("/rename   ", false), Command::Invalid(_)));
        assert!(matches!(Command::parse("/frobnicate", false), Command::Invalid(_)));
    }

    #[tokio::test]
    async fn targets_resolve_by_position_and_id() {
        let repo = repo_with_three().await;
        let listed: Vec<SessionId> = repo.list_by_recency().iter().map(|s| s.id.clone()).collect();

        assert_eq!(resolve_target(&repo, "1").as_ref(), Some(&listed[0]));
        assert_eq!(resolve_target(&repo, "3").as_ref(), Some(&listed[2]));
        assert_eq!(repo.get(listed[2].as_str()).unwrap().title, "first");
        assert_eq!(
            resolve_target(&repo, listed[1].as_str()).as_ref(),
            Some(&listed[1])
        );
    }

    #[tokio::test]
    async fn out_of_range_and_unknown_targets_resolve_to_nothing() {
        let repo = repo_with_three().await;
        assert_eq!(resolve_target(&repo, "0"), None);
        assert_eq!(resolve_target(&repo, "4"), None);
        assert_eq!(resolve_target(&repo, "chat_0_missing"), None);
    }

    #[tokio::test]
    async fn deleting_by_position_one_replaces_current_with_empty_chat() {
        let mut repo = repo_with_three().await;
        let current = repo.current_id().clone();

        let target = resolve_target(&repo, "1").unwrap();
        assert_eq!(target, current);
        let outcome = repo.delete(target.as_str()).await;
        assert!(matches!(outcome, DeleteOutcome::ReplacedCurrent { .. }));

        // An empty transcript is what brings the welcome screen back.
        assert!(repo.active().transcript().is_empty());
        assert_eq!(repo.len(), 3);
        assert!(repo.get(current.as_str()).is_none());
    }

    #[tokio::test]
    async fn deleting_by_position_keeps_current() {
        let mut repo = repo_with_three().await;
        let current = repo.current_id().clone();

        let target = resolve_target(&repo, "3").unwrap();
        assert_eq!(repo.delete(target.as_str()).await, DeleteOutcome::Deleted);
        assert_eq!(repo.current_id(), &current);
        assert_eq!(repo.len(), 2);
    }
}
