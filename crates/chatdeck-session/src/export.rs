//! Export and import of chat history as standalone JSON documents.

use crate::repository::SessionRepository;
use chatdeck_core::{derive_title, ChatdeckResult, Message, Session, SessionId, DEFAULT_TITLE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// A single session's transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    /// When the export was written.
    pub export_date: DateTime<Utc>,
    /// Title of the exported session.
    pub chat_title: String,
    /// Length of `messages`.
    pub message_count: usize,
    /// The full transcript, unchanged.
    pub messages: Vec<Message>,
}

impl SessionExport {
    /// Snapshot of `session` taken now.
    pub fn from_session(session: &Session) -> Self {
        Self {
            export_date: Utc::now(),
            chat_title: session.title.clone(),
            message_count: session.messages.len(),
            messages: session.messages.clone(),
        }
    }

    /// `<namespace>_chat_<id>_<YYYY-MM-DD>.json`
    pub fn file_name(&self, namespace: &str, id: &SessionId) -> String {
        format!(
            "{namespace}_chat_{id}_{}.json",
            self.export_date.format("%Y-%m-%d")
        )
    }
}

/// Every session at once, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllSessionsExport {
    /// When the export was written.
    pub export_date: DateTime<Utc>,
    /// Length of `chat_sessions`.
    pub total_chats: usize,
    /// Every session keyed by id.
    pub chat_sessions: BTreeMap<SessionId, Session>,
}

impl AllSessionsExport {
    /// `<namespace>_all_chats_<YYYY-MM-DD>.json`
    pub fn file_name(&self, namespace: &str) -> String {
        format!(
            "{namespace}_all_chats_{}.json",
            self.export_date.format("%Y-%m-%d")
        )
    }
}

impl SessionRepository {
    /// Export of the current session, or `None` when its transcript is empty.
    pub fn export_current(&self) -> Option<SessionExport> {
        let current = self.current();
        if current.messages.is_empty() {
            return None;
        }
        Some(SessionExport::from_session(current))
    }

    /// Export of every session, current included.
    pub fn export_all(&self) -> AllSessionsExport {
        let chat_sessions: BTreeMap<SessionId, Session> = self
            .iter()
            .map(|session| (session.id.clone(), session.clone()))
            .collect();
        AllSessionsExport {
            export_date: Utc::now(),
            total_chats: chat_sessions.len(),
            chat_sessions,
        }
    }

    /// Creates a new current session holding the exported transcript as is.
    pub async fn import(&mut self, export: SessionExport) -> SessionId {
        let mut session = Session::new();
        let title = export.chat_title.trim();
        session.title = if !title.is_empty() {
            title.to_string()
        } else {
            export
                .messages
                .iter()
                .find(|m| m.is_user())
                .map(|m| derive_title(&m.content))
                .unwrap_or_else(|| DEFAULT_TITLE.to_string())
        };
        session.messages = export.messages;
        session.touch();
        info!(
            title = %session.title,
            messages = session.messages.len(),
            "Imported chat session"
        );
        self.adopt(session).await
    }
}

/// Writes `doc` as pretty-printed JSON to `dir/file_name`.
pub async fn write_export<T: Serialize>(
    dir: &Path,
    file_name: &str,
    doc: &T,
) -> ChatdeckResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(doc)?;
    tokio::fs::write(&path, json).await?;
    Ok(path)
}

/// Reads a single-session export written by [`write_export`].
pub async fn read_session_export(path: &Path) -> ChatdeckResult<SessionExport> {
    let data = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&data)?)
}
