use crate::active::ActiveSession;
use crate::storage::{Storage, StorageKeys};
use chatdeck_core::{Message, Session, SessionId};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// What [`SessionRepository::delete`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// No session had that id; nothing changed.
    Missing,
    /// A non-current session was removed.
    Deleted,
    /// The current session was removed and `replacement` is now current.
    ReplacedCurrent {
        /// The fresh session that took its place.
        replacement: SessionId,
    },
}

/// Owns every session record and the current-session pointer.
///
/// The whole collection is written back to storage after every mutation.
/// The current session lives in the [`ActiveSession`] and every other one in
/// a map, so exactly one session is current and it always exists. Opening
/// with a missing or dangling pointer, deleting the current session, and
/// clearing everything all put a fresh session in its place before the first
/// write, so a mutation interrupted mid-persist leaves a valid repository.
pub struct SessionRepository {
    storage: Storage,
    keys: StorageKeys,
    /// Every session except the current one.
    others: HashMap<SessionId, Session>,
    active: ActiveSession,
}

impl SessionRepository {
    /// Loads the persisted collection and pointer, self-healing as needed.
    ///
    /// Records that fail to decode are skipped one by one; the rest load.
    pub async fn open(storage: Storage, keys: StorageKeys) -> Self {
        let raw: HashMap<String, serde_json::Value> =
            storage.get(&keys.sessions, HashMap::new()).await;
        let mut others = decode_sessions(raw);

        let pointer: Option<SessionId> = storage.get(&keys.current, None).await;
        match pointer.and_then(|id| others.remove(&id)) {
            Some(current) => {
                debug!(
                    current = %current.id,
                    sessions = others.len() + 1,
                    "Restored chat sessions"
                );
                Self {
                    storage,
                    keys,
                    others,
                    active: ActiveSession::new(current),
                }
            }
            None => {
                let repo = Self {
                    storage,
                    keys,
                    others,
                    active: ActiveSession::new(Session::new()),
                };
                info!(current = %repo.current_id(), "No valid current chat, starting a new one");
                repo.persist().await;
                repo
            }
        }
    }

    /// Creates an empty session and makes it current.
    pub async fn create(&mut self) -> SessionId {
        self.adopt(Session::new()).await
    }

    /// Makes `id` current. Unknown ids are logged and ignored.
    pub async fn load(&mut self, id: &str) -> bool {
        if !self.active.is_current(id) {
            let Some(session) = self.others.remove(id) else {
                warn!(id, "Chat session not found");
                return false;
            };
            self.install(session);
        }
        self.persist_pointer().await;
        true
    }

    /// Sets the title of `id`. Blank titles and unknown ids are ignored.
    pub async fn rename(&mut self, id: &str, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        let Some(session) = self.get_mut(id) else {
            warn!(id, "Cannot rename unknown chat session");
            return false;
        };
        session.rename(title);
        self.persist_sessions().await;
        true
    }

    /// Removes session `id`.
    ///
    /// Deleting the current session installs a fresh empty one before anything
    /// is written.
    pub async fn delete(&mut self, id: &str) -> DeleteOutcome {
        if self.active.is_current(id) {
            self.active.replace(Session::new());
            let replacement = self.current_id().clone();
            info!(id, replacement = %replacement, "Deleted current chat session");
            self.persist().await;
            return DeleteOutcome::ReplacedCurrent { replacement };
        }
        if self.others.remove(id).is_none() {
            warn!(id, "Cannot delete unknown chat session");
            return DeleteOutcome::Missing;
        }
        info!(id, "Deleted chat session");
        self.persist_sessions().await;
        DeleteOutcome::Deleted
    }

    /// Appends `message` to session `id` and persists the collection.
    pub async fn append_message(&mut self, id: &str, message: Message) -> bool {
        let Some(session) = self.get_mut(id) else {
            warn!(id, "Cannot append to unknown chat session");
            return false;
        };
        session.add_message(message);
        self.persist_sessions().await;
        true
    }

    /// Appends `message` to the current session.
    pub async fn append_to_current(&mut self, message: Message) -> bool {
        let id = self.current_id().clone();
        self.append_message(id.as_str(), message).await
    }

    /// Drops every session and starts over with a single empty one.
    pub async fn clear_all(&mut self) -> SessionId {
        self.others.clear();
        self.active.replace(Session::new());
        let id = self.current_id().clone();
        info!(current = %id, "All chat history cleared");
        self.persist().await;
        id
    }

    /// Inserts a fully formed session and makes it current.
    pub async fn adopt(&mut self, session: Session) -> SessionId {
        let id = session.id.clone();
        self.others.remove(&id);
        self.install(session);
        self.persist().await;
        debug!(id = %id, "Chat session is now current");
        id
    }

    /// All sessions, current included, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.others
            .values()
            .chain(std::iter::once(self.active.session()))
    }

    /// All sessions, most recently updated first. For display only.
    pub fn list_by_recency(&self) -> Vec<&Session> {
        let mut list: Vec<&Session> = self.iter().collect();
        list.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        list
    }

    /// The current session. Always present.
    pub fn current(&self) -> &Session {
        self.active.session()
    }

    /// Id of the current session.
    pub fn current_id(&self) -> &SessionId {
        self.active.current_id()
    }

    /// The current session with its history-window helpers.
    pub fn active(&self) -> &ActiveSession {
        &self.active
    }

    /// Looks up any session, current included.
    pub fn get(&self, id: &str) -> Option<&Session> {
        if self.active.is_current(id) {
            Some(self.active.session())
        } else {
            self.others.get(id)
        }
    }

    /// Number of sessions, current included. Never zero.
    pub fn len(&self) -> usize {
        self.others.len() + 1
    }

    /// Always `false`: a current session exists at all times.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The adapter the repository writes through.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Storage key names in use.
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        if self.active.is_current(id) {
            Some(self.active.session_mut())
        } else {
            self.others.get_mut(id)
        }
    }

    /// Makes `session` current, moving the previous one back into the map.
    fn install(&mut self, session: Session) {
        let previous = self.active.replace(session);
        self.others.insert(previous.id.clone(), previous);
    }

    async fn persist(&self) {
        self.persist_sessions().await;
        self.persist_pointer().await;
    }

    async fn persist_sessions(&self) -> bool {
        let all: BTreeMap<&SessionId, &Session> =
            self.iter().map(|session| (&session.id, session)).collect();
        self.storage.set(&self.keys.sessions, &all).await
    }

    async fn persist_pointer(&self) -> bool {
        self.storage
            .set(&self.keys.current, self.active.current_id())
            .await
    }
}

/// Decodes each stored record on its own, keyed by its storage key.
fn decode_sessions(raw: HashMap<String, serde_json::Value>) -> HashMap<SessionId, Session> {
    raw.into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<Session>(value) {
            Ok(mut session) => {
                if session.id.as_str() != key {
                    debug!(key = %key, record = %session.id, "Session id differs from its key, using key");
                    session.id = SessionId::from(key);
                }
                Some((session.id.clone(), session))
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Skipping unreadable chat session");
                None
            }
        })
        .collect()
}
