use chatdeck_core::{Message, Session, SessionId};

/// The current session, held apart from the rest of the collection.
///
/// The repository always owns exactly one of these, so there is no pointer
/// that could name a missing session. Switching is a synchronous swap.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    session: Session,
}

impl ActiveSession {
    /// Makes `session` current.
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Id of the current session.
    pub fn current_id(&self) -> &SessionId {
        &self.session.id
    }

    /// The current session record.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Messages of the current session, oldest first.
    pub fn transcript(&self) -> &[Message] {
        &self.session.messages
    }

    /// Whether `id` names the current session.
    pub fn is_current(&self, id: &str) -> bool {
        self.session.id.as_str() == id
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Makes `session` current and hands back the one it displaced.
    pub(crate) fn replace(&mut self, session: Session) -> Session {
        std::mem::replace(&mut self.session, session)
    }

    /// The trailing `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> &[Message] {
        let transcript = self.transcript();
        let start = transcript.len().saturating_sub(n);
        &transcript[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_returns_trailing_window() {
        let mut session = Session::new();
        for i in 0..15 {
            session.add_message(Message::user(format!("m{i}")));
        }
        let active = ActiveSession::new(session);
        let recent = active.recent(10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].content, "m5");
        assert_eq!(recent[9].content, "m14");
    }

    #[test]
    fn recent_on_short_transcript_returns_everything() {
        let mut session = Session::new();
        session.add_message(Message::user("only"));
        let active = ActiveSession::new(session);
        assert_eq!(active.recent(10).len(), 1);
    }

    #[test]
    fn replace_swaps_current_and_returns_previous() {
        let a = Session::new();
        let a_id = a.id.clone();
        let mut b = Session::new();
        b.add_message(Message::user("from b"));
        let b_id = b.id.clone();

        let mut active = ActiveSession::new(a);
        assert!(active.transcript().is_empty());
        let previous = active.replace(b);
        assert_eq!(previous.id, a_id);
        assert!(active.is_current(b_id.as_str()));
        assert_eq!(active.transcript()[0].content, "from b");
    }
}
