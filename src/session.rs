//! Connection registry: which transport session is who, and which rooms it sits in.

use std::collections::{BTreeSet, HashMap};

use crate::state::Tx;

pub const DEFAULT_NAME: &str = "Anonymous";

#[derive(Debug)]
pub struct Session {
    pub username: String,
    pub rooms:    BTreeSet<String>,
    tx:           Tx,
    stale:        bool,
}

impl Session {
    fn new(tx: Tx) -> Self {
        Self { username: DEFAULT_NAME.into(), rooms: BTreeSet::new(), tx, stale: false }
    }

    /// Queues a frame. A failed send means the writer is gone; the session is
    /// marked stale and reaped before the next event.
    pub fn send(&mut self, frame: &str) -> bool {
        if self.stale {
            return false;
        }
        if self.tx.send(frame.to_owned()).is_err() {
            self.stale = true;
        }
        !self.stale
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
}

impl SessionRegistry {
    pub fn register(&mut self, id: impl Into<String>, tx: Tx) {
        self.sessions.insert(id.into(), Session::new(tx));
    }

    pub fn remove(&mut self, id: &str) -> Option<Session> {
        self.sessions.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    pub fn in_room(&self, id: &str, room: &str) -> bool {
        self.sessions.get(id).is_some_and(|s| s.rooms.contains(room))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Session)> {
        self.sessions.iter_mut()
    }

    /// Sessions whose last send failed.
    pub fn stale(&self) -> Vec<String> {
        self.sessions
            .iter()
            .filter(|(_, s)| s.stale)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Sessions whose writer has hung up, whether or not anything was sent.
    pub fn closed(&self) -> Vec<String> {
        self.sessions
            .iter()
            .filter(|(_, s)| s.stale || s.tx.is_closed())
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn register_and_track_rooms() {
        let mut reg = SessionRegistry::default();
        let (tx, _rx) = mpsc::unbounded_channel();
        reg.register("s1", tx);
        reg.get_mut("s1").unwrap().rooms.insert("a".into());
        assert!(reg.in_room("s1", "a"));
        assert!(!reg.in_room("s1", "b"));
        assert!(!reg.in_room("nobody", "a"));
        assert_eq!(reg.get("s1").unwrap().username, DEFAULT_NAME);
    }

    #[test]
    fn failed_send_marks_stale() {
        let mut reg = SessionRegistry::default();
        let (tx, rx) = mpsc::unbounded_channel();
        reg.register("s1", tx);
        drop(rx);
        assert_eq!(reg.closed(), vec!["s1".to_string()]);
        assert!(reg.stale().is_empty());

        assert!(!reg.get_mut("s1").unwrap().send("{}"));
        assert_eq!(reg.stale(), vec!["s1".to_string()]);
    }

    #[test]
    fn remove_is_one_shot() {
        let mut reg = SessionRegistry::default();
        let (tx, _rx) = mpsc::unbounded_channel();
        reg.register("s1", tx);
        assert!(reg.remove("s1").is_some());
        assert!(reg.remove("s1").is_none());
        assert_eq!(reg.len(), 0);
    }
}
