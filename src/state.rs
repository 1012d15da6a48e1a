use std::{collections::VecDeque, sync::Arc};
use tokio::sync::{mpsc, Mutex};

use crate::{
    config::Limits,
    hub::Hub,
    protocol::{ChatMessage, Stroke},
    vote::VoteRound,
};

/// Outbound queue of one connection; frames are pre-encoded JSON.
pub type Tx = mpsc::UnboundedSender<String>;

/// Every room, session and log lives behind this one lock, so events are
/// applied one at a time.
pub type SharedHub = Arc<Mutex<Hub>>;

pub fn shared(limits: Limits) -> SharedHub {
    Arc::new(Mutex::new(Hub::new(limits)))
}

/* ------------ 有界歷史 ------------ */

/// Append-only log that drops its oldest entries past `cap`.
#[derive(Debug, Clone)]
pub struct History<T> {
    items: VecDeque<T>,
    cap:   usize,
}

impl<T: Clone> History<T> {
    pub fn new(cap: usize) -> Self {
        Self { items: VecDeque::with_capacity(cap.min(64)), cap }
    }

    /// Returns how many old entries were evicted.
    pub fn push(&mut self, item: T) -> usize {
        self.items.push_back(item);
        let over = self.items.len().saturating_sub(self.cap);
        self.items.drain(..over);
        over
    }

    /// Owned copy; the live log cannot be reached through it.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/* ------------ 房間 ------------ */

#[derive(Debug, Clone)]
pub struct Room {
    pub members: usize,
    pub strokes: History<Stroke>,
    pub chat:    History<ChatMessage>,
    pub vote:    Option<VoteRound>,
}

impl Room {
    pub fn new(limits: Limits) -> Self {
        Self {
            members: 0,
            strokes: History::new(limits.strokes),
            chat:    History::new(limits.chat),
            vote:    None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keeps_most_recent_in_order() {
        let mut h = History::new(3);
        let evicted: usize = (1..=5).map(|i| h.push(i)).sum();
        assert_eq!(evicted, 2);
        assert_eq!(h.snapshot(), vec![3, 4, 5]);
    }

    #[test]
    fn snapshot_is_detached() {
        let mut h = History::new(4);
        h.push("a".to_string());
        let mut snap = h.snapshot();
        snap.push("b".to_string());
        snap[0].push('!');
        assert_eq!(h.snapshot(), vec!["a".to_string()]);
    }

    #[test]
    fn clear_empties() {
        let mut h = History::new(2);
        h.push(1);
        h.clear();
        assert!(h.is_empty());
        assert_eq!(h.len(), 0);
    }

    #[test]
    fn new_room_is_empty() {
        let r = Room::new(Limits::default());
        assert_eq!(r.members, 0);
        assert!(r.strokes.is_empty() && r.chat.is_empty() && r.vote.is_none());
    }
}
