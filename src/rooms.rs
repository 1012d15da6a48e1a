//! Room directory: lifecycle plus the per-room stroke log, chat log and
//! vote round. It is the only place rooms are created; everything else
//! treats an unknown room as a no-op.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::{
    config::Limits,
    protocol::{valid_room, ChatMessage, Stroke},
    state::Room,
    vote::{Ballot, Tally, VoteRound},
};

/// What a joining session needs to rebuild its local state.
#[derive(Debug, Clone, PartialEq)]
pub struct Joined {
    /// True when this join took the room from zero members to one.
    pub first:   bool,
    pub members: usize,
    pub strokes: Vec<Stroke>,
    pub chat:    Vec<ChatMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Left {
    Remaining(usize),
    Removed,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub tally: Tally,
    /// Set when the ballot carried the round; holds the reset tally.
    pub resolved: Option<Tally>,
}

#[derive(Debug)]
pub struct RoomDirectory {
    rooms:  BTreeMap<String, Room>,
    limits: Limits,
}

impl RoomDirectory {
    pub fn new(limits: Limits) -> Self {
        Self { rooms: BTreeMap::new(), limits }
    }

    /// Creates an empty room. False if the name is invalid or already taken.
    pub fn create(&mut self, name: &str) -> bool {
        if !valid_room(name) || self.rooms.contains_key(name) {
            return false;
        }
        self.rooms.insert(name.to_string(), Room::new(self.limits));
        info!(room = name, "room created");
        true
    }

    /// Adds one member, creating the room on demand, and returns the replay
    /// snapshot.
    pub fn join(&mut self, name: &str) -> Option<Joined> {
        if !valid_room(name) {
            return None;
        }
        let limits = self.limits;
        let room = self.rooms.entry(name.to_string()).or_insert_with(|| {
            info!(room = name, "room created on join");
            Room::new(limits)
        });
        room.members += 1;
        Some(Joined {
            first:   room.members == 1,
            members: room.members,
            strokes: room.strokes.snapshot(),
            chat:    room.chat.snapshot(),
        })
    }

    /// Drops one member; the room and all its history go with the last one.
    pub fn leave(&mut self, name: &str) -> Left {
        let Some(room) = self.rooms.get_mut(name) else {
            return Left::Unknown;
        };
        room.members = room.members.saturating_sub(1);
        if room.members > 0 {
            return Left::Remaining(room.members);
        }
        self.rooms.remove(name);
        info!(room = name, "room empty, removed");
        Left::Removed
    }

    pub fn names(&self) -> Vec<String> {
        self.rooms.keys().cloned().collect()
    }

    #[cfg(test)]
    pub fn contains(&self, name: &str) -> bool {
        self.rooms.contains_key(name)
    }

    #[cfg(test)]
    pub fn members(&self, name: &str) -> Option<usize> {
        self.rooms.get(name).map(|r| r.members)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /* ---------- stroke log ---------- */

    pub fn append_stroke(&mut self, name: &str, stroke: Stroke) -> bool {
        let Some(room) = self.rooms.get_mut(name) else { return false };
        let evicted = room.strokes.push(stroke);
        if evicted > 0 {
            debug!(room = name, evicted, kept = room.strokes.len(), "stroke log truncated");
        }
        true
    }

    pub fn strokes(&self, name: &str) -> Option<Vec<Stroke>> {
        self.rooms.get(name).map(|r| r.strokes.snapshot())
    }

    pub fn clear_strokes(&mut self, name: &str) -> bool {
        let Some(room) = self.rooms.get_mut(name) else { return false };
        room.strokes.clear();
        true
    }

    /* ---------- chat log ---------- */

    pub fn append_chat(&mut self, name: &str, msg: ChatMessage) -> bool {
        let Some(room) = self.rooms.get_mut(name) else { return false };
        room.chat.push(msg);
        true
    }

    pub fn chat(&self, name: &str) -> Option<Vec<ChatMessage>> {
        self.rooms.get(name).map(|r| r.chat.snapshot())
    }

    /* ---------- vote ---------- */

    /// Opens a fresh round, discarding any ballots from the previous one.
    pub fn start_vote(&mut self, name: &str) -> Option<Tally> {
        let room = self.rooms.get_mut(name)?;
        let round = room.vote.insert(VoteRound::open(room.members));
        Some(round.tally())
    }

    /// Records a ballot, opening a round first if none is running. A carrying
    /// ballot clears the strokes and closes the round.
    pub fn cast_vote(&mut self, name: &str, who: &str, ballot: Ballot) -> Option<VoteOutcome> {
        let room = self.rooms.get_mut(name)?;
        let members = room.members;
        let round = room.vote.get_or_insert_with(|| VoteRound::open(members));
        let tally = round.cast(who, ballot);
        if !tally.carries() {
            return Some(VoteOutcome { tally, resolved: None });
        }

        let reset = VoteRound::open(tally.total).tally();
        room.vote = None;
        room.strokes.clear();
        info!(room = name, yes = tally.yes, no = tally.no, "canvas cleared by vote");
        Some(VoteOutcome { tally, resolved: Some(reset) })
    }

    pub fn voting(&self, name: &str) -> bool {
        self.rooms.get(name).is_some_and(|r| r.vote.is_some())
    }
}
