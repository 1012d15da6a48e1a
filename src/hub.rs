//! Event dispatch: each inbound event is routed to the room directory and the
//! result fanned out through `broadcast`. Runs to completion per event.

use tracing::{debug, info, warn};

use crate::{
    broadcast::{to_all, to_room, to_session},
    config::Limits,
    protocol::{valid_room, ChatEvent, ChatMessage, ClientEvent, DrawingEvent, ServerEvent, VoteEvent},
    rooms::{Left, RoomDirectory},
    session::SessionRegistry,
    state::Tx,
};

#[derive(Debug)]
pub struct Hub {
    sessions: SessionRegistry,
    rooms:    RoomDirectory,
}

impl Hub {
    pub fn new(limits: Limits) -> Self {
        Self { sessions: SessionRegistry::default(), rooms: RoomDirectory::new(limits) }
    }

    pub fn rooms(&self) -> &RoomDirectory {
        &self.rooms
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Registers a new connection and tells it which rooms exist.
    pub fn connect(&mut self, id: &str, tx: Tx) {
        self.reap();
        self.sessions.register(id, tx);
        let list = self.room_list();
        to_session(&mut self.sessions, id, &list);
        info!(session = id, "session connected");
    }

    pub fn handle(&mut self, id: &str, event: ClientEvent) {
        self.reap();
        if self.sessions.get(id).is_none() {
            warn!(session = id, "event from unknown session dropped");
            return;
        }
        match event {
            ClientEvent::CreateRoom(name) => {
                if self.rooms.create(&name) {
                    self.broadcast_rooms();
                }
            }
            ClientEvent::GetRooms => {
                let list = self.room_list();
                to_session(&mut self.sessions, id, &list);
            }
            ClientEvent::JoinRoom(req) => {
                let (name, username) = req.into_parts();
                self.join(id, &name, username);
            }
            ClientEvent::LeaveRoom(name) => self.leave(id, &name),
            ClientEvent::Drawing(ev) => self.drawing(id, ev),
            ClientEvent::ChatMessage(ev) => self.chat(id, ev),
            ClientEvent::ClearCanvas(name) => self.clear(id, &name),
            ClientEvent::RequestClearCanvas(name) => self.request_clear(id, &name),
            ClientEvent::VoteClearCanvas(ev) => self.vote(id, ev),
        }
    }

    /// Leaves every joined room exactly once. Safe to call repeatedly.
    pub fn disconnect(&mut self, id: &str) -> bool {
        let Some(session) = self.sessions.remove(id) else {
            return false;
        };
        for room in &session.rooms {
            self.system(room, format!("{} disconnected", session.username));
            self.rooms.leave(room);
        }
        if !session.rooms.is_empty() {
            self.broadcast_rooms();
        }
        info!(session = id, rooms = session.rooms.len(), "session disconnected");
        true
    }

    /// Drops sessions whose outbound queue has closed. Returns how many.
    pub fn sweep(&mut self) -> usize {
        let mut n = 0;
        loop {
            let closed = self.sessions.closed();
            if closed.is_empty() {
                return n;
            }
            for id in closed {
                if self.disconnect(&id) {
                    n += 1;
                }
            }
        }
    }

    /* ---------- handlers ---------- */

    fn join(&mut self, id: &str, name: &str, username: Option<String>) {
        if !valid_room(name) {
            warn!(session = id, "join with blank room name dropped");
            return;
        }
        let Some(session) = self.sessions.get_mut(id) else { return };
        if let Some(u) = username.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            session.username = u;
        }
        let rejoin = session.rooms.contains(name);
        let user = session.username.clone();

        if rejoin {
            // already counted, just resend the state
            let strokes = self.rooms.strokes(name).unwrap_or_default();
            let chat = self.rooms.chat(name).unwrap_or_default();
            to_session(&mut self.sessions, id, &ServerEvent::LoadCanvas(strokes));
            to_session(&mut self.sessions, id, &ServerEvent::LoadChat(chat));
            return;
        }

        let Some(joined) = self.rooms.join(name) else { return };
        if let Some(s) = self.sessions.get_mut(id) {
            s.rooms.insert(name.to_string());
        }
        info!(session = id, room = name, members = joined.members, "joined room");

        to_session(&mut self.sessions, id, &ServerEvent::RoomCreator(joined.first));
        to_session(&mut self.sessions, id, &ServerEvent::LoadCanvas(joined.strokes));
        to_session(&mut self.sessions, id, &ServerEvent::LoadChat(joined.chat));
        self.broadcast_rooms();
        self.system(name, format!("{user} joined the room"));
    }

    fn leave(&mut self, id: &str, name: &str) {
        if !self.sessions.in_room(id, name) {
            debug!(session = id, room = name, "leave for a room not joined");
            return;
        }
        let user = self.username(id);
        self.system(name, format!("{user} left the room"));
        if let Some(s) = self.sessions.get_mut(id) {
            s.rooms.remove(name);
        }
        if let Left::Remaining(n) = self.rooms.leave(name) {
            debug!(room = name, members = n, "member left");
        }
        self.broadcast_rooms();
    }

    fn drawing(&mut self, id: &str, DrawingEvent { room, data }: DrawingEvent) {
        if let Err(e) = data.validate() {
            warn!(session = id, %e, "stroke dropped");
            return;
        }
        if !self.rooms.append_stroke(&room, data.clone()) {
            warn!(session = id, room = %room, "stroke for unknown room dropped");
            return;
        }
        to_room(&mut self.sessions, &room, &ServerEvent::Drawing(data), Some(id));
    }

    fn chat(&mut self, id: &str, ChatEvent { room, message, username }: ChatEvent) {
        let text = message.trim();
        if text.is_empty() {
            debug!(session = id, "blank chat message dropped");
            return;
        }
        let user = username
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| self.username(id));
        let msg = ChatMessage::user(user, text);
        if !self.rooms.append_chat(&room, msg.clone()) {
            warn!(session = id, room = %room, "chat for unknown room dropped");
            return;
        }
        to_room(&mut self.sessions, &room, &ServerEvent::ChatMessage(msg), None);
    }

    fn clear(&mut self, id: &str, name: &str) {
        if !self.rooms.clear_strokes(name) {
            warn!(session = id, room = name, "clear for unknown room dropped");
            return;
        }
        to_room(&mut self.sessions, name, &ServerEvent::ClearCanvas, None);
        let user = self.username(id);
        self.system(name, format!("{user} cleared the canvas"));
    }

    fn request_clear(&mut self, id: &str, name: &str) {
        if !self.sessions.in_room(id, name) {
            warn!(session = id, room = name, "clear request from outside the room dropped");
            return;
        }
        if self.rooms.voting(name) {
            debug!(room = name, "clear request restarts the running vote");
        }
        let Some(tally) = self.rooms.start_vote(name) else {
            warn!(session = id, room = name, "clear request for unknown room dropped");
            return;
        };
        let user = self.username(id);
        self.system(name, format!("{user} requested to clear the canvas"));
        to_room(&mut self.sessions, name, &ServerEvent::ClearCanvasVote(tally), None);
    }

    fn vote(&mut self, id: &str, VoteEvent { room, vote, user_id }: VoteEvent) {
        if !self.sessions.in_room(id, &room) {
            warn!(session = id, room = %room, "ballot from outside the room dropped");
            return;
        }
        // one ballot per session; the client-supplied id is informational only
        if let Some(claimed) = user_id.filter(|u| u != id) {
            debug!(session = id, claimed = %claimed, "ballot counted under the session id");
        }
        let Some(outcome) = self.rooms.cast_vote(&room, id, vote) else { return };
        to_room(&mut self.sessions, &room, &ServerEvent::ClearCanvasVote(outcome.tally), None);

        if let Some(reset) = outcome.resolved {
            to_room(&mut self.sessions, &room, &ServerEvent::ClearCanvas, None);
            self.system(&room, "Canvas cleared by vote");
            to_room(&mut self.sessions, &room, &ServerEvent::ClearCanvasVote(reset), None);
        }
    }

    /* ---------- helpers ---------- */

    /// Logs a system message in the room and relays it to every member.
    fn system(&mut self, room: &str, text: impl Into<String>) {
        let msg = ChatMessage::system(text);
        if self.rooms.append_chat(room, msg.clone()) {
            to_room(&mut self.sessions, room, &ServerEvent::ChatMessage(msg), None);
        }
    }

    fn username(&self, id: &str) -> String {
        self.sessions
            .get(id)
            .map(|s| s.username.clone())
            .unwrap_or_else(|| crate::session::DEFAULT_NAME.into())
    }

    fn room_list(&self) -> ServerEvent {
        ServerEvent::RoomList(self.rooms.names())
    }

    fn broadcast_rooms(&mut self) {
        let list = self.room_list();
        to_all(&mut self.sessions, &list);
    }

    fn reap(&mut self) {
        if self.sessions.stale().is_empty() {
            return;
        }
        let n = self.sweep();
        debug!(reaped = n, "stale sessions reaped");
    }
}
