//! Fan-out of server events. Delivery is fire-and-forget: a frame is encoded
//! once and queued on every matching session; nothing is retried.

use tracing::{debug, error};

use crate::{protocol::ServerEvent, session::SessionRegistry};

fn encode(event: &ServerEvent) -> Option<String> {
    match event.encode() {
        Ok(frame) => Some(frame),
        Err(e) => {
            error!(%e, "failed to encode event");
            None
        }
    }
}

pub fn to_session(sessions: &mut SessionRegistry, id: &str, event: &ServerEvent) -> bool {
    let Some(frame) = encode(event) else { return false };
    sessions.get_mut(id).is_some_and(|s| s.send(&frame))
}

/// Every session subscribed to `room`, optionally skipping the sender.
pub fn to_room(
    sessions: &mut SessionRegistry,
    room: &str,
    event: &ServerEvent,
    except: Option<&str>,
) -> usize {
    let Some(frame) = encode(event) else { return 0 };
    let mut sent = 0;
    for (id, session) in sessions.iter_mut() {
        if Some(id.as_str()) == except || !session.rooms.contains(room) {
            continue;
        }
        if session.send(&frame) {
            sent += 1;
        }
    }
    debug!(room, sent, "room broadcast");
    sent
}

/// Every connected session.
pub fn to_all(sessions: &mut SessionRegistry, event: &ServerEvent) -> usize {
    let Some(frame) = encode(event) else { return 0 };
    let sent = sessions.iter_mut().map(|(_, s)| s.send(&frame)).filter(|ok| *ok).count();
    debug!(sent, "global broadcast");
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn join(reg: &mut SessionRegistry, id: &str, rooms: &[&str]) -> UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        reg.register(id, tx);
        let s = reg.get_mut(id).unwrap();
        s.rooms.extend(rooms.iter().map(|r| r.to_string()));
        rx
    }

    #[test]
    fn room_broadcast_skips_sender_and_outsiders() {
        let mut reg = SessionRegistry::default();
        let mut a = join(&mut reg, "a", &["r"]);
        let mut b = join(&mut reg, "b", &["r"]);
        let mut c = join(&mut reg, "c", &["other"]);

        let sent = to_room(&mut reg, "r", &ServerEvent::ClearCanvas, Some("a"));
        assert_eq!(sent, 1);
        assert!(a.try_recv().is_err());
        assert_eq!(b.try_recv().unwrap(), r#"{"event":"clearCanvas"}"#);
        assert!(c.try_recv().is_err());
    }

    #[test]
    fn global_broadcast_reaches_everyone() {
        let mut reg = SessionRegistry::default();
        let mut a = join(&mut reg, "a", &[]);
        let mut b = join(&mut reg, "b", &["r"]);
        let ev = ServerEvent::RoomList(vec!["r".into()]);
        assert_eq!(to_all(&mut reg, &ev), 2);
        assert!(a.try_recv().is_ok() && b.try_recv().is_ok());
    }

    #[test]
    fn dead_session_is_not_counted_and_goes_stale() {
        let mut reg = SessionRegistry::default();
        let rx = join(&mut reg, "gone", &["r"]);
        drop(rx);
        assert_eq!(to_room(&mut reg, "r", &ServerEvent::ClearCanvas, None), 0);
        assert_eq!(reg.stale(), vec!["gone".to_string()]);
        assert!(!to_session(&mut reg, "gone", &ServerEvent::RoomCreator(true)));
    }
}
