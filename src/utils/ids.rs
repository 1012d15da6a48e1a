use chrono::Utc;

/// Transport session id.
pub fn session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Chat message id: wall-clock millis plus a random suffix, so two messages in
/// the same millisecond still differ.
pub fn message_id() -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), nanoid::nanoid!(10))
}

/// Display-only timestamp attached to chat messages.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn message_ids_do_not_collide_in_a_burst() {
        let ids: HashSet<_> = (0..10_000).map(|_| message_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn message_id_starts_with_millis() {
        let id = message_id();
        let (millis, suffix) = id.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 10);
    }

    #[test]
    fn timestamp_is_rfc3339() {
        assert!(chrono::DateTime::parse_from_rfc3339(&timestamp()).is_ok());
    }
}
