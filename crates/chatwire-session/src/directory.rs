//! The nickname directory: who owns which name.
//!
//! A bijection between connection identity and chosen nickname — at most
//! one nickname per connection, at most one connection per nickname,
//! case-sensitive, never empty. The original system used a bespoke
//! bidirectional dictionary; here it is two plain `HashMap`s kept in
//! lockstep, which is all the structure the three operations need.
//!
//! # Concurrency note
//!
//! `NicknameDirectory` is NOT thread-safe by itself — it uses plain
//! `HashMap`s. The server owns it behind a single `tokio::sync::Mutex`
//! (inside the relay roster), which is the serialization point that makes
//! concurrent same-name claims yield exactly one winner. Keeping the
//! directory itself lock-free avoids hidden double locking.

use std::collections::HashMap;

use chatwire_transport::ConnectionId;

/// Uniqueness-enforcing map between connections and nicknames.
#[derive(Debug, Default)]
pub struct NicknameDirectory {
    /// Nickname held by each connection.
    by_conn: HashMap<ConnectionId, String>,

    /// Connection holding each nickname. Kept in sync with `by_conn`;
    /// every entry in one map has its mirror in the other.
    by_nick: HashMap<String, ConnectionId>,
}

impl NicknameDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically tests availability and, if available, binds `nick` to
    /// `conn`. Returns `false` without side effects when the name is
    /// empty, already taken, or the connection already holds a name.
    ///
    /// Matching is exact and case-sensitive: `"Sam"` and `"sam"` are
    /// different names.
    pub fn try_claim(&mut self, conn: ConnectionId, nick: &str) -> bool {
        if nick.is_empty()
            || self.by_nick.contains_key(nick)
            || self.by_conn.contains_key(&conn)
        {
            return false;
        }
        self.by_conn.insert(conn, nick.to_string());
        self.by_nick.insert(nick.to_string(), conn);
        tracing::info!(%conn, nick, "nickname claimed");
        true
    }

    /// Removes and returns the binding for `conn`.
    ///
    /// Returns `None` for a connection with no binding — a disconnect
    /// before authentication completed is an ordinary event, not an
    /// error.
    pub fn release(&mut self, conn: ConnectionId) -> Option<String> {
        let nick = self.by_conn.remove(&conn)?;
        self.by_nick.remove(&nick);
        tracing::info!(%conn, nick, "nickname released");
        Some(nick)
    }

    /// Returns the nickname held by `conn`, if any.
    pub fn nickname(&self, conn: ConnectionId) -> Option<&str> {
        self.by_conn.get(&conn).map(String::as_str)
    }

    /// Returns the connection holding `nick`, if any.
    pub fn holder(&self, nick: &str) -> Option<ConnectionId> {
        self.by_nick.get(nick).copied()
    }

    /// Number of bound nicknames.
    pub fn len(&self) -> usize {
        self.by_conn.len()
    }

    /// Returns `true` if no nicknames are bound.
    pub fn is_empty(&self) -> bool {
        self.by_conn.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    // =====================================================================
    // try_claim()
    // =====================================================================

    #[test]
    fn test_try_claim_available_nick_succeeds() {
        let mut dir = NicknameDirectory::new();

        assert!(dir.try_claim(conn(1), "sam"));

        assert_eq!(dir.nickname(conn(1)), Some("sam"));
        assert_eq!(dir.holder("sam"), Some(conn(1)));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_try_claim_taken_nick_fails_without_side_effects() {
        let mut dir = NicknameDirectory::new();
        dir.try_claim(conn(1), "sam");

        assert!(!dir.try_claim(conn(2), "sam"));

        // The loser caused no mutation.
        assert_eq!(dir.holder("sam"), Some(conn(1)));
        assert_eq!(dir.nickname(conn(2)), None);
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_try_claim_empty_nick_fails() {
        let mut dir = NicknameDirectory::new();
        assert!(!dir.try_claim(conn(1), ""));
        assert!(dir.is_empty());
    }

    #[test]
    fn test_try_claim_is_case_sensitive() {
        let mut dir = NicknameDirectory::new();
        dir.try_claim(conn(1), "Sam");

        // A different casing is a different name.
        assert!(dir.try_claim(conn(2), "sam"));
        assert_eq!(dir.holder("Sam"), Some(conn(1)));
        assert_eq!(dir.holder("sam"), Some(conn(2)));
    }

    #[test]
    fn test_try_claim_second_nick_for_same_connection_fails() {
        // One nickname per connection: re-claiming must not create a
        // second binding or orphan the first.
        let mut dir = NicknameDirectory::new();
        dir.try_claim(conn(1), "sam");

        assert!(!dir.try_claim(conn(1), "pat"));

        assert_eq!(dir.nickname(conn(1)), Some("sam"));
        assert_eq!(dir.holder("pat"), None);
        assert_eq!(dir.len(), 1);
    }

    // =====================================================================
    // release()
    // =====================================================================

    #[test]
    fn test_release_frees_nick_for_new_claimant() {
        let mut dir = NicknameDirectory::new();
        dir.try_claim(conn(1), "sam");

        assert_eq!(dir.release(conn(1)), Some("sam".to_string()));

        // Immediately available again.
        assert!(dir.try_claim(conn(2), "sam"));
        assert_eq!(dir.holder("sam"), Some(conn(2)));
    }

    #[test]
    fn test_release_unauthenticated_connection_is_noop() {
        let mut dir = NicknameDirectory::new();
        dir.try_claim(conn(1), "sam");

        // conn 2 never authenticated; releasing it is not an error.
        assert_eq!(dir.release(conn(2)), None);
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_release_keeps_both_maps_in_lockstep() {
        let mut dir = NicknameDirectory::new();
        dir.try_claim(conn(1), "sam");
        dir.try_claim(conn(2), "pat");

        dir.release(conn(1));

        assert_eq!(dir.nickname(conn(1)), None);
        assert_eq!(dir.holder("sam"), None);
        assert_eq!(dir.nickname(conn(2)), Some("pat"));
        assert_eq!(dir.holder("pat"), Some(conn(2)));
    }

    // =====================================================================
    // lookup
    // =====================================================================

    #[test]
    fn test_nickname_returns_none_for_unknown_connection() {
        let dir = NicknameDirectory::new();
        assert_eq!(dir.nickname(conn(9)), None);
    }

    #[test]
    fn test_holder_returns_none_for_unknown_nick() {
        let dir = NicknameDirectory::new();
        assert_eq!(dir.holder("ghost"), None);
    }
}
