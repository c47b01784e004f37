//! Registry of live WebSocket connections keyed by identity.
//!
//! Each identity holds at most one connection. A reconnect replaces the
//! previous handle, and `unregister` only removes an entry whose connection id
//! still matches, so a late close from a replaced socket cannot evict the new
//! one. The lock is never held across an `.await`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::domain::UserId;
use crate::inbound::ws::messages::OutboundFrame;

/// Channel into one connection's session loop.
pub type ConnectionHandle = UnboundedSender<OutboundFrame>;

/// Identifier distinguishing successive connections of the same identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

#[derive(Debug)]
struct Registration {
    connection: ConnectionId,
    handle: ConnectionHandle,
}

/// Process-local presence map.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    next_connection: AtomicU64,
    entries: RwLock<HashMap<UserId, Registration>>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `handle` as the live connection for `user` and broadcast the
    /// new online set.
    pub fn register(&self, user: UserId, handle: ConnectionHandle) -> ConnectionId {
        let connection = ConnectionId(self.next_connection.fetch_add(1, Ordering::Relaxed));
        let replaced = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user, Registration { connection, handle });
        if replaced.is_some() {
            debug!(user_id = %user, "presence handle replaced by reconnect");
        }
        self.broadcast_online();
        connection
    }

    /// Drop `user`'s entry if it still belongs to `connection`.
    ///
    /// Returns `true` when an entry was removed.
    pub fn unregister(&self, user: &UserId, connection: ConnectionId) -> bool {
        let removed = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let current = entries
                .get(user)
                .is_some_and(|entry| entry.connection == connection);
            if current {
                entries.remove(user);
            }
            current
        };
        if removed {
            self.broadcast_online();
        } else {
            debug!(user_id = %user, "stale presence unregister ignored");
        }
        removed
    }

    /// Handle for `user`'s live connection, if any.
    #[must_use]
    pub fn lookup(&self, user: &UserId) -> Option<ConnectionHandle> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user)
            .map(|entry| entry.handle.clone())
    }

    /// Identities with a live connection, in no particular order.
    #[must_use]
    pub fn online(&self) -> Vec<UserId> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }

    fn broadcast_online(&self) {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let frame = OutboundFrame::online_users(entries.keys());
        for entry in entries.values() {
            // A closed receiver is cleaned up by its own session loop.
            let _closed = entry.handle.send(frame.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    fn channel() -> (ConnectionHandle, UnboundedReceiver<OutboundFrame>) {
        unbounded_channel()
    }

    fn online_ids(frame: &OutboundFrame) -> Vec<UserId> {
        match frame {
            OutboundFrame::OnlineUsers { user_ids } => {
                let mut ids: Vec<UserId> =
                    user_ids.iter().copied().map(UserId::from_uuid).collect();
                ids.sort_by_key(|id| *id.as_uuid());
                ids
            }
            OutboundFrame::NewMessage { .. } => Vec::new(),
        }
    }

    #[rstest]
    fn register_broadcasts_online_set_to_everyone() {
        let registry = PresenceRegistry::new();
        let (alice, alice_id) = (channel(), UserId::random());
        let (bob, bob_id) = (channel(), UserId::random());
        let (alice_tx, mut alice_rx) = alice;
        let (bob_tx, mut bob_rx) = bob;

        registry.register(alice_id, alice_tx);
        registry.register(bob_id, bob_tx);

        let first = alice_rx.try_recv().expect("own registration");
        assert_eq!(online_ids(&first), vec![alice_id]);
        let second = alice_rx.try_recv().expect("bob joined");
        let mut expected = vec![alice_id, bob_id];
        expected.sort_by_key(|id| *id.as_uuid());
        assert_eq!(online_ids(&second), expected);
        assert_eq!(online_ids(&bob_rx.try_recv().expect("bob sees both")), expected);
    }

    #[rstest]
    fn stale_unregister_keeps_newer_connection() {
        let registry = PresenceRegistry::new();
        let user = UserId::random();
        let (old_tx, _old_rx) = channel();
        let (new_tx, _new_rx) = channel();

        let stale = registry.register(user, old_tx);
        let fresh = registry.register(user, new_tx);

        assert!(!registry.unregister(&user, stale));
        assert_eq!(registry.online(), vec![user]);
        assert!(registry.unregister(&user, fresh));
        assert!(registry.online().is_empty());
        assert!(registry.lookup(&user).is_none());
    }

    #[rstest]
    fn unregister_notifies_remaining_connections() {
        let registry = PresenceRegistry::new();
        let (stay_tx, mut stay_rx) = channel();
        let (leave_tx, _leave_rx) = channel();
        let stay = UserId::random();
        let leave = UserId::random();
        registry.register(stay, stay_tx);
        let leaving = registry.register(leave, leave_tx);
        while stay_rx.try_recv().is_ok() {}

        registry.unregister(&leave, leaving);

        let frame = stay_rx.try_recv().expect("departure broadcast");
        assert_eq!(online_ids(&frame), vec![stay]);
    }

    #[rstest]
    fn lookup_returns_latest_handle() {
        let registry = PresenceRegistry::new();
        let user = UserId::random();
        let (first_tx, _first_rx) = channel();
        let (second_tx, mut second_rx) = channel();
        registry.register(user, first_tx);
        registry.register(user, second_tx);
        while second_rx.try_recv().is_ok() {}

        let handle = registry.lookup(&user).expect("registered");
        handle
            .send(OutboundFrame::online_users(std::iter::empty()))
            .expect("send");
        assert!(second_rx.try_recv().is_ok());
    }
}
