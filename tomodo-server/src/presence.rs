use std::sync::Arc;

use tokio::sync::RwLock;
use tomodo_api::{PresenceEntry, UserId};

/// Process-wide registry of currently connected, authenticated users.
///
/// The list is only ever touched through this handle; many connections
/// mutate it concurrently. Registration appends without de-duplicating by
/// user id, so a user authenticating twice over two connections (or twice
/// over the same one) shows up twice until a matching deregistration.
#[derive(Clone, Debug)]
pub struct Presence(Arc<RwLock<Vec<PresenceEntry>>>);

impl Presence {
    pub fn new() -> Presence {
        Presence(Arc::new(RwLock::new(Vec::new())))
    }

    pub async fn register(&self, entry: PresenceEntry) {
        self.0.write().await.push(entry);
    }

    /// Removes the first entry for `user`, at most one.
    pub async fn deregister(&self, user: UserId) {
        let mut entries = self.0.write().await;
        if let Some(pos) = entries.iter().position(|e| e.user_id == user) {
            entries.remove(pos);
        }
    }

    pub async fn snapshot(&self) -> Vec<PresenceEntry> {
        self.0.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tomodo_api::Uuid;

    fn entry(id: UserId, name: &str) -> PresenceEntry {
        PresenceEntry {
            user_id: id,
            full_name: String::from(name),
        }
    }

    #[tokio::test]
    async fn deregistered_users_are_gone_but_duplicates_may_remain() {
        let presence = Presence::new();
        let alice = UserId(Uuid::new_v4());
        let bob = UserId(Uuid::new_v4());

        presence.register(entry(alice, "Alice A")).await;
        presence.register(entry(bob, "Bob B")).await;
        // re-authentication without a disconnect in between
        presence.register(entry(alice, "Alice A")).await;

        let snap = presence.snapshot().await;
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.iter().filter(|e| e.user_id == alice).count(), 2);

        presence.deregister(bob).await;
        assert!(presence
            .snapshot()
            .await
            .iter()
            .all(|e| e.user_id != bob));

        // one deregistration removes one entry, not both
        presence.deregister(alice).await;
        let snap = presence.snapshot().await;
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].user_id, alice);

        presence.deregister(alice).await;
        assert!(presence.snapshot().await.is_empty());

        // deregistering an absent user is a no-op
        presence.deregister(alice).await;
        assert!(presence.snapshot().await.is_empty());
    }
}
