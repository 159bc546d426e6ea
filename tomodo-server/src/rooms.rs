use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use futures::channel::mpsc;
use tokio::sync::RwLock;
use tomodo_api::{FeedMessage, Uuid};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ConnId(Uuid);

/// Topic-scoped fan-out of feed messages to connected clients.
///
/// Topics are opaque strings; a connection puts user ids and list ids in
/// them alike. Delivery is at-most-once and best-effort: a message published
/// while a subscriber's relayer queue is gone is simply dropped, and nothing
/// is buffered for connections that join later.
///
/// Publishes made from one connection to one topic are delivered to each
/// subscriber in publish order: the fan-out happens synchronously under the
/// membership lock, into per-connection FIFO queues.
#[derive(Clone, Debug)]
pub struct Rooms(Arc<RwLock<RoomsInner>>);

#[derive(Debug, Default)]
struct RoomsInner {
    conns: HashMap<ConnId, mpsc::UnboundedSender<FeedMessage>>,
    members: HashMap<String, HashSet<ConnId>>,
    joined: HashMap<ConnId, HashSet<String>>,
}

impl Rooms {
    pub fn new() -> Rooms {
        Rooms(Arc::new(RwLock::new(RoomsInner::default())))
    }

    /// Registers a connection and returns its relayer queue.
    // Note: if this were bounded, there would be a deadlock between the
    // write-lock to remove a connection and the read-lock to fan a message
    // out to all subscribed connections
    pub async fn register(&self) -> (ConnId, mpsc::UnboundedReceiver<FeedMessage>) {
        let (sender, receiver) = mpsc::unbounded();
        let conn = ConnId(Uuid::new_v4());
        self.0.write().await.conns.insert(conn, sender);
        (conn, receiver)
    }

    /// Drops the connection and its membership in every topic.
    pub async fn remove(&self, conn: ConnId) {
        let mut inner = self.0.write().await;
        inner.conns.remove(&conn);
        if let Some(topics) = inner.joined.remove(&conn) {
            for topic in topics {
                if let Some(members) = inner.members.get_mut(&topic) {
                    members.remove(&conn);
                    if members.is_empty() {
                        inner.members.remove(&topic);
                    }
                }
            }
        }
    }

    pub async fn join(&self, conn: ConnId, topic: &str) {
        let mut inner = self.0.write().await;
        if !inner.conns.contains_key(&conn) {
            return;
        }
        inner
            .members
            .entry(String::from(topic))
            .or_insert_with(HashSet::new)
            .insert(conn);
        inner
            .joined
            .entry(conn)
            .or_insert_with(HashSet::new)
            .insert(String::from(topic));
    }

    /// Delivers `msg` to every member of `topic` except `origin`.
    pub async fn publish(&self, origin: ConnId, topic: &str, msg: FeedMessage) {
        let inner = self.0.read().await;
        if let Some(members) = inner.members.get(topic) {
            for conn in members {
                if *conn == origin {
                    continue;
                }
                if let Some(sender) = inner.conns.get(conn) {
                    let _ = sender.unbounded_send(msg.clone());
                }
            }
        }
    }

    /// Delivers `msg` to every member of any of `topics` except `origin`. A
    /// connection subscribed to several of the topics gets a single copy.
    pub async fn publish_union(&self, origin: ConnId, topics: &[&str], msg: FeedMessage) {
        let inner = self.0.read().await;
        let mut seen = HashSet::new();
        for topic in topics {
            if let Some(members) = inner.members.get(*topic) {
                for conn in members {
                    if *conn == origin || !seen.insert(*conn) {
                        continue;
                    }
                    if let Some(sender) = inner.conns.get(conn) {
                        let _ = sender.unbounded_send(msg.clone());
                    }
                }
            }
        }
    }

    /// Delivers `msg` to every connection, the originator included. Used for
    /// the global presence snapshot.
    pub async fn broadcast(&self, msg: FeedMessage) {
        let inner = self.0.read().await;
        for sender in inner.conns.values() {
            let _ = sender.unbounded_send(msg.clone());
        }
    }
}
