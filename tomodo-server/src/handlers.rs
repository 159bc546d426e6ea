use axum::{
    extract::{ws::Message, Path, State, WebSocketUpgrade},
    Json,
};
use futures::{select, SinkExt, StreamExt};
use tomodo_api::{
    ClientMessage, FeedMessage, ItemHistory, ListId, PresenceEntry, UserId, UserProfile, Uuid,
};

use crate::{
    extractors::{Auth, Store, Verifier},
    history, social, Error, Presence, Rooms,
};

/// Topic a user's own channel lives under. Friend channels and list channels
/// are the same namespace, clients pass them through `setFriends` verbatim.
pub(crate) fn user_room(id: UserId) -> String {
    id.0.to_string()
}

pub async fn last_activity(
    Auth(user): Auth,
    State(store): State<Store>,
    Path(list): Path<Uuid>,
) -> Result<Json<Option<ItemHistory>>, Error> {
    Ok(Json(
        history::last_activity(&*store, ListId(list), user.id).await?,
    ))
}

pub async fn realtime_feed(
    ws: WebSocketUpgrade,
    State(store): State<Store>,
    State(verifier): State<Verifier>,
    State(presence): State<Presence>,
    State(rooms): State<Rooms>,
) -> axum::response::Response {
    ws.on_upgrade(move |sock| {
        let (write, read) = sock.split();
        realtime_feed_impl(write, read, store, verifier, presence, rooms)
    })
}

/// One realtime connection, from upgrade to disconnect.
///
/// The connection is a single task: it interleaves messages relayed from
/// other connections with the client's own events, so events from one client
/// are always processed in arrival order while different clients interleave
/// arbitrarily. Generic over the socket halves so tests can drive it over
/// plain channels.
pub async fn realtime_feed_impl<W, R>(
    mut write: W,
    read: R,
    store: Store,
    verifier: Verifier,
    presence: Presence,
    rooms: Rooms,
) where
    W: 'static + Send + Unpin + futures::Sink<Message>,
    <W as futures::Sink<Message>>::Error: Send,
    R: 'static + Send + Unpin + futures::Stream<Item = Result<Message, axum::Error>>,
{
    tracing::debug!("realtime feed connected");
    let (conn, mut relayed) = rooms.register().await;
    let mut read = read.fuse();
    let mut user: Option<UserProfile> = None;

    macro_rules! disconnect {
        () => {{
            tracing::debug!(?user, "realtime feed disconnected");
            rooms.remove(conn).await;
            if let Some(u) = user.take() {
                presence.deregister(u.id).await;
            }
            rooms
                .broadcast(FeedMessage::OnlineUserList(presence.snapshot().await))
                .await;
            return;
        }};
    }
    macro_rules! send_message {
        ( $msg:expr ) => {{
            let msg: FeedMessage = $msg;
            let json = match serde_json::to_vec(&msg) {
                Ok(json) => json,
                Err(err) => {
                    tracing::error!(?err, ?msg, "failed serializing message to json");
                    continue;
                }
            };
            if let Err(_) = write.send(Message::Binary(json)).await {
                disconnect!();
            }
        }};
    }

    // the client is expected to answer with setUser
    match serde_json::to_vec(&FeedMessage::VerifyUser) {
        Ok(json) => {
            if let Err(_) = write.send(Message::Binary(json)).await {
                disconnect!();
            }
        }
        Err(err) => tracing::error!(?err, "failed serializing verifyUser prompt"),
    }

    loop {
        select! {
            msg = relayed.next() => match msg {
                None => disconnect!(),
                Some(msg) => send_message!(msg),
            },
            msg = read.next() => {
                let msg = match msg {
                    None | Some(Ok(Message::Close(_))) => disconnect!(),
                    Some(Ok(Message::Ping(_)) | Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Text(msg))) => msg,
                    Some(msg) => {
                        tracing::warn!(?msg, "received unexpected message from client");
                        disconnect!();
                    }
                };
                let msg = match serde_json::from_str::<ClientMessage>(&msg) {
                    Ok(msg) => msg,
                    Err(err) => {
                        tracing::warn!(?err, "received malformed message from client");
                        continue;
                    }
                };
                match msg {
                    ClientMessage::SetUser { auth_token } => match verifier.verify(auth_token).await {
                        Ok(profile) => {
                            rooms.join(conn, &user_room(profile.id)).await;
                            presence
                                .register(PresenceEntry {
                                    user_id: profile.id,
                                    full_name: profile.full_name(),
                                })
                                .await;
                            tracing::debug!(?profile, "realtime feed auth success");
                            user = Some(profile);
                            rooms
                                .broadcast(FeedMessage::OnlineUserList(presence.snapshot().await))
                                .await;
                        }
                        Err(err) => {
                            // the connection is left open, cancellation is up
                            // to the transport
                            tracing::debug!(%err, "realtime feed auth failure");
                            send_message!(FeedMessage::AuthError {
                                status: 500,
                                error: String::from("Auth failed!!!"),
                            });
                        }
                    },
                    ClientMessage::SetFriends(topics) => {
                        for topic in topics {
                            rooms.join(conn, &topic).await;
                        }
                    }
                    ClientMessage::GetOnlineUsers => {
                        send_message!(FeedMessage::OnlineUserList(presence.snapshot().await));
                    }
                    ClientMessage::SendFriendRequest(req) => {
                        if let Err(err) = social::send_request(&*store, &req).await {
                            tracing::error!(?err, code = "FRQ-SEND-1", "failed persisting friend request");
                        }
                        let receiver = user_room(req.receiver_id);
                        let requester = user_room(req.requester_id);
                        rooms
                            .publish(conn, &receiver, FeedMessage::ReceivedFriendRequest(req))
                            .await;
                        rooms
                            .publish_union(
                                conn,
                                &[&receiver, &requester],
                                FeedMessage::NotificationAlert,
                            )
                            .await;
                    }
                    ClientMessage::AcceptFriendRequest(req) => {
                        if let Err(err) = social::accept_request(&*store, &req).await {
                            tracing::error!(?err, code = "FRQ-ACC-1", "failed accepting friend request");
                        }
                        let receiver = user_room(req.receiver_id);
                        let requester = user_room(req.requester_id);
                        rooms
                            .publish(conn, &requester, FeedMessage::AcceptedFriendRequest(req))
                            .await;
                        rooms
                            .publish_union(
                                conn,
                                &[&receiver, &requester],
                                FeedMessage::NotificationAlert,
                            )
                            .await;
                    }
                    ClientMessage::AddList { room_id, data } => {
                        rooms.publish(conn, &room_id, FeedMessage::ListCreated(data)).await;
                    }
                    ClientMessage::EditList { room_id, data } => {
                        rooms.publish(conn, &room_id, FeedMessage::ListEdited(data)).await;
                    }
                    ClientMessage::DeleteList { room_id, data } => {
                        rooms.publish(conn, &room_id, FeedMessage::ListDeleted(data)).await;
                    }
                    ClientMessage::AddItem { room_id, data } => {
                        rooms.publish(conn, &room_id, FeedMessage::ItemAdded(data)).await;
                    }
                    ClientMessage::EditItem { room_id, data } => {
                        rooms.publish(conn, &room_id, FeedMessage::ItemEdited(data)).await;
                    }
                    ClientMessage::DeleteItem { room_id, data } => {
                        rooms.publish(conn, &room_id, FeedMessage::ItemDeleted(data)).await;
                    }
                    ClientMessage::UpdateItemStatus { room_id, data } => {
                        rooms
                            .publish(conn, &room_id, FeedMessage::ItemStatusUpdated(data))
                            .await;
                    }
                    ClientMessage::TrackItemHistory { room_id: _, data } => {
                        history::record(&*store, data).await;
                    }
                    ClientMessage::UndoLastAction { room_id: _, history_id } => {
                        history::undo(&*store, history_id).await;
                    }
                    ClientMessage::Ping => send_message!(FeedMessage::Pong),
                }
            },
        }
    }
}
