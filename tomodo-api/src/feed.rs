use crate::{AuthToken, HistoryDraft, HistoryId, PresenceEntry, RequestId, UserId};

/// Payload of `sendFriendRequest`, and of the `receivedFriendRequest` relay.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    pub requester_id: UserId,
    pub requester_name: String,
    pub receiver_id: UserId,
    pub receiver_name: String,
}

/// Payload of `acceptFriendRequest`, and of the `acceptedFriendRequest`
/// relay. Same shape as [`NewRequest`] plus the id of the pending request.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptRequest {
    pub id: RequestId,
    pub requester_id: UserId,
    pub requester_name: String,
    pub receiver_id: UserId,
    pub receiver_name: String,
}

/// Everything a client can send over the realtime channel.
///
/// Room ids are opaque: clients put user ids and list ids in them alike, the
/// server never interprets them. Likewise the list/item payloads are relayed
/// as-is and never inspected.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    SetUser { auth_token: AuthToken },
    SetFriends(Vec<String>),
    GetOnlineUsers,
    SendFriendRequest(NewRequest),
    AcceptFriendRequest(AcceptRequest),
    #[serde(rename_all = "camelCase")]
    AddList {
        room_id: String,
        data: serde_json::Value,
    },
    #[serde(rename_all = "camelCase")]
    EditList {
        room_id: String,
        data: serde_json::Value,
    },
    #[serde(rename_all = "camelCase")]
    DeleteList {
        room_id: String,
        data: serde_json::Value,
    },
    #[serde(rename_all = "camelCase")]
    AddItem {
        room_id: String,
        data: serde_json::Value,
    },
    #[serde(rename_all = "camelCase")]
    EditItem {
        room_id: String,
        data: serde_json::Value,
    },
    #[serde(rename_all = "camelCase")]
    DeleteItem {
        room_id: String,
        data: serde_json::Value,
    },
    #[serde(rename_all = "camelCase")]
    UpdateItemStatus {
        room_id: String,
        data: serde_json::Value,
    },
    #[serde(rename_all = "camelCase")]
    TrackItemHistory {
        room_id: String,
        data: HistoryDraft,
    },
    #[serde(rename_all = "camelCase")]
    UndoLastAction {
        room_id: String,
        history_id: HistoryId,
    },
    Ping,
}

/// Everything the server can push to a client.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum FeedMessage {
    VerifyUser,
    #[serde(rename = "auth-error")]
    AuthError { status: u16, error: String },
    OnlineUserList(Vec<PresenceEntry>),
    ReceivedFriendRequest(NewRequest),
    AcceptedFriendRequest(AcceptRequest),
    NotificationAlert,
    ListCreated(serde_json::Value),
    ListEdited(serde_json::Value),
    ListDeleted(serde_json::Value),
    ItemAdded(serde_json::Value),
    ItemEdited(serde_json::Value),
    ItemDeleted(serde_json::Value),
    ItemStatusUpdated(serde_json::Value),
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_event_names_match_protocol() {
        let msg = ClientMessage::SetUser {
            auth_token: AuthToken::stub(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["event"], "setUser");
        assert_eq!(
            json["data"]["authToken"],
            serde_json::to_value(AuthToken::stub().0).unwrap()
        );

        let json = serde_json::to_value(&FeedMessage::AuthError {
            status: 500,
            error: String::from("Auth failed!!!"),
        })
        .unwrap();
        assert_eq!(json["event"], "auth-error");

        let json = serde_json::to_value(&FeedMessage::OnlineUserList(vec![])).unwrap();
        assert_eq!(json["event"], "onlineUserList");

        let json = serde_json::to_value(&FeedMessage::ItemStatusUpdated(serde_json::json!({})))
            .unwrap();
        assert_eq!(json["event"], "itemStatusUpdated");
    }

    #[test]
    fn client_messages_round_trip() {
        for msg in [
            ClientMessage::GetOnlineUsers,
            ClientMessage::SetFriends(vec![String::from("U1"), String::from("L1")]),
            ClientMessage::AddItem {
                room_id: String::from("L1"),
                data: serde_json::json!({"title": "Buy milk"}),
            },
            ClientMessage::Ping,
        ] {
            let json = serde_json::to_string(&msg).unwrap();
            assert_eq!(msg, serde_json::from_str(&json).unwrap());
        }
    }
}
