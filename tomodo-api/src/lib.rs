use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

mod error;
mod feed;
mod history;
mod list;
mod request;
mod store;

pub use error::Error;
pub use feed::{AcceptRequest, ClientMessage, FeedMessage, NewRequest};
pub use history::{HistoryDraft, HistoryId, ItemHistory, ItemKind, ItemSnapshot};
pub use list::{Item, ItemId, ItemParent, ItemStatus, List, ListId, ListStatus};
pub use request::{FriendRequest, RequestId, RequestStatus};
pub use store::{DocumentStore, TokenVerifier};

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AuthToken(pub Uuid);

impl AuthToken {
    pub fn stub() -> AuthToken {
        AuthToken(STUB_UUID)
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn stub() -> UserId {
        UserId(STUB_UUID)
    }
}

/// What token verification hands back for an authenticated connection.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One currently-connected, authenticated user. In-memory only, lost on
/// restart.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    pub user_id: UserId,
    pub full_name: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Notification {
    pub message: String,
    pub arrived: Time,
}

impl Notification {
    pub fn now(message: String) -> Notification {
        Notification {
            message,
            arrived: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,

    /// Ordered, duplicates possible: `add_friend` appends without looking at
    /// the current contents.
    pub friends: Vec<UserId>,

    /// Append-only.
    pub notifications: Vec<Notification>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
