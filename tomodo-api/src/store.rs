use async_trait::async_trait;

use crate::{
    AuthToken, Error, FriendRequest, HistoryId, ItemHistory, ListId, Notification, RequestId,
    RequestStatus, User, UserId, UserProfile,
};

/// The document store the realtime core persists into.
///
/// Every method is an atomic operation on a single document; the store offers
/// no multi-document transaction. Sequences of calls (friend accept, item
/// mutation plus history append) are therefore not atomic, and each call's
/// failure must be handled on its own by the caller.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_request(&self, request: FriendRequest) -> anyhow::Result<()>;

    async fn set_request_status(&self, id: RequestId, status: RequestStatus)
        -> anyhow::Result<()>;

    /// Appends to the user's notification sequence.
    async fn push_notification(&self, user: UserId, n: Notification) -> anyhow::Result<()>;

    /// Pushes `friend` onto `user`'s friends sequence and appends the
    /// notification, as one single-document update. Appends blindly: a friend
    /// id already present is pushed again.
    async fn add_friend(
        &self,
        user: UserId,
        friend: UserId,
        n: Notification,
    ) -> anyhow::Result<()>;

    async fn fetch_user(&self, id: UserId) -> anyhow::Result<Option<User>>;

    async fn create_history(&self, record: ItemHistory) -> anyhow::Result<()>;

    /// Most recent record on `list` (by operated time, descending) whose
    /// privileged-viewer set contains `viewer`.
    async fn last_history_for_viewer(
        &self,
        list: ListId,
        viewer: UserId,
    ) -> anyhow::Result<Option<ItemHistory>>;

    async fn delete_history(&self, id: HistoryId) -> anyhow::Result<()>;
}

/// The token service guarding the realtime channel.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// `Err(Error::AuthenticationFailed)` on a bad or expired token.
    async fn verify(&self, token: AuthToken) -> Result<UserProfile, Error>;
}
