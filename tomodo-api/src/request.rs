use uuid::Uuid;

use crate::{UserId, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn stub() -> RequestId {
        RequestId(STUB_UUID)
    }
}

/// Requests only ever move forward: `Pending` to `Accepted`. There is no
/// reject or cancel transition, and requests are never deleted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum RequestStatus {
    Pending,
    Accepted,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: RequestId,
    pub requester_id: UserId,
    pub requester_name: String,
    pub receiver_id: UserId,
    pub receiver_name: String,
    pub status: RequestStatus,
}

impl FriendRequest {
    pub fn pending(
        requester_id: UserId,
        requester_name: String,
        receiver_id: UserId,
        receiver_name: String,
    ) -> FriendRequest {
        FriendRequest {
            id: RequestId(Uuid::new_v4()),
            requester_id,
            requester_name,
            receiver_id,
            receiver_name,
            status: RequestStatus::Pending,
        }
    }
}
