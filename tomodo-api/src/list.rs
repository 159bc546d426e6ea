use uuid::Uuid;

use crate::{Time, UserId, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct ListId(pub Uuid);

impl ListId {
    pub fn stub() -> ListId {
        ListId(STUB_UUID)
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn stub() -> ItemId {
        ItemId(STUB_UUID)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStatus {
    Open,
    Done,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: ListId,
    pub title: String,
    pub description: String,
    pub owner: UserId,
    pub created: Time,
    pub status: ListStatus,
    pub last_modified: Option<Time>,
    pub last_modified_by: Option<UserId>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Open,
    Done,
}

/// Items form a two-level tree under a list: a top-level item's parent is the
/// list itself, a sub-item's parent is a top-level item. No deeper nesting.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemParent {
    List(ListId),
    Item(ItemId),
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub list_id: ListId,
    pub parent: ItemParent,
    pub title: String,
    pub creator: UserId,
    pub creator_name: String,
    pub added_on: Time,
    pub status: ItemStatus,
    pub completion_date: Option<Time>,
    pub completed_by: Option<UserId>,
}
