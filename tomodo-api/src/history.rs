use chrono::Utc;
use uuid::Uuid;

use crate::{Item, ItemId, ItemParent, ItemStatus, ListId, Time, UserId, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct HistoryId(pub Uuid);

impl HistoryId {
    pub fn stub() -> HistoryId {
        HistoryId(STUB_UUID)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Main,
    Sub,
}

/// Snapshot of the fields an operation overwrote, so a client can re-apply
/// them. Only present for operations that overwrite fields.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSnapshot {
    pub title: Option<String>,
    pub status: Option<ItemStatus>,
    pub completion_date: Option<Time>,
    pub completed_by: Option<UserId>,
}

/// Immutable audit record of one operation on one item.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemHistory {
    pub id: HistoryId,
    pub item_id: ItemId,
    pub list_id: ListId,
    pub parent: ItemParent,
    pub kind: ItemKind,
    pub operation: String,
    pub operated_by: UserId,
    pub operated_by_name: String,
    pub operated_at: Time,
    pub creator: UserId,
    pub creator_name: String,
    pub title: String,
    pub status: ItemStatus,
    // the original wire field was misspelt and clients depend on it
    #[serde(rename = "previliegedUsers")]
    pub privileged_users: Vec<UserId>,
    pub old_item: Option<ItemSnapshot>,
}

/// What a client sends alongside an item mutation it wants audited.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDraft {
    pub item: Item,
    pub kind: ItemKind,
    pub operation: String,
    pub operated_by: UserId,
    pub operated_by_name: String,
    #[serde(rename = "previliegedUsers")]
    pub privileged_users: Vec<UserId>,
    pub old_item: Option<ItemSnapshot>,
}

impl HistoryDraft {
    pub fn into_record(self) -> ItemHistory {
        ItemHistory {
            id: HistoryId(Uuid::new_v4()),
            item_id: self.item.id,
            list_id: self.item.list_id,
            parent: self.item.parent,
            kind: self.kind,
            operation: self.operation,
            operated_by: self.operated_by,
            operated_by_name: self.operated_by_name,
            operated_at: Utc::now(),
            creator: self.item.creator,
            creator_name: self.item.creator_name,
            title: self.item.title,
            status: self.item.status,
            privileged_users: self.privileged_users,
            old_item: self.old_item,
        }
    }
}
