use tomodo_api::{DocumentStore, HistoryDraft, HistoryId, ItemHistory, ListId, UserId};

use crate::Error;

/// Appends an audit record for one item mutation. Best-effort: recording
/// must never fail or block the mutation it describes, so a store failure is
/// logged under its correlation code and dropped.
pub async fn record(store: &dyn DocumentStore, draft: HistoryDraft) {
    let record = draft.into_record();
    if let Err(err) = store.create_history(record).await {
        tracing::error!(?err, code = "IHR-REC-1", "failed appending item history record");
    }
}

/// The single most recent record on `list` whose privileged-viewer set
/// contains `viewer`, or `None` for a viewer never granted access.
pub async fn last_activity(
    store: &dyn DocumentStore,
    list: ListId,
    viewer: UserId,
) -> Result<Option<ItemHistory>, Error> {
    store
        .last_history_for_viewer(list, viewer)
        .await
        .map_err(|err| {
            tracing::error!(?err, code = "IHC-GLAOL-2", "failed fetching last activity");
            Error::persistence("IHC-GLAOL-2")
        })
}

/// Deletes exactly the given audit record, as the undo marker.
///
/// This does not revert the item the record describes: a caller wanting a
/// true rollback must re-apply the record's `old_item` snapshot itself.
pub async fn undo(store: &dyn DocumentStore, id: HistoryId) {
    if let Err(err) = store.delete_history(id).await {
        tracing::error!(?err, code = "IHR-UNDO-1", "failed deleting last action record");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tomodo_api::{
        Item, ItemId, ItemKind, ItemParent, ItemStatus, ItemSnapshot, Uuid,
    };
    use tomodo_mem_store::MemStore;

    fn item(list: ListId, creator: UserId) -> Item {
        Item {
            id: ItemId(Uuid::new_v4()),
            list_id: list,
            parent: ItemParent::List(list),
            title: String::from("Buy milk"),
            creator,
            creator_name: String::from("Alice A"),
            added_on: Utc::now(),
            status: ItemStatus::Open,
            completion_date: None,
            completed_by: None,
        }
    }

    fn draft(list: ListId, actor: UserId, viewers: Vec<UserId>) -> HistoryDraft {
        HistoryDraft {
            item: item(list, actor),
            kind: ItemKind::Main,
            operation: String::from("Edit Item"),
            operated_by: actor,
            operated_by_name: String::from("Alice A"),
            privileged_users: viewers,
            old_item: Some(ItemSnapshot {
                title: Some(String::from("Buy bread")),
                ..ItemSnapshot::default()
            }),
        }
    }

    #[tokio::test]
    async fn last_activity_filters_by_viewer_and_orders_by_operated_time() {
        let store = MemStore::new();
        let alice = store.add_user("Alice", "A").await;
        let bob = store.add_user("Bob", "B").await;
        let carol = store.add_user("Carol", "C").await;
        let list = ListId(Uuid::new_v4());

        // explicit timestamps, newest first goes in first to rule out
        // insertion-order luck
        let mut newer = draft(list, alice, vec![alice, bob]).into_record();
        newer.operated_at = Utc::now();
        let mut older = draft(list, alice, vec![alice, bob, carol]).into_record();
        older.operated_at = newer.operated_at - Duration::minutes(5);
        store.create_history(newer.clone()).await.unwrap();
        store.create_history(older.clone()).await.unwrap();

        let seen = last_activity(&store, list, bob).await.unwrap().unwrap();
        assert_eq!(seen.id, newer.id);

        // carol is only privileged on the older record
        let seen = last_activity(&store, list, carol).await.unwrap().unwrap();
        assert_eq!(seen.id, older.id);

        // a viewer never granted access sees nothing
        let dave = store.add_user("Dave", "D").await;
        assert_eq!(last_activity(&store, list, dave).await.unwrap(), None);

        // records on another list are invisible
        let other = ListId(Uuid::new_v4());
        assert_eq!(last_activity(&store, other, bob).await.unwrap(), None);
    }

    #[tokio::test]
    async fn record_is_best_effort_and_undo_deletes_exactly_one_record() {
        let store = MemStore::new();
        let alice = store.add_user("Alice", "A").await;
        let list = ListId(Uuid::new_v4());

        record(&store, draft(list, alice, vec![alice])).await;
        record(&store, draft(list, alice, vec![alice])).await;
        assert_eq!(store.history_len().await, 2);

        // a failing append is logged and dropped, never surfaced
        store.fail_writes_after(0).await;
        record(&store, draft(list, alice, vec![alice])).await;
        store.heal().await;
        assert_eq!(store.history_len().await, 2);

        let last = last_activity(&store, list, alice).await.unwrap().unwrap();
        undo(&store, last.id).await;
        assert_eq!(store.history_len().await, 1);
        let remaining = last_activity(&store, list, alice).await.unwrap().unwrap();
        assert_ne!(remaining.id, last.id);

        // undoing an already-deleted record is a no-op
        undo(&store, last.id).await;
        assert_eq!(store.history_len().await, 1);
    }
}
