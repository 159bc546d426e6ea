use anyhow::Context;
use tomodo_api::{
    AcceptRequest, DocumentStore, FriendRequest, NewRequest, Notification, RequestId,
    RequestStatus,
};

use crate::Error;

/// Persists a new `Pending` request, then pushes a notification onto each
/// party's user document.
///
/// Only the request creation is a primary write: its failure propagates to
/// the caller. The two notification pushes are independent single-document
/// writes with no surrounding transaction; each one's failure is logged and
/// swallowed, leaving that user without the notification. Nothing is retried
/// or rolled back.
pub async fn send_request(
    store: &dyn DocumentStore,
    req: &NewRequest,
) -> Result<RequestId, Error> {
    let request = FriendRequest::pending(
        req.requester_id,
        req.requester_name.clone(),
        req.receiver_id,
        req.receiver_name.clone(),
    );
    let id = request.id;
    store
        .create_request(request)
        .await
        .context("creating friend request document")?;

    let notifications = [
        (
            req.requester_id,
            format!("You have sent a friend request to {}", req.receiver_name),
            "FRQ-SEND-2",
        ),
        (
            req.receiver_id,
            format!(
                "You have received a friend request from {}",
                req.requester_name
            ),
            "FRQ-SEND-3",
        ),
    ];
    for (user, message, code) in notifications {
        if let Err(err) = store
            .push_notification(user, Notification::now(message))
            .await
        {
            tracing::error!(?err, code, ?user, "failed pushing friend request notification");
        }
    }
    Ok(id)
}

/// Marks the request `Accepted`, then records the friendship on each user
/// document.
///
/// The status update is the primary write. The two `add_friend` writes are
/// independent: if the second one fails, one user lists the other as a
/// friend while the reverse does not hold. That asymmetry is logged under
/// its correlation code and otherwise tolerated; there is no retry, no
/// rollback, and no path back to `Pending`.
pub async fn accept_request(store: &dyn DocumentStore, req: &AcceptRequest) -> Result<(), Error> {
    store
        .set_request_status(req.id, RequestStatus::Accepted)
        .await
        .context("accepting friend request document")?;

    let steps = [
        (
            req.receiver_id,
            req.requester_id,
            format!("You have accepted friend request of {}", req.requester_name),
            "FRQ-ACC-2",
        ),
        (
            req.requester_id,
            req.receiver_id,
            format!("Your friend request was accepted by {}", req.receiver_name),
            "FRQ-ACC-3",
        ),
    ];
    for (user, friend, message, code) in steps {
        if let Err(err) = store
            .add_friend(user, friend, Notification::now(message))
            .await
        {
            tracing::error!(?err, code, ?user, ?friend, "failed recording accepted friendship");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tomodo_mem_store::MemStore;

    fn new_request(store_a: tomodo_api::UserId, store_b: tomodo_api::UserId) -> NewRequest {
        NewRequest {
            requester_id: store_a,
            requester_name: String::from("Alice A"),
            receiver_id: store_b,
            receiver_name: String::from("Bob B"),
        }
    }

    #[tokio::test]
    async fn send_persists_pending_request_and_both_notifications() {
        let store = MemStore::new();
        let alice = store.add_user("Alice", "A").await;
        let bob = store.add_user("Bob", "B").await;

        let id = send_request(&store, &new_request(alice, bob)).await.unwrap();

        let req = store.request(id).await.unwrap();
        assert_eq!(req.status, RequestStatus::Pending);
        assert_eq!(req.requester_id, alice);
        assert_eq!(req.receiver_id, bob);

        let alice_doc = store.fetch_user(alice).await.unwrap().unwrap();
        assert_eq!(
            alice_doc.notifications[0].message,
            "You have sent a friend request to Bob B"
        );
        let bob_doc = store.fetch_user(bob).await.unwrap().unwrap();
        assert_eq!(
            bob_doc.notifications[0].message,
            "You have received a friend request from Alice A"
        );
    }

    #[tokio::test]
    async fn accept_transitions_pending_to_accepted_and_never_reverts() {
        let store = MemStore::new();
        let alice = store.add_user("Alice", "A").await;
        let bob = store.add_user("Bob", "B").await;
        let id = send_request(&store, &new_request(alice, bob)).await.unwrap();

        let accept = AcceptRequest {
            id,
            requester_id: alice,
            requester_name: String::from("Alice A"),
            receiver_id: bob,
            receiver_name: String::from("Bob B"),
        };
        accept_request(&store, &accept).await.unwrap();
        assert_eq!(store.request(id).await.unwrap().status, RequestStatus::Accepted);

        // both sides recorded, in receiver-then-requester order
        let alice_doc = store.fetch_user(alice).await.unwrap().unwrap();
        let bob_doc = store.fetch_user(bob).await.unwrap().unwrap();
        assert_eq!(alice_doc.friends, vec![bob]);
        assert_eq!(bob_doc.friends, vec![alice]);
        assert_eq!(
            alice_doc.notifications.last().unwrap().message,
            "Your friend request was accepted by Bob B"
        );
        assert_eq!(
            bob_doc.notifications.last().unwrap().message,
            "You have accepted friend request of Alice A"
        );

        // a second accept is another forward-only write, status stays Accepted
        accept_request(&store, &accept).await.unwrap();
        assert_eq!(store.request(id).await.unwrap().status, RequestStatus::Accepted);
    }

    #[tokio::test]
    async fn failed_second_write_leaves_tolerated_asymmetry() {
        let store = MemStore::new();
        let alice = store.add_user("Alice", "A").await;
        let bob = store.add_user("Bob", "B").await;
        let id = send_request(&store, &new_request(alice, bob)).await.unwrap();

        // writes: 1 = status update, 2 = bob's add_friend, 3 = alice's (fails)
        store.fail_writes_after(2).await;
        let accept = AcceptRequest {
            id,
            requester_id: alice,
            requester_name: String::from("Alice A"),
            receiver_id: bob,
            receiver_name: String::from("Bob B"),
        };
        accept_request(&store, &accept)
            .await
            .expect("best-effort failure must not surface");
        store.heal().await;

        assert_eq!(store.request(id).await.unwrap().status, RequestStatus::Accepted);
        let bob_doc = store.fetch_user(bob).await.unwrap().unwrap();
        let alice_doc = store.fetch_user(alice).await.unwrap().unwrap();
        assert_eq!(bob_doc.friends, vec![alice]);
        assert!(!alice_doc.friends.contains(&bob));
    }

    #[tokio::test]
    async fn failed_primary_write_surfaces() {
        let store = MemStore::new();
        let alice = store.add_user("Alice", "A").await;
        let bob = store.add_user("Bob", "B").await;

        store.fail_writes_after(0).await;
        assert!(send_request(&store, &new_request(alice, bob)).await.is_err());
    }
}
