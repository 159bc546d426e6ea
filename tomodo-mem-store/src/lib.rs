use std::collections::{BTreeMap, HashMap};

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use tomodo_api::{
    AuthToken, DocumentStore, Error, FriendRequest, HistoryId, ItemHistory, ListId, Notification,
    RequestId, RequestStatus, TokenVerifier, User, UserId, UserProfile,
};

/// In-memory document store and token service.
///
/// The realtime core treats persistence and token verification as external
/// collaborators; this crate is the stand-in used by the test suite and by
/// the server when run standalone. Every operation touches a single document
/// under one lock acquisition, matching the atomicity the real store offers
/// (single-document only, no cross-document transaction).
pub struct MemStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    requests: BTreeMap<RequestId, FriendRequest>,
    history: Vec<ItemHistory>,
    sessions: HashMap<AuthToken, UserProfile>,

    /// Number of further writes to accept before failing them all, when set.
    fail_after: Option<usize>,
}

impl Inner {
    fn gate_write(&mut self) -> anyhow::Result<()> {
        match &mut self.fail_after {
            None => Ok(()),
            Some(0) => bail!("injected store failure"),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
        }
    }
}

impl MemStore {
    pub fn new() -> MemStore {
        MemStore {
            inner: Mutex::new(Inner::default()),
        }
    }

    pub async fn add_user(&self, first_name: &str, last_name: &str) -> UserId {
        let id = UserId(Uuid::new_v4());
        self.inner.lock().await.users.insert(
            id,
            User {
                id,
                first_name: String::from(first_name),
                last_name: String::from(last_name),
                email: format!(
                    "{}.{}@example.com",
                    first_name.to_lowercase(),
                    last_name.to_lowercase()
                ),
                friends: Vec::new(),
                notifications: Vec::new(),
            },
        );
        id
    }

    /// Hands out a token the [`TokenVerifier`] impl will accept for `user`.
    pub async fn issue_token(&self, user: UserId) -> AuthToken {
        let mut inner = self.inner.lock().await;
        let profile = {
            let u = inner.users.get(&user).expect("issuing token for unknown user");
            UserProfile {
                id: u.id,
                first_name: u.first_name.clone(),
                last_name: u.last_name.clone(),
            }
        };
        let token = AuthToken(Uuid::new_v4());
        inner.sessions.insert(token, profile);
        token
    }

    /// After `n` more successful writes, every write fails until
    /// [`MemStore::heal`] is called.
    pub async fn fail_writes_after(&self, n: usize) {
        self.inner.lock().await.fail_after = Some(n);
    }

    pub async fn heal(&self) {
        self.inner.lock().await.fail_after = None;
    }

    pub async fn request(&self, id: RequestId) -> Option<FriendRequest> {
        self.inner.lock().await.requests.get(&id).cloned()
    }

    pub async fn requests(&self) -> Vec<FriendRequest> {
        self.inner.lock().await.requests.values().cloned().collect()
    }

    pub async fn history_len(&self) -> usize {
        self.inner.lock().await.history.len()
    }
}

impl Default for MemStore {
    fn default() -> MemStore {
        MemStore::new()
    }
}

#[async_trait]
impl DocumentStore for MemStore {
    async fn create_request(&self, request: FriendRequest) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        inner.gate_write()?;
        if inner.requests.contains_key(&request.id) {
            bail!("request {:?} already exists", request.id);
        }
        inner.requests.insert(request.id, request);
        Ok(())
    }

    async fn set_request_status(
        &self,
        id: RequestId,
        status: RequestStatus,
    ) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        inner.gate_write()?;
        inner
            .requests
            .get_mut(&id)
            .ok_or_else(|| anyhow!("no request document {id:?}"))?
            .status = status;
        Ok(())
    }

    async fn push_notification(&self, user: UserId, n: Notification) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        inner.gate_write()?;
        inner
            .users
            .get_mut(&user)
            .ok_or_else(|| anyhow!("no user document {user:?}"))?
            .notifications
            .push(n);
        Ok(())
    }

    async fn add_friend(
        &self,
        user: UserId,
        friend: UserId,
        n: Notification,
    ) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        inner.gate_write()?;
        let u = inner
            .users
            .get_mut(&user)
            .ok_or_else(|| anyhow!("no user document {user:?}"))?;
        u.friends.push(friend);
        u.notifications.push(n);
        Ok(())
    }

    async fn fetch_user(&self, id: UserId) -> anyhow::Result<Option<User>> {
        Ok(self.inner.lock().await.users.get(&id).cloned())
    }

    async fn create_history(&self, record: ItemHistory) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        inner.gate_write()?;
        inner.history.push(record);
        Ok(())
    }

    async fn last_history_for_viewer(
        &self,
        list: ListId,
        viewer: UserId,
    ) -> anyhow::Result<Option<ItemHistory>> {
        Ok(self
            .inner
            .lock()
            .await
            .history
            .iter()
            .filter(|h| h.list_id == list && h.privileged_users.contains(&viewer))
            .max_by_key(|h| h.operated_at)
            .cloned())
    }

    async fn delete_history(&self, id: HistoryId) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        inner.gate_write()?;
        // deleting an already-gone record is not an error
        inner.history.retain(|h| h.id != id);
        Ok(())
    }
}

#[async_trait]
impl TokenVerifier for MemStore {
    async fn verify(&self, token: AuthToken) -> Result<UserProfile, Error> {
        self.inner
            .lock()
            .await
            .sessions
            .get(&token)
            .cloned()
            .ok_or(Error::AuthenticationFailed)
    }
}
