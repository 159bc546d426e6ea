use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{self, request},
};
use tomodo_api::{AuthToken, DocumentStore, TokenVerifier, UserProfile, Uuid};

use crate::{Error, Presence, Rooms};

pub type Store = Arc<dyn DocumentStore>;
pub type Verifier = Arc<dyn TokenVerifier>;

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub store: Store,
    pub verifier: Verifier,
    pub presence: Presence,
    pub rooms: Rooms,
}

pub struct PreAuth(pub AuthToken);

#[async_trait]
impl<S: Sync> FromRequestParts<S> for PreAuth {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, _state: &S) -> Result<PreAuth, Error> {
        match req.headers.get(http::header::AUTHORIZATION) {
            None => Err(Error::auth_failed()),
            Some(auth) => {
                let auth = auth.to_str().map_err(|_| Error::auth_failed())?;
                let mut auth = auth.split(' ');
                if !auth
                    .next()
                    .ok_or(Error::auth_failed())?
                    .eq_ignore_ascii_case("bearer")
                {
                    return Err(Error::auth_failed());
                }
                let token = auth.next().ok_or(Error::auth_failed())?;
                if !auth.next().is_none() {
                    return Err(Error::auth_failed());
                }
                let token = Uuid::try_from(token).map_err(|_| Error::auth_failed())?;
                Ok(PreAuth(AuthToken(token)))
            }
        }
    }
}

pub struct Auth(pub UserProfile);

#[async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, state: &AppState) -> Result<Auth, Error> {
        let token = PreAuth::from_request_parts(req, state).await?.0;
        Ok(Auth(state.verifier.verify(token).await?))
    }
}
