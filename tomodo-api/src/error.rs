use serde_json::json;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Persistence failure [{code}]")]
    PersistenceFailed { code: String },
}

impl Error {
    pub fn persistence(code: &str) -> Error {
        Error::PersistenceFailed {
            code: String::from(code),
        }
    }

    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            Error::PersistenceFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::AuthenticationFailed => json!({
                "message": "authentication failed",
                "type": "auth-failed",
            }),
            Error::PersistenceFailed { code } => json!({
                "message": "document store failure, see logs for details",
                "type": "persistence",
                "code": code,
            }),
        })
        .expect("serializing error contents")
    }
}
