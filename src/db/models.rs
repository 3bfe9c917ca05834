use crate::oauth::credentials::AccessToken;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;
use std::fmt;

/// Stored OAuth token pair for one screen name.
#[derive(Clone, PartialEq, FromRow)]
pub struct UserCredential {
    pub id: i64,
    pub screen_name: String,
    pub access_token: String,
    pub access_secret: String,
    pub updated_at: DateTime<Utc>,
}

impl UserCredential {
    /// Token pair used to sign requests on this user's behalf.
    pub fn token(&self) -> AccessToken {
        AccessToken::new(self.access_token.clone(), self.access_secret.clone())
    }
}

impl fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredential")
            .field("id", &self.id)
            .field("screen_name", &self.screen_name)
            .field("access_token", &"<redacted>")
            .field("access_secret", &"<redacted>")
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Registration payload: a token pair to associate with a screen name.
#[derive(Clone, Deserialize)]
pub struct NewCredential {
    pub screen_name: String,
    pub access_token: String,
    pub access_secret: String,
}

impl NewCredential {
    pub fn new(
        screen_name: impl Into<String>,
        access_token: impl Into<String>,
        access_secret: impl Into<String>,
    ) -> Self {
        Self {
            screen_name: screen_name.into(),
            access_token: access_token.into(),
            access_secret: access_secret.into(),
        }
    }
}

impl fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewCredential")
            .field("screen_name", &self.screen_name)
            .finish_non_exhaustive()
    }
}
