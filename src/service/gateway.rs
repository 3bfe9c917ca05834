use crate::db::models::UserCredential;
use crate::error::RetrieverError;
use futures::future::BoxFuture;
use tracing::{debug, warn};

pub type GatewayFuture<'a, T> = BoxFuture<'a, Result<T, RetrieverError>>;

/// Read side of the credential store.
///
/// `Ok(None)` means no credential is registered for the name; store failures
/// are `Err` and must never be folded into `None`.
pub trait CredentialGateway: Send + Sync {
    fn lookup<'a>(&'a self, screen_name: &'a str) -> GatewayFuture<'a, Option<UserCredential>>;
}

/// Resolve the matches of one exact-name query to a single record.
///
/// At most one row should exist per name. When several do, the first in
/// query order wins and the anomaly is logged.
pub(crate) fn pick_first(
    screen_name: &str,
    matches: Vec<UserCredential>,
) -> Option<UserCredential> {
    if matches.len() > 1 {
        warn!(
            screen_name,
            count = matches.len(),
            "duplicate credential records; using the oldest"
        );
    }
    let picked = matches.into_iter().next();
    if let Some(cred) = picked.as_ref() {
        debug!(screen_name, id = cred.id, "resolved user credential");
    }
    picked
}
