//! In-process [`CredentialGateway`] implementation for tests and local runs.

use crate::db::models::{NewCredential, UserCredential};
use crate::service::gateway::{CredentialGateway, GatewayFuture, pick_first};
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    rows: Arc<RwLock<Vec<UserCredential>>>,
    lookups: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Same association rule as the SQLite storage: update every row for the
    /// name, insert only when none exists.
    pub fn save(&self, cred: NewCredential) -> i64 {
        let now = Utc::now();
        let mut rows = self.rows.write();
        let mut first_id = None;
        for row in rows.iter_mut().filter(|r| r.screen_name == cred.screen_name) {
            row.access_token = cred.access_token.clone();
            row.access_secret = cred.access_secret.clone();
            row.updated_at = now;
            first_id.get_or_insert(row.id);
        }
        if let Some(id) = first_id {
            return id;
        }
        Self::push(&mut rows, cred)
    }

    /// Append a row even when the name already exists.
    pub fn insert_duplicate(&self, cred: NewCredential) -> i64 {
        Self::push(&mut self.rows.write(), cred)
    }

    /// Number of lookups served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn push(rows: &mut Vec<UserCredential>, cred: NewCredential) -> i64 {
        let id = rows.last().map_or(1, |r| r.id + 1);
        rows.push(UserCredential {
            id,
            screen_name: cred.screen_name,
            access_token: cred.access_token,
            access_secret: cred.access_secret,
            updated_at: Utc::now(),
        });
        id
    }
}

impl CredentialGateway for MemoryStore {
    fn lookup<'a>(&'a self, screen_name: &'a str) -> GatewayFuture<'a, Option<UserCredential>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let matches: Vec<UserCredential> = self
            .rows
            .read()
            .iter()
            .filter(|r| r.screen_name == screen_name)
            .cloned()
            .collect();
        Box::pin(async move { Ok(pick_first(screen_name, matches)) })
    }
}
