use crate::db::models::{NewCredential, UserCredential};
use crate::db::schema::SQLITE_INIT;
use crate::error::RetrieverError;
use crate::service::gateway::{CredentialGateway, GatewayFuture, pick_first};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct CredentialsStorage {
    pool: SqlitePool,
}

impl CredentialsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool on `database_url`, creating the database file if needed.
    pub async fn connect(database_url: &str) -> Result<Self, RetrieverError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), RetrieverError> {
        // execute multiple statements one by one (sqlx::query takes a single statement)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// All rows for `screen_name`, oldest first.
    ///
    /// The pooled connection is held only for the duration of the query and is
    /// returned to the pool when the guard drops, on success or failure.
    pub async fn find_by_screen_name(
        &self,
        screen_name: &str,
    ) -> Result<Vec<UserCredential>, RetrieverError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, UserCredential>(
            r#"SELECT id, screen_name, access_token, access_secret, updated_at
               FROM user_credentials WHERE screen_name = ? ORDER BY id"#,
        )
        .bind(screen_name)
        .fetch_all(&mut *conn)
        .await?;
        debug!(screen_name, count = rows.len(), "queried user credentials");
        Ok(rows)
    }

    /// Associate a token pair with a screen name. Returns the row id that
    /// subsequent lookups resolve to.
    ///
    /// Every existing row for the name is updated so duplicates cannot shadow the
    /// new pair; a row is inserted only when none exists.
    pub async fn save(&self, cred: NewCredential) -> Result<i64, RetrieverError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"UPDATE user_credentials SET
                access_token = ?,
                access_secret = ?,
                updated_at = ?
              WHERE screen_name = ?"#,
        )
        .bind(&cred.access_token)
        .bind(&cred.access_secret)
        .bind(now)
        .bind(&cred.screen_name)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            sqlx::query(
                r#"INSERT INTO user_credentials (
                    screen_name, access_token, access_secret, updated_at
                ) VALUES (?, ?, ?, ?)"#,
            )
            .bind(&cred.screen_name)
            .bind(&cred.access_token)
            .bind(&cred.access_secret)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let rec: (i64,) = sqlx::query_as(
            "SELECT id FROM user_credentials WHERE screen_name = ? ORDER BY id LIMIT 1",
        )
        .bind(&cred.screen_name)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rec.0)
    }

    /// Batch save in input order. Returns the resolved ids in the same order.
    pub async fn save_many(&self, items: Vec<NewCredential>) -> Result<Vec<i64>, RetrieverError> {
        let mut ids = Vec::with_capacity(items.len());
        for cred in items {
            ids.push(self.save(cred).await?);
        }
        Ok(ids)
    }
}

impl CredentialGateway for CredentialsStorage {
    fn lookup<'a>(&'a self, screen_name: &'a str) -> GatewayFuture<'a, Option<UserCredential>> {
        Box::pin(async move {
            let rows = self.find_by_screen_name(screen_name).await?;
            Ok(pick_first(screen_name, rows))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_storage() -> CredentialsStorage {
        // one connection: every connection to `sqlite::memory:` is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("failed to open in-memory sqlite");
        let storage = CredentialsStorage::new(pool);
        storage.init_schema().await.expect("failed to init schema");
        storage
    }

    async fn insert_raw(storage: &CredentialsStorage, name: &str, token: &str, secret: &str) {
        sqlx::query(
            "INSERT INTO user_credentials (screen_name, access_token, access_secret, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(token)
        .bind(secret)
        .bind(Utc::now())
        .execute(storage.pool())
        .await
        .expect("raw insert failed");
    }

    #[tokio::test]
    async fn lookup_returns_saved_credential() {
        let storage = memory_storage().await;
        storage
            .save(NewCredential::new("jack", "tok-1", "sec-1"))
            .await
            .expect("save failed");

        let found = storage
            .lookup("jack")
            .await
            .expect("lookup failed")
            .expect("credential should exist");
        assert_eq!(found.screen_name, "jack");
        assert_eq!(found.access_token, "tok-1");
        assert_eq!(found.access_secret, "sec-1");
    }

    #[tokio::test]
    async fn lookup_of_unknown_name_is_none() {
        let storage = memory_storage().await;
        storage
            .save(NewCredential::new("jack", "tok-1", "sec-1"))
            .await
            .expect("save failed");

        assert!(storage.lookup("biz").await.expect("lookup failed").is_none());
        // exact match only
        assert!(storage.lookup("Jack").await.expect("lookup failed").is_none());
    }

    #[tokio::test]
    async fn save_replaces_previous_pair() {
        let storage = memory_storage().await;
        let first = storage
            .save(NewCredential::new("jack", "tok-1", "sec-1"))
            .await
            .expect("first save failed");
        let second = storage
            .save(NewCredential::new("jack", "tok-2", "sec-2"))
            .await
            .expect("second save failed");
        assert_eq!(first, second);

        let found = storage
            .lookup("jack")
            .await
            .expect("lookup failed")
            .expect("credential should exist");
        assert_eq!(found.access_token, "tok-2");
        assert_eq!(found.access_secret, "sec-2");
        assert_eq!(
            storage.find_by_screen_name("jack").await.expect("query failed").len(),
            1
        );
    }

    #[tokio::test]
    async fn duplicates_resolve_to_oldest_row() {
        let storage = memory_storage().await;
        insert_raw(&storage, "jack", "tok-a", "sec-a").await;
        insert_raw(&storage, "jack", "tok-b", "sec-b").await;

        let first = storage.lookup("jack").await.expect("lookup failed");
        let again = storage.lookup("jack").await.expect("lookup failed");
        let first = first.expect("credential should exist");
        assert_eq!(first.access_token, "tok-a");
        assert_eq!(Some(first), again);
    }

    #[tokio::test]
    async fn save_over_duplicates_updates_every_row() {
        let storage = memory_storage().await;
        insert_raw(&storage, "jack", "tok-a", "sec-a").await;
        insert_raw(&storage, "jack", "tok-b", "sec-b").await;

        storage
            .save(NewCredential::new("jack", "tok-new", "sec-new"))
            .await
            .expect("save failed");

        let rows = storage.find_by_screen_name("jack").await.expect("query failed");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.access_token == "tok-new"));
    }

    #[tokio::test]
    async fn closed_pool_surfaces_database_error() {
        let storage = memory_storage().await;
        storage.pool().close().await;

        let err = storage
            .lookup("jack")
            .await
            .expect_err("lookup on a closed pool must fail");
        assert!(matches!(err, RetrieverError::DatabaseError(_)));
    }
}
