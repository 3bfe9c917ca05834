//! SQL DDL for initializing the credential storage.

/// SQLite schema with:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT, also the tie-break for duplicates
/// - `screen_name` indexed but not UNIQUE, so legacy duplicate rows stay readable
/// - `updated_at` TEXT (RFC3339)
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS user_credentials (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    screen_name TEXT NOT NULL,
    access_token TEXT NOT NULL,
    access_secret TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_user_credentials_screen_name ON user_credentials(screen_name);
"#;
