use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
                name        TEXT NOT NULL,
                role        TEXT NOT NULL,
                store_id    TEXT,
                avatar      TEXT,
                phone       TEXT,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE credentials (
                user_id         TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                password_hash   TEXT NOT NULL
            );

            CREATE TABLE stores (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                description TEXT,
                address     TEXT NOT NULL,
                lat         REAL NOT NULL,
                lng         REAL NOT NULL,
                phone       TEXT NOT NULL,
                email       TEXT,
                website     TEXT,
                url         TEXT,
                hours       TEXT,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE products (
                id          TEXT PRIMARY KEY,
                store_id    TEXT NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
                name        TEXT NOT NULL,
                description TEXT NOT NULL,
                category    TEXT NOT NULL,
                condition   TEXT NOT NULL,
                price       REAL NOT NULL,
                images      TEXT NOT NULL DEFAULT '[]',
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_products_store_id ON products(store_id);
            CREATE INDEX idx_products_category ON products(category);

            CREATE TABLE favorites (
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                item_id     TEXT NOT NULL,
                type        TEXT NOT NULL,
                name        TEXT NOT NULL,
                address     TEXT,
                image       TEXT,
                price       REAL,
                position    INTEGER NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (user_id, item_id, type)
            );

            CREATE INDEX idx_favorites_user_id ON favorites(user_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
