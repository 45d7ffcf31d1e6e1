use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row, params};
use tracing::debug;

use pawnhub_types::models::{AuthUser, Favorite};

use crate::Database;
use crate::catalog::UserDirectory;
use crate::models::{FavoriteRow, UserRow, format_timestamp};
use crate::queries::OptionalExt;

const USER_COLUMNS: &str = "id, email, name, role, store_id, avatar, phone";

impl UserDirectory for Database {
    fn insert_user(&self, user: &AuthUser, password_hash: &str) -> Result<()> {
        let now = format_timestamp(&Utc::now());

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO users (id, email, name, role, store_id, avatar, phone, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    user.id,
                    user.email,
                    user.name,
                    user.role.as_str(),
                    user.store_id,
                    user.avatar,
                    user.phone,
                    now,
                ],
            )?;
            tx.execute(
                "INSERT INTO credentials (user_id, password_hash) VALUES (?1, ?2)",
                (&user.id, password_hash),
            )?;
            write_favorites(&tx, &user.id, &user.favorites)?;
            tx.commit()?;

            debug!(user_id = %user.id, role = user.role.as_str(), "Inserted user");
            Ok(())
        })
    }

    fn get_user(&self, id: &str) -> Result<Option<AuthUser>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
            load_user(conn, &sql, id)
        })
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<AuthUser>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);
            load_user(conn, &sql, email)
        })
    }

    fn save_user(&self, user: &AuthUser) -> Result<bool> {
        let now = format_timestamp(&Utc::now());

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE users
                 SET email = ?2, name = ?3, role = ?4, store_id = ?5, avatar = ?6, phone = ?7, updated_at = ?8
                 WHERE id = ?1",
                params![
                    user.id,
                    user.email,
                    user.name,
                    user.role.as_str(),
                    user.store_id,
                    user.avatar,
                    user.phone,
                    now,
                ],
            )?;
            if changed == 0 {
                return Ok(false);
            }

            write_favorites(&tx, &user.id, &user.favorites)?;
            tx.commit()?;

            debug!(user_id = %user.id, favorites = user.favorites.len(), "Saved user");
            Ok(true)
        })
    }

    fn get_password_hash(&self, user_id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT password_hash FROM credentials WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )
            .optional()
        })
    }
}

fn user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        role: row.get(3)?,
        store_id: row.get(4)?,
        avatar: row.get(5)?,
        phone: row.get(6)?,
    })
}

fn load_user(conn: &Connection, sql: &str, key: &str) -> Result<Option<AuthUser>> {
    let mut stmt = conn.prepare(sql)?;
    let Some(row) = stmt.query_row([key], user_row).optional()? else {
        return Ok(None);
    };

    let favorites = query_favorites(conn, &row.id)?;
    row.into_user(favorites).map(Some)
}

fn query_favorites(conn: &Connection, user_id: &str) -> Result<Vec<Favorite>> {
    let mut stmt = conn.prepare(
        "SELECT item_id, type, name, address, image, price
         FROM favorites
         WHERE user_id = ?1
         ORDER BY position",
    )?;

    let rows = stmt
        .query_map([user_id], |row| {
            Ok(FavoriteRow {
                item_id: row.get(0)?,
                kind: row.get(1)?,
                name: row.get(2)?,
                address: row.get(3)?,
                image: row.get(4)?,
                price: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter().map(FavoriteRow::into_favorite).collect()
}

/// Replace a user's favorites with `favorites`, keeping `created_at` for
/// entries that survive.
fn write_favorites(conn: &Connection, user_id: &str, favorites: &[Favorite]) -> Result<()> {
    conn.execute(
        "UPDATE favorites SET position = -1 WHERE user_id = ?1",
        [user_id],
    )?;

    let mut stmt = conn.prepare(
        "INSERT INTO favorites (user_id, item_id, type, name, address, image, price, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT (user_id, item_id, type) DO UPDATE SET
             name = excluded.name,
             address = excluded.address,
             image = excluded.image,
             price = excluded.price,
             position = excluded.position",
    )?;
    for (position, fav) in favorites.iter().enumerate() {
        stmt.execute(params![
            user_id,
            fav.id,
            fav.kind.as_str(),
            fav.name,
            fav.address,
            fav.image,
            fav.price,
            position as i64,
        ])?;
    }

    conn.execute(
        "DELETE FROM favorites WHERE user_id = ?1 AND position < 0",
        [user_id],
    )?;
    Ok(())
}
