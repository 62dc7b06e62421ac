//! # Price Book Repository
//!
//! A price book groups the rules for one channel, branch or customer group.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vetpos_core::PriceBook;

#[derive(Debug, sqlx::FromRow)]
struct PriceBookRow {
    id: i64,
    name: String,
    is_active: bool,
}

impl From<PriceBookRow> for PriceBook {
    fn from(row: PriceBookRow) -> Self {
        PriceBook {
            id: row.id,
            name: row.name,
            is_active: row.is_active,
        }
    }
}

/// Repository for price book operations.
#[derive(Debug, Clone)]
pub struct PriceBookRepository {
    pool: SqlitePool,
}

impl PriceBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PriceBookRepository { pool }
    }

    /// Gets a price book by id, active or not.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<PriceBook>> {
        debug!(price_book_id = id, "Fetching price book");

        let row = sqlx::query_as::<_, PriceBookRow>(
            "SELECT id, name, is_active FROM price_books WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PriceBook::from))
    }

    /// Inserts a new active price book and returns it with its assigned id.
    pub async fn insert(&self, name: &str) -> DbResult<PriceBook> {
        debug!(name = %name, "Inserting price book");

        let result = sqlx::query("INSERT INTO price_books (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(PriceBook {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            is_active: true,
        })
    }

    /// Activates or deactivates a price book.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No such price book
    pub async fn set_active(&self, id: i64, is_active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE price_books SET is_active = ?1 WHERE id = ?2")
            .bind(is_active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PriceBook", id.to_string()));
        }

        Ok(())
    }
}
