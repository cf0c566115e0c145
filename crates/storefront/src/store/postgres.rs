//! `PostgreSQL` document store.
//!
//! All collections share one table:
//!
//! ```sql
//! storefront.documents (seq BIGSERIAL, collection TEXT, id TEXT, data JSONB, ...)
//! ```
//!
//! `seq` preserves insertion order for `list`. Queries are built at runtime
//! because the filter field is dynamic.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};

use super::{
    Collection, Document, DocumentStore, Filter, StoreError, ensure_object, new_document_id,
};

/// Document store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the storefront migrations.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Migration` if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a unique-index violation to [`StoreError::Duplicate`].
fn write_error(collection: Collection, err: sqlx::Error) -> StoreError {
    if let (sqlx::Error::Database(db), Some(field)) = (&err, collection.unique_field()) {
        if db.is_unique_violation() {
            return StoreError::Duplicate { collection, field };
        }
    }
    StoreError::Database(err)
}

fn row_to_document(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
    Ok(Document {
        id: row.try_get("id")?,
        data: row.try_get("data")?,
    })
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn list(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = match filter {
            Filter::All => {
                sqlx::query(
                    r"
                    SELECT id, data
                    FROM storefront.documents
                    WHERE collection = $1
                    ORDER BY seq
                    ",
                )
                .bind(collection.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            Filter::Eq { field, value } => {
                sqlx::query(
                    r"
                    SELECT id, data
                    FROM storefront.documents
                    WHERE collection = $1 AND data @> jsonb_build_object($2::text, $3::jsonb)
                    ORDER BY seq
                    ",
                )
                .bind(collection.as_str())
                .bind(field)
                .bind(sqlx::types::Json(value))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(row_to_document).collect()
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, data
            FROM storefront.documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_document).transpose()
    }

    async fn put(&self, collection: Collection, id: &str, data: Value) -> Result<(), StoreError> {
        ensure_object(&data)?;
        sqlx::query(
            r"
            INSERT INTO storefront.documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(sqlx::types::Json(&data))
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(collection, e))?;
        Ok(())
    }

    async fn add(&self, collection: Collection, data: Value) -> Result<String, StoreError> {
        ensure_object(&data)?;
        let id = new_document_id();
        sqlx::query(
            r"
            INSERT INTO storefront.documents (collection, id, data)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(collection.as_str())
        .bind(&id)
        .bind(sqlx::types::Json(&data))
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(collection, e))?;
        Ok(id)
    }

    async fn patch(
        &self,
        collection: Collection,
        id: &str,
        fields: Value,
    ) -> Result<(), StoreError> {
        ensure_object(&fields)?;
        let result = sqlx::query(
            r"
            UPDATE storefront.documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(sqlx::types::Json(&fields))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_owned(),
            });
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM storefront.documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
