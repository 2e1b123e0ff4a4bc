use serde::{Deserialize, Serialize};
use sqlx::types::Decimal;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub category_id: Uuid,
    pub description: String,
    pub npk_ratio: Option<String>,
    pub dosage_info: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub available: bool,
    pub image: Option<String>,
    pub created_at: OffsetDateTime,
}

const PRODUCT_COLUMNS: &str = "id, name, slug, category_id, description, npk_ratio, \
     dosage_info, price, stock, available, image, created_at";

impl Category {
    pub async fn list(db: &PgPool, limit: Option<i64>) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, slug, description, created_at
            FROM categories
            ORDER BY name
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_slug(db: &PgPool, slug: &str) -> anyhow::Result<Option<Category>> {
        let row = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, slug, description, created_at
            FROM categories
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }
}

impl Product {
    /// Newest available products, for the homepage.
    pub async fn featured(db: &PgPool, limit: i64) -> anyhow::Result<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE available ORDER BY created_at DESC LIMIT $1"
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    pub async fn list_available(
        db: &PgPool,
        category_id: Option<Uuid>,
    ) -> anyhow::Result<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE available AND ($1::uuid IS NULL OR category_id = $1) \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(category_id)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    pub async fn find_available_by_slug(db: &PgPool, slug: &str) -> anyhow::Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1 AND available");
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(slug)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    /// Batched lookup used by the cart enrichment. Unknown ids are simply
    /// absent from the result.
    pub async fn by_ids(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(ids)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    /// Other available products from the same category.
    pub async fn related(
        db: &PgPool,
        category_id: Uuid,
        exclude: Uuid,
        limit: i64,
    ) -> anyhow::Result<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE category_id = $1 AND available AND id <> $2 \
             ORDER BY created_at DESC LIMIT $3"
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(category_id)
            .bind(exclude)
            .bind(limit)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }
}
