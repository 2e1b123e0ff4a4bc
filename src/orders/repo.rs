use serde::{Deserialize, Serialize};
use sqlx::types::Decimal;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Lifecycle of an order. Stored as lowercase text; orders are created
/// `pending` and only staff move them forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Durable order record. `total_price` is the cart total snapshotted at
/// checkout and never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub total_price: Decimal,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// One order line joined with its product's current name. The product
/// reference is not owning, so the name can be gone.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItemDetail {
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub price: Decimal,
}

const ORDER_COLUMNS: &str = "id, user_id, status, first_name, last_name, email, phone, \
     address, city, postal_code, total_price, created_at, updated_at";

impl Order {
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    /// Scoped lookup: an order is only visible to the user who placed it.
    pub async fn find_for_user(
        db: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2");
        let row = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    pub async fn items(db: &PgPool, order_id: Uuid) -> anyhow::Result<Vec<OrderItemDetail>> {
        let rows = sqlx::query_as::<_, OrderItemDetail>(
            r#"
            SELECT oi.product_id, p.name AS product_name, oi.quantity, oi.price
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_roundtrip() {
        for s in ["pending", "processing", "shipped", "delivered", "cancelled"] {
            assert_eq!(OrderStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(OrderStatus::parse("refunded").is_none());
    }
}
