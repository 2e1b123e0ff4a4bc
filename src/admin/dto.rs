use serde::Serialize;
use sqlx::types::Decimal;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::orders::repo::OrderStatus;

/// Stock level presentation: label plus badge color.
pub fn stock_status(stock: i32) -> (&'static str, &'static str) {
    if stock == 0 {
        ("Out of Stock", "red")
    } else if stock < 10 {
        ("Low Stock", "orange")
    } else {
        ("In Stock", "green")
    }
}

/// Badge color for an order status, `#999` for anything unrecognized.
pub fn status_badge_color(status: &str) -> &'static str {
    match OrderStatus::parse(status) {
        Some(OrderStatus::Pending) => "#FFA500",
        Some(OrderStatus::Processing) => "#2196F3",
        Some(OrderStatus::Shipped) => "#9C27B0",
        Some(OrderStatus::Delivered) => "#4CAF50",
        Some(OrderStatus::Cancelled) => "#F44336",
        None => "#999",
    }
}

#[derive(Debug, FromRow)]
pub struct AdminProductRow {
    pub id: Uuid,
    pub name: String,
    pub category_name: String,
    pub npk_ratio: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub available: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct AdminProduct {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub npk_ratio: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub stock_status: &'static str,
    pub stock_color: &'static str,
    pub available: bool,
    pub created_at: OffsetDateTime,
}

impl From<AdminProductRow> for AdminProduct {
    fn from(r: AdminProductRow) -> Self {
        let (stock_status, stock_color) = stock_status(r.stock);
        Self {
            id: r.id,
            name: r.name,
            category: r.category_name,
            npk_ratio: r.npk_ratio,
            price: r.price,
            stock: r.stock,
            stock_status,
            stock_color,
            available: r.available,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct AdminOrderRow {
    pub id: Uuid,
    pub status: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub total_price: Decimal,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct AdminOrder {
    pub id: Uuid,
    pub status: String,
    pub status_color: &'static str,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub total_price: Decimal,
    pub created_at: OffsetDateTime,
}

impl From<AdminOrderRow> for AdminOrder {
    fn from(r: AdminOrderRow) -> Self {
        Self {
            id: r.id,
            status_color: status_badge_color(&r.status),
            status: r.status,
            customer_name: format!("{} {}", r.first_name, r.last_name),
            email: r.email,
            phone: r.phone,
            total_price: r.total_price,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize, FromRow)]
pub struct AdminCategory {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub product_count: i64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct AdminListResponse<T> {
    pub site: String,
    pub rows: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_status_thresholds() {
        assert_eq!(stock_status(0), ("Out of Stock", "red"));
        assert_eq!(stock_status(1), ("Low Stock", "orange"));
        assert_eq!(stock_status(9), ("Low Stock", "orange"));
        assert_eq!(stock_status(10), ("In Stock", "green"));
    }

    #[test]
    fn status_badge_colors() {
        assert_eq!(status_badge_color("pending"), "#FFA500");
        assert_eq!(status_badge_color("delivered"), "#4CAF50");
        assert_eq!(status_badge_color("garbage"), "#999");
    }
}
