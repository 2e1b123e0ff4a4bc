use serde::Serialize;
use sqlx::types::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::catalog::repo::{Category, Product};

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
}

impl From<Category> for CategorySummary {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    pub stock: i32,
    pub npk_ratio: Option<String>,
    pub image: Option<String>,
}

impl From<Product> for ProductSummary {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            slug: p.slug,
            price: p.price,
            stock: p.stock,
            npk_ratio: p.npk_ratio,
            image: p.image,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub category_id: Uuid,
    pub description: String,
    pub npk_ratio: Option<String>,
    pub dosage_info: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub image: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<Product> for ProductDetail {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            slug: p.slug,
            category_id: p.category_id,
            description: p.description,
            npk_ratio: p.npk_ratio,
            dosage_info: p.dosage_info,
            price: p.price,
            stock: p.stock,
            image: p.image,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub site: String,
    pub featured_products: Vec<ProductSummary>,
    pub categories: Vec<CategorySummary>,
    pub cart_count: u32,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductSummary>,
    pub categories: Vec<CategorySummary>,
    pub selected_category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetailResponse {
    pub product: ProductDetail,
    pub related_products: Vec<ProductSummary>,
}
