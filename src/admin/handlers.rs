use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    admin::{
        dto::{AdminCategory, AdminListResponse, AdminOrder, AdminOrderRow, AdminProduct, AdminProductRow},
        extractors::AdminUser,
    },
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/products", get(admin_products))
        .route("/admin/orders", get(admin_orders))
        .route("/admin/categories", get(admin_categories))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[instrument(skip(state))]
pub async fn admin_products(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<AdminListResponse<AdminProduct>>, (StatusCode, String)> {
    let rows = sqlx::query_as::<_, AdminProductRow>(
        r#"
        SELECT p.id, p.name, c.name AS category_name, p.npk_ratio,
               p.price, p.stock, p.available, p.created_at
        FROM products p
        JOIN categories c ON c.id = p.category_id
        ORDER BY p.created_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await
    .map_err(internal)?;

    Ok(Json(AdminListResponse {
        site: state.config.site.name.clone(),
        rows: rows.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn admin_orders(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<AdminListResponse<AdminOrder>>, (StatusCode, String)> {
    let rows = sqlx::query_as::<_, AdminOrderRow>(
        r#"
        SELECT id, status, first_name, last_name, email, phone, total_price, created_at
        FROM orders
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await
    .map_err(internal)?;

    Ok(Json(AdminListResponse {
        site: state.config.site.name.clone(),
        rows: rows.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn admin_categories(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<AdminListResponse<AdminCategory>>, (StatusCode, String)> {
    let rows = sqlx::query_as::<_, AdminCategory>(
        r#"
        SELECT c.id, c.name, c.slug, COUNT(p.id) AS product_count, c.created_at
        FROM categories c
        LEFT JOIN products p ON p.category_id = c.id
        GROUP BY c.id, c.name, c.slug, c.created_at
        ORDER BY c.name
        "#,
    )
    .fetch_all(&state.db)
    .await
    .map_err(internal)?;

    Ok(Json(AdminListResponse {
        site: state.config.site.name.clone(),
        rows,
    }))
}
