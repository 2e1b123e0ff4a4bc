use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    cart::{extractors::CartSession, services as cart_services},
    catalog::{
        dto::{HomeResponse, ProductDetailResponse, ProductListResponse},
        repo::{Category, Product},
    },
    state::AppState,
};

const FEATURED_LIMIT: i64 = 6;
const HOME_CATEGORY_LIMIT: i64 = 4;
const RELATED_LIMIT: i64 = 4;

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/products", get(product_list))
        .route("/product/:slug", get(product_detail))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
}

#[instrument(skip(state, session))]
pub async fn home(
    State(state): State<AppState>,
    session: CartSession,
) -> Result<Json<HomeResponse>, (StatusCode, String)> {
    let featured = Product::featured(&state.db, FEATURED_LIMIT)
        .await
        .map_err(internal)?;
    let categories = Category::list(&state.db, Some(HOME_CATEGORY_LIMIT))
        .await
        .map_err(internal)?;
    let cart = cart_services::load(&state, &session).await.map_err(internal)?;

    Ok(Json(HomeResponse {
        site: state.config.site.name.clone(),
        featured_products: featured.into_iter().map(Into::into).collect(),
        categories: categories.into_iter().map(Into::into).collect(),
        cart_count: cart.len(),
    }))
}

#[instrument(skip(state))]
pub async fn product_list(
    State(state): State<AppState>,
    Query(q): Query<ProductListQuery>,
) -> Result<Json<ProductListResponse>, (StatusCode, String)> {
    let category_id = match q.category.as_deref() {
        Some(slug) => {
            let category = Category::find_by_slug(&state.db, slug)
                .await
                .map_err(internal)?
                .ok_or((StatusCode::NOT_FOUND, "Category not found".to_string()))?;
            Some(category.id)
        }
        None => None,
    };

    let products = Product::list_available(&state.db, category_id)
        .await
        .map_err(internal)?;
    let categories = Category::list(&state.db, None).await.map_err(internal)?;

    Ok(Json(ProductListResponse {
        products: products.into_iter().map(Into::into).collect(),
        categories: categories.into_iter().map(Into::into).collect(),
        selected_category: q.category,
    }))
}

#[instrument(skip(state))]
pub async fn product_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetailResponse>, (StatusCode, String)> {
    let product = Product::find_available_by_slug(&state.db, &slug)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Product not found".to_string()))?;

    let related = Product::related(&state.db, product.category_id, product.id, RELATED_LIMIT)
        .await
        .map_err(internal)?;

    Ok(Json(ProductDetailResponse {
        product: product.into(),
        related_products: related.into_iter().map(Into::into).collect(),
    }))
}
