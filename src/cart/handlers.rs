use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    cart::{
        dto::{AddToCartRequest, AddToCartResponse, CartView, RemoveFromCartResponse},
        extractors::CartSession,
        services,
    },
    catalog::repo::Product,
    state::AppState,
};

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart_detail))
        .route("/cart/add/:product_id", post(cart_add))
        .route("/cart/remove/:product_id", post(cart_remove))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Cookie header for the response when this request minted a new session.
fn session_headers(state: &AppState, session: &CartSession) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if session.is_new {
        headers.insert(
            header::SET_COOKIE,
            session.to_set_cookie(&state.config.site.cart_cookie),
        );
    }
    headers
}

#[instrument(skip(state, session))]
pub async fn cart_detail(
    State(state): State<AppState>,
    session: CartSession,
) -> Result<Json<CartView>, (StatusCode, String)> {
    let cart = services::load(&state, &session).await.map_err(internal)?;
    let lines = services::lines(&state.db, &cart).await.map_err(internal)?;

    Ok(Json(CartView {
        total_price: cart.total_price(),
        count: cart.len(),
        lines,
    }))
}

#[instrument(skip(state, session, body))]
pub async fn cart_add(
    State(state): State<AppState>,
    session: CartSession,
    Path(product_id): Path<Uuid>,
    Json(body): Json<AddToCartRequest>,
) -> Result<(HeaderMap, Json<AddToCartResponse>), (StatusCode, String)> {
    if body.quantity == 0 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Quantity must be at least 1.".into(),
        ));
    }

    let product = Product::find_by_id(&state.db, product_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Product not found".to_string()))?;

    // Stock check happens here, before the cart is touched.
    if body.quantity > product.stock.max(0) as u32 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Only {} units available.", product.stock),
        ));
    }

    let mut cart = services::load(&state, &session).await.map_err(internal)?;
    cart.add(
        product.id,
        product.price,
        body.quantity,
        body.override_quantity,
    );
    services::persist(&state, &session, &cart)
        .await
        .map_err(internal)?;

    info!(product_id = %product.id, quantity = body.quantity, "added to cart");

    let next = if body.redirect_to_cart {
        "/cart".to_string()
    } else {
        format!("/product/{}", product.slug)
    };

    Ok((
        session_headers(&state, &session),
        Json(AddToCartResponse {
            message: format!("{} added to cart.", product.name),
            cart_count: cart.len(),
            next,
        }),
    ))
}

#[instrument(skip(state, session))]
pub async fn cart_remove(
    State(state): State<AppState>,
    session: CartSession,
    Path(product_id): Path<Uuid>,
) -> Result<(HeaderMap, Json<RemoveFromCartResponse>), (StatusCode, String)> {
    let product = Product::find_by_id(&state.db, product_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Product not found".to_string()))?;

    let mut cart = services::load(&state, &session).await.map_err(internal)?;
    cart.remove(product.id);
    services::persist(&state, &session, &cart)
        .await
        .map_err(internal)?;

    Ok((
        session_headers(&state, &session),
        Json(RemoveFromCartResponse {
            message: format!("{} removed from cart.", product.name),
            cart_count: cart.len(),
        }),
    ))
}
