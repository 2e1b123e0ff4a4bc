use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{repo::User, services::AuthUser},
    cart::{extractors::CartSession, services as cart_services},
    orders::{
        dto::{
            CheckoutErrorBody, CheckoutForm, CheckoutPrefill, OrderDetailResponse, OrderSummary,
            PlacedOrderResponse,
        },
        repo::Order,
        services::{place_order, CheckoutError},
    },
    state::AppState,
};

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(checkout_preview).post(checkout))
        .route("/checkout/success/:order_id", get(checkout_success))
        .route("/orders", get(order_history))
        .route("/orders/:order_id", get(order_detail))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[instrument(skip(state, session))]
pub async fn checkout_preview(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    session: CartSession,
) -> Result<Json<CheckoutPrefill>, (StatusCode, String)> {
    let cart = cart_services::load(&state, &session)
        .await
        .map_err(internal)?;
    if cart.is_empty() {
        warn!(%user_id, "checkout with empty cart");
        return Err((StatusCode::CONFLICT, "Your cart is empty.".into()));
    }

    let lines = cart_services::lines(&state.db, &cart)
        .await
        .map_err(internal)?;
    let email = User::find_by_id(&state.db, user_id)
        .await
        .map_err(internal)?
        .map(|u| u.email)
        .unwrap_or_default();

    Ok(Json(CheckoutPrefill {
        total_price: cart.total_price(),
        count: cart.len(),
        lines,
        email,
    }))
}

#[instrument(skip(state, session, form))]
pub async fn checkout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    session: CartSession,
    Json(form): Json<CheckoutForm>,
) -> Result<(StatusCode, HeaderMap, Json<PlacedOrderResponse>), (StatusCode, Json<CheckoutErrorBody>)>
{
    let cart = cart_services::load(&state, &session)
        .await
        .map_err(|e| checkout_internal(&e))?;

    let order = match place_order(&state.db, user_id, &cart, form).await {
        Ok(order) => order,
        Err(e) => return Err(checkout_error(user_id, e)),
    };

    // Drop the cart's backing store; a failure here must not undo the order.
    if let Err(e) = state.sessions.delete(session.id).await {
        error!(error = %e, order_id = %order.id, "failed to clear cart session");
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        header::LOCATION,
        format!("/checkout/success/{}", order.id)
            .parse()
            .expect("valid header value"),
    );

    Ok((
        StatusCode::CREATED,
        headers,
        Json(PlacedOrderResponse {
            id: order.id,
            total_price: order.total_price,
            message: "Your order has been placed successfully!".into(),
        }),
    ))
}

fn checkout_internal<E: std::fmt::Display>(e: &E) -> (StatusCode, Json<CheckoutErrorBody>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(CheckoutErrorBody {
            message: e.to_string(),
            field_errors: None,
        }),
    )
}

fn checkout_error(user_id: Uuid, e: CheckoutError) -> (StatusCode, Json<CheckoutErrorBody>) {
    let message = e.to_string();
    match e {
        CheckoutError::EmptyCart => {
            warn!(%user_id, "checkout with empty cart");
            (
                StatusCode::CONFLICT,
                Json(CheckoutErrorBody {
                    message,
                    field_errors: None,
                }),
            )
        }
        CheckoutError::Validation(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(CheckoutErrorBody {
                message,
                field_errors: Some(errors),
            }),
        ),
        CheckoutError::InsufficientStock { .. } => {
            warn!(%user_id, %message, "checkout stock conflict");
            (
                StatusCode::CONFLICT,
                Json(CheckoutErrorBody {
                    message,
                    field_errors: None,
                }),
            )
        }
        CheckoutError::Db(e) => {
            error!(error = %e, %user_id, "checkout transaction failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CheckoutErrorBody {
                    message: "Order could not be placed.".into(),
                    field_errors: None,
                }),
            )
        }
    }
}

#[instrument(skip(state))]
pub async fn checkout_success(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetailResponse>, (StatusCode, String)> {
    load_order_detail(&state, user_id, order_id).await
}

#[instrument(skip(state))]
pub async fn order_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<OrderSummary>>, (StatusCode, String)> {
    let orders = Order::list_by_user(&state.db, user_id)
        .await
        .map_err(internal)?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn order_detail(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetailResponse>, (StatusCode, String)> {
    load_order_detail(&state, user_id, order_id).await
}

async fn load_order_detail(
    state: &AppState,
    user_id: Uuid,
    order_id: Uuid,
) -> Result<Json<OrderDetailResponse>, (StatusCode, String)> {
    let order = Order::find_for_user(&state.db, order_id, user_id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Order not found".to_string()))?;
    let items = Order::items(&state.db, order.id).await.map_err(internal)?;
    Ok(Json(OrderDetailResponse::from_parts(order, items)))
}
