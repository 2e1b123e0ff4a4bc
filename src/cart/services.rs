use sqlx::types::Decimal;
use sqlx::PgPool;

use crate::cart::container::Cart;
use crate::cart::dto::CartLine;
use crate::cart::extractors::CartSession;
use crate::catalog::repo::Product;
use crate::state::AppState;

/// Load the cart behind a session, tolerating absent or malformed blobs.
/// Fresh sessions skip the store entirely.
pub async fn load(state: &AppState, session: &CartSession) -> anyhow::Result<Cart> {
    if session.is_new {
        return Ok(Cart::default());
    }
    let blob = state.sessions.load(session.id).await?;
    Ok(Cart::from_session(blob))
}

/// Write the cart back iff it was mutated (the dirty-flag half of the
/// session protocol).
pub async fn persist(state: &AppState, session: &CartSession, cart: &Cart) -> anyhow::Result<()> {
    if cart.is_modified() {
        state.sessions.save(session.id, cart.to_session()).await?;
    }
    Ok(())
}

/// Enrich cart entries with their catalog rows in one batched lookup.
///
/// Entries whose product no longer exists are silently skipped; re-calling
/// re-queries the catalog, so the view is always current.
pub async fn lines(db: &PgPool, cart: &Cart) -> anyhow::Result<Vec<CartLine>> {
    let ids = cart.product_ids();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let products = Product::by_ids(db, &ids).await?;

    let mut out = Vec::with_capacity(products.len());
    for product in products {
        let Some(entry) = cart.get(product.id) else {
            continue;
        };
        out.push(CartLine {
            quantity: entry.quantity,
            unit_price: entry.unit_price,
            total_price: entry.unit_price * Decimal::from(entry.quantity),
            product: product.into(),
        });
    }
    Ok(out)
}
