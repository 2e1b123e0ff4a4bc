use serde::{Deserialize, Serialize};
use sqlx::types::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

/// One cart line: quantity plus the unit price snapshotted when the product
/// was first added. Later catalog price changes do not affect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Session-scoped shopping cart.
///
/// A typed map from product id to entry, with a dirty flag instead of
/// implicit session mutation: callers persist the cart to the session store
/// only when `is_modified` reports a change.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    entries: BTreeMap<Uuid, CartEntry>,
    modified: bool,
}

impl Cart {
    /// Deserialize from the session blob. A missing or malformed blob yields
    /// an empty cart; zero-quantity entries are dropped on load.
    pub fn from_session(value: Option<serde_json::Value>) -> Self {
        let entries = value
            .and_then(|v| serde_json::from_value::<BTreeMap<Uuid, CartEntry>>(v).ok())
            .unwrap_or_default();
        Self {
            entries: entries.into_iter().filter(|(_, e)| e.quantity > 0).collect(),
            modified: false,
        }
    }

    /// Serialize for the session store.
    pub fn to_session(&self) -> serde_json::Value {
        serde_json::to_value(&self.entries).unwrap_or_else(|_| serde_json::json!({}))
    }

    /// Add a product or update its quantity.
    ///
    /// The price snapshot is taken on first insert only. With
    /// `override_quantity` the given quantity replaces the current one,
    /// otherwise it is added. Stock validation is the caller's job.
    pub fn add(
        &mut self,
        product_id: Uuid,
        unit_price: Decimal,
        quantity: u32,
        override_quantity: bool,
    ) {
        let entry = self.entries.entry(product_id).or_insert(CartEntry {
            quantity: 0,
            unit_price,
        });
        if override_quantity {
            entry.quantity = quantity;
        } else {
            entry.quantity += quantity;
        }
        if entry.quantity == 0 {
            self.entries.remove(&product_id);
        }
        self.modified = true;
    }

    /// Remove a product line. No-op (and not a modification) when absent.
    pub fn remove(&mut self, product_id: Uuid) -> bool {
        let removed = self.entries.remove(&product_id).is_some();
        if removed {
            self.modified = true;
        }
        removed
    }

    /// Total item count: the sum of quantities over all lines.
    pub fn len(&self) -> u32 {
        self.entries.values().map(|e| e.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cart total from the stored price snapshots.
    pub fn total_price(&self) -> Decimal {
        self.entries
            .values()
            .map(|e| e.unit_price * Decimal::from(e.quantity))
            .sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.modified = true;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Uuid, &CartEntry)> {
        self.entries.iter()
    }

    pub fn get(&self, product_id: Uuid) -> Option<&CartEntry> {
        self.entries.get(&product_id)
    }

    pub fn product_ids(&self) -> Vec<Uuid> {
        self.entries.keys().copied().collect()
    }
}
