use serde::{Deserialize, Serialize};
use sqlx::types::Decimal;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::services::is_valid_email;
use crate::cart::dto::CartLine;
use crate::orders::repo::{Order, OrderItemDetail};

pub type FieldErrors = BTreeMap<String, String>;

/// Shipping and contact details submitted at checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

impl CheckoutForm {
    /// Trim all fields and collect field-level errors. Returns the
    /// normalized form on success; no state is written on failure.
    pub fn validate(mut self) -> Result<CheckoutForm, FieldErrors> {
        let mut errors = FieldErrors::new();

        for (field, value) in [
            ("first_name", &mut self.first_name),
            ("last_name", &mut self.last_name),
            ("email", &mut self.email),
            ("phone", &mut self.phone),
            ("address", &mut self.address),
            ("city", &mut self.city),
            ("postal_code", &mut self.postal_code),
        ] {
            *value = value.trim().to_string();
            if value.is_empty() {
                errors.insert(field.into(), "This field is required.".into());
            }
        }

        if !self.email.is_empty() && !is_valid_email(&self.email) {
            errors.insert("email".into(), "Enter a valid email address.".into());
        }

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(errors)
        }
    }
}

/// Pre-checkout view: the cart as it will be ordered plus an email prefill.
#[derive(Debug, Serialize)]
pub struct CheckoutPrefill {
    pub lines: Vec<CartLine>,
    pub total_price: Decimal,
    pub count: u32,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct PlacedOrderResponse {
    pub id: Uuid,
    pub total_price: Decimal,
    pub message: String,
}

/// Error body for checkout failures; `field_errors` is present only for
/// validation failures.
#[derive(Debug, Serialize)]
pub struct CheckoutErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

#[derive(Debug, Serialize)]
pub struct OrderSummary {
    pub id: Uuid,
    pub status: String,
    pub total_price: Decimal,
    pub created_at: OffsetDateTime,
}

impl From<Order> for OrderSummary {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            status: o.status,
            total_price: o.total_price,
            created_at: o.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderItemLine {
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub price: Decimal,
    pub total_price: Decimal,
}

impl From<OrderItemDetail> for OrderItemLine {
    fn from(i: OrderItemDetail) -> Self {
        Self {
            product_id: i.product_id,
            product_name: i.product_name,
            quantity: i.quantity,
            total_price: i.price * Decimal::from(i.quantity),
            price: i.price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    pub id: Uuid,
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
    pub items: Vec<OrderItemLine>,
}

impl OrderDetailResponse {
    pub fn from_parts(order: Order, items: Vec<OrderItemDetail>) -> Self {
        Self {
            id: order.id,
            status: order.status,
            first_name: order.first_name,
            last_name: order.last_name,
            email: order.email,
            phone: order.phone,
            address: order.address,
            city: order.city,
            postal_code: order.postal_code,
            total_price: order.total_price,
            created_at: order.created_at,
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}
