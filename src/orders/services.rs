use sqlx::types::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::cart::container::{Cart, CartEntry};
use crate::orders::dto::{CheckoutForm, FieldErrors};
use crate::orders::repo::Order;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Your cart is empty.")]
    EmptyCart,
    #[error("Please correct the errors below.")]
    Validation(FieldErrors),
    #[error("Only {available} units of {name} available.")]
    InsufficientStock { name: String, available: i32 },
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[derive(Debug)]
struct OrderLine {
    product_id: Uuid,
    quantity: i32,
    price: Decimal,
}

/// Turn locked product rows into order lines and a total.
///
/// Each element pairs a cart entry with the `(name, stock)` read under lock,
/// `None` when the product no longer exists. Stale entries are skipped;
/// short stock aborts; a cart with nothing left to order counts as empty.
/// The total sums the snapshot line totals, so it equals the cart's
/// `total_price()` whenever every entry resolves.
fn build_order_lines<I>(rows: I) -> Result<(Vec<OrderLine>, Decimal), CheckoutError>
where
    I: IntoIterator<Item = (Uuid, CartEntry, Option<(String, i32)>)>,
{
    let mut lines = Vec::new();
    let mut total = Decimal::ZERO;
    for (product_id, entry, row) in rows {
        let Some((name, stock)) = row else {
            // stale cart entry, product is gone
            continue;
        };

        let quantity = entry.quantity as i32;
        if stock < quantity {
            return Err(CheckoutError::InsufficientStock {
                name,
                available: stock,
            });
        }

        total += entry.unit_price * Decimal::from(entry.quantity);
        lines.push(OrderLine {
            product_id,
            quantity,
            price: entry.unit_price,
        });
    }

    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    Ok((lines, total))
}

/// Convert a cart snapshot into a persisted order inside one transaction.
///
/// Every cart product is locked and its stock re-checked at commit time, so
/// stock cannot go negative even under concurrent checkouts; an entry whose
/// quantity no longer fits aborts the whole unit. Entries whose product has
/// vanished from the catalog are skipped silently, like in the cart views.
/// Any failure rolls back completely: no order, no items, no stock change.
pub async fn place_order(
    db: &PgPool,
    user_id: Uuid,
    cart: &Cart,
    form: CheckoutForm,
) -> Result<Order, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let form = form.validate().map_err(CheckoutError::Validation)?;

    let mut tx = db.begin().await?;

    let mut locked = Vec::new();
    for (&product_id, entry) in cart.entries() {
        let row: Option<(String, i32)> =
            sqlx::query_as(r#"SELECT name, stock FROM products WHERE id = $1 FOR UPDATE"#)
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
        locked.push((product_id, *entry, row));
    }
    let (lines, total) = build_order_lines(locked)?;

    let order = sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders
            (user_id, first_name, last_name, email, phone, address, city, postal_code, total_price)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, user_id, status, first_name, last_name, email, phone,
                  address, city, postal_code, total_price, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&form.first_name)
    .bind(&form.last_name)
    .bind(&form.email)
    .bind(&form.phone)
    .bind(&form.address)
    .bind(&form.city)
    .bind(&form.postal_code)
    .bind(total)
    .fetch_one(&mut *tx)
    .await?;

    for line in &lines {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(order.id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.price)
        .execute(&mut *tx)
        .await?;

        sqlx::query(r#"UPDATE products SET stock = stock - $1 WHERE id = $2"#)
            .bind(line.quantity)
            .bind(line.product_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!(
        order_id = %order.id,
        %user_id,
        total = %order.total_price,
        items = lines.len(),
        "order placed"
    );
    Ok(order)
}

#[cfg(test)]
mod form_tests {
    use super::*;

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@example.com".into(),
            phone: "+1 (555) 123-4567".into(),
            address: "123 Main Street, Apt 4B".into(),
            city: "New York".into(),
            postal_code: "10001".into(),
        }
    }

    #[test]
    fn valid_form_passes() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn fields_are_trimmed() {
        let mut form = valid_form();
        form.first_name = "  John  ".into();
        form.city = " New York ".into();
        let form = form.validate().unwrap();
        assert_eq!(form.first_name, "John");
        assert_eq!(form.city, "New York");
    }

    #[test]
    fn missing_email_reports_field_error() {
        let mut form = valid_form();
        form.email = "".into();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["email"], "This field is required.");
    }

    #[test]
    fn malformed_email_reports_field_error() {
        let mut form = valid_form();
        form.email = "not-an-email".into();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors["email"], "Enter a valid email address.");
    }

    #[test]
    fn whitespace_only_fields_are_required() {
        let mut form = valid_form();
        form.first_name = "   ".into();
        form.postal_code = "\t".into();
        let errors = form.validate().unwrap_err();
        assert!(errors.contains_key("first_name"));
        assert!(errors.contains_key("postal_code"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn all_blank_form_flags_every_field() {
        let form = CheckoutForm {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            postal_code: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 7);
    }
}

#[cfg(test)]
mod line_tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(quantity: u32, unit_price: Decimal) -> CartEntry {
        CartEntry {
            quantity,
            unit_price,
        }
    }

    fn in_stock(name: &str, stock: i32) -> Option<(String, i32)> {
        Some((name.to_string(), stock))
    }

    #[test]
    fn one_line_per_entry_and_total_matches_cart() {
        // ProductA: qty 2 @ $10.00, ProductB: qty 1 @ $25.00
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (lines, total) = build_order_lines(vec![
            (a, entry(2, dec!(10.00)), in_stock("ProductA", 5)),
            (b, entry(1, dec!(25.00)), in_stock("ProductB", 5)),
        ])
        .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(total, dec!(45.00));
        let line_a = lines.iter().find(|l| l.product_id == a).unwrap();
        assert_eq!(line_a.quantity, 2);
        assert_eq!(line_a.price, dec!(10.00));
        let line_b = lines.iter().find(|l| l.product_id == b).unwrap();
        assert_eq!(line_b.quantity, 1);
        assert_eq!(line_b.price, dec!(25.00));
    }

    #[test]
    fn exact_stock_is_enough() {
        let (lines, total) = build_order_lines(vec![(
            Uuid::new_v4(),
            entry(3, dec!(5.00)),
            in_stock("Compost", 3),
        )])
        .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(total, dec!(15.00));
    }

    #[test]
    fn short_stock_aborts_with_a_conflict() {
        let err = build_order_lines(vec![
            (Uuid::new_v4(), entry(1, dec!(10.00)), in_stock("ProductA", 5)),
            (Uuid::new_v4(), entry(2, dec!(25.00)), in_stock("ProductB", 1)),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock { available: 1, ref name } if name.as_str() == "ProductB"
        ));
    }

    #[test]
    fn stale_entries_are_skipped_from_lines_and_total() {
        let kept = Uuid::new_v4();
        let (lines, total) = build_order_lines(vec![
            (kept, entry(2, dec!(10.00)), in_stock("ProductA", 5)),
            (Uuid::new_v4(), entry(4, dec!(99.00)), None),
        ])
        .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, kept);
        assert_eq!(total, dec!(20.00));
    }

    #[test]
    fn all_stale_entries_count_as_empty_cart() {
        let err = build_order_lines(vec![
            (Uuid::new_v4(), entry(1, dec!(10.00)), None),
            (Uuid::new_v4(), entry(2, dec!(25.00)), None),
        ])
        .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }
}

#[cfg(test)]
mod checkout_db_tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn test_pool() -> Option<PgPool> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .ok()?;
        sqlx::migrate!("./migrations").run(&db).await.ok()?;
        Some(db)
    }

    async fn seed_user(db: &PgPool) -> Uuid {
        sqlx::query_scalar(
            r#"INSERT INTO users (email, password_hash) VALUES ($1, 'x') RETURNING id"#,
        )
        .bind(format!("shopper-{}@example.com", Uuid::new_v4().simple()))
        .fetch_one(db)
        .await
        .expect("seed user")
    }

    async fn seed_product(db: &PgPool, price: Decimal, stock: i32) -> Uuid {
        let tag = Uuid::new_v4().simple().to_string();
        let category_id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING id"#,
        )
        .bind(format!("Fertilizers {tag}"))
        .bind(format!("fertilizers-{tag}"))
        .fetch_one(db)
        .await
        .expect("seed category");

        sqlx::query_scalar(
            r#"
            INSERT INTO products (name, slug, category_id, price, stock)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(format!("Product {tag}"))
        .bind(format!("product-{tag}"))
        .bind(category_id)
        .bind(price)
        .bind(stock)
        .fetch_one(db)
        .await
        .expect("seed product")
    }

    async fn stock_of(db: &PgPool, id: Uuid) -> i32 {
        sqlx::query_scalar(r#"SELECT stock FROM products WHERE id = $1"#)
            .bind(id)
            .fetch_one(db)
            .await
            .expect("read stock")
    }

    fn shipping_form() -> CheckoutForm {
        CheckoutForm {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@example.com".into(),
            phone: "+1 (555) 123-4567".into(),
            address: "123 Main Street, Apt 4B".into(),
            city: "New York".into(),
            postal_code: "10001".into(),
        }
    }

    #[tokio::test]
    #[ignore = "needs TEST_DATABASE_URL pointing at a migratable Postgres"]
    async fn place_order_writes_order_items_and_stock() {
        let Some(db) = test_pool().await else {
            return;
        };
        let user_id = seed_user(&db).await;
        let a = seed_product(&db, dec!(10.00), 5).await;
        let b = seed_product(&db, dec!(25.00), 5).await;

        let mut cart = Cart::default();
        cart.add(a, dec!(10.00), 2, false);
        cart.add(b, dec!(25.00), 1, false);
        let expected_total = cart.total_price();

        let order = place_order(&db, user_id, &cart, shipping_form())
            .await
            .expect("checkout succeeds");
        assert_eq!(order.total_price, expected_total);
        assert_eq!(order.status, "pending");

        let items = Order::items(&db, order.id).await.unwrap();
        assert_eq!(items.len(), 2);
        let item_a = items.iter().find(|i| i.product_id == a).unwrap();
        assert_eq!(item_a.quantity, 2);
        assert_eq!(item_a.price, dec!(10.00));

        assert_eq!(stock_of(&db, a).await, 3);
        assert_eq!(stock_of(&db, b).await, 4);
    }

    #[tokio::test]
    #[ignore = "needs TEST_DATABASE_URL pointing at a migratable Postgres"]
    async fn short_stock_rolls_back_everything() {
        let Some(db) = test_pool().await else {
            return;
        };
        let user_id = seed_user(&db).await;
        let a = seed_product(&db, dec!(10.00), 5).await;
        let b = seed_product(&db, dec!(25.00), 1).await;

        let mut cart = Cart::default();
        cart.add(a, dec!(10.00), 2, false);
        cart.add(b, dec!(25.00), 3, false);

        let err = place_order(&db, user_id, &cart, shipping_form())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock { available: 1, .. }
        ));

        let orders = Order::list_by_user(&db, user_id).await.unwrap();
        assert!(orders.is_empty());
        assert_eq!(stock_of(&db, a).await, 5);
        assert_eq!(stock_of(&db, b).await, 1);
    }

    #[tokio::test]
    #[ignore = "needs TEST_DATABASE_URL pointing at a migratable Postgres"]
    async fn invalid_form_writes_nothing() {
        let Some(db) = test_pool().await else {
            return;
        };
        let user_id = seed_user(&db).await;
        let a = seed_product(&db, dec!(10.00), 5).await;

        let mut cart = Cart::default();
        cart.add(a, dec!(10.00), 2, false);

        let mut form = shipping_form();
        form.email = "".into();
        let err = place_order(&db, user_id, &cart, form).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));

        let orders = Order::list_by_user(&db, user_id).await.unwrap();
        assert!(orders.is_empty());
        assert_eq!(stock_of(&db, a).await, 5);
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_the_product() {
        let err = CheckoutError::InsufficientStock {
            name: "NPK 15-15-15".into(),
            available: 3,
        };
        assert_eq!(err.to_string(), "Only 3 units of NPK 15-15-15 available.");
    }

    #[test]
    fn empty_cart_message() {
        assert_eq!(CheckoutError::EmptyCart.to_string(), "Your cart is empty.");
    }
}
