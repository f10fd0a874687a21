//! Checkout aggregation and order commit
//!
//! # Flow
//!
//! 1. [`initialize`] quotes the cart and stores a [`PendingCheckout`] under a
//!    fresh payment reference.
//! 2. The client pays in the provider widget.
//! 3. [`complete_payment`] runs on the client's confirmation and on the
//!    provider webhook. It verifies the transaction, re-quotes the cart and
//!    commits the order in one write transaction.
//!
//! A reference yields at most one order: the `payments` record is checked
//! inside the commit transaction, so a confirm racing a webhook ends with
//! one order. The loser returns it, including when it failed because the
//! winner already consumed the checkout and the cart.

use chrono::FixedOffset;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    CartLine, CheckoutRequest, CheckoutSession, FoodCount, Order, OrderStatus, OrderType,
    PaymentRecord, PaymentSource, PendingCheckout, Quote,
};
use shared::util::{new_id, now_millis};
use std::collections::{BTreeMap, BTreeSet};

use crate::cart;
use crate::db::repository::{cart as cart_repo, location as location_repo, staff as staff_repo};
use crate::db::{Collection, DocStore};
use crate::money;
use crate::payment::{PaymentGateway, new_reference};
use crate::utils::time::{order_time_today, parse_pickup_time};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};

/// Pickup token length
pub const TOKEN_LEN: usize = 8;

/// Fee for the order type; delivery needs an active location
fn delivery_fee(store: &DocStore, order_type: OrderType, location: Option<&str>) -> AppResult<Decimal> {
    match order_type {
        OrderType::Pickup => Ok(Decimal::ZERO),
        OrderType::Delivery => {
            let id = location
                .filter(|l| !l.trim().is_empty())
                .ok_or_else(|| AppError::new(ErrorCode::LocationRequired))?;
            let location = location_repo::find_by_id(store, id)?.ok_or_else(|| {
                AppError::with_message(ErrorCode::LocationNotFound, format!("Location {id} not found"))
                    .with_detail("locationId", id)
            })?;
            if !location.status {
                return Err(AppError::with_message(
                    ErrorCode::LocationInactive,
                    format!("Delivery to {} is currently unavailable", location.name),
                )
                .with_detail("locationId", id));
            }
            Ok(money::to_decimal(location.price))
        }
    }
}

/// Price the customer's cart for an order type
pub fn quote(store: &DocStore, client_id: &str, order_type: OrderType, location: Option<&str>) -> AppResult<Quote> {
    let lines = cart_repo::find_by_client(store, client_id)?;
    if lines.is_empty() {
        return Err(AppError::new(ErrorCode::CartEmpty));
    }
    let lines = cart::reprice(store, lines)?;

    let subtotal = money::subtotal(lines.iter().map(|l| (l.total_price, l.quantity)));
    let fee = delivery_fee(store, order_type, location)?;
    let total = money::round(subtotal + fee);

    Ok(Quote {
        order_type,
        location: match order_type {
            OrderType::Delivery => location.map(str::to_string),
            OrderType::Pickup => None,
        },
        lines,
        subtotal: money::to_f64(subtotal),
        delivery_fee: money::to_f64(fee),
        total_price: money::to_f64(total),
        amount_minor: money::to_minor_units(total),
    })
}

/// Uniform random pick among active delivery guys at the location
pub fn pick_delivery_guy(store: &DocStore, location_id: &str) -> AppResult<Option<String>> {
    let guys = staff_repo::delivery_guys_at(store, location_id)?;
    Ok(guys.choose(&mut rand::thread_rng()).map(|s| s.id.clone()))
}

/// 8 alphanumeric characters from the thread CSPRNG
pub fn pickup_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

fn validate_request(req: &CheckoutRequest) -> AppResult<()> {
    validate_optional_text(&req.other_information, "otherInformation", MAX_NOTE_LEN)?;
    parse_pickup_time(req.pickup_time.as_deref())?;
    Ok(())
}

/// Phase one: quote and park the checkout under a new reference
pub fn initialize(
    store: &DocStore,
    client_id: &str,
    email: &str,
    req: CheckoutRequest,
    currency: &str,
    public_key: &str,
) -> AppResult<CheckoutSession> {
    validate_request(&req)?;
    let quote = quote(store, client_id, req.order_type, req.location.as_deref())?;

    let pending = PendingCheckout {
        reference: new_reference(),
        client_id: client_id.to_string(),
        email: email.to_string(),
        draft: req,
        quote: quote.clone(),
        created_at: now_millis(),
    };
    store.insert(Collection::Checkouts, &pending.reference, &pending)?;

    tracing::info!(
        reference = %pending.reference,
        client_id = %client_id,
        amount_minor = quote.amount_minor,
        order_type = quote.order_type.as_str(),
        "Checkout initialized"
    );

    Ok(CheckoutSession {
        reference: pending.reference,
        amount_minor: quote.amount_minor,
        currency: currency.to_string(),
        email: email.to_string(),
        public_key: public_key.to_string(),
        quote,
    })
}

fn existing_order(store: &DocStore, reference: &str) -> AppResult<Option<Order>> {
    let Some(record) = store.get::<PaymentRecord>(Collection::Payments, reference)? else {
        return Ok(None);
    };
    let order = store
        .get::<Order>(Collection::Orders, &record.order_id)?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("reference", reference))?;
    Ok(Some(order))
}

/// The order a processed reference produced, visible only to its customer
fn processed_order(store: &DocStore, reference: &str, owner: Option<&str>) -> AppResult<Option<Order>> {
    let Some(order) = existing_order(store, reference)? else {
        return Ok(None);
    };
    if owner.is_some_and(|o| o != order.client_id) {
        return Err(checkout_not_found(reference));
    }
    Ok(Some(order))
}

fn checkout_not_found(reference: &str) -> AppError {
    AppError::new(ErrorCode::CheckoutNotFound).with_detail("reference", reference)
}

fn build_order(
    store: &DocStore,
    pending: &PendingCheckout,
    quote: Quote,
    offset: FixedOffset,
) -> AppResult<Order> {
    let time = parse_pickup_time(pending.draft.pickup_time.as_deref())?;
    let (location, delivery_guy, token, claimed) = match quote.order_type {
        OrderType::Delivery => {
            let location = quote.location.clone();
            let guy = match location.as_deref() {
                Some(l) => pick_delivery_guy(store, l)?,
                None => None,
            };
            (location, guy, None, None)
        }
        OrderType::Pickup => (None, None, Some(pickup_token()), Some(false)),
    };

    Ok(Order {
        id: new_id(),
        orders: quote.lines,
        subtotal: quote.subtotal,
        delivery_fee: quote.delivery_fee,
        total_price: quote.total_price,
        order_type: quote.order_type,
        order_time: order_time_today(time, offset),
        other_information: pending
            .draft
            .other_information
            .clone()
            .unwrap_or_default()
            .trim()
            .to_string(),
        client_id: pending.client_id.clone(),
        location,
        delivery_guy,
        token,
        claimed,
        status: OrderStatus::Pending,
        payment_reference: pending.reference.clone(),
        created_at: now_millis(),
    })
}

/// Quantities per food id
fn food_quantities(lines: &[CartLine]) -> BTreeMap<&str, u64> {
    let mut counts = BTreeMap::new();
    for line in lines {
        *counts.entry(line.food_id.as_str()).or_insert(0) += u64::from(line.quantity);
    }
    counts
}

/// Phase two: verify the payment and commit the order
///
/// `owner` restricts the call to the customer who started the checkout
/// (client confirmation); the webhook passes `None`.
pub async fn complete_payment(
    store: &DocStore,
    gateway: &dyn PaymentGateway,
    currency: &str,
    offset: FixedOffset,
    reference: &str,
    owner: Option<&str>,
    source: PaymentSource,
) -> AppResult<Order> {
    if let Some(order) = processed_order(store, reference, owner)? {
        tracing::info!(reference = %reference, order_id = %order.id, "Payment already processed");
        return Ok(order);
    }

    match settle(store, gateway, currency, offset, reference, owner, source).await {
        Ok(order) => Ok(order),
        // A concurrent completion commits the order, clears the cart and
        // drops the checkout in one transaction
        Err(err) => match processed_order(store, reference, owner)? {
            Some(order) => {
                tracing::info!(reference = %reference, order_id = %order.id, "Payment settled concurrently");
                Ok(order)
            }
            None => Err(err),
        },
    }
}

async fn settle(
    store: &DocStore,
    gateway: &dyn PaymentGateway,
    currency: &str,
    offset: FixedOffset,
    reference: &str,
    owner: Option<&str>,
    source: PaymentSource,
) -> AppResult<Order> {
    let pending: PendingCheckout = store
        .get(Collection::Checkouts, reference)?
        .filter(|p: &PendingCheckout| owner.is_none_or(|o| o == p.client_id))
        .ok_or_else(|| checkout_not_found(reference))?;

    let verification = gateway.verify(reference).await?;
    if !verification.is_success() || verification.reference != reference {
        tracing::warn!(reference = %reference, status = %verification.status, "Payment not verified");
        return Err(AppError::new(ErrorCode::PaymentNotVerified).with_detail("status", verification.status));
    }
    if !verification.currency.eq_ignore_ascii_case(currency) {
        return Err(AppError::with_message(
            ErrorCode::PaymentNotVerified,
            format!("Payment made in {}, expected {}", verification.currency, currency),
        ));
    }
    if verification.amount_minor < pending.quote.amount_minor {
        tracing::warn!(
            reference = %reference,
            paid = verification.amount_minor,
            expected = pending.quote.amount_minor,
            "Insufficient payment"
        );
        return Err(AppError::new(ErrorCode::PaymentInsufficientAmount)
            .with_detail("paid", verification.amount_minor)
            .with_detail("expected", pending.quote.amount_minor));
    }

    let requote = quote(
        store,
        &pending.client_id,
        pending.draft.order_type,
        pending.draft.location.as_deref(),
    )?;
    if requote.amount_minor != pending.quote.amount_minor {
        tracing::warn!(
            reference = %reference,
            quoted = pending.quote.amount_minor,
            current = requote.amount_minor,
            "Cart total changed after payment started"
        );
        return Err(AppError::new(ErrorCode::PaymentAmountMismatch)
            .with_detail("quoted", pending.quote.amount_minor)
            .with_detail("current", requote.amount_minor));
    }

    let quoted_lines: BTreeSet<String> = requote.lines.iter().map(|l| l.id.clone()).collect();
    let order = build_order(store, &pending, requote, offset)?;

    let mut batch = store.batch()?;

    // A concurrent completion may have committed since the first check
    if let Some(record) = batch.get::<PaymentRecord>(Collection::Payments, reference)? {
        batch.abort()?;
        let existing = store
            .get::<Order>(Collection::Orders, &record.order_id)?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
        return Ok(existing);
    }

    let client_id = pending.client_id.clone();
    let cart_lines = batch.find(Collection::TempOrders, |l: &CartLine| l.client_id == client_id)?;
    let current_lines: BTreeSet<String> = cart_lines.iter().map(|(id, _)| id.clone()).collect();
    if current_lines != quoted_lines {
        batch.abort()?;
        return Err(AppError::with_message(
            ErrorCode::PaymentAmountMismatch,
            "Cart changed while the payment was processed",
        ));
    }

    batch.insert(Collection::Orders, &order.id, &order)?;
    for (line_id, _) in &cart_lines {
        batch.delete(Collection::TempOrders, line_id)?;
    }
    for (food_id, quantity) in food_quantities(&order.orders) {
        let mut counter = batch
            .get::<FoodCount>(Collection::FoodCounts, food_id)?
            .unwrap_or_else(|| FoodCount {
                food_id: food_id.to_string(),
                count: 0,
            });
        counter.count += quantity;
        batch.put(Collection::FoodCounts, food_id, &counter)?;
    }
    let record = PaymentRecord {
        reference: reference.to_string(),
        order_id: order.id.clone(),
        amount_minor: verification.amount_minor,
        processed_at: now_millis(),
        source,
    };
    batch.insert(Collection::Payments, reference, &record)?;
    batch.delete(Collection::Checkouts, reference)?;
    batch.commit()?;

    tracing::info!(
        reference = %reference,
        order_id = %order.id,
        client_id = %order.client_id,
        total = order.total_price,
        order_type = order.order_type.as_str(),
        source = ?source,
        "Order placed"
    );
    Ok(order)
}

/// Drop checkouts that were never paid
pub fn purge_stale(store: &DocStore, max_age_ms: i64) -> AppResult<usize> {
    let cutoff = now_millis() - max_age_ms;
    let mut batch = store.batch()?;
    let stale = batch.find(Collection::Checkouts, |p: &PendingCheckout| p.created_at < cutoff)?;
    for (reference, _) in &stale {
        batch.delete(Collection::Checkouts, reference)?;
    }
    batch.commit()?;
    Ok(stale.len())
}
