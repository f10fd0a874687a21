//! Order Repository

use super::{RepoError, RepoResult};
use crate::db::{Collection, DocStore};
use shared::error::ErrorCode;
use shared::models::{Order, OrderPage, OrderQuery, OrderStatus, OrderType};

/// Customer order history page size
pub const PAGE_SIZE: usize = 10;

fn not_found(id: &str) -> RepoError {
    RepoError::NotFound(ErrorCode::OrderNotFound, format!("Order {id} not found"))
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}

/// All orders matching the filter, newest first
pub fn find_all(store: &DocStore, query: &OrderQuery) -> RepoResult<Vec<Order>> {
    let mut orders: Vec<Order> = store.find(Collection::Orders, |o: &Order| {
        query.order_type.is_none_or(|t| o.order_type == t)
            && query.status.is_none_or(|s| o.status == s)
    })?;
    newest_first(&mut orders);
    Ok(orders)
}

pub fn find_by_id(store: &DocStore, id: &str) -> RepoResult<Option<Order>> {
    Ok(store.get(Collection::Orders, id)?)
}

pub fn find_by_client(store: &DocStore, client_id: &str) -> RepoResult<Vec<Order>> {
    let mut orders: Vec<Order> = store.find(Collection::Orders, |o: &Order| o.client_id == client_id)?;
    newest_first(&mut orders);
    Ok(orders)
}

/// One page (1-based) of a customer's orders
pub fn page_for_client(store: &DocStore, client_id: &str, page: usize) -> RepoResult<OrderPage> {
    let page = page.max(1);
    let all = find_by_client(store, client_id)?;
    let total = all.len();
    let start = (page - 1).saturating_mul(PAGE_SIZE);
    let orders: Vec<Order> = all.into_iter().skip(start).take(PAGE_SIZE).collect();
    Ok(OrderPage {
        has_more: start + orders.len() < total,
        orders,
        page,
        page_size: PAGE_SIZE,
        total,
    })
}

pub fn set_status(store: &DocStore, id: &str, status: OrderStatus) -> RepoResult<Order> {
    let mut batch = store.batch()?;
    let mut order: Order = batch.get(Collection::Orders, id)?.ok_or_else(|| not_found(id))?;
    order.status = status;
    batch.put(Collection::Orders, id, &order)?;
    batch.commit()?;
    Ok(order)
}

/// Mark a pickup order as collected
pub fn mark_claimed(store: &DocStore, id: &str) -> RepoResult<Order> {
    let mut batch = store.batch()?;
    let mut order: Order = batch.get(Collection::Orders, id)?.ok_or_else(|| not_found(id))?;
    if order.order_type != OrderType::Pickup {
        return Err(RepoError::Validation(
            ErrorCode::OrderNotPickup,
            format!("Order {id} is not a pickup order"),
        ));
    }
    order.claimed = Some(true);
    batch.put(Collection::Orders, id, &order)?;
    batch.commit()?;
    Ok(order)
}

pub fn count(store: &DocStore) -> RepoResult<u64> {
    Ok(store.count(Collection::Orders)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, client: &str, created_at: i64, order_type: OrderType) -> Order {
        Order {
            id: id.into(),
            orders: vec![],
            subtotal: 10.0,
            delivery_fee: 0.0,
            total_price: 10.0,
            order_type,
            order_time: String::new(),
            other_information: String::new(),
            client_id: client.into(),
            location: None,
            delivery_guy: None,
            token: (order_type == OrderType::Pickup).then(|| "AbCd1234".to_string()),
            claimed: (order_type == OrderType::Pickup).then_some(false),
            status: OrderStatus::Pending,
            payment_reference: format!("FOA-{id}"),
            created_at,
        }
    }

    #[test]
    fn pages_newest_first() {
        let store = DocStore::open_in_memory().unwrap();
        for i in 0..23 {
            let o = order(&format!("o{i:02}"), "c1", i, OrderType::Pickup);
            store.put(Collection::Orders, &o.id, &o).unwrap();
        }
        let other = order("x", "c2", 100, OrderType::Pickup);
        store.put(Collection::Orders, "x", &other).unwrap();

        let first = page_for_client(&store, "c1", 1).unwrap();
        assert_eq!(first.orders.len(), 10);
        assert_eq!(first.orders[0].id, "o22");
        assert!(first.has_more);
        assert_eq!(first.total, 23);

        let last = page_for_client(&store, "c1", 3).unwrap();
        assert_eq!(last.orders.len(), 3);
        assert!(!last.has_more);

        // page 0 is treated as page 1
        assert_eq!(page_for_client(&store, "c1", 0).unwrap().page, 1);
    }

    #[test]
    fn only_pickup_orders_can_be_claimed() {
        let store = DocStore::open_in_memory().unwrap();
        let p = order("p", "c1", 1, OrderType::Pickup);
        let d = order("d", "c1", 2, OrderType::Delivery);
        store.put(Collection::Orders, "p", &p).unwrap();
        store.put(Collection::Orders, "d", &d).unwrap();

        assert_eq!(mark_claimed(&store, "p").unwrap().claimed, Some(true));
        let err = mark_claimed(&store, "d").unwrap_err();
        assert!(matches!(err, RepoError::Validation(ErrorCode::OrderNotPickup, _)));
        assert!(matches!(
            mark_claimed(&store, "missing").unwrap_err(),
            RepoError::NotFound(ErrorCode::OrderNotFound, _)
        ));
    }

    #[test]
    fn status_toggle_and_filter() {
        let store = DocStore::open_in_memory().unwrap();
        let d = order("d", "c1", 2, OrderType::Delivery);
        store.put(Collection::Orders, "d", &d).unwrap();
        set_status(&store, "d", OrderStatus::Received).unwrap();

        let q = OrderQuery { order_type: Some(OrderType::Delivery), status: Some(OrderStatus::Received) };
        assert_eq!(find_all(&store, &q).unwrap().len(), 1);
        let q = OrderQuery { order_type: None, status: Some(OrderStatus::Pending) };
        assert!(find_all(&store, &q).unwrap().is_empty());
    }
}
