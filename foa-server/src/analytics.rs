//! Dashboard analytics
//!
//! Aggregations run over the full `orders` / `customers` collections; the
//! store is small enough that this stays cheap.

use chrono::FixedOffset;
use rust_decimal::Decimal;
use shared::error::AppResult;
use shared::models::{
    Customer, FoodTally, MonthlyFoodOrders, Order, OrderType, RevenueReport, RevenueRow, Widget,
};
use std::collections::{BTreeMap, HashMap};

use crate::db::{Collection, DocStore};
use crate::money;
use crate::utils::time::{MONTH_LABELS, current_year, month_index_of, year_of};

pub const MOST_PURCHASED_LIMIT: usize = 5;
pub const CUSTOMER_TOP_FOODS_LIMIT: usize = 20;

fn widget(title: &str, total: Decimal, this_year: Decimal) -> Widget {
    Widget {
        title: title.to_string(),
        value: money::to_f64(total),
        current_year: money::to_f64(this_year),
        percentage: money::percentage(this_year, total),
    }
}

/// `CUSTOMERS`, `TOTAL REVENUE`, `ORDERS` with their current-year share
pub fn widgets(customers: &[Customer], orders: &[Order], year: i32, offset: FixedOffset) -> Vec<Widget> {
    let in_year = |ms: i64| year_of(ms, offset) == Some(year);

    let customers_year = customers.iter().filter(|c| in_year(c.created_at)).count();
    let orders_year: Vec<&Order> = orders.iter().filter(|o| in_year(o.created_at)).collect();

    let revenue: Decimal = orders.iter().map(|o| money::to_decimal(o.total_price)).sum();
    let revenue_year: Decimal = orders_year.iter().map(|o| money::to_decimal(o.total_price)).sum();

    vec![
        widget("CUSTOMERS", Decimal::from(customers.len()), Decimal::from(customers_year)),
        widget("TOTAL REVENUE", revenue, revenue_year),
        widget("ORDERS", Decimal::from(orders.len()), Decimal::from(orders_year.len())),
    ]
}

/// Summed quantity per food, highest first, ties by name
pub fn food_tallies<'a>(orders: impl IntoIterator<Item = &'a Order>, limit: usize) -> Vec<FoodTally> {
    let mut tallies: HashMap<&str, FoodTally> = HashMap::new();
    for line in orders.into_iter().flat_map(|o| o.orders.iter()) {
        let entry = tallies.entry(line.food_id.as_str()).or_insert_with(|| FoodTally {
            food_id: line.food_id.clone(),
            food_name: line.food_name.clone(),
            quantity: 0,
        });
        entry.quantity += u64::from(line.quantity);
    }
    let mut tallies: Vec<FoodTally> = tallies.into_values().collect();
    tallies.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.food_name.cmp(&b.food_name))
    });
    tallies.truncate(limit);
    tallies
}

/// Order count and revenue per order type, then 7% tax on the subtotal
pub fn revenue(orders: &[Order]) -> RevenueReport {
    let row = |label: &str, order_type: OrderType| {
        let matching: Vec<&Order> = orders.iter().filter(|o| o.order_type == order_type).collect();
        let revenue: Decimal = matching.iter().map(|o| money::to_decimal(o.total_price)).sum();
        (
            RevenueRow {
                label: label.to_string(),
                orders: matching.len(),
                revenue: money::to_f64(revenue),
            },
            revenue,
        )
    };
    let (delivery, delivery_total) = row("DELIVERY", OrderType::Delivery);
    let (pickup, pickup_total) = row("PICKUP", OrderType::Pickup);

    let subtotal = money::round(delivery_total + pickup_total);
    let taxes = money::round(subtotal * money::TAX_RATE);
    RevenueReport {
        rows: vec![delivery, pickup],
        subtotal: money::to_f64(subtotal),
        tax_rate: money::to_f64(money::TAX_RATE),
        taxes: money::to_f64(taxes),
        total: money::to_f64(subtotal + taxes),
    }
}

/// Quantity per food name for each month of `year`
pub fn monthly_food_orders(orders: &[Order], year: i32, offset: FixedOffset) -> Vec<MonthlyFoodOrders> {
    let mut months: Vec<BTreeMap<String, u64>> = vec![BTreeMap::new(); 12];
    for order in orders {
        if year_of(order.created_at, offset) != Some(year) {
            continue;
        }
        let Some(month) = month_index_of(order.created_at, offset) else {
            continue;
        };
        for line in &order.orders {
            *months[month].entry(line.food_name.clone()).or_insert(0) += u64::from(line.quantity);
        }
    }
    MONTH_LABELS
        .iter()
        .zip(months)
        .map(|(label, foods)| MonthlyFoodOrders {
            month: label.to_string(),
            foods,
        })
        .collect()
}

// ========== Store-backed entry points ==========

pub fn dashboard_widgets(store: &DocStore, offset: FixedOffset) -> AppResult<Vec<Widget>> {
    let customers: Vec<Customer> = store.list(Collection::Customers)?;
    let orders: Vec<Order> = store.list(Collection::Orders)?;
    Ok(widgets(&customers, &orders, current_year(offset), offset))
}

pub fn most_purchased(store: &DocStore) -> AppResult<Vec<FoodTally>> {
    let orders: Vec<Order> = store.list(Collection::Orders)?;
    Ok(food_tallies(&orders, MOST_PURCHASED_LIMIT))
}

pub fn customer_top_foods(store: &DocStore, client_id: &str) -> AppResult<Vec<FoodTally>> {
    let orders: Vec<Order> = store.find(Collection::Orders, |o: &Order| o.client_id == client_id)?;
    Ok(food_tallies(&orders, CUSTOMER_TOP_FOODS_LIMIT))
}

pub fn revenue_report(store: &DocStore) -> AppResult<RevenueReport> {
    let orders: Vec<Order> = store.list(Collection::Orders)?;
    Ok(revenue(&orders))
}

pub fn monthly_report(store: &DocStore, year: Option<i32>, offset: FixedOffset) -> AppResult<Vec<MonthlyFoodOrders>> {
    let orders: Vec<Order> = store.list(Collection::Orders)?;
    Ok(monthly_food_orders(&orders, year.unwrap_or_else(|| current_year(offset)), offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, TimeZone, Utc};
    use shared::models::{CartLine, OrderStatus};

    fn ms(y: i32, m: u32, d: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap().timestamp_millis()
    }

    fn line(food: &str, quantity: u32) -> CartLine {
        CartLine {
            id: format!("l-{food}"),
            food_id: food.to_lowercase(),
            food_name: food.into(),
            food_price: 10.0,
            toppings: vec![],
            client_id: "c1".into(),
            total_price: 10.0,
            instructions: String::new(),
            quantity,
            created_at: 0,
        }
    }

    fn order(client: &str, order_type: OrderType, total: f64, created_at: i64, lines: Vec<CartLine>) -> Order {
        Order {
            id: format!("o-{created_at}-{total}"),
            orders: lines,
            subtotal: total,
            delivery_fee: 0.0,
            total_price: total,
            order_type,
            order_time: String::new(),
            other_information: String::new(),
            client_id: client.into(),
            location: None,
            delivery_guy: None,
            token: None,
            claimed: None,
            status: OrderStatus::Pending,
            payment_reference: String::new(),
            created_at,
        }
    }

    fn customer(created_at: i64) -> Customer {
        Customer {
            id: format!("c{created_at}"),
            uid: String::new(),
            first_name: "A".into(),
            last_name: "B".into(),
            email: String::new(),
            contact: String::new(),
            address: String::new(),
            gender: None,
            image_url: None,
            location: None,
            status: true,
            created_at,
        }
    }

    #[test]
    fn widget_percentages() {
        let customers = vec![customer(ms(2023, 5, 1)), customer(ms(2024, 1, 3)), customer(ms(2024, 2, 3)), customer(ms(2024, 3, 3))];
        let orders = vec![
            order("c1", OrderType::Pickup, 30.0, ms(2023, 6, 1), vec![]),
            order("c1", OrderType::Delivery, 10.0, ms(2024, 6, 1), vec![]),
        ];
        let w = widgets(&customers, &orders, 2024, Utc.fix());
        assert_eq!(w[0].title, "CUSTOMERS");
        assert_eq!(w[0].value, 4.0);
        assert_eq!(w[0].percentage, 75.0);
        assert_eq!(w[1].title, "TOTAL REVENUE");
        assert_eq!(w[1].value, 40.0);
        assert_eq!(w[1].percentage, 25.0);
        assert_eq!(w[2].percentage, 50.0);

        let empty = widgets(&[], &[], 2024, Utc.fix());
        assert!(empty.iter().all(|w| w.percentage == 0.0));
    }

    #[test]
    fn top_foods_sorted_and_limited() {
        let orders = vec![
            order("c1", OrderType::Pickup, 1.0, 1, vec![line("Pizza", 2), line("Rice", 1)]),
            order("c2", OrderType::Pickup, 1.0, 2, vec![line("Rice", 4), line("Kenkey", 1)]),
        ];
        let top = food_tallies(&orders, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].food_name, "Rice");
        assert_eq!(top[0].quantity, 5);
        assert_eq!(top[1].food_name, "Pizza");

        let mine = food_tallies(orders.iter().filter(|o| o.client_id == "c1"), 20);
        assert_eq!(mine.len(), 2);
    }

    #[test]
    fn revenue_with_tax() {
        let orders = vec![
            order("c1", OrderType::Delivery, 100.0, 1, vec![]),
            order("c1", OrderType::Pickup, 50.0, 2, vec![]),
            order("c1", OrderType::Pickup, 50.0, 3, vec![]),
        ];
        let report = revenue(&orders);
        assert_eq!(report.rows[0].label, "DELIVERY");
        assert_eq!(report.rows[0].orders, 1);
        assert_eq!(report.rows[1].label, "PICKUP");
        assert_eq!(report.rows[1].revenue, 100.0);
        assert_eq!(report.subtotal, 200.0);
        assert_eq!(report.tax_rate, 0.07);
        assert_eq!(report.taxes, 14.0);
        assert_eq!(report.total, 214.0);
    }

    #[test]
    fn monthly_chart_covers_twelve_months() {
        let orders = vec![
            order("c1", OrderType::Pickup, 1.0, ms(2024, 1, 10), vec![line("Pizza", 2)]),
            order("c1", OrderType::Pickup, 1.0, ms(2024, 1, 20), vec![line("Pizza", 1)]),
            order("c1", OrderType::Pickup, 1.0, ms(2024, 12, 1), vec![line("Rice", 3)]),
            order("c1", OrderType::Pickup, 1.0, ms(2023, 1, 1), vec![line("Rice", 9)]),
        ];
        let chart = monthly_food_orders(&orders, 2024, Utc.fix());
        assert_eq!(chart.len(), 12);
        assert_eq!(chart[0].foods["Pizza"], 3);
        assert!(!chart[0].foods.contains_key("Rice"));
        assert_eq!(chart[11].foods["Rice"], 3);
        assert!(chart[5].foods.is_empty());
    }
}
