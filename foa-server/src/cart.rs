//! Cart accumulation
//!
//! Every cart line is its own `tempOrders` document. Prices always come from
//! the live catalog; the client only names the food and toppings.

use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    AddToCart, CartLine, CartView, Food, ToppingPreview, ToppingPreviewRequest, ToppingRef,
};
use shared::util::{new_id, now_millis};

use crate::db::DocStore;
use crate::db::repository::{cart as cart_repo, food as food_repo, topping as topping_repo};
use crate::money;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};

fn food_not_found(food_id: &str) -> AppError {
    AppError::with_message(ErrorCode::FoodNotFound, format!("Food {food_id} not found"))
        .with_detail("foodId", food_id)
}

/// Resolve selected toppings for a food; duplicates count once
fn resolve_toppings(store: &DocStore, food: &Food, ids: &[String]) -> AppResult<Vec<ToppingRef>> {
    let mut selected: Vec<ToppingRef> = Vec::with_capacity(ids.len());
    for id in ids {
        if selected.iter().any(|t| t.id == *id) {
            continue;
        }
        match topping_repo::find_by_id(store, id)? {
            Some(topping) if topping.applies_to(&food.id) => selected.push(ToppingRef::from(&topping)),
            _ => {
                return Err(AppError::with_message(
                    ErrorCode::ToppingNotAvailable,
                    format!("Topping {id} is not available for {}", food.name),
                )
                .with_detail("toppingId", id.as_str())
                .with_detail("foodId", food.id.as_str()));
            }
        }
    }
    Ok(selected)
}

fn unit_price(food_price: f64, toppings: &[ToppingRef]) -> f64 {
    money::to_f64(money::unit_price(food_price, toppings.iter().map(|t| t.price)))
}

/// Running price after checking (`checked = true`) or unchecking a topping
pub fn toggle_topping(running_price: f64, topping_price: f64, checked: bool) -> f64 {
    let running = money::to_decimal(running_price);
    let delta = money::to_decimal(topping_price);
    let next = if checked { running + delta } else { running - delta };
    money::to_f64(next)
}

/// Price a food with a topping selection without touching the cart
pub fn preview_toppings(store: &DocStore, req: &ToppingPreviewRequest) -> AppResult<ToppingPreview> {
    let food = food_repo::find_by_id(store, &req.food_id)?.ok_or_else(|| food_not_found(&req.food_id))?;
    let toppings = resolve_toppings(store, &food, &req.toppings)?;
    let toppings_total: Decimal = toppings.iter().map(|t| money::to_decimal(t.price)).sum();
    Ok(ToppingPreview {
        food_price: food.price,
        total_price: unit_price(food.price, &toppings),
        toppings_total: money::to_f64(toppings_total),
        toppings,
    })
}

/// Add one line to the customer's cart
///
/// No merging: adding the same food twice creates two lines.
pub fn add_line(store: &DocStore, client_id: &str, req: AddToCart) -> AppResult<CartLine> {
    validate_optional_text(&req.instructions, "instructions", MAX_NOTE_LEN)?;
    let quantity = money::validate_quantity(req.quantity.unwrap_or(1))?;

    let food = food_repo::find_by_id(store, &req.food_id)?.ok_or_else(|| food_not_found(&req.food_id))?;
    let toppings = resolve_toppings(store, &food, &req.toppings)?;

    let line = CartLine {
        id: new_id(),
        food_id: food.id.clone(),
        food_name: food.name.clone(),
        food_price: food.price,
        total_price: unit_price(food.price, &toppings),
        toppings,
        client_id: client_id.to_string(),
        instructions: req.instructions.unwrap_or_default().trim().to_string(),
        quantity,
        created_at: now_millis(),
    };
    cart_repo::insert(store, &line)?;

    tracing::debug!(client_id = %client_id, line_id = %line.id, food = %line.food_name, "Cart line added");
    Ok(line)
}

/// Cart lines plus derived totals
pub fn view(store: &DocStore, client_id: &str) -> AppResult<CartView> {
    let lines = cart_repo::find_by_client(store, client_id)?;
    Ok(summarize(lines))
}

pub fn summarize(lines: Vec<CartLine>) -> CartView {
    let subtotal = money::to_f64(money::subtotal(lines.iter().map(|l| (l.total_price, l.quantity))));
    let item_count = lines.iter().map(|l| l.quantity).sum();
    CartView {
        lines,
        subtotal,
        item_count,
    }
}

pub fn set_quantity(store: &DocStore, client_id: &str, line_id: &str, quantity: i64) -> AppResult<CartLine> {
    let quantity = money::validate_quantity(quantity)?;
    Ok(cart_repo::set_quantity(store, client_id, line_id, quantity)?)
}

pub fn remove_line(store: &DocStore, client_id: &str, line_id: &str) -> AppResult<()> {
    Ok(cart_repo::remove(store, client_id, line_id)?)
}

pub fn clear(store: &DocStore, client_id: &str) -> AppResult<usize> {
    Ok(cart_repo::clear(store, client_id)?)
}

/// Re-price lines against the current catalog
///
/// A line whose food is gone fails with `FoodNotFound` (line id in the
/// details). Toppings that were deleted or no longer apply are dropped.
pub fn reprice(store: &DocStore, lines: Vec<CartLine>) -> AppResult<Vec<CartLine>> {
    lines
        .into_iter()
        .map(|mut line| -> AppResult<CartLine> {
            let food = food_repo::find_by_id(store, &line.food_id)?.ok_or_else(|| {
                food_not_found(&line.food_id).with_detail("lineId", line.id.as_str())
            })?;

            let mut toppings = Vec::with_capacity(line.toppings.len());
            for selected in &line.toppings {
                match topping_repo::find_by_id(store, &selected.id)? {
                    Some(current) if current.applies_to(&food.id) => toppings.push(ToppingRef::from(&current)),
                    _ => tracing::info!(
                        line_id = %line.id,
                        topping_id = %selected.id,
                        "Dropping topping no longer offered"
                    ),
                }
            }

            line.food_name = food.name.clone();
            line.food_price = food.price;
            line.total_price = unit_price(food.price, &toppings);
            line.toppings = toppings;
            Ok(line)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Collection;
    use shared::models::Topping;

    fn seed(store: &DocStore) {
        let pizza = Food {
            id: "pizza".into(),
            name: "Pizza".into(),
            price: 12.5,
            ratings: 0.0,
            categories: vec![],
            image: None,
            created_at: 0,
        };
        store.put(Collection::Foods, "pizza", &pizza).unwrap();
        for (id, price, foods) in [("cheese", 2.5, vec!["pizza"]), ("egg", 1.0, vec!["rice"])] {
            let t = Topping {
                id: id.into(),
                name: id.into(),
                price,
                foods: foods.into_iter().map(Into::into).collect(),
                created_at: 0,
            };
            store.put(Collection::Toppings, id, &t).unwrap();
        }
    }

    fn add(food: &str, toppings: &[&str], quantity: Option<i64>) -> AddToCart {
        AddToCart {
            food_id: food.into(),
            toppings: toppings.iter().map(|t| t.to_string()).collect(),
            instructions: Some("  no onions ".into()),
            quantity,
        }
    }

    #[test]
    fn line_price_includes_toppings_once() {
        let store = DocStore::open_in_memory().unwrap();
        seed(&store);
        let line = add_line(&store, "c1", add("pizza", &["cheese", "cheese"], None)).unwrap();
        assert_eq!(line.total_price, 15.0);
        assert_eq!(line.toppings.len(), 1);
        assert_eq!(line.quantity, 1);
        assert_eq!(line.instructions, "no onions");
    }

    #[test]
    fn topping_must_apply_to_food() {
        let store = DocStore::open_in_memory().unwrap();
        seed(&store);
        let err = add_line(&store, "c1", add("pizza", &["egg"], None)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ToppingNotAvailable);
        let err = add_line(&store, "c1", add("pizza", &["ghost"], None)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ToppingNotAvailable);
        let err = add_line(&store, "c1", add("burger", &[], None)).unwrap_err();
        assert_eq!(err.code, ErrorCode::FoodNotFound);
    }

    #[test]
    fn same_food_twice_makes_two_lines() {
        let store = DocStore::open_in_memory().unwrap();
        seed(&store);
        add_line(&store, "c1", add("pizza", &[], None)).unwrap();
        add_line(&store, "c1", add("pizza", &["cheese"], Some(2))).unwrap();
        add_line(&store, "c2", add("pizza", &[], None)).unwrap();

        let cart = view(&store, "c1").unwrap();
        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.item_count, 3);
        // 12.5 + 15.0 * 2
        assert_eq!(cart.subtotal, 42.5);
    }

    #[test]
    fn quantity_bounds_enforced() {
        let store = DocStore::open_in_memory().unwrap();
        seed(&store);
        let err = add_line(&store, "c1", add("pizza", &[], Some(0))).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuantity);

        let line = add_line(&store, "c1", add("pizza", &[], None)).unwrap();
        assert_eq!(set_quantity(&store, "c1", &line.id, 9999).unwrap().quantity, 9999);
        assert_eq!(
            set_quantity(&store, "c1", &line.id, 10_000).unwrap_err().code,
            ErrorCode::InvalidQuantity
        );
        // Another customer cannot touch the line
        assert_eq!(
            set_quantity(&store, "c2", &line.id, 2).unwrap_err().code,
            ErrorCode::CartLineNotFound
        );
    }

    #[test]
    fn toggling_a_topping_is_reversible() {
        let on = toggle_topping(12.5, 2.35, true);
        assert_eq!(on, 14.85);
        assert_eq!(toggle_topping(on, 2.35, false), 12.5);
    }

    #[test]
    fn preview_reports_topping_total() {
        let store = DocStore::open_in_memory().unwrap();
        seed(&store);
        let preview = preview_toppings(
            &store,
            &ToppingPreviewRequest { food_id: "pizza".into(), toppings: vec!["cheese".into()] },
        )
        .unwrap();
        assert_eq!(preview.toppings_total, 2.5);
        assert_eq!(preview.total_price, 15.0);
        assert!(view(&store, "c1").unwrap().lines.is_empty());
    }

    #[test]
    fn reprice_uses_current_catalog() {
        let store = DocStore::open_in_memory().unwrap();
        seed(&store);
        let line = add_line(&store, "c1", add("pizza", &["cheese"], None)).unwrap();

        // Price change and topping withdrawn
        let mut pizza: Food = store.get(Collection::Foods, "pizza").unwrap().unwrap();
        pizza.price = 14.0;
        store.put(Collection::Foods, "pizza", &pizza).unwrap();
        store.delete(Collection::Toppings, "cheese").unwrap();

        let repriced = reprice(&store, vec![line.clone()]).unwrap();
        assert_eq!(repriced[0].total_price, 14.0);
        assert!(repriced[0].toppings.is_empty());

        store.delete(Collection::Foods, "pizza").unwrap();
        let err = reprice(&store, vec![line.clone()]).unwrap_err();
        assert_eq!(err.code, ErrorCode::FoodNotFound);
        assert_eq!(err.details.unwrap()["lineId"], line.id.as_str());
    }

    #[test]
    fn clear_removes_only_own_lines() {
        let store = DocStore::open_in_memory().unwrap();
        seed(&store);
        add_line(&store, "c1", add("pizza", &[], None)).unwrap();
        add_line(&store, "c2", add("pizza", &[], None)).unwrap();
        assert_eq!(clear(&store, "c1").unwrap(), 1);
        assert_eq!(view(&store, "c2").unwrap().lines.len(), 1);
    }
}
