//! Topping Repository

use super::{RepoError, RepoResult};
use crate::db::{Batch, Collection, DocStore};
use shared::error::ErrorCode;
use shared::models::{Topping, ToppingCreate, ToppingUpdate};
use shared::util::{new_id, now_millis};

fn not_found(id: &str) -> RepoError {
    RepoError::NotFound(ErrorCode::ToppingNotFound, format!("Topping {id} not found"))
}

fn check_foods(batch: &Batch<'_>, foods: &[String]) -> RepoResult<()> {
    for food_id in foods {
        if !batch.exists(Collection::Foods, food_id)? {
            return Err(RepoError::NotFound(
                ErrorCode::FoodNotFound,
                format!("Food {food_id} not found"),
            ));
        }
    }
    Ok(())
}

fn dedup(mut foods: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    foods.retain(|f| seen.insert(f.clone()));
    foods
}

/// All toppings sorted by name
pub fn find_all(store: &DocStore) -> RepoResult<Vec<Topping>> {
    let mut toppings: Vec<Topping> = store.list(Collection::Toppings)?;
    toppings.sort_by_key(|t| t.name.to_lowercase());
    Ok(toppings)
}

/// Toppings offered with a food
pub fn find_for_food(store: &DocStore, food_id: &str) -> RepoResult<Vec<Topping>> {
    let mut toppings: Vec<Topping> = store.find(Collection::Toppings, |t: &Topping| t.applies_to(food_id))?;
    toppings.sort_by_key(|t| t.name.to_lowercase());
    Ok(toppings)
}

pub fn find_by_id(store: &DocStore, id: &str) -> RepoResult<Option<Topping>> {
    Ok(store.get(Collection::Toppings, id)?)
}

pub fn create(store: &DocStore, data: ToppingCreate) -> RepoResult<Topping> {
    let mut batch = store.batch()?;
    let foods = dedup(data.foods);
    check_foods(&batch, &foods)?;
    let topping = Topping {
        id: new_id(),
        name: data.name.trim().to_string(),
        price: data.price,
        foods,
        created_at: now_millis(),
    };
    batch.insert(Collection::Toppings, &topping.id, &topping)?;
    batch.commit()?;
    Ok(topping)
}

pub fn update(store: &DocStore, id: &str, data: ToppingUpdate) -> RepoResult<Topping> {
    let mut batch = store.batch()?;
    let mut topping: Topping = batch.get(Collection::Toppings, id)?.ok_or_else(|| not_found(id))?;

    if let Some(v) = data.name {
        topping.name = v.trim().to_string();
    }
    if let Some(v) = data.price {
        topping.price = v;
    }
    if let Some(v) = data.foods {
        let foods = dedup(v);
        check_foods(&batch, &foods)?;
        topping.foods = foods;
    }

    batch.put(Collection::Toppings, id, &topping)?;
    batch.commit()?;
    Ok(topping)
}

pub fn delete(store: &DocStore, id: &str) -> RepoResult<bool> {
    Ok(store.delete(Collection::Toppings, id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Food;

    fn seed_food(store: &DocStore, id: &str) {
        let food = Food {
            id: id.into(),
            name: id.into(),
            price: 10.0,
            ratings: 0.0,
            categories: vec![],
            image: None,
            created_at: 0,
        };
        store.put(Collection::Foods, id, &food).unwrap();
    }

    #[test]
    fn foods_must_exist_and_are_deduplicated() {
        let store = DocStore::open_in_memory().unwrap();
        seed_food(&store, "pizza");

        let err = create(
            &store,
            ToppingCreate { name: "Cheese".into(), price: 3.0, foods: vec!["ghost".into()] },
        )
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(ErrorCode::FoodNotFound, _)));

        let t = create(
            &store,
            ToppingCreate {
                name: "Cheese".into(),
                price: 3.0,
                foods: vec!["pizza".into(), "pizza".into()],
            },
        )
        .unwrap();
        assert_eq!(t.foods, vec!["pizza"]);
        assert_eq!(find_for_food(&store, "pizza").unwrap().len(), 1);
        assert!(find_for_food(&store, "burger").unwrap().is_empty());
    }
}
