//! Food Repository

use super::{RepoError, RepoResult, category};
use crate::db::{Collection, DocStore};
use shared::error::ErrorCode;
use shared::models::{Food, FoodCount, FoodCreate, FoodQuery, FoodUpdate, Topping};
use shared::util::{new_id, now_millis};

fn not_found(id: &str) -> RepoError {
    RepoError::NotFound(ErrorCode::FoodNotFound, format!("Food {id} not found"))
}

fn unknown_categories(names: Vec<String>) -> RepoError {
    RepoError::NotFound(
        ErrorCode::CategoryNotFound,
        format!("Unknown categories: {}", names.join(", ")),
    )
}

/// Foods matching the query, sorted by name
///
/// `search` is a case-insensitive substring of the name; `category` an exact
/// category name.
pub fn find_all(store: &DocStore, query: &FoodQuery) -> RepoResult<Vec<Food>> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let category = query.category.as_deref().filter(|c| !c.is_empty());

    let mut foods: Vec<Food> = store.find(Collection::Foods, |f: &Food| {
        search
            .as_deref()
            .is_none_or(|s| f.name.to_lowercase().contains(s))
            && category.is_none_or(|c| f.categories.iter().any(|fc| fc == c))
    })?;
    foods.sort_by_key(|f| f.name.to_lowercase());
    Ok(foods)
}

pub fn find_by_id(store: &DocStore, id: &str) -> RepoResult<Option<Food>> {
    Ok(store.get(Collection::Foods, id)?)
}

pub fn create(store: &DocStore, data: FoodCreate) -> RepoResult<Food> {
    let mut batch = store.batch()?;
    let unknown = category::unknown_names(&batch, &data.categories)?;
    if !unknown.is_empty() {
        return Err(unknown_categories(unknown));
    }
    let food = Food {
        id: new_id(),
        name: data.name.trim().to_string(),
        price: data.price,
        ratings: 0.0,
        categories: data.categories,
        image: data.image,
        created_at: now_millis(),
    };
    batch.insert(Collection::Foods, &food.id, &food)?;
    batch.commit()?;
    Ok(food)
}

pub fn update(store: &DocStore, id: &str, data: FoodUpdate) -> RepoResult<Food> {
    let mut batch = store.batch()?;
    let mut food: Food = batch.get(Collection::Foods, id)?.ok_or_else(|| not_found(id))?;

    if let Some(v) = data.name {
        food.name = v.trim().to_string();
    }
    if let Some(v) = data.price {
        food.price = v;
    }
    if let Some(v) = data.ratings {
        food.ratings = v;
    }
    if let Some(v) = data.categories {
        let unknown = category::unknown_names(&batch, &v)?;
        if !unknown.is_empty() {
            return Err(unknown_categories(unknown));
        }
        food.categories = v;
    }
    if data.image.is_some() {
        food.image = data.image;
    }

    batch.put(Collection::Foods, id, &food)?;
    batch.commit()?;
    Ok(food)
}

/// Delete a food, unlink it from toppings and drop its order counter
///
/// Cart lines that still reference it fail at checkout with `FoodNotFound`.
pub fn delete(store: &DocStore, id: &str) -> RepoResult<bool> {
    let mut batch = store.batch()?;
    if !batch.delete(Collection::Foods, id)? {
        return Ok(false);
    }
    for (topping_id, mut topping) in batch.find(Collection::Toppings, |t: &Topping| t.applies_to(id))? {
        topping.foods.retain(|f| f != id);
        batch.put(Collection::Toppings, &topping_id, &topping)?;
    }
    batch.delete(Collection::FoodCounts, id)?;
    batch.commit()?;
    Ok(true)
}

/// Per-food order counters
pub fn counts(store: &DocStore) -> RepoResult<Vec<FoodCount>> {
    Ok(store.list(Collection::FoodCounts)?)
}
