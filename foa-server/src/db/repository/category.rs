//! Category Repository
//!
//! Foods reference categories by name, so renames and deletes are
//! propagated to the foods in the same transaction.

use super::{RepoError, RepoResult, same_name};
use crate::db::{Batch, Collection, DocStore};
use shared::error::ErrorCode;
use shared::models::{Category, CategoryCreate, CategoryUpdate, Food};
use shared::util::{new_id, now_millis};

fn not_found(id: &str) -> RepoError {
    RepoError::NotFound(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
}

fn ensure_unique(batch: &Batch<'_>, name: &str, except: Option<&str>) -> RepoResult<()> {
    let clash = batch.find(Collection::Categories, |c: &Category| {
        same_name(&c.name, name) && Some(c.id.as_str()) != except
    })?;
    if clash.is_empty() {
        Ok(())
    } else {
        Err(RepoError::Duplicate(
            ErrorCode::CategoryNameExists,
            format!("Category '{}' already exists", name.trim()),
        ))
    }
}

/// All categories sorted by name
pub fn find_all(store: &DocStore) -> RepoResult<Vec<Category>> {
    let mut categories: Vec<Category> = store.list(Collection::Categories)?;
    categories.sort_by_key(|c| c.name.to_lowercase());
    Ok(categories)
}

pub fn find_by_id(store: &DocStore, id: &str) -> RepoResult<Option<Category>> {
    Ok(store.get(Collection::Categories, id)?)
}

pub fn create(store: &DocStore, data: CategoryCreate) -> RepoResult<Category> {
    let mut batch = store.batch()?;
    ensure_unique(&batch, &data.name, None)?;
    let category = Category {
        id: new_id(),
        name: data.name.trim().to_string(),
        created_at: now_millis(),
    };
    batch.insert(Collection::Categories, &category.id, &category)?;
    batch.commit()?;
    Ok(category)
}

pub fn update(store: &DocStore, id: &str, data: CategoryUpdate) -> RepoResult<Category> {
    let mut batch = store.batch()?;
    let mut category: Category = batch
        .get(Collection::Categories, id)?
        .ok_or_else(|| not_found(id))?;

    if let Some(name) = data.name {
        let name = name.trim().to_string();
        ensure_unique(&batch, &name, Some(id))?;
        let old = std::mem::replace(&mut category.name, name.clone());
        for (food_id, mut food) in batch.find(Collection::Foods, |f: &Food| f.categories.contains(&old))? {
            for c in food.categories.iter_mut().filter(|c| **c == old) {
                *c = name.clone();
            }
            batch.put(Collection::Foods, &food_id, &food)?;
        }
    }

    batch.put(Collection::Categories, id, &category)?;
    batch.commit()?;
    Ok(category)
}

pub fn delete(store: &DocStore, id: &str) -> RepoResult<bool> {
    let mut batch = store.batch()?;
    let Some(category) = batch.get::<Category>(Collection::Categories, id)? else {
        return Ok(false);
    };
    for (food_id, mut food) in
        batch.find(Collection::Foods, |f: &Food| f.categories.contains(&category.name))?
    {
        food.categories.retain(|c| *c != category.name);
        batch.put(Collection::Foods, &food_id, &food)?;
    }
    batch.delete(Collection::Categories, id)?;
    batch.commit()?;
    Ok(true)
}

/// Category names that do not exist
pub fn unknown_names(batch: &Batch<'_>, names: &[String]) -> RepoResult<Vec<String>> {
    let known: Vec<Category> = batch
        .find(Collection::Categories, |_: &Category| true)?
        .into_iter()
        .map(|(_, c)| c)
        .collect();
    Ok(names
        .iter()
        .filter(|n| !known.iter().any(|c| c.name == **n))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(id: &str, categories: &[&str]) -> Food {
        Food {
            id: id.into(),
            name: id.into(),
            price: 10.0,
            ratings: 0.0,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            image: None,
            created_at: 0,
        }
    }

    #[test]
    fn names_are_unique_ignoring_case() {
        let store = DocStore::open_in_memory().unwrap();
        create(&store, CategoryCreate { name: "Drinks".into() }).unwrap();
        let err = create(&store, CategoryCreate { name: " drinks".into() }).unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(ErrorCode::CategoryNameExists, _)));
    }

    #[test]
    fn rename_and_delete_follow_into_foods() {
        let store = DocStore::open_in_memory().unwrap();
        let cat = create(&store, CategoryCreate { name: "Rice".into() }).unwrap();
        store.put(Collection::Foods, "f1", &food("f1", &["Rice", "Local"])).unwrap();

        update(&store, &cat.id, CategoryUpdate { name: Some("Rice Dishes".into()) }).unwrap();
        let f: Food = store.get(Collection::Foods, "f1").unwrap().unwrap();
        assert_eq!(f.categories, vec!["Rice Dishes", "Local"]);

        assert!(delete(&store, &cat.id).unwrap());
        let f: Food = store.get(Collection::Foods, "f1").unwrap().unwrap();
        assert_eq!(f.categories, vec!["Local"]);
        assert!(!delete(&store, &cat.id).unwrap());
    }
}
