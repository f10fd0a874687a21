//! Location Repository (delivery zones)

use super::{RepoError, RepoResult, same_name};
use crate::db::{Batch, Collection, DocStore};
use shared::error::ErrorCode;
use shared::models::{Location, LocationCreate, LocationUpdate};
use shared::util::{new_id, now_millis};

fn not_found(id: &str) -> RepoError {
    RepoError::NotFound(ErrorCode::LocationNotFound, format!("Location {id} not found"))
}

fn ensure_unique(batch: &Batch<'_>, name: &str, except: Option<&str>) -> RepoResult<()> {
    let clash = batch.find(Collection::Locations, |l: &Location| {
        same_name(&l.name, name) && Some(l.id.as_str()) != except
    })?;
    if clash.is_empty() {
        Ok(())
    } else {
        Err(RepoError::Duplicate(
            ErrorCode::LocationNameExists,
            format!("Location '{}' already exists", name.trim()),
        ))
    }
}

/// Locations whose name contains `search` (case-insensitive), sorted by name
pub fn find_all(store: &DocStore, search: Option<&str>) -> RepoResult<Vec<Location>> {
    let search = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase);
    let mut locations: Vec<Location> = store.find(Collection::Locations, |l: &Location| {
        search.as_deref().is_none_or(|s| l.name.to_lowercase().contains(s))
    })?;
    locations.sort_by_key(|l| l.name.to_lowercase());
    Ok(locations)
}

/// Locations customers can order to
pub fn find_active(store: &DocStore) -> RepoResult<Vec<Location>> {
    let mut locations: Vec<Location> = store.find(Collection::Locations, |l: &Location| l.status)?;
    locations.sort_by_key(|l| l.name.to_lowercase());
    Ok(locations)
}

pub fn find_by_id(store: &DocStore, id: &str) -> RepoResult<Option<Location>> {
    Ok(store.get(Collection::Locations, id)?)
}

/// New locations start active
pub fn create(store: &DocStore, data: LocationCreate) -> RepoResult<Location> {
    let mut batch = store.batch()?;
    ensure_unique(&batch, &data.name, None)?;
    let location = Location {
        id: new_id(),
        name: data.name.trim().to_string(),
        price: data.price,
        status: true,
        created_at: now_millis(),
    };
    batch.insert(Collection::Locations, &location.id, &location)?;
    batch.commit()?;
    Ok(location)
}

pub fn update(store: &DocStore, id: &str, data: LocationUpdate) -> RepoResult<Location> {
    let mut batch = store.batch()?;
    let mut location: Location = batch.get(Collection::Locations, id)?.ok_or_else(|| not_found(id))?;

    if let Some(name) = data.name {
        ensure_unique(&batch, &name, Some(id))?;
        location.name = name.trim().to_string();
    }
    if let Some(price) = data.price {
        location.price = price;
    }

    batch.put(Collection::Locations, id, &location)?;
    batch.commit()?;
    Ok(location)
}

pub fn toggle_status(store: &DocStore, id: &str) -> RepoResult<Location> {
    let mut batch = store.batch()?;
    let mut location: Location = batch.get(Collection::Locations, id)?.ok_or_else(|| not_found(id))?;
    location.status = !location.status;
    batch.put(Collection::Locations, id, &location)?;
    batch.commit()?;
    Ok(location)
}

pub fn delete(store: &DocStore, id: &str) -> RepoResult<bool> {
    Ok(store.delete(Collection::Locations, id)?)
}
