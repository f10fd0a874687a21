//! Cart line Repository (`tempOrders`)

use super::{RepoError, RepoResult};
use crate::db::{Collection, DocStore};
use shared::error::ErrorCode;
use shared::models::CartLine;

fn not_found(id: &str) -> RepoError {
    RepoError::NotFound(ErrorCode::CartLineNotFound, format!("Cart line {id} not found"))
}

/// A customer's lines in insertion order
pub fn find_by_client(store: &DocStore, client_id: &str) -> RepoResult<Vec<CartLine>> {
    let mut lines: Vec<CartLine> = store.find(Collection::TempOrders, |l: &CartLine| l.client_id == client_id)?;
    lines.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Ok(lines)
}

pub fn insert(store: &DocStore, line: &CartLine) -> RepoResult<()> {
    Ok(store.insert(Collection::TempOrders, &line.id, line)?)
}

pub fn set_quantity(store: &DocStore, client_id: &str, id: &str, quantity: u32) -> RepoResult<CartLine> {
    let mut batch = store.batch()?;
    let mut line: CartLine = batch
        .get::<CartLine>(Collection::TempOrders, id)?
        .filter(|l| l.client_id == client_id)
        .ok_or_else(|| not_found(id))?;
    line.quantity = quantity;
    batch.put(Collection::TempOrders, id, &line)?;
    batch.commit()?;
    Ok(line)
}

pub fn remove(store: &DocStore, client_id: &str, id: &str) -> RepoResult<()> {
    let mut batch = store.batch()?;
    let owned = batch
        .get::<CartLine>(Collection::TempOrders, id)?
        .is_some_and(|l| l.client_id == client_id);
    if !owned {
        return Err(not_found(id));
    }
    batch.delete(Collection::TempOrders, id)?;
    batch.commit()?;
    Ok(())
}

/// Delete every line of a customer, returns how many were removed
pub fn clear(store: &DocStore, client_id: &str) -> RepoResult<usize> {
    let mut batch = store.batch()?;
    let lines = batch.find(Collection::TempOrders, |l: &CartLine| l.client_id == client_id)?;
    for (id, _) in &lines {
        batch.delete(Collection::TempOrders, id)?;
    }
    batch.commit()?;
    Ok(lines.len())
}
