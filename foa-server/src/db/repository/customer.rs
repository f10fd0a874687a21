//! Customer Repository

use super::{RepoError, RepoResult};
use crate::db::{Batch, Collection, DocStore};
use shared::error::ErrorCode;
use shared::models::{Customer, CustomerUpdate};
use shared::util::normalize_email;

fn not_found(id: &str) -> RepoError {
    RepoError::NotFound(ErrorCode::CustomerNotFound, format!("Customer {id} not found"))
}

/// All customers, newest first
pub fn find_all(store: &DocStore) -> RepoResult<Vec<Customer>> {
    let mut customers: Vec<Customer> = store.list(Collection::Customers)?;
    customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(customers)
}

pub fn find_by_id(store: &DocStore, id: &str) -> RepoResult<Option<Customer>> {
    Ok(store.get(Collection::Customers, id)?)
}

pub fn find_by_uid(store: &DocStore, uid: &str) -> RepoResult<Option<Customer>> {
    Ok(store.find_one(Collection::Customers, |c: &Customer| c.uid == uid)?)
}

pub fn find_by_email(store: &DocStore, email: &str) -> RepoResult<Option<Customer>> {
    let email = normalize_email(email);
    Ok(store.find_one(Collection::Customers, |c: &Customer| c.email == email)?)
}

/// Stage a new profile inside `batch`; one profile per uid
pub fn insert(batch: &mut Batch<'_>, customer: &Customer) -> RepoResult<()> {
    let uid = customer.uid.clone();
    if !batch
        .find(Collection::Customers, |c: &Customer| c.uid == uid)?
        .is_empty()
    {
        return Err(RepoError::Duplicate(
            ErrorCode::AlreadyExists,
            format!("Customer profile for {} already exists", customer.uid),
        ));
    }
    batch.insert(Collection::Customers, &customer.id, customer)?;
    Ok(())
}

pub fn update(store: &DocStore, id: &str, data: CustomerUpdate) -> RepoResult<Customer> {
    let mut batch = store.batch()?;
    let mut customer: Customer = batch
        .get(Collection::Customers, id)?
        .ok_or_else(|| not_found(id))?;

    if let Some(v) = data.first_name {
        customer.first_name = v;
    }
    if let Some(v) = data.last_name {
        customer.last_name = v;
    }
    if let Some(v) = data.contact {
        customer.contact = v;
    }
    if let Some(v) = data.address {
        customer.address = v;
    }
    if data.gender.is_some() {
        customer.gender = data.gender;
    }
    if data.image_url.is_some() {
        customer.image_url = data.image_url;
    }
    if let Some(location) = data.location {
        if !batch.exists(Collection::Locations, &location)? {
            return Err(RepoError::NotFound(
                ErrorCode::LocationNotFound,
                format!("Location {location} not found"),
            ));
        }
        customer.location = Some(location);
    }

    batch.put(Collection::Customers, id, &customer)?;
    batch.commit()?;
    Ok(customer)
}

/// Flip the active flag; inactive customers cannot sign in
pub fn toggle_status(store: &DocStore, id: &str) -> RepoResult<Customer> {
    let mut batch = store.batch()?;
    let mut customer: Customer = batch
        .get(Collection::Customers, id)?
        .ok_or_else(|| not_found(id))?;
    customer.status = !customer.status;
    batch.put(Collection::Customers, id, &customer)?;
    batch.commit()?;
    Ok(customer)
}

pub fn count(store: &DocStore) -> RepoResult<u64> {
    Ok(store.count(Collection::Customers)?)
}
