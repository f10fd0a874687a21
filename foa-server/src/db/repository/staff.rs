//! Staff Repository

use super::{RepoError, RepoResult};
use crate::db::{Batch, Collection, DocStore};
use shared::error::ErrorCode;
use shared::models::{Account, Staff, StaffRole, StaffUpdate};
use shared::util::normalize_email;

fn not_found(id: &str) -> RepoError {
    RepoError::NotFound(ErrorCode::StaffNotFound, format!("Staff {id} not found"))
}

/// Roster, optionally filtered by role, newest first
pub fn find_all(store: &DocStore, role: Option<StaffRole>) -> RepoResult<Vec<Staff>> {
    let mut staff: Vec<Staff> = store.find(Collection::Staff, |s: &Staff| {
        role.is_none_or(|r| s.role == r)
    })?;
    staff.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(staff)
}

pub fn find_by_id(store: &DocStore, id: &str) -> RepoResult<Option<Staff>> {
    Ok(store.get(Collection::Staff, id)?)
}

pub fn find_by_uid(store: &DocStore, uid: &str) -> RepoResult<Option<Staff>> {
    Ok(store.find_one(Collection::Staff, |s: &Staff| s.uid == uid)?)
}

pub fn find_by_email(store: &DocStore, email: &str) -> RepoResult<Option<Staff>> {
    let email = normalize_email(email);
    Ok(store.find_one(Collection::Staff, |s: &Staff| s.email == email)?)
}

/// Active delivery guys assigned to a location
pub fn delivery_guys_at(store: &DocStore, location_id: &str) -> RepoResult<Vec<Staff>> {
    Ok(store.find(Collection::Staff, |s: &Staff| {
        s.role == StaffRole::DeliveryGuy && s.status && s.location.as_deref() == Some(location_id)
    })?)
}

pub fn count(store: &DocStore) -> RepoResult<u64> {
    Ok(store.count(Collection::Staff)?)
}

/// Delivery guys need an existing location
fn check_assignment(batch: &Batch<'_>, role: StaffRole, location: Option<&str>) -> RepoResult<()> {
    match (role, location) {
        (StaffRole::DeliveryGuy, None) => Err(RepoError::Validation(
            ErrorCode::DeliveryLocationRequired,
            "Delivery staff must be assigned a location".into(),
        )),
        (_, Some(location)) if !batch.exists(Collection::Locations, location)? => {
            Err(RepoError::NotFound(
                ErrorCode::LocationNotFound,
                format!("Location {location} not found"),
            ))
        }
        _ => Ok(()),
    }
}

/// Stage a new staff record inside `batch`
pub fn insert(batch: &mut Batch<'_>, staff: &Staff) -> RepoResult<()> {
    let email = staff.email.clone();
    if !batch
        .find(Collection::Staff, |s: &Staff| s.email == email)?
        .is_empty()
    {
        return Err(RepoError::Duplicate(
            ErrorCode::StaffEmailExists,
            format!("Staff email {} already exists", staff.email),
        ));
    }
    check_assignment(batch, staff.role, staff.location.as_deref())?;
    batch.insert(Collection::Staff, &staff.id, staff)?;
    Ok(())
}

pub fn update(store: &DocStore, id: &str, data: StaffUpdate) -> RepoResult<Staff> {
    let mut batch = store.batch()?;
    let mut staff: Staff = batch.get(Collection::Staff, id)?.ok_or_else(|| not_found(id))?;

    if let Some(v) = data.name {
        staff.name = v;
    }
    if let Some(v) = data.phone {
        staff.phone = v;
    }
    if let Some(v) = data.address {
        staff.address = v;
    }
    if let Some(v) = data.role {
        staff.role = v;
    }
    if data.location.is_some() {
        staff.location = data.location;
    }
    if data.image.is_some() {
        staff.image = data.image;
    }
    check_assignment(&batch, staff.role, staff.location.as_deref())?;

    batch.put(Collection::Staff, id, &staff)?;
    batch.commit()?;
    Ok(staff)
}

pub fn toggle_status(store: &DocStore, id: &str) -> RepoResult<Staff> {
    let mut batch = store.batch()?;
    let mut staff: Staff = batch.get(Collection::Staff, id)?.ok_or_else(|| not_found(id))?;
    staff.status = !staff.status;
    batch.put(Collection::Staff, id, &staff)?;
    batch.commit()?;
    Ok(staff)
}

/// Remove the staff record together with its sign-in account
pub fn delete(store: &DocStore, id: &str) -> RepoResult<Staff> {
    let mut batch = store.batch()?;
    let staff: Staff = batch.get(Collection::Staff, id)?.ok_or_else(|| not_found(id))?;
    batch.delete(Collection::Staff, id)?;
    if batch.get::<Account>(Collection::Accounts, &staff.uid)?.is_some() {
        batch.delete(Collection::Accounts, &staff.uid)?;
    }
    batch.commit()?;
    Ok(staff)
}
