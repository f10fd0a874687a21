//! Account Repository (identity records)

use super::{RepoError, RepoResult};
use crate::db::{Batch, Collection, DocStore};
use shared::error::ErrorCode;
use shared::models::Account;
use shared::util::normalize_email;

pub fn find_by_id(store: &DocStore, uid: &str) -> RepoResult<Option<Account>> {
    Ok(store.get(Collection::Accounts, uid)?)
}

pub fn find_by_email(store: &DocStore, email: &str) -> RepoResult<Option<Account>> {
    let email = normalize_email(email);
    Ok(store.find_one(Collection::Accounts, |a: &Account| a.email == email)?)
}

/// Stage a new account inside `batch`; the email must be unused
pub fn insert(batch: &mut Batch<'_>, account: &Account) -> RepoResult<()> {
    let email = account.email.clone();
    let taken = !batch
        .find(Collection::Accounts, |a: &Account| a.email == email)?
        .is_empty();
    if taken {
        return Err(RepoError::Duplicate(
            ErrorCode::EmailAlreadyRegistered,
            format!("Email {} is already registered", account.email),
        ));
    }
    batch.insert(Collection::Accounts, &account.id, account)?;
    Ok(())
}

pub fn update_password(store: &DocStore, uid: &str, password_hash: String) -> RepoResult<()> {
    let mut batch = store.batch()?;
    let mut account: Account = batch
        .get(Collection::Accounts, uid)?
        .ok_or_else(|| RepoError::NotFound(ErrorCode::NotFound, format!("Account {uid} not found")))?;
    account.password_hash = password_hash;
    batch.put(Collection::Accounts, uid, &account)?;
    batch.commit()?;
    Ok(())
}
