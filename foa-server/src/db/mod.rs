//! Database Module
//!
//! Embedded redb document store plus per-collection repositories.

pub mod repository;
pub mod store;

pub use store::{Batch, ChangeAction, ChangeEvent, Collection, DocStore, StoreError, StoreResult};
