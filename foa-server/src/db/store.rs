//! redb-backed document store
//!
//! # Tables
//!
//! One table per collection, `&str` id → JSON document bytes.
//!
//! | Collection | Key | Value |
//! |------------|-----|-------|
//! | `accounts` | uid | `Account` |
//! | `customers` | customer id | `Customer` |
//! | `staff` | staff id | `Staff` |
//! | `foods` / `categories` / `toppings` / `location` | id | catalog documents |
//! | `tempOrders` | line id | `CartLine` |
//! | `orders` | order id | `Order` |
//! | `tempComplaints` / `complaints` | message id | `Message` |
//! | `foodCounts` | food id | `FoodCount` |
//! | `checkouts` | payment reference | `PendingCheckout` |
//! | `payments` | payment reference | `PaymentRecord` |
//!
//! # Atomicity
//!
//! Every mutation goes through a [`Batch`], which wraps a single redb write
//! transaction. redb serializes writers, so a batch sees a consistent view
//! and either all of its writes land or none do. Change events are published
//! only after a successful commit.

use dashmap::DashMap;
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Change feed capacity; slow subscribers see `Lagged` and resync
const CHANGE_CHANNEL_CAPACITY: usize = 1024;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document already exists: {collection}/{id}")]
    Duplicate {
        collection: &'static str,
        id: String,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for shared::error::AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { collection, id } => {
                shared::error::AppError::already_exists(format!("{collection}/{id}"))
            }
            other => {
                tracing::error!(error = %other, "Document store failure");
                shared::error::AppError::database(other.to_string())
            }
        }
    }
}

/// Document collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Accounts,
    Customers,
    Staff,
    Foods,
    Categories,
    Toppings,
    Locations,
    Orders,
    TempOrders,
    Complaints,
    TempComplaints,
    FoodCounts,
    Checkouts,
    Payments,
}

impl Collection {
    pub const ALL: [Collection; 14] = [
        Collection::Accounts,
        Collection::Customers,
        Collection::Staff,
        Collection::Foods,
        Collection::Categories,
        Collection::Toppings,
        Collection::Locations,
        Collection::Orders,
        Collection::TempOrders,
        Collection::Complaints,
        Collection::TempComplaints,
        Collection::FoodCounts,
        Collection::Checkouts,
        Collection::Payments,
    ];

    /// Table name, kept identical to the document collection names clients know
    pub const fn name(&self) -> &'static str {
        match self {
            Collection::Accounts => "accounts",
            Collection::Customers => "customers",
            Collection::Staff => "staff",
            Collection::Foods => "foods",
            Collection::Categories => "categories",
            Collection::Toppings => "toppings",
            Collection::Locations => "location",
            Collection::Orders => "orders",
            Collection::TempOrders => "tempOrders",
            Collection::Complaints => "complaints",
            Collection::TempComplaints => "tempComplaints",
            Collection::FoodCounts => "foodCounts",
            Collection::Checkouts => "checkouts",
            Collection::Payments => "payments",
        }
    }

    const fn table(&self) -> TableDefinition<'static, &'static str, &'static [u8]> {
        TableDefinition::new(self.name())
    }
}

impl Serialize for Collection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

/// Published after every committed write
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub action: ChangeAction,
    pub id: String,
    /// Per-collection version after this change
    pub version: u64,
}

/// Document store backed by redb
#[derive(Clone)]
pub struct DocStore {
    db: Arc<Database>,
    changes: broadcast::Sender<ChangeEvent>,
    versions: Arc<DashMap<Collection, u64>>,
}

impl std::fmt::Debug for DocStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocStore").finish_non_exhaustive()
    }
}

impl DocStore {
    /// Open or create the database file at `path`
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open a fresh in-memory database (tests, tooling)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StoreResult<Self> {
        let write_txn = db.begin_write()?;
        for collection in Collection::ALL {
            let _ = write_txn.open_table(collection.table())?;
        }
        write_txn.commit()?;

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            db: Arc::new(db),
            changes,
            versions: Arc::new(DashMap::new()),
        })
    }

    // ========== Reads ==========

    /// Get a document by id
    pub fn get<T: DeserializeOwned>(&self, collection: Collection, id: &str) -> StoreResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(collection.table())?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load every document of a collection
    pub fn list<T: DeserializeOwned>(&self, collection: Collection) -> StoreResult<Vec<T>> {
        self.find(collection, |_: &T| true)
    }

    /// Load the documents matching `pred`
    pub fn find<T, F>(&self, collection: Collection, pred: F) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(collection.table())?;
        let mut docs = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let doc: T = serde_json::from_slice(value.value())?;
            if pred(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    /// First document matching `pred`
    pub fn find_one<T, F>(&self, collection: Collection, pred: F) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(collection.table())?;
        for result in table.iter()? {
            let (_key, value) = result?;
            let doc: T = serde_json::from_slice(value.value())?;
            if pred(&doc) {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: Collection) -> StoreResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(collection.table())?;
        Ok(table.len()?)
    }

    // ========== Writes ==========

    /// Begin an atomic multi-collection batch
    pub fn batch(&self) -> StoreResult<Batch<'_>> {
        Ok(Batch {
            store: self,
            txn: self.db.begin_write()?,
            changes: Vec::new(),
        })
    }

    /// Insert a new document; fails if the id is taken
    pub fn insert<T: Serialize>(&self, collection: Collection, id: &str, doc: &T) -> StoreResult<()> {
        let mut batch = self.batch()?;
        batch.insert(collection, id, doc)?;
        batch.commit()
    }

    /// Insert or replace a document
    pub fn put<T: Serialize>(&self, collection: Collection, id: &str, doc: &T) -> StoreResult<()> {
        let mut batch = self.batch()?;
        batch.put(collection, id, doc)?;
        batch.commit()
    }

    /// Delete a document, returns whether it existed
    pub fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let mut batch = self.batch()?;
        let existed = batch.delete(collection, id)?;
        batch.commit()?;
        Ok(existed)
    }

    // ========== Change feed ==========

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    /// Current version of a collection (0 if never written)
    pub fn version(&self, collection: Collection) -> u64 {
        self.versions.get(&collection).map(|v| *v).unwrap_or(0)
    }

    fn publish(&self, collection: Collection, action: ChangeAction, id: String) {
        let version = {
            let mut entry = self.versions.entry(collection).or_insert(0);
            *entry += 1;
            *entry
        };
        // No subscribers is fine
        let _ = self.changes.send(ChangeEvent {
            collection,
            action,
            id,
            version,
        });
    }
}

/// One redb write transaction plus the change events it will publish
pub struct Batch<'a> {
    store: &'a DocStore,
    txn: WriteTransaction,
    changes: Vec<(Collection, ChangeAction, String)>,
}

impl Batch<'_> {
    /// Read a document inside the transaction (sees this batch's own writes)
    pub fn get<T: DeserializeOwned>(&self, collection: Collection, id: &str) -> StoreResult<Option<T>> {
        let table = self.txn.open_table(collection.table())?;
        let value = table.get(id)?.map(|guard| guard.value().to_vec());
        match value {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Documents matching `pred`, read inside the transaction
    pub fn find<T, F>(&self, collection: Collection, pred: F) -> StoreResult<Vec<(String, T)>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let table = self.txn.open_table(collection.table())?;
        let mut docs = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            let doc: T = serde_json::from_slice(value.value())?;
            if pred(&doc) {
                docs.push((key.value().to_string(), doc));
            }
        }
        Ok(docs)
    }

    pub fn exists(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let table = self.txn.open_table(collection.table())?;
        Ok(table.get(id)?.is_some())
    }

    /// Insert a new document; fails with `Duplicate` if the id is taken
    pub fn insert<T: Serialize>(&mut self, collection: Collection, id: &str, doc: &T) -> StoreResult<()> {
        let bytes = serde_json::to_vec(doc)?;
        {
            let mut table = self.txn.open_table(collection.table())?;
            if table.get(id)?.is_some() {
                return Err(StoreError::Duplicate {
                    collection: collection.name(),
                    id: id.to_string(),
                });
            }
            table.insert(id, bytes.as_slice())?;
        }
        self.changes
            .push((collection, ChangeAction::Created, id.to_string()));
        Ok(())
    }

    /// Insert or replace a document
    pub fn put<T: Serialize>(&mut self, collection: Collection, id: &str, doc: &T) -> StoreResult<()> {
        let bytes = serde_json::to_vec(doc)?;
        let existed = {
            let mut table = self.txn.open_table(collection.table())?;
            table.insert(id, bytes.as_slice())?.is_some()
        };
        let action = if existed {
            ChangeAction::Updated
        } else {
            ChangeAction::Created
        };
        self.changes.push((collection, action, id.to_string()));
        Ok(())
    }

    /// Delete a document, returns whether it existed
    pub fn delete(&mut self, collection: Collection, id: &str) -> StoreResult<bool> {
        let existed = {
            let mut table = self.txn.open_table(collection.table())?;
            table.remove(id)?.is_some()
        };
        if existed {
            self.changes
                .push((collection, ChangeAction::Deleted, id.to_string()));
        }
        Ok(existed)
    }

    /// Commit all writes atomically, then publish their change events
    pub fn commit(self) -> StoreResult<()> {
        let Batch {
            store,
            txn,
            changes,
        } = self;
        txn.commit()?;
        for (collection, action, id) in changes {
            store.publish(collection, action, id);
        }
        Ok(())
    }

    /// Drop the transaction without writing anything
    pub fn abort(self) -> StoreResult<()> {
        self.txn.abort()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Doc {
        id: String,
        n: u32,
    }

    fn doc(id: &str, n: u32) -> Doc {
        Doc {
            id: id.to_string(),
            n,
        }
    }

    #[test]
    fn test_put_get_delete() {
        let store = DocStore::open_in_memory().unwrap();
        store.put(Collection::Foods, "a", &doc("a", 1)).unwrap();

        let loaded: Option<Doc> = store.get(Collection::Foods, "a").unwrap();
        assert_eq!(loaded, Some(doc("a", 1)));
        assert_eq!(store.count(Collection::Foods).unwrap(), 1);

        assert!(store.delete(Collection::Foods, "a").unwrap());
        assert!(!store.delete(Collection::Foods, "a").unwrap());
        let loaded: Option<Doc> = store.get(Collection::Foods, "a").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_collections_are_isolated() {
        let store = DocStore::open_in_memory().unwrap();
        store.put(Collection::Orders, "x", &doc("x", 1)).unwrap();
        let in_temp: Option<Doc> = store.get(Collection::TempOrders, "x").unwrap();
        assert!(in_temp.is_none());
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let store = DocStore::open_in_memory().unwrap();
        store.insert(Collection::Payments, "ref", &doc("ref", 1)).unwrap();
        let err = store
            .insert(Collection::Payments, "ref", &doc("ref", 2))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        let kept: Option<Doc> = store.get(Collection::Payments, "ref").unwrap();
        assert_eq!(kept.unwrap().n, 1);
    }

    #[test]
    fn test_find_with_predicate() {
        let store = DocStore::open_in_memory().unwrap();
        for i in 0..5 {
            store
                .put(Collection::Foods, &format!("f{i}"), &doc(&format!("f{i}"), i))
                .unwrap();
        }
        let even: Vec<Doc> = store.find(Collection::Foods, |d: &Doc| d.n % 2 == 0).unwrap();
        assert_eq!(even.len(), 3);
        let first: Option<Doc> = store.find_one(Collection::Foods, |d: &Doc| d.n == 4).unwrap();
        assert_eq!(first.unwrap().id, "f4");
    }

    #[test]
    fn test_batch_is_atomic() {
        let store = DocStore::open_in_memory().unwrap();
        store.put(Collection::TempOrders, "l1", &doc("l1", 1)).unwrap();

        // Abort leaves everything as it was
        let mut batch = store.batch().unwrap();
        batch.put(Collection::Orders, "o1", &doc("o1", 1)).unwrap();
        batch.delete(Collection::TempOrders, "l1").unwrap();
        batch.abort().unwrap();

        let order: Option<Doc> = store.get(Collection::Orders, "o1").unwrap();
        assert!(order.is_none());
        let line: Option<Doc> = store.get(Collection::TempOrders, "l1").unwrap();
        assert!(line.is_some());

        // Commit applies both
        let mut batch = store.batch().unwrap();
        batch.put(Collection::Orders, "o1", &doc("o1", 1)).unwrap();
        batch.delete(Collection::TempOrders, "l1").unwrap();
        batch.commit().unwrap();

        let order: Option<Doc> = store.get(Collection::Orders, "o1").unwrap();
        assert!(order.is_some());
        let line: Option<Doc> = store.get(Collection::TempOrders, "l1").unwrap();
        assert!(line.is_none());
    }

    #[test]
    fn test_batch_reads_own_writes() {
        let store = DocStore::open_in_memory().unwrap();
        let mut batch = store.batch().unwrap();
        batch.put(Collection::FoodCounts, "f1", &doc("f1", 3)).unwrap();
        let seen: Option<Doc> = batch.get(Collection::FoodCounts, "f1").unwrap();
        assert_eq!(seen.unwrap().n, 3);
        assert!(batch.exists(Collection::FoodCounts, "f1").unwrap());
        let all: Vec<(String, Doc)> = batch.find(Collection::FoodCounts, |_: &Doc| true).unwrap();
        assert_eq!(all.len(), 1);
        batch.commit().unwrap();
    }

    #[tokio::test]
    async fn test_change_feed_after_commit() {
        let store = DocStore::open_in_memory().unwrap();
        let mut rx = store.subscribe();

        store.put(Collection::TempOrders, "l1", &doc("l1", 1)).unwrap();
        store.put(Collection::TempOrders, "l1", &doc("l1", 2)).unwrap();
        store.delete(Collection::TempOrders, "l1").unwrap();

        let created = rx.recv().await.unwrap();
        assert_eq!(created.action, ChangeAction::Created);
        assert_eq!(created.version, 1);
        let updated = rx.recv().await.unwrap();
        assert_eq!(updated.action, ChangeAction::Updated);
        let deleted = rx.recv().await.unwrap();
        assert_eq!(deleted.action, ChangeAction::Deleted);
        assert_eq!(deleted.id, "l1");
        assert_eq!(store.version(Collection::TempOrders), 3);
        assert_eq!(store.version(Collection::Orders), 0);
    }

    #[test]
    fn test_aborted_batch_publishes_nothing() {
        let store = DocStore::open_in_memory().unwrap();
        let mut rx = store.subscribe();
        let mut batch = store.batch().unwrap();
        batch.put(Collection::Foods, "f", &doc("f", 1)).unwrap();
        batch.abort().unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_reopen_file_keeps_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foa.redb");
        {
            let store = DocStore::open(&path).unwrap();
            store.put(Collection::Categories, "c1", &doc("c1", 9)).unwrap();
        }
        let store = DocStore::open(&path).unwrap();
        let loaded: Option<Doc> = store.get(Collection::Categories, "c1").unwrap();
        assert_eq!(loaded.unwrap().n, 9);
    }
}
