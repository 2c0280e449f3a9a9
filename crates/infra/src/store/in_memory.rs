use std::sync::{Arc, RwLock};

use mto_inventory::{InventoryRecord, SoftwareInventoryRecord, StockTable, Upsert};
use mto_requirements::{RequirementRecord, SoftwareRequirementRecord};

use super::{CoverageStore, Snapshot, StockWrite, StoreError, WriteMode};

#[derive(Debug, Default)]
struct Tables {
    inventory: StockTable<InventoryRecord>,
    software_inventory: StockTable<SoftwareInventoryRecord>,
    requirements: Vec<RequirementRecord>,
    software_requirements: Vec<SoftwareRequirementRecord>,
}

impl Tables {
    fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            inventory: self.inventory.to_vec(),
            requirements: self.requirements.clone(),
            software_inventory: self.software_inventory.to_vec(),
            software_requirements: self.software_requirements.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    tables: Tables,
    published: Arc<Snapshot>,
}

/// In-memory store for tests/dev.
///
/// Writers mutate the tables and publish a fresh immutable snapshot under the
/// same write lock; readers only clone the published `Arc`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> Result<R, StoreError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))?;
        let out = f(&mut state.tables);
        state.published = Arc::new(state.tables.to_snapshot());
        Ok(out)
    }
}

fn merge_stock<S: mto_inventory::StockLine>(table: &mut StockTable<S>, rows: Vec<S>) -> StockWrite {
    let mut outcome = StockWrite::default();
    for row in rows {
        match table.upsert(row) {
            Upsert::Inserted => outcome.inserted += 1,
            Upsert::Updated => outcome.updated += 1,
        }
    }
    outcome
}

fn write_rows<T>(table: &mut Vec<T>, rows: Vec<T>, mode: WriteMode) -> usize {
    if mode.is_replace() {
        table.clear();
    }
    let inserted = rows.len();
    table.extend(rows);
    inserted
}

#[async_trait::async_trait]
impl CoverageStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.state
            .read()
            .map(|_| ())
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    async fn snapshot(&self) -> Result<Arc<Snapshot>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))?;
        Ok(Arc::clone(&state.published))
    }

    async fn append_inventory(&self, rows: Vec<InventoryRecord>) -> Result<StockWrite, StoreError> {
        self.write(|t| merge_stock(&mut t.inventory, rows))
    }

    async fn append_software_inventory(
        &self,
        rows: Vec<SoftwareInventoryRecord>,
    ) -> Result<StockWrite, StoreError> {
        self.write(|t| merge_stock(&mut t.software_inventory, rows))
    }

    async fn write_requirements(
        &self,
        rows: Vec<RequirementRecord>,
        mode: WriteMode,
    ) -> Result<usize, StoreError> {
        self.write(|t| write_rows(&mut t.requirements, rows, mode))
    }

    async fn write_software_requirements(
        &self,
        rows: Vec<SoftwareRequirementRecord>,
        mode: WriteMode,
    ) -> Result<usize, StoreError> {
        self.write(|t| write_rows(&mut t.software_requirements, rows, mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inv(item: &str, loc: &str, qty: u64) -> InventoryRecord {
        InventoryRecord::new(item, loc, qty).unwrap()
    }

    fn req(lab: &str, item: &str, qty: u64) -> RequirementRecord {
        RequirementRecord::new(None, Some(lab.to_string()), item, qty).unwrap()
    }

    #[tokio::test]
    async fn inventory_rows_accumulate_per_location() {
        let store = InMemoryStore::new();
        let first = store
            .append_inventory(vec![inv("ПК", "201В", 5), inv("ПК", "305", 1)])
            .await
            .unwrap();
        assert_eq!(first, StockWrite { inserted: 2, updated: 0 });

        let second = store.append_inventory(vec![inv("ПК", "201В", 2)]).await.unwrap();
        assert_eq!(second, StockWrite { inserted: 0, updated: 1 });

        let snap = store.snapshot().await.unwrap();
        assert_eq!(snap.inventory, vec![inv("ПК", "201В", 7), inv("ПК", "305", 1)]);
    }

    #[tokio::test]
    async fn replace_clears_requirements_first() {
        let store = InMemoryStore::new();
        store
            .write_requirements(vec![req("lab1", "A", 1), req("lab1", "B", 2)], WriteMode::Append)
            .await
            .unwrap();
        store
            .write_requirements(vec![req("lab2", "C", 3)], WriteMode::Append)
            .await
            .unwrap();
        assert_eq!(store.snapshot().await.unwrap().requirements.len(), 3);

        let inserted = store
            .write_requirements(vec![req("lab3", "D", 4)], WriteMode::Replace)
            .await
            .unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(store.snapshot().await.unwrap().requirements, vec![req("lab3", "D", 4)]);
    }

    #[tokio::test]
    async fn earlier_snapshots_are_unaffected_by_later_imports() {
        let store = InMemoryStore::new();
        store.append_inventory(vec![inv("A", "l", 1)]).await.unwrap();
        let before = store.snapshot().await.unwrap();

        store.append_inventory(vec![inv("A", "l", 10)]).await.unwrap();
        let after = store.snapshot().await.unwrap();

        assert_eq!(before.inventory, vec![inv("A", "l", 1)]);
        assert_eq!(after.inventory, vec![inv("A", "l", 11)]);
    }

    #[tokio::test]
    async fn seeded_store_merges_duplicate_stock_keys() {
        let store = InMemoryStore::from_snapshot(Snapshot {
            inventory: vec![inv("A", "l", 1), inv("A", "l", 2)],
            ..Snapshot::default()
        });
        assert_eq!(store.snapshot().await.unwrap().inventory, vec![inv("A", "l", 3)]);
        assert!(store.ping().await.is_ok());
    }
}
