//! Postgres-backed store.
//!
//! ## Consistency
//!
//! - Imports run in one transaction (a `replace` import deletes and inserts atomically).
//! - Snapshots read all four tables inside one `REPEATABLE READ READ ONLY` transaction,
//!   so a coverage computation never mixes pre- and post-import rows.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | PoolClosed / Io / Tls / PoolTimedOut | `Unavailable` |
//! | Database (check constraint `23514`) | `InvalidData` |
//! | Anything else | `Unavailable` |

use std::sync::Arc;

use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, Row, Transaction};
use tracing::instrument;

use mto_inventory::{InventoryRecord, SoftwareInventoryRecord};
use mto_requirements::{RequirementRecord, SoftwareRequirementRecord};

use super::{CoverageStore, Snapshot, StockWrite, StoreError, WriteMode};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS inventory (
        id BIGSERIAL PRIMARY KEY,
        item_name TEXT NOT NULL,
        location TEXT NOT NULL,
        qty_available BIGINT NOT NULL DEFAULT 0 CHECK (qty_available >= 0),
        CONSTRAINT uq_inventory_item_location UNIQUE (item_name, location)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS requirements (
        id BIGSERIAL PRIMARY KEY,
        discipline TEXT NULL,
        lab TEXT NULL,
        item_name TEXT NOT NULL,
        qty_required BIGINT NOT NULL DEFAULT 0 CHECK (qty_required >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS software_inventory (
        id BIGSERIAL PRIMARY KEY,
        software_name TEXT NOT NULL,
        location TEXT NOT NULL,
        seats_available BIGINT NOT NULL DEFAULT 0 CHECK (seats_available >= 0),
        CONSTRAINT uq_software_inventory_name_location UNIQUE (software_name, location)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS software_requirements (
        id BIGSERIAL PRIMARY KEY,
        discipline TEXT NULL,
        lab TEXT NULL,
        software_name TEXT NOT NULL,
        seats_required BIGINT NOT NULL DEFAULT 0 CHECK (seats_required >= 0)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_requirements_item_name ON requirements (item_name)",
    "CREATE INDEX IF NOT EXISTS ix_software_requirements_name ON software_requirements (software_name)",
];

/// Stock table layout shared by `inventory` and `software_inventory`.
struct StockTableSql {
    table: &'static str,
    name_col: &'static str,
    qty_col: &'static str,
}

const INVENTORY_SQL: StockTableSql = StockTableSql {
    table: "inventory",
    name_col: "item_name",
    qty_col: "qty_available",
};

const SOFTWARE_INVENTORY_SQL: StockTableSql = StockTableSql {
    table: "software_inventory",
    name_col: "software_name",
    qty_col: "seats_available",
};

/// Demand table layout shared by `requirements` and `software_requirements`.
struct DemandTableSql {
    table: &'static str,
    name_col: &'static str,
    qty_col: &'static str,
}

const REQUIREMENTS_SQL: DemandTableSql = DemandTableSql {
    table: "requirements",
    name_col: "item_name",
    qty_col: "qty_required",
};

const SOFTWARE_REQUIREMENTS_SQL: DemandTableSql = DemandTableSql {
    table: "software_requirements",
    name_col: "software_name",
    qty_col: "seats_required",
};

/// Postgres-backed coverage store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and shared via `Arc`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }

    async fn begin(&self, operation: &str) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(operation, e))
    }

    async fn upsert_stock(
        &self,
        sql: &StockTableSql,
        rows: Vec<(String, String, u64)>,
    ) -> Result<StockWrite, StoreError> {
        let operation = "upsert_stock";
        let statement = format!(
            "INSERT INTO {t} ({n}, location, {q}) VALUES ($1, $2, $3) \
             ON CONFLICT ({n}, location) DO UPDATE SET {q} = {t}.{q} + EXCLUDED.{q} \
             RETURNING (xmax = 0) AS inserted",
            t = sql.table,
            n = sql.name_col,
            q = sql.qty_col,
        );

        let mut tx = self.begin(operation).await?;
        let mut outcome = StockWrite::default();
        for (name, location, qty) in rows {
            let row = sqlx::query(&statement)
                .bind(name)
                .bind(location)
                .bind(to_db_qty(qty)?)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error(operation, e))?;
            let inserted: bool = row
                .try_get("inserted")
                .map_err(|e| StoreError::InvalidData(format!("failed to read upsert flag: {e}")))?;
            if inserted {
                outcome.inserted += 1;
            } else {
                outcome.updated += 1;
            }
        }
        tx.commit().await.map_err(|e| map_sqlx_error(operation, e))?;
        Ok(outcome)
    }

    async fn write_demand(
        &self,
        sql: &DemandTableSql,
        rows: Vec<(Option<String>, Option<String>, String, u64)>,
        mode: WriteMode,
    ) -> Result<usize, StoreError> {
        let operation = "write_demand";
        let insert = format!(
            "INSERT INTO {t} (discipline, lab, {n}, {q}) VALUES ($1, $2, $3, $4)",
            t = sql.table,
            n = sql.name_col,
            q = sql.qty_col,
        );

        let mut tx = self.begin(operation).await?;
        if mode.is_replace() {
            sqlx::query(&format!("DELETE FROM {}", sql.table))
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error(operation, e))?;
        }
        let mut inserted = 0usize;
        for (discipline, lab, name, qty) in rows {
            sqlx::query(&insert)
                .bind(discipline)
                .bind(lab)
                .bind(name)
                .bind(to_db_qty(qty)?)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error(operation, e))?;
            inserted += 1;
        }
        tx.commit().await.map_err(|e| map_sqlx_error(operation, e))?;
        Ok(inserted)
    }
}

#[async_trait::async_trait]
impl CoverageStore for PostgresStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map(|_| ())
            .map_err(|e| map_sqlx_error("ping", e))
    }

    #[instrument(skip(self), err)]
    async fn snapshot(&self) -> Result<Arc<Snapshot>, StoreError> {
        let operation = "snapshot";
        let mut tx = self.begin(operation).await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        let inventory = fetch_stock(&mut tx, &INVENTORY_SQL)
            .await?
            .into_iter()
            .map(|(name, location, qty)| InventoryRecord {
                item_name: name,
                location,
                qty_available: qty,
            })
            .collect();
        let software_inventory = fetch_stock(&mut tx, &SOFTWARE_INVENTORY_SQL)
            .await?
            .into_iter()
            .map(|(name, location, qty)| SoftwareInventoryRecord {
                software_name: name,
                location,
                seats_available: qty,
            })
            .collect();
        let requirements = fetch_demand(&mut tx, &REQUIREMENTS_SQL)
            .await?
            .into_iter()
            .map(|(discipline, lab, name, qty)| RequirementRecord {
                discipline,
                lab,
                item_name: name,
                qty_required: qty,
            })
            .collect();
        let software_requirements = fetch_demand(&mut tx, &SOFTWARE_REQUIREMENTS_SQL)
            .await?
            .into_iter()
            .map(|(discipline, lab, name, qty)| SoftwareRequirementRecord {
                discipline,
                lab,
                software_name: name,
                seats_required: qty,
            })
            .collect();

        tx.commit().await.map_err(|e| map_sqlx_error(operation, e))?;

        Ok(Arc::new(Snapshot {
            inventory,
            requirements,
            software_inventory,
            software_requirements,
        }))
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()), err)]
    async fn append_inventory(&self, rows: Vec<InventoryRecord>) -> Result<StockWrite, StoreError> {
        let rows = rows
            .into_iter()
            .map(|r| (r.item_name, r.location, r.qty_available))
            .collect();
        self.upsert_stock(&INVENTORY_SQL, rows).await
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()), err)]
    async fn append_software_inventory(
        &self,
        rows: Vec<SoftwareInventoryRecord>,
    ) -> Result<StockWrite, StoreError> {
        let rows = rows
            .into_iter()
            .map(|r| (r.software_name, r.location, r.seats_available))
            .collect();
        self.upsert_stock(&SOFTWARE_INVENTORY_SQL, rows).await
    }

    #[instrument(skip(self, rows), fields(rows = rows.len(), mode = ?mode), err)]
    async fn write_requirements(
        &self,
        rows: Vec<RequirementRecord>,
        mode: WriteMode,
    ) -> Result<usize, StoreError> {
        let rows = rows
            .into_iter()
            .map(|r| (r.discipline, r.lab, r.item_name, r.qty_required))
            .collect();
        self.write_demand(&REQUIREMENTS_SQL, rows, mode).await
    }

    #[instrument(skip(self, rows), fields(rows = rows.len(), mode = ?mode), err)]
    async fn write_software_requirements(
        &self,
        rows: Vec<SoftwareRequirementRecord>,
        mode: WriteMode,
    ) -> Result<usize, StoreError> {
        let rows = rows
            .into_iter()
            .map(|r| (r.discipline, r.lab, r.software_name, r.seats_required))
            .collect();
        self.write_demand(&SOFTWARE_REQUIREMENTS_SQL, rows, mode).await
    }
}

async fn fetch_stock(
    tx: &mut Transaction<'static, Postgres>,
    sql: &StockTableSql,
) -> Result<Vec<(String, String, u64)>, StoreError> {
    let statement = format!(
        "SELECT {n} AS name, location, {q} AS qty FROM {t} ORDER BY {n} ASC, location ASC",
        t = sql.table,
        n = sql.name_col,
        q = sql.qty_col,
    );
    let rows = sqlx::query(&statement)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("fetch_stock", e))?;

    rows.iter()
        .map(|row| {
            Ok((
                get::<String>(row, "name")?,
                get::<String>(row, "location")?,
                from_db_qty(get::<i64>(row, "qty")?)?,
            ))
        })
        .collect()
}

async fn fetch_demand(
    tx: &mut Transaction<'static, Postgres>,
    sql: &DemandTableSql,
) -> Result<Vec<(Option<String>, Option<String>, String, u64)>, StoreError> {
    let statement = format!(
        "SELECT discipline, lab, {n} AS name, {q} AS qty FROM {t} ORDER BY id ASC",
        t = sql.table,
        n = sql.name_col,
        q = sql.qty_col,
    );
    let rows = sqlx::query(&statement)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("fetch_demand", e))?;

    rows.iter()
        .map(|row| {
            Ok((
                get::<Option<String>>(row, "discipline")?,
                get::<Option<String>>(row, "lab")?,
                get::<String>(row, "name")?,
                from_db_qty(get::<i64>(row, "qty")?)?,
            ))
        })
        .collect()
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::InvalidData(format!("failed to read column {column}: {e}")))
}

fn to_db_qty(qty: u64) -> Result<i64, StoreError> {
    i64::try_from(qty).map_err(|_| StoreError::InvalidData(format!("quantity {qty} exceeds BIGINT")))
}

fn from_db_qty(qty: i64) -> Result<u64, StoreError> {
    u64::try_from(qty).map_err(|_| StoreError::InvalidData(format!("negative quantity {qty} in store")))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // Check constraint violation (negative quantity)
                Some("23514") => StoreError::InvalidData(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool timed out in {}", operation))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {}: {}", operation, err)),
    }
}
