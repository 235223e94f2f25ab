use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::DbPool;
use crate::error::Result;

/// Read-only warehouse surface the quality checks run against.
#[async_trait]
pub trait WarehouseInspector {
    /// Names of the user tables in the public schema.
    async fn user_tables(&self) -> Result<Vec<String>>;
    async fn count_rows(&self, table: &str) -> Result<i64>;
    /// Count of distinct full rows, compared against the total to detect
    /// duplicates.
    async fn count_distinct_rows(&self, table: &str) -> Result<i64>;
}

#[async_trait]
impl WarehouseInspector for DbPool {
    async fn user_tables(&self) -> Result<Vec<String>> {
        let tables: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#,
        )
        .fetch_all(self)
        .await?;
        Ok(tables)
    }

    async fn count_rows(&self, table: &str) -> Result<i64> {
        // Table names come from the catalog query above, never from user
        // input; identifiers cannot be bound as parameters.
        let count: i64 = sqlx::query_scalar(&format!(r#"SELECT COUNT(*) FROM "{}""#, table))
            .fetch_one(self)
            .await?;
        Ok(count)
    }

    async fn count_distinct_rows(&self, table: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(&format!(
            r#"SELECT COUNT(*) FROM (SELECT DISTINCT * FROM "{}") AS distinct_rows"#,
            table
        ))
        .fetch_one(self)
        .await?;
        Ok(count)
    }
}

#[derive(Debug)]
pub struct CountCheck {
    pub table: String,
    pub rows: i64,
}

impl CountCheck {
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

#[derive(Debug)]
pub struct DuplicateCheck {
    pub table: String,
    pub total_rows: i64,
    pub distinct_rows: i64,
}

impl DuplicateCheck {
    pub fn duplicates(&self) -> i64 {
        self.total_rows - self.distinct_rows
    }
}

/// Row-count verification over every user table. Findings are logged as
/// warnings and returned; they never fail the run.
pub async fn check_counts<W>(warehouse: &W) -> Result<Vec<CountCheck>>
where
    W: WarehouseInspector + Sync + ?Sized,
{
    let mut checks = Vec::new();
    for table in warehouse.user_tables().await? {
        let rows = warehouse.count_rows(&table).await?;
        if rows == 0 {
            warn!(table = %table, "table is empty");
        } else {
            info!(table = %table, rows, "row count verified");
        }
        checks.push(CountCheck { table, rows });
    }
    Ok(checks)
}

/// Duplicate detection over every user table, comparing the total row count
/// against the count of distinct full rows. Findings are logged as warnings
/// and returned; they never fail the run.
pub async fn check_duplicates<W>(warehouse: &W) -> Result<Vec<DuplicateCheck>>
where
    W: WarehouseInspector + Sync + ?Sized,
{
    let mut checks = Vec::new();
    for table in warehouse.user_tables().await? {
        let total_rows = warehouse.count_rows(&table).await?;
        let distinct_rows = warehouse.count_distinct_rows(&table).await?;
        let check = DuplicateCheck {
            table,
            total_rows,
            distinct_rows,
        };
        if check.duplicates() > 0 {
            warn!(
                table = %check.table,
                duplicates = check.duplicates(),
                "duplicate rows detected"
            );
        } else {
            info!(table = %check.table, "no duplicate rows");
        }
        checks.push(check);
    }
    Ok(checks)
}
