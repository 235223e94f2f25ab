use async_trait::async_trait;
use tracing::info;

use crate::db::DbPool;
use crate::error::{PipelineError, Result};

/// Minimal surface the loader needs from the warehouse: execute one
/// statement, committed before the call returns.
#[async_trait]
pub trait StatementExecutor {
    async fn execute(&mut self, statement: &str) -> Result<()>;
}

#[async_trait]
impl StatementExecutor for DbPool {
    async fn execute(&mut self, statement: &str) -> Result<()> {
        sqlx::query(statement).execute(&*self).await?;
        Ok(())
    }
}

/// Runs the statement queue strictly in order, one commit per statement. The
/// first failure aborts the remainder; statements already committed stay
/// committed, so a failed run can leave a partial load behind. That is the
/// accepted failure mode for this scheduled batch job, and the error names
/// the statement that broke the queue.
pub async fn load_all<E>(executor: &mut E, statements: &[String]) -> Result<usize>
where
    E: StatementExecutor + Send + ?Sized,
{
    for (index, statement) in statements.iter().enumerate() {
        executor.execute(statement).await.map_err(|source| {
            PipelineError::Processing(format!(
                "warehouse statement {}/{} failed: {}",
                index + 1,
                statements.len(),
                source
            ))
        })?;
        info!(
            statement = index + 1,
            total = statements.len(),
            "warehouse statement committed"
        );
    }

    Ok(statements.len())
}
