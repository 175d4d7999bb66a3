use crate::errors::DatabaseError;
use deadpool_diesel::postgres::Pool;

/// Extension trait for deadpool-diesel `Pool` running a blocking diesel
/// closure with an operation label used for logs and errors.
pub trait StrategyPool {
    /// # Example
    /// ```ignore
    /// let info = pool
    ///     .interact_with_context("load strategy meta info".to_string(), move |conn| {
    ///         StrategyMetaInfo::find_by_id(&id, conn)
    ///     })
    ///     .await?;
    /// ```
    fn interact_with_context<F, T, E>(
        &self,
        operation: String,
        f: F,
    ) -> impl std::future::Future<Output = Result<T, DatabaseError>> + Send
    where
        F: FnOnce(&mut diesel::PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<DatabaseError> + Send + 'static;
}

impl StrategyPool for Pool {
    async fn interact_with_context<F, T, E>(
        &self,
        operation: String,
        f: F,
    ) -> Result<T, DatabaseError>
    where
        F: FnOnce(&mut diesel::PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<DatabaseError> + Send + 'static,
    {
        let conn = self.get().await.map_err(|e| {
            tracing::error!(
                operation = %operation,
                error = %e,
                "Failed to get database connection from pool"
            );
            DatabaseError::PoolError {
                operation: operation.clone(),
                message: e.to_string(),
            }
        })?;

        conn.interact(move |conn| f(conn))
            .await
            .map_err(|e| {
                tracing::error!(
                    operation = %operation,
                    error = %e,
                    "Database interaction failed (deadpool error)"
                );
                DatabaseError::InteractionError {
                    operation: operation.clone(),
                    message: e.to_string(),
                }
            })?
            .map_err(|e| {
                let db_error = Into::<DatabaseError>::into(e).with_operation(&operation);
                // Absent rows are an expected outcome for most lookups.
                if !db_error.is_not_found() {
                    tracing::error!(
                        operation = %operation,
                        error = %db_error,
                        "Database query failed"
                    );
                }
                db_error
            })
    }
}
