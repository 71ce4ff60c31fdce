use super::config::LogConfig;
use super::{Database, truncate_sql_bytes};
use crate::error::OrmResult;
use crate::row::Row;
use crate::value::Value;
use std::time::Instant;
use tracing::Level;

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

/// A database adapter wrapper that logs every statement through `tracing`.
///
/// ```ignore
/// let db = LoggedDatabase::new(conn)
///     .with_config(LogConfig::new().with_level(Level::INFO).no_truncate());
/// let users = User::all(&db)?;
/// ```
#[derive(Debug, Clone)]
pub struct LoggedDatabase<D> {
    inner: D,
    config: LogConfig,
}

impl<D: Database> LoggedDatabase<D> {
    /// Wrap an adapter with the default configuration.
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            config: LogConfig::default(),
        }
    }

    /// Set the log configuration.
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Get a reference to the inner adapter.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Get the inner adapter, consuming this wrapper.
    pub fn into_inner(self) -> D {
        self.inner
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.config.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn logged<T>(
        &self,
        operation: &'static str,
        sql: &str,
        run: impl FnOnce(&D) -> OrmResult<T>,
    ) -> OrmResult<T> {
        if !self.config.enabled {
            return run(&self.inner);
        }
        let start = Instant::now();
        let result = run(&self.inner);
        let elapsed = start.elapsed();
        let shown = self.truncate_sql(sql);
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        match &result {
            Ok(_) => emit_at_level!(
                self.config.level,
                target: "recordq.sql",
                operation,
                elapsed_ms,
                sql = %shown,
            ),
            Err(err) => tracing::error!(
                target: "recordq.sql",
                operation,
                elapsed_ms,
                sql = %shown,
                error = %err,
            ),
        }
        if let Some(threshold) = self.config.slow_query_threshold {
            if elapsed > threshold {
                tracing::warn!(
                    target: "recordq.sql",
                    operation,
                    elapsed_ms,
                    threshold_ms = threshold.as_secs_f64() * 1000.0,
                    sql = %shown,
                    "slow query"
                );
            }
        }
        result
    }
}

impl<D: Database> Database for LoggedDatabase<D> {
    fn prepare(&self, template: &str, args: &[Value]) -> OrmResult<String> {
        self.inner.prepare(template, args)
    }

    fn execute(&self, sql: &str) -> OrmResult<u64> {
        self.logged("execute", sql, |db| db.execute(sql))
    }

    fn last_insert_id(&self) -> Option<i64> {
        self.inner.last_insert_id()
    }

    fn query_rows(&self, sql: &str) -> OrmResult<Vec<Row>> {
        self.logged("query_rows", sql, |db| db.query_rows(sql))
    }

    fn query_row(&self, sql: &str) -> OrmResult<Option<Row>> {
        self.logged("query_row", sql, |db| db.query_row(sql))
    }

    fn query_column(&self, sql: &str) -> OrmResult<Vec<Value>> {
        self.logged("query_column", sql, |db| db.query_column(sql))
    }

    fn query_scalar(&self, sql: &str) -> OrmResult<Option<Value>> {
        self.logged("query_scalar", sql, |db| db.query_scalar(sql))
    }
}
