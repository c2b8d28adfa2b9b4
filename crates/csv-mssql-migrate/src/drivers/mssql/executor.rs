//! MSSQL statement executor.
//!
//! Implements the `TargetExecutor` trait for SQL Server using Tiberius over
//! Tokio TCP, with bb8 managing connections.

use std::time::Duration;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use tiberius::{AuthMethod, Client, Config, EncryptionLevel, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use crate::config::TargetConfig;
use crate::core::traits::TargetExecutor;
use crate::core::value::SqlValue;
use crate::error::{MigrateError, Result};

/// Connection pool timeouts.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection manager for bb8 pool with Tiberius.
#[derive(Clone)]
pub struct TiberiusConnectionManager {
    config: TargetConfig,
}

impl TiberiusConnectionManager {
    fn new(config: TargetConfig) -> Self {
        Self { config }
    }

    fn build_config(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.config.host);
        config.port(self.config.port);
        config.database(&self.config.database);
        config.authentication(AuthMethod::sql_server(
            &self.config.user,
            &self.config.password,
        ));

        match self.config.ssl_mode.to_lowercase().as_str() {
            "disable" => {
                config.encryption(EncryptionLevel::NotSupported);
            }
            _ => {
                config.trust_cert();
                config.encryption(EncryptionLevel::Required);
            }
        }

        config
    }
}

#[async_trait]
impl bb8::ManageConnection for TiberiusConnectionManager {
    type Connection = Client<Compat<TcpStream>>;
    type Error = tiberius::error::Error;

    async fn connect(&self) -> std::result::Result<Self::Connection, Self::Error> {
        let config = self.build_config();
        let tcp = TcpStream::connect(config.get_addr()).await.map_err(|e| {
            tiberius::error::Error::Io {
                kind: e.kind(),
                message: e.to_string(),
            }
        })?;
        tcp.set_nodelay(true).ok();
        Client::connect(config, tcp.compat_write()).await
    }

    async fn is_valid(&self, conn: &mut Self::Connection) -> std::result::Result<(), Self::Error> {
        conn.simple_query("SELECT 1").await?.into_row().await?;
        Ok(())
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

/// SQL Server executor.
///
/// The pool is created lazily: no connection is opened until the first
/// statement, so an unreachable server shows up as a failure of that
/// statement rather than of the whole run.
pub struct MssqlExecutor {
    pool: Pool<TiberiusConnectionManager>,
}

impl MssqlExecutor {
    /// Create a new executor from configuration.
    pub fn new(config: TargetConfig) -> Self {
        info!(
            "Target: {}:{}/{} (pool_size={})",
            config.host, config.port, config.database, config.max_connections
        );

        let max_size = config.max_connections;
        let pool = Pool::builder()
            .max_size(max_size)
            .min_idle(Some(0))
            .connection_timeout(POOL_CONNECTION_TIMEOUT)
            .idle_timeout(Some(POOL_IDLE_TIMEOUT))
            .build_unchecked(TiberiusConnectionManager::new(config));

        Self { pool }
    }

    /// Open a connection and run a trivial query.
    pub async fn check_connection(&self) -> Result<()> {
        let mut conn = self.get_conn().await?;
        conn.simple_query("SELECT 1").await?.into_row().await?;
        Ok(())
    }

    /// Get a pooled connection.
    async fn get_conn(&self) -> Result<PooledConnection<'_, TiberiusConnectionManager>> {
        self.pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, "getting MSSQL target connection"))
    }
}

#[async_trait]
impl TargetExecutor for MssqlExecutor {
    async fn execute_ddl(&self, sql: &str) -> Result<()> {
        let mut conn = self.get_conn().await?;
        debug!("DDL: {}", sql);
        conn.execute(sql, &[]).await?;
        Ok(())
    }

    async fn execute(&self, sql: &str, params: &[SqlValue<'_>]) -> Result<u64> {
        let mut conn = self.get_conn().await?;
        debug!("DML: {} ({} params)", sql, params.len());

        let params: Vec<Box<dyn ToSql>> = params.iter().map(sql_value_to_sql_param).collect();
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let result = conn.execute(sql, &param_refs).await?;
        Ok(result.total())
    }

    fn db_type(&self) -> &str {
        "mssql"
    }
}

fn sql_value_to_sql_param(value: &SqlValue<'_>) -> Box<dyn ToSql> {
    match value {
        SqlValue::Null => Box::new(Option::<String>::None),
        SqlValue::Text(s) => Box::new(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_addr() {
        let manager = TiberiusConnectionManager::new(TargetConfig::default());
        let config = manager.build_config();
        assert_eq!(config.get_addr(), "localhost:1433");
    }

    #[tokio::test]
    async fn test_executor_is_lazy() {
        let mut config = TargetConfig::default();
        config.host = "unreachable.invalid".to_string();
        let executor = MssqlExecutor::new(config);
        assert_eq!(executor.db_type(), "mssql");
        assert_eq!(executor.pool.state().connections, 0);
    }
}
