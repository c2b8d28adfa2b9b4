//! Microsoft SQL Server driver.
//!
//! - [`MssqlDialect`]: SQL syntax strategy for MSSQL
//! - [`MssqlExecutor`]: Statement executor for MSSQL databases

mod dialect;
mod executor;

pub use dialect::MssqlDialect;
pub use executor::{MssqlExecutor, TiberiusConnectionManager};
