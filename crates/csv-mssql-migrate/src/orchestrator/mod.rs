//! Migration orchestrator - main workflow coordinator.
//!
//! Input paths are handled strictly in the order given, one file at a time
//! and one record at a time within a file. Nothing in here aborts the run:
//! invalid paths, unreadable files, failed table creation and failed record
//! writes are all logged, recorded on the report, and skipped.

mod report;

pub use report::{
    FileOutcome, FileReport, MigrationOutcome, MigrationReport, RecordFailure, RunTotals,
};

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::core::identifier::inspect_table;
use crate::core::schema::{table_name_for, Schema};
use crate::core::traits::TargetExecutor;
use crate::drivers::{DialectImpl, MssqlExecutor};
use crate::error::{MigrateError, Result};
use crate::source::{classify, list_input_files, InputKind, Record, RecordDecoder};
use crate::writer::{StatementBuilder, WriteStrategy};

/// Migration orchestrator.
pub struct Orchestrator {
    config: Config,
    dialect: DialectImpl,
    decoder: RecordDecoder,
    strategy: WriteStrategy,
    target: Arc<dyn TargetExecutor>,
}

impl Orchestrator {
    /// Create an orchestrator writing through `target`.
    pub fn new(config: Config, target: Arc<dyn TargetExecutor>) -> Result<Self> {
        config.validate()?;
        let dialect = DialectImpl::from_db_type(target.db_type())?;
        let decoder = RecordDecoder::new(config.input.delimiter)?;
        let strategy = WriteStrategy::from_config(&config.migration);

        Ok(Self {
            config,
            dialect,
            decoder,
            strategy,
            target,
        })
    }

    /// Create an orchestrator writing to the configured SQL Server.
    ///
    /// No connection is opened here; the first statement connects.
    pub fn connect(config: Config) -> Result<Self> {
        let executor = MssqlExecutor::new(config.target.clone());
        Self::new(config, Arc::new(executor))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Migrate every input path in order.
    ///
    /// Cancellation is observed between files only; a file that has started
    /// is always finished.
    pub async fn run<P: AsRef<Path>>(
        &self,
        paths: &[P],
        cancel: Option<CancellationToken>,
    ) -> MigrationReport {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let cancel = cancel.unwrap_or_else(CancellationToken::new);
        let extension = self.config.input.extension.as_str();

        info!(
            "Starting migration run {} ({} path(s), mode: {:?})",
            run_id,
            paths.len(),
            self.strategy
        );

        let mut files = Vec::new();

        'paths: for path in paths {
            let path = path.as_ref();
            match classify(path, extension) {
                InputKind::File => {
                    if cancel.is_cancelled() {
                        break 'paths;
                    }
                    files.push(self.migrate_file(path).await);
                }
                InputKind::Directory => {
                    let entries = match list_input_files(path, extension) {
                        Ok(entries) => entries,
                        Err(e) => {
                            warn!("Skipping directory {}: {}", path.display(), e);
                            files.push(FileReport::skipped(path, e.to_string()));
                            continue;
                        }
                    };
                    info!(
                        "Directory {}: {} .{} file(s)",
                        path.display(),
                        entries.len(),
                        extension
                    );
                    for entry in entries {
                        if cancel.is_cancelled() {
                            break 'paths;
                        }
                        files.push(self.migrate_file(&entry).await);
                    }
                }
                InputKind::Invalid => {
                    let err = MigrateError::InvalidInput(format!(
                        "{} is not a .{} file or a directory containing one",
                        path.display(),
                        extension
                    ));
                    warn!("Skipping path: {}", err);
                    files.push(FileReport::skipped(path, err.to_string()));
                }
            }
        }

        let cancelled = cancel.is_cancelled();
        if cancelled {
            warn!("Migration cancelled; remaining paths were not processed");
        }

        let report = MigrationReport::finish(run_id, started_at, files, cancelled);

        info!(
            "Migration {}: {} file(s) loaded, {} failed, {} path(s) skipped, {} record(s) written, {} record(s) failed in {:.1}s",
            report.status,
            report.totals.files_succeeded,
            report.totals.files_failed,
            report.totals.paths_skipped,
            report.totals.records_written,
            report.totals.records_failed,
            report.duration_seconds
        );

        report
    }

    /// Load one file into its table.
    async fn migrate_file(&self, path: &Path) -> FileReport {
        let table = table_name_for(path);
        let mut report = FileReport::new(path, &table);

        info!("Migrating {} into {}", path.display(), table);

        let decoded = match self.decoder.open(path) {
            Ok(decoded) => decoded,
            Err(e) => {
                error!("{}: cannot read {}: {}", table, path.display(), e);
                report.fail(FileOutcome::DecodeFailed, e.to_string());
                return report;
            }
        };

        let schema = Schema::from_header(&decoded.header, &self.config.input.header_separator);
        report.issues = inspect_table(&table, &schema);
        for issue in &report.issues {
            warn!("{}: {}", table, issue);
        }

        let builder = StatementBuilder::new(&self.dialect, table.as_str(), schema, self.strategy);

        if let Err(e) = self.create_table(&builder).await {
            report.fail(FileOutcome::TableCreateFailed, e.to_string());
            return report;
        }

        for (index, item) in decoded.records {
            let written = match item {
                Ok(record) => self
                    .write_record(&builder, &record)
                    .await
                    .map_err(|e| (record.key().to_string(), e)),
                Err(e) => Err((String::new(), e)),
            };

            match written {
                Ok(rows) => {
                    report.records_written += 1;
                    report.rows_affected += rows;
                }
                Err((key, e)) => {
                    warn!(
                        "{}: record {} (key {:?}) failed: {}",
                        table, index, key, e
                    );
                    report.record_failures.push(RecordFailure {
                        index,
                        key,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "{}: {} record(s) written, {} failed",
            table,
            report.records_written,
            report.record_failures.len()
        );

        report
    }

    /// Create the destination table.
    ///
    /// In upsert mode an existing table is reused; every other failure is
    /// returned.
    async fn create_table(&self, builder: &StatementBuilder) -> Result<()> {
        let table = builder.table();
        match self.target.execute_ddl(builder.create_table_sql()).await {
            Ok(()) => {
                info!("Created table {}", table);
                Ok(())
            }
            Err(e) if builder.strategy().is_upsert() && e.is_object_exists() => {
                info!("Table {} already exists, upserting into it", table);
                Ok(())
            }
            Err(e) => {
                let err = MigrateError::schema_creation(table, e);
                error!("{}", err);
                Err(err)
            }
        }
    }

    async fn write_record(&self, builder: &StatementBuilder, record: &Record) -> Result<u64> {
        let statement = builder.bind(&record.fields)?;
        let rows = self
            .target
            .execute(statement.sql, &statement.params)
            .await?;
        debug!(
            "{}: record {} written ({} row(s))",
            builder.table(),
            record.ordinal,
            rows
        );
        Ok(rows)
    }
}
