//! Shared test doubles: a call-recording fake database client.
//!
//! The fake maintains a live table map and understands the DDL the
//! engine itself generates, so synchronization tests observe realistic
//! `table_exists` / `list_columns` behavior without a real backend.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use docustore::{DbClient, DbRow, Result, StoreError};

#[derive(Debug, Clone)]
pub struct BulkLoadCall {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<DbRow>,
}

#[derive(Default)]
pub struct FakeDbClient {
    pub executed: Mutex<Vec<String>>,
    pub queried: Mutex<Vec<String>>,
    pub bulk_loads: Mutex<Vec<BulkLoadCall>>,
    pub tables: Mutex<HashMap<String, Vec<String>>>,
    pub query_results: Mutex<Vec<DbRow>>,
    pub begins: AtomicUsize,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
    pub fail_bulk_table: Mutex<Option<String>>,
    pub fail_execute: Mutex<bool>,
}

impl FakeDbClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset a live table, simulating pre-existing state.
    pub fn with_table(self, name: &str, columns: &[&str]) -> Self {
        self.tables.lock().unwrap().insert(
            name.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    pub fn with_query_results(self, rows: Vec<DbRow>) -> Self {
        *self.query_results.lock().unwrap() = rows;
        self
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn ddl_count(&self) -> usize {
        self.executed.lock().unwrap().len()
    }

    pub fn bulk_load_calls(&self) -> Vec<BulkLoadCall> {
        self.bulk_loads.lock().unwrap().clone()
    }

    pub fn live_columns(&self, table: &str) -> Vec<String> {
        self.tables.lock().unwrap().get(table).cloned().unwrap_or_default()
    }

    pub fn fail_bulk_on(&self, table: &str) {
        *self.fail_bulk_table.lock().unwrap() = Some(table.to_string());
    }

    pub fn fail_all_execs(&self) {
        *self.fail_execute.lock().unwrap() = true;
    }

    fn apply_ddl(&self, sql: &str) {
        let mut tables = self.tables.lock().unwrap();
        if let Some((table, columns)) = parse_create(sql) {
            tables.insert(table, columns);
        } else if let Some((table, column)) = parse_add_column(sql) {
            tables.entry(table).or_default().push(column);
        } else if let Some((table, column)) = parse_drop_column(sql) {
            if let Some(cols) = tables.get_mut(&table) {
                cols.retain(|c| c != &column);
            }
        } else if let Some(table) = parse_drop_table(sql) {
            tables.remove(&table);
        }
    }
}

fn parse_create(sql: &str) -> Option<(String, Vec<String>)> {
    let rest = sql.strip_prefix("create table [")?;
    let (table, rest) = rest.split_once(']')?;
    let open = rest.find('(')?;
    let close = rest.rfind(')')?;
    let mut inner = &rest[open + 1..close];
    if let Some(i) = inner.find(", constraint") {
        inner = &inner[..i];
    }
    let mut columns = Vec::new();
    for part in inner.split(", [") {
        let part = part.trim_start_matches('[');
        if let Some((name, _)) = part.split_once(']') {
            columns.push(name.to_string());
        }
    }
    Some((table.to_string(), columns))
}

fn parse_add_column(sql: &str) -> Option<(String, String)> {
    let rest = sql.strip_prefix("alter table [")?;
    let (table, rest) = rest.split_once(']')?;
    let rest = rest.strip_prefix(" add [")?;
    let (column, _) = rest.split_once(']')?;
    Some((table.to_string(), column.to_string()))
}

fn parse_drop_column(sql: &str) -> Option<(String, String)> {
    let rest = sql.strip_prefix("alter table [")?;
    let (table, rest) = rest.split_once(']')?;
    let rest = rest.strip_prefix(" drop column [")?;
    let (column, _) = rest.split_once(']')?;
    Some((table.to_string(), column.to_string()))
}

fn parse_drop_table(sql: &str) -> Option<String> {
    let rest = sql.strip_prefix("drop table [")?;
    let (table, _) = rest.split_once(']')?;
    Some(table.to_string())
}

#[async_trait]
impl DbClient for FakeDbClient {
    async fn execute(&self, sql: &str, _params: &[docustore::IndexValue]) -> Result<u64> {
        if *self.fail_execute.lock().unwrap() {
            return Err(StoreError::Client("induced execute failure".to_string()));
        }
        self.executed.lock().unwrap().push(sql.to_string());
        self.apply_ddl(sql);
        Ok(0)
    }

    async fn query(&self, sql: &str, _params: &[docustore::IndexValue]) -> Result<Vec<DbRow>> {
        self.queried.lock().unwrap().push(sql.to_string());
        Ok(self.query_results.lock().unwrap().clone())
    }

    async fn bulk_load(&self, table: &str, columns: &[String], rows: Vec<DbRow>) -> Result<()> {
        if self.fail_bulk_table.lock().unwrap().as_deref() == Some(table) {
            return Err(StoreError::ConstraintViolation(format!(
                "violation of UNIQUE constraint on '{}'",
                table
            )));
        }
        self.bulk_loads.lock().unwrap().push(BulkLoadCall {
            table: table.to_string(),
            columns: columns.to_vec(),
            rows,
        });
        Ok(())
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .ok_or_else(|| StoreError::Client(format!("table '{}' does not exist", table)))
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        Ok(self.tables.lock().unwrap().contains_key(table))
    }

    async fn begin(&self) -> Result<()> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
