//! DDL text generation for the physical tables, using the Builder
//! pattern for SQL assembly.
//!
//! One backend dialect is targeted at a time: bracket-quoted
//! identifiers, `@p`-prefixed parameters, `identity(1,1)` for
//! auto-increment keys.

use crate::core::DataKind;
use crate::storage::layout::{ColumnLayout, StorageLayout, TableLayout, UQ_ID_COLUMN, UQ_NAME_COLUMN, UQ_VALUE_COLUMN};

pub fn quote_ident(name: &str) -> String {
    format!("[{}]", name)
}

/// SQL type for an index/key column of the given kind.
pub fn sql_type(kind: DataKind) -> &'static str {
    match kind {
        DataKind::Integer => "int",
        DataKind::Float => "float",
        DataKind::Decimal => "decimal(18,5)",
        DataKind::Text | DataKind::Enum => "nvarchar(300)",
        DataKind::Boolean => "bit",
        DataKind::Timestamp => "datetime2",
        DataKind::Guid => "uniqueidentifier",
        DataKind::Bytes => "varbinary(max)",
    }
}

/// Builder for CREATE TABLE statements.
pub struct CreateTableBuilder {
    table: String,
    columns: Vec<String>,
    constraints: Vec<String>,
}

impl CreateTableBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self { table: table.into(), columns: Vec::new(), constraints: Vec::new() }
    }

    pub fn column(mut self, name: &str, sql_type: &str, nullable: bool) -> Self {
        let null_clause = if nullable { "null" } else { "not null" };
        self.columns
            .push(format!("{} {} {}", quote_ident(name), sql_type, null_clause));
        self
    }

    pub fn primary_key(mut self, name: &str, sql_type: &str, identity: bool) -> Self {
        let identity_clause = if identity { " identity(1,1)" } else { "" };
        self.columns.push(format!(
            "{} {}{} not null primary key",
            quote_ident(name),
            sql_type,
            identity_clause
        ));
        self
    }

    pub fn unique_constraint(mut self, name: &str, columns: &[&str]) -> Self {
        let cols: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
        self.constraints.push(format!(
            "constraint {} unique ({})",
            quote_ident(name),
            cols.join(", ")
        ));
        self
    }

    pub fn build(self) -> String {
        let mut parts = self.columns;
        parts.extend(self.constraints);
        format!("create table {} ({});", quote_ident(&self.table), parts.join(", "))
    }
}

/// CREATE TABLE for the `<Type>Structure` table, keyed on id kind: GUID
/// keys are plain primary keys, identity keys carry the identity clause.
pub fn create_structure_table(layout: &StorageLayout) -> String {
    let id_type = sql_type(layout.id_kind.data_kind());
    CreateTableBuilder::new(&layout.structure.name)
        .primary_key("Id", id_type, layout.id_kind.is_identity())
        .column("Json", "nvarchar(max)", false)
        .build()
}

pub fn create_indexes_table(layout: &StorageLayout) -> String {
    let id_type = sql_type(layout.id_kind.data_kind());
    let mut builder = CreateTableBuilder::new(&layout.indexes.name).column("Id", id_type, false);
    for col in layout.indexes.columns.iter().skip(1) {
        builder = builder.column(&col.name, sql_type(col.data_kind), true);
    }
    builder.build()
}

pub fn create_uniques_table(layout: &StorageLayout) -> String {
    let id_type = sql_type(layout.id_kind.data_kind());
    let constraint_name = format!("UQ_{}", layout.uniques.name);
    CreateTableBuilder::new(&layout.uniques.name)
        .column("Id", id_type, false)
        .column(UQ_ID_COLUMN, id_type, true)
        .column(UQ_NAME_COLUMN, "nvarchar(128)", false)
        .column(UQ_VALUE_COLUMN, "nvarchar(300)", false)
        .unique_constraint(&constraint_name, &[UQ_NAME_COLUMN, UQ_VALUE_COLUMN, UQ_ID_COLUMN])
        .build()
}

pub fn add_column(table: &TableLayout, column: &ColumnLayout) -> String {
    format!(
        "alter table {} add {} {} null;",
        quote_ident(&table.name),
        quote_ident(&column.name),
        sql_type(column.data_kind)
    )
}

pub fn drop_column(table: &TableLayout, column: &str) -> String {
    format!(
        "alter table {} drop column {};",
        quote_ident(&table.name),
        quote_ident(column)
    )
}

pub fn drop_table(table_name: &str) -> String {
    format!("drop table {};", quote_ident(table_name))
}
