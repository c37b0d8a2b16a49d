//! Storage schema translation: one structure schema maps to three
//! physical tables with ordinal-to-column mappings.
//!
//! | Table              | Columns                                  |
//! |--------------------|------------------------------------------|
//! | `<Type>Structure`  | `Id`, `Json`                             |
//! | `<Type>Indexes`    | `Id`, one nullable column per accessor   |
//! | `<Type>Uniques`    | `Id`, `UqId`, `UqName`, `UqValue`        |

use crate::core::DataKind;
use crate::schema::{IdKind, StructureSchema};

pub const ID_COLUMN: &str = "Id";
pub const JSON_COLUMN: &str = "Json";
pub const UQ_ID_COLUMN: &str = "UqId";
pub const UQ_NAME_COLUMN: &str = "UqName";
pub const UQ_VALUE_COLUMN: &str = "UqValue";

#[derive(Debug, Clone)]
pub struct ColumnLayout {
    pub name: String,
    pub data_kind: DataKind,
    pub nullable: bool,
    pub ordinal: usize,
}

#[derive(Debug, Clone)]
pub struct TableLayout {
    pub name: String,
    pub columns: Vec<ColumnLayout>,
}

impl TableLayout {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn find(&self, column: &str) -> Option<&ColumnLayout> {
        self.columns.iter().find(|c| c.name == column)
    }
}

#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub id_kind: IdKind,
    pub structure: TableLayout,
    pub indexes: TableLayout,
    pub uniques: TableLayout,
}

impl StorageLayout {
    pub fn structure_table_name(type_name: &str) -> String {
        format!("{}Structure", type_name)
    }

    pub fn indexes_table_name(type_name: &str) -> String {
        format!("{}Indexes", type_name)
    }

    pub fn uniques_table_name(type_name: &str) -> String {
        format!("{}Uniques", type_name)
    }

    pub fn for_schema(schema: &StructureSchema) -> Self {
        // External-id types are keyed like GUID types; their callers
        // provision GUID-shaped ids.
        let id_kind = schema
            .id_accessor()
            .map_or(IdKind::Guid, |a| a.kind());
        let id_data_kind = id_kind.data_kind();

        let structure = TableLayout {
            name: Self::structure_table_name(schema.name()),
            columns: vec![
                column(ID_COLUMN, id_data_kind, false, 0),
                column(JSON_COLUMN, DataKind::Text, false, 1),
            ],
        };

        let mut index_columns = vec![column(ID_COLUMN, id_data_kind, false, 0)];
        for (i, accessor) in schema.index_accessors().iter().enumerate() {
            index_columns.push(column(accessor.name(), accessor.data_kind(), true, i + 1));
        }
        let indexes = TableLayout {
            name: Self::indexes_table_name(schema.name()),
            columns: index_columns,
        };

        let uniques = TableLayout {
            name: Self::uniques_table_name(schema.name()),
            columns: vec![
                column(ID_COLUMN, id_data_kind, false, 0),
                column(UQ_ID_COLUMN, id_data_kind, true, 1),
                column(UQ_NAME_COLUMN, DataKind::Text, false, 2),
                column(UQ_VALUE_COLUMN, DataKind::Text, false, 3),
            ],
        };

        Self { id_kind, structure, indexes, uniques }
    }
}

fn column(name: &str, data_kind: DataKind, nullable: bool, ordinal: usize) -> ColumnLayout {
    ColumnLayout { name: name.to_string(), data_kind, nullable, ordinal }
}
