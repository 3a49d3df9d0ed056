//! Declarative model registry.
//!
//! Model types describe their own table through [`Entity`]; a [`Registry`]
//! collects them and lowers the collection into a [`DatabaseSchema`] so the
//! rest of the pipeline only ever sees snapshots.

use crate::constraints::{Constraint, ForeignKey, PrimaryKey};
use crate::schema::{Column, ColumnType, DatabaseSchema, Schema, Table, TableKind, DEFAULT_SCHEMA};

/// Column declared on a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: String,
    pub primary_key: bool,
    pub nullable: bool,
    /// Referenced `(table, column)` when the column is a foreign key.
    pub references: Option<(String, String)>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            primary_key: false,
            nullable: true,
            references: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some((table.into(), column.into()));
        self
    }
}

/// Implemented by model types that map to a table.
pub trait Entity {
    fn table_name() -> &'static str;

    fn columns() -> Vec<ColumnDef>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EntityDef {
    table_name: String,
    columns: Vec<ColumnDef>,
}

/// Ordered collection of declared models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    schema: String,
    entities: Vec<EntityDef>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_schema(DEFAULT_SCHEMA)
    }

    /// Registry whose tables live in `schema` instead of the default one.
    pub fn with_schema(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            entities: Vec::new(),
        }
    }

    pub fn register<E: Entity>(&mut self) -> &mut Self {
        self.register_table(E::table_name(), E::columns())
    }

    /// Register a table without a backing model type.
    pub fn register_table(
        &mut self,
        table_name: impl Into<String>,
        columns: Vec<ColumnDef>,
    ) -> &mut Self {
        self.entities.push(EntityDef {
            table_name: table_name.into(),
            columns,
        });
        self
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Lower the registry into a single-schema snapshot.
    ///
    /// Every column with a `references` target becomes its own single-column
    /// foreign key, named `<table>_<column>_fkey`.
    pub fn to_metadata(&self) -> DatabaseSchema {
        let tables = self
            .entities
            .iter()
            .map(|entity| self.entity_to_table(entity))
            .collect();

        DatabaseSchema {
            engine: "declarative".to_string(),
            database: None,
            schemas: vec![Schema {
                name: self.schema.clone(),
                tables,
            }],
        }
    }

    fn entity_to_table(&self, entity: &EntityDef) -> Table {
        let columns = entity
            .columns
            .iter()
            .enumerate()
            .map(|(idx, def)| Column {
                ordinal_position: i16::try_from(idx + 1).unwrap_or(i16::MAX),
                name: def.name.clone(),
                column_type: ColumnType::new(def.column_type.clone()),
                is_nullable: def.nullable,
                default: None,
                comment: None,
            })
            .collect();

        let mut constraints = Vec::new();
        let key_columns: Vec<String> = entity
            .columns
            .iter()
            .filter(|def| def.primary_key)
            .map(|def| def.name.clone())
            .collect();
        if !key_columns.is_empty() {
            constraints.push(Constraint::PrimaryKey(PrimaryKey {
                name: Some(format!("{}_pkey", entity.table_name)),
                columns: key_columns,
            }));
        }

        for def in &entity.columns {
            if let Some((table, column)) = &def.references {
                constraints.push(Constraint::ForeignKey(ForeignKey {
                    name: Some(format!("{}_{}_fkey", entity.table_name, def.name)),
                    columns: vec![def.name.clone()],
                    referenced_schema: self.schema.clone(),
                    referenced_table: table.clone(),
                    referenced_columns: vec![column.clone()],
                }));
            }
        }

        Table {
            name: entity.table_name.clone(),
            kind: TableKind::Table,
            comment: None,
            columns,
            constraints,
        }
    }
}
