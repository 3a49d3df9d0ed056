use eralchemy_core::{Column, ColumnType, Constraint, ForeignKey, PrimaryKey, Table, TableKind};

use crate::options::IntrospectOptions;

use super::queries::{RawColumn, RawForeignKey, RawPrimaryKey, RawTable};

pub fn filter_schemas(raw: Vec<String>, opts: &IntrospectOptions) -> Vec<String> {
    raw.into_iter()
        .filter(|schema| {
            let is_system = schema.starts_with("pg_") || schema == "information_schema";
            match &opts.schemas {
                Some(list) => list.iter().any(|item| item == schema),
                None => opts.include_system_schemas || !is_system,
            }
        })
        .collect()
}

pub fn relkind_to_table_kind(relkind: i8) -> TableKind {
    match u8::try_from(relkind).map(char::from) {
        Ok('r') => TableKind::Table,
        Ok('p') => TableKind::PartitionedTable,
        Ok('v') => TableKind::View,
        Ok('m') => TableKind::MaterializedView,
        Ok('f') => TableKind::ForeignTable,
        Ok(other) => TableKind::Other(other.to_string()),
        Err(_) => TableKind::Other(relkind.to_string()),
    }
}

pub fn map_tables(raw: Vec<RawTable>, opts: &IntrospectOptions) -> Vec<Table> {
    raw.into_iter()
        .filter_map(|table| {
            let kind = relkind_to_table_kind(table.relkind);
            if !table_kind_enabled(&kind, opts) {
                return None;
            }

            Some(Table {
                name: table.name,
                kind,
                comment: table.comment.filter(|_| opts.include_comments),
                columns: Vec::new(),
                constraints: Vec::new(),
            })
        })
        .collect()
}

fn table_kind_enabled(kind: &TableKind, opts: &IntrospectOptions) -> bool {
    match kind {
        TableKind::View => opts.include_views,
        TableKind::MaterializedView => opts.include_materialized_views,
        TableKind::ForeignTable => opts.include_foreign_tables,
        _ => true,
    }
}

pub fn map_columns(raw: Vec<RawColumn>, opts: &IntrospectOptions) -> Vec<Column> {
    raw.into_iter()
        .map(|col| Column {
            ordinal_position: col.ordinal_position,
            name: col.name,
            column_type: ColumnType::new(col.data_type),
            is_nullable: col.is_nullable,
            default: col.default,
            comment: col.comment.filter(|_| opts.include_comments),
        })
        .collect()
}

pub fn map_primary_key(raw: Option<RawPrimaryKey>) -> Option<PrimaryKey> {
    raw.map(|pk| PrimaryKey {
        name: Some(pk.name),
        columns: pk.columns,
    })
}

pub fn map_foreign_keys(raw: Vec<RawForeignKey>) -> Vec<ForeignKey> {
    raw.into_iter()
        .map(|fk| ForeignKey {
            name: Some(fk.name),
            columns: fk.columns,
            referenced_schema: fk.referenced_schema,
            referenced_table: fk.referenced_table,
            referenced_columns: fk.referenced_columns,
        })
        .collect()
}

pub fn sort_constraints(constraints: &mut [Constraint]) {
    constraints.sort_by(|left, right| constraint_key(left).cmp(&constraint_key(right)));
}

fn constraint_key(constraint: &Constraint) -> (u8, String, String) {
    match constraint {
        Constraint::PrimaryKey(pk) => {
            (0, pk.name.clone().unwrap_or_default(), pk.columns.join("|"))
        }
        Constraint::ForeignKey(fk) => {
            (1, fk.name.clone().unwrap_or_default(), fk.columns.join("|"))
        }
    }
}
