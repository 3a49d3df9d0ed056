use crate::declarative::Registry;
use crate::intermediary::{Cardinality, ErColumn, ErTable, Intermediary, Relation};
use crate::schema::{display_table_name, DatabaseSchema, Schema, Table};

/// Build the intermediary representation of a schema snapshot.
///
/// Produces exactly one table per snapshot table and one relation per
/// foreign key, in snapshot order.
pub fn metadata_to_intermediary(metadata: &DatabaseSchema) -> Intermediary {
    let tables = metadata
        .schemas
        .iter()
        .flat_map(|schema| {
            schema
                .tables
                .iter()
                .map(move |table| table_to_intermediary(schema, table))
        })
        .collect();

    let relations = metadata
        .schemas
        .iter()
        .flat_map(|schema| schema.tables.iter().map(move |table| (schema, table)))
        .flat_map(|(schema, table)| relations_of(schema, table))
        .collect();

    Intermediary::new(tables, relations)
}

/// Build the intermediary representation of a declarative registry.
pub fn declarative_to_intermediary(registry: &Registry) -> Intermediary {
    metadata_to_intermediary(&registry.to_metadata())
}

fn table_to_intermediary(schema: &Schema, table: &Table) -> ErTable {
    let mut columns: Vec<_> = table.columns.iter().collect();
    columns.sort_by_key(|column| column.ordinal_position);

    ErTable::new(
        display_table_name(&schema.name, &table.name),
        columns
            .into_iter()
            .map(|column| {
                ErColumn::new(
                    column.name.clone(),
                    column.column_type.data_type.clone(),
                    table.is_key_column(&column.name),
                )
            })
            .collect(),
    )
}

fn relations_of<'a>(schema: &'a Schema, table: &'a Table) -> impl Iterator<Item = Relation> + 'a {
    let owner = display_table_name(&schema.name, &table.name);
    table.foreign_keys().map(move |fk| {
        Relation::new(
            display_table_name(&fk.referenced_schema, &fk.referenced_table),
            owner.clone(),
            Some(Cardinality::ZeroOrMore),
            Some(Cardinality::ZeroOrOne),
        )
    })
}
