use sqlx::PgPool;
use tracing::debug;

use eralchemy_core::{Constraint, DatabaseSchema, Result, Schema};

use crate::adapter::Adapter;
use crate::options::IntrospectOptions;

mod mapper;
mod queries;

/// Adapter for PostgreSQL databases.
#[derive(Debug, Clone)]
pub struct PostgresAdapter {
    pool: PgPool,
}

impl PostgresAdapter {
    /// Create a new adapter using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Adapter for PostgresAdapter {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn introspect(&self, opts: &IntrospectOptions) -> Result<DatabaseSchema> {
        introspect(&self.pool, opts).await
    }
}

/// Introspect a Postgres database according to the provided options.
///
/// Schemas and tables come back sorted by name; columns keep their ordinal
/// order and the primary key precedes the foreign keys.
async fn introspect(pool: &PgPool, opts: &IntrospectOptions) -> Result<DatabaseSchema> {
    let database = queries::fetch_database_name(pool).await?;
    let schemas = mapper::filter_schemas(queries::list_schemas(pool).await?, opts);

    let mut schema_items = Vec::new();

    for schema_name in schemas {
        let raw_tables = queries::list_tables_in_schema(pool, &schema_name).await?;
        let mut tables = mapper::map_tables(raw_tables, opts);

        for table in &mut tables {
            let raw_columns = queries::list_columns(pool, &schema_name, &table.name).await?;
            table.columns = mapper::map_columns(raw_columns, opts);

            let raw_pk = queries::get_primary_key(pool, &schema_name, &table.name).await?;
            let raw_fks = queries::list_foreign_keys(pool, &schema_name, &table.name).await?;

            let mut constraints = Vec::new();
            if let Some(pk) = mapper::map_primary_key(raw_pk) {
                constraints.push(Constraint::PrimaryKey(pk));
            }
            constraints.extend(
                mapper::map_foreign_keys(raw_fks)
                    .into_iter()
                    .map(Constraint::ForeignKey),
            );
            mapper::sort_constraints(&mut constraints);
            table.constraints = constraints;
        }

        tables.sort_by(|left, right| left.name.cmp(&right.name));
        debug!(schema = %schema_name, tables = tables.len(), "schema introspected");
        schema_items.push(Schema {
            name: schema_name,
            tables,
        });
    }

    schema_items.sort_by(|left, right| left.name.cmp(&right.name));

    Ok(DatabaseSchema {
        engine: "postgres".to_string(),
        database: Some(database),
        schemas: schema_items,
    })
}
