//! Intermediary builder: turns any supported schema source into an
//! [`Intermediary`].

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info};

use eralchemy_core::{
    declarative_to_intermediary, metadata_to_intermediary, ConnectionUrl, DatabaseSchema, Error,
    Intermediary, Registry, Result,
};
use eralchemy_introspect::{Adapter, IntrospectOptions, PostgresAdapter};

/// Anything the builder may be handed.
#[derive(Debug, Clone)]
pub enum SchemaInput {
    /// A schema snapshot.
    Metadata(DatabaseSchema),
    /// A declarative model registry.
    Declarative(Registry),
    /// Free text; accepted only when it parses as a connection URL.
    Text(String),
    /// A value of some other type, kept only by its type name.
    Opaque { type_name: &'static str },
}

impl SchemaInput {
    /// Wrap a value of an unsupported type so it can be reported by name.
    pub fn opaque<T: ?Sized>(_value: &T) -> Self {
        SchemaInput::Opaque {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Runtime type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaInput::Metadata(_) => "DatabaseSchema",
            SchemaInput::Declarative(_) => "Registry",
            SchemaInput::Text(_) => "String",
            SchemaInput::Opaque { type_name } => *type_name,
        }
    }
}

impl From<DatabaseSchema> for SchemaInput {
    fn from(value: DatabaseSchema) -> Self {
        SchemaInput::Metadata(value)
    }
}

impl From<Registry> for SchemaInput {
    fn from(value: Registry) -> Self {
        SchemaInput::Declarative(value)
    }
}

impl From<String> for SchemaInput {
    fn from(value: String) -> Self {
        SchemaInput::Text(value)
    }
}

impl From<&str> for SchemaInput {
    fn from(value: &str) -> Self {
        SchemaInput::Text(value.to_string())
    }
}

/// A schema source the builder knows how to extract.
#[derive(Debug, Clone)]
pub enum Source {
    Metadata(DatabaseSchema),
    Declarative(Registry),
    Database(ConnectionUrl),
}

/// Either claims the input or hands it back untouched.
type Resolver = fn(SchemaInput) -> std::result::Result<Source, SchemaInput>;

/// Resolvers in the order they are tried.
const RESOLVERS: &[(&str, Resolver)] = &[
    ("metadata", resolve_metadata),
    ("declarative", resolve_declarative),
    ("connection_url", resolve_connection_url),
];

fn resolve_metadata(input: SchemaInput) -> std::result::Result<Source, SchemaInput> {
    match input {
        SchemaInput::Metadata(metadata) => Ok(Source::Metadata(metadata)),
        other => Err(other),
    }
}

fn resolve_declarative(input: SchemaInput) -> std::result::Result<Source, SchemaInput> {
    match input {
        SchemaInput::Declarative(registry) => Ok(Source::Declarative(registry)),
        other => Err(other),
    }
}

fn resolve_connection_url(input: SchemaInput) -> std::result::Result<Source, SchemaInput> {
    let url = match &input {
        SchemaInput::Text(text) => ConnectionUrl::parse(text),
        _ => None,
    };
    url.map(Source::Database).ok_or(input)
}

/// Pick the source for `input`, or fail naming its type.
pub fn resolve_source(input: SchemaInput) -> Result<Source> {
    let mut input = input;
    for (name, resolver) in RESOLVERS {
        match resolver(input) {
            Ok(source) => {
                debug!(event = "input_resolved", resolver = *name);
                return Ok(source);
            }
            Err(unclaimed) => input = unclaimed,
        }
    }
    Err(Error::UnsupportedInput(input.type_name().to_string()))
}

/// Build the intermediary representation of `input`.
pub async fn all_to_intermediary(
    input: impl Into<SchemaInput>,
    opts: &IntrospectOptions,
) -> Result<Intermediary> {
    let intermediary = match resolve_source(input.into())? {
        Source::Metadata(metadata) => metadata_to_intermediary(&metadata),
        Source::Declarative(registry) => declarative_to_intermediary(&registry),
        Source::Database(url) => database_to_intermediary(&url, opts).await?,
    };

    info!(
        event = "intermediary_built",
        tables = intermediary.tables.len(),
        relations = intermediary.relations.len()
    );
    Ok(intermediary)
}

/// Introspect the database behind `url` and build its intermediary representation.
pub async fn database_to_intermediary(
    url: &ConnectionUrl,
    opts: &IntrospectOptions,
) -> Result<Intermediary> {
    match url.dialect() {
        "postgres" | "postgresql" => {}
        other => {
            return Err(Error::Unsupported(format!("database engine '{other}'")));
        }
    }

    info!(event = "introspection_started", connection = %url);

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&url.native_url())
        .await
        .map_err(|err| Error::Db(err.to_string()))?;

    let adapter = PostgresAdapter::new(pool.clone());
    let intermediary = adapter_to_intermediary(&adapter, opts).await;
    pool.close().await;
    intermediary
}

/// Introspect through `adapter` and build the intermediary representation.
pub async fn adapter_to_intermediary(
    adapter: &dyn Adapter,
    opts: &IntrospectOptions,
) -> Result<Intermediary> {
    let schema = adapter.introspect(opts).await?;

    info!(
        event = "introspection_finished",
        engine = adapter.engine(),
        tables = schema.table_count(),
        foreign_keys = schema.foreign_key_count()
    );
    Ok(metadata_to_intermediary(&schema))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use eralchemy_core::{
        Column, ColumnType, Constraint, ForeignKey, PrimaryKey, Schema, Table, TableKind,
    };

    use super::*;

    fn column(ordinal: i16, name: &str) -> Column {
        Column {
            ordinal_position: ordinal,
            name: name.to_string(),
            column_type: ColumnType::new("integer"),
            is_nullable: false,
            default: None,
            comment: None,
        }
    }

    /// Serves a fixed snapshot and remembers the options it was asked with.
    struct SnapshotAdapter {
        seen_views: Mutex<Option<bool>>,
    }

    #[async_trait]
    impl Adapter for SnapshotAdapter {
        fn engine(&self) -> &'static str {
            "postgres"
        }

        async fn introspect(&self, opts: &IntrospectOptions) -> Result<DatabaseSchema> {
            if let Ok(mut seen) = self.seen_views.lock() {
                *seen = Some(opts.include_views);
            }
            Ok(DatabaseSchema {
                engine: "postgres".to_string(),
                database: Some("shop".to_string()),
                schemas: vec![Schema {
                    name: "public".to_string(),
                    tables: vec![
                        Table {
                            name: "users".to_string(),
                            kind: TableKind::Table,
                            comment: None,
                            columns: vec![column(1, "id")],
                            constraints: vec![Constraint::PrimaryKey(PrimaryKey {
                                name: Some("users_pkey".to_string()),
                                columns: vec!["id".to_string()],
                            })],
                        },
                        Table {
                            name: "orders".to_string(),
                            kind: TableKind::Table,
                            comment: None,
                            columns: vec![column(1, "id"), column(2, "user_id")],
                            constraints: vec![Constraint::ForeignKey(ForeignKey {
                                name: Some("orders_user_id_fkey".to_string()),
                                columns: vec!["user_id".to_string()],
                                referenced_schema: "public".to_string(),
                                referenced_table: "users".to_string(),
                                referenced_columns: vec!["id".to_string()],
                            })],
                        },
                    ],
                }],
            })
        }
    }

    #[tokio::test]
    async fn adapter_snapshots_become_intermediaries() {
        let adapter = SnapshotAdapter {
            seen_views: Mutex::new(None),
        };
        let opts = IntrospectOptions {
            include_views: true,
            ..IntrospectOptions::default()
        };

        let intermediary = adapter_to_intermediary(&adapter, &opts)
            .await
            .expect("build intermediary");

        assert_eq!(intermediary.tables.len(), 2);
        assert_eq!(intermediary.relations.len(), 1);
        assert_eq!(intermediary.relations[0].left, "users");
        assert_eq!(intermediary.relations[0].right, "orders");
        assert_eq!(*adapter.seen_views.lock().expect("lock"), Some(true));
    }

    #[test]
    fn resolvers_run_in_declared_order() {
        let names: Vec<&str> = RESOLVERS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["metadata", "declarative", "connection_url"]);
    }

    #[test]
    fn integers_are_reported_by_type() {
        let err = resolve_source(SchemaInput::opaque(&42)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedInput(ref name) if name == "i32"));
        assert_eq!(err.to_string(), "Cannot process input i32");
    }

    #[test]
    fn text_that_is_not_a_url_is_unsupported() {
        let err = resolve_source(SchemaInput::from("not a url")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedInput(ref name) if name == "String"));
    }

    #[test]
    fn connection_urls_resolve_to_database() {
        let source = resolve_source("postgresql://user:pw@localhost/shop".into()).expect("resolve");
        match source {
            Source::Database(url) => {
                assert_eq!(url.dialect(), "postgresql");
                assert_eq!(url.database.as_deref(), Some("shop"));
            }
            other => panic!("unexpected source: {other:?}"),
        }
    }

    #[test]
    fn ipv6_connection_urls_resolve_to_database() {
        let source = resolve_source("postgres://user:pw@[::1]/shop".into()).expect("resolve");
        assert!(matches!(source, Source::Database(ref url) if url.host.as_deref() == Some("[::1]")));
    }

    #[test]
    fn registries_resolve_to_declarative() {
        let source = resolve_source(Registry::new().into()).expect("resolve");
        assert!(matches!(source, Source::Declarative(_)));
    }
}
