//! Live database introspection adapters.

pub mod adapter;
pub mod options;
pub mod postgres;

pub use adapter::Adapter;
pub use options::IntrospectOptions;
pub use postgres::PostgresAdapter;

pub use eralchemy_core::DatabaseSchema;
