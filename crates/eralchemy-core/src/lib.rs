//! Core contracts and helpers for eralchemy.
//!
//! This crate defines the schema snapshot types, the declarative registry,
//! the intermediary representation and the serializers that turn it into
//! ER markup, DOT source or rendered diagrams.

pub mod connection;
pub mod constraints;
pub mod declarative;
pub mod error;
pub mod extract;
pub mod filter;
pub mod intermediary;
pub mod mode;
pub mod parser;
pub mod render;
pub mod schema;

pub use connection::{redact_connection_string, ConnectionUrl};
pub use constraints::{Constraint, ForeignKey, PrimaryKey};
pub use declarative::{ColumnDef, Entity, Registry};
pub use error::{Error, Result};
pub use extract::{declarative_to_intermediary, metadata_to_intermediary};
pub use filter::filter_resources;
pub use intermediary::{Cardinality, ErColumn, ErTable, Intermediary, Relation};
pub use mode::{Mode, Renderer};
pub use parser::markup_to_intermediary;
pub use render::{
    intermediary_to_dot, intermediary_to_dot_string, intermediary_to_er,
    intermediary_to_er_string, intermediary_to_graph, render, render_with_engine, resolve_mode,
    GraphvizCommand, LayoutEngine, GRAPH_BEGINNING,
};
pub use schema::{Column, ColumnType, DatabaseSchema, Schema, Table, TableKind};
