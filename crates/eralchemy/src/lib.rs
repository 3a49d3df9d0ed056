//! Public API surface for eralchemy.
//!
//! `render_er` runs the whole pipeline: build the intermediary representation
//! of a schema source, optionally filter its tables, then render it to a file.

pub mod builder;

use std::path::Path;

use tracing::info;

pub use builder::{
    adapter_to_intermediary, all_to_intermediary, database_to_intermediary, resolve_source,
    SchemaInput, Source,
};
pub use eralchemy_core::{
    filter_resources, markup_to_intermediary, render, render_with_engine, ColumnDef, DatabaseSchema,
    Entity, Error, GraphvizCommand, Intermediary, LayoutEngine, Mode, Registry, Result,
};
pub use eralchemy_introspect::{Adapter, IntrospectOptions, PostgresAdapter};

/// Options for a full input-to-file conversion.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub introspect: IntrospectOptions,
    /// Keep only these tables when non-empty.
    pub include_tables: Vec<String>,
    pub exclude_tables: Vec<String>,
}

/// Convert `input` and write it to `output` using the Graphviz command for diagrams.
pub async fn render_er(
    input: impl Into<SchemaInput>,
    output: &Path,
    mode: Mode,
    opts: &RenderOptions,
) -> Result<()> {
    render_er_with_engine(input, output, mode, opts, &GraphvizCommand::default()).await
}

pub async fn render_er_with_engine(
    input: impl Into<SchemaInput>,
    output: &Path,
    mode: Mode,
    opts: &RenderOptions,
    engine: &dyn LayoutEngine,
) -> Result<()> {
    let intermediary = all_to_intermediary(input, &opts.introspect).await?;
    render_intermediary(intermediary, output, mode, opts, engine)
}

/// Filter an already-built intermediary representation and render it.
pub fn render_intermediary(
    intermediary: Intermediary,
    output: &Path,
    mode: Mode,
    opts: &RenderOptions,
    engine: &dyn LayoutEngine,
) -> Result<()> {
    let intermediary = filter_resources(intermediary, &opts.include_tables, &opts.exclude_tables);
    info!(
        event = "render_started",
        tables = intermediary.tables.len(),
        relations = intermediary.relations.len(),
        output = %output.display()
    );
    render_with_engine(&intermediary, output, mode, engine)
}
