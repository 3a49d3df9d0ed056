//! Serializers that project an [`Intermediary`] into ER markup, DOT source or
//! a rendered diagram.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::info;

use crate::error::{Error, Result};
use crate::intermediary::Intermediary;
use crate::mode::{Mode, Renderer};

/// Fixed opening of every DOT document.
pub const GRAPH_BEGINNING: &str = "graph {
   graph [rankdir=LR];
   node [label=\"\\N\",
         shape=plaintext
   ];
   edge [color=gray50,
         minlen=2,
         style=dashed
   ];";

/// Lays out DOT source and writes the result to a file.
pub trait LayoutEngine {
    fn render(&self, dot: &str, output: &Path, format: &str) -> Result<()>;
}

/// Layout engine backed by the Graphviz command-line tools.
#[derive(Debug, Clone)]
pub struct GraphvizCommand {
    program: String,
}

impl Default for GraphvizCommand {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl GraphvizCommand {
    /// Use `program` (e.g. `dot`, `neato`) as the layout program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl LayoutEngine for GraphvizCommand {
    fn render(&self, dot: &str, output: &Path, format: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .arg(format!("-T{format}"))
            .arg("-o")
            .arg(output)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    Error::Layout(format!(
                        "Graphviz '{}' command not found; install Graphviz or use the er/dot modes",
                        self.program
                    ))
                } else {
                    Error::Layout(format!("failed to run {}: {err}", self.program))
                }
            })?;

        // Stdin is dropped after writing so the layout program sees EOF.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(dot.as_bytes()),
            None => Ok(()),
        };

        // Reap the child before reporting a write failure; its status explains an early exit.
        let status = child.wait()?;
        if !status.success() {
            return Err(Error::Layout(format!(
                "{} exited with status: {status}",
                self.program
            )));
        }
        written?;
        Ok(())
    }
}

/// ER markup: every table block, then every relation, one per line.
pub fn intermediary_to_er_string(intermediary: &Intermediary) -> String {
    let mut out = String::new();
    for table in &intermediary.tables {
        out.push_str(&table.to_er());
        out.push('\n');
    }
    for relation in &intermediary.relations {
        out.push_str(&relation.to_er());
        out.push('\n');
    }
    out
}

/// DOT source: fixed header, one node per table, one edge per relation, closing brace.
pub fn intermediary_to_dot_string(intermediary: &Intermediary) -> String {
    let mut out = String::from(GRAPH_BEGINNING);
    out.push('\n');
    for table in &intermediary.tables {
        out.push_str(&table.to_dot());
        out.push('\n');
    }
    for relation in &intermediary.relations {
        out.push_str(&relation.to_dot());
        out.push('\n');
    }
    out.push('}');
    out
}

pub fn intermediary_to_er(intermediary: &Intermediary, output: &Path) -> Result<()> {
    write_text(output, &intermediary_to_er_string(intermediary))
}

pub fn intermediary_to_dot(intermediary: &Intermediary, output: &Path) -> Result<()> {
    write_text(output, &intermediary_to_dot_string(intermediary))
}

pub fn intermediary_to_graph(
    intermediary: &Intermediary,
    output: &Path,
    format: &str,
    engine: &dyn LayoutEngine,
) -> Result<()> {
    engine.render(&intermediary_to_dot_string(intermediary), output, format)
}

/// Parse a mode string and resolve it against `output`.
pub fn resolve_mode(output: &Path, mode: &str) -> Result<Renderer> {
    Ok(mode.parse::<Mode>()?.resolve(output))
}

/// Render with the default Graphviz layout engine.
pub fn render(intermediary: &Intermediary, output: &Path, mode: Mode) -> Result<()> {
    render_with_engine(intermediary, output, mode, &GraphvizCommand::default())
}

pub fn render_with_engine(
    intermediary: &Intermediary,
    output: &Path,
    mode: Mode,
    engine: &dyn LayoutEngine,
) -> Result<()> {
    let renderer = mode.resolve(output);
    info!(event = "mode_resolved", mode = %mode, renderer = ?renderer);

    match &renderer {
        Renderer::Er => intermediary_to_er(intermediary, output)?,
        Renderer::Dot => intermediary_to_dot(intermediary, output)?,
        Renderer::Graph { format } => intermediary_to_graph(intermediary, output, format, engine)?,
    }

    info!(event = "output_written", path = %output.display());
    Ok(())
}

fn write_text(output: &Path, contents: &str) -> Result<()> {
    let mut file = File::create(output)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}
