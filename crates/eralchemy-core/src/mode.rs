//! Output mode selection.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Graphviz format used when an output path has no extension.
pub const DEFAULT_GRAPH_FORMAT: &str = "png";

/// Requested output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Choose from the output path's extension.
    #[default]
    Auto,
    /// ER markup.
    Er,
    /// Graphviz DOT source.
    Dot,
    /// Diagram rendered by Graphviz.
    Graph,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Mode::Auto),
            "er" => Ok(Mode::Er),
            "dot" => Ok(Mode::Dot),
            "graph" => Ok(Mode::Graph),
            _ => Err(Error::UnsupportedMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Auto => write!(f, "auto"),
            Mode::Er => write!(f, "er"),
            Mode::Dot => write!(f, "dot"),
            Mode::Graph => write!(f, "graph"),
        }
    }
}

/// Concrete renderer chosen for an output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Renderer {
    Er,
    Dot,
    /// Rendered diagram in the given Graphviz output format (`png`, `svg`, ...).
    Graph { format: String },
}

impl Mode {
    /// Resolve the renderer for `output`.
    ///
    /// `Auto` maps a trailing `.er` to ER markup, `.dot` to DOT source and any
    /// other extension to a rendered diagram in that format.
    pub fn resolve(self, output: &Path) -> Renderer {
        match self {
            Mode::Er => Renderer::Er,
            Mode::Dot => Renderer::Dot,
            Mode::Graph => Renderer::Graph {
                format: graph_format(output),
            },
            Mode::Auto => match output.extension().and_then(|ext| ext.to_str()) {
                Some("er") => Renderer::Er,
                Some("dot") => Renderer::Dot,
                _ => Renderer::Graph {
                    format: graph_format(output),
                },
            },
        }
    }
}

fn graph_format(output: &Path) -> String {
    output
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or(DEFAULT_GRAPH_FORMAT)
        .to_string()
}
