use thiserror::Error;

/// Core error type shared across eralchemy crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The input is none of the known schema sources.
    #[error("Cannot process input {0}")]
    UnsupportedInput(String),
    /// An explicit output mode is not one of the known renderer keys.
    #[error("Mode \"{0}\" is not supported.")]
    UnsupportedMode(String),
    /// A requested feature (e.g. a database engine) is not supported.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// Database error or adapter failure.
    #[error("database error: {0}")]
    Db(String),
    /// Malformed ER markup.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    /// The layout engine failed to render the diagram.
    #[error("layout error: {0}")]
    Layout(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results returned by eralchemy crates.
pub type Result<T> = std::result::Result<T, Error>;
