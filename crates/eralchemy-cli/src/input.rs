use std::path::Path;

use eralchemy::{markup_to_intermediary, DatabaseSchema, Intermediary, SchemaInput};
use eralchemy_core::ConnectionUrl;

use crate::CliError;

/// What the `--input` argument turned out to be.
#[derive(Debug)]
pub enum LoadedInput {
    /// Goes through the intermediary builder.
    Schema(SchemaInput),
    /// ER markup file, already in intermediary form.
    Markup(Intermediary),
}

/// Interpret `input` as a connection URL, an `.er` markup file or a `.json` schema snapshot.
pub fn load_input(input: &str) -> Result<LoadedInput, CliError> {
    if ConnectionUrl::parse(input).is_some() {
        return Ok(LoadedInput::Schema(SchemaInput::Text(input.to_string())));
    }

    let path = Path::new(input);
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("er") => {
            let markup = std::fs::read_to_string(path)?;
            Ok(LoadedInput::Markup(markup_to_intermediary(&markup)?))
        }
        Some("json") => {
            let content = std::fs::read_to_string(path)?;
            let schema: DatabaseSchema = serde_json::from_str(&content)?;
            Ok(LoadedInput::Schema(SchemaInput::Metadata(schema)))
        }
        // Left to the builder, which reports it as unsupported.
        _ => Ok(LoadedInput::Schema(SchemaInput::Text(input.to_string()))),
    }
}
