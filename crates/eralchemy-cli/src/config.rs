use std::path::Path;

use serde::Deserialize;

use eralchemy::Mode;

use crate::CliError;

/// Defaults read from a TOML file; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub mode: Option<Mode>,
    pub include_tables: Vec<String>,
    pub exclude_tables: Vec<String>,
    pub schemas: Vec<String>,
    pub include_views: Option<bool>,
    pub graphviz_program: Option<String>,
}

pub fn load_config(path: &Path) -> Result<FileConfig, CliError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<FileConfig, CliError> {
    Ok(toml::from_str(content)?)
}

/// Settings after merging flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub mode: Mode,
    pub include_tables: Vec<String>,
    pub exclude_tables: Vec<String>,
    pub schemas: Vec<String>,
    pub include_views: bool,
    pub graphviz_program: String,
}

/// Command-line values that may override the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub mode: Option<Mode>,
    pub include_tables: Vec<String>,
    pub exclude_tables: Vec<String>,
    pub schemas: Vec<String>,
    pub include_views: Option<bool>,
}

impl Settings {
    pub fn merge(file: FileConfig, flags: Overrides) -> Self {
        Self {
            mode: flags.mode.or(file.mode).unwrap_or_default(),
            include_tables: prefer_non_empty(flags.include_tables, file.include_tables),
            exclude_tables: prefer_non_empty(flags.exclude_tables, file.exclude_tables),
            schemas: prefer_non_empty(flags.schemas, file.schemas),
            include_views: flags.include_views.or(file.include_views).unwrap_or(false),
            graphviz_program: file.graphviz_program.unwrap_or_else(|| "dot".to_string()),
        }
    }
}

fn prefer_non_empty(flag: Vec<String>, file: Vec<String>) -> Vec<String> {
    if flag.is_empty() { file } else { flag }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let config = parse_config(
            r#"
mode = "dot"
include_tables = ["users", "orders"]
exclude_tables = ["audit_log"]
schemas = ["app"]
include_views = true
graphviz_program = "neato"
"#,
        )
        .expect("parse config");

        assert_eq!(config.mode, Some(Mode::Dot));
        assert_eq!(config.include_tables, vec!["users", "orders"]);
        assert_eq!(config.include_views, Some(true));
        assert_eq!(config.graphviz_program.as_deref(), Some("neato"));
    }

    #[test]
    fn rejects_unknown_keys_and_modes() {
        assert!(parse_config("colour = \"red\"").is_err());
        assert!(parse_config("mode = \"bogus\"").is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let file = FileConfig {
            mode: Some(Mode::Dot),
            exclude_tables: vec!["audit_log".to_string()],
            schemas: vec!["app".to_string()],
            ..FileConfig::default()
        };
        let flags = Overrides {
            mode: Some(Mode::Er),
            schemas: vec!["billing".to_string()],
            ..Overrides::default()
        };

        let settings = Settings::merge(file, flags);
        assert_eq!(settings.mode, Mode::Er);
        assert_eq!(settings.exclude_tables, vec!["audit_log".to_string()]);
        assert_eq!(settings.schemas, vec!["billing".to_string()]);
        assert_eq!(settings.graphviz_program, "dot");
        assert!(!settings.include_views);
    }

    #[test]
    fn flags_can_turn_views_back_off() {
        let file = FileConfig {
            include_views: Some(true),
            ..FileConfig::default()
        };

        let kept = Settings::merge(file.clone(), Overrides::default());
        assert!(kept.include_views);

        let flags = Overrides {
            include_views: Some(false),
            ..Overrides::default()
        };
        assert!(!Settings::merge(file, flags).include_views);
    }

    #[test]
    fn empty_everything_means_auto() {
        let settings = Settings::merge(FileConfig::default(), Overrides::default());
        assert_eq!(settings.mode, Mode::Auto);
        assert!(settings.include_tables.is_empty());
    }
}
