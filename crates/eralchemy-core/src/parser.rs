//! Reader for ER markup, the inverse of the ER serializer.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::intermediary::{Cardinality, ErColumn, ErTable, Intermediary, Relation};

fn table_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[(?P<name>[^\]]+)\]$").expect("valid table regex"))
}

fn relation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<left>[^{}]+?)\s*(?P<left_card>[*?+1]?)--(?P<right_card>[*?+1]?)\s*(?P<right>[^{}]+)$",
        )
        .expect("valid relation regex")
    })
}

fn column_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^(?P<key>\*?)(?P<name>[^{}]+?)\s*(\{\s*label\s*:\s*"(?P<label>(?:[^"\\]|\\.)*)"\s*\})?$"#,
        )
        .expect("valid column regex")
    })
}

enum Line {
    Table(String),
    Column(ErColumn),
    Relation(Relation),
}

/// Parse ER markup into tables and relations, in file order.
///
/// Blank lines and lines starting with `#` are ignored.
pub fn markup_to_intermediary(markup: &str) -> Result<Intermediary> {
    let mut tables: Vec<ErTable> = Vec::new();
    let mut relations = Vec::new();

    for (idx, raw) in markup.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_line(line).ok_or_else(|| Error::Parse {
            line: line_no,
            message: format!("unrecognized line: {line}"),
        })? {
            Line::Table(name) => tables.push(ErTable::new(name, Vec::new())),
            Line::Relation(relation) => relations.push(relation),
            Line::Column(column) => match tables.last_mut() {
                Some(table) => table.columns.push(column),
                None => {
                    return Err(Error::Parse {
                        line: line_no,
                        message: format!("column '{}' declared before any table", column.name),
                    });
                }
            },
        }
    }

    Ok(Intermediary::new(tables, relations))
}

fn parse_line(line: &str) -> Option<Line> {
    if let Some(caps) = table_re().captures(line) {
        let name = caps["name"].trim();
        return (!name.is_empty()).then(|| Line::Table(name.to_string()));
    }

    if let Some(caps) = relation_re().captures(line) {
        return Some(Line::Relation(Relation::new(
            &caps["left"],
            &caps["right"],
            cardinality(&caps["left_card"]),
            cardinality(&caps["right_card"]),
        )));
    }

    column_re().captures(line).map(|caps| {
        Line::Column(ErColumn::new(
            &caps["name"],
            caps.name("label")
                .map(|m| unescape_label(m.as_str()))
                .unwrap_or_default(),
            !caps["key"].is_empty(),
        ))
    })
}

fn unescape_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            other => out.push(other),
        }
    }
    out
}

fn cardinality(symbol: &str) -> Option<Cardinality> {
    symbol.chars().next().and_then(Cardinality::from_symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::intermediary_to_er_string;

    #[test]
    fn reads_tables_columns_and_relations() {
        let markup = "\
# shop
[users]
*id {label:\"INTEGER\"}
name {label:\"VARCHAR(255)\"}

[orders]
*id {label:\"INTEGER\"}
user_id
users *--? orders
";
        let parsed = markup_to_intermediary(markup).expect("parse markup");
        assert_eq!(parsed.tables.len(), 2);
        assert_eq!(
            parsed.tables[0].columns[1],
            ErColumn::new("name", "VARCHAR(255)", false)
        );
        assert_eq!(parsed.tables[1].columns[1], ErColumn::new("user_id", "", false));
        assert_eq!(
            parsed.relations,
            vec![Relation::new(
                "users",
                "orders",
                Some(Cardinality::ZeroOrMore),
                Some(Cardinality::ZeroOrOne),
            )]
        );
    }

    #[test]
    fn reads_back_serializer_output() {
        let original = Intermediary::new(
            vec![ErTable::new(
                "app.items",
                vec![ErColumn::new("id", "bigint", true), ErColumn::new("label", "text", false)],
            )],
            vec![Relation::new("app.items", "app.items", None, Some(Cardinality::OneOrMore))],
        );
        let parsed = markup_to_intermediary(&intermediary_to_er_string(&original)).expect("parse");
        assert_eq!(parsed, original);
    }

    #[test]
    fn reads_back_quoted_types() {
        let original = Intermediary::new(
            vec![ErTable::new(
                "tickets",
                vec![
                    ErColumn::new("status", "\"Status\"", false),
                    ErColumn::new("pattern", r"text\d", false),
                ],
            )],
            Vec::new(),
        );
        let parsed = markup_to_intermediary(&intermediary_to_er_string(&original)).expect("parse");
        assert_eq!(parsed, original);
    }

    #[test]
    fn reads_back_names_with_spaces() {
        let original = Intermediary::new(
            vec![
                ErTable::new("customers", vec![ErColumn::new("id", "integer", true)]),
                ErTable::new(
                    "order items",
                    vec![
                        ErColumn::new("first name", "text", true),
                        ErColumn::new("customer id", "integer", false),
                    ],
                ),
            ],
            vec![Relation::new(
                "customers",
                "order items",
                Some(Cardinality::ZeroOrMore),
                Some(Cardinality::ZeroOrOne),
            )],
        );
        let parsed = markup_to_intermediary(&intermediary_to_er_string(&original)).expect("parse");
        assert_eq!(parsed, original);
    }

    #[test]
    fn column_before_table_is_an_error() {
        let err = markup_to_intermediary("*id {label:\"INTEGER\"}").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn garbage_reports_line_number() {
        let err = markup_to_intermediary("[users]\nid\n{{{").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }));
    }
}
