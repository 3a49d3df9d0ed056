//! Normalized tables and relations shared by every input source and renderer.
//!
//! Each entity knows how to write itself as ER markup (`to_er`) and as a DOT
//! fragment (`to_dot`); the serializers only concatenate those fragments.

use std::fmt;
use std::str::FromStr;

/// Column of an [`ErTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErColumn {
    pub name: String,
    pub column_type: String,
    pub is_key: bool,
}

impl ErColumn {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>, is_key: bool) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            is_key,
        }
    }

    /// `*name {label:"type"}` for key columns, `name {label:"type"}` otherwise.
    ///
    /// Quotes and backslashes in the type are backslash-escaped.
    pub fn to_er(&self) -> String {
        format!(
            "{}{} {{label:\"{}\"}}",
            if self.is_key { "*" } else { "" },
            self.name,
            escape_quotes(&self.column_type)
        )
    }

    /// One HTML-like table row of the owning table's node label.
    pub fn to_dot(&self) -> String {
        let name = escape_html(&self.name);
        let name = if self.is_key {
            format!("<u>{name}</u>")
        } else {
            name
        };
        format!(
            "<TR><TD ALIGN=\"LEFT\">{name}<FONT> [{}]</FONT></TD></TR>",
            escape_html(&self.column_type)
        )
    }
}

/// Named relation with its ordered columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErTable {
    pub name: String,
    pub columns: Vec<ErColumn>,
}

impl ErTable {
    pub fn new(name: impl Into<String>, columns: Vec<ErColumn>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// `[name]` header followed by one line per column.
    pub fn to_er(&self) -> String {
        let mut out = format!("[{}]", self.name);
        for column in &self.columns {
            out.push('\n');
            out.push_str(&column.to_er());
        }
        out
    }

    /// A DOT node whose label is an HTML-like table.
    pub fn to_dot(&self) -> String {
        let rows: String = self.columns.iter().map(ErColumn::to_dot).collect();
        format!(
            "{} [label=<<FONT FACE=\"Helvetica\"><TABLE BORDER=\"0\" CELLBORDER=\"1\" \
             CELLPADDING=\"4\" CELLSPACING=\"0\"><TR><TD><B><FONT POINT-SIZE=\"16\">{}\
             </FONT></B></TD></TR>{}</TABLE></FONT>>];",
            quote_dot_id(&self.name),
            escape_html(&self.name),
            rows
        )
    }
}

/// How many rows of one side take part in a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    ZeroOrMore,
    ZeroOrOne,
    ExactlyOne,
    OneOrMore,
}

impl Cardinality {
    /// Single-character marker used in ER markup.
    pub fn symbol(self) -> char {
        match self {
            Cardinality::ZeroOrMore => '*',
            Cardinality::ZeroOrOne => '?',
            Cardinality::ExactlyOne => '1',
            Cardinality::OneOrMore => '+',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '*' => Some(Cardinality::ZeroOrMore),
            '?' => Some(Cardinality::ZeroOrOne),
            '1' => Some(Cardinality::ExactlyOne),
            '+' => Some(Cardinality::OneOrMore),
            _ => None,
        }
    }

    /// Edge label shown in rendered diagrams.
    pub fn dot_label(self) -> &'static str {
        match self {
            Cardinality::ZeroOrMore => "0..N",
            Cardinality::ZeroOrOne => "{0,1}",
            Cardinality::ExactlyOne => "1",
            Cardinality::OneOrMore => "1..N",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Cardinality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(symbol), None) => Cardinality::from_symbol(symbol)
                .ok_or_else(|| format!("unknown cardinality: {s}")),
            _ => Err(format!("unknown cardinality: {s}")),
        }
    }
}

/// Link between two tables, usually derived from a foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub left: String,
    pub right: String,
    pub left_cardinality: Option<Cardinality>,
    pub right_cardinality: Option<Cardinality>,
}

impl Relation {
    pub fn new(
        left: impl Into<String>,
        right: impl Into<String>,
        left_cardinality: Option<Cardinality>,
        right_cardinality: Option<Cardinality>,
    ) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            left_cardinality,
            right_cardinality,
        }
    }

    /// `left <card>--<card> right`; a missing cardinality leaves its slot empty.
    pub fn to_er(&self) -> String {
        format!(
            "{} {}--{} {}",
            self.left,
            symbol_or_empty(self.left_cardinality),
            symbol_or_empty(self.right_cardinality),
            self.right
        )
    }

    /// Undirected DOT edge; empty when neither side has a cardinality.
    pub fn to_dot(&self) -> String {
        let mut labels = Vec::with_capacity(2);
        if let Some(card) = self.left_cardinality {
            labels.push(format!("taillabel=<<FONT>{}</FONT>>", card.dot_label()));
        }
        if let Some(card) = self.right_cardinality {
            labels.push(format!("headlabel=<<FONT>{}</FONT>>", card.dot_label()));
        }
        if labels.is_empty() {
            return String::new();
        }
        format!(
            "{} -- {} [{}];",
            quote_dot_id(&self.left),
            quote_dot_id(&self.right),
            labels.join(",")
        )
    }

    pub fn touches(&self, table: &str) -> bool {
        self.left == table || self.right == table
    }
}

fn symbol_or_empty(card: Option<Cardinality>) -> String {
    card.map(|c| c.symbol().to_string()).unwrap_or_default()
}

/// The (tables, relations) pair handed from the builder to the renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intermediary {
    pub tables: Vec<ErTable>,
    pub relations: Vec<Relation>,
}

impl Intermediary {
    pub fn new(tables: Vec<ErTable>, relations: Vec<Relation>) -> Self {
        Self { tables, relations }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.relations.is_empty()
    }
}

/// Escape a string for use in DOT HTML-like labels.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Node IDs are always quoted so dotted schema-qualified names stay intact.
fn quote_dot_id(s: &str) -> String {
    format!("\"{}\"", escape_quotes(s))
}
