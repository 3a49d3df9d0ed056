use eralchemy_core::{declarative_to_intermediary, intermediary_to_er_string, ColumnDef, Entity, Registry};

struct Author;

impl Entity for Author {
    fn table_name() -> &'static str {
        "authors"
    }

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("id", "INTEGER").primary_key(),
            ColumnDef::new("name", "VARCHAR(120)").not_null(),
        ]
    }
}

struct Book;

impl Entity for Book {
    fn table_name() -> &'static str {
        "books"
    }

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("id", "INTEGER").primary_key(),
            ColumnDef::new("title", "TEXT").not_null(),
            ColumnDef::new("author_id", "INTEGER").references("authors", "id"),
        ]
    }
}

fn main() {
    let mut registry = Registry::new();
    registry.register::<Author>().register::<Book>();

    let intermediary = declarative_to_intermediary(&registry);
    print!("{}", intermediary_to_er_string(&intermediary));
}
