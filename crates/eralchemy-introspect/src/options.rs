/// Options that control which catalog objects are read.
#[derive(Debug, Clone)]
pub struct IntrospectOptions {
    pub include_system_schemas: bool,
    pub include_views: bool,
    pub include_materialized_views: bool,
    pub include_foreign_tables: bool,
    pub include_comments: bool,
    /// Restrict introspection to these schemas when set.
    pub schemas: Option<Vec<String>>,
}

impl Default for IntrospectOptions {
    fn default() -> Self {
        Self {
            include_system_schemas: false,
            include_views: false,
            include_materialized_views: false,
            include_foreign_tables: true,
            include_comments: true,
            schemas: None,
        }
    }
}
