use std::collections::BTreeSet;

use crate::intermediary::Intermediary;

/// Keep only the requested tables and the relations between survivors.
///
/// An empty `include` keeps every table. Relations are dropped only when one
/// of their endpoints was removed here; references to tables that were never
/// part of the input are left untouched.
pub fn filter_resources(
    intermediary: Intermediary,
    include: &[String],
    exclude: &[String],
) -> Intermediary {
    if include.is_empty() && exclude.is_empty() {
        return intermediary;
    }

    let keep = |name: &str| {
        (include.is_empty() || include.iter().any(|item| item == name))
            && !exclude.iter().any(|item| item == name)
    };

    let (tables, removed): (Vec<_>, Vec<_>) = intermediary
        .tables
        .into_iter()
        .partition(|table| keep(&table.name));
    let removed: BTreeSet<String> = removed.into_iter().map(|table| table.name).collect();

    let relations = intermediary
        .relations
        .into_iter()
        .filter(|relation| !removed.contains(&relation.left) && !removed.contains(&relation.right))
        .collect();

    Intermediary::new(tables, relations)
}
