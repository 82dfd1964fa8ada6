//! Column reconciliation between diverged table schemas.

/// Compute the transfer schema for a table present in both databases.
///
/// Iterates the source inventory in its original order and keeps a column
/// iff its name also appears in the destination inventory. The result
/// preserves source ordering deterministically and is order-insensitive
/// with respect to the destination side.
///
/// Matching is exact-string and case-sensitive, with no type-compatibility
/// checking: a column that exists by name on both sides but with clashing
/// storage types is still attempted and may surface as an errored table at
/// insert time.
///
/// An absent destination table is represented by an empty destination
/// inventory, which yields an empty transfer schema; the caller classifies
/// that table as skipped and never invokes the row migrator for it.
pub fn transfer_schema(source: &[String], dest: &[String]) -> Vec<String> {
    source
        .iter()
        .filter(|col| dest.contains(col))
        .cloned()
        .collect()
}
