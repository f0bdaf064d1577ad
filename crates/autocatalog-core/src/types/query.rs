//! Store-level query description.

use super::filter::Filter;
use super::sorting::SortField;

/// What a store should select: filter, ordering, and window.
///
/// Without an explicit order, rows come back in the store's natural order.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    /// Row filter.
    pub filter: Filter,
    /// Sort keys, applied in sequence.
    pub order: Vec<SortField>,
    /// Rows to skip.
    pub offset: Option<u64>,
    /// Maximum rows to return.
    pub limit: Option<u64>,
}

impl QuerySpec {
    /// A spec that selects every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a filter.
    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}
