//! Predicate queries with pagination.

use jotdb_storage::Document;
use std::fmt;

/// Page size used when a query sets no limit.
pub const DEFAULT_LIMIT: usize = 25;

/// A boolean function over a document.
pub type Predicate<'a> = dyn Fn(&Document) -> bool + 'a;

/// A filtered, paginated scan of a collection.
///
/// There are no indexes: every query is a full scan in id order, followed
/// by the slice `[offset, offset + limit)` of the matching documents.
///
/// ```rust
/// use jotdb_core::Query;
///
/// let query = Query::new()
///     .filter(|doc| doc.get("done") == Some(&serde_json::Value::Bool(false)))
///     .limit(10)
///     .offset(20);
/// assert_eq!(query.get_limit(), 10);
/// ```
pub struct Query<'a> {
    strategy: Option<Box<Predicate<'a>>>,
    limit: usize,
    offset: usize,
}

impl Default for Query<'_> {
    fn default() -> Self {
        Self {
            strategy: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl<'a> Query<'a> {
    /// Creates a query matching every document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the query to documents accepted by `strategy`.
    ///
    /// The strategy may borrow from its environment for the life of the
    /// query.
    #[must_use]
    pub fn filter<F>(mut self, strategy: F) -> Self
    where
        F: Fn(&Document) -> bool + 'a,
    {
        self.strategy = Some(Box::new(strategy));
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets how many matching documents to skip.
    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Returns the page size.
    #[must_use]
    pub const fn get_limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of skipped matches.
    #[must_use]
    pub const fn get_offset(&self) -> usize {
        self.offset
    }

    /// Returns true if the document passes the filter.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        self.strategy.as_ref().map_or(true, |strategy| strategy(doc))
    }

    /// Runs the query over documents in order.
    pub fn run<'d, I>(&self, docs: I) -> QueryResult
    where
        I: IntoIterator<Item = &'d Document>,
    {
        let docs = docs
            .into_iter()
            .filter(|doc| self.matches(doc))
            .skip(self.offset)
            .take(self.limit)
            .cloned()
            .collect();

        QueryResult {
            docs,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

impl fmt::Debug for Query<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("filtered", &self.strategy.is_some())
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

/// One page of query results.
///
/// `offset` and `limit` echo the request; they are not clamped to the
/// number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Matching documents in the requested page.
    pub docs: Vec<Document>,
    /// Requested offset.
    pub offset: usize,
    /// Requested limit.
    pub limit: usize,
}
