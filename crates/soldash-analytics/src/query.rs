//! Record query pipeline.
//!
//! ## Algorithm
//!
//! 1. Window: for `Last(n)`, sort by id descending and keep the first `n`
//! 2. Filter by actor (case-insensitive substring)
//! 3. Filter by decile (exact match)
//! 4. Stable sort by the selected mode
//! 5. Paginate with a fixed page size, clamping the page to `[1, total_pages]`
//!
//! [`apply`] is a pure projection. [`QueryEngine`] owns a [`QueryState`] and
//! resets the page to 1 whenever the window, search term, decile filter or
//! sort mode changes.

use serde::{Deserialize, Serialize};
use soldash_core::{Decile, DecileError, Record, WindowSelection};
use std::fmt;
use std::str::FromStr;

/// Number of records per page.
pub const PAGE_SIZE: usize = 10;

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Highest id first.
    #[default]
    Recent,
    /// Lowest id first.
    Oldest,
    /// Highest value first.
    Highest,
    /// Lowest value first.
    Lowest,
}

impl FromStr for SortMode {
    type Err = QueryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recent" => Ok(Self::Recent),
            "oldest" => Ok(Self::Oldest),
            "highest" => Ok(Self::Highest),
            "lowest" => Ok(Self::Lowest),
            other => Err(QueryParseError::SortMode(other.to_string())),
        }
    }
}

/// Decile filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketFilter {
    /// Keep every decile.
    #[default]
    All,
    /// Keep one decile.
    Only(Decile),
}

impl BucketFilter {
    fn matches(self, record: &Record) -> bool {
        match self {
            Self::All => true,
            Self::Only(decile) => record.bucket == decile,
        }
    }
}

impl FromStr for BucketFilter {
    type Err = QueryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<Decile>()
            .map(Self::Only)
            .map_err(QueryParseError::Bucket)
    }
}

impl fmt::Display for BucketFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(decile) => write!(f, "{}", decile),
        }
    }
}

/// Error parsing a query parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryParseError {
    /// Unknown sort mode.
    #[error("unknown sort mode: {0}")]
    SortMode(String),

    /// Invalid decile filter.
    #[error("invalid bucket filter: {0}")]
    Bucket(DecileError),
}

/// Inputs of the query pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    /// Windowing applied before filtering.
    pub window: WindowSelection,
    /// Case-insensitive actor substring; empty matches everything.
    pub search_term: String,
    /// Decile filter.
    pub bucket_filter: BucketFilter,
    /// Ordering.
    pub sort_mode: SortMode,
    /// 1-based page number.
    pub page: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            window: WindowSelection::All,
            search_term: String::new(),
            bucket_filter: BucketFilter::All,
            sort_mode: SortMode::Recent,
            page: 1,
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPage {
    /// Records on this page.
    pub items: Vec<Record>,
    /// Records matching the filters across all pages.
    pub total_count: usize,
    /// Number of pages; zero when nothing matches.
    pub total_pages: usize,
    /// The page actually returned, after clamping.
    pub page: usize,
}

/// The `n` most recent records by id, or all of them.
pub fn window_records(records: &[Record], window: WindowSelection) -> Vec<&Record> {
    let mut view: Vec<&Record> = records.iter().collect();
    if let WindowSelection::Last(n) = window {
        view.sort_by(|a, b| b.id.cmp(&a.id));
        view.truncate(n);
    }
    view
}

/// Owned copy of [`window_records`], for feeding the aggregations.
pub fn windowed(records: &[Record], window: WindowSelection) -> Vec<Record> {
    window_records(records, window).into_iter().cloned().collect()
}

/// Number of pages needed for `total` records.
pub fn page_count(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE)
}

/// Clamps a requested page to `[1, total_pages]` (1 when there are no pages).
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Runs the full pipeline.
pub fn apply(records: &[Record], state: &QueryState) -> QueryPage {
    let needle = state.search_term.to_lowercase();

    let mut matched: Vec<&Record> = window_records(records, state.window)
        .into_iter()
        .filter(|r| needle.is_empty() || r.actor.to_lowercase().contains(&needle))
        .filter(|r| state.bucket_filter.matches(r))
        .collect();

    match state.sort_mode {
        SortMode::Recent => matched.sort_by(|a, b| b.id.cmp(&a.id)),
        SortMode::Oldest => matched.sort_by(|a, b| a.id.cmp(&b.id)),
        SortMode::Highest => matched.sort_by(|a, b| b.value.total_cmp(&a.value)),
        SortMode::Lowest => matched.sort_by(|a, b| a.value.total_cmp(&b.value)),
    }

    let total_count = matched.len();
    let total_pages = page_count(total_count);
    let page = clamp_page(state.page, total_pages);

    let items = matched
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .cloned()
        .collect();

    QueryPage {
        items,
        total_count,
        total_pages,
        page,
    }
}

/// Stateful wrapper around [`apply`].
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    state: QueryState,
}

impl QueryEngine {
    /// Creates an engine with the default state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with an explicit starting state.
    pub fn with_state(state: QueryState) -> Self {
        Self { state }
    }

    /// Current state.
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Sets the window, resetting the page if it changed.
    pub fn set_window(&mut self, window: WindowSelection) {
        if self.state.window != window {
            self.state.window = window;
            self.state.page = 1;
        }
    }

    /// Sets the actor search term, resetting the page if it changed.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if self.state.search_term != term {
            self.state.search_term = term;
            self.state.page = 1;
        }
    }

    /// Sets the decile filter, resetting the page if it changed.
    pub fn set_bucket_filter(&mut self, filter: BucketFilter) {
        if self.state.bucket_filter != filter {
            self.state.bucket_filter = filter;
            self.state.page = 1;
        }
    }

    /// Sets the sort mode, resetting the page if it changed.
    pub fn set_sort_mode(&mut self, mode: SortMode) {
        if self.state.sort_mode != mode {
            self.state.sort_mode = mode;
            self.state.page = 1;
        }
    }

    /// Requests a page; clamped on the next projection.
    pub fn set_page(&mut self, page: usize) {
        self.state.page = page.max(1);
    }

    /// Advances one page.
    pub fn next_page(&mut self) {
        self.state.page = self.state.page.saturating_add(1);
    }

    /// Goes back one page, stopping at 1.
    pub fn prev_page(&mut self) {
        self.state.page = self.state.page.saturating_sub(1).max(1);
    }

    /// Projects the records and stores the clamped page back into the state.
    pub fn project(&mut self, records: &[Record]) -> QueryPage {
        let result = apply(records, &self.state);
        self.state.page = result.page;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(n: u8) -> Decile {
        Decile::new(n).unwrap()
    }

    fn records(n: i64) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                let actor = if i % 2 == 0 { "Alice" } else { "bob" };
                Record::new(i, (i % 7) as f64, i as u64, actor, (i * 4 % 100) as f64)
            })
            .collect()
    }

    fn ids(page: &QueryPage) -> Vec<i64> {
        page.items.iter().map(|r| r.id).collect()
    }

    #[test]
    fn twenty_five_records_make_three_pages() {
        let recs = records(25);
        let page = apply(&recs, &QueryState::default());
        assert_eq!(page.total_count, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 10);

        let last = apply(
            &recs,
            &QueryState {
                page: 3,
                ..QueryState::default()
            },
        );
        assert_eq!(last.items.len(), 5);
        assert_eq!(ids(&last), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn search_change_resets_page() {
        let recs = records(25);
        let mut engine = QueryEngine::new();
        engine.set_page(3);
        assert_eq!(engine.project(&recs).page, 3);

        engine.set_search_term("ali");
        assert_eq!(engine.state().page, 1);
        let page = engine.project(&recs);
        assert_eq!(page.page, 1);
        assert!(page.items.iter().all(|r| r.actor == "Alice"));
    }

    #[test]
    fn unchanged_input_keeps_page() {
        let recs = records(25);
        let mut engine = QueryEngine::new();
        engine.set_page(2);
        engine.set_search_term("");
        engine.set_sort_mode(SortMode::Recent);
        assert_eq!(engine.project(&recs).page, 2);
    }

    #[test]
    fn every_input_change_resets_page() {
        let mut engine = QueryEngine::new();

        engine.set_page(3);
        engine.set_window(WindowSelection::Last(10));
        assert_eq!(engine.state().page, 1);

        engine.set_page(3);
        engine.set_bucket_filter(BucketFilter::Only(d(2)));
        assert_eq!(engine.state().page, 1);

        engine.set_page(3);
        engine.set_sort_mode(SortMode::Highest);
        assert_eq!(engine.state().page, 1);
    }

    #[test]
    fn zero_matches_yield_zero_pages() {
        let recs = records(25);
        let state = QueryState {
            search_term: "nobody".to_string(),
            ..QueryState::default()
        };
        let page = apply(&recs, &state);
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
        assert_eq!(page.page, 1);
    }

    #[test]
    fn page_clamped_to_last() {
        let recs = records(25);
        let mut engine = QueryEngine::new();
        engine.set_page(9);
        let page = engine.project(&recs);
        assert_eq!(page.page, 3);
        assert_eq!(engine.state().page, 3);

        engine.prev_page();
        assert_eq!(engine.state().page, 2);
        engine.next_page();
        engine.next_page();
        assert_eq!(engine.project(&recs).page, 3);
    }

    #[test]
    fn default_state_is_id_descending_and_idempotent() {
        let mut recs = records(12);
        recs.reverse();
        recs.swap(0, 5);

        let state = QueryState::default();
        let first = apply(&recs, &state);
        assert_eq!(ids(&first), vec![12, 11, 10, 9, 8, 7, 6, 5, 4, 3]);
        assert_eq!(first, apply(&recs, &state));
    }

    #[test]
    fn window_takes_most_recent_ids() {
        let recs = records(30);
        let state = QueryState {
            window: WindowSelection::Last(10),
            sort_mode: SortMode::Oldest,
            ..QueryState::default()
        };
        let page = apply(&recs, &state);
        assert_eq!(page.total_count, 10);
        assert_eq!(ids(&page), (21..=30).collect::<Vec<_>>());
    }

    #[test]
    fn window_larger_than_set() {
        let recs = records(5);
        let state = QueryState {
            window: WindowSelection::Last(50),
            ..QueryState::default()
        };
        assert_eq!(apply(&recs, &state).total_count, 5);
    }

    #[test]
    fn search_is_case_insensitive() {
        let recs = records(10);
        let state = QueryState {
            search_term: "BO".to_string(),
            ..QueryState::default()
        };
        let page = apply(&recs, &state);
        assert_eq!(page.total_count, 5);
        assert!(page.items.iter().all(|r| r.actor == "bob"));
    }

    #[test]
    fn bucket_filter_exact_match() {
        let recs = vec![
            Record::new(1, 1.0, 1, "a", 15.0),
            Record::new(2, 1.0, 1, "a", 25.0),
            Record::new(3, 1.0, 1, "a", 12.0),
        ];
        let state = QueryState {
            bucket_filter: BucketFilter::Only(d(2)),
            ..QueryState::default()
        };
        assert_eq!(ids(&apply(&recs, &state)), vec![3, 1]);
    }

    #[test]
    fn value_sort_is_stable() {
        let recs = vec![
            Record::new(1, 5.0, 1, "a", 50.0),
            Record::new(2, 9.0, 1, "a", 50.0),
            Record::new(3, 5.0, 1, "a", 50.0),
            Record::new(4, 1.0, 1, "a", 50.0),
        ];
        let highest = QueryState {
            sort_mode: SortMode::Highest,
            ..QueryState::default()
        };
        // ties retain filter-stage (input) order
        assert_eq!(ids(&apply(&recs, &highest)), vec![2, 1, 3, 4]);

        let lowest = QueryState {
            sort_mode: SortMode::Lowest,
            ..QueryState::default()
        };
        assert_eq!(ids(&apply(&recs, &lowest)), vec![4, 1, 3, 2]);
    }

    #[test]
    fn parse_parameters() {
        assert_eq!("Highest".parse::<SortMode>().unwrap(), SortMode::Highest);
        assert!("sideways".parse::<SortMode>().is_err());
        assert_eq!("all".parse::<BucketFilter>().unwrap(), BucketFilter::All);
        assert_eq!("4".parse::<BucketFilter>().unwrap(), BucketFilter::Only(d(4)));
        assert!("0".parse::<BucketFilter>().is_err());
    }
}
