use std::sync::Arc;

use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{CatalogError, DetailCache, EntityDetail, EntitySummary, SortKey, ViewMode};
use crate::controller::{Navigation, PageTicket, PaginationState, ResultSetController};
use crate::source::{self, CatalogSource, FetchLimit};

#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub page_size: usize,
    pub concurrency: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            page_size: crate::controller::DEFAULT_PAGE_SIZE,
            concurrency: 12,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageEntry {
    pub summary: EntitySummary,
    pub detail: Option<EntityDetail>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageView {
    pub pagination: PaginationState,
    pub mode: ViewMode,
    pub sort: SortKey,
    pub entries: Vec<PageEntry>,
}

impl PageView {
    pub fn results(&self) -> Result<&[PageEntry], CatalogError> {
        if self.entries.is_empty() {
            return Err(CatalogError::NoResults);
        }
        Ok(&self.entries)
    }
}

// a page load captured at one generation of the view
#[derive(Clone, Debug)]
pub struct PageRequest {
    ticket: PageTicket,
    entries: Vec<EntitySummary>,
    missing: Vec<u32>,
}

#[derive(Clone, Debug)]
pub struct PageFetch {
    request: PageRequest,
    fetched: Vec<(u32, Option<EntityDetail>)>,
}

/// Fetches whatever details `request` still lacks.
///
/// Owns its inputs so it can stay in flight while the session keeps handling
/// commands; hand the result back through [`Session::commit_page`].
pub async fn fetch_page<S: CatalogSource>(
    source: Arc<S>,
    request: PageRequest,
    limit: FetchLimit,
) -> PageFetch {
    let fetched = source::fetch_details(source.as_ref(), &request.missing, &limit).await;
    PageFetch { request, fetched }
}

// a category filter waiting on the details it needs
#[derive(Clone, Debug)]
pub struct FilterRequest {
    ticket: PageTicket,
    category: Option<String>,
    missing: Vec<u32>,
}

impl FilterRequest {
    pub fn missing(&self) -> &[u32] {
        &self.missing
    }
}

#[derive(Clone, Debug)]
pub struct FilterFetch {
    request: FilterRequest,
    fetched: Vec<(u32, Option<EntityDetail>)>,
}

/// Fetches the details a category filter needs; commit through
/// [`Session::commit_filter`].
pub async fn fetch_filter<S: CatalogSource>(
    source: Arc<S>,
    request: FilterRequest,
    limit: FetchLimit,
) -> FilterFetch {
    if !request.missing.is_empty() {
        info!(count = request.missing.len(), "fetching details for category filter");
    }
    let fetched = source::fetch_details(source.as_ref(), &request.missing, &limit).await;
    FilterFetch { request, fetched }
}

pub struct Session<S> {
    source: Arc<S>,
    controller: ResultSetController,
    details: DetailCache,
    limit: FetchLimit,
}

impl<S: CatalogSource> Session<S> {
    pub fn new(source: S, options: SessionOptions) -> Result<Self, CatalogError> {
        if options.page_size == 0 {
            return Err(CatalogError::InvalidOptions {
                field: "page_size",
                message: "expected a positive page size".to_string(),
            });
        }
        if options.concurrency == 0 {
            return Err(CatalogError::InvalidOptions {
                field: "concurrency",
                message: "expected at least one request in flight".to_string(),
            });
        }
        Ok(Self {
            source: Arc::new(source),
            controller: ResultSetController::new(options.page_size),
            details: DetailCache::new(),
            limit: FetchLimit::new(options.concurrency),
        })
    }

    pub fn source(&self) -> Arc<S> {
        Arc::clone(&self.source)
    }

    pub fn limit(&self) -> FetchLimit {
        self.limit.clone()
    }

    pub fn controller(&self) -> &ResultSetController {
        &self.controller
    }

    pub fn details(&self) -> &DetailCache {
        &self.details
    }

    pub async fn load(&mut self) -> Result<usize, CatalogError> {
        let summaries = self.source.fetch_summaries().await?;
        let count = summaries.len();
        self.details.clear();
        self.controller.install(summaries);
        info!(count, "catalog installed");
        Ok(count)
    }

    pub fn search(&mut self, term: &str) -> usize {
        self.controller.set_search_term(term);
        debug!(term, matches = self.controller.active_len(), "search applied");
        self.controller.active_len()
    }

    /// Applies a category filter, first fetching details for every entity that
    /// has none cached yet. `None` clears the filter.
    pub async fn filter(&mut self, category: Option<&str>) -> usize {
        let request = self.begin_filter(category);
        let fetch = fetch_filter(self.source(), request, self.limit()).await;
        match self.commit_filter(fetch) {
            Some(matches) => matches,
            None => self.controller.active_len(),
        }
    }

    pub fn begin_filter(&self, category: Option<&str>) -> FilterRequest {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let missing = match category {
            Some(_) => self
                .controller
                .entities()
                .iter()
                .map(|e| e.id)
                .filter(|id| !self.details.contains_key(id))
                .collect(),
            None => Vec::new(),
        };
        FilterRequest {
            ticket: self.controller.page_ticket(),
            category,
            missing,
        }
    }

    /// Stores the fetched details and applies the filter, returning the match
    /// count. A filter overtaken by a newer view change returns `None`.
    pub fn commit_filter(&mut self, fetch: FilterFetch) -> Option<usize> {
        let FilterFetch { request, fetched } = fetch;
        self.remember(fetched);
        if !self.controller.is_current(request.ticket) {
            debug!(category = ?request.category, "discarding superseded category filter");
            return None;
        }
        let category = request.category.as_deref();
        let matches = self.controller.set_category_filter(category, &self.details);
        debug!(?category, matches, "category filter applied");
        Some(matches)
    }

    pub fn sort(&mut self, key: SortKey) {
        self.controller.set_sort(key);
    }

    pub fn navigate(&mut self, navigation: Navigation) -> bool {
        self.controller.navigate(navigation)
    }

    pub fn go_to_input(&mut self, raw: &str) -> Result<bool, usize> {
        self.controller.go_to_input(raw)
    }

    pub fn begin_page(&self) -> PageRequest {
        let entries: Vec<EntitySummary> = self
            .controller
            .current_page_slice()
            .into_iter()
            .cloned()
            .collect();
        let missing = entries
            .iter()
            .map(|e| e.id)
            .filter(|id| !self.details.contains_key(id))
            .collect();
        PageRequest {
            ticket: self.controller.page_ticket(),
            entries,
            missing,
        }
    }

    /// Stores fetched details and builds the page, unless the view moved on
    /// since the request was taken. Stale pages return `None`.
    pub fn commit_page(&mut self, fetch: PageFetch) -> Option<PageView> {
        let PageFetch { request, fetched } = fetch;
        self.remember(fetched);
        if !self.controller.is_current(request.ticket) {
            debug!(
                page = request.ticket.page(),
                generation = request.ticket.generation(),
                "discarding superseded page"
            );
            return None;
        }
        let entries = request
            .entries
            .into_iter()
            .map(|summary| {
                let detail = self.details.get(&summary.id).cloned().flatten();
                PageEntry { summary, detail }
            })
            .collect();
        Some(PageView {
            pagination: self.controller.pagination(),
            mode: self.controller.mode().clone(),
            sort: self.controller.sort_key(),
            entries,
        })
    }

    pub async fn page(&mut self) -> Option<PageView> {
        let request = self.begin_page();
        let fetch = fetch_page(self.source(), request, self.limit()).await;
        self.commit_page(fetch)
    }

    /// Resolves `query` (id, `#id` or name) and returns its detail record.
    pub async fn inspect(
        &mut self,
        query: &str,
    ) -> Result<(EntitySummary, EntityDetail), CatalogError> {
        let summary = self
            .controller
            .find(query)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                query: query.trim().to_string(),
            })?;
        if let Some(Some(detail)) = self.details.get(&summary.id) {
            return Ok((summary, detail.clone()));
        }
        let detail = self.source.fetch_detail(summary.id).await;
        self.details.insert(summary.id, detail.clone());
        match detail {
            Some(detail) => Ok((summary, detail)),
            None => Err(CatalogError::NotFound {
                query: query.trim().to_string(),
            }),
        }
    }

    pub fn categories(&self) -> Vec<String> {
        self.details
            .values()
            .flatten()
            .flat_map(|d| d.categories.iter().map(|c| c.to_lowercase()))
            .unique()
            .sorted()
            .collect()
    }

    fn remember(&mut self, fetched: Vec<(u32, Option<EntityDetail>)>) {
        for (id, detail) in fetched {
            match detail {
                Some(detail) => {
                    self.details.insert(id, Some(detail));
                }
                None => {
                    self.details.entry(id).or_insert(None);
                }
            }
        }
    }
}
