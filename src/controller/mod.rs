//! Result-set view controller.
//!
//! Owns the canonical collection and derives the active view (search or
//! category filter, in the current sort order) and the page slice shown to
//! the render sink.

use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::{DetailCache, EntitySummary, SortKey, ViewMode};
use crate::utils;

pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    First,
    Previous,
    Next,
    Last,
    /// Jump to a page; out-of-range values are clamped.
    GoTo(usize),
}

/// Page position plus which navigation controls make sense right now.
///
/// The disabled flags are advisory: navigating past a boundary is still
/// accepted and simply clamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub first_disabled: bool,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    pub last_disabled: bool,
}

/// Identifies the view a page load was started for.
///
/// Every view-changing operation advances the controller's generation, so a
/// ticket taken before a newer navigation is no longer current.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageTicket {
    generation: u64,
    page: usize,
}

impl PageTicket {
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

#[derive(Clone, Debug)]
pub struct ResultSetController {
    canonical: Vec<EntitySummary>,
    // indexes into `canonical`
    active: Vec<usize>,
    page_size: usize,
    current_page: usize,
    sort_key: SortKey,
    mode: ViewMode,
    category_members: HashSet<u32>,
    generation: u64,
}

impl Default for ResultSetController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ResultSetController {
    pub fn new(page_size: usize) -> Self {
        Self {
            canonical: Vec::new(),
            active: Vec::new(),
            page_size: page_size.max(1),
            current_page: 1,
            sort_key: SortKey::default(),
            mode: ViewMode::All,
            category_members: HashSet::new(),
            generation: 0,
        }
    }

    pub fn with_entities(entities: Vec<EntitySummary>, page_size: usize) -> Self {
        let mut controller = Self::new(page_size);
        controller.install(entities);
        controller
    }

    /// Replaces the canonical collection and orders it by the current sort key.
    pub fn install(&mut self, entities: Vec<EntitySummary>) {
        let key = self.sort_key;
        self.canonical = entities;
        self.canonical.sort_by(|a, b| key.compare(a, b));
        self.mode = ViewMode::All;
        self.category_members.clear();
        self.current_page = 1;
        self.recompute();
        self.advance();
    }

    pub fn entities(&self) -> &[EntitySummary] {
        &self.canonical
    }

    pub fn find(&self, query: &str) -> Option<&EntitySummary> {
        let query = query.trim();
        if let Ok(id) = query.trim_start_matches('#').parse::<u32>() {
            return self.canonical.iter().find(|e| e.id == id);
        }
        self.canonical
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(query))
    }

    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.active.len(), self.page_size)
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn active_view(&self) -> Vec<&EntitySummary> {
        self.active.iter().map(|&i| &self.canonical[i]).collect()
    }

    /// Case-insensitive match on name or decimal id. An empty term leaves
    /// search mode; entering search mode drops any category filter.
    pub fn set_search_term(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            if matches!(self.mode, ViewMode::Search(_)) {
                self.mode = ViewMode::All;
            }
        } else {
            self.mode = ViewMode::Search(term.to_string());
            self.category_members.clear();
        }
        self.current_page = 1;
        self.recompute();
        self.advance();
    }

    /// Filters by category using `details`, which should hold an entry for every
    /// canonical entity. Entities without a detail never match. Entering
    /// category mode drops any search term. Returns the size of the new view.
    pub fn set_category_filter(&mut self, category: Option<&str>, details: &DetailCache) -> usize {
        match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(name) => {
                self.category_members = self
                    .canonical
                    .iter()
                    .filter(|e| {
                        details
                            .get(&e.id)
                            .and_then(Option::as_ref)
                            .is_some_and(|d| d.has_category(name))
                    })
                    .map(|e| e.id)
                    .collect();
                self.mode = ViewMode::Category(name.to_lowercase());
            }
            None => {
                if matches!(self.mode, ViewMode::Category(_)) {
                    self.mode = ViewMode::All;
                    self.category_members.clear();
                }
            }
        }
        self.current_page = 1;
        self.recompute();
        self.advance();
        self.active.len()
    }

    /// Stable in-place reorder of the canonical collection. The current page
    /// is kept.
    pub fn set_sort(&mut self, key: SortKey) {
        self.canonical.sort_by(|a, b| key.compare(a, b));
        self.sort_key = key;
        self.recompute();
        self.advance();
    }

    /// Returns false, without touching the generation, when the clamped page is
    /// already current.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        let target = self.clamp_page(page);
        if target == self.current_page {
            return false;
        }
        self.current_page = target;
        self.advance();
        true
    }

    pub fn navigate(&mut self, navigation: Navigation) -> bool {
        let target = match navigation {
            Navigation::First => 1,
            Navigation::Previous => self.current_page.saturating_sub(1),
            Navigation::Next => self.current_page.saturating_add(1),
            Navigation::Last => self.total_pages(),
            Navigation::GoTo(page) => page,
        };
        self.go_to_page(target)
    }

    /// Handles typed page input. Unparsable or out-of-range input is ignored
    /// and the current page is returned as the error so the input can be
    /// reverted.
    pub fn go_to_input(&mut self, raw: &str) -> Result<bool, usize> {
        match raw.trim().parse::<usize>() {
            Ok(page) if (1..=self.total_pages()).contains(&page) => Ok(self.go_to_page(page)),
            _ => Err(self.current_page),
        }
    }

    pub fn current_page_slice(&self) -> Vec<&EntitySummary> {
        let start = (self.current_page - 1) * self.page_size;
        self.active
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&i| &self.canonical[i])
            .collect()
    }

    pub fn pagination(&self) -> PaginationState {
        let total_pages = self.total_pages();
        let at_first = self.current_page <= 1;
        let at_last = self.current_page >= total_pages;
        PaginationState {
            current_page: self.current_page,
            total_pages,
            total_items: self.active.len(),
            first_disabled: at_first,
            prev_disabled: at_first,
            next_disabled: at_last,
            last_disabled: at_last,
        }
    }

    pub fn page_ticket(&self) -> PageTicket {
        PageTicket {
            generation: self.generation,
            page: self.current_page,
        }
    }

    pub fn is_current(&self, ticket: PageTicket) -> bool {
        ticket.generation == self.generation
    }

    fn clamp_page(&self, page: usize) -> usize {
        page.clamp(1, self.total_pages())
    }

    fn advance(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn recompute(&mut self) {
        let active: Vec<usize> = match &self.mode {
            ViewMode::All => (0..self.canonical.len()).collect(),
            ViewMode::Search(term) => {
                let needle = term.to_lowercase();
                self.canonical
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| utils::matches_search(e, &needle))
                    .map(|(i, _)| i)
                    .collect()
            }
            ViewMode::Category(_) => self
                .canonical
                .iter()
                .enumerate()
                .filter(|(_, e)| self.category_members.contains(&e.id))
                .map(|(i, _)| i)
                .collect(),
        };
        self.active = active;
        self.current_page = self.clamp_page(self.current_page);
    }
}
