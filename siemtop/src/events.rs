//! Events view state: paginated fetch, in-page filtering, table projection and the
//! detail modal. All mutation goes through the handlers below; drawing only reads the
//! projections (`table`, `pagination`, `detail`).

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::debounce::Debounce;
use crate::error::ApiError;
use crate::json_view::{highlight, TokenLine};
use crate::types::{Event, EventsPage, Severity};

/// Matches the server's default page size.
pub const PAGE_SIZE: u32 = 50;
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Rendered,
    Empty,
    Errored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    /// Empty means "any severity".
    pub severity: String,
    /// Empty means "any type".
    pub event_type: String,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || !self.severity.is_empty() || !self.event_type.is_empty()
    }

    /// Search is a case-insensitive substring of message or raw log; severity and
    /// type must match exactly when set.
    pub fn matches(&self, event: &Event) -> bool {
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let hit = |field: &Option<String>| {
                field
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
            };
            if !hit(&event.message) && !hit(&event.raw_log) {
                return false;
            }
        }
        if !self.severity.is_empty() && event.severity.as_deref() != Some(self.severity.as_str()) {
            return false;
        }
        if !self.event_type.is_empty()
            && event.event_type.as_deref() != Some(self.event_type.as_str())
        {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub timestamp: String,
    pub agent_id: String,
    pub event_type: String,
    pub severity: String,
    pub user: String,
    pub message: String,
}

impl EventRow {
    fn from_event(e: &Event) -> Self {
        let or_dash = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("-")
                .to_string()
        };
        Self {
            timestamp: format_timestamp(e.timestamp.as_deref()),
            agent_id: or_dash(&e.agent_id),
            event_type: or_dash(&e.event_type),
            severity: e
                .severity
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("low")
                .to_string(),
            user: or_dash(&e.user),
            message: e.summary().unwrap_or("-").to_string(),
        }
    }
}

/// What the table body shows. `NoData` and `Error` are distinct single-row states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableView {
    Loading,
    NoData,
    Error,
    Rows(Vec<EventRow>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationView {
    pub page: u32,
    pub total_pages: u32,
    pub start: u64,
    pub end: u64,
    pub total: u64,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl PaginationView {
    pub fn label(&self) -> String {
        if self.total == 0 {
            "Showing 0-0 of 0".into()
        } else {
            format!("Showing {}-{} of {}", self.start, self.end, self.total)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub title: String,
    pub lines: Vec<TokenLine>,
    pub scroll: u16,
}

#[derive(Debug, Clone)]
pub struct EventsState {
    all: Vec<Event>,
    // indices into `all`, so the filtered set is always a subset of the loaded page
    filtered: Vec<usize>,
    current_page: u32,
    page_size: u32,
    total_pages: u32,
    total_events: u64,
    // cumulative across pages, never shrinks
    event_types: BTreeSet<String>,
    loading: bool,
    phase: LoadPhase,
    filter: FilterState,
    search_debounce: Debounce,
    selected: usize,
    detail: Option<DetailView>,
}

impl Default for EventsState {
    fn default() -> Self {
        Self::new()
    }
}

impl EventsState {
    pub fn new() -> Self {
        Self::with_page_size(PAGE_SIZE)
    }

    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            all: Vec::new(),
            filtered: Vec::new(),
            current_page: 1,
            page_size: page_size.max(1),
            total_pages: 1,
            total_events: 0,
            event_types: BTreeSet::new(),
            loading: false,
            phase: LoadPhase::Idle,
            filter: FilterState::default(),
            search_debounce: Debounce::new(SEARCH_DEBOUNCE),
            selected: 0,
            detail: None,
        }
    }

    // ---------- loading ----------

    /// Marks a fetch as in flight and returns the page to request, or `None` when
    /// one is already outstanding.
    pub fn begin_load(&mut self) -> Option<u32> {
        if self.loading {
            return None;
        }
        self.loading = true;
        self.phase = LoadPhase::Loading;
        Some(self.current_page)
    }

    /// Fetch the current page in the background. `done` receives the outcome and
    /// should hand it back to [`EventsState::finish_load`]. Returns false (and
    /// issues no request) while another fetch is in flight.
    pub fn load_events<F>(&mut self, api: &ApiClient, done: F) -> bool
    where
        F: FnOnce(Result<EventsPage, ApiError>) + Send + 'static,
    {
        let Some(page) = self.begin_load() else {
            debug!("events fetch already in flight, ignoring");
            return false;
        };
        let api = api.clone();
        let limit = self.page_size;
        tokio::spawn(async move {
            done(api.events(page, limit).await);
        });
        true
    }

    pub fn finish_load(&mut self, outcome: Result<EventsPage, ApiError>) {
        self.loading = false;
        match outcome {
            Ok(page) if page.is_success() => {
                self.total_pages = page.total_pages();
                self.total_events = page.total_events();
                self.all = page.data.unwrap_or_default();
                self.filtered = (0..self.all.len()).collect();
                for e in &self.all {
                    if let Some(t) = e.event_type.as_deref().filter(|t| !t.is_empty()) {
                        self.event_types.insert(t.to_string());
                    }
                }
                self.selected = 0;
                self.phase = if self.filtered.is_empty() {
                    LoadPhase::Empty
                } else {
                    LoadPhase::Rendered
                };
                info!(
                    page = self.current_page,
                    rows = self.all.len(),
                    total = self.total_events,
                    "events page loaded"
                );
            }
            Ok(page) => {
                warn!(status = ?page.status, "events response without data");
                self.all.clear();
                self.filtered.clear();
                self.total_events = 0;
                self.selected = 0;
                self.phase = LoadPhase::Empty;
            }
            Err(e) => {
                warn!(page = self.current_page, "failed to load events: {e}");
                self.phase = LoadPhase::Errored;
            }
        }
    }

    // ---------- filtering ----------

    /// Recompute the filtered set from the loaded page. No network.
    pub fn apply_filters(&mut self) {
        self.filtered = if self.filter.is_active() {
            self.all
                .iter()
                .enumerate()
                .filter(|(_, e)| self.filter.matches(e))
                .map(|(i, _)| i)
                .collect()
        } else {
            (0..self.all.len()).collect()
        };
        self.selected = self.selected.min(self.filtered.len().saturating_sub(1));
        if !self.loading {
            self.phase = if self.filtered.is_empty() {
                LoadPhase::Empty
            } else {
                LoadPhase::Rendered
            };
        }
    }

    /// Update the search text; filtering runs once input has been quiet for
    /// [`SEARCH_DEBOUNCE`] (see [`EventsState::tick`]).
    pub fn set_search(&mut self, text: impl Into<String>, now: Instant) {
        self.filter.search = text.into();
        self.search_debounce.touch(now);
    }

    pub fn push_search_char(&mut self, c: char, now: Instant) {
        let mut s = self.filter.search.clone();
        s.push(c);
        self.set_search(s, now);
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        let mut s = self.filter.search.clone();
        if s.pop().is_some() {
            self.set_search(s, now);
        }
    }

    /// Runs a due debounced search. Returns true when filtering ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.search_debounce.fire(now) {
            self.apply_filters();
            true
        } else {
            false
        }
    }

    pub fn set_severity(&mut self, severity: impl Into<String>) {
        self.filter.severity = severity.into();
        self.apply_filters();
    }

    pub fn set_event_type(&mut self, event_type: impl Into<String>) {
        self.filter.event_type = event_type.into();
        self.apply_filters();
    }

    /// any -> low -> medium -> high -> critical -> any
    pub fn cycle_severity(&mut self) {
        let next = match Severity::parse(&self.filter.severity) {
            None => Severity::Low.as_str(),
            Some(Severity::Critical) => "",
            Some(s) => Severity::ALL[s as usize + 1].as_str(),
        };
        self.set_severity(next);
    }

    /// any -> each known type in order -> any
    pub fn cycle_event_type(&mut self) {
        let current = self.filter.event_type.clone();
        let next = if current.is_empty() {
            self.event_types.iter().next().cloned()
        } else {
            self.event_types
                .range::<String, _>((
                    std::ops::Bound::Excluded(&current),
                    std::ops::Bound::Unbounded,
                ))
                .next()
                .cloned()
        };
        self.set_event_type(next.unwrap_or_default());
    }

    pub fn clear_filters(&mut self) {
        self.filter = FilterState::default();
        self.apply_filters();
    }

    // ---------- pagination ----------

    pub fn can_prev(&self) -> bool {
        self.current_page > 1 && !self.loading
    }

    pub fn can_next(&self) -> bool {
        self.current_page < self.total_pages && !self.loading
    }

    /// Step back one page and fetch it. No-op on the first page or while loading.
    pub fn prev_page<F>(&mut self, api: &ApiClient, done: F) -> bool
    where
        F: FnOnce(Result<EventsPage, ApiError>) + Send + 'static,
    {
        if !self.can_prev() {
            return false;
        }
        self.current_page -= 1;
        self.load_events(api, done)
    }

    /// Step forward one page and fetch it. No-op on the last page or while loading.
    pub fn next_page<F>(&mut self, api: &ApiClient, done: F) -> bool
    where
        F: FnOnce(Result<EventsPage, ApiError>) + Send + 'static,
    {
        if !self.can_next() {
            return false;
        }
        self.current_page += 1;
        self.load_events(api, done)
    }

    pub fn pagination(&self) -> PaginationView {
        let size = u64::from(self.page_size);
        let page = u64::from(self.current_page);
        PaginationView {
            page: self.current_page,
            total_pages: self.total_pages,
            start: (page - 1) * size + 1,
            end: (page * size).min(self.total_events),
            total: self.total_events,
            prev_enabled: self.can_prev(),
            next_enabled: self.can_next(),
        }
    }

    // ---------- projections ----------

    pub fn table(&self) -> TableView {
        match self.phase {
            LoadPhase::Loading => TableView::Loading,
            LoadPhase::Errored => TableView::Error,
            LoadPhase::Idle | LoadPhase::Empty => TableView::NoData,
            LoadPhase::Rendered if self.filtered.is_empty() => TableView::NoData,
            LoadPhase::Rendered => TableView::Rows(
                self.filtered_events().map(EventRow::from_event).collect(),
            ),
        }
    }

    pub fn filtered_events(&self) -> impl Iterator<Item = &Event> + '_ {
        self.filtered.iter().filter_map(|&i| self.all.get(i))
    }

    pub fn all_events(&self) -> &[Event] {
        &self.all
    }

    pub fn type_options(&self) -> impl Iterator<Item = &str> + '_ {
        self.event_types.iter().map(String::as_str)
    }

    pub fn total_label(&self) -> String {
        format!("Total: {}", self.total_events)
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    // ---------- selection + detail ----------

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, index: usize) {
        self.selected = index.min(self.filtered.len().saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        self.select(self.selected.saturating_add(1));
    }

    pub fn select_prev(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    /// Open the raw record at `index` of the filtered rows. Out of range is a no-op.
    pub fn open_detail(&mut self, index: usize) -> bool {
        let Some(event) = self.filtered.get(index).and_then(|&i| self.all.get(i)) else {
            return false;
        };
        let value = match event.record() {
            Ok(v) => v,
            Err(e) => {
                warn!("cannot render event detail: {e}");
                return false;
            }
        };
        let title = match (event.event_type.as_deref(), event.timestamp.as_deref()) {
            (Some(t), Some(ts)) => format!("{t} @ {ts}"),
            (Some(t), None) => t.to_string(),
            _ => "Event".to_string(),
        };
        self.selected = index;
        self.detail = Some(DetailView {
            title,
            lines: highlight(&value),
            scroll: 0,
        });
        true
    }

    pub fn open_selected(&mut self) -> bool {
        self.open_detail(self.selected)
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    pub fn scroll_detail(&mut self, delta: i32) {
        if let Some(d) = self.detail.as_mut() {
            let max = d.lines.len().saturating_sub(1) as i32;
            d.scroll = (i32::from(d.scroll) + delta).clamp(0, max) as u16;
        }
    }
}

/// `dd.mm.yyyy HH:MM:SS` in local time; unparseable input is shown verbatim.
pub fn format_timestamp(ts: Option<&str>) -> String {
    let Some(ts) = ts.filter(|s| !s.is_empty()) else {
        return "-".into();
    };
    match DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt
            .with_timezone(&Local)
            .format("%d.%m.%Y %H:%M:%S")
            .to_string(),
        Err(_) => ts.to_string(),
    }
}
