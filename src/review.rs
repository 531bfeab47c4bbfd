//! Nurse review board and parent request list.
//!
//! Pure assembly over the fetched request set: priority banding by age, the
//! pending/confirmed partition that keeps tab counts honest, search,
//! pagination, and the per-row action flags.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::medication::MedicationRequest;

/// Rows per page on the review board.
pub const PAGE_SIZE: usize = 10;

// ═══════════════════════════════════════════════════════════
// Priority
// ═══════════════════════════════════════════════════════════

/// Display-only urgency derived from request age. Never persisted and never
/// sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Normal,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "High Priority",
            Priority::Medium => "Medium Priority",
            Priority::Normal => "Normal",
        }
    }
}

/// Band a request by how long it has been waiting: over 24 hours is high,
/// over 12 is medium, anything else (including a clock-skewed future
/// timestamp) is normal. The boundaries themselves fall in the lower band.
pub fn priority_for(created_at: NaiveDateTime, now: NaiveDateTime) -> Priority {
    let age = now.signed_duration_since(created_at);
    if age > Duration::hours(24) {
        Priority::High
    } else if age > Duration::hours(12) {
        Priority::Medium
    } else {
        Priority::Normal
    }
}

// ═══════════════════════════════════════════════════════════
// Tabs, search, pagination
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewTab {
    Pending,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabCounts {
    pub pending: usize,
    pub confirmed: usize,
}

/// Count both tabs from the unfiltered set. Computed before any search or
/// pagination is applied, so the badges always sum to the full set.
pub fn tab_counts(requests: &[MedicationRequest]) -> TabCounts {
    let pending = requests.iter().filter(|r| r.is_pending()).count();
    TabCounts {
        pending,
        confirmed: requests.len() - pending,
    }
}

/// Split the unfiltered set into (pending, confirmed).
pub fn partition(requests: Vec<MedicationRequest>) -> (Vec<MedicationRequest>, Vec<MedicationRequest>) {
    requests.into_iter().partition(|r| r.is_pending())
}

/// Case-insensitive substring match over student name, student code, parent
/// name, and medication name. A blank term matches everything.
pub fn matches_search(request: &MedicationRequest, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    let haystacks = [
        request.student_name.as_deref(),
        request.student_code.as_deref(),
        request.parent_name.as_deref(),
        Some(request.medication_name.as_str()),
    ];
    haystacks
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(&term))
}

/// Number of pages for `total` rows. An empty set still has one page, so
/// the pager never renders "page 1 of 0".
pub fn page_count(total: usize) -> usize {
    if total == 0 {
        1
    } else {
        total.div_ceil(PAGE_SIZE)
    }
}

/// One page of rows, 1-based. Out-of-range pages clamp to the nearest valid
/// page instead of erroring.
pub fn paginate<T>(items: &[T], page: usize) -> &[T] {
    let pages = page_count(items.len());
    let page = page.clamp(1, pages);
    let start = (page - 1) * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start.min(items.len())..end]
}

// ═══════════════════════════════════════════════════════════
// Board assembly
// ═══════════════════════════════════════════════════════════

/// One board row: the request plus its priority band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRow {
    pub request: MedicationRequest,
    pub priority: Priority,
}

/// One page of the nurse review board, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBoard {
    pub rows: Vec<RequestRow>,
    pub counts: TabCounts,
    pub tab: ReviewTab,
    pub search: String,
    pub page: usize,
    pub page_count: usize,
    pub total_matching: usize,
    /// Set while a confirm or reject is in flight, so only that row's
    /// actions are disabled.
    pub confirming_request_id: Option<i64>,
}

/// Assemble one page of the review board from the unfiltered request set.
///
/// Counts come from the full set; search and pagination only narrow the
/// rows of the selected tab.
pub fn build_board(
    all: Vec<MedicationRequest>,
    tab: ReviewTab,
    search: &str,
    page: usize,
    now: NaiveDateTime,
    confirming_request_id: Option<i64>,
) -> ReviewBoard {
    let counts = tab_counts(&all);
    let (pending, confirmed) = partition(all);
    let shown = match tab {
        ReviewTab::Pending => pending,
        ReviewTab::Confirmed => confirmed,
    };
    let matching: Vec<MedicationRequest> = shown
        .into_iter()
        .filter(|r| matches_search(r, search))
        .collect();
    let total_matching = matching.len();
    let pages = page_count(total_matching);
    let page = page.clamp(1, pages);
    let rows = paginate(&matching, page)
        .iter()
        .map(|request| RequestRow {
            priority: priority_for(request.created_at, now),
            request: request.clone(),
        })
        .collect();

    ReviewBoard {
        rows,
        counts,
        tab,
        search: search.trim().to_string(),
        page,
        page_count: pages,
        total_matching,
        confirming_request_id,
    }
}

// ═══════════════════════════════════════════════════════════
// Parent list
// ═══════════════════════════════════════════════════════════

/// One row of the parent's own list. Edit and delete are offered only while
/// the request is still pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRequestRow {
    pub request: MedicationRequest,
    pub can_edit: bool,
    pub can_delete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRequestsView {
    pub requests: Vec<ParentRequestRow>,
    pub counts: TabCounts,
}

pub fn build_my_requests(requests: Vec<MedicationRequest>) -> MyRequestsView {
    let counts = tab_counts(&requests);
    let requests = requests
        .into_iter()
        .map(|request| {
            let actionable = request.is_pending();
            ParentRequestRow {
                request,
                can_edit: actionable,
                can_delete: actionable,
            }
        })
        .collect();
    MyRequestsView { requests, counts }
}
