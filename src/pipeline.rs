//! The derivation pipeline behind the table: filter, then sort, then
//! paginate. All three stages are pure functions over record indices;
//! the authoritative record list is never reordered or mutated.

use std::cmp::Ordering;

use crate::record::Record;

/// Page sizes offered by the page-size selector.
pub const PAGE_SIZES: [usize; 4] = [5, 10, 20, 50];
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A sortable column of the table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Plan,
    Status,
    SignupDate,
    Spend,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Email,
        Field::Plan,
        Field::Status,
        Field::SignupDate,
        Field::Spend,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Plan => "Plan",
            Field::Status => "Status",
            Field::SignupDate => "Signup",
            Field::Spend => "Spend",
        }
    }

    /// Position within [`Field::ALL`].
    pub fn index(self) -> usize {
        Field::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Ascending => "▲",
            Direction::Descending => "▼",
        }
    }
}

/// The user-controlled view parameters. Everything the table shows is
/// a pure function of these plus the record list.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub query: String,
    pub sort_key: Field,
    pub sort_dir: Direction,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            query: String::new(),
            sort_key: Field::SignupDate,
            sort_dir: Direction::Descending,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ViewState {
    /// Replacing the query snaps back to the first page.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    /// Changing the page size snaps back to the first page. A zero
    /// size is ignored.
    pub fn set_page_size(&mut self, size: usize) {
        if size == 0 {
            return;
        }
        self.page_size = size;
        self.page = 1;
    }

    /// Steps through [`PAGE_SIZES`], clamping at both ends. No-op at
    /// the ends so the page is not reset without an actual change.
    pub fn cycle_page_size(&mut self, step: i64) {
        let current = PAGE_SIZES
            .iter()
            .position(|&s| s == self.page_size)
            .unwrap_or(0) as i64;
        let next = (current + step).clamp(0, PAGE_SIZES.len() as i64 - 1);
        let size = PAGE_SIZES[next as usize];
        if size != self.page_size {
            self.set_page_size(size);
        }
    }

    /// A header activation: same column flips the direction, a new
    /// column sorts ascending. The page is left alone; clamping covers
    /// any shrinkage.
    pub fn click_header(&mut self, field: Field) {
        if self.sort_key == field {
            self.sort_dir = self.sort_dir.flip();
        } else {
            self.sort_key = field;
            self.sort_dir = Direction::Ascending;
        }
    }

    /// Forward from the effective page, never past the last.
    pub fn next_page(&mut self, total_pages: usize) {
        let effective = effective_page(self.page, total_pages);
        self.page = std::cmp::min(effective + 1, std::cmp::max(total_pages, 1));
    }

    /// Backward from the effective page, never before the first.
    pub fn prev_page(&mut self, total_pages: usize) {
        let effective = effective_page(self.page, total_pages);
        self.page = std::cmp::max(effective.saturating_sub(1), 1);
    }

    pub fn first_page(&mut self) {
        self.page = 1;
    }

    pub fn last_page(&mut self, total_pages: usize) {
        self.page = std::cmp::max(total_pages, 1);
    }
}

fn effective_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, std::cmp::max(total_pages, 1))
}

/// Indices of the records matching `query`, in record order.
///
/// The query is trimmed and matched case-insensitively as a substring
/// of name, email, plan and status. It never looks at id, date or
/// spend. A blank query keeps every record.
pub fn filter_rows(records: &[Record], query: &str) -> Vec<usize> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return (0..records.len()).collect();
    }
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| row_matches(r, &needle))
        .map(|(i, _)| i)
        .collect()
}

fn row_matches(record: &Record, needle: &str) -> bool {
    record.name.to_lowercase().contains(needle)
        || record.email.to_lowercase().contains(needle)
        || record.plan.label().to_lowercase().contains(needle)
        || record.status.label().to_lowercase().contains(needle)
}

/// Compares two records on one column, ascending.
pub fn compare(a: &Record, b: &Record, key: Field) -> Ordering {
    match key {
        Field::Name => compare_text(&a.name, &b.name),
        Field::Email => compare_text(&a.email, &b.email),
        Field::Plan => compare_text(a.plan.label(), b.plan.label()),
        Field::Status => compare_text(a.status.label(), b.status.label()),
        Field::SignupDate => a.signup_date.date().cmp(&b.signup_date.date()),
        Field::Spend => a.spend.total_cmp(&b.spend),
    }
}

/// Case-insensitive lexicographic order with a bytewise tiebreak, so
/// equal-ignoring-case values still order deterministically.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Stable sort of `rows` (indices into `records`) on one column.
/// Descending is the exact reverse of the ascending comparison, and
/// ties keep their current relative order in both directions.
pub fn sort_rows(records: &[Record], rows: &mut [usize], key: Field, dir: Direction) {
    rows.sort_by(|&a, &b| {
        let ord = compare(&records[a], &records[b], key);
        match dir {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    });
}

/// Pagination of `len` rows: the effective page and its half-open row
/// range. An empty input still has one (empty) page, and an
/// out-of-range request clamps instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    pub total_pages: usize,
    pub page: usize,
    pub start: usize,
    pub end: usize,
}

impl PagePlan {
    pub fn has_prev(self) -> bool {
        self.page > 1
    }

    pub fn has_next(self) -> bool {
        self.page < self.total_pages
    }
}

pub fn paginate(len: usize, requested_page: usize, page_size: usize) -> PagePlan {
    let size = std::cmp::max(page_size, 1);
    let total_pages = std::cmp::max(1, len.div_ceil(size));
    let page = requested_page.clamp(1, total_pages);
    let start = std::cmp::min((page - 1) * size, len);
    let end = std::cmp::min(start + size, len);
    PagePlan { total_pages, page, start, end }
}

/// What one pass of the pipeline hands to the presentation layer.
#[derive(Debug, Clone)]
pub struct TableSlice {
    /// Record indices visible on the effective page, in display order.
    pub rows: Vec<usize>,
    /// Row count after filtering (sorting never changes it).
    pub filtered: usize,
    pub page: PagePlan,
}

/// Runs filter, sort and paginate for one view state.
pub fn apply(records: &[Record], state: &ViewState) -> TableSlice {
    let mut rows = filter_rows(records, &state.query);
    sort_rows(records, &mut rows, state.sort_key, state.sort_dir);
    let page = paginate(rows.len(), state.page, state.page_size);
    let visible = rows[page.start..page.end].to_vec();
    TableSlice { rows: visible, filtered: rows.len(), page }
}
