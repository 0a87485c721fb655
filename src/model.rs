use std::time::Instant;

use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::trace;

use crate::domain::Message;
use crate::inputter::Inputter;
use crate::pipeline::{self, Field, TableSlice, ViewState};
use crate::record::{format_usd, Plan, Record, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Table,
    Query,
    Help,
}

/// One table row, pre-rendered for the ui. Plan and status stay typed
/// so the ui can pick badge colors.
#[derive(Debug, Clone)]
pub struct RowView {
    pub name: String,
    pub email: String,
    pub plan: Plan,
    pub status: Status,
    pub signup: String,
    pub spend: String,
}

/// Snapshot of everything the ui renders. Rebuilt by the model after
/// every update; the ui never computes view logic itself.
pub struct UiData {
    pub title: String,
    pub rows: Vec<RowView>,
    /// Records in the dataset.
    pub total: usize,
    /// Records matching the query.
    pub filtered: usize,
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub sort_key: Field,
    pub sort_dir: pipeline::Direction,
    pub selected_row: Option<usize>,
    pub selected_col: usize,
    pub query: String,
    pub editing: bool,
    pub cursor_pos: usize,
    pub show_help: bool,
    pub status_message: String,
    pub status_at: Instant,
}

impl UiData {
    fn empty() -> Self {
        UiData {
            title: String::new(),
            rows: Vec::new(),
            total: 0,
            filtered: 0,
            page: 1,
            total_pages: 1,
            page_size: pipeline::DEFAULT_PAGE_SIZE,
            has_prev: false,
            has_next: false,
            sort_key: Field::SignupDate,
            sort_dir: pipeline::Direction::Descending,
            selected_row: None,
            selected_col: 0,
            query: String::new(),
            editing: false,
            cursor_pos: 0,
            show_help: false,
            status_message: String::new(),
            status_at: Instant::now(),
        }
    }
}

pub struct Model {
    records: Vec<Record>,
    source_label: String,
    view: ViewState,
    slice: TableSlice,
    mode: Mode,
    prev_query: String,
    selected_row: usize,
    selected_col: usize,
    input: Inputter,
    pub run_state: RunState,
    status_message: String,
    status_at: Instant,
    uidata: UiData,
}

impl Model {
    pub fn new(
        records: Vec<Record>,
        source_label: impl Into<String>,
        page_size: usize,
        bad_dates: usize,
    ) -> Self {
        let mut view = ViewState::default();
        view.set_page_size(page_size);
        let slice = pipeline::apply(&records, &view);

        let mut model = Self {
            records,
            source_label: source_label.into(),
            view,
            slice,
            mode: Mode::Table,
            prev_query: String::new(),
            selected_row: 0,
            selected_col: 0,
            input: Inputter::default(),
            run_state: RunState::Running,
            status_message: String::new(),
            status_at: Instant::now(),
            uidata: UiData::empty(),
        };

        let mut greeting = format!(
            "Loaded {} records from {}",
            model.records.len(),
            model.source_label
        );
        if bad_dates > 0 {
            greeting.push_str(&format!(", {bad_dates} unparsable dates"));
        }
        model.set_status_message(greeting);
        model.refresh();
        model
    }

    pub fn uidata(&self) -> &UiData {
        &self.uidata
    }

    /// While the query is being edited, the controller hands keys over
    /// unmapped.
    pub fn raw_keyevents(&self) -> bool {
        self.mode == Mode::Query
    }

    pub fn quit(&mut self) {
        self.run_state = RunState::Quitting;
    }

    pub fn update(&mut self, message: Message) {
        trace!("update: mode {:?}, message {message:?}", self.mode);
        match self.mode {
            Mode::Table => match message {
                Message::Quit => self.quit(),
                Message::Help => self.mode = Mode::Help,
                Message::Exit => {}
                Message::MoveUp => self.selected_row = self.selected_row.saturating_sub(1),
                Message::MoveDown => self.selected_row += 1,
                Message::MoveLeft => self.selected_col = self.selected_col.saturating_sub(1),
                Message::MoveRight => {
                    self.selected_col = std::cmp::min(self.selected_col + 1, Field::ALL.len() - 1)
                }
                Message::NextPage => self.view.next_page(self.slice.page.total_pages),
                Message::PrevPage => self.view.prev_page(self.slice.page.total_pages),
                Message::FirstPage => self.view.first_page(),
                Message::LastPage => self.view.last_page(self.slice.page.total_pages),
                Message::GrowPageSize => self.view.cycle_page_size(1),
                Message::ShrinkPageSize => self.view.cycle_page_size(-1),
                Message::SortBy(field) => {
                    self.view.click_header(field);
                    self.selected_col = field.index();
                }
                Message::SortSelected => self.view.click_header(Field::ALL[self.selected_col]),
                Message::Search => self.enter_query_mode(),
                Message::CopyCell => self.copy_cell(),
                Message::CopyRow => self.copy_row(),
                Message::RawKey(_) => {}
            },
            Mode::Query => {
                if let Message::RawKey(key) = message {
                    self.read_query_key(key);
                }
            }
            Mode::Help => match message {
                Message::Quit => self.quit(),
                Message::Help | Message::Exit => self.mode = Mode::Table,
                _ => {}
            },
        }
        self.refresh();
    }

    fn enter_query_mode(&mut self) {
        self.mode = Mode::Query;
        self.prev_query = self.view.query.clone();
        self.input.set(&self.view.query);
    }

    fn read_query_key(&mut self, key: KeyEvent) {
        let result = self.input.read(key);
        if result.canceled {
            let previous = std::mem::take(&mut self.prev_query);
            if previous != self.view.query {
                self.view.set_query(previous);
            }
            self.mode = Mode::Table;
            self.set_status_message("Search restored");
        } else if result.finished {
            self.mode = Mode::Table;
            if self.view.query.trim().is_empty() {
                self.set_status_message("Search cleared");
            } else {
                let matches = pipeline::filter_rows(&self.records, &self.view.query).len();
                self.set_status_message(format!(
                    "{matches} matches for \"{}\"",
                    self.view.query.trim()
                ));
            }
        } else if result.input != self.view.query {
            // live narrowing while typing
            self.view.set_query(result.input);
        }
    }

    fn selected_record(&self) -> Option<&Record> {
        self.slice
            .rows
            .get(self.selected_row)
            .map(|&idx| &self.records[idx])
    }

    fn copy_cell(&mut self) {
        let field = Field::ALL[self.selected_col];
        let cell = self.selected_record().map(|record| cell_text(record, field));
        match cell {
            Some(cell) => self.copy_to_clipboard(cell, field.title()),
            None => self.set_status_message("Nothing to copy"),
        }
    }

    fn copy_row(&mut self) {
        let line = self.selected_record().map(|record| {
            [
                record.id.clone(),
                record.name.clone(),
                record.email.clone(),
                record.plan.label().to_string(),
                record.status.label().to_string(),
                record.signup_date.iso(),
                format!("{:.2}", record.spend),
            ]
            .iter()
            .map(|f| csv_field(f))
            .collect::<Vec<String>>()
            .join(",")
        });
        match line {
            Some(line) => self.copy_to_clipboard(line, "row"),
            None => self.set_status_message("Nothing to copy"),
        }
    }

    // The clipboard handle is created per copy: it needs a display
    // connection, and holding one open breaks headless runs.
    fn copy_to_clipboard(&mut self, text: String, what: &str) {
        match Clipboard::new() {
            Ok(mut clipboard) => match clipboard.set_text(text) {
                Ok(()) => self.set_status_message(format!("Copied {what} to clipboard")),
                Err(e) => self.set_status_message(format!("Clipboard error: {e}")),
            },
            Err(e) => self.set_status_message(format!("Clipboard unavailable: {e}")),
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_at = Instant::now();
    }

    /// Reruns the pipeline and rebuilds the ui snapshot. Called after
    /// every update; selection indices are clamped to whatever the
    /// pipeline produced.
    fn refresh(&mut self) {
        let slice = pipeline::apply(&self.records, &self.view);
        if slice.rows.is_empty() {
            self.selected_row = 0;
        } else {
            self.selected_row = std::cmp::min(self.selected_row, slice.rows.len() - 1);
        }

        let rows = slice
            .rows
            .iter()
            .map(|&idx| {
                let r = &self.records[idx];
                RowView {
                    name: r.name.clone(),
                    email: r.email.clone(),
                    plan: r.plan,
                    status: r.status,
                    signup: r.signup_date.to_string(),
                    spend: format_usd(r.spend),
                }
            })
            .collect::<Vec<RowView>>();

        let input = self.input.get();
        self.uidata = UiData {
            title: format!("Customers ({})", self.source_label),
            selected_row: if rows.is_empty() { None } else { Some(self.selected_row) },
            rows,
            total: self.records.len(),
            filtered: slice.filtered,
            page: slice.page.page,
            total_pages: slice.page.total_pages,
            page_size: self.view.page_size,
            has_prev: slice.page.has_prev(),
            has_next: slice.page.has_next(),
            sort_key: self.view.sort_key,
            sort_dir: self.view.sort_dir,
            selected_col: self.selected_col,
            query: self.view.query.clone(),
            editing: self.mode == Mode::Query,
            cursor_pos: input.cursor_pos,
            show_help: self.mode == Mode::Help,
            status_message: self.status_message.clone(),
            status_at: self.status_at,
        };
        self.slice = slice;
    }
}

fn cell_text(record: &Record, field: Field) -> String {
    match field {
        Field::Name => record.name.clone(),
        Field::Email => record.email.clone(),
        Field::Plan => record.plan.label().to_string(),
        Field::Status => record.status.label().to_string(),
        Field::SignupDate => record.signup_date.to_string(),
        Field::Spend => format_usd(record.spend),
    }
}

fn csv_field(value: &str) -> String {
    let needs_escaping = value.contains('"');
    let needs_wrapping = value.chars().any(|c| c == ' ' || c == '\t' || c == ',');
    let mut out = value.to_string();

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping || needs_escaping {
        out = format!("\"{out}\"");
    }
    out
}
