use std::fmt;
use std::io;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

use crate::pipeline::Field;

#[derive(Debug)]
pub enum DashError {
    Io(io::Error),
    Polars(PolarsError),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    MissingColumn(String),
    BadValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    BadPageSize(usize),
    LoadingFailed(String),
}

impl fmt::Display for DashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashError::Io(e) => write!(f, "io error: {e}"),
            DashError::Polars(e) => write!(f, "data error: {e}"),
            DashError::FileNotFound => write!(f, "file not found"),
            DashError::PermissionDenied => write!(f, "permission denied"),
            DashError::UnknownFileType => write!(f, "unsupported file type, expected .csv"),
            DashError::MissingColumn(name) => write!(f, "missing column \"{name}\""),
            DashError::BadValue { row, column, value } => {
                write!(f, "row {row}: bad {column} value \"{value}\"")
            }
            DashError::BadPageSize(size) => {
                write!(f, "page size {size} is not one of 5, 10, 20, 50")
            }
            DashError::LoadingFailed(msg) => write!(f, "loading failed: {msg}"),
        }
    }
}

impl std::error::Error for DashError {}

impl From<io::Error> for DashError {
    fn from(err: io::Error) -> Self {
        DashError::Io(err)
    }
}

impl From<PolarsError> for DashError {
    fn from(err: PolarsError) -> Self {
        DashError::Polars(err)
    }
}

/// Runtime tuning knobs shared by the controller and the ui.
#[derive(Debug, Clone, Setters)]
pub struct DashConfig {
    /// How long the controller waits for a terminal event per tick.
    pub event_poll_ms: u64,
    /// How long a status message stays up before the key hints return.
    pub status_ttl_ms: u64,
}

impl Default for DashConfig {
    fn default() -> Self {
        DashConfig {
            event_poll_ms: 100,
            status_ttl_ms: 4000,
        }
    }
}

/// Everything the controller can ask the model to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Quit,
    Help,
    Exit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    GrowPageSize,
    ShrinkPageSize,
    SortBy(Field),
    SortSelected,
    Search,
    CopyCell,
    CopyRow,
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
 Navigation
   ↑/k  ↓/j       move row selection
   ←/h  →/l       move column selection
   n / PageDown   next page
   p / PageUp     previous page
   g / Home       first page
   G / End        last page

 View
   /              edit the search query (Enter keeps, Esc restores)
   s / Enter      sort by the selected column (again to flip)
   1-6            sort by column number
   + / -          grow / shrink the page size (5, 10, 20, 50)

 Clipboard
   y              copy the selected cell
   Y              copy the selected row as CSV

 Other
   ?              toggle this help
   q / Ctrl-c     quit
";
