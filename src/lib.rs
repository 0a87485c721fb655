//! A tui dashboard for browsing customer account records: live
//! substring search, per-column sorting and pagination over an
//! in-memory dataset loaded from CSV or generated on the fly.

pub mod controller;
pub mod data;
pub mod domain;
pub mod inputter;
pub mod model;
pub mod pipeline;
pub mod record;
pub mod ui;
