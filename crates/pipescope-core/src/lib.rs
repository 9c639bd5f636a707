//! pipescope-core: survey dashboard library.
//!
//! Provides:
//! - `table`: generic stable sort + pagination controller
//! - `cluster`: zoom-dependent greedy clustering of map markers
//! - `models`: devices, valve operations, schema-less asset rows
//! - `survey`: active survey sources and change watcher
//! - `provider`: record sources (JSON dataset file, demo scenario)
//! - `fmt`: shared formatting helpers
//! - `view`: UI-agnostic view models
//!
//! With `tui` feature (default):
//! - `tui`: ratatui/crossterm dashboard

pub mod cluster;
pub mod fmt;
pub mod models;
pub mod provider;
pub mod survey;
pub mod table;
pub mod view;

#[cfg(feature = "tui")]
pub mod tui;
