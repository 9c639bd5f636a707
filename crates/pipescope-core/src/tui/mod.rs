//! Terminal user interface.
//!
//! Four tabs: devices, valve operations and asset attributes as paginated
//! tables, plus a map tab listing device clusters for the current zoom.

mod app;
mod event;
mod input;
mod navigable;
mod render;
pub(crate) mod state;
pub(crate) mod style;
mod widgets;

pub use app::App;
pub use state::{AppConfig, AppState, PopupState, Tab};
