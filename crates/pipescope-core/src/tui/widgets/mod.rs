//! TUI widgets.

mod clusters;
mod header;
mod help;
mod quit_confirm;
mod table;

pub use clusters::{render_clusters, render_map_footer};
pub use header::render_header;
pub use help::render_help;
pub use quit_confirm::render_quit_confirm;
pub use table::{render_pager, render_record_table};
