//! Table view model builder shared by every list tab.

use crate::table::{FieldAccessor, TableController};
use crate::view::common::{StyledRow, TableViewModel, ViewCell, ViewRow};

const MAX_WIDTH: usize = 32;

/// Builds the view model of the controller's current page.
///
/// Column widths fit the header and the widest cell of the page, capped so a
/// single long value cannot push the other columns off screen.
pub fn build_table_view<R>(controller: &TableController<R>, title: &str) -> TableViewModel<u64>
where
    R: FieldAccessor + StyledRow,
{
    let columns = controller.columns();
    let headers: Vec<String> = columns.iter().map(R::field_name).collect();

    let rows: Vec<ViewRow<u64>> = controller
        .sorted_and_paginated_view()
        .into_iter()
        .map(|record| ViewRow {
            id: record.row_id(),
            cells: columns
                .iter()
                .map(|f| ViewCell::plain(record.display_value(f)))
                .collect(),
            style: record.row_style(),
        })
        .collect();

    let widths: Vec<u16> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let widest = rows
                .iter()
                .filter_map(|r| r.cells.get(i))
                .map(|c| c.text.chars().count())
                .max()
                .unwrap_or(0);
            // +2 leaves room for the sort arrow.
            (widest.max(h.chars().count() + 2)).min(MAX_WIDTH) as u16
        })
        .collect();

    let sort_column = controller
        .sort_key()
        .and_then(|key| columns.iter().position(|c| c == key));
    let sort_ascending = controller.direction().is_ascending();
    let page = controller.page_info();

    let sort_info = match sort_column.and_then(|i| headers.get(i)) {
        Some(name) => format!(
            "sort: {} {}",
            name.to_lowercase(),
            if sort_ascending { "asc" } else { "desc" }
        ),
        None => "unsorted".to_string(),
    };
    let title = format!(
        "{} ({} rows, {}, page {}/{})",
        title,
        page.total_items,
        sort_info,
        page.current_page,
        page.total_pages.max(1)
    );

    TableViewModel {
        title,
        headers,
        widths,
        rows,
        sort_column,
        sort_ascending,
        page,
    }
}
