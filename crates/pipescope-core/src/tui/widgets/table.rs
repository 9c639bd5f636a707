//! Record table widget shared by the DEV, VLV and AST tabs.
//! Thin TUI wrapper over [`build_table_view`].

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table};

use crate::table::{FieldAccessor, PageInfo};
use crate::tui::state::TableTabState;
use crate::tui::style::Styles;
use crate::view::{StyledRow, build_table_view};

pub fn render_record_table<R>(frame: &mut Frame, area: Rect, tab: &mut TableTabState<R>, title: &str)
where
    R: FieldAccessor + StyledRow + Clone,
{
    let vm = build_table_view(&tab.controller, title);

    frame.render_widget(Clear, area);
    if vm.rows.is_empty() {
        let label = if tab.filter.is_some() {
            "No matching records (filter active)"
        } else {
            "No records for this survey"
        };
        let msg = Paragraph::new(label)
            .style(Styles::dim())
            .block(Block::default().title(vm.title).borders(Borders::ALL));
        frame.render_widget(msg, area);
        tab.resolve_selection(&[]);
        return;
    }

    let row_ids: Vec<u64> = vm.rows.iter().map(|r| r.id).collect();
    tab.resolve_selection(&row_ids);

    let header_cells: Vec<Span> = vm
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if vm.sort_column == Some(i) {
                let arrow = if vm.sort_ascending { "▲" } else { "▼" };
                Span::styled(format!("{}{}", h, arrow), Styles::sorted_header())
            } else {
                Span::styled(h.clone(), Styles::table_header())
            }
        })
        .collect();
    let header = Row::new(header_cells).style(Styles::table_header());

    // The last column takes whatever width is left.
    let last = vm.widths.len().saturating_sub(1);
    let widths: Vec<Constraint> = vm
        .widths
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            if i == last {
                Constraint::Fill(1)
            } else {
                Constraint::Length(w)
            }
        })
        .collect();

    let rows: Vec<Row> = vm
        .rows
        .iter()
        .map(|vr| {
            let cells = vr.cells.iter().map(|c| Span::raw(c.text.clone()));
            Row::new(cells).style(Styles::from_class(vr.style))
        })
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(vm.title)
                .borders(Borders::ALL)
                .style(Styles::default()),
        )
        .column_spacing(1)
        .row_highlight_style(Styles::selected());

    frame.render_stateful_widget(table, area, &mut tab.ratatui_state);
}

/// One-line pager summary below a table.
pub fn render_pager(frame: &mut Frame, area: Rect, page: PageInfo) {
    let range = match page.item_range() {
        Some((first, last)) => format!("rows {}-{} of {}", first, last, page.total_items),
        None => "no rows".to_string(),
    };
    let mut spans = vec![Span::raw(format!(
        " page {}/{} | {} | size {} ",
        page.current_page,
        page.total_pages.max(1),
        range,
        page.page_size
    ))];
    for (key, what) in [
        ("n/p", " page "),
        ("g/G", " first/last "),
        ("s", " sort "),
        ("r", " reverse "),
        ("+/-", " page size "),
        ("/", " filter "),
        ("?", " help"),
    ] {
        spans.push(Span::styled(key, Styles::help_key()));
        spans.push(Span::styled(what, Styles::help()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
