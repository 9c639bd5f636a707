//! MAP tab: clusters of the visible devices and valve operations at the current zoom.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table};

use crate::cluster::cluster_points;
use crate::fmt::format_radius;
use crate::models::{DeviceStatus, located};
use crate::tui::state::AppState;
use crate::tui::style::Styles;
use crate::view::{ClusterViewModel, build_cluster_view};

pub fn render_clusters(frame: &mut Frame, area: Rect, state: &mut AppState) {
    let markers = state.map.markers(state.devices.all(), state.valves.all());
    let points = located(&markers);
    let clusters = cluster_points(&points, state.map.zoom, &state.map.radius_table);
    let vm = build_cluster_view(&clusters, state.map.zoom, state.map.radius());

    frame.render_widget(Clear, area);
    state.map.resolve_selection(vm.rows.len());
    if vm.rows.is_empty() {
        let msg = Paragraph::new("No positioned markers match the map filters")
            .style(Styles::dim())
            .block(Block::default().title(vm.title).borders(Borders::ALL));
        frame.render_widget(msg, area);
        return;
    }

    let header = Row::new(
        ClusterViewModel::headers()
            .iter()
            .map(|h| Span::styled(*h, Styles::table_header())),
    )
    .style(Styles::table_header());

    let rows: Vec<Row> = vm
        .rows
        .iter()
        .map(|r| {
            Row::new(vec![
                r.label.clone(),
                r.centroid_text(),
                r.member_count.to_string(),
                r.members_text(),
            ])
            .style(Styles::from_class(r.style))
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(22),
        Constraint::Length(6),
        Constraint::Fill(1),
    ];
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

    frame.render_stateful_widget(table, area, &mut state.map.ratatui_state);
}

/// Zoom and status filter line below the cluster list.
pub fn render_map_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![
        Span::raw(format!(
            " zoom {} radius {} ",
            state.map.zoom,
            format_radius(state.map.radius())
        )),
        Span::styled("+/-", Styles::help_key()),
        Span::styled(" zoom  ", Styles::help()),
    ];
    for (key, status) in [
        ('a', DeviceStatus::Active),
        ('i', DeviceStatus::Idle),
        ('f', DeviceStatus::Fault),
        ('o', DeviceStatus::Offline),
    ] {
        let (mark, style) = if state.map.is_visible(status) {
            ("+", Styles::default())
        } else {
            ("-", Styles::dim())
        };
        spans.push(Span::styled(format!("[{}]", key), Styles::help_key()));
        spans.push(Span::styled(format!("{}{} ", mark, status.as_str()), style));
    }
    let (mark, style) = if state.map.show_valves {
        ("+", Styles::default())
    } else {
        ("-", Styles::dim())
    };
    spans.push(Span::styled("[v]", Styles::help_key()));
    spans.push(Span::styled(format!("{}valves ", mark), style));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
