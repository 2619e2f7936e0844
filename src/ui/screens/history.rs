use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use super::panel;
use crate::models::CategoryDefinition;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.history.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled("No expenses recorded", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Press 2 for the form or use :add 250 food Lunch",
                theme::dim_style(),
            )),
        ];
        f.render_widget(
            Paragraph::new(msg).centered().block(panel("History (0)")),
            area,
        );
        return;
    }

    let header_cells = ["Date", "Note", "Category", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .history
        .iter()
        .enumerate()
        .skip(app.history_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, e)| {
            let cat = CategoryDefinition::display_for(&e.category);
            let style = if i == app.history_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let cat_style = if i == app.history_index {
                style
            } else {
                style.fg(theme::category_color(&e.category))
            };

            Row::new(vec![
                Cell::from(format!("  {}", e.date)),
                Cell::from(truncate(e.note.as_deref().unwrap_or("·"), 40)),
                Cell::from(Span::styled(
                    format!("{} {}", cat.icon, truncate(&e.category, 16)),
                    cat_style,
                )),
                Cell::from(format!("{:>12}", format_amount(e.amount))),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(14),
        Constraint::Min(20),
        Constraint::Length(22),
        Constraint::Length(14),
    ];

    let title = format!(
        "History ({})  D: delete",
        app.history.len()
    );
    let table = Table::new(rows, widths).header(header).block(panel(&title));

    f.render_widget(table, area);
}
