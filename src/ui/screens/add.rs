use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::panel;
use crate::models::{CategoryDefinition, CATEGORIES};
use crate::ui::app::{App, FormField, InputMode};
use crate::ui::theme;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_form(f, cols[0], app);
    render_categories(f, cols[1], app);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let editing = app.input_mode == InputMode::Editing;
    let mut lines = vec![Line::from("")];

    for field in FormField::all() {
        let active = editing && app.form.field == *field;
        let marker = if active { "▸ " } else { "  " };
        let label_style = if active {
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            theme::dim_style()
        };

        let value = app.form.value(*field);
        let shown = match field {
            FormField::Category => {
                let resolved = CategoryDefinition::resolve(value);
                let cat = CategoryDefinition::display_for(&resolved);
                format!("{} {resolved}  ◂ ▸", cat.icon)
            }
            FormField::Note if value.is_empty() && !active => "(optional)".to_string(),
            _ => value.to_string(),
        };
        let cursor = if active && *field != FormField::Category {
            "█"
        } else {
            ""
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{:<12}", field.to_string()), label_style),
            Span::styled(format!("{shown}{cursor}"), theme::normal_style()),
        ]));
        lines.push(Line::from(""));
    }

    let hint = if editing {
        "Tab/↑↓: field  ←→: category  Enter: add  Esc: done"
    } else {
        "Press Enter or i to start typing"
    };
    lines.push(Line::from(Span::styled(hint, theme::dim_style())));

    f.render_widget(Paragraph::new(lines).block(panel("Add Expense")), area);
}

fn render_categories(f: &mut Frame, area: Rect, app: &App) {
    let current = CategoryDefinition::resolve(&app.form.category);
    let lines: Vec<Line> = CATEGORIES
        .iter()
        .map(|c| {
            let style = if c.name == current {
                theme::selected_style()
            } else {
                Style::default().fg(theme::hex_color(c.color))
            };
            Line::from(Span::styled(format!(" {} {:<20}", c.icon, c.name), style))
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(panel("Categories")), area);
}
