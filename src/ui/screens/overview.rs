use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Gauge, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::panel;
use crate::models::CategoryDefinition;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_whole, proportional_bar, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Stat cards
            Constraint::Length(3), // Budget gauge
            Constraint::Min(8),    // Breakdown + recent
            Constraint::Length(9), // Monthly trend
        ])
        .split(area);

    render_cards(f, chunks[0], app);
    render_budget_gauge(f, chunks[1], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);
    render_breakdown(f, middle[0], app);
    render_recent(f, middle[1], app);

    render_trend(f, chunks[3], app);
}

fn render_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(area);

    let s = &app.analytics.signals;
    render_card(
        f,
        cards[0],
        "Budget",
        format_amount(app.analytics.budget),
        theme::ACCENT,
        if app.persistent { "saved" } else { "not saved" }.to_string(),
    );
    render_card(
        f,
        cards[1],
        "Spent",
        format_amount(s.total_spent),
        if s.danger_zone { theme::RED } else { theme::YELLOW },
        format!("{} txns", app.analytics.transaction_count),
    );
    render_card(
        f,
        cards[2],
        "Remaining",
        format_amount(s.remaining),
        if s.remaining < Decimal::ZERO {
            theme::RED
        } else {
            theme::GREEN
        },
        format!("{}% used", s.spend_ratio_percent.round()),
    );
    let top = app
        .analytics
        .top_category()
        .map(|c| format!("Top: {} {}", c.icon, c.short_name()))
        .unwrap_or_else(|| "Top: none".to_string());
    render_card(
        f,
        cards[3],
        "Avg / Day",
        format_whole(app.analytics.average_per_active_day),
        theme::TEXT,
        top,
    );
}

fn render_card(f: &mut Frame, area: Rect, title: &str, value: String, color: Color, subtitle: String) {
    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(panel(title));
    f.render_widget(text, area);
}

fn render_budget_gauge(f: &mut Frame, area: Rect, app: &App) {
    let s = &app.analytics.signals;
    let ratio = (s.spend_ratio_percent / Decimal::ONE_HUNDRED)
        .to_f64()
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);
    let (title, color) = if s.danger_zone {
        ("⚠ Danger zone: over 90% of budget", theme::RED)
    } else {
        ("Budget used", theme::ACCENT)
    };

    let gauge = Gauge::default()
        .block(panel(title))
        .gauge_style(Style::default().fg(color).bg(theme::SURFACE))
        .ratio(ratio)
        .label(format!(
            "{} of {} ({}%)",
            format_whole(s.total_spent),
            format_whole(app.analytics.budget),
            s.spend_ratio_percent.round()
        ));
    f.render_widget(gauge, area);
}

fn render_breakdown(f: &mut Frame, area: Rect, app: &App) {
    let breakdown = &app.analytics.category_breakdown;
    if breakdown.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            "No expenses yet. Add one with :add or press 2",
            theme::dim_style(),
        )))
        .centered()
        .block(panel("Spending by Category"));
        f.render_widget(msg, area);
        return;
    }

    let total = app.analytics.signals.total_spent;
    let max = breakdown.first().map(|c| c.total).unwrap_or(Decimal::ONE);
    let bar_width = (area.width as usize).saturating_sub(40).max(4);

    let lines: Vec<Line> = breakdown
        .iter()
        .take(area.height.saturating_sub(2) as usize)
        .map(|c| {
            let share = if total > Decimal::ZERO {
                (c.total / total * Decimal::ONE_HUNDRED).round()
            } else {
                Decimal::ZERO
            };
            let color = theme::hex_color(c.category.color);
            Line::from(vec![
                Span::raw(format!("{} ", c.category.icon)),
                Span::styled(format!("{:<14}", truncate(c.category.name, 14)), theme::normal_style()),
                Span::styled(
                    format!("{:<width$}", proportional_bar(c.total, max, bar_width), width = bar_width),
                    Style::default().fg(color),
                ),
                Span::styled(format!(" {:>11}", format_whole(c.total)), theme::normal_style()),
                Span::styled(format!(" {share:>3}%"), theme::dim_style()),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(panel("Spending by Category")), area);
}

fn render_recent(f: &mut Frame, area: Rect, app: &App) {
    let recent = &app.analytics.recent_transactions;
    if recent.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled("Nothing yet", theme::dim_style())))
            .centered()
            .block(panel("Recent"));
        f.render_widget(msg, area);
        return;
    }

    let label_width = (area.width as usize).saturating_sub(26).max(6);
    let lines: Vec<Line> = recent
        .iter()
        .take(area.height.saturating_sub(2) as usize)
        .map(|e| {
            let cat = CategoryDefinition::display_for(&e.category);
            Line::from(vec![
                Span::raw(format!("{} ", cat.icon)),
                Span::styled(
                    format!("{:<label_width$}", truncate(e.label(), label_width)),
                    theme::normal_style(),
                ),
                Span::styled(format!(" {}", e.date.format("%d %b")), theme::dim_style()),
                Span::styled(format!(" {:>10}", format_whole(e.amount)), theme::expense_style()),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(panel("Recent")), area);
}

fn render_trend(f: &mut Frame, area: Rect, app: &App) {
    let bars: Vec<Bar> = app
        .analytics
        .monthly_trend
        .iter()
        .map(|m| {
            Bar::default()
                .value(m.total.round().to_u64().unwrap_or(0))
                .text_value(format_whole(m.total))
                .label(Line::from(m.label))
                .style(Style::default().fg(theme::ACCENT))
        })
        .collect();

    let chart = BarChart::default()
        .block(panel("Monthly Trend"))
        .data(BarGroup::default().bars(&bars))
        .max(app.analytics.max_month_total().round().to_u64().unwrap_or(1))
        .bar_width(9)
        .bar_gap(2)
        .value_style(Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD));

    f.render_widget(chart, area);
}
