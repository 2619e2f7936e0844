use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::panel;
use crate::advisory::{AdvisoryState, QUICK_QUESTIONS};
use crate::ui::app::{App, InputMode};
use crate::ui::theme;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(QUICK_QUESTIONS.len() as u16 + 2),
            Constraint::Length(3),
            Constraint::Min(5),
        ])
        .split(area);

    render_quick_questions(f, chunks[0], app);
    render_input(f, chunks[1], app);
    render_answer(f, chunks[2], app);
}

fn render_quick_questions(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.quick_index % QUICK_QUESTIONS.len();
    let lines: Vec<Line> = QUICK_QUESTIONS
        .iter()
        .enumerate()
        .map(|(i, q)| {
            if i == selected {
                Line::from(Span::styled(format!(" ▸ {q}"), theme::selected_style()))
            } else {
                Line::from(Span::styled(format!("   {q}"), theme::normal_style()))
            }
        })
        .collect();

    let title = format!("Quick Questions  j/k: pick  Enter: ask  [{}]", app.advisor_label);
    f.render_widget(Paragraph::new(lines).block(panel(&title)), area);
}

fn render_input(f: &mut Frame, area: Rect, app: &App) {
    let editing = app.input_mode == InputMode::Editing;
    let line = if editing {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(theme::ACCENT)),
            Span::styled(format!("{}█", app.question_input), theme::normal_style()),
        ])
    } else if app.question_input.is_empty() {
        Line::from(Span::styled(
            "Press i to type your own question",
            theme::dim_style(),
        ))
    } else {
        Line::from(Span::styled(app.question_input.as_str(), theme::normal_style()))
    };

    f.render_widget(Paragraph::new(line).block(panel("Ask")), area);
}

fn render_answer(f: &mut Frame, area: Rect, app: &App) {
    let question_line = |q: &str| {
        Line::from(Span::styled(
            format!("Q: {q}"),
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ))
    };

    let lines: Vec<Line> = match app.advisory.state() {
        AdvisoryState::Idle => vec![Line::from(Span::styled(
            "Pick a quick question or ask your own. Your spending summary is sent with it.",
            theme::dim_style(),
        ))],
        AdvisoryState::Composing { question } | AdvisoryState::AwaitingResponse { question, .. } => {
            vec![
                question_line(question),
                Line::from(""),
                Line::from(Span::styled("Thinking…", theme::dim_style())),
            ]
        }
        AdvisoryState::Answered { question, answer } => {
            let mut out = vec![question_line(question), Line::from("")];
            out.extend(
                answer
                    .to_string()
                    .lines()
                    .map(|l| Line::from(Span::styled(l.to_string(), theme::normal_style()))),
            );
            out
        }
        AdvisoryState::Failed { question, error } => vec![
            question_line(question),
            Line::from(""),
            Line::from(Span::styled(
                error.user_message(),
                Style::default().fg(theme::RED),
            )),
        ],
    };

    let title = if app.advisory.is_waiting() {
        "Advisor (waiting)"
    } else {
        "Advisor"
    };
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(panel(title)),
        area,
    );
}
