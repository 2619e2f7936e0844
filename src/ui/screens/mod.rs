pub(crate) mod add;
pub(crate) mod advisor;
pub(crate) mod history;
pub(crate) mod overview;

use ratatui::{
    text::Span,
    widgets::{Block, Borders},
};

use crate::ui::theme;

/// Bordered panel with a dim bold title, shared by every screen.
pub(crate) fn panel(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(ratatui::style::Style::default().fg(theme::OVERLAY))
        .title(Span::styled(format!(" {title} "), theme::title_style()))
}
