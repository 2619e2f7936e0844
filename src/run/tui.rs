use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::advisory::{AdvisoryClient, AdvisoryError, Answer, QUICK_QUESTIONS};
use crate::config::Settings;
use crate::session::Session;
use crate::ui::app::{App, FormField, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

const TICK: Duration = Duration::from_millis(100);

/// Result of one advisory request, tagged with its sequence number.
type Outcome = (u64, Result<Answer, AdvisoryError>);

struct Advisor {
    client: AdvisoryClient,
    runtime: Runtime,
    tx: Sender<Outcome>,
    rx: Receiver<Outcome>,
}

impl Advisor {
    /// Hand the queued request, if any, to the runtime.
    fn dispatch(&self, app: &mut App) {
        let Some(request) = app.outgoing.take() else {
            return;
        };
        let client = self.client.clone();
        let tx = self.tx.clone();
        tracing::debug!(seq = request.seq, "advisory request sent");
        self.runtime.spawn(async move {
            let result = client.ask(&request.question, &request.summary).await;
            // The receiver is gone once the TUI has exited.
            let _ = tx.send((request.seq, result));
        });
    }

    fn drain(&self, app: &mut App) {
        while let Ok((seq, result)) = self.rx.try_recv() {
            if let Err(ref e) = result {
                tracing::warn!(seq, error = %e, "advisory request failed");
            }
            app.advisory.complete(seq, result);
        }
    }
}

pub(crate) fn as_tui(session: &mut Session, settings: &Settings) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let (tx, rx) = mpsc::channel();
    let advisor = Advisor {
        client: AdvisoryClient::from_mode(&settings.advisor)?,
        runtime,
        tx,
        rx,
    };

    let today = chrono::Local::now().date_naive();
    let mut app = App::new(session, today, settings.advisor.to_string());
    if !app.persistent {
        app.set_status("Storage unavailable: changes will not be saved");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, session, &advisor);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    session: &mut Session,
    advisor: &Advisor,
) -> Result<()> {
    while app.running {
        advisor.drain(app);
        app.roll_date(chrono::Local::now().date_naive(), session);

        terminal.draw(|f| {
            // tab + status + command bars, table borders and header
            let content_height = f.area().height.saturating_sub(6) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, session)?,
                InputMode::Command => handle_command_input(key, app, session)?,
                InputMode::Editing => handle_editing_input(key, app, session),
                InputMode::Confirm => handle_confirm_input(key, app, session),
            }
            advisor.dispatch(app);
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, session: &mut Session) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('1') => switch_screen(app, session, Screen::Overview),
        KeyCode::Char('2') => switch_screen(app, session, Screen::Add),
        KeyCode::Char('3') => switch_screen(app, session, Screen::History),
        KeyCode::Char('4') => switch_screen(app, session, Screen::Advisor),
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, session, screens[next]);
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, session, screens[prev]);
        }
        KeyCode::Char('D') if app.screen == Screen::History => {
            commands::handle_command("delete", app, session)?;
        }
        KeyCode::Char('r') if app.screen == Screen::Advisor => {
            commands::handle_command("reset", app, session)?;
        }
        KeyCode::Char('i') if matches!(app.screen, Screen::Add | Screen::Advisor) => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Enter => handle_enter(app),
        KeyCode::Esc => app.status_message.clear(),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, session: &mut Session) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, session)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_editing_input(key: event::KeyEvent, app: &mut App, session: &mut Session) {
    match app.screen {
        Screen::Add => handle_form_input(key, app, session),
        Screen::Advisor => handle_question_input(key, app),
        _ => app.input_mode = InputMode::Normal,
    }
}

fn handle_form_input(key: event::KeyEvent, app: &mut App, session: &mut Session) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            app.submit_form(session);
        }
        KeyCode::Tab | KeyCode::Down => app.form.field = app.form.field.next(),
        KeyCode::BackTab | KeyCode::Up => app.form.field = app.form.field.prev(),
        KeyCode::Left if app.form.field == FormField::Category => app.form.cycle_category(-1),
        KeyCode::Right if app.form.field == FormField::Category => app.form.cycle_category(1),
        KeyCode::Backspace => app.form.pop_char(),
        KeyCode::Char(c) => app.form.push_char(c),
        _ => {}
    }
}

fn handle_question_input(key: event::KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            let question = app.question_input.clone();
            if app.ask(&question) {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Backspace => {
            app.question_input.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.question_input.clear();
        }
        KeyCode::Char(c) => app.question_input.push(c),
        _ => {}
    }
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, session: &mut Session) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                match action {
                    PendingAction::DeleteExpense { id, label } => {
                        if session.delete_expense(id) {
                            app.refresh(session);
                            app.set_status(format!("Deleted: {label}"));
                        } else {
                            app.set_status("No such expense");
                        }
                    }
                }
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
        _ => {}
    }
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, session: &Session, screen: Screen) {
    app.screen = screen;
    app.refresh(session);
    app.set_status(format!("{screen}"));
}

fn handle_enter(app: &mut App) {
    match app.screen {
        Screen::Add => app.input_mode = InputMode::Editing,
        Screen::Advisor => {
            let question = app.selected_quick_question();
            app.question_input = question.to_string();
            app.ask(question);
        }
        Screen::Overview | Screen::History => {}
    }
}

fn handle_move_down(app: &mut App) {
    match app.screen {
        Screen::History => {
            let page = app.visible_rows;
            scroll_down(
                &mut app.history_index,
                &mut app.history_scroll,
                app.history.len(),
                page,
            );
        }
        Screen::Advisor => app.quick_index = (app.quick_index + 1) % QUICK_QUESTIONS.len(),
        _ => {}
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::History => scroll_up(&mut app.history_index, &mut app.history_scroll),
        Screen::Advisor => {
            app.quick_index = (app.quick_index + QUICK_QUESTIONS.len() - 1) % QUICK_QUESTIONS.len();
        }
        _ => {}
    }
}

fn handle_goto_top(app: &mut App) {
    if app.screen == Screen::History {
        scroll_to_top(&mut app.history_index, &mut app.history_scroll);
    }
}

fn handle_goto_bottom(app: &mut App) {
    if app.screen == Screen::History {
        let page = app.visible_rows;
        scroll_to_bottom(
            &mut app.history_index,
            &mut app.history_scroll,
            app.history.len(),
            page,
        );
    }
}
