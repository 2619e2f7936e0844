use chrono::NaiveDate;

use crate::advisory::{AdvisoryPipeline, AdvisoryRequest, QUICK_QUESTIONS};
use crate::analytics::{recent_transactions, AnalyticsSnapshot};
use crate::models::{CategoryDefinition, ExpenseRecord, CATEGORIES};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Overview,
    Add,
    History,
    Advisor,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Overview, Self::Add, Self::History, Self::Advisor]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overview => write!(f, "Overview"),
            Self::Add => write!(f, "Add Expense"),
            Self::History => write!(f, "History"),
            Self::Advisor => write!(f, "AI Advisor"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    DeleteExpense { id: i64, label: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormField {
    Amount,
    Category,
    Note,
    Date,
}

impl FormField {
    pub(crate) fn all() -> &'static [FormField] {
        &[Self::Amount, Self::Category, Self::Note, Self::Date]
    }

    pub(crate) fn next(self) -> Self {
        match self {
            Self::Amount => Self::Category,
            Self::Category => Self::Note,
            Self::Note => Self::Date,
            Self::Date => Self::Amount,
        }
    }

    pub(crate) fn prev(self) -> Self {
        match self {
            Self::Amount => Self::Date,
            Self::Category => Self::Amount,
            Self::Note => Self::Category,
            Self::Date => Self::Note,
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Amount => write!(f, "Amount (₹)"),
            Self::Category => write!(f, "Category"),
            Self::Note => write!(f, "Note"),
            Self::Date => write!(f, "Date"),
        }
    }
}

/// Text state of the Add Expense form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExpenseForm {
    pub(crate) amount: String,
    pub(crate) category: String,
    pub(crate) note: String,
    pub(crate) date: String,
    pub(crate) field: FormField,
}

impl ExpenseForm {
    pub(crate) fn new(today: NaiveDate) -> Self {
        Self {
            amount: String::new(),
            category: CATEGORIES[0].name.to_string(),
            note: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
            field: FormField::Amount,
        }
    }

    /// Keeps category and date so several expenses can be entered in a row.
    pub(crate) fn clear_after_submit(&mut self) {
        self.amount.clear();
        self.note.clear();
        self.field = FormField::Amount;
    }

    pub(crate) fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Amount => &self.amount,
            FormField::Category => &self.category,
            FormField::Note => &self.note,
            FormField::Date => &self.date,
        }
    }

    fn active_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Amount => &mut self.amount,
            FormField::Category => &mut self.category,
            FormField::Note => &mut self.note,
            FormField::Date => &mut self.date,
        }
    }

    pub(crate) fn push_char(&mut self, c: char) {
        self.active_mut().push(c);
    }

    pub(crate) fn pop_char(&mut self) {
        self.active_mut().pop();
    }

    /// Step through the fixed category table. Free-form text restarts at
    /// the first entry.
    pub(crate) fn cycle_category(&mut self, delta: isize) {
        let len = CATEGORIES.len() as isize;
        let next = match CategoryDefinition::index_of(&CategoryDefinition::resolve(&self.category)) {
            Some(idx) => (idx as isize + delta).rem_euclid(len),
            None => 0,
        };
        self.category = CATEGORIES[next as usize].name.to_string();
    }
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) today: NaiveDate,
    pub(crate) persistent: bool,

    // Overview
    pub(crate) analytics: AnalyticsSnapshot,

    // History (all expenses, newest first)
    pub(crate) history: Vec<ExpenseRecord>,
    pub(crate) history_index: usize,
    pub(crate) history_scroll: usize,

    // Add
    pub(crate) form: ExpenseForm,

    // Advisor
    pub(crate) advisory: AdvisoryPipeline,
    pub(crate) advisor_label: String,
    pub(crate) question_input: String,
    pub(crate) quick_index: usize,
    /// Request waiting to be handed to the async runtime.
    pub(crate) outgoing: Option<AdvisoryRequest>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(session: &Session, today: NaiveDate, advisor_label: String) -> Self {
        let mut app = Self {
            running: true,
            screen: Screen::Overview,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,
            today,
            persistent: session.is_persistent(),

            analytics: session.analytics(today),

            history: Vec::new(),
            history_index: 0,
            history_scroll: 0,

            form: ExpenseForm::new(today),

            advisory: AdvisoryPipeline::new(),
            advisor_label,
            question_input: String::new(),
            quick_index: 0,
            outgoing: None,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        };
        app.refresh(session);
        app
    }

    /// Recompute everything derived from the session.
    pub(crate) fn refresh(&mut self, session: &Session) {
        let snapshot = session.snapshot();
        self.analytics = session.analytics(self.today);
        self.history = recent_transactions(&snapshot, snapshot.expenses.len());
        if self.history_index >= self.history.len() {
            self.history_index = self.history.len().saturating_sub(1);
        }
        if self.history_scroll > self.history_index {
            self.history_scroll = self.history_index;
        }
    }

    /// Move to a new calendar day. The form date follows along unless the
    /// user has typed a different one. Returns true when the date changed.
    pub(crate) fn roll_date(&mut self, today: NaiveDate, session: &Session) -> bool {
        if today == self.today {
            return false;
        }
        let old = self.today.format("%Y-%m-%d").to_string();
        if self.form.date == old {
            self.form.date = today.format("%Y-%m-%d").to_string();
        }
        self.today = today;
        self.refresh(session);
        true
    }

    pub(crate) fn selected_expense(&self) -> Option<&ExpenseRecord> {
        self.history.get(self.history_index)
    }

    /// Validate the form and add the expense. On failure the form is kept
    /// and the reason goes to the status bar.
    pub(crate) fn submit_form(&mut self, session: &mut Session) -> bool {
        let date = match NaiveDate::parse_from_str(self.form.date.trim(), "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                self.set_status(format!("Invalid date: {} (use YYYY-MM-DD)", self.form.date));
                return false;
            }
        };
        let category = CategoryDefinition::resolve(&self.form.category);
        if category.is_empty() {
            self.set_status("Please choose a category");
            return false;
        }

        match session.add_expense(&self.form.amount, &category, &self.form.note, date) {
            Ok(record) => {
                self.set_status(format!(
                    "Added {} to {}",
                    super::util::format_amount(record.amount),
                    record.category
                ));
                self.form.clear_after_submit();
                self.refresh(session);
                true
            }
            Err(e) => {
                self.set_status(e.to_string());
                false
            }
        }
    }

    /// Start an advisory request for `question`; it is picked up by the
    /// event loop from `outgoing`.
    pub(crate) fn ask(&mut self, question: &str) -> bool {
        match self.advisory.begin(question, &self.analytics) {
            Some(request) => {
                self.outgoing = Some(request);
                true
            }
            None => {
                self.set_status("Type a question first");
                false
            }
        }
    }

    pub(crate) fn selected_quick_question(&self) -> &'static str {
        QUICK_QUESTIONS[self.quick_index % QUICK_QUESTIONS.len()]
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
