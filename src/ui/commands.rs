use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use rust_decimal::Decimal;

use super::app::{App, InputMode, PendingAction, Screen};
use super::util::format_amount;
use crate::models::CategoryDefinition;
use crate::session::Session;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Session) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit SpendLens", cmd_quit, r);
    register_command!("quit", "Quit SpendLens", cmd_quit, r);
    register_command!("o", "Go to Overview", cmd_overview, r);
    register_command!("overview", "Go to Overview", cmd_overview, r);
    register_command!(
        "add",
        "Add expense (e.g. :add 250 food Lunch) or open the form",
        cmd_add,
        r
    );
    register_command!("a", "Add expense (e.g. :a 250 food Lunch)", cmd_add, r);
    register_command!("history", "Go to History", cmd_history, r);
    register_command!("h", "Go to History", cmd_history, r);
    register_command!("advisor", "Go to AI Advisor", cmd_advisor, r);
    register_command!("ai", "Go to AI Advisor", cmd_advisor, r);
    register_command!(
        "ask",
        "Ask the advisor (e.g. :ask Where can I cut costs?)",
        cmd_ask,
        r
    );
    register_command!("reset", "Clear the advisor answer", cmd_reset, r);
    register_command!(
        "budget",
        "Set monthly budget (e.g. :budget 30000)",
        cmd_budget,
        r
    );
    register_command!("b", "Set monthly budget (e.g. :b 30000)", cmd_budget, r);
    register_command!(
        "delete",
        "Delete selected expense, or by id (e.g. :delete 1718000000000)",
        cmd_delete,
        r
    );
    register_command!("categories", "List categories", cmd_categories, r);
    register_command!("help", "Show available commands", cmd_help, r);

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, session: &mut Session) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, session)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 2) // skip short aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _session: &mut Session) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_overview(_args: &str, app: &mut App, session: &mut Session) -> anyhow::Result<()> {
    app.screen = Screen::Overview;
    app.refresh(session);
    Ok(())
}

fn cmd_history(_args: &str, app: &mut App, session: &mut Session) -> anyhow::Result<()> {
    app.screen = Screen::History;
    app.refresh(session);
    Ok(())
}

fn cmd_advisor(_args: &str, app: &mut App, _session: &mut Session) -> anyhow::Result<()> {
    app.screen = Screen::Advisor;
    Ok(())
}

/// `:add <amount> <category> [note...]`, dated today. With no arguments it
/// opens the form instead.
fn cmd_add(args: &str, app: &mut App, session: &mut Session) -> anyhow::Result<()> {
    if args.is_empty() {
        app.screen = Screen::Add;
        app.input_mode = InputMode::Editing;
        return Ok(());
    }

    let mut parts = args.splitn(3, ' ');
    let amount = parts.next().unwrap_or("");
    let Some(category) = parts.next().filter(|c| !c.trim().is_empty()) else {
        app.set_status("Usage: :add <amount> <category> [note]. Example: :add 250 food Lunch");
        return Ok(());
    };
    let note = parts.next().unwrap_or("");
    let category = CategoryDefinition::resolve(category);

    match session.add_expense(amount, &category, note, app.today) {
        Ok(record) => {
            app.refresh(session);
            app.set_status(format!(
                "Added {} to {}",
                format_amount(record.amount),
                record.category
            ));
        }
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_ask(args: &str, app: &mut App, _session: &mut Session) -> anyhow::Result<()> {
    app.screen = Screen::Advisor;
    if app.ask(args) {
        app.question_input = args.to_string();
    }
    Ok(())
}

fn cmd_reset(_args: &str, app: &mut App, _session: &mut Session) -> anyhow::Result<()> {
    app.advisory.reset();
    app.question_input.clear();
    app.set_status("Advisor cleared");
    Ok(())
}

fn cmd_budget(args: &str, app: &mut App, session: &mut Session) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status(format!(
            "Budget: {}. Set with :budget <amount>",
            format_amount(session.budget())
        ));
        return Ok(());
    }

    let cleaned: String = args.chars().filter(|c| *c != ',' && *c != '₹').collect();
    match Decimal::from_str(cleaned.trim()) {
        Ok(value) => {
            session.set_budget(value);
            app.refresh(session);
            app.set_status(format!("Budget set to {}", format_amount(value)));
        }
        Err(_) => app.set_status(format!("Invalid budget: {args}")),
    }
    Ok(())
}

fn cmd_delete(args: &str, app: &mut App, session: &mut Session) -> anyhow::Result<()> {
    let target = if args.is_empty() {
        if app.screen != Screen::History {
            app.set_status("Go to History and select an expense, or use :delete <id>");
            return Ok(());
        }
        app.selected_expense().map(|e| (e.id, e.label().to_string()))
    } else {
        match args.parse::<i64>() {
            Ok(id) => session.get(id).map(|e| (e.id, e.label().to_string())),
            Err(_) => {
                app.set_status(format!("Invalid id: {args}"));
                return Ok(());
            }
        }
    };

    match target {
        Some((id, label)) => {
            app.confirm_message = format!("Delete '{label}'?");
            app.pending_action = Some(PendingAction::DeleteExpense { id, label });
            app.input_mode = InputMode::Confirm;
        }
        None => app.set_status("No such expense"),
    }
    Ok(())
}

fn cmd_categories(_args: &str, app: &mut App, _session: &mut Session) -> anyhow::Result<()> {
    let names: Vec<String> = CategoryDefinition::all()
        .iter()
        .map(|c| format!("{} {}", c.icon, c.name))
        .collect();
    app.set_status(names.join("  "));
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _session: &mut Session) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
